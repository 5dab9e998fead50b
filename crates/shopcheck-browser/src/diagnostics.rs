use crate::session::DriverSession;
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Writes failure screenshots under a configured directory.
///
/// Capture failures are soft by contract: callers log them and move on, so
/// a broken screenshot never masks the test failure that triggered it.
pub struct Diagnostics {
    screenshots_dir: PathBuf,
}

impl Diagnostics {
    pub fn new(screenshots_dir: impl Into<PathBuf>) -> Self {
        Self {
            screenshots_dir: screenshots_dir.into(),
        }
    }

    pub fn from_settings(settings: &shopcheck_core::Settings) -> Self {
        Self::new(settings.screenshots_dir.clone())
    }

    pub fn screenshots_dir(&self) -> &Path {
        &self.screenshots_dir
    }

    /// Snapshot the current page of `session` to a PNG and return its path.
    ///
    /// With no filename, one is derived from the wall clock at second
    /// resolution (`screenshot_YYYYmmdd_HHMMSS.png`); callers add their own
    /// per-test prefix for uniqueness across parallel workers. The target
    /// directory is created if missing. An absent session fails without
    /// writing anything.
    pub async fn capture(
        &self,
        session: Option<&dyn DriverSession>,
        filename: Option<&str>,
    ) -> Result<PathBuf> {
        let session = session
            .ok_or_else(|| Error::Diagnostics("no live session to capture".to_string()))?;

        std::fs::create_dir_all(&self.screenshots_dir).map_err(|e| {
            Error::Diagnostics(format!(
                "cannot create screenshots directory {}: {}",
                self.screenshots_dir.display(),
                e
            ))
        })?;

        let filename = match filename {
            Some(name) => name.to_string(),
            None => format!(
                "screenshot_{}.png",
                chrono::Local::now().format("%Y%m%d_%H%M%S")
            ),
        };

        let path = self.screenshots_dir.join(filename);
        session
            .screenshot(&path)
            .await
            .map_err(|e| Error::Diagnostics(format!("screenshot failed: {e}")))?;

        tracing::info!(path = %path.display(), "screenshot saved");
        Ok(path)
    }
}
