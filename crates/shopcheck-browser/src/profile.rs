use crate::{Error, Result};
use shopcheck_core::Settings;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Supported browser engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Browser {
    Chrome,
    Firefox,
    Edge,
}

impl Browser {
    pub const ALL: [Browser; 3] = [Browser::Chrome, Browser::Firefox, Browser::Edge];

    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
            Browser::Edge => "edge",
        }
    }

    /// Name of the WebDriver server binary for this engine.
    pub fn driver_binary(&self) -> &'static str {
        match self {
            Browser::Chrome => "chromedriver",
            Browser::Firefox => "geckodriver",
            Browser::Edge => "msedgedriver",
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Browser {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "chrome" => Ok(Browser::Chrome),
            "firefox" => Ok(Browser::Firefox),
            "edge" => Ok(Browser::Edge),
            other => Err(Error::UnsupportedBrowser(other.to_string())),
        }
    }
}

/// Resolved, immutable launch configuration for one session.
///
/// Built once per `get_or_create` and handed to the session factory; nothing
/// mutates a profile after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserProfile {
    pub browser: Browser,
    pub headless: bool,
    pub window_size: (u32, u32),
    pub download_dir: PathBuf,
    /// Chromium-style stability flags requested for sandboxed runners.
    /// Firefox ignores these; its builder has no equivalent switches.
    pub extra_args: Vec<String>,
}

impl BrowserProfile {
    /// Resolve the launch configuration for `browser` under `settings`.
    ///
    /// Pure: reads settings, returns a fully-populated profile, no side
    /// effects. CI runners always get headless plus container stability
    /// flags, regardless of any configured default or override.
    pub fn resolve(browser: Browser, settings: &Settings) -> BrowserProfile {
        let mut headless = settings.headless_override.unwrap_or(true);
        let mut extra_args = Vec::new();

        if settings.is_ci {
            headless = true;
            extra_args.extend(
                [
                    "--no-sandbox",
                    "--disable-dev-shm-usage",
                    "--disable-gpu",
                    "--disable-logging",
                    "--log-level=3",
                ]
                .map(String::from),
            );
        }

        BrowserProfile {
            browser,
            headless,
            window_size: settings.window_size,
            download_dir: settings.downloads_dir.clone(),
            extra_args,
        }
    }

    /// Resolve the profile for the browser named in the settings.
    pub fn resolve_default(settings: &Settings) -> Result<BrowserProfile> {
        let browser = settings.browser.parse()?;
        Ok(Self::resolve(browser, settings))
    }
}
