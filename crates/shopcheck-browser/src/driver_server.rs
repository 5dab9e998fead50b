use crate::{Browser, Error, Result};
use shopcheck_core::Settings;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

/// A WebDriver server process owned by one session.
///
/// chromedriver, geckodriver and msedgedriver all accept a `--port=N`
/// switch, so one launcher covers all three engines. Each server gets an
/// ephemeral port so parallel workers never collide.
pub struct DriverServer {
    browser: Browser,
    child: Child,
    port: u16,
}

impl DriverServer {
    /// Locate the WebDriver server binary for `browser`.
    ///
    /// An explicit path from settings wins, then a per-user drivers
    /// directory (`~/.shopcheck/drivers`), then PATH.
    pub fn locate_binary(browser: Browser, settings: &Settings) -> Result<PathBuf> {
        Self::locate_binary_in(browser, settings, user_drivers_dir())
    }

    fn locate_binary_in(
        browser: Browser,
        settings: &Settings,
        drivers_dir: Option<PathBuf>,
    ) -> Result<PathBuf> {
        let configured = match browser {
            Browser::Chrome => settings.chromedriver_path.as_ref(),
            Browser::Firefox => settings.geckodriver_path.as_ref(),
            Browser::Edge => settings.edgedriver_path.as_ref(),
        };

        if let Some(path) = configured {
            if path.exists() {
                return Ok(path.clone());
            }
            return Err(Error::DriverNotFound(format!(
                "configured {} path does not exist: {}",
                browser.driver_binary(),
                path.display()
            )));
        }

        if let Some(dir) = drivers_dir {
            let candidate = dir.join(browser.driver_binary());
            if candidate.exists() {
                return Ok(candidate);
            }
        }

        which::which(browser.driver_binary()).map_err(|_| {
            Error::DriverNotFound(format!(
                "{} not found in ~/.shopcheck/drivers or on PATH. Install it or set SHOPCHECK_{}",
                browser.driver_binary(),
                match browser {
                    Browser::Chrome => "CHROMEDRIVER",
                    Browser::Firefox => "GECKODRIVER",
                    Browser::Edge => "EDGEDRIVER",
                }
            ))
        })
    }

    /// Spawn the server on an ephemeral local port.
    pub fn spawn(browser: Browser, binary: &Path) -> Result<DriverServer> {
        let port = free_port()?;

        let child = Command::new(binary)
            .arg(format!("--port={port}"))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                Error::DriverNotFound(format!(
                    "failed to launch {}: {}",
                    binary.display(),
                    e
                ))
            })?;

        tracing::debug!(
            browser = %browser,
            port,
            pid = child.id(),
            "WebDriver server spawned"
        );

        Ok(DriverServer {
            browser,
            child,
            port,
        })
    }

    /// URL the WebDriver client connects to.
    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Terminate the server process. Errors are swallowed; a server that
    /// already exited is not a failure.
    pub fn stop(&mut self) {
        if let Err(e) = self.child.kill() {
            tracing::debug!(browser = %self.browser, "WebDriver server already gone: {}", e);
        }
        let _ = self.child.wait();
    }
}

impl Drop for DriverServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Per-user directory for manually installed WebDriver binaries.
fn user_drivers_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".shopcheck").join("drivers"))
}

/// Ask the OS for a free TCP port.
///
/// The listener is dropped before the server binds, so there is a small
/// window where another process could grab the port; in practice the OS
/// cycles ephemeral ports and collisions surface as a SessionCreation error.
fn free_port() -> Result<u16> {
    let listener = TcpListener::bind(("127.0.0.1", 0))?;
    Ok(listener.local_addr()?.port())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_port_is_nonzero() {
        assert_ne!(free_port().unwrap(), 0);
    }

    #[test]
    fn test_locate_binary_fails_for_bad_configured_path() {
        let mut settings = Settings::default();
        settings.chromedriver_path = Some(PathBuf::from("/nonexistent/chromedriver"));

        let err = DriverServer::locate_binary(Browser::Chrome, &settings).unwrap_err();
        assert!(matches!(err, Error::DriverNotFound(_)));
        assert!(err.to_string().contains("/nonexistent/chromedriver"));
    }

    #[test]
    fn test_locate_binary_prefers_configured_path() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        let mut settings = Settings::default();
        settings.geckodriver_path = Some(temp.path().to_path_buf());

        let found = DriverServer::locate_binary(Browser::Firefox, &settings).unwrap();
        assert_eq!(found, temp.path());
    }

    #[test]
    fn test_locate_binary_checks_user_drivers_dir() {
        let dir = tempfile::tempdir().unwrap();
        let candidate = dir.path().join("msedgedriver");
        std::fs::write(&candidate, b"").unwrap();

        let found = DriverServer::locate_binary_in(
            Browser::Edge,
            &Settings::default(),
            Some(dir.path().to_path_buf()),
        )
        .unwrap();
        assert_eq!(found, candidate);
    }

    #[test]
    fn test_configured_path_wins_over_user_drivers_dir() {
        let drivers = tempfile::tempdir().unwrap();
        std::fs::write(drivers.path().join("chromedriver"), b"").unwrap();

        let configured = tempfile::NamedTempFile::new().unwrap();
        let mut settings = Settings::default();
        settings.chromedriver_path = Some(configured.path().to_path_buf());

        let found = DriverServer::locate_binary_in(
            Browser::Chrome,
            &settings,
            Some(drivers.path().to_path_buf()),
        )
        .unwrap();
        assert_eq!(found, configured.path());
    }

    #[cfg(unix)]
    #[test]
    fn test_spawn_and_stop() {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        // Stand-in server: accepts the --port arg and idles.
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fakedriver");
        {
            let mut f = std::fs::File::create(&script).unwrap();
            writeln!(f, "#!/bin/sh\nsleep 30").unwrap();
        }
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut server = DriverServer::spawn(Browser::Chrome, &script).unwrap();
        assert!(server.port() > 0);
        assert!(server.url().starts_with("http://localhost:"));

        server.stop();
        // Second stop is a no-op.
        server.stop();
    }
}
