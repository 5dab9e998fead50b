use crate::driver_server::DriverServer;
use crate::profile::{Browser, BrowserProfile};
use crate::{Error, Result};
use async_trait::async_trait;
use shopcheck_core::Settings;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thirtyfour::prelude::*;
use thirtyfour::{BrowserCapabilitiesHelper, Capabilities, ChromiumLikeCapabilities};
use tokio::sync::RwLock;

/// How many times to poll a freshly spawned WebDriver server before giving
/// up. Servers take a moment to start listening.
const CONNECT_ATTEMPTS: u32 = 10;
const CONNECT_BACKOFF: Duration = Duration::from_millis(300);

/// A live browser-automation connection.
///
/// The registry owns the only long-lived reference; tests and page actions
/// borrow it for the duration of a single test. This is also where the
/// consumed capability surface lives: navigate, inspect, screenshot, quit.
#[async_trait]
pub trait DriverSession: Send + Sync {
    fn browser(&self) -> Browser;

    /// Whether the underlying connection is still usable.
    async fn is_live(&self) -> bool;

    async fn goto(&self, url: &str) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    async fn title(&self) -> Result<String>;

    /// Write a PNG of the current page to `path`.
    async fn screenshot(&self, path: &Path) -> Result<()>;

    /// Request engine-level shutdown. After this returns the session is no
    /// longer live, whether or not the shutdown itself succeeded.
    async fn quit(&self) -> Result<()>;
}

/// Turns a resolved profile into a live session. Injectable so the registry
/// is testable without real browsers.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn create(&self, profile: &BrowserProfile) -> Result<Arc<dyn DriverSession>>;
}

/// A session backed by a thirtyfour WebDriver connection plus the driver
/// server process it speaks to.
pub struct WebDriverSession {
    browser: Browser,
    driver: RwLock<Option<WebDriver>>,
    server: std::sync::Mutex<Option<DriverServer>>,
}

impl WebDriverSession {
    fn new(browser: Browser, driver: WebDriver, server: DriverServer) -> Self {
        Self {
            browser,
            driver: RwLock::new(Some(driver)),
            server: std::sync::Mutex::new(Some(server)),
        }
    }
}

#[async_trait]
impl DriverSession for WebDriverSession {
    fn browser(&self) -> Browser {
        self.browser
    }

    async fn is_live(&self) -> bool {
        self.driver.read().await.is_some()
    }

    async fn goto(&self, url: &str) -> Result<()> {
        let guard = self.driver.read().await;
        let driver = guard.as_ref().ok_or(Error::SessionNotLive(self.browser))?;
        driver.goto(url).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let guard = self.driver.read().await;
        let driver = guard.as_ref().ok_or(Error::SessionNotLive(self.browser))?;
        Ok(driver.current_url().await?.to_string())
    }

    async fn title(&self) -> Result<String> {
        let guard = self.driver.read().await;
        let driver = guard.as_ref().ok_or(Error::SessionNotLive(self.browser))?;
        Ok(driver.title().await?)
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        let guard = self.driver.read().await;
        let driver = guard.as_ref().ok_or(Error::SessionNotLive(self.browser))?;
        driver.screenshot(path).await?;
        Ok(())
    }

    async fn quit(&self) -> Result<()> {
        let driver = self.driver.write().await.take();
        let result = match driver {
            Some(driver) => driver.quit().await.map_err(Error::from),
            None => Ok(()),
        };

        // The server process goes away regardless of how the WebDriver
        // shutdown went, so a wedged engine cannot leak a child process.
        if let Ok(mut guard) = self.server.lock() {
            if let Some(mut server) = guard.take() {
                server.stop();
            }
        }

        result
    }
}

/// Production factory: spawns a WebDriver server and connects to it.
pub struct WebDriverFactory {
    settings: Settings,
}

impl WebDriverFactory {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    async fn build(&self, profile: &BrowserProfile) -> Result<Arc<dyn DriverSession>> {
        let browser = profile.browser;

        let binary = DriverServer::locate_binary(browser, &self.settings)?;
        let server = DriverServer::spawn(browser, &binary)?;
        let caps = build_capabilities(profile)?;

        let driver = connect_with_retry(&server.url(), caps).await?;

        if let Err(e) = self.configure(&driver, profile).await {
            // Half-built session: tear the connection down before failing.
            let _ = driver.quit().await;
            return Err(e);
        }

        Ok(Arc::new(WebDriverSession::new(browser, driver, server)))
    }

    /// Uniform post-construction configuration, applied to every engine.
    async fn configure(&self, driver: &WebDriver, profile: &BrowserProfile) -> Result<()> {
        driver
            .set_implicit_wait_timeout(Duration::from_secs(self.settings.implicit_wait_secs))
            .await?;
        driver
            .set_page_load_timeout(Duration::from_secs(self.settings.page_load_timeout_secs))
            .await?;

        if !profile.headless {
            driver.maximize_window().await?;
        }

        tracing::debug!(
            implicit_wait_secs = self.settings.implicit_wait_secs,
            page_load_timeout_secs = self.settings.page_load_timeout_secs,
            "session timeouts configured"
        );
        Ok(())
    }
}

#[async_trait]
impl SessionFactory for WebDriverFactory {
    async fn create(&self, profile: &BrowserProfile) -> Result<Arc<dyn DriverSession>> {
        let browser = profile.browser;
        self.build(profile)
            .await
            .map_err(|e| Error::creation(browser, e))
    }
}

async fn connect_with_retry(server_url: &str, caps: Capabilities) -> Result<WebDriver> {
    let mut attempts_left = CONNECT_ATTEMPTS;
    loop {
        match WebDriver::new(server_url, caps.clone()).await {
            Ok(driver) => return Ok(driver),
            Err(e) => {
                attempts_left -= 1;
                if attempts_left == 0 {
                    return Err(e.into());
                }
                tracing::debug!(
                    server_url,
                    attempts_left,
                    "WebDriver server not ready yet: {}",
                    e
                );
                tokio::time::sleep(CONNECT_BACKOFF).await;
            }
        }
    }
}

/// Translate a profile into engine-native capabilities.
fn build_capabilities(profile: &BrowserProfile) -> Result<Capabilities> {
    let download_dir = std::path::absolute(&profile.download_dir)?;
    let (width, height) = profile.window_size;

    let caps = match profile.browser {
        Browser::Chrome => {
            let mut caps = DesiredCapabilities::chrome();
            if profile.headless {
                caps.add_arg("--headless=new")?;
            }
            caps.add_arg(&format!("--window-size={width},{height}"))?;
            caps.add_arg("--allow-running-insecure-content")?;
            for arg in &profile.extra_args {
                caps.add_arg(arg)?;
            }
            caps.insert_browser_option(
                "prefs",
                serde_json::json!({
                    "download.default_directory": download_dir,
                    "download.prompt_for_download": false,
                    "download.directory_upgrade": true,
                    "safebrowsing.enabled": true,
                }),
            )?;
            caps.into()
        }
        Browser::Firefox => {
            let mut caps = DesiredCapabilities::firefox();
            if profile.headless {
                caps.add_arg("-headless")?;
            }
            caps.add_arg(&format!("--width={width}"))?;
            caps.add_arg(&format!("--height={height}"))?;
            caps.insert_browser_option(
                "prefs",
                serde_json::json!({
                    "browser.download.folderList": 2,
                    "browser.download.dir": download_dir,
                    "browser.helperApps.neverAsk.saveToDisk": "application/octet-stream",
                }),
            )?;
            caps.into()
        }
        Browser::Edge => {
            let mut caps = DesiredCapabilities::edge();
            if profile.headless {
                caps.add_arg("--headless")?;
            }
            caps.add_arg(&format!("--window-size={width},{height}"))?;
            for arg in &profile.extra_args {
                caps.add_arg(arg)?;
            }
            caps.insert_browser_option(
                "prefs",
                serde_json::json!({
                    "download.default_directory": download_dir,
                    "download.prompt_for_download": false,
                }),
            )?;
            caps.into()
        }
    };

    Ok(caps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn profile(browser: Browser) -> BrowserProfile {
        BrowserProfile {
            browser,
            headless: true,
            window_size: (1920, 1080),
            download_dir: PathBuf::from("downloads"),
            extra_args: vec![],
        }
    }

    fn caps_json(profile: &BrowserProfile) -> serde_json::Value {
        let caps = build_capabilities(profile).unwrap();
        serde_json::to_value(&caps).unwrap()
    }

    fn args_of(value: &serde_json::Value, options_key: &str) -> Vec<String> {
        value[options_key]["args"]
            .as_array()
            .unwrap_or(&vec![])
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect()
    }

    #[test]
    fn test_chrome_headless_and_window_size() {
        let json = caps_json(&profile(Browser::Chrome));
        let args = args_of(&json, "goog:chromeOptions");

        assert!(args.contains(&"--headless=new".to_string()));
        assert!(args.contains(&"--window-size=1920,1080".to_string()));
    }

    #[test]
    fn test_chrome_download_prefs() {
        let json = caps_json(&profile(Browser::Chrome));
        let prefs = &json["goog:chromeOptions"]["prefs"];

        assert_eq!(prefs["download.prompt_for_download"], false);
        let dir = prefs["download.default_directory"].as_str().unwrap();
        assert!(Path::new(dir).is_absolute());
    }

    #[test]
    fn test_chrome_headed_omits_headless_flag() {
        let mut p = profile(Browser::Chrome);
        p.headless = false;

        let json = caps_json(&p);
        let args = args_of(&json, "goog:chromeOptions");
        assert!(!args.iter().any(|a| a.starts_with("--headless")));
    }

    #[test]
    fn test_firefox_flags() {
        let json = caps_json(&profile(Browser::Firefox));
        let args = args_of(&json, "moz:firefoxOptions");

        assert!(args.contains(&"-headless".to_string()));
        assert!(args.contains(&"--width=1920".to_string()));
        assert!(args.contains(&"--height=1080".to_string()));
    }

    #[test]
    fn test_edge_carries_stability_flags() {
        let mut p = profile(Browser::Edge);
        p.extra_args = vec!["--no-sandbox".to_string(), "--disable-gpu".to_string()];

        let json = caps_json(&p);
        let args = args_of(&json, "ms:edgeOptions");

        assert!(args.contains(&"--headless".to_string()));
        assert!(args.contains(&"--no-sandbox".to_string()));
        assert!(args.contains(&"--disable-gpu".to_string()));
    }
}
