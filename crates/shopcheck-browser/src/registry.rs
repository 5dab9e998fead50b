use crate::profile::{Browser, BrowserProfile};
use crate::session::{DriverSession, SessionFactory, WebDriverFactory};
use crate::Result;
use shopcheck_core::Settings;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Pause between tearing down a crashed session and building its
/// replacement, to let the old engine process release its resources.
const RESTART_GRACE: Duration = Duration::from_secs(2);

/// Maps each browser to at most one live session.
///
/// This is enforced reuse, not pooling: a second `get_or_create` for the
/// same browser returns the existing handle instead of a new one. The map
/// lock is held across the whole read-check-create-store step, so the
/// at-most-one invariant holds even if a registry is ever shared across
/// tasks. The registry is an explicit value owned by the test-session
/// scope; there is no hidden global.
pub struct SessionRegistry {
    settings: Settings,
    factory: Arc<dyn SessionFactory>,
    sessions: Mutex<HashMap<Browser, Arc<dyn DriverSession>>>,
}

impl SessionRegistry {
    pub fn new(settings: Settings, factory: Arc<dyn SessionFactory>) -> Self {
        Self {
            settings,
            factory,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Registry wired to the production WebDriver factory.
    pub fn with_webdriver(settings: Settings) -> Self {
        let factory = Arc::new(WebDriverFactory::new(settings.clone()));
        Self::new(settings, factory)
    }

    /// Return the live session for `browser`, creating one if absent.
    ///
    /// On creation failure the entry stays absent, so a later call can try
    /// again from a clean slate.
    pub async fn get_or_create(&self, browser: Browser) -> Result<Arc<dyn DriverSession>> {
        let mut sessions = self.sessions.lock().await;

        if let Some(session) = sessions.get(&browser) {
            tracing::info!(browser = %browser, "reusing existing session");
            return Ok(session.clone());
        }

        let profile = BrowserProfile::resolve(browser, &self.settings);
        let session = self.factory.create(&profile).await?;
        sessions.insert(browser, session.clone());
        tracing::info!(browser = %browser, headless = profile.headless, "session created");

        Ok(session)
    }

    /// Non-creating lookup, used by diagnostics and tooling.
    pub async fn get(&self, browser: Browser) -> Option<Arc<dyn DriverSession>> {
        self.sessions.lock().await.get(&browser).cloned()
    }

    /// Tear down the session for `browser` (if any) and build a fresh one.
    ///
    /// Teardown failures are logged and swallowed; the caller always gets a
    /// working session or a creation error. The map lock is held throughout,
    /// so no other caller ever observes the entry as absent. With no prior
    /// session this is just `get_or_create`.
    pub async fn restart(&self, browser: Browser) -> Result<Arc<dyn DriverSession>> {
        let mut sessions = self.sessions.lock().await;

        if let Some(old) = sessions.remove(&browser) {
            tracing::info!(browser = %browser, "restarting session");
            if let Err(e) = old.quit().await {
                tracing::warn!(browser = %browser, "quit during restart failed: {}", e);
            }
            tokio::time::sleep(RESTART_GRACE).await;
        }

        let profile = BrowserProfile::resolve(browser, &self.settings);
        let session = self.factory.create(&profile).await?;
        sessions.insert(browser, session.clone());
        tracing::info!(browser = %browser, "session restarted");

        Ok(session)
    }

    /// Shut down the session for `browser`, if one exists.
    ///
    /// Teardown never throws: failures are logged as warnings and the entry
    /// is cleared regardless, so a failed quit cannot wedge later
    /// `get_or_create` calls into returning a half-dead session.
    pub async fn quit(&self, browser: Browser) {
        let mut sessions = self.sessions.lock().await;

        if let Some(session) = sessions.remove(&browser) {
            match session.quit().await {
                Ok(()) => tracing::info!(browser = %browser, "session quit"),
                Err(e) => tracing::warn!(browser = %browser, "session quit failed: {}", e),
            }
        }
    }

    /// Shut down every session and clear the registry. Idempotent: calling
    /// it twice, or on an empty registry, is a no-op.
    pub async fn quit_all(&self) {
        let mut sessions = self.sessions.lock().await;

        for (browser, session) in sessions.drain() {
            match session.quit().await {
                Ok(()) => tracing::info!(browser = %browser, "session quit"),
                Err(e) => tracing::warn!(browser = %browser, "session quit failed: {}", e),
            }
        }
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}
