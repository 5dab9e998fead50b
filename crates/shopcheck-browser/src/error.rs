use crate::profile::Browser;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported browser: {0}. Supported browsers: chrome, firefox, edge")]
    UnsupportedBrowser(String),

    #[error("Failed to create {browser} session: {source}")]
    SessionCreation {
        browser: Browser,
        #[source]
        source: Box<Error>,
    },

    #[error("WebDriver server binary not found: {0}")]
    DriverNotFound(String),

    #[error("Diagnostics capture failed: {0}")]
    Diagnostics(String),

    #[error("Session is not live: {0}")]
    SessionNotLive(Browser),

    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap a launch-time failure per the creation error contract.
    pub(crate) fn creation(browser: Browser, source: Error) -> Self {
        Error::SessionCreation {
            browser,
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
