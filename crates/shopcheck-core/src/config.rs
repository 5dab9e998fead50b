//! Environment-driven settings for a test run.
//!
//! Everything here is read once at startup and treated as immutable for the
//! rest of the run. Values come from environment variables with sensible
//! defaults so a bare `shopcheck session` works on a developer machine.

use crate::{Error, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

/// Named deployment the storefront under test runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestEnvironment {
    Local,
    Docker,
    Staging,
}

impl TestEnvironment {
    /// Default storefront base URL for this environment.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            TestEnvironment::Local => "http://localhost/storefront",
            TestEnvironment::Docker => "http://storefront:80",
            TestEnvironment::Staging => "https://staging.storefront.example.com",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TestEnvironment::Local => "local",
            TestEnvironment::Docker => "docker",
            TestEnvironment::Staging => "staging",
        }
    }
}

impl FromStr for TestEnvironment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(TestEnvironment::Local),
            "docker" => Ok(TestEnvironment::Docker),
            "staging" => Ok(TestEnvironment::Staging),
            other => Err(Error::InvalidSetting {
                name: "SHOPCHECK_ENV".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Resolved settings for one test run.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    /// Requested browser identifier (validated by the browser crate).
    pub browser: String,
    /// Deployment preset the base URL defaults from.
    pub environment: TestEnvironment,
    /// Storefront base URL, already validated as a URL.
    pub base_url: String,
    /// Explicit headless override; `None` means use the per-browser default.
    pub headless_override: Option<bool>,
    /// Running under a CI runner (forces headless plus stability flags).
    pub is_ci: bool,
    /// Implicit element-wait timeout, seconds.
    pub implicit_wait_secs: u64,
    /// Page-load timeout, seconds.
    pub page_load_timeout_secs: u64,
    /// Browser window size when not maximized.
    pub window_size: (u32, u32),
    /// Where failure screenshots are written.
    pub screenshots_dir: PathBuf,
    /// Where browser downloads land.
    pub downloads_dir: PathBuf,
    /// Explicit chromedriver binary path, if not on PATH.
    pub chromedriver_path: Option<PathBuf>,
    /// Explicit geckodriver binary path, if not on PATH.
    pub geckodriver_path: Option<PathBuf>,
    /// Explicit msedgedriver binary path, if not on PATH.
    pub edgedriver_path: Option<PathBuf>,
}

impl Settings {
    /// Load settings from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// Tests inject a closure over a map instead of mutating the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("SHOPCHECK_ENV") {
            Some(value) => value.parse()?,
            None => TestEnvironment::Local,
        };

        let base_url = lookup("SHOPCHECK_BASE_URL")
            .unwrap_or_else(|| environment.default_base_url().to_string());
        // Reject malformed URLs up front rather than at first navigation.
        Url::parse(&base_url)?;

        let headless_override = match lookup("HEADLESS") {
            Some(value) => Some(parse_bool("HEADLESS", &value)?),
            None => None,
        };

        let is_ci = match lookup("CI") {
            Some(value) => value.eq_ignore_ascii_case("true") || value == "1",
            None => false,
        };

        Ok(Settings {
            browser: lookup("BROWSER")
                .unwrap_or_else(|| "chrome".to_string())
                .to_ascii_lowercase(),
            environment,
            base_url,
            headless_override,
            is_ci,
            implicit_wait_secs: parse_secs(
                "SHOPCHECK_IMPLICIT_WAIT",
                lookup("SHOPCHECK_IMPLICIT_WAIT"),
                10,
            )?,
            page_load_timeout_secs: parse_secs(
                "SHOPCHECK_PAGE_LOAD_TIMEOUT",
                lookup("SHOPCHECK_PAGE_LOAD_TIMEOUT"),
                30,
            )?,
            window_size: parse_window_size(lookup("SHOPCHECK_WINDOW_SIZE"))?,
            screenshots_dir: lookup("SHOPCHECK_SCREENSHOTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("reports/screenshots")),
            downloads_dir: lookup("SHOPCHECK_DOWNLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("downloads")),
            chromedriver_path: lookup("SHOPCHECK_CHROMEDRIVER").map(PathBuf::from),
            geckodriver_path: lookup("SHOPCHECK_GECKODRIVER").map(PathBuf::from),
            edgedriver_path: lookup("SHOPCHECK_EDGEDRIVER").map(PathBuf::from),
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        // from_lookup with an empty environment cannot fail.
        Self::from_lookup(|_| None).expect("defaults are valid")
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(Error::InvalidSetting {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

fn parse_secs(name: &str, value: Option<String>, default: u64) -> Result<u64> {
    match value {
        Some(raw) => raw.parse().map_err(|_| Error::InvalidSetting {
            name: name.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}

fn parse_window_size(value: Option<String>) -> Result<(u32, u32)> {
    let Some(raw) = value else {
        return Ok((1920, 1080));
    };

    let invalid = || Error::InvalidSetting {
        name: "SHOPCHECK_WINDOW_SIZE".to_string(),
        value: raw.clone(),
    };

    let (width, height) = raw.split_once(',').ok_or_else(invalid)?;
    Ok((
        width.trim().parse().map_err(|_| invalid())?,
        height.trim().parse().map_err(|_| invalid())?,
    ))
}
