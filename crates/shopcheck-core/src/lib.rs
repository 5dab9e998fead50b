pub mod config;
pub mod error;

pub use config::{Settings, TestEnvironment};
pub use error::{Error, Result};
