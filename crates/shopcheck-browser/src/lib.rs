mod diagnostics;
mod driver_server;
mod error;
mod profile;
mod registry;
mod session;

pub use diagnostics::Diagnostics;
pub use driver_server::DriverServer;
pub use error::{Error, Result};
pub use profile::{Browser, BrowserProfile};
pub use registry::SessionRegistry;
pub use session::{DriverSession, SessionFactory, WebDriverFactory, WebDriverSession};
