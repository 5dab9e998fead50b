use anyhow::Result;
use console::style;
use shopcheck_browser::{Browser, DriverServer};
use shopcheck_core::Settings;

/// Report which WebDriver server binaries are available. Missing drivers are
/// reported, not fatal: a run only needs the driver for its target browser.
pub fn execute() -> Result<()> {
    let settings = Settings::from_env()?;

    println!("{}", style("WebDriver server binaries").bold());

    let mut missing = 0;
    for browser in Browser::ALL {
        match DriverServer::locate_binary(browser, &settings) {
            Ok(path) => {
                println!(
                    "  {} {:<12} {}",
                    style("ok").green(),
                    browser.driver_binary(),
                    path.display()
                );
            }
            Err(e) => {
                missing += 1;
                println!(
                    "  {} {:<12} {}",
                    style("--").yellow(),
                    browser.driver_binary(),
                    e
                );
            }
        }
    }

    if missing == Browser::ALL.len() {
        println!();
        println!(
            "{}",
            style("No WebDriver binaries found; install at least one to run tests.").red()
        );
    }

    Ok(())
}
