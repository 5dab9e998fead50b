use anyhow::Result;
use shopcheck_browser::{Browser, Diagnostics, SessionRegistry};
use shopcheck_core::Settings;

/// Open a session, optionally navigate and screenshot, then tear everything
/// down. A manual smoke check for the session lifecycle.
pub fn execute(browser: Option<String>, url: Option<String>, screenshot: bool) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let settings = Settings::from_env()?;
        let browser: Browser = browser.as_deref().unwrap_or(&settings.browser).parse()?;

        let registry = SessionRegistry::with_webdriver(settings.clone());

        let result = drive(&registry, &settings, browser, url, screenshot).await;

        // Teardown runs regardless of how the session went; it never throws.
        registry.quit_all().await;

        result
    })
}

async fn drive(
    registry: &SessionRegistry,
    settings: &Settings,
    browser: Browser,
    url: Option<String>,
    screenshot: bool,
) -> Result<()> {
    println!("Opening {browser} session...");
    let session = registry.get_or_create(browser).await?;

    let target = url.unwrap_or_else(|| settings.base_url.clone());
    session.goto(&target).await?;

    println!("  title: {}", session.title().await?);
    println!("  url:   {}", session.current_url().await?);

    if screenshot {
        let diagnostics = Diagnostics::from_settings(settings);
        // Capture failures are soft: report and keep going.
        match diagnostics.capture(Some(session.as_ref()), None).await {
            Ok(path) => println!("  screenshot: {}", path.display()),
            Err(e) => tracing::warn!("screenshot capture failed: {}", e),
        }
    }

    Ok(())
}
