use crate::OutputFormat;
use anyhow::Result;
use console::style;
use shopcheck_core::Settings;

pub fn execute(format: OutputFormat) -> Result<()> {
    let settings = Settings::from_env()?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        OutputFormat::Pretty => {
            println!("{}", style("Resolved run configuration").bold());
            println!("  browser:            {}", settings.browser);
            println!("  environment:        {}", settings.environment.as_str());
            println!("  base url:           {}", settings.base_url);
            println!(
                "  headless override:  {}",
                match settings.headless_override {
                    Some(v) => v.to_string(),
                    None => "(default)".to_string(),
                }
            );
            println!("  ci:                 {}", settings.is_ci);
            println!("  implicit wait:      {}s", settings.implicit_wait_secs);
            println!("  page load timeout:  {}s", settings.page_load_timeout_secs);
            println!(
                "  window size:        {}x{}",
                settings.window_size.0, settings.window_size.1
            );
            println!(
                "  screenshots dir:    {}",
                settings.screenshots_dir.display()
            );
            println!("  downloads dir:      {}", settings.downloads_dir.display());
        }
    }

    Ok(())
}
