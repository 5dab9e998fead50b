use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use shopcheck_cli::{commands, OutputFormat};

#[derive(Parser)]
#[command(name = "shopcheck")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "UI test harness tooling for a web storefront",
    long_about = "Shopcheck manages WebDriver sessions for storefront UI tests: \
                  inspect the resolved run configuration, verify driver binaries are \
                  installed, and open a one-off browser session as a smoke check."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved run configuration
    Config {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Check that WebDriver server binaries are installed
    Doctor,

    /// Open a browser session, optionally navigate and screenshot, then quit
    Session {
        /// Browser to drive (chrome, firefox, edge); defaults to $BROWSER
        #[arg(short, long)]
        browser: Option<String>,

        /// URL to open; defaults to the configured base URL
        #[arg(short, long)]
        url: Option<String>,

        /// Capture a screenshot before quitting
        #[arg(long)]
        screenshot: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Config { format } => commands::config::execute(format),
        Commands::Doctor => commands::doctor::execute(),
        Commands::Session {
            browser,
            url,
            screenshot,
        } => commands::session::execute(browser, url, screenshot),
        Commands::Completion { shell } => {
            commands::completion::execute(shell, &mut Cli::command())
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("shopcheck=debug,shopcheck_core=debug,shopcheck_browser=debug")
    } else {
        EnvFilter::new("shopcheck=info,shopcheck_browser=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
