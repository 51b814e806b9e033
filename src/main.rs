//! snapdrift CLI - Compare copies of wrapped snapshot stores
//!
//! Usage:
//!   snapdrift scan [ROOT]   - List stores grouped by identity
//!   snapdrift diff [ROOT]   - Compare every pair of copies
//!   snapdrift config        - Show the config file

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::commands::{self, DiffOptions};
use cli::{Cli, Commands};
use snapdrift::CancellationToken;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so reports on stdout stay clean
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("snapdrift={}", log_level).parse()?),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cancel = CancellationToken::new();

    match cli.command {
        Commands::Scan { root, format } => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::scan(&config, root, format, cancel)
        }
        Commands::Diff {
            root,
            format,
            jobs,
            no_payloads,
        } => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::diff(
                &config,
                root,
                DiffOptions {
                    format,
                    jobs,
                    no_payloads,
                },
                cancel,
            )
        }
        Commands::Config => commands::show_config(cli.config.as_deref()),
    }
}
