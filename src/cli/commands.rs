//! Command implementations for the snapdrift CLI.
//!
//! - scan: find wrapped stores and group them by identity
//! - diff: compare every pair of copies within each group
//! - config: show or create the config file

use anyhow::{bail, Context, Result};
use colored::Colorize;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use snapdrift::config::{default_config_path, Config, OutputFormat};
use snapdrift::diff::{pair_count, PairOutcome};
use snapdrift::formatters::{formatter_for, RunReport};
use snapdrift::CancellationToken;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Load the config given on the command line, or the default one.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Config::load_default(),
    }
}

/// Use the given root or ask for one, and make sure it is a directory.
fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf> {
    let root = match root {
        Some(root) => root,
        None => {
            let input: String = Input::new()
                .with_prompt("Enter path to directory")
                .interact_text()
                .context("Cannot read directory path")?;
            PathBuf::from(input.trim())
        }
    };

    if !root.is_dir() {
        bail!("Directory not found: {}", root.display());
    }
    Ok(root)
}

/// Cancel `token` on Ctrl-C.
///
/// Installed after the root prompt, so Ctrl-C at the prompt still exits.
fn cancel_on_interrupt(token: CancellationToken) {
    let spawned = std::thread::Builder::new()
        .name("snapdrift-signal".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    debug!("Cannot start signal runtime: {}", err);
                    return;
                }
            };
            runtime.block_on(async {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, finishing in-flight pairs");
                    token.cancel();
                }
            });
        });

    if let Err(err) = spawned {
        debug!("Cannot spawn signal thread: {}", err);
    }
}

/// Find and group stores under a root.
pub fn scan(
    config: &Config,
    root: Option<PathBuf>,
    format: Option<OutputFormat>,
    cancel: CancellationToken,
) -> Result<()> {
    let root = resolve_root(root)?;
    cancel_on_interrupt(cancel.clone());
    let format = format.unwrap_or(config.output.format);

    if format == OutputFormat::Text {
        println!("{} {}", "Scanning".cyan(), root.display());
    }

    let report = config.scanner(cancel).scan(&root)?;

    let formatter = formatter_for(format, config.output.show_payloads);
    println!("{}", formatter.format_scan(&root, &report)?);
    Ok(())
}

/// Options the diff command can override from the command line.
pub struct DiffOptions {
    pub format: Option<OutputFormat>,
    pub jobs: Option<usize>,
    pub no_payloads: bool,
}

/// Scan a root and compare every pair of copies in each group.
pub fn diff(
    config: &Config,
    root: Option<PathBuf>,
    options: DiffOptions,
    cancel: CancellationToken,
) -> Result<()> {
    let root = resolve_root(root)?;
    cancel_on_interrupt(cancel.clone());
    let format = options.format.unwrap_or(config.output.format);
    let show_payloads = config.output.show_payloads && !options.no_payloads;

    let mut config = config.clone();
    if let Some(jobs) = options.jobs {
        config.diff.max_parallel_pairs = jobs;
    }

    let scan = config.scanner(cancel.clone()).scan(&root)?;

    let total = pair_count(&scan.grouping);
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::with_template("  [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")?
            .progress_chars("█▓░"),
    );

    let pairs = config
        .diff_engine(cancel.clone())
        .diff_all(&scan.grouping, |_| pb.inc(1))?;
    pb.finish_and_clear();

    let cancelled = pairs
        .iter()
        .filter(|pair| pair.outcome == PairOutcome::Cancelled)
        .count();

    let run = RunReport { root, scan, pairs };
    let formatter = formatter_for(format, show_payloads);
    println!("{}", formatter.format_run(&run)?);

    if cancelled > 0 {
        eprintln!(
            "{} {} pairs were not compared",
            "Interrupted:".yellow().bold(),
            cancelled
        );
    }
    Ok(())
}

/// Show the config file, writing defaults first when it does not exist.
pub fn show_config(path: Option<&Path>) -> Result<()> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);

    let config = if path.exists() {
        Config::load(&path)?
    } else {
        let config = Config::default();
        config.save(&path)?;
        println!("{} {}", "Created".green(), path.display());
        config
    };

    println!("{} {}\n", "Config:".cyan(), path.display());
    println!(
        "{}",
        toml::to_string_pretty(&config).context("Cannot serialize config to TOML")?
    );
    Ok(())
}
