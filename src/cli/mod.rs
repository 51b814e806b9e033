//! CLI definitions and command implementations for snapdrift.

pub mod commands;

use clap::{Parser, Subcommand};
use snapdrift::config::OutputFormat;
use std::path::PathBuf;

/// snapdrift - Compare copies of wrapped snapshot stores across positions
#[derive(Parser)]
#[command(name = "snapdrift")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: ~/.config/snapdrift/snapdrift.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find wrapped stores and group them by identity
    Scan {
        /// Directory to scan (prompted for when omitted)
        root: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Compare every pair of copies of each store
    Diff {
        /// Directory to scan (prompted for when omitted)
        root: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Number of pairs compared at once
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Only print counts, not the mismatched payloads
        #[arg(long)]
        no_payloads: bool,
    },

    /// Show the config file, creating it with defaults if missing
    Config,
}
