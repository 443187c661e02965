// src/cli.rs

use commit_stats::DeletePolicy;
use clap::Parser;
use std::path::PathBuf;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if (1..=64).contains(&n) {
        Ok(n)
    } else {
        Err("workers must be between 1 and 64".to_string())
    }
}

/// Code, comment and blank line statistics for git commits
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Commits to analyze: revisions (`HEAD`, `v1.0`, `abc123`) or ranges (`A..B`)
    #[arg(default_value = "HEAD")]
    pub revisions: Vec<String>,

    /// Path to the git repository (or any directory inside it)
    #[arg(short, long, default_value = ".")]
    pub repo: PathBuf,

    /// Compare against this commit instead of each commit's first parent
    #[arg(long)]
    pub from: Option<String>,

    /// Count root commits against the empty tree instead of skipping them
    #[arg(long)]
    pub root_against_empty: bool,

    /// Also report stats for every changed path
    #[arg(long)]
    pub by_file: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// How deleted files are counted (overrides the config file)
    #[arg(long, value_enum)]
    pub delete_policy: Option<DeletePolicy>,

    /// Number of parallel workers for ranges (overrides the config file)
    #[arg(long, value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Config file (default: commit-stats.toml at the repository root)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,
}

#[derive(clap::ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}
