// src/main.rs

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Args, Format};
use commit_stats::{analyze_commits, report, store, Config, RangeOptions};
use git2::{Oid, Repository};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let start_time = Instant::now();

    let repo = store::open(&args.repo)
        .with_context(|| format!("Failed to open git repository at {}", args.repo.display()))?;
    let config = load_config(&args, &repo)?;

    let commits = resolve_revisions(&repo, &args.revisions)?;
    let base = args
        .from
        .as_deref()
        .map(|rev| store::resolve_commit(&repo, rev))
        .transpose()
        .context("Failed to resolve --from")?;

    let options = RangeOptions {
        delete_policy: config.delete_policy,
        base,
        by_file: args.by_file,
        root_against_empty: config.root_against_empty,
        ..RangeOptions::default()
    };
    let classifier = config.classifier();
    let content_filter = config.filter()?;

    let reports = analyze_commits(
        repo.path(),
        &commits,
        &classifier,
        &content_filter,
        config.workers,
        &options,
    )?;
    info!("Analyzed {} commits in {:.2?}", reports.len(), start_time.elapsed());

    match args.format {
        Format::Text => print!("{}", report::render_text(&reports)),
        Format::Json => println!("{}", report::render_json(&reports)?),
    }

    Ok(())
}

fn load_config(args: &Args, repo: &Repository) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(repo.workdir().unwrap_or(repo.path()))?,
    };

    if let Some(policy) = args.delete_policy {
        config.delete_policy = policy;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    config.root_against_empty |= args.root_against_empty;
    Ok(config)
}

/// Expands `A..B` ranges and resolves single revisions, keeping argument order.
fn resolve_revisions(repo: &Repository, revisions: &[String]) -> Result<Vec<Oid>> {
    let mut commits = Vec::new();
    for rev in revisions {
        match rev.split_once("..") {
            Some((from, to)) => {
                let to = if to.is_empty() { "HEAD" } else { to };
                let range = store::commits_in_range(repo, from, to)
                    .with_context(|| format!("Failed to walk range {}", rev))?;
                commits.extend(range);
            }
            None => {
                let oid = store::resolve_commit(repo, rev)
                    .with_context(|| format!("Failed to resolve revision {}", rev))?;
                commits.push(oid);
            }
        }
    }
    Ok(commits)
}
