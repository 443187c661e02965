// src/analyzer.rs

use crate::classifier::{LineClassifier, SyntaxClassifier};
use crate::config::DeletePolicy;
use crate::error::{Result, StatsError};
use crate::filter::ContentFilter;
use crate::line_index::LineIndex;
use crate::model::*;
use crate::store::{ChangeAction, ChangeRecord, ObjectStore};
use git2::{Oid, Repository};
use indicatif::{ParallelProgressIterator, ProgressBar};
use rayon::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Shared flag for stopping a computation between two changes.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(StatsError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Turns one changed path into its line stats.
pub struct ChangeStatsComputer<'a, C: ?Sized> {
    classifier: &'a C,
    filter: &'a ContentFilter,
    delete_policy: DeletePolicy,
}

impl<'a, C: LineClassifier + ?Sized> ChangeStatsComputer<'a, C> {
    pub fn new(classifier: &'a C, filter: &'a ContentFilter, delete_policy: DeletePolicy) -> Self {
        Self { classifier, filter, delete_policy }
    }

    /// Stats for `change`, or `None` when the path is vendored or binary and
    /// must not count at all. Blob read failures are returned as errors.
    pub fn compute<S: ObjectStore + ?Sized>(
        &self,
        store: &S,
        change: &ChangeRecord,
    ) -> Result<Option<FileStats>> {
        let path = change.path.as_str();
        if self.filter.is_vendor(path) {
            debug!("{}: vendored, skipping", path);
            return Ok(None);
        }

        let uses_old = change.action != ChangeAction::Insert;
        let uses_new = change.action != ChangeAction::Delete;
        let old = match change.old {
            Some(id) if uses_old => Some(store.read_blob(id)?),
            _ => None,
        };
        let new = match change.new {
            Some(id) if uses_new => Some(store.read_blob(id)?),
            _ => None,
        };

        if old.iter().chain(new.iter()).any(|c| self.filter.is_binary(c)) {
            debug!("{}: binary content, skipping", path);
            return Ok(None);
        }

        let index = |content: &Option<Vec<u8>>| match content {
            Some(c) => LineIndex::build(path, c, self.classifier),
            None => LineIndex::new(),
        };

        let delta = match change.action {
            ChangeAction::Insert => index(&new),
            ChangeAction::Delete => {
                let mut idx = index(&old);
                if self.delete_policy == DeletePolicy::AsDeletions {
                    idx.negate();
                }
                idx
            }
            ChangeAction::Modify => {
                let mut idx = index(&new);
                idx.subtract(&index(&old));
                idx
            }
        };

        Ok(Some(FileStats::new(
            change.path.clone(),
            self.classifier.language(path),
            &delta.stats(),
        )))
    }
}

/// Computes line statistics for commits of one repository.
pub struct CommitStatsCalculator<'a, S: ?Sized, C: ?Sized> {
    store: &'a S,
    computer: ChangeStatsComputer<'a, C>,
    cancel: CancelToken,
}

impl<'a, S, C> CommitStatsCalculator<'a, S, C>
where
    S: ObjectStore + ?Sized,
    C: LineClassifier + ?Sized,
{
    pub fn new(store: &'a S, classifier: &'a C, filter: &'a ContentFilter) -> Self {
        Self {
            store,
            computer: ChangeStatsComputer::new(classifier, filter, DeletePolicy::default()),
            cancel: CancelToken::default(),
        }
    }

    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.computer.delete_policy = policy;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Stats of `commit` against its first parent. A root commit has
    /// nothing to compare against and yields `None`; see `against_empty`.
    pub fn compute(&self, commit: Oid) -> Result<Option<Stats>> {
        let Some(parent) = self.store.parent_of(commit)? else {
            debug!("{}: root commit, no stats", commit);
            return Ok(None);
        };
        self.between(parent, commit).map(Some)
    }

    /// Stats of `to` against an arbitrary `from` commit.
    pub fn between(&self, from: Oid, to: Oid) -> Result<Stats> {
        self.sum_walk(Some(from), to)
    }

    /// Stats of `commit` against the empty tree: every path it holds counts
    /// as inserted. Works for root commits too.
    pub fn against_empty(&self, commit: Oid) -> Result<Stats> {
        self.sum_walk(None, commit)
    }

    fn sum_walk(&self, from: Option<Oid>, to: Oid) -> Result<Stats> {
        let mut stats = Stats::default();
        self.walk(from, to, |file| {
            stats.sum(&file.stats());
            stats.files += 1;
        })?;
        Ok(stats)
    }

    /// Per-path stats of `commit` against its first parent.
    pub fn by_file(&self, commit: Oid) -> Result<Option<Vec<FileStats>>> {
        let Some(parent) = self.store.parent_of(commit)? else {
            return Ok(None);
        };
        self.files_between(parent, commit).map(Some)
    }

    pub fn files_between(&self, from: Oid, to: Oid) -> Result<Vec<FileStats>> {
        self.collect_walk(Some(from), to)
    }

    /// Per-path stats of `commit` against the empty tree.
    pub fn files_against_empty(&self, commit: Oid) -> Result<Vec<FileStats>> {
        self.collect_walk(None, commit)
    }

    fn collect_walk(&self, from: Option<Oid>, to: Oid) -> Result<Vec<FileStats>> {
        let mut files = Vec::new();
        self.walk(from, to, |file| files.push(file))?;
        Ok(files)
    }

    fn walk(&self, from: Option<Oid>, to: Oid, mut on_file: impl FnMut(FileStats)) -> Result<()> {
        let changes = self.store.diff_trees(from, to)?;
        debug!("{:?}..{}: {} changed paths", from, to, changes.len());

        for change in &changes {
            self.cancel.check()?;
            if let Some(file) = self.computer.compute(self.store, change)? {
                on_file(file);
            }
        }
        Ok(())
    }
}

/// Stats of `commit` against its first parent, with the built-in language
/// table and vendor patterns. `None` for a root commit.
pub fn compute_commit_stats(repo: &Repository, commit: Oid) -> Result<Option<Stats>> {
    let classifier = SyntaxClassifier::default();
    let filter = ContentFilter::default();
    CommitStatsCalculator::new(repo, &classifier, &filter).compute(commit)
}

/// Knobs for analyzing many commits at once
#[derive(Debug, Clone, Default)]
pub struct RangeOptions {
    pub delete_policy: DeletePolicy,
    /// Compare every commit against this one instead of its first parent
    pub base: Option<Oid>,
    /// Keep per-path stats in the reports
    pub by_file: bool,
    /// Report root commits against the empty tree instead of without stats
    pub root_against_empty: bool,
    pub cancel: CancelToken,
}

/// Analyzes `commits` of the repository at `repo_path` on a pool of
/// `workers` threads. A `Repository` cannot be shared across threads, so
/// `map_init` opens a handle for every rayon job (a split of the input, not
/// a thread); a job then reuses it for all of its commits.
/// Reports come back in the order of `commits`; the first error aborts.
pub fn analyze_commits<C>(
    repo_path: &Path,
    commits: &[Oid],
    classifier: &C,
    filter: &ContentFilter,
    workers: usize,
    options: &RangeOptions,
) -> Result<Vec<CommitReport>>
where
    C: LineClassifier + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build()?;

    let bar = ProgressBar::new(commits.len() as u64);
    bar.set_message("Analyzing commits");

    let reports = pool.install(|| {
        commits
            .par_iter()
            .progress_with(bar.clone())
            .map_init(
                || Repository::open(repo_path),
                |repo, &oid| -> Result<CommitReport> {
                    options.cancel.check()?;
                    let repo = match repo {
                        Ok(repo) => repo,
                        Err(e) => return Err(git2::Error::new(e.code(), e.class(), e.message()).into()),
                    };
                    analyze_commit(repo, oid, classifier, filter, options)
                },
            )
            .collect::<Result<Vec<_>>>()
    });
    bar.finish_with_message("Analysis complete");

    reports
}

fn analyze_commit<C: LineClassifier + ?Sized>(
    repo: &Repository,
    oid: Oid,
    classifier: &C,
    filter: &ContentFilter,
    options: &RangeOptions,
) -> Result<CommitReport> {
    let commit = repo.find_commit(oid)?;
    let calculator = CommitStatsCalculator::new(repo, classifier, filter)
        .with_delete_policy(options.delete_policy)
        .with_cancel(options.cancel.clone());

    let files = match options.base {
        Some(base) => Some(calculator.files_between(base, oid)?),
        None => match calculator.by_file(oid)? {
            None if options.root_against_empty => Some(calculator.files_against_empty(oid)?),
            files => files,
        },
    };
    let stats = files.as_deref().map(aggregate);

    Ok(CommitReport {
        commit: oid.to_string(),
        time: commit.time().seconds(),
        summary: commit.summary().unwrap_or_default().to_string(),
        stats,
        files: if options.by_file { files.unwrap_or_default() } else { Vec::new() },
    })
}
