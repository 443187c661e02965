//! Per-commit line statistics for git repositories.
//!
//! For every path a commit touches, the old and new versions are classified
//! line by line (code, comment or blank) and compared as bags of lines: a line
//! counts as added or deleted only when its number of occurrences changes.
//! Vendored and binary files are left out.
//!
//! ```no_run
//! use commit_stats::{compute_commit_stats, store};
//! use std::path::Path;
//!
//! let repo = store::open(Path::new(".")).unwrap();
//! let head = store::resolve_commit(&repo, "HEAD").unwrap();
//! match compute_commit_stats(&repo, head).unwrap() {
//!     Some(stats) => print!("{}", stats),
//!     None => println!("root commit"),
//! }
//! ```

pub mod analyzer;
pub mod classifier;
pub mod config;
pub mod error;
pub mod filter;
pub mod line_index;
pub mod model;
pub mod report;
pub mod store;

pub use analyzer::{
    analyze_commits, compute_commit_stats, CancelToken, ChangeStatsComputer, CommitStatsCalculator,
    RangeOptions,
};
pub use classifier::{Language, Languages, LineClassifier, SyntaxClassifier};
pub use config::{Config, DeletePolicy};
pub use error::{ClassifyError, ConfigError, StatsError};
pub use filter::ContentFilter;
pub use line_index::{LineIndex, LineInfo};
pub use model::{CommitReport, FileStats, KindStats, LineKind, Stats};
pub use store::{ChangeAction, ChangeRecord, ObjectStore};
