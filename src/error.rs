//! Error types for commit statistics.
//!
//! Hard failures (object store, cancellation) surface as [`StatsError`] and
//! abort the whole computation. [`ClassifyError`] is soft: the calculator
//! turns it into "no known lines" for the file and keeps going.

use git2::Oid;
use thiserror::Error;

pub type Result<T, E = StatsError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum StatsError {
    /// Object missing from the store
    #[error("object {0} not found")]
    NotFound(Oid),

    /// Any libgit2 failure while resolving commits, trees or blobs
    #[error("git: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("computation cancelled")]
    Cancelled,

    #[error("failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("no language rules for {0}")]
    UnknownLanguage(String),

    #[error("language {0:?} is not defined")]
    UndefinedLanguage(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid vendor pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("workers must be between 1 and 64, got {0}")]
    Workers(usize),

    #[error("binary_sample_size must be at least 1")]
    BinarySample,

    #[error("default_language {0:?} is not a known language")]
    DefaultLanguage(String),
}
