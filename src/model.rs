// src/model.rs

use serde::Serialize;
use std::fmt;

/// Kind of a physical line, as reported by the line classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Code,
    Comment,
    Blank,
}

/// Added/deleted line counts for one kind of line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindStats {
    pub additions: u64,
    pub deletions: u64,
}

impl KindStats {
    pub fn add(&mut self, other: KindStats) {
        self.additions += other.additions;
        self.deletions += other.deletions;
    }

    pub fn is_zero(&self) -> bool {
        self.additions == 0 && self.deletions == 0
    }
}

/// Line statistics for a commit (or a single changed path).
///
/// The fields are public for reading and struct literals in tests. `record`
/// and `sum` keep `total` equal to the sum of `code`, `comment` and `blank`;
/// code that writes the kind fields directly has to maintain that itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Number of paths that contributed to these stats
    pub files: u64,
    pub code: KindStats,
    pub comment: KindStats,
    pub blank: KindStats,
    pub total: KindStats,
}

impl Stats {
    /// Records a signed line count for the given kind.
    /// Positive counts are additions, negative ones deletions.
    pub fn record(&mut self, kind: LineKind, count: i64) {
        let delta = if count > 0 {
            KindStats { additions: count as u64, deletions: 0 }
        } else if count < 0 {
            KindStats { additions: 0, deletions: count.unsigned_abs() }
        } else {
            return;
        };

        self.kind_mut(kind).add(delta);
        self.total.add(delta);
    }

    /// Adds the line stats of `other` into `self`. `files` is left alone;
    /// the caller decides what counts as a file.
    pub fn sum(&mut self, other: &Stats) {
        self.code.add(other.code);
        self.comment.add(other.comment);
        self.blank.add(other.blank);
        self.total.add(other.total);
    }

    pub fn kind(&self, kind: LineKind) -> KindStats {
        match kind {
            LineKind::Code => self.code,
            LineKind::Comment => self.comment,
            LineKind::Blank => self.blank,
        }
    }

    fn kind_mut(&mut self, kind: LineKind) -> &mut KindStats {
        match kind {
            LineKind::Code => &mut self.code,
            LineKind::Comment => &mut self.comment,
            LineKind::Blank => &mut self.blank,
        }
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Code (+{}/-{})", self.code.additions, self.code.deletions)?;
        writeln!(f, "Comment (+{}/-{})", self.comment.additions, self.comment.deletions)?;
        writeln!(f, "Blank (+{}/-{})", self.blank.additions, self.blank.deletions)?;
        writeln!(f, "Total (+{}/-{})", self.total.additions, self.total.deletions)?;
        writeln!(f, "Files ({})", self.files)
    }
}

/// Stats of a single changed path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStats {
    pub path: String,
    /// Detected language, if the classifier recognized the path
    pub language: Option<String>,
    pub code: KindStats,
    pub comment: KindStats,
    pub blank: KindStats,
    pub total: KindStats,
}

impl FileStats {
    pub fn new(path: String, language: Option<String>, stats: &Stats) -> Self {
        Self {
            path,
            language,
            code: stats.code,
            comment: stats.comment,
            blank: stats.blank,
            total: stats.total,
        }
    }

    /// Line stats of this path, with `files` set to one
    pub fn stats(&self) -> Stats {
        Stats {
            files: 1,
            code: self.code,
            comment: self.comment,
            blank: self.blank,
            total: self.total,
        }
    }
}

/// Folds per-file results into one commit-wide `Stats`.
/// Every file counts, including those whose lines all cancelled out.
pub fn aggregate(files: &[FileStats]) -> Stats {
    let mut stats = Stats::default();
    for file in files {
        stats.sum(&file.stats());
        stats.files += 1;
    }
    stats
}

/// Result of analyzing one commit
#[derive(Debug, Clone, Serialize)]
pub struct CommitReport {
    pub commit: String,
    /// Commit time, seconds since the epoch
    pub time: i64,
    pub summary: String,
    /// `None` when there was nothing to compare against (root commit)
    pub stats: Option<Stats>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileStats>,
}
