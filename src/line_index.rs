// src/line_index.rs

use crate::classifier::LineClassifier;
use crate::model::{LineKind, Stats};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Kind and signed occurrence count of one distinct line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInfo {
    pub kind: LineKind,
    pub count: i64,
}

/// Bag of classified lines for one file version.
///
/// Positions are not kept: two versions are compared by how often each
/// distinct line occurs, so moved lines cancel out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineIndex {
    lines: HashMap<String, LineInfo>,
}

impl LineIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies `content` and counts every line.
    ///
    /// A file the classifier has no rules for yields an empty index. Bytes
    /// that are not UTF-8 are replaced before classification.
    pub fn build<C: LineClassifier + ?Sized>(path: &str, content: &[u8], classifier: &C) -> Self {
        let text = String::from_utf8_lossy(content);
        let mut index = Self::new();
        match classifier.classify(path, &text) {
            Ok(lines) => {
                for (line, kind) in lines {
                    index.add(line, kind);
                }
            }
            Err(e) => debug!("{}: {}, counting no lines", path, e),
        }
        index
    }

    pub fn add(&mut self, line: impl Into<String>, kind: LineKind) {
        let info = self
            .lines
            .entry(line.into())
            .or_insert(LineInfo { kind, count: 0 });
        info.count += 1;
        info.kind = kind;
    }

    /// Subtracts the `before` version from `self`, which must hold the
    /// `after` version. Lines only present in `before` end up negative.
    pub fn subtract(&mut self, before: &LineIndex) {
        for (line, info) in &before.lines {
            match self.lines.get_mut(line) {
                Some(mine) => mine.count -= info.count,
                None => {
                    self.lines.insert(
                        line.clone(),
                        LineInfo { kind: info.kind, count: -info.count },
                    );
                }
            }
        }
    }

    /// Flips every count, turning an "after" index into its mirror image.
    pub fn negate(&mut self) {
        for info in self.lines.values_mut() {
            info.count = -info.count;
        }
    }

    /// Positive counts become additions, negative counts deletions.
    /// `files` is not touched.
    pub fn stats(&self) -> Stats {
        let mut stats = Stats::default();
        for info in self.lines.values() {
            stats.record(info.kind, info.count);
        }
        stats
    }

    pub fn get(&self, line: &str) -> Option<&LineInfo> {
        self.lines.get(line)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for LineIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<_> = self.lines.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (line, info) in entries {
            let sign = match info.count {
                c if c > 0 => '+',
                c if c < 0 => '-',
                _ => ' ',
            };
            writeln!(f, "{} [{:3}x] {}", sign, info.count, line)?;
        }
        Ok(())
    }
}
