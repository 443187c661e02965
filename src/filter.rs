// src/filter.rs

use regex::RegexSet;

/// Bytes inspected when sniffing for binary content, same as git
pub const DEFAULT_BINARY_SAMPLE: usize = 8000;

/// Paths of third-party code that should never count toward commit stats
const VENDOR_PATTERNS: &[&str] = &[
    r"(^|/)vendor/",
    r"(^|/)vendors/",
    r"(^|/)node_modules/",
    r"(^|/)bower_components/",
    r"(^|/)third[-_]?party/",
    r"(^|/)3rd[-_]?party/",
    r"(^|/)external/",
    r"(^|/)Godeps/_workspace/",
    r"(^|/)Pods/",
    r"(^|/)Carthage/",
    r"(^|/)\.git/",
    r"(^|/)\.cargo/registry/",
    r"(^|/)site-packages/",
    r"(^|/)dist/",
    r"(^|/)deps/",
    r"\.min\.(js|css)$",
    r"-min\.(js|css)$",
    r"(^|/)jquery([^.]*)\.js$",
    r"(^|/)bootstrap([^.]*)\.(js|css)$",
    r"(^|/)(Cargo|Gemfile|composer|poetry|yarn)\.lock$",
    r"(^|/)package-lock\.json$",
    r"(^|/)go\.sum$",
];

/// Decides which paths and contents are excluded from statistics.
#[derive(Debug, Clone)]
pub struct ContentFilter {
    vendor: RegexSet,
    sample_size: usize,
}

impl ContentFilter {
    /// Built-in vendor patterns plus `extra`.
    pub fn new(extra: &[String], sample_size: usize) -> Result<Self, regex::Error> {
        let patterns = VENDOR_PATTERNS
            .iter()
            .map(|p| p.to_string())
            .chain(extra.iter().cloned());
        Ok(Self {
            vendor: RegexSet::new(patterns)?,
            sample_size,
        })
    }

    pub fn is_vendor(&self, path: &str) -> bool {
        self.vendor.is_match(path)
    }

    /// Content is binary when a NUL byte shows up in the leading sample.
    pub fn is_binary(&self, content: &[u8]) -> bool {
        let sample = &content[..content.len().min(self.sample_size)];
        memchr::memchr(0, sample).is_some()
    }
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::new(&[], DEFAULT_BINARY_SAMPLE).expect("built-in vendor patterns are valid")
    }
}
