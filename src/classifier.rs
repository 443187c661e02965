// src/classifier.rs

use crate::error::ClassifyError;
use crate::model::LineKind;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Splits file text into classified lines.
///
/// Implementations own every language-specific rule. The path is only a hint
/// for language detection; the content is never read from disk.
pub trait LineClassifier {
    /// Name of the language the path would be classified as, if any
    fn language(&self, path: &str) -> Option<String>;

    /// Classifies every physical line of `text`.
    fn classify(&self, path: &str, text: &str) -> Result<Vec<(String, LineKind)>, ClassifyError>;
}

/// Comment syntax and detection rules for one language
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Language {
    pub name: String,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub filenames: Vec<String>,
    #[serde(default)]
    pub line_comments: Vec<String>,
    #[serde(default)]
    pub block_comments: Vec<(String, String)>,
}

fn lang(
    name: &str,
    extensions: &[&str],
    filenames: &[&str],
    line_comments: &[&str],
    block_comments: &[(&str, &str)],
) -> Language {
    Language {
        name: name.to_string(),
        extensions: extensions.iter().map(|s| s.to_string()).collect(),
        filenames: filenames.iter().map(|s| s.to_string()).collect(),
        line_comments: line_comments.iter().map(|s| s.to_string()).collect(),
        block_comments: block_comments
            .iter()
            .map(|(s, e)| (s.to_string(), e.to_string()))
            .collect(),
    }
}

const C_BLOCK: &[(&str, &str)] = &[("/*", "*/")];
const XML_BLOCK: &[(&str, &str)] = &[("<!--", "-->")];

/// Table of known languages, looked up by file name first and extension second.
#[derive(Debug, Clone, Default)]
pub struct Languages {
    langs: Vec<Language>,
    by_filename: HashMap<String, usize>,
    by_extension: HashMap<String, usize>,
}

impl Languages {
    pub fn new(langs: Vec<Language>) -> Self {
        let mut table = Self::default();
        table.extend(langs);
        table
    }

    pub fn builtin() -> Self {
        Self::new(vec![
            lang("Rust", &["rs"], &[], &["//"], C_BLOCK),
            lang("Go", &["go"], &[], &["//"], C_BLOCK),
            lang("C", &["c", "h"], &[], &["//"], C_BLOCK),
            lang("C++", &["cpp", "cc", "cxx", "hpp", "hh", "hxx"], &[], &["//"], C_BLOCK),
            lang("C#", &["cs"], &[], &["//"], C_BLOCK),
            lang("Java", &["java"], &[], &["//"], C_BLOCK),
            lang("Kotlin", &["kt", "kts"], &[], &["//"], C_BLOCK),
            lang("Scala", &["scala"], &[], &["//"], C_BLOCK),
            lang("Swift", &["swift"], &[], &["//"], C_BLOCK),
            lang("JavaScript", &["js", "mjs", "cjs", "jsx"], &[], &["//"], C_BLOCK),
            lang("TypeScript", &["ts", "tsx"], &[], &["//"], C_BLOCK),
            lang("CSS", &["css"], &[], &[], C_BLOCK),
            lang("PHP", &["php"], &[], &["//", "#"], C_BLOCK),
            lang("Python", &["py"], &[], &["#"], &[("\"\"\"", "\"\"\""), ("'''", "'''")]),
            lang("Ruby", &["rb"], &["Rakefile", "Gemfile"], &["#"], &[("=begin", "=end")]),
            lang("Perl", &["pl", "pm"], &[], &["#"], &[]),
            lang("Shell", &["sh", "bash", "zsh"], &[], &["#"], &[]),
            lang("Makefile", &["mk"], &["Makefile", "makefile", "GNUmakefile"], &["#"], &[]),
            lang("Dockerfile", &[], &["Dockerfile"], &["#"], &[]),
            lang("TOML", &["toml"], &[], &["#"], &[]),
            lang("YAML", &["yaml", "yml"], &[], &["#"], &[]),
            lang("SQL", &["sql"], &[], &["--"], C_BLOCK),
            lang("Lua", &["lua"], &[], &["--"], &[("--[[", "]]")]),
            lang("Haskell", &["hs"], &[], &["--"], &[("{-", "-}")]),
            lang("HTML", &["html", "htm"], &[], &[], XML_BLOCK),
            lang("XML", &["xml"], &[], &[], XML_BLOCK),
            lang("Markdown", &["md", "markdown"], &[], &[], XML_BLOCK),
            lang("Text", &["txt"], &[], &[], &[]),
        ])
    }

    /// Adds languages to the table. A language with the name of an existing
    /// one replaces it.
    pub fn extend(&mut self, langs: impl IntoIterator<Item = Language>) {
        for l in langs {
            match self.langs.iter().position(|x| x.name == l.name) {
                Some(i) => self.langs[i] = l,
                None => self.langs.push(l),
            }
        }
        self.reindex();
    }

    fn reindex(&mut self) {
        self.by_filename.clear();
        self.by_extension.clear();
        for (i, l) in self.langs.iter().enumerate() {
            for f in &l.filenames {
                self.by_filename.insert(f.clone(), i);
            }
            for e in &l.extensions {
                self.by_extension.insert(e.to_ascii_lowercase(), i);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Language> {
        self.langs.iter().find(|l| l.name == name)
    }

    pub fn detect(&self, path: &str) -> Option<&Language> {
        let path = Path::new(path);
        let by_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| self.by_filename.get(n));
        let idx = by_name.or_else(|| {
            path.extension()
                .and_then(|e| e.to_str())
                .and_then(|e| self.by_extension.get(&e.to_ascii_lowercase()))
        })?;
        self.langs.get(*idx)
    }

    pub fn len(&self) -> usize {
        self.langs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.langs.is_empty()
    }
}

/// cloc-style classifier: blank, comment or code per trimmed line, following
/// the comment syntax of the detected language.
#[derive(Debug, Clone)]
pub struct SyntaxClassifier {
    languages: Languages,
    default_language: Option<String>,
}

impl SyntaxClassifier {
    pub fn new(languages: Languages) -> Self {
        Self { languages, default_language: None }
    }

    /// Paths with no detected language fall back to `name`'s rules.
    pub fn with_default_language(mut self, name: Option<String>) -> Self {
        self.default_language = name;
        self
    }

    fn resolve(&self, path: &str) -> Result<&Language, ClassifyError> {
        if let Some(l) = self.languages.detect(path) {
            return Ok(l);
        }
        match &self.default_language {
            Some(name) => self
                .languages
                .get(name)
                .ok_or_else(|| ClassifyError::UndefinedLanguage(name.clone())),
            None => Err(ClassifyError::UnknownLanguage(path.to_string())),
        }
    }
}

impl Default for SyntaxClassifier {
    fn default() -> Self {
        Self::new(Languages::builtin())
    }
}

impl LineClassifier for SyntaxClassifier {
    fn language(&self, path: &str) -> Option<String> {
        self.resolve(path).ok().map(|l| l.name.clone())
    }

    fn classify(&self, path: &str, text: &str) -> Result<Vec<(String, LineKind)>, ClassifyError> {
        let lang = self.resolve(path)?;
        Ok(classify_lines(lang, text))
    }
}

/// Classifies `text` with the rules of `lang`. Lines are trimmed before they
/// are returned, so indentation changes do not register as edits.
pub fn classify_lines(lang: &Language, text: &str) -> Vec<(String, LineKind)> {
    let mut out = Vec::new();
    // End marker of the block comment we are inside, if any
    let mut open: Option<&str> = None;

    for raw in text.lines() {
        let line = raw.trim();

        let kind = match open {
            Some(end) => match line.find(end) {
                Some(i) => {
                    open = None;
                    let rest = line[i + end.len()..].trim();
                    if rest.is_empty() {
                        LineKind::Comment
                    } else {
                        classify_fragment(lang, rest, &mut open)
                    }
                }
                None => LineKind::Comment,
            },
            None if line.is_empty() => LineKind::Blank,
            None => classify_fragment(lang, line, &mut open),
        };

        out.push((line.to_string(), kind));
    }

    out
}

/// Comment marker found in a line
enum Marker<'l> {
    Line,
    /// Block opener, carrying the matching end marker
    Block(&'l str),
}

/// Leftmost comment marker in `line` as (offset, marker length, marker).
/// At equal offsets the longer marker wins, so Lua's `--[[` beats `--`.
fn first_marker<'l>(lang: &'l Language, line: &str) -> Option<(usize, usize, Marker<'l>)> {
    let line_markers = lang
        .line_comments
        .iter()
        .filter(|c| !c.is_empty())
        .filter_map(|c| line.find(c.as_str()).map(|i| (i, c.len(), Marker::Line)));
    let block_markers = lang
        .block_comments
        .iter()
        .filter(|(s, e)| !s.is_empty() && !e.is_empty())
        .filter_map(|(s, e)| line.find(s.as_str()).map(|i| (i, s.len(), Marker::Block(e.as_str()))));

    line_markers
        .chain(block_markers)
        .min_by_key(|(i, len, _)| (*i, std::cmp::Reverse(*len)))
}

/// Classifies a non-empty, trimmed fragment that starts outside any comment.
fn classify_fragment<'l>(lang: &'l Language, mut line: &str, open: &mut Option<&'l str>) -> LineKind {
    loop {
        if line.is_empty() {
            return LineKind::Comment;
        }
        match first_marker(lang, line) {
            Some((0, _, Marker::Line)) => return LineKind::Comment,
            Some((0, len, Marker::Block(end))) => {
                let after = &line[len..];
                match after.find(end) {
                    Some(i) => line = after[i + end.len()..].trim(),
                    None => {
                        *open = Some(end);
                        return LineKind::Comment;
                    }
                }
            }
            _ => break,
        }
    }

    // Code. Walk the block comments left to right; one whose end never shows
    // up stays open for the following lines.
    let mut rest = line;
    while let Some((i, len, marker)) = first_marker(lang, rest) {
        let Marker::Block(end) = marker else {
            break;
        };
        let after = &rest[i + len..];
        match after.find(end) {
            Some(j) => rest = &after[j + end.len()..],
            None => {
                *open = Some(end);
                break;
            }
        }
    }
    LineKind::Code
}
