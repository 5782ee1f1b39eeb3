//! Corpus scanning and per-document line editing.
//!
//! A corpus is a flat directory of UTF-8 note files. Scanning is read-only
//! and deterministic: files are visited in lexicographic name order so two
//! scans of an unmodified corpus return identical sequences, which the
//! positional write-back depends on.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::classify;

/// Where a scanned line came from: owning document plus 1-based line number.
///
/// Valid only against the document state at scan time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRef {
    pub path: PathBuf,
    pub line: usize,
}

impl std::fmt::Display for LineRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.line)
    }
}

/// Result of a corpus scan: vocabulary lines and their origins, index-aligned.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub lines: Vec<String>,
    pub refs: Vec<LineRef>,
}

/// An in-memory document, mutated one line at a time and persisted whole.
///
/// Line count never changes across edits: annotation is a same-line
/// replacement, not an insertion or deletion.
#[derive(Debug)]
pub struct Document {
    path: PathBuf,
    lines: Vec<String>,
    trailing_newline: bool,
}

impl Document {
    /// Load a document, splitting it into lines without their terminators.
    pub fn load(path: &Path) -> Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let trailing_newline = text.ends_with('\n');
        let lines = text.lines().map(str::to_string).collect();
        Ok(Self {
            path: path.to_path_buf(),
            lines,
            trailing_newline,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Fetch a line by 1-based number.
    pub fn line(&self, number: usize) -> Result<&str> {
        number
            .checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .map(String::as_str)
            .with_context(|| format!("{} has no line {number}", self.path.display()))
    }

    /// Replace a line by 1-based number, keeping every other line untouched.
    pub fn replace_line(&mut self, number: usize, content: String) -> Result<()> {
        let path = self.path.clone();
        let slot = number
            .checked_sub(1)
            .and_then(|idx| self.lines.get_mut(idx))
            .with_context(|| format!("{} has no line {number}", path.display()))?;
        *slot = content;
        Ok(())
    }

    /// Write the document back, restoring the terminator on every line.
    pub fn persist(&self) -> Result<()> {
        let mut text = self.lines.join("\n");
        if self.trailing_newline && !self.lines.is_empty() {
            text.push('\n');
        }
        fs::write(&self.path, text).with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }
}

/// List the corpus documents in lexicographic name order.
pub fn corpus_documents(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).with_context(|| format!("read corpus {}", dir.display()))?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("read corpus {}", dir.display()))?;
        let path = entry.path();
        if path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Scan the corpus for lines matched by `matcher`, trimming each matched line
/// and recording where it came from. The two output sequences stay
/// index-aligned by construction.
pub fn scan_matching(
    dir: &Path,
    extension: &str,
    matcher: impl Fn(&str) -> bool,
) -> Result<ScanOutcome> {
    let mut outcome = ScanOutcome::default();
    for path in corpus_documents(dir, extension)? {
        let document = Document::load(&path)?;
        for (idx, line) in document.lines().iter().enumerate() {
            if matcher(line) {
                outcome.lines.push(line.trim().to_string());
                outcome.refs.push(LineRef {
                    path: path.clone(),
                    line: idx + 1,
                });
            }
        }
    }
    tracing::debug!(
        matched = outcome.lines.len(),
        corpus = %dir.display(),
        "corpus scan complete"
    );
    Ok(outcome)
}

/// Scan the corpus for vocabulary lines that still lack pinyin.
pub fn scan(dir: &Path, extension: &str) -> Result<ScanOutcome> {
    scan_matching(dir, extension, classify::needs_annotation)
}
