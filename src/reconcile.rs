//! Write-back of annotated lines into their originating documents.
//!
//! The positional strategy is the primary one: the oracle's i-th output line
//! lands at the i-th positional reference from the scan. The only integrity
//! check is the up-front count comparison; an order-preserving reordering by
//! the oracle is undetectable, which is why the prompt states the contract
//! so explicitly.

pub mod token;

use anyhow::{bail, Context, Result};

use crate::audit::AuditLog;
use crate::classify;
use crate::corpus::{Document, LineRef};

/// Split a line into its indentation prefix and content.
///
/// Indentation is the leading run of characters that are neither letters nor
/// Han characters: whitespace, list markers, numbering, punctuation. It is
/// recaptured from the document at write-back time so structural formatting
/// survives annotation even if the oracle dropped it.
pub fn split_indentation(line: &str) -> (&str, &str) {
    let content_start = line
        .char_indices()
        .find(|(_, ch)| ch.is_alphabetic() || classify::is_han(*ch))
        .map(|(idx, _)| idx)
        .unwrap_or(line.len());
    line.split_at(content_start)
}

/// Apply the oracle's annotated lines back onto the corpus, one positional
/// reference at a time.
///
/// The count precondition is checked before any write, so a mismatch leaves
/// every document untouched. After that there is no rollback: a failure at
/// reference k leaves references 0..k committed, recoverable only via the
/// pre-run backup.
pub fn apply(oracle_lines: &[String], refs: &[LineRef], audit: &AuditLog) -> Result<()> {
    if oracle_lines.len() != refs.len() {
        audit.record(&format!(
            "Count mismatch: {} oracle lines vs {} references; no documents changed",
            oracle_lines.len(),
            refs.len()
        ))?;
        for (idx, line) in oracle_lines.iter().enumerate() {
            audit.record_raw(&format!("  oracle[{idx}]: {line}\n"))?;
        }
        for (idx, reference) in refs.iter().enumerate() {
            audit.record_raw(&format!("  ref[{idx}]: {reference}\n"))?;
        }
        bail!(
            "oracle returned {} lines but the scan produced {} references",
            oracle_lines.len(),
            refs.len()
        );
    }

    for (oracle_line, reference) in oracle_lines.iter().zip(refs) {
        // Fresh read per reference tolerates earlier writes to other lines
        // of the same document within this run.
        let mut document = Document::load(&reference.path)?;
        let current = document
            .line(reference.line)
            .with_context(|| format!("stale reference {reference}"))?
            .to_string();
        let (indentation, _) = split_indentation(&current);
        let (_, body) = split_indentation(oracle_line);
        let replacement = format!("{indentation}{body}");

        document.replace_line(reference.line, replacement.clone())?;
        document.persist()?;

        tracing::debug!(reference = %reference, "annotated line");
        audit.record(&format!(
            "Replaced line {} of {}: '{}' -> '{}'",
            reference.line,
            reference.path.display(),
            current,
            replacement
        ))?;
    }
    Ok(())
}
