//! Pre-run backup of documents about to be annotated.
//!
//! The reconciler has no rollback: a failure partway through a run leaves
//! some documents annotated and others not. The backup taken here is the
//! documented recovery path, restored wholesale by `revert`.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::corpus::LineRef;

/// Copy every document referenced at least once into the backup directory.
/// Returns the backed-up paths in stable order.
pub fn back_up_referenced(backup_dir: &Path, refs: &[LineRef]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(backup_dir)
        .with_context(|| format!("create backup dir {}", backup_dir.display()))?;

    let unique: BTreeSet<&PathBuf> = refs.iter().map(|r| &r.path).collect();
    let mut copied = Vec::new();
    for source in unique {
        let name = source
            .file_name()
            .with_context(|| format!("backup source has no file name: {}", source.display()))?;
        let dest = backup_dir.join(name);
        fs::copy(source, &dest)
            .with_context(|| format!("back up {} to {}", source.display(), dest.display()))?;
        copied.push(source.clone());
    }
    tracing::info!(documents = copied.len(), backup = %backup_dir.display(), "backup complete");
    Ok(copied)
}

/// Copy every file in the backup directory back into the corpus. Returns the
/// restored file names in stable order.
pub fn revert(backup_dir: &Path, corpus_dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(backup_dir)
        .with_context(|| format!("read backup dir {}", backup_dir.display()))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("read backup dir {}", backup_dir.display()))?;
        let path = entry.path();
        if path.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    for name in &names {
        let source = backup_dir.join(name);
        let dest = corpus_dir.join(name);
        fs::copy(&source, &dest)
            .with_context(|| format!("restore {} to {}", source.display(), dest.display()))?;
    }
    tracing::info!(documents = names.len(), "revert complete");
    Ok(names)
}
