//! Run configuration.
//!
//! Everything path-shaped lives in an explicit [`Config`] handed to each
//! component, never in process-wide state. A config file is optional; CLI
//! flags override whatever it provides.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Pointers the run needs: where the notes live, where backups and the audit
/// log go, and which file extension marks a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub schema_version: u32,

    /// Directory of note documents to scan and annotate.
    pub corpus_dir: PathBuf,

    /// Directory receiving pre-run copies of documents about to change.
    pub backup_dir: PathBuf,

    /// Append-only audit log destination.
    pub audit_log: PathBuf,

    /// Document extension filter, without the leading dot.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Optional external LM command line; when unset, responses are pasted
    /// interactively.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lm_command: Option<String>,
}

fn default_extension() -> String {
    "md".to_string()
}

/// Build the default config rooted under the user's data directory.
pub fn default_config(corpus_dir: PathBuf) -> Config {
    let data_root = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pinyin-notes");
    Config {
        schema_version: CONFIG_SCHEMA_VERSION,
        corpus_dir,
        backup_dir: data_root.join("bak"),
        audit_log: data_root.join("change_log.log"),
        extension: default_extension(),
        lm_command: None,
    }
}

/// Render a pretty JSON config stub for first-time setup.
pub fn config_stub(corpus_dir: PathBuf) -> Result<String> {
    let config = default_config(corpus_dir);
    serde_json::to_string_pretty(&config).context("serialize config stub")
}

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<Config> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: Config = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse config JSON {}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Persist a config in a stable JSON format.
pub fn write_config(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(config).context("serialize config")?;
    fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Validate schema and required fields.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported config schema_version {}",
            config.schema_version
        ));
    }
    if config.extension.trim().is_empty() || config.extension.starts_with('.') {
        return Err(anyhow!(
            "extension must be non-empty without a leading dot (got {:?})",
            config.extension
        ));
    }
    if config.corpus_dir.as_os_str().is_empty() {
        return Err(anyhow!("corpus_dir must be set"));
    }
    Ok(())
}
