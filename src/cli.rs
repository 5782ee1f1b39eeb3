//! CLI argument parsing for the annotation workflow.
//!
//! The CLI is intentionally thin: it resolves a config and routes to the
//! core, so the same scan/reconcile logic can be driven from tests without a
//! terminal.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint for the vocabulary annotation workflow.
#[derive(Parser, Debug)]
#[command(
    name = "pnotes",
    version,
    about = "Annotate Chinese vocabulary notes with pinyin via an external LM",
    after_help = "Commands:\n  scan      List vocabulary lines still lacking pinyin (read-only)\n  annotate  Scan, prompt the LM, and write annotations back in place\n  quiz      Emit a self-test prompt over the full vocabulary list\n  revert    Restore every document from the pre-run backup\n\nExamples:\n  pnotes scan --path ~/notes/journals\n  pnotes annotate --path ~/notes/journals\n  pnotes annotate --path ~/notes/journals --by-token\n  pnotes annotate --path ~/notes/journals --lm-command 'claude --print'\n  pnotes quiz --path ~/notes/journals\n  pnotes revert --path ~/notes/journals",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level workflow commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    Scan(ScanArgs),
    Annotate(AnnotateArgs),
    Quiz(QuizArgs),
    Revert(RevertArgs),
}

/// Options shared by every command that touches the corpus.
#[derive(Parser, Debug)]
pub struct CorpusArgs {
    /// Directory containing the note documents
    #[arg(long, value_name = "DIR")]
    pub path: PathBuf,

    /// Optional JSON config file; CLI flags override its values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Document extension filter (without the leading dot)
    #[arg(long, value_name = "EXT")]
    pub extension: Option<String>,

    /// Audit log destination
    #[arg(long, value_name = "FILE")]
    pub audit_log: Option<PathBuf>,

    /// Backup directory for pre-run document copies
    #[arg(long, value_name = "DIR")]
    pub backup_dir: Option<PathBuf>,
}

/// Scan command inputs (read-only consolidation).
#[derive(Parser, Debug)]
#[command(about = "List vocabulary lines still lacking pinyin")]
pub struct ScanArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,
}

/// Annotate command inputs for the full scan-prompt-reconcile flow.
#[derive(Parser, Debug)]
#[command(about = "Annotate vocabulary lines with pinyin from the LM")]
pub struct AnnotateArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// External LM command; when omitted, the prompt is printed and the
    /// response pasted back interactively
    #[arg(long, value_name = "CMD")]
    pub lm_command: Option<String>,

    /// Use the legacy token-substitution write-back instead of positional
    #[arg(long)]
    pub by_token: bool,
}

/// Quiz command inputs for the self-test prompt.
#[derive(Parser, Debug)]
#[command(about = "Emit a vocabulary self-test prompt")]
pub struct QuizArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,
}

/// Revert command inputs for restoring the pre-run backup.
#[derive(Parser, Debug)]
#[command(about = "Restore documents from the backup directory")]
pub struct RevertArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,
}
