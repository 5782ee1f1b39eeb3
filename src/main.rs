use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pinyin_notes::audit::AuditLog;
use pinyin_notes::cli::{AnnotateArgs, Command, CorpusArgs, QuizArgs, RevertArgs, RootArgs, ScanArgs};
use pinyin_notes::config::{self, Config};
use pinyin_notes::oracle::{self, CommandOracle, Oracle};
use pinyin_notes::reconcile::token::{self, PromptResolver};
use pinyin_notes::{backup, classify, corpus, prompt, reconcile};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = RootArgs::parse();
    let outcome = match cli.command {
        Command::Scan(args) => cmd_scan(args),
        Command::Annotate(args) => cmd_annotate(args),
        Command::Quiz(args) => cmd_quiz(args),
        Command::Revert(args) => cmd_revert(args),
    };

    if let Err(err) = outcome {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

/// Build the run config from an optional config file plus CLI overrides.
fn resolve_config(args: &CorpusArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::default_config(args.path.clone()),
    };
    config.corpus_dir = args.path.clone();
    if let Some(extension) = &args.extension {
        config.extension = extension.clone();
    }
    if let Some(audit_log) = &args.audit_log {
        config.audit_log = audit_log.clone();
    }
    if let Some(backup_dir) = &args.backup_dir {
        config.backup_dir = backup_dir.clone();
    }
    config::validate_config(&config)?;
    Ok(config)
}

fn cmd_scan(args: ScanArgs) -> Result<()> {
    let config = resolve_config(&args.corpus)?;
    let outcome = corpus::scan(&config.corpus_dir, &config.extension)?;
    if outcome.lines.is_empty() {
        println!("No vocabulary lines without pinyin found.");
        return Ok(());
    }
    print!("{}", prompt::annotation_prompt(&outcome.lines));
    Ok(())
}

fn cmd_quiz(args: QuizArgs) -> Result<()> {
    let config = resolve_config(&args.corpus)?;
    let outcome =
        corpus::scan_matching(&config.corpus_dir, &config.extension, classify::has_han)?;
    if outcome.lines.is_empty() {
        println!("No Chinese vocabulary found.");
        return Ok(());
    }
    print!("{}", prompt::quiz_prompt(&outcome.lines));
    Ok(())
}

fn cmd_annotate(args: AnnotateArgs) -> Result<()> {
    let config = resolve_config(&args.corpus)?;
    let audit = AuditLog::new(config.audit_log.clone());

    let result = run_annotate(&args, &config, &audit);
    if let Err(err) = &result {
        // Fatal conditions are duplicated into the audit trail.
        audit
            .record(&format!("Run failed: {err:#}"))
            .context("audit run failure")?;
    }
    result
}

fn run_annotate(args: &AnnotateArgs, config: &Config, audit: &AuditLog) -> Result<()> {
    let outcome = corpus::scan(&config.corpus_dir, &config.extension)?;
    if outcome.lines.is_empty() {
        println!("No vocabulary lines without pinyin found.");
        return Ok(());
    }
    println!(
        "Found {} vocabulary lines without pinyin.",
        outcome.lines.len()
    );

    let copied = backup::back_up_referenced(&config.backup_dir, &outcome.refs)?;
    audit.record(&format!(
        "Backed up {} documents to {}",
        copied.len(),
        config.backup_dir.display()
    ))?;

    let request = prompt::annotation_prompt(&outcome.lines);
    let lm_command = args.lm_command.clone().or_else(|| config.lm_command.clone());
    let response = match lm_command {
        Some(command) => {
            tracing::info!(%command, "invoking LM command");
            CommandOracle::new(command).complete(&request)?
        }
        None => oracle::stdio_oracle().complete(&request)?,
    };
    let oracle_lines = oracle::response_lines(&response);

    if args.by_token {
        let mapping = token::parse_mapping(&oracle_lines);
        let mut resolver = PromptResolver::new(
            std::io::BufReader::new(std::io::stdin()),
            std::io::stdout(),
        );
        token::apply_by_token(
            &mapping,
            &config.corpus_dir,
            &config.extension,
            &mut resolver,
            audit,
        )?;
    } else {
        reconcile::apply(&oracle_lines, &outcome.refs, audit)?;
    }

    audit.record("Documents updated with pinyin")?;
    println!("Documents updated with pinyin.");
    Ok(())
}

fn cmd_revert(args: RevertArgs) -> Result<()> {
    let config = resolve_config(&args.corpus)?;
    let audit = AuditLog::new(config.audit_log.clone());

    let restored = backup::revert(&config.backup_dir, &config.corpus_dir)?;
    audit.record(&format!(
        "Reverted {} documents from {}",
        restored.len(),
        config.backup_dir.display()
    ))?;
    println!(
        "Reverted {} documents from {}.",
        restored.len(),
        config.backup_dir.display()
    );
    Ok(())
}
