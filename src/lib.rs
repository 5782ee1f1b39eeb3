//! Core of the `pnotes` annotation workflow.
//!
//! The pipeline: scan a corpus of note files for Chinese vocabulary lines
//! lacking pinyin, assemble a prompt for an external language model, and
//! write the annotated lines back at their exact original positions. The
//! oracle is an injected port; the ambiguity resolver of the legacy token
//! strategy is another. Everything path-shaped comes in through [`config`].

pub mod audit;
pub mod backup;
pub mod classify;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod oracle;
pub mod prompt;
pub mod reconcile;
