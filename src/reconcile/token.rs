//! Legacy token-substitution write-back.
//!
//! Instead of positional alignment, this strategy maps each vocabulary token
//! to its annotated form and substitutes the token wherever it appears as a
//! whole word across the corpus. Token matching can misfire across unrelated
//! lines sharing a substring, so when a token matches more than once the
//! decision is handed to an [`AmbiguityResolver`] rather than guessed.

use anyhow::{Context, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::Path;

use crate::audit::AuditLog;
use crate::classify;
use crate::corpus::{self, Document};

/// Token -> annotated replacement, e.g. `你好` -> `你好 (nǐ hǎo)`.
///
/// Keys are unique per pass; a later duplicate token overwrites the earlier
/// entry. Ordered so substitution (and the audit trail) is deterministic.
pub type AnnotationMapping = BTreeMap<String, String>;

/// What to do about a token that matched more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Replace only the candidate at this 1-based index.
    Replace(usize),
    /// Replace every candidate.
    ReplaceAll,
    /// Leave every candidate unchanged.
    Skip,
}

/// One candidate occurrence: 1-based line number and the trimmed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub line: usize,
    pub content: String,
}

/// Decision port for ambiguous matches. A CLI supplies a terminal prompt;
/// tests supply a script.
pub trait AmbiguityResolver {
    fn resolve(&mut self, token: &str, candidates: &[Candidate]) -> Result<Directive>;
}

/// Parse oracle output lines of the form `token (pinyin): gloss` into an
/// annotation mapping. Lines without a `:` separator are ignored; the
/// replacement is everything before the separator, the token its lead run
/// before the first space.
pub fn parse_mapping(lines: &[String]) -> AnnotationMapping {
    let mut mapping = AnnotationMapping::new();
    for line in lines {
        let Some((head, _gloss)) = line.split_once(':') else {
            continue;
        };
        let replacement = head.trim();
        let Some(token) = replacement.split(' ').next().filter(|t| !t.is_empty()) else {
            continue;
        };
        mapping.insert(token.to_string(), replacement.to_string());
    }
    mapping
}

/// Word characters for boundary purposes: Latin letters, digits, underscore.
/// Han characters deliberately count as non-word so a token matches inside a
/// run of Chinese text.
fn is_word_char(ch: char) -> bool {
    ch == '_' || (ch.is_alphanumeric() && !classify::is_han(ch))
}

/// Byte ranges of whole-word occurrences of `token` in `line`.
fn whole_word_ranges(pattern: &Regex, line: &str) -> Vec<(usize, usize)> {
    pattern
        .find_iter(line)
        .filter(|m| {
            let before_ok = line[..m.start()].chars().next_back().is_none_or(|ch| !is_word_char(ch));
            let after_ok = line[m.end()..].chars().next().is_none_or(|ch| !is_word_char(ch));
            before_ok && after_ok
        })
        .map(|m| (m.start(), m.end()))
        .collect()
}

/// Replace every whole-word occurrence of the pattern in `line`.
fn replace_whole_word(pattern: &Regex, line: &str, replacement: &str) -> String {
    let ranges = whole_word_ranges(pattern, line);
    let mut out = String::with_capacity(line.len());
    let mut cursor = 0;
    for (start, end) in ranges {
        out.push_str(&line[cursor..start]);
        out.push_str(replacement);
        cursor = end;
    }
    out.push_str(&line[cursor..]);
    out
}

fn token_pattern(token: &str) -> Result<Regex> {
    Regex::new(&regex::escape(token)).with_context(|| format!("compile pattern for {token:?}"))
}

/// Apply the mapping across the corpus, one document at a time.
///
/// Zero matches for a token is a silent no-op; exactly one match replaces
/// unconditionally; two or more block on the resolver. Every replacement and
/// every directive is audited.
pub fn apply_by_token(
    mapping: &AnnotationMapping,
    corpus_dir: &Path,
    extension: &str,
    resolver: &mut dyn AmbiguityResolver,
    audit: &AuditLog,
) -> Result<()> {
    for path in corpus::corpus_documents(corpus_dir, extension)? {
        let mut document = Document::load(&path)?;
        let mut dirty = false;

        for (token, replacement) in mapping {
            let pattern = token_pattern(token)?;
            let candidates: Vec<Candidate> = document
                .lines()
                .iter()
                .enumerate()
                .flat_map(|(idx, line)| {
                    whole_word_ranges(&pattern, line)
                        .into_iter()
                        .map(move |_| Candidate {
                            line: idx + 1,
                            content: line.trim().to_string(),
                        })
                })
                .collect();

            match candidates.len() {
                0 => {}
                1 => {
                    replace_candidate(&mut document, &pattern, &candidates[0], replacement)?;
                    dirty = true;
                    audit.record(&format!(
                        "Replaced '{}' with '{}' in {}, line {}",
                        token,
                        replacement,
                        path.display(),
                        candidates[0].line
                    ))?;
                }
                _ => {
                    audit.record(&format!(
                        "Multiple matches for '{}' in file {}:",
                        token,
                        path.display()
                    ))?;
                    for (idx, candidate) in candidates.iter().enumerate() {
                        audit.record_raw(&format!(
                            "{}) Line {}: {}\n",
                            idx + 1,
                            candidate.line,
                            candidate.content
                        ))?;
                    }
                    match resolver.resolve(token, &candidates)? {
                        Directive::Replace(choice) => {
                            let candidate = choice
                                .checked_sub(1)
                                .and_then(|idx| candidates.get(idx))
                                .with_context(|| {
                                    format!("directive index {choice} out of range")
                                })?;
                            replace_candidate(&mut document, &pattern, candidate, replacement)?;
                            dirty = true;
                            audit.record(&format!(
                                "Replaced '{}' with '{}' in {}, line {}",
                                token,
                                replacement,
                                path.display(),
                                candidate.line
                            ))?;
                        }
                        Directive::ReplaceAll => {
                            for candidate in &candidates {
                                replace_candidate(
                                    &mut document,
                                    &pattern,
                                    candidate,
                                    replacement,
                                )?;
                            }
                            dirty = true;
                            audit.record(&format!(
                                "Replaced all instances of '{}' with '{}' in {}",
                                token,
                                replacement,
                                path.display()
                            ))?;
                        }
                        Directive::Skip => {
                            audit.record(&format!("Skipped '{token}' as per user's choice"))?;
                        }
                    }
                }
            }
        }

        if dirty {
            document.persist()?;
        }
    }
    Ok(())
}

fn replace_candidate(
    document: &mut Document,
    pattern: &Regex,
    candidate: &Candidate,
    replacement: &str,
) -> Result<()> {
    let line = document.line(candidate.line)?.to_string();
    let updated = replace_whole_word(pattern, &line, replacement);
    document.replace_line(candidate.line, updated)
}

/// Terminal-backed resolver: prints the candidates and re-prompts until it
/// reads a valid directive. Invalid input never consumes a match.
pub struct PromptResolver<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptResolver<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> AmbiguityResolver for PromptResolver<R, W> {
    fn resolve(&mut self, token: &str, candidates: &[Candidate]) -> Result<Directive> {
        writeln!(self.output, "Multiple matches for '{token}':").context("print candidates")?;
        for (idx, candidate) in candidates.iter().enumerate() {
            writeln!(
                self.output,
                "{}) Line {}: {}",
                idx + 1,
                candidate.line,
                candidate.content
            )
            .context("print candidates")?;
        }
        loop {
            write!(
                self.output,
                "Enter the number to replace, 'a' for all, or 's' to skip: "
            )
            .context("print disambiguation prompt")?;
            self.output.flush().context("flush disambiguation prompt")?;

            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .context("read disambiguation choice")?;
            if read == 0 {
                anyhow::bail!("end of input while awaiting disambiguation for '{token}'");
            }
            match parse_directive(line.trim(), candidates.len()) {
                Some(directive) => return Ok(directive),
                None => {
                    writeln!(self.output, "Invalid input, please try again.")
                        .context("print retry notice")?;
                }
            }
        }
    }
}

fn parse_directive(input: &str, candidate_count: usize) -> Option<Directive> {
    match input.to_ascii_lowercase().as_str() {
        "a" => Some(Directive::ReplaceAll),
        "s" => Some(Directive::Skip),
        other => match other.parse::<usize>() {
            Ok(choice) if (1..=candidate_count).contains(&choice) => {
                Some(Directive::Replace(choice))
            }
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    struct Scripted(Vec<Directive>);

    impl AmbiguityResolver for Scripted {
        fn resolve(&mut self, _token: &str, _candidates: &[Candidate]) -> Result<Directive> {
            Ok(self.0.remove(0))
        }
    }

    fn audit_in(dir: &Path) -> AuditLog {
        AuditLog::new(dir.join("change_log.log"))
    }

    fn mapping_of(pairs: &[(&str, &str)]) -> AnnotationMapping {
        pairs
            .iter()
            .map(|(token, replacement)| (token.to_string(), replacement.to_string()))
            .collect()
    }

    #[test]
    fn parse_mapping_extracts_token_and_replacement() {
        let lines = vec![
            "你好 (nǐ hǎo): hello".to_string(),
            "no separator here".to_string(),
            "做饭 (zuò fàn): to cook".to_string(),
        ];
        let mapping = parse_mapping(&lines);
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping["你好"], "你好 (nǐ hǎo)");
        assert_eq!(mapping["做饭"], "做饭 (zuò fàn)");
    }

    #[test]
    fn parse_mapping_later_duplicates_overwrite() {
        let lines = vec![
            "你好 (ni hao): hi".to_string(),
            "你好 (nǐ hǎo): hello".to_string(),
        ];
        let mapping = parse_mapping(&lines);
        assert_eq!(mapping["你好"], "你好 (nǐ hǎo)");
    }

    #[test]
    fn whole_word_boundary_treats_han_as_non_word() {
        let pattern = token_pattern("做饭").unwrap();
        // Surrounded by Han text still counts as a whole-word match.
        assert_eq!(whole_word_ranges(&pattern, "我喜欢做饭因为好吃").len(), 1);
        // Adjacent Latin word characters suppress the match.
        assert!(whole_word_ranges(&pattern, "abc做饭").is_empty());
        assert!(whole_word_ranges(&pattern, "做饭123").is_empty());
        // Punctuation and whitespace are boundaries.
        assert_eq!(whole_word_ranges(&pattern, "- 做饭: to cook").len(), 1);
    }

    #[test]
    fn single_match_replaces_unconditionally() {
        let tmp = TempDir::new().unwrap();
        let note = tmp.path().join("note.md");
        fs::write(&note, "- 做饭: to cook\n- plain line\n").unwrap();

        let mut resolver = Scripted(Vec::new());
        apply_by_token(
            &mapping_of(&[("做饭", "做饭 (zuò fàn)")]),
            tmp.path(),
            "md",
            &mut resolver,
            &audit_in(tmp.path()),
        )
        .unwrap();

        assert_eq!(
            fs::read_to_string(&note).unwrap(),
            "- 做饭 (zuò fàn): to cook\n- plain line\n"
        );
    }

    #[test]
    fn zero_matches_is_a_silent_noop() {
        let tmp = TempDir::new().unwrap();
        let note = tmp.path().join("note.md");
        fs::write(&note, "- nothing relevant\n").unwrap();
        let audit = audit_in(tmp.path());

        let mut resolver = Scripted(Vec::new());
        apply_by_token(
            &mapping_of(&[("做饭", "做饭 (zuò fàn)")]),
            tmp.path(),
            "md",
            &mut resolver,
            &audit,
        )
        .unwrap();

        assert_eq!(fs::read_to_string(&note).unwrap(), "- nothing relevant\n");
        assert!(!audit.path().exists());
    }

    #[test]
    fn ambiguous_replace_all_updates_every_line() {
        let tmp = TempDir::new().unwrap();
        let note = tmp.path().join("note.md");
        fs::write(&note, "- 做饭: to cook\n- 我想做饭。\n").unwrap();

        let mut resolver = Scripted(vec![Directive::ReplaceAll]);
        apply_by_token(
            &mapping_of(&[("做饭", "做饭 (zuò fàn)")]),
            tmp.path(),
            "md",
            &mut resolver,
            &audit_in(tmp.path()),
        )
        .unwrap();

        assert_eq!(
            fs::read_to_string(&note).unwrap(),
            "- 做饭 (zuò fàn): to cook\n- 我想做饭 (zuò fàn)。\n"
        );
    }

    #[test]
    fn ambiguous_skip_leaves_everything_unchanged() {
        let tmp = TempDir::new().unwrap();
        let note = tmp.path().join("note.md");
        let before = "- 做饭: to cook\n- 我想做饭。\n";
        fs::write(&note, before).unwrap();

        let mut resolver = Scripted(vec![Directive::Skip]);
        apply_by_token(
            &mapping_of(&[("做饭", "做饭 (zuò fàn)")]),
            tmp.path(),
            "md",
            &mut resolver,
            &audit_in(tmp.path()),
        )
        .unwrap();

        assert_eq!(fs::read_to_string(&note).unwrap(), before);
    }

    #[test]
    fn ambiguous_numeric_choice_replaces_only_that_occurrence() {
        let tmp = TempDir::new().unwrap();
        let note = tmp.path().join("note.md");
        fs::write(&note, "- 做饭: to cook\n- 我想做饭。\n").unwrap();

        let mut resolver = Scripted(vec![Directive::Replace(1)]);
        apply_by_token(
            &mapping_of(&[("做饭", "做饭 (zuò fàn)")]),
            tmp.path(),
            "md",
            &mut resolver,
            &audit_in(tmp.path()),
        )
        .unwrap();

        assert_eq!(
            fs::read_to_string(&note).unwrap(),
            "- 做饭 (zuò fàn): to cook\n- 我想做饭。\n"
        );
    }

    #[test]
    fn prompt_resolver_reprompts_on_invalid_input() {
        let candidates = vec![
            Candidate {
                line: 1,
                content: "- 做饭: to cook".to_string(),
            },
            Candidate {
                line: 2,
                content: "- 我想做饭。".to_string(),
            },
        ];
        // "9" is out of range, "x" is nonsense, "2" finally valid.
        let mut resolver = PromptResolver::new(Cursor::new("9\nx\n2\n"), Vec::new());
        let directive = resolver.resolve("做饭", &candidates).unwrap();
        assert_eq!(directive, Directive::Replace(2));

        let printed = String::from_utf8(resolver.output).unwrap();
        assert_eq!(printed.matches("Invalid input").count(), 2);
    }

    #[test]
    fn prompt_resolver_accepts_all_and_skip() {
        let candidates = vec![
            Candidate {
                line: 1,
                content: "x".to_string(),
            },
            Candidate {
                line: 2,
                content: "y".to_string(),
            },
        ];
        let mut resolver = PromptResolver::new(Cursor::new("A\n"), Vec::new());
        assert_eq!(
            resolver.resolve("t", &candidates).unwrap(),
            Directive::ReplaceAll
        );
        let mut resolver = PromptResolver::new(Cursor::new("s\n"), Vec::new());
        assert_eq!(resolver.resolve("t", &candidates).unwrap(), Directive::Skip);
    }

    #[test]
    fn prompt_resolver_errors_on_eof() {
        let candidates = vec![Candidate {
            line: 1,
            content: "x".to_string(),
        }];
        let mut resolver = PromptResolver::new(Cursor::new(""), Vec::new());
        assert!(resolver.resolve("t", &candidates).is_err());
    }

    #[test]
    fn audit_records_directives_and_replacements() {
        let tmp = TempDir::new().unwrap();
        let note = tmp.path().join("note.md");
        fs::write(&note, "- 做饭: to cook\n- 我想做饭。\n").unwrap();
        let audit = audit_in(tmp.path());

        let mut resolver = Scripted(vec![Directive::ReplaceAll]);
        apply_by_token(
            &mapping_of(&[("做饭", "做饭 (zuò fàn)")]),
            tmp.path(),
            "md",
            &mut resolver,
            &audit,
        )
        .unwrap();

        let log = fs::read_to_string(audit.path()).unwrap();
        assert!(log.contains("Multiple matches for '做饭'"));
        assert!(log.contains("Replaced all instances of '做饭'"));
    }
}
