//! Prompt assembly for the external language model.
//!
//! The annotation preamble is load-bearing: it states the response contract
//! (one output line per input line, same order, same count, no merges or
//! splits) that the positional reconciler relies on. The reconciler can only
//! verify the count, so the wording here is the rest of the defense.

/// Instructional preamble for the annotation request.
const ANNOTATE_PREAMBLE: &str = "\
Add the pinyin in parentheses next to the chinese words for each vocabulary line.
The format should be:
- {chinese_characters} ({pinyin}): {english_translation}
Do not change the existing English translation!
Return exactly one output line per input line, in the same order, with the
same total count. Do not merge, split, reorder, or deduplicate lines.";

/// Instructional preamble for the self-test request.
const QUIZ_PREAMBLE: &str = "\
Below is my vocabulary list that I want to test myself on.
Select 50 vocabulary lines randomly and prompt me only with the English part
such that I need to recollect the Chinese translation.
The order of the English prompts should be shuffled.
The test should be in the form of
1. It's 22 dec today
2. Christmas is coming soon
3. To review
4. ...
Do not ask me the same prompts more than once.";

/// Build the annotation request payload: preamble, one vocabulary line per
/// line, trailing count.
pub fn annotation_prompt(lines: &[String]) -> String {
    build(ANNOTATE_PREAMBLE, "Consolidated Chinese vocabulary (without pinyin):", lines)
}

/// Build the self-test request payload over the full vocabulary list.
pub fn quiz_prompt(lines: &[String]) -> String {
    build(QUIZ_PREAMBLE, "Chinese vocabulary:", lines)
}

fn build(preamble: &str, heading: &str, lines: &[String]) -> String {
    let mut out = String::new();
    out.push_str(preamble);
    out.push_str("\n\n");
    out.push_str(heading);
    out.push('\n');
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&format!("\nTotal number of vocabulary: {}\n", lines.len()));
    out
}
