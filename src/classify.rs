//! Line classification for the annotation scan.
//!
//! Classification is line-level only: a line that mixes annotated and
//! unannotated vocabulary counts as annotated. Per-character granularity is
//! intentionally not attempted.

/// Tone-marked vowels produced by the pinyin romanization. A line containing
/// any of these is treated as already annotated.
const TONE_MARKS: &[char] = &[
    'ā', 'á', 'ǎ', 'à', 'ē', 'é', 'ě', 'è', 'ī', 'í', 'ǐ', 'ì', 'ō', 'ó', 'ǒ', 'ò', 'ū', 'ú',
    'ǔ', 'ù', 'ǖ', 'ǘ', 'ǚ', 'ǜ',
];

/// True for characters in the CJK Unified Ideographs block.
pub fn is_han(ch: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&ch)
}

/// True iff the line contains at least one Han character.
pub fn has_han(line: &str) -> bool {
    line.chars().any(is_han)
}

/// True iff the line contains at least one pinyin tone mark.
pub fn has_tone_mark(line: &str) -> bool {
    line.chars().any(|ch| TONE_MARKS.contains(&ch))
}

/// True iff the line holds Chinese vocabulary that still lacks pinyin.
pub fn needs_annotation(line: &str) -> bool {
    has_han(line) && !has_tone_mark(line)
}
