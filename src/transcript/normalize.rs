//! Transcript cleanup applied to whatever text an extractor returns.
//!
//! The annotation filter removes every `[...]` and `(...)` span. That strips cues such
//! as `[Music]` or `(laughs)` but also any parenthetical the speaker actually said; it
//! is a best-effort filter, not a parse.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern must compile"));

static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]").expect("bracket pattern must compile"));

static PARENTHESIZED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(.*?\)").expect("parenthesis pattern must compile"));

static DOUBLE_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("space pattern must compile"));

static SPACE_BEFORE_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+([,.!?])").expect("punctuation pattern must compile"));

const SENTENCE_BREAK: &str = ". ";

/// Normalize raw transcript text into a single readable paragraph
pub fn normalize(text: &str) -> String {
    let collapsed = WHITESPACE.replace_all(text, " ");

    let without_brackets = BRACKETED.replace_all(&collapsed, "");
    let without_annotations = PARENTHESIZED.replace_all(&without_brackets, "");
    let without_annotations = DOUBLE_SPACE.replace_all(&without_annotations, " ");

    let punctuated = SPACE_BEFORE_PUNCT.replace_all(&without_annotations, "$1");

    punctuated
        .split(SENTENCE_BREAK)
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(SENTENCE_BREAK)
        .trim()
        .to_string()
}

fn capitalize_first(sentence: &str) -> String {
    let mut chars = sentence.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Number of whitespace-delimited words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Number of characters (Unicode scalar values)
pub fn character_count(text: &str) -> usize {
    text.chars().count()
}
