//! Free-text note extraction

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn emoji_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\p{Emoji_Presentation}|\p{Extended_Pictographic}")
            .expect("emoji pattern is valid")
    })
}

/// Distinct emoji in order of first appearance
pub fn extract_emojis(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    emoji_pattern()
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|emoji| seen.insert(*emoji))
        .map(str::to_string)
        .collect()
}

/// Non-empty notes, in the order given
pub fn collect_notes<'a, I>(notes: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    notes
        .into_iter()
        .filter(|note| !note.is_empty())
        .map(str::to_string)
        .collect()
}

/// The first emoji of every note that has one
pub fn leading_emojis<'a, I>(notes: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    notes
        .into_iter()
        .filter_map(|note| extract_emojis(note).into_iter().next())
        .collect()
}
