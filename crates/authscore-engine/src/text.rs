//! Text helpers shared by the comment and vision analyzers.

/// Unicode blocks treated as emoji pictographs.
const EMOJI_RANGES: &[(u32, u32)] = &[
    (0x1F600, 0x1F64F), // emoticons
    (0x1F300, 0x1F5FF), // symbols & pictographs (includes skin tones)
    (0x1F680, 0x1F6FF), // transport & map
    (0x1F1E6, 0x1F1FF), // regional indicators (flags)
    (0x1F900, 0x1F9FF), // supplemental symbols & pictographs
    (0x1FA70, 0x1FAFF), // symbols & pictographs extended-A
    (0x2600, 0x26FF),   // misc symbols
    (0x2700, 0x27BF),   // dingbats
    (0x2B50, 0x2B55),   // stars and circles
];

const ZERO_WIDTH_JOINER: char = '\u{200D}';
const VARIATION_SELECTOR_16: char = '\u{FE0F}';

pub(crate) fn is_pictograph(c: char) -> bool {
    let cp = u32::from(c);
    EMOJI_RANGES
        .iter()
        .any(|&(lo, hi)| (lo..=hi).contains(&cp))
}

/// Pictographs plus the invisible characters that glue emoji sequences.
pub(crate) fn is_emoji_component(c: char) -> bool {
    is_pictograph(c) || c == ZERO_WIDTH_JOINER || c == VARIATION_SELECTOR_16
}

/// True when the trimmed text is made only of emoji (whitespace between them
/// is allowed) and contains at least one pictograph.
pub(crate) fn is_emoji_only(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_whitespace() || is_emoji_component(c))
        && trimmed.chars().any(is_pictograph)
}

/// Canonical form used to group duplicate comments.
///
/// Lowercases, collapses whitespace, and drops everything that is not
/// alphanumeric, emoji, or a single separating space.
pub(crate) fn normalize_for_duplicates(text: &str) -> String {
    let collapsed = collapse_whitespace(&text.trim().to_lowercase());
    let kept: String = collapsed
        .chars()
        .filter(|&c| c.is_alphanumeric() || is_emoji_component(c) || c == ' ')
        .collect();
    collapse_whitespace(&kept)
}

/// Canonical form compared against the generic-token list: lowercase with
/// leading and trailing non-alphanumerics (punctuation, emoji) removed.
pub(crate) fn normalize_for_generic(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    collapse_whitespace(lowered.trim_matches(|c: char| !c.is_alphanumeric()))
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-insensitive substring test. An empty needle never matches.
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    !needle.is_empty() && haystack.to_lowercase().contains(&needle)
}

/// Words from all texts, deduplicated case-insensitively, first spelling and
/// first-seen order preserved.
pub(crate) fn unique_words<'a, I>(texts: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = std::collections::HashSet::new();
    let mut words = Vec::new();
    for text in texts {
        for word in text.split_whitespace() {
            if seen.insert(word.to_lowercase()) {
                words.push(word.to_string());
            }
        }
    }
    words
}
