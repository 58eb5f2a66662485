//! Placeholder artwork keywords

/// Keyword count used for catalog cards.
pub const CARD_KEYWORD_LIMIT: usize = 3;

const FALLBACK_KEYWORD: &str = "abstract";

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "in", "on", "how", "to", "and", "for", "of", "your", "with", "own",
    "he's", "from", "at", "night", "everyone",
];

/// Derive up to `limit` comma-separated search keywords from a guide title.
///
/// The title is lowercased and stripped of everything but ASCII letters and spaces; stop words
/// and words of two letters or fewer are dropped. Falls back to `abstract`.
pub fn placeholder_keywords(title: &str, limit: usize) -> String {
    let cleaned: String = title
        .to_lowercase()
        .chars()
        .filter(|ch| ch.is_ascii_lowercase() || *ch == ' ')
        .collect();

    let keywords: Vec<&str> = cleaned
        .split(' ')
        .filter(|word| word.len() > 2 && !STOP_WORDS.contains(word))
        .take(limit)
        .collect();

    if keywords.is_empty() {
        FALLBACK_KEYWORD.to_string()
    } else {
        keywords.join(",")
    }
}

/// Placeholder image URL for the given keywords and size.
pub fn placeholder_url(keywords: &str, width: u32, height: u32) -> String {
    format!("https://source.unsplash.com/{width}x{height}/?{keywords}")
}
