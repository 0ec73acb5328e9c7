//! Parsing of free-text model replies into link values.

/// Characters stripped from both ends of each list segment.
fn is_segment_noise(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\'' | '"' | '[' | ']')
}

/// Trim a reply and remove one surrounding pair of matching quotes.
///
/// Only a matching pair is removed: `"x"` and `'x'` lose their quotes,
/// `"x'` is left alone.
pub fn strip_matching_quotes(reply: &str) -> &str {
    let trimmed = reply.trim();
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}

/// Split a model's link-list reply into individual link strings.
///
/// Segments are separated by commas or newlines. Surrounding whitespace,
/// quotes, and list brackets are dropped from every segment, and empty
/// segments are skipped. Order and duplicates are preserved.
pub fn parse_url_list(reply: &str) -> Vec<String> {
    reply
        .split([',', '\n'])
        .map(|segment| segment.trim_matches(is_segment_noise))
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}
