/// Cuts `value` to at most `max_chars` characters. Returns the kept prefix
/// and whether anything was dropped.
pub fn truncate_chars(value: &str, max_chars: usize) -> (&str, bool) {
    match value.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (&value[..byte_idx], true),
        None => (value, false),
    }
}

/// Applies the response character limit, appending a notice when cut.
pub fn limit_response_text(text: String, character_limit: usize) -> String {
    let (kept, truncated) = truncate_chars(&text, character_limit);
    if !truncated {
        return text;
    }
    format!(
        "{}\n\n[Response truncated at {} characters. Use pagination (perPage/nextCursor) or narrower filters to see more.]",
        kept, character_limit
    )
}
