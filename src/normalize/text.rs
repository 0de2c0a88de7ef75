use html_escape::decode_html_entities;

/// Decode HTML entities and collapse whitespace runs to single spaces.
///
/// Empty, whitespace-only or absent input maps to `None` so downstream
/// fields never carry empty strings.
pub fn normalize(text: Option<&str>) -> Option<String> {
    let decoded = decode_html_entities(text?);
    let collapsed = decoded.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}
