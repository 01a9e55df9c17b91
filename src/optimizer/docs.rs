//! Documentation summarization

/// Longest normalized documentation kept verbatim, in characters
pub const MAX_DOC_CHARS: usize = 200;

pub const ELLIPSIS: &str = "...";

const KEPT_CHARS: usize = MAX_DOC_CHARS - ELLIPSIS.len();

/// Collapse whitespace runs to one space, trim, and cap the length
///
/// Text longer than [`MAX_DOC_CHARS`] characters is cut to 197 characters plus
/// [`ELLIPSIS`]. Lengths are counted in `char`s so multi-byte text is never
/// split inside a code point. Whitespace-only input yields an empty string.
pub fn normalize_documentation(text: &str) -> String {
    cap_length(collapse_whitespace(text))
}

/// Whitespace runs (newlines included) become one space; ends are trimmed
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn exceeds_cap(collapsed: &str) -> bool {
    collapsed.chars().count() > MAX_DOC_CHARS
}

fn cap_length(collapsed: String) -> String {
    if !exceeds_cap(&collapsed) {
        return collapsed;
    }

    let mut truncated: String = collapsed.chars().take(KEPT_CHARS).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}
