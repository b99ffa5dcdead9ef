//! Body Splicer: isolates the editable `<body>` fragment of a generated document.
//!
//! Generated resumes and cover letters are standalone HTML documents with their own
//! `<head>`/`<style>` scaffold. Editors only ever see the body; saving splices the
//! edited fragment back so the scaffold survives any number of edit cycles.
//!
//! Tag matching is ASCII case-insensitive and tolerates attributes on `<body ...>`.
//! Neither function can fail: input without a complete body region passes through.

/// Byte span of a body region: `open_end` is just past the `<body ...>` tag,
/// `close_start` is the position of the matching `</body`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BodySpan {
    open_end: usize,
    close_start: usize,
}

/// Returns the inner content of the first `<body>` region, or the whole input
/// when there is no complete body region.
pub fn extract_body(html: &str) -> &str {
    match find_body_span(html) {
        Some(span) => &html[span.open_end..span.close_start],
        None => html,
    }
}

/// Replaces the inner content of the first `<body>` region of `original` with
/// `fragment`, keeping every byte before and after it. Without a complete body
/// region the fragment is returned as-is.
pub fn rewrap_body(original: &str, fragment: &str) -> String {
    match find_body_span(original) {
        Some(span) => {
            let mut out = String::with_capacity(
                span.open_end + fragment.len() + (original.len() - span.close_start),
            );
            out.push_str(&original[..span.open_end]);
            out.push_str(fragment);
            out.push_str(&original[span.close_start..]);
            out
        }
        None => fragment.to_string(),
    }
}

/// True when the document opens a `<body>` but never closes it.
pub fn has_unclosed_body(html: &str) -> bool {
    let lower = html.to_ascii_lowercase();
    match find_open_tag(&lower) {
        Some(open_end) => lower[open_end..].find("</body").is_none(),
        None => false,
    }
}

/// True when the document contains a `<body ...>` opening tag.
pub fn has_body_tag(html: &str) -> bool {
    find_open_tag(&html.to_ascii_lowercase()).is_some()
}

fn find_body_span(html: &str) -> Option<BodySpan> {
    // ASCII lowercasing keeps byte offsets identical to the original.
    let lower = html.to_ascii_lowercase();
    let open_end = find_open_tag(&lower)?;
    let close_start = open_end + lower[open_end..].find("</body")?;
    Some(BodySpan {
        open_end,
        close_start,
    })
}

/// Finds the first `<body` that is a real tag (not `<bodyx`) and returns the
/// offset just past its closing `>`.
fn find_open_tag(lower: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(rel) = lower[from..].find("<body") {
        let start = from + rel;
        let after = start + "<body".len();
        match lower.as_bytes().get(after) {
            Some(b'>') => return Some(after + 1),
            Some(c) if c.is_ascii_whitespace() || *c == b'/' => {
                return lower[after..].find('>').map(|gt| after + gt + 1);
            }
            Some(_) => from = after,
            None => return None,
        }
    }
    None
}
