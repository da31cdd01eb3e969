//! Source-text helpers.

use idiomap_syntax::Span;

/// Bytes of context taken on each side of a span.
const CONTEXT_BYTES: usize = 50;

/// The source text around a span: 50 bytes before its start to 50 bytes
/// after its end, clipped to the text bounds and widened outward to char
/// boundaries so multi-byte characters are never split.
pub(crate) fn context_snippet(source: &str, span: Span) -> String {
    let anchor_start = span.start.min(source.len());
    let anchor_end = span.end.clamp(anchor_start, source.len());

    let mut start = anchor_start.saturating_sub(CONTEXT_BYTES);
    while !source.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (anchor_end + CONTEXT_BYTES).min(source.len());
    while !source.is_char_boundary(end) {
        end += 1;
    }
    source[start..end].to_string()
}
