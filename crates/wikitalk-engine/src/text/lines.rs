use super::span::Span;

/// A reference to a single line of a source string with its byte span.
#[derive(Debug, Clone, Copy)]
pub struct LineRef<'a> {
    /// Byte span of this line (includes the newline if present).
    pub span: Span,
    /// The line text without its trailing newline.
    pub text: &'a str,
}

/// Returns an iterator over lines with their byte spans.
///
/// Newlines stay inside each line's span so that the spans tile the whole
/// input; `text` has the `\n` stripped for matching.
pub fn lines_with_spans(s: &str) -> impl Iterator<Item = LineRef<'_>> + '_ {
    let mut offset = 0usize;
    s.split_inclusive('\n').map(move |line| {
        let start = offset;
        offset += line.len();
        LineRef {
            span: Span { start, end: offset },
            text: line.strip_suffix('\n').unwrap_or(line),
        }
    })
}
