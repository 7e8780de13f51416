use std::sync::OnceLock;

use regex::Regex;

use super::kinds::Delimiters;
use super::store::MaskStore;
use crate::text::Cursor;

fn sized_token_regex() -> &'static Regex {
    static SIZED_TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();
    SIZED_TOKEN_REGEX.get_or_init(|| {
        Regex::new(r"\x01\d+(?:_[a-z]+)?_(\d+)\x02").expect("Invalid sized token regex")
    })
}

/// Length of `span` as a reader would see it, counting each sized token as
/// the length it records.
fn visual_length(span: &str) -> usize {
    let mut len = 0;
    let mut last = 0;
    for caps in sized_token_regex().captures_iter(span) {
        let Some(token) = caps.get(0) else { continue };
        len += span[last..token.start()].chars().count();
        len += caps[1].parse::<usize>().unwrap_or(token.as_str().chars().count());
        last = token.end();
    }
    len + span[last..].chars().count()
}

impl MaskStore {
    /// Masks every balanced `open ... close` span of `text`, innermost first.
    ///
    /// See [`MaskStore::mask_balanced_with`].
    pub fn mask_balanced(&mut self, text: &str, delimiters: &Delimiters, add_lengths: bool) -> String {
        self.mask_balanced_with(text, delimiters, add_lengths, |_, span| span.to_string())
    }

    /// Masks every balanced `open ... close` span of `text`.
    ///
    /// Open delimiters are pushed on a stack; each close delimiter pops the
    /// most recent unmatched open and the span between them (which by then
    /// holds tokens for its nested spans) becomes one token. `handler` maps
    /// the span text before it is stored and may mask further content into
    /// the same store.
    ///
    /// Unbalanced input:
    /// - a close with nothing to pop is matched against position 0, so any
    ///   leading text up to it is masked too
    /// - opens still unmatched at the end are closed at end of text
    ///
    /// With `add_lengths`, each token also records the span's visual length
    /// (nested tokens counted at their own recorded length).
    pub fn mask_balanced_with<F>(
        &mut self,
        text: &str,
        delimiters: &Delimiters,
        add_lengths: bool,
        mut handler: F,
    ) -> String
    where
        F: FnMut(&mut MaskStore, &str) -> String,
    {
        let open = delimiters.open.as_bytes();
        let close = delimiters.close.as_bytes();

        let mut cur = Cursor::new(text);
        let mut out = String::with_capacity(text.len());
        // Byte offsets into `out` where unmatched open delimiters begin
        let mut stack: Vec<usize> = Vec::new();
        let mut text_start = 0;

        while !cur.eof() {
            if cur.starts_with(open) {
                out.push_str(&text[text_start..cur.pos()]);
                stack.push(out.len());
                out.push_str(delimiters.open);
                cur.bump_n(open.len());
                text_start = cur.pos();
            } else if cur.starts_with(close) {
                out.push_str(&text[text_start..cur.pos()]);
                out.push_str(delimiters.close);
                cur.bump_n(close.len());
                text_start = cur.pos();

                let start = stack.pop().unwrap_or(0);
                self.collapse(&mut out, start, delimiters, add_lengths, &mut handler);
            } else {
                cur.bump_char();
            }
        }
        out.push_str(&text[text_start..]);

        while let Some(start) = stack.pop() {
            self.collapse(&mut out, start, delimiters, add_lengths, &mut handler);
        }

        out
    }

    /// Replaces `out[start..]` with a token for it.
    fn collapse<F>(
        &mut self,
        out: &mut String,
        start: usize,
        delimiters: &Delimiters,
        add_lengths: bool,
        handler: &mut F,
    ) where
        F: FnMut(&mut MaskStore, &str) -> String,
    {
        let span = out.split_off(start);
        let visual_len = add_lengths.then(|| visual_length(&span));
        let stored = handler(self, &span);
        let token = self.push(stored, Some(delimiters.kind), visual_len);
        out.push_str(&token);
    }
}
