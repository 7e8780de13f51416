use serde::Serialize;

/// Category tag embedded in a sentinel token, used to unmask selectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskKind {
    Template,
    Table,
    Tag,
    Link,
    Comment,
}

impl MaskKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            MaskKind::Template => "template",
            MaskKind::Table => "table",
            MaskKind::Tag => "tag",
            MaskKind::Link => "link",
            MaskKind::Comment => "comment",
        }
    }
}

/// Sentinel markers framing every token.
pub struct Token;

impl Token {
    pub const START: char = '\x01';
    pub const END: char = '\x02';

    /// Renders a token for the fragment at 1-based `index`.
    pub fn render(index: usize, kind: Option<MaskKind>, visual_len: Option<usize>) -> String {
        let mut token = format!("{}{index}", Self::START);
        if let Some(kind) = kind {
            token.push('_');
            token.push_str(kind.as_str());
        }
        if let Some(len) = visual_len {
            token.push('_');
            token.push_str(&len.to_string());
        }
        token.push(Self::END);
        token
    }
}

/// An open/close pair that may nest, e.g. `{{ ... }}`.
#[derive(Debug, Clone, Copy)]
pub struct Delimiters {
    pub open: &'static str,
    pub close: &'static str,
    pub kind: MaskKind,
}

impl Delimiters {
    pub const TEMPLATE: Delimiters = Delimiters {
        open: "{{",
        close: "}}",
        kind: MaskKind::Template,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_plain_token() {
        assert_eq!(Token::render(3, None, None), "\x013\x02");
    }

    #[test]
    fn render_token_with_kind_and_length() {
        assert_eq!(
            Token::render(12, Some(MaskKind::Template), Some(40)),
            "\x0112_template_40\x02"
        );
    }
}
