use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::kinds::Token;

/// Tags whose content is never parsed as discussion markup.
const RAW_CONTENT_TAGS: [&str; 8] = [
    "nowiki",
    "pre",
    "syntaxhighlight",
    "source",
    "math",
    "code",
    "blockquote",
    "q",
];

fn comment_regex() -> &'static Regex {
    static COMMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    // An unclosed comment runs to the end of the text
    COMMENT_REGEX.get_or_init(|| Regex::new(r"(?s)<!--.*?(?:-->|\z)").expect("Invalid comment regex"))
}

fn raw_tag_regexes() -> &'static [Regex] {
    static RAW_TAG_REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();
    RAW_TAG_REGEXES.get_or_init(|| {
        RAW_CONTENT_TAGS
            .iter()
            .map(|tag| {
                Regex::new(&format!(r"(?is)<{tag}(?:\s[^>]*)?>(.*?)</{tag}\s*>"))
                    .expect("Invalid raw tag regex")
            })
            .collect()
    })
}

/// Replaces every character of `s` with spaces of the same byte length.
///
/// Newlines are kept so that line-based scanning sees the same line
/// structure as the original.
pub fn blank_preserving_length(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '\n' {
            out.push('\n');
        } else {
            out.extend(std::iter::repeat_n(' ', c.len_utf8()));
        }
    }
    out
}

/// Returns a copy of `code` where text that must not be read as signatures or
/// headings is blanked out.
///
/// Comments become `\x01` + spaces + `\x02`, the content of raw tags
/// (`<nowiki>`, `<pre>`, `<blockquote>`...) becomes spaces, and every match of
/// `antipatterns` becomes spaces. The result has exactly the byte length of
/// `code` and keeps its newlines, so offsets found in it index `code`.
pub fn blank_distracting(code: &str, antipatterns: &[Regex]) -> String {
    let mut blanked = comment_regex()
        .replace_all(code, |caps: &Captures| {
            // `<` is one byte; the last character may not be when the comment is unclosed
            let mut body = blank_preserving_length(&caps[0][1..]);
            if body.ends_with(' ') {
                body.pop();
                body.push(Token::END);
            }
            format!("{}{body}", Token::START)
        })
        .into_owned();

    for tag in raw_tag_regexes() {
        blanked = tag
            .replace_all(&blanked, |caps: &Captures| {
                let (Some(whole), Some(content)) = (caps.get(0), caps.get(1)) else {
                    return caps[0].to_string();
                };
                let open = &whole.as_str()[..content.start() - whole.start()];
                let close = &whole.as_str()[content.end() - whole.start()..];
                format!("{open}{}{close}", blank_preserving_length(content.as_str()))
            })
            .into_owned();
    }

    for pattern in antipatterns {
        blanked = pattern
            .replace_all(&blanked, |caps: &Captures| blank_preserving_length(&caps[0]))
            .into_owned();
    }

    blanked
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blank_keeps_byte_length_and_newlines() {
        let s = "añ\nб";
        let blanked = blank_preserving_length(s);

        assert_eq!(blanked.len(), s.len());
        assert_eq!(blanked, "   \n  ");
    }

    #[test]
    fn comments_become_marked_whitespace() {
        let code = "a <!-- hidden\nline --> b";
        let blanked = blank_distracting(code, &[]);

        assert_eq!(blanked.len(), code.len());
        assert_eq!(
            blanked,
            format!("a \x01{}\n{}\x02 b", " ".repeat(10), " ".repeat(7))
        );
    }

    #[test]
    fn unclosed_comment_runs_to_end() {
        let code = "a <!-- never closed";
        let blanked = blank_distracting(code, &[]);

        assert_eq!(blanked.len(), code.len());
        assert!(blanked.starts_with("a \x01"));
        assert!(blanked.ends_with('\x02'));
        assert!(!blanked.contains("closed"));
    }

    #[test]
    fn unclosed_comment_ending_in_multibyte_char_keeps_length() {
        let code = "a <!-- inachevé";
        let blanked = blank_distracting(code, &[]);

        assert_eq!(blanked.len(), code.len());
        assert_eq!(blanked, format!("a \x01{}\x02", " ".repeat(12)));
    }

    #[test]
    fn unclosed_comment_ending_in_newline_keeps_it() {
        let code = "a <!-- open\n";
        let blanked = blank_distracting(code, &[]);

        assert_eq!(blanked.len(), code.len());
        assert_eq!(blanked, format!("a \x01{}\n", " ".repeat(8)));
    }

    #[test]
    fn raw_tag_content_is_blanked_but_tags_stay() {
        let code = "<nowiki>[[User:X]] 10:00</nowiki> <pre class=\"x\">== H ==</pre>";
        let blanked = blank_distracting(code, &[]);

        assert_eq!(blanked.len(), code.len());
        assert!(blanked.starts_with("<nowiki>   "));
        assert!(blanked.contains("</nowiki> <pre class=\"x\">"));
        assert!(!blanked.contains("User"));
        assert!(!blanked.contains("== H =="));
    }

    #[test]
    fn self_closing_tag_is_not_an_opener() {
        let code = "x<nowiki/>y [[User:A]] <nowiki>z</nowiki>";
        let blanked = blank_distracting(code, &[]);

        assert!(blanked.contains("[[User:A]]"));
    }

    #[test]
    fn antipatterns_are_blanked() {
        let antipattern = Regex::new(r"(?m)^\{\{archived by[^\n]*$").unwrap();
        let code = "{{archived by|Bot 10:00}}\nkept";
        let blanked = blank_distracting(code, &[antipattern]);

        assert_eq!(blanked.len(), code.len());
        assert!(blanked.ends_with("\nkept"));
        assert!(blanked.trim_start().starts_with("kept"));
    }
}
