//! Markup stripping and text comparison helpers.
//!
//! These produce text for comparison only; nothing here is ever written back
//! into the source.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::masking::{Delimiters, MaskStore, remove_tokens};

struct MarkupPatterns {
    comment: Regex,
    tag: Regex,
    file_link: Regex,
    internal_link: Regex,
    labelled_external_link: Regex,
    bare_external_link: Regex,
    quotes: Regex,
    line_markers: Regex,
    whitespace: Regex,
}

fn patterns() -> &'static MarkupPatterns {
    static PATTERNS: OnceLock<MarkupPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| MarkupPatterns {
        comment: Regex::new(r"(?s)<!--.*?(?:-->|\z)").expect("Invalid comment regex"),
        tag: Regex::new(r"</?[A-Za-z][^<>]*>").expect("Invalid tag regex"),
        file_link: Regex::new(r"(?i)\[\[\s*(?:file|image|category)\s*:[^\[\]]*\]\]")
            .expect("Invalid file link regex"),
        internal_link: Regex::new(r"\[\[:?(?:[^|\[\]\n]*\|)?([^\[\]\n]*)\]\]")
            .expect("Invalid internal link regex"),
        labelled_external_link: Regex::new(r"\[(?:https?:)?//[^\s\]]+\s+([^\]\n]+)\]")
            .expect("Invalid external link regex"),
        bare_external_link: Regex::new(r"\[(?:https?:)?//[^\s\]]+\]")
            .expect("Invalid external link regex"),
        quotes: Regex::new(r"'{2,}").expect("Invalid quotes regex"),
        line_markers: Regex::new(r"(?m)^[:*#;]+").expect("Invalid line marker regex"),
        whitespace: Regex::new(r"\s+").expect("Invalid whitespace regex"),
    })
}

/// Collapses runs of whitespace (including non-breaking spaces) into single
/// spaces and trims the ends.
pub fn collapse_whitespace(s: &str) -> String {
    patterns().whitespace.replace_all(s, " ").trim().to_string()
}

/// Reduces wikitext to roughly the words a reader sees.
///
/// Comments, templates (nested ones as a whole), tags, file and category
/// links, bold/italic quotes and line-leading list markers are removed; links
/// are replaced by their labels; entities are decoded and whitespace is
/// collapsed.
pub fn remove_wiki_markup(code: &str) -> String {
    let p = patterns();

    let text = p.comment.replace_all(code, "");
    let mut store = MaskStore::new();
    let text = remove_tokens(&store.mask_balanced(&text, &Delimiters::TEMPLATE, false));

    let text = p.tag.replace_all(&text, "");
    let text = p.file_link.replace_all(&text, "");
    let text = p.internal_link.replace_all(&text, "${1}");
    let text = p.labelled_external_link.replace_all(&text, "${1}");
    let text = p.bare_external_link.replace_all(&text, "");
    let text = p.quotes.replace_all(&text, "");
    let text = p.line_markers.replace_all(&text, "");

    let decoded = html_escape::decode_html_entities(&text);
    collapse_whitespace(&decoded)
}

/// Normalises a headline for comparison.
///
/// Applies [`remove_wiki_markup`] until the text stops changing, so entities
/// that decode into markup are stripped too and normalising an already
/// normalised headline returns it unchanged.
pub fn normalize_headline(headline: &str) -> String {
    let mut current = remove_wiki_markup(headline);
    loop {
        let next = remove_wiki_markup(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn words(s: &str) -> HashSet<String> {
    static WORD_REGEX: OnceLock<Regex> = OnceLock::new();
    let word = WORD_REGEX
        .get_or_init(|| Regex::new(r"[\p{L}\p{M}\p{N}]{2,}").expect("Invalid word regex"));
    word.find_iter(s).map(|m| m.as_str().to_lowercase()).collect()
}

/// Share of distinct words two texts have in common, from 0 to 1.
///
/// Words are runs of at least two letters or digits, compared
/// case-insensitively; the ratio is shared words over all distinct words.
/// Returns 0 when either text has no words.
pub fn word_overlap(a: &str, b: &str) -> f64 {
    let a = words(a);
    let b = words(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(&b).count();
    shared as f64 / (a.len() + b.len() - shared) as f64
}
