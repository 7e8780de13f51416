use regex::Regex;

use crate::config::compile;
use crate::error::EngineError;
use crate::markup::collapse_whitespace;
use crate::text::Span;

/// Canonical form of a user name: entities decoded, underscores as spaces,
/// whitespace collapsed, first letter upper-cased.
pub fn normalize_user_name(raw: &str) -> String {
    let decoded = html_escape::decode_html_entities(raw).replace('_', " ");
    let collapsed = collapse_whitespace(&decoded);
    let mut chars = collapsed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Regex source for a page title, tolerant of `_` for spaces and of spacing
/// around the namespace colon.
fn title_pattern(title: &str) -> String {
    title
        .split(':')
        .map(|part| {
            part.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join("[ _]+")
        })
        .collect::<Vec<_>>()
        .join("[ _]*:[ _]*")
}

/// A link naming a user, found inside a signature window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorLink {
    /// Span of the link opening, relative to the scanned window.
    pub span: Span,
    /// Normalised user name.
    pub name: String,
}

/// Matches links that identify a signature's author: user pages, user talk
/// pages and contribution lists.
#[derive(Debug, Clone)]
pub struct AuthorLinks {
    link: Regex,
}

impl AuthorLinks {
    pub fn new(user_namespaces: &[String], contributions_page: &str) -> Result<Self, EngineError> {
        let mut targets: Vec<String> = Vec::new();
        let namespaces: Vec<String> = user_namespaces
            .iter()
            .filter(|ns| !ns.trim().is_empty())
            .map(|ns| title_pattern(ns))
            .collect();
        if !namespaces.is_empty() {
            targets.push(format!("(?:{})[ _]*:", namespaces.join("|")));
        }
        if !contributions_page.trim().is_empty() {
            targets.push(format!("{}[ _]*/", title_pattern(contributions_page)));
        }
        if targets.is_empty() {
            // Nothing can name an author; a pattern that never matches
            return Ok(Self {
                link: compile("author link", r"[^\s\S]")?,
            });
        }

        let source = format!(
            r"\[\[[ _]*:?[ _]*(?i:{})[ _]*([^|\[\]#/\n{{}}<>]+)",
            targets.join("|")
        );
        Ok(Self {
            link: compile("author link", &source)?,
        })
    }

    /// All author links in `window`, left to right.
    pub fn find_in(&self, window: &str) -> Vec<AuthorLink> {
        self.link
            .captures_iter(window)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let name = normalize_user_name(caps.get(1)?.as_str());
                (!name.is_empty()).then(|| AuthorLink {
                    span: Span::new(whole.start(), whole.end()),
                    name,
                })
            })
            .collect()
    }
}
