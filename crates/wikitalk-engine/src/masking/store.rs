use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::kinds::{Delimiters, MaskKind, Token};

fn token_regex() -> &'static Regex {
    static TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();
    TOKEN_REGEX.get_or_init(|| {
        Regex::new(r"\x01(\d+)(?:_([a-z]+))?(?:_(\d+))?\x02").expect("Invalid token regex")
    })
}

/// Removes every sentinel token from `text` without restoring it.
///
/// Used where hidden spans carry no meaning for the result, e.g. when
/// stripping markup for word comparison.
pub fn remove_tokens(text: &str) -> String {
    token_regex().replace_all(text, "").into_owned()
}

/// Ordered store of hidden fragments for one masking session.
///
/// Fragment `n` (1-based) is the text behind token `\x01n...\x02`. Insertion
/// order equals index order, so masking the same text with the same sequence
/// of patterns always issues the same tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaskStore {
    fragments: Vec<String>,
}

impl MaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Returns the fragment behind the token with 1-based `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.fragments.get(i))
            .map(String::as_str)
    }

    /// Stores `fragment` and returns the token standing in for it.
    pub fn push(
        &mut self,
        fragment: String,
        kind: Option<MaskKind>,
        visual_len: Option<usize>,
    ) -> String {
        self.fragments.push(fragment);
        Token::render(self.fragments.len(), kind, visual_len)
    }

    /// Replaces every non-empty match of `pattern` with a token.
    pub fn mask(&mut self, text: &str, pattern: &Regex, kind: Option<MaskKind>) -> String {
        pattern
            .replace_all(text, |caps: &Captures| {
                let matched = &caps[0];
                if matched.is_empty() {
                    return String::new();
                }
                self.push(matched.to_string(), kind, None)
            })
            .into_owned()
    }

    /// Masks only capture group 2 of each match of `pattern`.
    ///
    /// Everything else in the match (typically a leading group 1, such as the
    /// list markers in front of a table) stays outside the token. Matches
    /// whose group 2 did not participate or is empty are left untouched.
    pub fn mask_groups(&mut self, text: &str, pattern: &Regex, kind: Option<MaskKind>) -> String {
        pattern
            .replace_all(text, |caps: &Captures| {
                let whole = caps.get(0).expect("group 0 always participates");
                let Some(hidden) = caps.get(2).filter(|m| !m.as_str().is_empty()) else {
                    return whole.as_str().to_string();
                };
                let before = &text[whole.start()..hidden.start()];
                let after = &text[hidden.end()..whole.end()];
                let token = self.push(hidden.as_str().to_string(), kind, None);
                format!("{before}{token}{after}")
            })
            .into_owned()
    }

    /// Restores tokens in `text`, optionally only those tagged `kind`.
    ///
    /// Repeats until no restorable token remains, so fragments that
    /// themselves contain tokens are resolved in one call. Tokens whose index
    /// this store never issued are left in place.
    pub fn unmask(&self, text: &str, kind: Option<MaskKind>) -> String {
        let mut current = text.to_string();
        loop {
            let mut resolved = false;
            let next = token_regex()
                .replace_all(&current, |caps: &Captures| {
                    let token = &caps[0];
                    if let Some(kind) = kind
                        && caps.get(2).map(|m| m.as_str()) != Some(kind.as_str())
                    {
                        return token.to_string();
                    }
                    match caps[1].parse::<usize>().ok().and_then(|n| self.get(n)) {
                        Some(fragment) => {
                            resolved = true;
                            fragment.to_string()
                        }
                        None => {
                            log::warn!("Unknown mask token {:?}", token);
                            token.to_string()
                        }
                    }
                })
                .into_owned();
            if !resolved {
                return current;
            }
            current = next;
        }
    }
}

/// A text under transformation together with the store of what it hides.
///
/// This is the unit of ownership for a masking session: the text and its
/// store travel together, so tokens can never be resolved against a store
/// built from different text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaskedText {
    text: String,
    store: MaskStore,
}

impl MaskedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            store: MaskStore::new(),
        }
    }

    /// The current text, with tokens in place of masked spans.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn store(&self) -> &MaskStore {
        &self.store
    }

    pub fn mask(&mut self, pattern: &Regex, kind: Option<MaskKind>) -> &mut Self {
        self.text = self.store.mask(&self.text, pattern, kind);
        self
    }

    pub fn mask_groups(&mut self, pattern: &Regex, kind: Option<MaskKind>) -> &mut Self {
        self.text = self.store.mask_groups(&self.text, pattern, kind);
        self
    }

    pub fn mask_balanced(&mut self, delimiters: &Delimiters, add_lengths: bool) -> &mut Self {
        self.text = self.store.mask_balanced(&self.text, delimiters, add_lengths);
        self
    }

    pub fn mask_balanced_with<F>(
        &mut self,
        delimiters: &Delimiters,
        add_lengths: bool,
        handler: F,
    ) -> &mut Self
    where
        F: FnMut(&mut MaskStore, &str) -> String,
    {
        self.text = self
            .store
            .mask_balanced_with(&self.text, delimiters, add_lengths, handler);
        self
    }

    /// Applies an arbitrary transform to the masked text.
    pub fn map_text(&mut self, f: impl FnOnce(&str) -> String) -> &mut Self {
        self.text = f(&self.text);
        self
    }

    pub fn unmask(&mut self, kind: Option<MaskKind>) -> &mut Self {
        self.text = self.store.unmask(&self.text, kind);
        self
    }

    /// Fully restores the text and ends the session.
    pub fn into_unmasked(self) -> String {
        self.store.unmask(&self.text, None)
    }

    pub fn into_parts(self) -> (String, MaskStore) {
        (self.text, self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn re(pattern: &str) -> Regex {
        Regex::new(pattern).unwrap()
    }

    #[test]
    fn mask_issues_tokens_in_match_order() {
        let mut store = MaskStore::new();
        let masked = store.mask("a <b> c <d>", &re(r"<\w>"), Some(MaskKind::Tag));

        assert_eq!(masked, "a \x011_tag\x02 c \x012_tag\x02");
        assert_eq!(store.get(1), Some("<b>"));
        assert_eq!(store.get(2), Some("<d>"));
        assert_eq!(store.get(0), None);
        assert_eq!(store.get(3), None);
    }

    #[rstest]
    #[case("plain text <b>bold</b> <br>", r"</?\w+>", Some(MaskKind::Tag))]
    #[case("x [[link]] y [[other|label]]", r"\[\[[^\]]+\]\]", Some(MaskKind::Link))]
    #[case("{| table |} and more", r"\{\|[^}]*\|\}", None)]
    fn mask_unmask_round_trip(
        #[case] text: &str,
        #[case] pattern: &str,
        #[case] kind: Option<MaskKind>,
    ) {
        let mut store = MaskStore::new();
        let masked = store.mask(text, &re(pattern), kind);

        assert_ne!(masked, text);
        assert_eq!(store.unmask(&masked, kind), text);
    }

    #[test]
    fn empty_matches_are_not_masked() {
        let mut store = MaskStore::new();
        let masked = store.mask("abc", &re(r"x*"), None);

        assert_eq!(masked, "abc");
        assert!(store.is_empty());
    }

    #[test]
    fn mask_groups_keeps_prefix_outside_token() {
        let mut store = MaskStore::new();
        let masked = store.mask_groups(
            ":: {| wikitable |}\nrest",
            &re(r"(?m)^([:*#]* *)(\{\|[^\n]*\|\})"),
            Some(MaskKind::Table),
        );

        assert_eq!(masked, ":: \x011_table\x02\nrest");
        assert_eq!(store.get(1), Some("{| wikitable |}"));
    }

    #[test]
    fn unmask_filters_by_kind() {
        let mut store = MaskStore::new();
        let text = "<b>[[x]]</b>";
        let masked = store.mask(text, &re(r"\[\[\w\]\]"), Some(MaskKind::Link));
        let masked = store.mask(&masked, &re(r"</?b>"), Some(MaskKind::Tag));

        let tags_only = store.unmask(&masked, Some(MaskKind::Tag));
        assert_eq!(tags_only, "<b>\x011_link\x02</b>");

        assert_eq!(store.unmask(&tags_only, Some(MaskKind::Link)), text);
    }

    #[test]
    fn unmask_order_does_not_change_result() {
        let mut store = MaskStore::new();
        let text = "<i>[[a]]</i> and [[<i>b</i>]]";
        let masked = store.mask(text, &re(r"</?i>"), Some(MaskKind::Tag));
        let masked = store.mask(&masked, &re(r"\[\[[^\]]*\]\]"), Some(MaskKind::Link));

        let tag_first = store.unmask(&store.unmask(&masked, Some(MaskKind::Tag)), None);
        let link_first = store.unmask(&store.unmask(&masked, Some(MaskKind::Link)), None);

        assert_eq!(tag_first, text);
        assert_eq!(link_first, text);
    }

    #[test]
    fn unmask_leaves_foreign_tokens_alone() {
        let store = MaskStore::new();
        assert_eq!(store.unmask("a \x017\x02 b", None), "a \x017\x02 b");
    }

    #[test]
    fn remove_tokens_drops_every_token() {
        assert_eq!(remove_tokens("a\x011_template_3\x02b\x012\x02c"), "abc");
    }

    #[test]
    fn masked_text_session_round_trip() {
        let original = "keep {{tpl|[[a]]}} and <b>tag</b>";
        let mut session = MaskedText::new(original);
        session
            .mask_balanced(&Delimiters::TEMPLATE, false)
            .mask(&re(r"</?b>"), Some(MaskKind::Tag))
            .map_text(|t| t.replace("keep", "KEEP"));

        assert!(!session.text().contains("{{"));
        assert!(!session.text().contains("<b>"));
        assert_eq!(session.store().len(), 3);

        assert_eq!(
            session.into_unmasked(),
            "KEEP {{tpl|[[a]]}} and <b>tag</b>"
        );
    }
}
