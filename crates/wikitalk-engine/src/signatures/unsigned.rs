use std::sync::OnceLock;

use regex::Regex;

use super::author::normalize_user_name;
use super::timestamp::TimestampFormat;
use super::types::{Author, RawSignature, SignatureSource};
use crate::config::compile;
use crate::error::EngineError;
use crate::markup::collapse_whitespace;
use crate::text::Span;

fn named_argument_regex() -> &'static Regex {
    static NAMED_ARGUMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    NAMED_ARGUMENT_REGEX
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9]+ *= *").expect("Invalid named argument regex"))
}

/// Drops a `name=` prefix and collapses spaces.
fn clean_argument(arg: &str) -> String {
    collapse_whitespace(&named_argument_regex().replace(arg.trim(), ""))
}

/// Recognises templates placed where a user forgot to sign, such as
/// `{{unsigned|Alice|10:00, 1 May 2024 (UTC)}}`.
#[derive(Debug, Clone)]
pub struct UnsignedTemplates {
    pattern: Regex,
}

impl UnsignedTemplates {
    /// `None` when `names` is empty.
    pub fn new(names: &[String]) -> Result<Option<Self>, EngineError> {
        let names: Vec<String> = names
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(|name| {
                name.split_whitespace()
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join("[ _]+")
            })
            .collect();
        if names.is_empty() {
            return Ok(None);
        }

        // Group 1 is the template, then up to two positional arguments; the
        // rest of the line and following blank lines belong to it too.
        let source = format!(
            r"(\{{\{{ *(?i:{}) *\| *([^}}|\n]+?) *(?:\| *([^}}|\n]+?) *)?(?:\|[^}}\n]*)?\}}\}})[^\n]*\n*",
            names.join("|")
        );
        Ok(Some(Self {
            pattern: compile("unsigned template", &source)?,
        }))
    }

    /// Finds unsigned templates in `blanked`, reading arguments from `code`.
    ///
    /// Arguments are accepted in either order. A zone-less timestamp gets the
    /// site zone appended; a template naming nobody is attributed to
    /// [`Author::Undated`].
    pub(crate) fn scan(
        &self,
        code: &str,
        blanked: &str,
        timestamps: &TimestampFormat,
    ) -> Vec<RawSignature> {
        let mut found = Vec::new();

        for caps in self.pattern.captures_iter(blanked) {
            let (Some(whole), Some(template), Some(first)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            let argument = |m: regex::Match<'_>| {
                clean_argument(code.get(m.range()).unwrap_or(m.as_str()))
            };
            let first = argument(first);
            let second = caps.get(3).map(argument);

            let (author, timestamp) = match second {
                Some(second) if timestamps.is_timestamp(&first) && !timestamps.is_timestamp(&second) => {
                    (Some(second), Some(first))
                }
                Some(second) if timestamps.is_timestamp(&second) => (Some(first), Some(second)),
                Some(_) => (Some(first), None),
                None if timestamps.is_timestamp(&first) => (None, Some(first)),
                None => (Some(first), None),
            };

            let timestamp = timestamp.map(|ts| {
                if timestamps.has_zone(&ts) {
                    ts
                } else {
                    format!("{ts}{}", timestamps.zone_suffix())
                }
            });
            let author = match author.map(|name| normalize_user_name(&name)) {
                Some(name) if !name.is_empty() => Author::User(name),
                _ => Author::Undated,
            };
            log::trace!(
                "Unsigned template at {}..{}: {author} {timestamp:?}",
                template.start(),
                template.end()
            );

            found.push(RawSignature {
                author: Some(author),
                date: timestamp.as_deref().and_then(|ts| timestamps.parse(ts)),
                timestamp,
                span: Span::new(template.start(), template.end()),
                next_comment_start: whole.end(),
                source: SignatureSource::Unsigned,
            });
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use wikitalk_config::{SiteConfig, TimestampConfig};

    fn scan(code: &str) -> Vec<RawSignature> {
        let templates = UnsignedTemplates::new(&SiteConfig::default().unsigned_templates)
            .unwrap()
            .unwrap();
        let timestamps = TimestampFormat::new(&TimestampConfig::default()).unwrap();
        templates.scan(code, code, &timestamps)
    }

    #[rstest]
    #[case("{{unsigned|Alice|10:00, 1 May 2024 (UTC)}}")]
    #[case("{{Unsigned|10:00, 1 May 2024 (UTC)|Alice}}")]
    #[case("{{unsigned IP|1=Alice|2=10:00, 1 May 2024}}")]
    #[case("{{unsigned_IP| Alice |10:00,  1 May 2024 (UTC)}}")]
    fn reads_arguments_in_either_order(#[case] code: &str) {
        let found = scan(code);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].author, Some(Author::User("Alice".into())));
        assert_eq!(found[0].timestamp.as_deref(), Some("10:00, 1 May 2024 (UTC)"));
        assert!(found[0].date.is_some());
    }

    #[test]
    fn timestamp_only_template_is_undated_and_zoned() {
        let found = scan("text {{unsigned|10:00, 1 May 2024}}\n\nnext");

        assert_eq!(found[0].author, Some(Author::Undated));
        assert_eq!(found[0].timestamp.as_deref(), Some("10:00, 1 May 2024 (UTC)"));
        assert_eq!(found[0].span, Span::new(5, 35));
        assert_eq!(found[0].next_comment_start, 37);
    }

    #[test]
    fn author_only_template_has_no_timestamp() {
        let found = scan("{{unsigned2|Bob}}");

        assert_eq!(found[0].author, Some(Author::User("Bob".into())));
        assert_eq!(found[0].timestamp, None);
        assert_eq!(found[0].date, None);
    }

    #[test]
    fn other_templates_are_ignored() {
        assert!(scan("{{unsignedness|Bob}} {{signed|Bob}}").is_empty());
    }

    #[test]
    fn empty_name_list_disables_scan() {
        assert!(UnsignedTemplates::new(&[]).unwrap().is_none());
    }
}
