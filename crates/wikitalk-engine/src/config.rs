//! Site conventions compiled for scanning.

use regex::Regex;
use wikitalk_config::SiteConfig;

use crate::error::EngineError;
use crate::signatures::{AuthorLinks, TimestampFormat, UnsignedTemplates};

pub(crate) fn compile(name: &str, source: &str) -> Result<Regex, EngineError> {
    Regex::new(source).map_err(|source| EngineError::InvalidPattern {
        name: name.to_string(),
        source,
    })
}

/// Every pattern the extractor and locators need, compiled once per site.
///
/// Extractors and locators borrow a `LocatorConfig`; nothing is cached
/// globally, so several sites can be handled side by side.
#[derive(Debug, Clone)]
pub struct LocatorConfig {
    pub timestamps: TimestampFormat,
    pub authors: AuthorLinks,
    /// `None` when the site lists no unsigned templates.
    pub unsigned: Option<UnsignedTemplates>,
    /// Trailing material kept after appended content, tried in order.
    pub keep_in_section_ending: Vec<Regex>,
    /// Blanked before signatures and headings are scanned.
    pub comment_antipatterns: Vec<Regex>,
    pub signature_scan_limit: usize,
}

impl LocatorConfig {
    pub fn from_site_config(site: &SiteConfig) -> Result<Self, EngineError> {
        let keep_in_section_ending = site
            .keep_in_section_ending
            .iter()
            .map(|source| compile("keep in section ending", source))
            .collect::<Result<Vec<_>, _>>()?;
        let comment_antipatterns = site
            .comment_antipatterns
            .iter()
            .map(|source| compile("comment antipattern", source))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            timestamps: TimestampFormat::new(&site.timestamp)?,
            authors: AuthorLinks::new(&site.user_namespaces, &site.contributions_page)?,
            unsigned: UnsignedTemplates::new(&site.unsigned_templates)?,
            keep_in_section_ending,
            comment_antipatterns,
            signature_scan_limit: site.signature_scan_limit,
        })
    }
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self::from_site_config(&SiteConfig::default()).expect("Invalid built-in site config")
    }
}
