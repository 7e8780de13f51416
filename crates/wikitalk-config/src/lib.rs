use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// How a wiki renders the timestamp part of a signature.
///
/// Only the `HH:MM, D Month YYYY (ZONE)` layout is supported; sites differ in
/// the month names and the zone label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimestampConfig {
    /// Month names, January first. Must hold exactly twelve entries.
    pub month_names: Vec<String>,
    /// Zone label printed in parentheses after the date.
    pub timezone: String,
}

impl Default for TimestampConfig {
    fn default() -> Self {
        Self {
            month_names: [
                "January",
                "February",
                "March",
                "April",
                "May",
                "June",
                "July",
                "August",
                "September",
                "October",
                "November",
                "December",
            ]
            .map(String::from)
            .to_vec(),
            timezone: "UTC".to_string(),
        }
    }
}

/// Pattern tables describing one wiki's talk-page conventions.
///
/// Every list entry under `keep_in_section_ending` and `comment_antipatterns`
/// is a regular expression source in `regex` crate syntax. The engine compiles
/// them once per site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub timestamp: TimestampConfig,
    /// Namespaces whose links identify the author of a signature.
    pub user_namespaces: Vec<String>,
    /// Special page whose subpages identify anonymous authors.
    pub contributions_page: String,
    /// Names of templates substituted for a missing signature.
    pub unsigned_templates: Vec<String>,
    /// Trailing material that must stay after content appended to a section.
    pub keep_in_section_ending: Vec<String>,
    /// Text that looks like a signature but must never be read as one.
    pub comment_antipatterns: Vec<String>,
    /// Maximum number of bytes between an author link and its timestamp.
    pub signature_scan_limit: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            timestamp: TimestampConfig::default(),
            user_namespaces: vec!["User".to_string(), "User talk".to_string()],
            contributions_page: "Special:Contributions".to_string(),
            unsigned_templates: [
                "unsigned",
                "unsigned2",
                "unsigned IP",
                "unsigned IP2",
                "unsignedIP",
                "unsignedIP2",
                "unsigned-IP",
                "undated",
            ]
            .map(String::from)
            .to_vec(),
            keep_in_section_ending: vec![
                r"\n+(?:<!--(?:[^-]|-[^-])*-->\s*)+$".to_string(),
                r"(?i)\n+(?:\{\{(?:-|clear|clr|clear ?all)\}\}\s*)+$".to_string(),
                r"(?i)\n+(?:\{\{\s*(?:collapse bottom|hidden end|archive bottom|discussion bottom|hab|cob)\s*\}\}\s*)+$"
                    .to_string(),
            ],
            comment_antipatterns: vec![
                r"(?im)^\{\{\s*(?:talk ?header|archives|auto ?archiving notice)\b[^\n]*$".to_string(),
            ],
            signature_scan_limit: 100,
        }
    }
}

impl SiteConfig {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: SiteConfig =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/wikitalk");
        PathBuf::from(config_dir.as_ref()).join("site.toml")
    }

    /// Expands `~` and environment variables in a user-supplied config path.
    pub fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
