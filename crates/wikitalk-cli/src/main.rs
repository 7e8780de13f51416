//! wikitalk: inspect talk-page wikitext from the command line.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use wikitalk_config::SiteConfig;
use wikitalk_engine::{
    CommentFingerprint, CommentLocator, CommentTarget, Delimiters, LocatorConfig, MaskedText,
    Scope, SectionLocator, SectionTarget, SignatureExtractor, remove_wiki_markup,
};

#[derive(Parser)]
#[command(name = "wikitalk")]
#[command(about = "Find signatures, sections and comments in talk-page wikitext", long_about = None)]
struct Cli {
    /// Site config file (defaults to ~/.config/wikitalk/site.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List signatures in source order
    Signatures {
        /// Wikitext file, or `-` for stdin
        file: PathBuf,
        /// Give every dated comment a unique anchor
        #[arg(long)]
        anchors: bool,
    },
    /// Find a section again by headline, position and oldest comment
    Locate {
        file: PathBuf,
        #[arg(long)]
        headline: String,
        /// Position of the heading on the page, from 0
        #[arg(long)]
        ordinal: Option<usize>,
        /// Preceding headline, nearest first; repeatable
        #[arg(long = "ancestor", value_name = "HEADLINE")]
        ancestors: Vec<String>,
        #[arg(long)]
        oldest_author: Option<String>,
        #[arg(long)]
        oldest_timestamp: Option<String>,
        #[arg(long, default_value = "")]
        oldest_text: String,
        /// The file holds a single section rather than a page
        #[arg(long)]
        section: bool,
    },
    /// Find a comment again by its signature
    Comment {
        file: PathBuf,
        #[arg(long)]
        author: String,
        #[arg(long)]
        timestamp: Option<String>,
        #[arg(long)]
        ordinal: Option<usize>,
        #[arg(long, default_value = "")]
        text: String,
        #[arg(long)]
        headline: Option<String>,
        #[arg(long)]
        section: bool,
    },
    /// Print the text with wiki markup removed
    Strip { file: PathBuf },
    /// Hide templates behind tokens and print the tokens and what they hide
    Mask {
        file: PathBuf,
        /// Record each template's visual length in its token
        #[arg(long)]
        lengths: bool,
    },
    /// Write the built-in site config to the config path
    InitConfig {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Serialize)]
struct MaskOutput<'a> {
    text: &'a str,
    fragments: Vec<&'a str>,
}

fn scope(section: bool) -> Scope {
    if section { Scope::Section } else { Scope::Page }
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn load_site_config(path: Option<&Path>) -> Result<SiteConfig> {
    match path {
        Some(path) => {
            let path = SiteConfig::expand_path(path).unwrap_or_else(|| path.to_path_buf());
            match SiteConfig::load_from_path(&path)? {
                Some(config) => {
                    log::info!("Using site config {}", path.display());
                    Ok(config)
                }
                None => bail!("Config file not found: {}", path.display()),
            }
        }
        None => match SiteConfig::load()? {
            Some(config) => {
                log::info!("Using site config {}", SiteConfig::config_path().display());
                Ok(config)
            }
            None => {
                log::debug!("No site config found, using built-in defaults");
                Ok(SiteConfig::default())
            }
        },
    }
}

/// Writes the default site config to `path`, or to the standard location.
fn init_config<W: Write>(path: Option<&Path>, force: bool, out: &mut W) -> Result<()> {
    let target = match path {
        Some(path) => SiteConfig::expand_path(path).unwrap_or_else(|| path.to_path_buf()),
        None => SiteConfig::config_path(),
    };
    if target.exists() && !force {
        bail!("Config file already exists: {}", target.display());
    }

    let defaults = SiteConfig::default();
    match path {
        Some(_) => defaults.save_to_path(&target)?,
        None => defaults.save()?,
    }
    log::info!("Wrote site config {}", target.display());
    writeln!(out, "{}", target.display())?;
    Ok(())
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn run<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    let config_path = cli.config.as_deref();
    let locator_config = || -> Result<LocatorConfig> {
        let site = load_site_config(config_path)?;
        LocatorConfig::from_site_config(&site).context("Invalid site config")
    };

    match cli.command {
        Command::Signatures { file, anchors } => {
            let config = locator_config()?;
            let text = read_input(&file)?;
            let extractor = SignatureExtractor::new(&config);
            let records = if anchors {
                extractor.extract_with_anchors(&text)
            } else {
                extractor.extract(&text)
            };
            write_json(out, &records)
        }
        Command::Locate {
            file,
            headline,
            ordinal,
            ancestors,
            oldest_author,
            oldest_timestamp,
            oldest_text,
            section,
        } => {
            let config = locator_config()?;
            let text = read_input(&file)?;
            let oldest_comment = (oldest_author.is_some() || oldest_timestamp.is_some()).then(|| {
                CommentFingerprint {
                    author: oldest_author.unwrap_or_default(),
                    timestamp: oldest_timestamp,
                    text_sample: oldest_text,
                }
            });
            let target = SectionTarget {
                headline,
                ordinal_index: ordinal,
                ancestor_headlines: ancestors,
                oldest_comment,
            };
            let found = SectionLocator::new(&config).locate_in(&text, scope(section), &target);
            if found.is_none() {
                log::warn!("No section matched {:?}", target.headline);
            }
            write_json(out, &found)
        }
        Command::Comment {
            file,
            author,
            timestamp,
            ordinal,
            text: text_sample,
            headline,
            section,
        } => {
            let config = locator_config()?;
            let text = read_input(&file)?;
            let target = CommentTarget {
                author,
                timestamp,
                ordinal_index: ordinal,
                text_sample,
                preceding_comments: Vec::new(),
                headline,
            };
            let found = CommentLocator::new(&config).locate_in(&text, scope(section), &target);
            if found.is_none() {
                log::warn!("No comment by {} matched", target.author);
            }
            write_json(out, &found)
        }
        Command::Strip { file } => {
            let text = read_input(&file)?;
            writeln!(out, "{}", remove_wiki_markup(&text))?;
            Ok(())
        }
        Command::Mask { file, lengths } => {
            let text = read_input(&file)?;
            let mut session = MaskedText::new(text);
            session.mask_balanced(&Delimiters::TEMPLATE, lengths);
            let (masked, store) = session.into_parts();
            let fragments = (1..=store.len()).filter_map(|i| store.get(i)).collect();
            write_json(
                out,
                &MaskOutput {
                    text: &masked,
                    fragments,
                },
            )
        }
        Command::InitConfig { force } => init_config(config_path, force, out),
    }
}

/// Log filter read from `var`, falling back to `info` when it is unset.
fn log_env(var: &str) -> env_logger::Env<'_> {
    env_logger::Env::new().filter_or(var, "info")
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(log_env(env_logger::DEFAULT_FILTER_ENV)).init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const PAGE: &str = "\
== Topic A ==
First point. [[User:Alice|Alice]] 09:15, 3 March 2024 (UTC)
== Topic B ==
Second point. [[User:Bob|Bob]] 10:02, 3 March 2024 (UTC)
";

    struct Fixture {
        _dir: TempDir,
        page: PathBuf,
        config: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let page = dir.path().join("page.wiki");
        fs::write(&page, PAGE).unwrap();
        let config = dir.path().join("site.toml");
        SiteConfig::default().save_to_path(&config).unwrap();
        Fixture {
            _dir: dir,
            page,
            config,
        }
    }

    fn run_args(args: &[&str]) -> Result<serde_json::Value> {
        let cli = Cli::try_parse_from(args)?;
        let mut out = Vec::new();
        run(cli, &mut out)?;
        Ok(serde_json::from_slice(&out)?)
    }

    #[test]
    fn signatures_command_lists_records() {
        let f = fixture();
        let json = run_args(&[
            "wikitalk",
            "--config",
            f.config.to_str().unwrap(),
            "signatures",
            f.page.to_str().unwrap(),
            "--anchors",
        ])
        .unwrap();

        let records = json.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["author"], "Alice");
        assert_eq!(records[1]["anchor"], "202403031002_Bob");
    }

    #[test]
    fn locate_command_reports_match_or_null() {
        let f = fixture();
        let config = f.config.to_str().unwrap();
        let page = f.page.to_str().unwrap();

        let found = run_args(&[
            "wikitalk", "--config", config, "locate", page, "--headline", "Topic B", "--ordinal",
            "1", "--oldest-author", "Bob",
        ])
        .unwrap();
        assert_eq!(found["candidate"]["headline"], "Topic B");
        assert_eq!(found["scope"], "page");

        let missing = run_args(&[
            "wikitalk", "--config", config, "locate", page, "--headline", "Gone", "--ordinal", "7",
        ])
        .unwrap();
        assert!(missing.is_null());
    }

    #[test]
    fn comment_command_finds_signature() {
        let f = fixture();
        let json = run_args(&[
            "wikitalk",
            "--config",
            f.config.to_str().unwrap(),
            "comment",
            f.page.to_str().unwrap(),
            "--author",
            "Alice",
            "--timestamp",
            "09:15, 3 March 2024 (UTC)",
        ])
        .unwrap();

        assert_eq!(json["record"]["author"], "Alice");
        assert_eq!(json["record"]["ordinal"], 0);
    }

    #[test]
    fn mask_command_lists_fragments() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("t.wiki");
        fs::write(&file, "a {{b|{{c}}}} d").unwrap();
        let config = dir.path().join("site.toml");
        SiteConfig::default().save_to_path(&config).unwrap();

        let json = run_args(&[
            "wikitalk",
            "--config",
            config.to_str().unwrap(),
            "mask",
            file.to_str().unwrap(),
        ])
        .unwrap();

        assert_eq!(json["text"], "a \u{1}2_template\u{2} d");
        assert_eq!(json["fragments"][0], "{{c}}");
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = load_site_config(Some(&missing)).unwrap_err();
        assert!(err.to_string().starts_with("Config file not found"));
    }

    #[test]
    fn invalid_pattern_in_config_is_reported() {
        let f = fixture();
        fs::write(&f.config, "comment_antipatterns = [\"(\"]\n").unwrap();

        let err = run_args(&[
            "wikitalk",
            "--config",
            f.config.to_str().unwrap(),
            "signatures",
            f.page.to_str().unwrap(),
        ])
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid site config");
    }

    #[test]
    fn init_config_writes_loadable_defaults_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("site.toml");
        let args = ["wikitalk", "--config", path.to_str().unwrap(), "init-config"];

        let mut out = Vec::new();
        run(Cli::try_parse_from(args).unwrap(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim(), path.display().to_string());
        assert_eq!(load_site_config(Some(&path)).unwrap(), SiteConfig::default());

        let err = run(Cli::try_parse_from(args).unwrap(), &mut Vec::new()).unwrap_err();
        assert!(err.to_string().starts_with("Config file already exists"));

        let forced = [&args[..], &["--force"]].concat();
        run(Cli::try_parse_from(forced).unwrap(), &mut Vec::new()).unwrap();
    }

    #[test]
    fn log_filter_variable_overrides_info_default() {
        assert_eq!(
            env_logger::Builder::from_env(log_env("WIKITALK_TEST_LOG_UNSET"))
                .build()
                .filter(),
            log::LevelFilter::Info
        );

        unsafe {
            std::env::set_var("WIKITALK_TEST_LOG", "debug");
        }
        let filter = env_logger::Builder::from_env(log_env("WIKITALK_TEST_LOG"))
            .build()
            .filter();
        unsafe {
            std::env::remove_var("WIKITALK_TEST_LOG");
        }
        assert_eq!(filter, log::LevelFilter::Debug);
    }
}
