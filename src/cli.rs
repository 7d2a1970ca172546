//! Command-line interface.
//!
//! Every flag overrides the matching config-file field, so the tool works
//! with a TOML file, flags alone, or a mix.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;

use crate::config::Config;

/// Convert a Mastodon export archive into Jekyll posts.
#[derive(Debug, Parser)]
#[command(name = "masto2jekyll", version, about)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Archive file extracted from the export (outbox.json)
    #[arg(long)]
    pub archive: Option<PathBuf>,

    /// Directory to write generated posts into
    #[arg(long)]
    pub posts_dir: Option<PathBuf>,

    /// Directory to copy media attachments into
    #[arg(long)]
    pub attachments_dir: Option<PathBuf>,

    /// ActivityPub actor URL; only posts by this actor are exported
    #[arg(long)]
    pub actor: Option<String>,

    /// Local timezone for post dates (e.g. Europe/Amsterdam)
    #[arg(long)]
    pub timezone: Option<String>,

    /// Jekyll layout for generated posts
    #[arg(long)]
    pub layout: Option<String>,

    /// Mark generated posts as published instead of draft; pass `false`
    /// to force drafts over a config file that says otherwise
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub published: Option<bool>,

    /// Keep hashtag links in post bodies instead of removing them; takes
    /// an optional `true`/`false` like --published
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub keep_tag_links: Option<bool>,

    /// Only export posts carrying this tag; repeatable (e.g. --tag '#cats')
    #[arg(long = "tag", value_name = "TAG")]
    pub wanted_tags: Vec<String>,

    /// Maximum number of words in derived titles
    #[arg(long)]
    pub max_title_words: Option<usize>,

    /// Print debugging output while processing
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolve the effective configuration: config file (or defaults),
    /// then flag overrides.
    pub fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        if let Some(archive) = self.archive {
            config.archive = archive;
        }
        if let Some(posts_dir) = self.posts_dir {
            config.posts_dir = posts_dir;
        }
        if let Some(attachments_dir) = self.attachments_dir {
            config.attachments_dir = attachments_dir;
        }
        if let Some(actor) = self.actor {
            config.actor = actor;
        }
        if let Some(timezone) = self.timezone {
            config.timezone = timezone
                .parse()
                .map_err(|err| anyhow!("Unknown timezone {timezone:?}: {err}"))?;
        }
        if let Some(layout) = self.layout {
            config.layout = layout;
        }
        if let Some(max_title_words) = self.max_title_words {
            config.max_title_words = max_title_words;
        }
        if let Some(published) = self.published {
            config.published = published;
        }
        if let Some(keep_tag_links) = self.keep_tag_links {
            config.keep_tag_links = keep_tag_links;
        }
        if !self.wanted_tags.is_empty() {
            config.wanted_tags = self.wanted_tags;
        }

        Ok(config)
    }
}
