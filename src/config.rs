//! Exporter configuration.
//!
//! All knobs live in one immutable value that is passed into every component;
//! there is no process-wide state. The config can be loaded from a TOML file
//! and every field has a default, so an empty file (or none at all) is valid.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;

/// Configuration for one export run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Archive file extracted from the export (typically `outbox.json`).
    pub archive: PathBuf,
    /// Directory where generated post files are written.
    pub posts_dir: PathBuf,
    /// Directory where attachment files (images, video) are copied.
    pub attachments_dir: PathBuf,
    /// ActivityPub actor URL. Only posts by this actor are processed,
    /// both as thread roots and as inlined replies.
    pub actor: String,
    /// Local timezone for post dates; archives are typically in UTC.
    pub timezone: Tz,
    /// Published status written into front matter. `false` is safer so
    /// generated posts can be previewed before going live.
    pub published: bool,
    /// Jekyll layout name, which may vary by theme.
    pub layout: String,
    /// Maximum number of words used when deriving titles and slugs.
    pub max_title_words: usize,
    /// Keep hashtag links in post bodies. Removing them is good for posts
    /// with trailing hashtags but breaks posts with inline hashtags.
    pub keep_tag_links: bool,
    /// Restrict the export to posts carrying one of these tags, compared
    /// literally against the post's lowercased tags (leading `#` kept).
    /// Empty means every post is eligible.
    pub wanted_tags: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            archive: PathBuf::from("./outbox.json"),
            posts_dir: PathBuf::from("./_posts"),
            attachments_dir: PathBuf::from("./assets/images"),
            actor: "https://mastodon.example.com/users/myname".to_string(),
            timezone: Tz::UTC,
            published: false,
            layout: "single".to_string(),
            max_title_words: 15,
            keep_tag_links: false,
            wanted_tags: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file. Missing keys fall back to
    /// their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Directory the archive was extracted into. Attachment URLs in the
    /// archive are root-relative and resolve against this directory.
    pub fn archive_root(&self) -> PathBuf {
        match self.archive.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}
