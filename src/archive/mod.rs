//! ActivityPub outbox data model and parse boundary.
//!
//! The archive is read fully into memory once and is read-only afterwards.
//! All shape checking happens here: fields that real exports sometimes omit,
//! null out, or replace with a different JSON type (boosts carry a plain URI
//! string as their `object`) deserialize to `None` instead of failing the
//! whole run. Downstream code only deals with typed `Option`s.

use std::collections::HashMap;
use std::fs;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::debug;

/// A Mastodon export archive: the outbox JSON document.
#[derive(Debug, Clone, Deserialize)]
pub struct Archive {
    /// Activities in archive order.
    #[serde(rename = "orderedItems", default)]
    pub ordered_items: Vec<Activity>,
}

impl Archive {
    /// Read and parse an archive file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = fs::File::open(path)
            .with_context(|| format!("Failed to open archive: {}", path.display()))?;
        let archive = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse archive: {}", path.display()))?;
        Ok(archive)
    }

    /// Parse an archive from a JSON string.
    pub fn parse_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse archive")
    }
}

/// One record in the archive: actor identity wrapping a post.
#[derive(Debug, Clone, Deserialize)]
pub struct Activity {
    #[serde(default)]
    pub actor: String,
    /// The wrapped post. `None` when the record has no usable post object,
    /// e.g. a boost whose `object` is just a URI string.
    #[serde(default, deserialize_with = "lenient")]
    pub object: Option<Post>,
}

/// The content object of an activity.
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    /// Join key for reply resolution. Empty when the archive omits it.
    #[serde(default)]
    pub id: String,
    /// Rich-text/HTML body.
    #[serde(default)]
    pub content: String,
    /// ISO-8601 publication timestamp.
    #[serde(default)]
    pub published: String,
    /// Canonical link to the original post.
    #[serde(default)]
    pub url: String,
    #[serde(rename = "attributedTo", default)]
    pub attributed_to: String,
    /// Non-empty when this post is a reply rather than a thread root.
    #[serde(rename = "inReplyTo", default)]
    pub in_reply_to: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub tag: Option<Vec<Tag>>,
    #[serde(default, deserialize_with = "lenient")]
    pub attachment: Option<Vec<Attachment>>,
    #[serde(default, deserialize_with = "lenient")]
    pub replies: Option<Replies>,
}

impl Post {
    /// Collect the post's hashtags in declared order.
    ///
    /// Entries of any other tag type (mentions, emoji) are ignored.
    pub fn tags(&self, lowercase: bool, strip_hash: bool) -> Vec<String> {
        let Some(tags) = self.tag.as_deref() else {
            return Vec::new();
        };

        tags.iter()
            .filter(|tag| tag.kind == "Hashtag")
            .map(|tag| {
                let mut name = if lowercase {
                    tag.name.to_lowercase()
                } else {
                    tag.name.clone()
                };
                if strip_hash {
                    name = name.trim_start_matches('#').to_string();
                }
                name
            })
            .collect()
    }

    /// Direct reply ids in authorial order, or `None` when the reply
    /// structure is absent, malformed, or empty. Only the first page is
    /// consulted; there is no pagination traversal.
    pub fn reply_ids(&self) -> Option<&[String]> {
        let items = self.replies.as_ref()?.first.as_ref()?.items.as_deref()?;
        if items.is_empty() {
            None
        } else {
            Some(items)
        }
    }
}

/// A `tag` entry on a post; only `type == "Hashtag"` entries are tags.
#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
}

/// A media attachment on a post.
#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    /// Root-relative path within the extracted archive.
    #[serde(default)]
    pub url: String,
    #[serde(rename = "mediaType", default)]
    pub media_type: String,
    /// Alt text. Mastodon emits `null` for attachments without one.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub width: Option<u64>,
}

/// The `replies` collection on a post.
#[derive(Debug, Clone, Deserialize)]
pub struct Replies {
    #[serde(default, deserialize_with = "lenient")]
    pub first: Option<RepliesPage>,
}

/// First page of a reply collection; its `items` define thread order.
#[derive(Debug, Clone, Deserialize)]
pub struct RepliesPage {
    #[serde(default, deserialize_with = "lenient")]
    pub items: Option<Vec<String>>,
}

/// Deserialize a value of the expected shape, mapping anything else
/// (wrong type, null, missing nested keys) to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Id-to-post index over one archive, built once per run.
///
/// Only posts passing the ownership check (activity actor and post
/// `attributedTo` both equal to the configured actor) are indexed, so a
/// reply id pointing at another author's post can never resolve. The first
/// occurrence of an id wins, matching archive-order lookup.
#[derive(Debug)]
pub struct ArchiveIndex<'a> {
    by_id: HashMap<&'a str, &'a Post>,
}

impl<'a> ArchiveIndex<'a> {
    /// Build the index for the given actor identity.
    pub fn build(archive: &'a Archive, actor: &str) -> Self {
        let mut by_id = HashMap::new();

        for activity in &archive.ordered_items {
            let Some(post) = activity.object.as_ref() else {
                continue;
            };
            if post.id.is_empty() {
                continue;
            }
            if activity.actor != actor || post.attributed_to != actor {
                debug!(id = %post.id, "Not indexing post: wrong actor");
                continue;
            }
            by_id.entry(post.id.as_str()).or_insert(post);
        }

        Self { by_id }
    }

    /// Look up an owned post by id.
    pub fn find(&self, id: &str) -> Option<&'a Post> {
        self.by_id.get(id).copied()
    }

    /// Number of indexed posts.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the index holds no posts.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
