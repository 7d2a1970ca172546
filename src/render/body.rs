//! Post body normalization and thread reconstruction.
//!
//! A thread is a root post plus its replies, resolved by id in the order
//! the reply collection declares them, rendered as one body. Only posts
//! owned by the configured actor ever make it in; the ownership filter
//! lives in [`ArchiveIndex`](crate::archive::ArchiveIndex).

use std::collections::HashSet;
use std::sync::OnceLock;

use anyhow::Result;
use scraper::{Html, Selector};
use tracing::debug;

use crate::archive::{ArchiveIndex, Post};
use crate::config::Config;
use crate::render::attachments;

fn hashtag_link_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("a.mention.hashtag").expect("valid selector"))
}

/// Normalize one post's content.
///
/// Unless `keep_tag_links` is set, hashtag link anchors are removed
/// entirely, text included. Mastodon appends them to the end of the post
/// where they read as noise once the tags live in front matter; posts with
/// inline hashtags should keep them.
pub fn render_body(content: &str, keep_tag_links: bool) -> String {
    let mut fragment = Html::parse_fragment(content);

    if !keep_tag_links {
        let doomed: Vec<_> = fragment
            .select(hashtag_link_selector())
            .map(|element| element.id())
            .collect();
        for id in doomed {
            if let Some(mut node) = fragment.tree.get_mut(id) {
                node.detach();
            }
        }
    }

    fragment.root_element().inner_html()
}

/// Render the full thread rooted at `post`: its normalized content, its
/// attachment markup, then each resolved reply in declared order,
/// recursively. Replies missing from the index (deleted, foreign, or
/// malformed) are silently skipped, as is any reply already rendered
/// higher up the thread, so a looping reply graph cannot recurse forever.
///
/// Attachment files are copied as a side effect; a copy failure aborts
/// this thread but not the run.
pub fn render_thread(config: &Config, index: &ArchiveIndex<'_>, post: &Post) -> Result<String> {
    let mut rendered = HashSet::new();
    render_subthread(config, index, post, &mut rendered)
}

fn render_subthread(
    config: &Config,
    index: &ArchiveIndex<'_>,
    post: &Post,
    rendered: &mut HashSet<String>,
) -> Result<String> {
    if !post.id.is_empty() {
        rendered.insert(post.id.clone());
    }

    let mut body = render_body(&post.content, config.keep_tag_links);
    body.push('\n');

    let attachment_markup = attachments::render_attachments(config, post)?;
    if !attachment_markup.is_empty() {
        body.push('\n');
        body.push_str(&attachment_markup);
    }

    if let Some(reply_ids) = post.reply_ids() {
        debug!(count = reply_ids.len(), "Seeking replies");
        for reply_id in reply_ids {
            if rendered.contains(reply_id.as_str()) {
                debug!(id = %reply_id, "Skipping reply: already in thread");
                continue;
            }
            if let Some(reply) = index.find(reply_id) {
                debug!(id = %reply_id, "Processing reply");
                body.push('\n');
                body.push_str(&render_subthread(config, index, reply, rendered)?);
            }
        }
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::Archive;

    #[test]
    fn removes_hashtag_links_and_their_text() {
        let content = r##"<p>Look at this <a href="https://example.social/tags/cats" class="mention hashtag" rel="tag">#<span>cats</span></a> photo</p>"##;
        let body = render_body(content, false);

        assert!(!body.contains("cats"));
        assert!(body.contains("Look at this"));
        assert!(body.contains("photo"));
    }

    #[test]
    fn keeps_hashtag_links_when_configured() {
        let content = r##"<p>Inline <a href="https://example.social/tags/cats" class="mention hashtag" rel="tag">#<span>cats</span></a> matter here</p>"##;
        let body = render_body(content, true);

        assert!(body.contains("cats"));
        assert!(body.contains("mention hashtag"));
    }

    #[test]
    fn keeps_ordinary_links() {
        let content = r#"<p>See <a href="https://example.com/page">the page</a></p>"#;
        let body = render_body(content, false);

        assert!(body.contains("the page"));
        assert!(body.contains("https://example.com/page"));
    }

    #[test]
    fn survives_markup_without_paragraphs() {
        let body = render_body("just bare text", false);
        assert!(body.contains("just bare text"));
    }

    fn thread_archive() -> Archive {
        Archive::parse_str(
            r#"{
            "orderedItems": [
                {"actor": "a", "object": {
                    "id": "root", "attributedTo": "a",
                    "content": "<p>Root post.</p>",
                    "replies": {"first": {"items": ["reply-2", "reply-1"]}}
                }},
                {"actor": "a", "object": {
                    "id": "reply-1", "attributedTo": "a",
                    "content": "<p>First written reply.</p>"
                }},
                {"actor": "a", "object": {
                    "id": "reply-2", "attributedTo": "a",
                    "content": "<p>Listed-first reply.</p>",
                    "replies": {"first": {"items": ["nested"]}}
                }},
                {"actor": "a", "object": {
                    "id": "nested", "attributedTo": "a",
                    "content": "<p>Nested reply.</p>"
                }},
                {"actor": "intruder", "object": {
                    "id": "foreign", "attributedTo": "intruder",
                    "content": "<p>Injected content.</p>"
                }}
            ]
        }"#,
        )
        .unwrap()
    }

    #[test]
    fn thread_follows_declared_reply_order() {
        let archive = thread_archive();
        let index = ArchiveIndex::build(&archive, "a");
        let config = Config::default();
        let root = index.find("root").unwrap();

        let body = render_thread(&config, &index, root).unwrap();

        let listed_first = body.find("Listed-first reply").unwrap();
        let first_written = body.find("First written reply").unwrap();
        let nested = body.find("Nested reply").unwrap();
        // items order, not archive order; nested replies stay under
        // their parent.
        assert!(listed_first < nested);
        assert!(nested < first_written);
    }

    #[test]
    fn thread_excludes_foreign_replies() {
        let archive = Archive::parse_str(
            r#"{
            "orderedItems": [
                {"actor": "a", "object": {
                    "id": "root", "attributedTo": "a",
                    "content": "<p>Root post.</p>",
                    "replies": {"first": {"items": ["foreign"]}}
                }},
                {"actor": "intruder", "object": {
                    "id": "foreign", "attributedTo": "intruder",
                    "content": "<p>Injected content.</p>"
                }}
            ]
        }"#,
        )
        .unwrap();
        let index = ArchiveIndex::build(&archive, "a");
        let root = index.find("root").unwrap();

        let body = render_thread(&Config::default(), &index, root).unwrap();
        assert!(!body.contains("Injected content"));
    }

    #[test]
    fn thread_rendering_is_deterministic() {
        let archive = thread_archive();
        let index = ArchiveIndex::build(&archive, "a");
        let config = Config::default();
        let root = index.find("root").unwrap();

        let first = render_thread(&config, &index, root).unwrap();
        let second = render_thread(&config, &index, root).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn looping_reply_graph_terminates() {
        let archive = Archive::parse_str(
            r#"{
            "orderedItems": [
                {"actor": "a", "object": {
                    "id": "root", "attributedTo": "a",
                    "content": "<p>Root post.</p>",
                    "replies": {"first": {"items": ["reply"]}}
                }},
                {"actor": "a", "object": {
                    "id": "reply", "attributedTo": "a",
                    "content": "<p>Reply pointing back.</p>",
                    "replies": {"first": {"items": ["root", "reply"]}}
                }}
            ]
        }"#,
        )
        .unwrap();
        let index = ArchiveIndex::build(&archive, "a");
        let root = index.find("root").unwrap();

        let body = render_thread(&Config::default(), &index, root).unwrap();
        assert_eq!(body.matches("Root post.").count(), 1);
        assert_eq!(body.matches("Reply pointing back.").count(), 1);
    }

    #[test]
    fn unresolvable_reply_ids_are_skipped() {
        let archive = Archive::parse_str(
            r#"{
            "orderedItems": [
                {"actor": "a", "object": {
                    "id": "root", "attributedTo": "a",
                    "content": "<p>Root post.</p>",
                    "replies": {"first": {"items": ["gone"]}}
                }}
            ]
        }"#,
        )
        .unwrap();
        let index = ArchiveIndex::build(&archive, "a");
        let root = index.find("root").unwrap();

        let body = render_thread(&Config::default(), &index, root).unwrap();
        assert!(body.contains("Root post."));
    }
}
