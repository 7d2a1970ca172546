//! Title, slug, and filename derivation from post content.
//!
//! Titles come from the first few words of the post, stopping early at the
//! end of a sentence. The HTML stripping here is deliberately naive: a
//! non-validating `<.*?>` pattern is all a short title needs, and swapping
//! in a real parser would change whitespace and entity behavior.

use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use chrono::DateTime;
use chrono_tz::Tz;
use regex::Regex;

use crate::archive::Post;
use crate::config::Config;

fn tag_re() -> &'static Regex {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    TAG_RE.get_or_init(|| Regex::new(r"<.*?>").expect("tag pattern is valid"))
}

/// Flatten post content to plain text: paragraph breaks become blank lines
/// (otherwise adjacent paragraphs run together), markup spans are stripped,
/// and HTML entities are decoded.
fn plain_text(content: &str) -> String {
    let with_breaks = content.replace("</p><p>", "</p>\n\n<p>");
    let stripped = tag_re().replace_all(&with_breaks, "");
    html_escape::decode_html_entities(&stripped).into_owned()
}

/// Derive a plain-text title from the first words of the post.
///
/// Uses at most `max_title_words` words and stops early at the end of a
/// sentence. Colons and quotes are dropped from each word, and trailing
/// punctuation is trimmed from the result. A post with no words gets an
/// empty title.
pub fn derive_title(config: &Config, post: &Post) -> String {
    let plain = plain_text(&post.content);

    let mut words = Vec::new();
    for word in plain.split_whitespace().take(config.max_title_words) {
        // Characters that don't work in titles.
        let cleaned: String = word
            .chars()
            .filter(|c| !matches!(c, ':' | '"' | '\''))
            .collect();
        let sentence_end = cleaned.ends_with('.') || cleaned.ends_with('\n');
        words.push(cleaned);
        if sentence_end {
            break;
        }
    }

    words
        .join(" ")
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .to_string()
}

/// Derive a URL-safe slug from the post title, words separated by hyphens.
pub fn derive_slug(config: &Config, post: &Post) -> String {
    let title = derive_title(config, post).to_lowercase();
    let unpunctuated: String = title
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect();

    unpunctuated
        .replace("  ", " ")
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect()
}

/// Whether the post is a boost surfaced as a synthetic repost notice.
///
/// Boosts show up as posts whose content starts with a literal `RE: `
/// followed by the original URL; the prefix is checked on the stripped
/// plain text, before title cleanup removes the colon.
pub fn is_boost(post: &Post) -> bool {
    plain_text(&post.content).trim_start().starts_with("RE: ")
}

/// The post's publication instant converted to the configured local timezone.
pub fn local_datetime(config: &Config, post: &Post) -> Result<DateTime<Tz>> {
    let published = DateTime::parse_from_rfc3339(&post.published).with_context(|| {
        format!("Unparseable published timestamp: {:?}", post.published)
    })?;
    Ok(published.with_timezone(&config.timezone))
}

/// Path for the generated post file: `<posts_dir>/<YYYY-MM-DD>-<slug>.markdown`,
/// with the date in the configured local timezone.
pub fn derive_filename(config: &Config, post: &Post) -> Result<PathBuf> {
    let date = local_datetime(config, post)?.format("%Y-%m-%d");
    let name = format!("{}-{}.markdown", date, derive_slug(config, post));
    Ok(config.posts_dir.join(name))
}
