//! Attachment markup generation and file staging.
//!
//! Each attachment is resolved against the archive root, copied into the
//! configured attachment directory under its basename, and turned into
//! embeddable markup: a `figure` include for images, a `<video>` element
//! for video. Other media types are copied without markup. A missing
//! source file skips that attachment; a failed copy fails the post.

use std::fs;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::archive::{Attachment, Post};
use crate::config::Config;

/// Render markup for all of a post's attachments, copying the referenced
/// files into the attachment directory. Returns an empty string when the
/// post has no attachments.
pub fn render_attachments(config: &Config, post: &Post) -> Result<String> {
    let Some(attachments) = post.attachment.as_deref() else {
        return Ok(String::new());
    };

    let mut markup = String::new();

    for attachment in attachments {
        // Attachment URLs are root-relative within the extracted archive.
        let source = config
            .archive_root()
            .join(attachment.url.trim_start_matches('/'));

        if !source.is_file() {
            warn!(path = %source.display(), "Attachment file missing");
            continue;
        }

        // Directory components of the URL are discarded; same-named files
        // from different source paths collide (known limitation).
        let Some(basename) = source.file_name() else {
            continue;
        };
        let dest = config.attachments_dir.join(basename);

        markup.push_str(&embed_markup(attachment, &dest.to_string_lossy()));

        fs::create_dir_all(&config.attachments_dir).with_context(|| {
            format!(
                "Failed to create attachment directory: {}",
                config.attachments_dir.display()
            )
        })?;
        fs::copy(&source, &dest).with_context(|| {
            format!(
                "Failed to copy attachment {} to {}",
                source.display(),
                dest.display()
            )
        })?;
        debug!(source = %source.display(), dest = %dest.display(), "Copied attachment");
    }

    Ok(markup)
}

/// Markup for a single attachment, or an empty string for media types
/// that have no embedding.
fn embed_markup(attachment: &Attachment, dest: &str) -> String {
    let mut text = String::new();

    if attachment.media_type.starts_with("image/") {
        text.push_str("\n{% include figure popup=true image_path=\"");
        text.push_str(dest);
        text.push('"');
        if let Some(alt) = alt_text(attachment) {
            text.push_str(&format!(" alt=\"{alt}\""));
        }
        text.push_str(" %}\n");
    } else if attachment.media_type.starts_with("video/") {
        text.push_str("\n<video src=\"");
        // Strip the relative-path prefix so the source reads as
        // site-root-relative.
        text.push_str(dest.trim_start_matches('.'));
        text.push_str("\" controls=\"controls\"");
        if let Some(alt) = alt_text(attachment) {
            text.push_str(&format!(" alt=\"{alt}\""));
        }
        if let Some(width) = attachment.width.filter(|w| *w != 0) {
            text.push_str(&format!(" style=\"max-width: {width}px;\""));
        }
        text.push_str("></video>\n");
    }

    text
}

/// HTML-escaped, newline-flattened alt text, if the attachment has any.
fn alt_text(attachment: &Attachment) -> Option<String> {
    let name = attachment.name.as_deref()?;
    if name.is_empty() {
        return None;
    }
    let flattened = name.replace('\n', " ");
    Some(html_escape::encode_double_quoted_attribute(&flattened).into_owned())
}
