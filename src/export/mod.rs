//! Export driver: filtering policy and non-destructive file writes.
//!
//! Walks the archive in order, picks out top-level original posts by the
//! configured author, renders each thread to a Jekyll post file, and
//! refuses to overwrite anything that already exists so the tool can be
//! re-run over the same output directory safely.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::archive::{Activity, Archive, ArchiveIndex, Post};
use crate::config::Config;
use crate::render::{body, front_matter, title};

/// Outcome of one export run.
#[derive(Debug, Default)]
pub struct ExportReport {
    /// Ids of posts written to new files, in archive order.
    pub generated: Vec<String>,
    /// Number of posts skipped because their target file already existed.
    pub skipped_existing: usize,
}

/// Whether an activity is a candidate top-level original post.
///
/// Any ambiguity resolves to rejection; this never fails. Checks run in
/// order: usable post object, actor ownership, not a reply, wanted-tag
/// intersection, not a boost.
pub fn is_exportable(config: &Config, activity: &Activity) -> bool {
    let Some(post) = activity.object.as_ref() else {
        debug!("Skipping post: object not usable");
        return false;
    };

    if activity.actor != config.actor || post.attributed_to != config.actor {
        debug!("Skipping post: wrong actor");
        return false;
    }

    if post.in_reply_to.as_deref().is_some_and(|id| !id.is_empty()) {
        debug!(id = %post.id, "Skipping post: is a reply");
        return false;
    }

    if !config.wanted_tags.is_empty() {
        // Literal comparison: extracted tags are lowercased but keep their
        // leading '#', so the configured list should carry one too.
        let post_tags = post.tags(true, false);
        if post_tags.is_empty() {
            debug!(id = %post.id, "Skipping post: no tags");
            return false;
        }
        if !post_tags.iter().any(|tag| config.wanted_tags.contains(tag)) {
            debug!(id = %post.id, "Skipping post: no wanted tags");
            return false;
        }
    }

    if title::is_boost(post) {
        debug!(id = %post.id, "Skipping post: boost");
        return false;
    }

    true
}

/// Run the export over a loaded archive.
///
/// Per-post failures (unparseable timestamp, attachment copy errors) skip
/// that post and continue; only the report reflects what was written.
pub fn run(config: &Config, archive: &Archive) -> Result<ExportReport> {
    let index = ArchiveIndex::build(archive, &config.actor);
    let mut report = ExportReport::default();

    for activity in &archive.ordered_items {
        if !is_exportable(config, activity) {
            continue;
        }
        // is_exportable only passes activities with a usable object.
        let Some(post) = activity.object.as_ref() else {
            continue;
        };
        debug!(id = %post.id, "Found a post");

        match export_post(config, &index, post) {
            Ok(Written::New(path)) => {
                info!(path = %path.display(), "Generated post");
                report.generated.push(post.id.clone());
            }
            Ok(Written::AlreadyExists(path)) => {
                warn!(path = %path.display(), "Already exists, not overwriting");
                report.skipped_existing += 1;
            }
            Err(err) => {
                warn!(id = %post.id, error = %err, "Skipping post");
            }
        }
    }

    Ok(report)
}

enum Written {
    New(PathBuf),
    AlreadyExists(PathBuf),
}

/// Render and write one thread root. The write is exclusive-create; an
/// existing file is reported, not replaced.
fn export_post(config: &Config, index: &ArchiveIndex<'_>, post: &Post) -> Result<Written> {
    let mut text = front_matter::build_front_matter(config, post)?;
    text.push('\n');
    text.push_str(&body::render_thread(config, index, post)?);
    text.push_str(&format!("\n[Imported from Mastodon]({})\n\n", post.url));

    let path = title::derive_filename(config, post)?;
    fs::create_dir_all(&config.posts_dir).with_context(|| {
        format!(
            "Failed to create posts directory: {}",
            config.posts_dir.display()
        )
    })?;

    match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(mut file) => {
            file.write_all(text.as_bytes())
                .with_context(|| format!("Failed to write post: {}", path.display()))?;
            Ok(Written::New(path))
        }
        Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(Written::AlreadyExists(path)),
        Err(err) => {
            Err(err).with_context(|| format!("Failed to create post: {}", path.display()))
        }
    }
}
