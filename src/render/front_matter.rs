//! YAML front matter for generated posts.
//!
//! The block is assembled line by line so the key order stays fixed and
//! the output stays byte-stable across runs: layout, published, title,
//! date, excerpt, categories, tags.

use anyhow::{Context, Result};

use crate::archive::Post;
use crate::config::Config;
use crate::render::title;

/// Build the front matter block for a post, including the opening and
/// closing `---` lines.
pub fn build_front_matter(config: &Config, post: &Post) -> Result<String> {
    let mut fm = String::from("---\n");

    fm.push_str(&format!("layout: {}\n", config.layout));
    fm.push_str(&format!("published: {}\n", config.published));
    fm.push_str(&format!("title: {}\n", title::derive_title(config, post)));

    let date = title::local_datetime(config, post)?;
    fm.push_str(&format!("date: {}\n", date.format("%Y-%m-%d %H:%M:%S %z")));

    // A dummy excerpt, or Jekyll takes the whole first paragraph.
    fm.push_str("excerpt: \"...\"\n");

    let tags = post.tags(true, true);

    fm.push_str("categories:\n");
    fm.push_str(&serde_yaml::to_string(&tags).context("Failed to serialize category list")?);

    fm.push_str(&format!("tags: [{}]\n", tags.join(", ")));

    fm.push_str("---\n");
    Ok(fm)
}
