//! Convert a Mastodon export archive into Jekyll posts.
//!
//! The archive's `outbox.json` wraps each post in an activity record. The
//! exporter picks out top-level original posts by the configured author,
//! reassembles each full thread by following declared reply ids, derives a
//! title, slug, and dated filename from the content, and writes one
//! front-matter-plus-Markdown file per thread, copying media attachments
//! alongside. Existing files are never overwritten.
//!
//! It may work for other ActivityPub-compatible platforms, but has only
//! been tried with Mastodon exports.

pub mod archive;
pub mod cli;
pub mod config;
pub mod export;
pub mod render;

pub use archive::{Archive, ArchiveIndex};
pub use config::Config;
pub use export::ExportReport;
