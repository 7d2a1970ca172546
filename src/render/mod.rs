//! Rendering of posts into generated-file pieces: titles and filenames,
//! front matter, normalized thread bodies, and attachment markup.

pub mod attachments;
pub mod body;
pub mod front_matter;
pub mod title;

pub use attachments::render_attachments;
pub use body::{render_body, render_thread};
pub use front_matter::build_front_matter;
pub use title::{derive_filename, derive_slug, derive_title};
