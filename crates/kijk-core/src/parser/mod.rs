//! Parsers for kijk.nl pages and manifests
//!
//! Contains modules for the embedded page data, media entry
//! classification and DASH manifests.

pub mod dash;
pub mod media;
pub mod next_data;

pub use dash::parse_mpd_formats;
pub use media::{classify_media, classify_media_contents, classify_media_entry, media_extension};
pub use next_data::{extract_next_data, parse_video_page};
