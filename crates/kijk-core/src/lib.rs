//! Kijk.nl Extractor Core Library
//!
//! Provides an async API for resolving kijk.nl movie and episode pages into
//! titles, descriptions, DASH formats and subtitles.
//!
//! # Overview
//!
//! Every kijk.nl video page embeds its data as a `__NEXT_DATA__` JSON blob.
//! This crate provides:
//! - Rate-limited HTTP client for pages and manifests
//! - Parser for the embedded page data and its media entries
//! - DASH manifest parser producing concrete formats
//! - High-level [`KijkExtractor::resolve`] tying it all together
//!
//! # Example
//!
//! ```no_run
//! use kijk_core::{KijkExtractor, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let extractor = KijkExtractor::new()?;
//!
//!     let info = extractor
//!         .resolve("https://www.kijk.nl/films/video/the-bounty-hunter/CQvs74EAaJj")
//!         .await?;
//!
//!     println!("{}: {}", info.id, info.title);
//!     for format in &info.formats {
//!         println!("  {} ({})", format.format_id, format.url);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Strictness
//!
//! The page data is undocumented. Anything the extractor has not seen before
//! (a new page kind, a second media group, an unknown media extension, a
//! second subtitle file) fails with a dedicated [`KijkError`] variant instead
//! of being guessed at. HLS (`.m3u8`) and Smooth Streaming (`.ismc`)
//! manifests are skipped with a warning logged through `tracing`.

mod client;
mod error;
mod extractor;
pub mod parser;
mod types;
pub mod url;

// Re-export client types
pub use client::{ClientConfig, KijkClient, RateLimiter};

// Re-export error types
pub use error::{KijkError, Result};

// Re-export main extractor API
pub use extractor::KijkExtractor;

// Re-export parser functions
pub use parser::{parse_mpd_formats, parse_video_page};

// Re-export data types
pub use types::{Format, Fragment, MediaSource, PageKind, SubtitleTrack, VideoInfo, VideoPage};

// Re-export URL helper functions for convenience
pub use url::{VideoUrl, VideoUrlKind, build_episode_url, build_movie_url, parse_video_url};
