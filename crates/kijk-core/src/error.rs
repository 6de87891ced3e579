//! Error types for the kijk.nl extractor
//!
//! Every input shape the extractor does not recognise gets its own variant,
//! so callers can tell why an extraction was refused.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for all kijk.nl extractor operations
///
/// Implements Display for human-readable messages and Serialize
/// for Tauri command compatibility.
#[derive(Error, Debug)]
pub enum KijkError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Page or manifest returned 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by server (HTTP 429)
    #[error("Rate limited - too many requests")]
    RateLimited,

    /// Embedded page data or manifest could not be parsed
    #[error("Failed to parse page data: {0}")]
    ParseError(String),

    /// URL is not a kijk.nl movie or episode page
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The `page` discriminator holds a value we have never seen
    #[error("Unknown page kind '{0}'")]
    UnknownPageKind(String),

    /// The video lists more than one media group
    #[error("Expected a single media group, found {0}")]
    MultipleMediaGroups(usize),

    /// A media content entry has an unexpected `__typename`
    #[error("Unknown media type '{0}'")]
    UnknownMediaType(String),

    /// A media URL ends in an extension we do not handle
    #[error("Unknown media extension '{extension}' in {url}")]
    UnknownMediaExtension { extension: String, url: String },

    /// More than one subtitle file was listed for the video
    #[error("More than one subtitle track found")]
    MultipleSubtitles,
}

impl From<serde_json::Error> for KijkError {
    fn from(error: serde_json::Error) -> Self {
        KijkError::ParseError(format!("invalid __NEXT_DATA__ JSON: {}", error))
    }
}

impl From<quick_xml::DeError> for KijkError {
    fn from(error: quick_xml::DeError) -> Self {
        KijkError::ParseError(format!("invalid DASH manifest: {}", error))
    }
}

impl Serialize for KijkError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for kijk.nl operations
pub type Result<T> = std::result::Result<T, KijkError>;
