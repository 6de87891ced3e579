//! Media content classification
//!
//! Maps the entries of a video's media group onto [`MediaSource`] values,
//! refusing anything outside the handful of shapes kijk.nl is known to use.

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{KijkError, Result};
use crate::types::MediaSource;

/// The only `__typename` seen on media content entries
pub const MEDIA_FILE_TYPENAME: &str = "MediaFile";

/// Returns the trailing alphanumeric run of a media URL
///
/// The run must be preceded by at least one character of any kind, so
/// `"a/b.mpd"` gives `"mpd"` and `"a/b_mpd"` gives `"mpd"` as well.
/// Returns `None` when the URL does not end in a letter or digit.
pub fn media_extension(url: &str) -> Option<&str> {
    let re = Regex::new(r".([A-Za-z0-9]+)$").ok()?;
    re.captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Classifies a single media content entry
///
/// # Errors
/// - `UnknownMediaType` if `typename` is not `"MediaFile"`
/// - `UnknownMediaExtension` if the URL suffix is not one of
///   `vtt`, `mpd`, `ismc`, `m3u8`
pub fn classify_media(typename: &str, source_url: &str) -> Result<MediaSource> {
    if typename != MEDIA_FILE_TYPENAME {
        return Err(KijkError::UnknownMediaType(typename.to_string()));
    }

    let url = source_url.to_string();
    match media_extension(source_url) {
        Some("vtt") => Ok(MediaSource::Subtitle { url }),
        Some("mpd") => Ok(MediaSource::DashManifest { url }),
        Some(extension @ ("ismc" | "m3u8")) => {
            warn!(url = %source_url, "ignoring {} manifest", extension);
            Ok(MediaSource::Ignored {
                extension: extension.to_string(),
                url,
            })
        }
        other => Err(KijkError::UnknownMediaExtension {
            extension: other.unwrap_or_default().to_string(),
            url,
        }),
    }
}

/// Typename is read on its own so unknown entry shapes are reported
/// as `UnknownMediaType` rather than as a missing `sourceUrl`
#[derive(Debug, Deserialize)]
struct RawTypename {
    #[serde(rename = "__typename")]
    typename: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMediaFile {
    source_url: String,
}

/// Classifies one raw `mediaContent` entry from the page data
///
/// `sourceUrl` is only required once `__typename` is known to be
/// `"MediaFile"`.
///
/// # Errors
/// - `ParseError` if `__typename` is missing, or `sourceUrl` is missing
///   on a `MediaFile` entry
/// - any error from [`classify_media`]
pub fn classify_media_entry(entry: &Value) -> Result<MediaSource> {
    let RawTypename { typename } = RawTypename::deserialize(entry)?;
    if typename != MEDIA_FILE_TYPENAME {
        return Err(KijkError::UnknownMediaType(typename));
    }

    let RawMediaFile { source_url } = RawMediaFile::deserialize(entry)?;
    classify_media(&typename, &source_url)
}

/// Classifies every entry in page order, allowing at most one subtitle
///
/// # Errors
/// Propagates [`classify_media_entry`] errors and returns
/// `MultipleSubtitles` on the second `.vtt` entry.
pub fn classify_media_contents(entries: &[Value]) -> Result<Vec<MediaSource>> {
    let mut sources = Vec::new();
    let mut has_subtitle = false;

    for entry in entries {
        let source = classify_media_entry(entry)?;

        if matches!(source, MediaSource::Subtitle { .. }) {
            if has_subtitle {
                return Err(KijkError::MultipleSubtitles);
            }
            has_subtitle = true;
        }

        sources.push(source);
    }

    Ok(sources)
}
