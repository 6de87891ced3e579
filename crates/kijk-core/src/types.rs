//! Core data types for the kijk.nl extractor
//!
//! Contains the output record and the intermediate page description
//! produced by the parsers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Language key used for every subtitle track on kijk.nl
pub const SUBTITLE_LANGUAGE: &str = "nl";

/// Fully resolved description of one playable kijk.nl item
///
/// All fields implement Serialize and Deserialize for Tauri compatibility.
/// `season_number` and `episode_number` are only present for series episodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Item identifier taken from the last path segment (e.g., "CQvs74EAaJj")
    pub id: String,

    /// Movie title, or the programme title for episodes
    pub title: String,

    /// Short description of the movie or programme
    pub description: String,

    /// Playable variants, in the order the manifests listed them
    pub formats: Vec<Format>,

    /// Subtitle tracks keyed by language code
    pub subtitles: BTreeMap<String, Vec<SubtitleTrack>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_number: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<u32>,
}

/// A single subtitle file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    /// File extension (always "vtt" on kijk.nl)
    pub ext: String,

    /// Direct URL to the subtitle file
    pub url: String,
}

/// One concrete playable variant expanded from a DASH manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Format {
    /// Representation id from the manifest
    pub format_id: String,

    /// Resolved URL of the representation
    pub url: String,

    /// URL of the manifest this format came from
    pub manifest_url: String,

    /// Container extension (e.g., "mp4", "m4a")
    pub ext: String,

    /// "http_dash_segments" for segmented formats, otherwise the URL scheme
    pub protocol: String,

    /// Initialization segment followed by media segments, empty for
    /// single-file representations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fragments: Vec<Fragment>,

    pub width: Option<u32>,
    pub height: Option<u32>,

    /// Total bitrate in kbit/s
    pub tbr: Option<f64>,

    pub fps: Option<f64>,

    /// Video codec, "none" for audio-only formats
    pub vcodec: Option<String>,

    /// Audio codec, "none" for video-only formats
    pub acodec: Option<String>,

    /// Audio sampling rate in Hz
    pub asr: Option<u32>,

    pub language: Option<String>,
}

/// One segment of a DASH representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// Absolute segment URL
    pub url: String,

    /// Segment duration in seconds, `None` for the initialization segment
    pub duration: Option<f64>,
}

/// Which branch of the page classification applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageKind {
    Movie,
    /// Numbers are `None` when the page lists them as null (e.g. specials)
    Episode {
        season_number: Option<u32>,
        episode_number: Option<u32>,
    },
}

/// A classified media content entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaSource {
    /// WebVTT subtitle file
    Subtitle { url: String },

    /// DASH manifest to be expanded into formats
    DashManifest { url: String },

    /// Manifest kind we know about but do not expand ("ismc", "m3u8")
    Ignored { extension: String, url: String },
}

/// Parsed page before DASH manifests are expanded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoPage {
    pub id: String,
    pub title: String,
    pub description: String,
    pub kind: PageKind,

    /// Media entries in page order
    pub sources: Vec<MediaSource>,
}

impl VideoPage {
    /// Subtitle tracks listed on the page, keyed by language
    pub fn subtitles(&self) -> BTreeMap<String, Vec<SubtitleTrack>> {
        let mut subtitles = BTreeMap::new();
        for source in &self.sources {
            if let MediaSource::Subtitle { url } = source {
                subtitles
                    .entry(SUBTITLE_LANGUAGE.to_string())
                    .or_insert_with(Vec::new)
                    .push(SubtitleTrack {
                        ext: "vtt".to_string(),
                        url: url.clone(),
                    });
            }
        }
        subtitles
    }

    /// Builds the final record from this page and the expanded formats
    pub fn into_video_info(self, formats: Vec<Format>) -> VideoInfo {
        let subtitles = self.subtitles();
        let (season_number, episode_number) = match self.kind {
            PageKind::Movie => (None, None),
            PageKind::Episode {
                season_number,
                episode_number,
            } => (season_number, episode_number),
        };

        VideoInfo {
            id: self.id,
            title: self.title,
            description: self.description,
            formats,
            subtitles,
            season_number,
            episode_number,
        }
    }
}
