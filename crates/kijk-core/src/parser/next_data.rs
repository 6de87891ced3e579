//! `__NEXT_DATA__` page parser for kijk.nl
//!
//! Every kijk.nl video page embeds its Next.js props as JSON in a
//! `<script id="__NEXT_DATA__">` element. This module locates that blob,
//! deserializes the parts we need and classifies the page.

use scraper::{Html, Selector};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{KijkError, Result};
use crate::parser::media::classify_media_contents;
use crate::types::{PageKind, VideoPage};

/// `page` value of series episode pages
pub const EPISODE_PAGE: &str = "/programmas/format";

/// `page` value of movie pages
pub const MOVIE_PAGE: &str = "/movies";

/// Only `page` is decoded up front. The rest of the props is decoded
/// piecewise once the page kind is known, so shape changes elsewhere do
/// not hide an unknown page kind.
#[derive(Debug, Deserialize)]
struct NextData {
    page: String,
    #[serde(default)]
    props: Value,
}

/// Programme metadata, only present on episode pages
#[derive(Debug, Deserialize)]
struct RawFormat {
    title: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVideo {
    title: Option<String>,
    short_description: Option<String>,
    /// Outer `None`: key missing. Inner `None`: key present but null.
    #[serde(default, deserialize_with = "present")]
    season_number: Option<Option<u32>>,
    #[serde(default, deserialize_with = "present")]
    tv_season_episode_number: Option<Option<u32>>,
    /// Groups stay raw until their count has been checked
    media: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMedia {
    media_content: Vec<Value>,
}

#[derive(Debug, Clone, Copy)]
enum PageType {
    Episode,
    Movie,
}

fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Option<u32>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<u32>::deserialize(deserializer).map(Some)
}

/// Extracts the raw JSON text of the `__NEXT_DATA__` script element
///
/// # Errors
/// Returns `ParseError` if the element is missing or empty
pub fn extract_next_data(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"script[id="__NEXT_DATA__"]"#)
        .map_err(|e| KijkError::ParseError(format!("Invalid selector: {:?}", e)))?;

    let json = document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>())
        .ok_or_else(|| KijkError::ParseError("__NEXT_DATA__ script not found".to_string()))?;

    let json = json.trim();
    if json.is_empty() {
        return Err(KijkError::ParseError(
            "__NEXT_DATA__ script is empty".to_string(),
        ));
    }

    Ok(json.to_string())
}

/// Parses a video page and classifies its media entries
///
/// # Arguments
/// * `html` - Raw HTML of a movie or episode page
/// * `id` - Item id taken from the page URL
///
/// # Errors
/// - `ParseError` if the JSON blob is missing, malformed, lacks a required
///   field or lists no media group
/// - `UnknownPageKind` if `page` is neither movie nor episode
/// - `MultipleMediaGroups` if more than one media group is listed
/// - any error from [`classify_media_contents`]
pub fn parse_video_page(html: &str, id: &str) -> Result<VideoPage> {
    let json = extract_next_data(html)?;
    let data: NextData = serde_json::from_str(&json)?;

    let page_type = match data.page.as_str() {
        EPISODE_PAGE => PageType::Episode,
        MOVIE_PAGE => PageType::Movie,
        other => return Err(KijkError::UnknownPageKind(other.to_string())),
    };

    let video: RawVideo = decode_prop(&data.props, "/pageProps/video")?;

    let (title, description, kind) = match page_type {
        PageType::Episode => {
            let format: RawFormat = decode_prop(&data.props, "/pageProps/format")?;
            let kind = PageKind::Episode {
                season_number: video.season_number.ok_or_else(|| missing("video.seasonNumber"))?,
                episode_number: video
                    .tv_season_episode_number
                    .ok_or_else(|| missing("video.tvSeasonEpisodeNumber"))?,
            };
            (
                format.title.ok_or_else(|| missing("format.title"))?,
                format.description.ok_or_else(|| missing("format.description"))?,
                kind,
            )
        }
        PageType::Movie => (
            video.title.ok_or_else(|| missing("video.title"))?,
            video
                .short_description
                .ok_or_else(|| missing("video.shortDescription"))?,
            PageKind::Movie,
        ),
    };

    let group = match video.media.as_slice() {
        [] => return Err(KijkError::ParseError("video has no media group".to_string())),
        [group] => RawMedia::deserialize(group)?,
        groups => return Err(KijkError::MultipleMediaGroups(groups.len())),
    };

    let sources = classify_media_contents(&group.media_content)?;

    Ok(VideoPage {
        id: id.to_string(),
        title,
        description,
        kind,
        sources,
    })
}

/// Decodes the value at `pointer` inside `props`
fn decode_prop<T: DeserializeOwned>(props: &Value, pointer: &str) -> Result<T> {
    let field = format!("props{}", pointer.replace('/', "."));
    let value = props.pointer(pointer).ok_or_else(|| missing(&field))?;
    T::deserialize(value).map_err(|e| KijkError::ParseError(format!("invalid {}: {}", field, e)))
}

fn missing(field: &str) -> KijkError {
    KijkError::ParseError(format!("missing or null field {}", field))
}
