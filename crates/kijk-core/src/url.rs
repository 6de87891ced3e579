//! URL helper functions for kijk.nl
//!
//! Recognises the two page shapes the extractor supports and builds
//! page URLs from their components.

use regex::Regex;
use serde::{Deserialize, Serialize};

const BASE_URL: &str = "https://www.kijk.nl";

const VIDEO_URL_PATTERN: &str = r"^https?://(?:www\.)?kijk\.nl/(?:(?P<movie>films/video/[^/]*/)|programmas/[^/]*/[^/]*/seizoen/[^/]*/afleveringen/video/[^/]*/)(?P<id>[A-Za-z0-9]+)";

/// Shape of a supported page URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoUrlKind {
    /// `/films/video/<slug>/<id>`
    Movie,
    /// `/programmas/<slug>/<id>/seizoen/<id>/afleveringen/video/<slug>/<id>`
    Episode,
}

/// Components of a matched kijk.nl page URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoUrl {
    pub kind: VideoUrlKind,

    /// Item identifier, the final path segment
    pub id: String,

    /// Path including the leading slash, without scheme and host
    pub path: String,
}

/// Matches a kijk.nl page URL and extracts its item id
///
/// The id must be a run of ASCII letters and digits; anything after it
/// (query string, trailing slash) is ignored.
///
/// # Example
/// ```
/// use kijk_core::url::{parse_video_url, VideoUrlKind};
/// let url = parse_video_url("https://kijk.nl/films/video/the-bounty-hunter/CQvs74EAaJj").unwrap();
/// assert_eq!(url.id, "CQvs74EAaJj");
/// assert_eq!(url.kind, VideoUrlKind::Movie);
/// ```
pub fn parse_video_url(url: &str) -> Option<VideoUrl> {
    let re = Regex::new(VIDEO_URL_PATTERN).ok()?;
    let caps = re.captures(url.trim())?;

    let id = caps.name("id")?;
    let kind = if caps.name("movie").is_some() {
        VideoUrlKind::Movie
    } else {
        VideoUrlKind::Episode
    };

    // Everything between the host and the end of the id
    let matched = &url.trim()[..id.end()];
    let path_start = matched.find("kijk.nl/").map(|i| i + "kijk.nl".len())?;

    Some(VideoUrl {
        kind,
        id: id.as_str().to_string(),
        path: matched[path_start..].to_string(),
    })
}

/// Builds the full movie page URL from slug and id
///
/// # Example
/// ```
/// use kijk_core::url::build_movie_url;
/// let url = build_movie_url("the-bounty-hunter", "CQvs74EAaJj");
/// assert_eq!(url, "https://www.kijk.nl/films/video/the-bounty-hunter/CQvs74EAaJj");
/// ```
pub fn build_movie_url(slug: &str, id: &str) -> String {
    format!("{}/films/video/{}/{}", BASE_URL, slug, id)
}

/// Builds the full episode page URL
///
/// # Arguments
/// * `programme_slug` - URL slug of the programme (e.g., "ik-ook-van-jou")
/// * `programme_id` - Programme identifier (e.g., "Wp2Fizct6mD")
/// * `season_id` - Season identifier (e.g., "113154600199")
/// * `episode_slug` - URL slug of the episode
/// * `id` - Episode identifier
pub fn build_episode_url(
    programme_slug: &str,
    programme_id: &str,
    season_id: &str,
    episode_slug: &str,
    id: &str,
) -> String {
    format!(
        "{}/programmas/{}/{}/seizoen/{}/afleveringen/video/{}/{}",
        BASE_URL, programme_slug, programme_id, season_id, episode_slug, id
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPISODE_URL: &str = "https://kijk.nl/programmas/ik-ook-van-jou/Wp2Fizct6mD/seizoen/113154600199/afleveringen/video/empty_episode-ik-ook-van-jou-s1-e18-2013-09-18/IigojlxqRQYg";

    #[test]
    fn test_parse_movie_url() {
        let url = parse_video_url("https://kijk.nl/films/video/the-bounty-hunter/CQvs74EAaJj")
            .expect("Movie URL should match");
        assert_eq!(url.kind, VideoUrlKind::Movie);
        assert_eq!(url.id, "CQvs74EAaJj");
        assert_eq!(url.path, "/films/video/the-bounty-hunter/CQvs74EAaJj");
    }

    #[test]
    fn test_parse_movie_url_with_www_and_query() {
        let url = parse_video_url("http://www.kijk.nl/films/video/the-bounty-hunter/CQvs74EAaJj?autoplay=1")
            .expect("Movie URL should match");
        assert_eq!(url.id, "CQvs74EAaJj");
        assert_eq!(url.path, "/films/video/the-bounty-hunter/CQvs74EAaJj");
    }

    #[test]
    fn test_parse_episode_url() {
        let url = parse_video_url(EPISODE_URL).expect("Episode URL should match");
        assert_eq!(url.kind, VideoUrlKind::Episode);
        assert_eq!(url.id, "IigojlxqRQYg");
        assert!(url.path.starts_with("/programmas/ik-ook-van-jou/"));
        assert!(url.path.ends_with("/IigojlxqRQYg"));
    }

    #[test]
    fn test_parse_url_other_host() {
        assert_eq!(
            parse_video_url("https://example.com/films/video/the-bounty-hunter/CQvs74EAaJj"),
            None
        );
    }

    #[test]
    fn test_parse_url_other_path() {
        assert_eq!(parse_video_url("https://kijk.nl/programmas/ik-ook-van-jou"), None);
        assert_eq!(parse_video_url("https://kijk.nl/films/video/the-bounty-hunter/"), None);
    }

    #[test]
    fn test_build_movie_url_roundtrips_through_parser() {
        let url = build_movie_url("the-bounty-hunter", "CQvs74EAaJj");
        let parsed = parse_video_url(&url).expect("Built URL should match");
        assert_eq!(parsed.id, "CQvs74EAaJj");
        assert_eq!(parsed.kind, VideoUrlKind::Movie);
    }

    #[test]
    fn test_build_episode_url() {
        let url = build_episode_url(
            "ik-ook-van-jou",
            "Wp2Fizct6mD",
            "113154600199",
            "empty_episode-ik-ook-van-jou-s1-e18-2013-09-18",
            "IigojlxqRQYg",
        );
        assert_eq!(url, EPISODE_URL.replace("https://kijk.nl", "https://www.kijk.nl"));
    }
}
