//! Main extractor API for kijk.nl
//!
//! Combines the HTTP client, the page parser and the DASH manifest
//! parser into a single `resolve` call.

use tracing::{debug, warn};

use crate::client::{ClientConfig, KijkClient};
use crate::error::{KijkError, Result};
use crate::parser::{parse_mpd_formats, parse_video_page};
use crate::types::{Format, MediaSource, VideoInfo};
use crate::url::parse_video_url;

/// Main extractor API for kijk.nl
///
/// Resolves a movie or episode page URL into a [`VideoInfo`] with
/// title, description, DASH formats and subtitles.
#[derive(Debug)]
pub struct KijkExtractor {
    client: KijkClient,
}

impl KijkExtractor {
    /// Create a new extractor with default configuration
    ///
    /// # Errors
    /// Returns error if HTTP client initialization fails
    pub fn new() -> Result<Self> {
        let client = KijkClient::new()?;
        Ok(Self { client })
    }

    /// Create a new extractor with custom client configuration
    ///
    /// # Errors
    /// Returns error if HTTP client initialization fails
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let client = KijkClient::with_config(config)?;
        Ok(Self { client })
    }

    /// Resolve a kijk.nl page URL into playable video information
    ///
    /// # Arguments
    /// * `url` - Movie (`/films/video/<slug>/<id>`) or episode
    ///   (`/programmas/.../afleveringen/video/<slug>/<id>`) page URL
    ///
    /// # Errors
    /// - `InvalidUrl` if the URL matches neither page shape
    /// - `HttpError`, `NotFound`, `RateLimited` if a fetch fails
    /// - `ParseError` if the page data or a manifest cannot be parsed
    /// - `UnknownPageKind`, `MultipleMediaGroups`, `UnknownMediaType`,
    ///   `UnknownMediaExtension`, `MultipleSubtitles` for unrecognised
    ///   page shapes
    ///
    /// # Example
    /// ```no_run
    /// # async fn example() -> kijk_core::Result<()> {
    /// use kijk_core::KijkExtractor;
    /// let extractor = KijkExtractor::new()?;
    /// let info = extractor
    ///     .resolve("https://www.kijk.nl/films/video/the-bounty-hunter/CQvs74EAaJj")
    ///     .await?;
    /// for format in &info.formats {
    ///     println!("{} {:?}x{:?}", format.format_id, format.width, format.height);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn resolve(&self, url: &str) -> Result<VideoInfo> {
        let video_url =
            parse_video_url(url).ok_or_else(|| KijkError::InvalidUrl(url.to_string()))?;

        let html = self.client.fetch(&video_url.path).await?;
        self.resolve_page(&html, &video_url.id).await
    }

    /// Resolve a page whose HTML was already fetched by the caller
    ///
    /// DASH manifests referenced by the page are still fetched.
    ///
    /// # Errors
    /// Same as [`KijkExtractor::resolve`]
    pub async fn resolve_html(&self, url: &str, html: &str) -> Result<VideoInfo> {
        let video_url =
            parse_video_url(url).ok_or_else(|| KijkError::InvalidUrl(url.to_string()))?;

        self.resolve_page(html, &video_url.id).await
    }

    /// Fetch a DASH manifest and expand it into formats
    ///
    /// # Arguments
    /// * `manifest_url` - Absolute URL of the `.mpd` document
    /// * `video_id` - Item id the manifest belongs to
    pub async fn expand_dash_manifest(
        &self,
        manifest_url: &str,
        video_id: &str,
    ) -> Result<Vec<Format>> {
        let xml = self.client.fetch_url(manifest_url).await?;
        parse_mpd_formats(&xml, manifest_url, video_id)
    }

    async fn resolve_page(&self, html: &str, id: &str) -> Result<VideoInfo> {
        let page = parse_video_page(html, id)?;
        debug!(id, kind = ?page.kind, sources = page.sources.len(), "parsed video page");

        let mut formats = Vec::new();
        for source in &page.sources {
            match source {
                MediaSource::DashManifest { url } => {
                    formats.extend(self.expand_dash_manifest(url, id).await?);
                }
                MediaSource::Ignored { extension, url } => {
                    debug!(id, extension = %extension, url = %url, "skipped manifest");
                }
                MediaSource::Subtitle { .. } => {}
            }
        }

        if formats.is_empty() {
            warn!(id, "no playable formats found");
        }

        Ok(page.into_video_info(formats))
    }

    /// Get a reference to the underlying HTTP client
    pub fn client(&self) -> &KijkClient {
        &self.client
    }
}
