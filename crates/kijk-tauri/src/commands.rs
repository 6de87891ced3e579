//! Tauri commands for the kijk.nl extractor
//!
//! This module contains all Tauri command implementations.

use kijk_core::{VideoInfo, VideoUrl};
use tauri::State;

use crate::ExtractorState;

/// Resolve a kijk.nl movie or episode page
///
/// # Arguments
/// * `state` - Managed ExtractorState from Tauri
/// * `url` - Page URL
///
/// # Returns
/// Title, description, formats and subtitles of the video
///
/// # Errors
/// Returns the error message as String if extraction fails
#[tauri::command]
pub async fn resolve_video(
    state: State<'_, ExtractorState>,
    url: String,
) -> Result<VideoInfo, String> {
    let extractor = state.extractor.lock().await;
    extractor.resolve(&url).await.map_err(|e| e.to_string())
}

/// Check whether a URL is a supported kijk.nl page
///
/// Returns the page kind and item id, or null for unsupported URLs.
/// No network request is made.
#[tauri::command]
pub fn parse_video_url(url: String) -> Option<VideoUrl> {
    kijk_core::parse_video_url(&url)
}
