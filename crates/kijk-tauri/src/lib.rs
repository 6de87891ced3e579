//! Kijk.nl Tauri Integration
//!
//! Provides a Tauri plugin for frontend integration with the kijk.nl extractor.
//!
//! # Usage
//!
//! Register the plugin in your Tauri application:
//!
//! ```ignore
//! fn main() {
//!     tauri::Builder::default()
//!         .plugin(kijk_tauri::init())
//!         .run(tauri::generate_context!())
//!         .expect("error while running tauri application");
//! }
//! ```
//!
//! Then invoke commands from the frontend:
//!
//! ```javascript
//! import { invoke } from '@tauri-apps/api/core';
//!
//! const info = await invoke('plugin:kijk|resolve_video', {
//!   url: 'https://www.kijk.nl/films/video/the-bounty-hunter/CQvs74EAaJj'
//! });
//!
//! const page = await invoke('plugin:kijk|parse_video_url', { url });
//! ```

use std::sync::Arc;
use tokio::sync::Mutex;

use kijk_core::KijkExtractor;
use tauri::{
    plugin::{Builder, TauriPlugin},
    Manager, Runtime,
};

mod commands;

/// Thread-safe wrapper for KijkExtractor
///
/// Shared across Tauri commands so every request goes through the
/// same rate-limited client.
pub struct ExtractorState {
    pub(crate) extractor: Arc<Mutex<KijkExtractor>>,
}

impl ExtractorState {
    /// Create a new ExtractorState with default configuration
    ///
    /// # Errors
    /// Returns error string if extractor initialization fails
    pub fn new() -> Result<Self, String> {
        let extractor = KijkExtractor::new().map_err(|e| e.to_string())?;
        Ok(Self {
            extractor: Arc::new(Mutex::new(extractor)),
        })
    }
}

impl Default for ExtractorState {
    fn default() -> Self {
        Self::new().expect("Failed to create default ExtractorState")
    }
}

/// Initialize the kijk plugin
///
/// # Example
/// ```ignore
/// tauri::Builder::default()
///     .plugin(kijk_tauri::init())
///     .run(tauri::generate_context!())
///     .expect("error while running tauri application");
/// ```
pub fn init<R: Runtime>() -> TauriPlugin<R> {
    Builder::new("kijk")
        .invoke_handler(tauri::generate_handler![
            commands::resolve_video,
            commands::parse_video_url
        ])
        .setup(|app, _api| {
            let state = ExtractorState::new().map_err(Box::<dyn std::error::Error>::from)?;
            app.manage(state);
            Ok(())
        })
        .build()
}

// Re-export types for convenience
pub use kijk_core::VideoInfo as Video;
