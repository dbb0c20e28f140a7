use serde::Deserialize;

use crate::error::Result;
use crate::playlist::{Playlist, Track};

const BUNDLED_SETTINGS: &str = include_str!("../assets/playlist.json");

/// Player settings shipped with the app
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlayerSettings {
    pub tracks: Vec<Track>,
    /// Start the next track automatically when one ends. Manual skips still pause.
    #[serde(default)]
    pub auto_continue: bool,
    /// `preload` attribute for the audio element.
    #[serde(default = "default_preload")]
    pub preload: String,
    #[serde(default = "default_title")]
    pub title: String,
}

fn default_preload() -> String {
    "metadata".to_string()
}

fn default_title() -> String {
    "Music Player".to_string()
}

impl PlayerSettings {
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_SETTINGS)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Validated playlist built from `tracks`.
    pub fn playlist(&self) -> Result<Playlist> {
        Playlist::new(self.tracks.clone())
    }
}
