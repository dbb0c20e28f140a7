//! Error types for the player

use thiserror::Error;

/// Errors raised while setting up the player.
///
/// Runtime playback failures are not errors; the engine reports them as
/// `EngineEvent::Failed` and the controller shows them in the view.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// A playlist must hold at least one track
    #[error("Playlist is empty")]
    EmptyPlaylist,

    /// Bundled settings could not be parsed
    #[error("Invalid player settings: {0}")]
    Settings(#[from] serde_json::Error),

    /// The browser window or document is not reachable
    #[error("Browser document is not available")]
    NoDocument,

    /// A DOM call failed
    #[error("DOM error: {0}")]
    Dom(String),
}

/// Result type for player operations
pub type Result<T> = std::result::Result<T, PlayerError>;
