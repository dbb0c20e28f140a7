use serde::Deserialize;

use crate::error::{PlayerError, Result};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Track {
    pub title: String,
    pub artist: String,
    /// Audio locator handed to the engine untouched.
    pub src: String,
}

impl Track {
    #[cfg(test)]
    pub fn new(title: impl Into<String>, artist: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            src: src.into(),
        }
    }
}

/// Fixed, ordered, non-empty list of tracks.
#[derive(Debug, Clone, PartialEq)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    pub fn new(tracks: Vec<Track>) -> Result<Self> {
        if tracks.is_empty() {
            return Err(PlayerError::EmptyPlaylist);
        }
        Ok(Self { tracks })
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Index after `index`, wrapping to the first track.
    pub fn index_after(&self, index: usize) -> usize {
        (index + 1) % self.len()
    }

    /// Index before `index`, wrapping to the last track.
    pub fn index_before(&self, index: usize) -> usize {
        (index + self.len() - 1) % self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three() -> Playlist {
        Playlist::new(vec![
            Track::new("A", "a", "a.mp3"),
            Track::new("B", "b", "b.mp3"),
            Track::new("C", "c", "c.mp3"),
        ])
        .unwrap()
    }

    #[test]
    fn empty_playlist_is_rejected() {
        assert!(matches!(
            Playlist::new(Vec::new()),
            Err(PlayerError::EmptyPlaylist)
        ));
    }

    #[test]
    fn neighbours_wrap_at_both_ends() {
        let playlist = three();
        assert_eq!(playlist.index_after(0), 1);
        assert_eq!(playlist.index_after(2), 0);
        assert_eq!(playlist.index_before(0), 2);
        assert_eq!(playlist.index_before(1), 0);
    }

    #[test]
    fn single_track_wraps_onto_itself() {
        let playlist = Playlist::new(vec![Track::new("Solo", "x", "solo.mp3")]).unwrap();
        assert_eq!(playlist.index_after(0), 0);
        assert_eq!(playlist.index_before(0), 0);
    }
}
