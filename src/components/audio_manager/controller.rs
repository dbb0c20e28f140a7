//! Playback state machine.
//!
//! `PlayerController` owns the playlist position and progress state and is the
//! only thing that issues commands to the audio engine. Engine events come
//! back through `handle_event`, tagged with the `TrackToken` of the load that
//! produced them so events for a replaced source are dropped.

use dioxus::logger::tracing::{debug, info, warn};

use crate::playlist::{Playlist, Track};
use crate::utils::{format_time, non_negative_or_zero};

/// Generation number of one track load and the listeners attached for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TrackToken(u64);

impl TrackToken {
    fn following(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Events reported by a playback engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Playback position moved, in seconds.
    Progress(f64),
    /// Total length of the loaded source became known, in seconds.
    MetadataLoaded(f64),
    /// The loaded source played to its end.
    Ended,
    /// Loading or starting playback failed.
    Failed(String),
}

/// Audio output consumed by the controller.
///
/// Commands are fire-and-forget. Events are delivered out of band to whatever
/// sink the engine was built with, paired with the token passed to `subscribe`.
pub trait PlaybackEngine {
    /// Listener registration; dropping it detaches every listener it holds.
    type Subscription;

    /// Start loading `src`. Stops playback and rewinds to zero.
    fn load(&mut self, src: &str);
    /// Start playback. A rejection is reported as `EngineEvent::Failed` under `token`.
    fn play(&mut self, token: TrackToken);
    fn pause(&mut self);
    fn set_position(&mut self, seconds: f64);
    /// Attach listeners for the currently loaded source.
    fn subscribe(&mut self, token: TrackToken) -> Self::Subscription;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    current_index: usize,
    is_playing: bool,
    elapsed: f64,
    duration: f64,
    playback_error: Option<String>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            current_index: 0,
            is_playing: false,
            elapsed: 0.0,
            duration: 0.0,
            playback_error: None,
        }
    }
}

impl PlayerState {
    #[cfg(test)]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Intended playback state, set before the engine confirms anything.
    #[cfg(test)]
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    #[cfg(test)]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Track length in seconds, `0.0` while unknown.
    #[cfg(test)]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    #[cfg(test)]
    pub fn playback_error(&self) -> Option<&str> {
        self.playback_error.as_deref()
    }

    /// Seek slider position in percent, always within `0..=100`.
    pub fn slider_percent(&self) -> f64 {
        if self.duration > 0.0 {
            (self.elapsed / self.duration * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    pub fn display_elapsed(&self) -> String {
        format_time(self.elapsed)
    }

    pub fn display_duration(&self) -> String {
        format_time(self.duration)
    }
}

/// Render-ready copy of everything the player view shows.
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlaying {
    pub title: String,
    pub artist: String,
    pub current_index: usize,
    pub is_playing: bool,
    pub elapsed_label: String,
    pub duration_label: String,
    pub slider_percent: f64,
    pub playback_error: Option<String>,
}

pub struct PlayerController<E: PlaybackEngine> {
    playlist: Playlist,
    state: PlayerState,
    token: TrackToken,
    subscription: Option<E::Subscription>,
    engine: E,
    auto_continue: bool,
}

impl<E: PlaybackEngine> PlayerController<E> {
    /// Load the first track and start listening to it. Playback stays paused.
    pub fn new(playlist: Playlist, engine: E, auto_continue: bool) -> Self {
        let mut controller = Self {
            playlist,
            state: PlayerState::default(),
            token: TrackToken::default(),
            subscription: None,
            engine,
            auto_continue,
        };
        controller.bind_current_track();
        controller
    }

    #[cfg(test)]
    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn current_track(&self) -> &Track {
        &self.playlist.tracks()[self.state.current_index]
    }

    /// Token of the live subscription.
    #[cfg(test)]
    pub fn token(&self) -> TrackToken {
        self.token
    }

    pub fn now_playing(&self) -> NowPlaying {
        let track = self.current_track();
        NowPlaying {
            title: track.title.clone(),
            artist: track.artist.clone(),
            current_index: self.state.current_index,
            is_playing: self.state.is_playing,
            elapsed_label: self.state.display_elapsed(),
            duration_label: self.state.display_duration(),
            slider_percent: self.state.slider_percent(),
            playback_error: self.state.playback_error.clone(),
        }
    }

    pub fn toggle_play_pause(&mut self) {
        if self.state.is_playing {
            debug!("pausing \"{}\"", self.current_track().title);
            self.engine.pause();
            self.state.is_playing = false;
        } else {
            debug!("playing \"{}\"", self.current_track().title);
            self.engine.play(self.token);
            self.state.is_playing = true;
        }
    }

    pub fn next(&mut self) {
        let index = self.playlist.index_after(self.state.current_index);
        self.change_track(index);
    }

    pub fn previous(&mut self) {
        let index = self.playlist.index_before(self.state.current_index);
        self.change_track(index);
    }

    /// Jump to `percent` of the track. Out-of-range input is clamped and
    /// non-finite input counts as zero.
    pub fn seek(&mut self, percent: f64) {
        let percent = if percent.is_finite() {
            percent.clamp(0.0, 100.0)
        } else {
            0.0
        };
        let target = if self.state.duration > 0.0 {
            percent / 100.0 * self.state.duration
        } else {
            0.0
        };
        self.engine.set_position(target);
        self.state.elapsed = target;
    }

    /// Apply an engine event if it belongs to the live subscription.
    pub fn handle_event(&mut self, token: TrackToken, event: EngineEvent) {
        if token != self.token {
            debug!("dropping stale {:?} from {:?}", event, token);
            return;
        }
        match event {
            EngineEvent::Progress(position) => self.on_progress(position),
            EngineEvent::MetadataLoaded(duration) => self.on_metadata_loaded(duration),
            EngineEvent::Ended => self.on_track_ended(),
            EngineEvent::Failed(message) => self.on_failure(message),
        }
    }

    pub fn on_progress(&mut self, position: f64) {
        self.state.elapsed = non_negative_or_zero(position);
    }

    pub fn on_metadata_loaded(&mut self, duration: f64) {
        self.state.duration = non_negative_or_zero(duration);
    }

    pub fn on_track_ended(&mut self) {
        self.next();
        if self.auto_continue {
            self.engine.play(self.token);
            self.state.is_playing = true;
        }
    }

    /// Record an engine failure and stop claiming that playback is running.
    pub fn on_failure(&mut self, message: String) {
        warn!("playback failed for \"{}\": {}", self.current_track().title, message);
        self.state.is_playing = false;
        self.state.playback_error = Some(message);
    }

    /// Detach from the engine. Safe to call more than once.
    pub fn release(&mut self) {
        if self.subscription.take().is_some() {
            debug!("released listeners for {:?}", self.token);
        }
    }

    fn change_track(&mut self, index: usize) {
        self.state.current_index = index;
        self.state.is_playing = false;
        self.state.elapsed = 0.0;
        self.state.duration = 0.0;
        self.state.playback_error = None;
        self.bind_current_track();
        info!(
            "track {} of {}: \"{}\"",
            index + 1,
            self.playlist.len(),
            self.current_track().title
        );
    }

    fn bind_current_track(&mut self) {
        // The old listeners must be gone before the source changes.
        self.release();
        self.token = self.token.following();
        let src = self.current_track().src.clone();
        self.engine.load(&src);
        self.subscription = Some(self.engine.subscribe(self.token));
    }

    #[cfg(test)]
    pub(crate) fn engine(&self) -> &E {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Command {
        Load(String),
        Play(TrackToken),
        Pause,
        SetPosition(f64),
    }

    #[derive(Default)]
    struct RecordingEngine {
        commands: Vec<Command>,
        live: Rc<Cell<usize>>,
    }

    struct Registration {
        live: Rc<Cell<usize>>,
    }

    impl Drop for Registration {
        fn drop(&mut self) {
            self.live.set(self.live.get() - 1);
        }
    }

    impl PlaybackEngine for RecordingEngine {
        type Subscription = Registration;

        fn load(&mut self, src: &str) {
            self.commands.push(Command::Load(src.to_string()));
        }

        fn play(&mut self, token: TrackToken) {
            self.commands.push(Command::Play(token));
        }

        fn pause(&mut self) {
            self.commands.push(Command::Pause);
        }

        fn set_position(&mut self, seconds: f64) {
            self.commands.push(Command::SetPosition(seconds));
        }

        fn subscribe(&mut self, _token: TrackToken) -> Registration {
            self.live.set(self.live.get() + 1);
            Registration {
                live: self.live.clone(),
            }
        }
    }

    impl RecordingEngine {
        fn plays(&self) -> usize {
            self.commands
                .iter()
                .filter(|c| matches!(c, Command::Play(_)))
                .count()
        }
    }

    fn playlist(len: usize) -> Playlist {
        Playlist::new(
            (0..len)
                .map(|i| Track::new(format!("Song {i}"), "Band", format!("song-{i}.mp3")))
                .collect(),
        )
        .unwrap()
    }

    fn controller(len: usize) -> PlayerController<RecordingEngine> {
        PlayerController::new(playlist(len), RecordingEngine::default(), false)
    }

    #[test]
    fn starts_paused_on_first_track() {
        let player = controller(3);
        let state = player.state();
        assert_eq!(state.current_index(), 0);
        assert!(!state.is_playing());
        assert_eq!(state.elapsed(), 0.0);
        assert_eq!(state.duration(), 0.0);
        assert_eq!(
            player.engine().commands,
            vec![Command::Load("song-0.mp3".into())]
        );
        assert_eq!(player.engine().live.get(), 1);
    }

    #[test]
    fn toggle_from_paused_plays_exactly_once() {
        let mut player = controller(3);
        player.toggle_play_pause();
        assert!(player.state().is_playing());
        assert_eq!(player.engine().plays(), 1);

        player.toggle_play_pause();
        assert!(!player.state().is_playing());
        assert_eq!(player.engine().commands.last(), Some(&Command::Pause));
        assert_eq!(player.engine().plays(), 1);
    }

    #[test]
    fn next_walks_forward_and_wraps() {
        let mut player = controller(3);
        player.next();
        player.next();
        assert_eq!(player.state().current_index(), 2);
        player.next();
        assert_eq!(player.state().current_index(), 0);
        assert_eq!(
            player.engine().commands.last(),
            Some(&Command::Load("song-0.mp3".into()))
        );
    }

    #[test]
    fn previous_from_first_wraps_to_last() {
        let mut player = controller(3);
        player.previous();
        assert_eq!(player.state().current_index(), 2);
        assert_eq!(player.current_track().src, "song-2.mp3");
    }

    #[test]
    fn track_change_resets_progress_and_pauses() {
        let mut player = controller(3);
        player.toggle_play_pause();
        let token = player.token();
        player.handle_event(token, EngineEvent::MetadataLoaded(200.0));
        player.handle_event(token, EngineEvent::Progress(42.0));

        player.next();
        assert_eq!(player.state().elapsed(), 0.0);
        assert_eq!(player.state().duration(), 0.0);
        assert!(!player.state().is_playing());

        player.toggle_play_pause();
        player.previous();
        assert!(!player.state().is_playing());

        player.toggle_play_pause();
        let token = player.token();
        player.handle_event(token, EngineEvent::Progress(10.0));
        player.handle_event(token, EngineEvent::Ended);
        assert_eq!(player.state().current_index(), 1);
        assert_eq!(player.state().elapsed(), 0.0);
        assert!(!player.state().is_playing());
    }

    #[test]
    fn ended_with_auto_continue_starts_next_track() {
        let mut player = PlayerController::new(playlist(2), RecordingEngine::default(), true);
        let token = player.token();
        player.handle_event(token, EngineEvent::Ended);

        assert_eq!(player.state().current_index(), 1);
        assert!(player.state().is_playing());
        assert_eq!(player.engine().plays(), 1);
        assert_eq!(
            player.engine().commands.last(),
            Some(&Command::Play(player.token()))
        );
    }

    #[test]
    fn listener_count_stays_at_one_across_track_changes() {
        let mut player = controller(4);
        for _ in 0..25 {
            player.next();
        }
        for _ in 0..7 {
            player.previous();
        }
        let token = player.token();
        player.handle_event(token, EngineEvent::Ended);
        assert_eq!(player.engine().live.get(), 1);
    }

    #[test]
    fn release_is_idempotent_and_drop_detaches() {
        let mut player = controller(2);
        let live = player.engine().live.clone();
        player.release();
        player.release();
        assert_eq!(live.get(), 0);

        let player = controller(2);
        let live = player.engine().live.clone();
        drop(player);
        assert_eq!(live.get(), 0);
    }

    #[test]
    fn stale_events_are_ignored() {
        let mut player = controller(3);
        let old = player.token();
        player.next();
        player.handle_event(old, EngineEvent::MetadataLoaded(300.0));
        player.handle_event(old, EngineEvent::Progress(120.0));
        player.handle_event(old, EngineEvent::Ended);
        player.handle_event(old, EngineEvent::Failed("gone".into()));

        let state = player.state();
        assert_eq!(state.current_index(), 1);
        assert_eq!(state.elapsed(), 0.0);
        assert_eq!(state.duration(), 0.0);
        assert_eq!(state.playback_error(), None);
    }

    #[test]
    fn seek_maps_percent_onto_duration() {
        let mut player = controller(1);
        player.on_metadata_loaded(240.0);
        player.seek(25.0);
        assert_relative_eq!(player.state().elapsed(), 60.0);
        assert_eq!(
            player.engine().commands.last(),
            Some(&Command::SetPosition(60.0))
        );
        assert_relative_eq!(player.state().slider_percent(), 25.0);

        player.seek(150.0);
        assert_relative_eq!(player.state().elapsed(), 240.0);
        player.seek(-5.0);
        assert_eq!(player.state().elapsed(), 0.0);
    }

    #[test]
    fn seek_without_duration_stays_at_zero() {
        let mut player = controller(1);
        player.seek(80.0);
        assert_eq!(player.state().elapsed(), 0.0);
        assert_eq!(player.state().slider_percent(), 0.0);
        player.seek(f64::NAN);
        assert_eq!(player.state().elapsed(), 0.0);
        assert_eq!(
            player.engine().commands.last(),
            Some(&Command::SetPosition(0.0))
        );
    }

    #[test]
    fn bad_engine_numbers_become_zero() {
        let mut player = controller(1);
        player.on_metadata_loaded(f64::NAN);
        assert_eq!(player.state().duration(), 0.0);
        player.on_metadata_loaded(f64::INFINITY);
        assert_eq!(player.state().duration(), 0.0);
        player.on_progress(-2.0);
        assert_eq!(player.state().elapsed(), 0.0);
        player.on_progress(f64::NAN);
        assert_eq!(player.state().display_elapsed(), "00:00");
    }

    #[test]
    fn metadata_feeds_duration_label() {
        let mut player = controller(2);
        let token = player.token();
        player.handle_event(token, EngineEvent::MetadataLoaded(185.4));
        assert_eq!(player.state().display_duration(), "03:05");
        assert_eq!(player.now_playing().duration_label, "03:05");
    }

    #[test]
    fn failure_clears_playing_until_next_track() {
        let mut player = controller(2);
        player.toggle_play_pause();
        let token = player.token();
        player.handle_event(token, EngineEvent::Failed("decode error".into()));
        assert!(!player.state().is_playing());
        assert_eq!(player.state().playback_error(), Some("decode error"));

        player.next();
        assert_eq!(player.state().playback_error(), None);
    }

    #[test]
    fn now_playing_reflects_state() {
        let mut player = controller(3);
        player.next();
        player.toggle_play_pause();
        player.on_metadata_loaded(100.0);
        player.on_progress(61.0);

        let view = player.now_playing();
        assert_eq!(view.title, "Song 1");
        assert_eq!(view.artist, "Band");
        assert_eq!(view.current_index, 1);
        assert!(view.is_playing);
        assert_eq!(view.elapsed_label, "01:01");
        assert_eq!(view.duration_label, "01:40");
        assert_relative_eq!(view.slider_percent, 61.0);
        assert_eq!(view.playback_error, None);
    }

    proptest! {
        #[test]
        fn next_then_previous_restores_index(len in 2usize..12, start in 0usize..12) {
            let mut player = controller(len);
            for _ in 0..(start % len) {
                player.next();
            }
            let before = player.state().current_index();
            player.next();
            player.previous();
            prop_assert_eq!(player.state().current_index(), before);
        }

        #[test]
        fn seek_lands_on_fraction_of_duration(duration in 0.5f64..10_000.0, percent in 0.0f64..=100.0) {
            let mut player = controller(1);
            player.on_metadata_loaded(duration);
            player.seek(percent);
            let expected = percent / 100.0 * duration;
            prop_assert!((player.state().elapsed() - expected).abs() <= 1e-9 * duration.max(1.0));
        }

        #[test]
        fn slider_stays_in_range(duration in 0.0f64..10_000.0, position in 0.0f64..20_000.0) {
            let mut player = controller(1);
            player.on_metadata_loaded(duration);
            player.on_progress(position);
            let percent = player.state().slider_percent();
            prop_assert!((0.0..=100.0).contains(&percent));
        }
    }
}
