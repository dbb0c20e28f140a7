use dioxus::logger::tracing::debug;

use super::controller::{PlaybackEngine, TrackToken};

/// Engine for builds without a browser audio element. Commands are logged
/// and no events are ever produced, so the UI stays usable but silent.
#[derive(Debug, Default)]
pub struct DetachedEngine {
    src: Option<String>,
}

impl PlaybackEngine for DetachedEngine {
    type Subscription = ();

    fn load(&mut self, src: &str) {
        debug!("detached engine: load {src}");
        self.src = Some(src.to_string());
    }

    fn play(&mut self, token: TrackToken) {
        debug!("detached engine: play {:?} ({:?})", self.src, token);
    }

    fn pause(&mut self) {
        debug!("detached engine: pause {:?}", self.src);
    }

    fn set_position(&mut self, seconds: f64) {
        debug!("detached engine: seek to {seconds:.1}s");
    }

    fn subscribe(&mut self, _token: TrackToken) -> Self::Subscription {}
}
