//! Audio Manager - owns the player controller and its engine outside of the
//! component render cycle. Components only go through `PlayerHandle`.

use dioxus::logger::tracing::info;
use dioxus::prelude::*;

mod controller;
#[cfg(not(target_arch = "wasm32"))]
mod detached_engine;
#[cfg(target_arch = "wasm32")]
mod web_engine;

pub use controller::{NowPlaying, PlayerController};
#[cfg(target_arch = "wasm32")]
use controller::{EngineEvent, TrackToken};
#[cfg(not(target_arch = "wasm32"))]
pub use detached_engine::DetachedEngine;
#[cfg(target_arch = "wasm32")]
pub use web_engine::{EventSink, WebAudioEngine};

use crate::error::Result;
use crate::playlist::Track;
use crate::settings::PlayerSettings;

#[cfg(target_arch = "wasm32")]
pub type AppEngine = WebAudioEngine;
#[cfg(not(target_arch = "wasm32"))]
pub type AppEngine = DetachedEngine;

type ControllerSlot = Signal<Option<PlayerController<AppEngine>>>;

/// Shared access to the running player. Every user intent goes through here.
#[derive(Clone, Copy)]
pub struct PlayerHandle(ControllerSlot);

impl PlayerHandle {
    pub fn toggle_play_pause(mut self) {
        self.with_controller(|player| player.toggle_play_pause());
    }

    pub fn next(mut self) {
        self.with_controller(|player| player.next());
    }

    pub fn previous(mut self) {
        self.with_controller(|player| player.previous());
    }

    pub fn seek(mut self, percent: f64) {
        self.with_controller(|player| player.seek(percent));
    }

    /// Snapshot for rendering; `None` until the player has started.
    pub fn now_playing(&self) -> Option<NowPlaying> {
        self.0.read().as_ref().map(|player| player.now_playing())
    }

    pub fn tracks(&self) -> Vec<Track> {
        self.0
            .read()
            .as_ref()
            .map(|player| player.playlist().tracks().to_vec())
            .unwrap_or_default()
    }

    fn with_controller(&mut self, f: impl FnOnce(&mut PlayerController<AppEngine>)) {
        if let Some(player) = self.0.write().as_mut() {
            f(player);
        }
    }
}

/// Create the slot the controller will live in and provide its handle as context.
pub fn use_player_handle() -> PlayerHandle {
    let slot = use_signal(|| None::<PlayerController<AppEngine>>);
    use_context_provider(|| PlayerHandle(slot))
}

/// Build the engine and controller from `settings` and install them.
pub fn start_player(handle: PlayerHandle, settings: &PlayerSettings) -> Result<()> {
    let mut slot = handle.0;
    let playlist = settings.playlist()?;
    let engine = create_engine(slot, settings)?;
    let controller = PlayerController::new(playlist, engine, settings.auto_continue);
    info!("player ready with {} tracks", controller.playlist().len());
    slot.set(Some(controller));
    Ok(())
}

/// Drop the controller, which detaches its listeners.
pub fn stop_player(handle: PlayerHandle) {
    let mut slot = handle.0;
    if let Ok(mut current) = slot.try_write() {
        if let Some(mut player) = current.take() {
            player.release();
        }
    };
}

#[cfg(target_arch = "wasm32")]
fn create_engine(slot: ControllerSlot, settings: &PlayerSettings) -> Result<AppEngine> {
    use dioxus::core::{Runtime, RuntimeGuard};
    use std::rc::Rc;

    let runtime = Runtime::current();
    let sink: EventSink = Rc::new(move |token, event| {
        let _guard = RuntimeGuard::new(runtime.clone());
        dispatch_engine_event(slot, runtime.clone(), token, event);
    });
    WebAudioEngine::new(&settings.preload, sink)
}

#[cfg(not(target_arch = "wasm32"))]
fn create_engine(_slot: ControllerSlot, _settings: &PlayerSettings) -> Result<AppEngine> {
    Ok(DetachedEngine::default())
}

/// Forward an engine event into the controller. If the slot is borrowed
/// (the event fired while a command was running) retry on the next tick.
#[cfg(target_arch = "wasm32")]
fn dispatch_engine_event(
    mut slot: ControllerSlot,
    runtime: std::rc::Rc<dioxus::core::Runtime>,
    token: TrackToken,
    event: EngineEvent,
) {
    match slot.try_write() {
        Ok(mut current) => {
            if let Some(player) = current.as_mut() {
                player.handle_event(token, event);
            }
        }
        Err(_) => defer_signal_update(move || {
            let _guard = dioxus::core::RuntimeGuard::new(runtime.clone());
            dispatch_engine_event(slot, runtime, token, event);
        }),
    }
}

#[cfg(target_arch = "wasm32")]
fn defer_signal_update<F>(f: F)
where
    F: FnOnce() + 'static,
{
    wasm_bindgen_futures::spawn_local(async move {
        gloo_timers::future::TimeoutFuture::new(0).await;
        f();
    });
}
