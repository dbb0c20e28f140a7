//! `HTMLAudioElement` backend.

use std::rc::Rc;

use dioxus::logger::tracing::{debug, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{window, Event, HtmlAudioElement};

use super::controller::{EngineEvent, PlaybackEngine, TrackToken};
use crate::error::{PlayerError, Result};

const AUDIO_ELEMENT_ID: &str = "rustyplayer-audio";

/// Receives every engine event together with the token it was subscribed under.
pub type EventSink = Rc<dyn Fn(TrackToken, EngineEvent)>;

pub struct WebAudioEngine {
    audio: HtmlAudioElement,
    sink: EventSink,
}

impl WebAudioEngine {
    pub fn new(preload: &str, sink: EventSink) -> Result<Self> {
        let audio = get_or_create_audio_element(preload)?;
        Ok(Self { audio, sink })
    }
}

impl PlaybackEngine for WebAudioEngine {
    type Subscription = WebSubscription;

    fn load(&mut self, src: &str) {
        debug!("loading {src}");
        self.audio.set_src(src);
    }

    fn play(&mut self, token: TrackToken) {
        let sink = self.sink.clone();
        match self.audio.play() {
            Ok(promise) => {
                wasm_bindgen_futures::spawn_local(async move {
                    if let Err(err) = wasm_bindgen_futures::JsFuture::from(promise).await {
                        report_play_rejection(&sink, token, &err);
                    }
                });
            }
            Err(err) => report_play_rejection(&sink, token, &err),
        }
    }

    fn pause(&mut self) {
        if let Err(err) = self.audio.pause() {
            warn!("pause failed: {err:?}");
        }
    }

    fn set_position(&mut self, seconds: f64) {
        self.audio.set_current_time(seconds);
    }

    fn subscribe(&mut self, token: TrackToken) -> WebSubscription {
        let progress = {
            let audio = self.audio.clone();
            let sink = self.sink.clone();
            MediaListener::attach(&self.audio, "timeupdate", move |_| {
                sink(token, EngineEvent::Progress(audio.current_time()))
            })
        };
        let metadata = {
            let audio = self.audio.clone();
            let sink = self.sink.clone();
            MediaListener::attach(&self.audio, "loadedmetadata", move |_| {
                sink(token, EngineEvent::MetadataLoaded(audio.duration()))
            })
        };
        let ended = {
            let sink = self.sink.clone();
            MediaListener::attach(&self.audio, "ended", move |_| {
                sink(token, EngineEvent::Ended)
            })
        };
        let failed = {
            let audio = self.audio.clone();
            let sink = self.sink.clone();
            MediaListener::attach(&self.audio, "error", move |_| {
                sink(token, EngineEvent::Failed(media_error_message(&audio)))
            })
        };

        WebSubscription {
            _listeners: [progress, metadata, ended, failed],
        }
    }
}

/// Listeners attached for one loaded source.
pub struct WebSubscription {
    _listeners: [MediaListener; 4],
}

/// One DOM listener, removed from its element on drop.
pub struct MediaListener {
    target: HtmlAudioElement,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl MediaListener {
    fn attach(
        target: &HtmlAudioElement,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Self {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        if let Err(err) =
            target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
        {
            warn!("could not attach {kind} listener: {err:?}");
        }
        Self {
            target: target.clone(),
            kind,
            callback,
        }
    }
}

impl Drop for MediaListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

/// Find the shared audio element or append a hidden one to the body.
fn get_or_create_audio_element(preload: &str) -> Result<HtmlAudioElement> {
    let document = window()
        .and_then(|w| w.document())
        .ok_or(PlayerError::NoDocument)?;

    if let Some(existing) = document.get_element_by_id(AUDIO_ELEMENT_ID) {
        return existing
            .dyn_into::<HtmlAudioElement>()
            .map_err(|_| PlayerError::Dom(format!("#{AUDIO_ELEMENT_ID} is not an audio element")));
    }

    let audio: HtmlAudioElement = document
        .create_element("audio")
        .map_err(js_error)?
        .dyn_into()
        .map_err(|_| PlayerError::Dom("created element is not an audio element".to_string()))?;
    audio.set_id(AUDIO_ELEMENT_ID);
    audio.set_preload(preload);

    let body = document.body().ok_or(PlayerError::NoDocument)?;
    body.append_child(&audio).map_err(js_error)?;

    Ok(audio)
}

fn js_error(value: JsValue) -> PlayerError {
    PlayerError::Dom(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

fn media_error_message(audio: &HtmlAudioElement) -> String {
    let code = audio.error().map(|err| err.code()).unwrap_or(0);
    match code {
        1 => "Playback was aborted before the track loaded.",
        2 => "Network error while loading this track.",
        3 => "Audio playback failed due to a decode error.",
        4 => "Failed to load audio because no supported source was found.",
        _ => "Unable to load this audio source.",
    }
    .to_string()
}

fn report_play_rejection(sink: &EventSink, token: TrackToken, err: &JsValue) {
    let name = js_sys::Reflect::get(err, &"name".into())
        .ok()
        .and_then(|value| value.as_string())
        .unwrap_or_default();
    let message = match name.as_str() {
        // A pause or new load cut the pending play short.
        "AbortError" => {
            debug!("play() aborted for {token:?}");
            return;
        }
        "NotAllowedError" => "The browser blocked playback until you interact with the page.",
        "NotSupportedError" => "This track's format is not supported by the browser.",
        _ => "Unable to start playback.",
    };
    warn!("play() rejected for {token:?}: {name}");
    sink(token, EngineEvent::Failed(message.to_string()));
}
