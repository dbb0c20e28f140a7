use crate::components::{Icon, IconKind, PlayerHandle};
use dioxus::prelude::*;

mod controls;

use controls::{NextButton, PlayPauseButton, PrevButton};

#[component]
pub fn Player() -> Element {
    let handle = use_context::<PlayerHandle>();

    let Some(now_playing) = handle.now_playing() else {
        return rsx! {
            div { class: "player-card__body",
                p { class: "track-artist", "Loading player..." }
            }
        };
    };
    let tracks = handle.tracks();

    let on_seek_input = move |e: Event<FormData>| {
        if let Ok(percent) = e.value().parse::<f64>() {
            handle.seek(percent);
        }
    };

    rsx! {
        div { class: "player-card__body",
            h4 { class: "track-title", "{now_playing.title}" }
            p { class: "track-artist", "{now_playing.artist}" }

            if let Some(message) = now_playing.playback_error.clone() {
                p { class: "playback-error", "{message}" }
            }

            div { class: "control-group",
                PrevButton {}
                PlayPauseButton { playing: now_playing.is_playing }
                NextButton {}
            }

            // Progress bar
            div { class: "progress-row",
                span { class: "progress-time", "{now_playing.elapsed_label}" }
                input {
                    r#type: "range",
                    min: "0",
                    max: "100",
                    step: "0.1",
                    value: now_playing.slider_percent,
                    class: "progress-slider",
                    oninput: on_seek_input,
                }
                span { class: "progress-time", "{now_playing.duration_label}" }
            }

            ol { class: "track-list",
                for (index, track) in tracks.iter().enumerate() {
                    li {
                        key: "{index}",
                        class: if index == now_playing.current_index { "track-row track-row--current" } else { "track-row" },
                        if index == now_playing.current_index {
                            Icon { kind: IconKind::Music, class: "track-row__icon".to_string() }
                        }
                        span { class: "track-row__title", "{track.title}" }
                        span { class: "track-row__artist", "{track.artist}" }
                    }
                }
            }
        }
    }
}
