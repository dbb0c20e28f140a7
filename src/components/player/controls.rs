use crate::components::{Icon, IconKind, PlayerHandle};
use dioxus::prelude::*;

/// Play/Pause button
#[component]
pub(super) fn PlayPauseButton(playing: bool) -> Element {
    let handle = use_context::<PlayerHandle>();

    rsx! {
        button {
            id: "play-pause-btn",
            r#type: "button",
            class: if playing { "control-btn control-btn--pause" } else { "control-btn control-btn--play" },
            onclick: move |_| handle.toggle_play_pause(),
            if playing {
                Icon { kind: IconKind::Pause, class: "control-btn__icon".to_string() }
                "Pause"
            } else {
                Icon { kind: IconKind::Play, class: "control-btn__icon".to_string() }
                "Play"
            }
        }
    }
}

#[component]
pub(super) fn PrevButton() -> Element {
    let handle = use_context::<PlayerHandle>();

    rsx! {
        button {
            id: "prev-btn",
            r#type: "button",
            class: "control-btn control-btn--outline",
            onclick: move |_| handle.previous(),
            Icon { kind: IconKind::Prev, class: "control-btn__icon".to_string() }
            "Previous"
        }
    }
}

#[component]
pub(super) fn NextButton() -> Element {
    let handle = use_context::<PlayerHandle>();

    rsx! {
        button {
            id: "next-btn",
            r#type: "button",
            class: "control-btn control-btn--outline",
            onclick: move |_| handle.next(),
            Icon { kind: IconKind::Next, class: "control-btn__icon".to_string() }
            "Next"
        }
    }
}
