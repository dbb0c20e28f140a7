use crate::components::{start_player, stop_player, use_player_handle, Player};
use crate::settings::PlayerSettings;
use dioxus::logger::tracing::error;
use dioxus::prelude::*;

#[component]
pub fn AppShell() -> Element {
    let handle = use_player_handle();
    let mut startup_error = use_signal(|| None::<String>);
    let settings = use_hook(|| PlayerSettings::bundled().map_err(|err| err.to_string()));

    // One-time setup: build the engine and controller once the DOM exists.
    {
        let settings = settings.clone();
        use_effect(move || {
            let result = match &settings {
                Ok(settings) => start_player(handle, settings).map_err(|err| err.to_string()),
                Err(err) => Err(err.clone()),
            };
            if let Err(message) = result {
                error!("failed to start player: {message}");
                startup_error.set(Some(message));
            }
        });
    }

    use_drop(move || stop_player(handle));

    let title = settings
        .as_ref()
        .map(|s| s.title.clone())
        .unwrap_or_else(|_| "Music Player".to_string());

    rsx! {
        div { class: "app-container",
            div { class: "player-card",
                header { class: "player-card__header",
                    h2 { "{title}" }
                }
                if let Some(message) = startup_error() {
                    div { class: "player-card__body",
                        p { class: "playback-error", "{message}" }
                    }
                } else {
                    Player {}
                }
                footer { class: "player-card__footer", "Enjoy your music!" }
            }
        }
    }
}
