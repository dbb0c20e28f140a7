use dioxus::prelude::*;

mod components;
mod error;
mod playlist;
mod settings;
mod utils;

use components::AppShell;

const APP_CSS: Asset = asset!("/assets/styling/app.css");

fn main() {
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        document::Meta { name: "theme-color", content: "#212529" }
        document::Title { "RustyPlayer" }
        document::Stylesheet { href: APP_CSS }

        AppShell {}
    }
}
