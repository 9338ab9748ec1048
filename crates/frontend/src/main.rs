mod api;
mod components;
mod pages;
mod state;

use dioxus::prelude::*;

use pages::curator::Curator;
use pages::game::Game;
use pages::menu::Menu;
use pages::practice::Practice;
use state::AppContext;

#[derive(Routable, Clone, PartialEq)]
pub enum Route {
    #[route("/")]
    Menu {},
    #[route("/game")]
    Game {},
    #[route("/practice")]
    Practice {},
    #[route("/curator")]
    Curator {},
}

const CSS: Asset = asset!("/assets/main.css");
const FAVICON: Asset = asset!("/assets/favicon.svg");

#[allow(non_snake_case)]
fn App() -> Element {
    use_context_provider(AppContext::new);

    rsx! {
        document::Link { rel: "icon", r#type: "image/svg+xml", href: FAVICON }
        document::Stylesheet { href: CSS }
        document::Title { "Ruuturetki" }
        Router::<Route> {}
    }
}

fn main() {
    launch(App);
}
