use dioxus::prelude::*;
use ruuturetki_shared::geo::PLAY_AREA;
use ruuturetki_shared::layers::MapLayer;
use ruuturetki_shared::viewport::{TileSource, Viewport};

use crate::components::tile_map::TileMap;
use crate::Route;

const PRACTICE_ZOOM: u8 = 14;

/// Free roaming on any of the photo layers.
#[component]
pub fn Practice() -> Element {
    let mut layer = use_signal(|| MapLayer::Helsinki2024);
    let view = use_signal(|| Viewport::new(PLAY_AREA.center(), PRACTICE_ZOOM, 0.0, 0.0));
    let current = *layer.read();

    rsx! {
        div { class: "practice",
            div { class: "practice-map",
                TileMap {
                    id: "practice-map",
                    source: TileSource::Wms(current),
                    view,
                }
            }
            div { class: "practice-panel",
                fieldset {
                    legend { "Layer" }
                    for l in MapLayer::ALL {
                        label { class: "layer-option",
                            input {
                                r#type: "radio",
                                name: "layer",
                                checked: l == current,
                                onchange: move |_| layer.set(l),
                            }
                            " {l}"
                        }
                    }
                }
                Link { class: "btn", to: Route::Curator {}, "Create a daily challenge" }
                Link { class: "btn", to: Route::Menu {}, "Back to menu" }
            }
        }
    }
}
