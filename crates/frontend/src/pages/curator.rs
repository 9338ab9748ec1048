use dioxus::logger::tracing::{debug, info, warn};
use dioxus::prelude::*;
use ruuturetki_shared::curator::{CuratorPhase, CuratorSession, ZOOM_RANGE};
use ruuturetki_shared::geo::{LatLng, PLAY_AREA};
use ruuturetki_shared::layers::MapLayer;
use ruuturetki_shared::models::TIMED_ROUND_SECS;
use ruuturetki_shared::scoring::ROUNDS;
use ruuturetki_shared::viewport::{MapHandle, TileSource, Viewport};

use crate::api;
use crate::components::tile_map::{MapMarker, MarkerKind, TileMap};
use crate::state::today;
use crate::Route;

const CURATOR_ZOOM: u8 = 13;

fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

/// Markers for every captured location; only the round being edited can be dragged.
pub fn curator_markers(session: &CuratorSession) -> Vec<MapMarker> {
    session
        .rounds()
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let mut marker = MapMarker::new(i, r.latlng, MarkerKind::Location);
            marker.draggable = r.draggable;
            marker.label = Some(format!("{}", i + 1));
            marker
        })
        .collect()
}

pub fn next_label(id: usize) -> &'static str {
    if id + 1 < ROUNDS {
        "Next"
    } else {
        "End"
    }
}

/// Point the map at round `id` at its chosen zoom.
fn focus_round<M: MapHandle + ?Sized>(session: &CuratorSession, id: usize, map: &mut M) {
    if let Some(round) = session.rounds().get(id) {
        map.set_view(round.latlng, round.zoom);
    }
}

#[component]
pub fn Curator() -> Element {
    let mut session = use_signal(CuratorSession::new);
    let mut layer = use_signal(|| MapLayer::Helsinki2024);
    let mut view = use_signal(|| Viewport::new(PLAY_AREA.center(), CURATOR_ZOOM, 0.0, 0.0));

    let current_layer = *layer.read();
    let s = session.read().clone();
    let phase = s.phase();
    let markers = curator_markers(&s);
    let remaining = s.remaining();
    let zoom = s.current_zoom();

    rsx! {
        div { class: "curator",
            div { class: "curator-map",
                TileMap {
                    id: "curator-map",
                    source: TileSource::Wms(current_layer),
                    view,
                    markers,
                    onclick: move |latlng: LatLng| {
                        let added = session.write().add_location(latlng);
                        match added {
                            Ok(n) => debug!("Captured location {}", n),
                            Err(e) => alert(&e.to_string()),
                        }
                    },
                    onmarkerdrag: move |(id, latlng): (usize, LatLng)| {
                        if let Err(e) = session.write().move_marker(id, latlng) {
                            debug!("Drag ignored: {}", e);
                        }
                    },
                }
            }
            div { class: "curator-panel",
                h2 { "Create a daily challenge" }
                select {
                    onchange: move |evt| {
                        if let Some(l) = MapLayer::from_name(&evt.value()) {
                            layer.set(l);
                        }
                    },
                    for l in MapLayer::ALL {
                        option { value: l.name(), selected: l == current_layer, "{l}" }
                    }
                }
                match phase {
                    CuratorPhase::Locations => rsx! {
                        p { "Click the map to pick {remaining} more location(s)." }
                        button {
                            class: "btn",
                            onclick: move |_| {
                                let outcome = session.write().set_locations();
                                match outcome {
                                    Ok(()) => focus_round(&session.read(), 0, &mut *view.write()),
                                    Err(e) => alert(&e.to_string()),
                                }
                            },
                            "Set locations"
                        }
                    },
                    CuratorPhase::Zoom { id } => rsx! {
                        p { "Round {id + 1}: drag the marker into place and pick a zoom level." }
                        label {
                            "Zoom "
                            select {
                                onchange: move |evt| {
                                    let Ok(z) = evt.value().parse::<u8>() else { return };
                                    let outcome = session.write().select_zoom(z);
                                    match outcome {
                                        Ok(()) => focus_round(&session.read(), id, &mut *view.write()),
                                        Err(e) => alert(&e.to_string()),
                                    }
                                },
                                for z in ZOOM_RANGE {
                                    option { value: "{z}", selected: Some(z) == zoom, "{z}" }
                                }
                            }
                        }
                        button {
                            class: "btn",
                            onclick: move |_| {
                                let outcome = session.write().next();
                                match outcome {
                                    Ok(CuratorPhase::Zoom { id }) => {
                                        focus_round(&session.read(), id, &mut *view.write());
                                    }
                                    Ok(_) => info!("All rounds set, opening submission form"),
                                    Err(e) => alert(&e.to_string()),
                                }
                            },
                            "{next_label(id)}"
                        }
                    },
                    CuratorPhase::Submit => rsx! {
                        SubmitForm { session, layer: current_layer }
                    },
                }
                button {
                    class: "btn btn-secondary",
                    onclick: move |_| {
                        if confirm("Discard all locations and start over?") {
                            session.write().reset();
                        }
                    },
                    "Reset"
                }
                Link { class: "btn btn-secondary", to: Route::Practice {}, "Back" }
            }
        }
    }
}

/// Date and mode form posting the finished challenge.
#[component]
fn SubmitForm(session: Signal<CuratorSession>, layer: MapLayer) -> Element {
    let mut session = session;
    let mut date = use_signal(today);
    let mut maplayer = use_signal(|| layer);
    let mut moving = use_signal(|| true);
    let mut timed = use_signal(|| false);
    let mut sending = use_signal(|| false);

    let current = *maplayer.read();

    let onsubmit = move |evt: Event<FormData>| {
        evt.prevent_default();
        if *sending.peek() {
            return;
        }
        let built = session.peek().submission(
            &date.peek(),
            *maplayer.peek(),
            *moving.peek(),
            timed.peek().then_some(TIMED_ROUND_SECS),
        );
        let challenge = match built {
            Ok(c) => c,
            Err(e) => {
                alert(&e.to_string());
                return;
            }
        };
        sending.set(true);
        spawn(async move {
            match api::create_daily_challenge(&challenge).await {
                Ok(saved) => {
                    info!("Saved daily challenge for {}", saved.date);
                    alert(&format!("Daily challenge for {} saved", saved.date));
                    session.write().reset();
                }
                Err(e) => {
                    warn!("Cannot save daily challenge: {}", e);
                    alert(&e);
                }
            }
            sending.set(false);
        });
    };

    rsx! {
        div { class: "overlay-backdrop",
            div { class: "overlay submit-form",
                div { class: "overlay-header",
                    h2 { "Submit daily challenge" }
                    button {
                        class: "close-btn",
                        onclick: move |_| {
                            if confirm("Close the form? All locations will be discarded.") {
                                session.write().reset();
                            }
                        },
                        "\u{00d7}"
                    }
                }
                form { onsubmit,
                    label {
                        "Date "
                        input {
                            r#type: "date",
                            value: "{date}",
                            oninput: move |evt| date.set(evt.value()),
                        }
                    }
                    label {
                        "Layer "
                        select {
                            onchange: move |evt| {
                                if let Some(l) = MapLayer::from_name(&evt.value()) {
                                    maplayer.set(l);
                                }
                            },
                            for l in MapLayer::ALL {
                                option { value: l.name(), selected: l == current, "{l}" }
                            }
                        }
                    }
                    label {
                        input {
                            r#type: "checkbox",
                            checked: *moving.read(),
                            onchange: move |evt| moving.set(evt.checked()),
                        }
                        " moving allowed"
                    }
                    label {
                        input {
                            r#type: "checkbox",
                            checked: *timed.read(),
                            onchange: move |evt| timed.set(evt.checked()),
                        }
                        " timed ({TIMED_ROUND_SECS} s)"
                    }
                    button { class: "btn", r#type: "submit", disabled: *sending.read(), "Submit" }
                }
            }
        }
    }
}
