use dioxus::logger::tracing::{info, warn};
use dioxus::prelude::*;
use ruuturetki_shared::geo::{random_point, PLAY_AREA};
use ruuturetki_shared::layers::MapLayer;
use ruuturetki_shared::models::{challenge_for_date, GameSettings, TIMED_ROUND_SECS};
use ruuturetki_shared::viewport::{TileSource, Viewport};

use crate::api;
use crate::components::calendar::Calendar;
use crate::components::challenge_info::ChallengeInfo;
use crate::components::help::HowToPlay;
use crate::components::tile_map::TileMap;
use crate::state::{today, use_app_context};
use crate::Route;

const BACKGROUND_ZOOM: u8 = 17;

/// Settings picked in the play dialog.
pub fn play_settings(layer: MapLayer, no_moving: bool, timed: bool) -> GameSettings {
    GameSettings {
        ortolayer: layer,
        dragging: !no_moving,
        timed: timed.then_some(TIMED_ROUND_SECS),
    }
}

#[component]
pub fn Menu() -> Element {
    let mut ctx = use_app_context();
    let background = use_signal(|| {
        let center = random_point(&PLAY_AREA, &mut rand::thread_rng());
        Viewport::new(center, BACKGROUND_ZOOM, 0.0, 0.0)
    });

    let mut show_play = use_signal(|| false);
    let mut show_daily = use_signal(|| false);
    let mut show_calendar = use_signal(|| false);
    let mut show_help = use_signal(|| false);

    let _dailies = use_resource(move || async move {
        match api::fetch_daily_challenges().await {
            Ok(list) => {
                info!("Fetched {} daily challenges", list.len());
                ctx.dailies.set(list);
            }
            Err(e) => warn!("Cannot fetch daily challenges: {}", e),
        }
    });

    let todays = challenge_for_date(&ctx.dailies.read(), &today()).cloned();

    rsx! {
        div { class: "menu",
            div { class: "menu-background",
                TileMap {
                    id: "menu-map",
                    source: TileSource::Wms(MapLayer::Helsinki2024),
                    view: background,
                    dragging: false,
                    zoomable: false,
                }
            }
            div { class: "menu-panel",
                h1 { class: "menu-title", "Ruuturetki" }
                button { class: "btn menu-btn", onclick: move |_| show_play.set(true), "play" }
                if todays.is_some() {
                    button { class: "btn menu-btn", onclick: move |_| show_daily.set(true), "daily challenge" }
                }
                button {
                    class: "btn menu-btn",
                    onclick: move |_| {
                        navigator().push(Route::Practice {});
                    },
                    "practice"
                }
                button { class: "btn menu-btn", onclick: move |_| show_calendar.set(true), "calendar" }
                button { class: "btn menu-btn", onclick: move |_| show_help.set(true), "how to play" }
            }

            if *show_play.read() {
                PlayDialog { show: show_play }
            }
            if let Some(challenge) = todays {
                if *show_daily.read() {
                    DailyDialog { show: show_daily, challenge }
                }
            }
            Calendar { show: show_calendar }
            HowToPlay { show: show_help }
        }
    }
}

/// Mode switches and decade buttons for a normal game.
///
/// Mounted fresh each time it opens, so the switches start from their
/// defaults.
#[component]
fn PlayDialog(show: Signal<bool>) -> Element {
    let mut ctx = use_app_context();
    let mut no_moving = use_signal(|| false);
    let mut timed = use_signal(|| false);

    rsx! {
        div { class: "overlay-backdrop",
            div { class: "overlay play-dialog",
                div { class: "overlay-header",
                    h2 { "Time to get mapping!" }
                    button { class: "close-btn", onclick: move |_| show.set(false), "\u{00d7}" }
                }
                div { class: "switches",
                    label {
                        input {
                            r#type: "checkbox",
                            checked: *no_moving.read(),
                            onchange: move |evt| no_moving.set(evt.checked()),
                        }
                        " no moving"
                    }
                    label {
                        input {
                            r#type: "checkbox",
                            checked: *timed.read(),
                            onchange: move |evt| timed.set(evt.checked()),
                        }
                        " timed ({TIMED_ROUND_SECS} s)"
                    }
                }
                div { class: "decade-buttons",
                    for layer in MapLayer::PLAYABLE {
                        button {
                            class: "btn",
                            onclick: move |_| {
                                ctx.start_normal(play_settings(layer, *no_moving.read(), *timed.read()));
                                show.set(false);
                                navigator().push(Route::Game {});
                            },
                            "{layer.decade()}"
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn DailyDialog(show: Signal<bool>, challenge: ruuturetki_shared::models::DailyChallenge) -> Element {
    let mut ctx = use_app_context();
    let playable = challenge.clone();

    rsx! {
        div { class: "overlay-backdrop",
            div { class: "overlay daily-dialog",
                div { class: "overlay-header",
                    h2 { "Daily Challenge" }
                    button { class: "close-btn", onclick: move |_| show.set(false), "\u{00d7}" }
                }
                ChallengeInfo { challenge }
                button {
                    class: "btn",
                    onclick: move |_| {
                        ctx.start_challenge(playable.clone());
                        show.set(false);
                        navigator().push(Route::Game {});
                    },
                    "Play Daily challenge"
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_settings_defaults() {
        let s = play_settings(MapLayer::Helsinki1969, false, false);
        assert_eq!(s.ortolayer, MapLayer::Helsinki1969);
        assert!(s.dragging);
        assert_eq!(s.timed, None);
    }

    #[test]
    fn test_play_settings_no_moving_timed() {
        let s = play_settings(MapLayer::Helsinki2024, true, true);
        assert!(!s.dragging);
        assert_eq!(s.timed, Some(TIMED_ROUND_SECS));
    }
}
