use dioxus::logger::tracing::{debug, info};
use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use rand::rngs::StdRng;
use rand::SeedableRng;
use ruuturetki_shared::game::{Phase, RoundController};
use ruuturetki_shared::geo::{Bounds, LatLng, SELECTION_CENTER};
use ruuturetki_shared::models::{DailyChallenge, GameSettings};
use ruuturetki_shared::scoring::ROUNDS;
use ruuturetki_shared::viewport::{TileSource, Viewport};

use crate::components::game_summary::GameSummary;
use crate::components::round_end::RoundEnd;
use crate::components::tile_map::{MapMarker, MarkerKind, TileMap};
use crate::state::use_app_context;
use crate::Route;

/// Side of the square the photo map may be panned within.
const VIEW_BOUNDS_M: f64 = 3_800.0;

const SELECTION_ZOOM: u8 = 11;

/// Build the controller for a new game from the chosen settings.
pub fn new_controller(settings: GameSettings, challenge: Option<&DailyChallenge>) -> RoundController {
    match challenge {
        Some(c) => RoundController::challenge(c),
        None => RoundController::random(settings, StdRng::from_entropy()),
    }
}

pub fn round_indicator(round_id: usize) -> String {
    format!("{}/{}", round_id + 1, ROUNDS)
}

pub fn view_bounds(target: LatLng) -> Bounds {
    Bounds::around(target, VIEW_BOUNDS_M)
}

fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

/// Only a running timed round has a clock to advance.
pub fn timer_running(controller: &RoundController) -> bool {
    controller.time_left().is_some() && matches!(controller.phase(), Phase::AwaitingGuess { .. })
}

fn selection_view() -> Viewport {
    Viewport::new(SELECTION_CENTER, SELECTION_ZOOM, 0.0, 0.0)
}

#[component]
pub fn Game() -> Element {
    let ctx = use_app_context();
    let mut controller = use_signal(|| {
        let settings = ctx.settings.peek().clone();
        let challenge = ctx.challenge.peek().clone();
        let c = new_controller(settings, challenge.as_ref());
        info!("Starting game: {:?}", c.settings());
        c
    });
    let mut view = use_signal(|| {
        let c = controller.peek();
        Viewport::new(c.current_target(), c.current_zoom(), 0.0, 0.0)
    });
    let mut selection = use_signal(selection_view);
    let mut round_epoch = use_signal(|| 0_u32);

    // Keeps both maps and the round clock in step with the controller when a round starts.
    let mut start_round = move || {
        *round_epoch.write() += 1;
        controller.peek().recenter(&mut *view.write());
        let (w, h) = {
            let s = selection.peek();
            (s.width, s.height)
        };
        selection.set(Viewport::new(SELECTION_CENTER, SELECTION_ZOOM, w, h));
    };

    // Restarted on every new round so its first second is a full one
    let _clock = use_resource(move || {
        let epoch = round_epoch();
        async move {
            loop {
                TimeoutFuture::new(1_000).await;
                if !timer_running(&controller.peek()) {
                    continue;
                }
                let result = controller.write().tick();
                if let Some(result) = result {
                    debug!("Time ran out on round {} (clock {})", result.round_id + 1, epoch);
                }
            }
        }
    });

    let c = controller.read();
    let phase = c.phase();
    let settings = c.settings().clone();
    let target = c.current_target();
    let time_left = c.time_left();
    let guess = c.current_guess();
    let is_challenge = c.is_challenge();
    let result = c.round_result();
    let scores = c.state().score.clone();
    drop(c);

    let challenge_date = if is_challenge {
        ctx.challenge.read().as_ref().map(|ch| ch.date.clone())
    } else {
        None
    };

    let markers: Vec<MapMarker> = guess
        .map(|g| vec![MapMarker::new(0, g, MarkerKind::Guess)])
        .unwrap_or_default();

    let round_id = match phase {
        Phase::AwaitingGuess { round_id } | Phase::RoundEnded { round_id } => round_id,
        Phase::GameComplete => ROUNDS - 1,
    };

    rsx! {
        div { class: "game",
            div { class: "view-map",
                TileMap {
                    id: "view-map",
                    source: TileSource::Wms(settings.ortolayer),
                    view,
                    dragging: settings.dragging,
                    zoomable: false,
                    pan_bounds: Some(view_bounds(target)),
                    onmove: move |center: LatLng| {
                        if let Some(drift) = controller.write().track_viewport(center) {
                            debug!("Photo map drifted {:.0} m", drift);
                        }
                    },
                }
            }
            div { class: "selection-map",
                TileMap {
                    id: "selection-map",
                    source: TileSource::Terrain,
                    view: selection,
                    markers,
                    onclick: move |latlng: LatLng| {
                        if let Err(e) = controller.write().register_guess(latlng) {
                            debug!("Guess ignored: {}", e);
                        }
                    },
                }
            }
            div { class: "game-controls",
                span { class: "round-indicator", "{round_indicator(round_id)}" }
                if let Some(secs) = time_left {
                    span { class: "countdown", "{secs}" }
                }
                if settings.timed.is_none() {
                    button {
                        class: "btn",
                        onclick: move |_| {
                            let outcome = controller.write().select();
                            if let Err(e) = outcome {
                                alert(&e.to_string());
                            }
                        },
                        "Select"
                    }
                }
                button {
                    class: "btn",
                    onclick: move |_| {
                        let outcome = controller.write().skip();
                        if let Ok(Phase::AwaitingGuess { .. }) = outcome {
                            start_round();
                        }
                    },
                    "Skip"
                }
                if settings.dragging {
                    button {
                        class: "btn",
                        onclick: move |_| controller.peek().recenter(&mut *view.write()),
                        "Return"
                    }
                }
                button {
                    class: "btn",
                    onclick: move |_| {
                        navigator().push(Route::Menu {});
                    },
                    "Exit"
                }
            }

            match (phase, result) {
                (Phase::RoundEnded { .. }, Some(result)) => rsx! {
                    RoundEnd {
                        key: "{result.round_id}",
                        result,
                        is_challenge,
                        on_next: move |_| {
                            let outcome = controller.write().advance();
                            if let Ok(Phase::AwaitingGuess { .. }) = outcome {
                                start_round();
                            }
                        },
                    }
                },
                (Phase::GameComplete, _) => rsx! {
                    GameSummary {
                        scores,
                        challenge_date,
                        on_end: move |_| {
                            navigator().push(Route::Menu {});
                        },
                    }
                },
                _ => rsx! {},
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruuturetki_shared::geo::distance_meters;
    use ruuturetki_shared::layers::MapLayer;
    use ruuturetki_shared::models::ChallengeRound;

    fn challenge() -> DailyChallenge {
        DailyChallenge {
            date: "2026-02-21".to_string(),
            daily_challenge: (0..5)
                .map(|id| ChallengeRound {
                    id,
                    latlng: LatLng::new(60.2 + id as f64 * 0.01, 24.9),
                    zoom: 15,
                })
                .collect(),
            maplayer: MapLayer::Helsinki1997,
            moving: false,
            timed: Some(15),
        }
    }

    #[test]
    fn test_round_indicator() {
        assert_eq!(round_indicator(0), "1/5");
        assert_eq!(round_indicator(4), "5/5");
    }

    #[test]
    fn test_challenge_controller_uses_challenge_settings() {
        let c = new_controller(GameSettings::default(), Some(&challenge()));
        assert!(c.is_challenge());
        assert_eq!(c.settings().ortolayer, MapLayer::Helsinki1997);
        assert!(!c.settings().dragging);
        assert_eq!(c.current_target(), LatLng::new(60.2, 24.9));
        assert_eq!(c.current_zoom(), 15);
    }

    #[test]
    fn test_normal_controller_keeps_chosen_settings() {
        let settings = GameSettings {
            ortolayer: MapLayer::Helsinki2024,
            dragging: true,
            timed: None,
        };
        let c = new_controller(settings.clone(), None);
        assert!(!c.is_challenge());
        assert_eq!(c.settings(), &settings);
        assert_eq!(c.time_left(), None);
    }

    #[test]
    fn test_timer_runs_only_in_timed_open_rounds() {
        let untimed = new_controller(GameSettings::default(), None);
        assert!(!timer_running(&untimed));

        let mut timed = new_controller(GameSettings::default(), Some(&challenge()));
        assert!(timer_running(&timed));
        timed.register_guess(LatLng::new(60.2, 24.9)).unwrap();
        timed.select().unwrap();
        assert!(!timer_running(&timed));
        timed.advance().unwrap();
        assert!(timer_running(&timed));
        assert_eq!(timed.time_left(), Some(15));
    }

    #[test]
    fn test_view_bounds_extend_1900m_each_way() {
        let target = LatLng::new(60.2, 24.95);
        let b = view_bounds(target);
        let north = LatLng::new(b.north, target.lng);
        let east = LatLng::new(target.lat, b.east);
        assert!((distance_meters(target, north) - 1_900.0).abs() < 20.0);
        assert!((distance_meters(target, east) - 1_900.0).abs() < 20.0);
    }
}
