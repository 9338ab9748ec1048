use dioxus::prelude::*;
use ruuturetki_shared::game::RoundResult;
use ruuturetki_shared::scoring::{format_points, ScoreRating, ROUNDS};
use ruuturetki_shared::viewport::{TileSource, Viewport};

use super::tile_map::{MapMarker, MarkerKind, TileMap};

/// Zoom of the map comparing the guess to the target.
const RESULT_ZOOM: u8 = 13;

/// Label of the dialog's main button.
pub fn next_label(round_id: usize, is_challenge: bool) -> &'static str {
    if round_id + 1 < ROUNDS {
        "Next"
    } else if is_challenge {
        "Show game summary"
    } else {
        "End"
    }
}

/// "1.2 km" or "850 m".
pub fn format_distance(meters: f64) -> String {
    if meters >= 1_000.0 {
        format!("{:.1} km", meters / 1_000.0)
    } else {
        format!("{:.0} m", meters)
    }
}

fn result_markers(result: &RoundResult) -> Vec<MapMarker> {
    let mut target = MapMarker::new(0, result.target, MarkerKind::Target);
    target.label = Some("The correct location".to_string());
    let mut markers = vec![target];
    if let Some(guess) = result.guess {
        let mut marker = MapMarker::new(1, guess, MarkerKind::Guess);
        marker.label = Some("Your guess".to_string());
        markers.push(marker);
    }
    markers
}

/// Shown after each round: the round score, the two points on a map and
/// the running total.
#[component]
pub fn RoundEnd(result: RoundResult, is_challenge: bool, on_next: EventHandler<()>) -> Element {
    let round_no = result.round_id + 1;
    let played = round_no;
    let round_rating = ScoreRating::for_rounds(1);
    let total_rating = ScoreRating::for_rounds(played);
    let score_text = format_points(result.score);
    let total_text = format_points(result.total);
    let max_text = format_points(total_rating.max);
    let distance_text = result.guess_distance_m.map(format_distance);
    let button = next_label(result.round_id, is_challenge);

    let view = use_signal(|| Viewport::new(result.target, RESULT_ZOOM, 0.0, 0.0));
    let markers = result_markers(&result);
    let line = result.guess.map(|g| (result.target, g));

    rsx! {
        div { class: "overlay-backdrop",
            div { class: "overlay round-end",
                h2 { "Round {round_no} out of {ROUNDS} score" }
                if result.score > 0 {
                    div { class: "fade-in",
                        h3 { "{score_text} points for the round!" }
                        meter {
                            value: "{result.score}",
                            max: "{round_rating.max}",
                            low: "{round_rating.low}",
                            high: "{round_rating.high}",
                            optimum: "{round_rating.optimum}",
                        }
                    }
                } else {
                    h3 { "No points this round" }
                }
                if let Some(distance) = distance_text {
                    p { class: "round-distance", "Your guess was {distance} away." }
                }
                div { class: "result-map",
                    TileMap {
                        id: "result-map",
                        source: TileSource::Terrain,
                        view,
                        markers,
                        line,
                    }
                }
                div { class: "fade-in",
                    h4 { "{total_text} / {max_text} total points" }
                    meter {
                        value: "{result.total}",
                        max: "{total_rating.max}",
                        low: "{total_rating.low}",
                        high: "{total_rating.high}",
                        optimum: "{total_rating.optimum}",
                    }
                }
                div { class: "overlay-footer",
                    button { class: "btn", onclick: move |_| on_next.call(()), "{button}" }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruuturetki_shared::geo::LatLng;

    fn result(guess: Option<LatLng>) -> RoundResult {
        RoundResult {
            round_id: 1,
            target: LatLng::new(60.2, 24.95),
            guess,
            score: 7_500,
            guess_distance_m: guess.map(|_| 850.0),
            drift_m: 0.0,
            total: 15_000,
        }
    }

    #[test]
    fn test_next_label_by_round() {
        assert_eq!(next_label(0, false), "Next");
        assert_eq!(next_label(3, true), "Next");
        assert_eq!(next_label(4, false), "End");
        assert_eq!(next_label(4, true), "Show game summary");
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(850.4), "850 m");
        assert_eq!(format_distance(1_260.0), "1.3 km");
    }

    #[test]
    fn test_markers_include_guess_only_when_present() {
        assert_eq!(result_markers(&result(None)).len(), 1);
        let markers = result_markers(&result(Some(LatLng::new(60.21, 24.96))));
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].kind, MarkerKind::Target);
        assert_eq!(markers[1].label.as_deref(), Some("Your guess"));
    }
}
