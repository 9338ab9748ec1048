use dioxus::prelude::*;
use ruuturetki_shared::models::TIMED_ROUND_SECS;
use ruuturetki_shared::scoring::{MAX_ROUND_SCORE, ROUNDS};

#[component]
pub fn HowToPlay(show: Signal<bool>) -> Element {
    if !*show.read() {
        return rsx! {};
    }

    rsx! {
        div {
            class: "overlay-backdrop",
            onclick: move |_| show.set(false),

            div {
                class: "overlay help-overlay",
                onclick: move |evt: Event<MouseData>| evt.stop_propagation(),

                h2 { "How to play" }

                div { class: "help-info-section",
                    h3 { "Guess the place" }
                    p { "A game has {ROUNDS} rounds. Each round shows an aerial photo of Helsinki from the decade you picked. Find out where it was taken and click that spot on the small map in the corner, then press " b { "select" } "." }
                }

                div { class: "help-info-section",
                    h3 { "Scoring" }
                    p { "A perfect guess is worth {MAX_ROUND_SCORE} points. Every meter between your guess and the right place costs 2 points, and every meter you pan the photo away from where it started costs 2.5 points. A round never scores below zero." }
                }

                div { class: "help-info-section",
                    h3 { "Game modes" }
                    p { b { "No moving" } " locks the photo in place. " b { "Timed" } " gives you {TIMED_ROUND_SECS} seconds per round; when time runs out your current guess is scored, or the round scores zero if you have none." }
                }

                div { class: "help-info-section",
                    h3 { "Daily challenge" }
                    p { "Everyone gets the same five places each day. Submit your total to the scoreboard at the end. The calendar shows past and upcoming challenges; past locations are revealed the day after." }
                }

                div { class: "help-info-section",
                    h3 { "Map controls" }
                    p { "Drag to pan, scroll to zoom. " b { "Return" } " puts the photo back where the round started. " b { "Skip" } " gives up the round for zero points." }
                }

                button {
                    class: "close-help",
                    onclick: move |_| show.set(false),
                    "Close"
                }
            }
        }
    }
}
