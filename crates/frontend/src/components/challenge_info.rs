use dioxus::prelude::*;
use ruuturetki_shared::models::DailyChallenge;

fn moving_label(moving: bool) -> &'static str {
    if moving {
        "Allowed"
    } else {
        "Disabled"
    }
}

fn timer_label(timed: Option<u32>) -> String {
    match timed {
        Some(secs) => format!("{} seconds per round", secs),
        None => "No".to_string(),
    }
}

/// City, decade and mode of a daily challenge.
#[component]
pub fn ChallengeInfo(challenge: DailyChallenge) -> Element {
    let rows = [
        ("City:", challenge.maplayer.city().to_string()),
        ("Decade:", challenge.maplayer.decade()),
        ("Moving:", moving_label(challenge.moving).to_string()),
        ("Timer:", timer_label(challenge.timed)),
    ];

    rsx! {
        table { class: "challenge-info",
            tbody {
                for (header, value) in rows {
                    tr {
                        td { class: "header", b { "{header}" } }
                        td { class: "data-cell", i { "{value}" } }
                    }
                }
            }
        }
    }
}
