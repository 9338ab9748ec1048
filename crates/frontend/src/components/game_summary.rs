use dioxus::logger::tracing::warn;
use dioxus::prelude::*;
use ruuturetki_shared::models::{sort_scoreboard, DailyScore};
use ruuturetki_shared::scoring::{format_points, ScoreRating, MAX_GAME_SCORE, ROUNDS};

use crate::api;

/// Delay before re-reading the scoreboard after a submission.
const RELOAD_DELAY_MS: u32 = 1_000;

/// Load the scoreboard for `date`; failures show as an empty board.
async fn load_scores(date: String) -> Vec<DailyScore> {
    match api::fetch_daily_scores(&date).await {
        Ok(mut scores) => {
            sort_scoreboard(&mut scores);
            scores
        }
        Err(e) => {
            warn!("Cannot fetch daily scores for {}: {}", date, e);
            Vec::new()
        }
    }
}

/// End-of-game dialog body.
///
/// Normal games list the round scores; daily challenges show the
/// scoreboard for `challenge_date` and let the player submit instead.
#[component]
pub fn GameSummary(scores: Vec<u32>, challenge_date: Option<String>, on_end: EventHandler<()>) -> Element {
    let total: u32 = scores.iter().sum();
    let rating = ScoreRating::for_rounds(ROUNDS);
    let total_text = format_points(total);
    let max_text = format_points(MAX_GAME_SCORE);
    let rounds: Vec<(usize, String)> = scores
        .iter()
        .enumerate()
        .map(|(i, s)| (i + 1, format_points(*s)))
        .collect();

    rsx! {
        div { class: "overlay-backdrop",
            div { class: "overlay game-summary",
                h2 { "Game Summary" }
                h4 { class: "fade-in", b { "You got" } }
                div { class: "fade-in summary-points",
                    h2 { "{total_text} / {max_text} points" }
                    if total > 0 {
                        meter {
                            value: "{total}",
                            max: "{rating.max}",
                            low: "{rating.low}",
                            high: "{rating.high}",
                            optimum: "{rating.optimum}",
                        }
                    }
                }
                match challenge_date {
                    Some(date) => rsx! {
                        Scoreboard { date, total }
                    },
                    None => rsx! {
                        div { class: "fade-in summary-rounds",
                            table {
                                thead { tr { td { "Round" } td { "Score" } } }
                                tbody {
                                    for (round, points) in rounds {
                                        tr {
                                            td { class: "summary-round-id", "{round}" }
                                            td { "{points}" }
                                        }
                                    }
                                }
                            }
                        }
                    },
                }
                div { class: "overlay-footer",
                    button { class: "btn", onclick: move |_| on_end.call(()), "End" }
                }
            }
        }
    }
}

/// Daily challenge scoreboard with the nickname form.
#[component]
fn Scoreboard(date: String, total: u32) -> Element {
    let mut nickname = use_signal(String::new);
    let mut is_sent = use_signal(|| false);

    let board_date = date.clone();
    let mut scores = use_resource(move || load_scores(board_date.clone()));

    let onsubmit = move |evt: Event<FormData>| {
        evt.prevent_default();
        let score = DailyScore::with_default_name(&date, &nickname.read(), total);
        api::submit_score_fire(score);
        is_sent.set(true);
        spawn(async move {
            gloo_timers::future::TimeoutFuture::new(RELOAD_DELAY_MS).await;
            scores.restart();
        });
    };

    let board = scores.read().clone().unwrap_or_default();

    rsx! {
        div { class: "fade-in scoreboard",
            ScoresTable { scores: board }
            if !*is_sent.read() {
                div { class: "scoreboard-form fade-in",
                    h4 { b { "Submit your score to the daily challenge scoreboard" } }
                    form { onsubmit,
                        label { r#for: "nickname", "Nickname" }
                        input {
                            id: "nickname",
                            r#type: "text",
                            placeholder: "Enter nickname",
                            value: "{nickname}",
                            oninput: move |evt| nickname.set(evt.value()),
                        }
                        button { class: "btn", r#type: "submit", "Submit" }
                    }
                }
            } else {
                p { "Form submitted" }
            }
        }
    }
}

/// Nickname and score rows, best first.
#[component]
pub fn ScoresTable(scores: Vec<DailyScore>) -> Element {
    let rows: Vec<(String, String)> = scores
        .into_iter()
        .map(|entry| (entry.player_name, format_points(entry.score)))
        .collect();

    rsx! {
        h4 { b { "Scoreboard" } }
        table { class: "scores-table",
            thead { tr { td { b { "Nickname" } } td { b { "Score" } } } }
            tbody {
                for (name, points) in rows {
                    tr {
                        td { class: "scoreboard", "{name}" }
                        td { "{points}" }
                    }
                }
            }
        }
    }
}

/// Scoreboard for `date` without the submission form.
pub async fn scores_for(date: String) -> Vec<DailyScore> {
    load_scores(date).await
}
