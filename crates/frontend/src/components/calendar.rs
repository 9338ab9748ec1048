use chrono::{Datelike, Duration, NaiveDate};
use dioxus::prelude::*;
use ruuturetki_shared::models::{challenge_for_date, validate_date, DATE_FORMAT};
use ruuturetki_shared::viewport::{TileSource, Viewport};

use super::challenge_info::ChallengeInfo;
use super::game_summary::{scores_for, ScoresTable};
use super::tile_map::{MapMarker, MarkerKind, TileMap};
use crate::state::{today, use_app_context};
use crate::Route;

const LOCATIONS_ZOOM: u8 = 13;

const WEEKDAYS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// One row of the month grid, Monday first.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarWeek {
    /// ISO week number.
    pub week: u32,
    pub days: [Option<NaiveDate>; 7],
}

/// Weeks of `year`-`month`; days outside the month are `None`.
pub fn month_grid(year: i32, month: u32) -> Vec<CalendarWeek> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let mut weeks = Vec::new();
    let mut day = first - Duration::days(first.weekday().num_days_from_monday() as i64);
    while day.month() == month || day < first {
        let mut days = [None; 7];
        for slot in days.iter_mut() {
            if day.month() == month && day.year() == year {
                *slot = Some(day);
            }
            day += Duration::days(1);
        }
        let monday = day - Duration::days(7);
        weeks.push(CalendarWeek {
            week: monday.iso_week().week(),
            days,
        });
    }
    weeks
}

/// Month before or after `(year, month)`.
pub fn shift_month(year: i32, month: u32, forward: bool) -> (i32, u32) {
    match (forward, month) {
        (true, 12) => (year + 1, 1),
        (true, m) => (year, m + 1),
        (false, 1) => (year - 1, 12),
        (false, m) => (year, m - 1),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRelation {
    Past,
    Today,
    Future,
}

/// Where `date` sits relative to `today`; both are `YYYY-MM-DD`.
pub fn relation(date: &str, today: &str) -> DateRelation {
    match date.cmp(today) {
        std::cmp::Ordering::Less => DateRelation::Past,
        std::cmp::Ordering::Equal => DateRelation::Today,
        std::cmp::Ordering::Greater => DateRelation::Future,
    }
}

/// Locations of a challenge are revealed the day after it is played.
pub fn reveal_date(date: &str) -> Option<String> {
    let date = validate_date(date).ok()?;
    Some((date + Duration::days(1)).format(DATE_FORMAT).to_string())
}

/// One cell of the rendered grid.
#[derive(Clone, PartialEq)]
struct DayCell {
    date: String,
    day: u32,
    class: &'static str,
}

#[component]
pub fn Calendar(show: Signal<bool>) -> Element {
    let mut ctx = use_app_context();
    let today_str = today();
    let start = validate_date(&today_str).unwrap_or_default();

    let mut shown_month = use_signal(|| (start.year(), start.month()));
    let mut selected = use_signal(|| today_str.clone());
    let scores = use_resource(move || {
        let date = selected.read().clone();
        scores_for(date)
    });

    if !*show.read() {
        return rsx! {};
    }

    let (year, month) = *shown_month.read();
    let month_name = MONTHS.get(month as usize - 1).copied().unwrap_or_default();
    let dailies = ctx.dailies.read().clone();
    let selected_date = selected.read().clone();

    let weeks: Vec<(u32, Vec<Option<DayCell>>)> = month_grid(year, month)
        .into_iter()
        .map(|w| {
            let cells = w
                .days
                .iter()
                .map(|d| {
                    d.map(|d| {
                        let date = d.format(DATE_FORMAT).to_string();
                        let class = if date == selected_date {
                            "calendar-day selected"
                        } else if challenge_for_date(&dailies, &date).is_some() {
                            "calendar-day has-challenge"
                        } else {
                            "calendar-day"
                        };
                        DayCell { date, day: d.day(), class }
                    })
                })
                .collect();
            (w.week, cells)
        })
        .collect();

    let challenge = challenge_for_date(&dailies, &selected_date).cloned();
    let when = relation(&selected_date, &today_str);
    let heading = if when == DateRelation::Today {
        "Daily challenge for today".to_string()
    } else {
        format!("Daily challenge for {}", selected_date)
    };
    let board = scores.read().clone().unwrap_or_default();

    rsx! {
        div { class: "overlay-backdrop",
            div { class: "overlay calendar",
                div { class: "overlay-header",
                    h2 { "Daily Calendar" }
                    button { class: "close-btn", onclick: move |_| show.set(false), "\u{00d7}" }
                }
                div { class: "calendar-nav",
                    button {
                        class: "btn",
                        onclick: move |_| {
                            let (y, m) = *shown_month.read();
                            shown_month.set(shift_month(y, m, false));
                        },
                        "<"
                    }
                    span { "{month_name} {year}" }
                    button {
                        class: "btn",
                        onclick: move |_| {
                            let (y, m) = *shown_month.read();
                            shown_month.set(shift_month(y, m, true));
                        },
                        ">"
                    }
                }
                table { class: "calendar-grid",
                    thead {
                        tr {
                            td { class: "calendar-week", "Wk" }
                            for name in WEEKDAYS {
                                td { "{name}" }
                            }
                        }
                    }
                    tbody {
                        for (week, cells) in weeks {
                            tr {
                                td { class: "calendar-week", "{week}" }
                                for cell in cells {
                                    match cell {
                                        Some(cell) => {
                                            let date = cell.date.clone();
                                            rsx! {
                                                td {
                                                    class: "{cell.class}",
                                                    onclick: move |_| selected.set(date.clone()),
                                                    "{cell.day}"
                                                }
                                            }
                                        }
                                        None => rsx! { td {} },
                                    }
                                }
                            }
                        }
                    }
                }
                div { class: "calendar-content",
                    match challenge {
                        None => rsx! {
                            h4 { "{heading}" }
                            p { "No challenge available" }
                        },
                        Some(challenge) => {
                            let locations: Vec<MapMarker> = challenge
                                .daily_challenge
                                .iter()
                                .enumerate()
                                .map(|(i, r)| {
                                    let mut m = MapMarker::new(i, r.latlng, MarkerKind::Location);
                                    m.label = Some(format!("{}", i + 1));
                                    m
                                })
                                .collect();
                            let center = challenge.maplayer.city_center();
                            let reveal = reveal_date(&challenge.date).unwrap_or_default();
                            let playable = challenge.clone();
                            rsx! {
                                h4 { "{heading}" }
                                ChallengeInfo { challenge: challenge.clone() }
                                match when {
                                    DateRelation::Today => rsx! {
                                        button {
                                            class: "btn",
                                            onclick: move |_| {
                                                ctx.start_challenge(playable.clone());
                                                show.set(false);
                                                navigator().push(Route::Game {});
                                            },
                                            "Play Daily challenge"
                                        }
                                    },
                                    DateRelation::Past => rsx! {
                                        LocationsMap { center, markers: locations }
                                    },
                                    DateRelation::Future => rsx! {
                                        p {
                                            "Locations are revealed a day after the challenge date. For this challenge the reveal date will be {reveal}."
                                        }
                                    },
                                }
                            }
                        }
                    }
                    if !board.is_empty() {
                        ScoresTable { scores: board }
                    }
                }
            }
        }
    }
}

/// Terrain map with the locations of a past challenge.
#[component]
fn LocationsMap(center: ruuturetki_shared::geo::LatLng, markers: Vec<MapMarker>) -> Element {
    let view = use_signal(|| Viewport::new(center, LOCATIONS_ZOOM, 0.0, 0.0));
    rsx! {
        div { class: "calendar-map",
            TileMap {
                id: "calendar-map",
                source: TileSource::Terrain,
                view,
                markers,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_month_grid_starts_on_monday() {
        // 2026-02-01 is a Sunday
        let weeks = month_grid(2026, 2);
        assert_eq!(weeks[0].days[..6], [None; 6]);
        assert_eq!(weeks[0].days[6], Some(date("2026-02-01")));
        assert_eq!(weeks[0].week, 5);
        assert_eq!(weeks.last().unwrap().days[5], Some(date("2026-02-28")));
        assert_eq!(weeks.len(), 5);
    }

    #[test]
    fn test_month_grid_covers_every_day_once() {
        let weeks = month_grid(2026, 3);
        let days: Vec<NaiveDate> = weeks.iter().flat_map(|w| w.days.iter().flatten().copied()).collect();
        assert_eq!(days.len(), 31);
        assert_eq!(days[0], date("2026-03-01"));
        assert_eq!(days[30], date("2026-03-31"));
    }

    #[test]
    fn test_week_numbers_across_new_year() {
        let weeks = month_grid(2027, 1);
        // 2027-01-01 is a Friday in ISO week 53 of 2026
        assert_eq!(weeks[0].week, 53);
        assert_eq!(weeks[1].week, 1);
    }

    #[test]
    fn test_shift_month_wraps_years() {
        assert_eq!(shift_month(2026, 12, true), (2027, 1));
        assert_eq!(shift_month(2026, 1, false), (2025, 12));
        assert_eq!(shift_month(2026, 6, true), (2026, 7));
    }

    #[test]
    fn test_relation_to_today() {
        assert_eq!(relation("2026-02-01", "2026-02-02"), DateRelation::Past);
        assert_eq!(relation("2026-02-02", "2026-02-02"), DateRelation::Today);
        assert_eq!(relation("2026-03-01", "2026-02-02"), DateRelation::Future);
    }

    #[test]
    fn test_reveal_date_is_next_day() {
        assert_eq!(reveal_date("2026-02-28").as_deref(), Some("2026-03-01"));
        assert_eq!(reveal_date("2026-12-31").as_deref(), Some("2027-01-01"));
        assert_eq!(reveal_date("not a date"), None);
    }
}
