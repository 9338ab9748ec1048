use serde::{Deserialize, Serialize};

use crate::curator::ZOOM_RANGE;
use crate::geo::LatLng;
use crate::layers::MapLayer;
use crate::scoring::{MAX_GAME_SCORE, ROUNDS};

/// Seconds per round when the timer is switched on.
pub const TIMED_ROUND_SECS: u32 = 15;

/// Name shown on the scoreboard when the player leaves the nickname empty.
pub const ANONYMOUS_PLAYER: &str = "Anonymous player";

/// Date format of challenge and score keys.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Serde for the round timer: `false` when off, a number of seconds when on.
///
/// `null` and a missing field also mean "off"; `true` means the default timer.
pub mod timed {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Flag(bool),
        Secs(u32),
    }

    pub fn serialize<S: Serializer>(value: &Option<u32>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(secs) => s.serialize_u32(*secs),
            None => s.serialize_bool(false),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        Ok(match Option::<Raw>::deserialize(d)? {
            None | Some(Raw::Flag(false)) | Some(Raw::Secs(0)) => None,
            Some(Raw::Flag(true)) => Some(super::TIMED_ROUND_SECS),
            Some(Raw::Secs(secs)) => Some(secs),
        })
    }
}

/// Settings a game starts with. Fixed for the whole game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSettings {
    pub ortolayer: MapLayer,
    pub dragging: bool,
    #[serde(with = "timed", default)]
    pub timed: Option<u32>,
}

impl Default for GameSettings {
    fn default() -> Self {
        GameSettings {
            ortolayer: MapLayer::Helsinki1943,
            dragging: true,
            timed: None,
        }
    }
}

/// One pre-authored round of a daily challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeRound {
    pub id: u32,
    pub latlng: LatLng,
    pub zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyChallenge {
    pub date: String,
    pub daily_challenge: Vec<ChallengeRound>,
    pub maplayer: MapLayer,
    pub moving: bool,
    #[serde(with = "timed", default)]
    pub timed: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeError {
    InvalidDate(String),
    WrongRoundCount(usize),
    RoundOutOfOrder { index: usize, id: u32 },
    ZoomOutOfRange { id: u32, zoom: u8 },
}

impl std::fmt::Display for ChallengeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChallengeError::InvalidDate(d) => write!(f, "Invalid date '{}', expected YYYY-MM-DD", d),
            ChallengeError::WrongRoundCount(n) => {
                write!(f, "A daily challenge needs exactly {} rounds, got {}", ROUNDS, n)
            }
            ChallengeError::RoundOutOfOrder { index, id } => {
                write!(f, "Round at position {} has id {}", index, id)
            }
            ChallengeError::ZoomOutOfRange { id, zoom } => write!(
                f,
                "Round {} zoom {} is outside {}-{}",
                id,
                zoom,
                ZOOM_RANGE.start(),
                ZOOM_RANGE.end()
            ),
        }
    }
}

impl std::error::Error for ChallengeError {}

/// Check that `date` is a real calendar date written as YYYY-MM-DD.
pub fn validate_date(date: &str) -> Result<chrono::NaiveDate, ChallengeError> {
    chrono::NaiveDate::parse_from_str(date, DATE_FORMAT)
        .ok()
        .filter(|d| d.format(DATE_FORMAT).to_string() == date)
        .ok_or_else(|| ChallengeError::InvalidDate(date.to_string()))
}

impl DailyChallenge {
    pub fn validate(&self) -> Result<(), ChallengeError> {
        validate_date(&self.date)?;
        if self.daily_challenge.len() != ROUNDS {
            return Err(ChallengeError::WrongRoundCount(self.daily_challenge.len()));
        }
        for (index, round) in self.daily_challenge.iter().enumerate() {
            if round.id as usize != index {
                return Err(ChallengeError::RoundOutOfOrder { index, id: round.id });
            }
            if !ZOOM_RANGE.contains(&round.zoom) {
                return Err(ChallengeError::ZoomOutOfRange {
                    id: round.id,
                    zoom: round.zoom,
                });
            }
        }
        Ok(())
    }

    /// Game settings for playing this challenge.
    pub fn settings(&self) -> GameSettings {
        GameSettings {
            ortolayer: self.maplayer,
            dragging: self.moving,
            timed: self.timed,
        }
    }

    pub fn locations(&self) -> Vec<LatLng> {
        self.daily_challenge.iter().map(|r| r.latlng).collect()
    }
}

/// Find the challenge for `date` in a fetched list.
pub fn challenge_for_date<'a>(challenges: &'a [DailyChallenge], date: &str) -> Option<&'a DailyChallenge> {
    challenges.iter().find(|c| c.date == date)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyScore {
    pub date: String,
    pub player_name: String,
    pub score: u32,
}

impl DailyScore {
    /// Build a score, falling back to the anonymous name for a blank nickname.
    pub fn with_default_name(date: &str, nickname: &str, score: u32) -> Self {
        let trimmed = nickname.trim();
        DailyScore {
            date: date.to_string(),
            player_name: if trimmed.is_empty() {
                ANONYMOUS_PLAYER.to_string()
            } else {
                trimmed.to_string()
            },
            score: score.min(MAX_GAME_SCORE),
        }
    }
}

/// Highest score first; ties keep their submission order.
pub fn sort_scoreboard(scores: &mut [DailyScore]) {
    scores.sort_by(|a, b| b.score.cmp(&a.score));
}

/// A score as persisted by the server.
#[cfg(feature = "uuid-support")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: uuid::Uuid,
    #[serde(flatten)]
    pub score: DailyScore,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn challenge() -> DailyChallenge {
        DailyChallenge {
            date: "2026-02-11".to_string(),
            daily_challenge: (0..5)
                .map(|id| ChallengeRound {
                    id,
                    latlng: LatLng::new(60.17 + id as f64 * 0.001, 24.938),
                    zoom: 16,
                })
                .collect(),
            maplayer: MapLayer::Helsinki2019,
            moving: true,
            timed: None,
        }
    }

    #[test]
    fn test_challenge_wire_shape() {
        let json = serde_json::to_value(challenge()).unwrap();
        assert_eq!(json["date"], "2026-02-11");
        assert_eq!(json["dailyChallenge"].as_array().unwrap().len(), 5);
        assert_eq!(json["dailyChallenge"][2]["id"], 2);
        assert_eq!(json["dailyChallenge"][0]["latlng"]["lng"], 24.938);
        assert_eq!(json["maplayer"], "avoindata:Ortoilmakuva_2019_20cm");
        assert_eq!(json["moving"], true);
        assert_eq!(json["timed"], false);
    }

    #[test]
    fn test_challenge_parses_timed_number() {
        let json = r#"{"date":"2026-02-21","dailyChallenge":[],"maplayer":"avoindata:Ortoilmakuva_1943","moving":false,"timed":15}"#;
        let c: DailyChallenge = serde_json::from_str(json).unwrap();
        assert_eq!(c.timed, Some(15));
        assert!(!c.moving);
    }

    #[test]
    fn test_timed_null_and_missing_mean_off() {
        let with_null = r#"{"ortolayer":"avoindata:Ortoilmakuva_1943","dragging":true,"timed":null}"#;
        let s: GameSettings = serde_json::from_str(with_null).unwrap();
        assert_eq!(s.timed, None);
        let missing = r#"{"ortolayer":"avoindata:Ortoilmakuva_1943","dragging":true}"#;
        let s: GameSettings = serde_json::from_str(missing).unwrap();
        assert_eq!(s.timed, None);
        let on = r#"{"ortolayer":"avoindata:Ortoilmakuva_1943","dragging":true,"timed":true}"#;
        let s: GameSettings = serde_json::from_str(on).unwrap();
        assert_eq!(s.timed, Some(TIMED_ROUND_SECS));
    }

    #[test]
    fn test_valid_challenge_passes() {
        assert_eq!(challenge().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_bad_dates() {
        for date in ["2026-2-11", "2026-02-30", "yesterday", ""] {
            let mut c = challenge();
            c.date = date.to_string();
            assert_eq!(c.validate(), Err(ChallengeError::InvalidDate(date.to_string())));
        }
    }

    #[test]
    fn test_validate_rejects_wrong_round_count() {
        let mut c = challenge();
        c.daily_challenge.pop();
        assert_eq!(c.validate(), Err(ChallengeError::WrongRoundCount(4)));
    }

    #[test]
    fn test_validate_rejects_shuffled_ids() {
        let mut c = challenge();
        c.daily_challenge.swap(1, 2);
        assert_eq!(
            c.validate(),
            Err(ChallengeError::RoundOutOfOrder { index: 1, id: 2 })
        );
    }

    #[test]
    fn test_validate_rejects_zoom_outside_range() {
        let mut c = challenge();
        c.daily_challenge[3].zoom = 12;
        assert_eq!(
            c.validate(),
            Err(ChallengeError::ZoomOutOfRange { id: 3, zoom: 12 })
        );
    }

    #[test]
    fn test_settings_mirror_challenge() {
        let mut c = challenge();
        c.moving = false;
        c.timed = Some(15);
        let s = c.settings();
        assert_eq!(s.ortolayer, MapLayer::Helsinki2019);
        assert!(!s.dragging);
        assert_eq!(s.timed, Some(15));
    }

    #[test]
    fn test_challenge_for_date() {
        let list = vec![challenge()];
        assert!(challenge_for_date(&list, "2026-02-11").is_some());
        assert!(challenge_for_date(&list, "2026-02-12").is_none());
    }

    #[test]
    fn test_blank_nickname_becomes_anonymous() {
        let s = DailyScore::with_default_name("2026-02-02", "   ", 35_020);
        assert_eq!(s.player_name, ANONYMOUS_PLAYER);
        let s = DailyScore::with_default_name("2026-02-02", " kalle ", 35_020);
        assert_eq!(s.player_name, "kalle");
    }

    #[test]
    fn test_daily_score_wire_shape() {
        let s = DailyScore::with_default_name("2026-02-02", "test1", 35_020);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["playerName"], "test1");
        assert_eq!(json["score"], 35_020);
    }

    #[test]
    fn test_sort_scoreboard_descending() {
        let mut scores = vec![
            DailyScore::with_default_name("2026-02-02", "a", 35_020),
            DailyScore::with_default_name("2026-02-02", "b", 46_020),
            DailyScore::with_default_name("2026-02-02", "c", 16_020),
        ];
        sort_scoreboard(&mut scores);
        let names: Vec<&str> = scores.iter().map(|s| s.player_name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }
}
