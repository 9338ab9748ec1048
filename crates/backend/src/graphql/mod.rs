use std::sync::Arc;

use async_graphql::{Context, InputObject, Object, SimpleObject};
use ruuturetki_shared::{
    geo::LatLng,
    layers::MapLayer,
    models::{validate_date, ChallengeRound, DailyChallenge, DailyScore, ScoreRecord},
    scoring::MAX_GAME_SCORE,
};
use tracing::{info, warn};

use crate::storage::Storage;

// GraphQL output types

#[derive(SimpleObject)]
pub struct GqlLatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(SimpleObject)]
pub struct GqlChallengeRound {
    pub id: u32,
    pub latlng: GqlLatLng,
    pub zoom: u32,
}

#[derive(SimpleObject)]
pub struct GqlDailyChallenge {
    pub date: String,
    pub daily_challenge: Vec<GqlChallengeRound>,
    /// WMS layer name of the photo map.
    pub maplayer: String,
    pub moving: bool,
    /// Seconds per round, null when untimed.
    pub timed: Option<u32>,
}

impl From<DailyChallenge> for GqlDailyChallenge {
    fn from(c: DailyChallenge) -> Self {
        GqlDailyChallenge {
            date: c.date,
            daily_challenge: c
                .daily_challenge
                .into_iter()
                .map(|r| GqlChallengeRound {
                    id: r.id,
                    latlng: GqlLatLng {
                        lat: r.latlng.lat,
                        lng: r.latlng.lng,
                    },
                    zoom: r.zoom as u32,
                })
                .collect(),
            maplayer: c.maplayer.name().to_string(),
            moving: c.moving,
            timed: c.timed,
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlDailyScore {
    pub date: String,
    pub player_name: String,
    pub score: u32,
}

impl From<DailyScore> for GqlDailyScore {
    fn from(s: DailyScore) -> Self {
        GqlDailyScore {
            date: s.date,
            player_name: s.player_name,
            score: s.score,
        }
    }
}

// Input types

#[derive(InputObject)]
pub struct LatLngInput {
    pub lat: f64,
    pub lng: f64,
}

#[derive(InputObject)]
pub struct ChallengeRoundInput {
    pub id: u32,
    pub latlng: LatLngInput,
    pub zoom: u32,
}

#[derive(InputObject)]
pub struct DailyChallengeInput {
    pub date: String,
    pub daily_challenge: Vec<ChallengeRoundInput>,
    pub maplayer: String,
    pub moving: bool,
    pub timed: Option<u32>,
}

impl DailyChallengeInput {
    fn into_challenge(self) -> async_graphql::Result<DailyChallenge> {
        let maplayer = MapLayer::from_name(&self.maplayer)
            .ok_or_else(|| async_graphql::Error::new(format!("Unknown map layer: {}", self.maplayer)))?;
        let mut rounds = Vec::with_capacity(self.daily_challenge.len());
        for r in self.daily_challenge {
            let zoom = u8::try_from(r.zoom)
                .map_err(|_| async_graphql::Error::new(format!("Round {} zoom {} is out of range", r.id, r.zoom)))?;
            rounds.push(ChallengeRound {
                id: r.id,
                latlng: LatLng::new(r.latlng.lat, r.latlng.lng),
                zoom,
            });
        }
        let challenge = DailyChallenge {
            date: self.date,
            daily_challenge: rounds,
            maplayer,
            moving: self.moving,
            timed: self.timed.filter(|&secs| secs > 0),
        };
        challenge
            .validate()
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;
        Ok(challenge)
    }
}

#[derive(InputObject)]
pub struct DailyScoreInput {
    pub date: String,
    /// Blank or missing names are shown as "Anonymous player".
    pub player_name: Option<String>,
    pub score: i64,
}

impl DailyScoreInput {
    fn into_score(self) -> async_graphql::Result<DailyScore> {
        validate_date(&self.date).map_err(|e| async_graphql::Error::new(e.to_string()))?;
        let score = u32::try_from(self.score)
            .ok()
            .filter(|&s| s <= MAX_GAME_SCORE)
            .ok_or_else(|| {
                async_graphql::Error::new(format!(
                    "Score {} is outside 0-{}",
                    self.score, MAX_GAME_SCORE
                ))
            })?;
        Ok(DailyScore::with_default_name(
            &self.date,
            self.player_name.as_deref().unwrap_or(""),
            score,
        ))
    }
}

// Query root

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Every published challenge, oldest first.
    async fn daily_challenges(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<GqlDailyChallenge>> {
        let storage = ctx.data::<Arc<Storage>>()?;
        let challenges = storage.list_challenges().map_err(async_graphql::Error::new)?;
        Ok(challenges.into_iter().map(GqlDailyChallenge::from).collect())
    }

    async fn daily_challenge(
        &self,
        ctx: &Context<'_>,
        date: String,
    ) -> async_graphql::Result<Option<GqlDailyChallenge>> {
        let storage = ctx.data::<Arc<Storage>>()?;
        let challenge = storage.get_challenge(&date).map_err(async_graphql::Error::new)?;
        Ok(challenge.map(GqlDailyChallenge::from))
    }

    /// Scoreboard for a date, best first.
    async fn daily_scores(&self, ctx: &Context<'_>, date: String) -> async_graphql::Result<Vec<GqlDailyScore>> {
        let storage = ctx.data::<Arc<Storage>>()?;
        let scores = storage.scores_for_date(&date).map_err(async_graphql::Error::new)?;
        Ok(scores.into_iter().map(GqlDailyScore::from).collect())
    }
}

// Mutation root

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_daily_challenge(
        &self,
        ctx: &Context<'_>,
        input: DailyChallengeInput,
    ) -> async_graphql::Result<GqlDailyChallenge> {
        let storage = ctx.data::<Arc<Storage>>()?;
        let challenge = input.into_challenge().inspect_err(|e| {
            warn!(error = %e.message, "rejected daily challenge");
        })?;

        storage
            .save_challenge(&challenge)
            .map_err(async_graphql::Error::new)?;
        info!(date = %challenge.date, layer = %challenge.maplayer, "saved daily challenge");

        Ok(GqlDailyChallenge::from(challenge))
    }

    async fn create_daily_score(
        &self,
        ctx: &Context<'_>,
        input: DailyScoreInput,
    ) -> async_graphql::Result<GqlDailyScore> {
        let storage = ctx.data::<Arc<Storage>>()?;
        let score = input.into_score()?;

        let record = ScoreRecord {
            id: uuid::Uuid::new_v4(),
            score,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        storage.save_score(&record).map_err(async_graphql::Error::new)?;
        info!(date = %record.score.date, score = record.score.score, "saved daily score");

        Ok(GqlDailyScore::from(record.score))
    }

    async fn delete_daily_challenge(&self, ctx: &Context<'_>, date: String) -> async_graphql::Result<bool> {
        let storage = ctx.data::<Arc<Storage>>()?;
        let removed = storage.delete_challenge(&date).map_err(async_graphql::Error::new)?;
        if removed {
            info!(%date, "deleted daily challenge");
        }
        Ok(removed)
    }
}

pub type Schema = async_graphql::Schema<QueryRoot, MutationRoot, async_graphql::EmptySubscription>;

pub fn build_schema(storage: Arc<Storage>) -> Schema {
    async_graphql::Schema::build(QueryRoot, MutationRoot, async_graphql::EmptySubscription)
        .data(storage)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruuturetki_shared::models;

    /// Convert a GraphQL response payload back into shared records.
    fn decode<T: serde::de::DeserializeOwned>(value: async_graphql::Value) -> T {
        serde_json::from_value(value.into_json().unwrap()).unwrap()
    }

    fn test_schema() -> (tempfile::TempDir, Schema) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(&dir.path().join("gql.redb")).unwrap();
        (dir, build_schema(storage))
    }

    fn create_challenge_query(date: &str, zoom: u32) -> String {
        let rounds: Vec<String> = (0..5)
            .map(|id| {
                format!(
                    "{{ id: {}, latlng: {{ lat: 60.2{}, lng: 24.95 }}, zoom: {} }}",
                    id, id, zoom
                )
            })
            .collect();
        format!(
            r#"mutation {{
                createDailyChallenge(input: {{
                    date: "{}",
                    dailyChallenge: [{}],
                    maplayer: "avoindata:Ortoilmakuva_1969",
                    moving: false,
                    timed: 15
                }}) {{ date }}
            }}"#,
            date,
            rounds.join(", ")
        )
    }

    #[tokio::test]
    async fn test_create_and_list_challenge() {
        let (_dir, schema) = test_schema();
        let resp = schema.execute(create_challenge_query("2026-02-21", 16)).await;
        assert!(resp.errors.is_empty(), "{:?}", resp.errors);

        let resp = schema
            .execute("{ dailyChallenges { date dailyChallenge { id latlng { lat lng } zoom } maplayer moving timed } }")
            .await;
        assert!(resp.errors.is_empty(), "{:?}", resp.errors);

        #[derive(serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Data {
            daily_challenges: Vec<models::DailyChallenge>,
        }
        let data: Data = decode(resp.data);
        let c = &data.daily_challenges[0];
        assert_eq!(c.date, "2026-02-21");
        assert_eq!(c.maplayer, MapLayer::Helsinki1969);
        assert_eq!(c.timed, Some(15));
        assert!(!c.moving);
        assert_eq!(c.daily_challenge.len(), 5);
        assert_eq!(c.daily_challenge[3].latlng, LatLng::new(60.23, 24.95));
    }

    #[tokio::test]
    async fn test_duplicate_challenge_date_is_an_error() {
        let (_dir, schema) = test_schema();
        let first = schema.execute(create_challenge_query("2026-02-21", 16)).await;
        assert!(first.errors.is_empty());
        let second = schema.execute(create_challenge_query("2026-02-21", 17)).await;
        assert_eq!(second.errors.len(), 1);
        assert!(second.errors[0].message.contains("already exists"));
    }

    #[tokio::test]
    async fn test_challenge_with_bad_zoom_is_rejected() {
        let (_dir, schema) = test_schema();
        let resp = schema.execute(create_challenge_query("2026-02-21", 12)).await;
        assert_eq!(resp.errors.len(), 1);
        let resp = schema.execute("{ dailyChallenge(date: \"2026-02-21\") { date } }").await;
        assert_eq!(resp.data.into_json().unwrap()["dailyChallenge"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_scores_round_trip_with_anonymous_name() {
        let (_dir, schema) = test_schema();
        for (name, score) in [("\"test1\"", 35020), ("\"  \"", 46020)] {
            let resp = schema
                .execute(format!(
                    r#"mutation {{ createDailyScore(input: {{ date: "2026-02-02", playerName: {}, score: {} }}) {{ playerName }} }}"#,
                    name, score
                ))
                .await;
            assert!(resp.errors.is_empty(), "{:?}", resp.errors);
        }

        let resp = schema
            .execute("{ dailyScores(date: \"2026-02-02\") { date playerName score } }")
            .await;
        let json = resp.data.into_json().unwrap();
        let scores: Vec<DailyScore> = serde_json::from_value(json["dailyScores"].clone()).unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].player_name, models::ANONYMOUS_PLAYER);
        assert_eq!(scores[0].score, 46_020);
        assert_eq!(scores[1].player_name, "test1");
    }

    #[tokio::test]
    async fn test_out_of_range_score_is_rejected() {
        let (_dir, schema) = test_schema();
        for score in [-1, 50_001] {
            let resp = schema
                .execute(format!(
                    r#"mutation {{ createDailyScore(input: {{ date: "2026-02-02", score: {} }}) {{ score }} }}"#,
                    score
                ))
                .await;
            assert_eq!(resp.errors.len(), 1, "score {}", score);
        }
    }

    #[tokio::test]
    async fn test_delete_challenge() {
        let (_dir, schema) = test_schema();
        schema.execute(create_challenge_query("2026-02-21", 16)).await;
        let resp = schema
            .execute("mutation { deleteDailyChallenge(date: \"2026-02-21\") }")
            .await;
        assert_eq!(resp.data.into_json().unwrap()["deleteDailyChallenge"], true);
    }
}
