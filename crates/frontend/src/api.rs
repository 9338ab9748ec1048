use ruuturetki_shared::models::{DailyChallenge, DailyScore};
use serde::{Deserialize, Serialize};

/// Build the variables JSON for a create score mutation.
pub fn build_create_score_variables(score: &DailyScore) -> serde_json::Value {
    serde_json::json!({
        "input": {
            "date": score.date,
            "playerName": score.player_name,
            "score": score.score
        }
    })
}

/// Build the variables JSON for a create challenge mutation.
pub fn build_create_challenge_variables(challenge: &DailyChallenge) -> serde_json::Value {
    let rounds: serde_json::Value = challenge
        .daily_challenge
        .iter()
        .map(|r| {
            serde_json::json!({
                "id": r.id,
                "latlng": { "lat": r.latlng.lat, "lng": r.latlng.lng },
                "zoom": r.zoom
            })
        })
        .collect();
    serde_json::json!({
        "input": {
            "date": challenge.date,
            "dailyChallenge": rounds,
            "maplayer": challenge.maplayer.name(),
            "moving": challenge.moving,
            "timed": challenge.timed
        }
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphQLRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLError {
    pub message: String,
}

impl<T> GraphQLResponse<T> {
    /// First error message wins; otherwise the data must be present.
    pub fn into_result(self) -> Result<T, String> {
        if let Some(error) = self.errors.and_then(|errors| errors.into_iter().next()) {
            return Err(error.message);
        }
        self.data.ok_or_else(|| "No data returned".to_string())
    }
}

fn api_url() -> Result<String, String> {
    // Same origin as the page
    let origin = web_sys::window()
        .ok_or("No window")?
        .location()
        .origin()
        .map_err(|_| "No origin".to_string())?;
    Ok(format!("{}/graphql", origin))
}

async fn query<T: for<'de> Deserialize<'de>>(
    query_str: &str,
    variables: Option<serde_json::Value>,
) -> Result<T, String> {
    let req = GraphQLRequest {
        query: query_str.to_string(),
        variables,
    };

    let resp = reqwest::Client::new()
        .post(api_url()?)
        .json(&req)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let gql_resp: GraphQLResponse<T> = resp.json().await.map_err(|e| e.to_string())?;
    gql_resp.into_result()
}

const CHALLENGE_FIELDS: &str = "date dailyChallenge { id latlng { lat lng } zoom } maplayer moving timed";

// Response shapes

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyChallengesResponse {
    pub daily_challenges: Vec<DailyChallenge>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyScoresResponse {
    pub daily_scores: Vec<DailyScore>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDailyScoreResponse {
    pub create_daily_score: DailyScore,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDailyChallengeResponse {
    pub create_daily_challenge: DailyChallenge,
}

// API functions

pub async fn fetch_daily_challenges() -> Result<Vec<DailyChallenge>, String> {
    let resp: DailyChallengesResponse = query(
        &format!("query {{ dailyChallenges {{ {} }} }}", CHALLENGE_FIELDS),
        None,
    )
    .await?;
    Ok(resp.daily_challenges)
}

/// Scoreboard for `date`, best first.
pub async fn fetch_daily_scores(date: &str) -> Result<Vec<DailyScore>, String> {
    let resp: DailyScoresResponse = query(
        r#"query DailyScores($date: String!) {
            dailyScores(date: $date) { date playerName score }
        }"#,
        Some(serde_json::json!({ "date": date })),
    )
    .await?;
    Ok(resp.daily_scores)
}

pub async fn create_daily_score(score: &DailyScore) -> Result<DailyScore, String> {
    let resp: CreateDailyScoreResponse = query(
        r#"mutation CreateDailyScore($input: DailyScoreInput!) {
            createDailyScore(input: $input) { date playerName score }
        }"#,
        Some(build_create_score_variables(score)),
    )
    .await?;
    Ok(resp.create_daily_score)
}

/// Fire-and-forget score submission. Failures are only logged.
pub fn submit_score_fire(score: DailyScore) {
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(e) = create_daily_score(&score).await {
            dioxus::logger::tracing::warn!("Score submission failed: {}", e);
        }
    });
}

pub async fn create_daily_challenge(challenge: &DailyChallenge) -> Result<DailyChallenge, String> {
    let resp: CreateDailyChallengeResponse = query(
        &format!(
            "mutation CreateDailyChallenge($input: DailyChallengeInput!) {{ createDailyChallenge(input: $input) {{ {} }} }}",
            CHALLENGE_FIELDS
        ),
        Some(build_create_challenge_variables(challenge)),
    )
    .await?;
    Ok(resp.create_daily_challenge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruuturetki_shared::geo::LatLng;
    use ruuturetki_shared::layers::MapLayer;
    use ruuturetki_shared::models::ChallengeRound;

    fn challenge() -> DailyChallenge {
        DailyChallenge {
            date: "2026-02-21".to_string(),
            daily_challenge: (0..5)
                .map(|id| ChallengeRound {
                    id,
                    latlng: LatLng::new(60.2, 24.9 + id as f64 * 0.01),
                    zoom: 15,
                })
                .collect(),
            maplayer: MapLayer::Helsinki2024,
            moving: true,
            timed: None,
        }
    }

    #[test]
    fn test_graphql_request_serializes_with_variables() {
        let req = GraphQLRequest {
            query: "query DailyScores($date: String!) { dailyScores(date: $date) { score } }".to_string(),
            variables: Some(serde_json::json!({"date": "2026-02-02"})),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["variables"]["date"], "2026-02-02");
    }

    #[test]
    fn test_graphql_request_omits_null_variables() {
        let req = GraphQLRequest {
            query: "query { dailyChallenges { date } }".to_string(),
            variables: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("variables").is_none());
    }

    #[test]
    fn test_challenges_response_deserializes_with_null_timer() {
        let json = r#"{"dailyChallenges":[{"date":"2026-02-21","dailyChallenge":[{"id":0,"latlng":{"lat":60.2,"lng":24.9},"zoom":16}],"maplayer":"avoindata:Ortoilmakuva_1997","moving":false,"timed":null}]}"#;
        let resp: DailyChallengesResponse = serde_json::from_str(json).unwrap();
        let c = &resp.daily_challenges[0];
        assert_eq!(c.maplayer, MapLayer::Helsinki1997);
        assert_eq!(c.timed, None);
        assert_eq!(c.daily_challenge[0].zoom, 16);
    }

    #[test]
    fn test_scores_response_deserializes() {
        let json = r#"{"dailyScores":[{"date":"2026-02-02","playerName":"test2","score":46020},{"date":"2026-02-02","playerName":"test1","score":35020}]}"#;
        let resp: DailyScoresResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.daily_scores.len(), 2);
        assert_eq!(resp.daily_scores[0].player_name, "test2");
    }

    #[test]
    fn test_error_response_becomes_err() {
        let json = r#"{"data":null,"errors":[{"message":"A challenge for 2026-02-21 already exists"}]}"#;
        let resp: GraphQLResponse<CreateDailyChallengeResponse> = serde_json::from_str(json).unwrap();
        assert_eq!(
            resp.into_result().err(),
            Some("A challenge for 2026-02-21 already exists".to_string())
        );
    }

    #[test]
    fn test_missing_data_becomes_err() {
        let resp: GraphQLResponse<DailyScoresResponse> = serde_json::from_str(r#"{"data":null}"#).unwrap();
        assert_eq!(resp.into_result().err(), Some("No data returned".to_string()));
    }

    #[test]
    fn test_build_create_score_variables() {
        let score = DailyScore::with_default_name("2026-02-02", "", 35_020);
        let vars = build_create_score_variables(&score);
        assert_eq!(vars["input"]["date"], "2026-02-02");
        assert_eq!(vars["input"]["playerName"], "Anonymous player");
        assert_eq!(vars["input"]["score"], 35_020);
    }

    #[test]
    fn test_build_create_challenge_variables() {
        let vars = build_create_challenge_variables(&challenge());
        let input = &vars["input"];
        assert_eq!(input["date"], "2026-02-21");
        assert_eq!(input["maplayer"], "avoindata:Ortoilmakuva_2024_5cm");
        assert_eq!(input["dailyChallenge"].as_array().unwrap().len(), 5);
        assert_eq!(input["dailyChallenge"][4]["id"], 4);
        assert_eq!(input["dailyChallenge"][4]["zoom"], 15);
        assert!(input["timed"].is_null());
    }

    #[test]
    fn test_build_create_challenge_variables_timed() {
        let mut c = challenge();
        c.timed = Some(15);
        let vars = build_create_challenge_variables(&c);
        assert_eq!(vars["input"]["timed"], 15);
    }
}
