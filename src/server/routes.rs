//! Element endpoints: combination lookup and score submission.

use std::sync::atomic::Ordering;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::state::ServerState;

const MISSING_ELEMENTS: &str = "Missing element1 or element2";
const MISSING_SCORE: &str = "No score provided";
const GENERATION_FAILED: &str = "Combination generation failed";
const SCORE_RECEIVED: &str = "Score received successfully";

#[derive(Debug, Default, Deserialize)]
pub struct CombinationQuery {
    pub element1: Option<String>,
    pub element2: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CombinationResponse {
    pub element1: String,
    pub element2: String,
    pub result: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub message: &'static str,
    pub score: i64,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}

fn error_response(status: StatusCode, error: &'static str) -> Response {
    (status, Json(ErrorBody { error })).into_response()
}

fn bad_request(error: &'static str) -> Response {
    error_response(StatusCode::BAD_REQUEST, error)
}

/// `GET /get_combination?element1=..&element2=..`: what the pair makes.
///
/// Pairs missing from the recipe book go to the generator and are stored for
/// later lookups. Without a generator they answer `result: null`; a failed
/// generation answers 502.
pub async fn get_combination(State(state): State<ServerState>, Query(query): Query<CombinationQuery>) -> Response {
    let (Some(element1), Some(element2)) = (
        query.element1.filter(|e| !e.is_empty()),
        query.element2.filter(|e| !e.is_empty()),
    ) else {
        return bad_request(MISSING_ELEMENTS);
    };

    let known = state.recipes.read().await.lookup(&element1, &element2).map(str::to_string);
    let result = match (known, &state.generator) {
        (Some(result), _) => Some(result),
        (None, None) => None,
        (None, Some(generator)) => match generator.generate(&element1, &element2).await {
            Ok(generated) => {
                let result = state.recipes.write().await.learn(&element1, &element2, &generated);
                info!(%element1, %element2, %generated, %result, "combination generated");
                Some(result)
            }
            Err(err) => {
                warn!(%element1, %element2, error = %err, "combination generation failed");
                return error_response(StatusCode::BAD_GATEWAY, GENERATION_FAILED);
            }
        },
    };
    debug!(%element1, %element2, result = ?result, "combination requested");
    Json(CombinationResponse { element1, element2, result }).into_response()
}

/// `POST /submit-score` with `{ "score": <int> }`.
pub async fn submit_score(State(state): State<ServerState>, body: Result<Json<serde_json::Value>, JsonRejection>) -> Response {
    let score = match body {
        Ok(Json(value)) => parse_score(&value),
        Err(rejection) => {
            debug!(error = %rejection, "score body rejected");
            None
        }
    };
    let Some(score) = score else {
        return bad_request(MISSING_SCORE);
    };

    let submitted = state.scores_received.fetch_add(1, Ordering::Relaxed) + 1;
    info!(score, submitted, "score received");
    Json(ScoreResponse { message: SCORE_RECEIVED, score }).into_response()
}

fn parse_score(value: &serde_json::Value) -> Option<i64> {
    value.get("score").and_then(serde_json::Value::as_i64)
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
