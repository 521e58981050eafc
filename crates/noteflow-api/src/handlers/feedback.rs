//! Feedback submission and learning-cache analytics.
//!
//! Feedback arrives as loose JSON and is validated by hand: a typed
//! extractor would answer malformed payloads with 422, and the contract
//! for this endpoint is 400. Validation failures must leave the cache
//! file untouched, so nothing is recorded until every check passes.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use tracing::info;

use noteflow_core::defaults::{RATING_MAX, RATING_MIN};
use noteflow_core::FeedbackEntry;

use crate::{ApiError, AppState};

fn parse_feedback(body: &serde_json::Value) -> Result<FeedbackEntry, ApiError> {
    let rating = body
        .get("rating")
        .and_then(|v| v.as_f64())
        .ok_or_else(|| ApiError::BadRequest("rating must be a number".to_string()))?;
    if !(RATING_MIN..=RATING_MAX).contains(&rating) {
        return Err(ApiError::BadRequest(format!(
            "rating must be between {} and {}",
            RATING_MIN, RATING_MAX
        )));
    }

    let features = body
        .get("features")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ApiError::BadRequest("features must be an array".to_string()))?
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| ApiError::BadRequest("features must be strings".to_string()))
        })
        .collect::<Result<Vec<String>, ApiError>>()?;

    Ok(FeedbackEntry {
        rating,
        features,
        timestamp: Utc::now(),
    })
}

pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let entry = parse_feedback(&body)?;

    info!(rating = entry.rating, features = entry.features.len(), "feedback received");

    state.cache.record_feedback(entry).await;
    state.cache.persist().await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Feedback recorded",
    })))
}

pub async fn analytics(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    Ok(Json(state.cache.analytics().await))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_feedback_parses() {
        let body = serde_json::json!({"rating": 8, "features": ["diagrams", "layout"]});
        let entry = parse_feedback(&body).unwrap();
        assert_eq!(entry.rating, 8.0);
        assert_eq!(entry.features, vec!["diagrams", "layout"]);
    }

    #[test]
    fn test_boundary_ratings_accepted() {
        for rating in [0.0, 10.0] {
            let body = serde_json::json!({"rating": rating, "features": []});
            assert!(parse_feedback(&body).is_ok(), "rating {} must pass", rating);
        }
    }

    #[test]
    fn test_out_of_range_ratings_rejected() {
        for rating in [-1.0, 11.0] {
            let body = serde_json::json!({"rating": rating, "features": []});
            assert!(
                matches!(parse_feedback(&body), Err(ApiError::BadRequest(_))),
                "rating {} must fail",
                rating
            );
        }
    }

    #[test]
    fn test_missing_or_non_numeric_rating_rejected() {
        let body = serde_json::json!({"features": []});
        assert!(parse_feedback(&body).is_err());

        let body = serde_json::json!({"rating": "eight", "features": []});
        assert!(parse_feedback(&body).is_err());
    }

    #[test]
    fn test_non_array_features_rejected() {
        let body = serde_json::json!({"rating": 5, "features": "diagrams"});
        assert!(matches!(
            parse_feedback(&body),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_non_string_feature_elements_rejected() {
        let body = serde_json::json!({"rating": 5, "features": ["ok", 42]});
        assert!(parse_feedback(&body).is_err());
    }
}
