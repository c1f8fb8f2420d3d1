//! HTTP surface of the relay: `POST /ai/compare` and a health probe.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderValue, Method};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::RelayError;
use crate::generator::TextGenerator;
use crate::prompt::{build_prompt, ComparisonDataset};
use crate::source::CaseSource;

pub const NO_DATA_MESSAGE: &str = "No matching data found in database.";

/// Collaborators shared by every request.
#[derive(Clone)]
pub struct RelayState {
    source: Arc<dyn CaseSource>,
    generator: Arc<dyn TextGenerator>,
    compare_limit: usize,
}

impl RelayState {
    pub fn new(
        source: Arc<dyn CaseSource>,
        generator: Arc<dyn TextGenerator>,
        compare_limit: usize,
    ) -> Self {
        Self {
            source,
            generator,
            compare_limit,
        }
    }
}

pub fn build_router(state: RelayState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/ai/compare", post(compare))
        .route("/health", get(health))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// CORS policy admitting exactly one browser origin.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, header::InvalidHeaderValue> {
    let origin = HeaderValue::from_str(origin)?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::POST, Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Non-blank `disease` string from the request body. Anything else,
/// including a body that is not JSON, counts as missing.
fn requested_disease(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let disease = value.get("disease")?.as_str()?.trim();
    if disease.is_empty() {
        None
    } else {
        Some(disease.to_string())
    }
}

async fn compare(State(state): State<RelayState>, body: Bytes) -> Result<Response, RelayError> {
    let disease = requested_disease(&body).ok_or(RelayError::MissingDisease)?;
    tracing::info!(disease = %disease, "comparison requested");

    let records = state.source.cases_matching(&disease).await?;
    if records.is_empty() {
        tracing::info!(disease = %disease, "no matching cases");
        return Ok(Json(json!({ "success": false, "message": NO_DATA_MESSAGE })).into_response());
    }

    let dataset = ComparisonDataset::new(&disease, &records, state.compare_limit);
    let prompt = build_prompt(&dataset).map_err(|e| RelayError::Internal(e.to_string()))?;
    let analysis = state.generator.generate(&prompt).await?;

    Ok(Json(json!({
        "success": true,
        "analysis": analysis,
        "metadata": { "recordsAnalyzed": dataset.records.len() },
    }))
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disease_must_be_a_non_blank_string() {
        assert_eq!(
            requested_disease(br#"{"disease": " Dengue "}"#).as_deref(),
            Some("Dengue")
        );
        assert_eq!(requested_disease(br#"{"disease": "   "}"#), None);
        assert_eq!(requested_disease(br#"{"disease": 42}"#), None);
        assert_eq!(requested_disease(br#"{"city": "Pune"}"#), None);
        assert_eq!(requested_disease(b"disease=Dengue"), None);
        assert_eq!(requested_disease(b""), None);
    }

    #[test]
    fn cors_rejects_unusable_origin() {
        assert!(cors_layer("http://localhost:5173").is_ok());
        assert!(cors_layer("bad\norigin").is_err());
    }
}
