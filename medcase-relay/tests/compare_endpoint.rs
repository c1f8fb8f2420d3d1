use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use medcase_core::{CaseRecord, Outcome, Severity};
use medcase_relay::{
    build_router, cors_layer, CaseSource, RelayError, RelayState, TextGenerator, NO_DATA_MESSAGE,
};
use serde_json::Value;
use tower::ServiceExt;

struct MockSource {
    records: Vec<CaseRecord>,
    fail: bool,
    queries: Mutex<Vec<String>>,
}

impl MockSource {
    fn with_records(records: Vec<CaseRecord>) -> Self {
        Self {
            records,
            fail: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::with_records(Vec::new())
        }
    }
}

#[async_trait]
impl CaseSource for MockSource {
    async fn cases_matching(&self, disease: &str) -> Result<Vec<CaseRecord>, RelayError> {
        self.queries.lock().unwrap().push(disease.to_string());
        if self.fail {
            return Err(RelayError::Store("status 401: invalid JWT".into()));
        }
        let needle = disease.to_lowercase();
        Ok(self
            .records
            .iter()
            .filter(|record| record.disease.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

struct MockGenerator {
    response: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, RelayError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.response.clone().map_err(RelayError::Generation)
    }
}

fn dengue_cases(count: usize) -> Vec<CaseRecord> {
    (0..count)
        .map(|index| CaseRecord {
            severity: Some(Severity::Severe),
            outcome: Some(Outcome::Recovered),
            total_cost_inr: Some(50_000 + index as u64),
            ..CaseRecord::new("Dengue", format!("Hospital {index}"))
        })
        .collect()
}

fn app(source: Arc<MockSource>, generator: Arc<MockGenerator>) -> Router {
    let state = RelayState::new(source, generator, 10);
    build_router(state, cors_layer("http://localhost:5173").unwrap())
}

fn compare_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/ai/compare")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn missing_disease_is_rejected() {
    let source = Arc::new(MockSource::with_records(dengue_cases(2)));
    let generator = Arc::new(MockGenerator::new("unused"));

    for body in [r#"{}"#, r#"{"disease": ""}"#, "not json"] {
        let response = app(source.clone(), generator.clone())
            .oneshot(compare_request(body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = read_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Disease is required");
    }

    assert!(source.queries.lock().unwrap().is_empty());
    assert!(generator.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn no_matching_rows_is_not_an_error() {
    let source = Arc::new(MockSource::with_records(dengue_cases(2)));
    let generator = Arc::new(MockGenerator::new("unused"));

    let response = app(source.clone(), generator.clone())
        .oneshot(compare_request(r#"{"disease": "Malaria"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], NO_DATA_MESSAGE);
    assert!(generator.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn analysis_covers_at_most_ten_records() {
    let source = Arc::new(MockSource::with_records(dengue_cases(14)));
    let generator = Arc::new(MockGenerator::new("## Recommendation\nHospital 0."));

    let response = app(source.clone(), generator.clone())
        .oneshot(compare_request(r#"{"disease": "dengue"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["analysis"], "## Recommendation\nHospital 0.");
    assert_eq!(json["metadata"]["recordsAnalyzed"], 10);

    assert_eq!(source.queries.lock().unwrap().as_slice(), ["dengue".to_string()]);
    let prompts = generator.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Hospital 9"));
    assert!(!prompts[0].contains("Hospital 10"));
}

#[tokio::test]
async fn store_failure_maps_to_server_error() {
    let source = Arc::new(MockSource::failing());
    let generator = Arc::new(MockGenerator::new("unused"));

    let response = app(source, generator)
        .oneshot(compare_request(r#"{"disease": "Dengue"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = read_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Case store error: status 401: invalid JWT");
}

#[tokio::test]
async fn generator_failure_maps_to_server_error() {
    let source = Arc::new(MockSource::with_records(dengue_cases(1)));
    let generator = Arc::new(MockGenerator::failing("quota exceeded"));

    let response = app(source, generator)
        .oneshot(compare_request(r#"{"disease": "Dengue"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = read_json(response).await;
    assert_eq!(json["error"], "Text generation failed: quota exceeded");
}

#[tokio::test]
async fn preflight_allows_configured_origin() {
    let source = Arc::new(MockSource::with_records(Vec::new()));
    let generator = Arc::new(MockGenerator::new("unused"));

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/ai/compare")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app(source, generator).oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:5173"
    );
}
