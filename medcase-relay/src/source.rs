//! Case store access over the Supabase REST (PostgREST) API.

use std::time::Duration;

use async_trait::async_trait;
use medcase_core::CaseRecord;

use crate::error::RelayError;

/// Supplies the cases whose disease name matches a free-text query.
#[async_trait]
pub trait CaseSource: Send + Sync {
    async fn cases_matching(&self, disease: &str) -> Result<Vec<CaseRecord>, RelayError>;
}

/// `cases` table reader authenticated with a service key.
pub struct SupabaseSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout_secs: u64,
}

impl SupabaseSource {
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RelayError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout_secs,
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/cases", self.base_url)
    }
}

/// PostgREST filter for a case-insensitive substring match.
pub fn ilike_filter(disease: &str) -> String {
    format!("ilike.*{}*", disease.trim())
}

#[async_trait]
impl CaseSource for SupabaseSource {
    async fn cases_matching(&self, disease: &str) -> Result<Vec<CaseRecord>, RelayError> {
        let filter = ilike_filter(disease);
        let response = self
            .client
            .get(self.table_url())
            .query(&[("select", "*"), ("disease", filter.as_str())])
            .header("apikey", self.api_key.as_str())
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    RelayError::StoreConnection(self.base_url.clone())
                } else if e.is_timeout() {
                    RelayError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    RelayError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        let payload: serde_json::Value = if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| RelayError::Store(format!("unreadable response: {e}")))?
        } else {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Store(format!("status {}: {body}", status.as_u16())));
        };

        let batch = medcase_supabase::parse_rows_value(&payload)
            .map_err(|e| RelayError::Store(e.to_string()))?;

        if batch.report.skipped > 0 || !batch.report.issues.is_empty() {
            tracing::warn!(
                accepted = batch.report.accepted,
                skipped = batch.report.skipped,
                issues = batch.report.issues.len(),
                "case rows normalised during ingest"
            );
        }
        tracing::debug!(disease, rows = batch.records.len(), "fetched matching cases");

        Ok(batch.records)
    }
}
