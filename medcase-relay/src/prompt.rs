//! Comparison dataset and the fixed analysis prompt built around it.

use medcase_core::CaseRecord;
use serde::Serialize;

/// The columns a comparison is allowed to see.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ComparisonRow {
    pub hospital_name: String,
    pub disease_spec: Option<String>,
    pub treatment: Option<String>,
    pub severity: Option<&'static str>,
    pub total_cost_inr: Option<u64>,
    pub outcome: Option<&'static str>,
    pub side_effects: Option<String>,
}

impl From<&CaseRecord> for ComparisonRow {
    fn from(record: &CaseRecord) -> Self {
        Self {
            hospital_name: record.hospital_name.clone(),
            disease_spec: record.disease_spec.clone(),
            treatment: record.treatment.clone(),
            severity: record.severity.map(|severity| severity.as_str()),
            total_cost_inr: record.total_cost_inr,
            outcome: record.outcome.map(|outcome| outcome.as_str()),
            side_effects: record.side_effects.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ComparisonDataset {
    pub disease: String,
    pub records: Vec<ComparisonRow>,
}

impl ComparisonDataset {
    /// Keep the first `limit` records in store order.
    pub fn new(disease: &str, records: &[CaseRecord], limit: usize) -> Self {
        Self {
            disease: disease.to_string(),
            records: records.iter().take(limit).map(ComparisonRow::from).collect(),
        }
    }
}

pub fn build_prompt(dataset: &ComparisonDataset) -> Result<String, serde_json::Error> {
    let data = serde_json::to_string_pretty(dataset)?;
    Ok(format!(
        "You are a healthcare decision-support assistant.

STRICT RULES:
- Use ONLY the provided dataset.
- Do NOT invent hospitals or treatments.
- Compare based on cost, severity, outcome, and side effects.

DATA:
{data}

TASK:
1. Compare treatment effectiveness.
2. Compare cost differences.
3. Analyze severity vs outcome.
4. Recommend best overall hospital-treatment option.
5. Add disclaimer: \"This is for informational purposes only.\"

Return response with clear section headings."
    ))
}
