//! PostgREST `cases` rows to `CaseRecord` converter, plus dashboard entry points.

use chrono::NaiveDate;
use medcase_core::{
    browse, dashboard, AnalyticsConfig, BrowseSnapshot, CaseError, CaseRecord, DashboardSnapshot,
    FilterSpec, Gender, Outcome, Severity,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

mod submission;

pub use submission::{insert_body, CaseSubmission};

/// Records accepted from one store response, with everything that was
/// skipped or normalised on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseBatch {
    pub records: Vec<CaseRecord>,
    pub report: IngestReport,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IngestReport {
    pub accepted: usize,
    pub skipped: usize,
    pub issues: Vec<RowIssue>,
}

impl IngestReport {
    fn note(&mut self, row: usize, kind: IssueKind) {
        self.issues.push(RowIssue { row, kind });
    }

    /// Rows whose outcome was written with the legacy "Improving" spelling.
    pub fn legacy_outcomes(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| matches!(issue.kind, IssueKind::LegacyOutcome))
            .count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RowIssue {
    /// Zero-based position of the row in the response array.
    pub row: usize,
    pub kind: IssueKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    /// Row is not a JSON object; skipped.
    NotAnObject,
    /// Required column missing or blank; row skipped.
    MissingField { field: String },
    /// Enum column with a value outside the known set; treated as absent.
    UnrecognisedValue { field: String, value: String },
    /// Numeric column that could not be read as a non-negative integer.
    InvalidNumber { field: String, value: String },
    InvalidDate { field: String, value: String },
    /// "Improving" migrated to the canonical `Improved`.
    LegacyOutcome,
}

/// Parse a store response from a JSON string.
pub fn parse_rows_str(rows_json: &str) -> Result<CaseBatch, CaseError> {
    let value: Value =
        serde_json::from_str(rows_json).map_err(|err| CaseError::Parse(err.to_string()))?;
    parse_rows_value(&value)
}

/// Parse a store response. An error object (`{"message": ...}`) or any other
/// non-array payload is reported as `CaseError::Source`.
pub fn parse_rows_value(response: &Value) -> Result<CaseBatch, CaseError> {
    let rows = match response {
        Value::Array(rows) => rows,
        Value::Object(object) => return Err(CaseError::Source(describe_store_error(object))),
        other => {
            return Err(CaseError::Source(format!(
                "Expected an array of rows, received {}",
                json_kind(other)
            )))
        }
    };

    let mut batch = CaseBatch::default();
    for (index, row) in rows.iter().enumerate() {
        let Some(object) = row.as_object() else {
            tracing::debug!(row = index, "skipping non-object case row");
            batch.report.note(index, IssueKind::NotAnObject);
            batch.report.skipped += 1;
            continue;
        };

        match RowReader::new(index, object, &mut batch.report).read() {
            Some(record) => {
                batch.records.push(record);
                batch.report.accepted += 1;
            }
            None => batch.report.skipped += 1,
        }
    }

    Ok(batch)
}

/// Browse page over a raw store response. Store failures become an empty
/// snapshot carrying `source_error`.
pub fn browse_rows_value(response: &Value, spec: &FilterSpec) -> BrowseSnapshot {
    match parse_rows_value(response) {
        Ok(batch) => browse(&batch.records, spec),
        Err(err) => BrowseSnapshot::from_source_error(spec, err.to_string()),
    }
}

pub fn browse_rows_str(rows_json: &str, spec: &FilterSpec) -> BrowseSnapshot {
    match parse_rows_str(rows_json) {
        Ok(batch) => browse(&batch.records, spec),
        Err(err) => BrowseSnapshot::from_source_error(spec, err.to_string()),
    }
}

/// Dashboard over a raw store response, selecting diseases by substring.
pub fn dashboard_rows_value(
    response: &Value,
    disease_query: Option<&str>,
    config: &AnalyticsConfig,
) -> DashboardSnapshot {
    match parse_rows_value(response) {
        Ok(batch) => dashboard(&batch.records, disease_query, config),
        Err(err) => DashboardSnapshot::from_source_error(disease_query, config, err.to_string()),
    }
}

pub fn dashboard_rows_str(
    rows_json: &str,
    disease_query: Option<&str>,
    config: &AnalyticsConfig,
) -> DashboardSnapshot {
    match parse_rows_str(rows_json) {
        Ok(batch) => dashboard(&batch.records, disease_query, config),
        Err(err) => DashboardSnapshot::from_source_error(disease_query, config, err.to_string()),
    }
}

fn describe_store_error(object: &Map<String, Value>) -> String {
    let message = object
        .get("message")
        .or_else(|| object.get("error"))
        .and_then(Value::as_str)
        .unwrap_or("unknown store error");

    match object.get("code").and_then(Value::as_str) {
        Some(code) => format!("{message} (code {code})"),
        None => message.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

struct RowReader<'a> {
    index: usize,
    row: &'a Map<String, Value>,
    report: &'a mut IngestReport,
}

impl<'a> RowReader<'a> {
    fn new(index: usize, row: &'a Map<String, Value>, report: &'a mut IngestReport) -> Self {
        Self { index, row, report }
    }

    fn read(mut self) -> Option<CaseRecord> {
        let disease = self.required_text("disease")?;
        let hospital_name = self.required_text("hospital_name")?;

        let treatment_start_date = self.date("treatment_start_date");
        let treatment_end_date = self.date("treatment_end_date");

        Some(CaseRecord {
            id: self.id(),
            disease,
            disease_spec: self.text("disease_spec"),
            hospital_name,
            age: self.number("age").and_then(|age| self.narrow_age(age)),
            gender: self.choice("gender", Gender::parse),
            severity: self.choice("severity", Severity::parse),
            treatment: self.text("treatment"),
            treatment_start_date,
            treatment_end_date,
            total_cost_inr: self.number("total_cost_inr"),
            outcome: self.outcome(),
            side_effects: self.text("side_effects"),
            report_available: self.flag("report_available"),
        })
    }

    fn note(&mut self, kind: IssueKind) {
        self.report.note(self.index, kind);
    }

    fn id(&self) -> Option<String> {
        match self.row.get("id")? {
            Value::String(id) if !id.trim().is_empty() => Some(id.trim().to_string()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    fn text(&self, field: &str) -> Option<String> {
        let text = self.row.get(field)?.as_str()?.trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }

    fn required_text(&mut self, field: &str) -> Option<String> {
        let value = self.text(field);
        if value.is_none() {
            tracing::debug!(row = self.index, field, "skipping case row without required field");
            self.note(IssueKind::MissingField {
                field: field.to_string(),
            });
        }
        value
    }

    fn raw_string(&self, field: &str) -> Option<String> {
        match self.row.get(field)? {
            Value::Null => None,
            Value::String(text) if text.trim().is_empty() => None,
            Value::String(text) => Some(text.trim().to_string()),
            other => Some(other.to_string()),
        }
    }

    fn choice<T>(&mut self, field: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        let raw = self.raw_string(field)?;
        let parsed = parse(&raw);
        if parsed.is_none() {
            self.note(IssueKind::UnrecognisedValue {
                field: field.to_string(),
                value: raw,
            });
        }
        parsed
    }

    fn outcome(&mut self) -> Option<Outcome> {
        let raw = self.raw_string("outcome")?;
        if Outcome::is_legacy_spelling(&raw) {
            self.note(IssueKind::LegacyOutcome);
        }
        self.choice("outcome", Outcome::parse)
    }

    /// Non-negative integer from a JSON number or numeric string. Fractional
    /// values are rounded half-up.
    fn number(&mut self, field: &str) -> Option<u64> {
        let value = self.row.get(field)?;
        let parsed = match value {
            Value::Null => return None,
            Value::Number(number) => number
                .as_u64()
                .or_else(|| number.as_f64().and_then(non_negative_round)),
            Value::String(text) if text.trim().is_empty() => return None,
            Value::String(text) => {
                let text = text.trim().replace(',', "");
                text.parse::<u64>()
                    .ok()
                    .or_else(|| text.parse::<f64>().ok().and_then(non_negative_round))
            }
            _ => None,
        };

        if parsed.is_none() {
            self.note(IssueKind::InvalidNumber {
                field: field.to_string(),
                value: value.to_string(),
            });
        }
        parsed
    }

    fn narrow_age(&mut self, age: u64) -> Option<u32> {
        match u32::try_from(age) {
            Ok(age) => Some(age),
            Err(_) => {
                self.note(IssueKind::InvalidNumber {
                    field: "age".to_string(),
                    value: age.to_string(),
                });
                None
            }
        }
    }

    fn date(&mut self, field: &str) -> Option<NaiveDate> {
        let raw = self.raw_string(field)?;
        let parsed = parse_date(&raw);
        if parsed.is_none() {
            self.note(IssueKind::InvalidDate {
                field: field.to_string(),
                value: raw,
            });
        }
        parsed
    }

    fn flag(&self, field: &str) -> bool {
        match self.row.get(field) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(text)) => text.trim().eq_ignore_ascii_case("true"),
            Some(Value::Number(number)) => number.as_i64() == Some(1),
            _ => false,
        }
    }
}

fn non_negative_round(value: f64) -> Option<u64> {
    if value.is_finite() && value >= 0.0 && value <= u64::MAX as f64 {
        Some(value.round() as u64)
    } else {
        None
    }
}

/// Accepts `YYYY-MM-DD` and timestamps that start with one.
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| value.get(..10).and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()))
}
