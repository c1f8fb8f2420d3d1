//! Case submission form to `cases` insert payload.

use chrono::NaiveDate;
use medcase_core::{CaseError, CaseRecord, Gender, Outcome, Severity, ALL_LABEL};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::parse_date;

/// Raw values as typed into the submission form. Every field is text except
/// the report checkbox; empty text means "not provided".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaseSubmission {
    pub disease: String,
    pub disease_spec: String,
    pub hospital_name: String,
    pub age: String,
    pub gender: String,
    pub severity: String,
    pub treatment: String,
    pub treatment_start_date: String,
    pub treatment_end_date: String,
    pub total_cost_inr: String,
    pub outcome: String,
    pub side_effects: String,
    pub report_available: bool,
}

impl CaseSubmission {
    /// Validate the form and build the record to insert.
    ///
    /// `disease` and `hospital_name` are required. Other fields may be left
    /// blank, but a non-blank value that cannot be read is rejected rather
    /// than silently dropped.
    pub fn validate(&self) -> Result<CaseRecord, CaseError> {
        let disease = required("disease", &self.disease)?;
        let hospital_name = required("hospital_name", &self.hospital_name)?;

        Ok(CaseRecord {
            id: None,
            disease,
            disease_spec: optional(&self.disease_spec),
            hospital_name,
            age: integer("age", &self.age)?,
            gender: choice("gender", &self.gender, Gender::parse)?,
            severity: choice("severity", &self.severity, Severity::parse)?,
            treatment: optional(&self.treatment),
            treatment_start_date: date("treatment_start_date", &self.treatment_start_date)?,
            treatment_end_date: date("treatment_end_date", &self.treatment_end_date)?,
            total_cost_inr: integer("total_cost_inr", &self.total_cost_inr)?,
            outcome: choice("outcome", &self.outcome, Outcome::parse)?,
            side_effects: optional(&self.side_effects),
            report_available: self.report_available,
        })
    }
}

/// PostgREST insert body for one record: a single-element array without `id`.
pub fn insert_body(record: &CaseRecord) -> Value {
    json!([{
        "disease": record.disease,
        "disease_spec": record.disease_spec,
        "hospital_name": record.hospital_name,
        "age": record.age,
        "gender": record.gender.map(Gender::as_str),
        "severity": record.severity.map(Severity::as_str),
        "treatment": record.treatment,
        "treatment_start_date": record.treatment_start_date.map(|d| d.to_string()),
        "treatment_end_date": record.treatment_end_date.map(|d| d.to_string()),
        "total_cost_inr": record.total_cost_inr,
        "outcome": record.outcome.map(Outcome::as_str),
        "side_effects": record.side_effects,
        "report_available": record.report_available,
    }])
}

fn optional(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn required(field: &'static str, raw: &str) -> Result<String, CaseError> {
    optional(raw).ok_or(CaseError::MissingField(field))
}

fn invalid(field: &'static str, raw: &str) -> CaseError {
    CaseError::InvalidValue {
        field,
        value: raw.trim().to_string(),
    }
}

fn integer<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<Option<T>, CaseError> {
    match optional(raw) {
        None => Ok(None),
        Some(text) => text
            .replace(',', "")
            .parse::<T>()
            .map(Some)
            .map_err(|_| invalid(field, raw)),
    }
}

fn choice<T>(
    field: &'static str,
    raw: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, CaseError> {
    match optional(raw) {
        None => Ok(None),
        Some(text) if text == ALL_LABEL => Ok(None),
        Some(text) => parse(&text).map(Some).ok_or_else(|| invalid(field, raw)),
    }
}

fn date(field: &'static str, raw: &str) -> Result<Option<NaiveDate>, CaseError> {
    match optional(raw) {
        None => Ok(None),
        Some(text) => parse_date(&text).map(Some).ok_or_else(|| invalid(field, raw)),
    }
}
