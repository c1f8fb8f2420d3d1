//! Bộ lọc ca bệnh: từ khóa, thuộc tính phân loại, khoảng tuổi và tab kết quả.

use serde::{Deserialize, Serialize};

use crate::{CaseError, CaseRecord, Gender, Outcome, Severity, ALL_LABEL};

/// Tập điều kiện lọc tại một thời điểm. `None` nghĩa là "All".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FilterSpec {
    pub disease: Option<String>,
    pub severity: Option<Severity>,
    pub outcome: Option<Outcome>,
    pub gender: Option<Gender>,
    pub age_min: Option<u32>,
    pub age_max: Option<u32>,
    pub search: String,
    /// Tab kết quả đang chọn, áp dụng sau cùng.
    pub tab: Option<Outcome>,
}

impl FilterSpec {
    /// Dựng bộ lọc từ giá trị thô của form ("All" hoặc chuỗi rỗng = không lọc).
    #[allow(clippy::too_many_arguments)]
    pub fn from_form(
        disease: &str,
        severity: &str,
        outcome: &str,
        gender: &str,
        age_min: &str,
        age_max: &str,
        search: &str,
        tab: &str,
    ) -> Result<Self, CaseError> {
        Ok(Self {
            disease: choice(disease).map(str::to_string),
            severity: parse_choice("severity", severity, Severity::parse)?,
            outcome: parse_choice("outcome", outcome, Outcome::parse)?,
            gender: parse_choice("gender", gender, Gender::parse)?,
            age_min: parse_bound("age_min", age_min)?,
            age_max: parse_bound("age_max", age_max)?,
            search: search.to_string(),
            tab: parse_choice("tab", tab, Outcome::parse)?,
        })
    }

    /// `true` khi bộ lọc không ràng buộc gì.
    pub fn is_identity(&self) -> bool {
        self.disease.is_none()
            && self.severity.is_none()
            && self.outcome.is_none()
            && self.gender.is_none()
            && self.age_min.is_none()
            && self.age_max.is_none()
            && self.tab.is_none()
            && self.search.trim().is_empty()
    }
}

fn choice(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == ALL_LABEL {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_choice<T>(
    field: &'static str,
    raw: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, CaseError> {
    match choice(raw) {
        None => Ok(None),
        Some(value) => parse(value).map(Some).ok_or_else(|| CaseError::InvalidValue {
            field,
            value: value.to_string(),
        }),
    }
}

fn parse_bound(field: &'static str, raw: &str) -> Result<Option<u32>, CaseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u32>()
        .map(Some)
        .map_err(|_| CaseError::InvalidValue {
            field,
            value: trimmed.to_string(),
        })
}

/// Kiểm tra một bản ghi có thỏa toàn bộ bộ lọc hay không.
///
/// Trường vắng mặt không khớp bất kỳ ràng buộc nào đang bật, kể cả
/// giới hạn tuổi.
pub fn matches(record: &CaseRecord, spec: &FilterSpec) -> bool {
    let query = spec.search.trim().to_lowercase();
    if !query.is_empty() && !matches_search(record, &query) {
        return false;
    }

    if let Some(disease) = &spec.disease {
        if record.disease != *disease {
            return false;
        }
    }
    if !field_matches(record.severity, spec.severity)
        || !field_matches(record.outcome, spec.outcome)
        || !field_matches(record.gender, spec.gender)
    {
        return false;
    }

    if spec.age_min.is_some() || spec.age_max.is_some() {
        let Some(age) = record.age else {
            return false;
        };
        if spec.age_min.is_some_and(|min| age < min) || spec.age_max.is_some_and(|max| age > max)
        {
            return false;
        }
    }

    field_matches(record.outcome, spec.tab)
}

fn matches_search(record: &CaseRecord, query: &str) -> bool {
    [
        Some(record.disease.as_str()),
        record.disease_spec.as_deref(),
        record.treatment.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|text| text.to_lowercase().contains(query))
}

fn field_matches<T: PartialEq>(value: Option<T>, wanted: Option<T>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => value == Some(wanted),
    }
}

/// Lọc danh sách theo `spec`, giữ nguyên thứ tự đầu vào.
pub fn filter_cases<'a>(records: &'a [CaseRecord], spec: &FilterSpec) -> Vec<&'a CaseRecord> {
    records.iter().filter(|record| matches(record, spec)).collect()
}

/// Chọn ca có tên bệnh chứa `query` (không phân biệt hoa thường).
///
/// `None`, chuỗi rỗng hoặc "All" chọn toàn bộ.
pub fn select_disease<'a>(records: &'a [CaseRecord], query: Option<&str>) -> Vec<&'a CaseRecord> {
    let needle = query.and_then(choice).map(str::to_lowercase);
    records
        .iter()
        .filter(|record| match &needle {
            Some(needle) => record.disease.to_lowercase().contains(needle),
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(disease: &str, age: Option<u32>, outcome: Option<Outcome>) -> CaseRecord {
        CaseRecord {
            age,
            outcome,
            ..CaseRecord::new(disease, "Apollo")
        }
    }

    #[test]
    fn default_spec_is_identity() {
        let records = vec![
            record("Asthma", Some(30), None),
            record("Diabetes", None, Some(Outcome::Stable)),
        ];
        let spec = FilterSpec::default();
        assert!(spec.is_identity());
        assert_eq!(filter_cases(&records, &spec).len(), records.len());
    }

    #[test]
    fn search_covers_spec_and_treatment() {
        let mut with_spec = record("Diabetes", None, None);
        with_spec.disease_spec = Some("HbA1c 9.2".into());
        let mut with_treatment = record("Asthma", None, None);
        with_treatment.treatment = Some("Inhaled corticosteroids".into());
        let plain = record("Dengue", None, None);

        let spec = FilterSpec {
            search: "HBA1C".into(),
            ..FilterSpec::default()
        };
        assert!(matches(&with_spec, &spec));
        assert!(!matches(&plain, &spec));

        let spec = FilterSpec {
            search: "  steroid ".into(),
            ..FilterSpec::default()
        };
        assert!(matches(&with_treatment, &spec));
        assert!(!matches(&with_spec, &spec));
    }

    #[test]
    fn missing_age_fails_active_bounds() {
        let spec = FilterSpec {
            age_min: Some(30),
            age_max: Some(40),
            ..FilterSpec::default()
        };
        assert!(!matches(&record("Asthma", None, None), &spec));
        assert!(matches(&record("Asthma", Some(30), None), &spec));
        assert!(matches(&record("Asthma", Some(40), None), &spec));
        assert!(!matches(&record("Asthma", Some(41), None), &spec));

        let only_max = FilterSpec {
            age_max: Some(20),
            ..FilterSpec::default()
        };
        assert!(!matches(&record("Asthma", None, None), &only_max));
    }

    #[test]
    fn categorical_filters_require_exact_values() {
        let mut case = record("Asthma", Some(12), Some(Outcome::Improved));
        case.gender = Some(Gender::Female);
        case.severity = Some(Severity::Mild);

        let spec = FilterSpec {
            disease: Some("Asthma".into()),
            gender: Some(Gender::Female),
            severity: Some(Severity::Mild),
            outcome: Some(Outcome::Improved),
            ..FilterSpec::default()
        };
        assert!(matches(&case, &spec));

        let wrong_disease = FilterSpec {
            disease: Some("asthma".into()),
            ..FilterSpec::default()
        };
        assert!(!matches(&case, &wrong_disease));

        case.gender = None;
        assert!(!matches(&case, &spec));
    }

    #[test]
    fn tab_filters_by_outcome() {
        let records = vec![
            record("A", None, Some(Outcome::Recovered)),
            record("B", None, Some(Outcome::Improved)),
            record("C", None, None),
        ];
        let spec = FilterSpec {
            tab: Some(Outcome::Improved),
            ..FilterSpec::default()
        };
        let filtered = filter_cases(&records, &spec);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].disease, "B");
    }

    #[test]
    fn from_form_treats_all_and_empty_as_unconstrained() {
        let spec = FilterSpec::from_form("All", "All", "Improving", "", "", "45", "", "All")
            .expect("form hợp lệ");
        assert_eq!(spec.disease, None);
        assert_eq!(spec.outcome, Some(Outcome::Improved));
        assert_eq!(spec.age_max, Some(45));
        assert_eq!(spec.tab, None);
    }

    #[test]
    fn from_form_rejects_garbage() {
        let err = FilterSpec::from_form("All", "All", "All", "All", "thirty", "", "", "All")
            .unwrap_err();
        assert_eq!(
            err,
            CaseError::InvalidValue {
                field: "age_min",
                value: "thirty".into()
            }
        );
        assert!(FilterSpec::from_form("All", "Critical", "All", "All", "", "", "", "All").is_err());
    }

    #[test]
    fn select_disease_is_case_insensitive_substring() {
        let records = vec![
            record("Type 2 Diabetes", None, None),
            record("Asthma", None, None),
        ];
        assert_eq!(select_disease(&records, Some("diabetes")).len(), 1);
        assert_eq!(select_disease(&records, Some("All")).len(), 2);
        assert_eq!(select_disease(&records, Some("  ")).len(), 2);
        assert_eq!(select_disease(&records, None).len(), 2);
    }
}
