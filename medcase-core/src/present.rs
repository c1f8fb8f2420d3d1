//! Chuyển kết quả tổng hợp sang dạng sẵn sàng vẽ biểu đồ và bảng.
//!
//! Màu được gán theo vị trí phần tử trong danh sách (chỉ số modulo độ dài
//! bảng màu), không theo giá trị. Sắp xếp lại dữ liệu sẽ đổi màu.

use serde::{Deserialize, Serialize};

use crate::aggregate::{HospitalCost, HospitalRecovery, OutcomeCount};
use crate::{rounded_percent, rounded_ratio, AnalyticsConfig, CaseRecord, EM_DASH, UNKNOWN_LABEL};

/// Màu dùng khi bảng màu cấu hình rỗng.
const FALLBACK_COLOR: &str = "#9ca3af";
const ELLIPSIS: char = '…';

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecoveryBar {
    pub label: String,
    pub full_name: String,
    pub recovery_pct: u32,
    pub total: usize,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CostPoint {
    pub label: String,
    pub full_name: String,
    pub avg_cost: u64,
    pub total_cost: u64,
    pub cases: usize,
    /// Giá trị chính xác cho tooltip, ví dụ `₹1,23,456`.
    pub avg_cost_display: String,
    /// Nhãn rút gọn chỉ dùng cho trục, ví dụ `₹123k`.
    pub axis_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutcomeSlice {
    pub label: String,
    pub count: usize,
    pub pct: u32,
    pub color: String,
}

/// Một dòng trong bảng ca bệnh, đã điền nhãn cho trường thiếu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaseRow {
    pub id: Option<String>,
    pub disease: String,
    pub disease_spec: Option<String>,
    pub age: String,
    pub gender: String,
    pub severity: String,
    pub severity_level: Option<String>,
    pub treatment: String,
    pub hospital: String,
    pub cost: String,
    pub duration: String,
    pub outcome: String,
    pub outcome_level: Option<String>,
    pub report: String,
    pub report_available: bool,
}

impl From<&CaseRecord> for CaseRow {
    fn from(record: &CaseRecord) -> Self {
        Self {
            id: record.id.clone(),
            disease: record.disease.clone(),
            disease_spec: record.disease_spec.clone().filter(|spec| !spec.trim().is_empty()),
            age: record
                .age
                .map_or_else(|| EM_DASH.to_string(), |age| age.to_string()),
            gender: record
                .gender
                .map_or(EM_DASH, |gender| gender.as_str())
                .to_string(),
            severity: record
                .severity
                .map_or(UNKNOWN_LABEL, |severity| severity.as_str())
                .to_string(),
            severity_level: record.severity.map(|severity| severity.level().to_string()),
            treatment: text_or_dash(record.treatment.as_deref()),
            hospital: record.hospital_name.clone(),
            cost: record
                .billable_cost()
                .map_or_else(|| EM_DASH.to_string(), format_inr),
            duration: record
                .duration_days()
                .map_or_else(|| EM_DASH.to_string(), |days| format!("{days} days")),
            outcome: record
                .outcome
                .map_or(UNKNOWN_LABEL, |outcome| outcome.as_str())
                .to_string(),
            outcome_level: record.outcome.map(|outcome| outcome.level().to_string()),
            report: if record.report_available { "Yes" } else { "No" }.to_string(),
            report_available: record.report_available,
        }
    }
}

fn text_or_dash(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => EM_DASH.to_string(),
    }
}

/// Cắt tên quá `max_chars` ký tự và thêm dấu "…".
pub fn truncate_label(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }
    let mut label: String = name.chars().take(max_chars).collect();
    label.push(ELLIPSIS);
    label
}

fn palette_color(palette: &[String], index: usize) -> String {
    if palette.is_empty() {
        return FALLBACK_COLOR.to_string();
    }
    palette[index % palette.len()].clone()
}

/// Định dạng rupee với cách nhóm chữ số en-IN (`₹12,34,567`).
pub fn format_inr(amount: u64) -> String {
    format!("₹{}", group_en_in(amount))
}

fn group_en_in(amount: u64) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();

    format!("{},{tail}", groups.join(","))
}

/// Nhãn trục rút gọn theo nghìn, ví dụ `₹45k`. Không dùng cho tooltip.
pub fn axis_inr(amount: u64) -> String {
    format!("₹{}k", rounded_ratio(u128::from(amount), 1000))
}

pub fn recovery_bars(groups: &[HospitalRecovery], config: &AnalyticsConfig) -> Vec<RecoveryBar> {
    groups
        .iter()
        .enumerate()
        .map(|(index, group)| RecoveryBar {
            label: truncate_label(&group.hospital, config.label_max_chars),
            full_name: group.hospital.clone(),
            recovery_pct: group.recovery_pct,
            total: group.total,
            color: palette_color(&config.recovery_palette, index),
        })
        .collect()
}

pub fn cost_points(groups: &[HospitalCost], config: &AnalyticsConfig) -> Vec<CostPoint> {
    groups
        .iter()
        .map(|group| CostPoint {
            label: truncate_label(&group.hospital, config.label_max_chars),
            full_name: group.hospital.clone(),
            avg_cost: group.avg_cost,
            total_cost: group.total_cost,
            cases: group.cases,
            avg_cost_display: format_inr(group.avg_cost),
            axis_label: axis_inr(group.avg_cost),
        })
        .collect()
}

pub fn outcome_slices(counts: &[OutcomeCount], config: &AnalyticsConfig) -> Vec<OutcomeSlice> {
    let total: usize = counts.iter().map(|entry| entry.count).sum();
    counts
        .iter()
        .enumerate()
        .map(|(index, entry)| OutcomeSlice {
            label: entry.label.clone(),
            count: entry.count,
            pct: rounded_percent(entry.count, total),
            color: palette_color(&config.outcome_palette, index),
        })
        .collect()
}
