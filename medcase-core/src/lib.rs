//! Logic lõi lọc ca bệnh và tổng hợp thống kê cho dashboard MedCase.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod aggregate;
pub mod analytics;
pub mod filter;
pub mod present;

pub use aggregate::{
    dashboard_stats, filter_options, hospital_costs, hospital_recovery, outcome_distribution,
    recent_cases, tab_counts, DashboardStats, FilterOptions, HospitalCost, HospitalRecovery,
    OutcomeCount, TabCount, TABS,
};
pub use analytics::{browse, dashboard, BrowseSnapshot, DashboardSnapshot};
pub use filter::{filter_cases, matches, select_disease, FilterSpec};
pub use present::{
    axis_inr, cost_points, format_inr, outcome_slices, recovery_bars, truncate_label, CaseRow,
    CostPoint, OutcomeSlice, RecoveryBar,
};

/// Nhãn hiển thị khi thiếu dữ liệu dạng văn bản.
pub const EM_DASH: &str = "—";
/// Nhãn hiển thị khi thiếu mức độ hoặc kết quả điều trị.
pub const UNKNOWN_LABEL: &str = "Unknown";
/// Giá trị lọc "không ràng buộc" mà giao diện gửi lên.
pub const ALL_LABEL: &str = "All";

/// Cấu hình trình bày và các ngưỡng của engine thống kê.
///
/// Trường thiếu khi deserialize lấy giá trị mặc định.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Số ký tự tối đa của tên bệnh viện trên trục biểu đồ.
    pub label_max_chars: usize,
    /// Số ca gần nhất hiển thị trên dashboard.
    pub recent_limit: usize,
    /// Bảng màu cột tỉ lệ hồi phục, gán theo vị trí.
    pub recovery_palette: Vec<String>,
    /// Bảng màu biểu đồ tròn kết quả điều trị, gán theo vị trí.
    pub outcome_palette: Vec<String>,
    /// Màu đường biểu đồ chi phí.
    pub cost_line_color: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        let recovery_palette = ["#5b5ef4", "#7c3aed", "#6366f1", "#8b5cf6", "#a78bfa", "#c4b5fd"]
            .into_iter()
            .map(str::to_string)
            .collect();
        let outcome_palette = ["1", "0.9", "0.78", "0.65", "0.52", "0.42"]
            .into_iter()
            .map(|alpha| format!("rgba(91, 94, 244, {alpha})"))
            .collect();

        Self {
            label_max_chars: 14,
            recent_limit: 5,
            recovery_palette,
            outcome_palette,
            cost_line_color: "#5b5ef4".to_string(),
        }
    }
}

/// Giới tính bệnh nhân.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Đọc giá trị không phân biệt hoa thường; chuỗi lạ trả về `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

/// Mức độ nặng của bệnh tại thời điểm điều trị.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mild" => Some(Self::Mild),
            "moderate" => Some(Self::Moderate),
            "severe" => Some(Self::Severe),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mild => "Mild",
            Self::Moderate => "Moderate",
            Self::Severe => "Severe",
        }
    }

    /// Khóa style dùng cho badge (`data-level`).
    pub fn level(self) -> &'static str {
        match self {
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
        }
    }
}

/// Kết quả sau điều trị.
///
/// `Improved` là tên chuẩn duy nhất. Dữ liệu cũ có thể ghi "Improving";
/// cả hai cách viết đều được đọc thành `Improved` và luôn được ghi lại là
/// "Improved".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Outcome {
    Recovered,
    #[serde(alias = "Improving")]
    Improved,
    Stable,
    Deteriorating,
}

impl Outcome {
    pub const ALL: [Outcome; 4] = [
        Outcome::Recovered,
        Outcome::Improved,
        Outcome::Stable,
        Outcome::Deteriorating,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "recovered" => Some(Self::Recovered),
            "improved" | "improving" => Some(Self::Improved),
            "stable" => Some(Self::Stable),
            "deteriorating" => Some(Self::Deteriorating),
            _ => None,
        }
    }

    /// `true` nếu chuỗi là cách viết cũ cần chuẩn hóa.
    pub fn is_legacy_spelling(value: &str) -> bool {
        value.trim().eq_ignore_ascii_case("improving")
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recovered => "Recovered",
            Self::Improved => "Improved",
            Self::Stable => "Stable",
            Self::Deteriorating => "Deteriorating",
        }
    }

    /// Ca được tính là "hồi phục" trong các thống kê tỉ lệ.
    pub fn counts_as_recovery(self) -> bool {
        matches!(self, Self::Recovered | Self::Improved)
    }

    pub fn level(self) -> &'static str {
        match self {
            Self::Recovered => "recovered",
            Self::Improved => "improved",
            Self::Stable => "stable",
            Self::Deteriorating => "deteriorating",
        }
    }
}

macro_rules! impl_display {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display!(Gender, Severity, Outcome);

/// Một ca điều trị đã ẩn danh.
///
/// Ngoài `disease` và `hospital_name`, mọi trường đều có thể vắng mặt.
/// Trường vắng mặt hiển thị là "—" hoặc "Unknown" và bị loại khỏi các
/// phép tính số.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseRecord {
    /// Do kho dữ liệu cấp khi tạo; chưa có với bản ghi chưa lưu.
    #[serde(default)]
    pub id: Option<String>,
    pub disease: String,
    #[serde(default)]
    pub disease_spec: Option<String>,
    pub hospital_name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub treatment: Option<String>,
    #[serde(default)]
    pub treatment_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub treatment_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub total_cost_inr: Option<u64>,
    #[serde(default)]
    pub outcome: Option<Outcome>,
    #[serde(default)]
    pub side_effects: Option<String>,
    #[serde(default)]
    pub report_available: bool,
}

impl CaseRecord {
    /// Tạo bản ghi tối thiểu; các trường còn lại để trống.
    pub fn new(disease: impl Into<String>, hospital_name: impl Into<String>) -> Self {
        Self {
            id: None,
            disease: disease.into(),
            disease_spec: None,
            hospital_name: hospital_name.into(),
            age: None,
            gender: None,
            severity: None,
            treatment: None,
            treatment_start_date: None,
            treatment_end_date: None,
            total_cost_inr: None,
            outcome: None,
            side_effects: None,
            report_available: false,
        }
    }

    /// Số ngày điều trị; có thể âm nếu ngày kết thúc trước ngày bắt đầu.
    pub fn duration_days(&self) -> Option<i64> {
        let start = self.treatment_start_date?;
        let end = self.treatment_end_date?;
        Some(end.signed_duration_since(start).num_days())
    }

    /// Chi phí hợp lệ cho thống kê (bỏ giá trị 0).
    pub fn billable_cost(&self) -> Option<u64> {
        self.total_cost_inr.filter(|cost| *cost > 0)
    }

    /// Tên bệnh viện đã cắt khoảng trắng, `None` nếu rỗng.
    pub fn hospital(&self) -> Option<&str> {
        let name = self.hospital_name.trim();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

/// Lỗi chung của engine.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CaseError {
    #[error("Thiếu trường bắt buộc: {0}")]
    MissingField(&'static str),
    #[error("Giá trị không hợp lệ ({field}): {value}")]
    InvalidValue { field: &'static str, value: String },
    #[error("Nguồn dữ liệu trả về lỗi: {0}")]
    Source(String),
    #[error("Không đọc được dữ liệu: {0}")]
    Parse(String),
    #[error("Lỗi khác: {0}")]
    Other(String),
}

/// Làm tròn `numerator / denominator` kiểu half-up; mẫu số 0 trả về 0.
///
/// Tính trên `u128` để tổng chi phí gần `u64::MAX` không tràn; kết quả vượt
/// `u64` bị chặn ở `u64::MAX`.
pub(crate) fn rounded_ratio(numerator: u128, denominator: u128) -> u64 {
    if denominator == 0 {
        return 0;
    }
    let rounded = numerator / denominator + u128::from(numerator % denominator * 2 >= denominator);
    u64::try_from(rounded).unwrap_or(u64::MAX)
}

/// Phần trăm làm tròn tới số nguyên; mẫu số 0 trả về 0.
pub(crate) fn rounded_percent(part: usize, total: usize) -> u32 {
    let pct = rounded_ratio(part as u128 * 100, total as u128);
    u32::try_from(pct).unwrap_or(u32::MAX)
}
