//! Pipeline hoàn chỉnh: lọc → tổng hợp → trình bày, trên một snapshot bất biến.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::{
    dashboard_stats, filter_options, hospital_costs, hospital_recovery, outcome_distribution,
    recent_cases, tab_counts, DashboardStats, FilterOptions, TabCount,
};
use crate::filter::{filter_cases, select_disease, FilterSpec};
use crate::present::{
    cost_points, outcome_slices, recovery_bars, CaseRow, CostPoint, OutcomeSlice, RecoveryBar,
};
use crate::{AnalyticsConfig, CaseRecord};

/// Kết quả trang duyệt ca.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrowseSnapshot {
    pub generated_at: DateTime<Utc>,
    pub filter: FilterSpec,
    /// Tổng số ca trong snapshot đầu vào.
    pub total: usize,
    pub matched: usize,
    /// Đếm theo tab trên toàn bộ snapshot, không phụ thuộc bộ lọc.
    pub tabs: Vec<TabCount>,
    pub options: FilterOptions,
    pub rows: Vec<CaseRow>,
    /// Lỗi từ nguồn dữ liệu, nếu có; khi đó snapshot được tính trên tập rỗng.
    #[serde(default)]
    pub source_error: Option<String>,
}

/// Kết quả dashboard tổng quan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    /// `None` nghĩa là tất cả bệnh.
    pub selected_disease: Option<String>,
    pub stats: DashboardStats,
    pub recovery: Vec<RecoveryBar>,
    pub costs: Vec<CostPoint>,
    pub outcomes: Vec<OutcomeSlice>,
    pub recent: Vec<CaseRow>,
    #[serde(default)]
    pub source_error: Option<String>,
}

/// Lọc và tổng hợp cho trang duyệt ca.
pub fn browse(records: &[CaseRecord], spec: &FilterSpec) -> BrowseSnapshot {
    let everything: Vec<&CaseRecord> = records.iter().collect();
    let matched = filter_cases(records, spec);

    BrowseSnapshot {
        generated_at: Utc::now(),
        filter: spec.clone(),
        total: records.len(),
        matched: matched.len(),
        tabs: tab_counts(&everything),
        options: filter_options(&everything),
        rows: matched.into_iter().map(CaseRow::from).collect(),
        source_error: None,
    }
}

/// Dựng dashboard cho bệnh được chọn (so khớp chuỗi con, không phân biệt hoa thường).
pub fn dashboard(
    records: &[CaseRecord],
    disease_query: Option<&str>,
    config: &AnalyticsConfig,
) -> DashboardSnapshot {
    let selected = select_disease(records, disease_query);
    let selected_disease = disease_query
        .map(str::trim)
        .filter(|query| !query.is_empty() && *query != crate::ALL_LABEL)
        .map(str::to_string);

    DashboardSnapshot {
        generated_at: Utc::now(),
        selected_disease,
        stats: dashboard_stats(&selected),
        recovery: recovery_bars(&hospital_recovery(&selected), config),
        costs: cost_points(&hospital_costs(&selected), config),
        outcomes: outcome_slices(&outcome_distribution(&selected), config),
        recent: recent_cases(&selected, config.recent_limit)
            .into_iter()
            .map(CaseRow::from)
            .collect(),
        source_error: None,
    }
}

impl BrowseSnapshot {
    /// Snapshot rỗng kèm lỗi nguồn dữ liệu.
    pub fn from_source_error(spec: &FilterSpec, error: String) -> Self {
        Self {
            source_error: Some(error),
            ..browse(&[], spec)
        }
    }
}

impl DashboardSnapshot {
    pub fn from_source_error(
        disease_query: Option<&str>,
        config: &AnalyticsConfig,
        error: String,
    ) -> Self {
        Self {
            source_error: Some(error),
            ..dashboard(&[], disease_query, config)
        }
    }
}
