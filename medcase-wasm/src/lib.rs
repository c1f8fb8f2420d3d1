//! Bridge WASM <-> JavaScript cho engine thống kê ca bệnh, không phụ thuộc framework.

use medcase_core::{AnalyticsConfig, CaseError, FilterSpec};
use medcase_supabase::{insert_body, CaseSubmission};
use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[derive(Deserialize, Default)]
struct JsAnalyticsConfig {
    #[serde(default)]
    label_max_chars: Option<usize>,
    #[serde(default)]
    recent_limit: Option<usize>,
    #[serde(default)]
    recovery_palette: Option<Vec<String>>,
    #[serde(default)]
    outcome_palette: Option<Vec<String>>,
    #[serde(default)]
    cost_line_color: Option<String>,
}

impl From<JsAnalyticsConfig> for AnalyticsConfig {
    fn from(cfg: JsAnalyticsConfig) -> Self {
        let mut base = AnalyticsConfig::default();
        if let Some(chars) = cfg.label_max_chars {
            base.label_max_chars = chars;
        }
        if let Some(limit) = cfg.recent_limit {
            base.recent_limit = limit;
        }
        if let Some(palette) = cfg.recovery_palette {
            base.recovery_palette = palette;
        }
        if let Some(palette) = cfg.outcome_palette {
            base.outcome_palette = palette;
        }
        if let Some(color) = cfg.cost_line_color {
            base.cost_line_color = color;
        }
        base
    }
}

/// Giá trị thô của panel lọc, đúng như giao diện đang giữ ("All" = không lọc).
#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct JsFilter {
    disease: String,
    severity: String,
    outcome: String,
    gender: String,
    age_min: String,
    age_max: String,
    search: String,
    tab: String,
}

impl TryFrom<JsFilter> for FilterSpec {
    type Error = CaseError;

    fn try_from(filter: JsFilter) -> Result<Self, Self::Error> {
        FilterSpec::from_form(
            &filter.disease,
            &filter.severity,
            &filter.outcome,
            &filter.gender,
            &filter.age_min,
            &filter.age_max,
            &filter.search,
            &filter.tab,
        )
    }
}

/// Lọc và tổng hợp cho trang duyệt ca.
///
/// `rows` là phản hồi thô của bảng `cases`. Lỗi từ kho dữ liệu không ném
/// ra JS mà nằm trong `source_error` của snapshot.
#[wasm_bindgen]
pub fn browse_cases(rows: JsValue, filter: Option<JsValue>) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let rows_value = from_value::<serde_json::Value>(rows)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được danh sách ca: {err}")))?;

    let spec = match filter {
        Some(js_filter) => {
            let filter: JsFilter = from_value(js_filter)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được bộ lọc: {err}")))?;
            FilterSpec::try_from(filter).map_err(|err| JsValue::from_str(&format_case_error(err)))?
        }
        None => FilterSpec::default(),
    };

    let snapshot = medcase_supabase::browse_rows_value(&rows_value, &spec);

    to_value(&snapshot)
        .map_err(|err| JsValue::from_str(&format!("Không serialize snapshot: {err}")))
}

/// Dựng dashboard cho bệnh được chọn; `disease` rỗng hoặc "All" lấy tất cả.
#[wasm_bindgen]
pub fn build_dashboard(
    rows: JsValue,
    disease: Option<String>,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let rows_value = from_value::<serde_json::Value>(rows)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được danh sách ca: {err}")))?;

    let cfg = match config {
        Some(js_cfg) => {
            let cfg: JsAnalyticsConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được config: {err}")))?;
            AnalyticsConfig::from(cfg)
        }
        None => AnalyticsConfig::default(),
    };

    let snapshot = medcase_supabase::dashboard_rows_value(&rows_value, disease.as_deref(), &cfg);

    to_value(&snapshot)
        .map_err(|err| JsValue::from_str(&format!("Không serialize snapshot: {err}")))
}

/// Kiểm tra form nhập ca và trả về body insert cho PostgREST.
#[wasm_bindgen]
pub fn prepare_submission(form: JsValue) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let submission: CaseSubmission = from_value(form)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được form: {err}")))?;

    let body = submission_body(&submission).map_err(|err| JsValue::from_str(&err))?;

    to_value(&body).map_err(|err| JsValue::from_str(&format!("Không serialize payload: {err}")))
}

fn submission_body(submission: &CaseSubmission) -> Result<serde_json::Value, String> {
    submission
        .validate()
        .map(|record| insert_body(&record))
        .map_err(format_case_error)
}

fn format_case_error(err: CaseError) -> String {
    format!("MedCase error: {err}")
}
