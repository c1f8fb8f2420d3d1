#![cfg(target_arch = "wasm32")]

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Node};

const STYLE_TAG_SELECTOR: &str = "style[data-medcase-ui]";

/// Default CSS for the components along with easy-to-override design tokens.
pub const DEFAULT_STYLES: &str = r#"
:root {
  --medcase-font-family: 'Inter', system-ui, -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
  --medcase-bg: #f8fafc;
  --medcase-card-bg: #ffffff;
  --medcase-card-border: rgba(148, 163, 184, 0.28);
  --medcase-radius: 16px;
  --medcase-text: #1f2933;
  --medcase-muted: #52606d;
  --medcase-heading: #11181c;
  --medcase-accent: #5b5ef4;
  --medcase-accent-soft: rgba(91, 94, 244, 0.12);
  --medcase-track: #eef0fb;
  --medcase-error-bg: rgba(180, 35, 24, 0.08);
  --medcase-error-text: #b42318;
  --medcase-level-mild: #067647;
  --medcase-level-mild-bg: rgba(6, 118, 71, 0.12);
  --medcase-level-moderate: #b54708;
  --medcase-level-moderate-bg: rgba(220, 104, 3, 0.14);
  --medcase-level-severe: #b42318;
  --medcase-level-severe-bg: rgba(180, 35, 24, 0.1);
  --medcase-level-recovered: #067647;
  --medcase-level-recovered-bg: rgba(6, 118, 71, 0.12);
  --medcase-level-improved: #0b5394;
  --medcase-level-improved-bg: rgba(11, 83, 148, 0.12);
  --medcase-level-stable: #475467;
  --medcase-level-stable-bg: rgba(71, 84, 103, 0.12);
  --medcase-level-deteriorating: #b42318;
  --medcase-level-deteriorating-bg: rgba(180, 35, 24, 0.1);
}

.medcase-root {
  font-family: var(--medcase-font-family);
  background: var(--medcase-bg);
  color: var(--medcase-text);
  border-radius: var(--medcase-radius);
  display: flex;
  flex-direction: column;
  gap: 22px;
  padding: 28px;
}

.medcase-header {
  display: flex;
  justify-content: space-between;
  align-items: flex-end;
  gap: 16px;
  flex-wrap: wrap;
}

.medcase-header h2 {
  margin: 4px 0 0;
  color: var(--medcase-heading);
  font-size: 1.5rem;
}

.medcase-eyebrow {
  font-size: 0.75rem;
  letter-spacing: 0.08em;
  text-transform: uppercase;
  color: var(--medcase-accent);
  font-weight: 600;
}

.medcase-updated {
  margin: 4px 0 0;
  font-size: 0.8rem;
  color: var(--medcase-muted);
}

.medcase-source-error {
  margin: 0;
  padding: 12px 16px;
  border-radius: 12px;
  background: var(--medcase-error-bg);
  color: var(--medcase-error-text);
  font-weight: 500;
}

.medcase-stats {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
  gap: 16px;
}

.medcase-stat,
.medcase-card {
  background: var(--medcase-card-bg);
  border: 1px solid var(--medcase-card-border);
  border-radius: var(--medcase-radius);
  padding: 18px 20px;
}

.medcase-stat {
  display: flex;
  flex-direction: column;
  gap: 4px;
}

.medcase-stat-value {
  font-size: 1.8rem;
  font-weight: 700;
  color: var(--medcase-heading);
  font-variant-numeric: tabular-nums;
}

.medcase-stat-label {
  font-size: 0.85rem;
  color: var(--medcase-muted);
}

.medcase-charts {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
  gap: 18px;
}

.medcase-card header h3 {
  margin: 0 0 14px;
  font-size: 1rem;
  color: var(--medcase-heading);
}

.medcase-empty {
  margin: 0;
  color: var(--medcase-muted);
  font-style: italic;
}

.medcase-bars,
.medcase-cost-list,
.medcase-legend {
  list-style: none;
  margin: 0;
  padding: 0;
  display: flex;
  flex-direction: column;
  gap: 10px;
}

.medcase-bar,
.medcase-cost-list li {
  display: grid;
  grid-template-columns: 140px 1fr auto;
  align-items: center;
  gap: 10px;
  font-size: 0.85rem;
}

.medcase-bar-track,
.medcase-cost-track {
  height: 10px;
  border-radius: 999px;
  background: var(--medcase-track);
  overflow: hidden;
}

.medcase-bar-fill,
.medcase-cost-fill {
  display: block;
  height: 100%;
  border-radius: inherit;
}

.medcase-cost-fill {
  background: var(--medcase-accent);
}

.medcase-bar-value {
  font-variant-numeric: tabular-nums;
  font-weight: 600;
}

.medcase-line {
  width: 100%;
  height: auto;
  margin-bottom: 12px;
}

.medcase-axis {
  font-size: 11px;
  fill: var(--medcase-muted);
}

.medcase-pie-wrap {
  display: flex;
  align-items: center;
  gap: 24px;
  flex-wrap: wrap;
}

.medcase-pie {
  width: 160px;
  height: 160px;
  border-radius: 50%;
  flex-shrink: 0;
}

.medcase-legend li {
  display: flex;
  align-items: center;
  gap: 8px;
  font-size: 0.85rem;
}

.medcase-swatch {
  width: 12px;
  height: 12px;
  border-radius: 3px;
}

.medcase-legend-value {
  color: var(--medcase-muted);
  font-variant-numeric: tabular-nums;
}

.medcase-search {
  display: flex;
  gap: 8px;
}

.medcase-search input {
  min-width: 260px;
  padding: 8px 12px;
  border-radius: 10px;
  border: 1px solid var(--medcase-card-border);
  font: inherit;
}

.medcase-search button {
  padding: 8px 14px;
  border-radius: 10px;
  border: none;
  background: var(--medcase-accent-soft);
  color: var(--medcase-accent);
  font-weight: 600;
  cursor: pointer;
}

.medcase-tabs {
  display: flex;
  gap: 8px;
  flex-wrap: wrap;
}

.medcase-tab {
  display: inline-flex;
  align-items: center;
  gap: 8px;
  padding: 6px 14px;
  border-radius: 999px;
  border: 1px solid var(--medcase-card-border);
  background: var(--medcase-card-bg);
  color: var(--medcase-text);
  font: inherit;
  cursor: pointer;
}

.medcase-tab.is-active {
  background: var(--medcase-accent);
  border-color: var(--medcase-accent);
  color: #ffffff;
}

.medcase-tab-count {
  font-size: 0.75rem;
  font-weight: 700;
  font-variant-numeric: tabular-nums;
}

.medcase-filters {
  display: flex;
  gap: 12px;
  flex-wrap: wrap;
}

.medcase-select {
  display: flex;
  flex-direction: column;
  gap: 4px;
  font-size: 0.78rem;
  color: var(--medcase-muted);
}

.medcase-select select,
.medcase-select input {
  padding: 7px 10px;
  border-radius: 10px;
  border: 1px solid var(--medcase-card-border);
  background: var(--medcase-card-bg);
  font: inherit;
  color: var(--medcase-text);
}

.medcase-age input {
  width: 88px;
}

.medcase-table-wrap {
  overflow-x: auto;
}

.medcase-table {
  width: 100%;
  border-collapse: collapse;
  font-size: 0.85rem;
}

.medcase-table th {
  text-align: left;
  font-weight: 600;
  color: var(--medcase-muted);
  padding: 10px 12px;
  border-bottom: 1px solid var(--medcase-card-border);
  white-space: nowrap;
}

.medcase-table td {
  padding: 10px 12px;
  border-bottom: 1px solid var(--medcase-card-border);
  vertical-align: top;
}

.medcase-num {
  font-variant-numeric: tabular-nums;
  white-space: nowrap;
}

.medcase-disease {
  display: block;
  font-weight: 600;
  color: var(--medcase-heading);
}

.medcase-spec {
  display: block;
  font-size: 0.78rem;
  color: var(--medcase-muted);
}

.medcase-badge {
  display: inline-block;
  padding: 2px 10px;
  border-radius: 999px;
  font-size: 0.75rem;
  font-weight: 600;
  background: var(--medcase-level-stable-bg);
  color: var(--medcase-level-stable);
}

.medcase-badge[data-level="mild"] { background: var(--medcase-level-mild-bg); color: var(--medcase-level-mild); }
.medcase-badge[data-level="moderate"] { background: var(--medcase-level-moderate-bg); color: var(--medcase-level-moderate); }
.medcase-badge[data-level="severe"] { background: var(--medcase-level-severe-bg); color: var(--medcase-level-severe); }
.medcase-badge[data-level="recovered"] { background: var(--medcase-level-recovered-bg); color: var(--medcase-level-recovered); }
.medcase-badge[data-level="improved"] { background: var(--medcase-level-improved-bg); color: var(--medcase-level-improved); }
.medcase-badge[data-level="deteriorating"] { background: var(--medcase-level-deteriorating-bg); color: var(--medcase-level-deteriorating); }

@media (max-width: 720px) {
  .medcase-root {
    padding: 18px;
  }

  .medcase-bar,
  .medcase-cost-list li {
    grid-template-columns: 100px 1fr auto;
  }

  .medcase-search {
    flex-direction: column;
    width: 100%;
  }

  .medcase-search input {
    min-width: 0;
  }
}
"#;

pub fn ensure_styles(document: &Document) -> Result<(), JsValue> {
    if document.query_selector(STYLE_TAG_SELECTOR)?.is_some() {
        return Ok(());
    }

    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("Document không có thẻ <head>"))?;

    let style_el = document.create_element("style")?;
    style_el.set_attribute("data-medcase-ui", "v1")?;
    style_el.set_text_content(Some(DEFAULT_STYLES));
    head.append_child(&style_el.clone().dyn_into::<Node>()?)?;

    Ok(())
}
