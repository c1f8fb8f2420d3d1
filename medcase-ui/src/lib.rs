//! Thành phần giao diện dashboard ca bệnh cho môi trường WebAssembly.

pub mod chart;

#[cfg(target_arch = "wasm32")]
mod styles;

#[cfg(target_arch = "wasm32")]
mod wasm_ui {
    use crate::chart::{axis_ticks, bar_width, cost_line, pie_gradient, polyline, LineFrame};
    use crate::styles;
    use chrono::Local;
    use medcase_core::{
        browse, dashboard, filter_options, AnalyticsConfig, BrowseSnapshot, CaseRecord, CaseRow,
        CostPoint, DashboardStats, FilterSpec, Gender, Outcome, OutcomeSlice, RecoveryBar,
        Severity, ALL_LABEL,
    };
    use serde_wasm_bindgen::from_value;
    use wasm_bindgen::prelude::*;
    use web_sys::{console, Document, Element, HtmlInputElement, HtmlSelectElement, Window};
    use yew::events::{Event, InputEvent};
    use yew::prelude::*;
    use yew::TargetCast;

    #[hook]
    fn use_default_styles() {
        use_effect_with((), |_| {
            if let Some(window) = web_sys::window() {
                if let Some(document) = window.document() {
                    if let Err(err) = styles::ensure_styles(&document) {
                        console::error_1(&err);
                    }
                }
            }
            || ()
        });
    }

    #[derive(Properties, PartialEq)]
    pub struct DashboardViewProps {
        pub records: Vec<CaseRecord>,
        pub config: AnalyticsConfig,
        pub source_error: Option<String>,
    }

    #[function_component(DashboardView)]
    fn dashboard_view(props: &DashboardViewProps) -> Html {
        use_default_styles();

        let disease = use_state(|| ALL_LABEL.to_string());
        let everything: Vec<&CaseRecord> = props.records.iter().collect();
        let diseases = filter_options(&everything).diseases;
        let board = dashboard(&props.records, Some(disease.as_str()), &props.config);

        let on_disease = {
            let disease = disease.clone();
            Callback::from(move |event: Event| {
                let select: HtmlSelectElement = event.target_unchecked_into();
                disease.set(select.value());
            })
        };

        // Ô tìm kiếm khớp chuỗi con không phân biệt hoa thường, giống danh sách chọn.
        let on_disease_query = {
            let disease = disease.clone();
            Callback::from(move |event: InputEvent| {
                let input: HtmlInputElement = event.target_unchecked_into();
                disease.set(input.value());
            })
        };
        let query_text = if *disease == ALL_LABEL {
            String::new()
        } else {
            (*disease).clone()
        };

        html! {
            <div class="medcase-root">
                <header class="medcase-header">
                    <div>
                        <span class="medcase-eyebrow">{"Tổng quan ca điều trị"}</span>
                        <h2>{"So sánh bệnh viện"}</h2>
                        <p class="medcase-updated">{ format!("Cập nhật lúc {}", board.generated_at.with_timezone(&Local).format("%H:%M %d/%m/%Y")) }</p>
                    </div>
                    <div class="medcase-search">
                        <input
                            type="search"
                            placeholder="Tìm bệnh, ví dụ: diabetes"
                            value={query_text}
                            oninput={on_disease_query}
                            aria-label="Tìm bệnh"
                        />
                    </div>
                    <label class="medcase-select">
                        <span>{"Bệnh"}</span>
                        <select onchange={on_disease} aria-label="Chọn bệnh">
                            { for diseases.iter().map(|name| html! {
                                <option value={name.clone()} selected={*name == *disease}>{ name.clone() }</option>
                            }) }
                        </select>
                    </label>
                </header>
                { render_source_error(props.source_error.as_deref().or(board.source_error.as_deref())) }
                { render_stats(&board.stats) }
                <div class="medcase-charts">
                    { render_recovery(&board.recovery) }
                    { render_costs(&board.costs, &props.config.cost_line_color) }
                    { render_outcomes(&board.outcomes) }
                </div>
                <section class="medcase-card">
                    <header><h3>{"Ca gần đây"}</h3></header>
                    { render_case_table(&board.recent, "Chưa có ca nào.") }
                </section>
            </div>
        }
    }

    fn render_source_error(error: Option<&str>) -> Html {
        match error {
            Some(message) => html! {
                <p class="medcase-source-error" role="alert">
                    { format!("Không tải được dữ liệu: {message}") }
                </p>
            },
            None => Html::default(),
        }
    }

    fn render_stats(stats: &DashboardStats) -> Html {
        let cards = [
            ("Tổng số ca", stats.total),
            ("Hồi phục / cải thiện", stats.recovered),
            ("Bệnh", stats.diseases),
            ("Bệnh viện", stats.hospitals),
        ];

        html! {
            <div class="medcase-stats">
                { for cards.into_iter().map(|(label, value)| html! {
                    <div class="medcase-stat">
                        <span class="medcase-stat-value">{ value }</span>
                        <span class="medcase-stat-label">{ label }</span>
                    </div>
                }) }
            </div>
        }
    }

    fn render_recovery(bars: &[RecoveryBar]) -> Html {
        html! {
            <section class="medcase-card">
                <header><h3>{"Tỉ lệ hồi phục theo bệnh viện"}</h3></header>
                if bars.is_empty() {
                    <p class="medcase-empty">{"Không có dữ liệu."}</p>
                } else {
                    <ul class="medcase-bars">
                        { for bars.iter().map(|bar| html! {
                            <li class="medcase-bar" title={format!("{}: {}% ({} ca)", bar.full_name, bar.recovery_pct, bar.total)}>
                                <span class="medcase-bar-label">{ bar.label.clone() }</span>
                                <span class="medcase-bar-track">
                                    <span
                                        class="medcase-bar-fill"
                                        style={format!("width: {}%; background: {};", bar.recovery_pct, bar.color)}
                                    />
                                </span>
                                <span class="medcase-bar-value">{ format!("{}%", bar.recovery_pct) }</span>
                            </li>
                        }) }
                    </ul>
                }
            </section>
        }
    }

    fn render_costs(points: &[CostPoint], line_color: &str) -> Html {
        let frame = LineFrame::default();
        let plotted = cost_line(points, frame);
        let max = points.iter().map(|point| point.avg_cost).max().unwrap_or(0);

        html! {
            <section class="medcase-card">
                <header><h3>{"Chi phí trung bình"}</h3></header>
                if points.is_empty() {
                    <p class="medcase-empty">{"Không có dữ liệu chi phí."}</p>
                } else {
                    <svg
                        class="medcase-line"
                        viewBox={format!("0 0 {} {}", frame.width, frame.height)}
                        role="img"
                        aria-label="Chi phí trung bình theo bệnh viện"
                    >
                        <polyline points={polyline(&plotted)} fill="none" stroke={line_color.to_string()} stroke-width="2.5" />
                        { for plotted.iter().map(|point| html! {
                            <g>
                                <circle cx={format!("{:.1}", point.x)} cy={format!("{:.1}", point.y)} r="4" fill={line_color.to_string()}>
                                    <title>{ point.tooltip.clone() }</title>
                                </circle>
                                <text class="medcase-axis" x={format!("{:.1}", point.x)} y={format!("{:.1}", frame.height - 6.0)} text-anchor="middle">
                                    { point.label.clone() }
                                </text>
                            </g>
                        }) }
                        { for axis_ticks(points, frame).into_iter().map(|tick| html! {
                            <text class="medcase-axis" x="4" y={format!("{:.1}", tick.y)}>
                                { tick.label }
                            </text>
                        }) }
                    </svg>
                    <ul class="medcase-cost-list">
                        { for points.iter().map(|point| html! {
                            <li>
                                <span>{ point.full_name.clone() }</span>
                                <span class="medcase-cost-track">
                                    <span class="medcase-cost-fill" style={format!("width: {}%;", bar_width(point.avg_cost, max))} />
                                </span>
                                <strong>{ point.avg_cost_display.clone() }</strong>
                            </li>
                        }) }
                    </ul>
                }
            </section>
        }
    }

    fn render_outcomes(slices: &[OutcomeSlice]) -> Html {
        html! {
            <section class="medcase-card">
                <header><h3>{"Phân bố kết quả điều trị"}</h3></header>
                <div class="medcase-pie-wrap">
                    <div class="medcase-pie" style={format!("background: {};", pie_gradient(slices))} />
                    <ul class="medcase-legend">
                        { for slices.iter().map(|slice| html! {
                            <li>
                                <span class="medcase-swatch" style={format!("background: {};", slice.color)} />
                                <span>{ slice.label.clone() }</span>
                                <span class="medcase-legend-value">{ format!("{} ({}%)", slice.count, slice.pct) }</span>
                            </li>
                        }) }
                    </ul>
                </div>
            </section>
        }
    }

    fn render_case_table(rows: &[CaseRow], empty_label: &str) -> Html {
        if rows.is_empty() {
            return html! { <p class="medcase-empty">{ empty_label.to_string() }</p> };
        }

        html! {
            <div class="medcase-table-wrap">
                <table class="medcase-table">
                    <thead>
                        <tr>
                            <th>{"Bệnh"}</th>
                            <th>{"Tuổi"}</th>
                            <th>{"Giới"}</th>
                            <th>{"Mức độ"}</th>
                            <th>{"Điều trị"}</th>
                            <th>{"Bệnh viện"}</th>
                            <th>{"Chi phí"}</th>
                            <th>{"Thời gian"}</th>
                            <th>{"Kết quả"}</th>
                            <th>{"Báo cáo"}</th>
                        </tr>
                    </thead>
                    <tbody>
                        { for rows.iter().map(render_case_row) }
                    </tbody>
                </table>
            </div>
        }
    }

    fn render_case_row(row: &CaseRow) -> Html {
        html! {
            <tr>
                <td>
                    <span class="medcase-disease">{ row.disease.clone() }</span>
                    { row.disease_spec.as_ref().map(|spec| html! { <span class="medcase-spec">{ spec.clone() }</span> }).unwrap_or_default() }
                </td>
                <td>{ row.age.clone() }</td>
                <td>{ row.gender.clone() }</td>
                <td><span class="medcase-badge" data-level={row.severity_level.clone()}>{ row.severity.clone() }</span></td>
                <td>{ row.treatment.clone() }</td>
                <td>{ row.hospital.clone() }</td>
                <td class="medcase-num">{ row.cost.clone() }</td>
                <td>{ row.duration.clone() }</td>
                <td><span class="medcase-badge" data-level={row.outcome_level.clone()}>{ row.outcome.clone() }</span></td>
                <td>{ row.report.clone() }</td>
            </tr>
        }
    }

    #[derive(Properties, PartialEq)]
    pub struct CaseBrowserProps {
        pub records: Vec<CaseRecord>,
        pub source_error: Option<String>,
    }

    #[function_component(CaseBrowser)]
    fn case_browser(props: &CaseBrowserProps) -> Html {
        use_default_styles();

        let spec = use_state(FilterSpec::default);
        let page: BrowseSnapshot = browse(&props.records, &spec);

        let update = |apply: fn(&mut FilterSpec, String)| {
            let spec = spec.clone();
            move |value: String| {
                let mut next = (*spec).clone();
                apply(&mut next, value);
                spec.set(next);
            }
        };

        let on_search = {
            let set = update(|next, value| next.search = value);
            Callback::from(move |event: InputEvent| {
                let input: HtmlInputElement = event.target_unchecked_into();
                set(input.value());
            })
        };

        let on_clear = {
            let spec = spec.clone();
            Callback::from(move |_| spec.set(FilterSpec::default()))
        };

        html! {
            <div class="medcase-root">
                <header class="medcase-header">
                    <div>
                        <span class="medcase-eyebrow">{"Duyệt ca bệnh"}</span>
                        <h2>{ format!("Hiển thị {}/{} ca", page.matched, page.total) }</h2>
                    </div>
                    <div class="medcase-search">
                        <input
                            type="search"
                            placeholder="Tìm theo bệnh, chẩn đoán, phác đồ"
                            value={spec.search.clone()}
                            oninput={on_search}
                            aria-label="Tìm kiếm ca bệnh"
                        />
                        <button type="button" onclick={on_clear} aria-label="Xóa bộ lọc">{"Đặt lại"}</button>
                    </div>
                </header>
                { render_source_error(props.source_error.as_deref()) }
                { render_tabs(&page, spec.clone()) }
                <div class="medcase-filters">
                    { render_select("Bệnh", &page.options.diseases, spec.disease.as_deref(), update(|next, value| {
                        next.disease = (value != ALL_LABEL).then_some(value);
                    })) }
                    { render_select("Mức độ", &page.options.severities, spec.severity.map(Severity::as_str), update(|next, value| {
                        next.severity = Severity::parse(&value);
                    })) }
                    { render_select("Kết quả", &page.options.outcomes, spec.outcome.map(Outcome::as_str), update(|next, value| {
                        next.outcome = Outcome::parse(&value);
                    })) }
                    { render_select("Giới", &page.options.genders, spec.gender.map(Gender::as_str), update(|next, value| {
                        next.gender = Gender::parse(&value);
                    })) }
                    { render_age("Tuổi từ", spec.age_min, update(|next, value| next.age_min = value.trim().parse().ok())) }
                    { render_age("đến", spec.age_max, update(|next, value| next.age_max = value.trim().parse().ok())) }
                </div>
                { render_case_table(&page.rows, "Không có ca nào khớp bộ lọc hiện tại.") }
            </div>
        }
    }

    fn render_tabs(page: &BrowseSnapshot, spec: UseStateHandle<FilterSpec>) -> Html {
        html! {
            <div class="medcase-tabs" role="tablist" aria-label="Lọc theo kết quả điều trị">
                { for page.tabs.iter().map(|tab| {
                    let outcome = tab.outcome;
                    let is_active = spec.tab == outcome;
                    let level = outcome.map(Outcome::level);
                    let onclick = {
                        let spec = spec.clone();
                        Callback::from(move |_| {
                            let mut next = (*spec).clone();
                            next.tab = outcome;
                            spec.set(next);
                        })
                    };
                    html! {
                        <button
                            type="button"
                            role="tab"
                            class={classes!("medcase-tab", is_active.then_some("is-active"))}
                            data-level={level}
                            aria-selected={is_active.to_string()}
                            onclick={onclick}
                        >
                            { tab.label.clone() }
                            <span class="medcase-tab-count">{ tab.count }</span>
                        </button>
                    }
                }) }
            </div>
        }
    }

    fn render_select(
        label: &'static str,
        options: &[String],
        current: Option<&str>,
        set: impl Fn(String) + 'static,
    ) -> Html {
        let current = current.unwrap_or(ALL_LABEL).to_string();
        let onchange = Callback::from(move |event: Event| {
            let select: HtmlSelectElement = event.target_unchecked_into();
            set(select.value());
        });

        html! {
            <label class="medcase-select">
                <span>{ label }</span>
                <select {onchange}>
                    { for options.iter().map(|option| html! {
                        <option value={option.clone()} selected={*option == current}>{ option.clone() }</option>
                    }) }
                </select>
            </label>
        }
    }

    fn render_age(label: &'static str, value: Option<u32>, set: impl Fn(String) + 'static) -> Html {
        let oninput = Callback::from(move |event: InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            set(input.value());
        });

        html! {
            <label class="medcase-select medcase-age">
                <span>{ label }</span>
                <input
                    type="number"
                    min="0"
                    value={value.map(|age| age.to_string()).unwrap_or_default()}
                    {oninput}
                />
            </label>
        }
    }

    fn mount_target(selector: &str) -> Result<Element, JsValue> {
        let window: Window =
            web_sys::window().ok_or_else(|| JsValue::from_str("Không có window"))?;
        let document: Document = window
            .document()
            .ok_or_else(|| JsValue::from_str("Không truy cập được document"))?;

        document
            .query_selector(selector)
            .map_err(|err| JsValue::from_str(&format!("Selector lỗi: {err:?}")))?
            .ok_or_else(|| JsValue::from_str("Không tìm thấy element theo selector"))
    }

    fn read_rows(rows: JsValue) -> Result<(Vec<CaseRecord>, Option<String>), JsValue> {
        let value: serde_json::Value = from_value(rows)?;
        Ok(match medcase_supabase::parse_rows_value(&value) {
            Ok(batch) => {
                if !batch.report.issues.is_empty() {
                    console::warn_1(&JsValue::from_str(&format!(
                        "Bỏ qua {} dòng, {} ghi chú khi đọc dữ liệu ca",
                        batch.report.skipped,
                        batch.report.issues.len()
                    )));
                }
                (batch.records, None)
            }
            Err(err) => (Vec::new(), Some(err.to_string())),
        })
    }

    #[wasm_bindgen]
    pub fn mount_dashboard(
        selector: &str,
        rows: JsValue,
        config: Option<JsValue>,
    ) -> Result<(), JsValue> {
        let target = mount_target(selector)?;
        let (records, source_error) = read_rows(rows)?;
        let config: AnalyticsConfig = match config {
            Some(config) => from_value(config)?,
            None => AnalyticsConfig::default(),
        };

        yew::Renderer::<DashboardView>::with_root_and_props(
            target,
            DashboardViewProps {
                records,
                config,
                source_error,
            },
        )
        .render();
        Ok(())
    }

    #[wasm_bindgen]
    pub fn mount_case_browser(selector: &str, rows: JsValue) -> Result<(), JsValue> {
        let target = mount_target(selector)?;
        let (records, source_error) = read_rows(rows)?;

        yew::Renderer::<CaseBrowser>::with_root_and_props(
            target,
            CaseBrowserProps {
                records,
                source_error,
            },
        )
        .render();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_ui::{mount_case_browser, mount_dashboard};

#[cfg(not(target_arch = "wasm32"))]
pub fn mount_dashboard(
    _: &str,
    _: wasm_bindgen::JsValue,
    _: Option<wasm_bindgen::JsValue>,
) -> Result<(), wasm_bindgen::JsValue> {
    Err(wasm_bindgen::JsValue::from_str(
        "medcase-ui chỉ hỗ trợ biên dịch target wasm32",
    ))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn mount_case_browser(_: &str, _: wasm_bindgen::JsValue) -> Result<(), wasm_bindgen::JsValue> {
    Err(wasm_bindgen::JsValue::from_str(
        "medcase-ui chỉ hỗ trợ biên dịch target wasm32",
    ))
}
