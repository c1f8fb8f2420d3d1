//! Hình học biểu đồ thuần (không phụ thuộc DOM), dùng chung cho các component.

use medcase_core::{CostPoint, OutcomeSlice};

/// Màu nền biểu đồ tròn khi chưa có dữ liệu.
const EMPTY_PIE_COLOR: &str = "#e5e7eb";

/// Khung vẽ biểu đồ đường chi phí, tính theo đơn vị viewBox của SVG.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFrame {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl Default for LineFrame {
    fn default() -> Self {
        Self {
            width: 520.0,
            height: 220.0,
            padding: 28.0,
        }
    }
}

/// Điểm đã chiếu lên khung vẽ, kèm nhãn để đặt trên trục.
#[derive(Debug, Clone, PartialEq)]
pub struct PlottedPoint {
    pub x: f64,
    pub y: f64,
    pub label: String,
    pub tooltip: String,
}

/// `conic-gradient` cho biểu đồ tròn; mốc cộng dồn theo số ca nên lát cuối luôn khép ở 100%.
pub fn pie_gradient(slices: &[OutcomeSlice]) -> String {
    let total: usize = slices.iter().map(|slice| slice.count).sum();
    if total == 0 {
        return format!("conic-gradient({EMPTY_PIE_COLOR} 0% 100%)");
    }

    let mut running = 0usize;
    let stops: Vec<String> = slices
        .iter()
        .map(|slice| {
            let start = running as f64 * 100.0 / total as f64;
            running += slice.count;
            let end = running as f64 * 100.0 / total as f64;
            format!("{} {start:.2}% {end:.2}%", slice.color)
        })
        .collect();

    format!("conic-gradient({})", stops.join(", "))
}

/// Độ rộng cột theo phần trăm của giá trị lớn nhất.
pub fn bar_width(value: u64, max: u64) -> u32 {
    if max == 0 {
        return 0;
    }
    ((value.min(max) as f64 / max as f64) * 100.0).round() as u32
}

/// Chiếu chi phí trung bình lên khung vẽ. Trục y bắt đầu từ 0; một điểm duy
/// nhất được đặt giữa khung.
pub fn cost_line(points: &[CostPoint], frame: LineFrame) -> Vec<PlottedPoint> {
    let max = points.iter().map(|point| point.avg_cost).max().unwrap_or(0);
    let inner_width = frame.width - frame.padding * 2.0;
    let inner_height = frame.height - frame.padding * 2.0;
    let step = if points.len() > 1 {
        inner_width / (points.len() - 1) as f64
    } else {
        0.0
    };

    points
        .iter()
        .enumerate()
        .map(|(index, point)| {
            let x = if points.len() > 1 {
                frame.padding + step * index as f64
            } else {
                frame.width / 2.0
            };
            let ratio = if max == 0 {
                0.0
            } else {
                point.avg_cost as f64 / max as f64
            };
            PlottedPoint {
                x,
                y: frame.padding + inner_height * (1.0 - ratio),
                label: point.label.clone(),
                tooltip: format!("{}: {}", point.full_name, point.avg_cost_display),
            }
        })
        .collect()
}

/// Vạch chia trên trục y của biểu đồ chi phí.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTick {
    pub y: f64,
    pub label: String,
}

/// Một vạch cho mỗi `axis_label` khác nhau, đặt ngang điểm tương ứng, từ cao
/// xuống thấp.
pub fn axis_ticks(points: &[CostPoint], frame: LineFrame) -> Vec<AxisTick> {
    let mut ordered: Vec<(&CostPoint, PlottedPoint)> =
        points.iter().zip(cost_line(points, frame)).collect();
    ordered.sort_by(|a, b| b.0.avg_cost.cmp(&a.0.avg_cost));

    let mut ticks: Vec<AxisTick> = Vec::new();
    for (point, plotted) in ordered {
        if ticks.iter().any(|tick| tick.label == point.axis_label) {
            continue;
        }
        ticks.push(AxisTick {
            y: plotted.y,
            label: point.axis_label.clone(),
        });
    }
    ticks
}

/// Chuỗi `points` cho `<polyline>`.
pub fn polyline(points: &[PlottedPoint]) -> String {
    points
        .iter()
        .map(|point| format!("{:.1},{:.1}", point.x, point.y))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slice(count: usize, color: &str) -> OutcomeSlice {
        OutcomeSlice {
            label: "x".into(),
            count,
            pct: 0,
            color: color.into(),
        }
    }

    fn point(name: &str, avg_cost: u64) -> CostPoint {
        CostPoint {
            label: name.into(),
            full_name: name.into(),
            avg_cost,
            total_cost: avg_cost,
            cases: 1,
            avg_cost_display: medcase_core::format_inr(avg_cost),
            axis_label: medcase_core::axis_inr(avg_cost),
        }
    }

    #[test]
    fn pie_stops_close_at_hundred() {
        let gradient = pie_gradient(&[slice(1, "red"), slice(2, "blue")]);
        assert_eq!(
            gradient,
            "conic-gradient(red 0.00% 33.33%, blue 33.33% 100.00%)"
        );
        assert_eq!(pie_gradient(&[]), "conic-gradient(#e5e7eb 0% 100%)");
    }

    #[test]
    fn axis_ticks_use_point_labels() {
        let frame = LineFrame::default();
        let points = vec![
            point("Fortis", 18_000),
            point("Apollo", 42_000),
            point("AIIMS", 18_200),
        ];

        let ticks = axis_ticks(&points, frame);

        let labels: Vec<&str> = ticks.iter().map(|tick| tick.label.as_str()).collect();
        assert_eq!(labels, vec!["₹42k", "₹18k"]);
        assert_eq!(ticks[0].y, frame.padding);
        assert!(ticks[1].y > ticks[0].y);
        assert!(axis_ticks(&[], frame).is_empty());
    }

    #[test]
    fn bar_width_handles_zero_max() {
        assert_eq!(bar_width(5, 0), 0);
        assert_eq!(bar_width(50, 200), 25);
        assert_eq!(bar_width(300, 200), 100);
    }

    #[test]
    fn highest_cost_touches_top_padding() {
        let frame = LineFrame::default();
        let plotted = cost_line(&[point("A", 90_000), point("B", 45_000)], frame);
        assert_eq!(plotted[0].y, frame.padding);
        assert_eq!(plotted[0].x, frame.padding);
        assert_eq!(plotted[1].x, frame.width - frame.padding);
        assert_eq!(plotted[1].y, frame.padding + (frame.height - frame.padding * 2.0) / 2.0);
        assert_eq!(plotted[1].tooltip, "B: ₹45,000");
    }

    #[test]
    fn single_point_is_centered() {
        let frame = LineFrame::default();
        let plotted = cost_line(&[point("A", 1_000)], frame);
        assert_eq!(plotted[0].x, frame.width / 2.0);
        assert_eq!(polyline(&plotted), "260.0,28.0");
    }
}
