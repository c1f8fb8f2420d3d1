use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use medcase_core::{browse, dashboard, AnalyticsConfig, FilterSpec};
use medcase_supabase::parse_rows_str;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "medcase-cli",
    about = "Lọc và thống kê ca điều trị từ file JSON xuất từ bảng cases."
)]
struct Args {
    /// Đường dẫn tới file JSON (mảng các dòng của bảng cases).
    #[arg(short, long)]
    input: PathBuf,

    /// Hiển thị dashboard thay vì trang duyệt ca.
    #[arg(long)]
    dashboard: bool,

    /// Tên bệnh (duyệt: khớp chính xác; dashboard: chuỗi con).
    #[arg(long, default_value = "All")]
    disease: String,

    #[arg(long, default_value = "All")]
    severity: String,

    #[arg(long, default_value = "All")]
    outcome: String,

    #[arg(long, default_value = "All")]
    gender: String,

    #[arg(long, default_value = "")]
    age_min: String,

    #[arg(long, default_value = "")]
    age_max: String,

    /// Từ khóa tìm trong bệnh, chẩn đoán và phác đồ.
    #[arg(long, default_value = "")]
    search: String,

    /// Tab kết quả điều trị.
    #[arg(long, default_value = "All")]
    tab: String,

    /// In toàn bộ snapshot dạng JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let data = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Không đọc được file {:?}", args.input))?;

    let batch = parse_rows_str(&data).context("Dữ liệu ca không hợp lệ")?;
    tracing::info!(
        accepted = batch.report.accepted,
        skipped = batch.report.skipped,
        "đã đọc dữ liệu ca"
    );
    for issue in &batch.report.issues {
        tracing::debug!(row = issue.row, kind = ?issue.kind, "ghi chú khi đọc dòng");
    }

    if args.dashboard {
        let disease = Some(args.disease.as_str());
        let board = dashboard(&batch.records, disease, &AnalyticsConfig::default());
        if args.json {
            println!("{}", serde_json::to_string_pretty(&board)?);
            return Ok(());
        }

        println!(
            "Generated at: {}\nTotal cases: {}\nRecovered: {}\nDiseases: {}\nHospitals: {}",
            board.generated_at,
            board.stats.total,
            board.stats.recovered,
            board.stats.diseases,
            board.stats.hospitals
        );
        for bar in &board.recovery {
            println!("  {:<16} {:>3}% of {}", bar.label, bar.recovery_pct, bar.total);
        }
        for point in &board.costs {
            println!("  {:<16} avg {}", point.label, point.avg_cost_display);
        }
        return Ok(());
    }

    let spec = FilterSpec::from_form(
        &args.disease,
        &args.severity,
        &args.outcome,
        &args.gender,
        &args.age_min,
        &args.age_max,
        &args.search,
        &args.tab,
    )?;
    let page = browse(&batch.records, &spec);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    let tabs: Vec<String> = page
        .tabs
        .iter()
        .map(|tab| format!("{} {}", tab.label, tab.count))
        .collect();
    println!(
        "Generated at: {}\nMatched: {}/{}\nTabs: {}\nSkipped rows: {}",
        page.generated_at,
        page.matched,
        page.total,
        tabs.join(" | "),
        batch.report.skipped
    );
    for row in &page.rows {
        println!(
            "  {} | {} | {} | {} | {}",
            row.disease, row.hospital, row.severity, row.outcome, row.cost
        );
    }

    Ok(())
}
