//! Các phép tổng hợp thuần trên một tập ca bệnh.
//!
//! Mọi hàm nhận lát cắt bất biến, chấp nhận đầu vào rỗng và không bao giờ
//! chia cho 0.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{rounded_percent, rounded_ratio, CaseRecord, Outcome, ALL_LABEL, UNKNOWN_LABEL};

/// Thứ tự tab cố định trên trang duyệt ca. `None` là tab "All".
pub const TABS: [Option<Outcome>; 5] = [
    None,
    Some(Outcome::Recovered),
    Some(Outcome::Improved),
    Some(Outcome::Stable),
    Some(Outcome::Deteriorating),
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TabCount {
    pub label: String,
    pub outcome: Option<Outcome>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HospitalRecovery {
    pub hospital: String,
    pub recovered: usize,
    pub total: usize,
    pub recovery_pct: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HospitalCost {
    pub hospital: String,
    pub avg_cost: u64,
    pub total_cost: u64,
    /// Toàn bộ ca tại bệnh viện, kể cả ca không có chi phí.
    pub cases: usize,
    /// Số ca đóng góp vào trung bình.
    pub costed_cases: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutcomeCount {
    pub label: String,
    pub count: usize,
}

/// Bốn chỉ số đầu dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub total: usize,
    pub recovered: usize,
    pub diseases: usize,
    pub hospitals: usize,
}

/// Danh sách lựa chọn cho panel lọc, luôn bắt đầu bằng "All".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterOptions {
    pub diseases: Vec<String>,
    pub severities: Vec<String>,
    pub outcomes: Vec<String>,
    pub genders: Vec<String>,
}

/// Đếm số ca theo từng tab kết quả.
pub fn tab_counts(records: &[&CaseRecord]) -> Vec<TabCount> {
    TABS.iter()
        .map(|tab| {
            let count = match tab {
                None => records.len(),
                Some(outcome) => records
                    .iter()
                    .filter(|record| record.outcome == Some(*outcome))
                    .count(),
            };
            TabCount {
                label: tab.map_or(ALL_LABEL, Outcome::as_str).to_string(),
                outcome: *tab,
                count,
            }
        })
        .collect()
}

/// Gom ca theo bệnh viện, giữ thứ tự xuất hiện đầu tiên. Tên rỗng bị bỏ qua.
fn group_by_hospital<'a>(records: &[&'a CaseRecord]) -> Vec<(&'a str, Vec<&'a CaseRecord>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&CaseRecord>)> = Vec::new();

    for &record in records {
        let Some(hospital) = record.hospital() else {
            continue;
        };
        match index.get(hospital) {
            Some(&slot) => groups[slot].1.push(record),
            None => {
                index.insert(hospital, groups.len());
                groups.push((hospital, vec![record]));
            }
        }
    }

    groups
}

/// Tỉ lệ hồi phục (Recovered hoặc Improved) theo bệnh viện.
pub fn hospital_recovery(records: &[&CaseRecord]) -> Vec<HospitalRecovery> {
    group_by_hospital(records)
        .into_iter()
        .map(|(hospital, cases)| {
            let recovered = cases
                .iter()
                .filter(|record| record.outcome.is_some_and(Outcome::counts_as_recovery))
                .count();
            HospitalRecovery {
                hospital: hospital.to_string(),
                recovered,
                total: cases.len(),
                recovery_pct: rounded_percent(recovered, cases.len()),
            }
        })
        .collect()
}

/// Chi phí trung bình và tổng theo bệnh viện, giảm dần theo trung bình.
///
/// Bệnh viện không có chi phí hợp lệ nào bị loại khỏi kết quả.
pub fn hospital_costs(records: &[&CaseRecord]) -> Vec<HospitalCost> {
    let mut costs: Vec<HospitalCost> = group_by_hospital(records)
        .into_iter()
        .filter_map(|(hospital, cases)| {
            let billed: Vec<u64> = cases.iter().filter_map(|r| r.billable_cost()).collect();
            if billed.is_empty() {
                return None;
            }
            let total_cost: u128 = billed.iter().map(|&cost| u128::from(cost)).sum();
            Some(HospitalCost {
                hospital: hospital.to_string(),
                avg_cost: rounded_ratio(total_cost, billed.len() as u128),
                total_cost: u64::try_from(total_cost).unwrap_or(u64::MAX),
                cases: cases.len(),
                costed_cases: billed.len(),
            })
        })
        .collect();

    costs.sort_by(|a, b| b.avg_cost.cmp(&a.avg_cost));
    costs
}

/// Phân bố kết quả điều trị; thiếu kết quả được gom vào "Unknown".
pub fn outcome_distribution(records: &[&CaseRecord]) -> Vec<OutcomeCount> {
    let mut distribution: Vec<OutcomeCount> = Vec::new();

    for record in records {
        let label = record.outcome.map_or(UNKNOWN_LABEL, Outcome::as_str);
        match distribution.iter_mut().find(|entry| entry.label == label) {
            Some(entry) => entry.count += 1,
            None => distribution.push(OutcomeCount {
                label: label.to_string(),
                count: 1,
            }),
        }
    }

    distribution
}

pub fn dashboard_stats(records: &[&CaseRecord]) -> DashboardStats {
    let recovered = records
        .iter()
        .filter(|record| record.outcome.is_some_and(Outcome::counts_as_recovery))
        .count();
    let diseases: HashSet<&str> = records
        .iter()
        .map(|record| record.disease.trim())
        .filter(|disease| !disease.is_empty())
        .collect();
    let hospitals: HashSet<&str> = records.iter().filter_map(|record| record.hospital()).collect();

    DashboardStats {
        total: records.len(),
        recovered,
        diseases: diseases.len(),
        hospitals: hospitals.len(),
    }
}

pub fn filter_options(records: &[&CaseRecord]) -> FilterOptions {
    FilterOptions {
        diseases: distinct_with_all(records.iter().map(|r| Some(r.disease.as_str()))),
        severities: distinct_with_all(records.iter().map(|r| r.severity.map(|s| s.as_str()))),
        outcomes: distinct_with_all(records.iter().map(|r| r.outcome.map(Outcome::as_str))),
        genders: distinct_with_all(records.iter().map(|r| r.gender.map(|g| g.as_str()))),
    }
}

fn distinct_with_all<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
    let mut options = vec![ALL_LABEL.to_string()];
    for value in values.flatten() {
        let value = value.trim();
        if !value.is_empty() && !options.iter().any(|existing| existing == value) {
            options.push(value.to_string());
        }
    }
    options
}

/// `limit` ca cuối danh sách, mới nhất trước.
pub fn recent_cases<'a>(records: &[&'a CaseRecord], limit: usize) -> Vec<&'a CaseRecord> {
    records.iter().rev().take(limit).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(hospital: &str, outcome: Option<Outcome>, cost: Option<u64>) -> CaseRecord {
        CaseRecord {
            outcome,
            total_cost_inr: cost,
            ..CaseRecord::new("Dengue", hospital)
        }
    }

    fn refs(records: &[CaseRecord]) -> Vec<&CaseRecord> {
        records.iter().collect()
    }

    #[test]
    fn scenario_recovery_and_cost() {
        let records = vec![
            case("A", Some(Outcome::Recovered), Some(1000)),
            case("A", Some(Outcome::Stable), None),
            case("B", Some(Outcome::Improved), Some(2000)),
        ];
        let records = refs(&records);

        let recovery = hospital_recovery(&records);
        assert_eq!(
            recovery,
            vec![
                HospitalRecovery {
                    hospital: "A".into(),
                    recovered: 1,
                    total: 2,
                    recovery_pct: 50,
                },
                HospitalRecovery {
                    hospital: "B".into(),
                    recovered: 1,
                    total: 1,
                    recovery_pct: 100,
                },
            ]
        );

        let costs = hospital_costs(&records);
        assert_eq!(costs.len(), 2);
        assert_eq!((costs[0].hospital.as_str(), costs[0].avg_cost), ("B", 2000));
        assert_eq!((costs[1].hospital.as_str(), costs[1].avg_cost), ("A", 1000));
        assert_eq!(costs[1].cases, 2);
        assert_eq!(costs[1].costed_cases, 1);
    }

    #[test]
    fn empty_input_yields_empty_aggregates() {
        let records: Vec<&CaseRecord> = Vec::new();
        assert!(hospital_recovery(&records).is_empty());
        assert!(hospital_costs(&records).is_empty());
        assert!(outcome_distribution(&records).is_empty());
        assert!(tab_counts(&records).iter().all(|tab| tab.count == 0));
        assert_eq!(dashboard_stats(&records), DashboardStats::default());
    }

    #[test]
    fn blank_hospitals_are_not_grouped() {
        let records = vec![
            case("  ", Some(Outcome::Recovered), Some(500)),
            case("Fortis", Some(Outcome::Deteriorating), Some(700)),
        ];
        let records = refs(&records);
        let recovery = hospital_recovery(&records);
        assert_eq!(recovery.len(), 1);
        assert_eq!(recovery[0].recovery_pct, 0);
        assert!(recovery.iter().all(|group| group.total > 0));
        assert_eq!(dashboard_stats(&records).hospitals, 1);
    }

    #[test]
    fn zero_and_missing_costs_exclude_hospital() {
        let records = vec![
            case("Free Clinic", None, Some(0)),
            case("Free Clinic", None, None),
            case("Apollo", None, Some(1001)),
            case("Apollo", None, Some(1000)),
        ];
        let costs = hospital_costs(&refs(&records));
        assert_eq!(costs.len(), 1);
        assert_eq!(costs[0].hospital, "Apollo");
        assert_eq!(costs[0].avg_cost, 1001);
        assert_eq!(costs[0].total_cost, 2001);
    }

    #[test]
    fn costs_sorted_descending() {
        let records = vec![
            case("Low", None, Some(100)),
            case("High", None, Some(9000)),
            case("Mid", None, Some(4000)),
            case("Mid", None, Some(5000)),
        ];
        let costs = hospital_costs(&refs(&records));
        let order: Vec<&str> = costs.iter().map(|c| c.hospital.as_str()).collect();
        assert_eq!(order, vec!["High", "Mid", "Low"]);
        assert!(costs.windows(2).all(|pair| pair[0].avg_cost >= pair[1].avg_cost));
    }

    #[test]
    fn equal_averages_keep_first_seen_order() {
        let records = vec![
            case("Fortis", None, Some(3000)),
            case("Apollo", None, Some(5000)),
            case("Manipal", None, Some(2000)),
            case("Manipal", None, Some(4000)),
            case("AIIMS", None, Some(3000)),
        ];
        let costs = hospital_costs(&refs(&records));
        let order: Vec<(&str, u64)> = costs
            .iter()
            .map(|c| (c.hospital.as_str(), c.avg_cost))
            .collect();
        assert_eq!(
            order,
            vec![("Apollo", 5000), ("Fortis", 3000), ("Manipal", 3000), ("AIIMS", 3000)]
        );
    }

    #[test]
    fn huge_costs_do_not_overflow() {
        let near_max = 9_300_000_000_000_000_000;
        let records = vec![
            case("A", None, Some(near_max)),
            case("A", None, Some(near_max)),
            case("B", None, Some(u64::MAX)),
            case("B", None, Some(u64::MAX - 1)),
        ];
        let costs = hospital_costs(&refs(&records));
        assert_eq!(costs[0].hospital, "B");
        assert_eq!(costs[0].avg_cost, u64::MAX);
        assert_eq!(costs[0].total_cost, u64::MAX);
        assert_eq!(costs[1].hospital, "A");
        assert_eq!(costs[1].avg_cost, near_max);
        assert_eq!(costs[1].total_cost, u64::MAX);
    }

    #[test]
    fn tab_counts_use_canonical_outcome() {
        let records = vec![
            case("A", Outcome::parse("Improving"), None),
            case("A", Outcome::parse("Improved"), None),
            case("A", Some(Outcome::Recovered), None),
            case("A", None, None),
        ];
        let tabs = tab_counts(&refs(&records));
        let labels: Vec<&str> = tabs.iter().map(|tab| tab.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["All", "Recovered", "Improved", "Stable", "Deteriorating"]
        );
        assert_eq!(tabs[0].count, 4);
        assert_eq!(tabs[2].count, 2);
        let per_outcome: usize = tabs[1..].iter().map(|tab| tab.count).sum();
        assert!(per_outcome <= tabs[0].count);
    }

    #[test]
    fn outcome_distribution_keeps_first_seen_order() {
        let records = vec![
            case("A", Some(Outcome::Stable), None),
            case("A", None, None),
            case("A", Some(Outcome::Recovered), None),
            case("A", Some(Outcome::Stable), None),
        ];
        let distribution = outcome_distribution(&refs(&records));
        assert_eq!(
            distribution,
            vec![
                OutcomeCount { label: "Stable".into(), count: 2 },
                OutcomeCount { label: "Unknown".into(), count: 1 },
                OutcomeCount { label: "Recovered".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn filter_options_start_with_all() {
        let mut first = case("A", Some(Outcome::Stable), None);
        first.disease = "Asthma".into();
        let second = case("B", Some(Outcome::Stable), None);
        let records = vec![first, second];
        let options = filter_options(&refs(&records));
        assert_eq!(options.diseases, vec!["All", "Asthma", "Dengue"]);
        assert_eq!(options.outcomes, vec!["All", "Stable"]);
        assert_eq!(options.genders, vec!["All"]);
    }

    #[test]
    fn recent_cases_newest_first() {
        let records: Vec<CaseRecord> = (0..7)
            .map(|i| case(&format!("H{i}"), None, None))
            .collect();
        let recent = recent_cases(&refs(&records), 5);
        let names: Vec<&str> = recent.iter().map(|r| r.hospital_name.as_str()).collect();
        assert_eq!(names, vec!["H6", "H5", "H4", "H3", "H2"]);
    }
}
