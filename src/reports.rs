use crate::analyzer::{parse_date_column, DATE_COLUMNS};
use crate::error::AnalysisResult;
use crate::filter::STATUS_FILTER_COLUMN;
use crate::records::{RecordSet, Value};
use crate::types::{DailyVolumeRow, GroupStatsRow, KpiSummary, RatingCountRow};
use crate::util::{mean, sample_std_dev};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

pub const RESOLUTION_DAYS_COLUMN: &str = "Resolution_Days";
pub const SATISFACTION_COLUMN: &str = "Satisfaction";
pub const CLOSED_STATUS: &str = "Closed";
/// Scores at or above this count as satisfied.
pub const HIGH_SATISFACTION: f64 = 4.0;

fn numeric_column(data: &RecordSet, name: &str) -> Vec<f64> {
    match data.column_index(name) {
        Some(idx) => data.column_values(idx).filter_map(|v| v.as_f64()).collect(),
        None => Vec::new(),
    }
}

fn pct(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

pub fn kpi_summary(data: &RecordSet) -> KpiSummary {
    let total = data.len();
    let satisfaction = numeric_column(data, SATISFACTION_COLUMN);
    let closed = match data.column_index(STATUS_FILTER_COLUMN) {
        Some(idx) => data
            .column_values(idx)
            .filter(|v| v.to_string() == CLOSED_STATUS)
            .count(),
        None => 0,
    };
    let satisfied = satisfaction
        .iter()
        .filter(|s| **s >= HIGH_SATISFACTION)
        .count();

    KpiSummary {
        total_complaints: total,
        avg_resolution_days: mean(&numeric_column(data, RESOLUTION_DAYS_COLUMN)),
        avg_satisfaction: mean(&satisfaction),
        closed_rate_pct: pct(closed, total),
        high_satisfaction_pct: pct(satisfied, total),
    }
}

/// Complaints per calendar day, oldest first. Rows with a missing date are
/// left out; an unparsable date is an error.
pub fn daily_volume(data: &RecordSet) -> AnalysisResult<Vec<DailyVolumeRow>> {
    let Some(idx) = data.find_column(DATE_COLUMNS) else {
        log::debug!("daily volume: no date column");
        return Ok(Vec::new());
    };
    let mut days: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for date in parse_date_column(data, idx)?.into_iter().flatten() {
        *days.entry(date).or_insert(0) += 1;
    }
    Ok(days
        .into_iter()
        .map(|(date, count)| DailyVolumeRow { date, count })
        .collect())
}

/// How often each whole-number satisfaction score occurs, lowest score first.
pub fn satisfaction_distribution(data: &RecordSet) -> Vec<RatingCountRow> {
    let Some(idx) = data.column_index(SATISFACTION_COLUMN) else {
        log::debug!("satisfaction distribution: no '{}' column", SATISFACTION_COLUMN);
        return Vec::new();
    };
    let mut ratings: BTreeMap<i64, usize> = BTreeMap::new();
    let mut skipped = 0usize;
    for v in data.column_values(idx) {
        let rating = match v {
            Value::Integer(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Value::Missing => continue,
            _ => None,
        };
        match rating {
            Some(r) => *ratings.entry(r).or_insert(0) += 1,
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        log::debug!("satisfaction distribution: {} non-integer scores skipped", skipped);
    }
    ratings
        .into_iter()
        .map(|(rating, count)| RatingCountRow { rating, count })
        .collect()
}

/// Per-value breakdown of `column`, largest groups first.
pub fn group_stats(data: &RecordSet, column: &str) -> Vec<GroupStatsRow> {
    #[derive(Default)]
    struct Acc {
        count: usize,
        resolution: Vec<f64>,
        satisfaction: Vec<f64>,
    }

    let Some(group_idx) = data.column_index(column) else {
        log::debug!("group stats: no '{}' column", column);
        return Vec::new();
    };
    let res_idx = data.column_index(RESOLUTION_DAYS_COLUMN);
    let sat_idx = data.column_index(SATISFACTION_COLUMN);

    let mut map: HashMap<String, Acc> = HashMap::new();
    for row in data.rows() {
        if row[group_idx].is_missing() {
            continue;
        }
        let e = map.entry(row[group_idx].to_string()).or_default();
        e.count += 1;
        if let Some(v) = res_idx.and_then(|i| row[i].as_f64()) {
            e.resolution.push(v);
        }
        if let Some(v) = sat_idx.and_then(|i| row[i].as_f64()) {
            e.satisfaction.push(v);
        }
    }

    let mut rows: Vec<GroupStatsRow> = map
        .into_iter()
        .map(|(group, acc)| GroupStatsRow {
            group,
            total_complaints: acc.count,
            avg_resolution_days: mean(&acc.resolution),
            avg_satisfaction: mean(&acc.satisfaction),
            satisfaction_std_dev: sample_std_dev(&acc.satisfaction),
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total_complaints
            .cmp(&a.total_complaints)
            .then_with(|| a.group.cmp(&b.group))
    });
    rows
}
