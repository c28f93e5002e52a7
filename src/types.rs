use crate::records::ColumnType;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tabled::Tabled;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataOverview {
    pub total_complaints: usize,
    pub total_columns: usize,
    pub missing_values: BTreeMap<String, usize>,
    pub data_types: BTreeMap<String, ColumnType>,
    pub memory_usage_mb: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyVolume {
    pub date_column: String,
    /// `YYYY-MM` keys, so map order is chronological.
    pub monthly_volume: BTreeMap<String, usize>,
    pub total_volume: usize,
    pub peak_month: Option<String>,
}

impl MonthlyVolume {
    pub fn rows(&self) -> Vec<MonthVolumeRow> {
        self.monthly_volume
            .iter()
            .map(|(month, count)| MonthVolumeRow {
                month: month.clone(),
                count: *count,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VolumeAnalysis {
    NoDateColumn,
    Monthly(MonthlyVolume),
}

impl VolumeAnalysis {
    pub fn monthly(&self) -> Option<&MonthlyVolume> {
        match self {
            VolumeAnalysis::Monthly(m) => Some(m),
            VolumeAnalysis::NoDateColumn => None,
        }
    }
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct MonthVolumeRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "Complaints")]
    #[tabled(rename = "Complaints")]
    pub count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct CategoryCount {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub label: String,
    #[serde(rename = "Complaints")]
    #[tabled(rename = "Complaints")]
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    /// Text column the labels were derived from; `None` when no alias matched.
    pub source_column: Option<String>,
    /// Rule labels in definition order, `other` last.
    pub counts: Vec<CategoryCount>,
}

impl CategoryBreakdown {
    pub fn count(&self, label: &str) -> usize {
        self.counts
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.count)
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|c| c.count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionStats {
    pub submitted_column: String,
    pub resolved_column: String,
    /// Rows with both dates present.
    pub rows_used: usize,
    pub mean_resolution_days: Option<f64>,
    pub median_resolution_days: Option<f64>,
    pub min_resolution_days: Option<i64>,
    pub max_resolution_days: Option<i64>,
    pub std_resolution_days: Option<f64>,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct IssueCount {
    #[serde(rename = "Issue")]
    #[tabled(rename = "Issue")]
    pub issue: String,
    #[serde(rename = "Complaints")]
    #[tabled(rename = "Complaints")]
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub data_overview: DataOverview,
    pub complaint_volume: VolumeAnalysis,
    pub complaint_categories: CategoryBreakdown,
    pub resolution_time: Option<ResolutionStats>,
    pub top_issues: Vec<IssueCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub total_complaints: usize,
    pub avg_resolution_days: Option<f64>,
    pub avg_satisfaction: Option<f64>,
    pub closed_rate_pct: f64,
    pub high_satisfaction_pct: f64,
}

fn display_opt(v: &Option<f64>) -> String {
    crate::util::format_opt(*v, 2)
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct GroupStatsRow {
    #[serde(rename = "Group")]
    #[tabled(rename = "Group")]
    pub group: String,
    #[serde(rename = "TotalComplaints")]
    #[tabled(rename = "TotalComplaints")]
    pub total_complaints: usize,
    #[serde(rename = "AvgResolutionDays")]
    #[tabled(rename = "AvgResolutionDays", display_with = "display_opt")]
    pub avg_resolution_days: Option<f64>,
    #[serde(rename = "AvgSatisfaction")]
    #[tabled(rename = "AvgSatisfaction", display_with = "display_opt")]
    pub avg_satisfaction: Option<f64>,
    #[serde(rename = "SatisfactionStdDev")]
    #[tabled(rename = "SatisfactionStdDev", display_with = "display_opt")]
    pub satisfaction_std_dev: Option<f64>,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct DailyVolumeRow {
    #[serde(rename = "Date")]
    #[tabled(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Complaints")]
    #[tabled(rename = "Complaints")]
    pub count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct RatingCountRow {
    #[serde(rename = "Rating")]
    #[tabled(rename = "Rating")]
    pub rating: i64,
    #[serde(rename = "Complaints")]
    #[tabled(rename = "Complaints")]
    pub count: usize,
}
