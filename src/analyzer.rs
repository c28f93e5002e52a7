//! Complaint analysis over a loaded [`RecordSet`].
//!
//! Columns are found through ordered alias lists; a missing optional column
//! produces an empty result rather than an error. Only [`categorize`] writes to
//! the record set, and only its own `Complaint_Category` column.
//!
//! [`categorize`]: ComplaintsAnalyzer::categorize
use crate::config::{AnalyzerConfig, CategoryRule, OTHER_CATEGORY};
use crate::error::{AnalysisError, AnalysisResult};
use crate::records::{RecordSet, Value};
use crate::types::{
    AnalysisReport, CategoryBreakdown, CategoryCount, DataOverview, IssueCount, MonthlyVolume,
    ResolutionStats, VolumeAnalysis,
};
use crate::util::{days_diff, mean, median, parse_date_safe, sample_std_dev};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

pub const DESCRIPTION_COLUMNS: &[&str] = &[
    "Complaint",
    "complaint",
    "Description",
    "description",
    "Issue",
    "issue",
];
pub const DATE_COLUMNS: &[&str] = &["Date", "date"];
pub const ISSUE_COLUMNS: &[&str] = &["Sub-issue", "sub-issue", "Sub_issue", "Issue", "issue"];
pub const CATEGORY_COLUMN: &str = "Complaint_Category";
pub const DEFAULT_TOP_ISSUES: usize = 10;

#[derive(Debug)]
pub struct ComplaintsAnalyzer {
    data: Option<RecordSet>,
    rules: Vec<CategoryRule>,
    last_report: Option<AnalysisReport>,
}

impl Default for ComplaintsAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

impl ComplaintsAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            data: None,
            rules: config.category_rules,
            last_report: None,
        }
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Replace the held record set. The cached report is left alone; it is
    /// only replaced by the next `generate_report`.
    pub fn load(&mut self, records: RecordSet) {
        log::info!(
            "analyzer: loaded {} rows x {} columns",
            records.len(),
            records.columns().len()
        );
        self.data = Some(records);
    }

    pub fn records(&self) -> AnalysisResult<&RecordSet> {
        self.data.as_ref().ok_or(AnalysisError::NotLoaded)
    }

    pub fn overview(&self) -> AnalysisResult<DataOverview> {
        let data = self.records()?;
        let mut missing_values = BTreeMap::new();
        let mut data_types = BTreeMap::new();
        for (idx, name) in data.columns().iter().enumerate() {
            missing_values.insert(name.clone(), data.missing_count(idx));
            data_types.insert(name.clone(), data.infer_type(idx));
        }
        Ok(DataOverview {
            total_complaints: data.len(),
            total_columns: data.columns().len(),
            missing_values,
            data_types,
            memory_usage_mb: data.approx_bytes() as f64 / (1024.0 * 1024.0),
        })
    }

    /// Label every row with the first rule whose keywords occur in its
    /// description text, or `other`.
    ///
    /// Writes the labels to the `Complaint_Category` column, overwriting a
    /// previous run. When no description column exists nothing is written and
    /// all counts are zero.
    pub fn categorize(&mut self) -> AnalysisResult<CategoryBreakdown> {
        let data = self.data.as_mut().ok_or(AnalysisError::NotLoaded)?;

        let mut counts: Vec<CategoryCount> = self
            .rules
            .iter()
            .map(|r| CategoryCount {
                label: r.label.clone(),
                count: 0,
            })
            .collect();
        counts.push(CategoryCount {
            label: OTHER_CATEGORY.to_string(),
            count: 0,
        });
        let other_idx = counts.len() - 1;

        let Some(desc_idx) = data.find_column(DESCRIPTION_COLUMNS) else {
            log::warn!("categorize: no description column found, skipping");
            return Ok(CategoryBreakdown {
                source_column: None,
                counts,
            });
        };
        let source_column = data.columns()[desc_idx].clone();
        log::debug!("categorize: using column '{}'", source_column);

        let mut labels = Vec::with_capacity(data.len());
        for v in data.column_values(desc_idx) {
            let text = v.to_string().to_lowercase();
            let idx = self
                .rules
                .iter()
                .position(|r| r.matches(&text))
                .unwrap_or(other_idx);
            counts[idx].count += 1;
            labels.push(Value::Text(counts[idx].label.clone()));
        }
        data.set_column(CATEGORY_COLUMN, labels)?;

        Ok(CategoryBreakdown {
            source_column: Some(source_column),
            counts,
        })
    }

    pub fn analyze_volume(&self) -> AnalysisResult<VolumeAnalysis> {
        let data = self.records()?;
        let Some(date_idx) = data.find_column(DATE_COLUMNS) else {
            log::warn!("volume: date column not found");
            return Ok(VolumeAnalysis::NoDateColumn);
        };
        let dates = parse_date_column(data, date_idx)?;

        let mut monthly_volume: BTreeMap<String, usize> = BTreeMap::new();
        for d in dates.into_iter().flatten() {
            *monthly_volume
                .entry(d.format("%Y-%m").to_string())
                .or_insert(0) += 1;
        }

        // Ascending iteration plus a strict comparison keeps the earliest
        // month on ties.
        let mut peak: Option<(&String, usize)> = None;
        for (month, &count) in &monthly_volume {
            if peak.map_or(true, |(_, best)| count > best) {
                peak = Some((month, count));
            }
        }
        let peak_month = peak.map(|(m, _)| m.clone());

        Ok(VolumeAnalysis::Monthly(MonthlyVolume {
            date_column: data.columns()[date_idx].clone(),
            monthly_volume,
            total_volume: data.len(),
            peak_month,
        }))
    }

    /// Day counts between a submitted and a resolved date column.
    ///
    /// Each role takes the first date column whose name matches it, so one
    /// column may fill both. Returns `None` when either role is unfilled.
    /// Negative durations are kept as they are.
    pub fn analyze_resolution_time(&self) -> AnalysisResult<Option<ResolutionStats>> {
        let data = self.records()?;
        let date_cols: Vec<usize> = data
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.to_lowercase().contains("date"))
            .map(|(i, _)| i)
            .collect();
        if date_cols.len() < 2 {
            log::debug!("resolution: fewer than two date columns");
            return Ok(None);
        }

        let name_has = |idx: usize, needles: &[&str]| {
            let lower = data.columns()[idx].to_lowercase();
            needles.iter().any(|n| lower.contains(n))
        };
        let submitted = date_cols
            .iter()
            .copied()
            .find(|&i| name_has(i, &["submit", "received"]));
        let resolved = date_cols
            .iter()
            .copied()
            .find(|&i| name_has(i, &["resolve", "close"]));
        let (Some(sub_idx), Some(res_idx)) = (submitted, resolved) else {
            log::debug!("resolution: no submitted/resolved column pair");
            return Ok(None);
        };

        let sub_dates = parse_date_column(data, sub_idx)?;
        let res_dates = parse_date_column(data, res_idx)?;
        let days: Vec<i64> = sub_dates
            .iter()
            .zip(&res_dates)
            .filter_map(|(s, r)| match (s, r) {
                (Some(s), Some(r)) => Some(days_diff(*s, *r)),
                _ => None,
            })
            .collect();
        let as_f64: Vec<f64> = days.iter().map(|&d| d as f64).collect();

        log::debug!(
            "resolution: {} of {} rows have both '{}' and '{}'",
            days.len(),
            data.len(),
            data.columns()[sub_idx],
            data.columns()[res_idx]
        );

        Ok(Some(ResolutionStats {
            submitted_column: data.columns()[sub_idx].clone(),
            resolved_column: data.columns()[res_idx].clone(),
            rows_used: days.len(),
            mean_resolution_days: mean(&as_f64),
            median_resolution_days: median(as_f64.clone()),
            min_resolution_days: days.iter().copied().min(),
            max_resolution_days: days.iter().copied().max(),
            std_resolution_days: sample_std_dev(&as_f64),
        }))
    }

    /// The `n` most frequent issue values; equal counts keep first-seen order.
    pub fn top_issues(&self, n: usize) -> AnalysisResult<Vec<IssueCount>> {
        let data = self.records()?;
        let Some(issue_idx) = data.find_column(ISSUE_COLUMNS) else {
            log::debug!("top issues: no issue column");
            return Ok(Vec::new());
        };
        if n == 0 {
            return Ok(Vec::new());
        }

        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut ranking: Vec<IssueCount> = Vec::new();
        for v in data.column_values(issue_idx) {
            if v.is_missing() {
                continue;
            }
            let key = v.to_string();
            match seen.get(&key) {
                Some(&pos) => ranking[pos].count += 1,
                None => {
                    seen.insert(key.clone(), ranking.len());
                    ranking.push(IssueCount {
                        issue: key,
                        count: 1,
                    });
                }
            }
        }
        // Stable sort: ties stay in first-encountered order.
        ranking.sort_by(|a, b| b.count.cmp(&a.count));
        ranking.truncate(n);
        Ok(ranking)
    }

    /// Run every analysis and cache the combined result.
    ///
    /// Categorization runs here before anything else reads the
    /// `Complaint_Category` column, so callers that need the column should
    /// generate a report (or call `categorize`) first.
    pub fn generate_report(&mut self) -> AnalysisResult<&AnalysisReport> {
        let data_overview = self.overview()?;
        let complaint_volume = self.analyze_volume()?;
        let complaint_categories = self.categorize()?;
        let resolution_time = self.analyze_resolution_time()?;
        let top_issues = self.top_issues(DEFAULT_TOP_ISSUES)?;

        log::info!(
            "report: {} complaints, {} categorized, {} top issues",
            data_overview.total_complaints,
            complaint_categories.total(),
            top_issues.len()
        );

        Ok(&*self.last_report.insert(AnalysisReport {
            data_overview,
            complaint_volume,
            complaint_categories,
            resolution_time,
            top_issues,
        }))
    }

    pub fn last_report(&self) -> Option<&AnalysisReport> {
        self.last_report.as_ref()
    }
}

/// Parse a column to dates, keeping `None` for missing cells.
///
/// Any other value that is not a date is a hard error.
pub(crate) fn parse_date_column(
    data: &RecordSet,
    idx: usize,
) -> AnalysisResult<Vec<Option<NaiveDate>>> {
    let column = &data.columns()[idx];
    data.column_values(idx)
        .enumerate()
        .map(|(row, v)| match v {
            Value::Missing => Ok(None),
            Value::Date(d) => Ok(Some(*d)),
            Value::Text(s) if s.trim().is_empty() => Ok(None),
            Value::Text(s) => parse_date_safe(Some(s.as_str())).map(Some).ok_or_else(|| {
                AnalysisError::DateParse {
                    column: column.clone(),
                    row,
                    value: s.clone(),
                }
            }),
            other => Err(AnalysisError::DateParse {
                column: column.clone(),
                row,
                value: other.to_string(),
            }),
        })
        .collect()
}
