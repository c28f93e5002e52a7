use crate::analyzer::{parse_date_column, DATE_COLUMNS};
use crate::error::AnalysisResult;
use crate::records::{RecordSet, Value};
use chrono::NaiveDate;

pub const CATEGORY_FILTER_COLUMN: &str = "Category";
pub const STATUS_FILTER_COLUMN: &str = "Status";

/// Row selection applied before a record set is handed to the analyzer.
///
/// Unset bounds and empty value lists match everything. A constraint whose
/// column does not exist is skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub categories: Vec<String>,
    pub statuses: Vec<String>,
}

impl RecordFilter {
    pub fn is_empty(&self) -> bool {
        self.date_from.is_none()
            && self.date_to.is_none()
            && self.categories.is_empty()
            && self.statuses.is_empty()
    }

    pub fn apply(&self, data: &RecordSet) -> AnalysisResult<RecordSet> {
        if self.is_empty() {
            return Ok(data.clone());
        }

        let date_idx = if self.date_from.is_some() || self.date_to.is_some() {
            let idx = data.find_column(DATE_COLUMNS);
            if idx.is_none() {
                log::warn!("filter: no date column, ignoring date range");
            }
            idx
        } else {
            None
        };
        let category_idx = self.optional_column(data, CATEGORY_FILTER_COLUMN, &self.categories);
        let status_idx = self.optional_column(data, STATUS_FILTER_COLUMN, &self.statuses);

        // Resolve dates up front so a bad value surfaces as an error instead of
        // silently dropping the row.
        let dates = match date_idx {
            Some(idx) => Some(parse_date_column(data, idx)?),
            None => None,
        };

        let mut row_no = 0usize;
        let filtered = data.retain_rows(|row| {
            let i = row_no;
            row_no += 1;
            if let Some(dates) = &dates {
                match dates[i] {
                    Some(d) => {
                        if self.date_from.is_some_and(|from| d < from)
                            || self.date_to.is_some_and(|to| d > to)
                        {
                            return false;
                        }
                    }
                    None => return false,
                }
            }
            if let Some(idx) = category_idx {
                if !contains_value(&self.categories, &row[idx]) {
                    return false;
                }
            }
            if let Some(idx) = status_idx {
                if !contains_value(&self.statuses, &row[idx]) {
                    return false;
                }
            }
            true
        });
        log::info!("filter: kept {} of {} rows", filtered.len(), data.len());
        Ok(filtered)
    }

    fn optional_column(&self, data: &RecordSet, name: &str, wanted: &[String]) -> Option<usize> {
        if wanted.is_empty() {
            return None;
        }
        let idx = data.column_index(name);
        if idx.is_none() {
            log::warn!("filter: no '{}' column, ignoring that filter", name);
        }
        idx
    }
}

fn contains_value(wanted: &[String], v: &Value) -> bool {
    let s = v.to_string();
    wanted.iter().any(|w| *w == s)
}
