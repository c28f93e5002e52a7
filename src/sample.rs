//! Deterministic synthetic complaints for demos and tests.
//!
//! The same seed always yields the same rows.
use crate::error::AnalysisResult;
use crate::records::{RecordSet, Value};
use chrono::{Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub const SAMPLE_COLUMNS: &[&str] = &[
    "Complaint_ID",
    "Date",
    "Category",
    "Status",
    "Resolution_Days",
    "Satisfaction",
    "Issue",
];

pub const CATEGORIES: &[&str] = &[
    "Billing Issues",
    "Customer Service",
    "Card Management",
    "Fraud & Security",
    "Delivery Issues",
];

pub const STATUSES: &[&str] = &["Closed", "In Progress", "Pending"];

const ISSUES: &[&str] = &[
    "Unexpected annual fee on statement",
    "Payment not credited to account",
    "Long wait for customer support",
    "No response to my email",
    "Cannot login to online account",
    "Password reset link not working",
    "Rewards offer terms changed",
    "Card benefits not applied",
    "Unauthorized transaction on card",
    "Card stolen and used abroad",
    "Replacement card never arrived",
];

/// First and last day (inclusive) a sample complaint can be dated.
pub fn sample_date_range() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
        NaiveDate::from_ymd_opt(2024, 11, 30).unwrap_or_default(),
    )
}

pub fn generate_sample(records: usize, seed: u64) -> AnalysisResult<RecordSet> {
    let mut rng = Pcg64Mcg::seed_from_u64(seed);
    let (start, end) = sample_date_range();
    let span_days = (end - start).num_days();

    let rows = (1..=records)
        .map(|id| {
            let date = start + Duration::days(rng.gen_range(0..=span_days));
            vec![
                Value::Integer(id as i64),
                Value::Date(date),
                Value::text(pick(&mut rng, CATEGORIES)),
                Value::text(pick(&mut rng, STATUSES)),
                Value::Integer(rng.gen_range(1..45)),
                Value::Integer(rng.gen_range(1..=5)),
                Value::text(pick(&mut rng, ISSUES)),
            ]
        })
        .collect();
    let set = RecordSet::from_rows(SAMPLE_COLUMNS.iter().copied(), rows)?;
    log::info!("sample: generated {} records (seed {})", set.len(), seed);
    Ok(set)
}

fn pick<'a>(rng: &mut Pcg64Mcg, options: &[&'a str]) -> &'a str {
    options.choose(rng).copied().unwrap_or_default()
}
