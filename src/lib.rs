//! Customer complaints analysis.
//!
//! Load a [`RecordSet`] (from CSV, the sample generator or by hand), narrow it
//! with a [`RecordFilter`], then query a [`ComplaintsAnalyzer`] for an
//! overview, keyword categories, monthly volume, resolution times and the most
//! frequent issues.
pub mod analyzer;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod output;
pub mod records;
pub mod reports;
pub mod sample;
pub mod types;
pub mod util;

pub use analyzer::ComplaintsAnalyzer;
pub use config::{AnalyzerConfig, CategoryRule};
pub use error::{AnalysisError, AnalysisResult};
pub use filter::RecordFilter;
pub use records::{ColumnType, RecordSet, Value};
pub use types::AnalysisReport;
