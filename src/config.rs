use crate::error::AnalysisResult;
use chrono::NaiveDate;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Label given to rows that match no rule.
pub const OTHER_CATEGORY: &str = "other";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub label: String,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    /// Keywords are stored case-folded so matching only lowercases the text.
    pub fn new(label: &str, keywords: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    pub fn matches(&self, folded_text: &str) -> bool {
        self.keywords.iter().any(|k| folded_text.contains(k.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Checked in order; the first matching rule wins.
    pub category_rules: Vec<CategoryRule>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            category_rules: default_category_rules(),
        }
    }
}

impl AnalyzerConfig {
    /// Read a rule table from JSON, e.g.
    /// `{"category_rules": [{"label": "billing", "keywords": ["fee"]}]}`.
    pub fn from_json_file(path: &Path) -> AnalysisResult<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::from_json_str(&s)
    }

    pub fn from_json_str(s: &str) -> AnalysisResult<Self> {
        let mut cfg: AnalyzerConfig = serde_json::from_str(s)?;
        for rule in &mut cfg.category_rules {
            for k in &mut rule.keywords {
                *k = k.to_lowercase();
            }
        }
        Ok(cfg)
    }
}

pub fn default_category_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new("billing", &["billing", "charge", "payment", "invoice", "fee"]),
        CategoryRule::new("service", &["service", "support", "response", "issue", "resolution"]),
        CategoryRule::new("account", &["account", "access", "login", "security", "password"]),
        CategoryRule::new("product", &["product", "offer", "feature", "benefits", "terms"]),
        CategoryRule::new(
            "fraud",
            &["fraud", "unauthorized", "stolen", "suspicious", "security breach"],
        ),
    ]
}

/// Command-line options for the interactive report tool.
#[derive(Debug, Clone, Parser)]
#[command(name = "complaints_report", about = "Customer complaints analysis reports")]
pub struct CliOptions {
    /// CSV file with one complaint per row
    #[arg(long, default_value = "complaints.csv")]
    pub input: PathBuf,

    /// Use generated sample data instead of reading --input
    #[arg(long)]
    pub sample: bool,

    /// Seed for the sample generator
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of sample records to generate
    #[arg(long, default_value_t = 2000)]
    pub records: usize,

    /// JSON file with category rules
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Keep rows dated on or after this day (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Keep rows dated on or before this day (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Keep only these values of the Category column
    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// Keep only these values of the Status column
    #[arg(long = "status")]
    pub statuses: Vec<String>,

    /// Directory for exported CSV and JSON files
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

impl CliOptions {
    pub fn analyzer_config(&self) -> AnalysisResult<AnalyzerConfig> {
        match &self.rules {
            Some(path) => AnalyzerConfig::from_json_file(path),
            None => Ok(AnalyzerConfig::default()),
        }
    }
}
