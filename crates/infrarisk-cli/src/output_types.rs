use chrono::{DateTime, Utc};
use infrarisk_catalog::TermFailure;
use infrarisk_core::config::ConfigSource;
use infrarisk_core::models::{AnalysisStats, MatchRecord};
use infrarisk_core::normalize::DatasetKind;
use serde::Serialize;
use tabled::Tabled;

/// Output for fetch command
#[derive(Debug, Serialize)]
pub struct FetchOutput {
    pub dataset: DatasetKind,
    pub term: String,
    pub source: String,
    pub entity_count: usize,
    pub dropped: usize,
    pub failures: Vec<FailureInfo>,
    pub out_path: String,
    pub fetched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct FailureInfo {
    pub term: String,
    pub reason: String,
}

impl From<&TermFailure> for FailureInfo {
    fn from(failure: &TermFailure) -> Self {
        Self { term: failure.term.clone(), reason: failure.reason.clone() }
    }
}

/// Output for analyze command
#[derive(Debug, Serialize)]
pub struct AnalyzeOutput {
    pub areas_file: String,
    pub linears_file: String,
    pub parameters: AnalysisParameters,
    pub stats: AnalysisStats,
    pub matches: Vec<MatchRecord>,
    pub report_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisParameters {
    pub slack_m: f64,
    pub default_width_m: f64,
    pub buffer_segments: usize,
    pub scale_longitude: bool,
    pub strategy: String,
}

/// One match as a table row
#[derive(Debug, Tabled)]
pub struct MatchRow {
    #[tabled(rename = "Risk")]
    pub risk: String,
    #[tabled(rename = "Area")]
    pub area: String,
    #[tabled(rename = "Name")]
    pub label: String,
    #[tabled(rename = "Condition")]
    pub condition: String,
    #[tabled(rename = "Linear")]
    pub linear: String,
    #[tabled(rename = "Attribute")]
    pub attribute: String,
}

impl From<&MatchRecord> for MatchRow {
    fn from(record: &MatchRecord) -> Self {
        Self {
            risk: record.risk_level.to_string(),
            area: record.area_entity_id.clone(),
            label: record.area_label.clone(),
            condition: record.area_condition.clone().unwrap_or_else(|| "-".to_string()),
            linear: record.linear_entity_id.clone(),
            attribute: record.linear_attribute.clone(),
        }
    }
}

/// Output for sample command
#[derive(Debug, Serialize)]
pub struct SampleOutput {
    pub out_dir: String,
    pub files: Vec<SampleFile>,
}

#[derive(Debug, Serialize)]
pub struct SampleFile {
    pub dataset: DatasetKind,
    pub path: String,
    pub entity_count: usize,
}

/// Output for config command
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub config_file: Option<String>,
    pub values: Vec<ConfigEntry>,
}

#[derive(Debug, Serialize, Tabled)]
pub struct ConfigEntry {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source", display_with = "display_source")]
    pub source: ConfigSource,
}

fn display_source(source: &ConfigSource) -> String {
    format!("{:?}", source)
}
