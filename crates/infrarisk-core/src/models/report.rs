use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity assigned to a detected conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    High,
    Low,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "HIGH",
            RiskLevel::Low => "LOW",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A buffered area asset intersecting a linear asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub area_entity_id: String,
    pub area_label: String,
    /// Raw condition rating as reported by the catalog
    pub area_condition: Option<String>,
    pub linear_entity_id: String,
    /// Descriptive attribute of the linear asset (installation year or material)
    pub linear_attribute: String,
    pub risk_level: RiskLevel,
}

/// Counters collected during one analysis run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub area_total: usize,
    pub area_skipped: usize,
    pub linear_total: usize,
    pub linear_skipped: usize,
    /// Pairs considered before the bounds prefilter
    pub candidate_pairs: usize,
    pub prefilter_rejected: usize,
    pub intersecting_pairs: usize,
    pub high_risk: usize,
}

/// Output of one analysis run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub matches: Vec<MatchRecord>,
    pub stats: AnalysisStats,
}

impl AnalysisReport {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Matches classified as high risk, in output order
    pub fn high_risk(&self) -> impl Iterator<Item = &MatchRecord> {
        self.matches.iter().filter(|m| m.risk_level == RiskLevel::High)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&RiskLevel::High).unwrap(), "\"HIGH\"");
        let parsed: RiskLevel = serde_json::from_str("\"LOW\"").unwrap();
        assert_eq!(parsed, RiskLevel::Low);
        assert_eq!(RiskLevel::High.to_string(), "HIGH");
    }

    #[test]
    fn test_high_risk_filter() {
        let record = |id: &str, risk_level| MatchRecord {
            area_entity_id: id.to_string(),
            area_label: id.to_string(),
            area_condition: None,
            linear_entity_id: "P-1".to_string(),
            linear_attribute: "unknown".to_string(),
            risk_level,
        };
        let report = AnalysisReport {
            matches: vec![record("A", RiskLevel::Low), record("B", RiskLevel::High)],
            stats: AnalysisStats::default(),
        };

        let high: Vec<_> = report.high_risk().map(|m| m.area_entity_id.as_str()).collect();
        assert_eq!(high, vec!["B"]);
    }
}
