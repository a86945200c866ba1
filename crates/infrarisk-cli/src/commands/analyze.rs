//! Analyze command implementation

use crate::cli::AnalyzeArgs;
use crate::config_loader::load_config_with_overrides;
use crate::output::OutputWriter;
use crate::output_types::{AnalysisParameters, AnalyzeOutput, MatchRow};
use crate::storage::{read_entities, write_json};
use anyhow::Result;
use infrarisk_core::config::{AnalysisConfig, CliConfigOverrides};
use infrarisk_core::models::{AnalysisReport, RiskLevel};
use infrarisk_geo::detect_conflicts;
use std::path::Path;

pub fn execute(args: AnalyzeArgs, output: &OutputWriter, config_file: Option<&Path>) -> Result<()> {
    let overrides = CliConfigOverrides {
        slack_m: args.slack_m,
        default_width_m: args.default_width_m,
        buffer_segments: args.segments,
        scale_longitude: args.flat.then_some(false),
        strategy: args.strategy,
        ..Default::default()
    };
    let config = load_config_with_overrides(config_file, overrides)?;
    let analysis = config.to_analysis_config();

    let areas = read_entities(&args.areas)?;
    let linears = read_entities(&args.linears)?;

    let mut report = detect_conflicts(&areas.entities, &linears.entities, &analysis);

    // The saved report is always complete; --high-only narrows the listing
    let report_path = match &args.out {
        Some(path) => {
            write_json(path, &report)?;
            Some(path.display().to_string())
        }
        None => None,
    };
    if args.high_only {
        report.matches.retain(|m| m.risk_level == RiskLevel::High);
    }

    let AnalysisReport { matches, stats } = report;
    let result = AnalyzeOutput {
        areas_file: args.areas.display().to_string(),
        linears_file: args.linears.display().to_string(),
        parameters: parameters(&analysis),
        stats,
        matches,
        report_path,
    };

    if output.is_json() {
        return output.result(result);
    }

    output.section("Parameters");
    output.kv("Slack", format!("{} m", result.parameters.slack_m));
    output.kv("Default width", format!("{} m", result.parameters.default_width_m));
    output.kv("Buffer segments", result.parameters.buffer_segments);
    output.kv("Longitude scaling", if result.parameters.scale_longitude { "on" } else { "off" });
    output.kv("Strategy", &result.parameters.strategy);

    output.section("Inputs");
    output.kv(
        "Area assets",
        format!("{} ({} without usable geometry)", result.stats.area_total, result.stats.area_skipped),
    );
    output.kv(
        "Linear assets",
        format!(
            "{} ({} without usable geometry)",
            result.stats.linear_total, result.stats.linear_skipped
        ),
    );
    output.kv(
        "Candidate pairs",
        format!(
            "{} ({} rejected by bounds)",
            result.stats.candidate_pairs, result.stats.prefilter_rejected
        ),
    );

    output.section("Conflicts");
    output.table(result.matches.iter().map(MatchRow::from).collect());

    if result.stats.intersecting_pairs == 0 {
        output.success("No conflicts found");
    } else if result.stats.high_risk > 0 {
        output.warning(format!(
            "{} conflicts, {} high risk",
            result.stats.intersecting_pairs, result.stats.high_risk
        ));
    } else {
        output.success(format!("{} conflicts, none high risk", result.stats.intersecting_pairs));
    }

    if let Some(path) = &result.report_path {
        output.info(format!("Full report written to {}", path));
    }

    Ok(())
}

fn parameters(config: &AnalysisConfig) -> AnalysisParameters {
    AnalysisParameters {
        slack_m: config.slack_m,
        default_width_m: config.default_width_m,
        buffer_segments: config.buffer_segments,
        scale_longitude: config.scale_longitude,
        strategy: format!("{:?}", config.strategy).to_lowercase(),
    }
}
