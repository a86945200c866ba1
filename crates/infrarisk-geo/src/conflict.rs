//! Conflict detection between area and linear assets
//!
//! Every area asset is buffered by `width / 2 + slack`, every linear asset is
//! parsed once, and each buffered area is tested against the linear assets
//! whose bounds overlap its own. Output order is area input order, then
//! linear input order, for both enumeration strategies.

use crate::buffer::{BufferShape, BufferedGeometry};
use crate::index::CandidateIndex;
use crate::intersect::intersects;
use crate::models::{AssetCategory, Entity};
use crate::parse::parse;
use crate::prefilter::{prefilter, BoundsCache, Candidate};
use crate::risk::classify;
use infrarisk_core::config::{AnalysisConfig, MatchStrategy};
use infrarisk_core::models::{AnalysisReport, AnalysisStats, MatchRecord, RiskLevel};

/// Detect conflicts with default analysis settings and the given slack
pub fn detect(areas: &[Entity], linears: &[Entity], slack_m: f64) -> Vec<MatchRecord> {
    detect_conflicts(areas, linears, &AnalysisConfig::with_slack(slack_m)).matches
}

/// Run conflict detection and collect per-run statistics
pub fn detect_conflicts(
    areas: &[Entity],
    linears: &[Entity],
    config: &AnalysisConfig,
) -> AnalysisReport {
    let span = tracing::info_span!(
        "detect_conflicts",
        areas = areas.len(),
        linears = linears.len(),
        strategy = ?config.strategy
    );
    let _enter = span.enter();

    warn_on_role_mismatch(areas, AssetCategory::AreaAsset);
    warn_on_role_mismatch(linears, AssetCategory::LinearAsset);

    let mut stats = AnalysisStats {
        area_total: areas.len(),
        linear_total: linears.len(),
        ..AnalysisStats::default()
    };

    let buffered = buffer_areas(areas, config, &mut stats);
    let cache = BoundsCache::build(linears);
    stats.linear_skipped = cache.skipped();

    let mut matches = Vec::new();
    if !buffered.is_empty() && !cache.is_empty() {
        match config.strategy {
            MatchStrategy::Pairwise => {
                for area in &buffered {
                    let nearby = cache.candidates().iter().filter(|c| {
                        let keep = prefilter(area, &c.bounds);
                        if !keep {
                            stats.prefilter_rejected += 1;
                        }
                        keep
                    });
                    let nearby: Vec<&Candidate> = nearby.collect();
                    collect_matches(area, nearby, areas, linears, &mut matches);
                }
            }
            MatchStrategy::Rtree => {
                let index = CandidateIndex::from_candidates(cache.candidates());
                for area in &buffered {
                    let ids = index.query(&area.bounds);
                    stats.prefilter_rejected += cache.len() - ids.len();
                    let nearby = ids.into_iter().map(|id| &cache.candidates()[id]).collect();
                    collect_matches(area, nearby, areas, linears, &mut matches);
                }
            }
        }
        stats.candidate_pairs = buffered.len() * cache.len();
    }

    stats.intersecting_pairs = matches.len();
    stats.high_risk = matches.iter().filter(|m| m.risk_level == RiskLevel::High).count();

    tracing::info!(
        "Detected {} conflicts ({} high risk) from {} candidate pairs, {} rejected by bounds",
        stats.intersecting_pairs,
        stats.high_risk,
        stats.candidate_pairs,
        stats.prefilter_rejected
    );

    AnalysisReport { matches, stats }
}

fn buffer_areas(
    areas: &[Entity],
    config: &AnalysisConfig,
    stats: &mut AnalysisStats,
) -> Vec<BufferedGeometry> {
    let shape = BufferShape::from(config);
    let mut buffered = Vec::with_capacity(areas.len());
    for (source, area) in areas.iter().enumerate() {
        match parse(area) {
            Some(geometry) => buffered.push(BufferedGeometry::new(
                source,
                &geometry,
                area.width_or(config.default_width_m),
                config.slack_m,
                &shape,
            )),
            None => {
                tracing::debug!("Skipping area asset {}: no usable coordinates", area.id);
                stats.area_skipped += 1;
            }
        }
    }
    buffered
}

fn collect_matches(
    area: &BufferedGeometry,
    nearby: Vec<&Candidate>,
    areas: &[Entity],
    linears: &[Entity],
    matches: &mut Vec<MatchRecord>,
) {
    for candidate in nearby {
        if intersects(&area.polygon, &candidate.geometry) {
            matches.push(classify(&areas[area.source], &linears[candidate.source]));
        }
    }
}

fn warn_on_role_mismatch(entities: &[Entity], role: AssetCategory) {
    let mismatched = entities.iter().filter(|e| e.category != role).count();
    if mismatched > 0 {
        tracing::warn!(
            "{} entities passed as {} assets carry a different category; treating them as {}",
            mismatched,
            role,
            role
        );
    }
}
