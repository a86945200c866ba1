//! Bounding-box prefilter
//!
//! Bounds overlap is necessary but not sufficient for intersection: a pair
//! rejected here can never intersect, a pair accepted here still goes
//! through the exact test.

use crate::buffer::BufferedGeometry;
use crate::models::{Bounds, Entity, Geometry};
use crate::parse::parse;

/// A parsed linear asset with its bounds computed once per run
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Index of the source entity in the input slice
    pub source: usize,
    pub geometry: Geometry,
    pub bounds: Bounds,
}

/// Returns true if the buffer's box and the candidate's box overlap
pub fn prefilter(buffered: &BufferedGeometry, candidate_bounds: &Bounds) -> bool {
    buffered.bounds.overlaps(candidate_bounds)
}

/// Parsed candidates and their bounds for one analysis run
#[derive(Debug, Clone, Default)]
pub struct BoundsCache {
    candidates: Vec<Candidate>,
    skipped: usize,
}

impl BoundsCache {
    /// Parse every entity once, keeping input order and skipping the ones
    /// without a usable geometry
    pub fn build(entities: &[Entity]) -> Self {
        let mut cache = Self::default();
        for (source, entity) in entities.iter().enumerate() {
            match parse(entity) {
                Some(geometry) => {
                    let bounds = geometry.bounds();
                    cache.candidates.push(Candidate { source, geometry, bounds });
                }
                None => {
                    tracing::debug!("Skipping linear asset {}: no usable coordinates", entity.id);
                    cache.skipped += 1;
                }
            }
        }
        cache
    }

    /// Candidates in input order
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Number of entities without a usable geometry
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
