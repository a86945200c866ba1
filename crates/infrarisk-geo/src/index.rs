use crate::models::Bounds;
use crate::prefilter::Candidate;
use rstar::{RTree, RTreeObject, AABB};

/// Candidate bounds keyed by position in the candidate list
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedBounds {
    /// Position of the candidate in the run's candidate list
    pub id: usize,

    /// Bounding box for spatial indexing
    envelope: AABB<[f64; 2]>,
}

impl IndexedBounds {
    pub fn new(id: usize, bounds: &Bounds) -> Self {
        Self { id, envelope: to_envelope(bounds) }
    }
}

impl RTreeObject for IndexedBounds {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn to_envelope(bounds: &Bounds) -> AABB<[f64; 2]> {
    AABB::from_corners(bounds.min(), bounds.max())
}

/// R-tree over candidate bounds.
///
/// Queries return candidate positions in ascending order, so iterating them
/// visits candidates in input order exactly like a pairwise scan would.
pub struct CandidateIndex {
    tree: RTree<IndexedBounds>,
}

impl CandidateIndex {
    /// Bulk-load the index from a run's candidates
    pub fn from_candidates(candidates: &[Candidate]) -> Self {
        let indexed: Vec<IndexedBounds> = candidates
            .iter()
            .enumerate()
            .map(|(id, candidate)| IndexedBounds::new(id, &candidate.bounds))
            .collect();

        Self { tree: RTree::bulk_load(indexed) }
    }

    /// Positions of all candidates whose box overlaps `bounds`, touching
    /// edges included, in ascending order
    pub fn query(&self, bounds: &Bounds) -> Vec<usize> {
        let mut ids: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&to_envelope(bounds))
            .map(|indexed| indexed.id)
            .collect();
        ids.sort_unstable();
        ids
    }
}
