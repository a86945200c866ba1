//! InfraRisk Geo - Geometry parsing, buffering, and conflict detection
//!
//! This crate is the spatial engine: it turns loosely typed entity
//! coordinates into geometries, wraps area assets in tolerance buffers,
//! prefilters candidate pairs by bounding box, runs the exact intersection
//! test, and classifies each hit.

pub mod buffer;
pub mod conflict;
pub mod index;
pub mod intersect;
pub mod models;
pub mod parse;
pub mod prefilter;
pub mod risk;

pub use buffer::{buffer, buffer_with, BufferShape, BufferedGeometry, DEGREES_PER_METER};
pub use conflict::{detect, detect_conflicts};
pub use index::CandidateIndex;
pub use intersect::intersects;
pub use parse::{parse, parse_coordinates};
pub use prefilter::{prefilter, BoundsCache, Candidate};
pub use risk::{classify, risk_level};
