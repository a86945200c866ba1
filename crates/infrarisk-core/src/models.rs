pub mod entity;
pub mod geometry;
pub mod report;

pub use entity::{coerce_condition_code, coerce_f64, AssetCategory, Entity};
pub use geometry::{Bounds, Geometry, GeometryType};
pub use report::{AnalysisReport, AnalysisStats, MatchRecord, RiskLevel};
