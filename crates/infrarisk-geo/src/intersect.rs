use crate::models::{to_geo_point, to_line_string, Geometry};
use geo::{Intersects, MultiPolygon};

/// Exact intersection test between a buffer region and a candidate geometry.
///
/// The buffer is closed: touching the boundary counts, as does lying wholly
/// inside it.
pub fn intersects(polygon: &MultiPolygon<f64>, geometry: &Geometry) -> bool {
    match geometry {
        Geometry::Point { coordinates } => polygon.intersects(&to_geo_point(*coordinates)),
        Geometry::Polyline { coordinates } => polygon.intersects(&to_line_string(coordinates)),
    }
}
