//! Geometry models for infrarisk-geo.
//!
//! This module re-exports canonical types from `infrarisk-core` and provides
//! the conversions to and from the `geo` crate.

use geo::algorithm::bounding_rect::BoundingRect;
use geo::{Coord, LineString, MultiPolygon, Point, Rect};

// Re-export canonical types from infrarisk-core
pub use infrarisk_core::models::{AssetCategory, Bounds, Entity, Geometry, GeometryType};

/// Convert a `[lon, lat]` pair to a geo coordinate
pub fn to_coord(c: [f64; 2]) -> Coord<f64> {
    Coord { x: c[0], y: c[1] }
}

pub fn to_geo_point(c: [f64; 2]) -> Point<f64> {
    Point::from(to_coord(c))
}

pub fn to_line_string(coords: &[[f64; 2]]) -> LineString<f64> {
    LineString::new(coords.iter().copied().map(to_coord).collect())
}

/// Convert a geo rectangle to canonical bounds
pub fn bounds_from_rect(rect: &Rect<f64>) -> Bounds {
    let (min, max) = (rect.min(), rect.max());
    Bounds::new(min.x, min.y, max.x, max.y)
}

/// Bounding box of a polygon set; `None` for an empty set
pub fn polygon_bounds(polygon: &MultiPolygon<f64>) -> Option<Bounds> {
    polygon.bounding_rect().map(|rect| bounds_from_rect(&rect))
}
