//! Canonical geometry types used across all infrarisk crates.
//!
//! Coordinates are `[lon, lat]` in decimal degrees. These types bridge the
//! loosely typed catalog payloads and the computational `geo` crate types.

use serde::{Deserialize, Serialize};

/// Geometry type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GeometryType {
    #[default]
    Point,
    Polyline,
}

/// Point or polyline geometry derived from an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
    Polyline { coordinates: Vec<[f64; 2]> },
}

impl Geometry {
    /// Create a Point geometry
    pub fn point(lon: f64, lat: f64) -> Self {
        Geometry::Point { coordinates: [lon, lat] }
    }

    /// Create a Polyline geometry; `None` unless at least two vertices are given
    pub fn polyline(coords: Vec<[f64; 2]>) -> Option<Self> {
        if coords.len() < 2 {
            return None;
        }
        Some(Geometry::Polyline { coordinates: coords })
    }

    /// Build the geometry implied by a vertex count: one pair is a point,
    /// two or more a polyline, none is nothing
    pub fn from_coords(mut coords: Vec<[f64; 2]>) -> Option<Self> {
        match coords.len() {
            0 => None,
            1 => coords.pop().map(|[lon, lat]| Geometry::point(lon, lat)),
            _ => Geometry::polyline(coords),
        }
    }

    /// Get the geometry type
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Point { .. } => GeometryType::Point,
            Geometry::Polyline { .. } => GeometryType::Polyline,
        }
    }

    /// All vertices in input order
    pub fn coords(&self) -> &[[f64; 2]] {
        match self {
            Geometry::Point { coordinates } => std::slice::from_ref(coordinates),
            Geometry::Polyline { coordinates } => coordinates,
        }
    }

    /// Axis-aligned bounding box of the vertices
    pub fn bounds(&self) -> Bounds {
        // Both variants are non-empty by construction.
        Bounds::from_coords(self.coords()).unwrap_or_else(|| Bounds::point(0.0, 0.0))
    }
}

/// Axis-aligned bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bounds {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self { min_lon, min_lat, max_lon, max_lat }
    }

    /// Degenerate box around a single coordinate
    pub fn point(lon: f64, lat: f64) -> Self {
        Self::new(lon, lat, lon, lat)
    }

    /// Smallest box covering all coordinates
    pub fn from_coords(coords: &[[f64; 2]]) -> Option<Self> {
        let (first, rest) = coords.split_first()?;
        let mut bounds = Self::point(first[0], first[1]);
        for c in rest {
            bounds.min_lon = bounds.min_lon.min(c[0]);
            bounds.min_lat = bounds.min_lat.min(c[1]);
            bounds.max_lon = bounds.max_lon.max(c[0]);
            bounds.max_lat = bounds.max_lat.max(c[1]);
        }
        Some(bounds)
    }

    /// Closed overlap test: boxes overlap unless strictly separated on an axis
    pub fn overlaps(&self, other: &Bounds) -> bool {
        let separated = self.max_lon < other.min_lon
            || other.max_lon < self.min_lon
            || self.max_lat < other.min_lat
            || other.max_lat < self.min_lat;
        !separated
    }

    pub fn min(&self) -> [f64; 2] {
        [self.min_lon, self.min_lat]
    }

    pub fn max(&self) -> [f64; 2] {
        [self.max_lon, self.max_lat]
    }
}
