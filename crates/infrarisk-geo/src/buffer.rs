//! Tolerance buffers around area assets
//!
//! Distances are converted with a flat `1 / 111_000` degrees-per-meter
//! factor. By default the longitude axis is additionally stretched by
//! `1 / cos(latitude)` at each vertex, turning the circle into the ellipse
//! that covers the same ground distance east-west; with the stretch turned
//! off both axes share the flat factor.
//!
//! Circles are approximated by regular polygons that circumscribe the true
//! circle grown by `BOUNDARY_TOLERANCE_M`, so every point within `radius` of
//! the geometry lies inside the buffer even after coordinate rounding. The
//! tangent points at edge midpoints would otherwise sit exactly on an edge.
//! Polylines are buffered segment by segment: each segment becomes
//! the convex hull of the polygons around its two endpoints, and the buffer
//! is the union of those capsules.

use crate::models::{polygon_bounds, to_coord, Bounds, Geometry};
use geo::{ConvexHull, Coord, LineString, MultiPoint, MultiPolygon, Point, Polygon};
use infrarisk_core::config::{
    AnalysisConfig, DEFAULT_BUFFER_SEGMENTS, DEFAULT_SCALE_LONGITUDE, MIN_BUFFER_SEGMENTS,
};
use std::f64::consts::PI;

/// Length of one degree, in meters
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Angular size of one meter, in degrees
pub const DEGREES_PER_METER: f64 = 1.0 / METERS_PER_DEGREE;

/// Smallest buffer radius, in meters; keeps zero-width buffers non-degenerate
pub const MIN_RADIUS_M: f64 = 0.001;

/// Extra reach added to every buffer, in meters (0.1 mm)
pub const BOUNDARY_TOLERANCE_M: f64 = 1e-4;

/// Floor for `cos(latitude)`; caps the longitude stretch near the poles
const MIN_LATITUDE_COS: f64 = 0.01;

/// Convert meters to degrees with the flat approximation
pub fn meters_to_degrees(meters: f64) -> f64 {
    meters * DEGREES_PER_METER
}

/// Buffer radius for a physical width plus slack, in meters
pub fn buffer_radius_m(width_m: f64, slack_m: f64) -> f64 {
    (width_m / 2.0 + slack_m).max(MIN_RADIUS_M)
}

/// Factor applied to longitude offsets at `lat`
pub fn longitude_stretch(lat: f64, scale_longitude: bool) -> f64 {
    if scale_longitude {
        1.0 / lat.to_radians().cos().abs().max(MIN_LATITUDE_COS)
    } else {
        1.0
    }
}

/// Polygonization settings for buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferShape {
    /// Vertices per full circle, raised to the minimum when lower
    pub segments: usize,
    pub scale_longitude: bool,
}

impl BufferShape {
    /// Shape with both axes sharing the flat conversion factor
    pub fn flat(segments: usize) -> Self {
        Self { segments, scale_longitude: false }
    }
}

impl Default for BufferShape {
    fn default() -> Self {
        Self { segments: DEFAULT_BUFFER_SEGMENTS, scale_longitude: DEFAULT_SCALE_LONGITUDE }
    }
}

impl From<&AnalysisConfig> for BufferShape {
    fn from(config: &AnalysisConfig) -> Self {
        Self { segments: config.buffer_segments, scale_longitude: config.scale_longitude }
    }
}

/// Buffer a geometry by `width_m / 2 + slack_m` meters
pub fn buffer(geometry: &Geometry, width_m: f64, slack_m: f64) -> MultiPolygon<f64> {
    buffer_with(geometry, width_m, slack_m, &BufferShape::default())
}

/// Buffer a geometry with explicit polygonization settings
pub fn buffer_with(
    geometry: &Geometry,
    width_m: f64,
    slack_m: f64,
    shape: &BufferShape,
) -> MultiPolygon<f64> {
    let radius = meters_to_degrees(buffer_radius_m(width_m, slack_m) + BOUNDARY_TOLERANCE_M);
    let ring = Ring {
        radius,
        segments: shape.segments.max(MIN_BUFFER_SEGMENTS),
        scale_longitude: shape.scale_longitude,
    };

    match geometry {
        Geometry::Point { coordinates } => {
            MultiPolygon::new(vec![ring.disk(to_coord(*coordinates))])
        }
        Geometry::Polyline { coordinates } => {
            let capsules = coordinates
                .windows(2)
                .map(|pair| ring.capsule(to_coord(pair[0]), to_coord(pair[1])))
                .collect();
            MultiPolygon::new(capsules)
        }
    }
}

/// An area asset wrapped in its tolerance buffer
#[derive(Debug, Clone)]
pub struct BufferedGeometry {
    /// Closed buffer region
    pub polygon: MultiPolygon<f64>,

    /// Bounding box of `polygon`
    pub bounds: Bounds,

    /// Index of the source entity in the input slice
    pub source: usize,

    /// Radius the buffer was built with, in meters
    pub radius_m: f64,
}

impl BufferedGeometry {
    /// Buffer `geometry` on behalf of the entity at `source`
    pub fn new(
        source: usize,
        geometry: &Geometry,
        width_m: f64,
        slack_m: f64,
        shape: &BufferShape,
    ) -> Self {
        let radius_m = buffer_radius_m(width_m, slack_m);
        let polygon = buffer_with(geometry, width_m, slack_m, shape);
        // A parsed geometry always yields at least one polygon
        let bounds = polygon_bounds(&polygon).unwrap_or_else(|| geometry.bounds());

        Self { polygon, bounds, source, radius_m }
    }
}

/// Circle polygonization for one buffer
struct Ring {
    radius: f64,
    segments: usize,
    scale_longitude: bool,
}

impl Ring {
    /// Regular polygon circumscribing the circle around `center`
    fn disk(&self, center: Coord<f64>) -> Polygon<f64> {
        let mut ring = self.vertices(center);
        if let Some(first) = ring.first().copied() {
            ring.push(first);
        }
        Polygon::new(LineString::new(ring), vec![])
    }

    /// Convex hull of the circles around both segment endpoints
    fn capsule(&self, start: Coord<f64>, end: Coord<f64>) -> Polygon<f64> {
        let points: Vec<Point<f64>> = self
            .vertices(start)
            .into_iter()
            .chain(self.vertices(end))
            .map(Point::from)
            .collect();
        MultiPoint::new(points).convex_hull()
    }

    fn vertices(&self, center: Coord<f64>) -> Vec<Coord<f64>> {
        // Vertex distance for which the inscribed circle has `radius`
        let outer = self.radius / (PI / self.segments as f64).cos();
        let stretch = longitude_stretch(center.y, self.scale_longitude);
        (0..self.segments)
            .map(|i| {
                let angle = 2.0 * PI * i as f64 / self.segments as f64;
                Coord {
                    x: center.x + outer * stretch * angle.cos(),
                    y: center.y + outer * angle.sin(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intersect::intersects;
    use geo::{Area, Contains, Intersects};

    const LON: f64 = 132.40;
    const LAT: f64 = 34.40;

    fn flat() -> BufferShape {
        BufferShape::flat(DEFAULT_BUFFER_SEGMENTS)
    }

    #[test]
    fn test_radius_from_width_and_slack() {
        assert_eq!(buffer_radius_m(10.0, 0.5), 5.5);
        assert_eq!(buffer_radius_m(4.0, 0.0), 2.0);
        assert_eq!(buffer_radius_m(0.0, 0.0), MIN_RADIUS_M);
        assert!((meters_to_degrees(111_000.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_longitude_stretch() {
        assert_eq!(longitude_stretch(LAT, false), 1.0);
        assert_eq!(longitude_stretch(0.0, true), 1.0);
        assert!((longitude_stretch(60.0, true) - 2.0).abs() < 1e-9);
        assert!(longitude_stretch(90.0, true) <= 1.0 / MIN_LATITUDE_COS + 1e-9);
    }

    #[test]
    fn test_flat_point_buffer_contains_circle() {
        let center = Geometry::point(LON, LAT);
        let polygon = buffer_with(&center, 10.0, 0.5, &flat());
        let radius = meters_to_degrees(5.5);

        assert_eq!(polygon.0.len(), 1);
        for step in 0..16 {
            let angle = 2.0 * PI * step as f64 / 16.0;
            let on_circle = Point::new(LON + radius * angle.cos(), LAT + radius * angle.sin());
            assert!(polygon.intersects(&on_circle), "missed boundary point at step {}", step);
        }

        let outside = Point::new(LON + radius * 1.01, LAT);
        assert!(!polygon.intersects(&outside));
    }

    /// Points exactly `radius_m` from `center`, in the directions of the
    /// polygon's edge midpoints
    fn tangent_points(center: [f64; 2], radius_m: f64, shape: &BufferShape) -> Vec<Geometry> {
        let radius = meters_to_degrees(radius_m);
        let stretch = longitude_stretch(center[1], shape.scale_longitude);
        let n = shape.segments as f64;
        (0..shape.segments)
            .map(|k| {
                let angle = PI / n + 2.0 * PI * k as f64 / n;
                Geometry::point(
                    center[0] + radius * stretch * angle.cos(),
                    center[1] + radius * angle.sin(),
                )
            })
            .collect()
    }

    #[test]
    fn test_point_buffer_keeps_edge_midpoint_directions() {
        let centers =
            [[LON, LAT], [0.0, 0.0], [139.6917, 35.6895], [-73.9857, 40.7484], [18.4, -33.9]];
        for scale_longitude in [false, true] {
            let shape = BufferShape { segments: DEFAULT_BUFFER_SEGMENTS, scale_longitude };
            for center in centers {
                for width in [0.0, 4.0, 10.0, 25.0] {
                    let origin = Geometry::point(center[0], center[1]);
                    let polygon = buffer_with(&origin, width, 0.5, &shape);
                    for point in tangent_points(center, buffer_radius_m(width, 0.5), &shape) {
                        assert!(
                            intersects(&polygon, &point),
                            "missed {:?} (width {}, scaled {})",
                            point,
                            width,
                            scale_longitude
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_capsule_keeps_edge_midpoint_directions() {
        let start = [LON, LAT];
        let end = [LON + 0.001, LAT + 0.0005];
        let line = Geometry::polyline(vec![start, end]).unwrap();

        for scale_longitude in [false, true] {
            let shape = BufferShape { segments: DEFAULT_BUFFER_SEGMENTS, scale_longitude };
            let polygon = buffer_with(&line, 10.0, 0.5, &shape);
            for endpoint in [start, end] {
                for point in tangent_points(endpoint, 5.5, &shape) {
                    assert!(intersects(&polygon, &point), "missed {:?}", point);
                }
            }
        }

        // Beside the middle of the segment, exactly one radius away
        let polygon = buffer_with(&line, 10.0, 0.5, &flat());
        let (dx, dy) = (end[0] - start[0], end[1] - start[1]);
        let length = dx.hypot(dy);
        let radius = meters_to_degrees(5.5);
        let middle = [(start[0] + end[0]) / 2.0, (start[1] + end[1]) / 2.0];
        let side =
            Geometry::point(middle[0] - dy / length * radius, middle[1] + dx / length * radius);
        assert!(intersects(&polygon, &side));
    }

    #[test]
    fn test_scaled_point_buffer_is_stretched_east_west() {
        let center = Geometry::point(LON, LAT);
        let polygon = buffer(&center, 10.0, 0.5);
        let radius = meters_to_degrees(5.5);
        let east = radius * longitude_stretch(LAT, true);

        assert!(polygon.intersects(&Point::new(LON, LAT + radius)));
        assert!(!polygon.intersects(&Point::new(LON, LAT + radius * 1.01)));
        assert!(polygon.intersects(&Point::new(LON + east, LAT)));
        assert!(!polygon.intersects(&Point::new(LON + east * 1.01, LAT)));

        // Never smaller than the flat buffer
        let flat_polygon = buffer_with(&center, 10.0, 0.5, &flat());
        assert!(polygon.0[0].contains(&flat_polygon.0[0]));
    }

    #[test]
    fn test_polyline_buffer_is_corridor() {
        let line = Geometry::polyline(vec![[LON, LAT], [LON + 0.01, LAT]]).unwrap();
        let polygon = buffer_with(&line, 4.0, 0.5, &flat());
        let radius = meters_to_degrees(2.5);

        assert_eq!(polygon.0.len(), 1);
        // Beside the middle of the segment
        assert!(polygon.intersects(&Point::new(LON + 0.005, LAT + radius)));
        assert!(!polygon.intersects(&Point::new(LON + 0.005, LAT + radius * 1.05)));
        // Rounded end caps
        assert!(polygon.intersects(&Point::new(LON - radius, LAT)));
        assert!(!polygon.intersects(&Point::new(LON - radius * 1.05, LAT)));
    }

    #[test]
    fn test_polyline_buffer_has_one_capsule_per_segment() {
        let line =
            Geometry::polyline(vec![[0.0, 0.0], [0.001, 0.0], [0.001, 0.001], [0.001, 0.001]])
                .unwrap();
        assert_eq!(buffer(&line, 4.0, 0.5).0.len(), 3);
    }

    #[test]
    fn test_larger_width_contains_smaller() {
        let center = Geometry::point(LON, LAT);
        let small = buffer(&center, 4.0, 0.5);
        let large = buffer(&center, 12.0, 0.5);

        assert!(large.0[0].contains(&small.0[0]));
        assert!(large.unsigned_area() > small.unsigned_area());
    }

    #[test]
    fn test_more_segments_stay_circumscribed() {
        let center = Geometry::point(0.0, 0.0);
        let coarse = buffer_with(&center, 2.0, 0.0, &BufferShape::flat(8));
        let fine = buffer_with(&center, 2.0, 0.0, &BufferShape::flat(256));
        let r = meters_to_degrees(1.0);

        // Both contain the true disk, the coarse one with more excess
        assert!(coarse.unsigned_area() > fine.unsigned_area());
        assert!(fine.unsigned_area() >= PI * r * r);
    }

    #[test]
    fn test_segments_below_minimum_are_raised() {
        let center = Geometry::point(0.0, 0.0);
        let polygon = buffer_with(&center, 2.0, 0.0, &BufferShape::flat(3));
        // Closed ring: one repeated vertex
        assert_eq!(polygon.0[0].exterior().0.len(), MIN_BUFFER_SEGMENTS + 1);
    }

    #[test]
    fn test_buffered_geometry_bounds() {
        let center = Geometry::point(LON, LAT);
        let buffered = BufferedGeometry::new(3, &center, 10.0, 0.5, &flat());
        let radius = meters_to_degrees(5.5);

        assert_eq!(buffered.source, 3);
        assert_eq!(buffered.radius_m, 5.5);
        assert!(buffered.bounds.min_lon <= LON - radius);
        assert!(buffered.bounds.max_lat >= LAT + radius);
        assert!(buffered.bounds.max_lon < LON + radius * 1.01);
    }

    #[test]
    fn test_shape_from_config() {
        let config = AnalysisConfig { buffer_segments: 16, ..AnalysisConfig::default() };
        let shape = BufferShape::from(&config);
        assert_eq!(shape.segments, 16);
        assert!(shape.scale_longitude);
    }
}
