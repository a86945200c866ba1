//! Geometry construction from loosely typed coordinate payloads
//!
//! The catalog delivers coordinates in many shapes: a bare `[lon, lat]`
//! pair, a list of pairs, a list of `{lat, lon}` objects, a GeoJSON-like
//! object, or a Python-literal string such as `"[(132.4, 34.4)]"`. Parsing
//! never fails loudly; anything ambiguous yields `None` and the entity is
//! left out of spatial analysis.

use crate::models::{Entity, Geometry};
use infrarisk_core::models::coerce_f64;
use serde_json::{Map, Value};

const LAT_KEYS: [&str; 2] = ["lat", "latitude"];
const LON_KEYS: [&str; 3] = ["lon", "lng", "longitude"];

/// Build the geometry of an entity.
///
/// The structured `coordinates` field wins whenever it is present; the
/// legacy top-level `lat`/`lon` scalars are used only when it is absent.
pub fn parse(entity: &Entity) -> Option<Geometry> {
    match &entity.coordinates {
        Some(payload) if !payload.is_null() => {
            parse_coordinates(payload).and_then(Geometry::from_coords)
        }
        _ => {
            let lat = entity.lat.as_ref().and_then(coerce_f64)?;
            let lon = entity.lon.as_ref().and_then(coerce_f64)?;
            Some(Geometry::point(lon, lat))
        }
    }
}

/// Extract an ordered list of `[lon, lat]` pairs from a raw payload
pub fn parse_coordinates(payload: &Value) -> Option<Vec<[f64; 2]>> {
    match payload {
        Value::String(text) => parse_value(&parse_literal(text)?, true),
        other => parse_value(other, true),
    }
}

fn parse_value(value: &Value, allow_nesting: bool) -> Option<Vec<[f64; 2]>> {
    match value {
        Value::Array(items) if items.is_empty() => None,
        Value::Array(items) => {
            if let Some(pair) = parse_pair(value) {
                return Some(vec![pair]);
            }
            // A single wrapped sequence: [[[lon, lat], ...]]
            if let [Value::Array(inner)] = items.as_slice() {
                if allow_nesting && inner.iter().all(Value::is_array) {
                    return parse_value(&items[0], false);
                }
            }
            items.iter().map(parse_pair).collect()
        }
        Value::Object(map) => match map.get("coordinates") {
            Some(nested) if allow_nesting => parse_value(nested, false),
            Some(_) => None,
            None => parse_object_pair(map).map(|pair| vec![pair]),
        },
        _ => None,
    }
}

/// Parse one coordinate: `[lon, lat]`, `[lon, lat, z]` or `{lat, lon}`
fn parse_pair(value: &Value) -> Option<[f64; 2]> {
    match value {
        Value::Array(items) if (2..=3).contains(&items.len()) => {
            if items.iter().any(|v| v.is_array() || v.is_object()) {
                return None;
            }
            let lon = coerce_f64(&items[0])?;
            let lat = coerce_f64(&items[1])?;
            Some([lon, lat])
        }
        Value::Object(map) => parse_object_pair(map),
        _ => None,
    }
}

fn parse_object_pair(map: &Map<String, Value>) -> Option<[f64; 2]> {
    let lat = LAT_KEYS.iter().find_map(|k| map.get(*k)).and_then(coerce_f64)?;
    let lon = LON_KEYS.iter().find_map(|k| map.get(*k)).and_then(coerce_f64)?;
    Some([lon, lat])
}

/// Read a Python-literal list/tuple string as JSON.
///
/// Tuples become arrays, single quotes become double quotes, and
/// `None`/`True`/`False` map to their JSON spellings. Trailing commas are
/// dropped. Anything that is still not valid JSON afterwards is rejected.
fn parse_literal(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut json = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        match ch {
            '(' => json.push('['),
            ')' => json.push(']'),
            '\'' => json.push('"'),
            other => json.push(other),
        }
    }
    let json = json.replace("None", "null").replace("True", "true").replace("False", "false");

    serde_json::from_str(&strip_trailing_commas(&json)).ok()
}

fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_comma = false;
    for ch in text.chars() {
        match ch {
            ',' => {
                if pending_comma {
                    out.push(',');
                }
                pending_comma = true;
            }
            ']' | '}' => {
                pending_comma = false;
                out.push(ch);
            }
            c if c.is_whitespace() => out.push(c),
            c => {
                if pending_comma {
                    out.push(',');
                    pending_comma = false;
                }
                out.push(c);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssetCategory;
    use serde_json::json;

    fn entity_with(payload: Value) -> Entity {
        Entity::new("e-1", AssetCategory::LinearAsset).with_raw_coordinates(payload)
    }

    #[test]
    fn test_single_pair_is_point() {
        let geom = parse(&Entity::area("a", &[(1.0, 2.0)])).unwrap();
        assert_eq!(geom, Geometry::point(1.0, 2.0));
    }

    #[test]
    fn test_pairs_form_polyline_in_order() {
        let coords = [(3.0, 3.0), (1.0, 1.0), (1.0, 1.0), (2.0, 2.0)];
        let geom = parse(&Entity::linear("l", &coords)).unwrap();
        assert_eq!(
            geom.coords(),
            &[[3.0, 3.0], [1.0, 1.0], [1.0, 1.0], [2.0, 2.0]]
        );
    }

    #[test]
    fn test_raw_numeric_pair() {
        let geom = parse(&entity_with(json!([132.4, 34.4]))).unwrap();
        assert_eq!(geom, Geometry::point(132.4, 34.4));

        let geom = parse(&entity_with(json!(["132.4", "34.4"]))).unwrap();
        assert_eq!(geom, Geometry::point(132.4, 34.4));
    }

    #[test]
    fn test_lat_lon_objects() {
        let payload = json!([{ "lat": 34.4, "lon": 132.4 }, { "latitude": "34.5", "lng": 132.5 }]);
        let geom = parse(&entity_with(payload)).unwrap();
        assert_eq!(geom.coords(), &[[132.4, 34.4], [132.5, 34.5]]);

        let geom = parse(&entity_with(json!({ "lat": 2.0, "lon": 1.0 }))).unwrap();
        assert_eq!(geom, Geometry::point(1.0, 2.0));
    }

    #[test]
    fn test_nested_and_geojson_payloads() {
        let nested = json!([[[0.0, 0.0], [1.0, 1.0]]]);
        assert_eq!(parse(&entity_with(nested)).unwrap().coords().len(), 2);

        let geojson = json!({ "type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]] });
        assert_eq!(parse(&entity_with(geojson)).unwrap().coords().len(), 2);
    }

    #[test]
    fn test_python_literal_strings() {
        let geom = parse(&entity_with(json!("[(132.4, 34.4), (132.41, 34.41)]"))).unwrap();
        assert_eq!(geom.coords(), &[[132.4, 34.4], [132.41, 34.41]]);

        let geom = parse(&entity_with(json!("(1.5, 2.5,)"))).unwrap();
        assert_eq!(geom, Geometry::point(1.5, 2.5));

        let geom = parse(&entity_with(json!("[{'lat': 34.4, 'lon': 132.4}]"))).unwrap();
        assert_eq!(geom, Geometry::point(132.4, 34.4));
    }

    #[test]
    fn test_malformed_payloads_yield_none() {
        let cases = vec![
            json!([]),
            json!(""),
            json!("not coordinates"),
            json!("[(1.0, None)]"),
            json!([[1.0, 2.0], "x"]),
            json!([[1.0, 2.0], [3.0]]),
            json!({ "lat": 1.0 }),
            json!(42),
            json!(true),
            json!([1.0, 2.0, 3.0, 4.0]),
            json!(["NaN", 1.0]),
        ];

        for payload in cases {
            assert!(parse(&entity_with(payload.clone())).is_none(), "payload {} should fail", payload);
        }
    }

    #[test]
    fn test_legacy_lat_lon_fallback() {
        let legacy = Entity::new("b", AssetCategory::AreaAsset).with_legacy_point(1.0, 2.0);
        let structured = Entity::area("b", &[(1.0, 2.0)]);

        assert_eq!(parse(&legacy), parse(&structured));
        assert_eq!(parse(&legacy), Some(Geometry::point(1.0, 2.0)));
    }

    #[test]
    fn test_structured_field_takes_precedence() {
        let entity = Entity::area("b", &[(5.0, 6.0)]).with_legacy_point(1.0, 2.0);
        assert_eq!(parse(&entity), Some(Geometry::point(5.0, 6.0)));

        // A present but unusable structured field does not fall back
        let entity = entity_with(json!("garbage")).with_legacy_point(1.0, 2.0);
        assert!(parse(&entity).is_none());

        // Explicit null counts as absent
        let entity = entity_with(Value::Null).with_legacy_point("1.0", "2.0");
        assert_eq!(parse(&entity), Some(Geometry::point(1.0, 2.0)));
    }

    #[test]
    fn test_missing_everything() {
        assert!(parse(&Entity::new("x", AssetCategory::LinearAsset)).is_none());
    }
}
