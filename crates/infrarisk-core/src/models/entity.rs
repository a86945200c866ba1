//! Normalized infrastructure entities.
//!
//! An [`Entity`] is the only shape the conflict engine consumes. The
//! coordinate, width and condition fields stay loosely typed because the
//! upstream catalog delivers them as numbers, numeric strings, nested lists
//! or Python-literal strings; interpretation happens at the point of use.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Role an entity plays in conflict detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AssetCategory {
    /// Asset buffered by its physical width (bridges, road segments)
    #[default]
    AreaAsset,
    /// Asset tested against buffered area assets (pipes, conduits)
    LinearAsset,
}

impl AssetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::AreaAsset => "area",
            AssetCategory::LinearAsset => "linear",
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized infrastructure record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Catalog identifier
    pub id: String,

    pub category: AssetCategory,

    /// Human-readable name (facility name, title)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Structured coordinate payload: a pair, a list of pairs, a list of
    /// `{lat, lon}` objects, or a literal string encoding one of those
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Value>,

    /// Legacy single-point latitude, used only when `coordinates` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<Value>,

    /// Legacy single-point longitude, used only when `coordinates` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<Value>,

    /// Physical width in meters (area assets only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_m: Option<Value>,

    /// Inspection rating, 1 (best) to 4 (worst)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_code: Option<Value>,

    /// Passthrough attributes not covered by the fields above
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
}

impl Entity {
    /// Create an entity with no coordinates or attributes
    pub fn new(id: impl Into<String>, category: AssetCategory) -> Self {
        Self {
            id: id.into(),
            category,
            label: None,
            coordinates: None,
            lat: None,
            lon: None,
            width_m: None,
            condition_code: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Create an area asset from `(lon, lat)` pairs
    pub fn area(id: impl Into<String>, coords: &[(f64, f64)]) -> Self {
        Self::new(id, AssetCategory::AreaAsset).with_coords(coords)
    }

    /// Create a linear asset from `(lon, lat)` pairs
    pub fn linear(id: impl Into<String>, coords: &[(f64, f64)]) -> Self {
        Self::new(id, AssetCategory::LinearAsset).with_coords(coords)
    }

    /// Set the structured coordinates from `(lon, lat)` pairs
    pub fn with_coords(mut self, coords: &[(f64, f64)]) -> Self {
        let pairs = coords.iter().map(|(lon, lat)| serde_json::json!([lon, lat])).collect();
        self.coordinates = Some(Value::Array(pairs));
        self
    }

    /// Set the raw coordinate payload
    pub fn with_raw_coordinates(mut self, payload: Value) -> Self {
        self.coordinates = Some(payload);
        self
    }

    /// Set the legacy top-level latitude/longitude fields
    pub fn with_legacy_point(mut self, lon: impl Into<Value>, lat: impl Into<Value>) -> Self {
        self.lon = Some(lon.into());
        self.lat = Some(lat.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_width(mut self, width: impl Into<Value>) -> Self {
        self.width_m = Some(width.into());
        self
    }

    pub fn with_condition(mut self, code: impl Into<Value>) -> Self {
        self.condition_code = Some(code.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Width in meters, or `default` when missing or not a usable number
    pub fn width_or(&self, default: f64) -> f64 {
        self.width_m
            .as_ref()
            .and_then(coerce_f64)
            .filter(|w| *w >= 0.0)
            .unwrap_or(default)
    }

    /// Condition code as an integer, if present and numeric
    pub fn condition(&self) -> Option<u8> {
        self.condition_code.as_ref().and_then(coerce_condition_code)
    }

    /// Condition rating exactly as delivered, rendered as text
    pub fn condition_text(&self) -> Option<String> {
        self.condition_code.as_ref().and_then(value_text)
    }

    /// Label for reports, falling back to the id
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    /// Look up a passthrough attribute rendered as a plain string
    pub fn attribute_text(&self, key: &str) -> Option<String> {
        self.attributes.get(key).and_then(value_text)
    }
}

/// Coerce a loosely typed scalar to a finite float.
///
/// Numbers pass through; strings are trimmed and parsed. Everything else,
/// including NaN and infinities, yields `None`.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Coerce a loosely typed condition rating to an integer code.
///
/// Accepts integers, integral floats and numeric strings. Fractional or
/// out-of-range values yield `None`.
pub fn coerce_condition_code(value: &Value) -> Option<u8> {
    let number = coerce_f64(value)?;
    if number.fract() != 0.0 || !(0.0..=f64::from(u8::MAX)).contains(&number) {
        return None;
    }
    Some(number as u8)
}

/// Render a scalar JSON value as text; null and empty strings are absent
pub(crate) fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_f64() {
        assert_eq!(coerce_f64(&json!(4.5)), Some(4.5));
        assert_eq!(coerce_f64(&json!(" 7.25 ")), Some(7.25));
        assert_eq!(coerce_f64(&json!("wide")), None);
        assert_eq!(coerce_f64(&json!("NaN")), None);
        assert_eq!(coerce_f64(&Value::Null), None);
        assert_eq!(coerce_f64(&json!([1.0])), None);
    }

    #[test]
    fn test_coerce_condition_code() {
        assert_eq!(coerce_condition_code(&json!(3)), Some(3));
        assert_eq!(coerce_condition_code(&json!("4")), Some(4));
        assert_eq!(coerce_condition_code(&json!(2.0)), Some(2));
        assert_eq!(coerce_condition_code(&json!(2.5)), None);
        assert_eq!(coerce_condition_code(&json!(-1)), None);
        assert_eq!(coerce_condition_code(&json!("III")), None);
    }

    #[test]
    fn test_width_defaults() {
        let entity = Entity::area("B-1", &[(132.4, 34.4)]);
        assert_eq!(entity.width_or(4.0), 4.0);

        let entity = entity.with_width("12.5");
        assert_eq!(entity.width_or(4.0), 12.5);

        let entity = Entity::area("B-2", &[(132.4, 34.4)]).with_width("unknown");
        assert_eq!(entity.width_or(4.0), 4.0);

        let entity = Entity::area("B-3", &[(132.4, 34.4)]).with_width(-3.0);
        assert_eq!(entity.width_or(4.0), 4.0);
    }

    #[test]
    fn test_entity_serialization() {
        let entity = Entity::linear("P-1", &[(132.4, 34.4), (132.41, 34.41)])
            .with_attribute("installation_year", 1978);

        let json = serde_json::to_string(&entity).unwrap();
        assert!(json.contains("LinearAsset"));
        assert!(!json.contains("width_m"));

        let parsed: Entity = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entity);
    }

    #[test]
    fn test_null_fields_deserialize_as_absent() {
        let parsed: Entity = serde_json::from_value(json!({
            "id": "B-9",
            "category": "AreaAsset",
            "coordinates": null,
            "lat": 34.4,
            "lon": 132.4,
            "condition_code": null
        }))
        .unwrap();

        assert!(parsed.coordinates.is_none());
        assert!(parsed.condition_code.is_none());
        assert_eq!(parsed.display_label(), "B-9");
    }
}
