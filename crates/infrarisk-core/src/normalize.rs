//! Catalog record normalization
//!
//! Turns raw catalog search results (top-level `id`/`title`/`lat`/`lon` plus
//! a nested `metadata` object) into [`Entity`] values. Nested metadata is
//! flattened under a `meta` prefix, source keys are translated to stable
//! attribute names per dataset kind, and the fields the conflict engine
//! needs are lifted out of the attribute map.

use crate::error::{InfraRiskError, Result};
use crate::models::entity::value_text;
use crate::models::{coerce_f64, AssetCategory, Entity};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Prefix given to flattened metadata keys
pub const METADATA_PREFIX: &str = "meta";

/// Separator between flattened key segments
pub const KEY_SEPARATOR: &str = "_";

/// Dataset families published by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// Road bridge inspection records
    Bridge,
    /// Road and road-facility records (centerlines, bridges)
    Xroad,
    /// National land sewer pipe network
    Pipe,
    /// Municipal sewer ledger (pipes, manholes)
    Sewage,
    /// Municipal water ledger (mains, hydrants, valves)
    Water,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 5] = [
        DatasetKind::Bridge,
        DatasetKind::Xroad,
        DatasetKind::Pipe,
        DatasetKind::Sewage,
        DatasetKind::Water,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Bridge => "bridge",
            DatasetKind::Xroad => "xroad",
            DatasetKind::Pipe => "pipe",
            DatasetKind::Sewage => "sewage",
            DatasetKind::Water => "water",
        }
    }

    /// Role the dataset plays in conflict detection
    pub fn category(&self) -> AssetCategory {
        match self {
            DatasetKind::Bridge | DatasetKind::Xroad => AssetCategory::AreaAsset,
            DatasetKind::Pipe | DatasetKind::Sewage | DatasetKind::Water => {
                AssetCategory::LinearAsset
            }
        }
    }

    fn labels(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            DatasetKind::Bridge | DatasetKind::Xroad => ROAD_LABELS,
            DatasetKind::Pipe => PIPE_LABELS,
            DatasetKind::Sewage => SEWAGE_LABELS,
            DatasetKind::Water => WATER_LABELS,
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetKind {
    type Err = InfraRiskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "bridge" | "bridges" => Ok(DatasetKind::Bridge),
            "xroad" | "road" => Ok(DatasetKind::Xroad),
            "pipe" | "pipes" => Ok(DatasetKind::Pipe),
            "sewage" | "sewer" => Ok(DatasetKind::Sewage),
            "water" => Ok(DatasetKind::Water),
            _ => Err(InfraRiskError::ConfigInvalid {
                key: "dataset".to_string(),
                reason: format!(
                    "Unknown dataset kind: {}. Use one of: {}",
                    s,
                    DatasetKind::ALL.map(|kind| kind.as_str()).join(", ")
                ),
            }),
        }
    }
}

/// Normalized attribute names the engine reads
pub mod attr {
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const LAT: &str = "lat";
    pub const LON: &str = "lon";
    pub const COORDINATES: &str = "coordinates";
    pub const SPEC_LAT: &str = "spec_lat";
    pub const SPEC_LON: &str = "spec_lon";
    pub const WIDTH: &str = "width";
    pub const CONDITION: &str = "condition";
    pub const INSTALLATION_YEAR: &str = "installation_year";
    pub const MATERIAL: &str = "material";
}

const CATALOG_LABELS: &[(&str, &str)] = &[
    ("meta_DPF:title", "dataset_title"),
    ("meta_DPF:route_name", "route_name_dpf"),
    ("meta_DPF:prefecture_name", "prefecture_dpf"),
    ("meta_DPF:municipality_name", "municipality_dpf"),
    ("meta_DPF:year", "year"),
    ("meta_DPF:dataset_id", "dataset_id"),
    ("meta_DPF:downloadURLs", "download_urls"),
];

const ROAD_LABELS: &[(&str, &str)] = &[
    ("meta_RSDB:syogen_ichi_ido", attr::SPEC_LAT),
    ("meta_RSDB:syogen_ichi_keido", attr::SPEC_LON),
    ("meta_RSDB:syogen_rosen_meisyou", "route_name"),
    ("meta_RSDB:syogen_fukuin", attr::WIDTH),
    ("meta_RSDB:syogen_kanrisya_kubun", "manager_class"),
    ("meta_RSDB:syogen_kanrisya_jimusyo", "manager_office"),
    ("meta_RSDB:syogen_kanrisya_meisyou", "manager"),
    ("meta_RSDB:syogen_kyouchou", "bridge_length"),
    ("meta_RSDB:syogen_shisetsu_meisyou", "facility_name"),
    ("meta_RSDB:syogen_shisetsu_furigana", "facility_name_kana"),
    ("meta_RSDB:syogen_gyousei_kuiki_todoufuken_mei", "prefecture"),
    ("meta_RSDB:syogen_gyousei_kuiki_todoufuken_code", "prefecture_code"),
    ("meta_RSDB:syogen_gyousei_kuiki_shikuchouson_mei", "municipality"),
    ("meta_RSDB:syogen_gyousei_kuiki_shikuchouson_code", "municipality_code"),
    ("meta_RSDB:syogen_kasetsu_nendo", "construction_year"),
    ("meta_RSDB:tenken_nendo", "inspection_year"),
    ("meta_RSDB:tenken_kiroku_hantei_kubun", attr::CONDITION),
    ("meta_RSDB:tenken_syuzen_sochi_joukyou", "repair_status"),
    ("meta_RSDB:shisetsu_id", "facility_id"),
    ("meta_RSDB:kanrisya_code", "manager_code"),
    ("meta_RSDB:shisetsu_kubun", "facility_class"),
    ("meta_RSDB:koushin_nichiji", "updated_at"),
];

const PIPE_LABELS: &[(&str, &str)] = &[
    ("meta_NLNI:W09_001", "pipe_name"),
    ("meta_NLNI:W09_002", "diameter"),
    ("meta_NLNI:W09_003", attr::INSTALLATION_YEAR),
    ("meta_NLNI:W09_004", attr::MATERIAL),
];

const SEWAGE_LABELS: &[(&str, &str)] = &[
    ("meta_type", "kind"),
    ("meta_pipe_material", attr::MATERIAL),
    ("meta_pipe_diameter", "diameter"),
    ("meta_pipe_length", "length"),
    ("meta_installation_year", attr::INSTALLATION_YEAR),
    ("meta_inspection_year", "inspection_year"),
    ("meta_condition", attr::CONDITION),
    ("meta_manhole_id", "manhole_id"),
    ("meta_manhole_type", "manhole_type"),
    ("meta_depth", "depth"),
];

const WATER_LABELS: &[(&str, &str)] = &[
    ("meta_type", "kind"),
    ("meta_pipe_material", attr::MATERIAL),
    ("meta_pipe_diameter", "diameter"),
    ("meta_pipe_length", "length"),
    ("meta_installation_year", attr::INSTALLATION_YEAR),
    ("meta_pressure", "pressure"),
    ("meta_valve_type", "valve_type"),
    ("meta_hydrant_type", "hydrant_type"),
];

/// Flatten nested objects into `prefix{sep}key{sep}subkey` entries.
///
/// Non-object leaves (including arrays) are kept as-is. A non-object input
/// is stored under the bare prefix.
pub fn flatten_metadata(value: &Value, prefix: &str, sep: &str) -> Map<String, Value> {
    let mut out = Map::new();
    flatten_into(value, prefix, sep, &mut out);
    out
}

fn flatten_into(value: &Value, prefix: &str, sep: &str, out: &mut Map<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                let next =
                    if prefix.is_empty() { key.clone() } else { format!("{prefix}{sep}{key}") };
                flatten_into(nested, &next, sep, out);
            }
        }
        leaf => {
            out.insert(prefix.to_string(), leaf.clone());
        }
    }
}

/// Translate a flattened source key to its attribute name for `kind`.
///
/// Unknown keys keep their last `:`-separated segment.
pub fn translate_key(kind: DatasetKind, key: &str) -> String {
    kind.labels()
        .iter()
        .chain(CATALOG_LABELS)
        .find(|(source, _)| *source == key)
        .map(|(_, label)| (*label).to_string())
        .unwrap_or_else(|| match key.rsplit_once(':') {
            Some((_, tail)) => tail.to_string(),
            None => key.to_string(),
        })
}

/// Records that survived normalization plus a count of dropped ones
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub entities: Vec<Entity>,
    pub dropped: usize,
}

/// Normalize one raw catalog search result
pub fn normalize_record(record: &Value, kind: DatasetKind) -> Result<Entity> {
    let object = record.as_object().ok_or_else(|| InfraRiskError::InvalidRecord {
        record: truncate(&record.to_string()),
        reason: "expected a JSON object".to_string(),
    })?;

    let id = object.get(attr::ID).and_then(value_text).ok_or_else(|| {
        InfraRiskError::InvalidRecord {
            record: truncate(&record.to_string()),
            reason: "missing id".to_string(),
        }
    })?;

    // Top-level fields first so flattened metadata never shadows them.
    let mut fields: BTreeMap<String, Value> = BTreeMap::new();
    for (key, value) in object {
        if key == "metadata" {
            continue;
        }
        fields.entry(translate_key(kind, key)).or_insert_with(|| value.clone());
    }

    if let Some(metadata) = object.get("metadata").and_then(metadata_object) {
        for (key, value) in flatten_metadata(&metadata, METADATA_PREFIX, KEY_SEPARATOR) {
            fields.entry(translate_key(kind, &key)).or_insert(value);
        }
    }

    fields.remove(attr::ID);
    let mut entity = Entity::new(id, kind.category());
    entity.label = fields.remove(attr::TITLE).as_ref().and_then(value_text);
    entity.width_m = fields.remove(attr::WIDTH).filter(|v| !v.is_null());
    entity.condition_code = fields.remove(attr::CONDITION).filter(|v| !v.is_null());

    let lat = fields.remove(attr::LAT).filter(|v| !v.is_null());
    let lon = fields.remove(attr::LON).filter(|v| !v.is_null());
    let point = match (lat.as_ref().and_then(coerce_f64), lon.as_ref().and_then(coerce_f64)) {
        (Some(lat), Some(lon)) => Some((lat, lon)),
        _ => {
            let spec_lat = fields.get(attr::SPEC_LAT).and_then(coerce_f64);
            let spec_lon = fields.get(attr::SPEC_LON).and_then(coerce_f64);
            spec_lat.zip(spec_lon)
        }
    };

    // A delivered vertex payload beats the single reference point
    match (fields.remove(attr::COORDINATES).filter(|v| !v.is_null()), point) {
        (Some(payload), _) => {
            entity.coordinates = Some(payload);
            entity.lat = lat;
            entity.lon = lon;
        }
        (None, Some((lat, lon))) => {
            entity.coordinates = Some(serde_json::json!([{ "lat": lat, "lon": lon }]));
        }
        (None, None) => {
            // Keep whatever arrived so the parser can decide; it will skip it.
            entity.lat = lat;
            entity.lon = lon;
        }
    }

    entity.attributes = fields;
    Ok(entity)
}

/// Normalize a page of raw records, dropping the ones without an id
pub fn normalize_records(records: &[Value], kind: DatasetKind) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();
    for record in records {
        match normalize_record(record, kind) {
            Ok(entity) => batch.entities.push(entity),
            Err(e) => {
                tracing::debug!("Dropping {} record: {}", kind, e);
                batch.dropped += 1;
            }
        }
    }
    batch
}

/// Metadata arrives as an object, occasionally as a JSON-encoded string
fn metadata_object(value: &Value) -> Option<Value> {
    match value {
        Value::Object(_) => Some(value.clone()),
        Value::String(s) => serde_json::from_str::<Value>(s).ok().filter(Value::is_object),
        _ => None,
    }
}

fn truncate(text: &str) -> String {
    const LIMIT: usize = 80;
    match text.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
