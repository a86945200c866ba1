//! Deterministic sample datasets shaped like catalog search results
//!
//! Bridges sit on a small grid; every even-numbered pipe runs straight
//! through the bridge with the same number, every odd-numbered pipe runs
//! parallel about 110 m to the north. A few records carry the quirks seen in
//! live data: numeric strings, a non-numeric width, and coordinates present
//! only in the metadata.

use crate::memory::MemoryCatalog;
use infrarisk_core::normalize::DatasetKind;
use serde_json::{json, Value};

/// Region term the sample catalog answers to
pub const SAMPLE_REGION: &str = "広島県";

const ORIGIN_LON: f64 = 132.4500;
const ORIGIN_LAT: f64 = 34.3900;
const BRIDGE_COUNT: usize = 12;
const PIPE_COUNT: usize = 16;
const MATERIALS: [&str; 4] = ["DIP", "CIP", "VP", "SP"];

/// Raw sample records for `kind`
pub fn sample_records(kind: DatasetKind) -> Vec<Value> {
    match kind {
        DatasetKind::Bridge | DatasetKind::Xroad => (0..BRIDGE_COUNT).map(bridge_record).collect(),
        DatasetKind::Pipe => (0..PIPE_COUNT).map(pipe_record).collect(),
        DatasetKind::Sewage | DatasetKind::Water => {
            (0..PIPE_COUNT).map(ledger_pipe_record).collect()
        }
    }
}

/// In-memory catalog serving the sample records for every search term of
/// `kind`'s preset in [`SAMPLE_REGION`]
pub fn sample_catalog(kind: DatasetKind) -> MemoryCatalog {
    let preset = crate::query::SearchPreset::for_dataset(kind, SAMPLE_REGION);
    let records = sample_records(kind);
    let mut catalog = MemoryCatalog::new();
    // Keyword presets hit the same records under each term; ids de-duplicate them
    for term in preset.terms {
        catalog = catalog.with_term(term, records.clone());
    }
    catalog
}

fn bridge_center(i: usize) -> (f64, f64) {
    (ORIGIN_LON + (i % 4) as f64 * 0.004, ORIGIN_LAT + (i / 4) as f64 * 0.003)
}

fn bridge_record(i: usize) -> Value {
    let (lon, lat) = bridge_center(i);
    let width = if i == 9 { "不明".to_string() } else { format!("{:.1}", 6.0 + (i % 5) as f64 * 2.0) };
    let condition = ((i * 7) % 4 + 1).to_string();

    let mut record = json!({
        "id": format!("rsdb-bridge-{:04}", i + 1),
        "title": format!("Sample Bridge {:02}", i + 1),
        "lat": format!("{:.6}", lat),
        "lon": format!("{:.6}", lon),
        "metadata": {
            "DPF:dataset_id": "rsdb_bridge",
            "DPF:prefecture_name": SAMPLE_REGION,
            "RSDB:syogen_fukuin": width,
            "RSDB:tenken_kiroku_hantei_kubun": condition,
            "RSDB:syogen_kyouchou": format!("{:.1}", 20.0 + i as f64 * 3.5),
            "RSDB:syogen_kasetsu_nendo": 1955 + i * 4,
            "RSDB:syogen_ichi_ido": lat,
            "RSDB:syogen_ichi_keido": lon
        }
    });

    // Reference point only in the metadata
    if i == 5 {
        record["lat"] = Value::Null;
        record["lon"] = Value::Null;
    }
    record
}

fn pipe_vertices(j: usize) -> Vec<[f64; 2]> {
    let (lon, lat) = bridge_center(j % BRIDGE_COUNT);
    let lat = if j % 2 == 0 { lat } else { lat + 0.001 };
    vec![[lon - 0.0006, lat - 0.0001], [lon, lat], [lon + 0.0006, lat + 0.0001]]
}

fn pipe_record(j: usize) -> Value {
    let vertices = pipe_vertices(j);
    json!({
        "id": format!("w09-{:04}", j + 1),
        "title": format!("Sewer Main {:02}", j + 1),
        "lat": vertices[0][1],
        "lon": vertices[0][0],
        "coordinates": vertices,
        "metadata": {
            "DPF:dataset_id": "nlni_ksj-w09",
            "DPF:prefecture_name": SAMPLE_REGION,
            "NLNI:W09_001": format!("Trunk {}", j / 4 + 1),
            "NLNI:W09_002": 300 + (j % 3) * 150,
            "NLNI:W09_003": (1962 + j * 3).to_string(),
            "NLNI:W09_004": MATERIALS[j % MATERIALS.len()]
        }
    })
}

fn ledger_pipe_record(j: usize) -> Value {
    let vertices = pipe_vertices(j);
    json!({
        "id": format!("ledger-{:04}", j + 1),
        "title": format!("Ledger Pipe {:02}", j + 1),
        "lat": vertices[0][1],
        "lon": vertices[0][0],
        "coordinates": vertices,
        "metadata": {
            "type": "pipe",
            "pipe_material": MATERIALS[(j + 1) % MATERIALS.len()],
            "pipe_diameter": 150 + (j % 4) * 50,
            "installation_year": 1970 + j * 2
        }
    })
}
