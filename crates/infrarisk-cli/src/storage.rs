//! Entity and report files on disk

use crate::errors;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use infrarisk_core::models::Entity;
use infrarisk_core::normalize::DatasetKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Normalized entities plus where they came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<DatasetKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
    pub entities: Vec<Entity>,
}

impl EntityFile {
    pub fn new(dataset: DatasetKind, term: impl Into<String>, entities: Vec<Entity>) -> Self {
        Self { dataset: Some(dataset), term: Some(term.into()), fetched_at: Some(Utc::now()), entities }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EntityFileContent {
    Stamped(EntityFile),
    Bare(Vec<Entity>),
}

/// Read an entity file, stamped or a bare array
pub fn read_entities(path: &Path) -> Result<EntityFile> {
    if !path.exists() {
        return Err(errors::entity_file_not_found(&path.display().to_string()).into());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    match serde_json::from_str::<EntityFileContent>(&content) {
        Ok(EntityFileContent::Stamped(file)) => Ok(file),
        Ok(EntityFileContent::Bare(entities)) => {
            Ok(EntityFile { dataset: None, term: None, fetched_at: None, entities })
        }
        Err(e) => {
            Err(errors::entity_file_invalid(&path.display().to_string(), &e.to_string()).into())
        }
    }
}

/// Write any serializable value as pretty JSON, creating parent directories
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_stamped_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("bridges.json");

        let entity = Entity::area("b1", &[(132.4, 34.4)]).with_width("10.0").with_condition(4);
        let file = EntityFile::new(DatasetKind::Bridge, "広島県", vec![entity.clone()]);
        write_json(&path, &file).unwrap();

        let loaded = read_entities(&path).unwrap();
        assert_eq!(loaded.dataset, Some(DatasetKind::Bridge));
        assert_eq!(loaded.term.as_deref(), Some("広島県"));
        assert!(loaded.fetched_at.is_some());
        assert_eq!(loaded.entities, vec![entity]);
    }

    #[test]
    fn test_bare_array_is_accepted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pipes.json");
        fs::write(
            &path,
            r#"[{"id": "p1", "category": "LinearAsset", "coordinates": [[132.4, 34.4], [132.5, 34.5]]}]"#,
        )
        .unwrap();

        let loaded = read_entities(&path).unwrap();
        assert!(loaded.dataset.is_none());
        assert_eq!(loaded.entities.len(), 1);
        assert_eq!(loaded.entities[0].id, "p1");
    }

    #[test]
    fn test_missing_and_invalid_files() {
        let dir = TempDir::new().unwrap();

        let missing = read_entities(&dir.path().join("nope.json")).unwrap_err();
        assert!(missing.to_string().contains("not found"));

        let path = dir.path().join("broken.json");
        fs::write(&path, "{\"entities\": 3}").unwrap();
        let invalid = read_entities(&path).unwrap_err();
        assert!(invalid.to_string().contains("could not be read"));
    }
}
