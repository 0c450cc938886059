//! JSON files on disk: assessment data, agent catalogs, reports.

use policy_application::parse_data_file;
use policy_domain::{AgentCatalog, AgentSpec, ExtractedData};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum JsonFileError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}: {reason}", path.display())]
    Shape { path: PathBuf, reason: String },
}

fn read_value(path: &Path) -> Result<Value, JsonFileError> {
    let content = std::fs::read_to_string(path).map_err(|source| JsonFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| JsonFileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load assessment data: `{"fields": {...}}` or a bare field map.
pub fn load_extracted_data(path: &Path) -> Result<ExtractedData, JsonFileError> {
    let value = read_value(path)?;
    let data = parse_data_file(value).ok_or_else(|| JsonFileError::Shape {
        path: path.to_path_buf(),
        reason: "expected a JSON object of fields".to_string(),
    })?;
    debug!("Loaded {} data fields from {}", data.len(), path.display());
    Ok(data)
}

/// Load an agent catalog.
///
/// Accepts a catalog (`{"groups": ...}`), the output of the `catalog`
/// command (`{"catalog": {...}, ...}`), or a bare array of specs.
pub fn load_catalog(path: &Path) -> Result<AgentCatalog, JsonFileError> {
    let value = read_value(path)?;
    let shape_error = |reason: String| JsonFileError::Shape {
        path: path.to_path_buf(),
        reason,
    };

    let catalog = match value {
        Value::Array(_) => {
            let specs: Vec<AgentSpec> =
                serde_json::from_value(value).map_err(|e| shape_error(e.to_string()))?;
            let (catalog, duplicates) = AgentCatalog::from_specs(specs);
            if !duplicates.is_empty() {
                warn!(
                    "Dropped duplicate agent ids from {}: {}",
                    path.display(),
                    duplicates.join(", ")
                );
            }
            catalog
        }
        Value::Object(mut map) => {
            let inner = map.remove("catalog").unwrap_or(Value::Object(map));
            serde_json::from_value(inner).map_err(|e| shape_error(e.to_string()))?
        }
        _ => {
            return Err(shape_error(
                "expected a catalog object or an array of agent specs".to_string(),
            ));
        }
    };

    debug!("Loaded {} agents from {}", catalog.len(), path.display());
    Ok(catalog)
}

/// Write `value` as pretty JSON, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), JsonFileError> {
    let write_error = |source| JsonFileError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    let content = serde_json::to_string_pretty(value).map_err(|e| write_error(e.into()))?;
    std::fs::write(path, content).map_err(write_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use policy_domain::{Archetype, ArchetypeParams, ThresholdParams, ThresholdType};
    use serde_json::json;

    fn spec() -> AgentSpec {
        AgentSpec::new(
            "Credit Score Minimum",
            "Credit score must be at least 650",
            ArchetypeParams::Threshold(ThresholdParams::new(ThresholdType::Min, 650.0)),
        )
        .with_data_fields(["credit_score"])
    }

    #[test]
    fn test_load_extracted_data_both_shapes() {
        let dir = tempfile::tempdir().unwrap();

        let wrapped = dir.path().join("wrapped.json");
        std::fs::write(
            &wrapped,
            json!({"fields": {"credit_score": {"value": 720, "confidence": 0.9}}}).to_string(),
        )
        .unwrap();
        let data = load_extracted_data(&wrapped).unwrap();
        assert_eq!(data.number("credit_score"), Some(720.0));

        let bare = dir.path().join("bare.json");
        std::fs::write(&bare, json!({"credit_score": 610}).to_string()).unwrap();
        let data = load_extracted_data(&bare).unwrap();
        assert_eq!(data.number("credit_score"), Some(610.0));
    }

    #[test]
    fn test_load_extracted_data_rejects_arrays() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            load_extracted_data(&path),
            Err(JsonFileError::Shape { .. })
        ));
    }

    #[test]
    fn test_catalog_round_trip_through_output_wrapper() {
        let dir = tempfile::tempdir().unwrap();
        let (catalog, _) = AgentCatalog::from_specs(vec![spec()]);

        let path = dir.path().join("nested/out.json");
        write_json(&path, &json!({"catalog": catalog, "chunk_count": 1})).unwrap();

        let loaded = load_catalog(&path).unwrap();
        assert_eq!(loaded, catalog);
        assert_eq!(loaded.group(Archetype::Threshold).len(), 1);
    }

    #[test]
    fn test_catalog_from_spec_array_drops_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("specs.json");
        write_json(&path, &vec![spec(), spec()]).unwrap();
        assert_eq!(load_catalog(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_catalog(&path), Err(JsonFileError::Parse { .. })));
    }
}
