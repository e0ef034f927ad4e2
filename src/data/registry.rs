//! Dataset registry: provenance for the persisted snapshot (source note,
//! last import time, record count). Written after each successful import,
//! read by the `status` command.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

pub const DEFAULT_REGISTRY_PATH: &str = "data/registry.json";
pub const MASTER_DATASET_KEY: &str = "master_dataset";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub source: String,
    pub last_updated: String,
    pub record_count: usize,
    pub path: String,
}

pub type Registry = HashMap<String, DatasetEntry>;

#[derive(Debug)]
pub enum RegistryError {
    Read(std::io::Error),
    Parse(serde_json::Error),
    Write(std::io::Error),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(err) => write!(f, "failed to read registry: {err}"),
            Self::Parse(err) => write!(f, "failed to parse registry: {err}"),
            Self::Write(err) => write!(f, "failed to write registry: {err}"),
        }
    }
}

/// Load the registry, empty when the file does not exist yet.
pub fn load(path: impl AsRef<Path>) -> Result<Registry, RegistryError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Registry::new());
    }
    let raw = fs::read_to_string(path).map_err(RegistryError::Read)?;
    serde_json::from_str(&raw).map_err(RegistryError::Parse)
}

/// Record a fresh snapshot state under the master-dataset key.
pub fn record_import(
    registry_path: impl AsRef<Path>,
    snapshot_path: &str,
    source: &str,
    record_count: usize,
) -> Result<(), RegistryError> {
    let registry_path = registry_path.as_ref();
    let mut registry = load(registry_path)?;
    registry.insert(
        MASTER_DATASET_KEY.to_string(),
        DatasetEntry {
            source: source.to_string(),
            last_updated: Utc::now().to_rfc3339(),
            record_count,
            path: snapshot_path.to_string(),
        },
    );

    if let Some(parent) = registry_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(RegistryError::Write)?;
        }
    }
    let serialized = serde_json::to_string_pretty(&registry).map_err(RegistryError::Parse)?;
    fs::write(registry_path, serialized).map_err(RegistryError::Write)
}
