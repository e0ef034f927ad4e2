//! Binary snapshot of the master dataset. A missing snapshot on first run is
//! an empty dataset, not an error. Writes go through a temp file in the same
//! directory followed by an atomic rename, so a crash mid-write never leaves
//! a truncated snapshot behind.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::data::record::MasterDataset;

pub const DEFAULT_SNAPSHOT_PATH: &str = "data/master.bin";

#[derive(Debug)]
pub enum SnapshotError {
    Read(std::io::Error),
    Decode(bincode::Error),
    Encode(bincode::Error),
    Write(std::io::Error),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(err) => write!(f, "failed to read snapshot: {err}"),
            Self::Decode(err) => write!(f, "failed to decode snapshot: {err}"),
            Self::Encode(err) => write!(f, "failed to encode snapshot: {err}"),
            Self::Write(err) => write!(f, "failed to persist snapshot: {err}"),
        }
    }
}

/// Load the persisted dataset. Missing file yields an empty dataset.
pub fn load(path: impl AsRef<Path>) -> Result<MasterDataset, SnapshotError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(MasterDataset::default()),
        Err(err) => return Err(SnapshotError::Read(err)),
    };
    bincode::deserialize(&bytes).map_err(SnapshotError::Decode)
}

/// Persist the dataset: encode, write `<path>.tmp` alongside, rename over.
pub fn save(path: impl AsRef<Path>, dataset: &MasterDataset) -> Result<(), SnapshotError> {
    let path = path.as_ref();
    let bytes = bincode::serialize(dataset).map_err(SnapshotError::Encode)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(SnapshotError::Write)?;
        }
    }

    let tmp = path.with_extension("bin.tmp");
    fs::write(&tmp, bytes).map_err(SnapshotError::Write)?;
    fs::rename(&tmp, path).map_err(SnapshotError::Write)
}
