//! Batch import of raw HFA HTML extracts into the master dataset.
//!
//! One run: load the current snapshot, parse every `*.html` in the raw
//! directory, merge, persist (temp write + atomic rename), then delete the
//! consumed raw files and update the registry. A malformed table aborts the
//! whole batch before anything is persisted, so a failed run leaves both the
//! snapshot and the raw directory untouched.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::data::record::MasterDataset;
use crate::data::registry::{self, RegistryError};
use crate::data::snapshot::{self, SnapshotError};
use crate::data::table::{self, TableError};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_RAW_SUBDIR: &str = "raw";
const SNAPSHOT_FILE: &str = "master.bin";
const REGISTRY_FILE: &str = "registry.json";
const SOURCE_NOTE: &str = "HFA Table A HTML extracts";

#[derive(Debug)]
pub enum ImportError {
    Discover(std::io::Error),
    Read(PathBuf, std::io::Error),
    Table(PathBuf, TableError),
    Snapshot(SnapshotError),
    Registry(RegistryError),
    Cleanup(PathBuf, std::io::Error),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discover(err) => write!(f, "failed to list raw data directory: {err}"),
            Self::Read(path, err) => {
                write!(f, "failed to read raw file {}: {err}", path.display())
            }
            Self::Table(path, err) => {
                write!(f, "malformed table in {}: {err}", path.display())
            }
            Self::Snapshot(err) => write!(f, "{err}"),
            Self::Registry(err) => write!(f, "{err}"),
            Self::Cleanup(path, err) => {
                write!(f, "failed to remove consumed raw file {}: {err}", path.display())
            }
        }
    }
}

impl From<SnapshotError> for ImportError {
    fn from(err: SnapshotError) -> Self {
        Self::Snapshot(err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub files_imported: usize,
    pub records_added: usize,
    pub total_records: usize,
}

/// Loads, augments and persists the master dataset.
pub struct DataImporter {
    data_dir: PathBuf,
    raw_dir: PathBuf,
}

impl DataImporter {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let raw_dir = data_dir.join(DEFAULT_RAW_SUBDIR);
        DataImporter { data_dir, raw_dir }
    }

    pub fn with_raw_dir(mut self, raw_dir: impl Into<PathBuf>) -> Self {
        self.raw_dir = raw_dir.into();
        self
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(SNAPSHOT_FILE)
    }

    pub fn registry_path(&self) -> PathBuf {
        self.data_dir.join(REGISTRY_FILE)
    }

    /// Load the persisted dataset; missing snapshot is an empty dataset.
    pub fn load(&self) -> Result<MasterDataset, SnapshotError> {
        snapshot::load(self.snapshot_path())
    }

    /// Lazily list `*.html` files in the raw directory. Filesystem order,
    /// no guarantee. An absent raw directory yields an empty sequence.
    pub fn discover_raw(&self) -> Result<impl Iterator<Item = PathBuf>, std::io::Error> {
        let entries = match fs::read_dir(&self.raw_dir) {
            Ok(entries) => Some(entries),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => return Err(err),
        };
        Ok(entries.into_iter().flatten().filter_map(|entry| {
            let path = entry.ok()?.path();
            let is_html = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("html"));
            (is_html && path.is_file()).then_some(path)
        }))
    }

    /// Run one import batch. No-op report when there are no raw files.
    pub fn run(&self) -> Result<ImportReport, ImportError> {
        let mut dataset = self.load()?;
        let before = dataset.len();

        let files: Vec<PathBuf> = self.discover_raw().map_err(ImportError::Discover)?.collect();
        if files.is_empty() {
            return Ok(ImportReport {
                files_imported: 0,
                records_added: 0,
                total_records: before,
            });
        }

        for file in &files {
            let records = parse_raw_file(file)?;
            dataset.merge(records);
        }

        // Two-phase commit: the snapshot swap is atomic, raw files are only
        // deleted once the new snapshot is in place.
        snapshot::save(self.snapshot_path(), &dataset)?;
        for file in &files {
            fs::remove_file(file).map_err(|err| ImportError::Cleanup(file.clone(), err))?;
        }

        registry::record_import(
            self.registry_path(),
            &self.snapshot_path().to_string_lossy(),
            SOURCE_NOTE,
            dataset.len(),
        )
        .map_err(ImportError::Registry)?;

        Ok(ImportReport {
            files_imported: files.len(),
            records_added: dataset.len() - before,
            total_records: dataset.len(),
        })
    }
}

fn parse_raw_file(path: &Path) -> Result<Vec<crate::data::record::Record>, ImportError> {
    let html =
        fs::read_to_string(path).map_err(|err| ImportError::Read(path.to_path_buf(), err))?;
    let extract =
        table::parse_table(&html).map_err(|err| ImportError::Table(path.to_path_buf(), err))?;
    Ok(table::reshape(&extract))
}
