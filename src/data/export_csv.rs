//! Export the master dataset as CSV for use outside the tool.

use std::fmt;
use std::path::Path;

use crate::data::record::MasterDataset;

#[derive(Debug)]
pub enum ExportError {
    Csv(csv::Error),
    Io(std::io::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv(err) => write!(f, "failed to write csv: {err}"),
            Self::Io(err) => write!(f, "failed to create csv file: {err}"),
        }
    }
}

/// Write all records with a `country_id,country,indicator,year,value` header.
pub fn write_dataset_csv(path: impl AsRef<Path>, dataset: &MasterDataset) -> Result<(), ExportError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(ExportError::Io)?;
        }
    }
    let mut writer = csv::Writer::from_path(path).map_err(ExportError::Csv)?;
    for record in &dataset.records {
        writer.serialize(record).map_err(ExportError::Csv)?;
    }
    writer.flush().map_err(ExportError::Io)
}
