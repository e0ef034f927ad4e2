//! Master dataset: long-format records, snapshot persistence, raw-table
//! import and export.

pub mod export_csv;
pub mod importer;
pub mod record;
pub mod registry;
pub mod snapshot;
pub mod table;

pub use importer::{DataImporter, ImportError, ImportReport};
pub use record::{MasterDataset, Record};
