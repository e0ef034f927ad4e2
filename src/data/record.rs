//! Long-format records and the in-memory master dataset.

use serde::{Deserialize, Serialize};

/// One observation: a value for an indicator in a country in a year.
/// `country_id` is the opaque 4-digit HFA id as found in the raw tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub country_id: String,
    pub country: String,
    pub indicator: String,
    pub year: i32,
    pub value: f64,
}

/// Cumulative long-format table of all imported records. Unordered; merge is
/// plain concatenation, so repeated imports of the same raw content duplicate
/// records (see importer docs).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MasterDataset {
    pub records: Vec<Record>,
}

impl MasterDataset {
    pub fn new(records: Vec<Record>) -> Self {
        MasterDataset { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append new records. No conflict resolution, no uniqueness key.
    pub fn merge(&mut self, new: Vec<Record>) {
        self.records.extend(new);
    }

    /// Observed year range over all records, None when empty.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let mut years = self.records.iter().map(|r| r.year);
        let first = years.next()?;
        Some(years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y))))
    }

    /// Records for one indicator label (the English label as imported).
    pub fn for_indicator<'a>(&'a self, indicator: &'a str) -> impl Iterator<Item = &'a Record> {
        self.records.iter().filter(move |r| r.indicator == indicator)
    }
}
