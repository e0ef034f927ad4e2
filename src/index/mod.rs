//! Bilingual (en/ru) lookup index of country and indicator names, built from
//! the legacy cp1251 reference files shipped with the HFA database.

pub mod extract;
pub mod lookup;

pub use extract::IndexError;
pub use lookup::{EntryKind, IndexEntry, Lang, LookupQuery, NameIndex};
