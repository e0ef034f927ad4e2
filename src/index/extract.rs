//! Extract id/name pairs from the raw HFA reference files.
//!
//! One file per (entity-type, language): `raw_countries_en.txt`,
//! `raw_countries_ru.txt`, `raw_indicators_en.txt`, `raw_indicators_ru.txt`.
//! The files are windows-1251 encoded JavaScript-ish dumps; every entry is a
//! quoted `'<4-digit-id> <free text>'` substring, with HTML entities in the
//! free text and a recurring `@mavr@` filler token to strip first.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use encoding_rs::WINDOWS_1251;
use regex::Regex;

use crate::html;
use crate::index::lookup::{EntryKind, IndexEntry, Lang, NameIndex};

pub const DEFAULT_INDEX_DATA_DIR: &str = "data/index";
const FILLER_TOKEN: &str = "@mavr@";

#[derive(Debug)]
pub enum IndexError {
    Read(PathBuf, std::io::Error),
    /// Bytes that are not valid windows-1251.
    Encoding(PathBuf),
    /// A reference file with no extractable entries.
    NoEntries(PathBuf),
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(path, err) => {
                write!(f, "failed to read reference file {}: {err}", path.display())
            }
            Self::Encoding(path) => {
                write!(f, "reference file {} is not valid windows-1251", path.display())
            }
            Self::NoEntries(path) => {
                write!(f, "reference file {} contains no id/name entries", path.display())
            }
        }
    }
}

/// Build the full index from the four reference files in `data_dir`.
/// English and Russian entries are joined by id; ids present in only one
/// language are dropped.
pub fn build(data_dir: impl AsRef<Path>) -> Result<NameIndex, IndexError> {
    let data_dir = data_dir.as_ref();
    let pattern = entry_pattern();

    let mut entries = Vec::new();
    for (kind, prefix) in [
        (EntryKind::Country, "countries"),
        (EntryKind::Indicator, "indicators"),
    ] {
        let en = dissect_file(&reference_path(data_dir, prefix, Lang::En), &pattern)?;
        let ru = dissect_file(&reference_path(data_dir, prefix, Lang::Ru), &pattern)?;

        for (id, en_name) in &en {
            if let Some((_, ru_name)) = ru.iter().find(|(ru_id, _)| ru_id == id) {
                entries.push(IndexEntry {
                    id: id.clone(),
                    kind,
                    en: en_name.clone(),
                    ru: ru_name.clone(),
                });
            }
        }
    }

    Ok(NameIndex::new(entries))
}

fn reference_path(data_dir: &Path, prefix: &str, lang: Lang) -> PathBuf {
    data_dir.join(format!("raw_{}_{}.txt", prefix, lang.as_str()))
}

/// Quoted `'<4-digit-id> <free text>'` entries.
fn entry_pattern() -> Regex {
    Regex::new(r"'(\d{4})\s([^']+)'").expect("entry pattern is valid")
}

fn dissect_file(path: &Path, pattern: &Regex) -> Result<Vec<(String, String)>, IndexError> {
    let bytes = fs::read(path).map_err(|err| IndexError::Read(path.to_path_buf(), err))?;
    let text = decode_cp1251(&bytes).ok_or_else(|| IndexError::Encoding(path.to_path_buf()))?;
    let text = text.replace(FILLER_TOKEN, "");

    let entries = extract_entries(&text, pattern);
    if entries.is_empty() {
        return Err(IndexError::NoEntries(path.to_path_buf()));
    }
    Ok(entries)
}

/// Decode windows-1251 bytes, None when any byte is not valid in cp1251.
fn decode_cp1251(bytes: &[u8]) -> Option<String> {
    let (text, _, had_errors) = WINDOWS_1251.decode(bytes);
    if had_errors {
        return None;
    }
    Some(text.into_owned())
}

fn extract_entries(text: &str, pattern: &Regex) -> Vec<(String, String)> {
    pattern
        .captures_iter(text)
        .map(|cap| {
            let id = cap[1].to_string();
            let name = html::normalize_ws(&html::decode_entities(&cap[2]));
            (id, name)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{decode_cp1251, entry_pattern, extract_entries};

    #[test]
    fn extracts_quoted_id_name_pairs() {
        let text = "opt[1]=new Option('0001 Albania','0001');\n\
                    opt[2]=new Option('0010 Bosnia &amp; Herzegovina','0010');";
        let entries = extract_entries(text, &entry_pattern());
        assert_eq!(
            entries,
            vec![
                ("0001".to_string(), "Albania".to_string()),
                ("0010".to_string(), "Bosnia & Herzegovina".to_string()),
            ]
        );
    }

    #[test]
    fn ignores_non_matching_quotes() {
        let text = "var x = 'not an entry'; y = '12 too short';";
        assert!(extract_entries(text, &entry_pattern()).is_empty());
    }

    #[test]
    fn cp1251_round_trips_cyrillic() {
        let (bytes, _, _) = encoding_rs::WINDOWS_1251.encode("Франция");
        assert_eq!(decode_cp1251(&bytes).as_deref(), Some("Франция"));
    }

    #[test]
    fn undefined_cp1251_byte_is_an_error() {
        // 0x98 has no assignment in windows-1251.
        assert!(decode_cp1251(&[b'o', b'k', 0x98]).is_none());
    }
}
