//! Queryable bilingual name index.
//!
//! Lookup combines name and id filters with explicit union semantics: the
//! original tool decided between name/id/both by truthiness of intermediate
//! result sets, which silently fell back to "everything" when both filters
//! matched nothing. Here the selection is a tagged branch and empty results
//! stay empty.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    Country,
    Indicator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lang {
    En,
    Ru,
}

impl Lang {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ru => "ru",
        }
    }

    pub fn parse(s: &str) -> Option<Lang> {
        match s {
            "en" => Some(Lang::En),
            "ru" => Some(Lang::Ru),
            _ => None,
        }
    }
}

/// One bilingual row, keyed by the opaque 4-digit id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub kind: EntryKind,
    pub en: String,
    pub ru: String,
}

impl IndexEntry {
    pub fn name(&self, lang: Lang) -> &str {
        match lang {
            Lang::En => &self.en,
            Lang::Ru => &self.ru,
        }
    }
}

/// Name/id filters for one lookup. Empty filters select everything of the
/// requested kind.
#[derive(Debug, Clone, Default)]
pub struct LookupQuery {
    pub names: Vec<String>,
    pub ids: Vec<String>,
}

impl LookupQuery {
    pub fn by_names<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        LookupQuery {
            names: names.into_iter().map(Into::into).collect(),
            ids: Vec::new(),
        }
    }

    pub fn by_ids<S: Into<String>>(ids: impl IntoIterator<Item = S>) -> Self {
        LookupQuery {
            names: Vec::new(),
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

/// Which filters were actually supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selection {
    All,
    NameOnly,
    IdOnly,
    Both,
}

impl Selection {
    fn of(query: &LookupQuery) -> Selection {
        match (query.names.is_empty(), query.ids.is_empty()) {
            (true, true) => Selection::All,
            (false, true) => Selection::NameOnly,
            (true, false) => Selection::IdOnly,
            (false, false) => Selection::Both,
        }
    }
}

/// In-memory index over all countries and indicators, rebuilt fully on each
/// run from the reference files.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    entries: Vec<IndexEntry>,
}

impl NameIndex {
    pub fn new(entries: Vec<IndexEntry>) -> Self {
        NameIndex { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of `kind` matching the query. With both name and id filters
    /// the result is the union of the two matches, deduplicated by id, name
    /// matches first.
    pub fn lookup(&self, kind: EntryKind, query: &LookupQuery) -> Vec<IndexEntry> {
        let of_kind = || self.entries.iter().filter(move |e| e.kind == kind);

        match Selection::of(query) {
            Selection::All => of_kind().cloned().collect(),
            Selection::NameOnly => of_kind()
                .filter(|e| matches_name(e, &query.names))
                .cloned()
                .collect(),
            Selection::IdOnly => of_kind()
                .filter(|e| query.ids.iter().any(|id| *id == e.id))
                .cloned()
                .collect(),
            Selection::Both => {
                let mut seen = HashSet::new();
                let mut result: Vec<IndexEntry> = of_kind()
                    .filter(|e| matches_name(e, &query.names))
                    .inspect(|e| {
                        seen.insert(e.id.clone());
                    })
                    .cloned()
                    .collect();
                result.extend(
                    of_kind()
                        .filter(|e| query.ids.iter().any(|id| *id == e.id))
                        .filter(|e| !seen.contains(&e.id))
                        .cloned(),
                );
                result
            }
        }
    }

    /// Single entry by id, any kind.
    pub fn by_id(&self, id: &str) -> Option<&IndexEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Resolve one token as a 4-digit id or as a name in either language.
    pub fn resolve(&self, kind: EntryKind, token: &str) -> Option<&IndexEntry> {
        let is_id = token.len() == 4 && token.chars().all(|c| c.is_ascii_digit());
        self.entries.iter().find(|e| {
            e.kind == kind && if is_id { e.id == token } else { e.en == token || e.ru == token }
        })
    }

    /// Case-sensitive substring search over indicator names, both languages.
    pub fn search(&self, needle: &str) -> Vec<&IndexEntry> {
        self.entries
            .iter()
            .filter(|e| {
                e.kind == EntryKind::Indicator
                    && (e.en.contains(needle) || e.ru.contains(needle))
            })
            .collect()
    }
}

fn matches_name(entry: &IndexEntry, names: &[String]) -> bool {
    names.iter().any(|n| *n == entry.en || *n == entry.ru)
}
