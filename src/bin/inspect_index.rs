//! Build the name index from data/index and print a few sample lookups.
//! Handy when refreshing the raw reference files from the HFA site.

use std::env;
use std::process::ExitCode;

use hfadb::index::extract::{self, DEFAULT_INDEX_DATA_DIR};
use hfadb::index::{EntryKind, LookupQuery};

fn main() -> ExitCode {
    let data_dir = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_INDEX_DATA_DIR.to_string());

    let index = match extract::build(&data_dir) {
        Ok(index) => index,
        Err(err) => {
            eprintln!("failed to build index from {data_dir}: {err}");
            return ExitCode::FAILURE;
        }
    };
    println!("index built: {} entries", index.len());

    let samples = [
        ("countries by id", EntryKind::Country, LookupQuery::by_ids(["0001", "0006"])),
        (
            "countries by name",
            EntryKind::Country,
            LookupQuery::by_names(["Albania", "Azerbaijan", "France"]),
        ),
        (
            "countries by name and id (union)",
            EntryKind::Country,
            LookupQuery {
                names: vec!["France".to_string()],
                ids: vec!["0001".to_string()],
            },
        ),
        ("indicators by id", EntryKind::Indicator, LookupQuery::by_ids(["1320"])),
    ];

    for (label, kind, query) in samples {
        println!("\n{label}:");
        for entry in index.lookup(kind, &query) {
            println!("  {}\t{}\t{}", entry.id, entry.en, entry.ru);
        }
    }
    ExitCode::SUCCESS
}
