use crate::chart::{render, BoundChart};
use crate::config::{self, BaseConfig, DEFAULT_CHARTS_SUBDIR, DEFAULT_CONFIG_DIR};
use crate::data::export_csv::write_dataset_csv;
use crate::data::importer::{DataImporter, DEFAULT_DATA_DIR};
use crate::data::registry::{self, DEFAULT_REGISTRY_PATH, MASTER_DATASET_KEY};
use crate::index::extract::{self, DEFAULT_INDEX_DATA_DIR};

const DEFAULT_EXPORT_PATH: &str = "data/master.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Import,
    Plot,
    Search,
    Export,
    Status,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("import") => Some(Command::Import),
        Some("plot") => Some(Command::Plot),
        Some("search") => Some(Command::Search),
        Some("export") => Some(Command::Export),
        Some("status") => Some(Command::Status),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Import) => handle_import(args),
        Some(Command::Plot) => handle_plot(args),
        Some(Command::Search) => handle_search(args),
        Some(Command::Export) => handle_export(args),
        Some(Command::Status) => handle_status(),
        None => {
            eprintln!("usage: hfadb <import|plot|search|export|status>");
            2
        }
    }
}

fn handle_import(args: &[String]) -> i32 {
    let mut importer = DataImporter::new(DEFAULT_DATA_DIR);
    if let Some(raw_dir) = args.get(2) {
        importer = importer.with_raw_dir(raw_dir);
    }

    match importer.run() {
        Ok(report) => {
            println!(
                "import complete: files={}, records_added={}, total_records={}",
                report.files_imported, report.records_added, report.total_records
            );
            0
        }
        Err(err) => {
            eprintln!("import failed: {err}");
            1
        }
    }
}

fn handle_plot(args: &[String]) -> i32 {
    let importer = DataImporter::new(DEFAULT_DATA_DIR);
    let dataset = match importer.load() {
        Ok(dataset) => dataset,
        Err(err) => {
            eprintln!("failed to load master dataset: {err}");
            return 1;
        }
    };
    if dataset.is_empty() {
        eprintln!("master dataset is empty; run 'hfadb import' first");
        return 1;
    }

    let index = match extract::build(DEFAULT_INDEX_DATA_DIR) {
        Ok(index) => index,
        Err(err) => {
            eprintln!("failed to build name index: {err}");
            return 1;
        }
    };

    let base = match BaseConfig::load(DEFAULT_CONFIG_DIR) {
        Ok(base) => base,
        Err(err) => {
            eprintln!("failed to load base config: {err}");
            return 1;
        }
    };

    let charts_dir = args
        .get(2)
        .cloned()
        .unwrap_or_else(|| format!("{DEFAULT_CONFIG_DIR}/{DEFAULT_CHARTS_SUBDIR}"));
    let spec_files = match config::discover_specs(&charts_dir) {
        Ok(files) => files,
        Err(err) => {
            eprintln!("failed to list chart specs in {charts_dir}: {err}");
            return 1;
        }
    };
    if spec_files.is_empty() {
        eprintln!("no chart specs found in {charts_dir}");
        return 1;
    }

    for spec_file in spec_files {
        let spec = match config::load_spec(&base, &spec_file) {
            Ok(spec) => spec,
            Err(err) => {
                eprintln!("{err}");
                return 1;
            }
        };
        let bound = match BoundChart::bind(spec, &index, &dataset) {
            Ok(bound) => bound,
            Err(err) => {
                eprintln!("failed to bind {}: {err}", spec_file.display());
                return 1;
            }
        };
        match render::render(&bound, render::DEFAULT_IMG_DIR) {
            Ok(rendered) => {
                for file in &rendered.files {
                    println!("wrote {}", file.display());
                }
                println!("processed: {}", spec_file.display());
            }
            Err(err) => {
                eprintln!("failed to render {}: {err}", spec_file.display());
                return 1;
            }
        }
    }
    println!("run completed");
    0
}

fn handle_search(args: &[String]) -> i32 {
    let Some(needle) = args.get(2) else {
        eprintln!("usage: hfadb search <substring>");
        return 2;
    };

    let index = match extract::build(DEFAULT_INDEX_DATA_DIR) {
        Ok(index) => index,
        Err(err) => {
            eprintln!("failed to build name index: {err}");
            return 1;
        }
    };

    let matches = index.search(needle);
    if matches.is_empty() {
        println!("no indicators match '{needle}'");
        return 0;
    }
    println!("id\ten\tru");
    for entry in matches {
        println!("{}\t{}\t{}", entry.id, entry.en, entry.ru);
    }
    0
}

fn handle_export(args: &[String]) -> i32 {
    let out_path = args.get(2).map(String::as_str).unwrap_or(DEFAULT_EXPORT_PATH);

    let importer = DataImporter::new(DEFAULT_DATA_DIR);
    let dataset = match importer.load() {
        Ok(dataset) => dataset,
        Err(err) => {
            eprintln!("failed to load master dataset: {err}");
            return 1;
        }
    };

    match write_dataset_csv(out_path, &dataset) {
        Ok(()) => {
            println!("exported {} records to {out_path}", dataset.len());
            0
        }
        Err(err) => {
            eprintln!("export failed: {err}");
            1
        }
    }
}

fn handle_status() -> i32 {
    match registry::load(DEFAULT_REGISTRY_PATH) {
        Ok(reg) => match reg.get(MASTER_DATASET_KEY) {
            Some(entry) => {
                println!(
                    "master dataset: {} records, last updated {}, snapshot {}",
                    entry.record_count, entry.last_updated, entry.path
                );
                println!("source: {}", entry.source);
                0
            }
            None => {
                println!("no dataset imported yet");
                0
            }
        },
        Err(err) => {
            eprintln!("failed to read registry: {err}");
            1
        }
    }
}
