//! Declarative chart configuration.
//!
//! A base file (`config/base.yaml`) holds chart defaults, a country-set
//! expansion table (symbolic group name -> country ids) and a correction
//! table (old id -> replacement id). Per-chart YAML files override the
//! defaults field by field. The correction table replaces the ad-hoc inline
//! id remap the original tool carried; it is applied to the resolved spec so
//! every substitution is visible in one place.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::index::Lang;

pub const DEFAULT_CONFIG_DIR: &str = "config";
pub const DEFAULT_CHARTS_SUBDIR: &str = "charts";
const BASE_FILE: &str = "base.yaml";

#[derive(Debug)]
pub enum ConfigError {
    Read(PathBuf, std::io::Error),
    Parse(PathBuf, serde_yaml::Error),
    UnknownCountrySet(String),
    UnknownLang(String),
    NoCountries(PathBuf),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(path, err) => {
                write!(f, "failed to read config {}: {err}", path.display())
            }
            Self::Parse(path, err) => {
                write!(f, "failed to parse config {}: {err}", path.display())
            }
            Self::UnknownCountrySet(name) => write!(f, "unknown country set '{name}'"),
            Self::UnknownLang(lang) => write!(f, "unknown language '{lang}'"),
            Self::NoCountries(path) => {
                write!(f, "chart spec {} selects no countries", path.display())
            }
        }
    }
}

/// Localized free text, one string per language code.
pub type Localized = HashMap<String, String>;

/// Optional caption block drawn at a fixed figure position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caption {
    pub x: f64,
    pub y: f64,
    pub size: u32,
    #[serde(flatten)]
    pub text: Localized,
}

/// Chart defaults from the base config. All fields have built-in fallbacks
/// so a missing base file still works.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartDefaults {
    pub dpi: u32,
    pub width: u32,
    pub height: u32,
    pub langs: Vec<String>,
    pub color: String,
    pub data_source: Localized,
}

impl Default for ChartDefaults {
    fn default() -> Self {
        ChartDefaults {
            dpi: 75,
            width: 960,
            height: 617,
            langs: vec!["en".to_string(), "ru".to_string()],
            color: "red".to_string(),
            data_source: default_data_source(),
        }
    }
}

fn default_data_source() -> Localized {
    let url = "http://data.euro.who.int/hfadb/".to_string();
    [("en".to_string(), url.clone()), ("ru".to_string(), url)]
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseConfig {
    pub defaults: ChartDefaults,
    /// Symbolic group name -> literal country id list.
    pub country_sets: HashMap<String, Vec<String>>,
    /// Old id -> replacement id, applied to indicator and country ids after
    /// merging. Kept explicit and inspectable.
    pub corrections: HashMap<String, String>,
}

impl BaseConfig {
    pub fn load(config_dir: impl AsRef<Path>) -> Result<BaseConfig, ConfigError> {
        let path = config_dir.as_ref().join(BASE_FILE);
        if !path.exists() {
            return Ok(BaseConfig::default());
        }
        let raw = fs::read_to_string(&path).map_err(|err| ConfigError::Read(path.clone(), err))?;
        serde_yaml::from_str(&raw).map_err(|err| ConfigError::Parse(path, err))
    }
}

/// Raw per-chart YAML file, before merging against the base config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChartSpecFile {
    pub indicator: String,
    pub countries: Vec<String>,
    pub country_set: Option<String>,
    pub comparators: Vec<String>,
    pub xmin: Option<i32>,
    pub xmax: Option<i32>,
    pub ymin: Option<f64>,
    pub ymax: Option<f64>,
    pub xstep: Option<i32>,
    pub ystep: Option<f64>,
    pub dpi: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub color: Option<String>,
    pub langs: Option<Vec<String>>,
    pub title: Option<Localized>,
    pub data_source: Option<Localized>,
    pub caption: Option<Caption>,
    pub filename: Option<String>,
}

/// Fully resolved per-chart spec: defaults merged in, country sets expanded,
/// corrections applied, languages parsed.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub indicator: String,
    pub countries: Vec<String>,
    pub comparators: Vec<String>,
    pub xmin: Option<i32>,
    pub xmax: Option<i32>,
    pub ymin: Option<f64>,
    pub ymax: Option<f64>,
    pub xstep: Option<i32>,
    pub ystep: Option<f64>,
    pub dpi: u32,
    pub width: u32,
    pub height: u32,
    pub color: String,
    pub langs: Vec<Lang>,
    pub title: Localized,
    pub data_source: Localized,
    pub caption: Option<Caption>,
    /// Output filename stub; the indicator id when not set.
    pub filename: String,
}

/// Merge one chart file over the base config.
pub fn resolve_spec(base: &BaseConfig, file: ChartSpecFile) -> Result<ChartSpec, ConfigError> {
    let defaults = &base.defaults;

    let mut countries = file.countries;
    if let Some(set_name) = &file.country_set {
        let set = base
            .country_sets
            .get(set_name)
            .ok_or_else(|| ConfigError::UnknownCountrySet(set_name.clone()))?;
        countries.extend(set.iter().cloned());
    }
    countries.sort();
    countries.dedup();

    let correct = |id: String| base.corrections.get(&id).cloned().unwrap_or(id);
    let indicator = correct(file.indicator);
    let countries: Vec<String> = countries.into_iter().map(correct).collect();
    let comparators: Vec<String> = file.comparators.into_iter().map(correct).collect();

    let lang_codes = file.langs.unwrap_or_else(|| defaults.langs.clone());
    let mut langs = Vec::with_capacity(lang_codes.len());
    for code in lang_codes {
        langs.push(Lang::parse(&code).ok_or(ConfigError::UnknownLang(code))?);
    }

    let filename = file.filename.unwrap_or_else(|| indicator.clone());

    Ok(ChartSpec {
        indicator,
        countries,
        comparators,
        xmin: file.xmin,
        xmax: file.xmax,
        ymin: file.ymin,
        ymax: file.ymax,
        xstep: file.xstep,
        ystep: file.ystep,
        dpi: file.dpi.unwrap_or(defaults.dpi),
        width: file.width.unwrap_or(defaults.width),
        height: file.height.unwrap_or(defaults.height),
        color: file.color.unwrap_or_else(|| defaults.color.clone()),
        langs,
        title: file.title.unwrap_or_default(),
        data_source: file.data_source.unwrap_or_else(|| defaults.data_source.clone()),
        caption: file.caption,
        filename,
    })
}

/// List `*.yaml` chart spec files under `dir`, sorted for stable runs.
pub fn discover_specs(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut files: Vec<PathBuf> = match fs::read_dir(dir.as_ref()) {
        Ok(entries) => entries
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                let is_yaml = path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
                (is_yaml && path.is_file()).then_some(path)
            })
            .collect(),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(err) => return Err(err),
    };
    files.sort();
    Ok(files)
}

/// Load and resolve one chart spec file.
pub fn load_spec(base: &BaseConfig, path: impl AsRef<Path>) -> Result<ChartSpec, ConfigError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|err| ConfigError::Read(path.to_path_buf(), err))?;
    let file: ChartSpecFile =
        serde_yaml::from_str(&raw).map_err(|err| ConfigError::Parse(path.to_path_buf(), err))?;
    let spec = resolve_spec(base, file)?;
    if spec.countries.is_empty() {
        return Err(ConfigError::NoCountries(path.to_path_buf()));
    }
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::{resolve_spec, BaseConfig, ChartSpecFile, ConfigError};
    use crate::index::Lang;

    fn base() -> BaseConfig {
        let raw = "
defaults:
  dpi: 100
  color: blue
country_sets:
  baltics: ['0024', '0030', '0032']
corrections:
  '1234': '1320'
";
        serde_yaml::from_str(raw).unwrap()
    }

    #[test]
    fn defaults_fill_unset_fields() {
        let spec = resolve_spec(
            &base(),
            ChartSpecFile {
                indicator: "1010".to_string(),
                countries: vec!["France".to_string()],
                ..ChartSpecFile::default()
            },
        )
        .unwrap();
        assert_eq!(spec.dpi, 100);
        assert_eq!(spec.width, 960);
        assert_eq!(spec.color, "blue");
        assert_eq!(spec.langs, vec![Lang::En, Lang::Ru]);
        assert_eq!(spec.filename, "1010");
    }

    #[test]
    fn country_set_expands_and_dedups() {
        let spec = resolve_spec(
            &base(),
            ChartSpecFile {
                indicator: "1010".to_string(),
                countries: vec!["0024".to_string()],
                country_set: Some("baltics".to_string()),
                ..ChartSpecFile::default()
            },
        )
        .unwrap();
        assert_eq!(spec.countries, vec!["0024", "0030", "0032"]);
    }

    #[test]
    fn unknown_country_set_is_an_error() {
        let err = resolve_spec(
            &base(),
            ChartSpecFile {
                indicator: "1010".to_string(),
                country_set: Some("nowhere".to_string()),
                ..ChartSpecFile::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownCountrySet(_)));
    }

    #[test]
    fn corrections_rewrite_ids() {
        let spec = resolve_spec(
            &base(),
            ChartSpecFile {
                indicator: "1234".to_string(),
                countries: vec!["0006".to_string()],
                ..ChartSpecFile::default()
            },
        )
        .unwrap();
        assert_eq!(spec.indicator, "1320");
        // Ids without a correction entry pass through untouched.
        assert_eq!(spec.countries, vec!["0006"]);
    }

    #[test]
    fn explicit_langs_override_defaults() {
        let spec = resolve_spec(
            &base(),
            ChartSpecFile {
                indicator: "1010".to_string(),
                countries: vec!["0006".to_string()],
                langs: Some(vec!["ru".to_string()]),
                ..ChartSpecFile::default()
            },
        )
        .unwrap();
        assert_eq!(spec.langs, vec![Lang::Ru]);
    }
}
