//! Data binding for one chart: resolve identifiers through the index, filter
//! the master dataset, compute shared axis limits. Rendering consumes the
//! bound chart and produces one image per language.

use std::fmt;
use std::path::PathBuf;

use crate::config::ChartSpec;
use crate::data::record::MasterDataset;
use crate::index::{EntryKind, IndexEntry, Lang, NameIndex};

#[derive(Debug)]
pub enum ChartError {
    UnknownIndicator(String),
    UnknownCountry(String),
    /// The filtered dataset has no points at all.
    NoData(String),
    Render(String),
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownIndicator(id) => write!(f, "indicator '{id}' not found in index"),
            Self::UnknownCountry(token) => write!(f, "country '{token}' not found in index"),
            Self::NoData(indicator) => {
                write!(f, "no data points for indicator '{indicator}' and selected countries")
            }
            Self::Render(msg) => write!(f, "failed to render chart: {msg}"),
        }
    }
}

/// One country's series, year-ascending.
#[derive(Debug, Clone)]
pub struct Series {
    pub entry: IndexEntry,
    pub points: Vec<(i32, f64)>,
}

/// Spec with all identifiers resolved and data attached; ready to render.
#[derive(Debug, Clone)]
pub struct BoundChart {
    pub spec: ChartSpec,
    pub indicator: IndexEntry,
    /// One facet per entry, sorted by English name like the original output.
    pub facets: Vec<Series>,
    /// Overlaid translucently on every facet.
    pub comparators: Vec<Series>,
    pub xlim: (i32, i32),
    pub ylim: (f64, f64),
}

/// Proof that rendering happened; lists the written image files.
#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub files: Vec<PathBuf>,
}

impl BoundChart {
    /// Resolve and filter. Fails on unresolvable identifiers or an entirely
    /// empty selection.
    pub fn bind(
        spec: ChartSpec,
        index: &NameIndex,
        dataset: &MasterDataset,
    ) -> Result<BoundChart, ChartError> {
        let indicator = index
            .resolve(EntryKind::Indicator, &spec.indicator)
            .ok_or_else(|| ChartError::UnknownIndicator(spec.indicator.clone()))?
            .clone();

        let mut facet_entries = resolve_countries(index, &spec.countries)?;
        facet_entries.sort_by(|a, b| a.en.cmp(&b.en));
        let comparator_entries = resolve_countries(index, &spec.comparators)?;

        let (start, end) = year_bounds(&spec, dataset);

        let facets: Vec<Series> = facet_entries
            .into_iter()
            .map(|entry| country_series(dataset, &indicator, entry, start, end))
            .collect();
        let comparators: Vec<Series> = comparator_entries
            .into_iter()
            .map(|entry| country_series(dataset, &indicator, entry, start, end))
            .collect();

        if facets.iter().chain(&comparators).all(|s| s.points.is_empty()) {
            return Err(ChartError::NoData(indicator.en.clone()));
        }

        let ylim = value_limits(&spec, facets.iter().chain(&comparators));

        Ok(BoundChart {
            spec,
            indicator,
            facets,
            comparators,
            xlim: (start, end),
            ylim,
        })
    }

    /// Figure title for one language: spec override, else the indicator name.
    pub fn title(&self, lang: Lang) -> String {
        self.spec
            .title
            .get(lang.as_str())
            .cloned()
            .unwrap_or_else(|| self.indicator.name(lang).to_string())
    }

    /// Source credit line for one language.
    pub fn data_source(&self, lang: Lang) -> String {
        self.spec
            .data_source
            .get(lang.as_str())
            .cloned()
            .unwrap_or_else(|| "http://data.euro.who.int/hfadb/".to_string())
    }

    /// Output filename for one language: `<stub>_<lang>.png`.
    pub fn filename(&self, lang: Lang) -> String {
        format!("{}_{}.png", self.spec.filename, lang.as_str())
    }
}

fn resolve_countries(index: &NameIndex, tokens: &[String]) -> Result<Vec<IndexEntry>, ChartError> {
    tokens
        .iter()
        .map(|token| {
            index
                .resolve(EntryKind::Country, token)
                .cloned()
                .ok_or_else(|| ChartError::UnknownCountry(token.clone()))
        })
        .collect()
}

/// Explicit year bounds win; otherwise the observed range of the whole
/// dataset (the original's behavior), or a degenerate (0, 0) when empty.
fn year_bounds(spec: &ChartSpec, dataset: &MasterDataset) -> (i32, i32) {
    let observed = dataset.year_range().unwrap_or((0, 0));
    (
        spec.xmin.unwrap_or(observed.0),
        spec.xmax.unwrap_or(observed.1),
    )
}

/// Filter to one indicator and one country, year-restricted and sorted.
/// Records match on the country id or either localized name, since raw
/// tables carry the id alongside the (English) country label.
fn country_series(
    dataset: &MasterDataset,
    indicator: &IndexEntry,
    entry: IndexEntry,
    start: i32,
    end: i32,
) -> Series {
    let mut points: Vec<(i32, f64)> = dataset
        .for_indicator(&indicator.en)
        .filter(|r| r.country_id == entry.id || r.country == entry.en || r.country == entry.ru)
        .filter(|r| r.year >= start && r.year <= end)
        .map(|r| (r.year, r.value))
        .collect();
    points.sort_by_key(|(year, _)| *year);
    Series { entry, points }
}

/// Shared y limits: explicit bounds win, otherwise the original's fixed
/// padding around the data extremes (rounded out to hundreds).
fn value_limits<'a>(spec: &ChartSpec, series: impl Iterator<Item = &'a Series>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for s in series {
        for (_, v) in &s.points {
            min = min.min(*v);
            max = max.max(*v);
        }
    }
    if !min.is_finite() {
        min = 0.0;
        max = 1.0;
    }
    let low = spec.ymin.unwrap_or_else(|| 100.0 * ((min - 95.0) / 100.0).trunc());
    let high = spec.ymax.unwrap_or_else(|| 100.0 * ((max + 95.0) / 100.0).trunc());
    if low < high {
        (low, high)
    } else {
        // Degenerate or inverted bounds: pad around the data instead.
        (min - 1.0, max + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{BoundChart, ChartError};
    use crate::config::{resolve_spec, BaseConfig, ChartSpecFile};
    use crate::data::record::{MasterDataset, Record};
    use crate::index::{EntryKind, IndexEntry, NameIndex};

    fn index() -> NameIndex {
        NameIndex::new(vec![
            country("0001", "Albania", "Албания"),
            country("0006", "France", "Франция"),
            country("0053", "European Region", "Европейский регион"),
            IndexEntry {
                id: "1010".to_string(),
                kind: EntryKind::Indicator,
                en: "Life expectancy at birth".to_string(),
                ru: "Ожидаемая продолжительность жизни".to_string(),
            },
        ])
    }

    fn country(id: &str, en: &str, ru: &str) -> IndexEntry {
        IndexEntry {
            id: id.to_string(),
            kind: EntryKind::Country,
            en: en.to_string(),
            ru: ru.to_string(),
        }
    }

    fn rec(country_id: &str, country: &str, year: i32, value: f64) -> Record {
        Record {
            country_id: country_id.to_string(),
            country: country.to_string(),
            indicator: "Life expectancy at birth".to_string(),
            year,
            value,
        }
    }

    fn dataset() -> MasterDataset {
        MasterDataset::new(vec![
            rec("0006", "France", 2001, 79.0),
            rec("0006", "France", 2000, 78.8),
            rec("0001", "Albania", 2000, 74.0),
            rec("0053", "European Region", 2000, 75.5),
            rec("0053", "European Region", 2001, 75.8),
        ])
    }

    fn spec(file: ChartSpecFile) -> crate::config::ChartSpec {
        resolve_spec(&BaseConfig::default(), file).unwrap()
    }

    #[test]
    fn bind_resolves_filters_and_sorts() {
        let bound = BoundChart::bind(
            spec(ChartSpecFile {
                indicator: "1010".to_string(),
                countries: vec!["France".to_string(), "0001".to_string()],
                comparators: vec!["European Region".to_string()],
                ..ChartSpecFile::default()
            }),
            &index(),
            &dataset(),
        )
        .unwrap();

        assert_eq!(bound.indicator.id, "1010");
        // Facets sorted by English name.
        assert_eq!(bound.facets[0].entry.en, "Albania");
        assert_eq!(bound.facets[1].entry.en, "France");
        // France's series is year-ascending.
        assert_eq!(bound.facets[1].points, vec![(2000, 78.8), (2001, 79.0)]);
        assert_eq!(bound.comparators.len(), 1);
        assert_eq!(bound.xlim, (2000, 2001));
    }

    #[test]
    fn year_bounds_restrict_series() {
        let bound = BoundChart::bind(
            spec(ChartSpecFile {
                indicator: "1010".to_string(),
                countries: vec!["France".to_string()],
                xmin: Some(2001),
                ..ChartSpecFile::default()
            }),
            &index(),
            &dataset(),
        )
        .unwrap();
        assert_eq!(bound.facets[0].points, vec![(2001, 79.0)]);
        assert_eq!(bound.xlim, (2001, 2001));
    }

    #[test]
    fn default_value_limits_pad_to_hundreds() {
        let bound = BoundChart::bind(
            spec(ChartSpecFile {
                indicator: "1010".to_string(),
                countries: vec!["France".to_string()],
                ..ChartSpecFile::default()
            }),
            &index(),
            &dataset(),
        )
        .unwrap();
        // min 78.8 -> trunc((78.8-95)/100)*100 = 0; max 79.0 -> trunc(174/100)*100 = 100.
        assert_eq!(bound.ylim, (0.0, 100.0));
    }

    #[test]
    fn explicit_value_limits_win() {
        let bound = BoundChart::bind(
            spec(ChartSpecFile {
                indicator: "1010".to_string(),
                countries: vec!["France".to_string()],
                ymin: Some(70.0),
                ymax: Some(85.0),
                ..ChartSpecFile::default()
            }),
            &index(),
            &dataset(),
        )
        .unwrap();
        assert_eq!(bound.ylim, (70.0, 85.0));
    }

    #[test]
    fn unknown_identifiers_fail_binding() {
        let err = BoundChart::bind(
            spec(ChartSpecFile {
                indicator: "9999".to_string(),
                countries: vec!["France".to_string()],
                ..ChartSpecFile::default()
            }),
            &index(),
            &dataset(),
        )
        .unwrap_err();
        assert!(matches!(err, ChartError::UnknownIndicator(_)));

        let err = BoundChart::bind(
            spec(ChartSpecFile {
                indicator: "1010".to_string(),
                countries: vec!["Atlantis".to_string()],
                ..ChartSpecFile::default()
            }),
            &index(),
            &dataset(),
        )
        .unwrap_err();
        assert!(matches!(err, ChartError::UnknownCountry(_)));
    }

    #[test]
    fn localized_title_and_filename() {
        use crate::index::Lang;
        let bound = BoundChart::bind(
            spec(ChartSpecFile {
                indicator: "1010".to_string(),
                countries: vec!["France".to_string()],
                ..ChartSpecFile::default()
            }),
            &index(),
            &dataset(),
        )
        .unwrap();
        assert_eq!(bound.title(Lang::En), "Life expectancy at birth");
        assert_eq!(bound.title(Lang::Ru), "Ожидаемая продолжительность жизни");
        assert_eq!(bound.filename(Lang::En), "1010_en.png");
    }
}
