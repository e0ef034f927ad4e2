//! Parse one HFA "Table A" HTML export into long-format records.
//!
//! Layout contract: row 0 holds the indicator label; row 1 holds year column
//! headers (first cell is a corner label and is ignored); every following row
//! starts with a `"<4-digit-id> <country name>"` cell and carries one value
//! cell per year. `"..."` marks a missing value.

use std::fmt;

use crate::data::record::Record;
use crate::html;

/// Sentinel the HFA exports use for a missing observation.
const MISSING_SENTINEL: &str = "...";

#[derive(Debug)]
pub enum TableError {
    /// No `<table>` element in the file.
    NoTable,
    /// Fewer than the indicator row, header row and one data row.
    TooFewRows(usize),
    /// Indicator row was blank.
    EmptyIndicator,
    /// Header row had no year columns.
    NoYearColumns,
    /// A year column header did not parse as an integer.
    BadYearHeader(String),
    /// A data row's first cell did not split into "<id> <name>".
    BadCountryCell(String),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTable => write!(f, "no <table> element found"),
            Self::TooFewRows(n) => write!(f, "expected at least 3 rows, found {n}"),
            Self::EmptyIndicator => write!(f, "indicator row is empty"),
            Self::NoYearColumns => write!(f, "header row has no year columns"),
            Self::BadYearHeader(cell) => write!(f, "year header '{cell}' is not an integer"),
            Self::BadCountryCell(cell) => {
                write!(f, "country cell '{cell}' is not '<id> <name>'")
            }
        }
    }
}

/// Wide-format extract of one table: one row per country, one column per year.
#[derive(Debug, Clone, PartialEq)]
pub struct TableExtract {
    pub indicator: String,
    pub years: Vec<i32>,
    pub rows: Vec<CountryRow>,
}

/// One wide row: values aligned with `TableExtract::years`, None = missing.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryRow {
    pub country_id: String,
    pub country: String,
    pub values: Vec<Option<f64>>,
}

/// Parse the first table in `html` into a wide extract.
pub fn parse_table(html: &str) -> Result<TableExtract, TableError> {
    let table = html::inner_of_first(html, "table").ok_or(TableError::NoTable)?;
    let rows = html::inner_blocks(table, "tr");
    if rows.len() < 3 {
        return Err(TableError::TooFewRows(rows.len()));
    }

    let indicator = html::text_content(rows[0]);
    if indicator.is_empty() {
        return Err(TableError::EmptyIndicator);
    }

    // Header row: first cell is the corner label, rest are years.
    let header_cells = html::inner_blocks(rows[1], "td");
    if header_cells.len() < 2 {
        return Err(TableError::NoYearColumns);
    }
    let mut years = Vec::with_capacity(header_cells.len() - 1);
    for cell in &header_cells[1..] {
        let text = html::text_content(cell);
        let year = text
            .parse::<i32>()
            .map_err(|_| TableError::BadYearHeader(text.clone()))?;
        years.push(year);
    }

    let mut country_rows = Vec::with_capacity(rows.len() - 2);
    for row in &rows[2..] {
        let cells = html::inner_blocks(row, "td");
        if cells.is_empty() {
            continue;
        }
        let label = html::text_content(cells[0]);
        let (country_id, country) = split_country_cell(&label)
            .ok_or_else(|| TableError::BadCountryCell(label.clone()))?;

        let values = years
            .iter()
            .enumerate()
            .map(|(i, _)| cells.get(i + 1).and_then(|c| parse_value(&html::text_content(c))))
            .collect();

        country_rows.push(CountryRow {
            country_id,
            country,
            values,
        });
    }

    Ok(TableExtract {
        indicator,
        years,
        rows: country_rows,
    })
}

/// Reshape a wide extract to long format, dropping missing values.
pub fn reshape(extract: &TableExtract) -> Vec<Record> {
    let mut records = Vec::new();
    for row in &extract.rows {
        for (year, value) in extract.years.iter().zip(&row.values) {
            if let Some(value) = value {
                records.push(Record {
                    country_id: row.country_id.clone(),
                    country: row.country.clone(),
                    indicator: extract.indicator.clone(),
                    year: *year,
                    value: *value,
                });
            }
        }
    }
    records
}

/// Split `"0001 Albania"` into id and name at the first space. The id side
/// must be all digits; anything else fails the row.
fn split_country_cell(label: &str) -> Option<(String, String)> {
    let (id, name) = label.split_once(' ')?;
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((id.to_string(), name.to_string()))
}

/// Missing sentinel, empty and unparseable cells all count as absent.
fn parse_value(text: &str) -> Option<f64> {
    if text.is_empty() || text == MISSING_SENTINEL {
        return None;
    }
    text.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::{parse_table, reshape, TableError};

    const TABLE: &str = "<html><body><table border=1>\
        <tr><td colspan=3>Life expectancy</td></tr>\
        <tr><td>Country</td><td>2000</td><td>2001</td></tr>\
        <tr><td>0001 Country A</td><td>70</td><td>71</td></tr>\
        </table></body></html>";

    #[test]
    fn two_year_row_yields_two_records() {
        let extract = parse_table(TABLE).unwrap();
        assert_eq!(extract.indicator, "Life expectancy");
        assert_eq!(extract.years, vec![2000, 2001]);

        let records = reshape(&extract);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].country_id, "0001");
        assert_eq!(records[0].country, "Country A");
        assert_eq!(records[0].indicator, "Life expectancy");
        assert_eq!(records[0].year, 2000);
        assert_eq!(records[0].value, 70.0);
        assert_eq!(records[1].year, 2001);
        assert_eq!(records[1].value, 71.0);
    }

    #[test]
    fn sentinel_and_garbage_cells_are_dropped() {
        let html = "<table>\
            <tr><td>Infant deaths</td></tr>\
            <tr><td></td><td>1990</td><td>1991</td><td>1992</td></tr>\
            <tr><td>0002 Country B</td><td>...</td><td>12.5</td><td>n/a</td></tr>\
            </table>";
        let records = reshape(&parse_table(html).unwrap());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].year, 1991);
        assert_eq!(records[0].value, 12.5);
    }

    #[test]
    fn short_rows_leave_trailing_years_missing() {
        let html = "<table>\
            <tr><td>Hospital beds</td></tr>\
            <tr><td></td><td>2005</td><td>2006</td></tr>\
            <tr><td>0003 Country C</td><td>4.2</td></tr>\
            </table>";
        let records = reshape(&parse_table(html).unwrap());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].year, 2005);
    }

    #[test]
    fn missing_table_is_malformed() {
        assert!(matches!(parse_table("<html><p>nope</p></html>"), Err(TableError::NoTable)));
    }

    #[test]
    fn too_few_rows_is_malformed() {
        let html = "<table><tr><td>Only a title</td></tr></table>";
        assert!(matches!(parse_table(html), Err(TableError::TooFewRows(1))));
    }

    #[test]
    fn non_numeric_year_header_is_malformed() {
        let html = "<table>\
            <tr><td>X</td></tr>\
            <tr><td></td><td>banana</td></tr>\
            <tr><td>0001 A</td><td>1</td></tr>\
            </table>";
        assert!(matches!(parse_table(html), Err(TableError::BadYearHeader(_))));
    }

    #[test]
    fn country_cell_without_numeric_id_is_malformed() {
        let html = "<table>\
            <tr><td>X</td></tr>\
            <tr><td></td><td>2000</td></tr>\
            <tr><td>NoIdHere</td><td>1</td></tr>\
            </table>";
        assert!(matches!(parse_table(html), Err(TableError::BadCountryCell(_))));
    }
}
