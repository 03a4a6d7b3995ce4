//! CSV loader for weather datasets.
//!
//! Reads a delimited file with a header row into a [`WeatherTable`]. The
//! `date` column is parsed as a calendar date, the required measurement
//! columns as `f64`, and every other column is kept as numeric when all of
//! its cells parse, text otherwise.

use crate::error::{Result, WeatherError};
use crate::models::{Column, ColumnValues, Measurement, WeatherTable, DATE_COLUMN};
use anyhow::anyhow;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

/// Cell texts treated as missing values.
const MISSING_MARKERS: [&str; 9] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None", "#N/A"];

/// Accepted date layouts, tried in order.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y"];

/// Options controlling how the file is parsed.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl From<&crate::config::LoaderConfig> for LoadOptions {
    fn from(config: &crate::config::LoaderConfig) -> Self {
        Self {
            delimiter: config.delimiter_byte(),
        }
    }
}

/// Raw cells of one column plus the source line of each row.
struct RawColumn<'a> {
    name: &'a str,
    cells: Vec<&'a str>,
    lines: &'a [u64],
}

/// Load a weather table from `path`.
pub fn load_table(path: &Path, options: &LoadOptions) -> Result<WeatherTable> {
    debug!("Opening {}", path.display());

    if path.is_dir() {
        return Err(WeatherError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound | ErrorKind::PermissionDenied => WeatherError::InputNotFound {
            path: path.to_path_buf(),
        },
        _ => WeatherError::Other(anyhow!(e).context(format!("Failed to open {}", path.display()))),
    })?;

    let table = read_table(file, options)?;

    info!(
        "Loaded {} rows x {} columns from {}",
        table.row_count(),
        table.column_count(),
        path.display()
    );
    Ok(table)
}

/// Parse a weather table from any reader.
pub fn read_table<R: std::io::Read>(reader: R, options: &LoadOptions) -> Result<WeatherTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(WeatherError::data_format("file has no header row"));
    }

    let mut seen = HashSet::new();
    for header in &headers {
        if !seen.insert(header.as_str()) {
            return Err(WeatherError::data_format(format!(
                "duplicate column '{}'",
                header
            )));
        }
    }

    let mut records = Vec::new();
    let mut lines = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(csv_error)?;
        lines.push(record.position().map(|p| p.line()).unwrap_or(0));
        records.push(record);
    }
    debug!("Read {} data rows", records.len());

    let mut columns = Vec::with_capacity(headers.len());
    for (idx, name) in headers.iter().enumerate() {
        let raw = RawColumn {
            name,
            cells: records.iter().map(|r| r.get(idx).unwrap_or("")).collect(),
            lines: &lines,
        };
        columns.push(build_column(&raw)?);
    }

    WeatherTable::from_columns(columns)
}

fn build_column(raw: &RawColumn<'_>) -> Result<Column> {
    let is_required = Measurement::ALL
        .iter()
        .any(|m| m.column_name() == raw.name);

    let values = if raw.name == DATE_COLUMN {
        ColumnValues::Date(parse_dates(raw)?)
    } else if is_required {
        ColumnValues::Float(parse_floats(raw)?)
    } else {
        match parse_floats(raw) {
            Ok(values) => ColumnValues::Float(values),
            Err(_) => {
                debug!("Column '{}' kept as text", raw.name);
                ColumnValues::Text(
                    raw.cells
                        .iter()
                        .map(|c| (!is_missing(c)).then(|| c.to_string()))
                        .collect(),
                )
            }
        }
    };

    Ok(Column::new(raw.name, values))
}

fn parse_dates(raw: &RawColumn<'_>) -> Result<Vec<Option<NaiveDate>>> {
    raw.cells
        .iter()
        .zip(raw.lines)
        .map(|(cell, line)| {
            if is_missing(cell) {
                return Ok(None);
            }
            parse_date(cell).map(Some).ok_or_else(|| {
                WeatherError::data_format(format!(
                    "line {}: column '{}': '{}' is not a valid date",
                    line, raw.name, cell
                ))
            })
        })
        .collect()
}

fn parse_floats(raw: &RawColumn<'_>) -> Result<Vec<Option<f64>>> {
    raw.cells
        .iter()
        .zip(raw.lines)
        .map(|(cell, line)| {
            if is_missing(cell) {
                return Ok(None);
            }
            let value = cell.parse::<f64>().map_err(|_| {
                WeatherError::data_format(format!(
                    "line {}: column '{}': '{}' is not a number",
                    line, raw.name, cell
                ))
            })?;
            if value.is_infinite() {
                return Err(WeatherError::data_format(format!(
                    "line {}: column '{}': '{}' is not a finite number",
                    line, raw.name, cell
                )));
            }
            Ok(Some(value))
        })
        .collect()
}

/// Whether a cell holds a missing-value marker.
pub fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell.trim())
}

/// Parse a date in any of the accepted layouts; a time part is discarded.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

fn csv_error(e: csv::Error) -> WeatherError {
    if let csv::ErrorKind::Io(_) = e.kind() {
        WeatherError::Other(anyhow!(e).context("Failed to read input file"))
    } else {
        WeatherError::data_format(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColumnKind;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const HEADER: &str =
        "date,mean_temperature,max_temperature,min_temperature,max_humidity,min_humidity,rainfall,mean_pressure";

    fn parse(text: &str) -> Result<WeatherTable> {
        read_table(text.as_bytes(), &LoadOptions::default())
    }

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures")
            .join(name)
    }

    #[test]
    fn test_read_minimal_table() {
        let text = format!(
            "{}\n2023-01-01,20,25,15,80,30,0,1010\n2023-01-02,21,26,16,82,31,5.5,1011\n",
            HEADER
        );
        let table = parse(&text).unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 8);
        assert_eq!(
            table.dates()[1],
            NaiveDate::from_ymd_opt(2023, 1, 2)
        );
        assert_eq!(table.values(Measurement::Rainfall), &[Some(0.0), Some(5.5)]);
    }

    #[test]
    fn test_missing_cells_are_null() {
        let text = format!(
            "{}\n2023-01-01,20,25,15,80,30,,1010\n,21,26,16,NA,31,0,1011\n",
            HEADER
        );
        let table = parse(&text).unwrap();

        assert_eq!(table.values(Measurement::Rainfall)[0], None);
        assert_eq!(table.values(Measurement::MaxHumidity)[1], None);
        assert_eq!(table.dates()[1], None);
        assert_eq!(table.columns()[0].null_count(), 1);
    }

    #[test]
    fn test_missing_required_column() {
        let text = "date,mean_temperature\n2023-01-01,20\n";
        let err = parse(text).unwrap_err();
        assert!(matches!(err, WeatherError::DataFormat { .. }));
        assert!(err.to_string().contains("max_temperature"));
    }

    #[test]
    fn test_non_numeric_measurement_names_line_and_column() {
        let text = format!("{}\n2023-01-01,20,25,15,80,30,heavy,1010\n", HEADER);
        let err = parse(&text).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, WeatherError::DataFormat { .. }));
        assert!(message.contains("rainfall"));
        assert!(message.contains("heavy"));
        assert!(message.contains("line 2"));
    }

    #[test]
    fn test_infinite_measurement_is_format_error() {
        for cell in ["inf", "-inf", "Infinity"] {
            let text = format!(
                "{}\n2023-01-01,20,25,15,80,30,0,1010\n2023-01-02,20,25,15,80,30,{},1010\n",
                HEADER, cell
            );
            let err = parse(&text).unwrap_err();
            let message = err.to_string();
            assert!(matches!(err, WeatherError::DataFormat { .. }));
            assert!(message.contains("line 3"));
            assert!(message.contains("rainfall"));
            assert!(message.contains(cell));
        }
    }

    #[test]
    fn test_unparseable_date() {
        let text = format!("{}\nyesterday,20,25,15,80,30,0,1010\n", HEADER);
        let err = parse(&text).unwrap_err();
        assert!(err.to_string().contains("not a valid date"));
    }

    #[test]
    fn test_ragged_row_is_format_error() {
        let text = format!("{}\n2023-01-01,20,25\n", HEADER);
        assert!(matches!(
            parse(&text).unwrap_err(),
            WeatherError::DataFormat { .. }
        ));
    }

    #[test]
    fn test_empty_file_is_format_error() {
        assert!(matches!(parse("").unwrap_err(), WeatherError::DataFormat { .. }));
    }

    #[test]
    fn test_header_only_gives_empty_table() {
        let table = parse(&format!("{}\n", HEADER)).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.column_count(), 8);
    }

    #[test]
    fn test_extra_columns_keep_file_order_and_type() {
        let text = "station,date,mean_temperature,max_temperature,min_temperature,max_humidity,min_humidity,rainfall,mean_pressure,dew\n\
                    JAI,2023-01-01,20,25,15,80,30,0,1010,9.5\n\
                    JAI,2023-01-02,21,26,16,82,31,0,1011,\n";
        let table = parse(text).unwrap();

        assert_eq!(table.column_count(), 10);
        assert_eq!(table.columns()[0].name, "station");
        assert_eq!(table.columns()[0].kind(), ColumnKind::Text);
        assert_eq!(table.columns()[9].kind(), ColumnKind::Float);
        assert_eq!(table.columns()[9].null_count(), 1);
        assert_eq!(table.dates().len(), 2);
    }

    #[test]
    fn test_semicolon_delimiter() {
        let text = "date;mean_temperature;max_temperature;min_temperature;max_humidity;min_humidity;rainfall;mean_pressure\n\
                    2023-01-01;20;25;15;80;30;1.5;1010\n";
        let table = read_table(text.as_bytes(), &LoadOptions { delimiter: b';' }).unwrap();
        assert_eq!(table.values(Measurement::Rainfall), &[Some(1.5)]);
    }

    #[test]
    fn test_duplicate_header_rejected() {
        let text = format!("{},rainfall\n", HEADER);
        assert!(parse(&text).unwrap_err().to_string().contains("duplicate"));
    }

    #[test]
    fn test_parse_date_layouts() {
        let expected = NaiveDate::from_ymd_opt(2016, 5, 1);
        assert_eq!(parse_date("2016-05-01"), expected);
        assert_eq!(parse_date("2016/05/01"), expected);
        assert_eq!(parse_date("01-05-2016"), expected);
        assert_eq!(parse_date("01/05/2016"), expected);
        assert_eq!(parse_date("2016-05-01 00:00:00"), expected);
        assert_eq!(parse_date("May 1st"), None);
    }

    #[test]
    fn test_nonexistent_path_is_input_not_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.csv");
        let err = load_table(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, WeatherError::InputNotFound { .. }));
    }

    #[test]
    fn test_directory_is_input_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load_table(dir.path(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, WeatherError::InputNotFound { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("weather.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, "2023-01-01,20,25,15,80,30,0,1010").unwrap();
        drop(file);

        let table = load_table(&path, &LoadOptions::default()).unwrap();
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_load_jaipur_fixture() {
        let table = load_table(&fixture("jaipur_sample.csv"), &LoadOptions::default()).unwrap();

        assert_eq!(table.row_count(), 14);
        assert_eq!(table.column_count(), 17);
        assert!(table
            .columns()
            .iter()
            .filter(|c| c.name != DATE_COLUMN)
            .all(|c| c.kind() == ColumnKind::Float));
    }
}
