//! Data models for the weather report.
//!
//! This module contains the in-memory weather table produced by the loader,
//! the per-row view used by consumers, and the summary statistics battery.

use crate::analysis::stats;
use crate::error::{Result, WeatherError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the column parsed as a calendar date.
pub const DATE_COLUMN: &str = "date";

/// The numeric measurement columns every input must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measurement {
    MeanTemperature,
    MaxTemperature,
    MinTemperature,
    MaxHumidity,
    MinHumidity,
    Rainfall,
    MeanPressure,
}

impl Measurement {
    /// All measurements, in canonical column order.
    pub const ALL: [Measurement; 7] = [
        Measurement::MeanTemperature,
        Measurement::MaxTemperature,
        Measurement::MinTemperature,
        Measurement::MaxHumidity,
        Measurement::MinHumidity,
        Measurement::Rainfall,
        Measurement::MeanPressure,
    ];

    /// The three temperature columns compared by the correlation matrix.
    pub const TEMPERATURES: [Measurement; 3] = [
        Measurement::MeanTemperature,
        Measurement::MaxTemperature,
        Measurement::MinTemperature,
    ];

    /// Header name of the column in the input file.
    pub fn column_name(&self) -> &'static str {
        match self {
            Measurement::MeanTemperature => "mean_temperature",
            Measurement::MaxTemperature => "max_temperature",
            Measurement::MinTemperature => "min_temperature",
            Measurement::MaxHumidity => "max_humidity",
            Measurement::MinHumidity => "min_humidity",
            Measurement::Rainfall => "rainfall",
            Measurement::MeanPressure => "mean_pressure",
        }
    }

    /// Unit suffix used in printed values.
    pub fn unit(&self) -> &'static str {
        match self {
            Measurement::MeanTemperature
            | Measurement::MaxTemperature
            | Measurement::MinTemperature => "°C",
            Measurement::MaxHumidity | Measurement::MinHumidity => "%",
            Measurement::Rainfall => "mm",
            Measurement::MeanPressure => "hPa",
        }
    }

    fn index(&self) -> usize {
        match self {
            Measurement::MeanTemperature => 0,
            Measurement::MaxTemperature => 1,
            Measurement::MinTemperature => 2,
            Measurement::MaxHumidity => 3,
            Measurement::MinHumidity => 4,
            Measurement::Rainfall => 5,
            Measurement::MeanPressure => 6,
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_name())
    }
}

/// Declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Date,
    Float,
    Text,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Date => write!(f, "date"),
            ColumnKind::Float => write!(f, "float64"),
            ColumnKind::Text => write!(f, "text"),
        }
    }
}

/// Cell storage for one column; `None` is a missing value.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Date(Vec<Option<NaiveDate>>),
    Float(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

/// A named column of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Header name, trimmed.
    pub name: String,
    /// Cell values, one per row.
    pub values: ColumnValues,
}

impl Column {
    pub fn new(name: impl Into<String>, values: ColumnValues) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self.values {
            ColumnValues::Date(_) => ColumnKind::Date,
            ColumnValues::Float(_) => ColumnKind::Float,
            ColumnValues::Text(_) => ColumnKind::Text,
        }
    }

    pub fn len(&self) -> usize {
        match &self.values {
            ColumnValues::Date(v) => v.len(),
            ColumnValues::Float(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    /// Number of missing cells (NaN counts as missing).
    pub fn null_count(&self) -> usize {
        match &self.values {
            ColumnValues::Date(v) => v.iter().filter(|d| d.is_none()).count(),
            ColumnValues::Float(v) => v.len() - stats::count(v),
            ColumnValues::Text(v) => v.iter().filter(|s| s.is_none()).count(),
        }
    }

    /// Numeric view, `None` for non-numeric columns.
    pub fn floats(&self) -> Option<&[Option<f64>]> {
        match &self.values {
            ColumnValues::Float(v) => Some(v),
            _ => None,
        }
    }
}

/// One row of the table, restricted to the required columns.
///
/// Tests build small in-memory tables from these.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub date: Option<NaiveDate>,
    pub mean_temperature: Option<f64>,
    pub max_temperature: Option<f64>,
    pub min_temperature: Option<f64>,
    pub max_humidity: Option<f64>,
    pub min_humidity: Option<f64>,
    pub rainfall: Option<f64>,
    pub mean_pressure: Option<f64>,
}

#[cfg(test)]
impl WeatherRecord {
    /// A fully populated record.
    pub fn new(date: NaiveDate, values: [f64; 7]) -> Self {
        Self {
            date: Some(date),
            mean_temperature: Some(values[0]),
            max_temperature: Some(values[1]),
            min_temperature: Some(values[2]),
            max_humidity: Some(values[3]),
            min_humidity: Some(values[4]),
            rainfall: Some(values[5]),
            mean_pressure: Some(values[6]),
        }
    }

    /// Value of one measurement.
    pub fn get(&self, measurement: Measurement) -> Option<f64> {
        match measurement {
            Measurement::MeanTemperature => self.mean_temperature,
            Measurement::MaxTemperature => self.max_temperature,
            Measurement::MinTemperature => self.min_temperature,
            Measurement::MaxHumidity => self.max_humidity,
            Measurement::MinHumidity => self.min_humidity,
            Measurement::Rainfall => self.rainfall,
            Measurement::MeanPressure => self.mean_pressure,
        }
    }
}

/// The loaded dataset: every column of the file, in file order.
///
/// Immutable after construction. The date column and the seven measurement
/// columns are located once so row access needs no lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherTable {
    columns: Vec<Column>,
    date_index: usize,
    measurement_index: [usize; 7],
    row_count: usize,
}

impl WeatherTable {
    /// Build a table from loaded columns, checking the required schema.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);

        if let Some(bad) = columns.iter().find(|c| c.len() != row_count) {
            return Err(WeatherError::data_format(format!(
                "column '{}' has {} values, expected {}",
                bad.name,
                bad.len(),
                row_count
            )));
        }

        let position = |name: &str| columns.iter().position(|c| c.name == name);

        let date_index = position(DATE_COLUMN).ok_or_else(|| {
            WeatherError::data_format(format!("missing required column '{}'", DATE_COLUMN))
        })?;
        if columns[date_index].kind() != ColumnKind::Date {
            return Err(WeatherError::data_format(format!(
                "column '{}' must hold dates",
                DATE_COLUMN
            )));
        }

        let mut measurement_index = [0usize; 7];
        for measurement in Measurement::ALL {
            let name = measurement.column_name();
            let idx = position(name).ok_or_else(|| {
                WeatherError::data_format(format!("missing required column '{}'", name))
            })?;
            if columns[idx].kind() != ColumnKind::Float {
                return Err(WeatherError::data_format(format!(
                    "column '{}' must be numeric",
                    name
                )));
            }
            measurement_index[measurement.index()] = idx;
        }

        Ok(Self {
            columns,
            date_index,
            measurement_index,
            row_count,
        })
    }

    /// Build a table holding only the required columns.
    #[cfg(test)]
    pub fn from_records(records: &[WeatherRecord]) -> Self {
        let mut columns = Vec::with_capacity(8);
        columns.push(Column::new(
            DATE_COLUMN,
            ColumnValues::Date(records.iter().map(|r| r.date).collect()),
        ));
        for measurement in Measurement::ALL {
            columns.push(Column::new(
                measurement.column_name(),
                ColumnValues::Float(records.iter().map(|r| r.get(measurement)).collect()),
            ));
        }

        let mut measurement_index = [0usize; 7];
        for (i, measurement) in Measurement::ALL.iter().enumerate() {
            measurement_index[measurement.index()] = i + 1;
        }

        Self {
            columns,
            date_index: 0,
            measurement_index,
            row_count: records.len(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// All columns in file order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[cfg(test)]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The parsed date column.
    pub fn dates(&self) -> &[Option<NaiveDate>] {
        match &self.columns[self.date_index].values {
            ColumnValues::Date(v) => v,
            _ => &[],
        }
    }

    /// Values of one measurement column.
    pub fn values(&self, measurement: Measurement) -> &[Option<f64>] {
        let idx = self.measurement_index[measurement.index()];
        self.columns[idx].floats().unwrap_or(&[])
    }

    /// Row `index` as a record, `None` past the end.
    #[cfg(test)]
    pub fn record(&self, index: usize) -> Option<WeatherRecord> {
        if index >= self.row_count {
            return None;
        }
        let value = |m: Measurement| self.values(m).get(index).copied().flatten();

        Some(WeatherRecord {
            date: self.dates().get(index).copied().flatten(),
            mean_temperature: value(Measurement::MeanTemperature),
            max_temperature: value(Measurement::MaxTemperature),
            min_temperature: value(Measurement::MinTemperature),
            max_humidity: value(Measurement::MaxHumidity),
            min_humidity: value(Measurement::MinHumidity),
            rainfall: value(Measurement::Rainfall),
            mean_pressure: value(Measurement::MeanPressure),
        })
    }

    /// Iterate rows in table order.
    #[cfg(test)]
    pub fn records(&self) -> impl Iterator<Item = WeatherRecord> + '_ {
        (0..self.row_count).filter_map(move |i| self.record(i))
    }

    /// Earliest and latest date, ignoring missing dates.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.dates().iter().flatten();
        let first = *dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(*d), hi.max(*d))))
    }
}

/// The derived statistics battery printed at the end of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSummary {
    pub total_days: usize,
    pub mean_temperature: Option<f64>,
    pub max_temperature: Option<f64>,
    pub min_temperature: Option<f64>,
    pub temperature_range: Option<f64>,
    pub total_rainfall: f64,
    pub rainy_days: usize,
    pub rainy_days_percentage: Option<f64>,
    pub average_rainfall_when_raining: Option<f64>,
    pub max_daily_rainfall: Option<f64>,
    pub average_max_humidity: Option<f64>,
    pub average_min_humidity: Option<f64>,
    pub humidity_range: Option<f64>,
    pub average_pressure: Option<f64>,
    pub pressure_range: Option<f64>,
    pub min_pressure: Option<f64>,
    pub max_pressure: Option<f64>,
}

impl WeatherSummary {
    /// Computes the battery from a table.
    pub fn from_table(table: &WeatherTable) -> Self {
        let max_t = stats::max(table.values(Measurement::MaxTemperature));
        let min_t = stats::min(table.values(Measurement::MinTemperature));

        let rainfall = table.values(Measurement::Rainfall);
        let rainy: Vec<Option<f64>> = rainfall
            .iter()
            .filter(|v| matches!(v, Some(r) if *r > 0.0))
            .copied()
            .collect();
        let total_days = table.row_count();
        let rainy_days = rainy.len();

        let max_h = stats::max(table.values(Measurement::MaxHumidity));
        let min_h = stats::min(table.values(Measurement::MinHumidity));

        let pressure = table.values(Measurement::MeanPressure);
        let min_p = stats::min(pressure);
        let max_p = stats::max(pressure);

        Self {
            total_days,
            mean_temperature: stats::mean(table.values(Measurement::MeanTemperature)),
            max_temperature: max_t,
            min_temperature: min_t,
            temperature_range: difference(max_t, min_t),
            total_rainfall: stats::sum(rainfall),
            rainy_days,
            rainy_days_percentage: if total_days == 0 {
                None
            } else {
                Some(rainy_days as f64 / total_days as f64 * 100.0)
            },
            average_rainfall_when_raining: stats::mean(&rainy),
            max_daily_rainfall: stats::max(rainfall),
            average_max_humidity: stats::mean(table.values(Measurement::MaxHumidity)),
            average_min_humidity: stats::mean(table.values(Measurement::MinHumidity)),
            humidity_range: difference(max_h, min_h),
            average_pressure: stats::mean(pressure),
            pressure_range: difference(max_p, min_p),
            min_pressure: min_p,
            max_pressure: max_p,
        }
    }
}

fn difference(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(a? - b?)
}
