//! Month grouping, correlation and chart-support aggregates.
//!
//! The derived `month` column is computed here and kept next to the table
//! rather than written into it.

use super::stats;
use crate::models::{Measurement, WeatherTable};
use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Short month names, January first.
pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Calendar month (1-12) of every row; `None` where the date is missing.
pub fn derive_months(table: &WeatherTable) -> Vec<Option<u32>> {
    table.dates().iter().map(|d| d.map(|d| d.month())).collect()
}

/// Mean temperature per calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyMeans([Option<f64>; 12]);

impl MonthlyMeans {
    /// Mean for month `m` (1-12); `None` for months without data.
    #[cfg(test)]
    pub fn get(&self, month: u32) -> Option<f64> {
        let idx = month.checked_sub(1)? as usize;
        self.0.get(idx).copied().flatten()
    }

    /// `(month, mean)` for every month that has data, ascending.
    pub fn present(&self) -> Vec<(u32, f64)> {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i as u32 + 1, v)))
            .collect()
    }
}

impl Serialize for MonthlyMeans {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().zip(MONTH_NAMES).map(|(value, name)| MonthEntry {
            month: name,
            mean_temperature: *value,
        }))
    }
}

#[derive(Serialize)]
struct MonthEntry<'a> {
    month: &'a str,
    mean_temperature: Option<f64>,
}

/// Group `measurement` values by month, skipping missing dates and values.
pub fn group_by_month(
    table: &WeatherTable,
    months: &[Option<u32>],
    measurement: Measurement,
) -> BTreeMap<u32, Vec<f64>> {
    let mut grouped: BTreeMap<u32, Vec<f64>> = BTreeMap::new();

    for (month, value) in months.iter().zip(table.values(measurement)) {
        if let (Some(m), Some(v)) = (month, value) {
            if v.is_finite() {
                grouped.entry(*m).or_default().push(*v);
            }
        }
    }

    grouped
}

/// Arithmetic mean of `mean_temperature` for each month 1-12.
pub fn monthly_mean_temperature(table: &WeatherTable, months: &[Option<u32>]) -> MonthlyMeans {
    let grouped = group_by_month(table, months, Measurement::MeanTemperature);
    let mut means = [None; 12];

    for (month, values) in grouped {
        if let Some(slot) = means.get_mut(month as usize - 1) {
            let column: Vec<Option<f64>> = values.into_iter().map(Some).collect();
            *slot = stats::mean(&column);
        }
    }

    MonthlyMeans(means)
}

/// Pairwise complete-case Pearson matrix over the temperature columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub labels: [&'static str; 3],
    pub values: [[Option<f64>; 3]; 3],
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row)?.get(col).copied().flatten()
    }
}

/// Compute the symmetric temperature correlation matrix.
pub fn temperature_correlation(table: &WeatherTable) -> CorrelationMatrix {
    let columns = Measurement::TEMPERATURES;
    let mut values = [[None; 3]; 3];

    for i in 0..3 {
        for j in i..3 {
            let r = stats::pearson(table.values(columns[i]), table.values(columns[j]));
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        labels: columns.map(|m| m.column_name()),
        values,
    }
}

/// Everything the renderer and the JSON report need beyond the raw table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation {
    #[serde(skip)]
    pub months: Vec<Option<u32>>,
    pub monthly_mean_temperature: MonthlyMeans,
    pub temperature_correlation: CorrelationMatrix,
}

impl Aggregation {
    pub fn compute(table: &WeatherTable) -> Self {
        let months = derive_months(table);
        let monthly_mean_temperature = monthly_mean_temperature(table, &months);
        let temperature_correlation = temperature_correlation(table);

        Self {
            months,
            monthly_mean_temperature,
            temperature_correlation,
        }
    }
}

/// One equal-width histogram bin.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram over `[min, max]` of the present values.
///
/// A constant column is spread over `[v - 0.5, v + 0.5]`. The last bin is
/// closed on the right so the maximum is counted.
pub fn histogram(values: &[Option<f64>], bins: usize) -> Vec<HistogramBin> {
    let data = stats::present(values);
    let (Some(lo), Some(hi)) = (stats::min(values), stats::max(values)) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }

    let (lo, hi) = if lo == hi { (lo - 0.5, hi + 0.5) } else { (lo, hi) };
    let width = (hi - lo) / bins as f64;

    let mut result: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: lo + width * i as f64,
            upper: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for v in data {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        result[idx].count += 1;
    }

    result
}

/// Day number used as the x coordinate of time-series charts.
pub fn day_ordinal(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Inverse of [`day_ordinal`], for axis labels.
pub fn date_from_ordinal(x: f64) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

/// `(day, value)` runs of a measurement in table order.
///
/// A missing date or value ends the current run, so lines are broken at
/// gaps instead of bridging them.
pub fn line_segments(table: &WeatherTable, measurement: Measurement) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();

    for (date, value) in table.dates().iter().zip(table.values(measurement)) {
        match (date, value) {
            (Some(d), Some(v)) if v.is_finite() => current.push((day_ordinal(*d), *v)),
            _ => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

/// `(x, y)` pairs where both measurements are present.
pub fn paired_values(table: &WeatherTable, x: Measurement, y: Measurement) -> Vec<(f64, f64)> {
    table
        .values(x)
        .iter()
        .zip(table.values(y))
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) if a.is_finite() && b.is_finite() => Some((*a, *b)),
            _ => None,
        })
        .collect()
}
