//! Console and JSON report generation.
//!
//! This module turns a loaded table and its aggregates into the ordered
//! text report printed to stdout, or into a single JSON document.

use super::table::{describe_table, render_listing, rows_table};
use crate::analysis::stats::Describe;
use crate::analysis::Aggregation;
use crate::models::{Measurement, WeatherSummary, WeatherTable};
use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;

/// Width of the title banner.
const TITLE_RULE: usize = 60;
/// Width of a section banner.
const SECTION_RULE: usize = 40;

/// Layout settings of the text report.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub title: String,
    pub head_rows: usize,
    pub tail_rows: usize,
    pub display_width: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: "Jaipur".to_string(),
            head_rows: 10,
            tail_rows: 5,
            display_width: 120,
        }
    }
}

/// Generate the complete text report.
pub fn generate_text_report(
    table: &WeatherTable,
    summary: &WeatherSummary,
    options: &ReportOptions,
) -> String {
    let mut output = String::new();

    output.push_str(&generate_title(&options.title));
    output.push_str(&generate_overview_section(table));
    output.push_str(&generate_head_section(table, options));
    output.push_str(&generate_tail_section(table, options));
    output.push_str(&generate_describe_section(table, options));
    output.push_str(&generate_types_section(table));
    output.push_str(&generate_summary_section(summary));

    output
}

fn banner(width: usize, heading: &str) -> String {
    let rule = "=".repeat(width);
    format!("{}\n{}\n{}\n", rule, heading, rule)
}

/// Generate a section heading, preceded by a blank line.
pub fn generate_section_heading(heading: &str) -> String {
    format!("\n{}", banner(SECTION_RULE, heading))
}

fn generate_title(title: &str) -> String {
    banner(
        TITLE_RULE,
        &format!("WEATHER DATA ANALYSIS - {}", title.to_uppercase()),
    )
}

/// Shape, date range and row count.
fn generate_overview_section(table: &WeatherTable) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "\nDataset Shape: ({}, {})\n",
        table.row_count(),
        table.column_count()
    ));
    match table.date_range() {
        Some((start, end)) => section.push_str(&format!(
            "Date Range: {} to {}\n",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        )),
        None => section.push_str("Date Range: N/A\n"),
    }
    section.push_str(&format!("Total Days: {}\n", table.row_count()));

    section
}

fn generate_head_section(table: &WeatherTable, options: &ReportOptions) -> String {
    let mut section = generate_section_heading(&format!("FIRST {} ROWS OF DATA", options.head_rows));
    section.push_str(&generate_rows(table, 0..options.head_rows, options));
    section
}

fn generate_tail_section(table: &WeatherTable, options: &ReportOptions) -> String {
    let mut section = generate_section_heading(&format!("LAST {} ROWS OF DATA", options.tail_rows));
    let start = table.row_count().saturating_sub(options.tail_rows);
    section.push_str(&generate_rows(table, start..table.row_count(), options));
    section
}

fn generate_rows(
    table: &WeatherTable,
    rows: std::ops::Range<usize>,
    options: &ReportOptions,
) -> String {
    if table.is_empty() {
        let names: Vec<&str> = table.columns().iter().map(|c| c.name.as_str()).collect();
        return format!("Empty table\nColumns: [{}]\n", names.join(", "));
    }
    format!("{}\n", rows_table(table, rows).render(options.display_width))
}

fn generate_describe_section(table: &WeatherTable, options: &ReportOptions) -> String {
    let mut section = generate_section_heading("STATISTICAL SUMMARY");
    section.push_str(&describe_table(table).render(options.display_width));
    section.push('\n');
    section
}

/// Column types and missing-value counts.
fn generate_types_section(table: &WeatherTable) -> String {
    let mut section = generate_section_heading("DATA TYPES AND MISSING VALUES");

    let types: Vec<(String, String)> = table
        .columns()
        .iter()
        .map(|c| (c.name.clone(), c.kind().to_string()))
        .collect();
    section.push_str("Data Types:\n");
    section.push_str(&render_listing(&types));
    section.push('\n');

    let nulls: Vec<(String, String)> = table
        .columns()
        .iter()
        .map(|c| (c.name.clone(), c.null_count().to_string()))
        .collect();
    section.push_str("\nMissing Values:\n");
    section.push_str(&render_listing(&nulls));
    section.push('\n');

    section
}

/// Format a value with `decimals` places, or `N/A` when undefined.
fn value_or_na(value: Option<f64>, decimals: usize, unit: &str) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}{}", decimals, v, unit),
        _ => "N/A".to_string(),
    }
}

/// Unit as printed after a value; word units get a leading space.
fn unit_suffix(measurement: Measurement) -> String {
    match measurement.unit() {
        "°C" | "%" => measurement.unit().to_string(),
        unit => format!(" {}", unit),
    }
}

/// Lines of one statistics group, all values sharing `unit`.
fn generate_group(heading: &str, values: &[(&str, Option<f64>)], unit: &str) -> String {
    let mut group = format!("{}:\n", heading);
    for (label, value) in values {
        group.push_str(&format!("  {}: {}\n", label, value_or_na(*value, 2, unit)));
    }
    group
}

/// The derived statistics battery.
fn generate_summary_section(summary: &WeatherSummary) -> String {
    let mut section = generate_section_heading("SUMMARY STATISTICS");
    let mm = unit_suffix(Measurement::Rainfall);

    section.push_str(&generate_group(
        "Temperature Statistics",
        &[
            ("Mean Temperature", summary.mean_temperature),
            ("Max Temperature", summary.max_temperature),
            ("Min Temperature", summary.min_temperature),
            ("Temperature Range", summary.temperature_range),
        ],
        &unit_suffix(Measurement::MeanTemperature),
    ));

    section.push_str("\nRainfall Statistics:\n");
    section.push_str(&format!(
        "  Total Rainfall: {}\n",
        value_or_na(Some(summary.total_rainfall), 2, &mm)
    ));
    section.push_str(&format!("  Days with Rain: {} days\n", summary.rainy_days));
    section.push_str(&format!(
        "  Rainy Days Percentage: {}\n",
        value_or_na(summary.rainy_days_percentage, 1, "%")
    ));
    section.push_str(&format!(
        "  Average Rainfall (when it rains): {}\n",
        value_or_na(summary.average_rainfall_when_raining, 2, &mm)
    ));
    section.push_str(&format!(
        "  Maximum Daily Rainfall: {}\n",
        value_or_na(summary.max_daily_rainfall, 2, &mm)
    ));

    section.push('\n');
    section.push_str(&generate_group(
        "Humidity Statistics",
        &[
            ("Average Max Humidity", summary.average_max_humidity),
            ("Average Min Humidity", summary.average_min_humidity),
            ("Humidity Range", summary.humidity_range),
        ],
        &unit_suffix(Measurement::MaxHumidity),
    ));

    section.push('\n');
    section.push_str(&generate_group(
        "Pressure Statistics",
        &[
            ("Average Pressure", summary.average_pressure),
            ("Pressure Range", summary.pressure_range),
            ("Min Pressure", summary.min_pressure),
            ("Max Pressure", summary.max_pressure),
        ],
        &unit_suffix(Measurement::MeanPressure),
    ));

    section
}

/// Generate the completion banner listing the files written.
pub fn generate_completion_banner(files: &[PathBuf]) -> String {
    let mut footer = generate_section_heading("ANALYSIS COMPLETE!");

    footer.push_str("Files generated:\n");
    for file in files {
        footer.push_str(&format!("- {}\n", file.display()));
    }

    footer
}

#[derive(Debug, Serialize)]
struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Debug, Serialize)]
struct ColumnDescribe<'a> {
    column: &'a str,
    #[serde(flatten)]
    stats: Describe,
}

#[derive(Debug, Serialize)]
struct ColumnInfo<'a> {
    column: &'a str,
    dtype: String,
    nulls: usize,
}

/// The JSON form of the report.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    title: &'a str,
    shape: (usize, usize),
    date_range: Option<DateRange>,
    describe: Vec<ColumnDescribe<'a>>,
    columns: Vec<ColumnInfo<'a>>,
    summary: &'a WeatherSummary,
    #[serde(flatten)]
    aggregation: &'a Aggregation,
    files_generated: Vec<String>,
}

/// Generate a JSON report; `files` are the chart files already written.
pub fn generate_json_report(
    table: &WeatherTable,
    summary: &WeatherSummary,
    aggregation: &Aggregation,
    files: &[PathBuf],
    options: &ReportOptions,
) -> Result<String> {
    let report = JsonReport {
        title: &options.title,
        shape: (table.row_count(), table.column_count()),
        date_range: table
            .date_range()
            .map(|(start, end)| DateRange { start, end }),
        describe: table
            .columns()
            .iter()
            .filter_map(|c| {
                c.floats().map(|values| ColumnDescribe {
                    column: &c.name,
                    stats: Describe::of(values),
                })
            })
            .collect(),
        columns: table
            .columns()
            .iter()
            .map(|c| ColumnInfo {
                column: &c.name,
                dtype: c.kind().to_string(),
                nulls: c.null_count(),
            })
            .collect(),
        summary,
        aggregation,
        files_generated: files.iter().map(|f| f.display().to_string()).collect(),
    };

    serde_json::to_string_pretty(&report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeatherRecord;

    fn create_test_table(rain: &[f64]) -> WeatherTable {
        let records: Vec<WeatherRecord> = rain
            .iter()
            .enumerate()
            .map(|(i, r)| {
                WeatherRecord::new(
                    NaiveDate::from_ymd_opt(2023, 1, i as u32 + 1).unwrap(),
                    [20.0 + i as f64, 25.0 + i as f64, 15.0, 80.0, 30.0, *r, 1010.0],
                )
            })
            .collect();
        WeatherTable::from_records(&records)
    }

    fn render(table: &WeatherTable) -> String {
        generate_text_report(
            table,
            &WeatherSummary::from_table(table),
            &ReportOptions::default(),
        )
    }

    #[test]
    fn test_generate_text_report_sections_in_order() {
        let report = render(&create_test_table(&[0.0, 5.0, 0.0, 3.0]));

        let headings = [
            "WEATHER DATA ANALYSIS - JAIPUR",
            "Dataset Shape:",
            "FIRST 10 ROWS OF DATA",
            "LAST 5 ROWS OF DATA",
            "STATISTICAL SUMMARY",
            "Data Types:",
            "Missing Values:",
            "SUMMARY STATISTICS",
        ];
        let positions: Vec<usize> = headings
            .iter()
            .map(|h| report.find(h).unwrap_or_else(|| panic!("missing {}", h)))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(report.starts_with(&"=".repeat(60)));
    }

    #[test]
    fn test_shape_matches_table() {
        let table = create_test_table(&[0.0, 1.0, 2.0]);
        let report = render(&table);
        assert!(report.contains("Dataset Shape: (3, 8)"));
        assert!(report.contains("Total Days: 3"));
        assert!(report.contains("Date Range: 2023-01-01 to 2023-01-03"));
    }

    #[test]
    fn test_rain_fixture_lines() {
        let report = render(&create_test_table(&[0.0, 5.0, 0.0, 3.0]));

        assert!(report.contains("  Days with Rain: 2 days\n"));
        assert!(report.contains("  Rainy Days Percentage: 50.0%\n"));
        assert!(report.contains("  Total Rainfall: 8.00 mm\n"));
        assert!(report.contains("  Average Rainfall (when it rains): 4.00 mm\n"));
        assert!(report.contains("  Mean Temperature: 21.50°C\n"));
        assert!(report.contains("  Average Pressure: 1010.00 hPa\n"));
        assert!(report.contains("  Humidity Range: 50.00%\n"));
    }

    #[test]
    fn test_report_is_deterministic() {
        let table = create_test_table(&[0.0, 2.5, 7.25]);
        assert_eq!(render(&table), render(&table));
    }

    #[test]
    fn test_undefined_values_print_na() {
        let report = render(&create_test_table(&[]));
        assert!(report.contains("Date Range: N/A"));
        assert!(report.contains("  Mean Temperature: N/A\n"));
        assert!(report.contains("  Rainy Days Percentage: N/A\n"));
        assert!(report.contains("  Total Rainfall: 0.00 mm\n"));
        assert!(report.contains("Empty table"));
    }

    #[test]
    fn test_head_and_tail_respect_options() {
        let table = create_test_table(&[0.0; 8]);
        let options = ReportOptions {
            head_rows: 2,
            tail_rows: 3,
            ..ReportOptions::default()
        };
        let report = generate_text_report(&table, &WeatherSummary::from_table(&table), &options);

        assert!(report.contains("FIRST 2 ROWS OF DATA"));
        assert!(report.contains("LAST 3 ROWS OF DATA"));
        let tail = &report[report.find("LAST 3 ROWS").unwrap()..report.find("STATISTICAL").unwrap()];
        assert!(tail.contains("2023-01-06"));
        assert!(!tail.contains("2023-01-05"));
    }

    #[test]
    fn test_completion_banner() {
        let banner = generate_completion_banner(&[
            PathBuf::from("weather_analysis_main.png"),
            PathBuf::from("weather_additional_analysis.png"),
        ]);
        assert!(banner.contains("ANALYSIS COMPLETE!"));
        assert!(banner.contains("Files generated:\n- weather_analysis_main.png\n"));
        assert!(banner.ends_with("- weather_additional_analysis.png\n"));
    }

    #[test]
    fn test_generate_json_report() {
        let table = create_test_table(&[0.0, 5.0, 0.0, 3.0]);
        let summary = WeatherSummary::from_table(&table);
        let aggregation = Aggregation::compute(&table);
        let files = vec![PathBuf::from("charts/weather_analysis_main.png")];
        let json = generate_json_report(
            &table,
            &summary,
            &aggregation,
            &files,
            &ReportOptions::default(),
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["shape"], serde_json::json!([4, 8]));
        assert_eq!(value["date_range"]["start"], "2023-01-01");
        assert_eq!(value["summary"]["rainy_days"], 2);
        assert_eq!(value["describe"].as_array().unwrap().len(), 7);
        assert_eq!(value["describe"][0]["25%"], 20.75);
        assert_eq!(value["columns"][0]["dtype"], "date");
        assert_eq!(value["monthly_mean_temperature"].as_array().unwrap().len(), 12);
        assert!(value["temperature_correlation"]["values"].is_array());
        assert_eq!(
            value["files_generated"],
            serde_json::json!(["charts/weather_analysis_main.png"])
        );
    }

    #[test]
    fn test_json_report_without_charts_lists_no_files() {
        let table = create_test_table(&[1.0]);
        let json = generate_json_report(
            &table,
            &WeatherSummary::from_table(&table),
            &Aggregation::compute(&table),
            &[],
            &ReportOptions::default(),
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["files_generated"], serde_json::json!([]));
    }
}
