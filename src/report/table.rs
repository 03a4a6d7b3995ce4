//! Aligned plain-text tables for the console report.

use crate::analysis::stats::Describe;
use crate::models::{ColumnValues, WeatherTable};
use prettytable::format::{Alignment, FormatBuilder};
use prettytable::{Cell, Row, Table};

/// Marker printed for a missing number or text cell.
const MISSING_VALUE: &str = "NaN";
/// Marker printed for a missing date cell.
const MISSING_DATE: &str = "NaT";
/// Gap between adjacent columns.
const COLUMN_GAP: usize = 2;
/// Gap between names and values in a listing.
const LISTING_GAP: usize = 4;
/// Upper bound on decimals picked for a float column.
const MAX_DECIMALS: usize = 6;

/// A right-aligned table with a leading index column, stored column-major.
#[derive(Debug, Clone, Default)]
pub struct TextTable {
    index: Vec<String>,
    headers: Vec<String>,
    columns: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new(index: Vec<String>) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    pub fn add_column(&mut self, header: impl Into<String>, cells: Vec<String>) {
        self.headers.push(header.into());
        self.columns.push(cells);
    }

    /// Render the table, wrapping columns into blocks no wider than
    /// `max_width`. A column wider than the limit still gets a block.
    pub fn render(&self, max_width: usize) -> String {
        let index_width = self.index.iter().map(|s| width(s)).max().unwrap_or(0);
        let widths: Vec<usize> = self
            .headers
            .iter()
            .zip(&self.columns)
            .map(|(h, cells)| {
                cells
                    .iter()
                    .map(|c| width(c))
                    .chain(std::iter::once(width(h)))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut blocks: Vec<Vec<usize>> = Vec::new();
        let mut current: Vec<usize> = Vec::new();
        let mut line_width = index_width;
        for (i, w) in widths.iter().enumerate() {
            if !current.is_empty() && line_width + COLUMN_GAP + w > max_width {
                blocks.push(std::mem::take(&mut current));
                line_width = index_width;
            }
            current.push(i);
            line_width += COLUMN_GAP + w;
        }
        if !current.is_empty() {
            blocks.push(current);
        }

        let rendered: Vec<String> = blocks
            .iter()
            .map(|block| self.render_block(block))
            .collect();
        rendered.join("\n\n")
    }

    fn render_block(&self, block: &[usize]) -> String {
        let mut grid = new_grid(COLUMN_GAP);

        let mut header = vec![Cell::new("")];
        header.extend(
            block
                .iter()
                .map(|&col| Cell::new_align(&self.headers[col], Alignment::RIGHT)),
        );
        grid.add_row(Row::new(header));

        for (row, label) in self.index.iter().enumerate() {
            let mut cells = vec![Cell::new(label)];
            cells.extend(block.iter().map(|&col| {
                let cell = self.columns[col].get(row).map(String::as_str).unwrap_or("");
                Cell::new_align(cell, Alignment::RIGHT)
            }));
            grid.add_row(Row::new(cells));
        }

        print_grid(&grid)
    }
}

/// Borderless grid whose columns are separated by `gap` spaces.
fn new_grid(gap: usize) -> Table {
    let mut grid = Table::new();
    grid.set_format(FormatBuilder::new().padding(0, gap).build());
    grid
}

/// The grid as text, without the trailing padding of the last column.
fn print_grid(grid: &Table) -> String {
    grid.to_string()
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Display width in characters.
fn width(s: &str) -> usize {
    s.chars().count()
}

/// Rows `rows` of every column of the table, indexed by row position.
pub fn rows_table(table: &WeatherTable, rows: std::ops::Range<usize>) -> TextTable {
    let rows = rows.start.min(table.row_count())..rows.end.min(table.row_count());
    let mut text = TextTable::new(rows.clone().map(|i| i.to_string()).collect());

    for column in table.columns() {
        let cells = match &column.values {
            ColumnValues::Date(v) => v[rows.clone()]
                .iter()
                .map(|d| {
                    d.map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| MISSING_DATE.to_string())
                })
                .collect(),
            ColumnValues::Float(v) => {
                let decimals = column_decimals(v);
                v[rows.clone()]
                    .iter()
                    .map(|x| format_float(*x, decimals))
                    .collect()
            }
            ColumnValues::Text(v) => v[rows.clone()]
                .iter()
                .map(|s| s.clone().unwrap_or_else(|| MISSING_VALUE.to_string()))
                .collect(),
        };
        text.add_column(column.name.clone(), cells);
    }

    text
}

/// Describe table of every numeric column, statistics as rows.
pub fn describe_table(table: &WeatherTable) -> TextTable {
    let mut text = TextTable::new(Describe::LABELS.iter().map(|s| s.to_string()).collect());

    for column in table.columns() {
        if let Some(values) = column.floats() {
            let cells = Describe::of(values)
                .values()
                .iter()
                .map(|v| format_float(*v, MAX_DECIMALS))
                .collect();
            text.add_column(column.name.clone(), cells);
        }
    }

    text
}

/// Two-column listing of `(name, value)` pairs, names left-aligned.
pub fn render_listing(entries: &[(String, String)]) -> String {
    let mut grid = new_grid(LISTING_GAP);
    for (name, value) in entries {
        grid.add_row(Row::new(vec![
            Cell::new(name),
            Cell::new_align(value, Alignment::RIGHT),
        ]));
    }
    print_grid(&grid)
}

/// Decimals needed to print every value of a float column exactly, at
/// least one and at most [`MAX_DECIMALS`].
pub fn column_decimals(values: &[Option<f64>]) -> usize {
    values
        .iter()
        .flatten()
        .filter(|v| v.is_finite())
        .map(|v| {
            let text = v.to_string();
            text.split_once('.').map(|(_, frac)| frac.len()).unwrap_or(0)
        })
        .max()
        .unwrap_or(1)
        .clamp(1, MAX_DECIMALS)
}

fn format_float(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if !v.is_nan() => format!("{:.*}", decimals, v),
        _ => MISSING_VALUE.to_string(),
    }
}
