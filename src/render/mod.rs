//! Chart rendering.
//!
//! A [`ChartRenderer`] turns the table and its aggregates into encoded
//! images held in memory. [`write_charts`] then puts each image in place
//! atomically, so a failed run never leaves a half-written PNG behind.

pub mod palette;
pub mod plot;
pub mod style;

pub use plot::PlottersRenderer;
pub use style::ChartStyle;

use crate::analysis::Aggregation;
use crate::models::WeatherTable;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// An encoded image waiting to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChart {
    /// File name inside the output directory.
    pub file_name: String,
    /// PNG bytes.
    pub png: Vec<u8>,
}

/// Draws the two figures for a dataset.
pub trait ChartRenderer {
    /// Render every figure in memory, in the order they should be listed.
    fn render(&self, table: &WeatherTable, aggregation: &Aggregation) -> Result<Vec<RenderedChart>>;
}

/// Render all figures, then write them into `output_dir`.
///
/// Nothing is written unless every figure rendered.
pub fn create_visualizations(
    renderer: &dyn ChartRenderer,
    table: &WeatherTable,
    aggregation: &Aggregation,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let charts = renderer.render(table, aggregation)?;
    debug!("Rendered {} figures", charts.len());
    write_charts(&charts, output_dir)
}

/// Write each chart to a temporary file in `dir` and rename it into place.
pub fn write_charts(charts: &[RenderedChart], dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut written = Vec::with_capacity(charts.len());
    for chart in charts {
        let target = dir.join(&chart.file_name);

        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create a temporary file in {}", dir.display()))?;
        tmp.write_all(&chart.png)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        tmp.as_file()
            .sync_all()
            .with_context(|| format!("Failed to flush {}", target.display()))?;
        tmp.persist(&target)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to save {}", target.display()))?;

        info!("Saved {}", target.display());
        written.push(target);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeatherRecord;
    use anyhow::anyhow;
    use chrono::NaiveDate;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Records what it was asked to draw and returns fixed bytes.
    struct RecordingRenderer {
        calls: RefCell<Vec<(usize, Vec<Option<u32>>)>>,
        fail: bool,
    }

    impl RecordingRenderer {
        fn new(fail: bool) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                fail,
            }
        }
    }

    impl ChartRenderer for RecordingRenderer {
        fn render(
            &self,
            table: &WeatherTable,
            aggregation: &Aggregation,
        ) -> Result<Vec<RenderedChart>> {
            self.calls
                .borrow_mut()
                .push((table.row_count(), aggregation.months.clone()));
            if self.fail {
                return Err(anyhow!("drawing failed"));
            }
            Ok(vec![
                RenderedChart {
                    file_name: "weather_analysis_main.png".to_string(),
                    png: b"main".to_vec(),
                },
                RenderedChart {
                    file_name: "weather_additional_analysis.png".to_string(),
                    png: b"additional".to_vec(),
                },
            ])
        }
    }

    fn sample() -> (WeatherTable, Aggregation) {
        let table = WeatherTable::from_records(&[
            WeatherRecord::new(
                NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
                [20.0, 25.0, 15.0, 80.0, 30.0, 0.0, 1010.0],
            ),
            WeatherRecord::new(
                NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
                [24.0, 30.0, 18.0, 70.0, 20.0, 2.0, 1008.0],
            ),
        ]);
        let aggregation = Aggregation::compute(&table);
        (table, aggregation)
    }

    #[test]
    fn test_create_visualizations_writes_both_files() {
        let dir = TempDir::new().unwrap();
        let (table, aggregation) = sample();
        let renderer = RecordingRenderer::new(false);

        let files = create_visualizations(&renderer, &table, &aggregation, dir.path()).unwrap();

        assert_eq!(
            files,
            vec![
                dir.path().join("weather_analysis_main.png"),
                dir.path().join("weather_additional_analysis.png"),
            ]
        );
        assert_eq!(std::fs::read(&files[0]).unwrap(), b"main");
        assert_eq!(std::fs::read(&files[1]).unwrap(), b"additional");

        let calls = renderer.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], (2, vec![Some(3), Some(4)]));
    }

    #[test]
    fn test_failed_render_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let (table, aggregation) = sample();
        let renderer = RecordingRenderer::new(true);

        let result = create_visualizations(&renderer, &table, &aggregation, dir.path());

        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_write_charts_replaces_existing_and_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("chart.png");
        std::fs::write(&target, b"old").unwrap();

        let chart = RenderedChart {
            file_name: "chart.png".to_string(),
            png: b"new".to_vec(),
        };
        write_charts(&[chart], dir.path()).unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"new");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_charts_creates_output_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("charts").join("out");
        let chart = RenderedChart {
            file_name: "a.png".to_string(),
            png: vec![1, 2, 3],
        };

        let files = write_charts(&[chart], &nested).unwrap();
        assert!(files[0].exists());
    }
}
