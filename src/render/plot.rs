//! Chart drawing with plotters on an in-memory bitmap.
//!
//! Each figure is a 2x2 grid of panels drawn into an RGB buffer and
//! encoded as PNG. Nothing here touches the filesystem.

use super::palette::{
    coolwarm, hue_palette, text_color_on, BAR_CORAL, DARK_BLUE, LIGHT_BLUE, MAX_ORANGE, MEAN_RED,
    MIN_BLUE, MISSING_GRAY, PRESSURE_PURPLE, RAIN_GREEN,
};
use super::{ChartRenderer, ChartStyle, RenderedChart};
use crate::analysis::{
    date_from_ordinal, group_by_month, histogram, line_segments, paired_values, Aggregation,
    MONTH_NAMES,
};
use crate::models::{Measurement, WeatherTable};
use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::io::Cursor;
use std::ops::Range;
use tracing::debug;

type Panel<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// One line on a time-series panel.
struct SeriesLine {
    measurement: Measurement,
    label: &'static str,
    color: RGBColor,
    width: u32,
}

/// Production renderer backed by plotters.
#[derive(Debug, Clone)]
pub struct PlottersRenderer {
    style: ChartStyle,
    title: String,
    main_file: String,
    additional_file: String,
}

impl PlottersRenderer {
    pub fn new(
        style: ChartStyle,
        title: impl Into<String>,
        main_file: impl Into<String>,
        additional_file: impl Into<String>,
    ) -> Self {
        Self {
            style,
            title: title.into(),
            main_file: main_file.into(),
            additional_file: additional_file.into(),
        }
    }

    fn caption_font(&self) -> FontDesc<'_> {
        (self.style.font_family.as_str(), self.style.caption_font_size).into_font()
    }

    fn label_font(&self) -> FontDesc<'_> {
        (self.style.font_family.as_str(), self.style.label_font_size).into_font()
    }

    fn grid_color(&self) -> RGBAColor {
        BLACK.mix(self.style.grid_alpha)
    }

    /// Temperature, humidity, rainfall histogram and pressure panels.
    fn render_main(&self, table: &WeatherTable) -> Result<Vec<u8>> {
        let (width, height) = self.style.main_size;
        let mut buffer = vec![0u8; (width as usize) * (height as usize) * 3];

        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE)?;

            let title = format!("{} Weather Data Analysis", self.title);
            let title_font = FontDesc::new(
                FontFamily::Name(&self.style.font_family),
                self.style.title_font_size,
                FontStyle::Bold,
            );
            let root = root.titled(&title, title_font)?;
            let panels = root.split_evenly((2, 2));

            self.draw_lines(
                &panels[0],
                table,
                "Temperature Trends Over Time",
                "Temperature (°C)",
                &[
                    SeriesLine {
                        measurement: Measurement::MeanTemperature,
                        label: "Mean Temperature",
                        color: MEAN_RED,
                        width: 2,
                    },
                    SeriesLine {
                        measurement: Measurement::MaxTemperature,
                        label: "Max Temperature",
                        color: MAX_ORANGE,
                        width: 1,
                    },
                    SeriesLine {
                        measurement: Measurement::MinTemperature,
                        label: "Min Temperature",
                        color: MIN_BLUE,
                        width: 1,
                    },
                ],
            )?;
            self.draw_lines(
                &panels[1],
                table,
                "Humidity Trends Over Time",
                "Humidity (%)",
                &[
                    SeriesLine {
                        measurement: Measurement::MaxHumidity,
                        label: "Max Humidity",
                        color: DARK_BLUE,
                        width: 2,
                    },
                    SeriesLine {
                        measurement: Measurement::MinHumidity,
                        label: "Min Humidity",
                        color: LIGHT_BLUE,
                        width: 2,
                    },
                ],
            )?;
            self.draw_rainfall_histogram(&panels[2], table)?;
            self.draw_lines(
                &panels[3],
                table,
                "Mean Pressure Over Time",
                "Pressure (hPa)",
                &[SeriesLine {
                    measurement: Measurement::MeanPressure,
                    label: "",
                    color: PRESSURE_PURPLE,
                    width: 2,
                }],
            )?;

            root.present()?;
        }

        encode_png(buffer, width, height)
    }

    /// Monthly bars, correlation heatmap, scatter and box plot panels.
    fn render_additional(&self, table: &WeatherTable, aggregation: &Aggregation) -> Result<Vec<u8>> {
        let (width, height) = self.style.additional_size;
        let mut buffer = vec![0u8; (width as usize) * (height as usize) * 3];

        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE)?;
            let panels = root.split_evenly((2, 2));

            self.draw_monthly_bars(&panels[0], aggregation)?;
            self.draw_correlation_heatmap(&panels[1], aggregation)?;
            self.draw_scatter(&panels[2], table)?;
            self.draw_month_boxplot(&panels[3], table, aggregation)?;

            root.present()?;
        }

        encode_png(buffer, width, height)
    }

    /// Lines over time; a line with an empty label gets no legend entry.
    fn draw_lines(
        &self,
        area: &Panel<'_>,
        table: &WeatherTable,
        caption: &str,
        y_desc: &str,
        lines: &[SeriesLine],
    ) -> Result<()> {
        let segments: Vec<Vec<Vec<(f64, f64)>>> = lines
            .iter()
            .map(|line| line_segments(table, line.measurement))
            .collect();
        let points = || segments.iter().flatten().flatten();

        let x_range = padded_range(points().map(|(x, _)| *x), 0.0);
        let y_range = padded_range(points().map(|(_, y)| *y), 0.05);

        let mut chart = ChartBuilder::on(area)
            .caption(caption, self.caption_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)?;

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc(y_desc)
            .x_labels(6)
            .x_label_formatter(&|x: &f64| day_label(*x))
            .label_style(self.label_font())
            .light_line_style(&self.grid_color())
            .draw()?;

        let mut has_legend = false;
        for (line, runs) in lines.iter().zip(&segments) {
            let style = line.color.stroke_width(line.width);
            for (i, run) in runs.iter().enumerate() {
                let series = chart.draw_series(LineSeries::new(run.iter().copied(), style))?;
                if i == 0 && !line.label.is_empty() {
                    series
                        .label(line.label)
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
                    has_legend = true;
                }
            }
        }

        if has_legend {
            chart
                .configure_series_labels()
                .label_font(self.label_font())
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()?;
        }

        Ok(())
    }

    fn draw_rainfall_histogram(&self, area: &Panel<'_>, table: &WeatherTable) -> Result<()> {
        let bins = histogram(table.values(Measurement::Rainfall), self.style.histogram_bins);
        let x_range = match (bins.first(), bins.last()) {
            (Some(first), Some(last)) => first.lower..last.upper,
            _ => 0.0..1.0,
        };
        let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64;

        let mut chart = ChartBuilder::on(area)
            .caption("Rainfall Distribution", self.caption_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, 0.0..max_count * 1.05)?;

        chart
            .configure_mesh()
            .x_desc("Rainfall (mm)")
            .y_desc("Frequency")
            .label_style(self.label_font())
            .light_line_style(&self.grid_color())
            .draw()?;

        chart.draw_series(bins.iter().map(|b| {
            Rectangle::new(
                [(b.lower, 0.0), (b.upper, b.count as f64)],
                RAIN_GREEN.mix(0.7).filled(),
            )
        }))?;
        chart.draw_series(bins.iter().map(|b| {
            Rectangle::new([(b.lower, 0.0), (b.upper, b.count as f64)], BLACK.stroke_width(1))
        }))?;

        Ok(())
    }

    fn draw_monthly_bars(&self, area: &Panel<'_>, aggregation: &Aggregation) -> Result<()> {
        let means = aggregation.monthly_mean_temperature.present();
        let y_range = padded_range(
            means.iter().map(|(_, v)| *v).chain(std::iter::once(0.0)),
            0.05,
        );

        let mut chart = ChartBuilder::on(area)
            .caption("Average Temperature by Month", self.caption_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d((0u32..11u32).into_segmented(), y_range)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("Month")
            .y_desc("Average Temperature (°C)")
            .x_labels(12)
            .x_label_formatter(&|v: &SegmentValue<u32>| month_label(v))
            .label_style(self.label_font())
            .light_line_style(&self.grid_color())
            .draw()?;

        chart.draw_series(
            Histogram::vertical(&chart)
                .style(BAR_CORAL.filled())
                .margin(6)
                .data(means.iter().map(|(month, mean)| (month - 1, *mean))),
        )?;

        Ok(())
    }

    fn draw_correlation_heatmap(&self, area: &Panel<'_>, aggregation: &Aggregation) -> Result<()> {
        let matrix = &aggregation.temperature_correlation;
        let n = matrix.labels.len() as u32;

        let mut chart = ChartBuilder::on(area)
            .caption("Temperature Correlation Matrix", self.caption_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(120)
            .build_cartesian_2d((0..n - 1).into_segmented(), (0..n - 1).into_segmented())?;

        // Row 0 is drawn at the top.
        let label = |v: &SegmentValue<u32>, flip: bool| match v {
            SegmentValue::CenterOf(k) => {
                let idx = if flip { n - 1 - k } else { *k };
                matrix.labels.get(idx as usize).copied().unwrap_or("").to_string()
            }
            _ => String::new(),
        };

        chart
            .configure_mesh()
            .disable_mesh()
            .x_label_formatter(&|v: &SegmentValue<u32>| label(v, false))
            .y_label_formatter(&|v: &SegmentValue<u32>| label(v, true))
            .label_style(self.label_font())
            .draw()?;

        let cells: Vec<(u32, u32, Option<f64>)> = (0..n)
            .flat_map(|i| (0..n).map(move |j| (i, j)))
            .map(|(i, j)| (j, n - 1 - i, matrix.get(i as usize, j as usize)))
            .collect();

        chart.draw_series(cells.iter().map(|&(x, y, r)| {
            let color = r.map(coolwarm).unwrap_or(MISSING_GRAY);
            Rectangle::new(
                [
                    (SegmentValue::Exact(x), SegmentValue::Exact(y)),
                    (SegmentValue::Exact(x + 1), SegmentValue::Exact(y + 1)),
                ],
                color.filled(),
            )
        }))?;

        let centered = Pos::new(HPos::Center, VPos::Center);
        chart.draw_series(cells.iter().map(|&(x, y, r)| {
            let color = r.map(coolwarm).unwrap_or(MISSING_GRAY);
            let text = r.map(|r| format!("{:.2}", r)).unwrap_or_else(|| "NaN".to_string());
            Text::new(
                text,
                (SegmentValue::CenterOf(x), SegmentValue::CenterOf(y)),
                self.label_font().color(&text_color_on(color)).pos(centered),
            )
        }))?;

        Ok(())
    }

    fn draw_scatter(&self, area: &Panel<'_>, table: &WeatherTable) -> Result<()> {
        let points = paired_values(table, Measurement::MeanTemperature, Measurement::Rainfall);
        let x_range = padded_range(points.iter().map(|(x, _)| *x), 0.05);
        let y_range = padded_range(points.iter().map(|(_, y)| *y), 0.05);

        let mut chart = ChartBuilder::on(area)
            .caption("Rainfall vs Temperature", self.caption_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)?;

        chart
            .configure_mesh()
            .x_desc("Mean Temperature (°C)")
            .y_desc("Rainfall (mm)")
            .label_style(self.label_font())
            .light_line_style(&self.grid_color())
            .draw()?;

        let point_style = RAIN_GREEN.mix(0.6).filled();
        chart.draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), self.style.point_size, point_style)),
        )?;

        Ok(())
    }

    fn draw_month_boxplot(
        &self,
        area: &Panel<'_>,
        table: &WeatherTable,
        aggregation: &Aggregation,
    ) -> Result<()> {
        let grouped = group_by_month(table, &aggregation.months, Measurement::MeanTemperature);
        let boxes: Vec<(u32, Quartiles)> = grouped
            .iter()
            .map(|(month, values)| (month - 1, Quartiles::new(values)))
            .collect();

        let y_range = padded_range(
            boxes
                .iter()
                .flat_map(|(_, q)| q.values())
                .map(f64::from),
            0.05,
        );
        let y_range = (y_range.start as f32)..(y_range.end as f32);

        let mut chart = ChartBuilder::on(area)
            .caption("Temperature Distribution by Month", self.caption_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d((0u32..11u32).into_segmented(), y_range)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("Month")
            .y_desc("Temperature (°C)")
            .x_labels(12)
            .x_label_formatter(&|v: &SegmentValue<u32>| month_label(v))
            .label_style(self.label_font())
            .light_line_style(&self.grid_color())
            .draw()?;

        let colors = hue_palette(MONTH_NAMES.len(), self.style.palette_hue);
        chart.draw_series(boxes.iter().map(|(idx, quartiles)| {
            let color = colors[*idx as usize % colors.len()];
            Boxplot::new_vertical(SegmentValue::CenterOf(*idx), quartiles)
                .width(20)
                .whisker_width(0.5)
                .style(color.stroke_width(2))
        }))?;

        Ok(())
    }
}

impl ChartRenderer for PlottersRenderer {
    fn render(&self, table: &WeatherTable, aggregation: &Aggregation) -> Result<Vec<RenderedChart>> {
        debug!("Drawing main figure");
        let main = self
            .render_main(table)
            .context("Failed to draw the main figure")?;

        debug!("Drawing additional figure");
        let additional = self
            .render_additional(table, aggregation)
            .context("Failed to draw the additional figure")?;

        Ok(vec![
            RenderedChart {
                file_name: self.main_file.clone(),
                png: main,
            },
            RenderedChart {
                file_name: self.additional_file.clone(),
                png: additional,
            },
        ])
    }
}

/// Encode a raw RGB buffer as PNG.
fn encode_png(buffer: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>> {
    let image = image::RgbImage::from_raw(width, height, buffer)
        .context("Bitmap buffer does not match the figure size")?;

    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .context("Failed to encode PNG")?;
    Ok(png)
}

/// Axis range covering `values` with `pad` of the span added on each side.
///
/// An empty input gives `0..1`; a single value is widened by 1 each way.
pub fn padded_range(values: impl Iterator<Item = f64>, pad: f64) -> Range<f64> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if lo > hi {
        return 0.0..1.0;
    }
    if lo == hi {
        return (lo - 1.0)..(hi + 1.0);
    }
    let margin = (hi - lo) * pad;
    (lo - margin)..(hi + margin)
}

/// Tick label for a day ordinal.
fn day_label(x: f64) -> String {
    date_from_ordinal(x)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

/// Tick label for a zero-based month segment.
fn month_label(value: &SegmentValue<u32>) -> String {
    match value {
        SegmentValue::CenterOf(idx) => MONTH_NAMES
            .get(*idx as usize)
            .map(|name| name.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}
