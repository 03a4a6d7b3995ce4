//! Chart styling passed explicitly into the renderer.

use serde::{Deserialize, Serialize};

/// Sizes, fonts and palette settings of both figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartStyle {
    /// Main figure size in pixels (width, height).
    #[serde(default = "default_main_size")]
    pub main_size: (u32, u32),

    /// Additional figure size in pixels (width, height).
    #[serde(default = "default_additional_size")]
    pub additional_size: (u32, u32),

    /// Font family for every text element.
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Figure title size.
    #[serde(default = "default_title_font_size")]
    pub title_font_size: f64,

    /// Panel caption size.
    #[serde(default = "default_caption_font_size")]
    pub caption_font_size: f64,

    /// Axis label and tick size.
    #[serde(default = "default_label_font_size")]
    pub label_font_size: f64,

    /// Opacity of grid lines, 0.0 to 1.0.
    #[serde(default = "default_grid_alpha")]
    pub grid_alpha: f64,

    /// Number of rainfall histogram bins.
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,

    /// Radius of scatter points.
    #[serde(default = "default_point_size")]
    pub point_size: u32,

    /// Starting hue (degrees) of the box plot palette.
    #[serde(default = "default_palette_hue")]
    pub palette_hue: f32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            main_size: default_main_size(),
            additional_size: default_additional_size(),
            font_family: default_font_family(),
            title_font_size: default_title_font_size(),
            caption_font_size: default_caption_font_size(),
            label_font_size: default_label_font_size(),
            grid_alpha: default_grid_alpha(),
            histogram_bins: default_histogram_bins(),
            point_size: default_point_size(),
            palette_hue: default_palette_hue(),
        }
    }
}

fn default_main_size() -> (u32, u32) {
    (1500, 1200)
}

fn default_additional_size() -> (u32, u32) {
    (1200, 800)
}

fn default_font_family() -> String {
    "sans-serif".to_string()
}

fn default_title_font_size() -> f64 {
    32.0
}

fn default_caption_font_size() -> f64 {
    22.0
}

fn default_label_font_size() -> f64 {
    14.0
}

fn default_grid_alpha() -> f64 {
    0.3
}

fn default_histogram_bins() -> usize {
    20
}

fn default_point_size() -> u32 {
    3
}

fn default_palette_hue() -> f32 {
    0.0
}

impl ChartStyle {
    /// Check values the renderer cannot work with.
    pub fn validate(&self) -> Result<(), String> {
        let sizes = [self.main_size, self.additional_size];
        if sizes.iter().any(|(w, h)| *w < 200 || *h < 200) {
            return Err("Figure sizes must be at least 200x200 pixels".to_string());
        }
        if self.histogram_bins == 0 {
            return Err("Histogram bins must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.grid_alpha) {
            return Err("Grid alpha must be between 0.0 and 1.0".to_string());
        }
        Ok(())
    }
}
