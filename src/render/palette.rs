//! Chart colours: named series colours, the diverging heatmap scale and
//! the evenly spaced hue palette.

use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};
use plotters::style::RGBColor;

pub const MEAN_RED: RGBColor = RGBColor(255, 0, 0);
pub const MAX_ORANGE: RGBColor = RGBColor(255, 165, 0);
pub const MIN_BLUE: RGBColor = RGBColor(0, 0, 255);
pub const DARK_BLUE: RGBColor = RGBColor(0, 0, 139);
pub const LIGHT_BLUE: RGBColor = RGBColor(173, 216, 230);
pub const RAIN_GREEN: RGBColor = RGBColor(0, 128, 0);
pub const PRESSURE_PURPLE: RGBColor = RGBColor(128, 0, 128);
pub const BAR_CORAL: RGBColor = RGBColor(255, 127, 80);
pub const MISSING_GRAY: RGBColor = RGBColor(200, 200, 200);

// Endpoints and midpoint of the coolwarm scale.
const COOL: (u8, u8, u8) = (59, 76, 192);
const NEUTRAL: (u8, u8, u8) = (221, 221, 221);
const WARM: (u8, u8, u8) = (180, 4, 38);

fn linear(rgb: (u8, u8, u8)) -> LinSrgb {
    Srgb::new(rgb.0, rgb.1, rgb.2).into_format::<f32>().into_linear()
}

/// Diverging colour for `value` in [-1, 1], neutral at 0.
pub fn coolwarm(value: f64) -> RGBColor {
    let t = ((value.clamp(-1.0, 1.0) + 1.0) / 2.0) as f32;
    let (from, to, factor) = if t < 0.5 {
        (COOL, NEUTRAL, t * 2.0)
    } else {
        (NEUTRAL, WARM, (t - 0.5) * 2.0)
    };

    let mixed = linear(from).mix(linear(to), factor);
    let rgb: Srgb<u8> = Srgb::<f32>::from_linear(mixed).into_format();
    RGBColor(rgb.red, rgb.green, rgb.blue)
}

/// Black or white, whichever reads better on `background`.
pub fn text_color_on(background: RGBColor) -> RGBColor {
    let RGBColor(r, g, b) = background;
    let luminance = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
    if luminance > 140.0 {
        RGBColor(0, 0, 0)
    } else {
        RGBColor(255, 255, 255)
    }
}

/// Generates `n` visually distinct colours using evenly spaced hues,
/// starting at `start_hue` degrees.
pub fn hue_palette(n: usize, start_hue: f32) -> Vec<RGBColor> {
    (0..n)
        .map(|i| {
            let hue = start_hue + (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            RGBColor(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coolwarm_endpoints_and_centre() {
        assert_eq!(coolwarm(-1.0), RGBColor(59, 76, 192));
        assert_eq!(coolwarm(1.0), RGBColor(180, 4, 38));
        assert_eq!(coolwarm(0.0), RGBColor(221, 221, 221));
        // Out-of-range values are clamped.
        assert_eq!(coolwarm(7.0), coolwarm(1.0));
    }

    #[test]
    fn test_coolwarm_is_diverging() {
        let RGBColor(r_neg, _, b_neg) = coolwarm(-0.5);
        let RGBColor(r_pos, _, b_pos) = coolwarm(0.5);
        assert!(b_neg > r_neg);
        assert!(r_pos > b_pos);
    }

    #[test]
    fn test_text_color_contrast() {
        assert_eq!(text_color_on(RGBColor(255, 255, 255)), RGBColor(0, 0, 0));
        assert_eq!(text_color_on(coolwarm(1.0)), RGBColor(255, 255, 255));
    }

    #[test]
    fn test_hue_palette_distinct() {
        let colors = hue_palette(12, 0.0);
        assert_eq!(colors.len(), 12);
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(hue_palette(0, 0.0).is_empty());
    }
}
