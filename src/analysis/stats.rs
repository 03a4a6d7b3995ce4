//! Descriptive statistics over nullable numeric columns.
//!
//! Every function here skips missing values (`None`, NaN and infinities), the
//! same way a dataframe aggregate does with skip-NA enabled.

use serde::Serialize;

/// Non-missing values of a column, in column order.
pub fn present(values: &[Option<f64>]) -> Vec<f64> {
    values
        .iter()
        .filter_map(|v| *v)
        .filter(|v| v.is_finite())
        .collect()
}

/// Number of non-missing values.
pub fn count(values: &[Option<f64>]) -> usize {
    values.iter().filter(|v| matches!(v, Some(x) if x.is_finite())).count()
}

/// Sum of non-missing values; 0 for an empty column.
pub fn sum(values: &[Option<f64>]) -> f64 {
    // Start from +0.0 so an empty column prints as 0.00.
    present(values).iter().fold(0.0, |acc, v| acc + v)
}

/// Arithmetic mean, `None` when there are no values.
pub fn mean(values: &[Option<f64>]) -> Option<f64> {
    mean_of(&present(values))
}

pub fn min(values: &[Option<f64>]) -> Option<f64> {
    present(values).into_iter().reduce(f64::min)
}

pub fn max(values: &[Option<f64>]) -> Option<f64> {
    present(values).into_iter().reduce(f64::max)
}

/// Sample standard deviation (ddof = 1), `None` below two values.
#[cfg(test)]
pub fn std_dev(values: &[Option<f64>]) -> Option<f64> {
    sample_std(&present(values))
}

fn mean_of(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        None
    } else {
        Some(xs.iter().sum::<f64>() / xs.len() as f64)
    }
}

fn sample_std(xs: &[f64]) -> Option<f64> {
    if xs.len() < 2 {
        return None;
    }
    let m = mean_of(xs)?;
    let ss: f64 = xs.iter().map(|x| (x - m).powi(2)).sum();
    Some((ss / (xs.len() - 1) as f64).sqrt())
}

/// Percentile `q` in [0, 1] of an ascending slice, linear interpolation
/// between the two closest ranks.
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Pearson correlation over rows where both values are present.
///
/// Returns `None` for fewer than two complete pairs or a zero-variance side.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys.iter())
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((*x, *y)),
            _ => None,
        })
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let my = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return None;
    }

    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

/// The standard describe row set for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Describe {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub p25: Option<f64>,
    #[serde(rename = "50%")]
    pub p50: Option<f64>,
    #[serde(rename = "75%")]
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

impl Describe {
    /// Row labels in print order.
    pub const LABELS: [&'static str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    pub fn of(values: &[Option<f64>]) -> Self {
        let mut sorted = present(values);
        sorted.sort_by(f64::total_cmp);

        Self {
            count: sorted.len(),
            mean: mean_of(&sorted),
            std: sample_std(&sorted),
            min: sorted.first().copied(),
            p25: percentile(&sorted, 0.25),
            p50: percentile(&sorted, 0.50),
            p75: percentile(&sorted, 0.75),
            max: sorted.last().copied(),
        }
    }

    /// Values in the same order as [`Describe::LABELS`].
    pub fn values(&self) -> [Option<f64>; 8] {
        [
            Some(self.count as f64),
            self.mean,
            self.std,
            self.min,
            self.p25,
            self.p50,
            self.p75,
            self.max,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(xs: &[f64]) -> Vec<Option<f64>> {
        xs.iter().map(|x| Some(*x)).collect()
    }

    #[test]
    fn test_aggregates_skip_missing() {
        let values = vec![Some(1.0), None, Some(3.0), Some(f64::NAN)];
        assert_eq!(count(&values), 2);
        assert_eq!(sum(&values), 4.0);
        assert_eq!(mean(&values), Some(2.0));
        assert_eq!(min(&values), Some(1.0));
        assert_eq!(max(&values), Some(3.0));
    }

    #[test]
    fn test_empty_column_is_undefined_not_fatal() {
        let values: Vec<Option<f64>> = vec![None, None];
        assert_eq!(mean(&values), None);
        assert_eq!(max(&values), None);
        assert_eq!(sum(&values), 0.0);
        assert!(sum(&values).is_sign_positive());
        assert_eq!(format!("{:.2}", sum(&[])), "0.00");
        assert_eq!(std_dev(&values), None);
    }

    #[test]
    fn test_infinities_are_skipped() {
        let values = vec![Some(2.0), Some(f64::INFINITY), Some(f64::NEG_INFINITY), Some(4.0)];
        assert_eq!(count(&values), 2);
        assert_eq!(sum(&values), 6.0);
        assert_eq!(max(&values), Some(4.0));
        assert_eq!(min(&values), Some(2.0));
        assert_eq!(Describe::of(&values).count, 2);
    }

    #[test]
    fn test_sample_std_uses_ddof_one() {
        let values = col(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        // population std is 2.0, sample std is sqrt(32 / 7)
        let std = std_dev(&values).unwrap();
        assert!((std - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(std_dev(&col(&[1.0])), None);
    }

    #[test]
    fn test_percentile_linear_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&sorted, 0.0), Some(1.0));
        assert_eq!(percentile(&sorted, 0.25), Some(1.75));
        assert_eq!(percentile(&sorted, 0.5), Some(2.5));
        assert_eq!(percentile(&sorted, 0.75), Some(3.25));
        assert_eq!(percentile(&sorted, 1.0), Some(4.0));
        assert_eq!(percentile(&[], 0.5), None);
    }

    #[test]
    fn test_describe_matches_hand_computation() {
        let d = Describe::of(&col(&[4.0, 1.0, 3.0, 2.0]));
        assert_eq!(d.count, 4);
        assert_eq!(d.mean, Some(2.5));
        assert_eq!(d.min, Some(1.0));
        assert_eq!(d.p50, Some(2.5));
        assert_eq!(d.max, Some(4.0));
        assert_eq!(d.values()[0], Some(4.0));
    }

    #[test]
    fn test_pearson_perfect_and_inverse() {
        let x = col(&[1.0, 2.0, 3.0, 4.0]);
        let y = col(&[2.0, 4.0, 6.0, 8.0]);
        let z = col(&[8.0, 6.0, 4.0, 2.0]);
        assert!((pearson(&x, &y).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&x, &z).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_pairwise_complete_case() {
        // The third row is dropped because y is missing there.
        let x = col(&[1.0, 2.0, 100.0, 3.0]);
        let y = vec![Some(1.0), Some(2.0), None, Some(3.0)];
        assert!((pearson(&x, &y).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_degenerate_is_none() {
        let flat = col(&[5.0, 5.0, 5.0]);
        let x = col(&[1.0, 2.0, 3.0]);
        assert_eq!(pearson(&flat, &x), None);
        assert_eq!(pearson(&col(&[1.0]), &col(&[2.0])), None);
    }
}
