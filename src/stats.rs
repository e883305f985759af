//! # Thickness aggregation
//!
//! Summary statistics attached to every point after the radius search.
//!
//! The derived columns are a fixed contract: [`ThicknessColumn::ALL`] lists them in
//! output order, and [`THICKNESS_AGGREGATIONS`] pairs each value column with the
//! function that computes it. `crustal_thickness_n` is the number of matched cells
//! and `crustal_thickness_range (m)` is derived as `max - min`.
//!
//! Every aggregation ignores NaN samples. A point without any matched cell keeps
//! the [`ThicknessStats::undefined`] row: NaN values and `n = 0`.
use std::fmt;

use crate::constants::Meter;

/// A reduction over the matched raster values of one point.
pub type Aggregation = fn(&[Meter]) -> Meter;

/// Derived columns appended to each point record, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThicknessColumn {
    Mean,
    Min,
    Max,
    Median,
    Std,
    Count,
    Range,
}

impl ThicknessColumn {
    pub const ALL: [ThicknessColumn; 7] = [
        ThicknessColumn::Mean,
        ThicknessColumn::Min,
        ThicknessColumn::Max,
        ThicknessColumn::Median,
        ThicknessColumn::Std,
        ThicknessColumn::Count,
        ThicknessColumn::Range,
    ];

    /// Header of the column in the output table.
    pub fn name(self) -> &'static str {
        match self {
            ThicknessColumn::Mean => "crustal_thickness_mean (m)",
            ThicknessColumn::Min => "crustal_thickness_min (m)",
            ThicknessColumn::Max => "crustal_thickness_max (m)",
            ThicknessColumn::Median => "crustal_thickness_median (m)",
            ThicknessColumn::Std => "crustal_thickness_std (m)",
            ThicknessColumn::Count => "crustal_thickness_n",
            ThicknessColumn::Range => "crustal_thickness_range (m)",
        }
    }
}

impl fmt::Display for ThicknessColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value columns and the reduction producing each of them.
pub const THICKNESS_AGGREGATIONS: [(ThicknessColumn, Aggregation); 5] = [
    (ThicknessColumn::Mean, nan_mean),
    (ThicknessColumn::Min, nan_min),
    (ThicknessColumn::Max, nan_max),
    (ThicknessColumn::Median, nan_median),
    (ThicknessColumn::Std, nan_std),
];

/// Aggregated thickness of the raster cells matched by one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThicknessStats {
    pub mean: Meter,
    pub min: Meter,
    pub max: Meter,
    pub median: Meter,
    pub std: Meter,
    pub n: u32,
    pub range: Meter,
}

impl Default for ThicknessStats {
    fn default() -> Self {
        Self::undefined()
    }
}

impl ThicknessStats {
    /// Row of a point with no cell within the search radius.
    pub fn undefined() -> Self {
        Self {
            mean: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            n: 0,
            range: f64::NAN,
        }
    }

    /// Aggregate the matched values of one point.
    ///
    /// `n` counts every matched cell; the value columns are computed over the
    /// non-NaN ones. An empty slice yields [`ThicknessStats::undefined`].
    pub fn from_values(values: &[Meter]) -> Self {
        if values.is_empty() {
            return Self::undefined();
        }

        let mut stats = Self::undefined();
        for (column, aggregate) in THICKNESS_AGGREGATIONS {
            let value = aggregate(values);
            match column {
                ThicknessColumn::Mean => stats.mean = value,
                ThicknessColumn::Min => stats.min = value,
                ThicknessColumn::Max => stats.max = value,
                ThicknessColumn::Median => stats.median = value,
                ThicknessColumn::Std => stats.std = value,
                ThicknessColumn::Count | ThicknessColumn::Range => {}
            }
        }
        stats.n = values.len() as u32;
        stats.range = stats.max - stats.min;
        stats
    }

    /// Value of one derived column; `Count` is widened to `f64`.
    pub fn get(&self, column: ThicknessColumn) -> f64 {
        match column {
            ThicknessColumn::Mean => self.mean,
            ThicknessColumn::Min => self.min,
            ThicknessColumn::Max => self.max,
            ThicknessColumn::Median => self.median,
            ThicknessColumn::Std => self.std,
            ThicknessColumn::Count => self.n as f64,
            ThicknessColumn::Range => self.range,
        }
    }

    /// Text rendering of one column for tabular output (NaN → empty field).
    pub fn field(&self, column: ThicknessColumn) -> String {
        match column {
            ThicknessColumn::Count => self.n.to_string(),
            _ => {
                let value = self.get(column);
                if value.is_nan() {
                    String::new()
                } else {
                    value.to_string()
                }
            }
        }
    }
}

#[inline]
fn finite_samples(values: &[Meter]) -> impl Iterator<Item = Meter> + '_ {
    values.iter().copied().filter(|v| !v.is_nan())
}

pub fn nan_mean(values: &[Meter]) -> Meter {
    let (sum, count) = finite_samples(values).fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

pub fn nan_min(values: &[Meter]) -> Meter {
    finite_samples(values).fold(f64::NAN, f64::min)
}

pub fn nan_max(values: &[Meter]) -> Meter {
    finite_samples(values).fold(f64::NAN, f64::max)
}

/// Median of the non-NaN samples; an even count averages the middle pair.
pub fn nan_median(values: &[Meter]) -> Meter {
    let mut sorted: Vec<Meter> = finite_samples(values).collect();
    if sorted.is_empty() {
        return f64::NAN;
    }
    sorted.sort_unstable_by(f64::total_cmp);

    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Population standard deviation (divisor `N`) of the non-NaN samples.
pub fn nan_std(values: &[Meter]) -> Meter {
    let mean = nan_mean(values);
    if mean.is_nan() {
        return f64::NAN;
    }
    let (sq, count) = finite_samples(values).fold((0.0, 0usize), |(s, c), v| {
        let d = v - mean;
        (s + d * d, c + 1)
    });
    (sq / count as f64).sqrt()
}

#[cfg(test)]
mod stats_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_value() {
        let stats = ThicknessStats::from_values(&[35_000.0]);
        assert_eq!(stats.n, 1);
        assert_eq!(stats.mean, 35_000.0);
        assert_eq!(stats.min, 35_000.0);
        assert_eq!(stats.max, 35_000.0);
        assert_eq!(stats.median, 35_000.0);
        assert_eq!(stats.std, 0.0);
        assert_eq!(stats.range, 0.0);
    }

    #[test]
    fn test_empty_is_undefined() {
        let stats = ThicknessStats::from_values(&[]);
        assert_eq!(stats.n, 0);
        assert!(stats.mean.is_nan());
        assert!(stats.std.is_nan());
        assert!(stats.range.is_nan());
        assert_eq!(stats.field(ThicknessColumn::Mean), "");
        assert_eq!(stats.field(ThicknessColumn::Count), "0");
    }

    #[test]
    fn test_several_values() {
        let stats = ThicknessStats::from_values(&[30_000.0, 40_000.0, 35_000.0, 45_000.0]);
        assert_eq!(stats.n, 4);
        assert_relative_eq!(stats.mean, 37_500.0);
        assert_eq!(stats.min, 30_000.0);
        assert_eq!(stats.max, 45_000.0);
        assert_relative_eq!(stats.median, 37_500.0);
        assert_relative_eq!(stats.std, 31_250_000.0_f64.sqrt(), epsilon = 1e-9);
        assert_eq!(stats.range, 15_000.0);
    }

    #[test]
    fn test_nan_samples_are_ignored() {
        let values = [10.0, f64::NAN, 30.0];
        assert_relative_eq!(nan_mean(&values), 20.0);
        assert_eq!(nan_min(&values), 10.0);
        assert_eq!(nan_max(&values), 30.0);
        assert_eq!(nan_median(&values), 20.0);
        assert_relative_eq!(nan_std(&values), 10.0);

        let stats = ThicknessStats::from_values(&values);
        assert_eq!(stats.n, 3);

        let all_nan = ThicknessStats::from_values(&[f64::NAN, f64::NAN]);
        assert_eq!(all_nan.n, 2);
        assert!(all_nan.mean.is_nan());
        assert!(all_nan.median.is_nan());
        assert!(all_nan.range.is_nan());
    }

    #[test]
    fn test_column_order_and_names() {
        let names: Vec<&str> = ThicknessColumn::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            [
                "crustal_thickness_mean (m)",
                "crustal_thickness_min (m)",
                "crustal_thickness_max (m)",
                "crustal_thickness_median (m)",
                "crustal_thickness_std (m)",
                "crustal_thickness_n",
                "crustal_thickness_range (m)",
            ]
        );
    }
}
