use std::fmt;

use serde::Serialize;

use crate::error::RangeError;

/// A pixel left missing under the `missing` out-of-range policy.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelFailure {
    pub pixel: usize,
    pub error: RangeError,
}

/// Corrected fire radiative power (MW), one entry per input pixel in input
/// order. `None` marks a pixel that could not be corrected.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectedPowerSeries {
    values: Vec<Option<f64>>,
    failures: Vec<PixelFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesStats {
    pub valid: usize,
    pub missing: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub total: f64,
}

impl CorrectedPowerSeries {
    /// A series of `len` pixels, all missing.
    pub fn missing(len: usize) -> Self {
        Self {
            values: vec![None; len],
            failures: Vec::new(),
        }
    }

    pub(crate) fn set(&mut self, pixel: usize, corrected_power: f64) {
        self.values[pixel] = Some(corrected_power);
    }

    pub(crate) fn record_failure(&mut self, pixel: usize, error: RangeError) {
        self.values[pixel] = None;
        self.failures.push(PixelFailure { pixel, error });
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, pixel: usize) -> Option<f64> {
        self.values.get(pixel).copied().flatten()
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn failures(&self) -> &[PixelFailure] {
        &self.failures
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// Values with NaN standing in for missing pixels.
    pub fn to_nan_filled(&self) -> Vec<f64> {
        self.values.iter().map(|v| v.unwrap_or(f64::NAN)).collect()
    }

    pub fn stats(&self) -> SeriesStats {
        let valid: Vec<f64> = self.values.iter().flatten().copied().collect();
        let total: f64 = valid.iter().sum();

        // min, max and mean are NaN when no pixel was corrected
        let (min, max, mean) = if valid.is_empty() {
            (f64::NAN, f64::NAN, f64::NAN)
        } else {
            (
                valid.iter().copied().fold(f64::INFINITY, f64::min),
                valid.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                total / valid.len() as f64,
            )
        };

        SeriesStats {
            valid: valid.len(),
            missing: self.len() - valid.len(),
            min,
            max,
            mean,
            total,
        }
    }
}

impl fmt::Display for CorrectedPowerSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats();
        write!(
            f,
            "Pixels: {}\nMissing: {}\nMin: {:.2} MW\nMax: {:.2} MW\nMean: {:.2} MW\nTotal: {:.2} MW",
            self.len(),
            stats.missing,
            stats.min,
            stats.max,
            stats.mean,
            stats.total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_starts_missing() {
        let series = CorrectedPowerSeries::missing(3);
        assert_eq!(series.len(), 3);
        assert_eq!(series.missing_count(), 3);
        assert_eq!(series.get(0), None);
        assert!(series.to_nan_filled().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_stats_skip_missing() {
        let mut series = CorrectedPowerSeries::missing(4);
        series.set(0, 10.0);
        series.set(1, 30.0);
        series.record_failure(2, RangeError::WaterVapor(f64::NAN));
        series.set(3, 20.0);

        let stats = series.stats();
        assert_eq!(stats.valid, 3);
        assert_eq!(stats.missing, 1);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 30.0);
        assert_eq!(stats.mean, 20.0);
        assert_eq!(stats.total, 60.0);
        assert_eq!(series.failures().len(), 1);
        assert_eq!(series.failures()[0].pixel, 2);
    }

    #[test]
    fn test_stats_without_valid_pixels() {
        let mut series = CorrectedPowerSeries::missing(2);
        series.record_failure(0, RangeError::Power(f64::NAN));

        let stats = series.stats();
        assert_eq!(stats.valid, 0);
        assert_eq!(stats.missing, 2);
        assert!(stats.min.is_nan());
        assert!(stats.max.is_nan());
        assert!(stats.mean.is_nan());
        assert_eq!(stats.total, 0.0);
        assert!(!series.to_string().contains("inf"));

        let empty = CorrectedPowerSeries::missing(0).stats();
        assert!(empty.min.is_nan() && empty.max.is_nan());
    }
}
