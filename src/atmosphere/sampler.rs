use super::AtmosphericField;
use crate::error::{CorrectionError, RangeError};

/// Precipitable water assumed when no atmospheric field is used (mm).
pub const DEFAULT_PRECIPITABLE_WATER_MM: f64 = 30.0;

/// Resolves the precipitable water above a fire pixel.
#[derive(Debug, Clone, Copy)]
pub enum WaterVaporSampler<'a> {
    /// Same value everywhere.
    Constant(f64),
    /// Nearest-cell lookup into one time step of a gridded field.
    Grid {
        field: &'a AtmosphericField,
        time_index: usize,
    },
}

impl<'a> WaterVaporSampler<'a> {
    pub fn grid(field: &'a AtmosphericField, time_index: usize) -> Result<Self, CorrectionError> {
        if time_index >= field.times() {
            return Err(CorrectionError::TimeIndexOutOfRange {
                index: time_index,
                count: field.times(),
            });
        }
        Ok(Self::Grid { field, time_index })
    }

    pub fn sample(&self, lat: f64, lon: f64) -> Result<f64, RangeError> {
        match self {
            Self::Constant(water_vapor) => Ok(*water_vapor),
            Self::Grid { field, time_index } => field.sample(*time_index, lat, lon),
        }
    }

    pub fn is_grid(&self) -> bool {
        matches!(self, Self::Grid { .. })
    }
}

impl Default for WaterVaporSampler<'_> {
    fn default() -> Self {
        Self::Constant(DEFAULT_PRECIPITABLE_WATER_MM)
    }
}
