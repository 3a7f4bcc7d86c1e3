use rayon::prelude::*;
use tracing::{debug, trace, warn};

use super::pixel::PixelCorrection;
use super::series::CorrectedPowerSeries;
use crate::atmosphere::{AtmosphericField, DEFAULT_PRECIPITABLE_WATER_MM, WaterVaporSampler};
use crate::config::OutOfRangePolicy;
use crate::error::{CorrectionError, RangeError};
use crate::fire::{FirePixel, FirePixelSet};
use crate::lut::TransmittanceTable;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectionOptions {
    /// Sample water vapor from the atmospheric field instead of using
    /// `default_water_vapor`.
    pub use_atmospheric_field: bool,
    /// Time step of the atmospheric field to sample.
    pub time_index: usize,
    pub default_water_vapor: f64,
    pub out_of_range: OutOfRangePolicy,
    pub parallel: bool,
}

impl Default for CorrectionOptions {
    fn default() -> Self {
        Self {
            use_atmospheric_field: false,
            time_index: 0,
            default_water_vapor: DEFAULT_PRECIPITABLE_WATER_MM,
            out_of_range: OutOfRangePolicy::Abort,
            parallel: false,
        }
    }
}

/// First-order atmospheric correction of fire radiative power: each pixel's
/// power is divided by the transmittance for its water vapor and view zenith.
#[derive(Debug)]
pub struct CorrectionEngine<'a> {
    table: &'a TransmittanceTable,
    sampler: WaterVaporSampler<'a>,
    options: CorrectionOptions,
}

impl<'a> CorrectionEngine<'a> {
    /// Fails when field mode is requested without a field, or with a time
    /// index the field does not have.
    pub fn new(
        table: &'a TransmittanceTable,
        options: CorrectionOptions,
        field: Option<&'a AtmosphericField>,
    ) -> Result<Self, CorrectionError> {
        let sampler = if options.use_atmospheric_field {
            let field = field.ok_or(CorrectionError::MissingAtmosphericField)?;
            WaterVaporSampler::grid(field, options.time_index)?
        } else {
            WaterVaporSampler::Constant(options.default_water_vapor)
        };

        Ok(Self {
            table,
            sampler,
            options,
        })
    }

    pub fn sampler(&self) -> &WaterVaporSampler<'a> {
        &self.sampler
    }

    pub fn options(&self) -> &CorrectionOptions {
        &self.options
    }

    pub fn correct_pixel(&self, pixel: &FirePixel) -> Result<PixelCorrection, RangeError> {
        if !pixel.power.is_finite() {
            return Err(RangeError::Power(pixel.power));
        }

        let water_vapor = self.sampler.sample(pixel.latitude, pixel.longitude)?;
        let cell = self.table.resolve(water_vapor, pixel.sensor_zenith)?;
        let corrected_power = pixel.power / cell.transmittance;

        trace!(
            latitude = pixel.latitude,
            longitude = pixel.longitude,
            sensor_zenith = pixel.sensor_zenith,
            water_vapor,
            water_vapor_index = cell.water_vapor_index,
            zenith_row = cell.zenith_row,
            transmittance = cell.transmittance,
            power = pixel.power,
            corrected_power,
            "Corrected fire pixel"
        );

        Ok(PixelCorrection {
            water_vapor,
            water_vapor_index: cell.water_vapor_index,
            zenith_row: cell.zenith_row,
            transmittance: cell.transmittance,
            corrected_power,
        })
    }

    /// Corrects every pixel, keeping input order.
    pub fn correct(&self, pixels: &FirePixelSet) -> Result<CorrectedPowerSeries, CorrectionError> {
        let mut series = CorrectedPowerSeries::missing(pixels.len());

        if self.options.parallel {
            let batch: Vec<FirePixel> = pixels.iter().collect();
            let results: Vec<Result<PixelCorrection, RangeError>> = batch
                .par_iter()
                .map(|pixel| self.correct_pixel(pixel))
                .collect();

            for (index, result) in results.into_iter().enumerate() {
                self.record(&mut series, index, result)?;
            }
        } else {
            for (index, pixel) in pixels.iter().enumerate() {
                self.record(&mut series, index, self.correct_pixel(&pixel))?;
            }
        }

        debug!(
            pixels = series.len(),
            missing = series.missing_count(),
            grid = self.sampler.is_grid(),
            "Corrected fire radiative power"
        );

        Ok(series)
    }

    fn record(
        &self,
        series: &mut CorrectedPowerSeries,
        pixel: usize,
        result: Result<PixelCorrection, RangeError>,
    ) -> Result<(), CorrectionError> {
        match result {
            Ok(correction) => series.set(pixel, correction.corrected_power),
            Err(source) => match self.options.out_of_range {
                OutOfRangePolicy::Abort => return Err(CorrectionError::Range { pixel, source }),
                OutOfRangePolicy::Missing => {
                    warn!(pixel, error = %source, "Leaving fire pixel uncorrected");
                    series.record_failure(pixel, source);
                }
            },
        }
        Ok(())
    }
}
