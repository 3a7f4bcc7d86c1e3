//! Error taxonomy shared by the lookup table, the water-vapor sampler and
//! the correction engine.

use thiserror::Error;

/// A pixel could not be resolved: its table row or grid cell fell outside
/// its bounds, or one of its inputs is a fill value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RangeError {
    #[error("view zenith {zenith}° truncates to row {row}, table has {rows} rows")]
    ZenithRow { zenith: f64, row: f64, rows: usize },

    #[error(
        "coordinate ({lat}, {lon}) maps to grid cell ({lat_idx}, {lon_idx}) outside a {n_lat}x{n_lon} grid"
    )]
    GridCell {
        lat: f64,
        lon: f64,
        lat_idx: f64,
        lon_idx: f64,
        n_lat: usize,
        n_lon: usize,
    },

    #[error("precipitable water {0} mm is not a finite value")]
    WaterVapor(f64),

    /// Fill-valued or otherwise unusable radiative power.
    #[error("fire radiative power {0} MW is not a finite value")]
    Power(f64),
}

/// Errors raised while building or running the correction engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CorrectionError {
    /// Grid mode was requested without an atmospheric field.
    #[error("atmospheric field correction requested but no field was supplied")]
    MissingAtmosphericField,

    #[error("time index {index} out of range, atmospheric field has {count} time steps")]
    TimeIndexOutOfRange { index: usize, count: usize },

    /// Fire-pixel arrays do not describe the same pixels.
    #[error(
        "fire pixel arrays differ in length: latitude {latitude}, longitude {longitude}, power {power}, sensor zenith {zenith}"
    )]
    LengthMismatch {
        latitude: usize,
        longitude: usize,
        power: usize,
        zenith: usize,
    },

    #[error("pixel {pixel}: {source}")]
    Range {
        pixel: usize,
        #[source]
        source: RangeError,
    },
}
