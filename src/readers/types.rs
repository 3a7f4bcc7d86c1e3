use thiserror::Error;

use crate::atmosphere::AtmosphericField;
use crate::error::CorrectionError;
use crate::fire::FirePixelSet;

pub trait FirePixelReader {
    fn read_fire_pixels(&self) -> Result<FirePixelSet, ReadError>;
}

pub trait FieldReader {
    fn read_field(&self) -> Result<AtmosphericField, ReadError>;
}

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("GeoTIFF error: {0}")]
    GeoTiff(#[from] tiff::TiffError),

    #[error("NetCDF error: {0}")]
    NetCdf(String),

    #[error("missing variable '{0}'")]
    MissingVariable(String),

    #[error("malformed input: {0}")]
    Malformed(String),

    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("{0} support is not enabled in this build")]
    FeatureDisabled(&'static str),

    #[error(transparent)]
    Correction(#[from] CorrectionError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Csv,
    NetCDF,
    GeoTiff,
}
