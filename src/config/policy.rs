use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// What to do with a pixel whose table row or grid cell is out of range.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutOfRangePolicy {
    /// Stop the whole granule at the first failing pixel.
    #[default]
    #[serde(rename = "abort")]
    Abort,
    /// Leave the pixel missing and keep going.
    #[serde(rename = "missing")]
    Missing,
}

#[derive(Error, Debug)]
#[error("invalid out-of-range policy '{0}', expected 'abort' or 'missing'")]
pub struct PolicyParseError(String);

impl FromStr for OutOfRangePolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(OutOfRangePolicy::Abort),
            "missing" => Ok(OutOfRangePolicy::Missing),
            _ => Err(PolicyParseError(s.to_string())),
        }
    }
}

impl fmt::Display for OutOfRangePolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OutOfRangePolicy::Abort => write!(f, "abort"),
            OutOfRangePolicy::Missing => write!(f, "missing"),
        }
    }
}
