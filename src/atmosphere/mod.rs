//! Precipitable water above fire pixels, either a fixed assumption or a
//! nearest-cell lookup into a gridded atmospheric model field (GEOS-FP `TQV`).

pub mod field;
pub mod sampler;

pub use field::AtmosphericField;
pub use sampler::{DEFAULT_PRECIPITABLE_WATER_MM, WaterVaporSampler};
