//! Atmospheric correction of satellite fire radiative power (FRP).
//!
//! Each fire pixel's power is divided by the atmospheric transmittance found
//! in a precomputed table indexed by view zenith angle and precipitable water.
//! Water vapor comes from a constant default or from a gridded atmospheric
//! field sampled at the pixel's location.

pub mod atmosphere;
pub mod config;
pub mod correction;
pub mod error;
pub mod fire;
pub mod lut;
pub mod output;
pub mod readers;
