use std::fmt;

use crate::error::RangeError;
use crate::readers::ReadError;

/// Precipitable water (kg/m², equivalently mm) on a regular latitude/longitude
/// mesh, stored time-major as `[time][lat][lon]`.
///
/// Grid spacing is taken from the first two samples of each axis and keeps
/// its sign, so descending axes work with the same floor-division indexing.
#[derive(Debug, Clone)]
pub struct AtmosphericField {
    values: Vec<f64>,
    times: usize,
    latitudes: Vec<f64>,
    longitudes: Vec<f64>,
    lat_interval: f64,
    lon_interval: f64,
}

impl AtmosphericField {
    pub fn new(
        values: Vec<f64>,
        times: usize,
        latitudes: Vec<f64>,
        longitudes: Vec<f64>,
    ) -> Result<Self, ReadError> {
        if times == 0 {
            return Err(ReadError::Malformed(
                "atmospheric field has no time steps".to_string(),
            ));
        }

        let lat_interval = axis_interval("latitude", &latitudes)?;
        let lon_interval = axis_interval("longitude", &longitudes)?;

        let expected = times * latitudes.len() * longitudes.len();
        if values.len() != expected {
            return Err(ReadError::Malformed(format!(
                "atmospheric field holds {} values, expected {} ({} x {} x {})",
                values.len(),
                expected,
                times,
                latitudes.len(),
                longitudes.len()
            )));
        }

        Ok(Self {
            values,
            times,
            latitudes,
            longitudes,
            lat_interval,
            lon_interval,
        })
    }

    /// Shape as `(time, lat, lon)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.times, self.latitudes.len(), self.longitudes.len())
    }

    pub fn times(&self) -> usize {
        self.times
    }

    pub fn latitudes(&self) -> &[f64] {
        &self.latitudes
    }

    pub fn longitudes(&self) -> &[f64] {
        &self.longitudes
    }

    pub fn lat_interval(&self) -> f64 {
        self.lat_interval
    }

    pub fn lon_interval(&self) -> f64 {
        self.lon_interval
    }

    pub fn lat_min(&self) -> f64 {
        self.latitudes.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn lon_min(&self) -> f64 {
        self.longitudes.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Grid cell holding `(lat, lon)`: `floor((x - axis[0]) / interval)` on
    /// each axis. Coordinates outside the grid are an error, never wrapped.
    ///
    /// On ascending axes `axis[0]` is `lat_min()` / `lon_min()`, so this is
    /// the usual `floor((x - min) / interval)`.
    pub fn grid_index(&self, lat: f64, lon: f64) -> Result<(usize, usize), RangeError> {
        let lat_idx = ((lat - self.latitudes[0]) / self.lat_interval).floor();
        let lon_idx = ((lon - self.longitudes[0]) / self.lon_interval).floor();

        let n_lat = self.latitudes.len();
        let n_lon = self.longitudes.len();

        let in_grid = |idx: f64, len: usize| idx >= 0.0 && idx < len as f64;
        if in_grid(lat_idx, n_lat) && in_grid(lon_idx, n_lon) {
            Ok((lat_idx as usize, lon_idx as usize))
        } else {
            Err(RangeError::GridCell {
                lat,
                lon,
                lat_idx,
                lon_idx,
                n_lat,
                n_lon,
            })
        }
    }

    pub fn value(&self, time: usize, lat_idx: usize, lon_idx: usize) -> Option<f64> {
        let (times, n_lat, n_lon) = self.shape();
        if time >= times || lat_idx >= n_lat || lon_idx >= n_lon {
            return None;
        }
        self.values
            .get((time * n_lat + lat_idx) * n_lon + lon_idx)
            .copied()
    }

    /// Precipitable water at `(lat, lon)` for one time step. Fill cells
    /// (NaN) are reported as an unusable water vapor value.
    pub fn sample(&self, time: usize, lat: f64, lon: f64) -> Result<f64, RangeError> {
        let (lat_idx, lon_idx) = self.grid_index(lat, lon)?;
        let water_vapor = self
            .value(time, lat_idx, lon_idx)
            .ok_or(RangeError::WaterVapor(f64::NAN))?;

        if water_vapor.is_finite() {
            Ok(water_vapor)
        } else {
            Err(RangeError::WaterVapor(water_vapor))
        }
    }
}

fn axis_interval(name: &str, axis: &[f64]) -> Result<f64, ReadError> {
    if axis.len() < 2 {
        return Err(ReadError::Malformed(format!(
            "{} axis needs at least two samples, found {}",
            name,
            axis.len()
        )));
    }

    let interval = axis[1] - axis[0];
    if interval == 0.0 || !interval.is_finite() {
        return Err(ReadError::Malformed(format!(
            "{} axis spacing {} is not usable",
            name, interval
        )));
    }

    Ok(interval)
}

impl fmt::Display for AtmosphericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (times, n_lat, n_lon) = self.shape();
        write!(
            f,
            "AtmosphericField {{ shape: {}x{}x{}, lat_min: {}, lon_min: {}, lat_interval: {}, lon_interval: {} }}",
            times,
            n_lat,
            n_lon,
            self.lat_min(),
            self.lon_min(),
            self.lat_interval,
            self.lon_interval
        )
    }
}
