use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::CorrectionError;

/// A single active-fire detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirePixel {
    pub latitude: f64,      // degrees
    pub longitude: f64,     // degrees
    pub power: f64,         // MW
    pub sensor_zenith: f64, // degrees
}

/// Fire detections of one granule, stored as parallel arrays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FirePixelSet {
    latitude: Vec<f64>,
    longitude: Vec<f64>,
    power: Vec<f64>,
    sensor_zenith: Vec<f64>,
}

impl FirePixelSet {
    pub fn new(
        latitude: Vec<f64>,
        longitude: Vec<f64>,
        power: Vec<f64>,
        sensor_zenith: Vec<f64>,
    ) -> Result<Self, CorrectionError> {
        let n = latitude.len();
        if longitude.len() != n || power.len() != n || sensor_zenith.len() != n {
            return Err(CorrectionError::LengthMismatch {
                latitude: latitude.len(),
                longitude: longitude.len(),
                power: power.len(),
                zenith: sensor_zenith.len(),
            });
        }

        Ok(Self {
            latitude,
            longitude,
            power,
            sensor_zenith,
        })
    }

    pub fn len(&self) -> usize {
        self.power.len()
    }

    pub fn is_empty(&self) -> bool {
        self.power.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<FirePixel> {
        Some(FirePixel {
            latitude: *self.latitude.get(index)?,
            longitude: *self.longitude.get(index)?,
            power: *self.power.get(index)?,
            sensor_zenith: *self.sensor_zenith.get(index)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = FirePixel> + '_ {
        (0..self.len()).filter_map(|i| self.get(i))
    }

    pub fn latitude(&self) -> &[f64] {
        &self.latitude
    }

    pub fn longitude(&self) -> &[f64] {
        &self.longitude
    }

    pub fn power(&self) -> &[f64] {
        &self.power
    }

    pub fn sensor_zenith(&self) -> &[f64] {
        &self.sensor_zenith
    }
}

impl FromIterator<FirePixel> for FirePixelSet {
    fn from_iter<I: IntoIterator<Item = FirePixel>>(iter: I) -> Self {
        let mut set = FirePixelSet::default();
        for pixel in iter {
            set.latitude.push(pixel.latitude);
            set.longitude.push(pixel.longitude);
            set.power.push(pixel.power);
            set.sensor_zenith.push(pixel.sensor_zenith);
        }
        set
    }
}

/// Acquisition time encoded in VIIRS/MODIS granule names, e.g.
/// `VNP47IMG.A2014365.2354.002.2024304000833.nc` -> 2014-12-31 23:54.
pub fn acquisition_time(path: &Path) -> Option<NaiveDateTime> {
    let name = path.file_name()?.to_str()?;
    let parts: Vec<&str> = name.split('.').collect();

    parts.windows(2).find_map(|pair| {
        let date = pair[0].strip_prefix('A')?;
        let time = pair[1];
        let digits = |s: &str, n: usize| s.len() == n && s.bytes().all(|b| b.is_ascii_digit());
        if !digits(date, 7) || !digits(time, 4) {
            return None;
        }

        let year: i32 = date[..4].parse().ok()?;
        let ordinal: u32 = date[4..].parse().ok()?;
        let hour: u32 = time[..2].parse().ok()?;
        let minute: u32 = time[2..].parse().ok()?;

        NaiveDate::from_yo_opt(year, ordinal)?.and_hms_opt(hour, minute, 0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_lengths() {
        let set = FirePixelSet::new(vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0], vec![7.0, 8.0]);
        assert_eq!(set.unwrap().len(), 2);

        let mismatched = FirePixelSet::new(vec![1.0, 2.0], vec![3.0], vec![5.0, 6.0], vec![7.0, 8.0]);
        assert_eq!(
            mismatched.unwrap_err(),
            CorrectionError::LengthMismatch {
                latitude: 2,
                longitude: 1,
                power: 2,
                zenith: 2
            }
        );
    }

    #[test]
    fn test_get_and_iter_keep_pixels_aligned() {
        let set = FirePixelSet::new(
            vec![10.0, 11.0],
            vec![20.0, 21.0],
            vec![30.0, 31.0],
            vec![40.0, 41.0],
        )
        .unwrap();

        assert_eq!(
            set.get(1),
            Some(FirePixel {
                latitude: 11.0,
                longitude: 21.0,
                power: 31.0,
                sensor_zenith: 41.0
            })
        );
        assert_eq!(set.get(2), None);

        let rebuilt: FirePixelSet = set.iter().collect();
        assert_eq!(rebuilt, set);
    }

    #[test]
    fn test_acquisition_time_from_granule_name() {
        let path = Path::new("./data/VNP47IMG.A2014365.2354.002.2024304000833.nc");
        let expected = NaiveDate::from_ymd_opt(2014, 12, 31)
            .unwrap()
            .and_hms_opt(23, 54, 0)
            .unwrap();
        assert_eq!(acquisition_time(path), Some(expected));
    }

    #[test]
    fn test_acquisition_time_missing() {
        assert_eq!(acquisition_time(Path::new("fires.csv")), None);
        assert_eq!(acquisition_time(Path::new("VNP47IMG.A2014400.2354.nc")), None);
    }
}
