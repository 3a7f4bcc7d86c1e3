//! NetCDF readers for FILDA-2 fire granules (`VNP47IMG`) and GEOS-FP
//! single-level diagnostics.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::utils::{grid_shape, unpack_values};
use super::{FieldReader, FirePixelReader, ReadError};
use crate::atmosphere::AtmosphericField;
use crate::config::FieldSource;
use crate::fire::FirePixelSet;

pub struct NcFireReader {
    pub file_name: PathBuf,
}

impl FirePixelReader for NcFireReader {
    fn read_fire_pixels(&self) -> Result<FirePixelSet, ReadError> {
        let file = open(&self.file_name)?;

        let latitude = read_variable(&file, "FP_Latitude")?;
        let longitude = read_variable(&file, "FP_Longitude")?;
        let power = read_variable(&file, "FP_Power")?;
        let sensor_zenith = read_variable(&file, "Sensor_Zenith")?;

        debug!(
            file = %self.file_name.display(),
            pixels = power.len(),
            "Read FILDA-2 fire pixels"
        );

        Ok(FirePixelSet::new(
            latitude,
            longitude,
            power,
            sensor_zenith,
        )?)
    }
}

pub struct NcFieldReader {
    pub source: FieldSource,
}

impl FieldReader for NcFieldReader {
    fn read_field(&self) -> Result<AtmosphericField, ReadError> {
        let file = open(&self.source.path)?;

        let var = file
            .variable(&self.source.variable)
            .ok_or_else(|| ReadError::MissingVariable(self.source.variable.clone()))?;
        let dims: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();

        let (times, n_lat, n_lon) = grid_shape(&dims).ok_or_else(|| {
            ReadError::Malformed(format!(
                "{} has {} dimensions, expected (time, lat, lon)",
                self.source.variable,
                dims.len()
            ))
        })?;

        let values = unpack(&var)?;
        let latitudes = read_variable(&file, &self.source.latitude)?;
        let longitudes = read_variable(&file, &self.source.longitude)?;

        if latitudes.len() != n_lat || longitudes.len() != n_lon {
            return Err(ReadError::Malformed(format!(
                "{} is {}x{} but the axes have {} latitudes and {} longitudes",
                self.source.variable,
                n_lat,
                n_lon,
                latitudes.len(),
                longitudes.len()
            )));
        }

        debug!(
            file = %self.source.path.display(),
            variable = %self.source.variable,
            times,
            n_lat,
            n_lon,
            "Read atmospheric field"
        );

        AtmosphericField::new(values, times, latitudes, longitudes)
    }
}

fn open(path: &Path) -> Result<netcdf::File, ReadError> {
    netcdf::open(path)
        .map_err(|e| ReadError::NetCdf(format!("Failed to open {}: {}", path.display(), e)))
}

fn read_variable(file: &netcdf::File, name: &str) -> Result<Vec<f64>, ReadError> {
    let var = file
        .variable(name)
        .ok_or_else(|| ReadError::MissingVariable(name.to_string()))?;
    unpack(&var)
}

/// Reads all values, replacing fill values with NaN and applying
/// `scale_factor` / `add_offset` when present.
fn unpack(var: &netcdf::Variable) -> Result<Vec<f64>, ReadError> {
    let raw: Vec<f64> = var
        .get_values(..)
        .map_err(|e| ReadError::NetCdf(format!("Failed to read {}: {}", var.name(), e)))?;

    let fill_value = get_f64_attr(var, "_FillValue").or_else(|| get_f64_attr(var, "missing_value"));
    let scale_factor = get_f64_attr(var, "scale_factor").unwrap_or(1.0);
    let add_offset = get_f64_attr(var, "add_offset").unwrap_or(0.0);

    Ok(unpack_values(raw, fill_value, scale_factor, add_offset))
}

fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_fire_granule(path: &Path) {
        let mut file = netcdf::create(path).unwrap();
        file.add_dimension("nfire", 3).unwrap();

        for (name, values) in [
            ("FP_Latitude", [-12.5, -12.6, -12.7]),
            ("FP_Longitude", [131.0, 131.1, 131.2]),
            ("Sensor_Zenith", [0.4, 20.2, 55.9]),
        ] {
            let mut var = file.add_variable::<f64>(name, &["nfire"]).unwrap();
            var.put_values(&values[..], ..).unwrap();
        }

        let mut power = file.add_variable::<f64>("FP_Power", &["nfire"]).unwrap();
        power.put_attribute("_FillValue", -999.0f64).unwrap();
        power.put_values(&[10.0, -999.0, 4.0], ..).unwrap();
    }

    fn write_tqv(path: &Path, dims: &[&str], values: &[f64]) {
        let mut file = netcdf::create(path).unwrap();
        if dims.len() == 3 {
            file.add_dimension("time", 2).unwrap();
        }
        file.add_dimension("lat", 2).unwrap();
        file.add_dimension("lon", 2).unwrap();

        let mut lat = file.add_variable::<f64>("lat", &["lat"]).unwrap();
        lat.put_values(&[10.0, 10.5], ..).unwrap();
        let mut lon = file.add_variable::<f64>("lon", &["lon"]).unwrap();
        lon.put_values(&[20.0, 20.625], ..).unwrap();

        let mut tqv = file.add_variable::<f64>("TQV", dims).unwrap();
        tqv.put_attribute("scale_factor", 0.5f64).unwrap();
        tqv.put_attribute("add_offset", 1.0f64).unwrap();
        tqv.put_values(values, ..).unwrap();
    }

    #[test]
    fn test_read_fire_granule() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("VNP47IMG.A2014365.2354.002.2024304000833.nc");
        write_fire_granule(&path);

        let pixels = NcFireReader { file_name: path }.read_fire_pixels().unwrap();

        assert_eq!(pixels.len(), 3);
        assert_eq!(pixels.latitude(), &[-12.5, -12.6, -12.7]);
        assert_eq!(pixels.power()[0], 10.0);
        assert!(pixels.power()[1].is_nan());
        assert_eq!(pixels.sensor_zenith()[2], 55.9);
    }

    #[test]
    fn test_read_packed_field() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("GEOS.fp.asm.inst3_2d_asm_Nx.nc4");
        // (time, lat, lon), stored as (w - 1) / 0.5
        write_tqv(
            &path,
            &["time", "lat", "lon"],
            &[18.0, 38.0, 58.0, 78.0, 20.0, 40.0, 60.0, 80.0],
        );

        let field = NcFieldReader {
            source: FieldSource::new(&path),
        }
        .read_field()
        .unwrap();

        assert_eq!(field.shape(), (2, 2, 2));
        assert_eq!(field.sample(0, 10.1, 20.1), Ok(10.0));
        assert_eq!(field.sample(1, 10.6, 20.7), Ok(41.0));
    }

    #[test]
    fn test_read_single_time_step_field() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tqv.nc");
        write_tqv(&path, &["lat", "lon"], &[18.0, 38.0, 58.0, 78.0]);

        let field = NcFieldReader {
            source: FieldSource::new(&path),
        }
        .read_field()
        .unwrap();

        assert_eq!(field.shape(), (1, 2, 2));
        assert_eq!(field.sample(0, 10.6, 20.1), Ok(30.0));
    }

    #[test]
    fn test_missing_field_variable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tqv.nc");
        write_tqv(&path, &["lat", "lon"], &[18.0, 38.0, 58.0, 78.0]);

        let mut source = FieldSource::new(&path);
        source.variable = "TPW".to_string();
        assert!(matches!(
            NcFieldReader { source }.read_field(),
            Err(ReadError::MissingVariable(_))
        ));
    }
}
