use super::types::{FileType, ReadError};
use std::path::Path;

pub fn file_type(path: &Path) -> Result<FileType, ReadError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some("csv") => Ok(FileType::Csv),
        Some("nc") | Some("nc4") => Ok(FileType::NetCDF),
        Some("tif") | Some("tiff") => Ok(FileType::GeoTiff),
        _ => Err(ReadError::UnsupportedFileType(path.display().to_string())),
    }
}

/// Applies CF packing to raw values: fill values become NaN, everything
/// else becomes `raw * scale_factor + add_offset`.
pub fn unpack_values(
    raw: Vec<f64>,
    fill_value: Option<f64>,
    scale_factor: f64,
    add_offset: f64,
) -> Vec<f64> {
    raw.into_iter()
        .map(|val| {
            if fill_value.is_some_and(|fill| val == fill) {
                f64::NAN
            } else {
                val * scale_factor + add_offset
            }
        })
        .collect()
}

/// `(time, lat, lon)` from a variable's dimension lengths. A 2-D variable
/// is a single time step.
pub fn grid_shape(dims: &[usize]) -> Option<(usize, usize, usize)> {
    match *dims {
        [times, n_lat, n_lon] => Some((times, n_lat, n_lon)),
        [n_lat, n_lon] => Some((1, n_lat, n_lon)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type() {
        assert_eq!(
            file_type(Path::new("VNP47IMG.A2014365.2354.002.2024304000833.nc")).unwrap(),
            FileType::NetCDF
        );
        assert_eq!(
            file_type(Path::new(
                "GEOS.fp.asm.inst3_2d_asm_Nx.20141231_2100.V01.nc4"
            ))
            .unwrap(),
            FileType::NetCDF
        );
        assert_eq!(file_type(Path::new("fires.CSV")).unwrap(), FileType::Csv);
        assert_eq!(file_type(Path::new("tqv.tif")).unwrap(), FileType::GeoTiff);
        assert!(file_type(Path::new("LUT_VNP")).is_err());
        assert!(file_type(Path::new("granule.zarr")).is_err());
    }

    #[test]
    fn test_unpack_values() {
        let raw = vec![100.0, -9999.0, 250.0];
        let values = unpack_values(raw, Some(-9999.0), 0.5, 5.0);

        assert_eq!(values[0], 55.0);
        assert!(values[1].is_nan());
        assert_eq!(values[2], 130.0);
    }

    #[test]
    fn test_unpack_values_without_packing() {
        let values = unpack_values(vec![1.5, f64::NAN], None, 1.0, 0.0);
        assert_eq!(values[0], 1.5);
        assert!(values[1].is_nan());
    }

    #[test]
    fn test_grid_shape() {
        assert_eq!(grid_shape(&[8, 361, 576]), Some((8, 361, 576)));
        assert_eq!(grid_shape(&[361, 576]), Some((1, 361, 576)));
        assert_eq!(grid_shape(&[576]), None);
        assert_eq!(grid_shape(&[1, 1, 361, 576]), None);
    }
}
