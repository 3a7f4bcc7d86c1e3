pub mod csv_reader;
pub mod geotiff;
#[cfg(feature = "netcdf")]
pub mod nc;
pub mod types;
pub mod utils;

pub use csv_reader::CsvFireReader;
pub use geotiff::GeoTiffFieldReader;
#[cfg(feature = "netcdf")]
pub use nc::{NcFieldReader, NcFireReader};
pub use types::{FieldReader, FileType, FirePixelReader, ReadError};
pub use utils::{file_type, grid_shape, unpack_values};

use std::path::Path;

use crate::config::FieldSource;

pub fn create_fire_reader(path: &Path) -> Result<Box<dyn FirePixelReader>, ReadError> {
    match file_type(path)? {
        FileType::Csv => Ok(Box::new(CsvFireReader {
            file_name: path.to_path_buf(),
        })),
        #[cfg(feature = "netcdf")]
        FileType::NetCDF => Ok(Box::new(NcFireReader {
            file_name: path.to_path_buf(),
        })),
        #[cfg(not(feature = "netcdf"))]
        FileType::NetCDF => Err(ReadError::FeatureDisabled("NetCDF")),
        FileType::GeoTiff => Err(ReadError::UnsupportedFileType(format!(
            "{} (fire pixels are read from NetCDF or CSV)",
            path.display()
        ))),
    }
}

pub fn create_field_reader(source: &FieldSource) -> Result<Box<dyn FieldReader>, ReadError> {
    match file_type(&source.path)? {
        FileType::GeoTiff => Ok(Box::new(GeoTiffFieldReader {
            file_name: source.path.clone(),
        })),
        #[cfg(feature = "netcdf")]
        FileType::NetCDF => Ok(Box::new(NcFieldReader {
            source: source.clone(),
        })),
        #[cfg(not(feature = "netcdf"))]
        FileType::NetCDF => Err(ReadError::FeatureDisabled("NetCDF")),
        FileType::Csv => Err(ReadError::UnsupportedFileType(format!(
            "{} (atmospheric fields are read from NetCDF or GeoTIFF)",
            source.path.display()
        ))),
    }
}
