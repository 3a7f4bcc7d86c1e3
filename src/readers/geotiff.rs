use super::{FieldReader, ReadError};
use crate::atmosphere::AtmosphericField;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

/// Single-band precipitable water raster on a regular lat/lon grid,
/// georeferenced with the `ModelPixelScale` and `ModelTiepoint` tags.
///
/// Axes hold the north-west corner of each pixel, so latitude descends and
/// floor indexing returns the pixel containing a coordinate. Negative values
/// are treated as nodata.
pub struct GeoTiffFieldReader {
    pub file_name: PathBuf,
}

impl FieldReader for GeoTiffFieldReader {
    fn read_field(&self) -> Result<AtmosphericField, ReadError> {
        let file = File::open(&self.file_name)?;
        let reader = BufReader::new(file);

        let mut decoder = Decoder::new(reader)?;
        let (width, height) = decoder.dimensions()?;

        let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag)?;
        let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag)?;
        if scale.len() < 2 || tiepoint.len() < 6 {
            return Err(ReadError::Malformed(format!(
                "{}: incomplete georeferencing tags",
                self.file_name.display()
            )));
        }

        // Tiepoint maps raster (i, j) to model (x, y)
        let (pixel_width, pixel_height) = (scale[0], scale[1]);
        let west = tiepoint[3] - tiepoint[0] * pixel_width;
        let north = tiepoint[4] + tiepoint[1] * pixel_height;

        let longitudes = (0..width)
            .map(|i| west + f64::from(i) * pixel_width)
            .collect();
        let latitudes = (0..height)
            .map(|j| north - f64::from(j) * pixel_height)
            .collect();

        let values: Vec<f64> = match decoder.read_image()? {
            DecodingResult::U8(data) => data.iter().map(|&x| f64::from(x)).collect(),
            DecodingResult::U16(data) => data.iter().map(|&x| f64::from(x)).collect(),
            DecodingResult::I16(data) => data.iter().map(|&x| f64::from(x)).collect(),
            DecodingResult::U32(data) => data.iter().map(|&x| f64::from(x)).collect(),
            DecodingResult::I32(data) => data.iter().map(|&x| f64::from(x)).collect(),
            DecodingResult::F32(data) => data.iter().map(|&x| f64::from(x)).collect(),
            DecodingResult::F64(data) => data,
            _ => {
                return Err(ReadError::Malformed(
                    "unsupported pixel format".to_string(),
                ));
            }
        };

        let values = values
            .into_iter()
            .map(|w| if w < 0.0 { f64::NAN } else { w })
            .collect();

        AtmosphericField::new(values, 1, latitudes, longitudes)
    }
}
