use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

use super::{FirePixelReader, ReadError};
use crate::fire::FirePixelSet;

// Accepted column names, FILDA-2 variable names first.
const LATITUDE: &[&str] = &["FP_Latitude", "latitude", "lat"];
const LONGITUDE: &[&str] = &["FP_Longitude", "longitude", "lon"];
const POWER: &[&str] = &["FP_Power", "frp", "power"];
const SENSOR_ZENITH: &[&str] = &["Sensor_Zenith", "sensor_zenith", "vza"];

/// Fire pixels exported as a table, one row per detection.
pub struct CsvFireReader {
    pub file_name: PathBuf,
}

impl FirePixelReader for CsvFireReader {
    fn read_fire_pixels(&self) -> Result<FirePixelSet, ReadError> {
        let file = File::open(&self.file_name)?;
        read_fire_pixels_csv(BufReader::new(file))
    }
}

pub fn read_fire_pixels_csv<R: Read>(reader: R) -> Result<FirePixelSet, ReadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let column = |names: &[&str]| {
        headers
            .iter()
            .position(|header| names.iter().any(|name| header.eq_ignore_ascii_case(name)))
            .ok_or_else(|| ReadError::MissingVariable(names[0].to_string()))
    };

    let columns = [
        column(LATITUDE)?,
        column(LONGITUDE)?,
        column(POWER)?,
        column(SENSOR_ZENITH)?,
    ];

    let mut arrays: [Vec<f64>; 4] = Default::default();
    for (line, record) in csv_reader.records().enumerate() {
        let record = record?;
        for (array, &col) in arrays.iter_mut().zip(&columns) {
            let cell = record.get(col).unwrap_or_default();
            array.push(parse_cell(cell).ok_or_else(|| {
                ReadError::Malformed(format!(
                    "fire pixel {} has non-numeric value '{}' in column '{}'",
                    line,
                    cell,
                    &headers[col]
                ))
            })?);
        }
    }

    let [latitude, longitude, power, sensor_zenith] = arrays;
    Ok(FirePixelSet::new(latitude, longitude, power, sensor_zenith)?)
}

// Empty cells are missing values.
fn parse_cell(cell: &str) -> Option<f64> {
    if cell.is_empty() {
        Some(f64::NAN)
    } else {
        cell.parse::<f64>().ok()
    }
}
