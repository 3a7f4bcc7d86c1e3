use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::correction::{CorrectedPowerSeries, SeriesStats};
use crate::fire::{self, FirePixelSet};

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// How water vapor was resolved for a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum WaterVaporMode {
    Constant {
        water_vapor: f64,
    },
    Grid {
        source: PathBuf,
        variable: String,
        time_index: usize,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub source: PathBuf,
    pub acquisition_time: Option<NaiveDateTime>,
    pub processed_at: DateTime<Utc>,
    pub water_vapor: WaterVaporMode,
    pub pixels: usize,
    pub raw_total: f64,
    pub corrected: SeriesStats,
    pub output: Option<PathBuf>,
}

impl RunSummary {
    pub fn new(
        source: &Path,
        pixels: &FirePixelSet,
        series: &CorrectedPowerSeries,
        water_vapor: WaterVaporMode,
    ) -> Self {
        Self {
            source: source.to_path_buf(),
            acquisition_time: fire::acquisition_time(source),
            processed_at: Utc::now(),
            water_vapor,
            pixels: pixels.len(),
            raw_total: pixels.power().iter().filter(|p| !p.is_nan()).sum(),
            corrected: series.stats(),
            output: None,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Source: {}", self.source.display())?;
        if let Some(time) = self.acquisition_time {
            writeln!(f, "Acquired: {}", time.format("%Y-%m-%d %H:%M"))?;
        }
        writeln!(f, "Fire pixels: {}", self.pixels)?;
        writeln!(f, "  Missing: {}", self.corrected.missing)?;
        writeln!(f, "  Raw FRP total: {:.2} MW", self.raw_total)?;
        writeln!(f, "  Corrected FRP total: {:.2} MW", self.corrected.total)?;
        writeln!(f, "  Min: {:.2} MW", self.corrected.min)?;
        writeln!(f, "  Max: {:.2} MW", self.corrected.max)?;
        write!(f, "  Mean: {:.2} MW", self.corrected.mean)
    }
}

/// Writes one row per fire pixel with its corrected power; missing pixels
/// are written as `NaN`.
pub fn write_corrected_csv<W: Write>(
    writer: W,
    pixels: &FirePixelSet,
    series: &CorrectedPowerSeries,
) -> Result<(), OutputError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        "pixel",
        "FP_Latitude",
        "FP_Longitude",
        "FP_Power",
        "Sensor_Zenith",
        "FP_Power_AC",
    ])?;

    for (index, (pixel, corrected)) in pixels.iter().zip(series.to_nan_filled()).enumerate() {
        csv_writer.write_record([
            index.to_string(),
            pixel.latitude.to_string(),
            pixel.longitude.to_string(),
            pixel.power.to_string(),
            pixel.sensor_zenith.to_string(),
            corrected.to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Writes `<stem>_AC.csv` and `<stem>_AC.json` into `directory` and returns
/// the CSV path.
pub fn write_outputs(
    directory: &Path,
    pixels: &FirePixelSet,
    series: &CorrectedPowerSeries,
    summary: &mut RunSummary,
) -> Result<PathBuf, OutputError> {
    fs::create_dir_all(directory)?;

    let stem = summary
        .source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "fire_pixels".to_string());

    let csv_path = directory.join(format!("{}_AC.csv", stem));
    write_corrected_csv(BufWriter::new(File::create(&csv_path)?), pixels, series)?;
    summary.output = Some(csv_path.clone());

    let json_path = directory.join(format!("{}_AC.json", stem));
    serde_json::to_writer_pretty(BufWriter::new(File::create(json_path)?), summary)?;

    Ok(csv_path)
}
