use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::atmosphere::AtmosphericField;
use crate::config::{Config, ConfigError, FireFiles};
use crate::correction::{CorrectedPowerSeries, CorrectionEngine};
use crate::error::CorrectionError;
use crate::fire::FirePixelSet;
use crate::lut::TransmittanceTable;
use crate::output::{self, OutputError, RunSummary, WaterVaporMode};
use crate::readers::{self, ReadError};

#[derive(Error, Debug)]
pub enum BatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ReadError,
    },

    #[error("{path}: {source}")]
    Correction {
        path: PathBuf,
        #[source]
        source: CorrectionError,
    },

    /// The engine could not be built from the configured inputs.
    #[error(transparent)]
    Engine(CorrectionError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("no fire pixel files found: {0}")]
    NoFireFiles(String),
}

/// Corrects every configured fire-pixel file against one transmittance table
/// and at most one atmospheric field.
#[derive(Debug)]
pub struct BatchRunner {
    config: Config,
    fire_files: Vec<PathBuf>,
}

impl BatchRunner {
    pub fn new(config: Config) -> Result<Self, BatchError> {
        config.validate()?;
        let fire_files = Self::find_fire_files(config.fire_files())?;
        Ok(BatchRunner { config, fire_files })
    }

    pub fn fire_files(&self) -> &[PathBuf] {
        &self.fire_files
    }

    fn find_fire_files(fire_files: &FireFiles) -> Result<Vec<PathBuf>, BatchError> {
        match fire_files {
            FireFiles::Path(path) => Ok(vec![path.clone()]),
            FireFiles::Search { directory, pattern } => {
                let matcher = glob::Pattern::new(pattern).map_err(|source| {
                    ConfigError::Pattern {
                        pattern: pattern.clone(),
                        source,
                    }
                })?;

                let mut files: Vec<PathBuf> = WalkDir::new(directory)
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|entry| {
                        entry.file_type().is_file()
                            && matcher.matches(&entry.file_name().to_string_lossy())
                    })
                    .map(|entry| entry.into_path())
                    .collect();
                files.sort();

                if files.is_empty() {
                    return Err(BatchError::NoFireFiles(format!(
                        "nothing under {} matches '{}'",
                        directory.display(),
                        pattern
                    )));
                }

                info!(
                    directory = %directory.display(),
                    pattern = %pattern,
                    count = files.len(),
                    "Found fire pixel files"
                );
                Ok(files)
            }
        }
    }

    fn read_field(&self) -> Result<Option<AtmosphericField>, BatchError> {
        let Some(source) = self.config.atmospheric_field() else {
            return Ok(None);
        };

        info!(file = %source.path.display(), "Reading atmospheric field");
        let field = readers::create_field_reader(source)
            .and_then(|reader| reader.read_field())
            .map_err(|source_err| BatchError::Read {
                path: source.path.clone(),
                source: source_err,
            })?;
        info!("{}", field);

        Ok(Some(field))
    }

    fn water_vapor_mode(&self) -> WaterVaporMode {
        let options = self.config.correction_options();
        match self.config.atmospheric_field() {
            Some(source) => WaterVaporMode::Grid {
                source: source.path.clone(),
                variable: source.variable.clone(),
                time_index: source.time_index,
            },
            None => WaterVaporMode::Constant {
                water_vapor: options.default_water_vapor,
            },
        }
    }

    /// Corrects one file with an already built engine.
    pub fn process_file(
        engine: &CorrectionEngine<'_>,
        path: &Path,
    ) -> Result<(FirePixelSet, CorrectedPowerSeries), BatchError> {
        let pixels = readers::create_fire_reader(path)
            .and_then(|reader| reader.read_fire_pixels())
            .map_err(|source| BatchError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let series = engine
            .correct(&pixels)
            .map_err(|source| BatchError::Correction {
                path: path.to_path_buf(),
                source,
            })?;

        Ok((pixels, series))
    }

    pub fn process(&self) -> Result<Vec<RunSummary>, BatchError> {
        let table_path = self.config.transmittance_table();
        info!(file = %table_path.display(), "Reading transmittance table");
        let table =
            TransmittanceTable::from_file(table_path).map_err(|source| BatchError::Read {
                path: table_path.to_path_buf(),
                source,
            })?;

        let field = self.read_field()?;

        let engine = CorrectionEngine::new(
            &table,
            self.config.correction_options(),
            field.as_ref(),
        )
        .map_err(BatchError::Engine)?;

        let mut summaries = Vec::with_capacity(self.fire_files.len());
        for path in &self.fire_files {
            info!(file = %path.display(), "Correcting fire radiative power");
            let (pixels, series) = Self::process_file(&engine, path)?;

            let mut summary = RunSummary::new(path, &pixels, &series, self.water_vapor_mode());
            if series.missing_count() > 0 {
                warn!(
                    file = %path.display(),
                    missing = series.missing_count(),
                    "Some fire pixels could not be corrected"
                );
            }

            if let Some(directory) = self.config.output_directory() {
                let written = output::write_outputs(directory, &pixels, &series, &mut summary)?;
                info!(file = %written.display(), "Saved corrected fire radiative power");
            }

            summaries.push(summary);
        }

        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldSource, OutOfRangePolicy};
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;
    use tiff::encoder::{TiffEncoder, colortype};
    use tiff::tags::Tag;

    fn write(path: &Path, contents: &str) {
        let mut file = File::create(path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    // Rows 0..85 with transmittance 0.5 at 10 mm and 0.8 at 40 mm
    fn write_lut(dir: &Path) -> PathBuf {
        let mut text = String::from("10,40\n");
        for _ in 0..85 {
            text.push_str("0.5,0.8\n");
        }
        let path = dir.join("LUT_VNP.csv");
        write(&path, &text);
        path
    }

    fn write_field(path: &Path) {
        // 10 mm in the west column, 40 mm in the east column
        let data: Vec<f32> = vec![10.0, 40.0, 10.0, 40.0];
        let mut file = File::create(path).unwrap();
        let mut encoder = TiffEncoder::new(&mut file).unwrap();
        let mut image = encoder.new_image::<colortype::Gray32Float>(2, 2).unwrap();
        image
            .encoder()
            .write_tag(Tag::ModelPixelScaleTag, &[1.0f64, 1.0, 0.0][..])
            .unwrap();
        image
            .encoder()
            .write_tag(Tag::ModelTiepointTag, &[0.0f64, 0.0, 0.0, 100.0, 2.0, 0.0][..])
            .unwrap();
        image.write_data(&data).unwrap();
    }

    #[test]
    fn test_find_fire_files_by_pattern() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("2014").join("365");
        fs::create_dir_all(&nested).unwrap();
        write(&nested.join("VNP47IMG.A2014365.2354.002.csv"), "lat,lon,frp,vza\n");
        write(&dir.path().join("VNP47IMG.A2014365.2348.002.csv"), "lat,lon,frp,vza\n");
        write(&dir.path().join("notes.txt"), "");

        let files = BatchRunner::find_fire_files(&FireFiles::Search {
            directory: dir.path().to_path_buf(),
            pattern: "VNP47IMG.*.csv".to_string(),
        })
        .unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().unwrap() == "csv"));
    }

    #[test]
    fn test_no_matching_files() {
        let dir = tempdir().unwrap();
        let config = Config::new(
            FireFiles::Search {
                directory: dir.path().to_path_buf(),
                pattern: "VNP47IMG.*.nc".to_string(),
            },
            dir.path().join("LUT_VNP.csv"),
        );
        assert!(matches!(
            BatchRunner::new(config),
            Err(BatchError::NoFireFiles(_))
        ));
    }

    #[test]
    fn test_process_constant_water_vapor() {
        let dir = tempdir().unwrap();
        let lut = write_lut(dir.path());
        let fires = dir.path().join("VNP47IMG.A2014365.2354.002.csv");
        write(&fires, "lat,lon,frp,vza\n1.5,100.5,10.0,0.4\n1.5,101.5,4.0,84.2\n");

        let out_dir = dir.path().join("out");
        let config =
            Config::new(FireFiles::Path(fires), lut).with_output_directory(&out_dir);
        let summaries = BatchRunner::new(config).unwrap().process().unwrap();

        // 30 mm is nearest to the 40 mm column
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].pixels, 2);
        assert_eq!(summaries[0].corrected.total, 10.0 / 0.8 + 4.0 / 0.8);
        assert!(out_dir.join("VNP47IMG.A2014365.2354.002_AC.csv").exists());
        assert!(out_dir.join("VNP47IMG.A2014365.2354.002_AC.json").exists());
    }

    #[test]
    fn test_process_with_field() {
        let dir = tempdir().unwrap();
        let lut = write_lut(dir.path());
        let field = dir.path().join("tqv.tif");
        write_field(&field);
        let fires = dir.path().join("fires.csv");
        write(&fires, "lat,lon,frp,vza\n1.5,100.5,10.0,0.4\n1.5,101.5,4.0,84.2\n");

        let config = Config::new(FireFiles::Path(fires), lut)
            .with_atmospheric_field(FieldSource::new(&field));
        let summaries = BatchRunner::new(config).unwrap().process().unwrap();

        assert_eq!(summaries[0].corrected.total, 10.0 / 0.5 + 4.0 / 0.8);
        assert_eq!(
            summaries[0].water_vapor,
            WaterVaporMode::Grid {
                source: field,
                variable: "TQV".to_string(),
                time_index: 0
            }
        );
    }

    #[test]
    fn test_process_aborts_outside_field() {
        let dir = tempdir().unwrap();
        let lut = write_lut(dir.path());
        let field = dir.path().join("tqv.tif");
        write_field(&field);
        let fires = dir.path().join("fires.csv");
        write(&fires, "lat,lon,frp,vza\n1.5,100.5,10.0,0.4\n5.0,100.5,4.0,10.0\n");

        let config = Config::new(FireFiles::Path(fires.clone()), &lut)
            .with_atmospheric_field(FieldSource::new(&field));
        let err = BatchRunner::new(config).unwrap().process().unwrap_err();
        assert!(matches!(
            err,
            BatchError::Correction {
                source: CorrectionError::Range { pixel: 1, .. },
                ..
            }
        ));

        let config = Config::new(FireFiles::Path(fires), &lut)
            .with_atmospheric_field(FieldSource::new(&field))
            .with_out_of_range(OutOfRangePolicy::Missing);
        let summaries = BatchRunner::new(config).unwrap().process().unwrap();
        assert_eq!(summaries[0].corrected.missing, 1);
        assert_eq!(summaries[0].corrected.total, 20.0);
    }

    #[test]
    fn test_process_rejects_time_index() {
        let dir = tempdir().unwrap();
        let lut = write_lut(dir.path());
        let field = dir.path().join("tqv.tif");
        write_field(&field);
        let fires = dir.path().join("fires.csv");
        write(&fires, "lat,lon,frp,vza\n1.5,100.5,10.0,0.4\n");

        let mut source = FieldSource::new(&field);
        source.time_index = 2;
        let config = Config::new(FireFiles::Path(fires), lut).with_atmospheric_field(source);

        assert!(matches!(
            BatchRunner::new(config).unwrap().process(),
            Err(BatchError::Engine(CorrectionError::TimeIndexOutOfRange {
                index: 2,
                count: 1
            }))
        ));
    }

    #[test]
    fn test_process_missing_table() {
        let dir = tempdir().unwrap();
        let fires = dir.path().join("fires.csv");
        write(&fires, "lat,lon,frp,vza\n");

        let config = Config::new(FireFiles::Path(fires), dir.path().join("missing.csv"));
        assert!(matches!(
            BatchRunner::new(config).unwrap().process(),
            Err(BatchError::Read { .. })
        ));
    }
}
