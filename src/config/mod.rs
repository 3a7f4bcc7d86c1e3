use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::atmosphere::DEFAULT_PRECIPITABLE_WATER_MM;
use crate::correction::CorrectionOptions;

pub mod error;
pub use error::ConfigError;

pub mod policy;
pub use policy::OutOfRangePolicy;

/// Where the fire-pixel granules come from: one file, or every file under
/// `directory` whose name matches the glob `pattern`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum FireFiles {
    Path(PathBuf),
    Search { directory: PathBuf, pattern: String },
}

/// Gridded precipitable water source, GEOS-FP naming by default.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FieldSource {
    pub path: PathBuf,
    #[serde(default = "FieldSource::default_variable")]
    pub variable: String,
    #[serde(default = "FieldSource::default_latitude")]
    pub latitude: String,
    #[serde(default = "FieldSource::default_longitude")]
    pub longitude: String,
    #[serde(default)]
    pub time_index: usize,
}

impl FieldSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            variable: Self::default_variable(),
            latitude: Self::default_latitude(),
            longitude: Self::default_longitude(),
            time_index: 0,
        }
    }

    fn default_variable() -> String {
        "TQV".to_string()
    }

    fn default_latitude() -> String {
        "lat".to_string()
    }

    fn default_longitude() -> String {
        "lon".to_string()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    fire_files: FireFiles,
    transmittance_table: PathBuf,
    use_atmospheric_field: bool,
    atmospheric_field: Option<FieldSource>,
    default_water_vapor: f64,
    out_of_range: OutOfRangePolicy,
    parallel: bool,
    output_directory: Option<PathBuf>,
}

// Deserializes through a helper so that a field-mode request without a
// field source, or an unusable default water vapor, is rejected at load time.
impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ConfigHelper {
            fire_files: FireFiles,
            transmittance_table: PathBuf,
            #[serde(default)]
            use_atmospheric_field: bool,
            atmospheric_field: Option<FieldSource>,
            default_water_vapor: Option<f64>,
            #[serde(default)]
            out_of_range: OutOfRangePolicy,
            #[serde(default)]
            parallel: bool,
            output_directory: Option<PathBuf>,
        }

        let helper = ConfigHelper::deserialize(deserializer)?;

        let config = Config {
            fire_files: helper.fire_files,
            transmittance_table: helper.transmittance_table,
            use_atmospheric_field: helper.use_atmospheric_field,
            atmospheric_field: helper.atmospheric_field,
            default_water_vapor: helper
                .default_water_vapor
                .unwrap_or(DEFAULT_PRECIPITABLE_WATER_MM),
            out_of_range: helper.out_of_range,
            parallel: helper.parallel,
            output_directory: helper.output_directory,
        };

        config.validate().map_err(D::Error::custom)?;

        Ok(config)
    }
}

impl Config {
    pub fn new<P: Into<PathBuf>>(fire_files: FireFiles, transmittance_table: P) -> Self {
        Self {
            fire_files,
            transmittance_table: transmittance_table.into(),
            use_atmospheric_field: false,
            atmospheric_field: None,
            default_water_vapor: DEFAULT_PRECIPITABLE_WATER_MM,
            out_of_range: OutOfRangePolicy::default(),
            parallel: false,
            output_directory: None,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let config: Config = serde_json::from_reader(reader).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Turns on grid mode with the given field.
    pub fn with_atmospheric_field(mut self, source: FieldSource) -> Self {
        self.use_atmospheric_field = true;
        self.atmospheric_field = Some(source);
        self
    }

    pub fn with_out_of_range(mut self, policy: OutOfRangePolicy) -> Self {
        self.out_of_range = policy;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_output_directory<P: Into<PathBuf>>(mut self, directory: P) -> Self {
        self.output_directory = Some(directory.into());
        self
    }

    pub fn with_default_water_vapor(mut self, water_vapor: f64) -> Self {
        self.default_water_vapor = water_vapor;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.use_atmospheric_field && self.atmospheric_field.is_none() {
            return Err(ConfigError::MissingFieldSource);
        }

        if !self.default_water_vapor.is_finite() || self.default_water_vapor < 0.0 {
            return Err(ConfigError::DefaultWaterVapor(self.default_water_vapor));
        }

        if let FireFiles::Search { pattern, .. } = &self.fire_files {
            glob::Pattern::new(pattern).map_err(|source| ConfigError::Pattern {
                pattern: pattern.clone(),
                source,
            })?;
        }

        Ok(())
    }

    pub fn fire_files(&self) -> &FireFiles {
        &self.fire_files
    }

    pub fn transmittance_table(&self) -> &Path {
        &self.transmittance_table
    }

    pub fn use_atmospheric_field(&self) -> bool {
        self.use_atmospheric_field
    }

    /// The field source, only when grid mode is on.
    pub fn atmospheric_field(&self) -> Option<&FieldSource> {
        if self.use_atmospheric_field {
            self.atmospheric_field.as_ref()
        } else {
            None
        }
    }

    pub fn output_directory(&self) -> Option<&Path> {
        self.output_directory.as_deref()
    }

    pub fn correction_options(&self) -> CorrectionOptions {
        CorrectionOptions {
            use_atmospheric_field: self.use_atmospheric_field,
            time_index: self
                .atmospheric_field
                .as_ref()
                .map_or(0, |source| source.time_index),
            default_water_vapor: self.default_water_vapor,
            out_of_range: self.out_of_range,
            parallel: self.parallel,
        }
    }
}
