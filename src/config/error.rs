use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("use_atmospheric_field is true but no atmospheric_field source is configured")]
    MissingFieldSource,

    #[error("default_water_vapor should be a finite, non-negative value, got {0}")]
    DefaultWaterVapor(f64),

    #[error("invalid fire file pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}
