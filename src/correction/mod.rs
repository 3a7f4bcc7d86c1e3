pub mod batch_runner;
pub mod engine;
pub mod pixel;
pub mod series;

pub use batch_runner::{BatchError, BatchRunner};
pub use engine::{CorrectionEngine, CorrectionOptions};
pub use pixel::PixelCorrection;
pub use series::{CorrectedPowerSeries, PixelFailure, SeriesStats};
