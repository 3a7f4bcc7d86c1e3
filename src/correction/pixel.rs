/// Everything resolved while correcting one fire pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelCorrection {
    pub water_vapor: f64,         // mm
    pub water_vapor_index: usize, // table column
    pub zenith_row: usize,        // table row
    pub transmittance: f64,
    pub corrected_power: f64, // MW
}
