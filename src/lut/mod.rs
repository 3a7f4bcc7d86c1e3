pub mod transmittance;

pub use transmittance::{TableCell, TransmittanceTable};
