pub mod spectral;
pub mod statistics;

pub use spectral::{autocorrelation, mean_frequency, power_spectrum};
