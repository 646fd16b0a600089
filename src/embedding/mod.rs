pub mod delay;
pub mod dimension;

pub use delay::{optimal_delay, time_delay_embedding};
pub use dimension::{false_nearest_neighbors, optimal_dimension, FnnDiagnostics, FnnFractions};
