//! # manifold-invariants
//!
//! Nonlinear-dynamics characterization of scalar signals such as single EEG
//! channels of one epoch. From a one-dimensional sample sequence the crate
//! reconstructs a pseudo-state-space trajectory and estimates three classical
//! invariants:
//!
//! - reconstruction delay, from the decay of the autocorrelation
//!   ([`optimal_delay`])
//! - embedding dimension, by false nearest neighbors ([`optimal_dimension`])
//! - largest Lyapunov exponent, by Rosenstein's method
//!   ([`lyapunov_rosenstein`])
//!
//! Every operation is a pure function over a borrowed slice and returns a
//! typed [`DynamicsError`] on failure, so independent channel/epoch
//! combinations can be processed in parallel by the caller.
//!
//! ```rust,no_run
//! use manifold_invariants::{lyapunov_rosenstein, LyapunovConfig};
//!
//! let mut x = 0.1;
//! let signal: Vec<f64> = (0..2000)
//!     .map(|_| {
//!         x = 4.0 * x * (1.0 - x);
//!         x
//!     })
//!     .collect();
//! let result = lyapunov_rosenstein(&signal, 1.0, &LyapunovConfig::default()).unwrap();
//! println!("lambda = {:.3} (delay {}, dimension {})", result.exponent, result.delay, result.dimension);
//! ```
//!
//! ## References
//!
//! - Takens, "Detecting strange attractors in turbulence" (1981)
//! - Kennel, Brown & Abarbanel, Phys. Rev. A 45, 3403 (1992)
//! - Rosenstein, Collins & De Luca, Physica D 65, 117 (1993)

pub mod config;
pub mod dynamical;
pub mod embedding;
pub mod error;
pub mod individual;
pub mod pairwise;

#[cfg(feature = "python")]
mod python;

pub use config::{DelayConfig, FnnConfig, LyapunovConfig, TolerancePolicy};
pub use dynamical::{lyapunov_min_length, lyapunov_rosenstein, LyapunovResult};
pub use embedding::{
    false_nearest_neighbors, optimal_delay, optimal_dimension, time_delay_embedding,
    FnnDiagnostics, FnnFractions,
};
pub use error::{DynamicsError, Result};
pub use pairwise::{nearest_neighbors, DistanceMatrix, Metric, Neighbors};
