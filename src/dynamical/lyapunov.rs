//! Largest Lyapunov exponent by Rosenstein's method (Rosenstein et al., 1993).
//!
//! Every reference point of the reconstructed trajectory is paired with its
//! nearest neighbor outside a temporal exclusion band. The mean log distance
//! of the pairs is followed for `trajectory_len` steps and the exponent is the
//! least squares slope of that divergence curve.

use serde::{Deserialize, Serialize};

use crate::config::{LyapunovConfig, TolerancePolicy};
use crate::embedding::delay::{optimal_delay, time_delay_embedding};
use crate::embedding::dimension::optimal_dimension;
use crate::error::{DynamicsError, Result};
use crate::individual::spectral::mean_frequency;
use crate::individual::statistics::{ensure_finite, linear_fit};
use crate::pairwise::distance::{DistanceMatrix, Metric};

/// Exponent estimate and the parameters it was computed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyapunovResult {
    /// Natural-log units per sample; multiply by `fs` for units per second.
    pub exponent: f64,
    pub delay: usize,
    pub dimension: usize,
    /// Temporal exclusion band used for the neighbor search, in samples.
    pub tolerance: usize,
    /// Mean log divergence per offset `k = 0..trajectory_len`; `None` where no
    /// pair had a nonzero distance.
    pub divergence: Vec<Option<f64>>,
}

/// Shortest signal accepted for the given embedding, trajectory length and tolerance.
/// Saturates at `usize::MAX`, which no signal can reach.
pub fn lyapunov_min_length(
    dimension: usize,
    delay: usize,
    trajectory_len: usize,
    tolerance: usize,
) -> usize {
    dimension
        .saturating_sub(1)
        .saturating_mul(delay)
        .saturating_add(trajectory_len)
        .saturating_add(tolerance.saturating_mul(2))
        .saturating_add(1)
}

/// Mean period of the signal in samples, rounded up.
pub fn mean_period_tolerance(signal: &[f64], fs: f64) -> Result<usize> {
    let mf = mean_frequency(signal, fs)?;
    let period = 1.0 / mf;
    Ok((period * fs).ceil() as usize)
}

fn resolve_tolerance(signal: &[f64], fs: f64, policy: TolerancePolicy) -> Result<usize> {
    match policy {
        TolerancePolicy::MeanPeriod => mean_period_tolerance(signal, fs),
        TolerancePolicy::Fixed(t) => Ok(t),
    }
}

/// Largest Lyapunov exponent of `signal` sampled at `fs` Hz.
///
/// Delay and dimension come from the config when given, otherwise from the
/// autocorrelation search and the FNN sweep respectively.
pub fn lyapunov_rosenstein(signal: &[f64], fs: f64, config: &LyapunovConfig) -> Result<LyapunovResult> {
    ensure_finite(signal)?;
    if !(fs.is_finite() && fs > 0.0) {
        return Err(DynamicsError::invalid(format!(
            "sampling rate must be positive and finite, got {fs}"
        )));
    }
    if config.trajectory_len == 0 {
        return Err(DynamicsError::invalid("trajectory_len must be at least 1"));
    }
    if config.delay == Some(0) {
        return Err(DynamicsError::invalid("delay must be at least 1"));
    }
    if config.dimension == Some(0) {
        return Err(DynamicsError::invalid("dimension must be at least 1"));
    }

    let n = signal.len();
    let traj_len = config.trajectory_len;

    let delay = match config.delay {
        Some(tau) => tau,
        None => optimal_delay(signal, &config.delay_search)?,
    };
    let dimension = match config.dimension {
        Some(d) => d,
        None => optimal_dimension(signal, delay, &config.fnn)?.dimension,
    };
    let tolerance = resolve_tolerance(signal, fs, config.tolerance)?;
    log::debug!("rosenstein: delay={delay} dimension={dimension} tolerance={tolerance} trajectory_len={traj_len}");

    let required = lyapunov_min_length(dimension, delay, traj_len, tolerance);
    if n < required {
        return Err(DynamicsError::InsufficientData {
            required,
            actual: n,
        });
    }

    let orbit = time_delay_embedding(signal, dimension, delay)?;
    let n_points = orbit.nrows();
    let n_ref = n_points - traj_len + 1;

    let mut dists = DistanceMatrix::from_points(orbit.view(), Metric::Euclidean);
    dists.exclude_band(tolerance);

    // Neighbors come from the reference points only, so j + k stays inside the orbit.
    let mut nn_idx = Vec::with_capacity(n_ref);
    for i in 0..n_ref {
        match dists.row_argmin(i, n_ref) {
            Some((j, _)) => nn_idx.push(j),
            None => {
                return Err(DynamicsError::degenerate(format!(
                    "reference point {i} has no neighbor outside the exclusion band of {tolerance} samples"
                )));
            }
        }
    }

    // Zero distances have no logarithm; they are left out of the mean for their offset.
    let divergence: Vec<Option<f64>> = (0..traj_len)
        .map(|k| {
            let (sum, count) = nn_idx
                .iter()
                .enumerate()
                .map(|(i, &j)| dists.get(i + k, j + k))
                .filter(|d| d.is_finite() && *d > 0.0)
                .fold((0.0, 0usize), |(s, c), d| (s + d.ln(), c + 1));
            (count > 0).then(|| sum / count as f64)
        })
        .collect();

    let (time_axis, div_curve): (Vec<f64>, Vec<f64>) = divergence
        .iter()
        .enumerate()
        .filter_map(|(k, v)| v.map(|v| (k as f64, v)))
        .unzip();

    let exponent = match linear_fit(&time_axis, &div_curve) {
        Some((slope, _)) => slope,
        None => {
            return Err(DynamicsError::UndeterminedExponent {
                finite: div_curve.len(),
            });
        }
    };

    Ok(LyapunovResult {
        exponent,
        delay,
        dimension,
        tolerance,
        divergence,
    })
}
