//! Minimal embedding dimension via false nearest neighbors (Kennel et al., 1992).
//!
//! A neighbor found in `d` dimensions is false when adding the `(d + 1)`-th
//! coordinate pulls it far away. Two tests are applied per point:
//!
//! - Test I: `|extra coordinate difference| / d-dimensional distance > rtol`
//! - Test II: `(d + 1)-dimensional distance / std(signal) > atol`
//!
//! f3 is their union. The sweep picks the smallest dimension whose f3 lies
//! within `selection_ratio` of the smallest nonzero f3.

use serde::{Deserialize, Serialize};

use crate::config::FnnConfig;
use crate::embedding::delay::time_delay_embedding;
use crate::error::{DynamicsError, Result};
use crate::individual::statistics::{ensure_finite, std};
use crate::pairwise::neighbors::nearest_neighbors;

/// Fractions of false neighbors at one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FnnFractions {
    /// Test I.
    pub f1: f64,
    /// Test II.
    pub f2: f64,
    /// Union of both tests.
    pub f3: f64,
}

/// Outcome of a dimension sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FnnDiagnostics {
    /// Scanned dimensions, ascending.
    pub dimensions: Vec<usize>,
    pub f1: Vec<f64>,
    pub f2: Vec<f64>,
    pub f3: Vec<f64>,
    /// Selected embedding dimension.
    pub dimension: usize,
}

fn check_thresholds(config: &FnnConfig) -> Result<()> {
    for (name, value) in [
        ("rtol", config.rtol),
        ("atol", config.atol),
        ("selection_ratio", config.selection_ratio),
    ] {
        if !(value.is_finite() && value > 0.0) {
            return Err(DynamicsError::invalid(format!(
                "{name} must be positive and finite, got {value}"
            )));
        }
    }
    Ok(())
}

/// False neighbor fractions for a single embedding dimension.
pub fn false_nearest_neighbors(
    signal: &[f64],
    dimension: usize,
    delay: usize,
    config: &FnnConfig,
) -> Result<FnnFractions> {
    ensure_finite(signal)?;
    check_thresholds(config)?;
    let n = signal.len();
    if delay == 0 {
        return Err(DynamicsError::invalid("delay must be at least 1"));
    }
    if delay >= n {
        return Err(DynamicsError::invalid(format!(
            "delay {delay} is not shorter than the signal ({n} samples)"
        )));
    }

    // Both embeddings hold n - dimension * delay points, row i describing the same instant.
    let y1 = time_delay_embedding(&signal[..n - delay], dimension, delay)?;
    let extended = dimension
        .checked_add(1)
        .ok_or_else(|| DynamicsError::invalid("dimension too large"))?;
    let y2 = time_delay_embedding(signal, extended, delay)?;

    let sd = std(signal);
    if !(sd > 0.0) {
        return Err(DynamicsError::degenerate(
            "signal has zero standard deviation",
        ));
    }

    let nn = nearest_neighbors(y1.view(), config.metric, config.window, Some(config.resolve_maxnum()))?;

    let (mut false1, mut false2, mut false3, mut valid) = (0usize, 0usize, 0usize, 0usize);
    for (i, (&j, &dist)) in nn.index.iter().zip(nn.distance.iter()).enumerate() {
        // A zero distance leaves the Test I ratio undefined; such points are not counted.
        if !(dist > 0.0) {
            continue;
        }
        valid += 1;

        let extra = (y2[[i, dimension]] - y2[[j, dimension]]).abs();
        let test1 = extra / dist > config.rtol;
        let test2 = config.metric.distance(y2.row(i), y2.row(j)) / sd > config.atol;

        false1 += test1 as usize;
        false2 += test2 as usize;
        false3 += (test1 || test2) as usize;
    }

    let frac = |count: usize| {
        if valid == 0 {
            f64::NAN
        } else {
            count as f64 / valid as f64
        }
    };
    Ok(FnnFractions {
        f1: frac(false1),
        f2: frac(false2),
        f3: frac(false3),
    })
}

/// Sweeps dimensions `1..=dimension_max` and selects the embedding dimension.
///
/// The sweep stops early at the last dimension whose embedding still holds
/// more than `maxnum` points.
pub fn optimal_dimension(signal: &[f64], delay: usize, config: &FnnConfig) -> Result<FnnDiagnostics> {
    ensure_finite(signal)?;
    check_thresholds(config)?;
    if delay == 0 {
        return Err(DynamicsError::invalid("delay must be at least 1"));
    }

    let n = signal.len();
    let maxnum = config.resolve_maxnum();
    let dimension_max = config.resolve_dimension_max(n, delay);
    if dimension_max == 0 {
        return Err(DynamicsError::invalid("dimension_max must be at least 1"));
    }

    let fits = |d: usize| {
        d.checked_mul(delay)
            .and_then(|span| span.checked_add(maxnum))
            .is_some_and(|needed| n > needed)
    };
    let dimensions: Vec<usize> = (1..=dimension_max).take_while(|&d| fits(d)).collect();
    if dimensions.is_empty() {
        return Err(DynamicsError::InsufficientData {
            required: delay.saturating_add(maxnum).saturating_add(1),
            actual: n,
        });
    }
    if dimensions.len() < dimension_max {
        log::warn!(
            "FNN sweep truncated to dimensions 1..={} of 1..={dimension_max}: embedding too short for maxnum {maxnum}",
            dimensions.len()
        );
    }

    let mut f1 = Vec::with_capacity(dimensions.len());
    let mut f2 = Vec::with_capacity(dimensions.len());
    let mut f3 = Vec::with_capacity(dimensions.len());
    for &d in &dimensions {
        let fr = false_nearest_neighbors(signal, d, delay, config)?;
        log::debug!("FNN d={d}: f1={:.4} f2={:.4} f3={:.4}", fr.f1, fr.f2, fr.f3);
        f1.push(fr.f1);
        f2.push(fr.f2);
        f3.push(fr.f3);
    }

    let pos = select_dimension(&f3, config.selection_ratio).ok_or_else(|| {
        DynamicsError::NoConvergence(format!(
            "no dimension in 1..={} satisfies the false neighbor criterion",
            dimensions.len()
        ))
    })?;
    let dimension = dimensions[pos];
    log::debug!("optimal dimension {dimension} (delay {delay})");

    Ok(FnnDiagnostics {
        dimensions,
        f1,
        f2,
        f3,
        dimension,
    })
}

/// Index of the first f3 not exceeding `ratio` times the smallest nonzero f3.
/// When every finite f3 is zero the first finite entry wins.
fn select_dimension(f3: &[f64], ratio: f64) -> Option<usize> {
    let min_nonzero = f3
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v > 0.0)
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))));

    match min_nonzero {
        Some(min) => f3.iter().position(|&v| v.is_finite() && v <= ratio * min),
        None => f3.iter().position(|v| v.is_finite()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn henon_x(n: usize) -> Vec<f64> {
        let (mut x, mut y) = (0.1, 0.1);
        let mut out = Vec::with_capacity(n + 100);
        for _ in 0..n + 100 {
            let xn = 1.0 - 1.4 * x * x + y;
            y = 0.3 * x;
            x = xn;
            out.push(x);
        }
        out.split_off(100)
    }

    #[test]
    fn test_select_dimension_ratio() {
        let f3 = [0.9, 0.4, 0.05, 0.03, 0.04];
        // 1.85 * 0.03 = 0.0555 -> 0.05 qualifies first
        assert_eq!(select_dimension(&f3, 1.85), Some(2));
        assert_eq!(select_dimension(&f3, 1.0), Some(3));
    }

    #[test]
    fn test_select_dimension_all_zero_and_all_undefined() {
        assert_eq!(select_dimension(&[0.0, 0.0], 1.85), Some(0));
        assert_eq!(select_dimension(&[f64::NAN, 0.0], 1.85), Some(1));
        assert_eq!(select_dimension(&[f64::NAN, f64::NAN], 1.85), None);
    }

    #[test]
    fn test_henon_collapses_by_dimension_two() {
        let x = henon_x(1500);
        let cfg = FnnConfig {
            dimension_max: Some(4),
            ..FnnConfig::default()
        };
        let diag = optimal_dimension(&x, 1, &cfg).unwrap();
        assert_eq!(diag.dimensions, vec![1, 2, 3, 4]);
        assert!(diag.f3[0] > 0.2, "f3(1) = {}", diag.f3[0]);
        for &f in &diag.f3[1..] {
            assert!(f < 0.05, "f3 = {:?}", diag.f3);
        }
        assert!(diag.dimension <= 2);
        for ((a, b), c) in diag.f1.iter().zip(&diag.f2).zip(&diag.f3) {
            assert!(c >= a && c >= b);
        }
    }

    #[test]
    fn test_sweep_truncates_to_usable_dimensions() {
        let x = henon_x(60);
        // maxnum 23: n - d * 10 > 23 holds for d = 1, 2, 3
        let diag = optimal_dimension(&x, 10, &FnnConfig::default()).unwrap();
        assert_eq!(diag.dimensions, vec![1, 2, 3]);
    }

    #[test]
    fn test_sweep_needs_room_for_candidates() {
        let x = henon_x(30);
        let err = optimal_dimension(&x, 10, &FnnConfig::default()).unwrap_err();
        assert_eq!(
            err,
            DynamicsError::InsufficientData {
                required: 34,
                actual: 30
            }
        );
    }

    #[test]
    fn test_invalid_thresholds() {
        let x = henon_x(200);
        let cfg = FnnConfig {
            rtol: 0.0,
            ..FnnConfig::default()
        };
        assert!(matches!(
            false_nearest_neighbors(&x, 2, 1, &cfg),
            Err(DynamicsError::InvalidParameter(_))
        ));
        assert!(matches!(
            optimal_dimension(&x, 0, &FnnConfig::default()),
            Err(DynamicsError::InvalidParameter(_))
        ));
    }
}
