use ndarray::Array2;

use crate::config::DelayConfig;
use crate::error::{DynamicsError, Result};
use crate::individual::spectral::autocorrelation;
use crate::individual::statistics::ensure_finite;

/// Time-delay (Takens) embedding.
/// Returns an `(n_points, dimension)` array with
/// `n_points = n - (dimension - 1) * delay` and row `i` equal to
/// `(y[i], y[i + delay], ..., y[i + (dimension - 1) * delay])`.
pub fn time_delay_embedding(signal: &[f64], dimension: usize, delay: usize) -> Result<Array2<f64>> {
    if dimension == 0 {
        return Err(DynamicsError::invalid("dimension must be at least 1"));
    }
    if delay == 0 {
        return Err(DynamicsError::invalid("delay must be at least 1"));
    }

    let n = signal.len();
    let span = match (dimension - 1).checked_mul(delay) {
        Some(span) if span < n => span,
        _ => {
            return Err(DynamicsError::invalid(format!(
                "embedding span (dimension - 1) * delay with dimension {dimension}, delay {delay} \
                 leaves no points in a signal of length {n}"
            )));
        }
    };

    let n_points = n - span;
    Ok(Array2::from_shape_fn((n_points, dimension), |(i, d)| {
        signal[i + d * delay]
    }))
}

/// Decorrelation time of the signal, used as the default embedding delay.
///
/// Returns the first lag in `0..delay_max` whose normalized autocorrelation
/// drops below `max(acf) * (1 - 1/e)`.
pub fn optimal_delay(signal: &[f64], config: &DelayConfig) -> Result<usize> {
    ensure_finite(signal)?;
    let n = signal.len();
    let delay_max = config.resolve_delay_max(n);
    if delay_max == 0 {
        return match config.delay_max {
            Some(_) => Err(DynamicsError::invalid("delay_max must be at least 1")),
            None => Err(DynamicsError::InsufficientData {
                required: 4,
                actual: n,
            }),
        };
    }

    let acf = autocorrelation(signal)?;
    let scanned = &acf[..delay_max];
    let peak = scanned.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let threshold = peak * (1.0 - (-1.0f64).exp());

    match scanned.iter().position(|&r| r < threshold) {
        Some(lag) => {
            log::debug!("optimal delay {lag} (threshold {threshold:.4}, scanned {delay_max} lags)");
            Ok(lag)
        }
        None => Err(DynamicsError::NoConvergence(format!(
            "autocorrelation stays above {threshold:.4} for all {delay_max} scanned lags"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_embedding() {
        let y = [3.0, 1.0, 4.0, 1.0, 5.0];
        let emb = time_delay_embedding(&y, 1, 1).unwrap();
        assert_eq!(emb.dim(), (5, 1));
        assert_eq!(emb.column(0).to_vec(), y.to_vec());
    }

    #[test]
    fn test_columns_are_shifted_copies() {
        let y: Vec<f64> = (0..50).map(|i| (i as f64 * 0.37).sin()).collect();
        for (dimension, delay) in [(2, 1), (3, 4), (5, 7), (4, 16)] {
            let emb = time_delay_embedding(&y, dimension, delay).unwrap();
            let m = y.len() - (dimension - 1) * delay;
            assert_eq!(emb.dim(), (m, dimension));
            for j in 0..dimension {
                assert_eq!(emb.column(j).to_vec(), y[j * delay..j * delay + m].to_vec());
            }
        }
    }

    #[test]
    fn test_embedding_rejects_bad_parameters() {
        let y = [0.0; 10];
        for (dimension, delay) in [(0, 1), (2, 0), (4, 4), (11, 1)] {
            assert!(matches!(
                time_delay_embedding(&y, dimension, delay),
                Err(DynamicsError::InvalidParameter(_))
            ));
        }
        // (4 - 1) * 3 = 9 < 10 leaves exactly one point
        assert_eq!(time_delay_embedding(&y, 4, 3).unwrap().nrows(), 1);
    }

    #[test]
    fn test_embedding_span_overflow_is_rejected() {
        let y = [0.1, 0.2, 0.3, 0.5];
        for (dimension, delay) in [(3, usize::MAX / 2 + 1), (2, usize::MAX), (usize::MAX, 2)] {
            assert!(matches!(
                time_delay_embedding(&y, dimension, delay),
                Err(DynamicsError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_constant_signal_is_degenerate() {
        for n in [8usize, 100, 1001] {
            let err = optimal_delay(&vec![2.5; n], &DelayConfig::default()).unwrap_err();
            assert!(matches!(err, DynamicsError::NumericalDegeneracy(_)), "n = {n}");
        }
    }

    #[test]
    fn test_offset_does_not_change_delay() {
        let tone: Vec<f64> = (0..2000)
            .map(|i| (2.0 * std::f64::consts::PI * i as f64 / 50.0).sin())
            .collect();
        let shifted: Vec<f64> = tone.iter().map(|v| v + 1e8).collect();
        let expected = optimal_delay(&tone, &DelayConfig::default()).unwrap();
        assert!((6..=12).contains(&expected), "delay {expected}");
        assert_eq!(optimal_delay(&shifted, &DelayConfig::default()).unwrap(), expected);
    }

    #[test]
    fn test_slow_signal_does_not_converge_in_short_scan() {
        let y: Vec<f64> = (0..1000).map(|i| (i as f64 / 1000.0).powi(2)).collect();
        let err = optimal_delay(&y, &DelayConfig { delay_max: Some(5) }).unwrap_err();
        assert!(matches!(err, DynamicsError::NoConvergence(_)));
    }

    #[test]
    fn test_short_signal_needs_four_samples() {
        let err = optimal_delay(&[1.0, 2.0, 0.5], &DelayConfig::default()).unwrap_err();
        assert_eq!(
            err,
            DynamicsError::InsufficientData {
                required: 4,
                actual: 3
            }
        );
    }
}
