use rustfft::{num_complex::Complex, FftPlanner};

use crate::error::{DynamicsError, Result};
use crate::individual::statistics::{ensure_finite, mean};

fn forward_fft(samples: impl Iterator<Item = f64>, len: usize) -> Vec<Complex<f64>> {
    let mut planner = FftPlanner::<f64>::new();
    let fft_algo = planner.plan_fft_forward(len);

    let mut buffer: Vec<Complex<f64>> = samples.map(|v| Complex::new(v, 0.0)).collect();
    buffer.resize(len, Complex::new(0.0, 0.0));
    fft_algo.process(&mut buffer);
    buffer
}

/// One-sided power spectrum |X_k|^2 for bins `0..=n/2`, unnormalized.
pub fn power_spectrum(signal: &[f64]) -> Vec<f64> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }
    let buffer = forward_fft(signal.iter().copied(), n);
    buffer[..n / 2 + 1].iter().map(|c| c.norm_sqr()).collect()
}

/// Power-weighted mean frequency in Hz, DC bin excluded.
pub fn mean_frequency(signal: &[f64], fs: f64) -> Result<f64> {
    ensure_finite(signal)?;
    if !(fs.is_finite() && fs > 0.0) {
        return Err(DynamicsError::invalid(format!(
            "sampling rate must be positive and finite, got {fs}"
        )));
    }
    let n = signal.len();
    if n < 2 {
        return Err(DynamicsError::InsufficientData {
            required: 2,
            actual: n,
        });
    }

    let power = power_spectrum(signal);
    let (weighted, total) = power
        .iter()
        .enumerate()
        .skip(1)
        .fold((0.0, 0.0), |(w, t), (k, &p)| {
            (w + k as f64 * fs / n as f64 * p, t + p)
        });

    if total <= 0.0 {
        return Err(DynamicsError::degenerate(
            "signal has no power outside the DC bin",
        ));
    }
    Ok(weighted / total)
}

/// Normalized autocorrelation for lags `0..n`, mean removed.
///
/// The signal is zero-padded to at least `2n - 1` points before the FFT so the
/// circular correlation carries no wrap-around terms. Fails with
/// `NumericalDegeneracy` for a constant signal or when the lag-0 energy is
/// not positive. A large offset is not degenerate: the mean is removed first.
pub fn autocorrelation(signal: &[f64]) -> Result<Vec<f64>> {
    ensure_finite(signal)?;
    let n = signal.len();

    // The mean of identical samples can round away from them, so test for equality directly.
    if signal.windows(2).all(|w| w[0] == w[1]) {
        return Err(DynamicsError::degenerate(
            "lag-0 autocorrelation is zero (constant signal)",
        ));
    }
    let mean_val = mean(signal);

    let len = (2 * n - 1).next_power_of_two();
    let mut buffer = forward_fft(signal.iter().map(|x| x - mean_val), len);
    for c in buffer.iter_mut() {
        *c = Complex::new(c.norm_sqr(), 0.0);
    }

    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_inverse(len).process(&mut buffer);

    let lag0 = buffer[0].re;
    if lag0 <= 0.0 {
        return Err(DynamicsError::degenerate(
            "lag-0 autocorrelation is not positive",
        ));
    }
    Ok(buffer[..n].iter().map(|c| c.re / lag0).collect())
}
