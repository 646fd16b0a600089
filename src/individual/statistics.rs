use crate::error::{DynamicsError, Result};

/// Rejects empty signals and signals carrying NaN or infinite samples.
pub fn ensure_finite(signal: &[f64]) -> Result<()> {
    if signal.is_empty() {
        return Err(DynamicsError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    if let Some(pos) = signal.iter().position(|v| !v.is_finite()) {
        return Err(DynamicsError::invalid(format!(
            "signal contains a non-finite sample at index {pos}"
        )));
    }
    Ok(())
}

/// Arithmetic mean.
pub fn mean(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return f64::NAN;
    }
    signal.iter().sum::<f64>() / signal.len() as f64
}

/// Population standard deviation (ddof = 0).
pub fn std(signal: &[f64]) -> f64 {
    let n = signal.len();
    if n == 0 {
        return f64::NAN;
    }
    let mean_val = mean(signal);
    let var = signal.iter().map(|x| (x - mean_val).powi(2)).sum::<f64>() / n as f64;
    var.sqrt()
}

/// Ordinary least squares line through `(x, y)`.
/// Returns `(slope, intercept)`, or `None` with fewer than two points or when
/// every `x` coincides.
pub fn linear_fit(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let n_pts = n as f64;
    let mean_x = x[..n].iter().sum::<f64>() / n_pts;
    let mean_y = y[..n].iter().sum::<f64>() / n_pts;

    let (sxy, sxx) = x[..n]
        .iter()
        .zip(y[..n].iter())
        .fold((0.0, 0.0), |(sxy, sxx), (xi, yi)| {
            let dx = xi - mean_x;
            (sxy + dx * (yi - mean_y), sxx + dx * dx)
        });

    if sxx <= 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    Some((slope, mean_y - slope * mean_x))
}
