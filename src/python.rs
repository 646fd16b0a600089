//! Python bindings for the host application.

use numpy::{PyArray1, PyArray2, PyReadonlyArray1, ToPyArray};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::{DelayConfig, FnnConfig, LyapunovConfig, TolerancePolicy};
use crate::error::DynamicsError;
use crate::{dynamical, embedding};

impl From<DynamicsError> for PyErr {
    fn from(err: DynamicsError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

/// Time-delay embedding.
/// Returns (n_points, dimension) array.
#[pyfunction]
#[pyo3(signature = (signal, dimension=3, delay=1))]
fn time_delay_embedding<'py>(
    py: Python<'py>,
    signal: PyReadonlyArray1<f64>,
    dimension: usize,
    delay: usize,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let y = signal.as_slice()?;
    let embedded = embedding::time_delay_embedding(y, dimension, delay)?;
    Ok(embedded.to_pyarray(py))
}

/// First lag where the autocorrelation falls below (1 - 1/e) of its peak.
#[pyfunction]
#[pyo3(signature = (signal, delay_max=None))]
fn optimal_delay(signal: PyReadonlyArray1<f64>, delay_max: Option<usize>) -> PyResult<usize> {
    let y = signal.as_slice()?;
    Ok(embedding::optimal_delay(y, &DelayConfig { delay_max })?)
}

/// False nearest neighbor sweep.
/// Returns (dimension, dimensions, f1, f2, f3).
#[pyfunction]
#[pyo3(signature = (signal, delay=1, dimension_max=None, rtol=10.0, atol=2.0, window=10, maxnum=None))]
#[allow(clippy::too_many_arguments, clippy::type_complexity)]
fn optimal_dimension<'py>(
    py: Python<'py>,
    signal: PyReadonlyArray1<f64>,
    delay: usize,
    dimension_max: Option<usize>,
    rtol: f64,
    atol: f64,
    window: usize,
    maxnum: Option<usize>,
) -> PyResult<(
    usize,
    Vec<usize>,
    Bound<'py, PyArray1<f64>>,
    Bound<'py, PyArray1<f64>>,
    Bound<'py, PyArray1<f64>>,
)> {
    let y = signal.as_slice()?;
    let config = FnnConfig {
        dimension_max,
        rtol,
        atol,
        window,
        maxnum,
        ..FnnConfig::default()
    };
    let diag = embedding::optimal_dimension(y, delay, &config)?;
    Ok((
        diag.dimension,
        diag.dimensions,
        PyArray1::from_vec(py, diag.f1),
        PyArray1::from_vec(py, diag.f2),
        PyArray1::from_vec(py, diag.f3),
    ))
}

/// Rosenstein's method for largest Lyapunov exponent.
/// Returns (max_lyapunov, divergence_curve, delay, dimension, min_tsep).
/// Undefined divergence offsets are NaN.
#[pyfunction]
#[pyo3(signature = (signal, fs=1.0, delay=None, dimension=None, trajectory_len=20, min_tsep=None))]
fn lyapunov_rosenstein<'py>(
    py: Python<'py>,
    signal: PyReadonlyArray1<f64>,
    fs: f64,
    delay: Option<usize>,
    dimension: Option<usize>,
    trajectory_len: usize,
    min_tsep: Option<usize>,
) -> PyResult<(f64, Bound<'py, PyArray1<f64>>, usize, usize, usize)> {
    let y = signal.as_slice()?;
    let config = LyapunovConfig {
        delay,
        dimension,
        trajectory_len,
        tolerance: min_tsep.map_or(TolerancePolicy::MeanPeriod, TolerancePolicy::Fixed),
        ..LyapunovConfig::default()
    };
    let result = dynamical::lyapunov_rosenstein(y, fs, &config)?;
    let curve: Vec<f64> = result
        .divergence
        .iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();
    Ok((
        result.exponent,
        PyArray1::from_vec(py, curve),
        result.delay,
        result.dimension,
        result.tolerance,
    ))
}

#[pymodule]
fn manifold_invariants(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // embedding
    m.add_function(wrap_pyfunction!(time_delay_embedding, m)?)?;
    m.add_function(wrap_pyfunction!(optimal_delay, m)?)?;
    m.add_function(wrap_pyfunction!(optimal_dimension, m)?)?;

    // dynamical
    m.add_function(wrap_pyfunction!(lyapunov_rosenstein, m)?)?;

    Ok(())
}
