//! Tunables for the estimators.
//!
//! Every struct implements `Default` with the literature values and is
//! `#[serde(default)]`, so a host can load a partial JSON/TOML document and
//! only override what it cares about.

use serde::{Deserialize, Serialize};

use crate::pairwise::distance::Metric;

/// Kennel et al. (1992) Test I threshold.
pub const DEFAULT_RTOL: f64 = 10.0;
/// Kennel et al. (1992) Test II threshold.
pub const DEFAULT_ATOL: f64 = 2.0;
/// Temporal exclusion window for the FNN neighbor search.
pub const DEFAULT_FNN_WINDOW: usize = 10;
/// Upper end of the default FNN dimension sweep.
pub const DEFAULT_DIMENSION_MAX: usize = 20;
/// A dimension is accepted once its f3 is within this factor of the smallest nonzero f3.
pub const DEFAULT_SELECTION_RATIO: f64 = 1.85;
/// Cap on the default autocorrelation lag scan.
pub const DEFAULT_DELAY_CAP: usize = 1000;
/// Number of offsets tracked by the Rosenstein divergence curve.
pub const DEFAULT_TRAJECTORY_LEN: usize = 20;

/// Autocorrelation delay search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    /// Number of lags scanned. `None` means `min(N / 4, 1000)`.
    pub delay_max: Option<usize>,
}

impl DelayConfig {
    pub fn resolve_delay_max(&self, n: usize) -> usize {
        self.delay_max
            .unwrap_or_else(|| (n / 4).min(DEFAULT_DELAY_CAP))
            .min(n)
    }
}

/// False nearest neighbor sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FnnConfig {
    /// Largest dimension scanned. `None` derives it from the signal length.
    pub dimension_max: Option<usize>,
    pub rtol: f64,
    pub atol: f64,
    /// Neighbors closer in time than this are ignored.
    pub window: usize,
    /// Candidates fetched per point. `None` means `2 * window + 3`.
    pub maxnum: Option<usize>,
    pub metric: Metric,
    pub selection_ratio: f64,
}

impl Default for FnnConfig {
    fn default() -> Self {
        Self {
            dimension_max: None,
            rtol: DEFAULT_RTOL,
            atol: DEFAULT_ATOL,
            window: DEFAULT_FNN_WINDOW,
            maxnum: None,
            metric: Metric::Chebyshev,
            selection_ratio: DEFAULT_SELECTION_RATIO,
        }
    }
}

impl FnnConfig {
    pub fn resolve_maxnum(&self) -> usize {
        self.maxnum
            .unwrap_or_else(|| self.window.saturating_mul(2).saturating_add(3))
    }

    /// Smallest dimension in `1..20` whose span `(d - 1) * delay` exhausts the
    /// signal, else 20.
    pub fn resolve_dimension_max(&self, n: usize, delay: usize) -> usize {
        self.dimension_max.unwrap_or_else(|| {
            (1..DEFAULT_DIMENSION_MAX)
                .find(|&d| (d - 1).checked_mul(delay).map_or(true, |span| span >= n))
                .unwrap_or(DEFAULT_DIMENSION_MAX)
        })
    }
}

/// How the Rosenstein estimator picks its temporal exclusion window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TolerancePolicy {
    /// Mean period of the signal, from its power-weighted mean frequency.
    #[default]
    MeanPeriod,
    /// Fixed number of samples.
    Fixed(usize),
}

/// Largest Lyapunov exponent estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LyapunovConfig {
    /// Reconstruction delay. `None` runs the autocorrelation search.
    pub delay: Option<usize>,
    /// Embedding dimension. `None` runs the FNN sweep.
    pub dimension: Option<usize>,
    pub trajectory_len: usize,
    pub tolerance: TolerancePolicy,
    pub delay_search: DelayConfig,
    pub fnn: FnnConfig,
}

impl Default for LyapunovConfig {
    fn default() -> Self {
        Self {
            delay: None,
            dimension: None,
            trajectory_len: DEFAULT_TRAJECTORY_LEN,
            tolerance: TolerancePolicy::default(),
            delay_search: DelayConfig::default(),
            fnn: FnnConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delay_max_is_quarter_length_capped() {
        let cfg = DelayConfig::default();
        assert_eq!(cfg.resolve_delay_max(400), 100);
        assert_eq!(cfg.resolve_delay_max(10_000), 1000);
        assert_eq!(cfg.resolve_delay_max(3), 0);
    }

    #[test]
    fn test_explicit_delay_max_clamped_to_length() {
        let cfg = DelayConfig {
            delay_max: Some(500),
        };
        assert_eq!(cfg.resolve_delay_max(200), 200);
    }

    #[test]
    fn test_default_maxnum_follows_window() {
        let cfg = FnnConfig {
            window: 4,
            ..FnnConfig::default()
        };
        assert_eq!(cfg.resolve_maxnum(), 11);
        assert_eq!(FnnConfig::default().resolve_maxnum(), 23);
        let wide = FnnConfig {
            window: usize::MAX,
            ..FnnConfig::default()
        };
        assert_eq!(wide.resolve_maxnum(), usize::MAX);
    }

    #[test]
    fn test_default_dimension_max() {
        let cfg = FnnConfig::default();
        assert_eq!(cfg.resolve_dimension_max(2000, 1), 20);
        // (d - 1) * 10 >= 35 first holds at d = 5
        assert_eq!(cfg.resolve_dimension_max(35, 10), 5);
        assert_eq!(cfg.resolve_dimension_max(100, usize::MAX), 2);
    }

    #[test]
    fn test_partial_config_loads_with_defaults() {
        let cfg: LyapunovConfig =
            serde_json::from_str(r#"{"trajectory_len": 12, "tolerance": {"fixed": 7}, "fnn": {"rtol": 15.0}}"#)
                .unwrap();
        assert_eq!(cfg.trajectory_len, 12);
        assert_eq!(cfg.tolerance, TolerancePolicy::Fixed(7));
        assert_eq!(cfg.fnn.rtol, 15.0);
        assert_eq!(cfg.fnn.atol, DEFAULT_ATOL);
        assert_eq!(cfg.fnn.metric, Metric::Chebyshev);
        assert!(cfg.delay.is_none());
    }
}
