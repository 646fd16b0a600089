use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// Point-to-point metric in an embedded trajectory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    Euclidean,
    /// Maximum coordinate difference.
    Chebyshev,
    Cityblock,
}

impl Metric {
    pub fn distance(self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        let diffs = a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs());
        match self {
            Metric::Euclidean => diffs.map(|d| d * d).sum::<f64>().sqrt(),
            Metric::Chebyshev => diffs.fold(0.0f64, f64::max),
            Metric::Cityblock => diffs.sum(),
        }
    }
}

/// Dense pairwise distances over the rows of a trajectory.
///
/// Entries masked by [`DistanceMatrix::exclude_band`] hold `+inf` and never
/// win an arg-min.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    values: Array2<f64>,
}

impl DistanceMatrix {
    pub fn from_points(points: ArrayView2<f64>, metric: Metric) -> Self {
        let m = points.nrows();
        let mut values = Array2::<f64>::zeros((m, m));
        for i in 0..m {
            for j in (i + 1)..m {
                let d = metric.distance(points.row(i), points.row(j));
                values[[i, j]] = d;
                values[[j, i]] = d;
            }
        }
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[[i, j]]
    }

    /// Sets every entry with `|i - j| <= width` to `+inf`, the diagonal included.
    pub fn exclude_band(&mut self, width: usize) {
        let m = self.len();
        let width = width.min(m);
        for i in 0..m {
            let lo = i.saturating_sub(width);
            let hi = (i + width + 1).min(m);
            for j in lo..hi {
                self.values[[i, j]] = f64::INFINITY;
            }
        }
    }

    /// Column of the smallest finite entry among the first `limit` columns of
    /// row `i`. Ties go to the lowest column.
    pub fn row_argmin(&self, i: usize, limit: usize) -> Option<(usize, f64)> {
        let limit = limit.min(self.len());
        self.values
            .row(i)
            .iter()
            .take(limit)
            .enumerate()
            .filter(|(_, d)| d.is_finite())
            .fold(None, |best: Option<(usize, f64)>, (j, &d)| match best {
                Some((_, bd)) if bd <= d => best,
                _ => Some((j, d)),
            })
    }
}
