//! Temporally excluded nearest neighbor search.
//!
//! For every point the `maxnum` closest candidates (the point itself included)
//! are gathered by brute force and scanned in increasing distance; the first
//! one that is more than `window` samples away in time and at a nonzero
//! distance is the neighbor.

use std::cmp::Ordering;

use ndarray::ArrayView2;

use crate::error::{DynamicsError, Result};
use crate::pairwise::distance::Metric;

/// Neighbor index and distance for each point of a trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbors {
    pub index: Vec<usize>,
    pub distance: Vec<f64>,
}

impl Neighbors {
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Nearest neighbor of every row of `points` with `|i - j| > window` and a
/// strictly positive distance.
///
/// `maxnum` defaults to `2 * window + 3`. Fails with `InvalidParameter` when
/// `maxnum` is not smaller than the number of points, and with
/// `NumericalDegeneracy` when none of a point's candidates qualifies.
pub fn nearest_neighbors(
    points: ArrayView2<f64>,
    metric: Metric,
    window: usize,
    maxnum: Option<usize>,
) -> Result<Neighbors> {
    let m = points.nrows();
    let maxnum = maxnum.unwrap_or_else(|| window.saturating_mul(2).saturating_add(3));
    if maxnum == 0 {
        return Err(DynamicsError::invalid("maxnum must be at least 1"));
    }
    if maxnum >= m {
        return Err(DynamicsError::invalid(format!(
            "maxnum ({maxnum}) must be smaller than the number of points ({m})"
        )));
    }

    let by_distance = |a: &(usize, f64), b: &(usize, f64)| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(Ordering::Equal)
            .then(a.0.cmp(&b.0))
    };

    let mut index = Vec::with_capacity(m);
    let mut distance = Vec::with_capacity(m);
    let mut candidates: Vec<(usize, f64)> = Vec::with_capacity(m);

    for i in 0..m {
        let row = points.row(i);
        candidates.clear();
        candidates.extend((0..m).map(|j| (j, metric.distance(row, points.row(j)))));

        candidates.select_nth_unstable_by(maxnum - 1, by_distance);
        let nearest = &mut candidates[..maxnum];
        nearest.sort_unstable_by(by_distance);

        let found = nearest
            .iter()
            .find(|&&(j, d)| i.abs_diff(j) > window && d > 0.0)
            .copied();

        match found {
            Some((j, d)) => {
                index.push(j);
                distance.push(d);
            }
            None => {
                return Err(DynamicsError::degenerate(format!(
                    "no neighbor with nonzero distance outside the exclusion window \
                     among the {maxnum} nearest candidates of point {i}; increase maxnum"
                )));
            }
        }
    }

    Ok(Neighbors { index, distance })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn line(values: &[f64]) -> Array2<f64> {
        Array2::from_shape_vec((values.len(), 1), values.to_vec()).unwrap()
    }

    #[test]
    fn test_skips_points_inside_window() {
        // Adjacent samples are closest in value, the true match is one period away.
        let y: Vec<f64> = (0..40).map(|i| (i % 10) as f64 + 0.01 * i as f64).collect();
        let pts = line(&y);
        let nn = nearest_neighbors(pts.view(), Metric::Euclidean, 2, Some(8)).unwrap();
        assert_eq!(nn.len(), 40);
        for (i, (&j, &d)) in nn.index.iter().zip(nn.distance.iter()).enumerate() {
            assert!(i.abs_diff(j) > 2, "point {i} matched {j}");
            assert!(d > 0.0);
        }
        assert!(nn.index[15] == 5 || nn.index[15] == 25);
        assert!((nn.distance[15] - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_zero_distance_candidates_are_skipped() {
        let y = [0.0, 5.0, 0.0, 9.0, 0.0, 5.1, 20.0, 30.0];
        let pts = line(&y);
        let nn = nearest_neighbors(pts.view(), Metric::Chebyshev, 0, Some(7)).unwrap();
        // Point 1 (5.0) pairs with 5 (5.1); point 0 must skip its exact duplicates.
        assert_eq!(nn.index[1], 5);
        assert!(nn.distance[0] > 0.0);
        assert_eq!(nn.index[0], 1);
    }

    #[test]
    fn test_maxnum_must_be_below_point_count() {
        let pts = line(&[0.0, 1.0, 2.0, 3.0]);
        let err = nearest_neighbors(pts.view(), Metric::Euclidean, 0, Some(4)).unwrap_err();
        assert!(matches!(err, DynamicsError::InvalidParameter(_)));
        // default maxnum = 2 * 10 + 3 = 23 > 4
        assert!(nearest_neighbors(pts.view(), Metric::Euclidean, 10, None).is_err());
    }

    #[test]
    fn test_reports_degeneracy_when_no_candidate_qualifies() {
        let pts = line(&[1.0; 12]);
        let err = nearest_neighbors(pts.view(), Metric::Euclidean, 1, Some(5)).unwrap_err();
        assert!(matches!(err, DynamicsError::NumericalDegeneracy(_)));
    }
}
