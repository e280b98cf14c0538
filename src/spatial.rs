//! # Spatial Index
//!
//! R-tree over a trajectory's points so the "is any point inside this window"
//! test becomes an envelope query instead of a linear scan.
//!
//! Candidates from the tree are confirmed with [`Coordinate::within_filter`],
//! so indexed matching counts exactly the same points as the brute-force scan.

use rstar::{RTree, AABB};

use crate::{Coordinate, Trajectory, WindowSize};

/// Relative slack added to query envelopes. Envelope corners are computed as
/// `center ± half`, which can round inward by an ulp; the exact test runs on
/// every candidate afterwards.
const QUERY_SLACK: f64 = 1e-9;

/// Spatial index of one trajectory's points.
#[derive(Debug, Clone)]
pub struct PointIndex {
    tree: RTree<[f64; 2]>,
}

impl PointIndex {
    pub fn new(points: &[Coordinate]) -> Self {
        let entries: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn from_trajectory(trajectory: &Trajectory) -> Self {
        Self::new(trajectory.points())
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// True if any indexed point lies inside the window centered on `center`.
    pub fn any_within(&self, center: &Coordinate, window: WindowSize) -> bool {
        let half = window.half();
        let reach = half + QUERY_SLACK * (1.0 + half + center.x.abs().max(center.y.abs()));
        let envelope = AABB::from_corners(
            [center.x - reach, center.y - reach],
            [center.x + reach, center.y + reach],
        );

        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .any(|p| center.within_filter(&Coordinate::new(p[0], p[1]), window))
    }

    /// Number of `points` with at least one indexed point inside their window.
    pub fn count_matched(&self, points: &[Coordinate], window: WindowSize) -> usize {
        points.iter().filter(|p| self.any_within(p, window)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(points: &[(f64, f64)]) -> Vec<Coordinate> {
        points.iter().map(|&(x, y)| Coordinate::new(x, y)).collect()
    }

    #[test]
    fn test_any_within_matches_linear_scan() {
        let indexed = coords(&[(0.0, 0.0), (5.0, 5.0), (10.0, -3.0), (0.1, 0.2)]);
        let index = PointIndex::new(&indexed);
        assert_eq!(index.len(), 4);

        let queries = coords(&[
            (0.5, 0.5),
            (4.0, 4.0),
            (7.5, 7.5),
            (10.0, -2.0),
            (-1.0, -1.0),
            (20.0, 20.0),
        ]);
        for window in [0, 1, 2, 3, 10] {
            let window = WindowSize::new(window);
            for query in &queries {
                let linear = indexed.iter().any(|q| query.within_filter(q, window));
                assert_eq!(
                    index.any_within(query, window),
                    linear,
                    "query {query:?} window {window:?}"
                );
            }
        }
    }

    #[test]
    fn test_window_border_is_inclusive() {
        let index = PointIndex::new(&coords(&[(1.0, 1.0)]));
        // Exactly half a window away on both axes
        assert!(index.any_within(&Coordinate::new(0.0, 0.0), WindowSize::new(2)));
        assert!(!index.any_within(&Coordinate::new(0.0, -0.001), WindowSize::new(2)));
    }

    #[test]
    fn test_count_matched() {
        let index = PointIndex::new(&coords(&[(0.0, 0.0), (100.0, 100.0)]));
        let queries = coords(&[(0.4, 0.4), (50.0, 50.0), (100.0, 99.5)]);
        assert_eq!(index.count_matched(&queries, WindowSize::new(1)), 2);
    }
}
