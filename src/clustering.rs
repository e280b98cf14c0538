//! # Single-Linkage Clustering
//!
//! Agglomerative clustering over a [`DistanceMatrix`], cut into flat labels.
//!
//! ## Algorithm
//! 1. Grow a minimum spanning tree over all trajectories (Prim, dense `O(n²)`
//!    edge evaluations, ties broken by lowest index)
//! 2. Sort the tree edges by length; replaying them in order is exactly the
//!    single-linkage merge sequence
//! 3. Record each merge as a dendrogram node `n + k`
//! 4. Cut: every merge at or below the cut height joins its two sides
//!
//! ## Linkage metric
//! The gap between two trajectories is either the matrix entry itself
//! ([`LinkageMetric::Precomputed`]) or the Euclidean distance between their
//! matrix rows ([`LinkageMetric::RowEuclidean`], the default). Row distances
//! compare how each trajectory relates to the whole batch and can exceed 1,
//! which is why the user threshold is scaled by [`CUT_HEIGHT_SCALE`].

use std::time::Instant;

use log::{debug, info};

use crate::union_find::UnionFind;
use crate::{DistanceMatrix, Error, Result};

/// Fixed ratio between the user-facing distance threshold and the dendrogram
/// cut height. Changing it changes every clustering result.
pub const CUT_HEIGHT_SCALE: f64 = 2.0;

/// How the linkage measures the gap between two trajectories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum LinkageMetric {
    /// Euclidean distance between the two trajectories' matrix rows.
    #[default]
    RowEuclidean,
    /// The matrix entry itself.
    Precomputed,
}

impl LinkageMetric {
    fn gap(self, matrix: &DistanceMatrix, i: usize, j: usize) -> f64 {
        match self {
            LinkageMetric::Precomputed => matrix[(i, j)],
            LinkageMetric::RowEuclidean => matrix
                .row(i)
                .iter()
                .zip(matrix.row(j))
                .map(|(a, b)| (a - b) * (a - b))
                .sum::<f64>()
                .sqrt(),
        }
    }
}

/// One agglomeration step.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Merge {
    /// Smaller node id of the two merged clusters
    pub left: usize,
    /// Larger node id of the two merged clusters
    pub right: usize,
    /// Linkage distance at which they merged
    pub height: f64,
    /// Number of trajectories in the merged cluster
    pub size: usize,
}

/// Single-linkage merge hierarchy.
///
/// Leaves are trajectory indices `0..n`; merge `k` creates node `n + k`.
/// Merge heights are non-decreasing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dendrogram {
    leaves: usize,
    merges: Vec<Merge>,
}

impl Dendrogram {
    /// Build the hierarchy for `matrix` under `metric`.
    pub fn single_linkage(matrix: &DistanceMatrix, metric: LinkageMetric) -> Self {
        let n = matrix.len();
        let edges = minimum_spanning_edges(matrix, metric);

        let mut uf = UnionFind::new(n);
        // Dendrogram node id and size of the cluster rooted at each union-find root
        let mut node_of: Vec<usize> = (0..n).collect();
        let mut size_of = vec![1usize; n];
        let mut merges = Vec::with_capacity(edges.len());

        for (k, (a, b, height)) in edges.into_iter().enumerate() {
            let (ra, rb) = (uf.find(a), uf.find(b));
            let (na, nb) = (node_of[ra], node_of[rb]);
            let size = size_of[ra] + size_of[rb];
            let root = uf.union(ra, rb);
            node_of[root] = n + k;
            size_of[root] = size;
            merges.push(Merge {
                left: na.min(nb),
                right: na.max(nb),
                height,
                size,
            });
        }

        Self { leaves: n, merges }
    }

    /// Number of leaves (trajectories).
    pub fn leaves(&self) -> usize {
        self.leaves
    }

    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// Flat labels after cutting at `height`: every merge with
    /// `merge.height <= height` joins its two sides.
    ///
    /// Labels are 1-based and numbered in order of first appearance by
    /// trajectory index.
    pub fn cut(&self, height: f64) -> Vec<usize> {
        let n = self.leaves;
        // Any leaf under each dendrogram node
        let mut representative: Vec<usize> = (0..n).collect();
        representative.reserve(self.merges.len());

        let mut uf = UnionFind::new(n);
        for merge in &self.merges {
            let (a, b) = (representative[merge.left], representative[merge.right]);
            representative.push(a);
            if merge.height <= height {
                uf.union(a, b);
            }
        }

        let mut label_of_root = vec![0usize; n];
        let mut next_label = 0;
        (0..n)
            .map(|i| {
                let root = uf.find(i);
                if label_of_root[root] == 0 {
                    next_label += 1;
                    label_of_root[root] = next_label;
                }
                label_of_root[root]
            })
            .collect()
    }
}

/// Prim's algorithm over the dense matrix. Returns `n - 1` edges
/// `(a, b, length)` sorted by length (stable, so ties keep discovery order).
fn minimum_spanning_edges(
    matrix: &DistanceMatrix,
    metric: LinkageMetric,
) -> Vec<(usize, usize, f64)> {
    let n = matrix.len();
    if n < 2 {
        return Vec::new();
    }

    let mut in_tree = vec![false; n];
    let mut best = vec![f64::INFINITY; n];
    let mut nearest = vec![0usize; n];
    let mut edges = Vec::with_capacity(n - 1);

    let mut current = 0;
    in_tree[0] = true;

    for _ in 1..n {
        let mut next = n;
        for j in 0..n {
            if in_tree[j] {
                continue;
            }
            let gap = metric.gap(matrix, current, j);
            if gap < best[j] {
                best[j] = gap;
                nearest[j] = current;
            }
            if next == n || best[j] < best[next] {
                next = j;
            }
        }
        in_tree[next] = true;
        edges.push((nearest[next], next, best[next]));
        current = next;
    }

    edges.sort_by(|a, b| a.2.total_cmp(&b.2));
    edges
}

pub(crate) fn validate_threshold(distance_threshold: f64) -> Result<()> {
    if !distance_threshold.is_finite() || distance_threshold < 0.0 {
        return Err(Error::invalid(
            "distance_threshold",
            format!("{distance_threshold} must be a finite value >= 0"),
        ));
    }
    Ok(())
}

/// Cluster `matrix` with the default linkage metric and cut at
/// `distance_threshold * CUT_HEIGHT_SCALE`.
///
/// # Example
/// ```
/// use trajectory_cluster::{form_clusters, DistanceMatrix};
///
/// let matrix = DistanceMatrix::from_rows(vec![
///     vec![0.0, 0.0, 1.0],
///     vec![0.0, 0.0, 1.0],
///     vec![1.0, 1.0, 0.0],
/// ]).unwrap();
///
/// let labels = form_clusters(&matrix, 0.1).unwrap();
/// assert_eq!(labels, vec![1, 1, 2]);
/// ```
pub fn form_clusters(matrix: &DistanceMatrix, distance_threshold: f64) -> Result<Vec<usize>> {
    form_clusters_with(matrix, distance_threshold, LinkageMetric::default())
}

/// [`form_clusters`] with an explicit linkage metric.
pub fn form_clusters_with(
    matrix: &DistanceMatrix,
    distance_threshold: f64,
    metric: LinkageMetric,
) -> Result<Vec<usize>> {
    validate_threshold(distance_threshold)?;

    let start = Instant::now();
    let cut_height = distance_threshold * CUT_HEIGHT_SCALE;
    let dendrogram = Dendrogram::single_linkage(matrix, metric);
    debug!(
        "[Clustering] Built dendrogram with {} merges ({:?})",
        dendrogram.merges().len(),
        metric
    );

    let labels = dendrogram.cut(cut_height);
    let clusters = labels.iter().max().copied().unwrap_or(0);
    info!(
        "[Clustering] {} trajectories -> {} clusters at cut height {} in {:?}",
        labels.len(),
        clusters,
        cut_height,
        start.elapsed()
    );

    Ok(labels)
}
