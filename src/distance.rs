//! # Distance Maps
//!
//! All-pairs distance matrices over a batch of trajectories.
//!
//! ## Strategies
//!
//! | Strategy | Distance | Per-pair cost |
//! |----------|----------|---------------|
//! | [`DistanceStrategy::BruteForce`] | `1 - similarity` by point scan | `O(m²)` |
//! | [`DistanceStrategy::Indexed`] | `1 - similarity` via R-tree queries | `O(m log m)` |
//! | [`DistanceStrategy::Raster`] | occupancy-area symmetric difference | `O(cells)` |
//!
//! `BruteForce` and `Indexed` produce bit-identical matrices. `Raster` is an
//! independent approximation; pick one strategy per run and stick to it.
//!
//! Each unordered pair `(i, j)` with `i <= j` is computed once and written to
//! both `[i][j]` and `[j][i]`, so the result is symmetric with a zero diagonal.

use std::ops::Index;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};

use crate::raster::{OccupancyArea, RasterGrid};
use crate::spatial::PointIndex;
use crate::{Error, Result, Trajectory, WindowSize};

/// Progress callback type: (rows completed, total rows).
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// How pairwise distances are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum DistanceStrategy {
    /// Scan every point of the other trajectory until the first hit.
    #[default]
    BruteForce,
    /// Same metric as `BruteForce`, with each trajectory's points in an R-tree.
    Indexed,
    /// Occupancy-grid approximation for large batches.
    Raster,
}

// ============================================================================
// Distance Matrix
// ============================================================================

/// Dense, symmetric `n × n` matrix of distances in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DistanceMatrix {
    size: usize,
    /// Row-major values
    values: Vec<f64>,
}

impl DistanceMatrix {
    pub(crate) fn zeros(size: usize) -> Self {
        Self {
            size,
            values: vec![0.0; size * size],
        }
    }

    /// Build a matrix from rows, checking it is square, symmetric, has a zero
    /// diagonal and only holds values in `[0, 1]`.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let size = rows.len();
        if let Some(i) = rows.iter().position(|r| r.len() != size) {
            return Err(Error::invalid(
                "distance_matrix",
                format!("row {i} has {} entries, expected {size}", rows[i].len()),
            ));
        }

        let matrix = Self {
            size,
            values: rows.into_iter().flatten().collect(),
        };

        for i in 0..size {
            if matrix[(i, i)] != 0.0 {
                return Err(Error::invalid(
                    "distance_matrix",
                    format!("diagonal entry {i} is not zero"),
                ));
            }
            for j in (i + 1)..size {
                let d = matrix[(i, j)];
                if !(0.0..=1.0).contains(&d) {
                    return Err(Error::invalid(
                        "distance_matrix",
                        format!("entry ({i}, {j}) = {d} is outside [0, 1]"),
                    ));
                }
                if d != matrix[(j, i)] {
                    return Err(Error::invalid(
                        "distance_matrix",
                        format!("entries ({i}, {j}) and ({j}, {i}) differ"),
                    ));
                }
            }
        }

        Ok(matrix)
    }

    /// Number of trajectories (rows).
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i < self.size && j < self.size {
            Some(self.values[i * self.size + j])
        } else {
            None
        }
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.size..(i + 1) * self.size]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact panics on 0; an empty matrix has no rows anyway
        self.values.chunks_exact(self.size.max(1))
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.size).all(|i| ((i + 1)..self.size).all(|j| self[(i, j)] == self[(j, i)]))
    }

    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.rows().map(<[f64]>::to_vec).collect()
    }

    fn set_pair(&mut self, i: usize, j: usize, distance: f64) {
        self.values[i * self.size + j] = distance;
        self.values[j * self.size + i] = distance;
    }
}

impl Index<(usize, usize)> for DistanceMatrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.values[i * self.size + j]
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builds distance matrices with a chosen strategy and window.
///
/// # Example
/// ```
/// use trajectory_cluster::{
///     Coordinate, DistanceMapBuilder, DistanceStrategy, Trajectory, WindowSize,
/// };
///
/// let t = |id: &str, x: f64| Trajectory::new(id, "car", vec![Coordinate::new(x, 0.0)]).unwrap();
/// let batch = vec![t("a", 0.0), t("b", 0.5), t("c", 100.0)];
///
/// let matrix = DistanceMapBuilder::new(WindowSize::new(2))
///     .with_strategy(DistanceStrategy::Indexed)
///     .build(&batch)
///     .unwrap();
///
/// assert_eq!(matrix[(0, 1)], 0.0);
/// assert_eq!(matrix[(0, 2)], 1.0);
/// ```
#[derive(Clone)]
pub struct DistanceMapBuilder {
    window: WindowSize,
    strategy: DistanceStrategy,
    progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for DistanceMapBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistanceMapBuilder")
            .field("window", &self.window)
            .field("strategy", &self.strategy)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl DistanceMapBuilder {
    pub fn new(window: WindowSize) -> Self {
        Self {
            window,
            strategy: DistanceStrategy::default(),
            progress: None,
        }
    }

    pub fn with_strategy(mut self, strategy: DistanceStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Report progress after each completed row.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn strategy(&self) -> DistanceStrategy {
        self.strategy
    }

    pub fn window(&self) -> WindowSize {
        self.window
    }

    /// Compute the full matrix on the calling thread.
    pub fn build(&self, trajectories: &[Trajectory]) -> Result<DistanceMatrix> {
        let n = trajectories.len();
        info!(
            "[DistanceMap] There are {} trajectories in the batch ({:?}, window={})",
            n,
            self.strategy,
            self.window.get()
        );

        let start = Instant::now();
        let prepared = Prepared::new(self.strategy, trajectories, self.window)?;
        let mut matrix = DistanceMatrix::zeros(n);

        for i in 0..n {
            if i % 10 == 0 {
                debug!("[DistanceMap] {} of {} trajectories processed", i, n);
            }
            for j in i..n {
                matrix.set_pair(i, j, prepared.distance(i, j));
            }
            if let Some(callback) = &self.progress {
                callback(i + 1, n);
            }
        }

        info!("[DistanceMap] All {} trajectories processed in {:?}", n, start.elapsed());
        Ok(matrix)
    }

    /// Compute the full matrix with rayon. Rows are distributed across the
    /// thread pool; every cell is still written exactly once, so the result
    /// is identical to [`DistanceMapBuilder::build`].
    #[cfg(feature = "parallel")]
    pub fn build_parallel(&self, trajectories: &[Trajectory]) -> Result<DistanceMatrix> {
        use rayon::prelude::*;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let n = trajectories.len();
        info!(
            "[DistanceMap] There are {} trajectories in the batch ({:?}, window={}, parallel)",
            n,
            self.strategy,
            self.window.get()
        );

        let start = Instant::now();
        let prepared = Prepared::new(self.strategy, trajectories, self.window)?;
        let completed = AtomicUsize::new(0);

        let upper_rows: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|i| {
                let row: Vec<f64> = (i..n).map(|j| prepared.distance(i, j)).collect();
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if done % 10 == 0 {
                    debug!("[DistanceMap] {} of {} trajectories processed", done, n);
                }
                if let Some(callback) = &self.progress {
                    callback(done, n);
                }
                row
            })
            .collect();

        // Join point: every row is complete before the matrix is assembled
        let mut matrix = DistanceMatrix::zeros(n);
        for (i, row) in upper_rows.into_iter().enumerate() {
            for (offset, distance) in row.into_iter().enumerate() {
                matrix.set_pair(i, i + offset, distance);
            }
        }

        info!("[DistanceMap] All {} trajectories processed in {:?}", n, start.elapsed());
        Ok(matrix)
    }
}

/// Per-strategy state computed once before the pair loop.
enum Prepared<'a> {
    Points {
        trajectories: &'a [Trajectory],
        window: WindowSize,
    },
    Indexed {
        trajectories: &'a [Trajectory],
        indexes: Vec<PointIndex>,
        window: WindowSize,
    },
    Raster {
        areas: Vec<OccupancyArea>,
    },
}

impl<'a> Prepared<'a> {
    fn new(
        strategy: DistanceStrategy,
        trajectories: &'a [Trajectory],
        window: WindowSize,
    ) -> Result<Self> {
        match strategy {
            DistanceStrategy::BruteForce => Ok(Prepared::Points {
                trajectories,
                window,
            }),
            DistanceStrategy::Indexed => Ok(Prepared::Indexed {
                trajectories,
                indexes: trajectories.iter().map(PointIndex::from_trajectory).collect(),
                window,
            }),
            DistanceStrategy::Raster => {
                if trajectories.is_empty() {
                    return Ok(Prepared::Raster { areas: Vec::new() });
                }
                let grid = RasterGrid::covering(trajectories, window)?;
                debug!("[DistanceMap] Raster grid {} x {} cells", grid.cols(), grid.rows());
                Ok(Prepared::Raster {
                    areas: trajectories.iter().map(|t| grid.paint(t)).collect(),
                })
            }
        }
    }

    fn distance(&self, i: usize, j: usize) -> f64 {
        match self {
            Prepared::Points {
                trajectories,
                window,
            } => 1.0 - trajectories[i].similarity(&trajectories[j], *window),
            Prepared::Indexed {
                trajectories,
                indexes,
                window,
            } => {
                let (a, b) = (&trajectories[i], &trajectories[j]);
                let matched = indexes[j].count_matched(a.points(), *window)
                    + indexes[i].count_matched(b.points(), *window);
                1.0 - matched as f64 / (a.len() + b.len()) as f64
            }
            Prepared::Raster { areas } => areas[i].distance(&areas[j]),
        }
    }
}

/// Distance map by brute-force point matching: `1 - similarity` for every pair.
pub fn build_distance_map(
    trajectories: &[Trajectory],
    window: WindowSize,
) -> Result<DistanceMatrix> {
    DistanceMapBuilder::new(window)
        .with_strategy(DistanceStrategy::BruteForce)
        .build(trajectories)
}

/// Distance map by occupancy-raster approximation, for large batches.
pub fn build_distance_map_approx(
    trajectories: &[Trajectory],
    window: WindowSize,
) -> Result<DistanceMatrix> {
    DistanceMapBuilder::new(window)
        .with_strategy(DistanceStrategy::Raster)
        .build(trajectories)
}

// ============================================================================
// Tests
// ============================================================================
