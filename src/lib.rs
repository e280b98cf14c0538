//! # Trajectory Cluster
//!
//! Groups moving-object trajectories into clusters of similar paths and picks
//! the most populous clusters for display.
//!
//! This library provides:
//! - A windowed spatial-proximity similarity between two trajectories
//! - All-pairs distance maps (point matching, R-tree indexed matching, or
//!   occupancy-raster approximation)
//! - Single-linkage agglomerative clustering cut at a distance threshold
//! - Selection of the largest clusters, ranked by size
//!
//! ## Features
//!
//! - **`parallel`** - Build distance maps in parallel with rayon
//! - **`serde`** - Serialize results and ingest JSON trajectory records (default)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use trajectory_cluster::{Coordinate, Trajectory, WindowSize};
//!
//! let a = Trajectory::new("1", "car", vec![
//!     Coordinate::new(1.0, 2.0),
//!     Coordinate::new(2.0, 3.0),
//! ]).unwrap();
//! let b = Trajectory::new("2", "car", vec![
//!     Coordinate::new(1.5, 2.5),
//!     Coordinate::new(2.5, 3.5),
//! ]).unwrap();
//!
//! let score = a.similarity(&b, WindowSize::new(1));
//! assert_eq!(score, 1.0);
//! ```

use geo::{BoundingRect, Coord, LineString};
use log::info;

pub mod error;
pub use error::{Error, Result};

// Distance map construction (point matching, indexed matching, raster approximation)
pub mod distance;
pub use distance::{
    build_distance_map, build_distance_map_approx, DistanceMapBuilder, DistanceMatrix,
    DistanceStrategy, ProgressCallback,
};

pub mod raster;
pub mod spatial;
mod union_find;

// Single-linkage clustering
pub mod clustering;
pub use clustering::{
    form_clusters, form_clusters_with, Dendrogram, LinkageMetric, Merge, CUT_HEIGHT_SCALE,
};

// Big-cluster selection
pub mod selection;
pub use selection::{select_top_clusters, BigClusters};

// JSON trajectory records
#[cfg(feature = "serde")]
pub mod records;
#[cfg(feature = "serde")]
pub use records::{load_trajectories, TrajectoryRecord};

// ============================================================================
// Core Types
// ============================================================================

/// A 2-D position.
///
/// # Example
/// ```
/// use trajectory_cluster::{Coordinate, WindowSize};
/// let a = Coordinate::new(2.0, 2.0);
/// assert!(a.within_filter(&Coordinate::new(2.0, 1.0), WindowSize::new(2)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    /// Create a new coordinate.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Check if both components are finite.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Check whether `other` lies inside the axis-aligned square of side
    /// `window` centered on this coordinate. The square's border counts as inside.
    #[inline]
    pub fn within_filter(&self, other: &Coordinate, window: WindowSize) -> bool {
        let half = window.half();
        (self.x - other.x).abs() <= half && (self.y - other.y).abs() <= half
    }
}

impl From<Coordinate> for Coord<f64> {
    fn from(c: Coordinate) -> Self {
        Coord { x: c.x, y: c.y }
    }
}

impl From<Coord<f64>> for Coordinate {
    fn from(c: Coord<f64>) -> Self {
        Coordinate::new(c.x, c.y)
    }
}

/// Side length of the square proximity window, in coordinate units.
///
/// Always a non-negative whole number. Use [`WindowSize::new`] for literal
/// sizes and `TryFrom<f64>` / `TryFrom<i64>` for values coming from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(transparent))]
pub struct WindowSize(u32);

impl WindowSize {
    pub const fn new(size: u32) -> Self {
        Self(size)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Half the side length, the per-axis reach of the window.
    #[inline]
    pub fn half(self) -> f64 {
        f64::from(self.0) / 2.0
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self(200)
    }
}

impl From<u32> for WindowSize {
    fn from(size: u32) -> Self {
        Self(size)
    }
}

impl TryFrom<f64> for WindowSize {
    type Error = Error;

    fn try_from(size: f64) -> Result<Self> {
        if !size.is_finite() {
            return Err(Error::invalid("window_size", format!("{size} is not finite")));
        }
        if size < 0.0 {
            return Err(Error::invalid("window_size", format!("{size} is negative")));
        }
        if size.fract() != 0.0 {
            return Err(Error::invalid("window_size", format!("{size} is not a whole number")));
        }
        if size > f64::from(u32::MAX) {
            return Err(Error::invalid("window_size", format!("{size} is too large")));
        }
        Ok(Self(size as u32))
    }
}

impl TryFrom<i64> for WindowSize {
    type Error = Error;

    fn try_from(size: i64) -> Result<Self> {
        u32::try_from(size)
            .map(Self)
            .map_err(|_| Error::invalid("window_size", format!("{size} is out of range")))
    }
}

/// Axis-aligned extent of a set of coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Create bounds from coordinates. Returns `None` for an empty slice.
    pub fn from_points(points: &[Coordinate]) -> Option<Self> {
        let line: LineString<f64> = points.iter().map(|&p| Coord::from(p)).collect();
        let rect = line.bounding_rect()?;
        Some(Self {
            min_x: rect.min().x,
            max_x: rect.max().x,
            min_y: rect.min().y,
            max_y: rect.max().y,
        })
    }

    /// Smallest bounds containing both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            max_x: self.max_x.max(other.max_x),
            min_y: self.min_y.min(other.min_y),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// The path of one moving object: an identity, a type tag and a non-empty,
/// ordered list of positions.
///
/// Fields are private so the non-empty, finite-points invariant established by
/// [`Trajectory::new`] holds for the value's whole lifetime.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Trajectory {
    id: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    kind: String,
    points: Vec<Coordinate>,
}

impl Trajectory {
    /// Create a trajectory.
    ///
    /// Fails with [`Error::DegenerateInput`] when `points` is empty and with
    /// [`Error::InvalidArgument`] when any point has a non-finite component.
    ///
    /// # Example
    /// ```
    /// use trajectory_cluster::{Coordinate, Trajectory};
    ///
    /// let t = Trajectory::new("bus-12", "bus", vec![Coordinate::new(0.0, 0.0)]);
    /// assert!(t.is_ok());
    /// assert!(Trajectory::new("bus-13", "bus", vec![]).is_err());
    /// ```
    pub fn new(
        id: impl Into<String>,
        kind: impl Into<String>,
        points: Vec<Coordinate>,
    ) -> Result<Self> {
        let id = id.into();
        if points.is_empty() {
            return Err(Error::DegenerateInput { index: None, id });
        }
        if let Some(pos) = points.iter().position(|p| !p.is_valid()) {
            return Err(Error::invalid(
                "points",
                format!("trajectory '{id}' point {pos} is not finite"),
            ));
        }
        Ok(Self {
            id,
            kind: kind.into(),
            points,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The object type tag ("car", "pedestrian", ...).
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Number of points (always at least one).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed trajectory.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Similarity score in `[0, 1]` between this trajectory and `target`.
    ///
    /// Every point of either trajectory that has at least one point of the
    /// other inside its window counts once. The score is that count divided
    /// by the total number of points, so it is symmetric and a trajectory
    /// always scores 1.0 against itself.
    pub fn similarity(&self, target: &Trajectory, window: WindowSize) -> f64 {
        let matched = count_matched(&self.points, &target.points, window)
            + count_matched(&target.points, &self.points, window);
        matched as f64 / (self.points.len() + target.points.len()) as f64
    }

    /// Parallel x and y arrays in point order, for rendering.
    pub fn export(&self) -> (Vec<f64>, Vec<f64>) {
        self.points.iter().map(|p| (p.x, p.y)).unzip()
    }

    /// Extent of the trajectory.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(&self.points).unwrap_or(Bounds {
            min_x: 0.0,
            max_x: 0.0,
            min_y: 0.0,
            max_y: 0.0,
        })
    }

    /// The path as a geo line string.
    pub fn line_string(&self) -> LineString<f64> {
        self.points.iter().map(|&p| Coord::from(p)).collect()
    }
}

/// Count points of `from` with at least one point of `to` inside their window.
/// Each point stops scanning at its first hit.
fn count_matched(from: &[Coordinate], to: &[Coordinate], window: WindowSize) -> usize {
    from.iter()
        .filter(|p| to.iter().any(|q| p.within_filter(q, window)))
        .count()
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for the clustering pipeline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct ClusterConfig {
    /// Side of the square proximity window used by the similarity metric.
    /// Default: 200
    pub window_size: WindowSize,

    /// User-facing merge threshold. The dendrogram is cut at
    /// `distance_threshold * CUT_HEIGHT_SCALE`.
    /// Default: 0.5
    pub distance_threshold: f64,

    /// Number of largest clusters to keep.
    /// Default: 3
    pub top_n: usize,

    /// Only the first `sample_size` trajectories are clustered. `None` keeps all.
    /// Default: Some(1000)
    pub sample_size: Option<usize>,

    /// How pairwise distances are computed.
    /// Default: brute-force point matching
    pub strategy: DistanceStrategy,

    /// How the linkage measures the gap between two trajectories.
    /// Default: Euclidean distance between distance-matrix rows
    pub linkage: LinkageMetric,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            window_size: WindowSize::default(),
            distance_threshold: 0.5,
            top_n: 3,
            sample_size: Some(1000),
            strategy: DistanceStrategy::default(),
            linkage: LinkageMetric::default(),
        }
    }
}

impl ClusterConfig {
    /// Check every range constraint not already enforced by the field types.
    pub fn validate(&self) -> Result<()> {
        clustering::validate_threshold(self.distance_threshold)
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Output of [`cluster_trajectories`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ClusterReport {
    /// Pairwise distances over the clustered batch.
    pub distances: DistanceMatrix,
    /// Flat cluster label per trajectory index.
    pub labels: Vec<usize>,
    /// Largest clusters, rank 0 first.
    pub big_clusters: BigClusters,
    /// Number of trajectories that were clustered (after sampling).
    pub trajectory_count: usize,
}

impl ClusterReport {
    /// (trajectories in a big cluster, trajectories clustered).
    pub fn coverage(&self) -> (usize, usize) {
        (self.big_clusters.member_count(), self.trajectory_count)
    }
}

/// Run the full pipeline: distance map, single-linkage clustering and
/// big-cluster selection.
///
/// Indices in the report refer to positions in `trajectories`; sampling only
/// truncates the tail.
///
/// # Example
/// ```
/// use trajectory_cluster::{
///     cluster_trajectories, ClusterConfig, Coordinate, Trajectory, WindowSize,
/// };
///
/// let path = |id: &str, dx: f64| {
///     let points = (0..5).map(|i| Coordinate::new(i as f64 * 10.0 + dx, 0.0)).collect();
///     Trajectory::new(id, "car", points).unwrap()
/// };
/// let trajectories = vec![path("a", 0.0), path("b", 1.0), path("c", 5000.0)];
///
/// let config = ClusterConfig {
///     window_size: WindowSize::new(4),
///     distance_threshold: 0.1,
///     top_n: 1,
///     ..ClusterConfig::default()
/// };
/// let report = cluster_trajectories(&trajectories, &config).unwrap();
/// assert_eq!(report.big_clusters.members(0), Some(&[0, 1][..]));
/// ```
pub fn cluster_trajectories(
    trajectories: &[Trajectory],
    config: &ClusterConfig,
) -> Result<ClusterReport> {
    config.validate()?;

    let batch = match config.sample_size {
        Some(limit) if limit < trajectories.len() => &trajectories[..limit],
        _ => trajectories,
    };

    info!(
        "[Pipeline] Clustering {} of {} trajectories (window={}, threshold={}, top_n={})",
        batch.len(),
        trajectories.len(),
        config.window_size.get(),
        config.distance_threshold,
        config.top_n
    );

    let builder = DistanceMapBuilder::new(config.window_size).with_strategy(config.strategy);

    #[cfg(feature = "parallel")]
    let distances = builder.build_parallel(batch)?;

    #[cfg(not(feature = "parallel"))]
    let distances = builder.build(batch)?;

    let labels = form_clusters_with(&distances, config.distance_threshold, config.linkage)?;
    let big_clusters = select_top_clusters(&labels, config.top_n);

    let report = ClusterReport {
        distances,
        labels,
        big_clusters,
        trajectory_count: batch.len(),
    };

    let (covered, total) = report.coverage();
    info!(
        "[Pipeline] Most common {} routes ({} of {} trajectories)",
        report.big_clusters.len(),
        covered,
        total
    );

    Ok(report)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn traj(id: &str, points: &[(f64, f64)]) -> Trajectory {
        let points = points.iter().map(|&(x, y)| Coordinate::new(x, y)).collect();
        Trajectory::new(id, "type1", points).unwrap()
    }

    #[test]
    fn test_within_filter() {
        let coord1 = Coordinate::new(2.0, 2.0);
        let coord2 = Coordinate::new(2.0, 1.0);
        let coord3 = Coordinate::new(1.0, 0.0);

        assert!(coord1.within_filter(&coord2, WindowSize::new(2)));
        assert!(!coord1.within_filter(&coord3, WindowSize::new(2)));
        assert!(coord2.within_filter(&coord3, WindowSize::new(2)));
    }

    #[test]
    fn test_within_filter_zero_window() {
        let p = Coordinate::new(3.25, -7.5);
        assert!(p.within_filter(&p, WindowSize::new(0)));
        assert!(!p.within_filter(&Coordinate::new(3.25, -7.4), WindowSize::new(0)));
    }

    #[test]
    fn test_window_size_validation() {
        assert_eq!(WindowSize::try_from(200.0).unwrap(), WindowSize::new(200));
        assert_eq!(WindowSize::try_from(0.0).unwrap(), WindowSize::new(0));
        assert!(WindowSize::try_from(-1.0).unwrap_err().is_invalid_argument());
        assert!(WindowSize::try_from(f64::NAN).unwrap_err().is_invalid_argument());
        assert!(WindowSize::try_from(f64::INFINITY).unwrap_err().is_invalid_argument());
        assert!(WindowSize::try_from(1.5).unwrap_err().is_invalid_argument());
        assert!(WindowSize::try_from(-3i64).unwrap_err().is_invalid_argument());
        assert_eq!(WindowSize::try_from(7i64).unwrap().get(), 7);
    }

    #[test]
    fn test_trajectory_rejects_empty_and_non_finite() {
        let err = Trajectory::new("empty", "car", vec![]).unwrap_err();
        assert!(err.is_degenerate());

        let points = vec![Coordinate::new(0.0, 0.0), Coordinate::new(f64::NAN, 1.0)];
        let err = Trajectory::new("bad", "car", points).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("point 1"));
    }

    #[test]
    fn test_similarity() {
        let traj1 = traj("1", &[(1.0, 2.0), (2.0, 3.0)]);
        let traj2 = traj("2", &[(1.5, 2.5), (2.5, 3.5)]);

        assert_eq!(traj1.similarity(&traj1, WindowSize::new(1)), 1.0);

        let score = traj1.similarity(&traj2, WindowSize::new(1));
        assert_eq!(score, 1.0);
        assert_eq!(score, traj2.similarity(&traj1, WindowSize::new(1)));
    }

    #[test]
    fn test_similarity_self_zero_window() {
        let a = traj("a", &[(0.0, 0.0), (10.0, 10.0)]);
        assert_eq!(a.similarity(&a, WindowSize::new(0)), 1.0);
    }

    #[test]
    fn test_partial_similarity() {
        // Only the first point of each trajectory has a neighbour in the other.
        let a = traj("a", &[(0.0, 0.0), (100.0, 0.0)]);
        let b = traj("b", &[(0.5, 0.5), (0.0, 100.0), (50.0, 50.0)]);

        let score = a.similarity(&b, WindowSize::new(2));
        assert!((score - 2.0 / 5.0).abs() < 1e-12);
        assert_eq!(score, b.similarity(&a, WindowSize::new(2)));
    }

    #[test]
    fn test_disjoint_similarity_is_zero() {
        let a = traj("a", &[(0.0, 0.0)]);
        let b = traj("b", &[(1000.0, 1000.0)]);
        assert_eq!(a.similarity(&b, WindowSize::new(200)), 0.0);
    }

    #[test]
    fn test_export() {
        let t = traj("1", &[(1.0, 2.0), (2.0, 3.0), (4.0, -1.0)]);
        let (xs, ys) = t.export();
        assert_eq!(xs, vec![1.0, 2.0, 4.0]);
        assert_eq!(ys, vec![2.0, 3.0, -1.0]);
    }

    #[test]
    fn test_bounds_and_line_string() {
        let t = traj("1", &[(1.0, 2.0), (-2.0, 3.0), (4.0, -1.0)]);
        let b = t.bounds();
        assert_eq!((b.min_x, b.max_x, b.min_y, b.max_y), (-2.0, 4.0, -1.0, 3.0));
        assert_eq!(b.width(), 6.0);
        assert_eq!(b.height(), 4.0);
        assert_eq!(t.line_string().0.len(), 3);

        let single = traj("2", &[(5.0, 5.0)]);
        let u = b.union(&single.bounds());
        assert_eq!((u.max_x, u.max_y), (5.0, 5.0));
    }

    #[test]
    fn test_config_validation() {
        assert!(ClusterConfig::default().validate().is_ok());

        let config = ClusterConfig {
            distance_threshold: -0.1,
            ..ClusterConfig::default()
        };
        assert!(config.validate().unwrap_err().is_invalid_argument());

        let config = ClusterConfig {
            distance_threshold: f64::NAN,
            ..ClusterConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pipeline_three_trajectories() {
        let a = traj("a", &[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
        let b = traj("b", &[(0.5, 0.5), (10.5, 0.5), (20.5, 0.5)]);
        let c = traj("c", &[(900.0, 900.0), (910.0, 900.0)]);

        let config = ClusterConfig {
            window_size: WindowSize::new(2),
            distance_threshold: 0.1,
            top_n: 1,
            ..ClusterConfig::default()
        };
        let report = cluster_trajectories(&[a, b, c], &config).unwrap();

        assert_eq!(report.labels[0], report.labels[1]);
        assert_ne!(report.labels[0], report.labels[2]);
        assert_eq!(report.big_clusters.len(), 1);
        assert_eq!(report.big_clusters.members(0), Some(&[0, 1][..]));
        assert_eq!(report.coverage(), (2, 3));
    }

    fn three_trajectories() -> Vec<Trajectory> {
        vec![
            traj("a", &[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]),
            traj("b", &[(0.5, 0.5), (10.5, 0.5), (20.5, 0.5)]),
            traj("c", &[(900.0, 900.0), (910.0, 900.0)]),
        ]
    }

    #[test]
    fn test_pipeline_raster_strategy() {
        let config = ClusterConfig {
            window_size: WindowSize::new(2),
            distance_threshold: 0.1,
            top_n: 1,
            strategy: DistanceStrategy::Raster,
            ..ClusterConfig::default()
        };
        let report = cluster_trajectories(&three_trajectories(), &config).unwrap();

        // a and b floor into the same cells, c paints nothing they do
        assert_eq!(report.distances[(0, 1)], 0.0);
        assert_eq!(report.distances[(0, 2)], 1.0);
        assert_eq!(report.labels[0], report.labels[1]);
        assert_ne!(report.labels[0], report.labels[2]);
        assert_eq!(report.big_clusters.members(0), Some(&[0, 1][..]));
    }

    #[test]
    fn test_pipeline_precomputed_linkage() {
        let trajectories = three_trajectories();
        let config = ClusterConfig {
            window_size: WindowSize::new(2),
            distance_threshold: 0.1,
            top_n: 1,
            linkage: LinkageMetric::Precomputed,
            ..ClusterConfig::default()
        };
        let report = cluster_trajectories(&trajectories, &config).unwrap();
        assert_eq!(report.labels[0], report.labels[1]);
        assert_ne!(report.labels[0], report.labels[2]);
        assert_eq!(report.big_clusters.members(0), Some(&[0, 1][..]));

        // Cut 1.0 reaches the unit distance to c only when entries are used directly
        let precomputed = ClusterConfig {
            distance_threshold: 0.5,
            ..config.clone()
        };
        let report = cluster_trajectories(&trajectories, &precomputed).unwrap();
        assert_eq!(report.labels, vec![1, 1, 1]);

        let row_euclidean = ClusterConfig {
            linkage: LinkageMetric::RowEuclidean,
            ..precomputed
        };
        let report = cluster_trajectories(&trajectories, &row_euclidean).unwrap();
        assert_eq!(report.labels, vec![1, 1, 2]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serde() {
        let json = serde_json::to_value(ClusterConfig::default()).unwrap();
        assert_eq!(json["window_size"], 200);
        assert_eq!(json["strategy"], "brute_force");
        assert_eq!(json["linkage"], "row_euclidean");
        assert_eq!(json["sample_size"], 1000);

        let config: ClusterConfig =
            serde_json::from_str(r#"{"strategy": "raster", "linkage": "precomputed", "top_n": 5}"#)
                .unwrap();
        assert_eq!(config.strategy, DistanceStrategy::Raster);
        assert_eq!(config.linkage, LinkageMetric::Precomputed);
        assert_eq!(config.top_n, 5);
        assert_eq!(config.window_size, WindowSize::new(200));

        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<ClusterConfig>(&text).unwrap(), config);

        assert!(serde_json::from_str::<ClusterConfig>(r#"{"strategy": "Raster"}"#).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_report_serde() {
        let config = ClusterConfig {
            window_size: WindowSize::new(2),
            distance_threshold: 0.1,
            top_n: 1,
            ..ClusterConfig::default()
        };
        let report = cluster_trajectories(&three_trajectories(), &config).unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["labels"], serde_json::json!([1, 1, 2]));
        assert_eq!(json["trajectory_count"], 3);
        assert_eq!(json["distances"]["size"], 3);
        assert_eq!(json["big_clusters"]["groups"], serde_json::json!([[0, 1]]));

        let big: BigClusters = serde_json::from_value(json["big_clusters"].clone()).unwrap();
        assert_eq!(big, report.big_clusters);
    }

    #[test]
    fn test_pipeline_sampling_truncates_tail() {
        let trajectories: Vec<Trajectory> = (0..5)
            .map(|i| traj(&format!("t{i}"), &[(i as f64 * 1000.0, 0.0)]))
            .collect();

        let config = ClusterConfig {
            window_size: WindowSize::new(10),
            distance_threshold: 0.25,
            sample_size: Some(3),
            top_n: 10,
            ..ClusterConfig::default()
        };
        let report = cluster_trajectories(&trajectories, &config).unwrap();
        assert_eq!(report.trajectory_count, 3);
        assert_eq!(report.distances.len(), 3);
        assert_eq!(report.big_clusters.len(), 3);
    }

    #[test]
    fn test_pipeline_is_deterministic() {
        let trajectories: Vec<Trajectory> = (0..8)
            .map(|i| {
                let offset = (i % 3) as f64 * 40.0;
                let points = [(offset, 0.0), (offset + 5.0, 5.0), (offset + 10.0, 10.0)];
                traj(&format!("t{i}"), &points)
            })
            .collect();

        let config = ClusterConfig {
            window_size: WindowSize::new(6),
            distance_threshold: 0.2,
            ..ClusterConfig::default()
        };
        let first = cluster_trajectories(&trajectories, &config).unwrap();
        let second = cluster_trajectories(&trajectories, &config).unwrap();
        assert_eq!(first, second);
    }
}
