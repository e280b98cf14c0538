//! Occupancy rasters for approximate trajectory distance.
//!
//! Every trajectory is painted onto one shared grid of unit cells covering the
//! extent of the whole batch. Each point paints a `window × window` block of
//! cells (a single cell for a zero window). Two trajectories are then compared
//! by their painted areas:
//!
//! ```text
//! distance(a, b) = |a XOR b| / (|a| + |b|)
//! ```
//!
//! Areas are stored sparsely as sorted cell ids, so a pair costs
//! `O(|a| + |b|)` rather than the full grid.

use crate::{Bounds, Error, Result, Trajectory, WindowSize};

/// Largest coordinate magnitude the grid accepts. Beyond this unit cells are
/// no longer distinguishable in `f64`.
const MAX_COORDINATE: f64 = 4_503_599_627_370_496.0; // 2^52

/// Largest block a single point may paint. Windows wider than 1024 cells
/// per axis are rejected rather than allocated.
pub const MAX_CELLS_PER_POINT: u64 = 1 << 20;

/// Grid coordinate
type CellCoord = (i64, i64);

/// Shared unit-cell grid covering a batch of trajectories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterGrid {
    origin_col: i64,
    origin_row: i64,
    cols: u64,
    rows: u64,
    /// Cells painted per axis around each point
    span: i64,
    /// Cells painted before the point's own cell
    lead: i64,
}

impl RasterGrid {
    /// Size a grid to the global extent of `trajectories`, padded so every
    /// painted block fits.
    ///
    /// Returns `InvalidArgument` if the batch is empty, the extent cannot be
    /// addressed with 64-bit cell ids, or one point would paint more than
    /// [`MAX_CELLS_PER_POINT`] cells.
    pub fn covering(trajectories: &[Trajectory], window: WindowSize) -> Result<Self> {
        let extent = trajectories
            .iter()
            .map(Trajectory::bounds)
            .reduce(|a, b| a.union(&b))
            .ok_or_else(|| Error::invalid("trajectories", "cannot rasterize an empty batch"))?;

        Self::for_bounds(&extent, window)
    }

    pub fn for_bounds(extent: &Bounds, window: WindowSize) -> Result<Self> {
        let limits = [extent.min_x, extent.max_x, extent.min_y, extent.max_y];
        if limits.iter().any(|v| !v.is_finite() || v.abs() > MAX_COORDINATE) {
            return Err(Error::invalid(
                "trajectories",
                format!("coordinate extent {extent:?} is too large to rasterize"),
            ));
        }

        let span = i64::from(window.get().max(1));
        let lead = i64::from(window.get() / 2);

        let per_point = span.checked_mul(span).map(|cells| cells as u64);
        if per_point.map_or(true, |cells| cells > MAX_CELLS_PER_POINT) {
            return Err(Error::invalid(
                "window_size",
                format!(
                    "window {} paints more than {MAX_CELLS_PER_POINT} cells per point",
                    window.get()
                ),
            ));
        }

        let origin_col = extent.min_x.floor() as i64 - lead;
        let origin_row = extent.min_y.floor() as i64 - lead;
        let cols = (extent.max_x.floor() as i64 - extent.min_x.floor() as i64 + span) as u64;
        let rows = (extent.max_y.floor() as i64 - extent.min_y.floor() as i64 + span) as u64;

        if cols.checked_mul(rows).is_none() {
            return Err(Error::invalid(
                "window_size",
                format!("raster of {cols} x {rows} cells exceeds the addressable grid"),
            ));
        }

        Ok(Self {
            origin_col,
            origin_row,
            cols,
            rows,
            span,
            lead,
        })
    }

    pub fn cols(&self) -> u64 {
        self.cols
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Convert a position to the cell containing it
    fn to_grid_coords(&self, x: f64, y: f64) -> CellCoord {
        (x.floor() as i64, y.floor() as i64)
    }

    fn cell_id(&self, col: i64, row: i64) -> u64 {
        (row - self.origin_row) as u64 * self.cols + (col - self.origin_col) as u64
    }

    /// Paint every point of `trajectory` onto the grid.
    pub fn paint(&self, trajectory: &Trajectory) -> OccupancyArea {
        // Bounded by MAX_CELLS_PER_POINT at construction
        let per_point = (self.span * self.span) as usize;
        let capacity = trajectory.len().saturating_mul(per_point).min(1 << 20);
        let mut cells = Vec::with_capacity(capacity);

        for point in trajectory.points() {
            let (col, row) = self.to_grid_coords(point.x, point.y);
            let first_col = col - self.lead;
            let first_row = row - self.lead;
            for r in first_row..first_row + self.span {
                for c in first_col..first_col + self.span {
                    cells.push(self.cell_id(c, r));
                }
            }
        }

        cells.sort_unstable();
        cells.dedup();
        OccupancyArea { cells }
    }
}

/// The set of grid cells painted by one trajectory.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OccupancyArea {
    /// Sorted, deduplicated cell ids
    cells: Vec<u64>,
}

impl OccupancyArea {
    /// Number of painted cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of cells painted by both areas.
    pub fn intersection_len(&self, other: &OccupancyArea) -> usize {
        let (mut i, mut j, mut shared) = (0, 0, 0);
        while i < self.cells.len() && j < other.cells.len() {
            match self.cells[i].cmp(&other.cells[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    shared += 1;
                    i += 1;
                    j += 1;
                }
            }
        }
        shared
    }

    /// Number of cells painted by exactly one of the areas.
    pub fn symmetric_difference_len(&self, other: &OccupancyArea) -> usize {
        self.len() + other.len() - 2 * self.intersection_len(other)
    }

    /// `|self XOR other| / (|self| + |other|)`, in `[0, 1]`.
    ///
    /// Two empty areas are at distance 0.
    pub fn distance(&self, other: &OccupancyArea) -> f64 {
        let total = self.len() + other.len();
        if total == 0 {
            return 0.0;
        }
        self.symmetric_difference_len(other) as f64 / total as f64
    }
}
