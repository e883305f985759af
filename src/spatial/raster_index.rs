//! # Raster index
//!
//! [`RasterIndex`] turns one [`RasterGrid`] into a queryable set of
//! `(coordinate, value)` pairs. Missing cells are dropped, the remaining
//! coordinates are converted to radians and placed on the unit sphere, and a
//! `kiddo` k-d tree is built over their Cartesian positions.
//!
//! A radius query first collects candidates whose chord length is within the
//! chord of the search angle, then keeps those whose haversine distance is
//! `<= radius` and sorts them nearest-first (ties by cell order).
//!
//! An index over an all-missing raster is empty; every query on it returns no
//! neighbors.
use std::f64::consts::PI;

use camino::Utf8Path;
use kiddo::{ImmutableKdTree, SquaredEuclidean};
use nalgebra::Vector3;
use tracing::debug;

use super::haversine;
use crate::constants::{Ma, Meter, Radian, RADEG};
use crate::coregister_errors::CoregisterError;
use crate::raster::{raster_path, RasterFormat, RasterGrid};

/// Relative slack on the chord prefilter; the haversine test is the exact one.
const CHORD_SLACK: f64 = 1e-9;

/// Cells found within the search radius of one point, nearest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NeighborResult {
    /// Positions into the index's cell list.
    pub indices: Vec<usize>,
    /// Great-circle distance of each cell, aligned with `indices`.
    pub distances: Vec<Radian>,
}

impl NeighborResult {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

pub struct RasterIndex {
    tree: Option<ImmutableKdTree<f64, 3>>,
    /// `(lat, lon)` of each valid cell, radians.
    coords: Vec<(Radian, Radian)>,
    values: Vec<Meter>,
}

impl std::fmt::Debug for RasterIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterIndex")
            .field("cells", &self.values.len())
            .finish()
    }
}

#[inline]
fn unit_vector(lat: Radian, lon: Radian) -> [f64; 3] {
    let v = Vector3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin());
    [v.x, v.y, v.z]
}

/// Squared chord length subtending `radius` on the unit sphere.
#[inline]
fn chord_squared(radius: Radian) -> f64 {
    let half = 0.5 * radius.clamp(0.0, PI);
    let chord = 2.0 * half.sin();
    chord * chord * (1.0 + CHORD_SLACK) + f64::EPSILON
}

impl RasterIndex {
    /// Index the valid cells of `grid`.
    pub fn from_grid(grid: &RasterGrid) -> Self {
        let (coords, values): (Vec<_>, Vec<_>) = grid
            .valid_cells()
            .map(|(lon, lat, v)| ((lat * RADEG, lon * RADEG), v))
            .unzip();

        let entries: Vec<[f64; 3]> = coords
            .iter()
            .map(|&(lat, lon)| unit_vector(lat, lon))
            .collect();
        let tree = (!entries.is_empty()).then(|| ImmutableKdTree::new_from_slice(&entries));

        Self {
            tree,
            coords,
            values,
        }
    }

    /// Load the raster matching `time` from `input_dir` and index it.
    ///
    /// The raster is read by [`RasterFormat::read_grid`] and dropped once indexed;
    /// no file handle stays open.
    ///
    /// Return
    /// ----------
    /// * `Err(RasterNotFound)` if the expected file is absent.
    /// * `Err(MissingAxis)` if the raster names neither `lon`/`lat` nor `x`/`y`.
    pub fn open(
        time: Ma,
        input_dir: &Utf8Path,
        format: RasterFormat,
    ) -> Result<Self, CoregisterError> {
        let path = raster_path(input_dir, time, format);
        let grid = format.read_grid(&path)?;
        let index = Self::from_grid(&grid);
        debug!(
            age = time,
            path = %path,
            grid_cells = grid.len(),
            cells = index.len(),
            "raster indexed"
        );
        Ok(index)
    }

    /// Number of indexed (non-missing) cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Thickness of an indexed cell.
    pub fn value(&self, idx: usize) -> Meter {
        self.values[idx]
    }

    /// Thickness of every cell of `neighbors`, in neighbor order.
    pub fn values_of(&self, neighbors: &NeighborResult) -> Vec<Meter> {
        neighbors.indices.iter().map(|&i| self.values[i]).collect()
    }

    /// All indexed cells within `radius` of `(lat, lon)`, nearest first.
    ///
    /// Arguments
    /// -----------------
    /// * `lat`, `lon`: query position in radians.
    /// * `radius`: search angle in radians; the boundary is inclusive.
    pub fn radius_neighbors(&self, lat: Radian, lon: Radian, radius: Radian) -> NeighborResult {
        let Some(tree) = &self.tree else {
            return NeighborResult::default();
        };

        let query = unit_vector(lat, lon);
        let mut hits: Vec<(Radian, usize)> = tree
            .within::<SquaredEuclidean>(&query, chord_squared(radius))
            .into_iter()
            .filter_map(|nn| {
                let idx = nn.item as usize;
                let (cell_lat, cell_lon) = self.coords[idx];
                let d = haversine(lat, lon, cell_lat, cell_lon);
                (d <= radius).then_some((d, idx))
            })
            .collect();
        hits.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let (distances, indices) = hits.into_iter().unzip();
        NeighborResult { indices, distances }
    }
}
