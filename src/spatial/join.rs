//! # Spatial join of one time slice
//!
//! [`SpatialJoinEngine`] runs the radius query of every point of a batch against
//! a [`RasterIndex`] and attaches the aggregated thickness to the point.
//!
//! The batch must already be restricted to the index's time value; this is not
//! re-checked here. Output rows follow input order, one per input point, and an
//! empty batch gives an empty output.
use crate::constants::{Degree, Radian, RADEG};
use crate::points::PointRecord;
use crate::spatial::raster_index::RasterIndex;
use crate::stats::ThicknessStats;

/// A point record with its derived thickness columns.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRecord {
    pub point: PointRecord,
    pub thickness: ThicknessStats,
}

pub struct SpatialJoinEngine<'a> {
    index: &'a RasterIndex,
}

impl<'a> SpatialJoinEngine<'a> {
    pub fn new(index: &'a RasterIndex) -> Self {
        Self { index }
    }

    /// Aggregate the cells within `radius` of one point given in degrees.
    pub fn query_point(&self, lon: Degree, lat: Degree, radius: Radian) -> ThicknessStats {
        let neighbors = self.index.radius_neighbors(lat * RADEG, lon * RADEG, radius);
        if neighbors.is_empty() {
            return ThicknessStats::undefined();
        }
        ThicknessStats::from_values(&self.index.values_of(&neighbors))
    }

    /// Join a batch of points sharing the index's time value.
    ///
    /// Arguments
    /// -----------------
    /// * `records`: the batch, consumed; fields are moved unchanged to the output.
    /// * `radius_degrees`: search radius in degrees of arc, `> 0`.
    ///
    /// Return
    /// ----------
    /// * One [`JoinedRecord`] per input record, same order. Points without any
    ///   cell in range get [`ThicknessStats::undefined`].
    pub fn join(&self, records: Vec<PointRecord>, radius_degrees: Degree) -> Vec<JoinedRecord> {
        debug_assert!(radius_degrees > 0.0, "search radius must be positive");
        let radius = radius_degrees * RADEG;
        records
            .into_iter()
            .map(|point| {
                let thickness = self.query_point(point.lon, point.lat, radius);
                JoinedRecord { point, thickness }
            })
            .collect()
    }
}

#[cfg(test)]
mod join_test {
    use super::*;
    use crate::points::PointTable;
    use crate::raster::RasterGrid;
    use camino::Utf8Path;

    fn single_cell_index() -> RasterIndex {
        let grid =
            RasterGrid::new(vec![0.0], vec![0.0], vec![35_000.0], Utf8Path::new("t")).unwrap();
        RasterIndex::from_grid(&grid)
    }

    #[test]
    fn test_join_single_cell() {
        let index = single_cell_index();
        let engine = SpatialJoinEngine::new(&index);
        let (_, records) =
            PointTable::from_columns(&[10.0, 10.0], &[0.01, 10.0], &[0.0, 0.0]).into_parts();

        let joined = engine.join(records, 3.0);
        assert_eq!(joined.len(), 2);

        let near = joined[0].thickness;
        assert_eq!(near.n, 1);
        assert_eq!(near.mean, 35_000.0);
        assert_eq!(near.std, 0.0);
        assert_eq!(near.range, 0.0);
        assert_eq!(joined[0].point.lon, 0.01);

        let far = joined[1].thickness;
        assert_eq!(far.n, 0);
        assert!(far.mean.is_nan());
        assert!(far.max.is_nan());
    }

    #[test]
    fn test_join_empty_batch() {
        let index = single_cell_index();
        let engine = SpatialJoinEngine::new(&index);
        assert!(engine.join(Vec::new(), 3.0).is_empty());
    }
}
