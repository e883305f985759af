//! # Great-circle spatial join
//!
//! * [`raster_index`] – nearest-neighbor index over the valid cells of one raster.
//! * [`join`] – radius query and aggregation for a batch of points.
//!
//! All distances are great-circle angles on the unit sphere, computed with the
//! haversine formula on `(latitude, longitude)` pairs in radians. A planar
//! threshold in degrees would stretch the search area in longitude away from the
//! equator.
use crate::constants::Radian;

pub mod join;
pub mod raster_index;

/// Great-circle angle between two points given as `(lat, lon)` in radians.
#[inline]
pub fn haversine(lat1: Radian, lon1: Radian, lat2: Radian, lon2: Radian) -> Radian {
    let sin_dlat = ((lat2 - lat1) * 0.5).sin();
    let sin_dlon = ((lon2 - lon1) * 0.5).sin();
    let a = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    2.0 * a.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod haversine_test {
    use super::*;
    use crate::constants::RADEG;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_haversine_known_angles() {
        assert_eq!(haversine(0.0, 0.0, 0.0, 0.0), 0.0);
        assert_relative_eq!(haversine(0.0, 0.0, 0.0, 10.0 * RADEG), 10.0 * RADEG, epsilon = 1e-12);
        assert_relative_eq!(haversine(0.0, 0.0, FRAC_PI_2, 0.0), FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(haversine(0.0, 0.0, 0.0, PI), PI, epsilon = 1e-12);
    }

    #[test]
    fn test_longitude_shrinks_with_latitude() {
        let one_deg_at_equator = haversine(0.0, 0.0, 0.0, RADEG);
        let one_deg_at_60 = haversine(60.0 * RADEG, 0.0, 60.0 * RADEG, RADEG);
        assert_relative_eq!(one_deg_at_60 / one_deg_at_equator, 0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_wraps_across_antimeridian() {
        let d = haversine(0.0, 179.5 * RADEG, 0.0, -179.5 * RADEG);
        assert_relative_eq!(d, RADEG, epsilon = 1e-12);
    }
}
