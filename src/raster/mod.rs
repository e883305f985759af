//! # Crustal thickness rasters
//!
//! Loading of one time slice of the crustal thickness model as a regular
//! longitude/latitude grid.
//!
//! ## Data model
//! -----------------
//! A [`RasterGrid`] is a 2D grid of scalar thickness values (meters) indexed by a
//! 1D longitude axis and a 1D latitude axis. Values are stored row-major with the
//! latitude as the slow axis: cell `(i, j)` sits at `(lons[j], lats[i])`. NaN marks
//! a missing cell.
//!
//! ## File naming
//! -----------------
//! The raster of time `t` lives at `<input_dir>/crustal_thickness_<t>Ma.<ext>`,
//! where `<t>` is `t` rounded to zero decimal places (see [`raster_path`]).
//! [`available_raster_times`] lists the times present in a directory.
//!
//! ## Axis names
//! -----------------
//! Rasters name their axes either `lon`/`lat` or `x`/`y`. Each axis is resolved by
//! trying the names of [`LON_AXIS`] / [`LAT_AXIS`] in order; if none exists the
//! reader fails with [`CoregisterError::MissingAxis`].
//!
//! ## Formats
//! -----------------
//! * [`RasterFormat::NetCdf`] (`.nc`) – needs the `netcdf` cargo feature.
//! * [`RasterFormat::XyzCsv`] (`.csv`) – `lon,lat,z` (or `x,y,z`) text triples.
//!
//! [`RasterFormat::default`] is NetCDF only when the `netcdf` feature is on, so a
//! default build never picks a format it cannot read.
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;

use crate::constants::{Degree, Ma, Meter, RASTER_PREFIX, RASTER_TIME_SUFFIX};
use crate::coregister_errors::CoregisterError;

#[cfg(feature = "netcdf")]
mod netcdf_reader;
mod xyz_reader;

/// Ordered candidate names of one coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisCandidates {
    pub axis: &'static str,
    pub names: &'static [&'static str],
}

impl AxisCandidates {
    /// Return the first candidate accepted by `exists`.
    pub fn resolve<F>(&self, path: &Utf8Path, exists: F) -> Result<&'static str, CoregisterError>
    where
        F: Fn(&str) -> bool,
    {
        self.names
            .iter()
            .copied()
            .find(|name| exists(name))
            .ok_or_else(|| CoregisterError::MissingAxis {
                axis: self.axis,
                tried: self.names.join(", "),
                path: path.to_string(),
            })
    }
}

pub const LON_AXIS: AxisCandidates = AxisCandidates {
    axis: "longitude",
    names: &["lon", "x"],
};

pub const LAT_AXIS: AxisCandidates = AxisCandidates {
    axis: "latitude",
    names: &["lat", "y"],
};

/// A regular longitude/latitude grid of thickness values.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterGrid {
    lons: Vec<Degree>,
    lats: Vec<Degree>,
    values: Vec<Meter>,
}

impl RasterGrid {
    /// Assemble a grid, checking that `values` holds `lats.len() * lons.len()` cells.
    ///
    /// Only the cell count can be checked here; readers that know the dimension
    /// order of their value array must check it themselves.
    pub fn new(
        lons: Vec<Degree>,
        lats: Vec<Degree>,
        values: Vec<Meter>,
        path: &Utf8Path,
    ) -> Result<Self, CoregisterError> {
        if values.len() != lons.len() * lats.len() {
            return Err(CoregisterError::RasterShapeMismatch {
                path: path.to_string(),
                expected: vec![lats.len(), lons.len()],
                found: vec![values.len()],
            });
        }
        Ok(Self { lons, lats, values })
    }

    pub fn lons(&self) -> &[Degree] {
        &self.lons
    }

    pub fn lats(&self) -> &[Degree] {
        &self.lats
    }

    pub fn values(&self) -> &[Meter] {
        &self.values
    }

    /// Number of cells, missing ones included.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate the full coordinate mesh as `(lon, lat, value)`, row-major.
    pub fn mesh(&self) -> impl Iterator<Item = (Degree, Degree, Meter)> + '_ {
        let n_lon = self.lons.len();
        self.values.iter().enumerate().map(move |(k, &v)| {
            let (i, j) = (k / n_lon, k % n_lon);
            (self.lons[j], self.lats[i], v)
        })
    }

    /// Iterate the non-missing cells as `(lon, lat, value)`.
    pub fn valid_cells(&self) -> impl Iterator<Item = (Degree, Degree, Meter)> + '_ {
        self.mesh().filter(|(_, _, v)| !v.is_nan())
    }
}

/// On-disk format of the rasters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RasterFormat {
    NetCdf,
    XyzCsv,
}

impl Default for RasterFormat {
    /// NetCDF when the crate is built with the `netcdf` feature, XYZ text otherwise.
    fn default() -> Self {
        if cfg!(feature = "netcdf") {
            RasterFormat::NetCdf
        } else {
            RasterFormat::XyzCsv
        }
    }
}

impl RasterFormat {
    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            RasterFormat::NetCdf => "nc",
            RasterFormat::XyzCsv => "csv",
        }
    }

    /// Read one raster file. No file handle outlives this call.
    ///
    /// Return
    /// ----------
    /// * `Err(RasterNotFound)` if `path` does not exist.
    /// * `Err(MissingAxis)` if neither naming convention resolves an axis.
    /// * Format-specific errors otherwise.
    pub fn read_grid(self, path: &Utf8Path) -> Result<RasterGrid, CoregisterError> {
        if !path.is_file() {
            return Err(CoregisterError::RasterNotFound(path.to_string()));
        }
        match self {
            RasterFormat::XyzCsv => xyz_reader::read_xyz_grid(path),
            #[cfg(feature = "netcdf")]
            RasterFormat::NetCdf => netcdf_reader::read_netcdf_grid(path),
            #[cfg(not(feature = "netcdf"))]
            RasterFormat::NetCdf => Err(CoregisterError::RasterFormatUnavailable(
                "netcdf (enable the `netcdf` feature)".into(),
            )),
        }
    }
}

/// File name of the raster matching `time`: `crustal_thickness_{time:.0}Ma.<ext>`.
pub fn raster_file_name(time: Ma, format: RasterFormat) -> String {
    format!(
        "{RASTER_PREFIX}{time:.0}{RASTER_TIME_SUFFIX}.{}",
        format.extension()
    )
}

/// Full path of the raster matching `time` inside `input_dir`.
pub fn raster_path(input_dir: &Utf8Path, time: Ma, format: RasterFormat) -> Utf8PathBuf {
    input_dir.join(raster_file_name(time, format))
}

/// List the integer times for which `input_dir` holds a raster of `format`.
///
/// Return
/// ----------
/// * Sorted, deduplicated times.
/// * `Err(IoError)` if the directory cannot be read.
pub fn available_raster_times(
    input_dir: &Utf8Path,
    format: RasterFormat,
) -> Result<Vec<i64>, CoregisterError> {
    let pattern = format!(
        r"^{}(-?\d+){}\.{}$",
        regex::escape(RASTER_PREFIX),
        regex::escape(RASTER_TIME_SUFFIX),
        regex::escape(format.extension())
    );
    let re = Regex::new(&pattern)
        .map_err(|e| CoregisterError::InvalidParameter(format!("raster name pattern: {e}")))?;

    let mut times = Vec::new();
    for entry in input_dir.read_dir_utf8()? {
        let entry = entry?;
        if let Some(t) = re
            .captures(entry.file_name())
            .and_then(|caps| caps[1].parse::<i64>().ok())
        {
            times.push(t);
        }
    }
    times.sort_unstable();
    times.dedup();
    Ok(times)
}

#[cfg(test)]
mod raster_test {
    use super::*;

    #[test]
    fn test_raster_file_name_rounds_time() {
        assert_eq!(
            raster_file_name(10.0, RasterFormat::NetCdf),
            "crustal_thickness_10Ma.nc"
        );
        assert_eq!(
            raster_file_name(9.6, RasterFormat::XyzCsv),
            "crustal_thickness_10Ma.csv"
        );
        assert_eq!(
            raster_file_name(0.2, RasterFormat::NetCdf),
            "crustal_thickness_0Ma.nc"
        );
        assert_eq!(
            raster_path(Utf8Path::new("rasters"), 120.0, RasterFormat::NetCdf),
            Utf8PathBuf::from("rasters/crustal_thickness_120Ma.nc")
        );
    }

    #[test]
    fn test_default_format_is_readable() {
        let expected = if cfg!(feature = "netcdf") {
            RasterFormat::NetCdf
        } else {
            RasterFormat::XyzCsv
        };
        assert_eq!(RasterFormat::default(), expected);
    }

    #[test]
    fn test_grid_shape_is_checked() {
        let path = Utf8Path::new("grid.csv");
        let err = RasterGrid::new(vec![0.0, 1.0], vec![0.0], vec![1.0], path).unwrap_err();
        assert_eq!(
            err,
            CoregisterError::RasterShapeMismatch {
                path: "grid.csv".into(),
                expected: vec![1, 2],
                found: vec![1],
            }
        );
    }

    #[test]
    fn test_mesh_is_row_major_by_latitude() {
        let grid = RasterGrid::new(
            vec![0.0, 1.0, 2.0],
            vec![10.0, 20.0],
            vec![1.0, f64::NAN, 3.0, 4.0, 5.0, 6.0],
            Utf8Path::new("grid"),
        )
        .unwrap();
        let mesh: Vec<_> = grid.mesh().collect();
        assert_eq!(mesh[0], (0.0, 10.0, 1.0));
        assert_eq!(mesh[2], (2.0, 10.0, 3.0));
        assert_eq!(mesh[4], (1.0, 20.0, 5.0));
        assert_eq!(grid.valid_cells().count(), 5);
    }

    #[test]
    fn test_axis_resolution_order() {
        let path = Utf8Path::new("r.nc");
        assert_eq!(LON_AXIS.resolve(path, |n| n == "x" || n == "lon"), Ok("lon"));
        assert_eq!(LAT_AXIS.resolve(path, |n| n == "y"), Ok("y"));
        assert_eq!(
            LAT_AXIS.resolve(path, |_| false),
            Err(CoregisterError::MissingAxis {
                axis: "latitude",
                tried: "lat, y".into(),
                path: "r.nc".into()
            })
        );
    }

    #[test]
    fn test_missing_raster() {
        let err = RasterFormat::XyzCsv
            .read_grid(Utf8Path::new("does/not/exist.csv"))
            .unwrap_err();
        assert_eq!(
            err,
            CoregisterError::RasterNotFound("does/not/exist.csv".into())
        );
    }

    #[test]
    fn test_available_raster_times() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        for name in [
            "crustal_thickness_10Ma.csv",
            "crustal_thickness_0Ma.csv",
            "crustal_thickness_20Ma.nc",
            "crustal_thickness_xMa.csv",
            "notes.txt",
        ] {
            std::fs::write(root.join(name), "").unwrap();
        }
        assert_eq!(
            available_raster_times(root, RasterFormat::XyzCsv).unwrap(),
            vec![0, 10]
        );
        assert_eq!(
            available_raster_times(root, RasterFormat::NetCdf).unwrap(),
            vec![20]
        );
    }
}
