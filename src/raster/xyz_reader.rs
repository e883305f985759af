//! Text rasters made of `lon,lat,z` triples.
//!
//! The header names the columns: `lon`/`lat` or `x`/`y` for the coordinates and
//! `z` for the value. The grid axes are the sorted unique coordinates found in the
//! file; cells absent from the file, empty values and `NaN` are missing.
use std::cmp::Ordering;
use std::fs::File;

use camino::Utf8Path;

use super::{RasterGrid, LAT_AXIS, LON_AXIS};
use crate::constants::RASTER_VALUE_VARIABLE;
use crate::coregister_errors::CoregisterError;

fn sorted_axis(mut coords: Vec<f64>) -> Vec<f64> {
    coords.sort_unstable_by(f64::total_cmp);
    coords.dedup_by(|a, b| a.total_cmp(b) == Ordering::Equal);
    coords
}

fn axis_position(axis: &[f64], value: f64) -> usize {
    // Every coordinate comes from the axis itself, so the lookup cannot miss.
    axis.binary_search_by(|c| c.total_cmp(&value))
        .unwrap_or_else(|i| i)
}

fn parse_field(raw: &str, line: u64, path: &Utf8Path) -> Result<f64, CoregisterError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>().map_err(|_| {
        CoregisterError::RasterParse(format!("{path}: invalid number '{raw}' at line {line}"))
    })
}

pub(super) fn read_xyz_grid(path: &Utf8Path) -> Result<RasterGrid, CoregisterError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(File::open(path)?);

    let headers = rdr.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h == name);

    let lon_name = LON_AXIS.resolve(path, |n| position(n).is_some())?;
    let lat_name = LAT_AXIS.resolve(path, |n| position(n).is_some())?;
    let (lon_col, lat_col) = (
        position(lon_name).unwrap_or_default(),
        position(lat_name).unwrap_or_default(),
    );
    let z_col = position(RASTER_VALUE_VARIABLE).ok_or_else(|| CoregisterError::MissingVariable {
        name: RASTER_VALUE_VARIABLE.to_string(),
        path: path.to_string(),
    })?;

    let mut triples = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let field = |col: usize| record.get(col).unwrap_or("");

        let lon = parse_field(field(lon_col), line, path)?;
        let lat = parse_field(field(lat_col), line, path)?;
        if !lon.is_finite() || !lat.is_finite() {
            return Err(CoregisterError::RasterParse(format!(
                "{path}: missing coordinate at line {line}"
            )));
        }
        triples.push((lon, lat, parse_field(field(z_col), line, path)?));
    }

    let lons = sorted_axis(triples.iter().map(|t| t.0).collect());
    let lats = sorted_axis(triples.iter().map(|t| t.1).collect());

    let mut values = vec![f64::NAN; lons.len() * lats.len()];
    let mut seen = vec![false; values.len()];
    for (lon, lat, z) in triples {
        let k = axis_position(&lats, lat) * lons.len() + axis_position(&lons, lon);
        if std::mem::replace(&mut seen[k], true) {
            return Err(CoregisterError::RasterParse(format!(
                "{path}: duplicate cell at lon={lon}, lat={lat}"
            )));
        }
        values[k] = z;
    }

    RasterGrid::new(lons, lats, values, path)
}

#[cfg(test)]
mod xyz_reader_test {
    use super::*;

    fn write_raster(content: &str) -> (tempfile::TempDir, camino::Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8Path::from_path(dir.path()).unwrap().join("raster.csv");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_read_lon_lat_grid() {
        let (_dir, path) = write_raster("lon,lat,z\n1,0,11\n0,0,10\n0,1,20\n1,1,\n");
        let grid = read_xyz_grid(&path).unwrap();
        assert_eq!(grid.lons(), [0.0, 1.0]);
        assert_eq!(grid.lats(), [0.0, 1.0]);
        assert_eq!(&grid.values()[..3], [10.0, 11.0, 20.0]);
        assert!(grid.values()[3].is_nan());
    }

    #[test]
    fn test_read_x_y_grid_with_holes() {
        let (_dir, path) = write_raster("x,y,z\n0,0,1\n2,5,NaN\n");
        let grid = read_xyz_grid(&path).unwrap();
        assert_eq!(grid.len(), 4);
        assert_eq!(grid.valid_cells().count(), 1);
    }

    #[test]
    fn test_missing_axis() {
        let (_dir, path) = write_raster("lon,northing,z\n0,0,1\n");
        let err = read_xyz_grid(&path).unwrap_err();
        assert_eq!(
            err,
            CoregisterError::MissingAxis {
                axis: "latitude",
                tried: "lat, y".into(),
                path: path.to_string()
            }
        );
    }

    #[test]
    fn test_missing_value_column() {
        let (_dir, path) = write_raster("lon,lat,thickness\n0,0,1\n");
        let err = read_xyz_grid(&path).unwrap_err();
        assert!(matches!(err, CoregisterError::MissingVariable { .. }));
    }

    #[test]
    fn test_duplicate_cell() {
        let (_dir, path) = write_raster("lon,lat,z\n0,0,1\n0,0,2\n");
        let err = read_xyz_grid(&path).unwrap_err();
        assert!(matches!(err, CoregisterError::RasterParse(_)));
    }

    #[test]
    fn test_header_only_is_empty_grid() {
        let (_dir, path) = write_raster("lon,lat,z\n");
        let grid = read_xyz_grid(&path).unwrap();
        assert!(grid.is_empty());
    }
}
