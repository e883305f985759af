#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use crustal_coregister::params::CoregisterParams;
use crustal_coregister::raster::{raster_path, RasterFormat};
use tempfile::TempDir;

/// A scratch directory holding the rasters of one test.
pub fn raster_dir() -> (TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = Utf8Path::from_path(dir.path())
        .expect("utf-8 temp dir")
        .to_owned();
    (dir, path)
}

/// Write the text raster of `time` from `(lon, lat, z)` triples.
pub fn write_cells(dir: &Utf8Path, time: f64, cells: &[(f64, f64, f64)]) -> Utf8PathBuf {
    let path = raster_path(dir, time, RasterFormat::XyzCsv);
    let mut text = String::from("lon,lat,z\n");
    for (lon, lat, z) in cells {
        text.push_str(&format!("{lon},{lat},{z}\n"));
    }
    std::fs::write(&path, text).expect("write raster");
    path
}

/// Write a regular `step`-degree grid over `[lon0, lon1] x [lat0, lat1]`.
pub fn write_grid<F>(
    dir: &Utf8Path,
    time: f64,
    (lon0, lon1): (f64, f64),
    (lat0, lat1): (f64, f64),
    step: f64,
    value: F,
) -> Utf8PathBuf
where
    F: Fn(f64, f64) -> f64,
{
    let n_lon = ((lon1 - lon0) / step).round() as usize + 1;
    let n_lat = ((lat1 - lat0) / step).round() as usize + 1;
    let cells: Vec<(f64, f64, f64)> = (0..n_lat)
        .flat_map(|i| (0..n_lon).map(move |j| (j, i)))
        .map(|(j, i)| {
            let lon = lon0 + j as f64 * step;
            let lat = lat0 + i as f64 * step;
            (lon, lat, value(lon, lat))
        })
        .collect();
    write_cells(dir, time, &cells)
}

pub fn text_params(distance_threshold: f64) -> CoregisterParams {
    CoregisterParams::builder()
        .distance_threshold(distance_threshold)
        .raster_format(RasterFormat::XyzCsv)
        .build()
        .expect("valid params")
}
