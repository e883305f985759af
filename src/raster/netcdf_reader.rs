//! NetCDF rasters (`z` grid plus `lon`/`lat` or `x`/`y` coordinate variables).
//!
//! `z` must be laid out `(lat, lon)`. Its values are decoded the CF way:
//! cells equal to `_FillValue` or to any `missing_value` become NaN, then
//! `scale_factor` and `add_offset` are applied to the rest.
use camino::Utf8Path;
use netcdf::AttributeValue;

use super::{AxisCandidates, RasterGrid, LAT_AXIS, LON_AXIS};
use crate::constants::RASTER_VALUE_VARIABLE;
use crate::coregister_errors::CoregisterError;

fn missing_variable(name: &str, path: &Utf8Path) -> CoregisterError {
    CoregisterError::MissingVariable {
        name: name.to_string(),
        path: path.to_string(),
    }
}

/// Resolve one coordinate variable and read it.
fn read_axis(
    file: &netcdf::File,
    candidates: AxisCandidates,
    path: &Utf8Path,
) -> Result<(&'static str, Vec<f64>), CoregisterError> {
    let name = candidates.resolve(path, |n| file.variable(n).is_some())?;
    let var = file
        .variable(name)
        .ok_or_else(|| missing_variable(name, path))?;
    Ok((name, var.get_values::<f64, _>(..)?))
}

/// Numeric attribute as a list of `f64`, whatever its stored type.
fn numeric_attribute(var: &netcdf::Variable<'_>, name: &str) -> Option<Vec<f64>> {
    let values = match var.attribute(name)?.value().ok()? {
        AttributeValue::Double(v) => vec![v],
        AttributeValue::Doubles(v) => v,
        AttributeValue::Float(v) => vec![f64::from(v)],
        AttributeValue::Floats(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Int(v) => vec![f64::from(v)],
        AttributeValue::Ints(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Short(v) => vec![f64::from(v)],
        AttributeValue::Shorts(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Ushort(v) => vec![f64::from(v)],
        AttributeValue::Uint(v) => vec![f64::from(v)],
        AttributeValue::Schar(v) => vec![f64::from(v)],
        AttributeValue::Uchar(v) => vec![f64::from(v)],
        _ => return None,
    };
    Some(values)
}

/// Check that `z` is `(lat, lon)` with the lengths of the coordinate axes.
fn check_dimensions(
    z: &netcdf::Variable<'_>,
    (lon_name, n_lon): (&str, usize),
    (lat_name, n_lat): (&str, usize),
    path: &Utf8Path,
) -> Result<(), CoregisterError> {
    let dims = z.dimensions();
    let found: Vec<usize> = dims.iter().map(|d| d.len()).collect();
    let expected = vec![n_lat, n_lon];
    if found != expected {
        return Err(CoregisterError::RasterShapeMismatch {
            path: path.to_string(),
            expected,
            found,
        });
    }

    let names: Vec<String> = dims.iter().map(|d| d.name()).collect();
    if names[0] == lon_name || names[1] == lat_name {
        return Err(CoregisterError::RasterDimensionOrder {
            path: path.to_string(),
            found: names.join(", "),
        });
    }
    Ok(())
}

/// Mask fill and missing values, then unpack.
fn decode(values: &mut [f64], z: &netcdf::Variable<'_>) {
    let mut masked = numeric_attribute(z, "_FillValue").unwrap_or_default();
    masked.extend(numeric_attribute(z, "missing_value").unwrap_or_default());
    let first = |name: &str| numeric_attribute(z, name).and_then(|v| v.first().copied());
    let scale = first("scale_factor").unwrap_or(1.0);
    let offset = first("add_offset").unwrap_or(0.0);

    for v in values.iter_mut() {
        let raw = *v;
        *v = if masked.contains(&raw) {
            f64::NAN
        } else {
            raw * scale + offset
        };
    }
}

pub(super) fn read_netcdf_grid(path: &Utf8Path) -> Result<RasterGrid, CoregisterError> {
    // The file is closed when `file` drops at the end of this function.
    let file = netcdf::open(path)?;

    let (lon_name, lons) = read_axis(&file, LON_AXIS, path)?;
    let (lat_name, lats) = read_axis(&file, LAT_AXIS, path)?;

    let z = file
        .variable(RASTER_VALUE_VARIABLE)
        .ok_or_else(|| missing_variable(RASTER_VALUE_VARIABLE, path))?;
    check_dimensions(&z, (lon_name, lons.len()), (lat_name, lats.len()), path)?;

    let mut values: Vec<f64> = z.get_values::<f64, _>(..)?;
    decode(&mut values, &z);

    RasterGrid::new(lons, lats, values, path)
}
