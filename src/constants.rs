//! # Constants and type definitions for crustal-coregister
//!
//! This module centralizes the **unit conversions**, **default parameters**, and
//! **naming conventions** shared by the raster loader, the spatial index and the
//! orchestration layer.
//!
//! ## Overview
//!
//! - Degrees ↔ radians conversion
//! - Core type aliases (angles, lengths, geological time)
//! - Column names of the point table
//! - File naming convention of the crustal thickness rasters

// -------------------------------------------------------------------------------------------------
// Unit conversions
// -------------------------------------------------------------------------------------------------

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Length in meters (native unit of the thickness rasters)
pub type Meter = f64;
/// Geological time in millions of years
pub type Ma = f64;

// -------------------------------------------------------------------------------------------------
// Defaults
// -------------------------------------------------------------------------------------------------

/// Default search radius, in degrees of arc.
pub const DEFAULT_DISTANCE_THRESHOLD: Degree = 3.0;

/// Default number of worker threads (sequential).
pub const DEFAULT_N_JOBS: usize = 1;

// -------------------------------------------------------------------------------------------------
// Point table columns
// -------------------------------------------------------------------------------------------------

/// Time-partition key of the point table.
pub const AGE_COLUMN: &str = "age (Ma)";
/// Longitude column (degrees).
pub const LON_COLUMN: &str = "lon";
/// Latitude column (degrees).
pub const LAT_COLUMN: &str = "lat";
/// Optional passenger column used as primary sort key of the output.
pub const LABEL_COLUMN: &str = "label";

// -------------------------------------------------------------------------------------------------
// Raster naming
// -------------------------------------------------------------------------------------------------

/// File name prefix of a crustal thickness raster.
pub const RASTER_PREFIX: &str = "crustal_thickness_";
/// File name suffix placed right after the rounded time value.
pub const RASTER_TIME_SUFFIX: &str = "Ma";
/// Name of the 2D value grid inside a raster.
pub const RASTER_VALUE_VARIABLE: &str = "z";
