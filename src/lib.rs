//! # crustal-coregister
//!
//! Spatial-temporal join of a labeled point dataset with time-dependent crustal
//! thickness rasters. Each point is matched to the raster of its age, the raster
//! cells within a great-circle radius are collected, and their thickness is
//! summarized (mean, min, max, median, std, count, range) into new columns.
//!
//! ## Modules
//! -----------------
//! * [`points`] – point table ingestion and partitioning by age.
//! * [`raster`] – raster loading (NetCDF, XYZ text) and file naming.
//! * [`spatial`] – haversine radius index and per-slice join.
//! * [`stats`] – the derived thickness columns.
//! * [`coregister`] – parallel dispatch over time slices and output assembly.
//! * [`params`] – run configuration.
//!
//! ## Feature flags
//! -----------------
//! * `netcdf` – read `.nc` rasters through the NetCDF C library.
//! * `progress` – progress bar over time slices when `verbose` is set.
//!
//! Without `netcdf`, [`RasterFormat::default`] is [`RasterFormat::XyzCsv`].
pub mod constants;
pub mod coregister;
pub mod coregister_errors;
pub mod params;
pub mod points;
pub mod raster;
pub mod spatial;
pub mod stats;

pub use constants::{Degree, Ma, Meter, Radian, DEFAULT_DISTANCE_THRESHOLD, RADEG};
pub use coregister::{coregister_all_slices, coregister_slice, run_coregister, JoinedTable};
pub use coregister_errors::CoregisterError;
pub use params::CoregisterParams;
pub use points::{PointRecord, PointSource, PointTable};
pub use raster::{RasterFormat, RasterGrid};
pub use spatial::join::{JoinedRecord, SpatialJoinEngine};
pub use spatial::raster_index::{NeighborResult, RasterIndex};
pub use stats::{ThicknessColumn, ThicknessStats};
