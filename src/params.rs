//! # Coregistration parameters
//!
//! [`CoregisterParams`] gathers every knob of a coregistration run in one explicit
//! value passed to the entry points of [`crate::coregister`]. There is no
//! module-level mutable state: defaults live in [`Default`] and custom values go
//! through the validating [`CoregisterParamsBuilder`].
//!
//! ```rust
//! use crustal_coregister::params::CoregisterParams;
//! use crustal_coregister::raster::RasterFormat;
//!
//! # fn demo() -> Result<(), crustal_coregister::CoregisterError> {
//! let params = CoregisterParams::builder()
//!     .distance_threshold(1.5)
//!     .n_jobs(4)
//!     .raster_format(RasterFormat::XyzCsv)
//!     .build()?;
//! assert_eq!(params.n_jobs, 4);
//! # Ok(()) }
//! ```
use crate::constants::{Degree, DEFAULT_DISTANCE_THRESHOLD, DEFAULT_N_JOBS};
use crate::coregister_errors::CoregisterError;
use crate::raster::RasterFormat;

/// Parameters of a coregistration run.
///
/// Fields
/// -----------------
/// * `distance_threshold` – search radius in **degrees of arc** (default `3.0`).
/// * `n_jobs` – size of the worker pool. `1` runs sequentially, `0` uses every
///   available core.
/// * `verbose` – raise per-slice log events to `INFO` and, with the `progress`
///   feature, draw a progress bar.
/// * `raster_format` – on-disk format of the rasters, which also fixes their
///   file extension. Defaults to NetCDF with the `netcdf` feature, XYZ text
///   otherwise.
///
/// The fields are public; the entry points of [`crate::coregister`] run
/// [`CoregisterParams::validate`] again, so a value assembled without the builder
/// is still checked.
#[derive(Debug, Clone, PartialEq)]
pub struct CoregisterParams {
    pub distance_threshold: Degree,
    pub n_jobs: usize,
    pub verbose: bool,
    pub raster_format: RasterFormat,
}

impl Default for CoregisterParams {
    fn default() -> Self {
        Self {
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
            n_jobs: DEFAULT_N_JOBS,
            verbose: false,
            raster_format: RasterFormat::default(),
        }
    }
}

impl CoregisterParams {
    /// Equivalent to [`CoregisterParams::default()`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fluent builder initialized with the default values.
    pub fn builder() -> CoregisterParamsBuilder {
        CoregisterParamsBuilder::new()
    }

    /// Check the value rules: `distance_threshold` must be finite and `> 0`.
    pub fn validate(&self) -> Result<(), CoregisterError> {
        let radius = self.distance_threshold;
        if !(radius.is_finite() && radius > 0.0) {
            return Err(CoregisterError::InvalidParameter(format!(
                "distance_threshold must be finite and > 0 (got {radius})"
            )));
        }
        Ok(())
    }
}

/// Builder for [`CoregisterParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct CoregisterParamsBuilder {
    params: CoregisterParams,
}

impl CoregisterParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: CoregisterParams::default(),
        }
    }

    pub fn distance_threshold(mut self, v: Degree) -> Self {
        self.params.distance_threshold = v;
        self
    }
    pub fn n_jobs(mut self, v: usize) -> Self {
        self.params.n_jobs = v;
        self
    }
    pub fn verbose(mut self, v: bool) -> Self {
        self.params.verbose = v;
        self
    }
    pub fn raster_format(mut self, v: RasterFormat) -> Self {
        self.params.raster_format = v;
        self
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * `distance_threshold` must be finite and strictly positive (NaN is rejected).
    ///
    /// Returns
    /// -----------------
    /// * `Ok(CoregisterParams)` when every rule holds.
    /// * `Err(CoregisterError::InvalidParameter)` otherwise.
    pub fn build(self) -> Result<CoregisterParams, CoregisterError> {
        self.params.validate()?;
        Ok(self.params)
    }
}
