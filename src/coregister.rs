//! # Coregistration of point data with time-dependent crustal thickness
//!
//! Entry points joining a point table to the crustal thickness raster of each
//! point's age.
//!
//! ## Overview
//! -----------------
//! * [`coregister_slice`] – one unit of work: filter the points to one time
//!   value, open and index that time's raster, join.
//! * [`coregister_all_slices`] – partition a table by age and run every slice on a
//!   fixed-size worker pool. Each slice yields its own `Result`.
//! * [`run_coregister`] – the full run: load the points, process all slices, stop
//!   on the first failing slice, then concatenate and sort.
//!
//! ## Concurrency
//! -----------------
//! Slices share nothing: every unit opens its own raster and builds a private
//! index, so they run on a `rayon` pool of `n_jobs` threads without locking.
//! Results are merged only after all units complete, in ascending age.
//!
//! ## Output order
//! -----------------
//! The final table is sorted by `label` then `age (Ma)` when a `label` column
//! exists, by `age (Ma)` alone otherwise. Labels compare numerically when every
//! label is a number, as text otherwise; empty labels go last.
//!
//! ## Example
//! -----------------
//! ```rust,no_run
//! use camino::Utf8Path;
//! use crustal_coregister::coregister::run_coregister;
//! use crustal_coregister::params::CoregisterParams;
//!
//! # fn demo() -> Result<(), crustal_coregister::CoregisterError> {
//! let params = CoregisterParams::builder().n_jobs(4).build()?;
//! let joined = run_coregister("deposits.csv", Utf8Path::new("rasters"), &params)?;
//! joined.to_csv_path(Utf8Path::new("deposits_thickness.csv"))?;
//! # Ok(()) }
//! ```
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;

use camino::Utf8Path;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::constants::{Ma, LABEL_COLUMN};
use crate::coregister_errors::CoregisterError;
use crate::params::CoregisterParams;
use crate::points::{AgeKey, PointRecord, PointSource, PointTable, TimeSlice};
use crate::spatial::join::{JoinedRecord, SpatialJoinEngine};
use crate::spatial::raster_index::RasterIndex;
use crate::stats::ThicknessColumn;

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

/// Outcome of every time slice of a run, ascending by age.
///
/// A failing slice holds its own `Err` and does not affect the others.
pub type SliceResults = BTreeMap<AgeKey, Result<Vec<JoinedRecord>, CoregisterError>>;

/// The joined dataset: input columns followed by the thickness columns.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedTable {
    headers: Vec<String>,
    records: Vec<JoinedRecord>,
}

#[derive(Debug, Clone, PartialEq, PartialOrd)]
enum LabelKey {
    Number(f64),
    Text(String),
    Missing,
}

fn label_keys(records: &[JoinedRecord], column: usize) -> Vec<LabelKey> {
    let raw: Vec<&str> = records
        .iter()
        .map(|r| r.point.fields[column].trim())
        .collect();
    let is_missing = |s: &str| s.is_empty() || s.parse::<f64>().is_ok_and(f64::is_nan);
    let numeric = raw
        .iter()
        .copied()
        .filter(|&s| !is_missing(s))
        .all(|s| s.parse::<f64>().is_ok());

    raw.into_iter()
        .map(|s| match s {
            s if is_missing(s) => LabelKey::Missing,
            s if numeric => s.parse().map_or(LabelKey::Missing, LabelKey::Number),
            s => LabelKey::Text(s.to_string()),
        })
        .collect()
}

impl JoinedTable {
    pub fn new(headers: Vec<String>, records: Vec<JoinedRecord>) -> Self {
        Self { headers, records }
    }

    /// Columns of the input table.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Every output column: the input ones, then [`ThicknessColumn::ALL`].
    pub fn output_headers(&self) -> Vec<&str> {
        self.headers
            .iter()
            .map(String::as_str)
            .chain(ThicknessColumn::ALL.iter().map(|c| c.name()))
            .collect()
    }

    pub fn records(&self) -> &[JoinedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Values of one thickness column, in row order.
    pub fn thickness_column(&self, column: ThicknessColumn) -> Vec<f64> {
        self.records
            .iter()
            .map(|r| r.thickness.get(column))
            .collect()
    }

    /// Sort by (`label`, age) when a `label` column exists, by age otherwise.
    pub fn sort_for_output(&mut self) {
        match self.headers.iter().position(|h| h == LABEL_COLUMN) {
            Some(column) => {
                let keys = label_keys(&self.records, column);
                let mut keyed: Vec<(LabelKey, JoinedRecord)> =
                    keys.into_iter().zip(self.records.drain(..)).collect();
                keyed.sort_by(|(ka, ra), (kb, rb)| {
                    ka.partial_cmp(kb)
                        .unwrap_or(Ordering::Equal)
                        .then_with(|| AgeKey(ra.point.age).cmp(&AgeKey(rb.point.age)))
                });
                self.records = keyed.into_iter().map(|(_, r)| r).collect();
            }
            None => self.records.sort_by_key(|r| AgeKey(r.point.age)),
        }
    }

    /// Write the table as comma-delimited text with a header row.
    ///
    /// Input fields are written as read; undefined thickness values are empty.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), CoregisterError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(self.output_headers())?;
        for record in &self.records {
            let derived = ThicknessColumn::ALL
                .iter()
                .map(|&c| record.thickness.field(c));
            wtr.write_record(record.point.fields.iter().cloned().chain(derived))?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn to_csv_path(&self, path: &Utf8Path) -> Result<(), CoregisterError> {
        self.write_csv(File::create(path)?)
    }
}

/// Open the raster of `slice.age` and join the slice's records against it.
fn join_time_slice(
    slice: TimeSlice,
    input_dir: &Utf8Path,
    params: &CoregisterParams,
) -> Result<Vec<JoinedRecord>, CoregisterError> {
    let index = RasterIndex::open(slice.age, input_dir, params.raster_format)?;
    let n_points = slice.records.len();
    let joined = SpatialJoinEngine::new(&index).join(slice.records, params.distance_threshold);

    let matched = joined.iter().filter(|r| r.thickness.n > 0).count();
    if params.verbose {
        info!(
            age = slice.age,
            cells = index.len(),
            points = n_points,
            matched,
            "slice joined"
        );
    } else {
        debug!(
            age = slice.age,
            cells = index.len(),
            points = n_points,
            matched,
            "slice joined"
        );
    }
    Ok(joined)
}

/// Progress bar message for the slice that just completed.
#[cfg(feature = "progress")]
fn slice_message(age: Ma, outcome: &Result<Vec<JoinedRecord>, CoregisterError>) -> String {
    match outcome {
        Ok(rows) => {
            let matched = rows.iter().filter(|r| r.thickness.n > 0).count();
            format!("{age} Ma: {matched}/{} points matched", rows.len())
        }
        Err(_) => format!("{age} Ma: failed"),
    }
}

/// Join the points of one time value to that time's raster.
///
/// Arguments
/// -----------------
/// * `time`: the time value; only records with exactly this age are kept.
/// * `input_dir`: directory holding the rasters.
/// * `records`: candidate points, possibly of several ages.
/// * `params`: search radius and raster format.
///
/// Return
/// ----------
/// * The joined records, in input order.
/// * `Err(InvalidParameter)` if `params` fails [`CoregisterParams::validate`].
/// * `Err(RasterNotFound)` / `Err(MissingAxis)` / reader errors for this slice.
pub fn coregister_slice(
    time: Ma,
    input_dir: &Utf8Path,
    records: &[PointRecord],
    params: &CoregisterParams,
) -> Result<Vec<JoinedRecord>, CoregisterError> {
    params.validate()?;
    let slice = TimeSlice {
        age: time,
        records: records
            .iter()
            .filter(|r| AgeKey(r.age) == AgeKey(time))
            .cloned()
            .collect(),
    };
    join_time_slice(slice, input_dir, params)
}

/// Run every time slice of `table` on a pool of `params.n_jobs` threads.
///
/// Return
/// ----------
/// * One entry per distinct age, each holding that slice's outcome.
/// * `Err(InvalidParameter)` if `params` fails [`CoregisterParams::validate`].
/// * `Err(ThreadPool)` if the worker pool cannot be created.
pub fn coregister_all_slices(
    table: &PointTable,
    input_dir: &Utf8Path,
    params: &CoregisterParams,
) -> Result<SliceResults, CoregisterError> {
    params.validate()?;
    let slices = table.group_by_age();
    let n_slices = slices.len();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(params.n_jobs)
        .build()?;
    debug!(
        slices = n_slices,
        threads = pool.current_num_threads(),
        "dispatching time slices"
    );

    #[cfg(feature = "progress")]
    let progress = params.verbose.then(|| {
        let pb = ProgressBar::new(n_slices as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "{bar:40.cyan/blue} {pos}/{len} slices | {elapsed_precise} ({per_sec}) \
             | ETA {eta_precise} | {msg}",
        ) {
            pb.set_style(style);
        }
        pb
    });

    let outcomes: Vec<(AgeKey, Result<Vec<JoinedRecord>, CoregisterError>)> = pool.install(|| {
        slices
            .into_par_iter()
            .map(|slice| {
                let age = slice.age;
                let outcome = join_time_slice(slice, input_dir, params);
                if let Err(e) = &outcome {
                    warn!(age, error = %e, "time slice failed");
                }

                #[cfg(feature = "progress")]
                if let Some(pb) = &progress {
                    pb.set_message(slice_message(age, &outcome));
                    pb.inc(1);
                }

                (AgeKey(age), outcome)
            })
            .collect()
    });

    #[cfg(feature = "progress")]
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    Ok(outcomes.into_iter().collect())
}

/// Join a point dataset to time-dependent crustal thickness rasters.
///
/// Arguments
/// -----------------
/// * `points`: a CSV path or an in-memory [`PointTable`].
/// * `input_dir`: directory with one raster per integer-rounded age.
/// * `params`: search radius, worker count, verbosity, raster format.
///
/// Return
/// ----------
/// * The joined table, one row per input point, sorted for output.
/// * The error of the lowest-age failing slice, if any slice fails.
pub fn run_coregister(
    points: impl Into<PointSource>,
    input_dir: &Utf8Path,
    params: &CoregisterParams,
) -> Result<JoinedTable, CoregisterError> {
    let source: PointSource = points.into();
    let table = source.load()?;
    let results = coregister_all_slices(&table, input_dir, params)?;
    let n_slices = results.len();

    let mut records = Vec::with_capacity(table.len());
    for (_, outcome) in results {
        records.extend(outcome?);
    }

    let (headers, _) = table.into_parts();
    let mut joined = JoinedTable::new(headers, records);
    joined.sort_for_output();

    info!(
        points = joined.len(),
        slices = n_slices,
        distance_threshold = params.distance_threshold,
        "coregistration complete"
    );
    Ok(joined)
}
