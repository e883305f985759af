//! # Point table: ingestion and time partitioning
//!
//! The labeled point dataset joined against the rasters. Each row carries an age
//! (`age (Ma)`), a location (`lon`, `lat` in degrees) and any number of
//! passenger columns which are kept as raw text and written back unchanged.
//!
//! ## Sources
//! -----------------
//! * [`PointTable::from_csv_path`] / [`PointTable::from_reader`] – delimited text
//!   with a header row (read with the `csv` crate).
//! * [`PointTable::from_columns`] + [`PointTable::with_column`] – in-memory tables.
//! * [`PointSource`] – either of the above, as accepted by
//!   [`run_coregister`](crate::coregister::run_coregister).
//!
//! ## Time slices
//! -----------------
//! [`PointTable::group_by_age`] partitions the rows by **exact** age equality (no
//! rounding or tolerance; `-0.0` and `0.0` share a slice). Slices come out in
//! ascending age and keep input order inside each slice.
use std::cmp::Ordering;
use std::fs::File;
use std::io::Read;

use ahash::RandomState;
use camino::{Utf8Path, Utf8PathBuf};
use itertools::Itertools;
use std::collections::HashMap;

use crate::constants::{Degree, Ma, AGE_COLUMN, LAT_COLUMN, LON_COLUMN};
use crate::coregister_errors::CoregisterError;

/// One row of the point table.
///
/// `fields` holds every column of the row as read, in header order; `age`, `lon`
/// and `lat` are the parsed copies of the three required columns.
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    pub fields: Vec<String>,
    pub age: Ma,
    pub lon: Degree,
    pub lat: Degree,
}

/// Points sharing one age value.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSlice {
    pub age: Ma,
    pub records: Vec<PointRecord>,
}

/// Total order on ages used for grouping; `-0.0` is folded into `0.0`.
#[derive(Debug, Clone, Copy)]
pub struct AgeKey(pub Ma);

impl AgeKey {
    #[inline]
    fn normalized(self) -> f64 {
        if self.0 == 0.0 {
            0.0
        } else {
            self.0
        }
    }
}

impl PartialEq for AgeKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AgeKey {}

impl PartialOrd for AgeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AgeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.normalized().total_cmp(&other.normalized())
    }
}

/// A point dataset with its header.
#[derive(Debug, Clone, PartialEq)]
pub struct PointTable {
    headers: Vec<String>,
    records: Vec<PointRecord>,
}

/// Where to take the point dataset from.
#[derive(Debug, Clone)]
pub enum PointSource {
    Path(Utf8PathBuf),
    Table(PointTable),
}

impl From<PointTable> for PointSource {
    fn from(table: PointTable) -> Self {
        PointSource::Table(table)
    }
}

impl From<&Utf8Path> for PointSource {
    fn from(path: &Utf8Path) -> Self {
        PointSource::Path(path.to_owned())
    }
}

impl From<Utf8PathBuf> for PointSource {
    fn from(path: Utf8PathBuf) -> Self {
        PointSource::Path(path)
    }
}

impl From<&str> for PointSource {
    fn from(path: &str) -> Self {
        PointSource::Path(Utf8PathBuf::from(path))
    }
}

impl PointSource {
    /// Materialize the table, reading it from disk if needed.
    pub fn load(self) -> Result<PointTable, CoregisterError> {
        match self {
            PointSource::Path(path) => PointTable::from_csv_path(&path),
            PointSource::Table(table) => Ok(table),
        }
    }
}

/// Position of a required column in the header.
fn column_index(
    lookup: &HashMap<&str, usize, RandomState>,
    name: &str,
) -> Result<usize, CoregisterError> {
    lookup
        .get(name)
        .copied()
        .ok_or_else(|| CoregisterError::MissingColumn(name.to_string()))
}

/// Parse a required numeric field; non-finite values are rejected.
fn parse_coordinate(raw: &str, row: usize, column: &str) -> Result<f64, CoregisterError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(CoregisterError::InvalidPointValue {
            row,
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}

impl PointTable {
    /// Build a table from a header and raw rows, parsing the required columns.
    ///
    /// Arguments
    /// -----------------
    /// * `headers`: column names; must contain `age (Ma)`, `lon` and `lat`.
    /// * `rows`: raw fields of each row, in header order.
    ///
    /// Return
    /// ----------
    /// * `Err(MissingColumn)` when a required column is absent.
    /// * `Err(InvalidPointValue)` when an age/lon/lat field is not a finite number.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, CoregisterError> {
        let lookup: HashMap<&str, usize, RandomState> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), i))
            .collect();
        let age_idx = column_index(&lookup, AGE_COLUMN)?;
        let lon_idx = column_index(&lookup, LON_COLUMN)?;
        let lat_idx = column_index(&lookup, LAT_COLUMN)?;

        let records = rows
            .into_iter()
            .enumerate()
            .map(|(row, fields)| {
                if fields.len() != headers.len() {
                    return Err(CoregisterError::InvalidParameter(format!(
                        "row {row} has {} fields, header has {}",
                        fields.len(),
                        headers.len()
                    )));
                }
                Ok(PointRecord {
                    age: parse_coordinate(&fields[age_idx], row, AGE_COLUMN)?,
                    lon: parse_coordinate(&fields[lon_idx], row, LON_COLUMN)?,
                    lat: parse_coordinate(&fields[lat_idx], row, LAT_COLUMN)?,
                    fields,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { headers, records })
    }

    /// Read a delimited text file with a header row.
    pub fn from_csv_path(path: &Utf8Path) -> Result<Self, CoregisterError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Read comma-delimited text with a header row from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CoregisterError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);
        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let rows = rdr
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;
        Self::new(headers, rows)
    }

    /// Build a table holding only the three required columns.
    ///
    /// Panics
    /// ----------
    /// * If the three slices do not share the same length.
    pub fn from_columns(age: &[Ma], lon: &[Degree], lat: &[Degree]) -> Self {
        assert!(
            age.len() == lon.len() && lon.len() == lat.len(),
            "age, lon and lat must have the same length"
        );
        let headers = vec![
            AGE_COLUMN.to_string(),
            LON_COLUMN.to_string(),
            LAT_COLUMN.to_string(),
        ];
        let records = age
            .iter()
            .zip(lon)
            .zip(lat)
            .map(|((&age, &lon), &lat)| PointRecord {
                fields: vec![age.to_string(), lon.to_string(), lat.to_string()],
                age,
                lon,
                lat,
            })
            .collect();
        Self { headers, records }
    }

    /// Append a passenger column.
    ///
    /// Return
    /// ----------
    /// * `Err(InvalidParameter)` if the name already exists or the value count
    ///   does not match the number of rows.
    pub fn with_column<I, T>(mut self, name: &str, values: I) -> Result<Self, CoregisterError>
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        if self.headers.iter().any(|h| h == name) {
            return Err(CoregisterError::InvalidParameter(format!(
                "column '{name}' already exists"
            )));
        }
        let values: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
        if values.len() != self.records.len() {
            return Err(CoregisterError::InvalidParameter(format!(
                "column '{name}' has {} values for {} rows",
                values.len(),
                self.records.len()
            )));
        }
        self.headers.push(name.to_string());
        for (record, value) in self.records.iter_mut().zip(values) {
            record.fields.push(value);
        }
        Ok(self)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[PointRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Position of a column in the header, if present.
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Split the table into time slices, ascending by age.
    pub fn group_by_age(&self) -> Vec<TimeSlice> {
        self.records
            .iter()
            .sorted_by_key(|r| AgeKey(r.age))
            .chunk_by(|r| AgeKey(r.age))
            .into_iter()
            .map(|(key, group)| TimeSlice {
                age: key.normalized(),
                records: group.cloned().collect(),
            })
            .collect()
    }

    /// Consume the table, returning the header and records.
    pub fn into_parts(self) -> (Vec<String>, Vec<PointRecord>) {
        (self.headers, self.records)
    }
}
