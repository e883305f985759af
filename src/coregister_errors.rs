use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoregisterError {
    #[error("Crustal thickness raster not found at: {0}")]
    RasterNotFound(String),

    #[error("No {axis} axis in raster {path} (tried: {tried})")]
    MissingAxis {
        axis: &'static str,
        tried: String,
        path: String,
    },

    #[error("Variable '{name}' not found in raster {path}")]
    MissingVariable { name: String, path: String },

    #[error("Raster {path}: value shape {found:?}, expected {expected:?} (n_lat, n_lon)")]
    RasterShapeMismatch {
        path: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("Raster {path}: value dimensions ({found}) are not ordered (lat, lon)")]
    RasterDimensionOrder { path: String, found: String },

    #[error("Unable to parse raster: {0}")]
    RasterParse(String),

    #[error("Raster format not available in this build: {0}")]
    RasterFormatUnavailable(String),

    #[cfg(feature = "netcdf")]
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Column not found in point table: {0}")]
    MissingColumn(String),

    #[error("Invalid value '{value}' in column '{column}' at row {row}")]
    InvalidPointValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Invalid coregistration parameter: {0}")]
    InvalidParameter(String),

    #[error("Unable to build the worker pool: {0}")]
    ThreadPool(String),
}

impl From<rayon::ThreadPoolBuildError> for CoregisterError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        CoregisterError::ThreadPool(err.to_string())
    }
}

impl PartialEq for CoregisterError {
    fn eq(&self, other: &Self) -> bool {
        use CoregisterError::*;
        match (self, other) {
            (RasterNotFound(a), RasterNotFound(b)) => a == b,
            (
                MissingAxis {
                    axis: a1,
                    tried: t1,
                    path: p1,
                },
                MissingAxis {
                    axis: a2,
                    tried: t2,
                    path: p2,
                },
            ) => a1 == a2 && t1 == t2 && p1 == p2,
            (MissingVariable { name: n1, path: p1 }, MissingVariable { name: n2, path: p2 }) => {
                n1 == n2 && p1 == p2
            }
            (
                RasterShapeMismatch {
                    path: p1,
                    expected: e1,
                    found: f1,
                },
                RasterShapeMismatch {
                    path: p2,
                    expected: e2,
                    found: f2,
                },
            ) => p1 == p2 && e1 == e2 && f1 == f2,
            (
                RasterDimensionOrder { path: p1, found: f1 },
                RasterDimensionOrder { path: p2, found: f2 },
            ) => p1 == p2 && f1 == f2,
            (RasterParse(a), RasterParse(b)) => a == b,
            (RasterFormatUnavailable(a), RasterFormatUnavailable(b)) => a == b,

            // Foreign errors are not comparable: equal when the variant matches
            #[cfg(feature = "netcdf")]
            (NetCdf(_), NetCdf(_)) => true,
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,

            (MissingColumn(a), MissingColumn(b)) => a == b,
            (
                InvalidPointValue {
                    row: r1,
                    column: c1,
                    value: v1,
                },
                InvalidPointValue {
                    row: r2,
                    column: c2,
                    value: v2,
                },
            ) => r1 == r2 && c1 == c2 && v1 == v2,
            (InvalidParameter(a), InvalidParameter(b)) => a == b,
            (ThreadPool(a), ThreadPool(b)) => a == b,

            _ => false,
        }
    }
}
