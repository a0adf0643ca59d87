use std::path::PathBuf;

use thiserror::Error;

/// Problems with the shape or content of an observation dataset.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("dataset contains no observations")]
    Empty,

    #[error("{what}: expected {expected} values, found {found}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("covariance matrix row {row} has {found} columns, expected {expected}")]
    NotSquare {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("observation {index}: variance {value} is not a finite positive number")]
    BadVariance { index: usize, value: f64 },

    #[error("observation {index}: {field} = {value} is not finite")]
    NotFinite {
        index: usize,
        field: &'static str,
        value: f64,
    },

    #[error("observation {index}: redshift {value} must be positive")]
    NonPositiveRedshift { index: usize, value: f64 },

    #[error("line {line}, column {column}: '{token}' is not a number")]
    Parse {
        line: usize,
        column: usize,
        token: String,
    },

    #[error("line {line}: expected at least {expected} columns, found {found}")]
    MissingColumns {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("unsupported file extension: {0}")]
    UnsupportedExtension(PathBuf),
}
