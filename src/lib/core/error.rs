//! Error types for the cnvalign library

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrepError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to load count matrix: {0}")]
    Load(String),

    #[error("Schema error: required column '{column}' is missing from {table}")]
    Schema { column: String, table: String },

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Format error at line {line} (gene '{gene}'): {message}")]
    MalformedLine {
        line: usize,
        gene: String,
        message: String,
    },

    #[error("Sparse matrix error: {0}")]
    SparseMatrix(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Threshold validation error: {field} must be between {min} and {max}, got {value}")]
    ThresholdValidation {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PrepError {
    pub(crate) fn schema(column: &str, table: &str) -> Self {
        PrepError::Schema {
            column: column.to_string(),
            table: table.to_string(),
        }
    }

    /// The source count matrix could not be read.
    pub fn is_load(&self) -> bool {
        matches!(self, PrepError::Load(_))
    }

    /// A required metadata column was absent.
    pub fn is_schema(&self) -> bool {
        matches!(self, PrepError::Schema { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PrepError::NotFound(_))
    }

    /// The CNV text was too short or contained a malformed line.
    pub fn is_format(&self) -> bool {
        matches!(self, PrepError::Format(_) | PrepError::MalformedLine { .. })
    }
}

pub type Result<T> = std::result::Result<T, PrepError>;

impl From<nalgebra_sparse::SparseFormatError> for PrepError {
    fn from(err: nalgebra_sparse::SparseFormatError) -> Self {
        PrepError::SparseMatrix(format!("Sparse format error: {:?}", err))
    }
}
