use thiserror::Error;

/// The table does not have the shape an operation expects.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("column '{0}' is missing from the table")]
    MissingColumn(String),
    #[error("column '{column}' has a null value in row {row}")]
    UnexpectedNull { column: String, row: usize },
    #[error("column '{column}' is not numeric in row {row}")]
    NotNumeric { column: String, row: usize },
    #[error("row {row} has negative sales ({value})")]
    NegativeSales { row: usize, value: f64 },
    #[error("row {row} has establishment year '{value}', expected a 4-digit integer")]
    InvalidYear { row: usize, value: String },
}
