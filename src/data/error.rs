use thiserror::Error;

/// Structural problems with an input table. Bad currency text is not an
/// error; it becomes a missing value during normalization.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    #[error("Row {row}: '{value}' is not a valid year")]
    InvalidYear { row: usize, value: String },

    #[error("Row {0} is not a JSON object")]
    NotAnObject(usize),

    #[error("Column '{column}' has unsupported type {data_type}")]
    UnsupportedColumnType { column: String, data_type: String },
}
