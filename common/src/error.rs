use thiserror::Error;

/// Errors raised while reading or writing matrix data
#[derive(Debug, Error)]
pub enum DataError {
    /// The underlying file could not be opened or written
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The delimited text could not be tokenized
    #[error("malformed delimited text: {0}")]
    Csv(#[from] csv::Error),

    /// A field is not a number
    #[error("line {line}, column {column}: cannot parse {value:?} as a number")]
    Parse {
        /// Line in the source, starting at 1
        line: u64,
        /// Column in the row, starting at 0
        column: usize,
        /// The offending field
        value: String,
    },

    /// A row has a different number of fields than the first row
    #[error("line {line} has {actual} columns, expected {expected}")]
    RaggedRow {
        /// Line in the source, starting at 1
        line: u64,
        /// Column count of the first row
        expected: usize,
        /// Column count of the offending row
        actual: usize,
    },

    /// The source contains no data rows
    #[error("no data rows found")]
    Empty,
}
