use common::DataError;
use thiserror::Error;

/// Errors raised by datasets, projectors and the gauge
#[derive(Debug, Error)]
pub enum GaugeError {
    /// A point does not have the dataset's number of components
    #[error("point has {actual} components, the dataset has {expected} dimensions")]
    DimensionMismatch {
        /// Dimensions of the dataset
        expected: usize,
        /// Components of the rejected point
        actual: usize,
    },

    /// A point index past the end of the dataset
    #[error("index {index} out of range for {len} points")]
    IndexOutOfRange {
        /// The requested index
        index: usize,
        /// Number of points in the dataset
        len: usize,
    },

    /// The operation needs at least one point
    #[error("the dataset is empty")]
    EmptyDataset,

    /// Two high dimensional points coincide, their distance cannot be matched
    #[error("upstairs points {first} and {second} coincide, remove duplicates before projecting")]
    DuplicateUpstairsPoints {
        /// Index of the first point
        first: usize,
        /// Index of the second point
        second: usize,
    },

    /// The upstairs and downstairs datasets cannot be projected onto each other
    #[error("incompatible datasets: {0}")]
    IncompatibleDatasets(String),

    /// A dimension index past the dataset's dimensionality
    #[error("dimension {index} out of range for {dims} dimensions")]
    InvalidDimensionIndex {
        /// The requested dimension
        index: usize,
        /// Dimensions of the dataset
        dims: usize,
    },

    /// No projection method is registered under this name
    #[error("unknown projection method {0:?}")]
    UnknownMethod(String),

    /// Reading or writing point data failed
    #[error(transparent)]
    Data(#[from] DataError),
}
