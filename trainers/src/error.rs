use lin_reg::LinRegError;
use thiserror::Error;

/// Errors raised while configuring or running a training method
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainingError {
    /// Input data columns do not match the input layer
    #[error("input data has {columns} columns but the input layer has {layer_size} units")]
    InputShapeMismatch {
        /// Units in the input layer
        layer_size: usize,
        /// Columns of the rejected input data
        columns: usize,
    },

    /// Target data columns do not match the output layer
    #[error("target data has {columns} columns but the output layer has {layer_size} units")]
    TargetShapeMismatch {
        /// Units in the output layer
        layer_size: usize,
        /// Columns of the rejected target data
        columns: usize,
    },

    /// Input and target data describe a different number of examples
    #[error("input data has {input_rows} rows but target data has {target_rows}")]
    RowCountMismatch {
        /// Rows of the input data
        input_rows: usize,
        /// Rows of the target data
        target_rows: usize,
    },

    /// A step was requested before input or target data was set
    #[error("{missing} data not initialized")]
    DataNotInitialized {
        /// Which of the two matrices is missing
        missing: &'static str,
    },

    /// The closed form solve failed, typically on a singular correlation matrix.
    /// The network weights are left untouched.
    #[error("training failed: {0}")]
    Singular(#[from] LinRegError),

    /// No training method is registered under this name
    #[error("unknown training method {0:?}")]
    UnknownMethod(String),

    /// No solution type is registered under this name
    #[error("unknown solution type {0:?}")]
    UnknownSolutionType(String),

    /// No update method is registered under this name
    #[error("unknown update method {0:?}")]
    UnknownUpdateMethod(String),

    /// The method cannot train a network of this shape
    #[error("{method} cannot train this network: {reason}")]
    UnsupportedNetwork {
        /// The training method
        method: &'static str,
        /// What is wrong with the network
        reason: String,
    },

    /// A target value cannot be mapped through the inverse of its output unit's transfer function
    #[error("target at row {row}, column {column} is {value}, outside the range of the output unit")]
    InvalidTarget {
        /// Row of the target data
        row: usize,
        /// Column of the target data
        column: usize,
        /// The offending value
        value: f64,
    },

    /// The network's layer structure changed since the method was initialized
    #[error("network layer sizes changed from {expected:?} to {actual:?}, reinitialize the training method")]
    StructureChanged {
        /// Layer sizes the method was compiled for
        expected: Vec<usize>,
        /// Current layer sizes of the network
        actual: Vec<usize>,
    },
}

impl TrainingError {
    /// Whether retrying with different data or settings can succeed,
    /// as opposed to a programming or configuration error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TrainingError::Singular(_) | TrainingError::InvalidTarget { .. })
    }
}
