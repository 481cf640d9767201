use thiserror::Error;
use trainers::TrainingError;

/// Errors raised while harvesting reservoir states or training the readout
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HarvestError {
    /// The network feeds outputs back but no target data was given to force them
    #[error("the network has recurrent outputs or back weights, teacher data is required")]
    MissingTeacherData,

    /// Input data columns do not match the network's input units
    #[error("input data has {actual} columns but the network has {expected} inputs")]
    InputShapeMismatch {
        /// Number of input units
        expected: usize,
        /// Columns of the input data
        actual: usize,
    },

    /// Teacher data columns do not match the network's output units
    #[error("teacher data has {actual} columns but the network has {expected} outputs")]
    TeacherShapeMismatch {
        /// Number of output units
        expected: usize,
        /// Columns of the teacher data
        actual: usize,
    },

    /// Input and teacher data describe a different number of time steps
    #[error("input data has {input_rows} rows but teacher data has {teacher_rows}")]
    RowCountMismatch {
        /// Rows of the input data
        input_rows: usize,
        /// Rows of the teacher data
        teacher_rows: usize,
    },

    /// The washout discards every harvested row
    #[error("washout of {washout} rows leaves nothing of {rows} rows to train on")]
    WashoutTooLong {
        /// Rows to discard
        washout: usize,
        /// Harvested rows
        rows: usize,
    },

    /// Fitting the readout failed
    #[error(transparent)]
    Training(#[from] TrainingError),
}
