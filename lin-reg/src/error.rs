use thiserror::Error;

/// Failure of a closed-form solve
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinRegError {
    /// Design and target matrices disagree on the number of examples
    #[error("design matrix has {design_rows} rows but target matrix has {target_rows} rows")]
    DimensionMismatch {
        /// Rows of the design matrix
        design_rows: usize,
        /// Rows of the target matrix
        target_rows: usize,
    },

    /// The correlation matrix could not be inverted
    #[error("singular matrix while {step}; check that target values are in range of output units, otherwise the input matrix is rank-deficient")]
    SingularMatrix {
        /// The solve step that failed
        step: &'static str,
    },

    /// The solve produced NaN or infinite weights
    #[error("non-finite values produced while {step}")]
    NonFiniteSolution {
        /// The solve step that failed
        step: &'static str,
    },

    /// The SVD behind the pseudoinverse failed
    #[error("pseudoinverse failed: {0}")]
    PseudoInverse(String),
}
