//! Closed-form linear regression used to fit readout weights.

#![deny(unused_imports)]
#![warn(missing_docs)]

#[macro_use]
extern crate log;

use nalgebra::DMatrix;

mod error;
mod moore_penrose;
mod tikhonov_regularization;

pub use error::LinRegError;
pub use moore_penrose::MoorePenrose;
pub use tikhonov_regularization::TikhonovRegularization;

/// Generic way of performing linear regression and fitting the readout matrix
pub trait LinReg: Clone {
    /// Fit a readout matrix, mapping inputs to targets, reporting each solve step
    /// as a message and a completion percentage in `[0, 100]`.
    ///
    /// # Parameters
    /// design: Input data with one row per example and one column per source unit
    /// targets: Target data with one row per example and one column per output unit
    ///
    /// # Returns
    /// A matrix with one row per source unit and one column per output unit
    fn fit_readout_observed(
        &self,
        design: &DMatrix<f64>,
        targets: &DMatrix<f64>,
        progress: &mut dyn FnMut(&'static str, f64),
    ) -> Result<DMatrix<f64>, LinRegError>;

    /// Fit a readout matrix, mapping inputs to targets
    fn fit_readout(
        &self,
        design: &DMatrix<f64>,
        targets: &DMatrix<f64>,
    ) -> Result<DMatrix<f64>, LinRegError> {
        self.fit_readout_observed(design, targets, &mut |_, _| {})
    }
}

/// Both matrices must describe the same examples
pub(crate) fn check_rows(design: &DMatrix<f64>, targets: &DMatrix<f64>) -> Result<(), LinRegError> {
    if design.nrows() != targets.nrows() {
        return Err(LinRegError::DimensionMismatch {
            design_rows: design.nrows(),
            target_rows: targets.nrows(),
        });
    }
    Ok(())
}

pub(crate) fn check_finite(m: &DMatrix<f64>, step: &'static str) -> Result<(), LinRegError> {
    if m.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(LinRegError::NonFiniteSolution { step })
    }
}
