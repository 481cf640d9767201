use nalgebra::DMatrix;

use super::{check_finite, check_rows, LinReg, LinRegError};

/// Smallest accepted ratio of the smallest to the largest singular value
/// of the correlation matrix before it counts as singular.
pub const SINGULARITY_TOLERANCE: f64 = 1e-12;

/// Tikhonov regularization aka ridge regression, solved through the
/// Wiener-Hopf normal equations `W = (S'S + cI)^-1 S'D`.
/// It is particularly useful to mitigate the problem of multicollinearity in
/// linear regression
#[derive(Debug, Clone)]
pub struct TikhonovRegularization {
    /// Ridge parameter added to the diagonal of the correlation matrix
    pub regularization_coeff: f64,
}

impl TikhonovRegularization {
    /// Ridge regression with the given coefficient, 0 for plain Wiener-Hopf
    pub fn new(regularization_coeff: f64) -> Self {
        Self {
            regularization_coeff,
        }
    }
}

impl LinReg for TikhonovRegularization {
    fn fit_readout_observed(
        &self,
        design: &DMatrix<f64>,
        targets: &DMatrix<f64>,
        progress: &mut dyn FnMut(&'static str, f64),
    ) -> Result<DMatrix<f64>, LinRegError> {
        check_rows(design, targets)?;

        progress("Correlating State Matrix (R = S'S)...", 0.0);
        let mut r = design.tr_mul(design);

        progress("Cross-Correlating States with Teacher data (P = S'D)...", 15.0);
        let p = design.tr_mul(targets);

        progress("Computing Inverse Correlation Matrix...", 30.0);
        if self.regularization_coeff != 0.0 {
            for i in 0..r.ncols() {
                r[(i, i)] += self.regularization_coeff;
            }
        }
        check_conditioning(&r)?;
        let r_inv = r.try_inverse().ok_or(LinRegError::SingularMatrix {
            step: "inverting the state correlation matrix",
        })?;

        progress("Computing Weights", 80.0);
        let weights = r_inv * p;
        check_finite(&weights, "computing weights from the inverse correlation matrix")?;
        debug!("wiener-hopf weights: ({}, {})", weights.nrows(), weights.ncols());

        Ok(weights)
    }
}

/// LU inversion happily returns garbage for nearly singular matrices,
/// so look at the spread of singular values first.
fn check_conditioning(r: &DMatrix<f64>) -> Result<(), LinRegError> {
    let step = "inverting the state correlation matrix";
    if r.is_empty() || !r.iter().all(|v| v.is_finite()) {
        return Err(LinRegError::SingularMatrix { step });
    }
    let sv = r.singular_values();
    let max = sv.max();
    let min = sv.min();
    trace!("correlation singular values: min {}, max {}", min, max);
    if max <= 0.0 || min <= max * SINGULARITY_TOLERANCE {
        warn!("correlation matrix is singular: min sv {}, max sv {}", min, max);
        return Err(LinRegError::SingularMatrix { step });
    }
    Ok(())
}
