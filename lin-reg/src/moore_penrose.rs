use nalgebra::DMatrix;

use super::{check_finite, check_rows, LinReg, LinRegError};

/// Least squares through the Moore-Penrose pseudoinverse, `W = pinv(S) D`.
/// Avoids forming and inverting `S'S`, so it copes with rank deficient
/// and rectangular designs.
#[derive(Debug, Clone)]
pub struct MoorePenrose {
    /// Singular values below this are treated as zero
    pub eps: f64,
}

impl Default for MoorePenrose {
    fn default() -> Self {
        Self { eps: 1e-10 }
    }
}

impl LinReg for MoorePenrose {
    fn fit_readout_observed(
        &self,
        design: &DMatrix<f64>,
        targets: &DMatrix<f64>,
        progress: &mut dyn FnMut(&'static str, f64),
    ) -> Result<DMatrix<f64>, LinRegError> {
        check_rows(design, targets)?;

        progress("Computing Moore-Penrose Pseudoinverse...", 0.0);
        let pinv = design.clone().pseudo_inverse(self.eps).map_err(|e| LinRegError::PseudoInverse(e.to_string()))?;

        progress("Computing Weights...", 50.0);
        let weights = pinv * targets;
        check_finite(&weights, "multiplying the pseudoinverse with the targets")?;

        Ok(weights)
    }
}

#[cfg(test)]
mod tests {
    use round::round;

    use super::*;

    #[test]
    fn moore_penrose_exact_fit() {
        if let Err(_) = pretty_env_logger::try_init() {}

        let design = DMatrix::from_row_slice(
            4,
            3,
            &[1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 2.0, 1.0, 1.0, 3.0, 2.0],
        );
        let targets = DMatrix::from_column_slice(4, 1, &[1.0, 2.0, 3.0, 4.0]);
        let mut readout = MoorePenrose::default().fit_readout(&design, &targets).unwrap();
        info!("readout: {}", readout);

        readout.iter_mut().for_each(|v| *v = round(*v, 6));
        assert_eq!(readout, DMatrix::from_column_slice(3, 1, &[1.0, 1.0, 0.0]));
    }

    #[test]
    fn moore_penrose_handles_identical_rows() {
        if let Err(_) = pretty_env_logger::try_init() {}

        // rank one design, the minimum norm solution still reproduces the targets
        let design = DMatrix::from_row_slice(3, 2, &[0.3, 0.7, 0.3, 0.7, 0.3, 0.7]);
        let targets = DMatrix::from_column_slice(3, 1, &[1.0, 1.0, 1.0]);
        let readout = MoorePenrose::default().fit_readout(&design, &targets).unwrap();
        let reproduced = &design * &readout;
        for (r, t) in reproduced.iter().zip(targets.iter()) {
            assert!((r - t).abs() < 1e-9);
        }
    }
}
