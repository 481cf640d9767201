use nalgebra::{DMatrix, DVector};
use nanorand::{Rng, WyRand};

use crate::{Params, ReservoirConstructor};

/// Constructs the weights of a classic Echo State Network
#[derive(Debug, Clone)]
pub struct ESNConstructor {
    /// Controls the retention of information from previous time steps.
    /// The reservoir matrix is rescaled to have this spectral radius.
    spectral_radius: f64,

    /// The number of nodes in the reservoir
    reservoir_size: usize,

    /// How sparsly connected the reservoir will be
    reservoir_sparsity: f64,

    /// Scales the randomly generated biases
    reservoir_bias_scaling: f64,

    /// Probability of inputs connecting to state
    input_sparsity: f64,

    /// Scales the input weights
    input_weight_scaling: f64,

    /// Scales the output feedback weights
    back_weight_scaling: f64,

    rng: WyRand,
}

impl ESNConstructor {
    /// Create a new constructor, `seed` makes the generated weights reproducible
    pub fn new(
        seed: Option<u64>,
        reservoir_size: usize,
        spectral_radius: f64,
        reservoir_sparsity: f64,
        reservoir_bias_scaling: f64,
        input_sparsity: f64,
        input_weight_scaling: f64,
        back_weight_scaling: f64,
    ) -> Self {
        let rng = match seed {
            Some(seed) => WyRand::new_seed(seed),
            None => WyRand::new(),
        };

        Self {
            spectral_radius,
            reservoir_size,
            reservoir_sparsity,
            rng,
            reservoir_bias_scaling,
            input_sparsity,
            input_weight_scaling,
            back_weight_scaling,
        }
    }

    /// Constructor matching the reservoir settings of `params`
    pub fn from_params(params: &Params) -> Self {
        Self::new(
            params.seed,
            params.reservoir_size,
            params.spectral_radius,
            params.reservoir_sparsity,
            params.reservoir_bias_scaling,
            params.input_sparsity,
            params.input_weight_scaling,
            params.back_weight_scaling,
        )
    }

    #[inline(always)]
    fn symmetric_uniform(&mut self) -> f64 {
        self.rng.generate::<f64>() * 2.0 - 1.0
    }
}

impl ReservoirConstructor for ESNConstructor {
    fn construct_reservoir_weights(&mut self) -> DMatrix<f64> {
        let n = self.reservoir_size;
        let mut reservoir_matrix = DMatrix::from_fn(n, n, |_, _| {
            if self.rng.generate::<f64>() < self.reservoir_sparsity {
                self.rng.generate::<f64>() * 2.0 - 1.0
            } else {
                0.0
            }
        });

        let spec_rad = spectral_radius(&reservoir_matrix);
        if spec_rad > 0.0 {
            reservoir_matrix *= (1.0 / spec_rad) * self.spectral_radius;
        } else {
            warn!("reservoir has no recurrent dynamics, not rescaling");
        }

        reservoir_matrix
    }

    fn construct_reservoir_biases(&mut self) -> DVector<f64> {
        DVector::from_fn(self.reservoir_size, |_, _| self.symmetric_uniform() * self.reservoir_bias_scaling)
    }

    fn construct_input_weights(&mut self, input_size: usize) -> DMatrix<f64> {
        DMatrix::from_fn(self.reservoir_size, input_size, |_, _| {
            if self.rng.generate::<f64>() < self.input_sparsity {
                self.symmetric_uniform() * self.input_weight_scaling
            } else {
                0.0
            }
        })
    }

    fn construct_back_weights(&mut self, output_size: usize) -> DMatrix<f64> {
        DMatrix::from_fn(self.reservoir_size, output_size, |_, _| {
            self.symmetric_uniform() * self.back_weight_scaling
        })
    }
}

/// Largest absolute eigenvalue of a square matrix
pub fn spectral_radius(m: &DMatrix<f64>) -> f64 {
    if m.is_empty() {
        return 0.0;
    }
    m.complex_eigenvalues().iter().map(|c| c.norm_sqr().sqrt()).fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reservoir_is_rescaled() {
        if let Err(_) = pretty_env_logger::try_init() {}

        let mut c = ESNConstructor::new(Some(0), 50, 0.9, 0.2, 0.1, 1.0, 0.5, 0.5);
        let w = c.construct_reservoir_weights();
        assert_eq!(w.shape(), (50, 50));
        assert!((spectral_radius(&w) - 0.9).abs() < 1e-6);

        let w_in = c.construct_input_weights(3);
        assert_eq!(w_in.shape(), (50, 3));
        assert!(w_in.iter().all(|v| v.abs() <= 0.5));
        assert!(c.construct_reservoir_biases().iter().all(|b| b.abs() <= 0.1));
    }

    #[test]
    fn same_seed_same_reservoir() {
        let mut a = ESNConstructor::new(Some(7), 10, 0.8, 0.5, 0.1, 1.0, 0.5, 0.5);
        let mut b = ESNConstructor::new(Some(7), 10, 0.8, 0.5, 0.1, 1.0, 0.5, 0.5);
        assert_eq!(a.construct_reservoir_weights(), b.construct_reservoir_weights());
    }

    #[test]
    fn spectral_radius_of_rotation() {
        // eigenvalues are +-i
        let m = DMatrix::from_row_slice(2, 2, &[0.0, -1.0, 1.0, 0.0]);
        assert!((spectral_radius(&m) - 1.0).abs() < 1e-9);
    }
}
