use common::Trainable;
use nalgebra::DMatrix;

use crate::{clamp_row, TrainingError};

/// Single layer delta rule. One call to `apply` runs a full epoch,
/// updating the weights after every row.
#[derive(Debug, Clone)]
pub struct LmsIterative {
    /// Step size of each weight update
    pub learning_rate: f64,
    error: f64,
}

impl Default for LmsIterative {
    fn default() -> Self {
        Self::new(0.01)
    }
}

impl LmsIterative {
    /// Delta rule with the given learning rate
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            error: 0.0,
        }
    }

    /// Mean squared error of the last epoch
    #[inline(always)]
    pub fn error(&self) -> f64 {
        self.error
    }

    pub(crate) fn check_network<N: Trainable + ?Sized>(net: &N) -> Result<(), TrainingError> {
        let layers = net.num_layers();
        if layers != 2 {
            return Err(TrainingError::UnsupportedNetwork {
                method: "LMS Iterative",
                reason: format!("expected an input and an output layer, found {} layers", layers),
            });
        }
        Ok(())
    }

    pub(crate) fn init(&mut self) {
        self.error = 0.0;
    }

    /// Run one epoch over every row and return the mean squared error,
    /// normalized by rows times outputs.
    pub fn apply<N: Trainable + ?Sized>(
        &mut self,
        net: &mut N,
        inputs: &DMatrix<f64>,
        targets: &DMatrix<f64>,
    ) -> Result<f64, TrainingError> {
        Self::check_network(net)?;
        let n_in = net.input_size();
        let n_out = net.output_size();

        let mut sse = 0.0;
        for row in 0..inputs.nrows() {
            clamp_row(net, inputs, row);
            net.propagate();

            for out in 0..n_out {
                let err = targets[(row, out)] - net.activation(1, out);
                sse += err * err;
                let step = self.learning_rate * err;

                for src in 0..n_in {
                    if let Some(w) = net.weight(0, out, src) {
                        let a = net.activation(0, src);
                        net.set_weight(0, out, src, w + step * a);
                    }
                }
                let b = net.bias(1, out);
                net.set_bias(1, out, b + step);
            }
        }
        self.error = sse / (inputs.nrows() * n_out).max(1) as f64;
        trace!("lms epoch error: {}", self.error);

        Ok(self.error)
    }
}

#[cfg(test)]
mod tests {
    use common::{FeedForwardNetwork, TransferFunction};

    use super::*;

    #[test]
    fn single_row_update() {
        if let Err(_) = pretty_env_logger::try_init() {}

        let mut net =
            FeedForwardNetwork::new(&[2, 1], TransferFunction::Identity, TransferFunction::Identity);
        let inputs = DMatrix::from_row_slice(1, 2, &[1.0, 0.5]);
        let targets = DMatrix::from_row_slice(1, 1, &[1.0]);

        let mut lms = LmsIterative::new(0.1);
        let err = lms.apply(&mut net, &inputs, &targets).unwrap();

        // zero weights, so the whole target is error
        assert_eq!(err, 1.0);
        assert_eq!(net.weight(0, 0, 0), Some(0.1));
        assert_eq!(net.weight(0, 0, 1), Some(0.05));
        assert_eq!(net.bias(1, 0), 0.1);
    }

    #[test]
    fn rejects_hidden_layers() {
        let mut net =
            FeedForwardNetwork::new(&[2, 2, 1], TransferFunction::Tanh, TransferFunction::Identity);
        let inputs = DMatrix::zeros(1, 2);
        let targets = DMatrix::zeros(1, 1);
        let res = LmsIterative::default().apply(&mut net, &inputs, &targets);
        assert!(matches!(res, Err(TrainingError::UnsupportedNetwork { .. })));
    }
}
