use std::str::FromStr;

use common::{
    bias_vector, connection_mask, layer_transfer_functions, weight_matrix, write_bias_vector,
    write_weight_matrix, Trainable, TransferFunction,
};
use nalgebra::{DMatrix, DVector};
use nanorand::{Rng, WyRand};

use crate::TrainingError;

/// How many rows a single backprop step looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMethod {
    /// One row per step, walking through the data in order and wrapping around
    Single,
    /// One uniformly drawn row per step
    Stochastic,
    /// Every row per step, applying the mean gradient once
    Epoch,
}

impl Default for UpdateMethod {
    fn default() -> Self {
        UpdateMethod::Stochastic
    }
}

impl FromStr for UpdateMethod {
    type Err = TrainingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(UpdateMethod::Single),
            "stochastic" => Ok(UpdateMethod::Stochastic),
            "epoch" => Ok(UpdateMethod::Epoch),
            _ => Err(TrainingError::UnknownUpdateMethod(s.to_string())),
        }
    }
}

/// Shadow copy of the network, built for one particular layer structure.
/// Index `l` of the per-layer buffers refers to neuron layer `l`,
/// index `l` of the weight buffers to the weights from layer `l` to `l + 1`.
#[derive(Debug, Clone)]
struct CompiledState {
    sizes: Vec<usize>,
    weights: Vec<DMatrix<f64>>,
    mask: Vec<DMatrix<bool>>,
    biases: Vec<DVector<f64>>,
    transfer: Vec<Vec<TransferFunction>>,
    activations: Vec<DVector<f64>>,
    derivatives: Vec<DVector<f64>>,
    deltas: Vec<DVector<f64>>,
    weight_grads: Vec<DMatrix<f64>>,
    bias_grads: Vec<DVector<f64>>,
    last_weight_updates: Vec<DMatrix<f64>>,
    last_bias_updates: Vec<DVector<f64>>,
}

impl CompiledState {
    fn compile<N: Trainable + ?Sized>(net: &N) -> Self {
        let sizes = net.layer_sizes();
        let pairs = || sizes.windows(2).map(|w| (w[1], w[0]));
        let per_layer = || sizes.iter().map(|s| DVector::zeros(*s)).collect::<Vec<_>>();

        let mut state = Self {
            weights: pairs().map(|(r, c)| DMatrix::zeros(r, c)).collect(),
            mask: pairs().map(|(r, c)| DMatrix::from_element(r, c, true)).collect(),
            biases: per_layer(),
            transfer: sizes.iter().map(|s| vec![TransferFunction::Identity; *s]).collect(),
            activations: per_layer(),
            derivatives: per_layer(),
            deltas: per_layer(),
            weight_grads: pairs().map(|(r, c)| DMatrix::zeros(r, c)).collect(),
            bias_grads: per_layer(),
            last_weight_updates: pairs().map(|(r, c)| DMatrix::zeros(r, c)).collect(),
            last_bias_updates: per_layer(),
            sizes,
        };
        state.pull(net);
        state
    }

    /// Copy the current parameters of the network into the shadow buffers
    fn pull<N: Trainable + ?Sized>(&mut self, net: &N) {
        for l in 0..self.weights.len() {
            self.weights[l] = weight_matrix(net, l);
            self.mask[l] = connection_mask(net, l);
        }
        for l in 1..self.sizes.len() {
            self.biases[l] = bias_vector(net, l);
            self.transfer[l] = layer_transfer_functions(net, l);
        }
    }

    /// Write the shadow parameters back into the network
    fn commit<N: Trainable + ?Sized>(&self, net: &mut N) {
        for l in 0..self.weights.len() {
            write_weight_matrix(net, l, &self.weights[l]);
        }
        for l in 1..self.sizes.len() {
            write_bias_vector(net, l, &self.biases[l]);
        }
    }

    fn forward(&mut self, inputs: &DMatrix<f64>, row: usize) {
        self.activations[0] = inputs.row(row).transpose();
        for l in 1..self.sizes.len() {
            let net_in = &self.weights[l - 1] * &self.activations[l - 1] + &self.biases[l];
            for (u, x) in net_in.iter().enumerate() {
                let f = self.transfer[l][u];
                self.activations[l][u] = f.apply(*x);
                self.derivatives[l][u] = f.derivative(*x);
            }
        }
    }

    /// Backpropagate the error of one row, add its gradient to the accumulators
    /// and return the squared error.
    fn backward(&mut self, targets: &DMatrix<f64>, row: usize) -> f64 {
        let last = self.sizes.len() - 1;
        let err = targets.row(row).transpose() - &self.activations[last];
        self.deltas[last] = self.derivatives[last].component_mul(&err);
        for l in (1..last).rev() {
            self.deltas[l] = self.weights[l].tr_mul(&self.deltas[l + 1]).component_mul(&self.derivatives[l]);
        }

        for l in 1..=last {
            self.weight_grads[l - 1] += &self.deltas[l] * self.activations[l - 1].transpose();
            self.bias_grads[l] += &self.deltas[l];
        }
        err.norm_squared()
    }

    fn clear_grads(&mut self) {
        self.weight_grads.iter_mut().for_each(|g| g.fill(0.0));
        self.bias_grads.iter_mut().for_each(|g| g.fill(0.0));
    }

    /// `Δ = lr * grad * scale + momentum * Δ_prev`, then apply Δ
    fn step(&mut self, learning_rate: f64, momentum: f64, scale: f64) {
        for l in 0..self.weights.len() {
            let update = &self.weight_grads[l] * (learning_rate * scale) + &self.last_weight_updates[l] * momentum;
            let update = update.zip_map(&self.mask[l], |u, c| if c { u } else { 0.0 });
            self.weights[l] += &update;
            self.last_weight_updates[l] = update;
        }
        for l in 1..self.sizes.len() {
            let update = &self.bias_grads[l] * (learning_rate * scale) + &self.last_bias_updates[l] * momentum;
            self.biases[l] += &update;
            self.last_bias_updates[l] = update;
        }
    }

    fn forget_updates(&mut self) {
        self.last_weight_updates.iter_mut().for_each(|u| u.fill(0.0));
        self.last_bias_updates.iter_mut().for_each(|u| u.fill(0.0));
    }
}

/// Multi layer gradient descent with momentum
#[derive(Debug, Clone)]
pub struct Backprop {
    /// Step size of each update
    pub learning_rate: f64,
    /// Fraction of the previous update added to the current one
    pub momentum: f64,
    /// Rows considered per step
    pub update_method: UpdateMethod,
    /// Optional seed for the row selection of `UpdateMethod::Stochastic`
    pub seed: Option<u64>,
    state: Option<CompiledState>,
    rng: WyRand,
    iteration: usize,
    error: f64,
}

impl Default for Backprop {
    fn default() -> Self {
        Self::new(0.01, 0.9, UpdateMethod::default(), None)
    }
}

impl Backprop {
    /// Create a new backprop method, compiled lazily on the first step
    pub fn new(learning_rate: f64, momentum: f64, update_method: UpdateMethod, seed: Option<u64>) -> Self {
        Self {
            learning_rate,
            momentum,
            update_method,
            seed,
            state: None,
            rng: make_rng(seed),
            iteration: 0,
            error: 0.0,
        }
    }

    /// Mean squared error of the rows processed by the last step
    #[inline(always)]
    pub fn error(&self) -> f64 {
        self.error
    }

    /// Number of steps since the last initialization
    #[inline(always)]
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Rebuild the shadow buffers for the network's current structure
    /// and forget the momentum history.
    pub fn init<N: Trainable + ?Sized>(&mut self, net: &N) {
        let state = CompiledState::compile(net);
        debug!("compiled backprop state for layers {:?}", state.sizes);
        self.state = Some(state);
        self.rng = make_rng(self.seed);
        self.iteration = 0;
        self.error = 0.0;
    }

    /// Forget the momentum history, e.g. after the weights were randomized
    pub(crate) fn forget_updates(&mut self) {
        if let Some(state) = self.state.as_mut() {
            state.forget_updates();
        }
    }

    /// Perform one step and return the mean squared error of the rows it processed
    pub fn apply<N: Trainable + ?Sized>(
        &mut self,
        net: &mut N,
        inputs: &DMatrix<f64>,
        targets: &DMatrix<f64>,
    ) -> Result<f64, TrainingError> {
        let rows = inputs.nrows();
        let state = self.state.get_or_insert_with(|| CompiledState::compile(net));
        let actual = net.layer_sizes();
        if actual != state.sizes {
            return Err(TrainingError::StructureChanged {
                expected: state.sizes.clone(),
                actual,
            });
        }
        if rows == 0 {
            return Ok(self.error);
        }
        state.pull(net);
        state.clear_grads();

        let outputs = *state.sizes.last().unwrap_or(&1);
        let (sse, processed) = match self.update_method {
            UpdateMethod::Single => {
                let row = self.iteration % rows;
                state.forward(inputs, row);
                (state.backward(targets, row), 1)
            }
            UpdateMethod::Stochastic => {
                let row = self.rng.generate_range(0..rows);
                state.forward(inputs, row);
                (state.backward(targets, row), 1)
            }
            UpdateMethod::Epoch => {
                let mut sse = 0.0;
                for row in 0..rows {
                    state.forward(inputs, row);
                    sse += state.backward(targets, row);
                }
                (sse, rows)
            }
        };
        state.step(self.learning_rate, self.momentum, 1.0 / processed as f64);
        state.commit(net);

        self.iteration += 1;
        self.error = sse / (processed * outputs.max(1)) as f64;
        trace!("backprop iteration {}: error {}", self.iteration, self.error);

        Ok(self.error)
    }
}

pub(crate) fn make_rng(seed: Option<u64>) -> WyRand {
    match seed {
        Some(seed) => WyRand::new_seed(seed),
        None => WyRand::new(),
    }
}

#[cfg(test)]
mod tests {
    use common::FeedForwardNetwork;

    use super::*;

    #[test]
    fn update_method_names() {
        assert_eq!("Epoch".parse::<UpdateMethod>().unwrap(), UpdateMethod::Epoch);
        assert_eq!("single".parse::<UpdateMethod>().unwrap(), UpdateMethod::Single);
        assert!(matches!(
            "batch".parse::<UpdateMethod>(),
            Err(TrainingError::UnknownUpdateMethod(_))
        ));
    }

    #[test]
    fn structure_change_is_detected() {
        let mut small =
            FeedForwardNetwork::new(&[2, 3, 1], TransferFunction::Tanh, TransferFunction::Identity);
        let mut bp = Backprop::new(0.1, 0.0, UpdateMethod::Epoch, Some(0));
        bp.init(&small);

        let mut big =
            FeedForwardNetwork::new(&[2, 4, 1], TransferFunction::Tanh, TransferFunction::Identity);
        let inputs = DMatrix::zeros(1, 2);
        let targets = DMatrix::zeros(1, 1);
        let res = bp.apply(&mut big, &inputs, &targets);
        assert_eq!(
            res,
            Err(TrainingError::StructureChanged {
                expected: vec![2, 3, 1],
                actual: vec![2, 4, 1]
            })
        );
        assert!(bp.apply(&mut small, &inputs, &targets).is_ok());
    }

    #[test]
    fn removed_connections_stay_removed() {
        let mut net =
            FeedForwardNetwork::new(&[2, 2, 1], TransferFunction::Tanh, TransferFunction::Identity);
        net.randomize(&mut WyRand::new_seed(3));
        net.disconnect(0, 0, 1);

        let inputs = DMatrix::from_row_slice(2, 2, &[1.0, 0.5, -0.5, 1.0]);
        let targets = DMatrix::from_row_slice(2, 1, &[0.3, -0.2]);
        let mut bp = Backprop::new(0.5, 0.5, UpdateMethod::Epoch, Some(0));
        for _ in 0..5 {
            bp.apply(&mut net, &inputs, &targets).unwrap();
        }
        assert_eq!(net.weight(0, 0, 1), None);
        assert_eq!(net.weights(0)[(0, 1)], 0.0);
    }

    #[test]
    fn epoch_reduces_error() {
        if let Err(_) = pretty_env_logger::try_init() {}

        let mut net =
            FeedForwardNetwork::new(&[2, 4, 1], TransferFunction::Tanh, TransferFunction::Identity);
        net.randomize(&mut WyRand::new_seed(42));
        let inputs = DMatrix::from_row_slice(4, 2, &[0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0]);
        let targets = DMatrix::from_row_slice(4, 1, &[0.1, 0.4, 0.6, 0.9]);

        let mut bp = Backprop::new(0.05, 0.0, UpdateMethod::Epoch, None);
        let first = bp.apply(&mut net, &inputs, &targets).unwrap();
        let mut last = first;
        for _ in 0..500 {
            last = bp.apply(&mut net, &inputs, &targets).unwrap();
        }
        info!("epoch error went from {} to {}", first, last);
        assert!(last < first);
    }

    /// Squared error of every row divided by the number of outputs
    fn row_errors(net: &FeedForwardNetwork, inputs: &DMatrix<f64>, targets: &DMatrix<f64>) -> Vec<f64> {
        (0..inputs.nrows())
            .map(|r| {
                let x: Vec<f64> = inputs.row(r).iter().copied().collect();
                let y = net.clone().forward(&x);
                (targets.row(r).transpose() - y).norm_squared() / targets.ncols() as f64
            })
            .collect()
    }

    fn stochastic_run(seed: u64) -> (Vec<usize>, Vec<f64>, FeedForwardNetwork) {
        let mut net =
            FeedForwardNetwork::new(&[2, 3, 2], TransferFunction::Tanh, TransferFunction::Identity);
        net.randomize(&mut WyRand::new_seed(11));
        let inputs = DMatrix::from_row_slice(4, 2, &[0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0]);
        let targets = DMatrix::from_row_slice(4, 2, &[0.1, -0.9, 0.4, 0.3, -0.6, 0.8, 0.9, 0.2]);

        let mut bp = Backprop::new(0.05, 0.0, UpdateMethod::Stochastic, Some(seed));
        let (mut rows, mut errors) = (Vec::new(), Vec::new());
        for step in 1..=30 {
            let expected = row_errors(&net, &inputs, &targets);
            let err = bp.apply(&mut net, &inputs, &targets).unwrap();
            let hits: Vec<usize> = (0..expected.len()).filter(|&r| (expected[r] - err).abs() < 1e-12).collect();
            assert_eq!(hits.len(), 1, "step {}: error {} vs rows {:?}", step, err, expected);
            assert_eq!(bp.iteration(), step);
            rows.push(hits[0]);
            errors.push(err);
        }
        (rows, errors, net)
    }

    #[test]
    fn stochastic_steps_one_seeded_row() {
        if let Err(_) = pretty_env_logger::try_init() {}

        let (rows, errors, net) = stochastic_run(7);
        info!("stochastic rows {:?}", rows);
        assert!(rows.iter().any(|r| *r != rows[0]));

        let (rows_again, errors_again, net_again) = stochastic_run(7);
        assert_eq!(rows, rows_again);
        assert_eq!(errors, errors_again);
        assert_eq!(net.weights(0), net_again.weights(0));
        assert_eq!(net.weights(1), net_again.weights(1));
    }
}
