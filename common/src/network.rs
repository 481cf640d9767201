use nalgebra::{DMatrix, DVector};
use nanorand::{Rng, WyRand};

use crate::{Trainable, TransferFunction};

#[derive(Debug, Clone)]
struct Layer {
    activations: DVector<f64>,
    biases: DVector<f64>,
    transfer: Vec<TransferFunction>,
}

impl Layer {
    fn new(size: usize, transfer: TransferFunction) -> Self {
        Self {
            activations: DVector::zeros(size),
            biases: DVector::zeros(size),
            transfer: vec![transfer; size],
        }
    }
}

/// A plain layered network, every layer feeding the next.
/// Connections can be removed individually to model sparse topologies.
#[derive(Debug, Clone)]
pub struct FeedForwardNetwork {
    layers: Vec<Layer>,
    // target x source, one per consecutive layer pair
    weights: Vec<DMatrix<f64>>,
    connected: Vec<DMatrix<bool>>,
}

impl FeedForwardNetwork {
    /// Create a fully connected network with zero weights and biases
    ///
    /// # Arguments:
    /// layer_sizes: Units per layer, input first. At least two layers.
    /// hidden: Transfer function of all hidden units
    /// output: Transfer function of the output units
    pub fn new(layer_sizes: &[usize], hidden: TransferFunction, output: TransferFunction) -> Self {
        assert!(layer_sizes.len() >= 2, "a network needs at least an input and an output layer");

        let last = layer_sizes.len() - 1;
        let layers = layer_sizes
            .iter()
            .enumerate()
            .map(|(i, size)| {
                let transfer = match i {
                    0 => TransferFunction::Identity,
                    i if i == last => output,
                    _ => hidden,
                };
                Layer::new(*size, transfer)
            })
            .collect();
        let weights = layer_sizes.windows(2).map(|w| DMatrix::zeros(w[1], w[0])).collect();
        let connected =
            layer_sizes.windows(2).map(|w| DMatrix::from_element(w[1], w[0], true)).collect();

        Self {
            layers,
            weights,
            connected,
        }
    }

    /// Weights from `layer` to `layer + 1`
    #[inline(always)]
    pub fn weights(&self, layer: usize) -> &DMatrix<f64> {
        &self.weights[layer]
    }

    /// Replace the weights from `layer` to `layer + 1`.
    /// Entries of removed connections stay zero.
    pub fn set_weights(&mut self, layer: usize, weights: DMatrix<f64>) {
        assert_eq!(weights.shape(), self.weights[layer].shape(), "weight layer {} shape", layer);
        self.weights[layer] = weights.zip_map(&self.connected[layer], |w, c| if c { w } else { 0.0 });
    }

    /// Biases of a layer
    #[inline(always)]
    pub fn biases(&self, layer: usize) -> &DVector<f64> {
        &self.layers[layer].biases
    }

    /// Replace the biases of a layer
    pub fn set_biases(&mut self, layer: usize, biases: DVector<f64>) {
        assert_eq!(biases.len(), self.layers[layer].biases.len(), "bias layer {} size", layer);
        self.layers[layer].biases = biases;
    }

    /// Use `transfer` for every unit of a layer
    pub fn set_layer_transfer_function(&mut self, layer: usize, transfer: TransferFunction) {
        self.layers[layer].transfer.iter_mut().for_each(|t| *t = transfer);
    }

    /// Use `transfer` for a single unit
    pub fn set_unit_transfer_function(&mut self, layer: usize, unit: usize, transfer: TransferFunction) {
        self.layers[layer].transfer[unit] = transfer;
    }

    /// Remove the connection from `source` in `layer` to `target` in `layer + 1`
    pub fn disconnect(&mut self, layer: usize, target: usize, source: usize) {
        self.connected[layer][(target, source)] = false;
        self.weights[layer][(target, source)] = 0.0;
    }

    /// Whether the connection from `source` in `layer` to `target` in `layer + 1` exists
    #[inline(always)]
    pub fn is_connected(&self, layer: usize, target: usize, source: usize) -> bool {
        self.connected[layer][(target, source)]
    }

    /// Draw weights uniformly from `[-1, 1]` and biases from `[-0.05, 0.05]`
    pub fn randomize(&mut self, rng: &mut WyRand) {
        for (weights, connected) in self.weights.iter_mut().zip(self.connected.iter()) {
            for (w, c) in weights.iter_mut().zip(connected.iter()) {
                *w = if *c { rng.generate::<f64>() * 2.0 - 1.0 } else { 0.0 };
            }
        }
        for layer in self.layers.iter_mut().skip(1) {
            layer.biases.iter_mut().for_each(|b| *b = rng.generate::<f64>() * 0.1 - 0.05);
        }
    }

    /// Feed `inputs` forward and return the output activations
    pub fn forward(&mut self, inputs: &[f64]) -> DVector<f64> {
        self.set_inputs(inputs);
        self.propagate();
        self.layers[self.layers.len() - 1].activations.clone()
    }
}

impl Trainable for FeedForwardNetwork {
    fn layer_sizes(&self) -> Vec<usize> {
        self.layers.iter().map(|l| l.activations.len()).collect()
    }

    #[inline(always)]
    fn activation(&self, layer: usize, unit: usize) -> f64 {
        self.layers[layer].activations[unit]
    }

    #[inline(always)]
    fn set_activation(&mut self, layer: usize, unit: usize, value: f64) {
        self.layers[layer].activations[unit] = value;
    }

    fn weight(&self, layer: usize, target: usize, source: usize) -> Option<f64> {
        if self.connected[layer][(target, source)] {
            Some(self.weights[layer][(target, source)])
        } else {
            None
        }
    }

    fn set_weight(&mut self, layer: usize, target: usize, source: usize, value: f64) -> bool {
        if !self.connected[layer][(target, source)] {
            return false;
        }
        self.weights[layer][(target, source)] = value;
        true
    }

    #[inline(always)]
    fn bias(&self, layer: usize, unit: usize) -> f64 {
        self.layers[layer].biases[unit]
    }

    #[inline(always)]
    fn set_bias(&mut self, layer: usize, unit: usize, value: f64) {
        self.layers[layer].biases[unit] = value;
    }

    #[inline(always)]
    fn transfer_function(&self, layer: usize, unit: usize) -> TransferFunction {
        self.layers[layer].transfer[unit]
    }

    fn propagate(&mut self) {
        for l in 1..self.layers.len() {
            let net = &self.weights[l - 1] * &self.layers[l - 1].activations + &self.layers[l].biases;
            let layer = &mut self.layers[l];
            for (unit, x) in net.iter().enumerate() {
                layer.activations[unit] = layer.transfer[unit].apply(*x);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{connection_mask, weight_matrix, write_weight_matrix};

    #[test]
    fn forward_pass() {
        let mut net =
            FeedForwardNetwork::new(&[2, 1], TransferFunction::Identity, TransferFunction::Identity);
        net.set_weights(0, DMatrix::from_row_slice(1, 2, &[0.5, -1.0]));
        net.set_biases(1, DVector::from_vec(vec![0.25]));

        let out = net.forward(&[2.0, 1.0]);
        assert_eq!(out[0], 0.25);
    }

    #[test]
    fn removed_connections_are_left_alone() {
        let mut net =
            FeedForwardNetwork::new(&[2, 2], TransferFunction::Identity, TransferFunction::Identity);
        net.disconnect(0, 1, 0);

        let written = write_weight_matrix(&mut net, 0, &DMatrix::from_element(2, 2, 3.0));
        assert_eq!(written, 3);
        assert_eq!(net.weight(0, 1, 0), None);
        assert_eq!(weight_matrix(&net, 0), DMatrix::from_row_slice(2, 2, &[3.0, 3.0, 0.0, 3.0]));
        assert!(!connection_mask(&net, 0)[(1, 0)]);
    }

    #[test]
    fn randomize_is_bounded() {
        let mut net =
            FeedForwardNetwork::new(&[3, 4, 2], TransferFunction::Tanh, TransferFunction::Logistic);
        let mut rng = WyRand::new_seed(0);
        net.randomize(&mut rng);

        assert!(net.weights(0).iter().chain(net.weights(1).iter()).all(|w| w.abs() <= 1.0));
        assert!(net.biases(1).iter().all(|b| b.abs() <= 0.05));
        assert_eq!(net.layer_sizes(), vec![3, 4, 2]);
        assert_eq!(net.transfer_function(1, 0), TransferFunction::Tanh);
        assert_eq!(net.transfer_function(2, 1), TransferFunction::Logistic);
    }
}
