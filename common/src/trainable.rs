use nalgebra::{DMatrix, DVector};

use crate::TransferFunction;

/// The view a training method has of a layered network.
///
/// Layers are indexed from the input layer (0) to the output layer
/// (`num_layers() - 1`). Weight layer `l` holds the connections from
/// neuron layer `l` to neuron layer `l + 1`, addressed as `(target, source)`.
pub trait Trainable {
    /// Number of units in each layer, input layer first
    fn layer_sizes(&self) -> Vec<usize>;

    /// Current activation of a unit
    fn activation(&self, layer: usize, unit: usize) -> f64;

    /// Clamp a unit to the given activation
    fn set_activation(&mut self, layer: usize, unit: usize, value: f64);

    /// Strength of a connection, `None` when the connection does not exist
    fn weight(&self, layer: usize, target: usize, source: usize) -> Option<f64>;

    /// Set the strength of an existing connection.
    /// Returns false and changes nothing when the connection does not exist.
    fn set_weight(&mut self, layer: usize, target: usize, source: usize, value: f64) -> bool;

    /// Bias of a unit in a non-input layer
    fn bias(&self, layer: usize, unit: usize) -> f64;

    /// Set the bias of a unit in a non-input layer
    fn set_bias(&mut self, layer: usize, unit: usize, value: f64);

    /// Transfer function of a unit in a non-input layer
    fn transfer_function(&self, layer: usize, unit: usize) -> TransferFunction;

    /// Propagate the clamped input activations through to the output layer
    fn propagate(&mut self);

    /// Number of layers, including input and output
    fn num_layers(&self) -> usize {
        self.layer_sizes().len()
    }

    /// Number of input units
    fn input_size(&self) -> usize {
        self.layer_sizes().first().copied().unwrap_or(0)
    }

    /// Number of output units
    fn output_size(&self) -> usize {
        self.layer_sizes().last().copied().unwrap_or(0)
    }

    /// Clamp the input layer to the given values
    fn set_inputs(&mut self, values: &[f64]) {
        for (unit, v) in values.iter().enumerate() {
            self.set_activation(0, unit, *v);
        }
    }

    /// Activations of the output layer
    fn outputs(&self) -> DVector<f64> {
        let layer = self.num_layers().saturating_sub(1);
        layer_activations(self, layer)
    }
}

impl<T: Trainable + ?Sized> Trainable for &mut T {
    fn layer_sizes(&self) -> Vec<usize> {
        (**self).layer_sizes()
    }

    fn activation(&self, layer: usize, unit: usize) -> f64 {
        (**self).activation(layer, unit)
    }

    fn set_activation(&mut self, layer: usize, unit: usize, value: f64) {
        (**self).set_activation(layer, unit, value)
    }

    fn weight(&self, layer: usize, target: usize, source: usize) -> Option<f64> {
        (**self).weight(layer, target, source)
    }

    fn set_weight(&mut self, layer: usize, target: usize, source: usize, value: f64) -> bool {
        (**self).set_weight(layer, target, source, value)
    }

    fn bias(&self, layer: usize, unit: usize) -> f64 {
        (**self).bias(layer, unit)
    }

    fn set_bias(&mut self, layer: usize, unit: usize, value: f64) {
        (**self).set_bias(layer, unit, value)
    }

    fn transfer_function(&self, layer: usize, unit: usize) -> TransferFunction {
        (**self).transfer_function(layer, unit)
    }

    fn propagate(&mut self) {
        (**self).propagate()
    }
}

/// Activations of one layer as a column vector
pub fn layer_activations<N: Trainable + ?Sized>(net: &N, layer: usize) -> DVector<f64> {
    let size = net.layer_sizes()[layer];
    DVector::from_fn(size, |unit, _| net.activation(layer, unit))
}

/// Weights from layer `layer` to `layer + 1` as a `target x source` matrix.
/// Absent connections read as zero.
pub fn weight_matrix<N: Trainable + ?Sized>(net: &N, layer: usize) -> DMatrix<f64> {
    let sizes = net.layer_sizes();
    DMatrix::from_fn(sizes[layer + 1], sizes[layer], |target, source| {
        net.weight(layer, target, source).unwrap_or(0.0)
    })
}

/// Which connections from layer `layer` to `layer + 1` exist
pub fn connection_mask<N: Trainable + ?Sized>(net: &N, layer: usize) -> DMatrix<bool> {
    let sizes = net.layer_sizes();
    DMatrix::from_fn(sizes[layer + 1], sizes[layer], |target, source| {
        net.weight(layer, target, source).is_some()
    })
}

/// Write a `target x source` matrix into the existing connections of a weight layer,
/// leaving absent connections unset. Returns the number of weights written.
pub fn write_weight_matrix<N: Trainable + ?Sized>(
    net: &mut N,
    layer: usize,
    weights: &DMatrix<f64>,
) -> usize {
    let mut written = 0;
    for target in 0..weights.nrows() {
        for source in 0..weights.ncols() {
            if net.set_weight(layer, target, source, weights[(target, source)]) {
                written += 1;
            }
        }
    }
    written
}

/// Biases of a non-input layer
pub fn bias_vector<N: Trainable + ?Sized>(net: &N, layer: usize) -> DVector<f64> {
    let size = net.layer_sizes()[layer];
    DVector::from_fn(size, |unit, _| net.bias(layer, unit))
}

/// Overwrite the biases of a non-input layer
pub fn write_bias_vector<N: Trainable + ?Sized>(net: &mut N, layer: usize, biases: &DVector<f64>) {
    for (unit, b) in biases.iter().enumerate() {
        net.set_bias(layer, unit, *b);
    }
}

/// Transfer functions of every unit in a non-input layer
pub fn layer_transfer_functions<N: Trainable + ?Sized>(net: &N, layer: usize) -> Vec<TransferFunction> {
    let size = net.layer_sizes()[layer];
    (0..size).map(|unit| net.transfer_function(layer, unit)).collect()
}
