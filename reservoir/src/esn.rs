use common::{Trainable, TransferFunction};
use nalgebra::{DMatrix, DVector};
use nanorand::{Rng, WyRand};

use crate::{ESNConstructor, Params, ReservoirConstructor};

/// Leaky Echo State Network.
///
/// As a `Trainable` it exposes only its readout: layer 0 is the harvested
/// state row (inputs, reservoir and previous outputs, as configured) and
/// layer 1 the output units.
#[derive(Debug, Clone)]
pub struct EchoStateNetwork {
    params: Params,
    input_weights: DMatrix<f64>,
    reservoir_weights: DMatrix<f64>,
    reservoir_biases: DVector<f64>,
    back_weights: Option<DMatrix<f64>>,
    // outputs x design width
    readout: DMatrix<f64>,
    readout_mask: DMatrix<bool>,
    readout_biases: DVector<f64>,
    inputs: DVector<f64>,
    state: DVector<f64>,
    outputs: DVector<f64>,
    design: DVector<f64>,
}

impl EchoStateNetwork {
    /// Create a new reservoir, with random initialization drawn from `params.seed`
    pub fn new(params: Params) -> Self {
        let mut constructor = ESNConstructor::from_params(&params);
        Self::with_constructor(params, &mut constructor)
    }

    /// Create a new reservoir with weights from a custom constructor
    pub fn with_constructor<C: ReservoirConstructor + ?Sized>(params: Params, constructor: &mut C) -> Self {
        let reservoir_weights = constructor.construct_reservoir_weights();
        let reservoir_biases = constructor.construct_reservoir_biases();
        let input_weights = constructor.construct_input_weights(params.input_size);
        let back_weights = if params.back_weights {
            Some(constructor.construct_back_weights(params.output_size))
        } else {
            None
        };
        assert_eq!(
            reservoir_weights.shape(),
            (params.reservoir_size, params.reservoir_size),
            "reservoir constructor disagrees with params.reservoir_size"
        );
        trace!("input_weights: {}\nreservoir: {}", input_weights, reservoir_weights);

        let width = params.design_width();
        Self {
            input_weights,
            reservoir_weights,
            reservoir_biases,
            back_weights,
            readout: DMatrix::zeros(params.output_size, width),
            readout_mask: DMatrix::from_element(params.output_size, width, true),
            readout_biases: DVector::zeros(params.output_size),
            inputs: DVector::zeros(params.input_size),
            state: DVector::from_element(params.reservoir_size, params.initial_state_value),
            outputs: DVector::zeros(params.output_size),
            design: DVector::zeros(width),
            params,
        }
    }

    /// The parameters the network was built with
    #[inline(always)]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Current reservoir activations
    #[inline(always)]
    pub fn state(&self) -> &DVector<f64> {
        &self.state
    }

    /// Current output activations
    #[inline(always)]
    pub fn outputs(&self) -> &DVector<f64> {
        &self.outputs
    }

    /// `outputs x design width` readout weights
    #[inline(always)]
    pub fn readout_matrix(&self) -> &DMatrix<f64> {
        &self.readout
    }

    /// Remove a readout connection, it will not be trained
    pub fn disconnect_readout(&mut self, output: usize, source: usize) {
        self.readout_mask[(output, source)] = false;
        self.readout[(output, source)] = 0.0;
    }

    /// Resets the reservoir and outputs to their initial values
    pub fn reset_state(&mut self) {
        self.state.fill(self.params.initial_state_value);
        self.outputs.fill(0.0);
        self.inputs.fill(0.0);
        self.design.fill(0.0);
    }

    /// Clamp the input units
    pub fn set_inputs(&mut self, inputs: &[f64]) {
        assert_eq!(inputs.len(), self.params.input_size, "input size");
        self.inputs.copy_from_slice(inputs);
    }

    /// Overwrite the output activations, used for teacher forcing
    pub fn force_outputs(&mut self, outputs: &[f64]) {
        assert_eq!(outputs.len(), self.params.output_size, "output size");
        self.outputs.copy_from_slice(outputs);
    }

    /// Advance the reservoir by one discrete step, driven by the clamped inputs
    /// and, with back weights, by the current outputs
    pub fn update_reservoir(&mut self) {
        let mut pre = &self.input_weights * &self.inputs + &self.reservoir_weights * &self.state + &self.reservoir_biases;
        if let Some(back) = &self.back_weights {
            pre += back * &self.outputs;
        }
        self.params.reservoir_activation.activate(pre.as_mut_slice());

        let a = self.params.leaking_rate;
        self.state = &self.state * (1.0 - a) + pre * a;
    }

    /// Add independent uniform noise from `[min, max]` to every reservoir unit
    pub fn add_state_noise(&mut self, min: f64, max: f64, rng: &mut WyRand) {
        for v in self.state.iter_mut() {
            *v += (max - min) * rng.generate::<f64>() + min;
        }
    }

    /// Copy inputs, reservoir and outputs into the readout's input layer
    pub fn assemble_design(&mut self) -> &DVector<f64> {
        let mut col = 0;
        if self.params.direct_input_to_output {
            self.design.rows_mut(col, self.inputs.len()).copy_from(&self.inputs);
            col += self.inputs.len();
        }
        self.design.rows_mut(col, self.state.len()).copy_from(&self.state);
        col += self.state.len();
        if self.params.recurrent_outputs {
            self.design.rows_mut(col, self.outputs.len()).copy_from(&self.outputs);
        }
        &self.design
    }

    /// Perform a readout of the assembled design row
    pub fn readout(&mut self) -> &DVector<f64> {
        let mut out = &self.readout * &self.design + &self.readout_biases;
        self.params.output_activation.activate(out.as_mut_slice());
        self.outputs = out;
        &self.outputs
    }

    /// Free running step: feed `inputs`, advance the reservoir, read out.
    /// The previous outputs drive the back weights and recurrent readout columns.
    pub fn step(&mut self, inputs: &[f64]) -> DVector<f64> {
        self.set_inputs(inputs);
        self.update_reservoir();
        self.assemble_design();
        self.readout().clone()
    }
}

impl Trainable for EchoStateNetwork {
    fn layer_sizes(&self) -> Vec<usize> {
        vec![self.design.len(), self.outputs.len()]
    }

    fn activation(&self, layer: usize, unit: usize) -> f64 {
        match layer {
            0 => self.design[unit],
            _ => self.outputs[unit],
        }
    }

    fn set_activation(&mut self, layer: usize, unit: usize, value: f64) {
        match layer {
            0 => self.design[unit] = value,
            _ => self.outputs[unit] = value,
        }
    }

    fn weight(&self, _layer: usize, target: usize, source: usize) -> Option<f64> {
        if self.readout_mask[(target, source)] {
            Some(self.readout[(target, source)])
        } else {
            None
        }
    }

    fn set_weight(&mut self, _layer: usize, target: usize, source: usize, value: f64) -> bool {
        if !self.readout_mask[(target, source)] {
            return false;
        }
        self.readout[(target, source)] = value;
        true
    }

    fn bias(&self, _layer: usize, unit: usize) -> f64 {
        self.readout_biases[unit]
    }

    fn set_bias(&mut self, _layer: usize, unit: usize, value: f64) {
        self.readout_biases[unit] = value;
    }

    fn transfer_function(&self, _layer: usize, _unit: usize) -> TransferFunction {
        self.params.output_activation
    }

    fn propagate(&mut self) {
        self.readout();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> Params {
        Params {
            input_size: 2,
            output_size: 1,
            reservoir_size: 10,
            seed: Some(0),
            ..Default::default()
        }
    }

    #[test]
    fn design_layout() {
        let p = Params {
            direct_input_to_output: true,
            recurrent_outputs: true,
            ..params()
        };
        let mut esn = EchoStateNetwork::new(p);
        assert_eq!(esn.layer_sizes(), vec![13, 1]);

        esn.set_inputs(&[0.25, -0.5]);
        esn.force_outputs(&[0.75]);
        esn.update_reservoir();
        let design = esn.assemble_design().clone();
        assert_eq!(design[0], 0.25);
        assert_eq!(design[1], -0.5);
        assert_eq!(design[12], 0.75);
        assert_eq!(design.rows(2, 10).into_owned(), esn.state().clone());
    }

    #[test]
    fn state_stays_bounded() {
        let mut esn = EchoStateNetwork::new(params());
        for i in 0..200 {
            esn.step(&[(i as f64 * 0.1).sin(), 1.0]);
        }
        assert!(esn.state().iter().all(|v| v.abs() <= 1.0));
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut esn = EchoStateNetwork::new(Params {
            initial_state_value: 0.2,
            ..params()
        });
        esn.step(&[1.0, 1.0]);
        esn.reset_state();
        assert!(esn.state().iter().all(|v| *v == 0.2));
        assert_eq!(esn.outputs()[0], 0.0);
    }

    #[test]
    fn readout_connections_can_be_removed() {
        let mut esn = EchoStateNetwork::new(params());
        esn.disconnect_readout(0, 3);
        assert_eq!(esn.weight(0, 0, 3), None);
        assert!(!esn.set_weight(0, 0, 3, 1.0));
        assert!(esn.set_weight(0, 0, 4, 1.0));
        assert_eq!(esn.readout_matrix()[(0, 4)], 1.0);
    }
}
