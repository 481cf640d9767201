use common::TransferFunction;

/// The parameters of the Echo State Network
#[derive(Debug, Clone)]
pub struct Params {
    /// Number of input units
    pub input_size: usize,
    /// Number of readout units
    pub output_size: usize,

    /// Probability of inputs connecting to state
    pub input_sparsity: f64,
    /// Scales the input weight matrix
    pub input_weight_scaling: f64,

    /// Number of nodes in the reservoir
    pub reservoir_size: usize,
    /// Scales the reservoir biases
    pub reservoir_bias_scaling: f64,
    /// Connection probability within the reservoir
    pub reservoir_sparsity: f64,
    /// Activation function of reservoir state transition
    pub reservoir_activation: TransferFunction,

    /// Controls the retention of information from previous time steps.
    /// The spectral radius determines how fast the influence of an input
    /// dies out in a reservoir with time, and how stable the reservoir
    /// activations are. The spectral radius should be greater in tasks
    /// requiring longer memory of the input.
    pub spectral_radius: f64,
    /// Tunes the decay time of internal activity of the network.
    /// 1.0 replaces the state on every update, smaller values act
    /// like an EMA smoothing filter over past states.
    pub leaking_rate: f64,
    /// Activation function of networks readout
    pub output_activation: TransferFunction,
    /// Optional seed for Rng
    pub seed: Option<u64>,
    /// Initial value of state
    pub initial_state_value: f64,

    /// Whether the readout also sees the inputs directly
    pub direct_input_to_output: bool,
    /// Whether the readout sees its own previous output
    pub recurrent_outputs: bool,
    /// Whether the previous output is fed back into the reservoir
    pub back_weights: bool,
    /// Scales the output to reservoir feedback weights
    pub back_weight_scaling: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            input_size: 1,
            output_size: 1,
            input_sparsity: 1.0,
            input_weight_scaling: 0.5,
            reservoir_size: 100,
            reservoir_bias_scaling: 0.1,
            reservoir_sparsity: 0.1,
            reservoir_activation: TransferFunction::Tanh,
            spectral_radius: 0.9,
            leaking_rate: 1.0,
            output_activation: TransferFunction::Identity,
            seed: None,
            initial_state_value: 0.0,
            direct_input_to_output: false,
            recurrent_outputs: false,
            back_weights: false,
            back_weight_scaling: 0.5,
        }
    }
}

impl Params {
    /// Columns of a harvested state row:
    /// inputs (if direct), reservoir, previous outputs (if recurrent)
    pub fn design_width(&self) -> usize {
        let mut width = self.reservoir_size;
        if self.direct_input_to_output {
            width += self.input_size;
        }
        if self.recurrent_outputs {
            width += self.output_size;
        }
        width
    }

    /// Whether harvesting needs target data to force the outputs
    #[inline(always)]
    pub fn needs_teacher(&self) -> bool {
        self.recurrent_outputs || self.back_weights
    }
}
