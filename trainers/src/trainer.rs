use common::{EventSink, NullSink, Trainable};
use nalgebra::DMatrix;
use nanorand::WyRand;

use crate::{backprop::make_rng, TrainingError, TrainingMethod};

/// Binds a network to its input and target data and applies a training method to it
#[derive(Debug, Clone)]
pub struct Trainer<N> {
    network: N,
    input_data: Option<DMatrix<f64>>,
    target_data: Option<DMatrix<f64>>,
    method: TrainingMethod,
}

impl<N: Trainable> Trainer<N> {
    /// Create a trainer without data
    pub fn new(network: N, mut method: TrainingMethod) -> Self {
        method.init(&network);
        Self {
            network,
            input_data: None,
            target_data: None,
            method,
        }
    }

    /// The trained network
    #[inline(always)]
    pub fn network(&self) -> &N {
        &self.network
    }

    /// Mutable access to the network. Structural changes require a call to `reinit`.
    #[inline(always)]
    pub fn network_mut(&mut self) -> &mut N {
        &mut self.network
    }

    /// Give up the trainer and return the network
    pub fn into_network(self) -> N {
        self.network
    }

    /// Rows are examples, columns correspond to input units
    #[inline(always)]
    pub fn input_data(&self) -> Option<&DMatrix<f64>> {
        self.input_data.as_ref()
    }

    /// Rows are examples, columns correspond to output units
    #[inline(always)]
    pub fn target_data(&self) -> Option<&DMatrix<f64>> {
        self.target_data.as_ref()
    }

    /// The current training method
    #[inline(always)]
    pub fn method(&self) -> &TrainingMethod {
        &self.method
    }

    /// Mutable access to the parameters of the training method
    #[inline(always)]
    pub fn method_mut(&mut self) -> &mut TrainingMethod {
        &mut self.method
    }

    /// Replace the input data. On a column mismatch the previous data is kept.
    pub fn set_input_data(&mut self, data: DMatrix<f64>) -> Result<(), TrainingError> {
        self.check_inputs(&data)?;
        self.input_data = Some(data);
        self.method.init(&self.network);
        Ok(())
    }

    /// Replace the target data. On a column mismatch the previous data is kept.
    pub fn set_target_data(&mut self, data: DMatrix<f64>) -> Result<(), TrainingError> {
        self.check_targets(&data)?;
        self.target_data = Some(data);
        self.method.init(&self.network);
        Ok(())
    }

    /// Replace input and target data together, or neither of them
    pub fn set_data(&mut self, inputs: DMatrix<f64>, targets: DMatrix<f64>) -> Result<(), TrainingError> {
        self.check_inputs(&inputs)?;
        self.check_targets(&targets)?;
        check_row_counts(&inputs, &targets)?;
        self.input_data = Some(inputs);
        self.target_data = Some(targets);
        self.method.init(&self.network);
        Ok(())
    }

    /// Switch to another training method
    pub fn set_method(&mut self, mut method: TrainingMethod) {
        method.init(&self.network);
        self.method = method;
    }

    /// Switch to a registered training method, by name
    pub fn set_method_by_name(&mut self, name: &str) -> Result<(), TrainingError> {
        let method = TrainingMethod::from_name(name)?;
        self.set_method(method);
        Ok(())
    }

    /// Rebuild the method's scratch state after the network structure changed
    pub fn reinit(&mut self) {
        self.method.init(&self.network);
    }

    /// Randomize the network's weights and biases
    pub fn randomize(&mut self, seed: Option<u64>) {
        let mut rng: WyRand = make_rng(seed);
        self.method.randomize(&mut self.network, &mut rng);
    }

    /// Error after the last step
    #[inline(always)]
    pub fn error(&self) -> f64 {
        self.method.error()
    }

    /// Fail unless both matrices are present and describe the same examples
    pub fn check_ready(&self) -> Result<(), TrainingError> {
        let inputs = self.input_data.as_ref().ok_or(TrainingError::DataNotInitialized { missing: "input" })?;
        let targets = self.target_data.as_ref().ok_or(TrainingError::DataNotInitialized { missing: "target" })?;
        check_row_counts(inputs, targets)
    }

    /// Apply the training method once
    pub fn update(&mut self) -> Result<f64, TrainingError> {
        self.update_observed(&mut NullSink)
    }

    /// Apply the training method once, reporting progress to `sink`
    pub fn update_observed(&mut self, sink: &mut dyn EventSink) -> Result<f64, TrainingError> {
        self.check_ready()?;
        self.step(sink)
    }

    /// One step without the data check, for loops that checked up front
    pub(crate) fn step(&mut self, sink: &mut dyn EventSink) -> Result<f64, TrainingError> {
        match (self.input_data.as_ref(), self.target_data.as_ref()) {
            (Some(inputs), Some(targets)) => self.method.apply(&mut self.network, inputs, targets, sink),
            (None, _) => Err(TrainingError::DataNotInitialized { missing: "input" }),
            (_, None) => Err(TrainingError::DataNotInitialized { missing: "target" }),
        }
    }

    fn check_inputs(&self, data: &DMatrix<f64>) -> Result<(), TrainingError> {
        let layer_size = self.network.input_size();
        if data.ncols() != layer_size {
            return Err(TrainingError::InputShapeMismatch {
                layer_size,
                columns: data.ncols(),
            });
        }
        Ok(())
    }

    fn check_targets(&self, data: &DMatrix<f64>) -> Result<(), TrainingError> {
        let layer_size = self.network.output_size();
        if data.ncols() != layer_size {
            return Err(TrainingError::TargetShapeMismatch {
                layer_size,
                columns: data.ncols(),
            });
        }
        Ok(())
    }
}

fn check_row_counts(inputs: &DMatrix<f64>, targets: &DMatrix<f64>) -> Result<(), TrainingError> {
    if inputs.nrows() != targets.nrows() {
        return Err(TrainingError::RowCountMismatch {
            input_rows: inputs.nrows(),
            target_rows: targets.nrows(),
        });
    }
    Ok(())
}
