use nalgebra::{DMatrix, DVector};

/// Provides the abstraction needed for custom implementations of the reservoir generation process
pub trait ReservoirConstructor {
    /// Square matrix of recurrent reservoir weights
    fn construct_reservoir_weights(&mut self) -> DMatrix<f64>;

    /// One bias per reservoir unit
    fn construct_reservoir_biases(&mut self) -> DVector<f64>;

    /// `reservoir x inputs` weights from the inputs into the reservoir
    fn construct_input_weights(&mut self, input_size: usize) -> DMatrix<f64>;

    /// `reservoir x outputs` weights feeding the readout back into the reservoir
    fn construct_back_weights(&mut self, output_size: usize) -> DMatrix<f64>;
}
