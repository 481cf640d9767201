use common::{EventSink, Trainable};
use nalgebra::DMatrix;
use nanorand::{Rng, WyRand};

use crate::{Backprop, LmsIterative, LmsOffline, TrainingError};

/// The available ways of adjusting a network's parameters
#[derive(Debug, Clone)]
pub enum TrainingMethod {
    /// Single layer delta rule, one epoch per step
    LmsIterative(LmsIterative),
    /// Multi layer gradient descent with momentum
    Backprop(Backprop),
    /// Closed form linear regression, solved in one step
    LmsOffline(LmsOffline),
}

impl Default for TrainingMethod {
    fn default() -> Self {
        TrainingMethod::Backprop(Backprop::default())
    }
}

impl TrainingMethod {
    /// Names accepted by `from_name`
    pub const NAMES: [&'static str; 3] = ["LMS Iterative", "Backprop", "LMS Offline"];

    /// Look up a method by name, with default parameters
    pub fn from_name(name: &str) -> Result<Self, TrainingError> {
        let key: String = name.chars().filter(|c| c.is_alphanumeric()).collect::<String>().to_ascii_lowercase();
        match key.as_str() {
            "lmsiterative" | "lms" => Ok(TrainingMethod::LmsIterative(LmsIterative::default())),
            "backprop" | "backpropagation" => Ok(TrainingMethod::Backprop(Backprop::default())),
            "lmsoffline" => Ok(TrainingMethod::LmsOffline(LmsOffline::default())),
            _ => Err(TrainingError::UnknownMethod(name.to_string())),
        }
    }

    /// Display name of the method
    pub fn name(&self) -> &'static str {
        match self {
            TrainingMethod::LmsIterative(_) => Self::NAMES[0],
            TrainingMethod::Backprop(_) => Self::NAMES[1],
            TrainingMethod::LmsOffline(_) => Self::NAMES[2],
        }
    }

    /// Whether repeated steps keep improving the fit.
    /// The closed form solve is done after a single step.
    pub fn is_iterable(&self) -> bool {
        !matches!(self, TrainingMethod::LmsOffline(_))
    }

    /// Reset the method's scratch state for the network's current structure
    pub fn init<N: Trainable + ?Sized>(&mut self, net: &N) {
        match self {
            TrainingMethod::LmsIterative(m) => m.init(),
            TrainingMethod::Backprop(m) => m.init(net),
            TrainingMethod::LmsOffline(m) => m.init(),
        }
    }

    /// Perform one step and return the resulting error
    pub fn apply<N: Trainable + ?Sized>(
        &mut self,
        net: &mut N,
        inputs: &DMatrix<f64>,
        targets: &DMatrix<f64>,
        sink: &mut dyn EventSink,
    ) -> Result<f64, TrainingError> {
        match self {
            TrainingMethod::LmsIterative(m) => m.apply(net, inputs, targets),
            TrainingMethod::Backprop(m) => m.apply(net, inputs, targets),
            TrainingMethod::LmsOffline(m) => m.apply(net, inputs, targets, sink),
        }
    }

    /// Error after the last step
    pub fn error(&self) -> f64 {
        match self {
            TrainingMethod::LmsIterative(m) => m.error(),
            TrainingMethod::Backprop(m) => m.error(),
            TrainingMethod::LmsOffline(m) => m.error(),
        }
    }

    /// Randomize the network's trainable parameters and forget any update history
    pub fn randomize<N: Trainable + ?Sized>(&mut self, net: &mut N, rng: &mut WyRand) {
        randomize_network(net, rng);
        if let TrainingMethod::Backprop(m) = self {
            m.forget_updates();
        }
    }
}

/// Draw every existing weight uniformly from `[-1, 1]`
/// and every bias from `[-0.05, 0.05]`
pub fn randomize_network<N: Trainable + ?Sized>(net: &mut N, rng: &mut WyRand) {
    let sizes = net.layer_sizes();
    for l in 0..sizes.len().saturating_sub(1) {
        for target in 0..sizes[l + 1] {
            for source in 0..sizes[l] {
                if net.weight(l, target, source).is_some() {
                    net.set_weight(l, target, source, rng.generate::<f64>() * 2.0 - 1.0);
                }
            }
            net.set_bias(l + 1, target, rng.generate::<f64>() * 0.1 - 0.05);
        }
    }
}

#[cfg(test)]
mod tests {
    use common::{FeedForwardNetwork, TransferFunction};

    use super::*;

    #[test]
    fn registry() {
        for name in TrainingMethod::NAMES {
            assert_eq!(TrainingMethod::from_name(name).unwrap().name(), name);
        }
        assert_eq!(TrainingMethod::from_name("lms-offline").unwrap().name(), "LMS Offline");
        assert_eq!(
            TrainingMethod::from_name("Hebbian").unwrap_err(),
            TrainingError::UnknownMethod("Hebbian".to_string())
        );
        assert!(!TrainingMethod::from_name("LMS Offline").unwrap().is_iterable());
    }

    #[test]
    fn randomize_leaves_absent_connections() {
        let mut net =
            FeedForwardNetwork::new(&[3, 2], TransferFunction::Identity, TransferFunction::Identity);
        net.disconnect(0, 1, 2);
        let mut method = TrainingMethod::default();
        method.randomize(&mut net, &mut WyRand::new_seed(7));

        assert_eq!(net.weight(0, 1, 2), None);
        assert!(net.weights(0).iter().all(|w| w.abs() <= 1.0));
        assert!(net.biases(1).iter().all(|b| b.abs() <= 0.05 && *b != 0.0));
    }
}
