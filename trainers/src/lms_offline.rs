use std::{fmt, str::FromStr};

use common::{write_weight_matrix, EventSink, Trainable, TrainingEvent};
use lin_reg::{LinReg, MoorePenrose, TikhonovRegularization};
use nalgebra::DMatrix;
use nanorand::{Rng, WyRand};

use crate::{backprop::make_rng, clamp_row, TrainingError};

/// How the closed form least squares problem is solved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionType {
    /// Normal equations `W = (S'S)^-1 S'D`, optionally with a ridge term
    WienerHopf,
    /// Pseudoinverse `W = pinv(S) D`
    MoorePenrose,
}

impl Default for SolutionType {
    fn default() -> Self {
        SolutionType::WienerHopf
    }
}

impl SolutionType {
    /// Registered solution type names
    pub const NAMES: [&'static str; 2] = ["Wiener-Hopf", "Moore-Penrose"];

    /// Display name, accepted back by `from_str`
    pub fn name(&self) -> &'static str {
        match self {
            SolutionType::WienerHopf => Self::NAMES[0],
            SolutionType::MoorePenrose => Self::NAMES[1],
        }
    }
}

impl fmt::Display for SolutionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SolutionType {
    type Err = TrainingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s.chars().filter(|c| c.is_alphanumeric()).collect::<String>().to_ascii_lowercase();
        match key.as_str() {
            "wienerhopf" => Ok(SolutionType::WienerHopf),
            "moorepenrose" => Ok(SolutionType::MoorePenrose),
            _ => Err(TrainingError::UnknownSolutionType(s.to_string())),
        }
    }
}

/// Closed form linear regression of the weights from the input to the output layer.
/// A single call to `apply` solves the whole problem.
#[derive(Debug, Clone)]
pub struct LmsOffline {
    /// Which solver to use
    pub solution_type: SolutionType,
    /// Whether the Wiener-Hopf solver adds `alpha^2` to the correlation diagonal
    pub ridge_regression: bool,
    /// Ridge parameter, squared before use
    pub alpha: f64,
    /// Uniform noise in `[min, max]` added to a copy of the inputs before solving
    pub noise: Option<(f64, f64)>,
    /// Optional seed for the input noise
    pub seed: Option<u64>,
    rng: WyRand,
    error: f64,
}

impl Default for LmsOffline {
    fn default() -> Self {
        Self::new(SolutionType::default())
    }
}

impl LmsOffline {
    /// Solver without regularization or noise
    pub fn new(solution_type: SolutionType) -> Self {
        Self {
            solution_type,
            ridge_regression: false,
            alpha: 0.0,
            noise: None,
            seed: None,
            rng: WyRand::new(),
            error: 0.0,
        }
    }

    /// Wiener-Hopf solver with ridge parameter `alpha`
    pub fn ridge(alpha: f64) -> Self {
        Self {
            ridge_regression: true,
            alpha,
            ..Self::new(SolutionType::WienerHopf)
        }
    }

    /// Mean squared error of the fitted network on the training data
    #[inline(always)]
    pub fn error(&self) -> f64 {
        self.error
    }

    pub(crate) fn init(&mut self) {
        self.rng = make_rng(self.seed);
        self.error = 0.0;
    }

    /// Solve for the readout weights and write them into the existing connections
    /// of the network. On failure the weights are left untouched.
    pub fn apply<N: Trainable + ?Sized>(
        &mut self,
        net: &mut N,
        inputs: &DMatrix<f64>,
        targets: &DMatrix<f64>,
        sink: &mut dyn EventSink,
    ) -> Result<f64, TrainingError> {
        if net.num_layers() != 2 {
            return Err(TrainingError::UnsupportedNetwork {
                method: "LMS Offline",
                reason: format!("expected an input and an output layer, found {} layers", net.num_layers()),
            });
        }
        let linear_targets = linearize_targets(net, targets)?;
        sink.notify(TrainingEvent::BeginTraining);

        let design = self.noisy_inputs(inputs);

        let solved = match self.solution_type {
            SolutionType::WienerHopf => {
                let coeff = if self.ridge_regression { self.alpha * self.alpha } else { 0.0 };
                TikhonovRegularization::new(coeff).fit_readout_observed(&design, &linear_targets, &mut |msg, pct| {
                    info!("{}", msg);
                    sink.progress(msg, pct)
                })
            }
            SolutionType::MoorePenrose => {
                MoorePenrose::default().fit_readout_observed(&design, &linear_targets, &mut |msg, pct| {
                    info!("{}", msg);
                    sink.progress(msg, pct)
                })
            }
        };
        let weights = match solved {
            Ok(w) => w,
            Err(e) => {
                warn!("{} solve failed: {}", self.solution_type, e);
                sink.progress("Training Failed", 0.0);
                sink.notify(TrainingEvent::EndTraining);
                return Err(TrainingError::Singular(e));
            }
        };

        sink.progress("Setting Weights...", 95.0);
        let written = write_weight_matrix(net, 0, &weights.transpose());
        debug!("wrote {} of {} readout weights", written, weights.len());

        self.error = training_error(net, inputs, targets);
        sink.progress("Done!", 100.0);
        sink.notify(TrainingEvent::EndTraining);

        Ok(self.error)
    }

    fn noisy_inputs(&mut self, inputs: &DMatrix<f64>) -> DMatrix<f64> {
        let mut design = inputs.clone();
        if let Some((min, max)) = self.noise {
            for v in design.iter_mut() {
                *v += (max - min) * self.rng.generate::<f64>() + min;
            }
        }
        design
    }
}

/// Map each target column through the inverse of its output unit's transfer function,
/// so that the linear solution reproduces the targets after the forward pass.
fn linearize_targets<N: Trainable + ?Sized>(
    net: &N,
    targets: &DMatrix<f64>,
) -> Result<DMatrix<f64>, TrainingError> {
    let mut linear = targets.clone();
    for column in 0..targets.ncols() {
        let f = net.transfer_function(1, column);
        for row in 0..targets.nrows() {
            let value = targets[(row, column)];
            let mapped = if f.is_sigmoidal() { f.inverse(value) } else { value };
            if !mapped.is_finite() {
                return Err(TrainingError::InvalidTarget { row, column, value });
            }
            linear[(row, column)] = mapped;
        }
    }
    Ok(linear)
}

fn training_error<N: Trainable + ?Sized>(net: &mut N, inputs: &DMatrix<f64>, targets: &DMatrix<f64>) -> f64 {
    let outputs = net.output_size();
    let mut sse = 0.0;
    for row in 0..inputs.nrows() {
        clamp_row(net, inputs, row);
        net.propagate();
        for out in 0..outputs {
            let err = targets[(row, out)] - net.activation(1, out);
            sse += err * err;
        }
    }
    sse / (inputs.nrows() * outputs).max(1) as f64
}
