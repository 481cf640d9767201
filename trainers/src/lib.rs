//! Supervised training of networks exposed through the `Trainable` adapter.
//!
//! A `Trainer` binds a network to input and target data and applies a
//! `TrainingMethod` to it; an `IterableTrainer` repeats that until a
//! `StoppingCondition` holds.

#![deny(unused_imports, unused_crate_dependencies)]
#![warn(missing_docs)]

#[macro_use]
extern crate log;

#[cfg(test)]
use pretty_env_logger as _;
#[cfg(test)]
use round as _;

use common::Trainable;
use nalgebra::DMatrix;

mod backprop;
mod error;
mod iterable;
mod lms_iterative;
mod lms_offline;
mod method;
mod trainer;

pub use backprop::{Backprop, UpdateMethod};
pub use error::TrainingError;
pub use iterable::{IterableTrainer, IterationReport, StoppingCondition};
pub use lms_iterative::LmsIterative;
pub use lms_offline::{LmsOffline, SolutionType};
pub use method::{randomize_network, TrainingMethod};
pub use trainer::Trainer;

/// Clamp the input layer to one row of the input data
pub(crate) fn clamp_row<N: Trainable + ?Sized>(net: &mut N, inputs: &DMatrix<f64>, row: usize) {
    for (unit, v) in inputs.row(row).iter().enumerate() {
        net.set_activation(0, unit, *v);
    }
}
