//! Shared vocabulary of the training and projection crates:
//! transfer functions, the trainable network adapter, training events,
//! cooperative cancellation and matrix import/export.

#![deny(unused_imports, unused_crate_dependencies)]
#![warn(missing_docs)]

#[macro_use]
extern crate log;

#[cfg(test)]
use pretty_env_logger as _;
#[cfg(test)]
use round as _;

mod activation;
mod cancel;
mod data;
mod error;
mod events;
mod network;
mod trainable;

pub use activation::TransferFunction;
pub use cancel::Cancellation;
pub use data::{read_matrix, read_matrix_from_reader, write_matrix, write_matrix_to_writer};
pub use error::DataError;
pub use events::{EventSink, LogSink, NullSink, TrainingEvent};
pub use network::FeedForwardNetwork;
pub use trainable::{
    bias_vector, connection_mask, layer_activations, layer_transfer_functions, weight_matrix,
    write_bias_vector, write_weight_matrix, Trainable,
};
