//! Echo state networks and the harvesting of their states into design
//! matrices for closed form readout training.

#![deny(unused_imports, unused_crate_dependencies)]
#![warn(missing_docs)]

#[macro_use]
extern crate log;

#[cfg(test)]
use pretty_env_logger as _;
#[cfg(test)]
use round as _;

mod error;
mod esn;
mod esn_constructor;
mod harvest;
mod params;
mod reservoir_constructor;

pub use error::HarvestError;
pub use esn::EchoStateNetwork;
pub use esn_constructor::{spectral_radius, ESNConstructor};
pub use harvest::{harvest_states, train_readout, HarvestConfig};
pub use params::Params;
pub use reservoir_constructor::ReservoirConstructor;
