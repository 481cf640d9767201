//! Projection of high dimensional point clouds into the plane:
//! coordinate selection, principal components and Sammon mapping,
//! kept up to date by a `Gauge` as points arrive.

#![deny(unused_imports, unused_crate_dependencies)]
#![warn(missing_docs)]

#[macro_use]
extern crate log;

#[cfg(test)]
use pretty_env_logger as _;

mod coordinate;
mod dataset;
mod error;
mod gauge;
mod pca;
mod projector;
mod sammon;

pub use coordinate::ProjectCoordinate;
pub use dataset::Dataset;
pub use error::GaugeError;
pub use gauge::{Gauge, ProjectionReport};
pub use pca::ProjectPca;
pub use projector::{check_compatible, ProjectionMethod, Projector};
pub use sammon::ProjectSammon;
