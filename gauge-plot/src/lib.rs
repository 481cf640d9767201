#[macro_use]
extern crate log;

mod gif_render;
pub mod plot;
mod plot_gather;

pub use gif_render::GifRender;
pub use plot::{plot_projection, plot_series};
pub use plot_gather::PlotGather;

pub type Series = Vec<(f64, f64)>;

pub type PlotResult = Result<(), Box<dyn std::error::Error>>;

/// Smallest and largest value along one axis, widened when they coincide
/// so plotters always gets a non empty range.
pub(crate) fn axis_range<I: Iterator<Item = f64>>(values: I) -> (f64, f64) {
    let (mut min, mut max) = (f64::MAX, f64::MIN);
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if min > max {
        return (0.0, 1.0);
    }
    if min == max {
        return (min - 0.5, max + 0.5);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}
