#[macro_use]
extern crate log;

use std::time::Instant;

use common::Cancellation;
use dialoguer::{theme::ColorfulTheme, Select};
use gauge::{Dataset, Gauge, ProjectionMethod, Projector};
use gauge_plot::{plot_projection, GifRender, Series};
use nalgebra::DMatrix;
use nanorand::{Rng, WyRand};

const DIMS: usize = 5;
const POINTS_PER_CLUSTER: usize = 40;
const ITERATIONS: usize = 500;
const ITERATIONS_PER_FRAME: usize = 10;
const SEED: u64 = 0;

/// Project a csv file given as the first argument, or three synthetic clusters
pub(crate) fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let e = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select projection method")
        .items(&ProjectionMethod::NAMES)
        .default(2)
        .interact()?;
    let mut gauge = Gauge::new(ProjectionMethod::from_name(ProjectionMethod::NAMES[e])?);

    match std::env::args().nth(1) {
        Some(path) => {
            info!("importing {}", path);
            gauge.import_csv(&path)?;
        }
        None => {
            for p in clusters().points() {
                gauge.add_datapoint(p.clone())?;
            }
        }
    }
    info!("{} points of dimension {}", gauge.upstairs().len(), gauge.upstairs().dimensions());

    std::fs::create_dir_all("img")?;
    let cancel = Cancellation::new();
    let t0 = Instant::now();
    if gauge.method().is_iterable() {
        let mut gif = GifRender::new("img/projection.gif", (800, 800), 50)?;
        let mut done = 0;
        while done < ITERATIONS {
            let report = gauge.iterate(ITERATIONS_PER_FRAME, &cancel)?;
            done += report.iterations;
            gif.update(&downstairs_series(&gauge), &format!("iteration {}, error {:.5}", done, report.error))?;
        }
        info!("rendered {} frames", gif.frames());
    } else {
        gauge.iterate(1, &cancel)?;
    }
    info!("{} took {}ms, error {}", gauge.method().name(), t0.elapsed().as_millis(), gauge.error());

    plot_projection(&downstairs_series(&gauge), gauge.method().name(), "img/projection.png", (1080, 1080))?;
    gauge
        .downstairs()
        .write("img/projection.csv", &[gauge.method().name()])?;

    Ok(())
}

/// Three gaussian-ish blobs around the corners of a simplex
fn clusters() -> Dataset {
    let mut rng = WyRand::new_seed(SEED);
    let m = DMatrix::from_fn(3 * POINTS_PER_CLUSTER, DIMS, |row, d| {
        let center = if d == row / POINTS_PER_CLUSTER { 4.0 } else { 0.0 };
        // sum of uniforms is close enough to normal for a demo
        let noise: f64 = (0..4).map(|_| rng.generate::<f64>() - 0.5).sum();
        center + noise
    });
    Dataset::from_matrix(&m)
}

fn downstairs_series(gauge: &Gauge) -> Series {
    gauge.downstairs().points().iter().map(|p| (p[0], p[1])).collect()
}
