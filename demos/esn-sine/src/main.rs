#[macro_use]
extern crate log;

use std::time::Instant;

use common::{LogSink, TransferFunction};
use dialoguer::{theme::ColorfulTheme, Select};
use gauge_plot::{plot_series, PlotGather};
use nalgebra::DMatrix;
use reservoir::{train_readout, EchoStateNetwork, HarvestConfig, Params};
use time_series_generator::generate_sine_wave;
use trainers::{LmsOffline, SolutionType};

const TRAIN_LEN: usize = 600;
const SEED: Option<u64> = Some(0);

pub(crate) fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let mut values: Vec<f64> = generate_sine_wave(100);
    values.append(&mut values.clone());
    values.append(&mut values.clone());
    values.append(&mut values.clone());
    info!("got {} datapoints", values.len());
    let values = DMatrix::from_column_slice(values.len(), 1, &values);

    let solvers = vec!["Wiener-Hopf with ridge regression", "Moore-Penrose"];
    let e = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select readout solver")
        .items(&solvers)
        .default(0)
        .interact()?;
    let (method, filename) = match e {
        0 => (LmsOffline::ridge(1e-3), "img/sine_esn_ridge.png"),
        _ => (LmsOffline::new(SolutionType::MoorePenrose), "img/sine_esn_pinv.png"),
    };

    let params = Params {
        input_size: 1,
        output_size: 1,
        reservoir_size: 200,
        reservoir_sparsity: 0.1,
        reservoir_activation: TransferFunction::Tanh,
        spectral_radius: 0.9,
        leaking_rate: 0.3,
        output_activation: TransferFunction::Identity,
        direct_input_to_output: true,
        seed: SEED,
        ..Default::default()
    };
    let mut esn = EchoStateNetwork::new(params);
    let config = HarvestConfig {
        noise: Some((-1e-4, 1e-4)),
        washout: TRAIN_LEN / 10,
        seed: SEED,
        ..Default::default()
    };

    let t0 = Instant::now();
    let inputs = values.rows(0, TRAIN_LEN - 1).into_owned();
    let targets = values.rows(1, TRAIN_LEN - 1).into_owned();
    let error = train_readout(&mut esn, &inputs, &targets, &config, method, &mut LogSink)?;
    info!("training done in {}ms, training error {}", t0.elapsed().as_millis(), error);

    std::fs::create_dir_all("img")?;
    let gather = run_esn(&mut esn, &values);
    if let Some(rmse) = gather.test_rmse() {
        info!("free running rmse: {}", rmse);
    }
    plot_series(
        gather.plot_targets(),
        gather.train_predictions(),
        gather.test_predictions(),
        filename,
        (2160, 2160),
    )?;

    Ok(())
}

/// Teacher forced predictions up to `TRAIN_LEN`, then feed the network its own output
fn run_esn(esn: &mut EchoStateNetwork, values: &DMatrix<f64>) -> PlotGather {
    let mut gather = PlotGather::default();
    esn.reset_state();

    let mut last_prediction = 0.0;
    for i in 1..values.nrows() {
        gather.push_target(i as f64, values[(i, 0)]);

        let input = if i > TRAIN_LEN { last_prediction } else { values[(i - 1, 0)] };
        let mut prediction = esn.step(&[input])[0];
        if !prediction.is_finite() {
            prediction = 0.0;
        }

        if i >= TRAIN_LEN {
            gather.push_test_pred(i as f64, prediction);
        } else {
            gather.push_train_pred(i as f64, prediction);
        }
        last_prediction = prediction;
    }

    gather
}
