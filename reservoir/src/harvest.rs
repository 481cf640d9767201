use common::{EventSink, TrainingEvent};
use nalgebra::DMatrix;
use nanorand::WyRand;
use trainers::{LmsOffline, Trainer, TrainingMethod};

use crate::{EchoStateNetwork, HarvestError};

/// Settings of a state harvesting run
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Uniform noise in `[min, max]` added to every reservoir unit after each update
    pub noise: Option<(f64, f64)>,
    /// Value the outputs are forced to before the first row, when teacher forcing
    pub initial_teacher_value: f64,
    /// Leading rows discarded by `train_readout` while the reservoir settles
    pub washout: usize,
    /// Optional seed for the state noise
    pub seed: Option<u64>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            noise: None,
            initial_teacher_value: 0.5,
            washout: 0,
            seed: None,
        }
    }
}

/// Drive the reservoir through every row of `inputs` and collect one
/// design row per time step.
///
/// With a teacher, the outputs are forced to the *previous* row's target
/// before each update, so a row never sees its own target.
/// Emits a progress event after every row.
///
/// # Returns
/// A matrix with one row per input row and `params().design_width()` columns
pub fn harvest_states(
    esn: &mut EchoStateNetwork,
    inputs: &DMatrix<f64>,
    teacher: Option<&DMatrix<f64>>,
    config: &HarvestConfig,
    sink: &mut dyn EventSink,
) -> Result<DMatrix<f64>, HarvestError> {
    let params = esn.params().clone();
    if inputs.ncols() != params.input_size {
        return Err(HarvestError::InputShapeMismatch {
            expected: params.input_size,
            actual: inputs.ncols(),
        });
    }
    if params.needs_teacher() && teacher.is_none() {
        return Err(HarvestError::MissingTeacherData);
    }
    if let Some(teacher) = teacher {
        if teacher.ncols() != params.output_size {
            return Err(HarvestError::TeacherShapeMismatch {
                expected: params.output_size,
                actual: teacher.ncols(),
            });
        }
        if teacher.nrows() != inputs.nrows() {
            return Err(HarvestError::RowCountMismatch {
                input_rows: inputs.nrows(),
                teacher_rows: teacher.nrows(),
            });
        }
    }

    let mut rng = match config.seed {
        Some(seed) => WyRand::new_seed(seed),
        None => WyRand::new(),
    };
    let rows = inputs.nrows();
    let mut states = DMatrix::zeros(rows, params.design_width());
    let initial = vec![config.initial_teacher_value; params.output_size];
    debug!("harvesting {} rows into {} columns", rows, states.ncols());

    for row in 0..rows {
        if let Some(teacher) = teacher {
            let previous: Vec<f64> = if row == 0 {
                initial.clone()
            } else {
                teacher.row(row - 1).iter().copied().collect()
            };
            esn.force_outputs(&previous);
        }
        let input: Vec<f64> = inputs.row(row).iter().copied().collect();
        esn.set_inputs(&input);
        esn.update_reservoir();
        if let Some((min, max)) = config.noise {
            esn.add_state_noise(min, max, &mut rng);
        }
        let design = esn.assemble_design();
        states.row_mut(row).copy_from(&design.transpose());

        sink.notify(TrainingEvent::Progress {
            message: "Harvesting States".to_string(),
            percent: 100.0 * (row + 1) as f64 / rows as f64,
        });
    }

    Ok(states)
}

/// Harvest states for `inputs` with `targets` as teacher, drop the washout
/// and fit the readout with `method`. Only readout connections that exist
/// receive weights.
///
/// # Returns
/// The training error of the fitted readout
pub fn train_readout(
    esn: &mut EchoStateNetwork,
    inputs: &DMatrix<f64>,
    targets: &DMatrix<f64>,
    config: &HarvestConfig,
    method: LmsOffline,
    sink: &mut dyn EventSink,
) -> Result<f64, HarvestError> {
    let states = harvest_states(esn, inputs, Some(targets), config, sink)?;
    let rows = states.nrows();
    if config.washout >= rows {
        return Err(HarvestError::WashoutTooLong {
            washout: config.washout,
            rows,
        });
    }
    let kept = rows - config.washout;
    let design = states.rows(config.washout, kept).into_owned();
    let targets = targets.rows(config.washout, kept).into_owned();

    let mut trainer = Trainer::new(&mut *esn, TrainingMethod::LmsOffline(method));
    trainer.set_data(design, targets)?;
    let error = trainer.update_observed(sink)?;
    info!("readout trained on {} rows, error {}", kept, error);

    Ok(error)
}
