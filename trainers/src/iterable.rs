use common::{Cancellation, EventSink, Trainable, TrainingEvent};

use crate::{Trainer, TrainingError};

/// When `IterableTrainer::iterate` stops applying the training method
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoppingCondition {
    /// Apply exactly once
    None,
    /// Apply this many times, unless cancelled earlier
    NumIterations(usize),
    /// Apply until the error is at or below the threshold, or cancelled
    ThresholdError(f64),
    /// Apply until cancelled
    UntilCancelled,
}

impl Default for StoppingCondition {
    fn default() -> Self {
        StoppingCondition::None
    }
}

/// Outcome of a call to `IterableTrainer::iterate`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationReport {
    /// Steps performed by this call
    pub iterations: usize,
    /// Error after the last step
    pub error: f64,
    /// Whether the loop ended because of a cancellation request
    pub cancelled: bool,
}

/// A `Trainer` that applies its method repeatedly until a stopping condition holds
#[derive(Debug, Clone)]
pub struct IterableTrainer<N> {
    trainer: Trainer<N>,
    /// When to stop iterating
    pub stopping_condition: StoppingCondition,
    iteration: usize,
}

impl<N: Trainable> IterableTrainer<N> {
    /// Wrap a trainer
    pub fn new(trainer: Trainer<N>, stopping_condition: StoppingCondition) -> Self {
        Self {
            trainer,
            stopping_condition,
            iteration: 0,
        }
    }

    /// The wrapped trainer
    #[inline(always)]
    pub fn trainer(&self) -> &Trainer<N> {
        &self.trainer
    }

    /// Mutable access to the wrapped trainer
    #[inline(always)]
    pub fn trainer_mut(&mut self) -> &mut Trainer<N> {
        &mut self.trainer
    }

    /// Give up the iterable trainer and return the wrapped trainer
    pub fn into_trainer(self) -> Trainer<N> {
        self.trainer
    }

    /// Total steps performed since creation or the last `reset_iterations`
    #[inline(always)]
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Start counting steps from zero again
    pub fn reset_iterations(&mut self) {
        self.iteration = 0;
    }

    /// Error after the last step
    #[inline(always)]
    pub fn error(&self) -> f64 {
        self.trainer.error()
    }

    /// Apply the training method according to the stopping condition.
    /// The data is checked once before the loop. `cancel` is polled before
    /// every step, so a step in progress always completes.
    pub fn iterate(
        &mut self,
        cancel: &Cancellation,
        sink: &mut dyn EventSink,
    ) -> Result<IterationReport, TrainingError> {
        self.trainer.check_ready()?;

        let condition = if self.trainer.method().is_iterable() {
            self.stopping_condition
        } else {
            StoppingCondition::None
        };
        debug!("iterating {} with {:?}", self.trainer.method().name(), condition);

        sink.notify(TrainingEvent::BeginTraining);
        let mut report = IterationReport {
            iterations: 0,
            error: self.trainer.error(),
            cancelled: false,
        };
        let outcome = self.run(condition, cancel, sink, &mut report);
        sink.notify(TrainingEvent::EndTraining);
        outcome?;

        if report.cancelled {
            info!("training cancelled after {} iterations, error {}", report.iterations, report.error);
        }
        Ok(report)
    }

    fn run(
        &mut self,
        condition: StoppingCondition,
        cancel: &Cancellation,
        sink: &mut dyn EventSink,
        report: &mut IterationReport,
    ) -> Result<(), TrainingError> {
        if let StoppingCondition::None = condition {
            return self.step(sink, report);
        }

        loop {
            let done = match condition {
                StoppingCondition::NumIterations(n) => report.iterations >= n,
                StoppingCondition::ThresholdError(t) => report.iterations > 0 && report.error <= t,
                StoppingCondition::None | StoppingCondition::UntilCancelled => false,
            };
            if done {
                return Ok(());
            }
            if cancel.is_cancelled() {
                report.cancelled = true;
                return Ok(());
            }
            self.step(sink, report)?;
        }
    }

    fn step(&mut self, sink: &mut dyn EventSink, report: &mut IterationReport) -> Result<(), TrainingError> {
        let error = self.trainer.step(sink)?;
        self.iteration += 1;
        report.iterations += 1;
        report.error = error;
        sink.notify(TrainingEvent::ErrorUpdated {
            iteration: self.iteration,
            error,
        });
        Ok(())
    }
}
