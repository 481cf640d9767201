/// Something a training routine wants its observers to know about
#[derive(Debug, Clone, PartialEq)]
pub enum TrainingEvent {
    /// A training run is about to start
    BeginTraining,
    /// A named step of a longer computation, with completion in `[0, 100]`
    Progress {
        /// What is being computed
        message: String,
        /// Percent complete
        percent: f64,
    },
    /// A training step finished with the given error
    ErrorUpdated {
        /// Number of completed steps in the current run
        iteration: usize,
        /// Error after the step
        error: f64,
    },
    /// A training run has finished
    EndTraining,
}

/// Receives training events. Any `FnMut(TrainingEvent)` closure is a sink.
pub trait EventSink {
    /// Handle a single event
    fn notify(&mut self, event: TrainingEvent);

    /// Shorthand for emitting a progress event
    fn progress(&mut self, message: &str, percent: f64) {
        self.notify(TrainingEvent::Progress {
            message: message.to_string(),
            percent,
        });
    }
}

impl<F: FnMut(TrainingEvent)> EventSink for F {
    #[inline(always)]
    fn notify(&mut self, event: TrainingEvent) {
        self(event)
    }
}

/// Forwards training events to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn notify(&mut self, event: TrainingEvent) {
        match event {
            TrainingEvent::BeginTraining => debug!("training started"),
            TrainingEvent::Progress { message, percent } => info!("{} ({:.0}%)", message, percent),
            TrainingEvent::ErrorUpdated { iteration, error } => {
                debug!("iteration {}: error {}", iteration, error)
            }
            TrainingEvent::EndTraining => debug!("training finished"),
        }
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    #[inline(always)]
    fn notify(&mut self, _event: TrainingEvent) {}
}
