use crate::Series;

/// Collects the curves of a train / free run experiment
#[derive(Debug, Clone, Default)]
pub struct PlotGather {
    plot_targets: Series,
    train_predictions: Series,
    test_predictions: Series,
}

impl PlotGather {
    #[inline(always)]
    pub fn push_target(&mut self, x: f64, y: f64) {
        self.plot_targets.push((x, y))
    }

    #[inline(always)]
    pub fn push_train_pred(&mut self, x: f64, y: f64) {
        self.train_predictions.push((x, y))
    }

    #[inline(always)]
    pub fn push_test_pred(&mut self, x: f64, y: f64) {
        self.test_predictions.push((x, y))
    }

    #[inline(always)]
    pub fn plot_targets(&self) -> &Series {
        &self.plot_targets
    }

    #[inline(always)]
    pub fn train_predictions(&self) -> &Series {
        &self.train_predictions
    }

    #[inline(always)]
    pub fn test_predictions(&self) -> &Series {
        &self.test_predictions
    }

    /// Root mean squared difference between the predictions and the targets at the same x
    pub fn test_rmse(&self) -> Option<f64> {
        let mut sum = 0.0;
        let mut n = 0;
        for (x, p) in self.test_predictions.iter() {
            if let Some((_, t)) = self.plot_targets.iter().find(|(tx, _)| tx == x) {
                sum += (p - t) * (p - t);
                n += 1;
            }
        }
        if n == 0 {
            None
        } else {
            Some((sum / n as f64).sqrt())
        }
    }
}
