use std::path::Path;

use common::{read_matrix, Cancellation, EventSink, NullSink, TrainingEvent};
use nalgebra::{DMatrix, DVector};
use nanorand::WyRand;

use crate::{Dataset, GaugeError, ProjectionMethod, Projector};

/// Default minimum distance between a new point and the existing ones
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// Outcome of a call to `Gauge::iterate`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionReport {
    /// Projection steps performed by this call
    pub iterations: usize,
    /// Error of the projection afterwards
    pub error: f64,
    /// Whether the loop ended because of a cancellation request
    pub cancelled: bool,
}

/// Keeps a low dimensional image of a growing high dimensional point cloud
#[derive(Debug, Clone)]
pub struct Gauge {
    upstairs: Dataset,
    downstairs: Dataset,
    method: ProjectionMethod,
    /// New points closer than this to an existing point are rejected.
    /// With `None`, iterable methods still reject exact duplicates.
    pub tolerance: Option<f64>,
    needs_init: bool,
}

impl Default for Gauge {
    fn default() -> Self {
        Self::new(ProjectionMethod::default())
    }
}

impl Gauge {
    /// An empty gauge using `method`
    pub fn new(method: ProjectionMethod) -> Self {
        Self {
            upstairs: Dataset::new(0),
            downstairs: Dataset::new(2),
            method,
            tolerance: Some(DEFAULT_TOLERANCE),
            needs_init: true,
        }
    }

    /// The high dimensional points
    #[inline(always)]
    pub fn upstairs(&self) -> &Dataset {
        &self.upstairs
    }

    /// The current low dimensional image
    #[inline(always)]
    pub fn downstairs(&self) -> &Dataset {
        &self.downstairs
    }

    /// The current projection method
    #[inline(always)]
    pub fn method(&self) -> &ProjectionMethod {
        &self.method
    }

    /// Error of the current projection
    #[inline(always)]
    pub fn error(&self) -> f64 {
        self.method.error()
    }

    /// Drop every point
    pub fn reset(&mut self) {
        self.upstairs = Dataset::new(0);
        self.downstairs = Dataset::new(2);
        self.needs_init = true;
    }

    /// Replace the high dimensional data and project it from scratch.
    /// Each point starts downstairs at its first two coordinates.
    /// If the projection rejects the data the gauge keeps its previous state.
    pub fn set_upstairs(&mut self, upstairs: Dataset) -> Result<(), GaugeError> {
        let mut downstairs = Dataset::new(2);
        for p in upstairs.points() {
            downstairs.add_point(initial_placement(p), None)?;
        }
        let mut method = self.method.clone();
        if !upstairs.is_empty() {
            method.project(&upstairs, &mut downstairs)?;
        }
        info!("loaded {} points of dimension {}", upstairs.len(), upstairs.dimensions());
        self.upstairs = upstairs;
        self.downstairs = downstairs;
        self.method = method;
        self.needs_init = self.upstairs.is_empty();
        Ok(())
    }

    /// Load the high dimensional data from comma separated text
    pub fn import_csv<P: AsRef<Path>>(&mut self, path: P) -> Result<(), GaugeError> {
        let m: DMatrix<f64> = read_matrix(path)?;
        self.set_upstairs(Dataset::from_matrix(&m))
    }

    /// Add one high dimensional point.
    ///
    /// # Returns
    /// false if the point was rejected as too close to an existing one
    pub fn add_datapoint(&mut self, point: DVector<f64>) -> Result<bool, GaugeError> {
        if self.upstairs.is_empty() && self.upstairs.dimensions() != point.len() {
            self.upstairs = Dataset::new(point.len());
        }
        // an iterable projection cannot place two points at distance zero
        if self.method.is_iterable() && self.upstairs.closest_distance(&point) == Some(0.0) {
            debug!("rejecting duplicate point");
            return Ok(false);
        }
        let placement = initial_placement(&point);
        if !self.upstairs.add_point(point, self.tolerance)? {
            return Ok(false);
        }
        self.downstairs.add_point(placement, None)?;

        if self.method.is_iterable() {
            self.needs_init = true;
        } else {
            self.project()?;
        }
        Ok(true)
    }

    /// Switch the projection method and project the current data with it.
    /// If the new method rejects the data the previous method stays in place.
    pub fn set_method(&mut self, mut method: ProjectionMethod) -> Result<(), GaugeError> {
        debug!("switching projection to {}", method.name());
        if self.upstairs.is_empty() {
            self.method = method;
            self.needs_init = true;
            return Ok(());
        }
        let mut downstairs = self.downstairs.clone();
        method.project(&self.upstairs, &mut downstairs)?;
        self.method = method;
        self.downstairs = downstairs;
        self.needs_init = false;
        Ok(())
    }

    /// Switch to a registered projection method, by name
    pub fn set_method_by_name(&mut self, name: &str) -> Result<(), GaugeError> {
        let method = ProjectionMethod::from_name(name)?;
        self.set_method(method)
    }

    /// Scatter the downstairs points uniformly over `[0, upper_bound)`
    pub fn randomize(&mut self, upper_bound: f64, seed: Option<u64>) {
        let mut rng = match seed {
            Some(seed) => WyRand::new_seed(seed),
            None => WyRand::new(),
        };
        self.downstairs.randomize(upper_bound, &mut rng);
        self.needs_init = true;
    }

    /// Refine an iterable projection up to `n` times, polling `cancel` before
    /// each step. Non iterable methods project once.
    pub fn iterate(&mut self, n: usize, cancel: &Cancellation) -> Result<ProjectionReport, GaugeError> {
        self.iterate_observed(n, cancel, &mut NullSink)
    }

    /// Like `iterate`, emitting an `ErrorUpdated` event after every step
    pub fn iterate_observed(
        &mut self,
        n: usize,
        cancel: &Cancellation,
        sink: &mut dyn EventSink,
    ) -> Result<ProjectionReport, GaugeError> {
        let mut report = ProjectionReport {
            iterations: 0,
            error: self.method.error(),
            cancelled: false,
        };
        if self.upstairs.is_empty() {
            return Ok(report);
        }
        if !self.method.is_iterable() {
            self.project()?;
            report.iterations = 1;
            report.error = self.method.error();
            sink.notify(TrainingEvent::ErrorUpdated {
                iteration: 1,
                error: report.error,
            });
            return Ok(report);
        }
        if self.needs_init {
            self.method.init(&self.upstairs, &mut self.downstairs)?;
            self.needs_init = false;
        }

        for _ in 0..n {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            report.error = self.method.iterate(&self.upstairs, &mut self.downstairs)?;
            report.iterations += 1;
            sink.notify(TrainingEvent::ErrorUpdated {
                iteration: report.iterations,
                error: report.error,
            });
        }
        debug!("{} iterations, error {}", report.iterations, report.error);
        Ok(report)
    }

    fn project(&mut self) -> Result<(), GaugeError> {
        if self.upstairs.is_empty() {
            self.needs_init = true;
            return Ok(());
        }
        self.method.project(&self.upstairs, &mut self.downstairs)?;
        self.needs_init = false;
        Ok(())
    }
}

/// First two coordinates, or `(x, 0)` for one dimensional points
fn initial_placement(point: &DVector<f64>) -> DVector<f64> {
    let x = point.get(0).copied().unwrap_or(0.0);
    let y = point.get(1).copied().unwrap_or(0.0);
    DVector::from_vec(vec![x, y])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ProjectCoordinate, ProjectSammon};

    #[test]
    fn points_are_placed_at_their_first_coordinates() {
        let mut gauge = Gauge::new(ProjectionMethod::Sammon(Default::default()));
        assert!(gauge.add_datapoint(DVector::from_vec(vec![1.0, 2.0, 3.0])).unwrap());
        assert!(gauge.add_datapoint(DVector::from_vec(vec![4.0, 5.0, 6.0])).unwrap());
        assert_eq!(gauge.downstairs().point(1).unwrap().as_slice(), &[4.0, 5.0]);
        assert_eq!(gauge.upstairs().len(), 2);
    }

    #[test]
    fn one_dimensional_points() {
        let mut gauge = Gauge::new(ProjectionMethod::Sammon(Default::default()));
        gauge.add_datapoint(DVector::from_vec(vec![3.0])).unwrap();
        assert_eq!(gauge.downstairs().point(0).unwrap().as_slice(), &[3.0, 0.0]);
    }

    #[test]
    fn tolerance_rejects_close_points() {
        let mut gauge = Gauge::default();
        gauge.tolerance = Some(0.1);
        assert!(gauge.add_datapoint(DVector::from_vec(vec![0.0, 0.0])).unwrap());
        assert!(!gauge.add_datapoint(DVector::from_vec(vec![0.05, 0.0])).unwrap());
        assert_eq!(gauge.upstairs().len(), 1);
        assert_eq!(gauge.downstairs().len(), 1);
    }

    #[test]
    fn non_iterable_methods_project_on_add() {
        let method = ProjectionMethod::Coordinate(ProjectCoordinate {
            hi_d1: 2,
            hi_d2: 1,
            auto_find: false,
        });
        let mut gauge = Gauge::new(method);
        gauge.add_datapoint(DVector::from_vec(vec![1.0, 2.0, 3.0])).unwrap();
        gauge.add_datapoint(DVector::from_vec(vec![4.0, 5.0, 6.0])).unwrap();
        assert_eq!(gauge.downstairs().point(1).unwrap().as_slice(), &[6.0, 5.0]);
    }

    #[test]
    fn cancelled_before_the_first_step() {
        let mut gauge = Gauge::default();
        gauge
            .set_upstairs(Dataset::from_matrix(&DMatrix::from_row_slice(3, 3, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0])))
            .unwrap();
        let cancel = Cancellation::new();
        cancel.cancel();
        let report = gauge.iterate(100, &cancel).unwrap();
        assert!(report.cancelled);
        assert_eq!(report.iterations, 0);
    }

    fn triangle() -> Dataset {
        Dataset::from_matrix(&DMatrix::from_row_slice(3, 3, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0]))
    }

    #[test]
    fn repeated_points_keep_the_sammon_map_running() {
        let mut gauge = Gauge::new(ProjectionMethod::Sammon(ProjectSammon::new(0.5, 0.1, Some(3))));
        for p in triangle().points() {
            assert!(gauge.add_datapoint(p.clone()).unwrap());
        }
        assert!(!gauge.add_datapoint(DVector::from_vec(vec![1.0, 0.0, 0.0])).unwrap());

        // exact duplicates are refused even without a tolerance
        gauge.tolerance = None;
        assert!(!gauge.add_datapoint(DVector::from_vec(vec![0.0, 1.0, 1.0])).unwrap());
        assert_eq!(gauge.upstairs().len(), 3);
        assert_eq!(gauge.downstairs().len(), 3);

        let report = gauge.iterate(20, &Cancellation::new()).unwrap();
        assert_eq!(report.iterations, 20);
    }

    #[test]
    fn failed_set_upstairs_keeps_the_previous_data() {
        let mut gauge = Gauge::default();
        gauge.set_upstairs(triangle()).unwrap();
        let before: Vec<DVector<f64>> = gauge.downstairs().points().to_vec();

        let twins = Dataset::from_matrix(&DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 1.0, 2.0, 3.0]));
        assert!(matches!(
            gauge.set_upstairs(twins),
            Err(GaugeError::DuplicateUpstairsPoints { first: 0, second: 1 })
        ));
        assert_eq!(gauge.upstairs().len(), 3);
        assert_eq!(gauge.upstairs().dimensions(), 3);
        assert_eq!(gauge.downstairs().points(), &before[..]);

        let report = gauge.iterate(5, &Cancellation::new()).unwrap();
        assert_eq!(report.iterations, 5);
    }

    #[test]
    fn cancelled_between_steps() {
        let mut gauge = Gauge::default();
        gauge.set_upstairs(triangle()).unwrap();

        let cancel = Cancellation::new();
        let flag = cancel.clone();
        let mut seen = 0;
        let mut sink = |e: TrainingEvent| {
            if let TrainingEvent::ErrorUpdated { iteration, .. } = e {
                seen += 1;
                assert_eq!(iteration, seen);
                if seen == 7 {
                    flag.cancel();
                }
            }
        };
        let report = gauge.iterate_observed(100, &cancel, &mut sink).unwrap();
        assert!(report.cancelled);
        assert_eq!(report.iterations, 7);
        assert_eq!(seen, 7);
    }
}
