use nalgebra::DMatrix;
use nanorand::WyRand;

use crate::{check_compatible, Dataset, GaugeError, Projector};

/// Sammon mapping: gradient descent on the mismatch between
/// upstairs and downstairs pairwise distances.
#[derive(Debug, Clone)]
pub struct ProjectSammon {
    /// Step size of each iteration
    pub epsilon: f64,
    /// Noise factor used to separate coincident downstairs points
    pub perturbation_amount: f64,
    /// Optional seed for the perturbation noise
    pub seed: Option<u64>,
    dstar: DMatrix<f64>,
    dstar_sum: f64,
    closeness: f64,
    rng: WyRand,
}

impl Default for ProjectSammon {
    fn default() -> Self {
        Self::new(0.5, 0.1, None)
    }
}

impl ProjectSammon {
    /// Create a new, uninitialized Sammon map
    pub fn new(epsilon: f64, perturbation_amount: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => WyRand::new_seed(seed),
            None => WyRand::new(),
        };
        Self {
            epsilon,
            perturbation_amount,
            seed,
            dstar: DMatrix::zeros(0, 0),
            dstar_sum: 0.0,
            closeness: 0.0,
            rng,
        }
    }

    /// Normalized stress after the last iteration
    #[inline(always)]
    pub fn closeness(&self) -> f64 {
        self.closeness
    }

    /// Whether `init` has been run for a dataset of `n` points
    #[inline(always)]
    pub fn is_initialized_for(&self, n: usize) -> bool {
        self.dstar.nrows() == n && n > 0
    }

    /// `sum over i < j of (dstar - d)^2 / dstar`, divided by the sum of upstairs distances
    fn stress(&self, d: &DMatrix<f64>) -> f64 {
        let n = d.nrows();
        let mut e = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                let diff = self.dstar[(i, j)] - d[(i, j)];
                e += diff * diff / self.dstar[(i, j)];
            }
        }
        e / self.dstar_sum
    }
}

impl Projector for ProjectSammon {
    fn name(&self) -> &'static str {
        "Sammon Map"
    }

    fn is_iterable(&self) -> bool {
        true
    }

    /// Cache the upstairs distances and separate coincident downstairs points.
    /// Coincident upstairs points are rejected, their distance cannot be matched.
    fn init(&mut self, upstairs: &Dataset, downstairs: &mut Dataset) -> Result<(), GaugeError> {
        check_compatible(upstairs, downstairs)?;

        let mut up = upstairs.clone();
        let dstar = up.calculate_distances().clone();
        let n = dstar.nrows();
        for i in 0..n {
            for j in (i + 1)..n {
                if dstar[(i, j)] == 0.0 || dstar[(i, j)].is_nan() {
                    warn!("upstairs points {} and {} coincide", i, j);
                    return Err(GaugeError::DuplicateUpstairsPoints { first: i, second: j });
                }
            }
        }
        self.dstar_sum = up.sum_distances();
        self.dstar = dstar;

        downstairs.perturb_overlapping_points(self.perturbation_amount, &mut self.rng);
        self.closeness = if n > 1 {
            let d = downstairs.calculate_distances().clone();
            self.stress(&d)
        } else {
            0.0
        };
        debug!("sammon map initialized for {} points, closeness {}", n, self.closeness);

        Ok(())
    }

    /// One synchronous gradient step: every partial derivative is taken at the
    /// previous positions before any point moves.
    fn iterate(&mut self, upstairs: &Dataset, downstairs: &mut Dataset) -> Result<f64, GaugeError> {
        let n = downstairs.len();
        if !self.is_initialized_for(n) {
            self.init(upstairs, downstairs)?;
        }
        if n < 2 {
            return Ok(0.0);
        }

        let y = downstairs.to_matrix();
        let d = downstairs.calculate_distances().clone();
        let step = self.epsilon * 2.0 / self.dstar_sum;

        let mut next = y.clone();
        for m in 0..n {
            for axis in 0..y.ncols() {
                let mut partial = 0.0;
                for i in 0..n {
                    // coincident points have no defined direction
                    if i == m || d[(i, m)] == 0.0 {
                        continue;
                    }
                    partial += (self.dstar[(i, m)] - d[(i, m)]) * (y[(i, axis)] - y[(m, axis)])
                        / (self.dstar[(i, m)] * d[(i, m)]);
                }
                next[(m, axis)] = y[(m, axis)] - step * partial;
            }
        }
        for (m, row) in next.row_iter().enumerate() {
            downstairs.set_point(m, row.transpose())?;
        }

        let d = downstairs.calculate_distances().clone();
        self.closeness = self.stress(&d);
        trace!("sammon closeness: {}", self.closeness);

        Ok(self.closeness)
    }

    fn error(&self) -> f64 {
        self.closeness
    }
}
