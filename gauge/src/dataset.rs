use std::path::Path;

use common::{read_matrix, write_matrix};
use nalgebra::{DMatrix, DVector};
use nanorand::{Rng, WyRand};

use crate::GaugeError;

/// An ordered cloud of points sharing one dimensionality,
/// with a lazily computed matrix of pairwise euclidean distances.
#[derive(Debug, Clone)]
pub struct Dataset {
    dims: usize,
    points: Vec<DVector<f64>>,
    distances: Option<DMatrix<f64>>,
}

impl Dataset {
    /// An empty dataset of the given dimensionality
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            points: Vec::new(),
            distances: None,
        }
    }

    /// `n` points of `dims` zeros
    pub fn zeros(dims: usize, n: usize) -> Self {
        Self {
            dims,
            points: vec![DVector::zeros(dims); n],
            distances: None,
        }
    }

    /// One point per row of the matrix
    pub fn from_matrix(m: &DMatrix<f64>) -> Self {
        Self {
            dims: m.ncols(),
            points: m.row_iter().map(|r| r.transpose()).collect(),
            distances: None,
        }
    }

    /// Read one point per row from comma separated text
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, GaugeError> {
        let m = read_matrix(path)?;
        Ok(Self::from_matrix(&m))
    }

    /// Write one point per row as comma separated text
    pub fn write<P: AsRef<Path>>(&self, path: P, comments: &[&str]) -> Result<(), GaugeError> {
        write_matrix(path, &self.to_matrix(), comments)?;
        Ok(())
    }

    /// One row per point
    pub fn to_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.points.len(), self.dims, |i, d| self.points[i][d])
    }

    /// Drop every point and reset the dimensionality
    pub fn init(&mut self, dims: usize, n: usize) {
        *self = Self::zeros(dims, n);
    }

    /// Drop every point, keeping the dimensionality
    pub fn clear(&mut self) {
        self.points.clear();
        self.distances = None;
    }

    /// Number of components per point
    #[inline(always)]
    pub fn dimensions(&self) -> usize {
        self.dims
    }

    /// Number of points
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether there are no points
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All points in order
    #[inline(always)]
    pub fn points(&self) -> &[DVector<f64>] {
        &self.points
    }

    /// A single point
    pub fn point(&self, i: usize) -> Result<&DVector<f64>, GaugeError> {
        self.points.get(i).ok_or(GaugeError::IndexOutOfRange {
            index: i,
            len: self.points.len(),
        })
    }

    /// A single component of a point
    pub fn component(&self, i: usize, d: usize) -> Result<f64, GaugeError> {
        self.check_dim(d)?;
        Ok(self.point(i)?[d])
    }

    /// Move a point
    pub fn set_point(&mut self, i: usize, point: DVector<f64>) -> Result<(), GaugeError> {
        self.check_len(&point)?;
        self.point(i)?;
        self.points[i] = point;
        self.distances = None;
        Ok(())
    }

    /// Set a single component of a point
    pub fn set_component(&mut self, i: usize, d: usize, value: f64) -> Result<(), GaugeError> {
        self.check_dim(d)?;
        self.point(i)?;
        self.points[i][d] = value;
        self.distances = None;
        Ok(())
    }

    /// Append a point. With a tolerance the point is rejected, returning
    /// `Ok(false)`, when it lies closer than `tolerance` to an existing point.
    pub fn add_point(&mut self, point: DVector<f64>, tolerance: Option<f64>) -> Result<bool, GaugeError> {
        self.check_len(&point)?;
        if let Some(tolerance) = tolerance {
            if let Some(closest) = self.closest_distance(&point) {
                if closest < tolerance {
                    trace!("rejecting point at distance {} < {}", closest, tolerance);
                    return Ok(false);
                }
            }
        }
        self.points.push(point);
        self.distances = None;
        Ok(true)
    }

    /// Forget the cached distance matrix
    #[inline(always)]
    pub fn invalidate(&mut self) {
        self.distances = None;
    }

    /// Recompute the full distance matrix
    pub fn calculate_distances(&mut self) -> &DMatrix<f64> {
        self.distances.insert(pairwise_distances(&self.points))
    }

    /// The distance matrix, computed if it is not cached
    pub fn distances(&mut self) -> &DMatrix<f64> {
        let points = &self.points;
        self.distances.get_or_insert_with(|| pairwise_distances(points))
    }

    /// Distance between two points of the dataset
    pub fn distance(&self, i: usize, j: usize) -> Result<f64, GaugeError> {
        if let Some(m) = &self.distances {
            self.point(i)?;
            self.point(j)?;
            return Ok(m[(i, j)]);
        }
        Ok((self.point(i)? - self.point(j)?).norm())
    }

    /// Distance from an arbitrary point to a point of the dataset
    pub fn distance_to(&self, point: &DVector<f64>, i: usize) -> Result<f64, GaugeError> {
        self.check_len(point)?;
        Ok((self.point(i)? - point).norm())
    }

    /// Smallest distance from `point` to any point of the dataset,
    /// `None` for an empty dataset
    pub fn closest_distance(&self, point: &DVector<f64>) -> Option<f64> {
        self.points.iter().map(|p| (p - point).norm()).reduce(f64::min)
    }

    /// Index of the point closest to `point`
    pub fn closest_index(&self, point: &DVector<f64>) -> Result<usize, GaugeError> {
        self.kth_nearest_neighbor(0, point)
    }

    /// Index of the point with the `k`-th smallest distance to `point`, `k = 0` being the nearest.
    /// Ties go to the lower index.
    pub fn kth_nearest_neighbor(&self, k: usize, point: &DVector<f64>) -> Result<usize, GaugeError> {
        let mut order = self.k_nearest_neighbors(k + 1, point)?;
        order.pop().ok_or(GaugeError::EmptyDataset)
    }

    /// Indices of the `k` points nearest to `point`, nearest first
    pub fn k_nearest_neighbors(&self, k: usize, point: &DVector<f64>) -> Result<Vec<usize>, GaugeError> {
        self.check_len(point)?;
        if self.points.is_empty() {
            return Err(GaugeError::EmptyDataset);
        }
        if k > self.points.len() {
            return Err(GaugeError::IndexOutOfRange {
                index: k - 1,
                len: self.points.len(),
            });
        }

        let dist: Vec<f64> = self.points.iter().map(|p| (p - point).norm()).collect();
        let mut selected = vec![false; dist.len()];
        let mut order = Vec::with_capacity(k);
        for _ in 0..k {
            let mut best: Option<usize> = None;
            for (i, d) in dist.iter().enumerate() {
                if selected[i] {
                    continue;
                }
                match best {
                    Some(b) if dist[b] <= *d => {}
                    _ => best = Some(i),
                }
            }
            if let Some(b) = best {
                selected[b] = true;
                order.push(b);
            }
        }
        Ok(order)
    }

    /// Smallest distance between two distinct points
    pub fn minimum_distance(&mut self) -> Option<f64> {
        self.pair_distances().reduce(f64::min)
    }

    /// Largest distance between two distinct points
    pub fn maximum_distance(&mut self) -> Option<f64> {
        self.pair_distances().reduce(f64::max)
    }

    /// Sum of the distances over all unordered pairs
    pub fn sum_distances(&mut self) -> f64 {
        self.pair_distances().sum()
    }

    fn pair_distances(&mut self) -> impl Iterator<Item = f64> + '_ {
        let m = self.distances();
        let n = m.nrows();
        (0..n).flat_map(move |i| ((i + 1)..n).map(move |j| m[(i, j)]))
    }

    /// Mean of one dimension over all points
    pub fn mean(&self, d: usize) -> Result<f64, GaugeError> {
        self.check_dim(d)?;
        if self.points.is_empty() {
            return Err(GaugeError::EmptyDataset);
        }
        Ok(self.points.iter().map(|p| p[d]).sum::<f64>() / self.points.len() as f64)
    }

    /// Population covariance of two dimensions
    pub fn covariance(&self, a: usize, b: usize) -> Result<f64, GaugeError> {
        let mean_a = self.mean(a)?;
        let mean_b = self.mean(b)?;
        let sum: f64 = self.points.iter().map(|p| (p[a] - mean_a) * (p[b] - mean_b)).sum();
        Ok(sum / self.points.len() as f64)
    }

    /// Population variance of one dimension
    #[inline(always)]
    pub fn variance(&self, d: usize) -> Result<f64, GaugeError> {
        self.covariance(d, d)
    }

    /// `dims x dims` population covariance matrix
    pub fn covariance_matrix(&self) -> Result<DMatrix<f64>, GaugeError> {
        let mut m = DMatrix::zeros(self.dims, self.dims);
        for a in 0..self.dims {
            for b in a..self.dims {
                let c = self.covariance(a, b)?;
                m[(a, b)] = c;
                m[(b, a)] = c;
            }
        }
        Ok(m)
    }

    /// Index of the dimension with the `k`-th largest variance, `k = 0` being the most variant.
    /// Ties go to the lower index.
    pub fn kth_variant_dimension(&self, k: usize) -> Result<usize, GaugeError> {
        if k >= self.dims {
            return Err(GaugeError::InvalidDimensionIndex { index: k, dims: self.dims });
        }
        let mut ranked = (0..self.dims)
            .map(|d| Ok((d, self.variance(d)?)))
            .collect::<Result<Vec<_>, GaugeError>>()?;
        // stable, so equal variances keep their order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(ranked[k].0)
    }

    /// Add uniform noise from `[-factor / 2, factor / 2]` to every component of
    /// each point that coincides with a later point.
    ///
    /// # Returns
    /// The number of points moved
    pub fn perturb_overlapping_points(&mut self, factor: f64, rng: &mut WyRand) -> usize {
        let n = self.points.len();
        let overlapping: Vec<usize> = {
            let m = self.calculate_distances();
            (0..n)
                .filter(|i| ((i + 1)..n).any(|j| m[(*i, j)] == 0.0 || m[(*i, j)].is_nan()))
                .collect()
        };
        for i in overlapping.iter() {
            for v in self.points[*i].iter_mut() {
                *v += (rng.generate::<f64>() - 0.5) * factor;
            }
        }
        self.distances = None;
        if !overlapping.is_empty() {
            debug!("perturbed {} overlapping points", overlapping.len());
        }
        overlapping.len()
    }

    /// Replace every component with uniform noise from `[0, upper_bound)`
    pub fn randomize(&mut self, upper_bound: f64, rng: &mut WyRand) {
        for p in self.points.iter_mut() {
            for v in p.iter_mut() {
                *v = rng.generate::<f64>() * upper_bound;
            }
        }
        self.distances = None;
    }

    fn check_len(&self, point: &DVector<f64>) -> Result<(), GaugeError> {
        if point.len() != self.dims {
            return Err(GaugeError::DimensionMismatch {
                expected: self.dims,
                actual: point.len(),
            });
        }
        Ok(())
    }

    fn check_dim(&self, d: usize) -> Result<(), GaugeError> {
        if d >= self.dims {
            return Err(GaugeError::InvalidDimensionIndex { index: d, dims: self.dims });
        }
        Ok(())
    }
}

fn pairwise_distances(points: &[DVector<f64>]) -> DMatrix<f64> {
    let n = points.len();
    let mut m = DMatrix::zeros(n, n);
    for i in 0..n {
        for j in (i + 1)..n {
            let d = (&points[i] - &points[j]).norm();
            m[(i, j)] = d;
            m[(j, i)] = d;
        }
    }
    m
}
