use nalgebra::{DVector, SymmetricEigen};

use crate::{check_compatible, Dataset, GaugeError, Projector};

/// Projects the centered data onto its two principal components
#[derive(Debug, Clone, Default)]
pub struct ProjectPca;

impl Projector for ProjectPca {
    fn name(&self) -> &'static str {
        "PCA"
    }

    fn is_iterable(&self) -> bool {
        false
    }

    fn init(&mut self, upstairs: &Dataset, downstairs: &mut Dataset) -> Result<(), GaugeError> {
        check_compatible(upstairs, downstairs)
    }

    fn iterate(&mut self, upstairs: &Dataset, downstairs: &mut Dataset) -> Result<f64, GaugeError> {
        if upstairs.is_empty() {
            *downstairs = Dataset::new(2);
            return Ok(0.0);
        }
        let dims = upstairs.dimensions();
        let means = DVector::from_fn(dims, |d, _| upstairs.mean(d).unwrap_or(0.0));

        let eigen = SymmetricEigen::new(upstairs.covariance_matrix()?);
        let mut order: Vec<usize> = (0..dims).collect();
        order.sort_by(|a, b| eigen.eigenvalues[*b].total_cmp(&eigen.eigenvalues[*a]));
        debug!("pca eigenvalues: {}", eigen.eigenvalues.transpose());

        let mut projected = Dataset::new(2);
        for p in upstairs.points() {
            let centered = p - &means;
            let coord = |k: usize| order.get(k).map(|c| eigen.eigenvectors.column(*c).dot(&centered)).unwrap_or(0.0);
            projected.add_point(DVector::from_vec(vec![coord(0), coord(1)]), None)?;
        }
        *downstairs = projected;
        Ok(0.0)
    }
}
