use nalgebra::DVector;

use crate::{check_compatible, Dataset, GaugeError, Projector};

/// Projects onto two of the upstairs axes
#[derive(Debug, Clone)]
pub struct ProjectCoordinate {
    /// Upstairs dimension drawn on the first axis
    pub hi_d1: usize,
    /// Upstairs dimension drawn on the second axis
    pub hi_d2: usize,
    /// Use the two most variant dimensions instead of `hi_d1` and `hi_d2`
    pub auto_find: bool,
}

impl Default for ProjectCoordinate {
    fn default() -> Self {
        Self {
            hi_d1: 0,
            hi_d2: 1,
            auto_find: true,
        }
    }
}

impl ProjectCoordinate {
    /// The upstairs dimensions that will be used for `upstairs`
    pub fn axes(&self, upstairs: &Dataset) -> Result<(usize, Option<usize>), GaugeError> {
        let dims = upstairs.dimensions();
        if dims == 1 {
            return Ok((0, None));
        }
        if self.auto_find && !upstairs.is_empty() {
            return Ok((upstairs.kth_variant_dimension(0)?, Some(upstairs.kth_variant_dimension(1)?)));
        }
        for d in [self.hi_d1, self.hi_d2] {
            if d >= dims {
                return Err(GaugeError::InvalidDimensionIndex { index: d, dims });
            }
        }
        Ok((self.hi_d1, Some(self.hi_d2)))
    }
}

impl Projector for ProjectCoordinate {
    fn name(&self) -> &'static str {
        "Coordinate Projection"
    }

    fn is_iterable(&self) -> bool {
        false
    }

    fn init(&mut self, upstairs: &Dataset, downstairs: &mut Dataset) -> Result<(), GaugeError> {
        check_compatible(upstairs, downstairs)
    }

    fn iterate(&mut self, upstairs: &Dataset, downstairs: &mut Dataset) -> Result<f64, GaugeError> {
        let (d1, d2) = self.axes(upstairs)?;
        trace!("coordinate projection onto dimensions {} and {:?}", d1, d2);

        let mut projected = Dataset::new(2);
        for p in upstairs.points() {
            let y = d2.map(|d| p[d]).unwrap_or(0.0);
            projected.add_point(DVector::from_vec(vec![p[d1], y]), None)?;
        }
        *downstairs = projected;
        Ok(0.0)
    }
}
