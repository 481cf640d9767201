use crate::{Dataset, GaugeError, ProjectCoordinate, ProjectPca, ProjectSammon};

/// Maps a high dimensional dataset ("upstairs") onto a low dimensional one ("downstairs")
pub trait Projector {
    /// Display name of the projection
    fn name(&self) -> &'static str;

    /// Whether `iterate` keeps refining the projection
    fn is_iterable(&self) -> bool;

    /// Prepare for projecting `upstairs`, possibly adjusting the starting `downstairs`
    fn init(&mut self, upstairs: &Dataset, downstairs: &mut Dataset) -> Result<(), GaugeError>;

    /// Perform one step and return the remaining error, zero for exact methods
    fn iterate(&mut self, upstairs: &Dataset, downstairs: &mut Dataset) -> Result<f64, GaugeError>;

    /// Initialize, and run the single step of a non iterable method
    fn project(&mut self, upstairs: &Dataset, downstairs: &mut Dataset) -> Result<f64, GaugeError> {
        self.init(upstairs, downstairs)?;
        if self.is_iterable() {
            Ok(self.error())
        } else {
            self.iterate(upstairs, downstairs)
        }
    }

    /// Error of the current projection
    fn error(&self) -> f64 {
        0.0
    }
}

/// Check that `downstairs` can serve as the image of `upstairs`
pub fn check_compatible(upstairs: &Dataset, downstairs: &Dataset) -> Result<(), GaugeError> {
    let (up, down) = (upstairs.dimensions(), downstairs.dimensions());
    if down < 1 {
        return Err(GaugeError::IncompatibleDatasets("downstairs dimension is 0".to_string()));
    }
    if down > up && up != 1 {
        return Err(GaugeError::IncompatibleDatasets(format!(
            "downstairs dimension {} exceeds upstairs dimension {}",
            down, up
        )));
    }
    if upstairs.len() != downstairs.len() {
        return Err(GaugeError::IncompatibleDatasets(format!(
            "{} upstairs points but {} downstairs points",
            upstairs.len(),
            downstairs.len()
        )));
    }
    Ok(())
}

/// The registered projection methods
#[derive(Debug, Clone)]
pub enum ProjectionMethod {
    /// Pick two upstairs axes
    Coordinate(ProjectCoordinate),
    /// Principal component analysis
    Pca(ProjectPca),
    /// Iterative Sammon mapping
    Sammon(ProjectSammon),
}

impl Default for ProjectionMethod {
    fn default() -> Self {
        ProjectionMethod::Sammon(ProjectSammon::default())
    }
}

impl ProjectionMethod {
    /// Names accepted by `from_name`
    pub const NAMES: [&'static str; 3] = ["Coordinate Projection", "PCA", "Sammon Map"];

    /// Look up a method by name, with default parameters
    pub fn from_name(name: &str) -> Result<Self, GaugeError> {
        let key: String = name.chars().filter(|c| c.is_alphanumeric()).collect::<String>().to_ascii_lowercase();
        match key.as_str() {
            "coordinateprojection" | "coordinate" => Ok(ProjectionMethod::Coordinate(ProjectCoordinate::default())),
            "pca" => Ok(ProjectionMethod::Pca(ProjectPca::default())),
            "sammonmap" | "sammon" => Ok(ProjectionMethod::Sammon(ProjectSammon::default())),
            _ => Err(GaugeError::UnknownMethod(name.to_string())),
        }
    }

    fn inner(&self) -> &dyn Projector {
        match self {
            ProjectionMethod::Coordinate(p) => p,
            ProjectionMethod::Pca(p) => p,
            ProjectionMethod::Sammon(p) => p,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Projector {
        match self {
            ProjectionMethod::Coordinate(p) => p,
            ProjectionMethod::Pca(p) => p,
            ProjectionMethod::Sammon(p) => p,
        }
    }
}

impl Projector for ProjectionMethod {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn is_iterable(&self) -> bool {
        self.inner().is_iterable()
    }

    fn init(&mut self, upstairs: &Dataset, downstairs: &mut Dataset) -> Result<(), GaugeError> {
        self.inner_mut().init(upstairs, downstairs)
    }

    fn iterate(&mut self, upstairs: &Dataset, downstairs: &mut Dataset) -> Result<f64, GaugeError> {
        self.inner_mut().iterate(upstairs, downstairs)
    }

    fn error(&self) -> f64 {
        self.inner().error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry() {
        for name in ProjectionMethod::NAMES {
            assert_eq!(ProjectionMethod::from_name(name).unwrap().name(), name);
        }
        assert!(ProjectionMethod::from_name("sammon").unwrap().is_iterable());
        assert!(!ProjectionMethod::from_name("PCA").unwrap().is_iterable());
        assert!(matches!(ProjectionMethod::from_name("t-SNE"), Err(GaugeError::UnknownMethod(_))));
    }

    #[test]
    fn compatibility() {
        let up = Dataset::zeros(3, 4);
        assert!(check_compatible(&up, &Dataset::zeros(2, 4)).is_ok());
        assert!(check_compatible(&up, &Dataset::zeros(2, 3)).is_err());
        assert!(check_compatible(&up, &Dataset::zeros(4, 4)).is_err());
        assert!(check_compatible(&up, &Dataset::zeros(0, 4)).is_err());
        // one dimensional data is still drawn in the plane
        assert!(check_compatible(&Dataset::zeros(1, 4), &Dataset::zeros(2, 4)).is_ok());
    }
}
