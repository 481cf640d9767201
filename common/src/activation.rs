/// The transfer functions a unit can apply to its net input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransferFunction {
    /// The identity function
    Identity,
    /// Linear, but clipped to `[lower, upper]`
    ClippedLinear {
        /// Lower bound of the activation
        lower: f64,
        /// Upper bound of the activation
        upper: f64,
    },
    /// The hyperbolic tangent
    Tanh,
    /// The logistic sigmoid `1 / (1 + e^-x)`
    Logistic,
    /// The rectified linear unit
    Relu,
}

impl Default for TransferFunction {
    fn default() -> Self {
        TransferFunction::Identity
    }
}

impl TransferFunction {
    /// Apply the function to a net input
    #[inline]
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            TransferFunction::Identity => x,
            TransferFunction::ClippedLinear { lower, upper } => x.max(*lower).min(*upper),
            TransferFunction::Tanh => x.tanh(),
            TransferFunction::Logistic => 1.0 / (1.0 + (-x).exp()),
            TransferFunction::Relu => x.max(0.0),
        }
    }

    /// Derivative with respect to the net input, evaluated at `x`
    #[inline]
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            TransferFunction::Identity => 1.0,
            TransferFunction::ClippedLinear { lower, upper } => {
                if x >= *lower && x <= *upper {
                    1.0
                } else {
                    0.0
                }
            }
            TransferFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            TransferFunction::Logistic => {
                let s = self.apply(x);
                s * (1.0 - s)
            }
            TransferFunction::Relu => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// The net input that produces activation `y`.
    /// Values outside the range of a sigmoidal yield a non-finite result.
    #[inline]
    pub fn inverse(&self, y: f64) -> f64 {
        match self {
            TransferFunction::Identity | TransferFunction::ClippedLinear { .. } => y,
            TransferFunction::Tanh => y.atanh(),
            TransferFunction::Logistic => (y / (1.0 - y)).ln(),
            TransferFunction::Relu => {
                if y >= 0.0 {
                    y
                } else {
                    f64::NAN
                }
            }
        }
    }

    /// Whether this is one of the saturating s-shaped functions
    #[inline(always)]
    pub fn is_sigmoidal(&self) -> bool {
        matches!(self, TransferFunction::Tanh | TransferFunction::Logistic)
    }

    /// Perform the transfer function over all elements
    pub fn activate(&self, vals: &mut [f64]) {
        for v in vals {
            *v = self.apply(*v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoidal_inverse() {
        for f in [TransferFunction::Logistic, TransferFunction::Tanh] {
            for x in [-2.0, -0.3, 0.0, 0.7, 1.5] {
                assert!((f.inverse(f.apply(x)) - x).abs() < 1e-9, "{:?} at {}", f, x);
            }
        }
        assert!(!TransferFunction::Logistic.inverse(1.0).is_finite());
        assert!(TransferFunction::Tanh.inverse(-1.5).is_nan());
    }

    #[test]
    fn derivatives_match_finite_differences() {
        let h = 1e-6;
        for f in [TransferFunction::Identity, TransferFunction::Tanh, TransferFunction::Logistic] {
            for x in [-1.2, 0.1, 0.9] {
                let numeric = (f.apply(x + h) - f.apply(x - h)) / (2.0 * h);
                assert!((f.derivative(x) - numeric).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn clipped_linear() {
        let f = TransferFunction::ClippedLinear {
            lower: 0.0,
            upper: 1.0,
        };
        assert_eq!(f.apply(-0.5), 0.0);
        assert_eq!(f.apply(0.25), 0.25);
        assert_eq!(f.apply(3.0), 1.0);
        assert_eq!(f.derivative(3.0), 0.0);
        assert!(!f.is_sigmoidal());
    }
}
