//! Column standardization applied to a dataset before projection.

use ndarray::{Array2, Axis};

/// Column-wise transform from the raw to the scaled feature matrix
pub trait Scaler {
    fn scale(&self, data: &Array2<f64>) -> Array2<f64>;
}

/// Centers every column on its mean and optionally divides by its standard deviation
///
/// The standard deviation is the population one (`ddof = 0`). Columns with
/// (near-)zero spread keep a scale of 1, so constant columns become all zeros
/// instead of NaN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardScaler {
    with_std: bool,
}

impl StandardScaler {
    pub fn new(with_std: bool) -> Self {
        Self { with_std }
    }

    pub fn center_only() -> Self {
        Self::new(false)
    }
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Scaler for StandardScaler {
    fn scale(&self, data: &Array2<f64>) -> Array2<f64> {
        let Some(mean) = data.mean_axis(Axis(0)) else {
            return data.clone();
        };

        let mut scaled = data - &mean;

        if self.with_std {
            let spread = data
                .std_axis(Axis(0), 0.0)
                .mapv(|std| if std < 10.0 * f64::EPSILON { 1.0 } else { std });
            scaled /= &spread;
        }

        scaled
    }
}
