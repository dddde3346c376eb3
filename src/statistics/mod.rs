//! Statistical reductions over tensors.
//!
//! Every reduction ranges over the *full* domain: active values plus the
//! default for each inactive key, per the uniform-default invariant of the
//! partial-map model.

mod mean;
mod norm;
mod variance;

pub use mean::Mean;
pub use norm::{MaxNorm, Norm};
pub use variance::Variance;

use num_traits::Float;

use crate::tensor::Elementwise;

/// A reduction of `D` into `T`.
pub trait Statistic<D, T> {
    /// Compute the statistic from the data.
    fn compute(&self, data: &D) -> T;
}

/// Produce a standardized copy of the data under this estimator.
pub trait Standardize<D> {
    /// The standardized copy; the input is untouched.
    #[must_use]
    fn standardize(&self, data: &D) -> D;
}

impl<T: Elementwise> Standardize<T> for Mean {
    /// Recenter: subtract the mean from the default and every active value.
    fn standardize(&self, data: &T) -> T {
        let mean = self.compute(data);
        let mut out = data.copy();
        out.map_assign(|x| x - mean);
        out
    }
}

impl<T: Elementwise> Standardize<T> for Variance {
    /// Rescale by the standard deviation under this estimator's `ddof`.
    fn standardize(&self, data: &T) -> T {
        let sd = self.compute(data).sqrt();
        let mut out = data.copy();
        out.map_assign(|x| x / sd);
        out
    }
}
