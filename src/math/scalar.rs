//! Numeric element trait
//!
//! Tensor entries are generic over a single scalar trait rather than being
//! specialized per primitive: monomorphization gives `f32`/`f64` their own
//! code paths for free. `num-traits::Float` is not the minimal algebraic
//! requirement, but it is the practical computational model for a field
//! containing ℝ.

use std::fmt;

use num_traits::{Float, FromPrimitive};

/// Scalar field of a tensor.
///
/// The `Copy` bound restricts entries to stack-allocated numeric types.
pub trait Scalar: Float + FromPrimitive + Copy + fmt::Debug {
    /// Convert a key count to the scalar field.
    /// Panics on overflow.
    #[inline(always)]
    fn from_count(n: usize) -> Self {
        <Self as FromPrimitive>::from_usize(n).expect("usize-to-float conversion failed")
    }
}

impl<F> Scalar for F where F: Float + FromPrimitive + Copy + fmt::Debug {}
