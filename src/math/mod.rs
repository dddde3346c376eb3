//! Numeric foundations shared by every tensor kind.

mod scalar;

pub use scalar::Scalar;
