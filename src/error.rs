use std::fmt;

use thiserror::Error;

/// Failures of domain-checked tensor operations.
///
/// Both variants are fatal to the call that raised them: an operation either
/// applies in full or leaves its operands untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TensorError {
    /// The operands' index domains are not structurally equal.
    #[error("incompatible domains: left operand indexes {left} keys, right operand {right}")]
    DomainMismatch {
        /// Number of keys in the left operand's domain.
        left: usize,
        /// Number of keys in the right operand's domain.
        right: usize,
    },

    /// A key outside the tensor's domain, or a projection access outside its
    /// fixed coordinate.
    #[error("index out of range: {key}")]
    IndexOutOfRange {
        /// Debug rendering of the offending key.
        key: String,
    },
}

impl TensorError {
    #[inline]
    pub(crate) fn index(key: &impl fmt::Debug) -> Self {
        TensorError::IndexOutOfRange {
            key: format!("{key:?}"),
        }
    }

    #[inline]
    pub(crate) fn mismatch(left: usize, right: usize) -> Self {
        TensorError::DomainMismatch { left, right }
    }
}
