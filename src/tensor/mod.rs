//! Partial-map tensors
//!
//! A tensor here is a mutable mapping from an immutable key [`Domain`] to
//! scalar values. Only the *active* subset of keys is stored explicitly;
//! every other key of the domain uniformly carries the tensor's *default*
//! value. The [`Tensor`] trait is the read side every reduction consumes;
//! [`Elementwise`] adds the domain-checked mutation family shared by
//! vectors, matrices, and their views.
//!
//! [`Domain`]: crate::Domain

mod expr;
mod ops;
mod read;
mod tensor1;
mod tensor2;

use std::collections::BTreeMap;

pub use expr::{Expr, ScalarOp, ZipOp};
pub use read::ReadError;
pub use tensor1::Tensor1;
pub use tensor2::Tensor2;

use num_traits::{Float, Zero};

use crate::error::TensorError;
use crate::math::Scalar;

/// Active entries plus the uniform default for everything else.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PartialMap<K, F> {
    pub(crate) entries: BTreeMap<K, F>,
    pub(crate) default: F,
}

impl<K: Ord, F: Scalar> PartialMap<K, F> {
    pub(crate) fn new(default: F) -> Self {
        Self {
            entries: BTreeMap::new(),
            default,
        }
    }

    /// Value at `key`: the active entry, or the default.
    #[inline]
    pub(crate) fn value(&self, key: &K) -> F {
        self.entries.get(key).copied().unwrap_or(self.default)
    }

    /// Write `key` into the active set.
    #[inline]
    pub(crate) fn store(&mut self, key: K, value: F) {
        self.entries.insert(key, value);
    }

    /// Apply `f` to the default and to every active entry.
    pub(crate) fn map_assign(&mut self, f: impl Fn(F) -> F) {
        self.default = f(self.default);
        for value in self.entries.values_mut() {
            *value = f(*value);
        }
    }
}

/// Read access shared by every tensor kind, views included.
pub trait Tensor {
    /// Index key type; `(row, col)` pairs for two-axis tensors.
    type Key: Ord + Clone;
    /// Scalar element type.
    type Elem: Scalar;

    /// Total number of keys in the domain.
    fn domain_len(&self) -> usize;

    /// Number of explicitly stored keys.
    fn active_len(&self) -> usize;

    /// The value carried by every key outside the active set.
    fn default_value(&self) -> Self::Elem;

    /// Domain-checked read.
    fn value(&self, key: &Self::Key) -> Result<Self::Elem, TensorError>;

    /// Snapshot of the active keys. Views derive this from the underlying
    /// storage (a transpose swaps each pair) rather than storing their own.
    fn active_keys(&self) -> Vec<Self::Key>;

    /// Fold over the active values only; inactive keys are accounted for by
    /// callers through [`default_value`](Tensor::default_value) and the
    /// active/domain counts.
    fn fold_active<A>(&self, init: A, f: impl FnMut(A, Self::Elem) -> A) -> A;
}

/// In-place arithmetic over tensors of a common domain.
///
/// Every elementwise operation is all-or-nothing: domains are compared
/// before any mutation, and a [`TensorError::DomainMismatch`] leaves both
/// operands untouched. A successful update writes the scalar op of the two
/// defaults into the default and the elementwise op into every key of the
/// union of both active sets, so the union structure of the operands is
/// preserved.
pub trait Elementwise: Tensor + Clone + Sized {
    /// Independent deep copy. `Clone` on a tensor is a cheap handle that
    /// aliases the same storage; `copy` never does.
    fn copy(&self) -> Self;

    /// Apply `f` to the default value and every active entry in place.
    fn map_assign(&mut self, f: impl Fn(Self::Elem) -> Self::Elem);

    /// Combine with `other` under `f`, writing into `self`.
    ///
    /// The right operand is snapshotted before the first write, so an
    /// operand aliasing `self` (another handle, or a transpose of it) is
    /// read consistently.
    fn zip_assign_with(
        &mut self,
        other: &Self,
        f: impl Fn(Self::Elem, Self::Elem) -> Self::Elem,
    ) -> Result<(), TensorError>;

    /// Set the default to zero and clear every active entry to zero. The
    /// active set itself is retained.
    fn zero(&mut self) {
        self.map_assign(|_| Self::Elem::zero());
    }

    /// In-place elementwise power.
    fn pow_assign(&mut self, exp: Self::Elem) {
        self.map_assign(|x| x.powf(exp));
    }

    /// Elementwise `:=`; `self` takes the values of `other`.
    fn assign(&mut self, other: &Self) -> Result<(), TensorError> {
        self.zip_assign_with(other, |_, b| b)
    }

    /// Elementwise compound assignment under `op`.
    fn combine(&mut self, op: ZipOp, other: &Self) -> Result<(), TensorError> {
        self.zip_assign_with(other, move |a, b| op.apply(a, b))
    }

    /// `:+=`
    fn add_from(&mut self, other: &Self) -> Result<(), TensorError> {
        self.combine(ZipOp::Add, other)
    }

    /// `:-=`
    fn sub_from(&mut self, other: &Self) -> Result<(), TensorError> {
        self.combine(ZipOp::Sub, other)
    }

    /// `:*=`
    fn mul_from(&mut self, other: &Self) -> Result<(), TensorError> {
        self.combine(ZipOp::Mul, other)
    }

    /// `:/=`
    fn div_from(&mut self, other: &Self) -> Result<(), TensorError> {
        self.combine(ZipOp::Div, other)
    }

    /// Assign from a lazy expression, evaluated to a concrete tensor first.
    fn assign_expr(&mut self, expr: &Expr<Self>) -> Result<(), TensorError> {
        let value = expr.eval()?;
        self.assign(&value)
    }

    /// Compound-assign from a lazy expression under `op`. The expression is
    /// evaluated to a concrete tensor before combining, so `self` may appear
    /// inside it.
    fn combine_expr(&mut self, op: ZipOp, expr: &Expr<Self>) -> Result<(), TensorError> {
        let value = expr.eval()?;
        self.combine(op, &value)
    }
}
