//! Lazy operator expressions
//!
//! Binary operators over tensor references build an [`Expr`] tree instead of
//! materializing intermediates. The tree is a closed tagged-variant AST and
//! is evaluated eagerly into a concrete tensor at assignment time, with the
//! same domain checks as the direct elementwise operations.

use crate::error::TensorError;
use crate::math::Scalar;

use super::{Elementwise, Tensor};

/// Elementwise binary operation between two tensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZipOp {
    /// `a + b`
    Add,
    /// `a - b`
    Sub,
    /// `a * b`
    Mul,
    /// `a / b`
    Div,
}

impl ZipOp {
    /// Apply the operation to one pair of values.
    #[inline]
    pub fn apply<F: Scalar>(self, a: F, b: F) -> F {
        match self {
            ZipOp::Add => a + b,
            ZipOp::Sub => a - b,
            ZipOp::Mul => a * b,
            ZipOp::Div => a / b,
        }
    }
}

/// Broadcast operation against a single scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarOp<F> {
    /// `x + s`
    Add(F),
    /// `x - s`
    Sub(F),
    /// `x * s`
    Mul(F),
    /// `x / s`
    Div(F),
    /// `x^s`
    Pow(F),
}

impl<F: Scalar> ScalarOp<F> {
    /// Apply the operation to one value.
    #[inline]
    pub fn apply(self, x: F) -> F {
        match self {
            ScalarOp::Add(s) => x + s,
            ScalarOp::Sub(s) => x - s,
            ScalarOp::Mul(s) => x * s,
            ScalarOp::Div(s) => x / s,
            ScalarOp::Pow(s) => x.powf(s),
        }
    }
}

/// Lazy elementwise expression over tensors of one kind.
///
/// Leaves hold cheap handles to their operands; nothing is computed until
/// [`eval`](Expr::eval). Evaluation of a leaf deep-copies it, so evaluating
/// an expression never aliases the tensors it was built from.
#[derive(Debug, Clone)]
pub enum Expr<T: Tensor> {
    /// A concrete tensor operand.
    Value(T),
    /// A scalar broadcast applied to a subexpression.
    Map {
        /// The broadcast operation, carrying its scalar.
        op: ScalarOp<T::Elem>,
        /// Operand expression.
        inner: Box<Expr<T>>,
    },
    /// An elementwise combination of two subexpressions.
    Zip {
        /// The elementwise operation.
        op: ZipOp,
        /// Left operand expression.
        lhs: Box<Expr<T>>,
        /// Right operand expression.
        rhs: Box<Expr<T>>,
    },
}

// TODO: collapse adjacent Map nodes (e.g. *2 then *3) into one traversal
// once expression shapes from real callers justify it.

impl<T: Elementwise> Expr<T> {
    /// Evaluate eagerly into a concrete tensor, checking domains at every
    /// zip node before anything is combined.
    pub fn eval(&self) -> Result<T, TensorError> {
        match self {
            Expr::Value(tensor) => Ok(tensor.copy()),
            Expr::Map { op, inner } => {
                let op = *op;
                let mut out = inner.eval()?;
                out.map_assign(|x| op.apply(x));
                Ok(out)
            }
            Expr::Zip { op, lhs, rhs } => {
                let mut out = lhs.eval()?;
                let rhs = rhs.eval()?;
                out.combine(*op, &rhs)?;
                Ok(out)
            }
        }
    }

    /// Elementwise power of the whole expression.
    #[must_use]
    pub fn powf(self, exp: T::Elem) -> Self {
        self.map(ScalarOp::Pow(exp))
    }

    pub(crate) fn map(self, op: ScalarOp<T::Elem>) -> Self {
        Expr::Map {
            op,
            inner: Box::new(self),
        }
    }

    pub(crate) fn zip(op: ZipOp, lhs: Self, rhs: Self) -> Self {
        Expr::Zip {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}

impl<'a, T: Elementwise> From<&'a T> for Expr<T> {
    fn from(tensor: &'a T) -> Self {
        Expr::Value(tensor.clone())
    }
}
