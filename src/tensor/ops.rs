//! Operator overloading.
//!
//! Scalar compound assignment (`*= /= += -=`) mutates in place; the binary
//! operators (`+ - * /`) over tensor references, expressions, and right-hand
//! scalars build a lazy [`Expr`] instead of materializing intermediates.
//! The impls are stamped out per concrete tensor type: the orphan rules rule
//! out one blanket impl over `&T`.

use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};

use crate::math::Scalar;

use super::expr::{Expr, ScalarOp, ZipOp};
use super::tensor1::Tensor1;
use super::tensor2::Tensor2;
use super::Elementwise;

macro_rules! impl_expr_op {
    ($ty:ident<$($kg:ident),+>, $op:ident, $method:ident, $zip:expr, $sop:expr) => {
        impl<'a, 'b, $($kg: Ord + Clone + fmt::Debug,)+ F: Scalar> $op<&'b $ty<$($kg,)+ F>>
            for &'a $ty<$($kg,)+ F>
        {
            type Output = Expr<$ty<$($kg,)+ F>>;

            fn $method(self, rhs: &'b $ty<$($kg,)+ F>) -> Self::Output {
                Expr::zip($zip, Expr::from(self), Expr::from(rhs))
            }
        }

        impl<'a, $($kg: Ord + Clone + fmt::Debug,)+ F: Scalar> $op<Expr<$ty<$($kg,)+ F>>>
            for &'a $ty<$($kg,)+ F>
        {
            type Output = Expr<$ty<$($kg,)+ F>>;

            fn $method(self, rhs: Expr<$ty<$($kg,)+ F>>) -> Self::Output {
                Expr::zip($zip, Expr::from(self), rhs)
            }
        }

        impl<'a, $($kg: Ord + Clone + fmt::Debug,)+ F: Scalar> $op<&'a $ty<$($kg,)+ F>>
            for Expr<$ty<$($kg,)+ F>>
        {
            type Output = Expr<$ty<$($kg,)+ F>>;

            fn $method(self, rhs: &'a $ty<$($kg,)+ F>) -> Self::Output {
                Expr::zip($zip, self, Expr::from(rhs))
            }
        }

        impl<$($kg: Ord + Clone + fmt::Debug,)+ F: Scalar> $op<Expr<$ty<$($kg,)+ F>>>
            for Expr<$ty<$($kg,)+ F>>
        {
            type Output = Expr<$ty<$($kg,)+ F>>;

            fn $method(self, rhs: Expr<$ty<$($kg,)+ F>>) -> Self::Output {
                Expr::zip($zip, self, rhs)
            }
        }

        impl<'a, $($kg: Ord + Clone + fmt::Debug,)+ F: Scalar> $op<F> for &'a $ty<$($kg,)+ F> {
            type Output = Expr<$ty<$($kg,)+ F>>;

            fn $method(self, rhs: F) -> Self::Output {
                Expr::from(self).map($sop(rhs))
            }
        }

        impl<$($kg: Ord + Clone + fmt::Debug,)+ F: Scalar> $op<F> for Expr<$ty<$($kg,)+ F>> {
            type Output = Expr<$ty<$($kg,)+ F>>;

            fn $method(self, rhs: F) -> Self::Output {
                self.map($sop(rhs))
            }
        }
    };
}

macro_rules! impl_scalar_assign {
    ($ty:ident<$($kg:ident),+>) => {
        impl<$($kg: Ord + Clone + fmt::Debug,)+ F: Scalar> MulAssign<F> for $ty<$($kg,)+ F> {
            /// Scaling by exactly one is a no-op: no traversal happens.
            fn mul_assign(&mut self, rhs: F) {
                if rhs == F::one() {
                    return;
                }
                self.map_assign(|x| x * rhs);
            }
        }

        impl<$($kg: Ord + Clone + fmt::Debug,)+ F: Scalar> DivAssign<F> for $ty<$($kg,)+ F> {
            /// Dividing by exactly one is a no-op: no traversal happens.
            fn div_assign(&mut self, rhs: F) {
                if rhs == F::one() {
                    return;
                }
                self.map_assign(|x| x / rhs);
            }
        }

        impl<$($kg: Ord + Clone + fmt::Debug,)+ F: Scalar> AddAssign<F> for $ty<$($kg,)+ F> {
            fn add_assign(&mut self, rhs: F) {
                self.map_assign(|x| x + rhs);
            }
        }

        impl<$($kg: Ord + Clone + fmt::Debug,)+ F: Scalar> SubAssign<F> for $ty<$($kg,)+ F> {
            fn sub_assign(&mut self, rhs: F) {
                self.map_assign(|x| x - rhs);
            }
        }
    };
}

macro_rules! impl_tensor_arith {
    ($ty:ident<$($kg:ident),+>) => {
        impl_expr_op!($ty<$($kg),+>, Add, add, ZipOp::Add, ScalarOp::Add);
        impl_expr_op!($ty<$($kg),+>, Sub, sub, ZipOp::Sub, ScalarOp::Sub);
        impl_expr_op!($ty<$($kg),+>, Mul, mul, ZipOp::Mul, ScalarOp::Mul);
        impl_expr_op!($ty<$($kg),+>, Div, div, ZipOp::Div, ScalarOp::Div);
        impl_scalar_assign!($ty<$($kg),+>);
    };
}

impl_tensor_arith!(Tensor1<K>);
impl_tensor_arith!(Tensor2<R, C>);

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use crate::domain::Domain;
    use crate::error::TensorError;
    use crate::tensor::{Elementwise, Tensor, Tensor1, ZipOp};

    fn vector(entries: &[(usize, f64)], default: f64) -> Tensor1<usize, f64> {
        Tensor1::from_entries(Domain::indexed(4), entries.iter().copied(), default)
            .expect("keys lie in the domain")
    }

    #[test]
    fn expressions_evaluate_elementwise() {
        let a = vector(&[(0, 1.0), (1, 2.0)], 0.0);
        let b = vector(&[(1, 3.0)], 1.0);

        let sum = (&a + &b).eval().unwrap();
        assert_abs_diff_eq!(sum.get(&0).unwrap(), 2.0);
        assert_abs_diff_eq!(sum.get(&1).unwrap(), 5.0);
        assert_abs_diff_eq!(sum.default_value(), 1.0);

        let scaled = ((&a - &b) * 2.0).eval().unwrap();
        assert_abs_diff_eq!(scaled.get(&1).unwrap(), -2.0);
        assert_abs_diff_eq!(scaled.default_value(), -2.0);
    }

    #[test]
    fn expressions_nest_and_broadcast_scalars() {
        let a = vector(&[(0, 2.0)], 1.0);
        let b = vector(&[(0, 4.0)], 2.0);

        let expr = ((&a * &b) + 1.0).powf(2.0);
        let out = expr.eval().unwrap();
        assert_abs_diff_eq!(out.get(&0).unwrap(), 81.0);
        assert_abs_diff_eq!(out.default_value(), 9.0);
    }

    #[test]
    fn evaluation_never_aliases_the_operands() {
        let a = vector(&[(0, 1.0)], 0.0);
        let mut out = (&a + 0.0).eval().unwrap();
        out.set(0, 100.0).unwrap();
        assert_abs_diff_eq!(a.get(&0).unwrap(), 1.0);
    }

    #[test]
    fn compound_assignment_from_an_expression() {
        let mut a = vector(&[(0, 1.0)], 0.5);
        let b = vector(&[(0, 3.0)], 1.5);

        // `a` may appear in the expression: it is materialized first.
        let expr = &b + (&a * 2.0);
        a.combine_expr(ZipOp::Add, &expr).unwrap();
        assert_abs_diff_eq!(a.get(&0).unwrap(), 6.0);
        assert_abs_diff_eq!(a.default_value(), 3.0);
    }

    #[test]
    fn assign_from_an_expression() {
        let mut a = vector(&[], 0.0);
        let b = vector(&[(2, 4.0)], 1.0);
        a.assign_expr(&(&b / 2.0)).unwrap();
        assert_abs_diff_eq!(a.get(&2).unwrap(), 2.0);
        assert_abs_diff_eq!(a.default_value(), 0.5);
    }

    #[test]
    fn domain_mismatch_surfaces_at_evaluation() {
        let a = vector(&[], 0.0);
        let b: Tensor1<usize, f64> = Tensor1::filled(Domain::indexed(2), 0.0);
        let expr = &a + &b;
        assert!(matches!(
            expr.eval(),
            Err(TensorError::DomainMismatch { .. })
        ));
    }
}
