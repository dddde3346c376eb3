use crate::math::Scalar;
use crate::tensor::Tensor;

use super::Statistic;

/// p-norm over the full domain: `(Σ |x|^p)^(1/p)`.
///
/// `p = 1` and `p = 2` skip the `powf` round-trips entirely.
#[derive(Debug, Clone, Copy)]
pub struct Norm {
    p: f64,
}

impl Norm {
    /// Norm of order `p ∈ [1, ∞)`.
    #[inline]
    pub fn new(p: f64) -> Self {
        debug_assert!(p >= 1.0, "Norm requires p >= 1");
        Self { p }
    }

    /// Sum of absolute values.
    #[inline]
    pub fn l1() -> Self {
        Self { p: 1.0 }
    }

    /// Euclidean norm.
    #[inline]
    pub fn l2() -> Self {
        Self { p: 2.0 }
    }
}

impl Default for Norm {
    /// The Euclidean norm.
    fn default() -> Self {
        Self::l2()
    }
}

impl<T, F> Statistic<T, F> for Norm
where
    T: Tensor<Elem = F>,
    F: Scalar,
{
    fn compute(&self, data: &T) -> F {
        let n = data.domain_len();
        if n == 0 {
            return F::zero();
        }

        let p = F::from_f64(self.p).expect("p fits the scalar field");
        let power = |x: F| {
            if self.p == 1.0 {
                x.abs()
            } else if self.p == 2.0 {
                x * x
            } else {
                x.abs().powf(p)
            }
        };

        let (sum, _) = data.fold_active((F::zero(), F::zero()), |(sum, comp), x| {
            let y = power(x) - comp;
            let t = sum + y;
            (t, (t - sum) - y)
        });
        let rest = n - data.active_len();
        let total = if rest > 0 {
            sum + F::from_count(rest) * power(data.default_value())
        } else {
            sum
        };

        if self.p == 1.0 {
            total
        } else if self.p == 2.0 {
            total.sqrt()
        } else {
            total.powf(p.recip())
        }
    }
}

/// Supremum norm: the largest absolute value over the full domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxNorm;

impl<T, F> Statistic<T, F> for MaxNorm
where
    T: Tensor<Elem = F>,
    F: Scalar,
{
    fn compute(&self, data: &T) -> F {
        let largest = data.fold_active(F::zero(), |acc, x| acc.max(x.abs()));
        if data.active_len() < data.domain_len() {
            largest.max(data.default_value().abs())
        } else {
            largest
        }
    }
}
