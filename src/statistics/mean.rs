use crate::math::Scalar;
use crate::tensor::Tensor;

use super::Statistic;

/// Arithmetic mean over the full domain, using **Kahan summation** over the
/// active values to minimize floating-point error accumulation. The inactive
/// remainder contributes a single counted `default` term.
#[derive(Clone, Copy, Default)]
pub struct Mean;

impl<T, F> Statistic<T, F> for Mean
where
    T: Tensor<Elem = F>,
    F: Scalar,
{
    fn compute(&self, data: &T) -> F {
        let n = data.domain_len();
        if n == 0 {
            return F::nan();
        }

        // Kahan summation: compensates for floating-point rounding errors
        let (sum, _) = data.fold_active((F::zero(), F::zero()), |(sum, comp), x| {
            let y = x - comp;
            let t = sum + y;
            (t, (t - sum) - y)
        });

        let rest = n - data.active_len();
        let total = if rest > 0 {
            sum + F::from_count(rest) * data.default_value()
        } else {
            sum
        };

        // Length conversion is exact for practical domain sizes
        total * F::from_count(n).recip()
    }
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;
    use crate::domain::Domain;
    use crate::tensor::Tensor1;

    #[test]
    fn empty_domain_returns_nan() {
        let t = Tensor1::<usize, f64>::zeros(Domain::indexed(0));
        assert!(Mean.compute(&t).is_nan());
    }

    #[test]
    fn inactive_keys_contribute_the_default() {
        // Two active values and three defaults: (4 + 1 + 3·2) / 5 = 2.2
        let t = Tensor1::from_entries(
            Domain::indexed(5),
            [(0usize, 4.0), (1, 1.0)],
            2.0,
        )
        .unwrap();
        assert_abs_diff_eq!(Mean.compute(&t), 2.2, epsilon = 1e-12);
    }

    #[test]
    fn fully_active_tensor_matches_the_plain_mean() {
        let values = [1.0_f64, 2.0, 3.0, 4.0, 5.0];
        let t = Tensor1::from_entries(
            Domain::indexed(5),
            values.iter().copied().enumerate(),
            0.0,
        )
        .unwrap();
        assert_abs_diff_eq!(Mean.compute(&t), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn views_reduce_like_their_underlying_tensor() {
        let t = Tensor1::from_entries(
            Domain::indexed(3),
            [(0usize, 1.0), (2, 5.0)],
            -1.0,
        )
        .unwrap();
        let expected = Mean.compute(&t);
        assert_abs_diff_eq!(Mean.compute(&t.column("c")), expected, epsilon = 1e-12);
        assert_abs_diff_eq!(
            Mean.compute(&t.column("c").transpose()),
            expected,
            epsilon = 1e-12
        );
    }

    #[test]
    fn maintains_precision_at_scale() {
        let n = 10_000;
        let small = 1e-10_f64;
        let t = Tensor1::from_entries(
            Domain::indexed(n),
            (0..n).map(|k| (k, small)),
            0.0,
        )
        .unwrap();
        assert_relative_eq!(Mean.compute(&t), small, max_relative = 1e-13);
    }
}
