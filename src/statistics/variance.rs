use crate::math::Scalar;
use crate::tensor::Tensor;

use super::{Mean, Statistic};

/// Variance over the full domain with a degrees-of-freedom adjustment.
#[derive(Debug, Clone, Copy)]
pub struct Variance {
    /// Delta degrees of freedom subtracted from the key count.
    pub ddof: usize,
}

impl Variance {
    /// Creates a new `Variance` estimator with the given degrees of freedom
    /// adjustment.
    ///
    /// - `ddof = 0`: population variance (biased)
    /// - `ddof = 1`: sample variance (unbiased, Bessel's correction) — this is the default
    pub fn new(ddof: usize) -> Self {
        Variance { ddof }
    }
}

impl Default for Variance {
    /// Returns a `Variance` estimator with `ddof = 1` (unbiased sample variance).
    fn default() -> Self {
        Variance { ddof: 1 }
    }
}

impl<T, F> Statistic<T, F> for Variance
where
    T: Tensor<Elem = F>,
    F: Scalar,
{
    fn compute(&self, data: &T) -> F {
        let n = data.domain_len();

        // Variance undefined for n < 2 or once the adjustment eats the count
        if n < 2 || n <= self.ddof {
            return F::nan();
        }

        let mean = Mean.compute(data);

        // Kahan summation for squared deviations of the active values
        let (sq_sum, _) = data.fold_active((F::zero(), F::zero()), |(sum, comp), x| {
            let dev = x - mean;
            let y = dev * dev - comp;
            let t = sum + y;
            (t, (t - sum) - y)
        });

        // Inactive keys all sit at the same squared deviation
        let rest = n - data.active_len();
        let total = if rest > 0 {
            let dev = data.default_value() - mean;
            sq_sum + F::from_count(rest) * dev * dev
        } else {
            sq_sum
        };

        total / F::from_count(n - self.ddof)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::domain::Domain;
    use crate::tensor::Tensor1;

    fn reference_variance(values: &[f64], ddof: usize) -> f64 {
        let mean: f64 = values.iter().sum::<f64>() / values.len() as f64;
        let sq: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
        sq / (values.len() - ddof) as f64
    }

    #[test]
    fn undefined_below_two_keys() {
        let t = Tensor1::<usize, f64>::zeros(Domain::indexed(1));
        assert!(Variance::default().compute(&t).is_nan());
    }

    #[test]
    fn defaults_enter_the_spread() {
        let t = Tensor1::from_entries(
            Domain::indexed(4),
            [(0usize, 6.0)],
            2.0,
        )
        .unwrap();
        let expected = reference_variance(&[6.0, 2.0, 2.0, 2.0], 1);
        assert_abs_diff_eq!(Variance::default().compute(&t), expected, epsilon = 1e-12);
    }

    #[test]
    fn population_variance_uses_the_full_count() {
        let values = [1.0_f64, 3.0, 5.0, 7.0];
        let t = Tensor1::from_entries(
            Domain::indexed(4),
            values.iter().copied().enumerate(),
            0.0,
        )
        .unwrap();
        assert_abs_diff_eq!(
            Variance::new(0).compute(&t),
            reference_variance(&values, 0),
            epsilon = 1e-12
        );
    }
}
