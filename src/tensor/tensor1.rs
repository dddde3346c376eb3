//! One-axis tensors (vectors).

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use rand::Rng;

use crate::domain::Domain;
use crate::error::TensorError;
use crate::math::Scalar;
use crate::statistics::Statistic;

use super::{Elementwise, PartialMap, Tensor, Tensor2};

/// A vector: a partial map from a flat key domain to scalars.
///
/// Storage sits behind a shared cell so that projection views
/// ([`column`](Tensor1::column), [`row`](Tensor1::row)) can alias it.
pub struct Tensor1<K: Ord, F> {
    pub(crate) domain: Rc<Domain<K>>,
    pub(crate) cells: Rc<RefCell<PartialMap<K, F>>>,
}

impl<K: Ord, F> Clone for Tensor1<K, F> {
    /// Cheap handle clone: both handles alias the same storage. Use
    /// [`Elementwise::copy`] for an independent tensor.
    fn clone(&self) -> Self {
        Self {
            domain: Rc::clone(&self.domain),
            cells: Rc::clone(&self.cells),
        }
    }
}

impl<K: Ord + Clone + fmt::Debug, F: Scalar> fmt::Debug for Tensor1<K, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor1")
            .field("domain_len", &self.domain.len())
            .field("active_len", &self.active_len())
            .field("default", &self.default_value())
            .finish()
    }
}

impl<K: Ord + Clone + fmt::Debug, F: Scalar> Tensor1<K, F> {
    /// Tensor over `domain` with every key at `default` and nothing active.
    pub fn filled(domain: impl Into<Rc<Domain<K>>>, default: F) -> Self {
        Self {
            domain: domain.into(),
            cells: Rc::new(RefCell::new(PartialMap::new(default))),
        }
    }

    /// Tensor over `domain` with every key at zero.
    pub fn zeros(domain: impl Into<Rc<Domain<K>>>) -> Self {
        Self::filled(domain, F::zero())
    }

    /// Tensor with the given active entries and `default` elsewhere.
    /// Fails if an entry key is outside `domain`.
    pub fn from_entries(
        domain: impl Into<Rc<Domain<K>>>,
        entries: impl IntoIterator<Item = (K, F)>,
        default: F,
    ) -> Result<Self, TensorError> {
        let mut tensor = Self::filled(domain, default);
        for (key, value) in entries {
            tensor.set(key, value)?;
        }
        Ok(tensor)
    }

    /// Tensor with every key active, drawn uniformly from `[0, 1)`.
    pub fn random<R: Rng>(domain: impl Into<Rc<Domain<K>>>, rng: &mut R) -> Self {
        let domain = domain.into();
        let mut cells = PartialMap::new(F::zero());
        for key in domain.iter() {
            let value =
                F::from_f64(rng.gen_range(0.0..1.0)).expect("f64-to-float conversion failed");
            cells.store(key.clone(), value);
        }
        Self {
            domain,
            cells: Rc::new(RefCell::new(cells)),
        }
    }

    /// The index domain.
    pub fn domain(&self) -> &Domain<K> {
        &self.domain
    }

    /// Domain-checked read: the active value at `key`, or the default.
    pub fn get(&self, key: &K) -> Result<F, TensorError> {
        if !self.domain.contains(key) {
            return Err(TensorError::index(key));
        }
        Ok(self.cells.borrow().value(key))
    }

    /// Domain-checked write; `key` joins the active set.
    pub fn set(&mut self, key: K, value: F) -> Result<(), TensorError> {
        if !self.domain.contains(&key) {
            return Err(TensorError::index(&key));
        }
        self.cells.borrow_mut().store(key, value);
        Ok(())
    }

    /// Whether `key` is explicitly stored.
    pub fn is_active(&self, key: &K) -> bool {
        self.cells.borrow().entries.contains_key(key)
    }

    /// Dot product over the full domain, Kahan-compensated.
    ///
    /// Keys active in neither operand contribute one `default * default`
    /// term each; those are folded in as a single counted term.
    pub fn dot(&self, other: &Self) -> Result<F, TensorError> {
        self.check_domain(other)?;
        let a = self.cells.borrow();
        let b = other.cells.borrow();

        let union: BTreeSet<&K> = a.entries.keys().chain(b.entries.keys()).collect();
        let rest = self.domain.len() - union.len();
        let tail = (rest > 0).then(|| F::from_count(rest) * a.default * b.default);

        let mut sum = F::zero();
        let mut comp = F::zero();
        let terms = union
            .iter()
            .map(|&key| a.value(key) * b.value(key))
            .chain(tail);
        for x in terms {
            let y = x - comp;
            let t = sum + y;
            comp = (t - sum) - y;
            sum = t;
        }
        Ok(sum)
    }

    /// View this vector as the single column `column` of a two-axis tensor.
    /// Reads and writes delegate to this vector's storage.
    pub fn column<C: Ord + Clone + fmt::Debug>(&self, column: C) -> Tensor2<K, C, F> {
        Tensor2::column_view(self.clone(), column)
    }

    /// View this vector as the single row `row` of a two-axis tensor.
    pub fn row<R: Ord + Clone + fmt::Debug>(&self, row: R) -> Tensor2<R, K, F> {
        Tensor2::row_view(self.clone(), row)
    }

    /// Estimate a statistic from this tensor.
    pub fn estimate<Out>(&self, statistic: impl Statistic<Self, Out>) -> Out {
        statistic.compute(self)
    }

    pub(crate) fn check_domain(&self, other: &Self) -> Result<(), TensorError> {
        if Rc::ptr_eq(&self.domain, &other.domain) || self.domain == other.domain {
            Ok(())
        } else {
            Err(TensorError::mismatch(self.domain.len(), other.domain.len()))
        }
    }

    #[inline]
    pub(crate) fn value_unchecked(&self, key: &K) -> F {
        self.cells.borrow().value(key)
    }

    #[inline]
    pub(crate) fn store_unchecked(&mut self, key: K, value: F) {
        self.cells.borrow_mut().store(key, value);
    }

    #[inline]
    pub(crate) fn set_default_unchecked(&mut self, value: F) {
        self.cells.borrow_mut().default = value;
    }
}

impl<K: Ord + Clone + fmt::Debug, F: Scalar> Tensor for Tensor1<K, F> {
    type Key = K;
    type Elem = F;

    fn domain_len(&self) -> usize {
        self.domain.len()
    }

    fn active_len(&self) -> usize {
        self.cells.borrow().entries.len()
    }

    fn default_value(&self) -> F {
        self.cells.borrow().default
    }

    fn value(&self, key: &K) -> Result<F, TensorError> {
        self.get(key)
    }

    fn active_keys(&self) -> Vec<K> {
        self.cells.borrow().entries.keys().cloned().collect()
    }

    fn fold_active<A>(&self, init: A, mut f: impl FnMut(A, F) -> A) -> A {
        self.cells
            .borrow()
            .entries
            .values()
            .fold(init, |acc, &v| f(acc, v))
    }
}

impl<K: Ord + Clone + fmt::Debug, F: Scalar> Elementwise for Tensor1<K, F> {
    fn copy(&self) -> Self {
        Self {
            domain: Rc::clone(&self.domain),
            cells: Rc::new(RefCell::new(self.cells.borrow().clone())),
        }
    }

    fn map_assign(&mut self, f: impl Fn(F) -> F) {
        self.cells.borrow_mut().map_assign(f);
    }

    fn zip_assign_with(
        &mut self,
        other: &Self,
        f: impl Fn(F, F) -> F,
    ) -> Result<(), TensorError> {
        self.check_domain(other)?;

        // Snapshot both sides before the first write so an `other` aliasing
        // `self` reads pre-update values throughout.
        let (pairs, other_default) = {
            let a = self.cells.borrow();
            let b = other.cells.borrow();
            let union: BTreeSet<K> = a.entries.keys().chain(b.entries.keys()).cloned().collect();
            let pairs: Vec<(K, F, F)> = union
                .into_iter()
                .map(|key| {
                    let left = a.value(&key);
                    let right = b.value(&key);
                    (key, left, right)
                })
                .collect();
            (pairs, b.default)
        };

        let mut cells = self.cells.borrow_mut();
        cells.default = f(cells.default, other_default);
        for (key, left, right) in pairs {
            cells.store(key, f(left, right));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    use super::*;
    use crate::tensor::ZipOp;

    fn vector(entries: &[(usize, f64)], default: f64) -> Tensor1<usize, f64> {
        Tensor1::from_entries(
            Domain::indexed(6),
            entries.iter().copied(),
            default,
        )
        .expect("keys lie in the domain")
    }

    #[test]
    fn default_applies_to_every_inactive_key() {
        let t = vector(&[(1, 2.5)], -1.0);
        assert_abs_diff_eq!(t.get(&1).unwrap(), 2.5);
        assert_abs_diff_eq!(t.get(&0).unwrap(), -1.0);
        assert_abs_diff_eq!(t.get(&5).unwrap(), -1.0);
        assert!(t.is_active(&1));
        assert!(!t.is_active(&0));
    }

    #[test]
    fn access_outside_the_domain_errors() {
        let mut t = vector(&[], 0.0);
        assert!(matches!(
            t.get(&6),
            Err(TensorError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            t.set(9, 1.0),
            Err(TensorError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn from_entries_rejects_foreign_keys() {
        let result = Tensor1::from_entries(Domain::indexed(2), [(7usize, 1.0)], 0.0);
        assert!(matches!(result, Err(TensorError::IndexOutOfRange { .. })));
    }

    #[test]
    fn zero_clears_values_but_keeps_the_active_set() {
        let mut t = vector(&[(0, 3.0), (2, -4.0)], 9.0);
        t.zero();
        assert_abs_diff_eq!(t.get(&0).unwrap(), 0.0);
        assert_abs_diff_eq!(t.get(&2).unwrap(), 0.0);
        assert_abs_diff_eq!(t.default_value(), 0.0);
        assert_eq!(t.active_len(), 2);
    }

    #[test]
    fn scalar_ops_touch_active_values_and_the_default() {
        let mut t = vector(&[(0, 2.0)], 1.0);
        t *= 3.0;
        t += 0.5;
        assert_abs_diff_eq!(t.get(&0).unwrap(), 6.5);
        assert_abs_diff_eq!(t.get(&1).unwrap(), 3.5);

        t -= 0.5;
        t /= 3.0;
        assert_abs_diff_eq!(t.get(&0).unwrap(), 2.0);
        assert_abs_diff_eq!(t.default_value(), 1.0);
    }

    #[test]
    fn multiply_and_divide_by_one_change_nothing() {
        // Values chosen so any rounding detour would be visible bit-for-bit.
        let mut t = vector(&[(0, 0.1), (3, 1.0 / 3.0)], 0.7);
        let before: Vec<f64> = (0..6).map(|k| t.get(&k).unwrap()).collect();
        t *= 1.0;
        t /= 1.0;
        let after: Vec<f64> = (0..6).map(|k| t.get(&k).unwrap()).collect();
        assert_eq!(before, after);
        assert_eq!(t.default_value(), 0.7);
    }

    #[test]
    fn pow_assign_raises_default_and_active() {
        let mut t = vector(&[(2, 3.0)], 2.0);
        t.pow_assign(2.0);
        assert_abs_diff_eq!(t.get(&2).unwrap(), 9.0);
        assert_abs_diff_eq!(t.get(&0).unwrap(), 4.0);
    }

    #[test]
    fn add_then_sub_restores_the_original() {
        let mut a = vector(&[(0, 0.1), (4, -2.7)], 0.3);
        let b = vector(&[(1, 5.0), (4, 1.25)], -0.9);
        let before: Vec<f64> = (0..6).map(|k| a.get(&k).unwrap()).collect();

        a.add_from(&b).unwrap();
        a.sub_from(&b).unwrap();
        for (k, expected) in before.iter().enumerate() {
            assert_abs_diff_eq!(a.get(&k).unwrap(), *expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn elementwise_update_keeps_the_union_of_active_sets() {
        let mut a = vector(&[(0, 1.0)], 2.0);
        let b = vector(&[(5, 10.0)], 3.0);
        a.add_from(&b).unwrap();

        assert!(a.is_active(&0));
        assert!(a.is_active(&5));
        assert_eq!(a.active_len(), 2);
        // Defaults combine under the same operation.
        assert_abs_diff_eq!(a.default_value(), 5.0);
        assert_abs_diff_eq!(a.get(&0).unwrap(), 4.0);
        assert_abs_diff_eq!(a.get(&5).unwrap(), 12.0);
    }

    #[test]
    fn assign_takes_the_right_operand_values() {
        let mut a = vector(&[(0, 1.0)], 2.0);
        let b = vector(&[(3, 7.0)], -1.0);
        a.assign(&b).unwrap();
        assert_abs_diff_eq!(a.get(&0).unwrap(), -1.0);
        assert_abs_diff_eq!(a.get(&3).unwrap(), 7.0);
        assert_abs_diff_eq!(a.default_value(), -1.0);
        assert_eq!(a.active_len(), 2);
    }

    #[test]
    fn mismatched_domains_fail_before_any_mutation() {
        let mut a = vector(&[(0, 1.0)], 0.0);
        let b = Tensor1::from_entries(Domain::indexed(3), [(0usize, 9.0)], 4.0).unwrap();

        let err = a.add_from(&b).unwrap_err();
        assert!(matches!(err, TensorError::DomainMismatch { left: 6, right: 3 }));
        assert_abs_diff_eq!(a.get(&0).unwrap(), 1.0);
        assert_abs_diff_eq!(a.default_value(), 0.0);
        assert_eq!(a.active_len(), 1);
    }

    #[test]
    fn combine_dispatches_every_operation() {
        let mut a = vector(&[(0, 8.0)], 4.0);
        let b = vector(&[(0, 2.0)], 2.0);
        a.combine(ZipOp::Div, &b).unwrap();
        assert_abs_diff_eq!(a.get(&0).unwrap(), 4.0);
        assert_abs_diff_eq!(a.default_value(), 2.0);
    }

    #[test]
    fn dot_matches_a_reference_computation() {
        let a = vector(&[(0, 1.0), (1, 2.0)], 0.5);
        let b = vector(&[(1, 3.0), (2, -1.0)], 2.0);

        // Reference: sum over all six keys.
        let reference: f64 = (0..6)
            .map(|k| a.get(&k).unwrap() * b.get(&k).unwrap())
            .sum();
        assert_abs_diff_eq!(a.dot(&b).unwrap(), reference, epsilon = 1e-12);
    }

    #[test]
    fn dot_over_mismatched_domains_errors() {
        let a = vector(&[], 1.0);
        let b: Tensor1<usize, f64> = Tensor1::filled(Domain::indexed(2), 1.0);
        assert!(matches!(a.dot(&b), Err(TensorError::DomainMismatch { .. })));
    }

    #[test]
    fn clone_aliases_copy_does_not() {
        let mut original = vector(&[(0, 1.0)], 0.0);
        let alias = original.clone();
        let independent = original.copy();

        original.set(0, 42.0).unwrap();
        assert_abs_diff_eq!(alias.get(&0).unwrap(), 42.0);
        assert_abs_diff_eq!(independent.get(&0).unwrap(), 1.0);

        let mut independent = independent;
        independent.set(1, 7.0).unwrap();
        assert!(!original.is_active(&1));
    }

    #[test]
    fn aliased_operand_reads_pre_update_values() {
        let mut t = vector(&[(0, 1.5), (2, -2.0)], 0.25);
        let alias = t.clone();
        t.add_from(&alias).unwrap();
        assert_abs_diff_eq!(t.get(&0).unwrap(), 3.0);
        assert_abs_diff_eq!(t.get(&2).unwrap(), -4.0);
        assert_abs_diff_eq!(t.default_value(), 0.5);
    }

    #[test]
    fn random_fills_the_whole_domain_from_the_unit_interval() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let t: Tensor1<usize, f64> = Tensor1::random(Domain::indexed(64), &mut rng);
        assert_eq!(t.active_len(), 64);
        for k in 0..64 {
            let v = t.get(&k).unwrap();
            assert!((0.0..1.0).contains(&v));
        }
    }
}
