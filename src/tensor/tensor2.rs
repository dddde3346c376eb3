//! Two-axis tensors (matrices) and their views.
//!
//! A [`Tensor2`] is either dense storage keyed by `(row, col)` pairs or a
//! thin view: a transpose aliasing another tensor's storage, or a
//! single-column/single-row projection of a [`Tensor1`]. Views carry no
//! storage of their own; their active domain is derived from the underlying
//! tensor on demand.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use crate::domain::Domain;
use crate::error::TensorError;
use crate::math::Scalar;
use crate::statistics::Statistic;

use super::{Elementwise, PartialMap, Tensor, Tensor1};

/// A matrix: a partial map from `(row, col)` pairs to scalars, or a view
/// delegating to one.
pub struct Tensor2<R: Ord, C: Ord, F> {
    rows: Rc<Domain<R>>,
    cols: Rc<Domain<C>>,
    repr: Repr<R, C, F>,
}

enum Repr<R: Ord, C: Ord, F> {
    /// Owning storage keyed in row-major orientation.
    Dense(Rc<RefCell<PartialMap<(R, C), F>>>),
    /// Aliases dense storage whose keys are this tensor's pairs swapped.
    Transposed(Rc<RefCell<PartialMap<(C, R), F>>>),
    /// A vector presented as the single column carried in the tag.
    Column(C, Tensor1<R, F>),
    /// A vector presented as the single row carried in the tag.
    Row(R, Tensor1<C, F>),
}

impl<R: Ord + Clone, C: Ord + Clone, F> Clone for Repr<R, C, F> {
    /// Handle clone: owning variants share their storage `Rc`, projection
    /// variants clone the (cheap handle) inner tensor. Requires no `F: Clone`
    /// bound, matching [`Tensor2`]'s own `Clone`.
    fn clone(&self) -> Self {
        match self {
            Repr::Dense(m) => Repr::Dense(Rc::clone(m)),
            Repr::Transposed(m) => Repr::Transposed(Rc::clone(m)),
            Repr::Column(c, t) => Repr::Column(c.clone(), t.clone()),
            Repr::Row(r, t) => Repr::Row(r.clone(), t.clone()),
        }
    }
}

impl<R: Ord + Clone, C: Ord + Clone, F> Clone for Tensor2<R, C, F> {
    /// Cheap handle clone aliasing the same storage; see
    /// [`Elementwise::copy`] for an independent tensor.
    fn clone(&self) -> Self {
        Self {
            rows: Rc::clone(&self.rows),
            cols: Rc::clone(&self.cols),
            repr: self.repr.clone(),
        }
    }
}

impl<R: Ord + Clone + fmt::Debug, C: Ord + Clone + fmt::Debug, F: Scalar> fmt::Debug
    for Tensor2<R, C, F>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.repr {
            Repr::Dense(_) => "dense",
            Repr::Transposed(_) => "transposed",
            Repr::Column(..) => "column",
            Repr::Row(..) => "row",
        };
        f.debug_struct("Tensor2")
            .field("rows", &self.rows.len())
            .field("cols", &self.cols.len())
            .field("kind", &kind)
            .field("active_len", &self.active_len())
            .finish()
    }
}

impl<R: Ord + Clone + fmt::Debug, C: Ord + Clone + fmt::Debug, F: Scalar> Tensor2<R, C, F> {
    /// Tensor over `rows × cols` with every pair at `default`.
    pub fn filled(
        rows: impl Into<Rc<Domain<R>>>,
        cols: impl Into<Rc<Domain<C>>>,
        default: F,
    ) -> Self {
        Self {
            rows: rows.into(),
            cols: cols.into(),
            repr: Repr::Dense(Rc::new(RefCell::new(PartialMap::new(default)))),
        }
    }

    /// Tensor over `rows × cols` with every pair at zero.
    pub fn zeros(rows: impl Into<Rc<Domain<R>>>, cols: impl Into<Rc<Domain<C>>>) -> Self {
        Self::filled(rows, cols, F::zero())
    }

    /// Tensor with the given `(row, col, value)` triplets active and
    /// `default` elsewhere. Fails if a triplet indexes outside the domains.
    pub fn from_triplets(
        rows: impl Into<Rc<Domain<R>>>,
        cols: impl Into<Rc<Domain<C>>>,
        triplets: impl IntoIterator<Item = (R, C, F)>,
        default: F,
    ) -> Result<Self, TensorError> {
        let mut tensor = Self::filled(rows, cols, default);
        for (row, col, value) in triplets {
            tensor.set(row, col, value)?;
        }
        Ok(tensor)
    }

    pub(crate) fn column_view(base: Tensor1<R, F>, column: C) -> Self {
        let rows = Rc::clone(&base.domain);
        let cols = Rc::new(Domain::new([column.clone()]));
        Self {
            rows,
            cols,
            repr: Repr::Column(column, base),
        }
    }

    pub(crate) fn row_view(base: Tensor1<C, F>, row: R) -> Self {
        let rows = Rc::new(Domain::new([row.clone()]));
        let cols = Rc::clone(&base.domain);
        Self {
            rows,
            cols,
            repr: Repr::Row(row, base),
        }
    }

    /// The row domain.
    pub fn rows(&self) -> &Domain<R> {
        &self.rows
    }

    /// The column domain.
    pub fn cols(&self) -> &Domain<C> {
        &self.cols
    }

    /// Domain-checked read at `(row, col)`.
    ///
    /// On a projection view, a coordinate outside the fixed column or row
    /// is an [`TensorError::IndexOutOfRange`].
    pub fn get(&self, row: &R, col: &C) -> Result<F, TensorError> {
        if !self.rows.contains(row) || !self.cols.contains(col) {
            return Err(TensorError::index(&(row, col)));
        }
        match &self.repr {
            Repr::Dense(cells) => Ok(cells.borrow().value(&(row.clone(), col.clone()))),
            Repr::Transposed(cells) => Ok(cells.borrow().value(&(col.clone(), row.clone()))),
            Repr::Column(fixed, base) => {
                if col == fixed {
                    base.get(row)
                } else {
                    Err(TensorError::index(&(row, col)))
                }
            }
            Repr::Row(fixed, base) => {
                if row == fixed {
                    base.get(col)
                } else {
                    Err(TensorError::index(&(row, col)))
                }
            }
        }
    }

    /// Domain-checked write; `(row, col)` joins the active set. Writes
    /// through a view land in the underlying storage.
    pub fn set(&mut self, row: R, col: C, value: F) -> Result<(), TensorError> {
        if !self.rows.contains(&row) || !self.cols.contains(&col) {
            return Err(TensorError::index(&(row, col)));
        }
        match &mut self.repr {
            Repr::Dense(cells) => {
                cells.borrow_mut().store((row, col), value);
                Ok(())
            }
            Repr::Transposed(cells) => {
                cells.borrow_mut().store((col, row), value);
                Ok(())
            }
            Repr::Column(fixed, base) => {
                if col == *fixed {
                    base.store_unchecked(row, value);
                    Ok(())
                } else {
                    Err(TensorError::index(&(row, col)))
                }
            }
            Repr::Row(fixed, base) => {
                if row == *fixed {
                    base.store_unchecked(col, value);
                    Ok(())
                } else {
                    Err(TensorError::index(&(row, col)))
                }
            }
        }
    }

    /// Transposed view of this tensor.
    ///
    /// The view aliases this tensor's storage: mutations through either
    /// handle are visible through the other. No data moves; a transpose of
    /// a projection is the opposite projection over the same vector.
    pub fn transpose(&self) -> Tensor2<C, R, F> {
        Tensor2 {
            rows: Rc::clone(&self.cols),
            cols: Rc::clone(&self.rows),
            repr: match &self.repr {
                Repr::Dense(cells) => Repr::Transposed(Rc::clone(cells)),
                Repr::Transposed(cells) => Repr::Dense(Rc::clone(cells)),
                Repr::Column(fixed, base) => Repr::Row(fixed.clone(), base.clone()),
                Repr::Row(fixed, base) => Repr::Column(fixed.clone(), base.clone()),
            },
        }
    }

    /// Estimate a statistic from this tensor.
    pub fn estimate<Out>(&self, statistic: impl Statistic<Self, Out>) -> Out {
        statistic.compute(self)
    }

    fn check_domains(&self, other: &Self) -> Result<(), TensorError> {
        let rows_ok =
            Rc::ptr_eq(&self.rows, &other.rows) || self.rows == other.rows;
        let cols_ok =
            Rc::ptr_eq(&self.cols, &other.cols) || self.cols == other.cols;
        if rows_ok && cols_ok {
            Ok(())
        } else {
            Err(TensorError::mismatch(self.domain_len(), other.domain_len()))
        }
    }

    pub(crate) fn value_unchecked(&self, key: &(R, C)) -> F {
        match &self.repr {
            Repr::Dense(cells) => cells.borrow().value(key),
            Repr::Transposed(cells) => {
                cells.borrow().value(&(key.1.clone(), key.0.clone()))
            }
            Repr::Column(fixed, base) => {
                debug_assert!(key.1 == *fixed, "column view read outside its column");
                base.value_unchecked(&key.0)
            }
            Repr::Row(fixed, base) => {
                debug_assert!(key.0 == *fixed, "row view read outside its row");
                base.value_unchecked(&key.1)
            }
        }
    }

    pub(crate) fn store_unchecked(&mut self, key: (R, C), value: F) {
        match &mut self.repr {
            Repr::Dense(cells) => cells.borrow_mut().store(key, value),
            Repr::Transposed(cells) => cells.borrow_mut().store((key.1, key.0), value),
            Repr::Column(fixed, base) => {
                debug_assert!(key.1 == *fixed, "column view write outside its column");
                base.store_unchecked(key.0, value);
            }
            Repr::Row(fixed, base) => {
                debug_assert!(key.0 == *fixed, "row view write outside its row");
                base.store_unchecked(key.1, value);
            }
        }
    }

    fn set_default_unchecked(&mut self, value: F) {
        match &mut self.repr {
            Repr::Dense(cells) => cells.borrow_mut().default = value,
            Repr::Transposed(cells) => cells.borrow_mut().default = value,
            Repr::Column(_, base) => base.set_default_unchecked(value),
            Repr::Row(_, base) => base.set_default_unchecked(value),
        }
    }
}

impl<R: Ord + Clone + fmt::Debug, C: Ord + Clone + fmt::Debug, F: Scalar> Tensor
    for Tensor2<R, C, F>
{
    type Key = (R, C);
    type Elem = F;

    fn domain_len(&self) -> usize {
        self.rows.len() * self.cols.len()
    }

    fn active_len(&self) -> usize {
        match &self.repr {
            Repr::Dense(cells) => cells.borrow().entries.len(),
            Repr::Transposed(cells) => cells.borrow().entries.len(),
            Repr::Column(_, base) => base.active_len(),
            Repr::Row(_, base) => base.active_len(),
        }
    }

    fn default_value(&self) -> F {
        match &self.repr {
            Repr::Dense(cells) => cells.borrow().default,
            Repr::Transposed(cells) => cells.borrow().default,
            Repr::Column(_, base) => base.default_value(),
            Repr::Row(_, base) => base.default_value(),
        }
    }

    fn value(&self, key: &(R, C)) -> Result<F, TensorError> {
        self.get(&key.0, &key.1)
    }

    fn active_keys(&self) -> Vec<(R, C)> {
        match &self.repr {
            Repr::Dense(cells) => cells.borrow().entries.keys().cloned().collect(),
            Repr::Transposed(cells) => cells
                .borrow()
                .entries
                .keys()
                .map(|(col, row)| (row.clone(), col.clone()))
                .collect(),
            Repr::Column(fixed, base) => base
                .active_keys()
                .into_iter()
                .map(|row| (row, fixed.clone()))
                .collect(),
            Repr::Row(fixed, base) => base
                .active_keys()
                .into_iter()
                .map(|col| (fixed.clone(), col))
                .collect(),
        }
    }

    fn fold_active<A>(&self, init: A, mut f: impl FnMut(A, F) -> A) -> A {
        match &self.repr {
            Repr::Dense(cells) => cells
                .borrow()
                .entries
                .values()
                .fold(init, |acc, &v| f(acc, v)),
            Repr::Transposed(cells) => cells
                .borrow()
                .entries
                .values()
                .fold(init, |acc, &v| f(acc, v)),
            Repr::Column(_, base) => base.fold_active(init, f),
            Repr::Row(_, base) => base.fold_active(init, f),
        }
    }
}

impl<R: Ord + Clone + fmt::Debug, C: Ord + Clone + fmt::Debug, F: Scalar> Elementwise
    for Tensor2<R, C, F>
{
    fn copy(&self) -> Self {
        let repr = match &self.repr {
            Repr::Dense(cells) => Repr::Dense(Rc::new(RefCell::new(cells.borrow().clone()))),
            Repr::Transposed(cells) => {
                Repr::Transposed(Rc::new(RefCell::new(cells.borrow().clone())))
            }
            Repr::Column(fixed, base) => Repr::Column(fixed.clone(), base.copy()),
            Repr::Row(fixed, base) => Repr::Row(fixed.clone(), base.copy()),
        };
        Self {
            rows: Rc::clone(&self.rows),
            cols: Rc::clone(&self.cols),
            repr,
        }
    }

    fn map_assign(&mut self, f: impl Fn(F) -> F) {
        match &mut self.repr {
            Repr::Dense(cells) => cells.borrow_mut().map_assign(f),
            Repr::Transposed(cells) => cells.borrow_mut().map_assign(f),
            Repr::Column(_, base) => base.map_assign(f),
            Repr::Row(_, base) => base.map_assign(f),
        }
    }

    fn zip_assign_with(
        &mut self,
        other: &Self,
        f: impl Fn(F, F) -> F,
    ) -> Result<(), TensorError> {
        self.check_domains(other)?;

        // Snapshot before the first write; `other` may alias `self` through
        // a transpose, where (r, c) and (c, r) land on the same cell.
        let mut union: BTreeSet<(R, C)> = self.active_keys().into_iter().collect();
        union.extend(other.active_keys());
        let default = f(self.default_value(), other.default_value());
        let pairs: Vec<((R, C), F, F)> = union
            .into_iter()
            .map(|key| {
                let left = self.value_unchecked(&key);
                let right = other.value_unchecked(&key);
                (key, left, right)
            })
            .collect();

        for (key, left, right) in pairs {
            self.store_unchecked(key, f(left, right));
        }
        self.set_default_unchecked(default);
        Ok(())
    }
}
