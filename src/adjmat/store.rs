/* ************************************************************************ **
** This file is part of cvkit, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! The per-step contact matrix store.
//!
//! One evaluation pass works on a fixed set of storage slots whose size
//! depends only on the matrix shape, so all arenas are allocated once and
//! reused. A slot holds the raw accumulated pair `(W, V)`, where `W` is
//! the contact weight and `V` the weighted value; consumers read the
//! normalized element `V / W`. Which slots hold data at all is tracked in
//! an activity bitset, and everything downstream of accumulation (views,
//! gradient adaptation, merging) walks only the active slots.

use crate::FailResult;
use crate::grad::{PairGrad, SparseGrad};
use crate::index::PairTasks;
use crate::shape::{MatrixKind, MatrixShape};

use ::itertools::zip_eq;

/// One bit per storage slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSet {
    words: Vec<u64>,
    len: usize,
}

impl ActiveSet {
    pub fn new(len: usize) -> ActiveSet {
        ActiveSet { words: vec![0; (len + 63) / 64], len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, i: usize) {
        assert!(i < self.len, "bit {} out of bounds for {} slots", i, self.len);
        self.words[i / 64] |= 1 << (i % 64);
    }

    pub fn contains(&self, i: usize) -> bool {
        assert!(i < self.len, "bit {} out of bounds for {} slots", i, self.len);
        self.words[i / 64] >> (i % 64) & 1 == 1
    }

    /// Number of set bits.
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn clear(&mut self) {
        for w in &mut self.words {
            *w = 0;
        }
    }

    /// Set bits in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        let words = &self.words;
        (0..self.len).filter(move |&i| words[i / 64] >> (i % 64) & 1 == 1)
    }

    pub fn union_with(&mut self, other: &ActiveSet) {
        assert_eq!(self.len, other.len, "bitset length mismatch in union");
        for (w, &o) in zip_eq(&mut self.words, &other.words) {
            *w |= o;
        }
    }
}

//------------------------------------------------------------------

/// Sparse storage for the elements of one contact matrix, with their
/// derivative rows.
#[derive(Debug, Clone)]
pub struct ContactMatrix {
    shape: MatrixShape,
    active: ActiveSet,
    weights: Vec<f64>,
    values: Vec<f64>,
    gradients: Vec<PairGrad>,
    weight_has_derivatives: bool,
}

impl ContactMatrix {
    pub fn new(shape: MatrixShape) -> ContactMatrix {
        let len = shape.storage_len();
        ContactMatrix {
            shape,
            active: ActiveSet::new(len),
            weights: vec![0.0; len],
            values: vec![0.0; len],
            gradients: vec![PairGrad::new(); len],
            weight_has_derivatives: true,
        }
    }

    pub fn shape(&self) -> MatrixShape {
        self.shape
    }

    /// Total number of storage slots, active or not.
    pub fn stored_len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_symmetric(&self) -> bool {
        self.shape.kind() == MatrixKind::Symmetric
    }

    /// True when cells describe connections within one set of nodes, so
    /// adjacency-list and edge-list views are meaningful.
    pub fn undirected_graph(&self) -> bool {
        self.shape.kind().undirected()
    }

    /// Whether stored weight rows carry real derivative information.
    /// When false, the gradient adapter passes raw value rows through.
    pub fn weight_has_derivatives(&self) -> bool {
        self.weight_has_derivatives
    }

    pub fn set_weight_derivatives(&mut self, flag: bool) {
        self.weight_has_derivatives = flag;
    }

    /// Storage slot of cell `(i, j)`; delegates to the shape.
    pub fn storage_index(&self, i: usize, j: usize) -> usize {
        self.shape.storage_index(i, j)
    }

    /// Matrix coordinates of a task, as assigned by its enumerator.
    pub fn matrix_coordinates(&self, tasks: &impl PairTasks, task: usize) -> (usize, usize) {
        tasks.nodes(task)
    }

    pub fn set_active(&mut self, idx: usize) {
        self.active.insert(idx);
    }

    pub fn is_active(&self, idx: usize) -> bool {
        self.active.contains(idx)
    }

    pub fn active_count(&self) -> usize {
        self.active.count()
    }

    /// Active slots in ascending order.
    pub fn active_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.active.iter()
    }

    /// Overwrite the raw pair stored at a slot. `value` is the weighted
    /// value `V`, not the normalized element.
    pub fn record(&mut self, idx: usize, weight: f64, value: f64) {
        self.check_slot(idx);
        self.weights[idx] = weight;
        self.values[idx] = value;
    }

    /// The raw stored pair `(W, V)`.
    pub fn stored_pair(&self, idx: usize) -> (f64, f64) {
        self.check_slot(idx);
        (self.weights[idx], self.values[idx])
    }

    /// The normalized element `V / W`, or zero where no weight
    /// accumulated.
    pub fn normalized(&self, idx: usize) -> f64 {
        self.check_slot(idx);
        let w = self.weights[idx];
        if w == 0.0 {
            return 0.0;
        }
        self.values[idx] / w
    }

    pub fn gradient(&self, idx: usize) -> &PairGrad {
        self.check_slot(idx);
        &self.gradients[idx]
    }

    pub fn gradient_mut(&mut self, idx: usize) -> &mut PairGrad {
        self.check_slot(idx);
        &mut self.gradients[idx]
    }

    /// Rows of the gradient of the normalized element at `idx`.
    ///
    /// Stored rows hold the raw `dW` and `dV`; the normalized element is
    /// `V / W`, so each row becomes `dV / W - (V / W^2) dW`. When weights
    /// carry no derivative information the raw `dV` rows pass through
    /// unchanged. A slot whose weight totals exactly zero also falls back
    /// to the raw rows.
    pub fn normalized_gradient_into(&self, idx: usize, out: &mut SparseGrad) -> FailResult<()> {
        self.check_slot(idx);
        ensure!(self.is_active(idx), "no element stored at slot {}; it was never active", idx);

        let grad = &self.gradients[idx];
        out.clear();
        out.idx.extend_from_slice(grad.indices());
        out.val.extend_from_slice(grad.value_rows());

        let weight = self.weights[idx];
        if self.weight_has_derivatives && weight != 0.0 {
            let pref = self.values[idx] / (weight * weight);
            for (val, &dw) in zip_eq(&mut out.val, grad.weight_rows()) {
                *val = *val / weight - pref * dw;
            }
        }
        Ok(())
    }

    pub fn normalized_gradient(&self, idx: usize) -> FailResult<SparseGrad> {
        let mut out = SparseGrad::new();
        self.normalized_gradient_into(idx, &mut out)?;
        Ok(out)
    }

    /// Reset for the next evaluation pass. Only slots that were active
    /// hold data, so the sweep is proportional to the active count.
    pub fn clear(&mut self) {
        let active = &self.active;
        for idx in active.iter() {
            self.weights[idx] = 0.0;
            self.values[idx] = 0.0;
            self.gradients[idx].clear();
        }
        self.active.clear();
    }

    /// Copy every active slot of `other` into this store.
    ///
    /// This combines per-worker stores after range-split accumulation.
    /// The workers' slot sets are expected to be disjoint; where they are
    /// not, the incoming slot wins.
    pub fn merge_from(&mut self, other: &ContactMatrix) -> FailResult<()> {
        ensure!(
            self.shape == other.shape,
            "cannot merge stores of different shapes",
        );
        ensure!(
            self.weight_has_derivatives == other.weight_has_derivatives,
            "cannot merge stores that disagree on weight derivatives",
        );
        for idx in other.active.iter() {
            self.active.insert(idx);
            self.weights[idx] = other.weights[idx];
            self.values[idx] = other.values[idx];
            self.gradients[idx].assign_from(&other.gradients[idx]);
        }
        Ok(())
    }

    fn check_slot(&self, idx: usize) {
        assert!(
            idx < self.stored_len(),
            "slot {} out of bounds for {} stored elements", idx, self.stored_len(),
        );
    }
}

//------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grad::{coord_index, pert_len};

    fn symmetric_store(nodes: usize) -> ContactMatrix {
        ContactMatrix::new(MatrixShape::new(nodes, nodes, MatrixKind::Symmetric).unwrap())
    }

    #[test]
    fn bitset_basics() {
        let mut set = ActiveSet::new(130);
        for &i in &[0, 63, 64, 129] {
            set.insert(i);
        }
        assert_eq!(set.count(), 4);
        assert!(set.contains(64));
        assert!(!set.contains(65));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 63, 64, 129]);

        let mut other = ActiveSet::new(130);
        other.insert(65);
        set.union_with(&other);
        assert_eq!(set.count(), 5);

        set.clear();
        assert_eq!(set.count(), 0);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn bitset_oob_panics() {
        let mut set = ActiveSet::new(10);
        set.insert(10);
    }

    #[test]
    fn record_and_normalize() {
        let mut store = symmetric_store(4);
        assert_eq!(store.stored_len(), 6);

        let idx = store.storage_index(1, 2);
        store.set_active(idx);
        store.record(idx, 2.0, 4.0);

        assert_eq!(store.stored_pair(idx), (2.0, 4.0));
        assert_eq!(store.normalized(idx), 2.0);
        assert_eq!(store.active_count(), 1);
        assert!(!store.is_active(store.storage_index(3, 0)));
    }

    #[test]
    fn zero_weight_normalizes_to_zero() {
        let mut store = symmetric_store(3);
        let idx = store.storage_index(2, 0);
        store.set_active(idx);
        store.record(idx, 0.0, 4.0);
        assert_eq!(store.normalized(idx), 0.0);
    }

    #[test]
    fn quotient_rule_adapts_stored_rows() {
        let mut store = symmetric_store(3);
        let idx = store.storage_index(0, 1);
        store.set_active(idx);
        store.record(idx, 2.0, 4.0);
        store.gradient_mut(idx).push(coord_index(1, 0), 1.0, 3.0);

        // dV / W - (V / W^2) dW = 3/2 - (4/4) * 1
        let grad = store.normalized_gradient(idx).unwrap();
        let rows: Vec<_> = grad.iter().collect();
        assert_eq!(rows, vec![(coord_index(1, 0), 0.5)]);
    }

    #[test]
    fn derivative_free_weights_pass_value_rows_through() {
        let mut store = symmetric_store(3);
        store.set_weight_derivatives(false);

        let idx = store.storage_index(0, 1);
        store.set_active(idx);
        store.record(idx, 2.0, 4.0);
        store.gradient_mut(idx).push(coord_index(1, 0), 1.0, 3.0);

        let grad = store.normalized_gradient(idx).unwrap();
        assert_eq!(grad.iter().collect::<Vec<_>>(), vec![(coord_index(1, 0), 3.0)]);
    }

    #[test]
    fn zero_weight_slot_keeps_raw_value_rows() {
        let mut store = symmetric_store(3);
        let idx = store.storage_index(0, 1);
        store.set_active(idx);
        store.record(idx, 0.0, 4.0);
        store.gradient_mut(idx).push(coord_index(0, 2), 1.0, 3.0);

        let grad = store.normalized_gradient(idx).unwrap();
        assert_eq!(grad.iter().collect::<Vec<_>>(), vec![(coord_index(0, 2), 3.0)]);
    }

    #[test]
    fn inactive_slot_has_no_gradient() {
        let store = symmetric_store(3);
        let err = store.normalized_gradient(0).unwrap_err();
        assert!(err.to_string().contains("never active"));
    }

    #[test]
    fn clear_resets_only_what_was_touched() {
        let mut store = symmetric_store(4);
        let idx = store.storage_index(3, 1);
        store.set_active(idx);
        store.record(idx, 2.0, 4.0);
        store.gradient_mut(idx).push_atom(1, [1.0; 3].into(), [2.0; 3].into());

        store.clear();
        assert_eq!(store.active_count(), 0);
        assert_eq!(store.stored_pair(idx), (0.0, 0.0));
        assert!(store.gradient(idx).is_empty());
    }

    #[test]
    fn merge_combines_disjoint_workers() {
        let mut left = symmetric_store(4);
        let mut right = symmetric_store(4);

        let a = left.storage_index(1, 0);
        left.set_active(a);
        left.record(a, 1.0, 0.5);

        let b = right.storage_index(3, 2);
        right.set_active(b);
        right.record(b, 2.0, 1.0);
        right.gradient_mut(b).push(coord_index(2, 1), 0.1, 0.2);

        left.merge_from(&right).unwrap();
        assert_eq!(left.active_count(), 2);
        assert_eq!(left.stored_pair(a), (1.0, 0.5));
        assert_eq!(left.stored_pair(b), (2.0, 1.0));
        assert_eq!(left.gradient(b).len(), 1);
    }

    #[test]
    fn merge_rejects_shape_mismatch() {
        let mut left = symmetric_store(4);
        let right = symmetric_store(5);
        assert!(left.merge_from(&right).is_err());
    }

    #[test]
    fn adapted_rows_fit_the_perturbation_space() {
        let mut store = symmetric_store(3);
        let idx = store.storage_index(2, 1);
        store.set_active(idx);
        store.record(idx, 1.0, 1.0);
        store.gradient_mut(idx).push_atom(2, [0.5; 3].into(), [0.5; 3].into());
        store.gradient_mut(idx).push_strain(3, Default::default(), Default::default());

        let dense = store.normalized_gradient(idx).unwrap().to_dense(pert_len(3));
        assert_eq!(dense.len(), 18);
    }
}
