/* ************************************************************************ **
** This file is part of cvkit, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Sparse derivative storage for matrix elements.
//!
//! All derivatives live in one flat perturbation space: the `3N` atomic
//! coordinates first, then the 9 components of a cell strain. A pair
//! kernel touches a handful of these, so rows are stored sparsely as
//! parallel index/component arrays.

use cvkit_math::{M33, V3};

/// Perturbation index of coordinate `axis` of `atom`.
pub fn coord_index(atom: usize, axis: usize) -> usize {
    debug_assert!(axis < 3);
    3 * atom + axis
}

/// Perturbation index of strain component `(row, col)`. The 9 strain
/// slots sit after the `3 * natoms` coordinate slots, in row-major order.
pub fn strain_index(natoms: usize, row: usize, col: usize) -> usize {
    debug_assert!(row < 3 && col < 3);
    3 * natoms + 3 * row + col
}

/// Total perturbation count for a system of `natoms` atoms.
pub fn pert_len(natoms: usize) -> usize {
    3 * natoms + 9
}

//------------------------------------------------------------------

/// Derivative rows of one stored pair: the partials of the raw weight and
/// of the raw weighted value with respect to a shared set of perturbations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairGrad {
    idx: Vec<usize>,
    d_weight: Vec<f64>,
    d_value: Vec<f64>,
}

impl PairGrad {
    pub fn new() -> PairGrad {
        Default::default()
    }

    pub fn len(&self) -> usize {
        self.idx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idx.is_empty()
    }

    /// Drop all rows, keeping the allocations for reuse.
    pub fn clear(&mut self) {
        self.idx.clear();
        self.d_weight.clear();
        self.d_value.clear();
    }

    /// Append one row. Indices may repeat; consumers sum repeated rows.
    pub fn push(&mut self, idx: usize, d_weight: f64, d_value: f64) {
        self.idx.push(idx);
        self.d_weight.push(d_weight);
        self.d_value.push(d_value);
    }

    /// Append the three coordinate rows of one atom.
    pub fn push_atom(&mut self, atom: usize, d_weight: V3, d_value: V3) {
        for axis in 0..3 {
            self.push(coord_index(atom, axis), d_weight[axis], d_value[axis]);
        }
    }

    /// Append the nine strain rows.
    pub fn push_strain(&mut self, natoms: usize, d_weight: M33, d_value: M33) {
        for row in 0..3 {
            for col in 0..3 {
                self.push(strain_index(natoms, row, col), d_weight[row][col], d_value[row][col]);
            }
        }
    }

    /// Rows as `(index, d_weight, d_value)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64, f64)> + '_ {
        izip!(&self.idx, &self.d_weight, &self.d_value).map(|(&i, &w, &v)| (i, w, v))
    }

    pub(crate) fn indices(&self) -> &[usize] {
        &self.idx
    }

    pub(crate) fn weight_rows(&self) -> &[f64] {
        &self.d_weight
    }

    pub(crate) fn value_rows(&self) -> &[f64] {
        &self.d_value
    }

    pub(crate) fn assign_from(&mut self, other: &PairGrad) {
        self.idx.clear();
        self.idx.extend_from_slice(&other.idx);
        self.d_weight.clear();
        self.d_weight.extend_from_slice(&other.d_weight);
        self.d_value.clear();
        self.d_value.extend_from_slice(&other.d_value);
    }
}

/// The gradient of a single scalar, sparse over the perturbation space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseGrad {
    pub(crate) idx: Vec<usize>,
    pub(crate) val: Vec<f64>,
}

impl SparseGrad {
    pub fn new() -> SparseGrad {
        Default::default()
    }

    pub fn len(&self) -> usize {
        self.idx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idx.is_empty()
    }

    pub fn clear(&mut self) {
        self.idx.clear();
        self.val.clear();
    }

    /// Rows as `(index, value)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        izip!(&self.idx, &self.val).map(|(&i, &v)| (i, v))
    }

    /// Sum the rows into a dense gradient of the given length.
    pub fn to_dense(&self, len: usize) -> Vec<f64> {
        let mut out = vec![0.0; len];
        for (i, v) in self.iter() {
            assert!(i < len, "perturbation index {} out of range for length {}", i, len);
            out[i] += v;
        }
        out
    }
}

//------------------------------------------------------------------
