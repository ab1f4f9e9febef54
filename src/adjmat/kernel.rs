/* ************************************************************************ **
** This file is part of cvkit, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Pair kernels and the accumulation driver.
//!
//! A kernel turns the displacement of one candidate pair into a contact
//! weight and a weighted value, with gradients taken with respect to the
//! displacement. The driver walks a task enumeration, asks a geometry
//! source for each displacement, and spreads the kernel's local gradients
//! over the two atoms and the cell strain before recording everything in
//! the store.

use crate::FailResult;
use crate::index::PairTasks;
use crate::store::ContactMatrix;
use crate::switch::Switch;

use ::cvkit_math::{M33, V3};
use ::std::ops::Range;

/// Source of pair displacements for kernel evaluation.
///
/// Implementations decide what "displacement" means; under periodic
/// boundaries it is the minimum-image one.
pub trait PairGeometry {
    fn natoms(&self) -> usize;

    /// Displacement from atom `a` to atom `b`.
    fn delta(&self, a: usize, b: usize) -> V3;
}

/// What a kernel reports for one active pair.
///
/// `value` is the weighted value `V`, so the normalized matrix element
/// comes out as `value / weight`. The gradients are with respect to the
/// pair displacement; `None` marks a component the kernel cannot
/// differentiate.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Contact {
    pub weight: f64,
    pub value: f64,
    pub d_weight: Option<V3>,
    pub d_value: Option<V3>,
}

/// Maps one pair displacement to a contact.
pub trait ContactKernel {
    /// Whether the reported weights carry real derivative information.
    /// The store's gradient adapter consults this.
    fn weight_has_derivatives(&self) -> bool {
        true
    }

    /// Evaluate one candidate pair; `None` leaves the pair inactive.
    fn evaluate(&self, r: V3) -> Option<Contact>;
}

/// Weights each pair by a switching function of its distance.
///
/// Stores `(W, V) = (s, s^2)`, so the normalized element recovers the
/// switch value `s` itself.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SwitchContact {
    pub switch: Switch,
    /// Weights at or below this threshold leave the pair inactive.
    pub tolerance: f64,
}

impl SwitchContact {
    pub fn new(switch: Switch) -> SwitchContact {
        SwitchContact { switch, tolerance: 0.0 }
    }
}

impl ContactKernel for SwitchContact {
    fn evaluate(&self, r: V3) -> Option<Contact> {
        let d = r.norm();
        if d == 0.0 {
            // coincident positions have no contact direction
            return None;
        }
        let (s, ds) = self.switch.eval(d);
        if s <= self.tolerance {
            return None;
        }
        let dvec = (ds / d) * r;
        Some(Contact {
            weight: s,
            value: s * s,
            d_weight: Some(dvec),
            d_value: Some(2.0 * s * dvec),
        })
    }
}

/// Records the pair distance, weighted by a switching function.
///
/// Stores `(W, V) = (s, s * d)`, so the normalized element is the
/// distance `d` wherever the pair counts as in contact at all.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GatedDistance {
    pub switch: Switch,
    /// Weights at or below this threshold leave the pair inactive.
    pub tolerance: f64,
}

impl GatedDistance {
    pub fn new(switch: Switch) -> GatedDistance {
        GatedDistance { switch, tolerance: 0.0 }
    }
}

impl ContactKernel for GatedDistance {
    fn evaluate(&self, r: V3) -> Option<Contact> {
        let d = r.norm();
        if d == 0.0 {
            return None;
        }
        let (s, ds) = self.switch.eval(d);
        if s <= self.tolerance {
            return None;
        }
        let unit = r / d;
        Some(Contact {
            weight: s,
            value: s * d,
            d_weight: Some(ds * unit),
            d_value: Some((ds * d + s) * unit),
        })
    }
}

//------------------------------------------------------------------

/// Run every task through the kernel and store the results.
///
/// Clears the store first and records the kernel's derivative
/// capability, so one call is one complete evaluation pass.
pub fn accumulate(
    matrix: &mut ContactMatrix,
    tasks: &impl PairTasks,
    kernel: &impl ContactKernel,
    geometry: &impl PairGeometry,
) -> FailResult<()> {
    matrix.clear();
    matrix.set_weight_derivatives(kernel.weight_has_derivatives());
    accumulate_range(matrix, tasks, kernel, geometry, 0..tasks.len())?;
    debug!("stored {} of {} candidate pairs", matrix.active_count(), tasks.len());
    Ok(())
}

/// Accumulate a subrange of the task space into the store.
///
/// This is the building block for worker-parallel evaluation: split
/// `0..tasks.len()` over per-worker stores, then combine them with
/// `ContactMatrix::merge_from`. The store is not cleared here, and the
/// caller is responsible for setting its weight-derivative flag.
pub fn accumulate_range(
    matrix: &mut ContactMatrix,
    tasks: &impl PairTasks,
    kernel: &impl ContactKernel,
    geometry: &impl PairGeometry,
    range: Range<usize>,
) -> FailResult<()> {
    let natoms = geometry.natoms();
    for task in range {
        let (i, j) = tasks.nodes(task);
        let (a, b) = tasks.atoms(task);
        let r = geometry.delta(a, b);
        let contact = match kernel.evaluate(r) {
            Some(contact) => contact,
            None => continue,
        };

        let idx = matrix.storage_index(i, j);
        matrix.set_active(idx);
        matrix.record(idx, contact.weight, contact.value);

        if contact.d_weight.is_some() || contact.d_value.is_some() {
            let dw = contact.d_weight.unwrap_or_else(V3::zero);
            let dv = contact.d_value.unwrap_or_else(V3::zero);
            let grad = matrix.gradient_mut(idx);
            grad.clear();
            // the displacement runs from a to b
            grad.push_atom(a, -dw, -dv);
            grad.push_atom(b, dw, dv);
            grad.push_strain(natoms, -M33::outer(r, dw), -M33::outer(r, dv));
        }
    }
    Ok(())
}

//------------------------------------------------------------------
