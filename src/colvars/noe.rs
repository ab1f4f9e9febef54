/* ************************************************************************ **
** This file is part of cvkit, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! NMR-style distance restraints averaged as `r^-6`.
//!
//! An NOE signal cannot tell chemically equivalent protons apart, so a
//! restraint is a group of equivalent atom pairs observed together. The
//! observable is the plain `r^-6` average over the group,
//!
//! `value = (1 / N) * sum_j(r_j^-6)`
//!
//! left unexponentiated so that it adds linearly across pairs.

use crate::{CvOutput, FailResult};

use ::cvkit_math::{M33, V3};
use ::cvkit_system::System;

/// A set of `r^-6`-averaged distance restraints.
///
/// Coincident atoms make the observable diverge, so evaluating a pair at
/// zero distance is reported as an error rather than an infinity.
#[derive(Debug, Clone, PartialEq)]
pub struct Noe {
    groups: Vec<Vec<(usize, usize)>>,
}

impl Noe {
    /// One group of equivalent atom pairs per restraint.
    pub fn new(groups: Vec<Vec<(usize, usize)>>) -> FailResult<Noe> {
        ensure!(!groups.is_empty(), "an NOE needs at least one restraint");
        for (k, group) in groups.iter().enumerate() {
            ensure!(!group.is_empty(), "restraint {} has no atom pairs", k);
            for &(a, b) in group {
                ensure!(a != b, "restraint {} pairs atom {} with itself", k, a);
            }
        }
        Ok(Noe { groups })
    }

    /// A single restraint.
    pub fn single(pairs: Vec<(usize, usize)>) -> FailResult<Noe> {
        Noe::new(vec![pairs])
    }

    /// Number of restraints.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The equivalent pairs of one restraint.
    pub fn pairs(&self, restraint: usize) -> &[(usize, usize)] {
        &self.groups[restraint]
    }

    /// One output per restraint, in declaration order.
    pub fn compute(&self, system: &System) -> FailResult<Vec<CvOutput>> {
        (0..self.groups.len())
            .map(|k| self.compute_one(k, system))
            .collect()
    }

    pub fn compute_one(&self, restraint: usize, system: &System) -> FailResult<CvOutput> {
        ensure!(
            restraint < self.groups.len(),
            "restraint {} out of range for {} restraints", restraint, self.groups.len(),
        );
        let group = &self.groups[restraint];
        let aver = 1.0 / group.len() as f64;

        let mut value = 0.0;
        let mut gradient = vec![V3::zero(); system.len()];
        let mut virial = M33::zero();
        for &(a, b) in group {
            ensure!(
                a < system.len() && b < system.len(),
                "restraint {} names atom pair ({}, {}) but the system has {} atoms",
                restraint, a, b, system.len(),
            );
            let delta = system.delta(a, b);
            let r2 = delta.sqnorm();
            ensure!(
                r2 > 0.0,
                "atoms {} and {} of restraint {} are coincident", a, b, restraint,
            );
            let r6 = r2 * r2 * r2;
            let r8 = r6 * r2;

            value += aver / r6;

            let pull = (6.0 * aver / r8) * delta;
            gradient[a] += pull;
            gradient[b] -= pull;

            // accumulated pairwise so that periodic images are handled
            virial += M33::outer(delta, pull);
        }
        Ok(CvOutput { value, gradient, virial })
    }
}

//------------------------------------------------------------------
