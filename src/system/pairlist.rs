/* ************************************************************************ **
** This file is part of cvkit, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Candidate pair generation with distance pruning.

use crate::{FailResult, System};

use ::cvkit_adjmat::{PairTasks, TriIndex};

/// The implicit space of candidate pairs a list draws from.
///
/// Every space has a closed-form decode from a serial pair index to the
/// two atom indices, so nothing is materialized until pruning happens.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PairSpace {
    /// All unordered pairs within one group of `n` atoms.
    Within { n: usize },
    /// All pairs between a leading block of `first` atoms and the
    /// following block of `second` atoms.
    Between { first: usize, second: usize },
    /// The i-th atom of the leading block with the i-th of the
    /// following block; both blocks hold `each` atoms.
    Matched { each: usize },
}

impl PairSpace {
    /// Number of candidate pairs.
    pub fn len(&self) -> usize {
        match *self {
            PairSpace::Within { n } => TriIndex::count(n),
            PairSpace::Between { first, second } => first * second,
            PairSpace::Matched { each } => each,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of atoms the space spans.
    pub fn atom_count(&self) -> usize {
        match *self {
            PairSpace::Within { n } => n,
            PairSpace::Between { first, second } => first + second,
            PairSpace::Matched { each } => 2 * each,
        }
    }

    /// Atom indices of one candidate pair.
    pub fn pair(&self, index: usize) -> (usize, usize) {
        assert!(
            index < self.len(),
            "pair {} out of range for {} candidates", index, self.len(),
        );
        match *self {
            PairSpace::Within { .. } => TriIndex(index).to_pair(),
            PairSpace::Between { first, second } => (index / second, first + index % second),
            PairSpace::Matched { each } => (index, each + index),
        }
    }

    /// Group-local node coordinates of a pair of atom indices.
    pub fn nodes_of(&self, pair: (usize, usize)) -> (usize, usize) {
        let (a, b) = pair;
        match *self {
            PairSpace::Within { .. } => (a, b),
            PairSpace::Between { first, .. } => (a, b - first),
            PairSpace::Matched { .. } => (a, a),
        }
    }
}

/// The unpruned space as matrix-filling tasks. Nothing is allocated;
/// every task decodes in closed form.
impl PairTasks for PairSpace {
    fn len(&self) -> usize {
        PairSpace::len(self)
    }

    fn nodes(&self, task: usize) -> (usize, usize) {
        self.nodes_of(self.pair(task))
    }

    fn atoms(&self, task: usize) -> (usize, usize) {
        self.pair(task)
    }
}

//------------------------------------------------------------------

/// A pruned list of candidate pairs within a distance cutoff.
///
/// A fresh list contains every pair of its space; each `update` rebuilds
/// it from the current positions, keeping the pairs closer than the
/// cutoff. The stride and last-update fields are bookkeeping for host
/// loops that rebuild every so many steps.
#[derive(Debug, Clone)]
pub struct PairList {
    space: PairSpace,
    cutoff: f64,
    stride: usize,
    pairs: Vec<(usize, usize)>,
    last_update: usize,
}

impl PairList {
    pub fn new(space: PairSpace, cutoff: f64, stride: usize) -> FailResult<PairList> {
        ensure!(cutoff > 0.0, "pair list cutoff must be positive, got {}", cutoff);
        let mut list = PairList { space, cutoff, stride, pairs: vec![], last_update: 0 };
        list.reset();
        Ok(list)
    }

    /// A list that never prunes or rebuilds.
    pub fn full(space: PairSpace) -> PairList {
        let mut list = PairList {
            space,
            cutoff: ::std::f64::INFINITY,
            stride: 0,
            pairs: vec![],
            last_update: 0,
        };
        list.reset();
        list
    }

    pub fn space(&self) -> PairSpace {
        self.space
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of pairs that survived the last rebuild.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    /// One surviving pair, as atom indices.
    pub fn pair(&self, k: usize) -> (usize, usize) {
        self.pairs[k]
    }

    /// Restore the full candidate set, as if freshly built.
    pub fn reset(&mut self) {
        self.pairs.clear();
        self.pairs.extend((0..self.space.len()).map(|k| self.space.pair(k)));
    }

    /// Rebuild from the full candidate space, keeping pairs within the
    /// cutoff under the system's boundary conditions.
    pub fn update(&mut self, system: &System) -> FailResult<()> {
        ensure!(
            system.len() >= self.space.atom_count(),
            "pair list spans {} atoms but the system has only {}",
            self.space.atom_count(), system.len(),
        );
        let sq_cutoff = self.cutoff * self.cutoff;
        self.pairs.clear();
        for k in 0..self.space.len() {
            let (a, b) = self.space.pair(k);
            if system.delta(a, b).sqnorm() <= sq_cutoff {
                self.pairs.push((a, b));
            }
        }
        debug!("pair list kept {} of {} candidates", self.pairs.len(), self.space.len());
        Ok(())
    }

    /// Whether a host loop at `step` is due for a rebuild.
    pub fn needs_update(&self, step: usize) -> bool {
        self.stride > 0 && step % self.stride == 0
    }

    pub fn last_update(&self) -> usize {
        self.last_update
    }

    pub fn mark_updated(&mut self, step: usize) {
        self.last_update = step;
    }

    /// Partners of one atom across the surviving pairs.
    pub fn neighbors(&self, atom: usize) -> Vec<usize> {
        let mut out = Vec::new();
        for &(a, b) in &self.pairs {
            if a == atom {
                out.push(b);
            }
            if b == atom {
                out.push(a);
            }
        }
        out
    }
}

/// Surviving pairs as matrix-filling tasks.
///
/// Node coordinates are group-local: a `Between` pair maps to (row
/// block index, column block index), and a `Matched` pair maps to the
/// diagonal cell of its serial position.
impl PairTasks for PairList {
    fn len(&self) -> usize {
        self.pairs.len()
    }

    fn nodes(&self, task: usize) -> (usize, usize) {
        self.space.nodes_of(self.pairs[task])
    }

    fn atoms(&self, task: usize) -> (usize, usize) {
        self.pairs[task]
    }
}

//------------------------------------------------------------------
