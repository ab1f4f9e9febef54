/* ************************************************************************ **
** This file is part of cvkit, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Index arithmetic for pair storage and pair enumeration.
//!
//! Symmetric matrices store each unordered pair once, in a packed strict
//! lower triangle; [`TriIndex`] is the bijection between pairs and packed
//! slots. The [`PairTasks`] trait flattens the candidate pairs of one
//! evaluation pass into a single serial index so that outer loops (and
//! range-splitting across workers) never need to know the pair topology.

/// Packed storage index of an unordered pair of distinct nodes.
///
/// The pair `(i, j)` with `i > j` lands at `i*(i-1)/2 + j`. Pairs sort by
/// their larger node first, so for 4 nodes the layout is
/// `(1,0) (2,0) (2,1) (3,0) (3,1) (3,2)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TriIndex(pub usize);

impl TriIndex {
    /// Number of packed slots for the given node count.
    pub fn count(nodes: usize) -> usize {
        nodes * nodes.saturating_sub(1) / 2
    }

    /// Slot of an unordered pair. Order of the arguments does not matter.
    pub fn from_pair(i: usize, j: usize) -> TriIndex {
        assert!(i != j, "no packed slot exists for the diagonal pair ({}, {})", i, j);
        let (hi, lo) = if i > j { (i, j) } else { (j, i) };
        TriIndex(hi * (hi - 1) / 2 + lo)
    }

    /// Inverse of `from_pair`. Returns `(hi, lo)` with `hi > lo`.
    pub fn to_pair(self) -> (usize, usize) {
        let idx = self.0;
        // Real-valued inverse of hi*(hi-1)/2, then an integer fixup since
        // the sqrt can land one row off in either direction.
        let mut hi = ((1.0 + (1.0 + 8.0 * idx as f64).sqrt()) / 2.0) as usize;
        while hi * (hi - 1) / 2 > idx {
            hi -= 1;
        }
        while (hi + 1) * hi / 2 <= idx {
            hi += 1;
        }
        (hi, idx - hi * (hi - 1) / 2)
    }
}

//------------------------------------------------------------------

/// A flat enumeration of the candidate pairs of one evaluation pass.
///
/// Each task names one cell of the matrix together with the atoms whose
/// geometry decides that cell. Keeping this behind a trait lets the
/// accumulation driver iterate a dense grid, a packed triangle, or a
/// pruned pair list through the same loop, and lets callers split
/// `0..len()` into ranges for worker-parallel evaluation.
pub trait PairTasks {
    /// Number of candidate pairs.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Matrix coordinates `(row, col)` of the given task.
    fn nodes(&self, task: usize) -> (usize, usize);

    /// Indices into the position array behind the given task.
    ///
    /// The default is for matrices whose nodes are the atoms themselves.
    fn atoms(&self, task: usize) -> (usize, usize) {
        self.nodes(task)
    }
}

/// Every cell of a `rows` x `cols` matrix between two distinct groups.
///
/// Atom indices assume the column group's positions are stored after the
/// row group's, as one concatenated array.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GridTasks {
    pub rows: usize,
    pub cols: usize,
}

impl PairTasks for GridTasks {
    fn len(&self) -> usize {
        self.rows * self.cols
    }

    fn nodes(&self, task: usize) -> (usize, usize) {
        assert!(task < self.len(), "task {} out of range for {} grid pairs", task, self.len());
        (task / self.cols, task % self.cols)
    }

    fn atoms(&self, task: usize) -> (usize, usize) {
        let (i, j) = self.nodes(task);
        (i, self.rows + j)
    }
}

/// Every unordered pair among `nodes` atoms, in packed slot order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TriangleTasks {
    pub nodes: usize,
}

impl PairTasks for TriangleTasks {
    fn len(&self) -> usize {
        TriIndex::count(self.nodes)
    }

    fn nodes(&self, task: usize) -> (usize, usize) {
        assert!(task < self.len(), "task {} out of range for {} packed pairs", task, self.len());
        TriIndex(task).to_pair()
    }
}

/// Every ordered pair of distinct nodes among `nodes` atoms.
///
/// Tasks run row by row, skipping the diagonal, so node `i` owns the
/// `nodes - 1` consecutive tasks starting at `i * (nodes - 1)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OffDiagonalTasks {
    pub nodes: usize,
}

impl PairTasks for OffDiagonalTasks {
    fn len(&self) -> usize {
        self.nodes * self.nodes.saturating_sub(1)
    }

    fn nodes(&self, task: usize) -> (usize, usize) {
        assert!(task < self.len(), "task {} out of range for {} ordered pairs", task, self.len());
        let i = task / (self.nodes - 1);
        let rest = task % (self.nodes - 1);
        let j = rest + (rest >= i) as usize;
        (i, j)
    }
}

//------------------------------------------------------------------
