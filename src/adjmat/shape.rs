/* ************************************************************************ **
** This file is part of cvkit, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Matrix mode and dimensions, validated once at construction.

use crate::FailResult;
use crate::index::TriIndex;

/// How a contact matrix interprets its cells.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatrixKind {
    /// A rectangular matrix between two independent groups. Cells carry
    /// no graph meaning.
    General,
    /// A square matrix with `w(i, j) == w(j, i)`. Each unordered pair is
    /// stored once.
    Symmetric,
    /// A square matrix over one set of nodes whose cells are directional,
    /// like a donor/acceptor hydrogen-bond matrix. Cells are stored
    /// densely, but graph views treat an edge in either direction as a
    /// connection.
    DirectedBonds,
}

impl MatrixKind {
    /// Resolve the two user-facing mode flags into a kind.
    pub fn from_flags(symmetric: bool, directed_bonds: bool) -> FailResult<MatrixKind> {
        match (symmetric, directed_bonds) {
            (true, true) => bail!("a matrix cannot be both symmetric and directed-bonds"),
            (true, false) => Ok(MatrixKind::Symmetric),
            (false, true) => Ok(MatrixKind::DirectedBonds),
            (false, false) => Ok(MatrixKind::General),
        }
    }

    /// True for the kinds whose cells describe connections between one
    /// set of nodes, so that graph views make sense.
    pub fn undirected(self) -> bool {
        self != MatrixKind::General
    }
}

/// Validated dimensions and mode of a contact matrix.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MatrixShape {
    rows: usize,
    cols: usize,
    kind: MatrixKind,
}

impl MatrixShape {
    pub fn new(rows: usize, cols: usize, kind: MatrixKind) -> FailResult<MatrixShape> {
        ensure!(
            rows > 0 && cols > 0,
            "matrix dimensions must be positive, got {}x{}", rows, cols,
        );
        match kind {
            MatrixKind::Symmetric => ensure!(
                rows == cols,
                "a symmetric matrix must be square, got {}x{}", rows, cols,
            ),
            MatrixKind::DirectedBonds => ensure!(
                rows == cols,
                "a directed-bonds matrix must be square, got {}x{}", rows, cols,
            ),
            MatrixKind::General => {}
        }
        Ok(MatrixShape { rows, cols, kind })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn kind(&self) -> MatrixKind {
        self.kind
    }

    /// Node count for graph-shaped views. Meaningful for the square kinds,
    /// where it equals the row count.
    pub fn nodes(&self) -> usize {
        self.rows
    }

    /// Number of storage slots: one per unordered pair for symmetric
    /// matrices, one per cell otherwise.
    pub fn storage_len(&self) -> usize {
        match self.kind {
            MatrixKind::Symmetric => TriIndex::count(self.rows),
            MatrixKind::General | MatrixKind::DirectedBonds => self.rows * self.cols,
        }
    }

    /// Storage slot of cell `(i, j)`. For symmetric matrices the argument
    /// order does not matter and the diagonal has no slot.
    pub fn storage_index(&self, i: usize, j: usize) -> usize {
        assert!(
            i < self.rows && j < self.cols,
            "cell ({}, {}) out of bounds for {}x{} matrix", i, j, self.rows, self.cols,
        );
        match self.kind {
            MatrixKind::Symmetric => TriIndex::from_pair(i, j).0,
            MatrixKind::General | MatrixKind::DirectedBonds => self.cols * i + j,
        }
    }

    /// Canonical cell of a storage slot; inverse of `storage_index`.
    /// Symmetric slots decode to `(hi, lo)` with `hi > lo`.
    pub fn coordinates(&self, idx: usize) -> (usize, usize) {
        assert!(
            idx < self.storage_len(),
            "slot {} out of bounds for {} stored elements", idx, self.storage_len(),
        );
        match self.kind {
            MatrixKind::Symmetric => TriIndex(idx).to_pair(),
            MatrixKind::General | MatrixKind::DirectedBonds => (idx / self.cols, idx % self.cols),
        }
    }
}

//------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_resolve_to_kinds() {
        assert_eq!(MatrixKind::from_flags(false, false).unwrap(), MatrixKind::General);
        assert_eq!(MatrixKind::from_flags(true, false).unwrap(), MatrixKind::Symmetric);
        assert_eq!(MatrixKind::from_flags(false, true).unwrap(), MatrixKind::DirectedBonds);
        assert!(MatrixKind::from_flags(true, true).is_err());
    }

    #[test]
    fn invalid_shapes_are_rejected() {
        assert!(MatrixShape::new(0, 4, MatrixKind::General).is_err());
        assert!(MatrixShape::new(4, 0, MatrixKind::General).is_err());
        assert!(MatrixShape::new(3, 4, MatrixKind::Symmetric).is_err());
        assert!(MatrixShape::new(3, 4, MatrixKind::DirectedBonds).is_err());
        assert!(MatrixShape::new(3, 4, MatrixKind::General).is_ok());
    }

    #[test]
    fn storage_sizes() {
        let sym = MatrixShape::new(4, 4, MatrixKind::Symmetric).unwrap();
        assert_eq!(sym.storage_len(), 6);
        let gen = MatrixShape::new(3, 5, MatrixKind::General).unwrap();
        assert_eq!(gen.storage_len(), 15);
        let dir = MatrixShape::new(4, 4, MatrixKind::DirectedBonds).unwrap();
        assert_eq!(dir.storage_len(), 16);
    }

    #[test]
    fn symmetric_slots_ignore_argument_order() {
        let shape = MatrixShape::new(5, 5, MatrixKind::Symmetric).unwrap();
        for i in 0..5 {
            for j in 0..i {
                let idx = shape.storage_index(i, j);
                assert_eq!(idx, shape.storage_index(j, i));
                assert_eq!(shape.coordinates(idx), (i, j));
            }
        }
    }

    #[test]
    fn dense_slots_run_row_major() {
        for &kind in &[MatrixKind::General, MatrixKind::DirectedBonds] {
            let shape = MatrixShape::new(4, 4, kind).unwrap();
            let mut next = 0;
            for i in 0..4 {
                for j in 0..4 {
                    assert_eq!(shape.storage_index(i, j), next);
                    assert_eq!(shape.coordinates(next), (i, j));
                    next += 1;
                }
            }
            assert_ne!(shape.storage_index(0, 1), shape.storage_index(1, 0));
        }
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn oob_cell_panics() {
        let shape = MatrixShape::new(3, 3, MatrixKind::General).unwrap();
        shape.storage_index(3, 0);
    }

    #[test]
    fn undirectedness_follows_kind() {
        assert!(!MatrixKind::General.undirected());
        assert!(MatrixKind::Symmetric.undirected());
        assert!(MatrixKind::DirectedBonds.undirected());
    }
}
