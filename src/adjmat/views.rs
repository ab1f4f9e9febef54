/* ************************************************************************ **
** This file is part of cvkit, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Read-out views over an accumulated contact matrix.
//!
//! Each view walks the active slots once and never touches inactive
//! storage. The dense rendering works for every matrix kind; adjacency
//! lists and edge lists require a matrix whose cells connect one set of
//! nodes, and report an error otherwise.

use crate::FailResult;
use crate::store::ContactMatrix;

use ::cvkit_math::DenseMatrix;
use ::petgraph::prelude::{NodeIndex, UnGraph};

/// Dense rendering of the normalized matrix plus the cells behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactMap {
    /// Normalized elements; inactive cells read as zero, and symmetric
    /// elements appear on both sides of the diagonal.
    pub values: DenseMatrix<f64>,
    /// Canonical `(row, col)` of each active slot, in ascending slot
    /// order.
    pub active: Vec<(usize, usize)>,
}

/// Fixed-width neighbor table over the nodes of an undirected matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjacencyLists {
    counts: Vec<usize>,
    table: DenseMatrix<usize>,
}

impl AdjacencyLists {
    pub fn node_count(&self) -> usize {
        self.counts.len()
    }

    pub fn degree(&self, node: usize) -> usize {
        self.counts[node]
    }

    /// Neighbors of a node, in the order their cells were stored.
    pub fn neighbors(&self, node: usize) -> &[usize] {
        &self.table.row(node)[..self.counts[node]]
    }
}

impl ContactMatrix {
    /// Render the normalized matrix densely, together with the list of
    /// active cells.
    pub fn dense_view(&self) -> ContactMap {
        let shape = self.shape();
        let mut values = DenseMatrix::filled(0.0, (shape.rows(), shape.cols()));
        let mut active = Vec::with_capacity(self.active_count());
        for idx in self.active_slots() {
            let (i, j) = shape.coordinates(idx);
            let v = self.normalized(idx);
            values[(i, j)] = v;
            if self.is_symmetric() {
                values[(j, i)] = v;
            }
            active.push((i, j));
        }
        ContactMap { values, active }
    }

    /// Build fixed-width neighbor lists from the active cells.
    ///
    /// Each active cell connects its two nodes in both directions, so in
    /// a directed-bonds matrix where both orientations of a pair are
    /// active, each node sees the other twice. A node collecting more
    /// than `width` neighbors is an error.
    pub fn adjacency_lists(&self, width: usize) -> FailResult<AdjacencyLists> {
        ensure!(
            self.undirected_graph(),
            "adjacency lists only exist for symmetric or directed-bonds matrices",
        );
        let nodes = self.shape().nodes();
        let mut counts = vec![0; nodes];
        let mut table = DenseMatrix::filled(0, (nodes, width));
        for idx in self.active_slots() {
            let (i, j) = self.shape().coordinates(idx);
            let directions = [(i, j), (j, i)];
            let n = if i == j { 1 } else { 2 };
            for &(a, b) in &directions[..n] {
                ensure!(
                    counts[a] < width,
                    "node {} exceeds the adjacency width of {}", a, width,
                );
                table[(a, counts[a])] = b;
                counts[a] += 1;
            }
        }
        Ok(AdjacencyLists { counts, table })
    }

    /// The connected pairs of an undirected matrix, one per active slot,
    /// in ascending slot order.
    pub fn edge_list(&self) -> FailResult<Vec<(usize, usize)>> {
        ensure!(
            self.undirected_graph(),
            "an edge list only exists for symmetric or directed-bonds matrices",
        );
        Ok(self.active_slots().map(|idx| self.shape().coordinates(idx)).collect())
    }

    /// Export the active cells as a graph with normalized weights on the
    /// edges. One graph edge per active slot.
    pub fn to_graph(&self) -> FailResult<UnGraph<(), f64>> {
        ensure!(
            self.undirected_graph(),
            "a graph only exists for symmetric or directed-bonds matrices",
        );
        let nodes = self.shape().nodes();
        let mut graph = UnGraph::<(), f64>::with_capacity(nodes, self.active_count());
        for _ in 0..nodes {
            graph.add_node(());
        }
        for idx in self.active_slots() {
            let (i, j) = self.shape().coordinates(idx);
            graph.add_edge(NodeIndex::new(i), NodeIndex::new(j), self.normalized(idx));
        }
        Ok(graph)
    }
}

//------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{MatrixKind, MatrixShape};

    fn store(rows: usize, cols: usize, kind: MatrixKind) -> ContactMatrix {
        ContactMatrix::new(MatrixShape::new(rows, cols, kind).unwrap())
    }

    fn activate(store: &mut ContactMatrix, i: usize, j: usize, value: f64) {
        let idx = store.storage_index(i, j);
        store.set_active(idx);
        store.record(idx, 1.0, value);
    }

    #[test]
    fn dense_view_mirrors_symmetric_cells() {
        let mut m = store(4, 4, MatrixKind::Symmetric);
        activate(&mut m, 2, 1, 0.5);
        activate(&mut m, 3, 0, 0.8);

        let map = m.dense_view();
        assert_eq!(map.values.dim(), (4, 4));
        assert_eq!(map.values[(2, 1)], 0.5);
        assert_eq!(map.values[(1, 2)], 0.5);
        assert_eq!(map.values[(3, 0)], 0.8);
        assert_eq!(map.values[(0, 3)], 0.8);
        assert_eq!(map.values.flat().iter().filter(|&&v| v != 0.0).count(), 4);
        assert_eq!(map.active, vec![(2, 1), (3, 0)]);
    }

    #[test]
    fn dense_view_of_empty_store_is_zero() {
        let map = store(3, 5, MatrixKind::General).dense_view();
        assert!(map.values.flat().iter().all(|&v| v == 0.0));
        assert!(map.active.is_empty());
    }

    #[test]
    fn rectangular_cells_are_not_mirrored() {
        let mut m = store(2, 3, MatrixKind::General);
        activate(&mut m, 1, 2, 0.25);
        let map = m.dense_view();
        assert_eq!(map.values[(1, 2)], 0.25);
        assert_eq!(map.values.flat().iter().filter(|&&v| v != 0.0).count(), 1);
    }

    #[test]
    fn views_agree_on_a_two_edge_matching() {
        let mut m = store(4, 4, MatrixKind::Symmetric);
        activate(&mut m, 0, 1, 0.5);
        activate(&mut m, 2, 3, 0.8);

        let map = m.dense_view();
        assert_eq!(map.values[(0, 1)], 0.5);
        assert_eq!(map.values[(1, 0)], 0.5);
        assert_eq!(map.values[(2, 3)], 0.8);
        assert_eq!(map.values[(3, 2)], 0.8);
        assert_eq!(map.values.flat().iter().filter(|&&v| v != 0.0).count(), 4);

        let adj = m.adjacency_lists(4).unwrap();
        for node in 0..4 {
            assert_eq!(adj.degree(node), 1);
        }
        assert_eq!(adj.neighbors(0), &[1]);
        assert_eq!(adj.neighbors(1), &[0]);
        assert_eq!(adj.neighbors(2), &[3]);
        assert_eq!(adj.neighbors(3), &[2]);

        let edges = m.edge_list().unwrap();
        assert_eq!(edges.len(), 2);
        for &(i, j) in &edges {
            assert!((i, j) == (1, 0) || (i, j) == (3, 2), "unexpected edge ({}, {})", i, j);
        }
    }

    #[test]
    fn views_are_idempotent() {
        let mut m = store(4, 4, MatrixKind::Symmetric);
        activate(&mut m, 2, 1, 0.5);
        activate(&mut m, 3, 0, 0.8);

        assert_eq!(m.dense_view(), m.dense_view());
        assert_eq!(m.adjacency_lists(3).unwrap(), m.adjacency_lists(3).unwrap());
        assert_eq!(m.edge_list().unwrap(), m.edge_list().unwrap());
    }

    #[test]
    fn adjacency_lists_count_both_endpoints() {
        let mut m = store(3, 3, MatrixKind::Symmetric);
        activate(&mut m, 0, 1, 1.0);
        activate(&mut m, 1, 2, 1.0);

        let adj = m.adjacency_lists(4).unwrap();
        assert_eq!(adj.node_count(), 3);
        assert_eq!(adj.degree(0), 1);
        assert_eq!(adj.degree(1), 2);
        assert_eq!(adj.degree(2), 1);
        assert_eq!(adj.neighbors(1), &[0, 2]);
    }

    #[test]
    fn adjacency_width_overflow_is_an_error() {
        let mut m = store(3, 3, MatrixKind::Symmetric);
        activate(&mut m, 0, 1, 1.0);
        activate(&mut m, 1, 2, 1.0);

        let err = m.adjacency_lists(1).unwrap_err();
        assert!(err.to_string().contains("adjacency width"));
    }

    #[test]
    fn directed_cells_connect_both_ways() {
        let mut m = store(3, 3, MatrixKind::DirectedBonds);
        activate(&mut m, 0, 2, 1.0);

        let adj = m.adjacency_lists(2).unwrap();
        assert_eq!(adj.neighbors(0), &[2]);
        assert_eq!(adj.neighbors(2), &[0]);
        assert_eq!(adj.degree(1), 0);
        assert_eq!(m.edge_list().unwrap(), vec![(0, 2)]);
    }

    #[test]
    fn directed_diagonal_is_a_single_self_loop() {
        let mut m = store(3, 3, MatrixKind::DirectedBonds);
        activate(&mut m, 1, 1, 1.0);
        let adj = m.adjacency_lists(2).unwrap();
        assert_eq!(adj.neighbors(1), &[1]);
    }

    #[test]
    fn graph_views_require_an_undirected_kind() {
        let m = store(2, 3, MatrixKind::General);
        assert!(m.adjacency_lists(4).is_err());
        assert!(m.edge_list().is_err());
        assert!(m.to_graph().is_err());
    }

    #[test]
    fn edge_list_runs_in_slot_order() {
        let mut m = store(4, 4, MatrixKind::Symmetric);
        activate(&mut m, 3, 2, 1.0);
        activate(&mut m, 1, 0, 1.0);
        activate(&mut m, 2, 0, 1.0);
        // slots: (1,0) = 0, (2,0) = 1, (3,2) = 5
        assert_eq!(m.edge_list().unwrap(), vec![(1, 0), (2, 0), (3, 2)]);
    }

    #[test]
    fn graph_export_carries_normalized_weights() {
        let mut m = store(4, 4, MatrixKind::Symmetric);
        let idx = m.storage_index(2, 1);
        m.set_active(idx);
        m.record(idx, 2.0, 1.0);

        let graph = m.to_graph().unwrap();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 1);
        let edge = graph.find_edge(NodeIndex::new(2), NodeIndex::new(1)).unwrap();
        assert_eq!(graph[edge], 0.5);
    }
}
