/* ************************************************************************ **
** This file is part of cvkit, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use std::ops::{Index, IndexMut};

/// A heap-allocated rows x cols matrix in row-major order.
///
/// This is deliberately boring storage with 2-D indexing; it backs the
/// dense views of the contact-matrix crate (value matrices, neighbor
/// tables) and nothing clever beyond that.
#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix<T> {
    dim: (usize, usize),
    data: Vec<T>,
}

impl<T: Clone> DenseMatrix<T> {
    pub fn filled(value: T, dim: (usize, usize)) -> DenseMatrix<T> {
        DenseMatrix { dim, data: vec![value; dim.0 * dim.1] }
    }

    /// Overwrite every element.
    pub fn fill(&mut self, value: T) {
        for x in &mut self.data {
            *x = value.clone();
        }
    }
}

impl<T> DenseMatrix<T> {
    pub fn dim(&self) -> (usize, usize) { self.dim }
    pub fn nrows(&self) -> usize { self.dim.0 }
    pub fn ncols(&self) -> usize { self.dim.1 }

    pub fn row(&self, r: usize) -> &[T] {
        assert!(r < self.dim.0, "row {} out of bounds for {}x{} matrix", r, self.dim.0, self.dim.1);
        &self.data[r * self.dim.1..(r + 1) * self.dim.1]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.data.chunks(self.dim.1.max(1))
    }

    /// The backing row-major storage.
    pub fn flat(&self) -> &[T] { &self.data }
}

impl<T> Index<(usize, usize)> for DenseMatrix<T> {
    type Output = T;

    fn index(&self, (r, c): (usize, usize)) -> &T {
        assert!(
            r < self.dim.0 && c < self.dim.1,
            "index ({}, {}) out of bounds for {}x{} matrix", r, c, self.dim.0, self.dim.1,
        );
        &self.data[r * self.dim.1 + c]
    }
}

impl<T> IndexMut<(usize, usize)> for DenseMatrix<T> {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut T {
        assert!(
            r < self.dim.0 && c < self.dim.1,
            "index ({}, {}) out of bounds for {}x{} matrix", r, c, self.dim.0, self.dim.1,
        );
        &mut self.data[r * self.dim.1 + c]
    }
}

//-------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_and_index() {
        let mut m = DenseMatrix::filled(0.0, (2, 3));
        assert_eq!(m.dim(), (2, 3));
        m[(0, 1)] = 2.5;
        m[(1, 2)] = -1.0;
        assert_eq!(m.row(0), &[0.0, 2.5, 0.0]);
        assert_eq!(m.row(1), &[0.0, 0.0, -1.0]);
        m.fill(7.0);
        assert!(m.flat().iter().all(|&x| x == 7.0));
    }

    #[test]
    fn rows_iterate_in_order() {
        let mut m = DenseMatrix::filled(0usize, (3, 2));
        for r in 0..3 {
            for c in 0..2 {
                m[(r, c)] = 10 * r + c;
            }
        }
        let rows: Vec<&[usize]> = m.rows().collect();
        assert_eq!(rows, vec![&[0, 1][..], &[10, 11][..], &[20, 21][..]]);
    }

    #[test]
    fn zero_size() {
        let m = DenseMatrix::<f64>::filled(0.0, (0, 0));
        assert_eq!(m.flat().len(), 0);
        assert_eq!(m.rows().count(), 0);

        let n = DenseMatrix::<f64>::filled(0.0, (3, 0));
        assert_eq!(n.flat().len(), 0);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn oob_index() {
        let m = DenseMatrix::filled(0.0, (2, 2));
        let _ = m[(0, 2)];
    }
}
