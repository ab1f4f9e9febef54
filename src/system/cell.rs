/* ************************************************************************ **
** This file is part of cvkit, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Simulation cells and minimum-image displacements.

use crate::FailResult;

use ::cvkit_math::V3;

/// Boundary conditions for displacement computations.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cell {
    /// No periodic images; displacements are plain differences.
    Open,
    /// An axis-aligned periodic box with the given edge lengths.
    Orthorhombic(V3),
}

impl Cell {
    /// An orthorhombic cell, validating the edge lengths.
    pub fn orthorhombic(lengths: V3) -> FailResult<Cell> {
        ensure!(
            lengths.iter().all(|&l| l > 0.0),
            "cell lengths must be positive, got {:?}", lengths,
        );
        Ok(Cell::Orthorhombic(lengths))
    }

    /// Checks the invariants that `Cell::orthorhombic` enforces.
    ///
    /// Deserialized cells bypass the constructor and should be run
    /// through this before use.
    pub fn validate(&self) -> FailResult<()> {
        match *self {
            Cell::Open => Ok(()),
            Cell::Orthorhombic(lengths) => Cell::orthorhombic(lengths).map(|_| ()),
        }
    }

    /// Displacement from `a` to `b`, through the nearest periodic image.
    pub fn delta(&self, a: V3, b: V3) -> V3 {
        match *self {
            Cell::Open => b - a,
            Cell::Orthorhombic(lengths) => {
                let mut d = b - a;
                for axis in 0..3 {
                    d[axis] -= (d[axis] / lengths[axis]).round() * lengths[axis];
                }
                d
            }
        }
    }

    pub fn distance(&self, a: V3, b: V3) -> f64 {
        self.delta(a, b).norm()
    }
}

//------------------------------------------------------------------
