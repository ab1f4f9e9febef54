//! Atomic configurations and candidate-pair bookkeeping.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;
#[cfg_attr(test, macro_use)]
extern crate cvkit_math;

pub type FailResult<T> = Result<T, ::failure::Error>;

mod cell;
mod pairlist;

pub use self::cell::Cell;
pub use self::pairlist::{PairList, PairSpace};

use ::cvkit_math::V3;

/// A snapshot of atomic positions with masses and boundary conditions.
///
/// The atom count is fixed at construction; positions may be overwritten
/// in place between evaluation passes.
#[derive(Debug, Clone, PartialEq)]
pub struct System {
    positions: Vec<V3>,
    masses: Vec<f64>,
    cell: Cell,
}

impl System {
    /// A system with unit masses.
    pub fn new(positions: Vec<V3>, cell: Cell) -> System {
        let masses = vec![1.0; positions.len()];
        System { positions, masses, cell }
    }

    pub fn with_masses(positions: Vec<V3>, masses: Vec<f64>, cell: Cell) -> FailResult<System> {
        ensure!(
            positions.len() == masses.len(),
            "got {} positions but {} masses", positions.len(), masses.len(),
        );
        ensure!(masses.iter().all(|&m| m > 0.0), "masses must be positive");
        Ok(System { positions, masses, cell })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[V3] {
        &self.positions
    }

    /// Mutable access to the positions. A slice, so the atom count
    /// cannot change.
    pub fn positions_mut(&mut self) -> &mut [V3] {
        &mut self.positions
    }

    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    pub fn cell(&self) -> &Cell {
        &self.cell
    }

    pub fn total_mass(&self) -> f64 {
        self.masses.iter().sum()
    }

    /// Displacement from atom `a` to atom `b` under the cell's boundary
    /// conditions.
    pub fn delta(&self, a: usize, b: usize) -> V3 {
        self.cell.delta(self.positions[a], self.positions[b])
    }

    pub fn distance(&self, a: usize, b: usize) -> f64 {
        self.delta(a, b).norm()
    }
}

impl ::cvkit_adjmat::PairGeometry for System {
    fn natoms(&self) -> usize {
        self.len()
    }

    fn delta(&self, a: usize, b: usize) -> V3 {
        System::delta(self, a, b)
    }
}

//------------------------------------------------------------------
