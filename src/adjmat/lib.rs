//! Sparse, activity-gated contact matrices.
//!
//! Everything here serves one evaluation cycle: enumerate candidate
//! pairs (`PairTasks`), run each through a `ContactKernel`, store the
//! weighted results and their derivative rows in a `ContactMatrix`,
//! then read the step's matrix back out as a dense map, neighbor
//! lists, an edge list, or a graph.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
#[macro_use]
extern crate itertools;
#[macro_use]
extern crate serde;
#[cfg_attr(test, macro_use)]
extern crate cvkit_math;

pub type FailResult<T> = Result<T, ::failure::Error>;

mod grad;
mod index;
mod kernel;
mod shape;
mod store;
mod switch;
mod views;

pub use self::grad::{coord_index, pert_len, strain_index, PairGrad, SparseGrad};
pub use self::index::{GridTasks, OffDiagonalTasks, PairTasks, TriIndex, TriangleTasks};
pub use self::kernel::{
    accumulate, accumulate_range,
    Contact, ContactKernel, GatedDistance, PairGeometry, SwitchContact,
};
pub use self::shape::{MatrixKind, MatrixShape};
pub use self::store::{ActiveSet, ContactMatrix};
pub use self::switch::Switch;
pub use self::views::{AdjacencyLists, ContactMap};
