/* ************************************************************************ **
** This file is part of cvkit, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Sparse contact matrices and the collective variables built on them.
//!
//! The interesting code lives in the member crates, re-exported here
//! under short names:
//!
//! * [`math`]: small fixed-size vectors and matrices, numerical
//!   differentiation, and closeness assertions.
//! * [`system`]: particle configurations, cells, and pair lists.
//! * [`adjmat`]: the sparse contact matrix store, its kernels, and the
//!   dense/graph views derived from it.
//! * [`colvars`]: collective variables (gyration moments, NOE
//!   restraints) with analytic gradients.
//!
//! This crate itself only adds the application-facing surface shared by
//! the demos and integration tests: [`config`] and [`logging`].

#[macro_use]
extern crate log;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate serde;

pub type FailResult<T> = Result<T, ::failure::Error>;

pub mod config;
pub mod logging;

pub use ::cvkit_math as math;
pub use ::cvkit_system as system;
pub use ::cvkit_adjmat as adjmat;
pub use ::cvkit_colvars as colvars;

pub use self::config::{Settings, YamlRead};
