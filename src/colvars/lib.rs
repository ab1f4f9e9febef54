//! Collective variables over atomic configurations.
//!
//! Each observable reports a [`CvOutput`]: the scalar value, one
//! gradient vector per atom, and the strain derivative used for
//! pressure coupling.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate serde;
#[cfg_attr(test, macro_use)]
extern crate cvkit_math;

pub type FailResult<T> = Result<T, ::failure::Error>;

mod gyration;
mod noe;

pub use self::gyration::{Gyration, GyrationKind};
pub use self::noe::Noe;

use ::cvkit_math::{M33, V3};
use ::itertools::zip_eq;

/// A collective-variable value with its derivatives.
#[derive(Debug, Clone, PartialEq)]
pub struct CvOutput {
    pub value: f64,
    /// One gradient vector per atom of the input system.
    pub gradient: Vec<V3>,
    /// Strain derivative of the value, in the `-r (x) dV/dr` convention.
    pub virial: M33,
}

/// The strain derivative of a translation-invariant observable, taken
/// from absolute positions and the per-atom gradient.
pub fn virial_no_pbc(positions: &[V3], gradient: &[V3]) -> M33 {
    let mut virial = M33::zero();
    for (&r, &g) in zip_eq(positions, gradient) {
        virial -= M33::outer(r, g);
    }
    virial
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virial_ignores_rigid_translations() {
        // a gradient summing to zero makes the virial origin-independent
        let gradient = vec![V3([1.0, 0.0, 0.5]), V3([-1.0, 0.0, -0.5])];
        let positions = vec![V3([0.3, 0.1, 0.0]), V3([1.3, 0.4, 0.2])];
        let shifted: Vec<V3> = positions.iter().map(|&p| p + V3([5.0, -2.0, 7.0])).collect();
        assert_close!(
            virial_no_pbc(&positions, &gradient),
            virial_no_pbc(&shifted, &gradient),
        );
    }
}
