/* ************************************************************************ **
** This file is part of cvkit, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Gyration-tensor observables.
//!
//! The weighted second-moment tensor `G = sum(m_i d_i d_i^T)` about the
//! center of mass (d_i taken through the nearest periodic image) supports
//! a family of size and shape descriptors, from the plain radius of
//! gyration up to the relative shape anisotropy.

use crate::{virial_no_pbc, CvOutput, FailResult};

use ::cvkit_math::{M33, V3};
use ::cvkit_system::System;
use ::nalgebra::{Matrix3, SymmetricEigen};

/// Below this, the `1/(value * mass)` normalization in the gradient is
/// treated as singular and the gradient is reported as zero.
const DEGENERACY_CUTOFF: f64 = 1e-6;

/// Which scalar to extract from the gyration tensor.
///
/// The numbered kinds index the principal moments in descending order,
/// so `PrincipalMoment1` is the largest moment.
#[derive(Serialize, Deserialize)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum GyrationKind {
    /// The radius of gyration, `sqrt(sum(m d^2) / M)`.
    Radius,
    /// Twice the trace of the weighted second-moment tensor.
    Trace,
    #[serde(rename = "principal-moment-1")]
    PrincipalMoment1,
    #[serde(rename = "principal-moment-2")]
    PrincipalMoment2,
    #[serde(rename = "principal-moment-3")]
    PrincipalMoment3,
    /// `sqrt((lambda_1 + lambda_2) / M)`, the largest principal radius.
    #[serde(rename = "principal-radius-1")]
    PrincipalRadius1,
    #[serde(rename = "principal-radius-2")]
    PrincipalRadius2,
    #[serde(rename = "principal-radius-3")]
    PrincipalRadius3,
    /// `sqrt((lambda_1 - (lambda_2 + lambda_3)/2) / M)`.
    Asphericity,
    /// `sqrt((lambda_2 - lambda_3) / M)`.
    Acylindricity,
    /// The relative shape anisotropy kappa^2, dimensionless in `[0, 1]`.
    ShapeAnisotropy,
}

impl GyrationKind {
    /// Every kind, for sweeps in tests and tools.
    pub const ALL: [GyrationKind; 11] = [
        GyrationKind::Radius,
        GyrationKind::Trace,
        GyrationKind::PrincipalMoment1,
        GyrationKind::PrincipalMoment2,
        GyrationKind::PrincipalMoment3,
        GyrationKind::PrincipalRadius1,
        GyrationKind::PrincipalRadius2,
        GyrationKind::PrincipalRadius3,
        GyrationKind::Asphericity,
        GyrationKind::Acylindricity,
        GyrationKind::ShapeAnisotropy,
    ];
}

/// A gyration-tensor observable over all atoms of a system.
#[derive(Serialize, Deserialize)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Gyration {
    pub kind: GyrationKind,
    /// When unset, every atom counts with unit mass.
    pub mass_weighted: bool,
}

impl Gyration {
    pub fn new(kind: GyrationKind) -> Gyration {
        Gyration { kind, mass_weighted: true }
    }

    pub fn compute(&self, system: &System) -> FailResult<CvOutput> {
        ensure!(!system.is_empty(), "gyration requires at least one atom");

        let n = system.len();
        let positions = system.positions();
        let mass = |i: usize| if self.mass_weighted { system.masses()[i] } else { 1.0 };
        let total_mass: f64 = (0..n).map(|i| mass(i)).sum();

        // The center of mass is assembled from minimum-image displacements
        // anchored at atom zero, so a molecule straddling a periodic
        // boundary is treated as the connected cluster nearest that atom.
        let mut shift = V3::zero();
        for i in 1..n {
            shift += mass(i) * system.delta(0, i);
        }
        let com = positions[0] + shift / total_mass;

        let diffs: Vec<V3> = (0..n)
            .map(|i| system.cell().delta(com, positions[i]))
            .collect();

        let (value, gradient): (f64, Vec<V3>) = match self.kind {
            GyrationKind::Radius => {
                let squared: f64 = diffs.iter().enumerate()
                    .map(|(i, d)| mass(i) * d.sqnorm())
                    .sum();
                let value = (squared / total_mass).sqrt();
                let rm = value * total_mass;
                let gradient = diffs.iter().enumerate()
                    .map(|(i, &d)| {
                        if rm > DEGENERACY_CUTOFF { mass(i) * d / rm } else { V3::zero() }
                    })
                    .collect();
                (value, gradient)
            }

            GyrationKind::Trace => {
                let squared: f64 = diffs.iter().enumerate()
                    .map(|(i, d)| mass(i) * d.sqnorm())
                    .sum();
                let gradient = diffs.iter().enumerate()
                    .map(|(i, &d)| 4.0 * mass(i) * d)
                    .collect();
                (2.0 * squared, gradient)
            }

            kind => {
                let mut tensor = M33::zero();
                for (i, &d) in diffs.iter().enumerate() {
                    tensor += M33::outer(d, d) * mass(i);
                }
                let (moments, axes) = principal_frame(tensor)?;
                let (value, prefactor) = moment_derivatives(kind, &moments, total_mass);

                // g_i = m_i * axes * (prefactor o axes^T d_i), where the
                // eigenvector rotation terms cancel against each other
                let gradient = diffs.iter().enumerate()
                    .map(|(i, &d)| {
                        let projected = axes.t() * d;
                        let scaled = V3([
                            prefactor[0] * projected[0],
                            prefactor[1] * projected[1],
                            prefactor[2] * projected[2],
                        ]);
                        mass(i) * (axes * scaled)
                    })
                    .collect();
                (value, gradient)
            }
        };

        let virial = virial_no_pbc(positions, &gradient);
        Ok(CvOutput { value, gradient, virial })
    }
}

/// Eigenvalues of a symmetric tensor in descending order, with a
/// right-handed matrix whose columns are the matching eigenvectors.
fn principal_frame(tensor: M33) -> FailResult<([f64; 3], M33)> {
    let eigen = SymmetricEigen::new(Matrix3::new(
        tensor[0][0], tensor[0][1], tensor[0][2],
        tensor[1][0], tensor[1][1], tensor[1][2],
        tensor[2][0], tensor[2][1], tensor[2][2],
    ));

    let mut moments = [0.0; 3];
    let mut axes = M33::zero();
    for k in 0..3 {
        moments[k] = eigen.eigenvalues[k];
        for i in 0..3 {
            axes[i][k] = eigen.eigenvectors[(i, k)];
        }
    }

    if moments[0] < moments[1] { swap_principal(&mut moments, &mut axes, 0, 1); }
    if moments[1] < moments[2] { swap_principal(&mut moments, &mut axes, 1, 2); }
    if moments[0] < moments[1] { swap_principal(&mut moments, &mut axes, 0, 1); }

    // a rotation needs positive determinant; flip one axis if necessary
    if axes.det() < 0.0 {
        for row in &mut axes.0 {
            row[2] = -row[2];
        }
    }
    ensure!(
        (axes.det() - 1.0).abs() <= 1e-4,
        "cannot diagonalize the gyration tensor",
    );
    Ok((moments, axes))
}

fn swap_principal(moments: &mut [f64; 3], axes: &mut M33, a: usize, b: usize) {
    moments.swap(a, b);
    for row in &mut axes.0 {
        row.0.swap(a, b);
    }
}

/// Value and per-moment gradient prefactors for the eigenframe kinds.
///
/// The prefactor is scaled so the per-atom gradient comes out as
/// `m_i * axes * (prefactor o axes^T d_i)`.
fn moment_derivatives(
    kind: GyrationKind,
    moments: &[f64; 3],
    total_mass: f64,
) -> (f64, [f64; 3]) {
    let mut prefactor = [0.0; 3];
    match kind {
        GyrationKind::ShapeAnisotropy => {
            let trace = moments[0] + moments[1] + moments[2];
            if trace == 0.0 {
                // every atom sits at the center of mass
                return (0.0, prefactor);
            }
            let pairs
                = moments[0] * moments[1]
                + moments[1] * moments[2]
                + moments[0] * moments[2];
            let value = 1.0 - 3.0 * pairs / (trace * trace);
            if value > DEGENERACY_CUTOFF {
                for p in 0..3 {
                    let others = trace - moments[p];
                    prefactor[p] = -6.0 * (others - 2.0 * pairs / trace) / (trace * trace);
                }
            }
            (value, prefactor)
        }

        kind => {
            let weights = moment_weights(kind);
            let squared: f64 = (0..3).map(|p| weights[p] * moments[p]).sum();
            // roundoff in the eigensolver can push a vanishing difference
            // a hair negative
            let value = (squared.max(0.0) / total_mass).sqrt();
            let rm = value * total_mass;
            if rm > DEGENERACY_CUTOFF {
                for p in 0..3 {
                    prefactor[p] = weights[p] / rm;
                }
            }
            (value, prefactor)
        }
    }
}

/// How each sorted principal moment enters the squared value.
fn moment_weights(kind: GyrationKind) -> [f64; 3] {
    match kind {
        GyrationKind::PrincipalMoment1 => [1.0, 0.0, 0.0],
        GyrationKind::PrincipalMoment2 => [0.0, 1.0, 0.0],
        GyrationKind::PrincipalMoment3 => [0.0, 0.0, 1.0],
        GyrationKind::PrincipalRadius1 => [1.0, 1.0, 0.0],
        GyrationKind::PrincipalRadius2 => [1.0, 0.0, 1.0],
        GyrationKind::PrincipalRadius3 => [0.0, 1.0, 1.0],
        GyrationKind::Asphericity => [1.0, -0.5, -0.5],
        GyrationKind::Acylindricity => [0.0, 1.0, -1.0],
        GyrationKind::Radius |
        GyrationKind::Trace |
        GyrationKind::ShapeAnisotropy => unreachable!(),
    }
}

//------------------------------------------------------------------
