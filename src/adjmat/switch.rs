/* ************************************************************************ **
** This file is part of cvkit, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Switching functions: smooth maps from a distance to a contact weight
//! in `[0, 1]` that vanish beyond a cutoff.

use crate::FailResult;

/// A smooth radial cutoff function.
///
/// Evaluation hard-cuts to zero at the outer distance rather than
/// stretching the tail, so the outer distance should sit where the
/// function is already negligible.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Switch {
    /// `(1 - x^n) / (1 - x^m)` with `x = (r - d0) / r0`, the classic
    /// coordination-number form. Requires `n < m`.
    #[serde(rename_all = "kebab-case")]
    Rational {
        #[serde(default)]
        d0: f64,
        r0: f64,
        #[serde(default = "default_rational_n")]
        n: u32,
        #[serde(default = "default_rational_m")]
        m: u32,
        r_max: f64,
    },
    /// A quintic ramp from 1 below `begin` to 0 above `end`, with zero
    /// slope at both ends.
    #[serde(rename_all = "kebab-case")]
    SmoothStep { begin: f64, end: f64 },
}

fn default_rational_n() -> u32 { 6 }
fn default_rational_m() -> u32 { 12 }

impl Switch {
    pub fn validate(&self) -> FailResult<()> {
        match *self {
            Switch::Rational { d0, r0, n, m, r_max } => {
                ensure!(r0 > 0.0, "rational switch needs r0 > 0, got {}", r0);
                ensure!(
                    n >= 1 && n < m,
                    "rational switch needs exponents 0 < n < m, got n={} m={}", n, m,
                );
                ensure!(
                    r_max > d0,
                    "rational switch needs r-max > d0, got r-max={} d0={}", r_max, d0,
                );
            }
            Switch::SmoothStep { begin, end } => {
                ensure!(begin >= 0.0, "smooth-step switch needs begin >= 0, got {}", begin);
                ensure!(
                    end > begin,
                    "smooth-step switch needs end > begin, got begin={} end={}", begin, end,
                );
            }
        }
        Ok(())
    }

    /// Distance beyond which the value is exactly zero.
    pub fn r_max(&self) -> f64 {
        match *self {
            Switch::Rational { r_max, .. } => r_max,
            Switch::SmoothStep { end, .. } => end,
        }
    }

    /// Value and radial derivative at distance `r`.
    pub fn eval(&self, r: f64) -> (f64, f64) {
        match *self {
            Switch::Rational { d0, r0, n, m, r_max } => {
                if r >= r_max {
                    return (0.0, 0.0);
                }
                let x = (r - d0) / r0;
                if x <= 0.0 {
                    return (1.0, 0.0);
                }
                let (n, m) = (f64::from(n), f64::from(m));
                if (x - 1.0).abs() < 1e-12 {
                    // 0/0 at x = 1; both the value and the slope have
                    // finite limits there.
                    let value = n / m;
                    let d_dx = 0.5 * n * (n - m) / m;
                    return (value, d_dx / r0);
                }
                let xn = x.powi(n as i32);
                let xm = x.powi(m as i32);
                let value = (1.0 - xn) / (1.0 - xm);
                let d_dx = (-n * (xn / x) * (1.0 - xm) + m * (xm / x) * (1.0 - xn))
                    / ((1.0 - xm) * (1.0 - xm));
                (value, d_dx / r0)
            }
            Switch::SmoothStep { begin, end } => {
                if r <= begin {
                    return (1.0, 0.0);
                }
                if r >= end {
                    return (0.0, 0.0);
                }
                let width = end - begin;
                let (p, dp) = ramp5((r - begin) / width);
                (1.0 - p, -dp / width)
            }
        }
    }
}

/// The quintic smoothstep on `[0, 1]` and its derivative.
fn ramp5(x: f64) -> (f64, f64) {
    let value = x * x * x * (10.0 - 15.0 * x + 6.0 * x * x);
    let d_value = 30.0 * (x * (1.0 - x)).powi(2);
    (value, d_value)
}

//------------------------------------------------------------------
