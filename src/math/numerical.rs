/* ************************************************************************ **
** This file is part of cvkit, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Numerical differentiation by central differences.
//!
//! Every analytic derivative in this workspace is validated against these
//! helpers in tests; they are public so downstream code can do the same to
//! its own observables.

/// Approximation method for a numerical 1D derivative.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DerivativeKind {
    /// n-point central-difference stencil. Implemented for n = 3, 5, 7.
    Stencil(u32),
}

impl Default for DerivativeKind {
    fn default() -> DerivativeKind {
        DerivativeKind::Stencil(5)
    }
}

enum Never {}

/// Compute a numerical derivative using finite differences.
pub fn slope(
    step: f64,
    kind: Option<DerivativeKind>,
    point: f64,
    mut value_fn: impl FnMut(f64) -> f64,
) -> f64 {
    try_slope::<Never, _>(step, kind, point, |x| Ok(value_fn(x)))
        .unwrap_or_else(|e| match e {})
}

/// `slope` for functions that can fail.
pub fn try_slope<E, F>(
    step: f64,
    kind: Option<DerivativeKind>,
    point: f64,
    mut value_fn: F,
) -> Result<f64, E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    // coefficients from the standard central-difference tables;
    // an n-point stencil is exact for polynomials of degree < n
    let (terms, denom): (&[(f64, f64)], f64) = match kind.unwrap_or_default() {
        DerivativeKind::Stencil(3) => (
            &[(-1.0, -1.0), (1.0, 1.0)][..],
            2.0,
        ),
        DerivativeKind::Stencil(5) => (
            &[(-2.0, 1.0), (-1.0, -8.0), (1.0, 8.0), (2.0, -1.0)][..],
            12.0,
        ),
        DerivativeKind::Stencil(7) => (
            &[(-3.0, -1.0), (-2.0, 9.0), (-1.0, -45.0), (1.0, 45.0), (2.0, -9.0), (3.0, 1.0)][..],
            60.0,
        ),
        DerivativeKind::Stencil(n) if n < 3 || n % 2 == 0 => {
            panic!("{}-point stencil does not exist", n);
        },
        DerivativeKind::Stencil(n) => {
            panic!("{}-point stencil is not implemented", n);
        },
    };

    let mut numer = 0.0;
    for &(offset, coeff) in terms {
        numer += coeff * value_fn(point + offset * step)?;
    }
    Ok(numer / (denom * step))
}

/// Numerically compute a gradient, one slope check per axis of the input.
///
/// The number of function calls is linear in the input size; fine for
/// tests, probably not for anything else.
pub fn gradient(
    step: f64,
    kind: Option<DerivativeKind>,
    point: &[f64],
    mut value_fn: impl FnMut(&[f64]) -> f64,
) -> Vec<f64> {
    try_gradient::<Never, _>(step, kind, point, |x| Ok(value_fn(x)))
        .unwrap_or_else(|e| match e {})
}

/// `gradient` for functions that can fail.
pub fn try_gradient<E, F>(
    step: f64,
    kind: Option<DerivativeKind>,
    point: &[f64],
    mut value_fn: F,
) -> Result<Vec<f64>, E>
where
    F: FnMut(&[f64]) -> Result<f64, E>,
{
    let kind = kind.unwrap_or_default();
    point.iter().enumerate()
        .map(|(i, &center)| {
            let mut point = point.to_vec(); // reset modifications each axis
            try_slope(
                step,
                Some(kind),
                center,
                |x| { point[i] = x; value_fn(&point) },
            )
        })
        .collect()
}

//-------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(a: f64, b: f64) -> f64 { ::rand::random::<f64>() * (b - a) + a }

    fn eval(coeffs: &[f64], x: f64) -> f64 {
        coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
    }

    fn eval_derivative(coeffs: &[f64], x: f64) -> f64 {
        coeffs.iter().enumerate().skip(1).rev()
            .fold(0.0, |acc, (k, &c)| acc * x + c * k as f64)
    }

    #[test]
    fn stencils_are_exact_on_low_order_polynomials() {
        for &n in &[3usize, 5, 7] {
            for _ in 0..10 {
                let coeffs: Vec<f64> = (0..n).map(|_| uniform(-2.0, 2.0)).collect();
                let x = uniform(-3.0, 3.0);

                let expected = eval_derivative(&coeffs, x);
                let actual = slope(
                    1e-1,
                    Some(DerivativeKind::Stencil(n as u32)),
                    x,
                    |x| eval(&coeffs, x),
                );
                assert_close!(abs=1e-8, rel=1e-8, expected, actual, "{}-point", n);
            }
        }
    }

    #[test]
    fn default_stencil_on_transcendentals() {
        for _ in 0..10 {
            let x = uniform(-2.0, 2.0);
            assert_close!(rel=1e-9, abs=1e-9, x.cos(), slope(1e-2, None, x, f64::sin));
            assert_close!(rel=1e-9, abs=1e-9, x.exp(), slope(1e-2, None, x, f64::exp));
        }
    }

    #[test]
    fn gradient_matches_hand_derivatives() {
        for _ in 0..5 {
            let point: Vec<f64> = (0..4).map(|_| uniform(-2.0, 2.0)).collect();
            let value = |v: &[f64]| v[0] * v[1] + v[2] * v[3].sin() + v[1] * v[1] * v[2];
            let expected = vec![
                point[1],
                point[0] + 2.0 * point[1] * point[2],
                point[3].sin() + point[1] * point[1],
                point[2] * point[3].cos(),
            ];
            let actual = gradient(1e-3, None, &point, value);
            assert_close!(rel=1e-8, abs=1e-8, &expected[..], &actual[..]);
        }
    }

    #[test]
    #[should_panic(expected = "stencil does not exist")]
    fn even_stencil() {
        let _ = slope(1e-3, Some(DerivativeKind::Stencil(4)), 0.0, |x| x);
    }
}
