//! Small fixed-size math types for three-dimensional particle data.
//!
//! Everything in this workspace works in ordinary 3-space, so rather than
//! pulling in a general linear algebra stack for the hot paths, the two
//! types that appear everywhere (`V3`, `M33`) are written out by hand with
//! exactly the operations the rest of the workspace needs.

#[macro_use] extern crate serde;
#[macro_use] extern crate failure;

use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

#[macro_use]
mod close;
pub use crate::close::{CheckClose, CheckCloseError, Tolerances, DEFAULT_RTOL};

pub mod numerical;

mod mat;
pub use crate::mat::DenseMatrix;

/// A position, displacement, or gradient in 3-space.
#[derive(Serialize, Deserialize)]
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct V3(pub [f64; 3]);

impl V3 {
    pub fn zero() -> V3 { V3([0.0; 3]) }

    pub fn dot(self, other: V3) -> f64 {
        self.0[0] * other.0[0] + self.0[1] * other.0[1] + self.0[2] * other.0[2]
    }

    pub fn sqnorm(self) -> f64 { self.dot(self) }
    pub fn norm(self) -> f64 { self.sqnorm().sqrt() }

    /// The unit vector along `self`. Zero vectors produce NaNs.
    pub fn unit(self) -> V3 { self / self.norm() }

    pub fn map(self, mut f: impl FnMut(f64) -> f64) -> V3 {
        V3([f(self.0[0]), f(self.0[1]), f(self.0[2])])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> { self.0.iter() }
}

impl From<[f64; 3]> for V3 {
    fn from(arr: [f64; 3]) -> V3 { V3(arr) }
}

impl From<V3> for [f64; 3] {
    fn from(v: V3) -> [f64; 3] { v.0 }
}

impl Index<usize> for V3 {
    type Output = f64;
    fn index(&self, i: usize) -> &f64 { &self.0[i] }
}

impl IndexMut<usize> for V3 {
    fn index_mut(&mut self, i: usize) -> &mut f64 { &mut self.0[i] }
}

impl Add for V3 {
    type Output = V3;
    fn add(self, b: V3) -> V3 {
        V3([self.0[0] + b.0[0], self.0[1] + b.0[1], self.0[2] + b.0[2]])
    }
}

impl Sub for V3 {
    type Output = V3;
    fn sub(self, b: V3) -> V3 {
        V3([self.0[0] - b.0[0], self.0[1] - b.0[1], self.0[2] - b.0[2]])
    }
}

impl Neg for V3 {
    type Output = V3;
    fn neg(self) -> V3 { V3([-self.0[0], -self.0[1], -self.0[2]]) }
}

impl Mul<f64> for V3 {
    type Output = V3;
    fn mul(self, k: f64) -> V3 { self.map(|x| x * k) }
}

impl Mul<V3> for f64 {
    type Output = V3;
    fn mul(self, v: V3) -> V3 { v * self }
}

impl Div<f64> for V3 {
    type Output = V3;
    fn div(self, k: f64) -> V3 { self * (1.0 / k) }
}

impl AddAssign for V3 {
    fn add_assign(&mut self, b: V3) { *self = *self + b; }
}

impl SubAssign for V3 {
    fn sub_assign(&mut self, b: V3) { *self = *self - b; }
}

impl MulAssign<f64> for V3 {
    fn mul_assign(&mut self, k: f64) { *self = *self * k; }
}

impl Sum for V3 {
    fn sum<I: Iterator<Item = V3>>(iter: I) -> V3 {
        iter.fold(V3::zero(), Add::add)
    }
}

/// A row-major 3x3 matrix (rows are `V3`s).
#[derive(Serialize, Deserialize)]
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct M33(pub [V3; 3]);

impl M33 {
    pub fn zero() -> M33 { M33([V3::zero(); 3]) }

    pub fn eye() -> M33 {
        M33([
            V3([1.0, 0.0, 0.0]),
            V3([0.0, 1.0, 0.0]),
            V3([0.0, 0.0, 1.0]),
        ])
    }

    /// The outer product `a bᵀ`.
    pub fn outer(a: V3, b: V3) -> M33 {
        M33([a.0[0] * b, a.0[1] * b, a.0[2] * b])
    }

    pub fn t(self) -> M33 {
        let m = &self.0;
        M33([
            V3([m[0].0[0], m[1].0[0], m[2].0[0]]),
            V3([m[0].0[1], m[1].0[1], m[2].0[1]]),
            V3([m[0].0[2], m[1].0[2], m[2].0[2]]),
        ])
    }

    pub fn trace(self) -> f64 { self.0[0].0[0] + self.0[1].0[1] + self.0[2].0[2] }

    pub fn det(self) -> f64 {
        let m = &self.0;
        m[0].0[0] * (m[1].0[1] * m[2].0[2] - m[1].0[2] * m[2].0[1])
            - m[0].0[1] * (m[1].0[0] * m[2].0[2] - m[1].0[2] * m[2].0[0])
            + m[0].0[2] * (m[1].0[0] * m[2].0[1] - m[1].0[1] * m[2].0[0])
    }
}

impl Index<usize> for M33 {
    type Output = V3;
    fn index(&self, r: usize) -> &V3 { &self.0[r] }
}

impl IndexMut<usize> for M33 {
    fn index_mut(&mut self, r: usize) -> &mut V3 { &mut self.0[r] }
}

impl Add for M33 {
    type Output = M33;
    fn add(self, b: M33) -> M33 {
        M33([self.0[0] + b.0[0], self.0[1] + b.0[1], self.0[2] + b.0[2]])
    }
}

impl Sub for M33 {
    type Output = M33;
    fn sub(self, b: M33) -> M33 {
        M33([self.0[0] - b.0[0], self.0[1] - b.0[1], self.0[2] - b.0[2]])
    }
}

impl Neg for M33 {
    type Output = M33;
    fn neg(self) -> M33 { M33([-self.0[0], -self.0[1], -self.0[2]]) }
}

impl AddAssign for M33 {
    fn add_assign(&mut self, b: M33) { *self = *self + b; }
}

impl SubAssign for M33 {
    fn sub_assign(&mut self, b: M33) { *self = *self - b; }
}

impl Mul<f64> for M33 {
    type Output = M33;
    fn mul(self, k: f64) -> M33 {
        M33([self.0[0] * k, self.0[1] * k, self.0[2] * k])
    }
}

impl Mul<V3> for M33 {
    type Output = V3;
    fn mul(self, v: V3) -> V3 {
        V3([self.0[0].dot(v), self.0[1].dot(v), self.0[2].dot(v)])
    }
}

impl Sum for M33 {
    fn sum<I: Iterator<Item = M33>>(iter: I) -> M33 {
        iter.fold(M33::zero(), Add::add)
    }
}

//-------------------------------------------------------------------------------------------
