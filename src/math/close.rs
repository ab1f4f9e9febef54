//! Approximate float comparison for tests.

/// Relative tolerance used by `assert_close!` when none is given.
pub const DEFAULT_RTOL: f64 = 1e-9;

/// Assert that two values (scalars, slices, or the workspace's fixed-size
/// types) agree within tolerances.
///
/// Tolerances are given as leading `rel=`/`abs=` arguments; a trailing
/// format string is passed through to the panic message.
///
/// ```
/// # #[macro_use] extern crate cvkit_math;
/// # fn main() {
/// assert_close!(1.0, 1.0 + 1e-12);
/// assert_close!(rel=1e-6, abs=1e-9, 2.0, 2.0000001);
/// # }
/// ```
#[macro_export]
macro_rules! assert_close {
    (rel=$rel:expr, abs=$abs:expr, $($rest:tt)+) => {
        $crate::__assert_close_impl!([$rel][$abs] $($rest)+)
    };
    (abs=$abs:expr, rel=$rel:expr, $($rest:tt)+) => {
        $crate::__assert_close_impl!([$rel][$abs] $($rest)+)
    };
    (rel=$rel:expr, $($rest:tt)+) => {
        $crate::__assert_close_impl!([$rel][0.0] $($rest)+)
    };
    (abs=$abs:expr, $($rest:tt)+) => {
        $crate::__assert_close_impl!([$crate::DEFAULT_RTOL][$abs] $($rest)+)
    };
    ($($rest:tt)+) => {
        $crate::__assert_close_impl!([$crate::DEFAULT_RTOL][0.0] $($rest)+)
    };
}

/// `assert_close!`, but only in builds with debug assertions.
#[macro_export]
macro_rules! debug_assert_close {
    ($($t:tt)*) => {{
        #[cfg(debug_assertions)] {
            $crate::assert_close!{$($t)*}
        }
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __assert_close_impl {
    ([$rel:expr][$abs:expr] $a:expr, $b:expr $(,)?) => {
        $crate::__assert_close_impl!([$rel][$abs] $a, $b, "not nearly equal!")
    };
    ([$rel:expr][$abs:expr] $a:expr, $b:expr, $($fmt:tt)+) => {{
        let a = $a;
        let b = $b;
        let tol = $crate::Tolerances { rel: $rel, abs: $abs };
        if let Err(e) = $crate::CheckClose::check_close(&a, &b, tol) {
            panic!(
                "{} (tolerances: rel={}, abs={})\n left: {:?}\nright: {:?}\n{}",
                format!($($fmt)+), tol.rel, tol.abs, a, b, e,
            );
        }
    }};
}

#[derive(Debug, Copy, Clone)]
pub struct Tolerances {
    pub rel: f64,
    pub abs: f64,
}

#[derive(Debug, Fail)]
#[fail(display = "failed at:\n  left: {:?}\n right: {:?}", left, right)]
pub struct CheckCloseError {
    pub left: f64,
    pub right: f64,
}

/// Same semantics as Python's `math.isclose`, with both tolerances in play.
fn is_close(a: f64, b: f64, Tolerances { rel, abs }: Tolerances) -> bool {
    assert!(rel >= 0.0);
    assert!(abs >= 0.0);

    // equal values and infinities of the same sign
    if a == b { return true; }

    // infinities of opposite sign would make the relative bound infinite
    if a.is_infinite() || b.is_infinite() { return false; }

    (a - b).abs() < abs.max(rel * a.abs()).max(rel * b.abs())
}

/// Elementwise approximate comparison.
pub trait CheckClose<Rhs: ?Sized = Self> {
    fn check_close(&self, other: &Rhs, tol: Tolerances) -> Result<(), CheckCloseError>;
}

impl CheckClose for f64 {
    fn check_close(&self, other: &f64, tol: Tolerances) -> Result<(), CheckCloseError> {
        if is_close(*self, *other, tol) {
            Ok(())
        } else {
            Err(CheckCloseError { left: *self, right: *other })
        }
    }
}

impl<'a, T: ?Sized + CheckClose> CheckClose for &'a T {
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError> {
        CheckClose::check_close(*self, *other, tol)
    }
}

impl<T: CheckClose> CheckClose for [T] {
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError> {
        assert_eq!(self.len(), other.len(), "length mismatch in close comparison");
        for (a, b) in self.iter().zip(other) {
            a.check_close(b, tol)?;
        }
        Ok(())
    }
}

impl<T: CheckClose> CheckClose for Vec<T> {
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError> {
        (&self[..]).check_close(&other[..], tol)
    }
}

impl<T: CheckClose> CheckClose<[T]> for Vec<T> {
    fn check_close(&self, other: &[T], tol: Tolerances) -> Result<(), CheckCloseError> {
        (&self[..]).check_close(other, tol)
    }
}

impl<T: CheckClose> CheckClose<Vec<T>> for [T] {
    fn check_close(&self, other: &Vec<T>, tol: Tolerances) -> Result<(), CheckCloseError> {
        self.check_close(&other[..], tol)
    }
}

macro_rules! array_impls {
    ($($n:tt)*) => {
        $(
            impl<T: CheckClose> CheckClose for [T; $n] {
                fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError> {
                    (&self[..]).check_close(&other[..], tol)
                }
            }
        )*
    };
}

array_impls!{ 0 1 2 3 4 5 6 7 8 9 }

impl CheckClose for crate::V3 {
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError> {
        self.0.check_close(&other.0, tol)
    }
}

impl CheckClose for crate::M33 {
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError> {
        self.0.check_close(&other.0, tol)
    }
}

//-------------------------------------------------------------------------------------------
