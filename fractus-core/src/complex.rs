use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use crate::error::CoreError;

/// A complex number represented as two `f64` components.
///
/// This is a lightweight, `Copy` type optimized for the tight iteration loop.
/// We roll our own instead of using `num::Complex` to keep the dependency graph
/// minimal and retain full control over the arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const ZERO: Self = Self { re: 0.0, im: 0.0 };

    #[inline]
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Returns `re² + im²` without taking the square root.
    #[inline]
    pub fn norm_sq(self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    /// Returns `√(re² + im²)` — the modulus.
    #[inline]
    pub fn norm(self) -> f64 {
        self.norm_sq().sqrt()
    }

    /// The complex conjugate `re − im·i`.
    #[inline]
    pub fn conj(self) -> Self {
        Self {
            re: self.re,
            im: -self.im,
        }
    }

    /// `(|re|, |im|)` — the component-wise fold used by Ship-style formulas.
    #[inline]
    pub fn abs_parts(self) -> Self {
        Self {
            re: self.re.abs(),
            im: self.im.abs(),
        }
    }

    /// Integer power by repeated complex multiplication.
    ///
    /// Ship-style formulas fold `|re|, |im|` before the whole power is applied,
    /// so the power must be exact repeated multiplication of the folded base —
    /// a polar-form shortcut would change the picture. `powi(0)` is `1`.
    #[inline]
    pub fn powi(self, e: u32) -> Self {
        let mut acc = Complex::new(1.0, 0.0);
        for _ in 0..e {
            acc *= self;
        }
        acc
    }

    /// Complex division, failing on a zero-modulus divisor.
    ///
    /// The iteration hot path never divides; this exists for the
    /// general-purpose arithmetic surface and fails fast instead of
    /// silently producing NaN.
    pub fn checked_div(self, rhs: Self) -> crate::Result<Self> {
        let denom = rhs.norm_sq();
        if denom == 0.0 {
            return Err(CoreError::DivisionByZero);
        }
        Ok(Self {
            re: (self.re * rhs.re + self.im * rhs.im) / denom,
            im: (self.im * rhs.re - self.re * rhs.im) / denom,
        })
    }
}

// -- Arithmetic operators --

impl Add for Complex {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            re: self.re + rhs.re,
            im: self.im + rhs.im,
        }
    }
}

impl AddAssign for Complex {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.re += rhs.re;
        self.im += rhs.im;
    }
}

impl Sub for Complex {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            re: self.re - rhs.re,
            im: self.im - rhs.im,
        }
    }
}

impl SubAssign for Complex {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.re -= rhs.re;
        self.im -= rhs.im;
    }
}

impl Mul for Complex {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self {
            re: self.re * rhs.re - self.im * rhs.im,
            im: self.re * rhs.im + self.im * rhs.re,
        }
    }
}

impl MulAssign for Complex {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Neg for Complex {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            re: -self.re,
            im: -self.im,
        }
    }
}

/// Scalar multiplication: `Complex * f64`.
impl Mul<f64> for Complex {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self {
            re: self.re * rhs,
            im: self.im * rhs,
        }
    }
}

/// Canonical text form: `<re><sign><im>i` with an explicit sign before
/// the imaginary part, e.g. `-0.8+0.156i`. Round-trips with [`FromStr`].
impl std::fmt::Display for Complex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{:+}i", self.re, self.im)
    }
}

impl FromStr for Complex {
    type Err = CoreError;

    /// Parse the canonical `"<re>(+|-)<im>i"` form with optional decimal parts.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_err = || CoreError::ParseComplex(s.to_string());
        let trimmed = s.trim();
        let body = trimmed.strip_suffix('i').ok_or_else(parse_err)?;

        // The imaginary part starts at the last sign; index 0 is excluded
        // so a leading sign stays with the real component.
        let split = body
            .char_indices()
            .rev()
            .find(|&(i, ch)| i > 0 && (ch == '+' || ch == '-'))
            .map(|(i, _)| i)
            .ok_or_else(parse_err)?;

        let re: f64 = body[..split].parse().map_err(|_| parse_err())?;
        let im: f64 = body[split..].parse().map_err(|_| parse_err())?;
        Ok(Self { re, im })
    }
}
