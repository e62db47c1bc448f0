use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::error::CoreError;
use crate::family::FractalType;

/// The result of iterating a single point.
///
/// The core engine stores only raw iteration data. The smooth coloring
/// formula (`ν = n + 1 − ln(ln|z|) / ln(P)`) is deferred to the shading
/// pass in `fractus-render`, keeping the hot loop lean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IterationResult {
    /// The orbit escaped after `iterations` steps.
    /// `norm_sq` is `|z|²` at the moment of escape.
    Escaped { iterations: u32, norm_sq: f64 },

    /// The point is (likely) inside the set — it did not escape within
    /// the iteration budget, or was detected as periodic.
    Interior,
}

/// Iteration parameters shared by every fractal type.
///
/// The cached `escape_radius_sq` field is automatically recomputed on
/// deserialization so stored render requests always stay consistent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IterSettings {
    /// Maximum number of iterations before declaring a point interior.
    pub max_iterations: u32,

    /// Bailout radius — if `|z|` exceeds this, the orbit has escaped.
    /// Stored directly; the iteration loop compares against `escape_radius²`.
    pub escape_radius: f64,

    /// Refine escaped counts with the fractional smoothing term.
    pub smooth: bool,

    /// Cached `escape_radius * escape_radius`, precomputed to avoid
    /// redundant multiplication on every `iterate()` call.
    #[serde(skip)]
    escape_radius_sq: f64,
}

/// Helper for deserialization — recomputes the cached square on load.
impl<'de> Deserialize<'de> for IterSettings {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            max_iterations: u32,
            escape_radius: f64,
            smooth: bool,
        }
        let raw = Raw::deserialize(deserializer)?;
        Ok(Self {
            max_iterations: raw.max_iterations,
            escape_radius: raw.escape_radius,
            smooth: raw.smooth,
            escape_radius_sq: raw.escape_radius * raw.escape_radius,
        })
    }
}

impl IterSettings {
    pub const DEFAULT_MAX_ITERATIONS: u32 = 256;
    pub const DEFAULT_ESCAPE_RADIUS: f64 = 2.0;

    /// Validated constructor. Out-of-range values are refused, never clamped.
    pub fn new(max_iterations: u32, escape_radius: f64, smooth: bool) -> crate::Result<Self> {
        if max_iterations < 1 {
            return Err(CoreError::InvalidMaxIterations(max_iterations));
        }
        if escape_radius < 2.0 || !escape_radius.is_finite() {
            return Err(CoreError::InvalidEscapeRadius(escape_radius));
        }
        Ok(Self {
            max_iterations,
            escape_radius,
            smooth,
            escape_radius_sq: escape_radius * escape_radius,
        })
    }

    /// Pre-computed squared escape radius for the inner loop.
    #[inline]
    pub fn escape_radius_sq(&self) -> f64 {
        self.escape_radius_sq
    }

    /// Return a copy with a different `max_iterations` value.
    pub fn with_max_iterations(self, max_iterations: u32) -> Self {
        Self {
            max_iterations,
            ..self
        }
    }
}

impl Default for IterSettings {
    fn default() -> Self {
        Self {
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            escape_radius: Self::DEFAULT_ESCAPE_RADIUS,
            smooth: true,
            escape_radius_sq: Self::DEFAULT_ESCAPE_RADIUS * Self::DEFAULT_ESCAPE_RADIUS,
        }
    }
}

/// Per-instance formula parameters: the fixed constant for Julia-style
/// types and the exponent for Multi* families.
///
/// A plain value type — `Clone` produces a fully independent copy, which
/// is what insulates an in-flight render from later edits.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FractalParams {
    pub c: Option<Complex>,
    pub exponent: Option<u32>,
}

/// A fractal type paired with its validated parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fractal {
    ty: FractalType,
    params: FractalParams,
}

impl Fractal {
    /// Build a fractal instance, checking that the parameters match what
    /// the type requires. Parameters the type does not use are dropped so
    /// copies never carry stale state.
    pub fn new(ty: FractalType, params: FractalParams) -> crate::Result<Self> {
        let c = if ty.requires_julia_constant() {
            match params.c {
                Some(c) => Some(c),
                None => return Err(CoreError::MissingJuliaConstant(ty.label())),
            }
        } else {
            None
        };
        let exponent = if ty.requires_exponent() {
            match params.exponent {
                Some(e) if e > 1 => Some(e),
                Some(e) => return Err(CoreError::InvalidExponent(e)),
                None => return Err(CoreError::InvalidExponent(0)),
            }
        } else {
            None
        };
        Ok(Self {
            ty,
            params: FractalParams { c, exponent },
        })
    }

    pub fn ty(&self) -> FractalType {
        self.ty
    }

    pub fn params(&self) -> &FractalParams {
        &self.params
    }

    /// A visually interesting default Julia constant: `c = -0.7 + 0.27015i`.
    pub fn default_julia_c() -> Complex {
        Complex::new(-0.7, 0.27015)
    }

    /// Convert a Mandelbrot-style fractal to its Julia-style counterpart
    /// at `point`: the exponent carries over, the clicked coordinate
    /// becomes the fixed constant.
    pub fn julia_at(&self, point: Complex) -> crate::Result<Self> {
        let ty = self
            .ty
            .julia_equivalent()
            .ok_or(CoreError::NoJuliaEquivalent(self.ty.label()))?;
        Self::new(
            ty,
            FractalParams {
                c: Some(point),
                exponent: self.params.exponent,
            },
        )
    }

    /// The smoothing base for this instance (`P` in the smoothing formula).
    pub fn escape_power(&self) -> f64 {
        self.ty.escape_power(self.params.exponent)
    }

    /// Iterate a single point.
    ///
    /// Mandelbrot-style types start from `z₀ = 0` with the point as the
    /// additive constant; Julia-style types start from the point with the
    /// stored constant. The count is the number of steps taken when the
    /// modulus first exceeds the escape radius.
    pub fn iterate(&self, point: Complex, iter: &IterSettings) -> IterationResult {
        // Closed-form interior rejection, valid only for the exact z²+c set.
        if self.ty == FractalType::Mandelbrot
            && (in_cardioid(point.re, point.im) || in_period2_bulb(point.re, point.im))
        {
            return IterationResult::Interior;
        }

        let step = self.ty.step_fn();
        let exponent = self.params.exponent.unwrap_or(2);
        let (mut z, k) = if self.ty.is_julia() {
            // Validated at construction; fall back to the default rather
            // than panicking if a hand-built value slips through serde.
            (point, self.params.c.unwrap_or_else(Self::default_julia_c))
        } else {
            (Complex::ZERO, point)
        };

        let escape_radius_sq = iter.escape_radius_sq();
        let max_iter = iter.max_iterations;

        // Brent's cycle detection state.
        let mut old_z = z;
        let mut period: u32 = 0;
        let mut check: u32 = 3;

        let mut n: u32 = 0;
        loop {
            let norm_sq = z.norm_sq();
            if !norm_sq.is_finite() {
                // Overflow or NaN: the orbit has left any finite radius.
                // Substitute a large finite |z|² so smoothing stays sane,
                // and never spin on NaN comparisons.
                return IterationResult::Escaped {
                    iterations: n,
                    norm_sq: f64::MAX,
                };
            }
            if norm_sq > escape_radius_sq {
                return IterationResult::Escaped {
                    iterations: n,
                    norm_sq,
                };
            }
            if n == max_iter {
                return IterationResult::Interior;
            }

            z = step(z, k, exponent);
            n += 1;

            // Periodicity detection (Brent's algorithm).
            // Skip the first 32 iterations (orbits rarely converge early)
            // and only check every 4th iteration to reduce branch overhead.
            if n >= 32 && n & 3 == 0 {
                if (z.re - old_z.re).abs() < 1e-13 && (z.im - old_z.im).abs() < 1e-13 {
                    return IterationResult::Interior;
                }

                period += 1;
                if period > check {
                    old_z = z;
                    period = 0;
                    check = check.saturating_mul(2);
                }
            }
        }
    }
}

/// Returns `true` if `c` lies inside the main cardioid.
///
/// This is a closed-form check that avoids iterating ~30–40% of visible
/// points at the default zoom level.
#[inline]
fn in_cardioid(re: f64, im: f64) -> bool {
    let im2 = im * im;
    let q = (re - 0.25) * (re - 0.25) + im2;
    q * (q + (re - 0.25)) <= 0.25 * im2
}

/// Returns `true` if `c` lies inside the period-2 bulb.
#[inline]
fn in_period2_bulb(re: f64, im: f64) -> bool {
    (re + 1.0) * (re + 1.0) + im * im <= 0.0625
}
