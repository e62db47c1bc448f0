use serde::{Deserialize, Serialize};

use crate::complex::Complex;

/// Signature of a single iteration step: `step(z, k, e)` where `k` is the
/// additive constant (the pixel coordinate for Mandelbrot-style types, the
/// fixed fractal constant for Julia-style types) and `e` the exponent for
/// Multi* families (ignored by the quadratic ones).
pub type StepFn = fn(Complex, Complex, u32) -> Complex;

/// The closed catalog of escape-time formulas.
///
/// Six base formulas, each in a Mandelbrot-style and a Julia-style variant.
/// The step function is resolved once per render run via [`step_fn`](Self::step_fn),
/// never looked up per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FractalType {
    /// `z² + c`
    Mandelbrot,
    Julia,
    /// `zᵉ + c`
    Multibrot,
    Multijulia,
    /// `conj(z)² + c`
    Tricorn,
    TricornJulia,
    /// `conj(z)ᵉ + c`
    Multicorn,
    MulticornJulia,
    /// `(|re z|, |im z|)² + c`
    BurningShip,
    BurningShipJulia,
    /// `(|re z|, |im z|)ᵉ + c`
    Multiship,
    MultishipJulia,
}

fn step_square(z: Complex, k: Complex, _e: u32) -> Complex {
    z * z + k
}

fn step_power(z: Complex, k: Complex, e: u32) -> Complex {
    z.powi(e) + k
}

fn step_conj_square(z: Complex, k: Complex, _e: u32) -> Complex {
    let w = z.conj();
    w * w + k
}

fn step_conj_power(z: Complex, k: Complex, e: u32) -> Complex {
    z.conj().powi(e) + k
}

fn step_ship_square(z: Complex, k: Complex, _e: u32) -> Complex {
    let w = z.abs_parts();
    w * w + k
}

fn step_ship_power(z: Complex, k: Complex, e: u32) -> Complex {
    z.abs_parts().powi(e) + k
}

impl FractalType {
    /// Every variant, in display order.
    pub const ALL: [Self; 12] = [
        Self::Mandelbrot,
        Self::Julia,
        Self::Multibrot,
        Self::Multijulia,
        Self::Tricorn,
        Self::TricornJulia,
        Self::Multicorn,
        Self::MulticornJulia,
        Self::BurningShip,
        Self::BurningShipJulia,
        Self::Multiship,
        Self::MultishipJulia,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Mandelbrot => "Mandelbrot",
            Self::Julia => "Julia",
            Self::Multibrot => "Multibrot",
            Self::Multijulia => "Multijulia",
            Self::Tricorn => "Tricorn",
            Self::TricornJulia => "Tricorn Julia",
            Self::Multicorn => "Multicorn",
            Self::MulticornJulia => "Multicorn Julia",
            Self::BurningShip => "Burning Ship",
            Self::BurningShipJulia => "Burning Ship Julia",
            Self::Multiship => "Multiship",
            Self::MultishipJulia => "Multiship Julia",
        }
    }

    /// Whether the formula raises to a user-supplied exponent.
    pub fn requires_exponent(self) -> bool {
        matches!(
            self,
            Self::Multibrot
                | Self::Multijulia
                | Self::Multicorn
                | Self::MulticornJulia
                | Self::Multiship
                | Self::MultishipJulia
        )
    }

    /// Whether iteration starts from the pixel coordinate with a fixed
    /// constant `c` (Julia-style) rather than from `z₀ = 0`.
    pub fn requires_julia_constant(self) -> bool {
        self.is_julia()
    }

    /// `true` for the Julia-style half of the catalog.
    pub fn is_julia(self) -> bool {
        matches!(
            self,
            Self::Julia
                | Self::Multijulia
                | Self::TricornJulia
                | Self::MulticornJulia
                | Self::BurningShipJulia
                | Self::MultishipJulia
        )
    }

    /// The Julia-style counterpart of a Mandelbrot-style type.
    pub fn julia_equivalent(self) -> Option<Self> {
        match self {
            Self::Mandelbrot => Some(Self::Julia),
            Self::Multibrot => Some(Self::Multijulia),
            Self::Tricorn => Some(Self::TricornJulia),
            Self::Multicorn => Some(Self::MulticornJulia),
            Self::BurningShip => Some(Self::BurningShipJulia),
            Self::Multiship => Some(Self::MultishipJulia),
            _ => None,
        }
    }

    /// The Mandelbrot-style counterpart of a Julia-style type.
    pub fn mandelbrot_equivalent(self) -> Option<Self> {
        match self {
            Self::Julia => Some(Self::Mandelbrot),
            Self::Multijulia => Some(Self::Multibrot),
            Self::TricornJulia => Some(Self::Tricorn),
            Self::MulticornJulia => Some(Self::Multicorn),
            Self::BurningShipJulia => Some(Self::BurningShip),
            Self::MultishipJulia => Some(Self::Multiship),
            _ => None,
        }
    }

    /// Resolve the per-step transform for this type.
    pub fn step_fn(self) -> StepFn {
        match self {
            Self::Mandelbrot | Self::Julia => step_square,
            Self::Multibrot | Self::Multijulia => step_power,
            Self::Tricorn | Self::TricornJulia => step_conj_square,
            Self::Multicorn | Self::MulticornJulia => step_conj_power,
            Self::BurningShip | Self::BurningShipJulia => step_ship_square,
            Self::Multiship | Self::MultishipJulia => step_ship_power,
        }
    }

    /// The escape power `P` used as the smoothing base: the exponent for
    /// Multi* families, 2 for the quadratic ones.
    pub fn escape_power(self, exponent: Option<u32>) -> f64 {
        if self.requires_exponent() {
            exponent.unwrap_or(2).max(2) as f64
        } else {
            2.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn julia_and_mandelbrot_equivalents_are_inverse() {
        for ty in FractalType::ALL {
            if let Some(j) = ty.julia_equivalent() {
                assert_eq!(j.mandelbrot_equivalent(), Some(ty));
                assert!(j.is_julia());
            }
            if let Some(m) = ty.mandelbrot_equivalent() {
                assert_eq!(m.julia_equivalent(), Some(ty));
                assert!(!m.is_julia());
            }
        }
    }

    #[test]
    fn exactly_half_the_catalog_is_julia_style() {
        let julia_count = FractalType::ALL.iter().filter(|t| t.is_julia()).count();
        assert_eq!(julia_count, 6);
    }

    #[test]
    fn exponent_requirement_matches_pairs() {
        for ty in FractalType::ALL {
            if let Some(j) = ty.julia_equivalent() {
                assert_eq!(ty.requires_exponent(), j.requires_exponent());
            }
        }
    }

    #[test]
    fn mandelbrot_step() {
        let z = Complex::new(1.0, 1.0);
        let k = Complex::new(0.5, -0.5);
        let step = FractalType::Mandelbrot.step_fn();
        // (1+i)² = 2i, plus k.
        let r = step(z, k, 0);
        assert!((r.re - 0.5).abs() < 1e-12);
        assert!((r.im - 1.5).abs() < 1e-12);
    }

    #[test]
    fn tricorn_step_conjugates_before_squaring() {
        let z = Complex::new(1.0, 1.0);
        let step = FractalType::Tricorn.step_fn();
        // conj(1+i)² = (1-i)² = -2i
        let r = step(z, Complex::ZERO, 0);
        assert!(r.re.abs() < 1e-12);
        assert!((r.im + 2.0).abs() < 1e-12);
    }

    #[test]
    fn ship_step_folds_signs() {
        let step = FractalType::BurningShip.step_fn();
        let a = step(Complex::new(-1.0, -1.0), Complex::ZERO, 0);
        let b = step(Complex::new(1.0, 1.0), Complex::ZERO, 0);
        assert_eq!(a, b, "the fold makes sign combinations equivalent");
    }

    #[test]
    fn multibrot_cubic_step() {
        let step = FractalType::Multibrot.step_fn();
        // (1+i)³ = -2+2i
        let r = step(Complex::new(1.0, 1.0), Complex::ZERO, 3);
        assert!((r.re + 2.0).abs() < 1e-12);
        assert!((r.im - 2.0).abs() < 1e-12);
    }

    #[test]
    fn escape_power_defaults_to_two() {
        assert_eq!(FractalType::Mandelbrot.escape_power(None), 2.0);
        assert_eq!(FractalType::Multibrot.escape_power(Some(5)), 5.0);
        assert_eq!(FractalType::MultishipJulia.escape_power(Some(3)), 3.0);
    }
}
