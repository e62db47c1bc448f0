use fractus_core::IterationResult;

use crate::gradient::Gradient;

/// The color painted for points that never escape.
pub const INTERIOR_COLOR: [u8; 4] = [0, 0, 0, 255];

/// Compute the smooth (continuous) iteration count.
///
/// Uses the renormalization formula `ν = n + 1 − ln(ln|zₙ|) / ln(P)` where
/// `P` is the family's escape power. The inner logarithm is guarded: a
/// non-positive or non-finite term falls back to the raw count instead of
/// producing NaN banding artifacts.
pub fn smooth_iteration(iterations: u32, norm_sq: f64, power: f64) -> f64 {
    let log_zn = norm_sq.ln() * 0.5; // ln(|z_n|)
    if log_zn <= 0.0 {
        return iterations as f64;
    }
    let nu = iterations as f64 + 1.0 - log_zn.ln() / power.ln();
    if nu.is_finite() {
        nu
    } else {
        iterations as f64
    }
}

/// Maps iteration results to RGBA colors for one render run.
///
/// Built once per run from the settings snapshot so the per-pixel path is
/// just a modulus and a gradient lookup.
#[derive(Debug, Clone)]
pub struct Shader {
    gradient: Gradient,
    iters_per_cycle: u32,
    smooth: bool,
    power: f64,
}

impl Shader {
    pub fn new(gradient: Gradient, iters_per_cycle: u32, smooth: bool, power: f64) -> Self {
        Self {
            gradient,
            iters_per_cycle,
            smooth,
            power,
        }
    }

    /// Map a single iteration result to an RGBA color.
    ///
    /// Escaped counts wrap modulo iters-per-cycle before the gradient
    /// lookup, so the palette repeats cyclically instead of saturating.
    pub fn shade(&self, result: IterationResult) -> [u8; 4] {
        match result {
            IterationResult::Interior => INTERIOR_COLOR,
            IterationResult::Escaped {
                iterations,
                norm_sq,
            } => {
                let t = if self.smooth {
                    smooth_iteration(iterations, norm_sq, self.power)
                } else {
                    iterations as f64
                };
                let cycle = self.iters_per_cycle as f64;
                let pos = t.rem_euclid(cycle) / cycle;
                let [r, g, b] = self.gradient.color_at(pos);
                [r, g, b, 255]
            }
        }
    }
}
