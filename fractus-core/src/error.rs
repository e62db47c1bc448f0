use thiserror::Error;

/// Errors originating from the core fractal engine.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid max iterations: {0} (must be >= 1)")]
    InvalidMaxIterations(u32),

    #[error("invalid escape radius: {0} (must be >= 2.0)")]
    InvalidEscapeRadius(f64),

    #[error("invalid exponent: {0} (must be an integer > 1)")]
    InvalidExponent(u32),

    #[error("fractal type {0} requires a Julia constant")]
    MissingJuliaConstant(&'static str),

    #[error("fractal type {0} has no Julia counterpart")]
    NoJuliaEquivalent(&'static str),

    #[error("invalid frame: {reason}")]
    InvalidFrame { reason: String },

    #[error("complex division by zero")]
    DivisionByZero,

    #[error("invalid complex literal: {0:?}")]
    ParseComplex(String),
}
