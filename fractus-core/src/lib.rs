pub mod complex;
pub mod error;
pub mod family;
pub mod fractal;
pub mod frame;

// Re-export primary types for convenience.
pub use complex::Complex;
pub use error::CoreError;
pub use family::{FractalType, StepFn};
pub use fractal::{Fractal, FractalParams, IterSettings, IterationResult};
pub use frame::Frame;

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
