pub mod engine;
pub mod error;
pub mod gradient;
pub mod settings;
pub mod shade;

// Re-export primary types for convenience.
pub use engine::{render_frame, Engine, EngineCommand, EngineEvent, FLUSH_INTERVAL};
pub use error::RenderError;
pub use gradient::{ColorStop, Gradient};
pub use settings::{GradientSettings, RenderSettings};
pub use shade::{smooth_iteration, Shader, INTERIOR_COLOR};

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;
