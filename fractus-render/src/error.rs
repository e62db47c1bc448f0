use thiserror::Error;

/// Errors originating from the rendering pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid canvas dimensions: {width}×{height} (both must be >= 1)")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("invalid iterations per cycle: {0} (must be >= 2)")]
    InvalidItersPerCycle(u32),

    #[error("gradient has no color stops")]
    EmptyGradient,

    #[error("invalid gradient range {0:?} (must be a positive integer)")]
    InvalidGradientRange(String),

    #[error("malformed color stop {0:?} (expected \"<pos>, <r> <g> <b>\" or \"<r> <g> <b>\")")]
    MalformedColorStop(String),

    #[error("gradient position {position} outside [0, {range}]")]
    PositionOutOfRange { position: f64, range: u32 },

    #[error("color stop position {0} outside [0, 1]")]
    InvalidStopPosition(f64),

    #[error("color channel {0} outside [0, 255]")]
    ChannelOutOfRange(i64),

    #[error("render engine is no longer running")]
    EngineDisconnected,

    #[error(transparent)]
    Core(#[from] fractus_core::CoreError),
}
