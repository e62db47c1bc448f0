use serde::{Deserialize, Serialize};

use fractus_core::{Fractal, Frame, IterSettings};

use crate::error::RenderError;
use crate::gradient::Gradient;

/// How escaped iteration counts map onto the gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradientSettings {
    /// Palette repeat period in iterations; counts wrap modulo this value.
    pub iters_per_cycle: u32,
}

impl GradientSettings {
    pub const DEFAULT_ITERS_PER_CYCLE: u32 = 32;

    pub fn new(iters_per_cycle: u32) -> crate::Result<Self> {
        if iters_per_cycle < 2 {
            return Err(RenderError::InvalidItersPerCycle(iters_per_cycle));
        }
        Ok(Self { iters_per_cycle })
    }
}

impl Default for GradientSettings {
    fn default() -> Self {
        Self {
            iters_per_cycle: Self::DEFAULT_ITERS_PER_CYCLE,
        }
    }
}

/// Everything one render run needs, bound into a single snapshot.
///
/// All fields are plain value types, so `Clone` produces a structurally
/// independent copy — the snapshot handed to the engine shares no mutable
/// state with whatever the caller keeps editing. That isolation is a
/// correctness requirement, not a convenience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    pub fractal: Fractal,
    pub iter: IterSettings,
    /// The region the user asked for.
    src_frame: Frame,
    /// `src_frame` grown to the canvas aspect ratio.
    frame: Frame,
    pub gradient: Gradient,
    pub gradient_settings: GradientSettings,
    width: u32,
    height: u32,
    /// Complex-plane units per pixel, derived from the fitted frame.
    complex_iter: f64,
}

impl RenderSettings {
    /// Bind a full render configuration, validating every field.
    /// Invalid values are refused, never clamped.
    pub fn new(
        fractal: Fractal,
        iter: IterSettings,
        src_frame: Frame,
        gradient: Gradient,
        gradient_settings: GradientSettings,
        width: u32,
        height: u32,
    ) -> crate::Result<Self> {
        if gradient_settings.iters_per_cycle < 2 {
            return Err(RenderError::InvalidItersPerCycle(
                gradient_settings.iters_per_cycle,
            ));
        }
        let mut settings = Self {
            fractal,
            iter,
            src_frame,
            frame: src_frame,
            gradient,
            gradient_settings,
            width: 0,
            height: 0,
            complex_iter: 0.0,
        };
        settings.set_res(width, height)?;
        Ok(settings)
    }

    /// A reasonable default view of the given fractal.
    pub fn with_defaults(fractal: Fractal, width: u32, height: u32) -> crate::Result<Self> {
        Self::new(
            fractal,
            IterSettings::default(),
            Frame::default_for(fractal.ty()),
            Gradient::default(),
            GradientSettings::default(),
            width,
            height,
        )
    }

    /// Update the canvas resolution and re-derive the fitted frame and
    /// per-pixel step.
    pub fn set_res(&mut self, width: u32, height: u32) -> crate::Result<()> {
        if width < 1 || height < 1 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        self.width = width;
        self.height = height;
        self.frame = self.src_frame.fit_to_canvas(width, height);
        // The fitted frame's aspect matches the canvas, so taking the step
        // from the larger axis keeps pixels square.
        self.complex_iter = if width > height {
            self.frame.re_width / width as f64
        } else {
            self.frame.im_height / height as f64
        };
        Ok(())
    }

    /// Replace the requested region and re-derive everything.
    pub fn set_src_frame(&mut self, frame: Frame) -> crate::Result<()> {
        self.src_frame = frame;
        self.set_res(self.width, self.height)
    }

    pub fn src_frame(&self) -> Frame {
        self.src_frame
    }

    /// The aspect-fitted frame actually rendered.
    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Complex-plane units per pixel.
    pub fn complex_iter(&self) -> f64 {
        self.complex_iter
    }
}
