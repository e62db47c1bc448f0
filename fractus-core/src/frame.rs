use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::error::CoreError;
use crate::family::FractalType;

/// A rectangular region of the complex plane under view.
///
/// The frame is centred on `center` with total extents `re_width` and
/// `im_height`. Transformations produce new frames; an existing frame is
/// never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Centre of the region in the complex plane.
    pub center: Complex,

    /// Total extent along the real axis.
    pub re_width: f64,

    /// Total extent along the imaginary axis.
    pub im_height: f64,
}

impl Frame {
    /// Create a frame with explicit extents.
    pub fn new(center: Complex, re_width: f64, im_height: f64) -> crate::Result<Self> {
        if !(re_width > 0.0) || !re_width.is_finite() {
            return Err(CoreError::InvalidFrame {
                reason: format!("re_width must be positive and finite, got {re_width}"),
            });
        }
        if !(im_height > 0.0) || !im_height.is_finite() {
            return Err(CoreError::InvalidFrame {
                reason: format!("im_height must be positive and finite, got {im_height}"),
            });
        }
        Ok(Self {
            center,
            re_width,
            im_height,
        })
    }

    /// Default view for a fractal type: Mandelbrot-style sets fit in
    /// roughly `[-2.0, 0.47] × [-1.12, 1.12]`, Julia-style sets within
    /// `|z| < 2`. Both get a small margin for breathing room.
    pub fn default_for(ty: FractalType) -> Self {
        if ty.is_julia() {
            Self {
                center: Complex::ZERO,
                re_width: 4.2,
                im_height: 4.2,
            }
        } else {
            Self {
                center: Complex::new(-0.75, 0.0),
                re_width: 3.6,
                im_height: 2.6,
            }
        }
    }

    pub fn re_min(&self) -> f64 {
        self.center.re - self.re_width / 2.0
    }

    pub fn re_max(&self) -> f64 {
        self.center.re + self.re_width / 2.0
    }

    pub fn im_min(&self) -> f64 {
        self.center.im - self.im_height / 2.0
    }

    pub fn im_max(&self) -> f64 {
        self.center.im + self.im_height / 2.0
    }

    /// Return a new frame whose aspect ratio matches `w/h` by growing
    /// whichever extent is too small. The requested region is always fully
    /// contained in the result; nothing is ever cropped.
    pub fn fit_to_canvas(&self, w: u32, h: u32) -> Self {
        let canvas_ratio = w as f64 / h as f64;
        let frame_ratio = self.re_width / self.im_height;
        if frame_ratio > canvas_ratio {
            Self {
                center: self.center,
                re_width: self.re_width,
                im_height: self.re_width * h as f64 / w as f64,
            }
        } else {
            Self {
                center: self.center,
                re_width: self.im_height * w as f64 / h as f64,
                im_height: self.im_height,
            }
        }
    }

    /// Map a pixel coordinate to a point on the complex plane.
    ///
    /// `(0, 0)` is the top-left pixel and maps to `(re_min, im_min)`.
    #[inline]
    pub fn to_complex_coords(&self, px: u32, py: u32, canvas_w: u32, canvas_h: u32) -> Complex {
        Complex::new(
            self.re_min() + self.re_width * px as f64 / canvas_w as f64,
            self.im_min() + self.im_height * py as f64 / canvas_h as f64,
        )
    }

    /// Magnification relative to a unit-wide view: `1 / re_width`.
    /// Purely informational, e.g. for a HUD readout in `{:e}` form.
    pub fn zoom(&self) -> f64 {
        1.0 / self.re_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-10;

    fn frame(re_width: f64, im_height: f64) -> Frame {
        Frame::new(Complex::new(-0.5, 0.25), re_width, im_height).unwrap()
    }

    #[test]
    fn invalid_extents() {
        assert!(Frame::new(Complex::ZERO, 0.0, 1.0).is_err());
        assert!(Frame::new(Complex::ZERO, 1.0, -2.0).is_err());
        assert!(Frame::new(Complex::ZERO, f64::NAN, 1.0).is_err());
        assert!(Frame::new(Complex::ZERO, 1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn derived_bounds() {
        let f = frame(3.0, 2.0);
        assert!((f.re_min() - (-2.0)).abs() < EPSILON);
        assert!((f.re_max() - 1.0).abs() < EPSILON);
        assert!((f.im_min() - (-0.75)).abs() < EPSILON);
        assert!((f.im_max() - 1.25).abs() < EPSILON);
    }

    #[test]
    fn fit_grows_imaginary_extent_for_tall_canvas() {
        // Frame is wider than the canvas ratio → keep re_width, grow im_height.
        let f = frame(4.0, 1.0).fit_to_canvas(100, 100);
        assert!((f.re_width - 4.0).abs() < EPSILON);
        assert!((f.im_height - 4.0).abs() < EPSILON);
    }

    #[test]
    fn fit_grows_real_extent_for_wide_canvas() {
        let f = frame(1.0, 2.0).fit_to_canvas(200, 100);
        assert!((f.im_height - 2.0).abs() < EPSILON);
        assert!((f.re_width - 4.0).abs() < EPSILON);
    }

    #[test]
    fn fit_is_idempotent() {
        let once = frame(3.6, 2.6).fit_to_canvas(1280, 720);
        let twice = once.fit_to_canvas(1280, 720);
        assert!((once.re_width - twice.re_width).abs() < EPSILON);
        assert!((once.im_height - twice.im_height).abs() < EPSILON);
        assert_eq!(once.center, twice.center);
    }

    #[test]
    fn fit_never_shrinks() {
        for &(w, h) in &[(100u32, 100u32), (1920, 1080), (300, 900), (720, 1280)] {
            let original = frame(3.6, 2.6);
            let fitted = original.fit_to_canvas(w, h);
            assert!(fitted.re_width >= original.re_width - EPSILON);
            assert!(fitted.im_height >= original.im_height - EPSILON);
        }
    }

    #[test]
    fn pixel_mapping_corners() {
        let f = frame(3.0, 2.0);
        let tl = f.to_complex_coords(0, 0, 300, 200);
        assert!((tl.re - f.re_min()).abs() < EPSILON);
        assert!((tl.im - f.im_min()).abs() < EPSILON);

        let br = f.to_complex_coords(300, 200, 300, 200);
        assert!((br.re - f.re_max()).abs() < EPSILON);
        assert!((br.im - f.im_max()).abs() < EPSILON);
    }

    #[test]
    fn default_frames_cover_the_sets() {
        let m = Frame::default_for(FractalType::Mandelbrot);
        assert!(m.re_min() < -2.0 && m.re_max() > 0.47);
        let j = Frame::default_for(FractalType::Julia);
        assert!(j.re_width >= 4.0 && j.im_height >= 4.0);
    }

    #[test]
    fn zoom_is_inverse_width() {
        let f = frame(0.001, 0.001);
        assert!((f.zoom() - 1000.0).abs() < EPSILON);
    }
}
