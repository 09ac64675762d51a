//! Output size bookkeeping.
//!
//! winit reports physical sizes and a scale factor; the viewer works with the
//! logical size and renders at a device pixel ratio capped at
//! [`MAX_PIXEL_RATIO`] to bound fill rate on very dense displays.

use crate::camera::Projection;

pub const MAX_PIXEL_RATIO: f64 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    width: f64,
    height: f64,
    /// Device pixel ratio as reported by the host, uncapped.
    scale_factor: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, scale_factor: f64) -> Self {
        let mut viewport = Self {
            width: 1.0,
            height: 1.0,
            scale_factor: 1.0,
        };
        viewport.resize(width, height, scale_factor);
        viewport
    }

    pub fn from_physical(size: winit::dpi::PhysicalSize<u32>, scale_factor: f64) -> Self {
        let logical = size.to_logical::<f64>(scale_factor);
        Self::new(logical.width, logical.height, scale_factor)
    }

    /// Record a new logical size and device pixel ratio.
    ///
    /// Returns `false` and leaves the state untouched for zero or non-finite sizes,
    /// which hosts report for minimised windows.
    pub fn resize(&mut self, width: f64, height: f64, scale_factor: f64) -> bool {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) {
            return false;
        }
        self.width = width;
        self.height = height;
        if valid(scale_factor) {
            self.scale_factor = scale_factor;
        }
        true
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.scale_factor.min(MAX_PIXEL_RATIO)
    }

    /// Size of the render target in physical pixels, never zero.
    pub fn buffer_size(&self) -> (u32, u32) {
        let ratio = self.pixel_ratio();
        (
            ((self.width * ratio).round() as u32).max(1),
            ((self.height * ratio).round() as u32).max(1),
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

/// Apply a resize notification to the viewport and the camera lens.
///
/// Returns the new render target size, or `None` if the notification was ignored.
pub fn handle_resize(
    viewport: &mut Viewport,
    projection: &mut Projection,
    width: f64,
    height: f64,
    scale_factor: f64,
) -> Option<(u32, u32)> {
    if !viewport.resize(width, height, scale_factor) {
        log::debug!("Ignoring resize to {width}x{height}");
        return None;
    }
    projection.set_aspect(viewport.width() as f32, viewport.height() as f32);
    Some(viewport.buffer_size())
}
