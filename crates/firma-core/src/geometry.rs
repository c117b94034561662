//! Surface geometry: client-space bounding box and local coordinate mapping.
//!
//! Input arrives in client (viewport) coordinates. The pad works in
//! surface-local coordinates, where `(0, 0)` is the top-left corner of the
//! drawing surface as it was last measured.

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// The drawing surface's on-screen box, as reported by `getBoundingClientRect()`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl SurfaceBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// A box anchored at the client origin.
    pub fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// The box as a kurbo rect in client coordinates.
    pub fn client_rect(&self) -> Rect {
        Rect::new(
            self.left,
            self.top,
            self.left + self.width,
            self.top + self.height,
        )
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Map client coordinates to surface-local coordinates.
    pub fn to_local(&self, client: Point) -> Point {
        Point::new(client.x - self.left, client.y - self.top)
    }

    /// Inclusive bounds check on a local point: `0 ≤ x ≤ width`, `0 ≤ y ≤ height`.
    pub fn contains_local(&self, local: Point) -> bool {
        local.x >= 0.0 && local.x <= self.width && local.y >= 0.0 && local.y <= self.height
    }

    /// Whole-pixel dimensions for the backing raster.
    ///
    /// Fractional CSS sizes truncate, matching how a canvas `width` attribute
    /// coerces a float.
    pub fn pixel_size(&self) -> (u32, u32) {
        (to_pixels(self.width), to_pixels(self.height))
    }

    /// True if the box covers no pixels.
    pub fn is_empty(&self) -> bool {
        let (w, h) = self.pixel_size();
        w == 0 || h == 0
    }
}

fn to_pixels(v: f64) -> u32 {
    if v.is_finite() && v > 0.0 {
        v.min(u32::MAX as f64) as u32
    } else {
        0
    }
}
