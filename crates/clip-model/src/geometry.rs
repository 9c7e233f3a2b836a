//! Render geometry: scale + centered crop.
//!
//! Coordinates are in pixels with `(0, 0)` at the top-left of the frame.

use serde::{Deserialize, Serialize};

use crate::media::PixelSize;

/// A 2D pixel-space point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const ORIGIN: Point2D = Point2D { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A 2D affine transform mapping `(x, y)` to
/// `(a*x + c*y + tx, b*x + d*y + ty)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl AffineTransform {
    pub const IDENTITY: AffineTransform = AffineTransform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn scale(s: f64) -> Self {
        Self {
            a: s,
            d: s,
            ..Self::IDENTITY
        }
    }

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self {
            tx,
            ty,
            ..Self::IDENTITY
        }
    }

    /// `self` followed by `next`.
    pub fn then(self, next: AffineTransform) -> Self {
        Self {
            a: self.a * next.a + self.b * next.c,
            b: self.a * next.b + self.b * next.d,
            c: self.c * next.a + self.d * next.c,
            d: self.c * next.b + self.d * next.d,
            tx: self.tx * next.a + self.ty * next.c + next.tx,
            ty: self.tx * next.b + self.ty * next.d + next.ty,
        }
    }

    pub fn apply(self, p: Point2D) -> Point2D {
        Point2D {
            x: self.a * p.x + self.c * p.y + self.tx,
            y: self.b * p.x + self.d * p.y + self.ty,
        }
    }
}

/// Where source pixels land in the output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderGeometry {
    /// Final output size; both dimensions even and non-zero.
    pub render_size: PixelSize,

    /// Frame size after scaling and before cropping (even).
    pub scaled_size: PixelSize,

    /// Top-left of the crop window in scaled space (zero when not cropping).
    pub crop_origin: Point2D,

    /// Uniform scale applied to the (rotation-corrected) source frame.
    pub scale_factor: f64,
}

impl RenderGeometry {
    /// Scale then translate by the negated crop origin.
    pub fn transform(&self) -> AffineTransform {
        AffineTransform::scale(self.scale_factor).then(AffineTransform::translation(
            -self.crop_origin.x,
            -self.crop_origin.y,
        ))
    }

    pub fn is_cropped(&self) -> bool {
        self.render_size != self.scaled_size
    }

    /// Crop origin snapped to whole pixels, clamped so the crop window stays
    /// inside the scaled frame.
    pub fn crop_origin_px(&self) -> (u32, u32) {
        let max_x = self.scaled_size.width.saturating_sub(self.render_size.width);
        let max_y = self.scaled_size.height.saturating_sub(self.render_size.height);
        let x = (self.crop_origin.x.max(0.0).floor() as u32).min(max_x);
        let y = (self.crop_origin.y.max(0.0).floor() as u32).min(max_y);
        (x, y)
    }
}
