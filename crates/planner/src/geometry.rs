//! Output size, scale, and centered crop.
//!
//! Pixel rounding: every fractional dimension is floored, then an odd result
//! is decremented to the next even value (encoders targeting yuv420p need
//! even sizes). This runs once after scaling and once after cropping, so a
//! 1920x1080 frame cropped to 9:16 (607.5 wide) renders at 606x1080. The
//! crop origin is kept unrounded, centered on the fractional crop width.

use proclip_clip_model::geometry::{Point2D, RenderGeometry};
use proclip_clip_model::media::PixelSize;
use proclip_clip_model::settings::{AspectRatio, Resolution};

/// Slack for float noise such as `1279.9999999999998` before flooring.
const PIXEL_EPSILON: f64 = 1e-6;

/// Smallest dimension ever produced.
const MIN_DIMENSION: u32 = 2;

/// Floor to whole pixels, then drop to an even count (at least 2).
pub fn even_floor(px: f64) -> u32 {
    let whole = (px + PIXEL_EPSILON).floor().clamp(0.0, u32::MAX as f64) as u32;
    (whole - whole % 2).max(MIN_DIMENSION)
}

/// Resolve the render geometry for a source frame.
///
/// `natural_size` is the stored frame size; `rotated_90` swaps it before any
/// other step.
pub fn resolve_geometry(
    natural_size: PixelSize,
    rotated_90: bool,
    resolution: Resolution,
    aspect_ratio: AspectRatio,
) -> RenderGeometry {
    let source = if rotated_90 {
        natural_size.transposed()
    } else {
        natural_size
    };
    let (src_w, src_h) = (source.width.max(1) as f64, source.height.max(1) as f64);

    let (scaled_w, scaled_h, scale_factor) = match resolution.target_height() {
        None => (src_w, src_h, 1.0),
        Some(target) if src_w >= src_h => {
            let target = target as f64;
            (target * src_w / src_h, target, target / src_h)
        }
        Some(target) => {
            let target = target as f64;
            (target, target * src_h / src_w, target / src_w)
        }
    };

    let scaled_size = PixelSize::new(even_floor(scaled_w), even_floor(scaled_h));
    let (render_size, crop_origin) = center_crop(scaled_size, aspect_ratio);

    RenderGeometry {
        render_size,
        scaled_size,
        crop_origin,
        scale_factor,
    }
}

/// Largest centered window of the requested ratio inside `frame`.
fn center_crop(frame: PixelSize, aspect_ratio: AspectRatio) -> (PixelSize, Point2D) {
    let AspectRatio::Ratio {
        width: ratio_w,
        height: ratio_h,
    } = aspect_ratio
    else {
        return (frame, Point2D::ORIGIN);
    };
    let (ratio_w, ratio_h) = (ratio_w.max(1) as u64, ratio_h.max(1) as u64);
    let (w, h) = (frame.width as f64, frame.height as f64);

    // Compare w/h against ratio_w/ratio_h without division.
    let too_wide = frame.width as u64 * ratio_h > frame.height as u64 * ratio_w;
    if too_wide {
        let crop_w = h * ratio_w as f64 / ratio_h as f64;
        let origin = Point2D::new((w - crop_w) / 2.0, 0.0);
        (PixelSize::new(even_floor(crop_w), frame.height), origin)
    } else {
        let crop_h = w * ratio_h as f64 / ratio_w as f64;
        let origin = Point2D::new(0.0, (h - crop_h) / 2.0);
        (PixelSize::new(frame.width, even_floor(crop_h)), origin)
    }
}
