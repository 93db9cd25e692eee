use kurbo::Point;

/// Integer crop rectangle in source pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropWindow {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropWindow {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    pub fn is_full(&self, width: u32, height: u32) -> bool {
        *self == Self::full(width, height)
    }

    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width >= 1
            && self.height >= 1
            && u64::from(self.x) + u64::from(self.width) <= u64::from(width)
            && u64::from(self.y) + u64::from(self.height) <= u64::from(height)
    }
}

/// Crop window for a virtual camera at `zoom` looking at the normalized `center`.
///
/// Zooms below 1 (or non-finite) are treated as 1. The window is clamped so it always lies
/// inside the source image.
pub fn crop_window(src_w: u32, src_h: u32, zoom: f64, center: Point) -> CropWindow {
    let zoom = if zoom.is_finite() && zoom >= 1.0 {
        zoom
    } else {
        1.0
    };
    let width = window_len(src_w, zoom);
    let height = window_len(src_h, zoom);

    CropWindow {
        x: window_origin(src_w, width, center.x),
        y: window_origin(src_h, height, center.y),
        width,
        height,
    }
}

fn window_len(src: u32, zoom: f64) -> u32 {
    // Small epsilon keeps exact divisions (1080 / 1.2) from flooring one pixel short.
    let len = (f64::from(src) / zoom + 1e-6).floor();
    (len as u32).clamp(1, src.max(1))
}

fn window_origin(src: u32, len: u32, center: f64) -> u32 {
    let max = f64::from(src.saturating_sub(len));
    let center = if center.is_finite() { center } else { 0.5 };
    (center * f64::from(src) - f64::from(len) / 2.0)
        .round()
        .clamp(0.0, max) as u32
}

/// Linear interpolation between two normalized points.
pub fn lerp_point(a: Point, b: Point, t: f64) -> Point {
    a.lerp(b, t)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/geometry.rs"]
mod tests;
