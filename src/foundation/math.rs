pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Linear interpolation of scalars, `t` is not clamped.
#[inline]
pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// `x` mapped to `[0, 1]` over `[start, start + len]`; zero-length ranges snap to 1.
#[inline]
pub(crate) fn progress(x: f64, start: f64, len: f64) -> f64 {
    if len <= 0.0 {
        return 1.0;
    }
    ((x - start) / len).clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
