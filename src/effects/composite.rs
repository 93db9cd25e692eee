use crate::effects::transitions::WipeDir;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::mul_div255_u8;

pub type PremulRgba8 = [u8; 4];

/// Source-over of one premultiplied pixel with an extra opacity multiplier.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let op = unit_to_u8(opacity);
    if op == 0 || src[3] == 0 {
        return dst;
    }

    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Linear mix of two premultiplied pixels; `t = 0` is `a`, `t = 1` is `b`.
pub fn mix(a: PremulRgba8, b: PremulRgba8, t: f32) -> PremulRgba8 {
    let tt = unit_to_u8(t);
    let it = 255u16 - tt;

    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = mul_div255(u16::from(a[i]), it).saturating_add(mul_div255(u16::from(b[i]), tt));
    }
    out
}

/// Scale every channel of a premultiplied pixel (uniform alpha multiply).
pub fn scale(px: PremulRgba8, alpha: f32) -> PremulRgba8 {
    let a = unit_to_u8(alpha);
    [
        mul_div255(u16::from(px[0]), a),
        mul_div255(u16::from(px[1]), a),
        mul_div255(u16::from(px[2]), a),
        mul_div255(u16::from(px[3]), a),
    ]
}

pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> ReelResult<()> {
    check_pair(dst, src, "over_in_place")?;
    if opacity <= 0.0 {
        return Ok(());
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over(px(d), px(s), opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

pub fn scale_in_place(buf: &mut [u8], alpha: f32) {
    if alpha >= 1.0 {
        return;
    }
    for p in buf.chunks_exact_mut(4) {
        let out = scale(px(p), alpha);
        p.copy_from_slice(&out);
    }
}

/// Dissolve: `outgoing` becomes the per-pixel mix of itself and `incoming` at progress `t`.
pub fn dissolve_in_place(outgoing: &mut [u8], incoming: &[u8], t: f32) -> ReelResult<()> {
    check_pair(outgoing, incoming, "dissolve_in_place")?;
    for (o, i) in outgoing.chunks_exact_mut(4).zip(incoming.chunks_exact(4)) {
        let out = mix(px(o), px(i), t);
        o.copy_from_slice(&out);
    }
    Ok(())
}

/// Fade: `outgoing` is alpha-scaled by `1 - t`, then `incoming` is drawn over it at opacity `t`.
pub fn fade_in_place(outgoing: &mut [u8], incoming: &[u8], t: f32) -> ReelResult<()> {
    check_pair(outgoing, incoming, "fade_in_place")?;
    let t = t.clamp(0.0, 1.0);
    for (o, i) in outgoing.chunks_exact_mut(4).zip(incoming.chunks_exact(4)) {
        let out = over(scale(px(o), 1.0 - t), px(i), t);
        o.copy_from_slice(&out);
    }
    Ok(())
}

#[derive(Clone, Copy, Debug)]
pub struct WipeParams {
    pub width: u32,
    pub height: u32,
    pub t: f32,
    pub dir: WipeDir,
    /// Edge softness as a fraction of the wipe axis, `0` is a hard edge.
    pub soft_edge: f32,
}

/// Wipe: a moving edge reveals `incoming` over `outgoing` along `params.dir`.
pub fn wipe_in_place(outgoing: &mut [u8], incoming: &[u8], params: WipeParams) -> ReelResult<()> {
    let WipeParams {
        width,
        height,
        t,
        dir,
        soft_edge,
    } = params;
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| ReelError::evaluation("wipe buffer size overflow"))?;
    if outgoing.len() != expected_len || incoming.len() != expected_len {
        return Err(ReelError::evaluation(
            "wipe_in_place expects buffers matching width*height*4",
        ));
    }

    let t = t.clamp(0.0, 1.0);
    let axis_len = match dir {
        WipeDir::LeftToRight | WipeDir::RightToLeft => width as f32,
        WipeDir::TopToBottom | WipeDir::BottomToTop => height as f32,
    };
    let soft_px = soft_edge.max(0.0) * axis_len;
    let edge = t * (axis_len + 2.0 * soft_px) - soft_px;

    for y in 0..height {
        for x in 0..width {
            let pos = match dir {
                WipeDir::LeftToRight => x as f32,
                WipeDir::RightToLeft => (width - 1 - x) as f32,
                WipeDir::TopToBottom => y as f32,
                WipeDir::BottomToTop => (height - 1 - y) as f32,
            };
            let m = if soft_px <= 0.0 {
                if pos < edge { 1.0 } else { 0.0 }
            } else {
                1.0 - smoothstep(edge - soft_px, edge + soft_px, pos)
            };

            let idx = ((y as usize) * (width as usize) + (x as usize)) * 4;
            let out = mix(px(&outgoing[idx..idx + 4]), px(&incoming[idx..idx + 4]), m);
            outgoing[idx..idx + 4].copy_from_slice(&out);
        }
    }
    Ok(())
}

fn check_pair(a: &[u8], b: &[u8], op: &str) -> ReelResult<()> {
    if a.len() != b.len() || !a.len().is_multiple_of(4) {
        return Err(ReelError::evaluation(format!(
            "{op} expects equal-length rgba8 buffers"
        )));
    }
    Ok(())
}

#[inline]
fn px(s: &[u8]) -> PremulRgba8 {
    [s[0], s[1], s[2], s[3]]
}

fn unit_to_u8(v: f32) -> u16 {
    ((v.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16
}

fn mul_div255(x: u16, y: u16) -> u8 {
    mul_div255_u8(x, y)
}

fn smoothstep(a: f32, b: f32, x: f32) -> f32 {
    if x <= a {
        return 0.0;
    }
    if x >= b {
        return 1.0;
    }
    let t = (x - a) / (b - a);
    (t * t * (3.0 - 2.0 * t)).clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
