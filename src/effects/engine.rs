use image::{RgbaImage, imageops::FilterType};
use kurbo::Point;
use rand::Rng;

use crate::animation::ease::ease_smooth;
use crate::assets::decode::PreparedImage;
use crate::effects::composite::scale_in_place;
use crate::effects::geometry::{CropWindow, crop_window, lerp_point};
use crate::effects::overlay::OverlayLayer;
use crate::effects::spec::{
    EffectError, EffectKind, EffectSpec, KenBurnsParams, PanDir, ShakeParams, ShakeZoomParams,
    parse_effect,
};
use crate::foundation::core::center;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::{lerp, progress};
use crate::render::frame::FrameRGBA;

/// Virtual camera state for one frame: zoom factor and normalized look-at point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub zoom: f64,
    pub center: Point,
}

/// Per-clip render parameters.
///
/// A clip is a still image shown for `duration` seconds under an optional effect and overlay.
/// Rendering is stateless: [`ClipRenderer::render_frame`] depends only on `t` and the injected
/// random source (which only the shake family reads).
#[derive(Clone, Debug)]
pub struct ClipRenderer {
    source: RgbaImage,
    duration: f64,
    effect: Option<EffectKind>,
    overlay: Option<OverlayLayer>,
}

impl ClipRenderer {
    /// Unmodified still clip.
    pub fn still(source: &PreparedImage, duration: f64) -> ReelResult<Self> {
        Ok(Self {
            source: source.to_rgba_image()?,
            duration: if duration.is_finite() {
                duration.max(0.0)
            } else {
                0.0
            },
            effect: None,
            overlay: None,
        })
    }

    pub fn with_overlay(mut self, overlay: OverlayLayer) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn effect(&self) -> Option<&EffectKind> {
        self.effect.as_ref()
    }

    pub fn width(&self) -> u32 {
        self.source.width()
    }

    pub fn height(&self) -> u32 {
        self.source.height()
    }

    fn with_effect(mut self, kind: EffectKind) -> Self {
        match kind {
            EffectKind::MirrorX => image::imageops::flip_horizontal_in_place(&mut self.source),
            EffectKind::MirrorY => image::imageops::flip_vertical_in_place(&mut self.source),
            EffectKind::Rotate180 => image::imageops::rotate180_in_place(&mut self.source),
            _ => {}
        }
        self.effect = Some(kind);
        self
    }

    /// Camera for clip-local time `t`, `None` for effects that keep the full frame.
    pub fn camera<R: Rng + ?Sized>(&self, t: f64, rng: &mut R) -> Option<Camera> {
        let d = self.duration;
        let t = t.clamp(0.0, d);
        let p = ease_smooth(progress(t, 0.0, d));

        match self.effect? {
            EffectKind::ZoomIn { zoom_factor } => Some(Camera {
                zoom: lerp(1.0, zoom_factor, p),
                center: center(),
            }),
            EffectKind::ZoomOut { zoom_factor } => Some(Camera {
                zoom: lerp(zoom_factor, 1.0, p),
                center: center(),
            }),
            EffectKind::Pan {
                dir,
                zoom_factor,
                distance,
            } => Some(Camera {
                zoom: zoom_factor,
                center: lerp_point(pan_start(dir, distance), center(), p),
            }),
            EffectKind::KenBurns(kb) => Some(kenburns_camera(&kb, p)),
            EffectKind::Shake(shake) => Some(self.shake_camera(&shake, rng)),
            EffectKind::ShakeZoomCombo(combo) => Some(self.shake_zoom_camera(&combo, t, rng)),
            EffectKind::ShakeKenBurnsCombo(combo) => {
                let sd = combo.shake_duration.min(d);
                if sd > 0.0 && t <= sd {
                    Some(self.shake_camera(&combo.shake, rng))
                } else {
                    let p = ease_smooth(progress(t, sd, d - sd));
                    Some(kenburns_camera(&combo.kenburns, p))
                }
            }
            EffectKind::FadeIn { .. }
            | EffectKind::FadeOut { .. }
            | EffectKind::MirrorX
            | EffectKind::MirrorY
            | EffectKind::Rotate180 => None,
        }
    }

    /// Source crop window for time `t`, `None` when the full frame is shown.
    pub fn crop_window<R: Rng + ?Sized>(&self, t: f64, rng: &mut R) -> Option<CropWindow> {
        self.camera(t, rng)
            .map(|cam| crop_window(self.width(), self.height(), cam.zoom, cam.center))
    }

    /// Uniform alpha multiplier of the clip at time `t` (fade effects).
    pub fn alpha(&self, t: f64) -> f32 {
        let t = t.clamp(0.0, self.duration);
        let a = match self.effect {
            Some(EffectKind::FadeIn { duration }) => progress(t, 0.0, duration),
            Some(EffectKind::FadeOut { duration }) => {
                progress(self.duration - t, 0.0, duration)
            }
            _ => 1.0,
        };
        a as f32
    }

    /// Render the clip at local time `t` into a premultiplied frame of the source size.
    pub fn render_frame<R: Rng + ?Sized>(&self, t: f64, rng: &mut R) -> ReelResult<FrameRGBA> {
        let (w, h) = self.source.dimensions();
        let data = match self.crop_window(t, rng) {
            Some(win) if !win.is_full(w, h) => {
                let sub = image::imageops::crop_imm(&self.source, win.x, win.y, win.width, win.height)
                    .to_image();
                image::imageops::resize(&sub, w, h, FilterType::Lanczos3).into_raw()
            }
            _ => self.source.as_raw().clone(),
        };

        let mut frame = FrameRGBA {
            width: w,
            height: h,
            data,
            premultiplied: true,
        };
        scale_in_place(&mut frame.data, self.alpha(t));
        if let Some(overlay) = self.overlay.as_ref() {
            overlay.apply(&mut frame.data, t)?;
        }
        Ok(frame)
    }

    fn shake_camera<R: Rng + ?Sized>(&self, shake: &ShakeParams, rng: &mut R) -> Camera {
        let jitter = |rng: &mut R| {
            if shake.intensity > 0.0 {
                rng.gen_range(-shake.intensity..=shake.intensity)
            } else {
                0.0
            }
        };
        let dx = jitter(rng);
        let dy = jitter(rng);
        Camera {
            zoom: shake.zoom_factor,
            center: Point::new(
                0.5 + dx / f64::from(self.width()),
                0.5 + dy / f64::from(self.height()),
            ),
        }
    }

    fn shake_zoom_camera<R: Rng + ?Sized>(
        &self,
        combo: &ShakeZoomParams,
        t: f64,
        rng: &mut R,
    ) -> Camera {
        let sd = combo.shake_duration.min(self.duration);
        if sd > 0.0 && t <= sd {
            return self.shake_camera(&combo.shake, rng);
        }
        let rest = self.duration - sd;
        let zoom_in_len = rest * 0.6;
        let zoom = if t <= sd + zoom_in_len {
            let p = ease_smooth(progress(t, sd, zoom_in_len));
            lerp(1.0, combo.zoom_in_factor, p)
        } else {
            let p = ease_smooth(progress(t, sd + zoom_in_len, rest - zoom_in_len));
            lerp(combo.zoom_out_factor, combo.zoom_in_factor, p)
        };
        Camera {
            zoom,
            center: center(),
        }
    }
}

fn pan_start(dir: PanDir, distance: f64) -> Point {
    let off = distance / 2.0;
    match dir {
        PanDir::Left => Point::new(0.5 + off, 0.5),
        PanDir::Right => Point::new(0.5 - off, 0.5),
        PanDir::Up => Point::new(0.5, 0.5 + off),
        PanDir::Down => Point::new(0.5, 0.5 - off),
    }
}

fn kenburns_camera(kb: &KenBurnsParams, p: f64) -> Camera {
    Camera {
        zoom: lerp(kb.zoom_start, kb.zoom_end, p),
        center: lerp_point(kb.pan_start, kb.pan_end, p),
    }
}

/// Build a clip with the effect described by `spec`.
///
/// Effect problems (unknown name, bad params, non-positive duration) surface as
/// [`ReelError::Effect`] so callers can pick their own fallback.
pub fn try_apply_effect(
    source: &PreparedImage,
    duration: f64,
    spec: &EffectSpec,
) -> ReelResult<ClipRenderer> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(EffectError::InvalidDuration(duration).into());
    }
    let kind = parse_effect(spec)?;
    Ok(ClipRenderer::still(source, duration)?.with_effect(kind))
}

/// Build a clip with `spec` applied, falling back to the unmodified still when the effect
/// cannot be built. Only an inconsistent source buffer is an error.
pub fn apply_effect(
    source: &PreparedImage,
    duration: f64,
    spec: &EffectSpec,
) -> ReelResult<ClipRenderer> {
    Ok(build_clip(source, duration, spec)?.0)
}

/// Like [`apply_effect`] but also reports the effect failure that caused a fallback.
pub fn build_clip(
    source: &PreparedImage,
    duration: f64,
    spec: &EffectSpec,
) -> ReelResult<(ClipRenderer, Option<EffectError>)> {
    match try_apply_effect(source, duration, spec) {
        Ok(clip) => Ok((clip, None)),
        Err(ReelError::Effect(err)) => {
            tracing::warn!(effect = %spec.name, error = %err, "effect failed, using still clip");
            Ok((ClipRenderer::still(source, duration)?, Some(err)))
        }
        Err(other) => Err(other),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/engine.rs"]
mod tests;
