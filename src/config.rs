use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::effects::overlay::OverlaySpec;
use crate::effects::spec::{EffectSpec, parse_effect};
use crate::effects::transitions::{Transition, TransitionSpec};
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::compositor::GlobalFade;
use crate::timeline::segment::SegmentPolicy;
use crate::timing::reconcile::ReconcilePolicy;

/// Everything a render needs besides the scenes, images and audio.
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    pub segmentation: SegmentPolicy,
    pub transition: TransitionSpec,
    pub reconcile: ReconcilePolicy,
    /// Fade from black at the start of the video, in seconds.
    pub fade_in: f64,
    /// Fade to black at the end of the video, in seconds.
    pub fade_out: f64,
    /// Effects cycled over the clips in order. Empty renders plain stills.
    pub effects: Vec<EffectSpec>,
    /// Overlays cycled over the clips in order.
    pub overlays: Vec<OverlaySpec>,
    pub overlay_dir: PathBuf,
    /// Background that transparent pixels are flattened onto when encoding.
    pub bg_rgba: [u8; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: Fps { num: 24, den: 1 },
            segmentation: SegmentPolicy::default(),
            transition: TransitionSpec::default(),
            reconcile: ReconcilePolicy::default(),
            fade_in: 1.0,
            fade_out: 1.0,
            effects: ["zoom_in", "pan_right", "zoom_out", "pan_left", "kenburns"]
                .into_iter()
                .map(EffectSpec::named)
                .collect(),
            overlays: Vec::new(),
            overlay_dir: PathBuf::from("overlays"),
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

impl RenderConfig {
    pub fn from_json_str(s: &str) -> ReelResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| ReelError::serde(format!("config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> ReelResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ReelError::validation("width and height must be > 0"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(ReelError::validation(format!(
                "width and height must be even for yuv420p output, got {}x{}",
                self.width, self.height
            )));
        }
        Fps::new(self.fps.num, self.fps.den)?;
        for (name, v) in [("fade_in", self.fade_in), ("fade_out", self.fade_out)] {
            if !v.is_finite() || v < 0.0 {
                return Err(ReelError::validation(format!(
                    "{name} must be finite and >= 0, got {v}"
                )));
            }
        }
        self.segmentation.validate()?;
        self.reconcile.validate()?;
        Transition::from_spec(&self.transition)?;
        for overlay in &self.overlays {
            overlay.validate()?;
        }
        // Bad effects only fall back to stills at render time.
        for effect in &self.effects {
            if let Err(err) = parse_effect(effect) {
                tracing::warn!(effect = %effect.name, error = %err, "effect will render as a still");
            }
        }
        Ok(())
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    pub fn global_fade(&self) -> GlobalFade {
        GlobalFade {
            fade_in: self.fade_in,
            fade_out: self.fade_out,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
