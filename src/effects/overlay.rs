use std::path::Path;
use std::sync::Arc;

use crate::assets::decode::{PreparedImage, load_image};
use crate::assets::media::{decode_video_frames_rgba8, is_video_path, read_video_info};
use crate::effects::composite::over_in_place;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ReelError, ReelResult};

/// An overlay asset drawn over a clip, e.g. film grain or light leaks.
///
/// Video overlays (`.mp4`, `.mov`, `.avi`, `.webm`) loop for as long as they are visible; any
/// other file is decoded as a still image.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlaySpec {
    /// File name relative to the configured overlay directory.
    pub name: String,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Seconds into the clip before the overlay appears.
    #[serde(default)]
    pub start_offset: f64,
    /// Visible duration; `None` keeps it until the clip ends.
    #[serde(default)]
    pub duration: Option<f64>,
}

fn default_opacity() -> f64 {
    0.3
}

impl OverlaySpec {
    pub fn new(name: impl Into<String>, opacity: f64) -> Self {
        Self {
            name: name.into(),
            opacity,
            start_offset: 0.0,
            duration: None,
        }
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.name.trim().is_empty() {
            return Err(ReelError::validation("overlay name must be non-empty"));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(ReelError::validation(format!(
                "overlay '{}': opacity must be within [0, 1], got {}",
                self.name, self.opacity
            )));
        }
        if !self.start_offset.is_finite() || self.start_offset < 0.0 {
            return Err(ReelError::validation(format!(
                "overlay '{}': start_offset must be finite and >= 0",
                self.name
            )));
        }
        if let Some(d) = self.duration
            && (!d.is_finite() || d <= 0.0)
        {
            return Err(ReelError::validation(format!(
                "overlay '{}': duration must be finite and > 0 when set",
                self.name
            )));
        }
        Ok(())
    }
}

/// Decoded overlay pixels fitted to the output canvas: one frame for stills, a looping
/// sequence for videos.
#[derive(Clone, Debug)]
pub struct OverlaySource {
    frames: Arc<[PreparedImage]>,
    frame_duration: f64,
}

impl OverlaySource {
    pub fn still(image: PreparedImage) -> Self {
        Self {
            frames: vec![image].into(),
            frame_duration: 0.0,
        }
    }

    /// A sequence shown at `fps`, looping after its last frame.
    pub fn from_frames(frames: Vec<PreparedImage>, fps: Fps) -> ReelResult<Self> {
        if frames.is_empty() {
            return Err(ReelError::validation("overlay has no frames"));
        }
        if frames.windows(2).any(|w| w[0].canvas() != w[1].canvas()) {
            return Err(ReelError::validation("overlay frames differ in size"));
        }
        Ok(Self {
            frames: frames.into(),
            frame_duration: fps.frame_duration_secs(),
        })
    }

    /// Load `dir/spec.name` fitted to `canvas`. Videos are sampled at `fps` and decoded for at
    /// most `max_secs` seconds, the longest time the overlay can stay on screen.
    pub fn load(
        spec: &OverlaySpec,
        dir: &Path,
        canvas: Canvas,
        fps: Fps,
        max_secs: f64,
    ) -> ReelResult<Self> {
        spec.validate()?;
        let path = dir.join(&spec.name);
        if !is_video_path(&path) {
            return Ok(Self::still(load_image(&path)?.fit_to(canvas)?));
        }
        let info = read_video_info(&path)?;
        let limit = match info.duration_secs {
            Some(d) => d.min(max_secs),
            None => max_secs,
        };
        let frames = decode_video_frames_rgba8(&info, canvas, fps, limit)?;
        tracing::debug!(
            overlay = %spec.name,
            frames = frames.len(),
            "video overlay loaded"
        );
        Self::from_frames(frames, fps)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Length of one loop in seconds, zero for stills.
    pub fn loop_duration(&self) -> f64 {
        if self.frames.len() < 2 {
            0.0
        } else {
            self.frame_duration * self.frames.len() as f64
        }
    }

    /// Frame shown `local` seconds after the overlay appears.
    pub fn frame_at(&self, local: f64) -> &PreparedImage {
        let period = self.loop_duration();
        if period <= 0.0 || !local.is_finite() {
            return &self.frames[0];
        }
        let phase = local.rem_euclid(period);
        // Nudge so frame-aligned times land on their own frame despite rounding.
        let idx = ((phase / self.frame_duration + 1e-9).floor() as usize) % self.frames.len();
        &self.frames[idx]
    }
}

/// Overlay source plus its opacity and time window within one clip.
#[derive(Clone, Debug)]
pub struct OverlayLayer {
    source: OverlaySource,
    opacity: f32,
    start: f64,
    end: Option<f64>,
}

impl OverlayLayer {
    pub fn new(source: OverlaySource, spec: &OverlaySpec) -> ReelResult<Self> {
        spec.validate()?;
        Ok(Self {
            source,
            opacity: spec.opacity as f32,
            start: spec.start_offset,
            end: spec.duration.map(|d| spec.start_offset + d),
        })
    }

    /// Whether the overlay is visible at clip-local time `t`.
    pub fn is_active(&self, t: f64) -> bool {
        t >= self.start && self.end.is_none_or(|end| t < end)
    }

    /// Composite the overlay over `dst` (premultiplied RGBA8 of the same canvas) at time `t`.
    pub fn apply(&self, dst: &mut [u8], t: f64) -> ReelResult<()> {
        if !self.is_active(t) {
            return Ok(());
        }
        let frame = self.source.frame_at(t - self.start);
        over_in_place(dst, &frame.rgba8_premul, self.opacity)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/overlay.rs"]
mod tests;
