use rand::Rng;

use crate::effects::composite::{
    WipeParams, dissolve_in_place, fade_in_place, scale_in_place, wipe_in_place,
};
use crate::effects::engine::ClipRenderer;
use crate::effects::transitions::{Transition, TransitionKind};
use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::progress;
use crate::render::frame::FrameRGBA;
use crate::timing::reconcile::boundary_overlaps;

/// Where one clip sits on the output timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub start: f64,
    pub duration: f64,
}

impl Placement {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Clip placements for a list of holds under one transition.
///
/// Concatenating transitions place clips back to back. Overlapping ones start clip `i + 1` one
/// overlap before clip `i` ends, so the total is [`crate::timing::reconcile::composited_duration`].
#[derive(Clone, Debug, PartialEq)]
pub struct Timeline {
    placements: Vec<Placement>,
    overlaps: Vec<f64>,
}

impl Timeline {
    pub fn layout(holds: &[f64], transition: &Transition) -> Self {
        let overlaps = boundary_overlaps(holds, transition);
        let mut placements = Vec::with_capacity(holds.len());
        let mut start = 0.0;
        for (i, &hold) in holds.iter().enumerate() {
            placements.push(Placement {
                start,
                duration: hold,
            });
            if let Some(ov) = overlaps.get(i) {
                start += hold - ov;
            }
        }
        Self {
            placements,
            overlaps,
        }
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn total(&self) -> f64 {
        self.placements.last().map_or(0.0, Placement::end)
    }

    /// Overlap between clip `i` and the clip before it.
    pub fn overlap_before(&self, i: usize) -> f64 {
        i.checked_sub(1)
            .and_then(|prev| self.overlaps.get(prev))
            .copied()
            .unwrap_or(0.0)
    }

    /// Clips visible at `t`, in timeline order. At or past the end the last clip stays visible.
    pub fn active_at(&self, t: f64) -> Vec<usize> {
        let active: Vec<usize> = self
            .placements
            .iter()
            .enumerate()
            .filter(|(_, p)| p.start <= t && t < p.end())
            .map(|(i, _)| i)
            .collect();
        if active.is_empty() && !self.placements.is_empty() && t >= self.total() {
            return vec![self.placements.len() - 1];
        }
        active
    }
}

/// Fade from and to black over the whole video, in seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GlobalFade {
    pub fade_in: f64,
    pub fade_out: f64,
}

impl GlobalFade {
    /// Both fades limited to `[0, total]`.
    pub fn clamped(self, total: f64) -> Self {
        let clamp = |v: f64| {
            if v.is_finite() {
                v.clamp(0.0, total.max(0.0))
            } else {
                0.0
            }
        };
        Self {
            fade_in: clamp(self.fade_in),
            fade_out: clamp(self.fade_out),
        }
    }

    pub fn alpha(&self, t: f64, total: f64) -> f32 {
        let fade_in = if self.fade_in > 0.0 {
            progress(t, 0.0, self.fade_in)
        } else {
            1.0
        };
        let fade_out = if self.fade_out > 0.0 {
            progress(total - t, 0.0, self.fade_out)
        } else {
            1.0
        };
        fade_in.min(fade_out) as f32
    }
}

/// Renders the composite of all clips at any time on the timeline.
#[derive(Debug)]
pub struct Compositor {
    clips: Vec<Option<ClipRenderer>>,
    timeline: Timeline,
    transition: Transition,
    fade: GlobalFade,
    canvas: Canvas,
}

impl Compositor {
    pub fn new(
        clips: Vec<ClipRenderer>,
        transition: Transition,
        fade: GlobalFade,
    ) -> ReelResult<Self> {
        let first = clips
            .first()
            .ok_or_else(|| ReelError::contract("compositor needs at least one clip"))?;
        let canvas = Canvas {
            width: first.width(),
            height: first.height(),
        };
        if let Some(i) = clips
            .iter()
            .position(|c| c.width() != canvas.width || c.height() != canvas.height)
        {
            return Err(ReelError::validation(format!(
                "clip {i} is {}x{}, expected {}x{}",
                clips[i].width(),
                clips[i].height(),
                canvas.width,
                canvas.height
            )));
        }

        let holds: Vec<f64> = clips.iter().map(ClipRenderer::duration).collect();
        let timeline = Timeline::layout(&holds, &transition);
        let fade = fade.clamped(timeline.total());
        tracing::debug!(
            clips = holds.len(),
            total = timeline.total(),
            kind = ?transition.kind,
            "compositor ready"
        );

        Ok(Self {
            clips: clips.into_iter().map(Some).collect(),
            timeline,
            transition,
            fade,
            canvas,
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn total_duration(&self) -> f64 {
        self.timeline.total()
    }

    /// Global fade after clamping to the total duration.
    pub fn fade(&self) -> GlobalFade {
        self.fade
    }

    /// Clips not yet released.
    pub fn live_clips(&self) -> usize {
        self.clips.iter().filter(|c| c.is_some()).count()
    }

    /// Composite frame at timeline time `t`.
    pub fn frame_at<R: Rng + ?Sized>(&self, t: f64, rng: &mut R) -> ReelResult<FrameRGBA> {
        let total = self.total_duration();
        let t = t.clamp(0.0, total);
        let active = self.timeline.active_at(t);

        let mut frame: Option<FrameRGBA> = None;
        for i in active {
            let incoming = self.render_clip(i, t, rng)?;
            frame = Some(match frame {
                None => incoming,
                Some(mut outgoing) => {
                    let p = progress(
                        t,
                        self.timeline.placements[i].start,
                        self.timeline.overlap_before(i),
                    ) as f32;
                    self.blend(&mut outgoing, &incoming, p)?;
                    outgoing
                }
            });
        }

        let mut frame = frame.ok_or_else(|| ReelError::evaluation("no clip visible"))?;
        scale_in_place(&mut frame.data, self.fade.alpha(t, total));
        Ok(frame)
    }

    /// Drop every clip that ends at or before `t`. Returns how many were released.
    ///
    /// Frames must then only be requested at times `>= t`.
    pub fn release_finished(&mut self, t: f64) -> usize {
        let last = self.clips.len().saturating_sub(1);
        let mut released = 0;
        for (i, (slot, placement)) in self
            .clips
            .iter_mut()
            .zip(self.timeline.placements.iter())
            .enumerate()
        {
            if i < last && slot.is_some() && placement.end() <= t {
                *slot = None;
                released += 1;
            }
        }
        if released > 0 {
            tracing::trace!(released, t, "released finished clips");
        }
        released
    }

    fn render_clip<R: Rng + ?Sized>(&self, i: usize, t: f64, rng: &mut R) -> ReelResult<FrameRGBA> {
        let clip = self
            .clips
            .get(i)
            .and_then(Option::as_ref)
            .ok_or_else(|| ReelError::evaluation(format!("clip {i} was already released")))?;
        clip.render_frame(t - self.timeline.placements[i].start, rng)
    }

    fn blend(&self, outgoing: &mut FrameRGBA, incoming: &FrameRGBA, p: f32) -> ReelResult<()> {
        match &self.transition.kind {
            TransitionKind::Dissolve => dissolve_in_place(&mut outgoing.data, &incoming.data, p),
            TransitionKind::Fade => fade_in_place(&mut outgoing.data, &incoming.data, p),
            TransitionKind::Wipe { dir, soft_edge } => wipe_in_place(
                &mut outgoing.data,
                &incoming.data,
                WipeParams {
                    width: self.canvas.width,
                    height: self.canvas.height,
                    t: p,
                    dir: *dir,
                    soft_edge: *soft_edge,
                },
            ),
            TransitionKind::None | TransitionKind::Unsupported(_) => {
                outgoing.data.clone_from(&incoming.data);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
