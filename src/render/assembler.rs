use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rand::Rng;

use crate::assets::decode::{PreparedImage, load_image};
use crate::config::RenderConfig;
use crate::effects::engine::{ClipRenderer, build_clip};
use crate::effects::overlay::{OverlayLayer, OverlaySource};
use crate::effects::transitions::Transition;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::compositor::Compositor;
use crate::render::plan::RenderPlan;

/// Summary of one render.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderStats {
    pub frames: u64,
    pub duration_secs: f64,
    /// Clips whose effect could not be built and were rendered as stills.
    pub fallback_effects: usize,
    /// Clips whose overlay could not be loaded.
    pub skipped_overlays: usize,
}

/// Turns a [`RenderPlan`] into frames for a [`FrameSink`].
#[derive(Debug)]
pub struct VideoAssembler<'a> {
    config: &'a RenderConfig,
    audio: Option<PathBuf>,
}

impl<'a> VideoAssembler<'a> {
    pub fn new(config: &'a RenderConfig) -> Self {
        Self {
            config,
            audio: None,
        }
    }

    /// Narration to hand to the sink for muxing.
    pub fn with_audio(mut self, audio: impl Into<PathBuf>) -> Self {
        self.audio = Some(audio.into());
        self
    }

    /// Decode every image in `plan`, once per distinct path, fitted to the output canvas.
    pub fn load_images(&self, plan: &RenderPlan) -> ReelResult<Vec<PreparedImage>> {
        let canvas = self.config.canvas();
        let mut cache: HashMap<&Path, PreparedImage> = HashMap::new();
        let mut out = Vec::with_capacity(plan.clip_specs.len());
        for clip in &plan.clip_specs {
            let path = clip.image_path.as_path();
            if let Some(img) = cache.get(path) {
                out.push(img.clone());
                continue;
            }
            let img = load_image(path)?.fit_to(canvas)?;
            tracing::debug!(path = %path.display(), "image loaded");
            cache.insert(path, img.clone());
            out.push(img);
        }
        Ok(out)
    }

    /// Build clip renderers for `plan` from already decoded `images` and compose them.
    pub fn compose(
        &self,
        plan: &RenderPlan,
        images: &[PreparedImage],
    ) -> ReelResult<(Compositor, RenderStats)> {
        if images.len() != plan.clip_specs.len() {
            return Err(ReelError::contract(format!(
                "{} clips but {} images",
                plan.clip_specs.len(),
                images.len()
            )));
        }
        let canvas = self.config.canvas();
        let mut stats = RenderStats::default();
        let mut overlay_cache: HashMap<&str, Option<OverlaySource>> = HashMap::new();
        let longest_hold = plan
            .clip_specs
            .iter()
            .map(|c| c.hold_duration)
            .fold(0.0, f64::max);

        let mut clips = Vec::with_capacity(images.len());
        for (i, (spec, image)) in plan.clip_specs.iter().zip(images).enumerate() {
            let image = if image.canvas() == canvas {
                image.clone()
            } else {
                image.fit_to(canvas)?
            };
            let mut clip = match &spec.effect {
                Some(effect) => {
                    let (clip, failure) = build_clip(&image, spec.hold_duration, effect)?;
                    if failure.is_some() {
                        stats.fallback_effects += 1;
                    }
                    clip
                }
                None => ClipRenderer::still(&image, spec.hold_duration)?,
            };

            if let Some(overlay) = &spec.overlay {
                let loaded = overlay_cache
                    .entry(overlay.name.as_str())
                    .or_insert_with(|| {
                        match OverlaySource::load(
                            overlay,
                            &self.config.overlay_dir,
                            canvas,
                            self.config.fps,
                            longest_hold,
                        ) {
                            Ok(source) => Some(source),
                            Err(err) => {
                                tracing::warn!(
                                    overlay = %overlay.name,
                                    error = %err,
                                    "overlay unavailable, skipping"
                                );
                                None
                            }
                        }
                    });
                match loaded {
                    Some(source) => {
                        clip = clip.with_overlay(OverlayLayer::new(source.clone(), overlay)?)
                    }
                    None => stats.skipped_overlays += 1,
                }
            }
            tracing::trace!(clip = i, hold = spec.hold_duration, "clip built");
            clips.push(clip);
        }

        let transition = Transition::from_spec(&plan.transition)?;
        let compositor = Compositor::new(clips, transition, self.config.global_fade())?;
        stats.duration_secs = compositor.total_duration();
        stats.frames = self.config.fps.secs_to_frames_round(stats.duration_secs);
        Ok((compositor, stats))
    }

    /// Load the plan's images and render every frame into `sink`.
    pub fn render(&self, plan: &RenderPlan, sink: &mut dyn FrameSink) -> ReelResult<RenderStats> {
        let images = self.load_images(plan)?;
        self.render_images_with_rng(plan, &images, sink, &mut rand::thread_rng())
    }

    /// Render with caller-provided images and random source.
    #[tracing::instrument(skip_all, fields(clips = plan.clip_specs.len()))]
    pub fn render_images_with_rng<R: Rng + ?Sized>(
        &self,
        plan: &RenderPlan,
        images: &[PreparedImage],
        sink: &mut dyn FrameSink,
        rng: &mut R,
    ) -> ReelResult<RenderStats> {
        let (mut compositor, stats) = self.compose(plan, images)?;
        let fps = self.config.fps;

        sink.begin(SinkConfig {
            width: self.config.width,
            height: self.config.height,
            fps,
            audio: self.audio.clone(),
        })?;
        for i in 0..stats.frames {
            let t = fps.frames_to_secs(i);
            compositor.release_finished(t);
            let frame = compositor.frame_at(t, rng)?;
            sink.push_frame(FrameIndex(i), &frame)?;
        }
        sink.end()?;

        tracing::info!(
            frames = stats.frames,
            duration_secs = stats.duration_secs,
            fallback_effects = stats.fallback_effects,
            skipped_overlays = stats.skipped_overlays,
            "render finished"
        );
        Ok(stats)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/assembler.rs"]
mod tests;
