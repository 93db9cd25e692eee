use std::path::PathBuf;

use crate::config::RenderConfig;
use crate::effects::overlay::OverlaySpec;
use crate::effects::spec::EffectSpec;
use crate::effects::transitions::{Transition, TransitionSpec};
use crate::foundation::error::{ReelError, ReelResult};
use crate::timeline::planning::distribute_round_robin;
use crate::timeline::scene::Scene;
use crate::timing::reconcile::{ReconcileOutcome, reconcile};

/// One clip of the output: an image held for `hold_duration` seconds.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClipSpec {
    pub image_path: PathBuf,
    pub hold_duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<EffectSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay: Option<OverlaySpec>,
}

/// Fully resolved description of a video, ready for [`crate::render::assembler::VideoAssembler`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderPlan {
    pub clip_specs: Vec<ClipSpec>,
    pub transition: TransitionSpec,
    pub target_total_duration: f64,
    pub outcome: ReconcileOutcome,
    /// Composited length of `clip_specs`, equal to the target unless `outcome` is `uniform`.
    pub rendered_total: f64,
}

impl RenderPlan {
    pub fn holds(&self) -> Vec<f64> {
        self.clip_specs.iter().map(|c| c.hold_duration).collect()
    }

    pub fn from_json_str(s: &str) -> ReelResult<Self> {
        serde_json::from_str(s).map_err(|e| ReelError::serde(format!("render plan: {e}")))
    }

    pub fn to_json_pretty(&self) -> ReelResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ReelError::serde(e.to_string()))
    }
}

/// Pair every scene with its image, assign effects and overlays round-robin and fit the holds
/// to `audio_duration` seconds.
#[tracing::instrument(skip(scenes, image_paths, config), fields(scenes = scenes.len()))]
pub fn build_render_plan(
    scenes: &[Scene],
    image_paths: &[PathBuf],
    config: &RenderConfig,
    audio_duration: f64,
) -> ReelResult<RenderPlan> {
    if scenes.is_empty() {
        return Err(ReelError::contract("no scenes to render"));
    }
    if scenes.len() != image_paths.len() {
        return Err(ReelError::contract(format!(
            "{} scenes but {} images",
            scenes.len(),
            image_paths.len()
        )));
    }
    config.validate()?;

    let transition = Transition::from_spec(&config.transition)?;
    let durations: Vec<f64> = scenes.iter().map(|s| s.duration).collect();
    let reconciled = reconcile(&durations, &transition, audio_duration, &config.reconcile)?;

    let n = scenes.len();
    let mut effects = distribute_round_robin(&config.effects, n).into_iter();
    let mut overlays = distribute_round_robin(&config.overlays, n).into_iter();
    let clip_specs = image_paths
        .iter()
        .zip(reconciled.durations.iter())
        .map(|(path, &hold)| ClipSpec {
            image_path: path.clone(),
            hold_duration: hold,
            effect: effects.next(),
            overlay: overlays.next(),
        })
        .collect();

    Ok(RenderPlan {
        clip_specs,
        transition: config.transition.clone(),
        target_total_duration: audio_duration,
        outcome: reconciled.outcome,
        rendered_total: reconciled.rendered_total,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
