use std::path::PathBuf;

use crate::foundation::error::{ReelError, ReelResult};

/// A contiguous slice of narration shown over one image.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    pub index: usize,
    pub text: String,
    pub start: f64,
    pub end: f64,
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,
    /// Index of the scene this one was split from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative_unit: Option<usize>,
    /// Position within the split parent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_moment: Option<usize>,
}

impl Scene {
    pub fn new(index: usize, text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            index,
            text: text.into(),
            start,
            end,
            duration: end - start,
            image_prompt: None,
            image_path: None,
            narrative_unit: None,
            visual_moment: None,
        }
    }

    pub(crate) fn set_bounds(&mut self, start: f64, end: f64) {
        self.start = start;
        self.end = end;
        self.duration = end - start;
    }
}

/// Snap a scene list onto `[0, total]` without gaps: the first scene starts at 0, each scene ends
/// where the next starts, and the last ends at `total`. Indices are renumbered.
pub fn close_boundaries(scenes: &mut [Scene], total: f64) {
    let n = scenes.len();
    for i in 0..n {
        let start = if i == 0 { 0.0 } else { scenes[i].start };
        let end = if i + 1 < n { scenes[i + 1].start } else { total };
        scenes[i].index = i;
        scenes[i].set_bounds(start, end);
    }
}

/// Check that `scenes` tile `[0, total]` with positive durations.
pub fn check_coverage(scenes: &[Scene], total: f64) -> ReelResult<()> {
    const EPS: f64 = 1e-6;
    let Some(first) = scenes.first() else {
        return Err(ReelError::contract("scene list is empty"));
    };
    if first.start.abs() > EPS {
        return Err(ReelError::contract(format!(
            "first scene starts at {} instead of 0",
            first.start
        )));
    }
    for (i, s) in scenes.iter().enumerate() {
        if s.duration <= 0.0 || (s.duration - (s.end - s.start)).abs() > EPS {
            return Err(ReelError::contract(format!(
                "scene {i} has invalid duration {}",
                s.duration
            )));
        }
        if let Some(next) = scenes.get(i + 1)
            && (next.start - s.end).abs() > EPS
        {
            return Err(ReelError::contract(format!(
                "gap or overlap between scene {i} and {}",
                i + 1
            )));
        }
    }
    let last_end = scenes.last().map_or(0.0, |s| s.end);
    if (last_end - total).abs() > EPS {
        return Err(ReelError::contract(format!(
            "scenes end at {last_end}, expected {total}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/scene.rs"]
mod tests;
