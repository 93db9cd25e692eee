use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};

use crate::foundation::error::{ReelError, ReelResult};
use crate::timeline::scene::Scene;
use crate::timeline::segment::SegmentMode;

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProjectSummary {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Written as an RFC 3339 timestamp.
    #[serde(default)]
    pub last_modified: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GenerationSettings {
    pub mode: SegmentMode,
    pub target_scene_duration: f64,
    pub total_duration: f64,
}

/// Scene list as written next to a project, for inspection and re-rendering.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScenesDocument {
    pub project: ProjectSummary,
    pub scenes: Vec<Scene>,
    pub generation: GenerationSettings,
}

impl ScenesDocument {
    /// Wrap `scenes`, stamping the current time. The total is the last scene's end.
    pub fn new(
        project: ProjectSummary,
        scenes: Vec<Scene>,
        mode: SegmentMode,
        target_scene_duration: f64,
    ) -> Self {
        let total_duration = scenes.last().map_or(0.0, |s| s.end);
        Self {
            project: ProjectSummary {
                last_modified: Utc::now(),
                ..project
            },
            scenes,
            generation: GenerationSettings {
                mode,
                target_scene_duration,
                total_duration,
            },
        }
    }

    pub fn save(&self, path: &Path) -> ReelResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create directory '{}'", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ReelError::serde(format!("serialize scenes document: {e}")))?;
        std::fs::write(path, json)
            .with_context(|| format!("write scenes document '{}'", path.display()))?;
        tracing::info!(path = %path.display(), scenes = self.scenes.len(), "scenes saved");
        Ok(())
    }

    pub fn load(path: &Path) -> ReelResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read scenes document '{}'", path.display()))?;
        serde_json::from_str(&text).map_err(|e| {
            ReelError::serde(format!("parse scenes document '{}': {e}", path.display()))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/document.rs"]
mod tests;
