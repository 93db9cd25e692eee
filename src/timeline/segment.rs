use crate::foundation::error::{ReelError, ReelResult};
use crate::timeline::align::{segment_by_paragraphs, split_paragraphs};
use crate::timeline::scene::{Scene, check_coverage, close_boundaries};
use crate::timeline::transcript::{TranscriptionSpan, validate_spans};

/// A scene may grow to this multiple of the target before it is cut.
const TARGET_OVERSHOOT: f64 = 1.25;

/// Seconds subtracted from the ceiling when choosing how many parts an oversized scene gets.
const SPLIT_HEADROOM: f64 = 5.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentMode {
    /// Group spans by accumulated duration.
    Duration,
    /// One scene per script paragraph, anchored in the transcription.
    #[default]
    Paragraph,
    /// Script only, no audio: scenes get placeholder durations.
    Script,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SegmentPolicy {
    pub mode: SegmentMode,
    pub target_scene_duration: f64,
    pub max_scene_duration: f64,
    pub leading_words: usize,
    pub max_chars_per_scene: usize,
}

impl Default for SegmentPolicy {
    fn default() -> Self {
        Self {
            mode: SegmentMode::default(),
            target_scene_duration: 10.0,
            max_scene_duration: 15.0,
            leading_words: 6,
            max_chars_per_scene: 350,
        }
    }
}

impl SegmentPolicy {
    pub fn validate(&self) -> ReelResult<()> {
        if !self.target_scene_duration.is_finite() || self.target_scene_duration <= 0.0 {
            return Err(ReelError::validation(
                "target_scene_duration must be finite and > 0",
            ));
        }
        if !self.max_scene_duration.is_finite() || self.max_scene_duration <= 0.0 {
            return Err(ReelError::validation(
                "max_scene_duration must be finite and > 0",
            ));
        }
        if self.leading_words == 0 {
            return Err(ReelError::validation("leading_words must be >= 1"));
        }
        if self.max_chars_per_scene == 0 {
            return Err(ReelError::validation("max_chars_per_scene must be >= 1"));
        }
        Ok(())
    }
}

/// Turns a transcription (and optionally the script) into contiguous scenes.
#[derive(Debug)]
pub struct SceneSegmenter<'a> {
    policy: &'a SegmentPolicy,
}

impl<'a> SceneSegmenter<'a> {
    pub fn new(policy: &'a SegmentPolicy) -> Self {
        Self { policy }
    }

    /// Segment according to the configured mode, then split scenes above the ceiling.
    ///
    /// `audio_duration` closes the last scene; without it the last span end is used. Paragraph
    /// mode without a script, or with a script that aligns nowhere, falls back to duration mode.
    #[tracing::instrument(skip_all, fields(mode = ?self.policy.mode, spans = spans.len()))]
    pub fn segment(
        &self,
        spans: &[TranscriptionSpan],
        script: Option<&str>,
        audio_duration: Option<f64>,
    ) -> ReelResult<Vec<Scene>> {
        self.policy.validate()?;

        if self.policy.mode == SegmentMode::Script {
            let script = script
                .ok_or_else(|| ReelError::contract("script mode requires a script"))?;
            return segment_script_text(
                script,
                self.policy.max_chars_per_scene,
                self.policy.target_scene_duration,
            );
        }

        validate_spans(spans)?;
        let total = resolve_total(spans, audio_duration)?;

        let scenes = match (self.policy.mode, script) {
            (SegmentMode::Paragraph, Some(script)) if !script.trim().is_empty() => {
                let scenes =
                    segment_by_paragraphs(script, spans, self.policy.leading_words, total);
                if scenes.is_empty() {
                    tracing::warn!("no paragraph could be aligned, segmenting by duration");
                    segment_by_duration(spans, self.policy.target_scene_duration, total)?
                } else {
                    scenes
                }
            }
            (SegmentMode::Paragraph, _) => {
                tracing::warn!("paragraph mode without a script, segmenting by duration");
                segment_by_duration(spans, self.policy.target_scene_duration, total)?
            }
            _ => segment_by_duration(spans, self.policy.target_scene_duration, total)?,
        };

        let scenes = split_oversized(scenes, spans, self.policy.max_scene_duration);
        check_coverage(&scenes, total)?;
        tracing::info!(scenes = scenes.len(), total, "segmentation done");
        Ok(scenes)
    }
}

fn resolve_total(spans: &[TranscriptionSpan], audio_duration: Option<f64>) -> ReelResult<f64> {
    let last = spans
        .last()
        .ok_or_else(|| ReelError::contract("transcription is empty"))?;
    match audio_duration {
        None => Ok(last.end),
        Some(total) if total.is_finite() && total > last.start => Ok(total),
        Some(total) => Err(ReelError::contract(format!(
            "audio duration {total} does not cover the last span starting at {}",
            last.start
        ))),
    }
}

/// Group spans into scenes of roughly `target` seconds.
///
/// The buffer is cut before a span that would push it past `target * 1.25`. The final span always
/// joins the open buffer. Boundaries are closed over `[0, total]`.
pub fn segment_by_duration(
    spans: &[TranscriptionSpan],
    target: f64,
    total: f64,
) -> ReelResult<Vec<Scene>> {
    if !target.is_finite() || target <= 0.0 {
        return Err(ReelError::contract(format!(
            "target scene duration must be finite and > 0, got {target}"
        )));
    }
    validate_spans(spans)?;

    let limit = target * TARGET_OVERSHOOT;
    let last = spans.len() - 1;
    let mut scenes = Vec::new();
    let mut buffer: Vec<&TranscriptionSpan> = Vec::new();
    let mut acc = 0.0;

    for (i, span) in spans.iter().enumerate() {
        if i < last && !buffer.is_empty() && acc + span.duration() > limit {
            scenes.push(scene_from_spans(scenes.len(), &buffer));
            buffer.clear();
            acc = 0.0;
        }
        buffer.push(span);
        acc += span.duration();
    }
    if !buffer.is_empty() {
        scenes.push(scene_from_spans(scenes.len(), &buffer));
    }

    close_boundaries(&mut scenes, total);
    tracing::debug!(scenes = scenes.len(), target, "duration segmentation done");
    Ok(scenes)
}

fn scene_from_spans(index: usize, spans: &[&TranscriptionSpan]) -> Scene {
    let text = join_text(spans.iter().copied());
    let start = spans.first().map_or(0.0, |s| s.start);
    let end = spans.last().map_or(start, |s| s.end);
    Scene::new(index, text, start, end)
}

fn join_text<'s>(spans: impl Iterator<Item = &'s TranscriptionSpan>) -> String {
    spans
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Number of equal parts an oversized scene of `duration` seconds is cut into.
pub fn split_count(duration: f64, ceiling: f64) -> usize {
    let divisor = if ceiling > SPLIT_HEADROOM {
        ceiling - SPLIT_HEADROOM
    } else {
        ceiling
    };
    let mut parts = ((duration / divisor).round() as usize).max(2);
    while duration / parts as f64 > ceiling {
        parts += 1;
    }
    parts
}

/// Split every scene longer than `ceiling` into equal parts.
///
/// A part's text is the spans whose midpoint falls inside it, or the parent text when none do.
/// Parts remember the parent index (`narrative_unit`) and their position (`visual_moment`).
pub fn split_oversized(scenes: Vec<Scene>, spans: &[TranscriptionSpan], ceiling: f64) -> Vec<Scene> {
    if !ceiling.is_finite() || ceiling <= 0.0 {
        return scenes;
    }

    let mut out = Vec::with_capacity(scenes.len());
    for scene in scenes {
        if scene.duration <= ceiling + 1e-9 {
            out.push(scene);
            continue;
        }

        let parts = split_count(scene.duration, ceiling);
        let len = scene.duration / parts as f64;
        tracing::debug!(
            scene = scene.index,
            duration = scene.duration,
            parts,
            "splitting oversized scene"
        );
        for k in 0..parts {
            let start = scene.start + len * k as f64;
            let end = if k + 1 == parts {
                scene.end
            } else {
                scene.start + len * (k + 1) as f64
            };
            let is_last = k + 1 == parts;
            let text = join_text(spans.iter().filter(|s| {
                let mid = s.midpoint();
                mid >= start && (mid < end || (is_last && mid <= end))
            }));

            let mut part = Scene::new(
                0,
                if text.is_empty() {
                    scene.text.clone()
                } else {
                    text
                },
                start,
                end,
            );
            part.image_prompt = scene.image_prompt.clone();
            part.narrative_unit = Some(scene.index);
            part.visual_moment = Some(k);
            out.push(part);
        }
    }

    for (i, s) in out.iter_mut().enumerate() {
        s.index = i;
    }
    out
}

/// Scenes straight from a script, for projects without narration audio.
///
/// Paragraphs are packed greedily into scenes shorter than `max_chars` characters. Each scene
/// gets `placeholder_duration` seconds.
pub fn segment_script_text(
    script: &str,
    max_chars: usize,
    placeholder_duration: f64,
) -> ReelResult<Vec<Scene>> {
    if !placeholder_duration.is_finite() || placeholder_duration <= 0.0 {
        return Err(ReelError::contract(
            "placeholder scene duration must be finite and > 0",
        ));
    }
    let paragraphs: Vec<String> = split_paragraphs(script)
        .into_iter()
        .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();
    if paragraphs.is_empty() {
        return Err(ReelError::contract("script is empty"));
    }

    let mut texts: Vec<String> = Vec::new();
    let mut current = String::new();
    for p in paragraphs {
        if current.is_empty() {
            current = p;
        } else if current.chars().count() + p.chars().count() + 1 < max_chars {
            current.push(' ');
            current.push_str(&p);
        } else {
            texts.push(std::mem::replace(&mut current, p));
        }
    }
    if !current.is_empty() {
        texts.push(current);
    }

    Ok(texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let start = i as f64 * placeholder_duration;
            Scene::new(i, text, start, start + placeholder_duration)
        })
        .collect())
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/segment.rs"]
mod tests;
