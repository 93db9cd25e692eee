use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{ReelError, ReelResult};

/// One timed chunk of recognized narration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TranscriptionSpan {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl TranscriptionSpan {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// Reject transcriptions the segmenter cannot work with.
///
/// Spans must be non-empty, finite, have `end > start`, and be ordered without overlap.
pub fn validate_spans(spans: &[TranscriptionSpan]) -> ReelResult<()> {
    if spans.is_empty() {
        return Err(ReelError::contract("transcription is empty"));
    }
    let mut prev_end = f64::NEG_INFINITY;
    for (i, s) in spans.iter().enumerate() {
        if !s.start.is_finite() || !s.end.is_finite() {
            return Err(ReelError::contract(format!(
                "span {i} has non-finite timestamps"
            )));
        }
        if s.start < 0.0 {
            return Err(ReelError::contract(format!("span {i} starts before 0")));
        }
        if s.end <= s.start {
            return Err(ReelError::contract(format!(
                "span {i} has end {} <= start {}",
                s.end, s.start
            )));
        }
        // Small tolerance: recognizers often emit touching spans with rounding noise.
        if s.start + 1e-6 < prev_end {
            return Err(ReelError::contract(format!(
                "span {i} starts at {} before previous span ends at {prev_end}",
                s.start
            )));
        }
        prev_end = s.end;
    }
    Ok(())
}

/// Read a JSON array of spans.
pub fn load_transcript(path: &Path) -> ReelResult<Vec<TranscriptionSpan>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read transcript '{}'", path.display()))?;
    serde_json::from_str(&text).map_err(|e| {
        ReelError::serde(format!("parse transcript '{}': {e}", path.display()))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/transcript.rs"]
mod tests;
