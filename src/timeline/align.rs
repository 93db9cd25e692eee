//! Hybrid paragraph alignment.
//!
//! Each script paragraph is located in the transcription by searching for its first few
//! normalized words, moving a cursor forward so paragraphs can only match in order. This is a
//! heuristic: paragraphs with near-identical openings can anchor on the wrong occurrence.

use crate::foundation::error::{ReelError, ReelResult};
use crate::timeline::scene::{Scene, close_boundaries};
use crate::timeline::transcript::TranscriptionSpan;

/// Shortest prefix tried before a paragraph is given up on.
const MIN_PREFIX_WORDS: usize = 2;

/// Split a script on blank lines, trimming and dropping empty paragraphs.
pub fn split_paragraphs(script: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in script.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line.trim());
        }
    }
    if !current.is_empty() {
        out.push(current.join("\n"));
    }
    out
}

/// Lowercased alphanumeric words; punctuation and whitespace separate words.
pub fn normalize_words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// A paragraph matched to a position in the transcription.
#[derive(Clone, Debug, PartialEq)]
pub struct Anchor {
    pub paragraph: usize,
    pub span: usize,
    pub start: f64,
}

/// Normalized transcript words, each tagged with the span it came from.
#[derive(Debug)]
pub struct TranscriptIndex {
    words: Vec<(String, usize)>,
}

impl TranscriptIndex {
    pub fn new(spans: &[TranscriptionSpan]) -> Self {
        let words = spans
            .iter()
            .enumerate()
            .flat_map(|(i, s)| normalize_words(&s.text).into_iter().map(move |w| (w, i)))
            .collect();
        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// First word position `>= from` where `needle` occurs.
    pub fn find(&self, from: usize, needle: &[String]) -> Option<usize> {
        if needle.is_empty() || from + needle.len() > self.words.len() {
            return None;
        }
        (from..=self.words.len() - needle.len()).find(|&i| {
            self.words[i..i + needle.len()]
                .iter()
                .zip(needle)
                .all(|((w, _), n)| w == n)
        })
    }

    fn span_at(&self, pos: usize) -> Option<usize> {
        self.words.get(pos).map(|(_, span)| *span)
    }
}

/// Aligns paragraphs in order, keeping the search cursor between calls.
#[derive(Debug)]
pub struct ParagraphAligner<'a> {
    spans: &'a [TranscriptionSpan],
    index: TranscriptIndex,
    leading_words: usize,
    cursor: usize,
    last_start: Option<f64>,
}

impl<'a> ParagraphAligner<'a> {
    pub fn new(spans: &'a [TranscriptionSpan], leading_words: usize) -> Self {
        Self {
            spans,
            index: TranscriptIndex::new(spans),
            leading_words: leading_words.max(1),
            cursor: 0,
            last_start: None,
        }
    }

    /// Locate paragraph `idx`. On failure the cursor does not move.
    pub fn align(&mut self, idx: usize, paragraph: &str) -> ReelResult<Anchor> {
        let words = normalize_words(paragraph);
        if words.is_empty() {
            return Err(ReelError::alignment(format!(
                "paragraph {idx} has no words"
            )));
        }

        let longest = self.leading_words.min(words.len());
        let shortest = MIN_PREFIX_WORDS.min(longest);
        let (pos, used) = (shortest..=longest)
            .rev()
            .find_map(|k| self.index.find(self.cursor, &words[..k]).map(|pos| (pos, k)))
            .ok_or_else(|| {
                ReelError::alignment(format!(
                    "paragraph {idx} ('{}') not found in transcription",
                    words[..longest].join(" ")
                ))
            })?;

        let span = self
            .index
            .span_at(pos)
            .ok_or_else(|| ReelError::alignment("match outside transcription"))?;
        let start = self.spans[span].start;
        if let Some(prev) = self.last_start
            && start <= prev
        {
            return Err(ReelError::alignment(format!(
                "paragraph {idx} would start at {start:.2}s, not after the previous paragraph at {prev:.2}s"
            )));
        }

        self.cursor = pos + used;
        self.last_start = Some(start);
        Ok(Anchor {
            paragraph: idx,
            span,
            start,
        })
    }
}

/// One scene per aligned paragraph, closed over `[0, total]`.
///
/// Paragraphs that fail to align are logged and dropped; the previous scene absorbs their time.
/// Returns an empty list when no paragraph aligns.
pub fn segment_by_paragraphs(
    script: &str,
    spans: &[TranscriptionSpan],
    leading_words: usize,
    total: f64,
) -> Vec<Scene> {
    let paragraphs = split_paragraphs(script);
    let mut aligner = ParagraphAligner::new(spans, leading_words);

    let mut scenes: Vec<Scene> = Vec::new();
    for (idx, paragraph) in paragraphs.iter().enumerate() {
        match aligner.align(idx, paragraph) {
            Ok(anchor) => {
                scenes.push(Scene::new(scenes.len(), paragraph.clone(), anchor.start, total));
            }
            Err(err) => {
                tracing::warn!(paragraph = idx, error = %err, "dropping unaligned paragraph");
            }
        }
    }

    close_boundaries(&mut scenes, total);
    tracing::debug!(
        paragraphs = paragraphs.len(),
        scenes = scenes.len(),
        "paragraph alignment done"
    );
    scenes
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/align.rs"]
mod tests;
