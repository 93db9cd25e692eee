use crate::effects::transitions::Transition;

/// Shortest and longest per-image duration [`optimal_scene_duration`] will suggest.
pub const OPTIMAL_DURATION_RANGE: (f64, f64) = (5.0, 30.0);

/// How many images a narration of `audio_duration` seconds needs so that no image stays on
/// screen longer than `max_duration_per_image`.
pub fn estimate_num_images(
    audio_duration: f64,
    min_images: usize,
    max_duration_per_image: f64,
) -> usize {
    if !audio_duration.is_finite() || audio_duration <= 0.0 {
        return min_images;
    }
    let max_per_image = if max_duration_per_image.is_finite() && max_duration_per_image > 0.0 {
        max_duration_per_image
    } else {
        15.0
    };
    let needed = (audio_duration / max_per_image).ceil() as usize;
    let n = needed.max(min_images);
    tracing::debug!(audio_duration, images = n, "estimated image count");
    n
}

/// Per-image hold duration that fills `audio_duration` with `num_images` images, counting the
/// time lost to overlapping transitions. Clamped to [`OPTIMAL_DURATION_RANGE`].
pub fn optimal_scene_duration(
    audio_duration: f64,
    num_images: usize,
    transition: &Transition,
) -> f64 {
    let (lo, hi) = OPTIMAL_DURATION_RANGE;
    if num_images == 0 || !audio_duration.is_finite() || audio_duration <= 0.0 {
        return lo;
    }
    let n = num_images as f64;
    let overlap = if num_images > 1 {
        transition.overlap() * (n - 1.0)
    } else {
        0.0
    };
    ((audio_duration + overlap) / n).clamp(lo, hi)
}

/// Assign `items` to `n` slots by cycling through them; empty when `items` is empty.
pub fn distribute_round_robin<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    if items.is_empty() {
        return Vec::new();
    }
    items.iter().cycle().take(n).cloned().collect()
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/planning.rs"]
mod tests;
