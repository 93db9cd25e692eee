use crate::effects::transitions::Transition;
use crate::foundation::error::{ReelError, ReelResult};

/// Limits applied while fitting clip holds to a target length.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ReconcilePolicy {
    /// No clip is ever held shorter than this.
    pub min_clip_duration: f64,
    /// Largest accepted gap between rendered and target length, in seconds.
    pub tolerance: f64,
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self {
            min_clip_duration: 0.5,
            tolerance: 0.05,
        }
    }
}

impl ReconcilePolicy {
    pub fn validate(&self) -> ReelResult<()> {
        if !self.min_clip_duration.is_finite() || self.min_clip_duration <= 0.0 {
            return Err(ReelError::validation(
                "min_clip_duration must be finite and > 0",
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ReelError::validation("tolerance must be finite and >= 0"));
        }
        Ok(())
    }
}

/// Which correction produced the final holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// Compensated holds already matched the target.
    Exact,
    /// The video was short; the last clip was lengthened.
    ExtendedLast,
    /// The video was long; clips were shortened in proportion to their slack.
    Proportional,
    /// Not enough slack: every clip sits at its floor and the video stays longer than the target.
    Uniform,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Reconciled {
    pub durations: Vec<f64>,
    pub outcome: ReconcileOutcome,
    /// Length after compositing, equal to the target except for [`ReconcileOutcome::Uniform`].
    pub rendered_total: f64,
}

/// Seconds shared by each pair of neighbouring clips.
///
/// An overlap never exceeds either neighbour's hold, and a clip in the middle gives at most half
/// its hold to each side so no more than two clips are ever on screen together.
pub fn boundary_overlaps(holds: &[f64], transition: &Transition) -> Vec<f64> {
    let ov = transition.overlap();
    let n = holds.len();
    holds
        .windows(2)
        .enumerate()
        .map(|(i, w)| {
            ov.min(overlap_capacity(i, n, w[0]))
                .min(overlap_capacity(i + 1, n, w[1]))
                .max(0.0)
        })
        .collect()
}

fn overlap_capacity(i: usize, n: usize, hold: f64) -> f64 {
    if i == 0 || i + 1 == n { hold } else { hold / 2.0 }
}

/// Shortest hold clip `i` of `n` may get: interior clips carry an overlap on both sides.
fn clip_floor(i: usize, n: usize, overlap: f64, policy: &ReconcilePolicy) -> f64 {
    let sides = if n < 2 {
        0.0
    } else if i == 0 || i + 1 == n {
        1.0
    } else {
        2.0
    };
    policy.min_clip_duration.max(overlap * sides)
}

/// Length of the composited video for `holds`: the sum of holds minus every overlap.
pub fn composited_duration(holds: &[f64], transition: &Transition) -> f64 {
    let sum: f64 = holds.iter().sum();
    sum - boundary_overlaps(holds, transition).iter().sum::<f64>()
}

/// Fit per-scene durations to `target_total` seconds of composited video.
///
/// Overlapping transitions eat `duration` seconds at every boundary, so every clip but the last
/// is first lengthened by that amount. Remaining error is absorbed by the last clip (video too
/// short) or shaved proportionally off every clip's slack above its floor (video too long). When
/// the slack runs out every clip is pinned to its floor.
#[tracing::instrument(skip(scene_durations, transition), fields(clips = scene_durations.len()))]
pub fn reconcile(
    scene_durations: &[f64],
    transition: &Transition,
    target_total: f64,
    policy: &ReconcilePolicy,
) -> ReelResult<Reconciled> {
    if scene_durations.is_empty() {
        return Err(ReelError::contract("no scene durations to reconcile"));
    }
    if !target_total.is_finite() || target_total <= 0.0 {
        return Err(ReelError::contract(format!(
            "target duration must be finite and > 0, got {target_total}"
        )));
    }
    policy.validate()?;

    let n = scene_durations.len();
    let overlap = if n > 1 { transition.overlap() } else { 0.0 };
    let floors: Vec<f64> = (0..n).map(|i| clip_floor(i, n, overlap, policy)).collect();

    let mut holds: Vec<f64> = scene_durations
        .iter()
        .enumerate()
        .map(|(i, &d)| {
            let d = if d.is_finite() && d > 0.0 {
                d
            } else {
                tracing::warn!(clip = i, duration = d, "non-positive scene duration, using floor");
                policy.min_clip_duration
            };
            let compensated = if i + 1 < n { d + overlap } else { d };
            compensated.max(floors[i])
        })
        .collect();

    let rendered = composited_duration(&holds, transition);
    let delta = target_total - rendered;
    tracing::debug!(rendered, target_total, delta, "compensated holds");

    let last = n - 1;
    let outcome = if delta.abs() <= policy.tolerance {
        if holds[last] + delta >= floors[last] {
            holds[last] += delta;
        }
        ReconcileOutcome::Exact
    } else if delta > 0.0 {
        holds[last] += delta;
        ReconcileOutcome::ExtendedLast
    } else {
        let excess = -delta;
        let slack: f64 = holds.iter().zip(&floors).map(|(h, f)| h - f).sum();
        if slack >= excess {
            for (h, f) in holds.iter_mut().zip(&floors) {
                *h -= (*h - f) * excess / slack;
            }
            ReconcileOutcome::Proportional
        } else {
            let uniform = (target_total + overlap * (n - 1) as f64) / n as f64;
            for (h, f) in holds.iter_mut().zip(&floors) {
                *h = uniform.max(*f);
            }
            let leading: f64 = holds[..last].iter().sum();
            let residual = target_total + overlap * (n - 1) as f64 - leading;
            holds[last] = residual.max(floors[last]);
            tracing::warn!(
                target_total,
                min_clip_duration = policy.min_clip_duration,
                clips = n,
                "target too short for the clip floor, holding every clip at the floor"
            );
            ReconcileOutcome::Uniform
        }
    };

    for (i, h) in holds.iter_mut().enumerate() {
        if h.is_nan() || *h <= 0.0 {
            tracing::error!(clip = i, hold = *h, "reconciled hold is not positive, forcing floor");
            *h = policy.min_clip_duration;
        }
    }

    let rendered_total = composited_duration(&holds, transition);
    tracing::info!(?outcome, rendered_total, target_total, "durations reconciled");
    Ok(Reconciled {
        durations: holds,
        outcome,
        rendered_total,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/timing/reconcile.rs"]
mod tests;
