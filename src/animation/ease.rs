/// Monotonic remapping of linear progress in `[0, 1]`.
///
/// [`Ease::Smooth`] (cosine) is the curve every animated clip effect uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    In,
    Out,
    InOut,
    #[default]
    Smooth,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::In => t * t,
            Self::Out => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Self::Smooth => 0.5 * (1.0 - (std::f64::consts::PI * t).cos()),
        }
    }
}

pub fn ease_in(t: f64) -> f64 {
    Ease::In.apply(t)
}

pub fn ease_out(t: f64) -> f64 {
    Ease::Out.apply(t)
}

pub fn ease_in_out(t: f64) -> f64 {
    Ease::InOut.apply(t)
}

pub fn ease_smooth(t: f64) -> f64 {
    Ease::Smooth.apply(t)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
