use crate::foundation::error::{ReelError, ReelResult};

/// Transition between consecutive clips as it appears in configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransitionSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl Default for TransitionSpec {
    fn default() -> Self {
        Self {
            kind: "dissolve".to_string(),
            duration: 1.0,
            params: serde_json::Value::Null,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WipeDir {
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TransitionKind {
    None,
    Dissolve,
    Fade,
    Wipe { dir: WipeDir, soft_edge: f32 },
    /// Unrecognized type name; composes as plain concatenation.
    Unsupported(String),
}

impl TransitionKind {
    /// Kinds whose clips share screen time during the transition.
    pub fn is_overlapping(&self) -> bool {
        matches!(self, Self::Dissolve | Self::Fade | Self::Wipe { .. })
    }
}

/// A parsed transition: kind plus duration in seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub kind: TransitionKind,
    pub duration: f64,
}

impl Transition {
    pub fn none() -> Self {
        Self {
            kind: TransitionKind::None,
            duration: 0.0,
        }
    }

    pub fn dissolve(duration: f64) -> Self {
        Self {
            kind: TransitionKind::Dissolve,
            duration,
        }
    }

    pub fn from_spec(spec: &TransitionSpec) -> ReelResult<Self> {
        if !spec.duration.is_finite() || spec.duration < 0.0 {
            return Err(ReelError::validation(format!(
                "transition duration must be finite and >= 0, got {}",
                spec.duration
            )));
        }
        Ok(Self {
            kind: parse_transition_kind_params(&spec.kind, &spec.params)?,
            duration: spec.duration,
        })
    }

    /// Seconds two neighbouring clips share, `0` for concatenating kinds.
    pub fn overlap(&self) -> f64 {
        if self.kind.is_overlapping() && self.duration > 0.0 {
            self.duration
        } else {
            0.0
        }
    }
}

pub fn parse_transition_kind_params(
    kind: &str,
    params: &serde_json::Value,
) -> ReelResult<TransitionKind> {
    let kind = kind.trim().to_ascii_lowercase();
    match kind.as_str() {
        "" | "none" | "cut" => Ok(TransitionKind::None),
        "dissolve" | "crossfade" => Ok(TransitionKind::Dissolve),
        "fade" => Ok(TransitionKind::Fade),
        "wipe" => parse_wipe(params),
        _ => {
            tracing::warn!(kind = %kind, "unsupported transition type, clips will be concatenated");
            Ok(TransitionKind::Unsupported(kind))
        }
    }
}

pub fn parse_transition(spec: &TransitionSpec) -> ReelResult<TransitionKind> {
    parse_transition_kind_params(&spec.kind, &spec.params)
}

fn parse_wipe(params: &serde_json::Value) -> ReelResult<TransitionKind> {
    let params = if params.is_null() {
        None
    } else {
        Some(
            params
                .as_object()
                .ok_or_else(|| ReelError::validation("wipe params must be an object"))?,
        )
    };

    let dir = match params.and_then(|p| p.get("dir")).and_then(|v| v.as_str()) {
        None => WipeDir::LeftToRight,
        Some(s) => match s.trim().to_ascii_lowercase().as_str() {
            "left_to_right" | "ltr" | "right" => WipeDir::LeftToRight,
            "right_to_left" | "rtl" | "left" => WipeDir::RightToLeft,
            "top_to_bottom" | "ttb" | "down" => WipeDir::TopToBottom,
            "bottom_to_top" | "btt" | "up" => WipeDir::BottomToTop,
            other => {
                return Err(ReelError::validation(format!("unknown wipe.dir '{other}'")));
            }
        },
    };

    let soft_edge = match params
        .and_then(|p| p.get("soft_edge"))
        .and_then(|v| v.as_f64())
    {
        None => 0.0,
        Some(v) if v.is_finite() => (v as f32).clamp(0.0, 1.0),
        Some(_) => {
            return Err(ReelError::validation(
                "wipe.soft_edge must be finite when set",
            ));
        }
    };

    Ok(TransitionKind::Wipe { dir, soft_edge })
}

#[cfg(test)]
#[path = "../../tests/unit/effects/transitions.rs"]
mod tests;
