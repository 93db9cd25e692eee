use kurbo::Point;

/// A user-configured clip effect: a name plus a JSON object of parameters.
///
/// Specs are parsed into the closed [`EffectKind`] enum before rendering. Parsing rejects unknown
/// names, unknown parameter keys and out-of-range values.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EffectSpec {
    pub name: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl EffectSpec {
    pub fn new(name: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, serde_json::Value::Null)
    }
}

/// Reasons an effect could not be built for a clip.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EffectError {
    #[error("unknown effect '{0}'")]
    UnknownEffect(String),

    #[error("{effect}: params must be a JSON object")]
    ParamsNotObject { effect: String },

    #[error("{effect}: invalid parameter '{param}': {reason}")]
    InvalidParam {
        effect: String,
        param: String,
        reason: String,
    },

    #[error("clip duration must be finite and > 0, got {0}")]
    InvalidDuration(f64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanDir {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KenBurnsParams {
    pub zoom_start: f64,
    pub zoom_end: f64,
    /// Normalized crop center at the start of the motion.
    pub pan_start: Point,
    /// Normalized crop center at the end of the motion.
    pub pan_end: Point,
}

impl Default for KenBurnsParams {
    fn default() -> Self {
        Self {
            zoom_start: 1.0,
            zoom_end: 1.5,
            pan_start: Point::new(0.45, 0.45),
            pan_end: Point::new(0.6, 0.6),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShakeParams {
    /// Max jitter in source pixels along each axis.
    pub intensity: f64,
    pub zoom_factor: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShakeZoomParams {
    pub shake_duration: f64,
    pub shake: ShakeParams,
    pub zoom_in_factor: f64,
    pub zoom_out_factor: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShakeKenBurnsParams {
    pub shake_duration: f64,
    pub shake: ShakeParams,
    pub kenburns: KenBurnsParams,
}

/// Closed set of clip effects, each carrying its typed parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EffectKind {
    ZoomIn {
        zoom_factor: f64,
    },
    ZoomOut {
        zoom_factor: f64,
    },
    Pan {
        dir: PanDir,
        zoom_factor: f64,
        /// Fraction of the frame the center travels, in `[0, 1]`.
        distance: f64,
    },
    KenBurns(KenBurnsParams),
    Shake(ShakeParams),
    ShakeZoomCombo(ShakeZoomParams),
    ShakeKenBurnsCombo(ShakeKenBurnsParams),
    FadeIn {
        duration: f64,
    },
    FadeOut {
        duration: f64,
    },
    MirrorX,
    MirrorY,
    Rotate180,
}

impl EffectKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ZoomIn { .. } => "zoom_in",
            Self::ZoomOut { .. } => "zoom_out",
            Self::Pan { dir, .. } => match dir {
                PanDir::Left => "pan_left",
                PanDir::Right => "pan_right",
                PanDir::Up => "pan_up",
                PanDir::Down => "pan_down",
            },
            Self::KenBurns(_) => "kenburns",
            Self::Shake(_) => "shake",
            Self::ShakeZoomCombo(_) => "shake_zoom_combo",
            Self::ShakeKenBurnsCombo(_) => "shake_kenburns_combo",
            Self::FadeIn { .. } => "fade_in",
            Self::FadeOut { .. } => "fade_out",
            Self::MirrorX => "mirror_x",
            Self::MirrorY => "mirror_y",
            Self::Rotate180 => "rotate_180",
        }
    }

    /// True for effects that draw random numbers per frame.
    pub fn is_stochastic(&self) -> bool {
        matches!(
            self,
            Self::Shake(_) | Self::ShakeZoomCombo(_) | Self::ShakeKenBurnsCombo(_)
        )
    }
}

pub fn parse_effect(spec: &EffectSpec) -> Result<EffectKind, EffectError> {
    let name = spec.name.trim().to_ascii_lowercase();
    let mut p = Params::new(&name, &spec.params)?;

    let kind = match name.as_str() {
        "zoom_in" => EffectKind::ZoomIn {
            zoom_factor: p.zoom("zoom_factor", 1.5)?,
        },
        "zoom_out" => EffectKind::ZoomOut {
            zoom_factor: p.zoom("zoom_factor", 1.5)?,
        },
        "pan_left" | "pan_right" | "pan_up" | "pan_down" => {
            let dir = match name.as_str() {
                "pan_left" => PanDir::Left,
                "pan_right" => PanDir::Right,
                "pan_up" => PanDir::Up,
                _ => PanDir::Down,
            };
            EffectKind::Pan {
                dir,
                zoom_factor: p.zoom("zoom_factor", 1.3)?,
                distance: p.unit("distance", 0.4)?,
            }
        }
        "kenburns" | "ken_burns" => EffectKind::KenBurns(p.kenburns("")?),
        "shake" => EffectKind::Shake(ShakeParams {
            intensity: p.non_negative("intensity", 6.0)?,
            zoom_factor: p.zoom("zoom_factor", 1.15)?,
        }),
        "shake_zoom_combo" => EffectKind::ShakeZoomCombo(ShakeZoomParams {
            shake_duration: p.non_negative("shake_duration", 2.0)?,
            shake: ShakeParams {
                intensity: p.non_negative("intensity", 8.0)?,
                zoom_factor: p.zoom("zoom_factor_shake", 1.2)?,
            },
            zoom_in_factor: p.zoom("zoom_in_factor", 1.4)?,
            zoom_out_factor: p.zoom("zoom_out_factor", 1.6)?,
        }),
        "shake_kenburns_combo" => EffectKind::ShakeKenBurnsCombo(ShakeKenBurnsParams {
            shake_duration: p.non_negative("shake_duration", 1.5)?,
            shake: ShakeParams {
                intensity: p.non_negative("intensity", 10.0)?,
                zoom_factor: p.zoom("zoom_factor_shake", 1.15)?,
            },
            kenburns: p.kenburns("kenburns_")?,
        }),
        "fade_in" => EffectKind::FadeIn {
            duration: p.positive("duration", 1.0)?,
        },
        "fade_out" => EffectKind::FadeOut {
            duration: p.positive("duration", 1.0)?,
        },
        "mirror_x" => EffectKind::MirrorX,
        "mirror_y" => EffectKind::MirrorY,
        "rotate_180" => EffectKind::Rotate180,
        _ => return Err(EffectError::UnknownEffect(spec.name.clone())),
    };

    p.finish()?;
    Ok(kind)
}

/// Typed reader over an effect's JSON params that tracks which keys were consumed.
struct Params<'a> {
    effect: &'a str,
    map: Option<&'a serde_json::Map<String, serde_json::Value>>,
    used: Vec<&'static str>,
}

impl<'a> Params<'a> {
    fn new(effect: &'a str, params: &'a serde_json::Value) -> Result<Self, EffectError> {
        let map = match params {
            serde_json::Value::Null => None,
            serde_json::Value::Object(m) => Some(m),
            _ => {
                return Err(EffectError::ParamsNotObject {
                    effect: effect.to_string(),
                });
            }
        };
        Ok(Self {
            effect,
            map,
            used: Vec::new(),
        })
    }

    fn invalid(&self, param: &str, reason: impl Into<String>) -> EffectError {
        EffectError::InvalidParam {
            effect: self.effect.to_string(),
            param: param.to_string(),
            reason: reason.into(),
        }
    }

    fn raw(&mut self, key: &'static str) -> Option<&'a serde_json::Value> {
        self.used.push(key);
        self.map.and_then(|m| m.get(key)).filter(|v| !v.is_null())
    }

    fn number(&mut self, key: &'static str, default: f64) -> Result<f64, EffectError> {
        match self.raw(key) {
            None => Ok(default),
            Some(v) => {
                let n = v
                    .as_f64()
                    .ok_or_else(|| self.invalid(key, "expected a number"))?;
                if !n.is_finite() {
                    return Err(self.invalid(key, "must be finite"));
                }
                Ok(n)
            }
        }
    }

    fn zoom(&mut self, key: &'static str, default: f64) -> Result<f64, EffectError> {
        let v = self.number(key, default)?;
        if v < 1.0 {
            return Err(self.invalid(key, format!("zoom must be >= 1, got {v}")));
        }
        Ok(v)
    }

    fn non_negative(&mut self, key: &'static str, default: f64) -> Result<f64, EffectError> {
        let v = self.number(key, default)?;
        if v < 0.0 {
            return Err(self.invalid(key, format!("must be >= 0, got {v}")));
        }
        Ok(v)
    }

    fn positive(&mut self, key: &'static str, default: f64) -> Result<f64, EffectError> {
        let v = self.number(key, default)?;
        if v <= 0.0 {
            return Err(self.invalid(key, format!("must be > 0, got {v}")));
        }
        Ok(v)
    }

    fn unit(&mut self, key: &'static str, default: f64) -> Result<f64, EffectError> {
        let v = self.number(key, default)?;
        if !(0.0..=1.0).contains(&v) {
            return Err(self.invalid(key, format!("must be within [0, 1], got {v}")));
        }
        Ok(v)
    }

    /// Accepts `[x, y]` or `{"x": .., "y": ..}` with both coordinates in `[0, 1]`.
    fn point(&mut self, key: &'static str, default: Point) -> Result<Point, EffectError> {
        let Some(v) = self.raw(key) else {
            return Ok(default);
        };
        let (x, y) = match v {
            serde_json::Value::Array(items) if items.len() == 2 => {
                (items[0].as_f64(), items[1].as_f64())
            }
            serde_json::Value::Object(m) => (
                m.get("x").and_then(|x| x.as_f64()),
                m.get("y").and_then(|y| y.as_f64()),
            ),
            _ => (None, None),
        };
        let (Some(x), Some(y)) = (x, y) else {
            return Err(self.invalid(key, "expected [x, y] or {\"x\", \"y\"}"));
        };
        if !(0.0..=1.0).contains(&x) || !(0.0..=1.0).contains(&y) {
            return Err(self.invalid(key, "coordinates must be within [0, 1]"));
        }
        Ok(Point::new(x, y))
    }

    fn kenburns(&mut self, prefix: &'static str) -> Result<KenBurnsParams, EffectError> {
        let d = KenBurnsParams::default();
        // Keys are static so the consumed-key bookkeeping stays allocation free.
        let (zs, ze, ps, pe) = if prefix.is_empty() {
            ("zoom_start", "zoom_end", "pan_start", "pan_end")
        } else {
            (
                "kenburns_zoom_start",
                "kenburns_zoom_end",
                "kenburns_pan_start",
                "kenburns_pan_end",
            )
        };
        Ok(KenBurnsParams {
            zoom_start: self.zoom(zs, d.zoom_start)?,
            zoom_end: self.zoom(ze, d.zoom_end)?,
            pan_start: self.point(ps, d.pan_start)?,
            pan_end: self.point(pe, d.pan_end)?,
        })
    }

    fn finish(self) -> Result<(), EffectError> {
        let Some(map) = self.map else {
            return Ok(());
        };
        match map.keys().find(|k| !self.used.contains(&k.as_str())) {
            Some(unknown) => Err(self.invalid(unknown, "unknown parameter")),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/spec.rs"]
mod tests;
