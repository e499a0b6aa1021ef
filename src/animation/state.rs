use crate::{
    foundation::core::round_to,
    project::model::{Block, BlockParams, Keyframe, KeyframeField},
};

/// Linear interpolation between two values of the same type.
pub trait Lerp: Sized {
    /// Interpolate from `a` to `b` at ratio `t` (`0.0` yields `a`).
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

/// Fully resolved visual state of a block at one instant.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VisualState {
    /// Horizontal position in stage percent.
    pub x: f64,
    /// Vertical position in stage percent.
    pub y: f64,
    /// Uniform scale.
    pub scale: f64,
    /// Rotation in degrees.
    pub rotate: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Filter intensity; only overlays carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<f64>,
}

impl Default for VisualState {
    fn default() -> Self {
        Self {
            x: 50.0,
            y: 100.0,
            scale: 1.0,
            rotate: 0.0,
            opacity: 1.0,
            v: None,
        }
    }
}

impl VisualState {
    pub fn get(&self, field: KeyframeField) -> Option<f64> {
        match field {
            KeyframeField::X => Some(self.x),
            KeyframeField::Y => Some(self.y),
            KeyframeField::Scale => Some(self.scale),
            KeyframeField::Rotate => Some(self.rotate),
            KeyframeField::Opacity => Some(self.opacity),
            KeyframeField::V => self.v,
        }
    }

    pub fn set(&mut self, field: KeyframeField, value: f64) {
        match field {
            KeyframeField::X => self.x = value,
            KeyframeField::Y => self.y = value,
            KeyframeField::Scale => self.scale = value,
            KeyframeField::Rotate => self.rotate = value,
            KeyframeField::Opacity => self.opacity = value,
            KeyframeField::V => self.v = Some(value),
        }
    }

    /// Overwrite every field the keyframe defines.
    pub fn apply_keyframe(&mut self, kf: &Keyframe) {
        for field in KeyframeField::ALL {
            if let Some(value) = kf.get(field) {
                self.set(field, value);
            }
        }
    }

    /// This state with the keyframe's defined fields laid over it.
    pub fn resolve(&self, kf: &Keyframe) -> Self {
        let mut out = *self;
        out.apply_keyframe(kf);
        out
    }

    /// A keyframe at `t` that pins every field of this state.
    pub fn to_keyframe(&self, t: f64) -> Keyframe {
        let mut kf = Keyframe::at(t);
        for field in KeyframeField::ALL {
            kf.set(field, self.get(field));
        }
        kf
    }
}

/// Resting intensity of a CSS filter: `0` for filters where zero is neutral, else `100`.
pub fn filter_rest_value(filter: &str) -> f64 {
    match filter {
        "blur" | "hue-rotate" | "invert" | "grayscale" | "sepia" => 0.0,
        _ => 100.0,
    }
}

/// Block-level state before any step animation, with defaults for unset params.
pub fn resolve_base_state(block: &Block) -> VisualState {
    let default_y = if matches!(block.params, BlockParams::Bg(_)) {
        50.0
    } else {
        100.0
    };
    let mut state = VisualState {
        y: default_y,
        ..VisualState::default()
    };

    match &block.params {
        BlockParams::Bg(p) | BlockParams::Sprite(p) => {
            state.x = p.x.unwrap_or(state.x);
            state.y = p.y.unwrap_or(state.y);
            state.scale = p.scale.or(p.zoom).unwrap_or(state.scale);
            state.rotate = p.rotate.unwrap_or(state.rotate);
            state.opacity = p.opacity.unwrap_or(state.opacity);
        }
        BlockParams::Overlay(p) => {
            state.v = Some(filter_rest_value(&p.filter));
        }
        _ => {}
    }
    state
}

/// Attach `base` at `t = 0` when no keyframe sits there, then stable-sort by `t`.
pub fn normalize_keyframes(base: &VisualState, keyframes: &[Keyframe]) -> Vec<Keyframe> {
    let mut out = keyframes.to_vec();
    if !out.iter().any(|kf| kf.t == 0.0) {
        out.insert(0, base.to_keyframe(0.0));
    }
    out.sort_by(|a, b| a.t.total_cmp(&b.t));
    out
}

fn decimals(field: KeyframeField) -> i32 {
    match field {
        KeyframeField::X | KeyframeField::Y | KeyframeField::V => 1,
        KeyframeField::Scale | KeyframeField::Opacity => 2,
        KeyframeField::Rotate => 0,
    }
}

/// State at percent `t` of a step, given its base state and authored keyframes.
///
/// Between keyframes every field is linearly interpolated (absent fields fall back to `base`)
/// and rounded to its display precision. Past the last keyframe the last one holds.
pub fn interpolate(base: &VisualState, keyframes: &[Keyframe], t: f64) -> VisualState {
    let frames = normalize_keyframes(base, keyframes);
    let prev = frames.iter().rev().find(|kf| kf.t <= t);
    let next = frames.iter().find(|kf| kf.t >= t);

    let (prev, next) = match (prev, next) {
        (Some(p), Some(n)) => (p, n),
        // Before the first keyframe only happens for negative t; clamp to the edges.
        (None, Some(n)) => return base.resolve(n),
        (Some(p), None) => return base.resolve(p),
        (None, None) => return *base,
    };
    if prev.t == next.t {
        return base.resolve(prev);
    }

    let ratio = (t - prev.t) / (next.t - prev.t);
    let a = base.resolve(prev);
    let b = base.resolve(next);
    let mut out = *base;
    for field in KeyframeField::ALL {
        if let (Some(from), Some(to)) = (a.get(field), b.get(field)) {
            out.set(field, round_to(f64::lerp(&from, &to, ratio), decimals(field)));
        } else if field == KeyframeField::V {
            out.v = None;
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/animation/state.rs"]
mod tests;
