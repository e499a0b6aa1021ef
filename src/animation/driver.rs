use crate::{
    animation::{
        ease::Easing,
        state::{Lerp, VisualState, filter_rest_value, normalize_keyframes},
    },
    foundation::error::{WeaveError, WeaveResult},
    project::model::{Block, BlockParams, StepAnim},
};

/// CSS filter function an overlay animates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterKind {
    Blur,
    Brightness,
    Contrast,
    Grayscale,
    HueRotate,
    Invert,
    Opacity,
    Saturate,
    Sepia,
}

impl FilterKind {
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name.trim() {
            "blur" => Self::Blur,
            "brightness" => Self::Brightness,
            "contrast" => Self::Contrast,
            "grayscale" => Self::Grayscale,
            "hue-rotate" => Self::HueRotate,
            "invert" => Self::Invert,
            "opacity" => Self::Opacity,
            "saturate" => Self::Saturate,
            "sepia" => Self::Sepia,
            _ => return None,
        })
    }

    pub fn css_name(self) -> &'static str {
        match self {
            Self::Blur => "blur",
            Self::Brightness => "brightness",
            Self::Contrast => "contrast",
            Self::Grayscale => "grayscale",
            Self::HueRotate => "hue-rotate",
            Self::Invert => "invert",
            Self::Opacity => "opacity",
            Self::Saturate => "saturate",
            Self::Sepia => "sepia",
        }
    }

    /// Unit suffix of the intensity.
    pub fn unit(self) -> &'static str {
        match self {
            Self::Blur => "px",
            Self::HueRotate => "deg",
            _ => "%",
        }
    }
}

/// How a transform is positioned relative to `(x, y)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    /// Layer-sized element offset from the stage centre (backgrounds).
    Center,
    /// Element placed at `(x%, y%)` by its bottom-centre point (sprites).
    BottomCenter,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransformStyle {
    pub anchor: Anchor,
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub rotate: f64,
    pub opacity: f64,
}

impl TransformStyle {
    /// The CSS `transform` value.
    pub fn css_transform(&self) -> String {
        match self.anchor {
            Anchor::Center => format!(
                "translate({}%, {}%) scale({}) rotate({}deg)",
                self.x - 50.0,
                self.y - 50.0,
                self.scale,
                self.rotate
            ),
            Anchor::BottomCenter => format!(
                "translateX(-50%) translateY(-100%) scale({}) rotate({}deg)",
                self.scale, self.rotate
            ),
        }
    }
}

impl Lerp for TransformStyle {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            anchor: a.anchor,
            x: f64::lerp(&a.x, &b.x, t),
            y: f64::lerp(&a.y, &b.y, t),
            scale: f64::lerp(&a.scale, &b.scale, t),
            rotate: f64::lerp(&a.rotate, &b.rotate, t),
            opacity: f64::lerp(&a.opacity, &b.opacity, t),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FilterStyle {
    pub kind: FilterKind,
    pub value: f64,
}

impl FilterStyle {
    /// The CSS `filter` value, e.g. `blur(4px)`.
    pub fn css(&self) -> String {
        format!("{}({}{})", self.kind.css_name(), self.value, self.kind.unit())
    }
}

impl Lerp for FilterStyle {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            kind: a.kind,
            value: f64::lerp(&a.value, &b.value, t),
        }
    }
}

/// A projected style on one animation channel.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "channel", rename_all = "snake_case")]
pub enum Style {
    Transform(TransformStyle),
    Filter(FilterStyle),
}

impl Lerp for Style {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        match (a, b) {
            (Style::Transform(a), Style::Transform(b)) => {
                Style::Transform(TransformStyle::lerp(a, b, t))
            }
            (Style::Filter(a), Style::Filter(b)) if a.kind == b.kind => {
                Style::Filter(FilterStyle::lerp(a, b, t))
            }
            _ => *a,
        }
    }
}

/// Projection of a resolved [`VisualState`] into a style, keyed on block kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Projection {
    Background,
    Sprite,
    Filter(FilterKind),
}

impl Projection {
    /// Pick the projection for an animated block.
    pub fn for_block(block: &Block) -> WeaveResult<Self> {
        match &block.params {
            BlockParams::Bg(_) => Ok(Self::Background),
            BlockParams::Sprite(_) => Ok(Self::Sprite),
            BlockParams::Overlay(p) => FilterKind::parse(&p.filter).map(Self::Filter).ok_or_else(
                || {
                    WeaveError::animation(format!(
                        "block {} uses unknown filter '{}'",
                        block.id, p.filter
                    ))
                },
            ),
            other => Err(WeaveError::animation(format!(
                "block {} of kind '{}' has no visual projection",
                block.id,
                other.kind().as_str()
            ))),
        }
    }

    pub fn project(self, state: &VisualState) -> Style {
        match self {
            Self::Background | Self::Sprite => Style::Transform(TransformStyle {
                anchor: if self == Self::Background {
                    Anchor::Center
                } else {
                    Anchor::BottomCenter
                },
                x: state.x,
                y: state.y,
                scale: state.scale,
                rotate: state.rotate,
                opacity: state.opacity,
            }),
            Self::Filter(kind) => Style::Filter(FilterStyle {
                kind,
                value: state
                    .v
                    .unwrap_or_else(|| filter_rest_value(kind.css_name())),
            }),
        }
    }
}

/// One projected keyframe; `offset` is the fraction of the step duration.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct RenderableKeyframe {
    pub offset: f64,
    pub style: Style,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Iterations {
    Once,
    Infinite,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Fill {
    /// Hold the final keyframe after the animation ends.
    #[default]
    Forwards,
}

/// Timed keyframe animation handed to a presentation sink.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Animation {
    pub keyframes: Vec<RenderableKeyframe>,
    pub duration_secs: f64,
    pub iterations: Iterations,
    pub fill: Fill,
    pub easing: Easing,
}

impl Animation {
    /// Style shown `elapsed_secs` after the animation started.
    pub fn sample(&self, elapsed_secs: f64) -> Option<Style> {
        let first = self.keyframes.first()?;
        if self.duration_secs <= 0.0 {
            return self.keyframes.last().map(|k| k.style);
        }

        let progress = (elapsed_secs.max(0.0) / self.duration_secs).max(0.0);
        let progress = match self.iterations {
            Iterations::Once => progress.min(1.0),
            Iterations::Infinite => progress.fract(),
        };
        let eased = self.easing.apply(progress);

        let mut prev = first;
        for kf in &self.keyframes {
            if kf.offset >= eased {
                if kf.offset == eased || kf.offset <= prev.offset {
                    return Some(kf.style);
                }
                let ratio = (eased - prev.offset) / (kf.offset - prev.offset);
                return Some(Style::lerp(&prev.style, &kf.style, ratio));
            }
            prev = kf;
        }
        Some(prev.style)
    }
}

/// What a step of an animated block hands to the sink.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Renderable {
    /// Apply once and hold.
    Static { style: Style },
    Animated(Animation),
}

impl Renderable {
    /// Style shown at the start of the step.
    pub fn initial_style(&self) -> Option<Style> {
        match self {
            Self::Static { style } => Some(*style),
            Self::Animated(anim) => anim.keyframes.first().map(|k| k.style),
        }
    }

    /// Wall-clock length; zero for static renderables.
    pub fn duration_secs(&self) -> f64 {
        match self {
            Self::Static { .. } => 0.0,
            Self::Animated(anim) => anim.duration_secs,
        }
    }

    /// Style shown `elapsed_secs` into the step.
    pub fn sample(&self, elapsed_secs: f64) -> Option<Style> {
        match self {
            Self::Static { style } => Some(*style),
            Self::Animated(anim) => anim.sample(elapsed_secs),
        }
    }
}

/// Normalized keyframes projected into `(offset, style)` pairs, ordered by offset.
pub fn to_renderable_keyframes(
    projection: Projection,
    step: &StepAnim,
    base: &VisualState,
) -> Vec<RenderableKeyframe> {
    normalize_keyframes(base, &step.keyframes)
        .iter()
        .map(|kf| RenderableKeyframe {
            offset: kf.t / 100.0,
            style: projection.project(&base.resolve(kf)),
        })
        .collect()
}

fn timed(step: &StepAnim, keyframes: Vec<RenderableKeyframe>) -> Renderable {
    Renderable::Animated(Animation {
        keyframes,
        duration_secs: step.duration,
        iterations: if step.looping {
            Iterations::Infinite
        } else {
            Iterations::Once
        },
        fill: Fill::Forwards,
        easing: Easing::from_css_or_linear(&step.easing),
    })
}

/// Renderable for one step of a `bg` or `sprite` block.
pub fn build_visual_animation(
    block: &Block,
    step: &StepAnim,
    base: &VisualState,
) -> WeaveResult<Renderable> {
    let projection = Projection::for_block(block)?;
    if matches!(projection, Projection::Filter(_)) {
        return Err(WeaveError::animation(format!(
            "block {} is an overlay, not a visual",
            block.id
        )));
    }
    let frames = to_renderable_keyframes(projection, step, base);
    if step.is_static() {
        let style = frames
            .first()
            .map_or_else(|| projection.project(base), |k| k.style);
        return Ok(Renderable::Static { style });
    }
    Ok(timed(step, frames))
}

/// Renderable for one step of an `overlay` block.
///
/// Only `v` is read from keyframes; offsets 0 and 1 are filled in when not authored so the
/// filter never jumps at either end.
pub fn build_filter_animation(
    block: &Block,
    step: &StepAnim,
    base: &VisualState,
) -> WeaveResult<Renderable> {
    let projection = Projection::for_block(block)?;
    let Projection::Filter(kind) = projection else {
        return Err(WeaveError::animation(format!(
            "block {} is not an overlay",
            block.id
        )));
    };
    let rest = projection.project(base);
    let filter_at = |value: Option<f64>| {
        value.map_or(rest, |value| Style::Filter(FilterStyle { kind, value }))
    };

    let mut frames: Vec<RenderableKeyframe> = step
        .keyframes
        .iter()
        .map(|kf| RenderableKeyframe {
            offset: kf.t / 100.0,
            style: filter_at(kf.v),
        })
        .collect();
    frames.sort_by(|a, b| a.offset.total_cmp(&b.offset));
    if !frames.iter().any(|k| k.offset == 0.0) {
        frames.insert(
            0,
            RenderableKeyframe {
                offset: 0.0,
                style: rest,
            },
        );
    }
    if !frames.iter().any(|k| k.offset == 1.0) {
        let hold = frames.last().map(|k| k.style).unwrap_or(rest);
        frames.push(RenderableKeyframe {
            offset: 1.0,
            style: hold,
        });
    }

    if step.is_static() {
        return Ok(Renderable::Static {
            style: frames[0].style,
        });
    }
    Ok(timed(step, frames))
}

/// Dispatch on block kind: visual blocks and overlays only.
pub fn build_step_renderable(
    block: &Block,
    step: &StepAnim,
    base: &VisualState,
) -> WeaveResult<Renderable> {
    match block.params {
        BlockParams::Overlay(_) => build_filter_animation(block, step, base),
        _ => build_visual_animation(block, step, base),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/driver.rs"]
mod tests;
