use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::foundation::core::{BlockId, SceneId, StepRange, clamp_percent};
use crate::project::lenient;

/// Block type placed on the step timeline.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// Speaker line typed into the dialogue box; blocks until advanced.
    Dialogue,
    /// Background layer.
    Bg,
    /// Character sprite layer.
    Sprite,
    /// Fixed delay; blocks for its duration.
    Wait,
    /// Choice menu; blocks until an option is picked and may branch.
    Choice,
    /// Background music or sound.
    Audio,
    /// Full-stage video.
    Video,
    /// Filter overlay on a stage layer.
    Overlay,
    /// Marker block without runtime behaviour.
    Start,
    /// Hides the dialogue box.
    Hide,
    /// Jumps to another scene.
    Transition,
}

impl BlockKind {
    /// Every block kind in palette order.
    pub const ALL: [BlockKind; 11] = [
        Self::Dialogue,
        Self::Bg,
        Self::Sprite,
        Self::Wait,
        Self::Choice,
        Self::Audio,
        Self::Video,
        Self::Overlay,
        Self::Start,
        Self::Hide,
        Self::Transition,
    ];

    /// Serialized name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dialogue => "dialogue",
            Self::Bg => "bg",
            Self::Sprite => "sprite",
            Self::Wait => "wait",
            Self::Choice => "choice",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Overlay => "overlay",
            Self::Start => "start",
            Self::Hide => "hide",
            Self::Transition => "transition",
        }
    }

    /// Kinds with a positional visual state (`bg`, `sprite`).
    pub fn is_visual(self) -> bool {
        matches!(self, Self::Bg | Self::Sprite)
    }

    /// Kinds that carry per-step animations.
    pub fn is_animated(self) -> bool {
        matches!(self, Self::Bg | Self::Sprite | Self::Overlay)
    }

    /// Kinds the scene player awaits before advancing.
    pub fn is_blocking(self) -> bool {
        matches!(self, Self::Dialogue | Self::Choice | Self::Wait)
    }
}

/// Animatable field of a keyframe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyframeField {
    /// Horizontal position in stage percent.
    X,
    /// Vertical position in stage percent.
    Y,
    /// Uniform scale factor.
    Scale,
    /// Rotation in degrees.
    Rotate,
    /// Opacity in `[0, 1]`.
    Opacity,
    /// Filter intensity (overlays only).
    V,
}

impl KeyframeField {
    /// Every field, in storage order.
    pub const ALL: [KeyframeField; 6] = [
        Self::X,
        Self::Y,
        Self::Scale,
        Self::Rotate,
        Self::Opacity,
        Self::V,
    ];

    /// Parse the serialized field name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "x" => Some(Self::X),
            "y" => Some(Self::Y),
            "scale" => Some(Self::Scale),
            "rotate" => Some(Self::Rotate),
            "opacity" => Some(Self::Opacity),
            "v" => Some(Self::V),
            _ => None,
        }
    }
}

/// A percentage-time sample of some subset of state fields within a step animation.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "RawKeyframe")]
pub struct Keyframe {
    /// Percent of the step's duration, `0..=100`.
    pub t: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v: Option<f64>,
}

impl Keyframe {
    /// Empty keyframe at `t` (clamped into `[0, 100]`).
    pub fn at(t: f64) -> Self {
        Self {
            t: clamp_percent(t),
            ..Self::default()
        }
    }

    /// Builder-style setter.
    pub fn with(mut self, field: KeyframeField, value: f64) -> Self {
        self.set(field, Some(value));
        self
    }

    pub fn get(&self, field: KeyframeField) -> Option<f64> {
        match field {
            KeyframeField::X => self.x,
            KeyframeField::Y => self.y,
            KeyframeField::Scale => self.scale,
            KeyframeField::Rotate => self.rotate,
            KeyframeField::Opacity => self.opacity,
            KeyframeField::V => self.v,
        }
    }

    pub fn set(&mut self, field: KeyframeField, value: Option<f64>) {
        let slot = match field {
            KeyframeField::X => &mut self.x,
            KeyframeField::Y => &mut self.y,
            KeyframeField::Scale => &mut self.scale,
            KeyframeField::Rotate => &mut self.rotate,
            KeyframeField::Opacity => &mut self.opacity,
            KeyframeField::V => &mut self.v,
        };
        *slot = value;
    }
}

#[derive(Deserialize)]
struct RawKeyframe {
    #[serde(default, deserialize_with = "lenient::opt_number")]
    t: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    x: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    y: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    scale: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    rotate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    opacity: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    v: Option<f64>,
    // Legacy single-property form: `{ t, p: "x", v: 30 }`.
    #[serde(default)]
    p: Option<String>,
}

impl From<RawKeyframe> for Keyframe {
    fn from(raw: RawKeyframe) -> Self {
        let mut kf = Keyframe {
            t: clamp_percent(raw.t.unwrap_or(0.0)),
            x: raw.x,
            y: raw.y,
            scale: raw.scale,
            rotate: raw.rotate,
            opacity: raw.opacity,
            v: raw.v,
        };
        if let Some(field) = raw.p.as_deref().and_then(KeyframeField::parse) {
            if field != KeyframeField::V {
                kf.set(field, raw.v);
                kf.v = None;
            }
        }
        kf
    }
}

/// The animation that plays during one discrete step of a block.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StepAnim {
    /// Wall-clock length in seconds.
    #[serde(default, deserialize_with = "lenient::seconds")]
    pub duration: f64,
    #[serde(rename = "loop", default, deserialize_with = "lenient::flag")]
    pub looping: bool,
    /// CSS easing keyword; empty means linear.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub easing: String,
    /// Keyframes in authored order.
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
}

impl StepAnim {
    /// Static hold: zero duration, no keyframes.
    pub fn hold() -> Self {
        Self {
            duration: 0.0,
            looping: false,
            easing: String::new(),
            keyframes: Vec::new(),
        }
    }

    /// The step data an inspector creates on first edit.
    pub fn authored_default() -> Self {
        Self {
            duration: 3.0,
            ..Self::hold()
        }
    }

    /// No keyframes or no duration: the step holds its base state.
    pub fn is_static(&self) -> bool {
        self.duration <= 0.0 || self.keyframes.is_empty()
    }
}

/// Per-step animations keyed by offset from the block's start.
pub type StepMap = BTreeMap<u32, StepAnim>;

/// Parameters shared by `bg` and `sprite` blocks.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VisualParams {
    #[serde(default, deserialize_with = "lenient::text")]
    pub url: String,
    /// Sprite element id; sprites sharing an id share one stage element.
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::opt_number", skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number", skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number", skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    /// Legacy background spelling of `scale`.
    #[serde(default, deserialize_with = "lenient::opt_number", skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number", skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number", skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default)]
    pub steps: StepMap,
}

/// Stage layer a filter overlay applies to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayTarget {
    /// The whole stage including UI.
    Stage,
    /// The scene wrapper (background and sprites).
    #[default]
    Scene,
    /// The background layer only.
    Bg,
    /// One sprite, named by `targetId`.
    Char,
}

impl OverlayTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stage => "stage",
            Self::Scene => "scene",
            Self::Bg => "bg",
            Self::Char => "char",
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlayParams {
    #[serde(default)]
    pub target: OverlayTarget,
    #[serde(rename = "targetId", default, deserialize_with = "lenient::text")]
    pub target_id: String,
    /// CSS filter function name, e.g. `blur` or `hue-rotate`.
    #[serde(default = "default_filter", deserialize_with = "lenient::text")]
    pub filter: String,
    #[serde(default)]
    pub steps: StepMap,
}

fn default_filter() -> String {
    "brightness".to_string()
}

impl Default for OverlayParams {
    fn default() -> Self {
        Self {
            target: OverlayTarget::Scene,
            target_id: String::new(),
            filter: default_filter(),
            steps: StepMap::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DialogueParams {
    /// Speaker name.
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub text: String,
    /// Typing speed in milliseconds per character.
    #[serde(default = "default_speed", deserialize_with = "lenient::number")]
    pub speed: f64,
}

fn default_speed() -> f64 {
    30.0
}

impl Default for DialogueParams {
    fn default() -> Self {
        Self {
            name: String::new(),
            text: String::new(),
            speed: default_speed(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WaitParams {
    /// Seconds.
    #[serde(default = "default_wait", deserialize_with = "lenient::number")]
    pub duration: f64,
}

fn default_wait() -> f64 {
    1.0
}

impl Default for WaitParams {
    fn default() -> Self {
        Self {
            duration: default_wait(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChoiceOption {
    #[serde(default, deserialize_with = "lenient::text")]
    pub text: String,
    /// Destination scene; empty continues in the current scene.
    #[serde(default, deserialize_with = "lenient::text")]
    pub target: String,
}

impl ChoiceOption {
    pub fn new(text: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            target: target.into(),
        }
    }

    pub fn target_scene(&self) -> Option<SceneId> {
        non_empty_scene(&self.target)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChoiceParams {
    #[serde(default)]
    pub options: Vec<ChoiceOption>,
}

impl Default for ChoiceParams {
    fn default() -> Self {
        Self {
            options: vec![ChoiceOption::new("Option 1", "")],
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MediaParams {
    #[serde(default, deserialize_with = "lenient::text")]
    pub url: String,
    /// Volume in `[0, 1]`.
    #[serde(default = "default_volume", deserialize_with = "lenient::number")]
    pub vol: f64,
    #[serde(rename = "loop", default, deserialize_with = "lenient::flag")]
    pub looping: bool,
}

fn default_volume() -> f64 {
    0.5
}

impl MediaParams {
    pub fn audio_defaults() -> Self {
        Self {
            url: String::new(),
            vol: default_volume(),
            looping: true,
        }
    }

    /// Videos start muted.
    pub fn video_defaults() -> Self {
        Self {
            vol: 0.0,
            ..Self::audio_defaults()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransitionParams {
    #[serde(default, deserialize_with = "lenient::text")]
    pub target: String,
}

impl TransitionParams {
    pub fn target_scene(&self) -> Option<SceneId> {
        non_empty_scene(&self.target)
    }
}

fn non_empty_scene(target: &str) -> Option<SceneId> {
    let trimmed = target.trim();
    (!trimmed.is_empty()).then(|| SceneId::new(trimmed))
}

/// Type-dependent block parameters.
#[derive(Clone, Debug, PartialEq)]
pub enum BlockParams {
    Dialogue(DialogueParams),
    Bg(VisualParams),
    Sprite(VisualParams),
    Wait(WaitParams),
    Choice(ChoiceParams),
    Audio(MediaParams),
    Video(MediaParams),
    Overlay(OverlayParams),
    Start,
    Hide,
    Transition(TransitionParams),
}

impl BlockParams {
    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Dialogue(_) => BlockKind::Dialogue,
            Self::Bg(_) => BlockKind::Bg,
            Self::Sprite(_) => BlockKind::Sprite,
            Self::Wait(_) => BlockKind::Wait,
            Self::Choice(_) => BlockKind::Choice,
            Self::Audio(_) => BlockKind::Audio,
            Self::Video(_) => BlockKind::Video,
            Self::Overlay(_) => BlockKind::Overlay,
            Self::Start => BlockKind::Start,
            Self::Hide => BlockKind::Hide,
            Self::Transition(_) => BlockKind::Transition,
        }
    }

    /// Parameters a freshly dropped block of `kind` starts with.
    pub fn default_for(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Dialogue => Self::Dialogue(DialogueParams::default()),
            BlockKind::Bg => Self::Bg(VisualParams {
                x: Some(50.0),
                y: Some(50.0),
                zoom: Some(1.0),
                ..VisualParams::default()
            }),
            BlockKind::Sprite => Self::Sprite(VisualParams {
                x: Some(50.0),
                y: Some(100.0),
                scale: Some(1.0),
                rotate: Some(0.0),
                opacity: Some(1.0),
                ..VisualParams::default()
            }),
            BlockKind::Wait => Self::Wait(WaitParams::default()),
            BlockKind::Choice => Self::Choice(ChoiceParams::default()),
            BlockKind::Audio => Self::Audio(MediaParams::audio_defaults()),
            BlockKind::Video => Self::Video(MediaParams::video_defaults()),
            BlockKind::Overlay => Self::Overlay(OverlayParams::default()),
            BlockKind::Start => Self::Start,
            BlockKind::Hide => Self::Hide,
            BlockKind::Transition => Self::Transition(TransitionParams::default()),
        }
    }

    /// Decode `value` as parameters of `kind`; malformed input falls back to the kind's defaults.
    pub fn from_value(kind: BlockKind, value: Value) -> Self {
        fn decode<T: serde::de::DeserializeOwned>(kind: BlockKind, value: Value) -> Option<T> {
            let value = if value.is_null() {
                Value::Object(Default::default())
            } else {
                value
            };
            match serde_json::from_value(value) {
                Ok(v) => Some(v),
                Err(err) => {
                    tracing::warn!(kind = kind.as_str(), error = %err, "malformed block params, using defaults");
                    None
                }
            }
        }

        let decoded = match kind {
            BlockKind::Dialogue => decode(kind, value).map(Self::Dialogue),
            BlockKind::Bg => decode(kind, value).map(Self::Bg),
            BlockKind::Sprite => decode(kind, value).map(Self::Sprite),
            BlockKind::Wait => decode(kind, value).map(Self::Wait),
            BlockKind::Choice => decode(kind, value).map(Self::Choice),
            BlockKind::Audio => decode(kind, value).map(Self::Audio),
            BlockKind::Video => decode(kind, value).map(Self::Video),
            BlockKind::Overlay => decode(kind, value).map(Self::Overlay),
            BlockKind::Start => Some(Self::Start),
            BlockKind::Hide => Some(Self::Hide),
            BlockKind::Transition => decode(kind, value).map(Self::Transition),
        };
        decoded.unwrap_or_else(|| Self::default_for(kind))
    }

    pub fn to_value(&self) -> Value {
        let encoded = match self {
            Self::Dialogue(p) => serde_json::to_value(p),
            Self::Bg(p) | Self::Sprite(p) => serde_json::to_value(p),
            Self::Wait(p) => serde_json::to_value(p),
            Self::Choice(p) => serde_json::to_value(p),
            Self::Audio(p) | Self::Video(p) => serde_json::to_value(p),
            Self::Overlay(p) => serde_json::to_value(p),
            Self::Start | Self::Hide => Ok(Value::Object(Default::default())),
            Self::Transition(p) => serde_json::to_value(p),
        };
        // Plain data structs with string keys always encode.
        encoded.unwrap_or(Value::Null)
    }

    /// Step animations of `bg`, `sprite` and `overlay` blocks.
    pub fn steps(&self) -> Option<&StepMap> {
        match self {
            Self::Bg(p) | Self::Sprite(p) => Some(&p.steps),
            Self::Overlay(p) => Some(&p.steps),
            _ => None,
        }
    }

    pub fn steps_mut(&mut self) -> Option<&mut StepMap> {
        match self {
            Self::Bg(p) | Self::Sprite(p) => Some(&mut p.steps),
            Self::Overlay(p) => Some(&mut p.steps),
            _ => None,
        }
    }

    pub fn visual(&self) -> Option<&VisualParams> {
        match self {
            Self::Bg(p) | Self::Sprite(p) => Some(p),
            _ => None,
        }
    }

    pub fn overlay(&self) -> Option<&OverlayParams> {
        match self {
            Self::Overlay(p) => Some(p),
            _ => None,
        }
    }
}

/// A typed block occupying `[start, start + duration)` on one track of a scene.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "RawBlock", into = "RawBlock")]
pub struct Block {
    pub id: BlockId,
    pub name: String,
    /// First occupied step.
    pub start: u32,
    /// Parallel lane; presentational only.
    pub track: u32,
    /// Number of occupied steps, at least 1.
    pub duration: u32,
    pub params: BlockParams,
}

impl Block {
    /// A fresh block with the kind's default params and `duration = 1`.
    pub fn new(id: BlockId, kind: BlockKind, start: u32, track: u32) -> Self {
        Self {
            id,
            name: String::new(),
            start,
            track,
            duration: 1,
            params: BlockParams::default_for(kind),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_params(mut self, params: BlockParams) -> Self {
        self.params = params;
        self
    }

    /// Set the duration; values below 1 are raised to 1.
    pub fn with_duration(mut self, duration: u32) -> Self {
        self.duration = duration.max(1);
        self
    }

    pub fn kind(&self) -> BlockKind {
        self.params.kind()
    }

    pub fn range(&self) -> StepRange {
        StepRange::from_start(self.start, self.duration)
    }

    pub fn end(&self) -> u32 {
        self.range().end
    }

    pub fn is_active_at(&self, step: u32) -> bool {
        self.range().contains(step)
    }

    /// Step offset relative to the block start, if `step` is occupied.
    pub fn relative_step(&self, step: u32) -> Option<u32> {
        self.range().offset_of(step)
    }

    /// Step animation authored for relative offset `offset`.
    pub fn step_anim(&self, offset: u32) -> Option<&StepAnim> {
        self.params.steps()?.get(&offset)
    }
}

#[derive(serde::Serialize, Deserialize)]
struct RawBlock {
    #[serde(deserialize_with = "lenient::id")]
    id: u64,
    #[serde(rename = "type")]
    kind: BlockKind,
    #[serde(default, deserialize_with = "lenient::text")]
    name: String,
    #[serde(default, deserialize_with = "lenient::step")]
    start: u32,
    #[serde(default, deserialize_with = "lenient::step")]
    track: u32,
    #[serde(default = "one", deserialize_with = "lenient::step")]
    duration: u32,
    #[serde(default)]
    params: Value,
}

fn one() -> u32 {
    1
}

impl From<RawBlock> for Block {
    fn from(raw: RawBlock) -> Self {
        Self {
            id: BlockId(raw.id),
            name: raw.name,
            start: raw.start,
            track: raw.track,
            duration: raw.duration.max(1),
            params: BlockParams::from_value(raw.kind, raw.params),
        }
    }
}

impl From<Block> for RawBlock {
    fn from(block: Block) -> Self {
        Self {
            id: block.id.0,
            kind: block.kind(),
            params: block.params.to_value(),
            name: block.name,
            start: block.start,
            track: block.track,
            duration: block.duration,
        }
    }
}

/// A named, independently playable timeline of blocks.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    pub id: SceneId,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_blocks")]
    pub blocks: Vec<Block>,
}

impl Scene {
    pub fn new(id: impl Into<SceneId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            blocks: Vec::new(),
        }
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    /// First step past every block (0 for an empty scene).
    pub fn end_step(&self) -> u32 {
        self.blocks.iter().map(Block::end).max().unwrap_or(0)
    }

    /// Blocks occupying `step`, in authored order.
    pub fn active_at(&self, step: u32) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(move |b| b.is_active_at(step))
    }

    /// Blocks whose first step is `step`, in authored order.
    pub fn firing_at(&self, step: u32) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(move |b| b.start == step)
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }
}

/// Decode blocks one at a time so a single bad entry does not sink the document.
fn deserialize_blocks<'de, D>(d: D) -> Result<Vec<Block>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(d)?.unwrap_or_default();
    Ok(decode_blocks(raw))
}

/// Decode every block that parses, warning about and dropping the rest.
pub(crate) fn decode_blocks(raw: Vec<Value>) -> Vec<Block> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<Block>(value) {
            Ok(block) => Some(block),
            Err(err) => {
                tracing::warn!(index, error = %err, "skipping undecodable block");
                None
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/project/model.rs"]
mod tests;
