use std::collections::BTreeMap;

use crate::{
    animation::driver::{Animation, FilterStyle, Renderable, Style, TransformStyle},
    project::model::{Block, BlockParams, MediaParams, OverlayTarget},
};

/// Stage element a command addresses.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(tag = "layer", content = "id", rename_all = "snake_case")]
pub enum VisualTarget {
    /// The whole stage including dialogue and choice UI.
    Stage,
    /// Background plus sprites.
    Scene,
    Background,
    /// Sprite element, keyed by its element id.
    Sprite(String),
}

impl VisualTarget {
    /// Element an animated block drives, if it names one.
    pub fn for_block(block: &Block) -> Option<Self> {
        match &block.params {
            BlockParams::Bg(_) => Some(Self::Background),
            BlockParams::Sprite(p) => Some(Self::Sprite(p.id.clone())),
            BlockParams::Overlay(p) => match p.target {
                OverlayTarget::Stage => Some(Self::Stage),
                OverlayTarget::Scene => Some(Self::Scene),
                OverlayTarget::Bg => Some(Self::Background),
                OverlayTarget::Char if p.target_id.trim().is_empty() => None,
                OverlayTarget::Char => Some(Self::Sprite(p.target_id.trim().to_string())),
            },
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Transform,
    Filter,
}

impl Channel {
    pub fn of(style: &Style) -> Self {
        match style {
            Style::Transform(_) => Self::Transform,
            Style::Filter(_) => Self::Filter,
        }
    }
}

/// One animation slot: a new animation on a slot replaces the previous one.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct AnimationSlot {
    pub target: VisualTarget,
    pub channel: Channel,
}

impl AnimationSlot {
    pub fn new(target: VisualTarget, channel: Channel) -> Self {
        Self { target, channel }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    pub const ALL: [Self; 2] = [Self::Audio, Self::Video];
}

/// Everything the scene player asks of the stage.
///
/// Implementations cancel whatever animation runs on a slot before applying a new one; nothing
/// is blended.
pub trait PresentationSink {
    /// Drop all presentation state: animations, sprites, dialogue, choices, media.
    fn reset(&mut self);
    /// Remove every filter and filter animation.
    fn clear_filters(&mut self);
    fn attach_source(&mut self, target: &VisualTarget, url: &str);
    fn set_visual_state(&mut self, target: &VisualTarget, style: &TransformStyle);
    fn play_animation(&mut self, slot: &AnimationSlot, animation: &Animation);
    fn apply_filter(&mut self, target: &VisualTarget, style: &FilterStyle);
    fn show_dialogue(&mut self, speaker: &str, text: &str);
    /// Replace the visible dialogue text while typing.
    fn update_dialogue(&mut self, text: &str);
    fn hide_dialogue(&mut self);
    fn show_choices(&mut self, options: &[String]);
    fn hide_choices(&mut self);
    /// Start media, replacing whatever plays for the same kind.
    fn play_media(&mut self, kind: MediaKind, media: &MediaParams);
    fn stop_media(&mut self, kind: MediaKind);
}

/// Apply a renderable to its slot through the matching sink call.
pub fn present(sink: &mut dyn PresentationSink, target: &VisualTarget, renderable: &Renderable) {
    match renderable {
        Renderable::Static {
            style: Style::Transform(t),
        } => sink.set_visual_state(target, t),
        Renderable::Static {
            style: Style::Filter(f),
        } => sink.apply_filter(target, f),
        Renderable::Animated(anim) => {
            let Some(first) = anim.keyframes.first() else {
                return;
            };
            let slot = AnimationSlot::new(target.clone(), Channel::of(&first.style));
            sink.play_animation(&slot, anim);
        }
    }
}

/// A sink call, as recorded by [`RecordingSink`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum SinkCommand {
    Reset,
    ClearFilters,
    AttachSource {
        target: VisualTarget,
        url: String,
    },
    SetVisualState {
        target: VisualTarget,
        style: TransformStyle,
    },
    PlayAnimation {
        slot: AnimationSlot,
        animation: Animation,
    },
    ApplyFilter {
        target: VisualTarget,
        style: FilterStyle,
    },
    ShowDialogue {
        speaker: String,
        text: String,
    },
    UpdateDialogue {
        text: String,
    },
    HideDialogue,
    ShowChoices {
        options: Vec<String>,
    },
    HideChoices,
    PlayMedia {
        kind: MediaKind,
        url: String,
        volume: f64,
        looping: bool,
    },
    StopMedia {
        kind: MediaKind,
    },
}

/// Headless sink that records every command and tracks what each slot currently shows.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    commands: Vec<SinkCommand>,
    live: BTreeMap<AnimationSlot, Renderable>,
    dialogue: Option<(String, String)>,
    choices: Option<Vec<String>>,
    media: BTreeMap<MediaKind, String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[SinkCommand] {
        &self.commands
    }

    /// Drain recorded commands, keeping the tracked stage state.
    pub fn take_commands(&mut self) -> Vec<SinkCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Renderable currently bound to `slot`.
    pub fn live(&self, slot: &AnimationSlot) -> Option<&Renderable> {
        self.live.get(slot)
    }

    pub fn live_slots(&self) -> impl Iterator<Item = (&AnimationSlot, &Renderable)> {
        self.live.iter()
    }

    /// Visible `(speaker, text)` of the dialogue box.
    pub fn dialogue(&self) -> Option<(&str, &str)> {
        self.dialogue
            .as_ref()
            .map(|(speaker, text)| (speaker.as_str(), text.as_str()))
    }

    pub fn choices(&self) -> Option<&[String]> {
        self.choices.as_deref()
    }

    pub fn playing(&self, kind: MediaKind) -> Option<&str> {
        self.media.get(&kind).map(String::as_str)
    }

    fn bind(&mut self, slot: AnimationSlot, renderable: Renderable) {
        self.live.insert(slot, renderable);
    }
}

impl PresentationSink for RecordingSink {
    fn reset(&mut self) {
        self.live.clear();
        self.dialogue = None;
        self.choices = None;
        self.media.clear();
        self.commands.push(SinkCommand::Reset);
    }

    fn clear_filters(&mut self) {
        self.live.retain(|slot, _| slot.channel != Channel::Filter);
        self.commands.push(SinkCommand::ClearFilters);
    }

    fn attach_source(&mut self, target: &VisualTarget, url: &str) {
        self.commands.push(SinkCommand::AttachSource {
            target: target.clone(),
            url: url.to_string(),
        });
    }

    fn set_visual_state(&mut self, target: &VisualTarget, style: &TransformStyle) {
        self.bind(
            AnimationSlot::new(target.clone(), Channel::Transform),
            Renderable::Static {
                style: Style::Transform(*style),
            },
        );
        self.commands.push(SinkCommand::SetVisualState {
            target: target.clone(),
            style: *style,
        });
    }

    fn play_animation(&mut self, slot: &AnimationSlot, animation: &Animation) {
        self.bind(slot.clone(), Renderable::Animated(animation.clone()));
        self.commands.push(SinkCommand::PlayAnimation {
            slot: slot.clone(),
            animation: animation.clone(),
        });
    }

    fn apply_filter(&mut self, target: &VisualTarget, style: &FilterStyle) {
        self.bind(
            AnimationSlot::new(target.clone(), Channel::Filter),
            Renderable::Static {
                style: Style::Filter(*style),
            },
        );
        self.commands.push(SinkCommand::ApplyFilter {
            target: target.clone(),
            style: *style,
        });
    }

    fn show_dialogue(&mut self, speaker: &str, text: &str) {
        self.dialogue = Some((speaker.to_string(), text.to_string()));
        self.commands.push(SinkCommand::ShowDialogue {
            speaker: speaker.to_string(),
            text: text.to_string(),
        });
    }

    fn update_dialogue(&mut self, text: &str) {
        if let Some((_, visible)) = &mut self.dialogue {
            *visible = text.to_string();
        }
        self.commands.push(SinkCommand::UpdateDialogue {
            text: text.to_string(),
        });
    }

    fn hide_dialogue(&mut self) {
        self.dialogue = None;
        self.commands.push(SinkCommand::HideDialogue);
    }

    fn show_choices(&mut self, options: &[String]) {
        self.choices = Some(options.to_vec());
        self.commands.push(SinkCommand::ShowChoices {
            options: options.to_vec(),
        });
    }

    fn hide_choices(&mut self) {
        self.choices = None;
        self.commands.push(SinkCommand::HideChoices);
    }

    fn play_media(&mut self, kind: MediaKind, media: &MediaParams) {
        self.media.insert(kind, media.url.clone());
        self.commands.push(SinkCommand::PlayMedia {
            kind,
            url: media.url.clone(),
            volume: media.vol,
            looping: media.looping,
        });
    }

    fn stop_media(&mut self, kind: MediaKind) {
        self.media.remove(&kind);
        self.commands.push(SinkCommand::StopMedia { kind });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/sink.rs"]
mod tests;
