use super::*;
use crate::animation::driver::{Anchor, FilterKind, Fill, Iterations, RenderableKeyframe};
use crate::animation::ease::Easing;
use crate::foundation::core::BlockId;
use crate::project::model::{BlockKind, OverlayParams};

fn transform(x: f64) -> TransformStyle {
    TransformStyle {
        anchor: Anchor::BottomCenter,
        x,
        y: 100.0,
        scale: 1.0,
        rotate: 0.0,
        opacity: 1.0,
    }
}

fn blur(value: f64) -> FilterStyle {
    FilterStyle {
        kind: FilterKind::Blur,
        value,
    }
}

fn animation(style: Style) -> Animation {
    Animation {
        keyframes: vec![RenderableKeyframe { offset: 0.0, style }],
        duration_secs: 1.0,
        iterations: Iterations::Once,
        fill: Fill::Forwards,
        easing: Easing::Linear,
    }
}

#[test]
fn overlay_targets_map_to_stage_layers() {
    let overlay = |target: OverlayTarget, id: &str| {
        Block::new(BlockId(1), BlockKind::Overlay, 0, 0).with_params(BlockParams::Overlay(
            OverlayParams {
                target,
                target_id: id.to_string(),
                ..OverlayParams::default()
            },
        ))
    };
    assert_eq!(
        VisualTarget::for_block(&overlay(OverlayTarget::Stage, "")),
        Some(VisualTarget::Stage)
    );
    assert_eq!(
        VisualTarget::for_block(&overlay(OverlayTarget::Char, "hero")),
        Some(VisualTarget::Sprite("hero".to_string()))
    );
    assert_eq!(VisualTarget::for_block(&overlay(OverlayTarget::Char, " ")), None);
    assert_eq!(
        VisualTarget::for_block(&Block::new(BlockId(2), BlockKind::Wait, 0, 0)),
        None
    );
}

#[test]
fn later_renderable_replaces_slot() {
    let mut sink = RecordingSink::new();
    let target = VisualTarget::Sprite("a".to_string());
    let slot = AnimationSlot::new(target.clone(), Channel::Transform);

    sink.play_animation(&slot, &animation(Style::Transform(transform(10.0))));
    sink.set_visual_state(&target, &transform(20.0));
    assert_eq!(
        sink.live(&slot),
        Some(&Renderable::Static {
            style: Style::Transform(transform(20.0))
        })
    );
    assert_eq!(sink.live_slots().count(), 1);
}

#[test]
fn transform_and_filter_channels_are_independent() {
    let mut sink = RecordingSink::new();
    let target = VisualTarget::Background;
    sink.set_visual_state(&target, &transform(5.0));
    sink.apply_filter(&target, &blur(3.0));
    assert_eq!(sink.live_slots().count(), 2);

    sink.clear_filters();
    assert_eq!(sink.live_slots().count(), 1);
    assert!(sink
        .live(&AnimationSlot::new(target, Channel::Transform))
        .is_some());
}

#[test]
fn present_dispatches_on_renderable_shape() {
    let mut sink = RecordingSink::new();
    let target = VisualTarget::Scene;
    present(
        &mut sink,
        &target,
        &Renderable::Static {
            style: Style::Filter(blur(1.0)),
        },
    );
    present(
        &mut sink,
        &target,
        &Renderable::Animated(animation(Style::Filter(blur(2.0)))),
    );
    let cmds = sink.take_commands();
    assert!(matches!(cmds[0], SinkCommand::ApplyFilter { .. }));
    assert!(matches!(
        &cmds[1],
        SinkCommand::PlayAnimation { slot, .. } if slot.channel == Channel::Filter
    ));
    assert!(sink.commands().is_empty());
}

#[test]
fn reset_clears_tracked_state() {
    let mut sink = RecordingSink::new();
    sink.show_dialogue("Ann", "");
    sink.update_dialogue("Hel");
    assert_eq!(sink.dialogue(), Some(("Ann", "Hel")));
    sink.show_choices(&["a".to_string()]);
    sink.play_media(MediaKind::Audio, &MediaParams::audio_defaults());
    sink.reset();
    assert_eq!(sink.dialogue(), None);
    assert_eq!(sink.choices(), None);
    assert_eq!(sink.playing(MediaKind::Audio), None);
    assert_eq!(sink.commands().last(), Some(&SinkCommand::Reset));
}

#[test]
fn commands_serialize_as_tagged_json() {
    let v = serde_json::to_value(SinkCommand::AttachSource {
        target: VisualTarget::Sprite("hero".to_string()),
        url: "hero.png".to_string(),
    })
    .unwrap();
    assert_eq!(v["cmd"], "attach_source");
    assert_eq!(v["target"]["layer"], "sprite");
    assert_eq!(v["target"]["id"], "hero");
}
