use super::*;
use crate::animation::state::resolve_base_state;
use crate::foundation::core::BlockId;
use crate::project::model::{BlockKind, Keyframe, KeyframeField, OverlayParams};

fn sprite() -> Block {
    Block::new(BlockId(1), BlockKind::Sprite, 0, 0)
}

fn overlay(filter: &str) -> Block {
    Block::new(BlockId(2), BlockKind::Overlay, 0, 0).with_params(BlockParams::Overlay(
        OverlayParams {
            filter: filter.to_string(),
            ..OverlayParams::default()
        },
    ))
}

fn step(duration: f64, keyframes: Vec<Keyframe>) -> StepAnim {
    StepAnim {
        duration,
        keyframes,
        ..StepAnim::hold()
    }
}

fn transform(style: Style) -> TransformStyle {
    match style {
        Style::Transform(t) => t,
        other => panic!("expected transform, got {other:?}"),
    }
}

fn filter(style: Style) -> FilterStyle {
    match style {
        Style::Filter(f) => f,
        other => panic!("expected filter, got {other:?}"),
    }
}

#[test]
fn empty_step_is_a_static_base_style() {
    let block = sprite();
    let base = resolve_base_state(&block);
    let r = build_visual_animation(&block, &StepAnim::hold(), &base).unwrap();
    let Renderable::Static { style } = r else {
        panic!("expected static renderable");
    };
    let t = transform(style);
    assert_eq!((t.x, t.y, t.opacity), (50.0, 100.0, 1.0));
    assert_eq!(t.anchor, Anchor::BottomCenter);
}

#[test]
fn zero_duration_with_keyframes_is_static() {
    let block = sprite();
    let base = resolve_base_state(&block);
    let s = step(0.0, vec![Keyframe::at(100.0).with(KeyframeField::X, 0.0)]);
    let r = build_visual_animation(&block, &s, &base).unwrap();
    assert!(matches!(r, Renderable::Static { .. }));
    assert_eq!(r.duration_secs(), 0.0);
}

#[test]
fn timed_step_carries_loop_and_easing() {
    let block = sprite();
    let base = resolve_base_state(&block);
    let mut s = step(2.0, vec![Keyframe::at(100.0).with(KeyframeField::X, 10.0)]);
    s.looping = true;
    s.easing = "ease-in".to_string();

    let Renderable::Animated(anim) = build_visual_animation(&block, &s, &base).unwrap() else {
        panic!("expected animation");
    };
    assert_eq!(anim.duration_secs, 2.0);
    assert_eq!(anim.iterations, Iterations::Infinite);
    assert_eq!(anim.fill, Fill::Forwards);
    assert_eq!(anim.easing, Easing::EASE_IN);
    let offsets: Vec<f64> = anim.keyframes.iter().map(|k| k.offset).collect();
    assert_eq!(offsets, vec![0.0, 1.0]);
}

#[test]
fn renderable_keyframes_are_ordered_and_resolved_against_base() {
    let block = sprite();
    let base = resolve_base_state(&block);
    let s = step(
        1.0,
        vec![
            Keyframe::at(75.0).with(KeyframeField::Opacity, 0.0),
            Keyframe::at(25.0).with(KeyframeField::X, 20.0),
        ],
    );
    let frames = to_renderable_keyframes(Projection::Sprite, &s, &base);
    let offsets: Vec<f64> = frames.iter().map(|k| k.offset).collect();
    assert_eq!(offsets, vec![0.0, 0.25, 0.75]);
    let last = transform(frames[2].style);
    assert_eq!((last.x, last.opacity), (50.0, 0.0));
}

#[test]
fn background_uses_centre_anchor() {
    let block = Block::new(BlockId(3), BlockKind::Bg, 0, 0);
    let base = resolve_base_state(&block);
    let style = Projection::for_block(&block).unwrap().project(&base);
    let t = transform(style);
    assert_eq!(t.anchor, Anchor::Center);
    assert_eq!(t.css_transform(), "translate(0%, 0%) scale(1) rotate(0deg)");
}

#[test]
fn filter_boundaries_are_synthesized() {
    let block = overlay("blur");
    let base = resolve_base_state(&block);
    let s = step(1.0, vec![Keyframe::at(50.0).with(KeyframeField::V, 8.0)]);
    let Renderable::Animated(anim) = build_filter_animation(&block, &s, &base).unwrap() else {
        panic!("expected animation");
    };
    let values: Vec<(f64, f64)> = anim
        .keyframes
        .iter()
        .map(|k| (k.offset, filter(k.style).value))
        .collect();
    assert_eq!(values, vec![(0.0, 0.0), (0.5, 8.0), (1.0, 8.0)]);
    assert_eq!(filter(anim.keyframes[1].style).css(), "blur(8px)");
}

#[test]
fn filter_units_follow_the_function() {
    assert_eq!(FilterKind::Blur.unit(), "px");
    assert_eq!(FilterKind::HueRotate.unit(), "deg");
    assert_eq!(FilterKind::Sepia.unit(), "%");
    let f = FilterStyle {
        kind: FilterKind::HueRotate,
        value: 90.0,
    };
    assert_eq!(f.css(), "hue-rotate(90deg)");
}

#[test]
fn unknown_filter_is_a_block_error() {
    let block = overlay("wobble");
    let base = resolve_base_state(&block);
    let err = build_filter_animation(&block, &StepAnim::hold(), &base).unwrap_err();
    assert!(err.to_string().contains("wobble"));
}

#[test]
fn non_visual_blocks_have_no_projection() {
    let block = Block::new(BlockId(4), BlockKind::Dialogue, 0, 0);
    let base = resolve_base_state(&block);
    assert!(build_visual_animation(&block, &StepAnim::hold(), &base).is_err());
    assert!(build_filter_animation(&sprite(), &StepAnim::hold(), &base).is_err());
}

#[test]
fn sample_honours_fill_and_loop() {
    let block = sprite();
    let base = resolve_base_state(&block);
    let mut s = step(2.0, vec![Keyframe::at(100.0).with(KeyframeField::X, 0.0)]);
    let once = build_visual_animation(&block, &s, &base).unwrap();
    assert_eq!(transform(once.sample(1.0).unwrap()).x, 25.0);
    assert_eq!(transform(once.sample(10.0).unwrap()).x, 0.0);

    s.looping = true;
    let looped = build_visual_animation(&block, &s, &base).unwrap();
    assert_eq!(transform(looped.sample(3.0).unwrap()).x, 25.0);
    assert_eq!(transform(looped.sample(0.0).unwrap()).x, 50.0);
}

#[test]
fn sample_applies_iteration_easing() {
    let block = sprite();
    let base = resolve_base_state(&block);
    let mut s = step(1.0, vec![Keyframe::at(100.0).with(KeyframeField::X, 0.0)]);
    s.easing = "step-end".to_string();
    let r = build_visual_animation(&block, &s, &base).unwrap();
    assert_eq!(transform(r.sample(0.9).unwrap()).x, 50.0);
    assert_eq!(transform(r.sample(1.0).unwrap()).x, 0.0);
}
