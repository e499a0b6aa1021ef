use super::*;
use crate::foundation::core::BlockId;
use crate::project::model::{BlockKind, OverlayParams, VisualParams};

fn base() -> VisualState {
    VisualState {
        x: 50.0,
        y: 100.0,
        scale: 1.0,
        rotate: 0.0,
        opacity: 1.0,
        v: None,
    }
}

#[test]
fn base_state_defaults_depend_on_kind() {
    let bg = Block::new(BlockId(1), BlockKind::Bg, 0, 0).with_params(BlockParams::Bg(
        VisualParams::default(),
    ));
    let s = resolve_base_state(&bg);
    assert_eq!((s.x, s.y, s.scale, s.rotate, s.opacity), (50.0, 50.0, 1.0, 0.0, 1.0));

    let sprite = Block::new(BlockId(2), BlockKind::Sprite, 0, 0).with_params(
        BlockParams::Sprite(VisualParams::default()),
    );
    assert_eq!(resolve_base_state(&sprite).y, 100.0);
    assert_eq!(resolve_base_state(&sprite).v, None);
}

#[test]
fn legacy_zoom_feeds_scale() {
    let bg = Block::new(BlockId(1), BlockKind::Bg, 0, 0).with_params(BlockParams::Bg(
        VisualParams {
            zoom: Some(1.5),
            ..VisualParams::default()
        },
    ));
    assert_eq!(resolve_base_state(&bg).scale, 1.5);

    let both = Block::new(BlockId(1), BlockKind::Bg, 0, 0).with_params(BlockParams::Bg(
        VisualParams {
            zoom: Some(1.5),
            scale: Some(2.0),
            ..VisualParams::default()
        },
    ));
    assert_eq!(resolve_base_state(&both).scale, 2.0);
}

#[test]
fn overlay_rest_value_depends_on_filter() {
    let overlay = |filter: &str| {
        Block::new(BlockId(1), BlockKind::Overlay, 0, 0).with_params(BlockParams::Overlay(
            OverlayParams {
                filter: filter.to_string(),
                ..OverlayParams::default()
            },
        ))
    };
    assert_eq!(resolve_base_state(&overlay("blur")).v, Some(0.0));
    assert_eq!(resolve_base_state(&overlay("sepia")).v, Some(0.0));
    assert_eq!(resolve_base_state(&overlay("brightness")).v, Some(100.0));
    assert_eq!(resolve_base_state(&overlay("saturate")).v, Some(100.0));
}

#[test]
fn interpolate_at_zero_is_base_without_authored_zero() {
    let kfs = [Keyframe::at(50.0).with(KeyframeField::X, 10.0)];
    assert_eq!(interpolate(&base(), &kfs, 0.0), base());
    assert_eq!(interpolate(&base(), &[], 37.0), base());
}

#[test]
fn interpolate_midpoint_rounds_per_field() {
    let kfs = [Keyframe::at(100.0)
        .with(KeyframeField::X, 0.0)
        .with(KeyframeField::Scale, 2.0)
        .with(KeyframeField::Rotate, 45.0)
        .with(KeyframeField::Opacity, 0.0)];
    let s = interpolate(&base(), &kfs, 33.0);
    assert_eq!(s.x, 33.5);
    assert_eq!(s.scale, 1.33);
    assert_eq!(s.rotate, 15.0);
    assert_eq!(s.opacity, 0.67);
    assert_eq!(s.y, 100.0);
}

#[test]
fn interpolate_hits_keyframes_exactly_and_holds_last() {
    let kfs = [
        Keyframe::at(40.0).with(KeyframeField::X, 20.0),
        Keyframe::at(80.0).with(KeyframeField::X, 80.0),
    ];
    assert_eq!(interpolate(&base(), &kfs, 40.0).x, 20.0);
    assert_eq!(interpolate(&base(), &kfs, 60.0).x, 50.0);
    assert_eq!(interpolate(&base(), &kfs, 80.0).x, 80.0);
    assert_eq!(interpolate(&base(), &kfs, 95.0).x, 80.0);
    assert_eq!(interpolate(&base(), &kfs, 100.0).x, 80.0);
}

#[test]
fn interpolate_is_continuous_across_keyframes() {
    let kfs = [
        Keyframe::at(30.0).with(KeyframeField::Y, 40.0),
        Keyframe::at(70.0).with(KeyframeField::Y, 90.0),
    ];
    let mut last = interpolate(&base(), &kfs, 0.0).y;
    let mut t = 0.0;
    while t <= 100.0 {
        let y = interpolate(&base(), &kfs, t).y;
        // Largest slope is 60 per 30 percent; a 0.5 percent step moves at most 1.0 plus rounding.
        assert!((y - last).abs() <= 1.1, "jump at t={t}: {last} -> {y}");
        last = y;
        t += 0.5;
    }
}

#[test]
fn authored_zero_keyframe_replaces_synthesized_base() {
    let kfs = [Keyframe::at(0.0).with(KeyframeField::Opacity, 0.0)];
    let s = interpolate(&base(), &kfs, 50.0);
    assert_eq!(s.opacity, 0.0);
    assert_eq!(s.x, 50.0);
}

#[test]
fn normalize_is_idempotent_and_sorted() {
    let kfs = [
        Keyframe::at(90.0).with(KeyframeField::X, 1.0),
        Keyframe::at(10.0).with(KeyframeField::X, 2.0),
    ];
    let once = normalize_keyframes(&base(), &kfs);
    let twice = normalize_keyframes(&base(), &once);
    assert_eq!(once, twice);
    let ts: Vec<f64> = once.iter().map(|k| k.t).collect();
    assert_eq!(ts, vec![0.0, 10.0, 90.0]);
    assert_eq!(once[0].x, Some(50.0));
}

#[test]
fn filter_value_is_interpolated_only_when_both_ends_have_one() {
    let overlay_base = VisualState {
        v: Some(0.0),
        ..base()
    };
    let kfs = [Keyframe::at(100.0).with(KeyframeField::V, 10.0)];
    assert_eq!(interpolate(&overlay_base, &kfs, 25.0).v, Some(2.5));
    assert_eq!(interpolate(&base(), &kfs, 25.0).v, None);
}
