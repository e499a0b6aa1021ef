use super::*;

#[test]
fn step_range_contains_boundaries() {
    let r = StepRange::new(2, 5).unwrap();
    assert!(!r.contains(1));
    assert!(r.contains(2));
    assert!(r.contains(4));
    assert!(!r.contains(5));
    assert_eq!(r.offset_of(4), Some(2));
    assert_eq!(r.offset_of(5), None);
}

#[test]
fn step_range_rejects_inverted() {
    assert!(StepRange::new(3, 1).is_err());
    assert!(StepRange::new(3, 3).unwrap().is_empty());
}

#[test]
fn from_start_saturates() {
    let r = StepRange::from_start(u32::MAX - 1, 5);
    assert_eq!(r.end, u32::MAX);
    assert_eq!(StepRange::from_start(4, 2).len_steps(), 2);
}

#[test]
fn rounding_matches_display_convention() {
    assert_eq!(round_to(12.345, 1), 12.3);
    assert_eq!(round_to(0.456, 2), 0.46);
    assert_eq!(round_to(44.5, 0), 45.0);
}

#[test]
fn percent_clamp_handles_nan() {
    assert_eq!(clamp_percent(-4.0), 0.0);
    assert_eq!(clamp_percent(140.0), 100.0);
    assert_eq!(clamp_percent(f64::NAN), 0.0);
    assert_eq!(clamp_percent(33.0), 33.0);
}
