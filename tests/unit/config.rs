use super::*;

#[test]
fn defaults_match_documented_values() {
    let cfg = EngineConfig::default();
    assert_eq!(cfg.player.min_step_secs, 0.1);
    assert!(!cfg.player.auto_advance_dialogue);
    assert_eq!(cfg.editor.history_depth, 50);
    assert_eq!(cfg.editor.pasted_step_offset, 1);
}

#[test]
fn partial_json_fills_in_defaults() {
    let cfg = EngineConfig::from_json_str(r#"{ "player": { "auto_advance_dialogue": true } }"#)
        .unwrap();
    assert!(cfg.player.auto_advance_dialogue);
    assert_eq!(cfg.player.min_step_secs, 0.1);
    assert_eq!(cfg.editor, EditorConfig::default());
}

#[test]
fn invalid_values_are_rejected() {
    assert!(EngineConfig::from_json_str(r#"{ "player": { "min_step_secs": -1 } }"#).is_err());
    assert!(EngineConfig::from_json_str(r#"{ "player": { "min_step_secs": 0 } }"#).is_err());
    assert!(EngineConfig::from_json_str(r#"{ "player": { "min_step_secs": 0.01 } }"#).is_ok());
    assert!(EngineConfig::from_json_str(r#"{ "editor": { "history_depth": 0 } }"#).is_err());
    assert!(EngineConfig::from_json_str("[]").is_err());
}

#[test]
fn missing_file_reports_path() {
    let err = EngineConfig::from_path(Path::new("/definitely/not/here.json")).unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here.json"));
}
