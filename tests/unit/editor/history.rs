use super::*;
use crate::project::model::Scene;

fn doc_named(name: &str) -> ProjectDocument {
    let mut doc = ProjectDocument::default();
    doc.css = name.to_string();
    doc
}

#[test]
fn undo_then_redo_swaps_states() {
    let mut history = EditHistory::new(10);
    history.record("edit css", doc_named("before"));

    let restored = history.undo(doc_named("after")).unwrap();
    assert_eq!(restored.css, "before");
    assert_eq!(history.redo_label(), Some("edit css"));
    assert!(!history.can_undo());

    let again = history.redo(restored).unwrap();
    assert_eq!(again.css, "after");
    assert_eq!(history.undo_label(), Some("edit css"));
    assert!(!history.can_redo());
}

#[test]
fn recording_clears_redo() {
    let mut history = EditHistory::new(10);
    history.record("a", doc_named("0"));
    let _ = history.undo(doc_named("1"));
    assert!(history.can_redo());

    history.record("b", doc_named("0"));
    assert!(!history.can_redo());
    assert_eq!(history.undo_depth(), 1);
}

#[test]
fn oldest_entries_fall_off() {
    let mut history = EditHistory::new(3);
    for i in 0..5 {
        history.record(&format!("edit {i}"), doc_named(&i.to_string()));
    }
    assert_eq!(history.undo_depth(), 3);

    let mut current = doc_named("5");
    let mut seen = Vec::new();
    while let Some(prev) = history.undo(current.clone()) {
        seen.push(prev.css.clone());
        current = prev;
    }
    assert_eq!(seen, ["4", "3", "2"]);
}

#[test]
fn empty_history_returns_nothing() {
    let mut history = EditHistory::new(0);
    assert_eq!(history.max_depth(), 1);
    assert!(history.undo(ProjectDocument::default()).is_none());
    assert!(history.redo(ProjectDocument::default()).is_none());
}

#[test]
fn snapshots_are_independent_of_later_edits() {
    let mut history = EditHistory::new(5);
    let mut doc = ProjectDocument::default();
    history.record("add scene", doc.clone());
    doc.scenes
        .insert(crate::foundation::core::SceneId::new("b"), Scene::new("b", "B"));

    let restored = history.undo(doc).unwrap();
    assert_eq!(restored.scenes.len(), 1);
}
