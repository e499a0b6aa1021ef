use super::*;
use crate::foundation::core::BlockId;
use crate::project::model::{Block, BlockKind};

fn temp_root(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "sceneweave-store-{tag}-{}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn sample_doc() -> ProjectDocument {
    let mut doc = ProjectDocument::default();
    doc.active_scene_mut()
        .unwrap()
        .blocks
        .push(Block::new(BlockId(1), BlockKind::Dialogue, 0, 0));
    doc
}

#[test]
fn file_store_round_trips() {
    let root = temp_root("roundtrip");
    let mut store = JsonFileStore::new(&root);
    assert!(store.load("ep1").unwrap().is_none());

    store.save("ep1", &sample_doc()).unwrap();
    assert!(root.join("ep1.json").exists());
    assert!(!root.join("ep1.json.tmp").exists());
    assert_eq!(store.load("ep1").unwrap(), Some(sample_doc()));

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn file_store_rejects_path_like_ids() {
    let store = JsonFileStore::new(temp_root("ids"));
    assert!(store.path_for("../escape").is_err());
    assert!(store.path_for("").is_err());
    assert!(store.path_for("ep-7").is_ok());
}

#[test]
fn unreadable_json_is_an_error() {
    let root = temp_root("broken");
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join("bad.json"), "{ nope").unwrap();
    let err = JsonFileStore::new(&root).load("bad").unwrap_err();
    assert!(matches!(err, WeaveError::Serde(_)));
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn memory_store_loads_raw_documents_leniently() {
    let mut store = MemoryStore::new();
    store.insert_raw("legacy", serde_json::json!({ "timeline": [] }));
    let doc = store.load("legacy").unwrap().unwrap();
    assert_eq!(doc, ProjectDocument::default());

    store.save("fresh", &sample_doc()).unwrap();
    assert_eq!(store.raw("fresh").unwrap()["activeSceneId"], "scene_start");
    assert_eq!(store.load("fresh").unwrap(), Some(sample_doc()));
    assert!(store.load("missing").unwrap().is_none());
}
