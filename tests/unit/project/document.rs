use super::*;
use crate::project::model::{BlockKind, ChoiceOption, ChoiceParams, TransitionParams};
use serde_json::json;

fn two_scene_doc() -> ProjectDocument {
    let start = Scene::new("scene_start", "Start")
        .with_block(Block::new(BlockId(1), BlockKind::Dialogue, 0, 0))
        .with_block(
            Block::new(BlockId(2), BlockKind::Transition, 1, 0).with_params(
                BlockParams::Transition(TransitionParams {
                    target: "scene_b".to_string(),
                }),
            ),
        );
    let b = Scene::new("scene_b", "B");
    ProjectDocument {
        scenes: BTreeMap::from([(start.id.clone(), start), (b.id.clone(), b)]),
        active_scene_id: SceneId::new("scene_start"),
        css: ".box { color: red }".to_string(),
        palette_overrides: None,
    }
}

#[test]
fn serialize_then_load_is_identity() {
    let doc = two_scene_doc();
    let value = doc.serialize_project().unwrap();
    assert_eq!(value["activeSceneId"], "scene_start");
    assert!(value.get("paletteOverrides").is_none());
    assert_eq!(load_project(value).unwrap(), doc);
}

#[test]
fn non_object_root_is_rejected() {
    assert!(load_project(json!([1, 2, 3])).is_err());
    assert!(load_project_str("{ not json").is_err());
}

#[test]
fn empty_document_gets_a_start_scene() {
    let doc = load_project(json!({})).unwrap();
    assert_eq!(doc, ProjectDocument::default());
    assert!(doc.timeline().is_empty());
}

#[test]
fn missing_active_scene_falls_back_to_first() {
    let doc = load_project(json!({
        "scenes": {
            "b": { "name": "B", "blocks": [] },
            "a": { "id": "a", "name": "A", "blocks": [] }
        },
        "activeSceneId": "gone"
    }))
    .unwrap();
    assert_eq!(doc.active_scene_id, SceneId::new("a"));
    assert_eq!(doc.scene(&SceneId::new("b")).unwrap().id, SceneId::new("b"));
}

#[test]
fn scene_key_wins_over_inner_id() {
    let doc = load_project(json!({
        "scenes": { "real": { "id": "stale", "name": "R" } },
        "activeSceneId": "real"
    }))
    .unwrap();
    assert_eq!(doc.active_scene().unwrap().id, SceneId::new("real"));
}

#[test]
fn legacy_flat_timeline_becomes_start_scene() {
    let doc = load_project(json!({
        "timeline": [
            { "id": 5, "type": "dialogue", "params": { "text": "hi" }, "start": 0, "track": 0, "duration": 1 }
        ],
        "css": "body {}"
    }))
    .unwrap();
    assert_eq!(doc.active_scene_id, SceneId::new(DEFAULT_SCENE_ID));
    assert_eq!(doc.timeline().len(), 1);
    assert_eq!(doc.css, "body {}");
}

#[test]
fn legacy_grid_timeline_maps_columns_to_steps() {
    let doc = load_project(json!({
        "timeline": [
            [ { "type": "bg", "params": {} }, { "type": "dialogue", "params": { "text": "a" } } ],
            [ { "type": "wait", "params": { "duration": 2 } } ]
        ]
    }))
    .unwrap();
    let blocks = doc.timeline();
    assert_eq!(blocks.len(), 3);
    assert_eq!((blocks[1].start, blocks[1].track), (0, 1));
    assert_eq!((blocks[2].start, blocks[2].track), (1, 0));
    assert_eq!(blocks[2].kind(), BlockKind::Wait);
}

#[test]
fn duplicate_block_ids_are_reassigned() {
    let doc = load_project(json!({
        "scenes": {
            "a": { "name": "A", "blocks": [
                { "id": 3, "type": "wait", "start": 0, "track": 0, "duration": 1 },
                { "id": 3, "type": "hide", "start": 1, "track": 0, "duration": 1 }
            ] },
            "b": { "name": "B", "blocks": [
                { "id": 3, "type": "start", "start": 0, "track": 0, "duration": 1 }
            ] }
        }
    }))
    .unwrap();
    let mut ids: Vec<u64> = doc.blocks().map(|b| b.id.0).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![3, 4, 5]);
}

#[test]
fn palette_accepts_legacy_key() {
    let doc = load_project(json!({
        "palette": [
            { "type": "dialogue", "name": "Line", "params": {}, "isDefault": true },
            { "type": "bogus" }
        ]
    }))
    .unwrap();
    let palette = doc.palette_overrides.as_ref().unwrap();
    assert_eq!(palette.len(), 1);
    let value = doc.serialize_project().unwrap();
    assert_eq!(value["paletteOverrides"][0]["name"], "Line");
}

#[test]
fn broken_references_are_listed() {
    let mut doc = two_scene_doc();
    let scene = doc.scene_mut(&SceneId::new("scene_b")).unwrap();
    scene.blocks.push(
        Block::new(BlockId(10), BlockKind::Choice, 0, 0).with_params(BlockParams::Choice(
            ChoiceParams {
                options: vec![
                    ChoiceOption::new("stay", ""),
                    ChoiceOption::new("back", "scene_start"),
                    ChoiceOption::new("lost", "nowhere"),
                ],
            },
        )),
    );
    let broken = doc.broken_references();
    assert_eq!(
        broken,
        vec![BrokenReference {
            scene: SceneId::new("scene_b"),
            block: BlockId(10),
            target: SceneId::new("nowhere"),
        }]
    );
}

#[test]
fn summaries_describe_blocks() {
    let doc = two_scene_doc();
    let transition = doc.timeline()[1].clone();
    assert_eq!(doc.block_summary(&transition), "Go to: B");

    let overlay = Block::new(BlockId(3), BlockKind::Overlay, 0, 0);
    assert_eq!(doc.block_summary(&overlay), "brightness (scene)");

    let mut audio = Block::new(BlockId(4), BlockKind::Audio, 0, 0);
    if let BlockParams::Audio(p) = &mut audio.params {
        p.url = "https://cdn.example/music/theme.ogg?sig=abc".to_string();
    }
    assert_eq!(doc.block_summary(&audio), "theme.ogg");

    let empty_audio = Block::new(BlockId(5), BlockKind::Audio, 0, 0);
    assert_eq!(doc.block_summary(&empty_audio), "Media");
}

#[test]
fn next_block_id_exceeds_every_id() {
    assert_eq!(two_scene_doc().next_block_id(), BlockId(3));
    assert_eq!(ProjectDocument::default().next_block_id(), BlockId(1));
}
