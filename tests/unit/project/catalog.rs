use super::*;
use serde_json::json;

#[test]
fn palette_starts_with_logic_blocks() {
    let items = default_palette(&[]);
    let kinds: Vec<BlockKind> = items.iter().map(PaletteItem::kind).collect();
    assert_eq!(
        kinds,
        vec![
            BlockKind::Dialogue,
            BlockKind::Wait,
            BlockKind::Choice,
            BlockKind::Transition,
            BlockKind::Hide,
            BlockKind::Overlay,
        ]
    );
    assert!(items.iter().all(|i| i.is_default));
}

#[test]
fn assets_seed_prefilled_entries() {
    let items = default_palette(&[
        CatalogAsset::new("Forest Day", AssetKind::Bg, "https://cdn/forest.png"),
        CatalogAsset::new("Hero  Smiling", AssetKind::Sprite, "https://cdn/hero.png"),
        CatalogAsset::new("Theme", AssetKind::Audio, "https://cdn/theme.ogg"),
    ]);
    assert_eq!(items.len(), 9);

    let bg = &items[6];
    assert!(!bg.is_default);
    assert_eq!(bg.params.visual().unwrap().url, "https://cdn/forest.png");

    let sprite = items[7].params.visual().unwrap();
    assert_eq!(sprite.id, "hero_smiling");
    assert_eq!(sprite.y, Some(100.0));

    let BlockParams::Audio(audio) = &items[8].params else {
        panic!("expected audio params");
    };
    assert_eq!(audio.url, "https://cdn/theme.ogg");
    assert!(audio.looping);
}

#[test]
fn sprite_ids_collapse_whitespace() {
    assert_eq!(sprite_element_id("Old  Man\tWalking"), "old_man_walking");
    assert_eq!(sprite_element_id(" Cat"), "_cat");
}

#[test]
fn instantiate_copies_template_params() {
    let items = default_palette(&[CatalogAsset::new("Rain", AssetKind::Video, "rain.mp4")]);
    let block = items[6].instantiate(BlockId(42), 3, 2);
    assert_eq!(block.id, BlockId(42));
    assert_eq!((block.start, block.track, block.duration), (3, 2, 1));
    assert_eq!(block.name, "Rain");
    assert_eq!(block.kind(), BlockKind::Video);
}

#[test]
fn palette_items_use_the_document_shape() {
    let item = &default_palette(&[])[0];
    let v = serde_json::to_value(item).unwrap();
    assert_eq!(v["type"], "dialogue");
    assert_eq!(v["isDefault"], true);

    let decoded: PaletteItem = serde_json::from_value(json!({
        "type": "wait", "name": "Pause", "params": { "duration": "2.5" }, "icon": "fa-clock"
    }))
    .unwrap();
    assert_eq!(decoded.kind(), BlockKind::Wait);
    assert!(!decoded.is_default);
}
