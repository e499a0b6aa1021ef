use serde_json::Value;

use crate::{
    foundation::core::BlockId,
    project::{
        lenient,
        model::{Block, BlockKind, BlockParams},
    },
};

/// Media kinds the asset catalog serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Bg,
    Sprite,
    Audio,
    Video,
}

impl AssetKind {
    pub fn block_kind(self) -> BlockKind {
        match self {
            Self::Bg => BlockKind::Bg,
            Self::Sprite => BlockKind::Sprite,
            Self::Audio => BlockKind::Audio,
            Self::Video => BlockKind::Video,
        }
    }
}

/// One uploaded asset as listed by the external catalog.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CatalogAsset {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    #[serde(default, deserialize_with = "lenient::text")]
    pub url: String,
}

impl CatalogAsset {
    pub fn new(name: impl Into<String>, kind: AssetKind, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            url: url.into(),
        }
    }
}

/// A block template offered by the palette.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "RawPaletteItem", into = "RawPaletteItem")]
pub struct PaletteItem {
    pub name: String,
    pub params: BlockParams,
    /// Built-in logic entry rather than one seeded from an asset.
    pub is_default: bool,
}

impl PaletteItem {
    pub fn kind(&self) -> BlockKind {
        self.params.kind()
    }

    /// A fresh timeline block from this template.
    pub fn instantiate(&self, id: BlockId, start: u32, track: u32) -> Block {
        Block::new(id, self.kind(), start, track)
            .with_name(self.name.clone())
            .with_params(self.params.clone())
    }

    fn logic(kind: BlockKind, name: &str) -> Self {
        Self {
            name: name.to_string(),
            params: BlockParams::default_for(kind),
            is_default: true,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct RawPaletteItem {
    #[serde(rename = "type")]
    kind: BlockKind,
    #[serde(default, deserialize_with = "lenient::text")]
    name: String,
    #[serde(default)]
    params: Value,
    #[serde(rename = "isDefault", default, deserialize_with = "lenient::flag")]
    is_default: bool,
}

impl From<RawPaletteItem> for PaletteItem {
    fn from(raw: RawPaletteItem) -> Self {
        Self {
            name: raw.name,
            params: BlockParams::from_value(raw.kind, raw.params),
            is_default: raw.is_default,
        }
    }
}

impl From<PaletteItem> for RawPaletteItem {
    fn from(item: PaletteItem) -> Self {
        Self {
            kind: item.kind(),
            params: item.params.to_value(),
            name: item.name,
            is_default: item.is_default,
        }
    }
}

/// Sprite element id derived from an asset name: whitespace runs become `_`, then lowercased.
pub fn sprite_element_id(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_space = false;
    for ch in name.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else {
            out.extend(ch.to_lowercase());
            in_space = false;
        }
    }
    out
}

/// Built-in logic entries followed by one entry per catalog asset.
pub fn default_palette(assets: &[CatalogAsset]) -> Vec<PaletteItem> {
    let mut items = vec![
        PaletteItem::logic(BlockKind::Dialogue, "Dialogue"),
        PaletteItem::logic(BlockKind::Wait, "Wait"),
        PaletteItem::logic(BlockKind::Choice, "Choice"),
        PaletteItem::logic(BlockKind::Transition, "Change Scene"),
        PaletteItem::logic(BlockKind::Hide, "Hide UI"),
        PaletteItem::logic(BlockKind::Overlay, "Filter"),
    ];

    items.extend(assets.iter().map(|asset| {
        let mut params = BlockParams::default_for(asset.kind.block_kind());
        match &mut params {
            BlockParams::Bg(p) => p.url = asset.url.clone(),
            BlockParams::Sprite(p) => {
                p.url = asset.url.clone();
                p.id = sprite_element_id(&asset.name);
            }
            BlockParams::Audio(p) | BlockParams::Video(p) => p.url = asset.url.clone(),
            _ => {}
        }
        PaletteItem {
            name: asset.name.clone(),
            params,
            is_default: false,
        }
    }));
    items
}

#[cfg(test)]
#[path = "../../tests/unit/project/catalog.rs"]
mod tests;
