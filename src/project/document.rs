use std::collections::{BTreeMap, HashSet};

use serde_json::Value;

use crate::{
    foundation::{
        core::{BlockId, SceneId},
        error::{WeaveError, WeaveResult},
    },
    project::{
        catalog::PaletteItem,
        model::{Block, BlockParams, Scene, decode_blocks},
    },
};

/// Scene created for new projects and for legacy single-timeline documents.
pub const DEFAULT_SCENE_ID: &str = "scene_start";

/// The persisted project: every scene plus editor-level settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    pub scenes: BTreeMap<SceneId, Scene>,
    pub active_scene_id: SceneId,
    /// Stylesheet applied to the stage UI.
    pub css: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette_overrides: Option<Vec<PaletteItem>>,
}

impl Default for ProjectDocument {
    fn default() -> Self {
        let scene = Scene::new(DEFAULT_SCENE_ID, "Start");
        Self {
            scenes: BTreeMap::from([(scene.id.clone(), scene)]),
            active_scene_id: SceneId::new(DEFAULT_SCENE_ID),
            css: String::new(),
            palette_overrides: None,
        }
    }
}

/// A transition or choice naming a scene that does not exist.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct BrokenReference {
    pub scene: SceneId,
    pub block: BlockId,
    pub target: SceneId,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    #[serde(default)]
    scenes: Option<Value>,
    #[serde(default)]
    active_scene_id: Option<Value>,
    #[serde(default)]
    css: Option<Value>,
    #[serde(default, alias = "palette")]
    palette_overrides: Option<Value>,
    // Pre-scene documents kept a single timeline.
    #[serde(default)]
    timeline: Option<Value>,
}

/// Load a project document leniently.
///
/// Only a non-object root is an error. Undecodable scenes and blocks are skipped, a legacy
/// `timeline` becomes the start scene, the active scene is repaired, the scene set is never
/// left empty and duplicate block ids are reassigned.
#[tracing::instrument(skip(value))]
pub fn load_project(value: Value) -> WeaveResult<ProjectDocument> {
    if !value.is_object() {
        return Err(WeaveError::validation("project document must be a JSON object"));
    }
    let raw: RawDocument = serde_json::from_value(value)?;

    let mut scenes = BTreeMap::new();
    if let Some(Value::Object(entries)) = raw.scenes {
        for (key, mut scene_value) in entries {
            if let Value::Object(map) = &mut scene_value {
                map.entry("id").or_insert_with(|| Value::String(key.clone()));
            }
            match serde_json::from_value::<Scene>(scene_value) {
                Ok(mut scene) => {
                    let id = SceneId::new(key);
                    if scene.id != id {
                        tracing::warn!(key = %id, inner = %scene.id, "scene id differs from its key, using key");
                        scene.id = id.clone();
                    }
                    scenes.insert(id, scene);
                }
                Err(err) => tracing::warn!(key = %key, error = %err, "skipping undecodable scene"),
            }
        }
    } else if let Some(Value::Array(timeline)) = raw.timeline {
        tracing::info!(entries = timeline.len(), "importing legacy single-timeline document");
        let mut scene = Scene::new(DEFAULT_SCENE_ID, "Start");
        scene.blocks = decode_blocks(legacy_timeline_blocks(timeline));
        scenes.insert(scene.id.clone(), scene);
    }

    let mut doc = ProjectDocument {
        scenes,
        active_scene_id: SceneId::new(
            raw.active_scene_id
                .as_ref()
                .and_then(Value::as_str)
                .unwrap_or_default(),
        ),
        css: match raw.css {
            Some(Value::String(css)) => css,
            _ => String::new(),
        },
        palette_overrides: decode_palette(raw.palette_overrides),
    };
    doc.repair();
    Ok(doc)
}

/// Parse and load a project document from JSON text.
pub fn load_project_str(src: &str) -> WeaveResult<ProjectDocument> {
    load_project(serde_json::from_str(src)?)
}

fn decode_palette(value: Option<Value>) -> Option<Vec<PaletteItem>> {
    let Some(Value::Array(items)) = value else {
        return None;
    };
    let decoded = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<PaletteItem>(item) {
            Ok(item) => Some(item),
            Err(err) => {
                tracing::warn!(error = %err, "skipping undecodable palette item");
                None
            }
        })
        .collect();
    Some(decoded)
}

// Flat lists pass through; the oldest format was columns of rows, one step per column.
fn legacy_timeline_blocks(timeline: Vec<Value>) -> Vec<Value> {
    if !timeline.first().is_some_and(Value::is_array) {
        return timeline;
    }
    let mut next_id = 1u64;
    let mut out = Vec::new();
    for (column, cells) in timeline.into_iter().enumerate() {
        let Value::Array(cells) = cells else {
            continue;
        };
        for (row, cell) in cells.into_iter().enumerate() {
            let Value::Object(cell) = cell else {
                continue;
            };
            out.push(serde_json::json!({
                "id": next_id,
                "type": cell.get("type").cloned().unwrap_or(Value::Null),
                "params": cell.get("params").cloned().unwrap_or(Value::Null),
                "start": column,
                "track": row,
                "duration": 1,
            }));
            next_id += 1;
        }
    }
    out
}

impl ProjectDocument {
    /// The document as JSON.
    pub fn serialize_project(&self) -> WeaveResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json_pretty(&self) -> WeaveResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn scene(&self, id: &SceneId) -> Option<&Scene> {
        self.scenes.get(id)
    }

    pub fn scene_mut(&mut self, id: &SceneId) -> Option<&mut Scene> {
        self.scenes.get_mut(id)
    }

    /// The scene being edited.
    pub fn active_scene(&self) -> Option<&Scene> {
        self.scenes.get(&self.active_scene_id)
    }

    pub fn active_scene_mut(&mut self) -> Option<&mut Scene> {
        self.scenes.get_mut(&self.active_scene_id)
    }

    /// Blocks of the active scene; empty if the active id dangles.
    pub fn timeline(&self) -> &[Block] {
        self.active_scene().map_or(&[], |s| s.blocks.as_slice())
    }

    /// Every block in every scene.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.scenes.values().flat_map(|s| s.blocks.iter())
    }

    /// Smallest id greater than every block id in the project.
    pub fn next_block_id(&self) -> BlockId {
        BlockId(self.blocks().map(|b| b.id.0).max().map_or(1, |max| max + 1))
    }

    /// Transition and choice targets that name missing scenes.
    pub fn broken_references(&self) -> Vec<BrokenReference> {
        let mut out = Vec::new();
        for scene in self.scenes.values() {
            for block in &scene.blocks {
                let targets: Vec<SceneId> = match &block.params {
                    BlockParams::Transition(p) => p.target_scene().into_iter().collect(),
                    BlockParams::Choice(p) => {
                        p.options.iter().filter_map(|o| o.target_scene()).collect()
                    }
                    _ => continue,
                };
                out.extend(
                    targets
                        .into_iter()
                        .filter(|t| !self.scenes.contains_key(t))
                        .map(|target| BrokenReference {
                            scene: scene.id.clone(),
                            block: block.id,
                            target,
                        }),
                );
            }
        }
        out
    }

    /// One-line description of a block for timeline labels.
    pub fn block_summary(&self, block: &Block) -> String {
        match &block.params {
            BlockParams::Dialogue(p) => p.text.clone(),
            BlockParams::Transition(p) => match p.target_scene().and_then(|id| self.scene(&id)) {
                Some(scene) => format!("Go to: {}", scene.name),
                None => "No Target".to_string(),
            },
            BlockParams::Wait(p) => format!("{}s", p.duration),
            BlockParams::Choice(p) => format!("{} options", p.options.len()),
            BlockParams::Audio(p) | BlockParams::Video(p) => {
                let file = p
                    .url
                    .rsplit('/')
                    .next()
                    .and_then(|tail| tail.split('?').next())
                    .unwrap_or_default();
                if file.is_empty() {
                    "Media".to_string()
                } else {
                    file.to_string()
                }
            }
            BlockParams::Overlay(p) => format!("{} ({})", p.filter, p.target.as_str()),
            BlockParams::Hide => "Hide Dialogue Box".to_string(),
            BlockParams::Bg(_) | BlockParams::Sprite(_) | BlockParams::Start => String::new(),
        }
    }

    fn repair(&mut self) {
        if self.scenes.is_empty() {
            tracing::warn!("document has no scenes, creating the start scene");
            let fresh = Self::default();
            self.scenes = fresh.scenes;
        }
        if !self.scenes.contains_key(&self.active_scene_id) {
            if let Some(first) = self.scenes.keys().next() {
                if !self.active_scene_id.as_str().is_empty() {
                    tracing::warn!(active = %self.active_scene_id, fallback = %first, "active scene missing");
                }
                self.active_scene_id = first.clone();
            }
        }

        let mut seen = HashSet::new();
        let mut next = self.next_block_id().0;
        for scene in self.scenes.values_mut() {
            for block in &mut scene.blocks {
                if !seen.insert(block.id) {
                    tracing::warn!(scene = %scene.id, id = %block.id, new_id = next, "duplicate block id reassigned");
                    block.id = BlockId(next);
                    seen.insert(block.id);
                    next += 1;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/document.rs"]
mod tests;
