use crate::{
    animation::{
        accumulate::base_state_entering_step,
        state::{VisualState, interpolate},
    },
    config::EditorConfig,
    editor::history::EditHistory,
    foundation::{
        core::{BlockId, SceneId, clamp_percent},
        error::{WeaveError, WeaveResult},
    },
    project::{
        catalog::{CatalogAsset, PaletteItem, default_palette},
        document::ProjectDocument,
        model::{Block, BlockKind, BlockParams, Keyframe, KeyframeField, Scene, StepAnim},
        store::ProjectStore,
    },
};

/// Timeline zoom bounds.
pub const MIN_ZOOM: f64 = 0.2;
pub const MAX_ZOOM: f64 = 3.0;

/// Editing state around one project document.
///
/// Selection, clipboard, zoom and the inspector cursor live here and never reach the
/// player. Every mutation is atomic: it either applies fully and records one undo entry,
/// or fails and leaves the document untouched.
#[derive(Debug)]
pub struct EditorSession {
    doc: ProjectDocument,
    history: EditHistory,
    config: EditorConfig,
    selected_block: Option<BlockId>,
    inspector_step_offset: u32,
    selected_keyframe: Option<usize>,
    clipboard: Option<Block>,
    zoom: f64,
    /// Lowest block id never handed out; ids stay fresh across deletes and undo.
    next_id: u64,
}

impl EditorSession {
    pub fn new(doc: ProjectDocument, config: EditorConfig) -> Self {
        Self {
            next_id: doc.next_block_id().0,
            doc,
            history: EditHistory::new(config.history_depth),
            config,
            selected_block: None,
            inspector_step_offset: 0,
            selected_keyframe: None,
            clipboard: None,
            zoom: 1.0,
        }
    }

    pub fn document(&self) -> &ProjectDocument {
        &self.doc
    }

    pub fn into_document(self) -> ProjectDocument {
        self.doc
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn active_scene_id(&self) -> &SceneId {
        &self.doc.active_scene_id
    }

    // ---- selection & view -------------------------------------------------------------

    pub fn selected_block_id(&self) -> Option<BlockId> {
        self.selected_block
    }

    pub fn selected_block(&self) -> Option<&Block> {
        self.doc.active_scene()?.block(self.selected_block?)
    }

    /// Select a block of the active scene, or clear the selection with `None`.
    pub fn select_block(&mut self, id: Option<BlockId>) -> WeaveResult<()> {
        if let Some(id) = id {
            if self.doc.active_scene().and_then(|s| s.block(id)).is_none() {
                return Err(WeaveError::validation(format!(
                    "block {id} is not in scene '{}'",
                    self.doc.active_scene_id
                )));
            }
        }
        self.selected_block = id;
        self.selected_keyframe = None;
        self.clamp_inspector();
        Ok(())
    }

    /// Step offset the inspector edits; always below the selected block's duration.
    pub fn inspector_step_offset(&self) -> u32 {
        self.inspector_step_offset
    }

    /// Move the inspector cursor; an offset outside the selected block resets to 0.
    pub fn set_inspector_step(&mut self, offset: u32) {
        self.inspector_step_offset = offset;
        self.selected_keyframe = None;
        self.clamp_inspector();
    }

    pub fn selected_keyframe(&self) -> Option<usize> {
        self.selected_keyframe
    }

    /// Select a keyframe of the inspected step; unknown indices clear the selection.
    pub fn select_keyframe(&mut self, index: Option<usize>) {
        let len = self.inspected_step().map_or(0, |s| s.keyframes.len());
        self.selected_keyframe = index.filter(|i| *i < len);
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    pub fn zoom_by(&mut self, delta: f64) {
        self.set_zoom(self.zoom + delta);
    }

    fn clamp_inspector(&mut self) {
        let duration = self.selected_block().map_or(1, |b| b.duration);
        if self.inspector_step_offset >= duration {
            self.inspector_step_offset = 0;
            self.selected_keyframe = None;
        }
    }

    fn clear_selection(&mut self) {
        self.selected_block = None;
        self.selected_keyframe = None;
        self.inspector_step_offset = 0;
    }

    // ---- history ----------------------------------------------------------------------

    /// Record the current document as an undo point.
    pub fn save_state(&mut self, label: &str) {
        self.history.record(label, self.doc.clone());
    }

    /// Revert the last edit. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.doc.clone()) {
            Some(prev) => {
                self.restore(prev);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.doc.clone()) {
            Some(next) => {
                self.restore(next);
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, doc: ProjectDocument) {
        self.doc = doc;
        self.clear_selection();
    }

    /// Apply `f` to the document as one undoable edit; on error the document is rolled back.
    fn edit<T>(
        &mut self,
        label: &str,
        f: impl FnOnce(&mut ProjectDocument) -> WeaveResult<T>,
    ) -> WeaveResult<T> {
        let before = self.doc.clone();
        match f(&mut self.doc) {
            Ok(out) => {
                self.history.record(label, before);
                Ok(out)
            }
            Err(err) => {
                tracing::debug!(label, error = %err, "edit rejected");
                self.doc = before;
                Err(err)
            }
        }
    }

    // ---- blocks -----------------------------------------------------------------------

    /// Drop a fresh block of `kind` with default params onto the active scene and select it.
    pub fn add_block(&mut self, kind: BlockKind, start: u32, track: u32) -> WeaveResult<BlockId> {
        self.insert_block("add block", |id| Block::new(id, kind, start, track))
    }

    /// Drop a palette template onto the active scene and select it.
    pub fn add_from_palette(
        &mut self,
        item: &PaletteItem,
        start: u32,
        track: u32,
    ) -> WeaveResult<BlockId> {
        self.insert_block("add block", |id| item.instantiate(id, start, track))
    }

    fn insert_block(&mut self, label: &str, make: impl FnOnce(BlockId) -> Block) -> WeaveResult<BlockId> {
        let id = self.fresh_block_id();
        let block = make(id);
        self.edit(label, |doc| {
            active_scene(doc)?.blocks.push(block);
            Ok(())
        })?;
        self.next_id = id.0 + 1;
        tracing::debug!(block = %id, "block added");
        self.select_block(Some(id))?;
        Ok(id)
    }

    fn fresh_block_id(&self) -> BlockId {
        BlockId(self.next_id.max(self.doc.next_block_id().0))
    }

    pub fn delete_block(&mut self, id: BlockId) -> WeaveResult<Block> {
        let removed = self.edit("delete block", |doc| {
            let scene = active_scene(doc)?;
            let idx = scene
                .blocks
                .iter()
                .position(|b| b.id == id)
                .ok_or_else(|| unknown_block(id))?;
            Ok(scene.blocks.remove(idx))
        })?;
        if self.selected_block == Some(id) {
            self.clear_selection();
        }
        Ok(removed)
    }

    pub fn delete_selected(&mut self) -> WeaveResult<Block> {
        let id = self
            .selected_block
            .ok_or_else(|| WeaveError::validation("no block selected"))?;
        self.delete_block(id)
    }

    /// Timeline drag: place the block at `start` on `track`.
    pub fn move_block(&mut self, id: BlockId, start: u32, track: u32) -> WeaveResult<()> {
        self.edit("move block", |doc| {
            let block = block_mut(doc, id)?;
            block.start = start;
            block.track = track;
            Ok(())
        })
    }

    /// Timeline resize; durations below 1 are raised to 1.
    pub fn resize_block(&mut self, id: BlockId, duration: u32) -> WeaveResult<()> {
        self.edit("resize block", |doc| {
            block_mut(doc, id)?.duration = duration.max(1);
            Ok(())
        })?;
        self.clamp_inspector();
        Ok(())
    }

    pub fn rename_block(&mut self, id: BlockId, name: &str) -> WeaveResult<()> {
        self.edit("rename block", |doc| {
            block_mut(doc, id)?.name = name.to_string();
            Ok(())
        })
    }

    /// Replace a block's params; the block kind cannot change.
    pub fn update_params(&mut self, id: BlockId, params: BlockParams) -> WeaveResult<()> {
        self.edit("edit params", |doc| {
            let block = block_mut(doc, id)?;
            if block.kind() != params.kind() {
                return Err(WeaveError::validation(format!(
                    "block {id} is a {} block, got {} params",
                    block.kind().as_str(),
                    params.kind().as_str()
                )));
            }
            block.params = params;
            Ok(())
        })
    }

    // ---- clipboard --------------------------------------------------------------------

    /// Copy the selected block. Returns `false` when nothing is selected.
    pub fn copy_selected(&mut self) -> bool {
        match self.selected_block().cloned() {
            Some(block) => {
                self.clipboard = Some(block);
                true
            }
            None => false,
        }
    }

    pub fn clipboard(&self) -> Option<&Block> {
        self.clipboard.as_ref()
    }

    /// Paste the clipboard into the active scene with a fresh id, `pasted_step_offset`
    /// steps after the copied block. Returns `Ok(None)` when the clipboard is empty.
    pub fn paste(&mut self) -> WeaveResult<Option<BlockId>> {
        let Some(copied) = self.clipboard.clone() else {
            return Ok(None);
        };
        let offset = self.config.pasted_step_offset;
        self.insert_block("paste block", |id| Block {
            id,
            start: copied.start.saturating_add(offset),
            ..copied
        })
        .map(Some)
    }

    // ---- scenes -----------------------------------------------------------------------

    /// Create an empty scene named "New Scene" and make it active.
    pub fn add_scene(&mut self) -> WeaveResult<SceneId> {
        let id = self.fresh_scene_id();
        self.edit("add scene", |doc| {
            doc.scenes.insert(id.clone(), Scene::new(id.clone(), "New Scene"));
            Ok(())
        })?;
        self.switch_scene(&id)?;
        Ok(id)
    }

    fn fresh_scene_id(&self) -> SceneId {
        let mut n = self.doc.scenes.len() + 1;
        loop {
            let id = SceneId::new(format!("scene_{n}"));
            if !self.doc.scenes.contains_key(&id) {
                return id;
            }
            n += 1;
        }
    }

    /// Make `id` the active scene. Not an undoable edit.
    pub fn switch_scene(&mut self, id: &SceneId) -> WeaveResult<()> {
        if !self.doc.scenes.contains_key(id) {
            return Err(unknown_scene(id));
        }
        self.doc.active_scene_id = id.clone();
        self.clear_selection();
        Ok(())
    }

    pub fn rename_scene(&mut self, id: &SceneId, name: &str) -> WeaveResult<()> {
        self.edit("rename scene", |doc| {
            doc.scene_mut(id).ok_or_else(|| unknown_scene(id))?.name = name.to_string();
            Ok(())
        })
    }

    /// Delete a scene. The last remaining scene cannot be deleted; deleting the active one
    /// activates the first remaining scene.
    pub fn delete_scene(&mut self, id: &SceneId) -> WeaveResult<()> {
        let was_active = self.doc.active_scene_id == *id;
        self.edit("delete scene", |doc| {
            if !doc.scenes.contains_key(id) {
                return Err(unknown_scene(id));
            }
            if doc.scenes.len() <= 1 {
                return Err(WeaveError::validation("cannot delete the only scene"));
            }
            doc.scenes.remove(id);
            if doc.active_scene_id == *id {
                if let Some(first) = doc.scenes.keys().next() {
                    doc.active_scene_id = first.clone();
                }
            }
            Ok(())
        })?;
        if was_active {
            self.clear_selection();
        }
        Ok(())
    }

    // ---- steps & keyframes ------------------------------------------------------------

    /// Step data under the inspector cursor, if authored.
    pub fn inspected_step(&self) -> Option<&StepAnim> {
        self.selected_block()?.step_anim(self.inspector_step_offset)
    }

    /// Interpolated state of the inspected step at percent `t`, for scrub previews.
    pub fn preview_state(&self, t: f64) -> Option<VisualState> {
        let block = self.selected_block()?;
        if !block.kind().is_animated() {
            return None;
        }
        let offset = self.inspector_step_offset;
        let base = base_state_entering_step(block, offset);
        let keyframes = block.step_anim(offset).map_or(&[][..], |s| &s.keyframes[..]);
        Some(interpolate(&base, keyframes, clamp_percent(t)))
    }

    /// Insert a keyframe at `t` capturing the state currently interpolated there, and
    /// select it. Creates the step's data on first use.
    pub fn add_keyframe(&mut self, t: f64) -> WeaveResult<usize> {
        let t = clamp_percent(t);
        let (id, offset) = self.inspected_target()?;
        let index = self.edit("add keyframe", |doc| {
            let block = block_mut(doc, id)?;
            let base = base_state_entering_step(block, offset);
            let authored = block.step_anim(offset).map_or(&[][..], |s| &s.keyframes[..]);
            let state = interpolate(&base, authored, t);
            let keyframe = if block.kind() == BlockKind::Overlay {
                let mut kf = Keyframe::at(t);
                kf.set(KeyframeField::V, state.v);
                kf
            } else {
                state.to_keyframe(t)
            };
            let step = ensure_step(block, offset)?;
            step.keyframes.push(keyframe);
            Ok(step.keyframes.len() - 1)
        })?;
        self.selected_keyframe = Some(index);
        Ok(index)
    }

    /// Set or clear one field of a keyframe in the inspected step.
    pub fn update_keyframe(
        &mut self,
        index: usize,
        field: KeyframeField,
        value: Option<f64>,
    ) -> WeaveResult<()> {
        let (id, offset) = self.inspected_target()?;
        self.edit("edit keyframe", |doc| {
            keyframe_mut(doc, id, offset, index)?.set(field, value);
            Ok(())
        })
    }

    /// Move a keyframe of the inspected step to percent `t`.
    pub fn set_keyframe_time(&mut self, index: usize, t: f64) -> WeaveResult<()> {
        let (id, offset) = self.inspected_target()?;
        self.edit("move keyframe", |doc| {
            keyframe_mut(doc, id, offset, index)?.t = clamp_percent(t);
            Ok(())
        })
    }

    pub fn delete_keyframe(&mut self, index: usize) -> WeaveResult<Keyframe> {
        let (id, offset) = self.inspected_target()?;
        let removed = self.edit("delete keyframe", |doc| {
            let step = block_mut(doc, id)?
                .params
                .steps_mut()
                .and_then(|steps| steps.get_mut(&offset))
                .ok_or_else(|| unknown_keyframe(index))?;
            if index >= step.keyframes.len() {
                return Err(unknown_keyframe(index));
            }
            Ok(step.keyframes.remove(index))
        })?;
        self.selected_keyframe = None;
        Ok(removed)
    }

    /// Wall-clock length of the inspected step, in seconds.
    pub fn set_step_duration(&mut self, secs: f64) -> WeaveResult<()> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(WeaveError::validation(format!(
                "step duration must be a non-negative number, got {secs}"
            )));
        }
        self.edit_step("edit step", |step| step.duration = secs)
    }

    pub fn set_step_loop(&mut self, looping: bool) -> WeaveResult<()> {
        self.edit_step("edit step", |step| step.looping = looping)
    }

    /// CSS easing of the inspected step; unknown keywords play as linear.
    pub fn set_step_easing(&mut self, easing: &str) -> WeaveResult<()> {
        self.edit_step("edit step", |step| step.easing = easing.trim().to_string())
    }

    fn edit_step(&mut self, label: &str, f: impl FnOnce(&mut StepAnim)) -> WeaveResult<()> {
        let (id, offset) = self.inspected_target()?;
        self.edit(label, |doc| {
            f(ensure_step(block_mut(doc, id)?, offset)?);
            Ok(())
        })
    }

    fn inspected_target(&self) -> WeaveResult<(BlockId, u32)> {
        let block = self
            .selected_block()
            .ok_or_else(|| WeaveError::validation("no block selected"))?;
        if !block.kind().is_animated() {
            return Err(WeaveError::validation(format!(
                "{} blocks have no step animations",
                block.kind().as_str()
            )));
        }
        Ok((block.id, self.inspector_step_offset))
    }

    // ---- document-level settings ------------------------------------------------------

    pub fn set_css(&mut self, css: &str) -> WeaveResult<()> {
        self.edit("edit css", |doc| {
            doc.css = css.to_string();
            Ok(())
        })
    }

    /// Palette shown to the user: the project's own entries, or defaults seeded from `assets`.
    pub fn palette(&self, assets: &[CatalogAsset]) -> Vec<PaletteItem> {
        self.doc
            .palette_overrides
            .clone()
            .unwrap_or_else(|| default_palette(assets))
    }

    pub fn set_palette(&mut self, items: Vec<PaletteItem>) -> WeaveResult<()> {
        self.edit("edit palette", |doc| {
            doc.palette_overrides = Some(items);
            Ok(())
        })
    }

    /// Append the selected block as a custom palette template.
    ///
    /// A project still on the default palette first takes the defaults for `assets`. Returns
    /// `Ok(false)` when nothing is selected.
    pub fn copy_to_palette(&mut self, assets: &[CatalogAsset]) -> WeaveResult<bool> {
        let Some(block) = self.selected_block() else {
            return Ok(false);
        };
        let item = PaletteItem {
            name: if block.name.is_empty() {
                block.kind().as_str().to_string()
            } else {
                block.name.clone()
            },
            params: block.params.clone(),
            is_default: false,
        };
        let mut items = self.palette(assets);
        items.push(item);
        self.set_palette(items)?;
        Ok(true)
    }

    /// Replace the project palette with the defaults for `assets`.
    pub fn reset_palette(&mut self, assets: &[CatalogAsset]) -> WeaveResult<()> {
        self.set_palette(default_palette(assets))
    }

    // ---- persistence ------------------------------------------------------------------

    /// Replace the document with the one stored for `episode`.
    ///
    /// Returns `Ok(false)` when nothing is stored. On any failure the session is unchanged.
    #[tracing::instrument(skip(self, store))]
    pub fn load_from(&mut self, store: &dyn ProjectStore, episode: &str) -> WeaveResult<bool> {
        let Some(doc) = store.load(episode)? else {
            tracing::info!("no saved project, keeping current document");
            return Ok(false);
        };
        self.next_id = doc.next_block_id().0;
        self.doc = doc;
        self.history.clear();
        self.clear_selection();
        tracing::info!(scenes = self.doc.scenes.len(), "project loaded");
        Ok(true)
    }

    #[tracing::instrument(skip(self, store))]
    pub fn save_to(&self, store: &mut dyn ProjectStore, episode: &str) -> WeaveResult<()> {
        store.save(episode, &self.doc)
    }
}

fn active_scene(doc: &mut ProjectDocument) -> WeaveResult<&mut Scene> {
    let id = doc.active_scene_id.clone();
    doc.active_scene_mut().ok_or_else(|| unknown_scene(&id))
}

fn block_mut(doc: &mut ProjectDocument, id: BlockId) -> WeaveResult<&mut Block> {
    active_scene(doc)?
        .block_mut(id)
        .ok_or_else(|| unknown_block(id))
}

fn ensure_step(block: &mut Block, offset: u32) -> WeaveResult<&mut StepAnim> {
    let id = block.id;
    let steps = block.params.steps_mut().ok_or_else(|| {
        WeaveError::validation(format!("block {id} has no step animations"))
    })?;
    Ok(steps.entry(offset).or_insert_with(StepAnim::authored_default))
}

fn keyframe_mut(
    doc: &mut ProjectDocument,
    id: BlockId,
    offset: u32,
    index: usize,
) -> WeaveResult<&mut Keyframe> {
    block_mut(doc, id)?
        .params
        .steps_mut()
        .and_then(|steps| steps.get_mut(&offset))
        .and_then(|step| step.keyframes.get_mut(index))
        .ok_or_else(|| unknown_keyframe(index))
}

fn unknown_block(id: BlockId) -> WeaveError {
    WeaveError::validation(format!("no block {id} in the active scene"))
}

fn unknown_scene(id: &SceneId) -> WeaveError {
    WeaveError::validation(format!("unknown scene '{id}'"))
}

fn unknown_keyframe(index: usize) -> WeaveError {
    WeaveError::validation(format!("no keyframe {index} in the inspected step"))
}

#[cfg(test)]
#[path = "../../tests/unit/editor/session.rs"]
mod tests;
