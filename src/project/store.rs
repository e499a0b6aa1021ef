use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use serde_json::Value;

use crate::{
    foundation::error::{WeaveError, WeaveResult},
    project::document::{ProjectDocument, load_project, load_project_str},
};

/// Persistence seam for project documents, keyed by episode id.
pub trait ProjectStore {
    /// Load the document saved for `episode`; `Ok(None)` when nothing was saved yet.
    fn load(&self, episode: &str) -> WeaveResult<Option<ProjectDocument>>;

    fn save(&mut self, episode: &str, doc: &ProjectDocument) -> WeaveResult<()>;
}

/// One pretty-printed `<episode>.json` per episode under a root directory.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `episode`. Episode ids must be plain file stems.
    pub fn path_for(&self, episode: &str) -> WeaveResult<PathBuf> {
        let valid = !episode.is_empty()
            && episode != "."
            && episode != ".."
            && !episode.contains(['/', '\\', '\0']);
        if !valid {
            return Err(WeaveError::validation(format!(
                "invalid episode id '{episode}'"
            )));
        }
        Ok(self.root.join(format!("{episode}.json")))
    }
}

impl ProjectStore for JsonFileStore {
    #[tracing::instrument(skip(self), fields(root = %self.root.display()))]
    fn load(&self, episode: &str) -> WeaveResult<Option<ProjectDocument>> {
        let path = self.path_for(episode)?;
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no saved document");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        let doc = load_project_str(&text)
            .map_err(|err| WeaveError::serde(format!("{}: {err}", path.display())))?;
        Ok(Some(doc))
    }

    #[tracing::instrument(skip(self, doc), fields(root = %self.root.display()))]
    fn save(&mut self, episode: &str, doc: &ProjectDocument) -> WeaveResult<()> {
        let path = self.path_for(episode)?;
        std::fs::create_dir_all(&self.root).with_context(|| {
            format!("failed to create project directory '{}'", self.root.display())
        })?;

        // Write beside the target and rename so a failed save never truncates the old file.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, doc.to_json_pretty()?)
            .with_context(|| format!("failed to write '{}'", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("failed to replace '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), "document saved");
        Ok(())
    }
}

/// In-memory store holding serialized documents.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    docs: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed raw JSON for an episode, as an external backend would hold it.
    pub fn insert_raw(&mut self, episode: impl Into<String>, value: Value) {
        self.docs.insert(episode.into(), value);
    }

    pub fn raw(&self, episode: &str) -> Option<&Value> {
        self.docs.get(episode)
    }
}

impl ProjectStore for MemoryStore {
    fn load(&self, episode: &str) -> WeaveResult<Option<ProjectDocument>> {
        self.docs
            .get(episode)
            .map(|value| load_project(value.clone()))
            .transpose()
    }

    fn save(&mut self, episode: &str, doc: &ProjectDocument) -> WeaveResult<()> {
        self.docs
            .insert(episode.to_string(), doc.serialize_project()?);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/store.rs"]
mod tests;
