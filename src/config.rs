use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{WeaveError, WeaveResult};

/// Scene-player tunables.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Pause of a step with no blockers and no animation, in seconds.
    pub min_step_secs: f64,
    /// Resolve dialogue as soon as typing finishes instead of waiting for a click.
    pub auto_advance_dialogue: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            min_step_secs: 0.1,
            auto_advance_dialogue: false,
        }
    }
}

/// Editor-session tunables.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of undo snapshots kept.
    pub history_depth: usize,
    /// Steps between a copied block and its pasted copy.
    pub pasted_step_offset: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_depth: 50,
            pasted_step_offset: 1,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub player: PlayerConfig,
    pub editor: EditorConfig,
}

impl EngineConfig {
    /// Read a JSON config file; missing sections and fields take their defaults.
    pub fn from_path(path: &Path) -> WeaveResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(src: &str) -> WeaveResult<Self> {
        let cfg: Self = serde_json::from_str(src)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> WeaveResult<()> {
        if !self.player.min_step_secs.is_finite() || self.player.min_step_secs <= 0.0 {
            return Err(WeaveError::validation(
                "player.min_step_secs must be a finite, positive number",
            ));
        }
        if self.editor.history_depth == 0 {
            return Err(WeaveError::validation("editor.history_depth must be >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
