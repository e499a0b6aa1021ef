use std::fmt;

use crate::foundation::error::{WeaveError, WeaveResult};

/// Stable identifier of a block inside a project.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct BlockId(pub u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a scene; the key of the project's scene map.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct SceneId(pub String);

impl SceneId {
    /// Build a scene id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SceneId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SceneId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Half-open range of discrete timeline steps `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StepRange {
    /// First occupied step.
    pub start: u32,
    /// First step past the range.
    pub end: u32, // exclusive
}

impl StepRange {
    /// Build a range; `start` must not exceed `end`.
    pub fn new(start: u32, end: u32) -> WeaveResult<Self> {
        if start > end {
            return Err(WeaveError::validation("StepRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Range covering `duration` steps from `start`.
    pub fn from_start(start: u32, duration: u32) -> Self {
        Self {
            start,
            end: start.saturating_add(duration),
        }
    }

    /// Number of steps covered.
    pub fn len_steps(self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Whether the range covers no steps.
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Whether `step` falls inside `[start, end)`.
    pub fn contains(self, step: u32) -> bool {
        self.start <= step && step < self.end
    }

    /// Offset of `step` relative to the range start, if contained.
    pub fn offset_of(self, step: u32) -> Option<u32> {
        self.contains(step).then(|| step - self.start)
    }
}

/// Round to a fixed number of decimals (display/storage convention for keyframe values).
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Clamp a keyframe percentage into `[0, 100]`; NaN maps to 0.
pub fn clamp_percent(t: f64) -> f64 {
    if t.is_nan() { 0.0 } else { t.clamp(0.0, 100.0) }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
