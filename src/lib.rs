#![forbid(unsafe_code)]

pub mod animation;
pub mod config;
pub mod editor;
pub mod foundation;
pub mod player;
pub mod project;

pub use animation::{
    accumulate::{base_state_entering_step, state_leaving_step},
    driver::{
        Animation, FilterKind, FilterStyle, Renderable, Style, TransformStyle,
        build_filter_animation, build_step_renderable, build_visual_animation,
    },
    ease::Easing,
    state::{VisualState, interpolate, normalize_keyframes, resolve_base_state},
};
pub use config::{EditorConfig, EngineConfig, PlayerConfig};
pub use editor::{history::EditHistory, session::EditorSession};
pub use foundation::{
    core::{BlockId, SceneId},
    error::{WeaveError, WeaveResult},
};
pub use player::{
    runtime::{EventOutcome, IgnoreReason, PlayerStatus, RunId, ScenePlayer},
    sink::{PresentationSink, RecordingSink, SinkCommand, VisualTarget},
};
pub use project::{
    catalog::{CatalogAsset, PaletteItem, default_palette},
    document::{ProjectDocument, load_project, load_project_str},
    model::{Block, BlockKind, BlockParams, Keyframe, KeyframeField, Scene, StepAnim},
    store::{JsonFileStore, MemoryStore, ProjectStore},
};
