use std::collections::BTreeMap;

use crate::{
    animation::{accumulate::base_state_entering_step, driver::build_step_renderable},
    config::PlayerConfig,
    foundation::{
        core::{BlockId, SceneId},
        error::{WeaveError, WeaveResult},
    },
    player::sink::{MediaKind, PresentationSink, VisualTarget, present},
    project::{
        document::ProjectDocument,
        model::{Block, BlockParams, ChoiceOption, DialogueParams, Scene, StepAnim},
    },
};

/// Scene switches allowed in a row without awaiting anything; guards transition cycles.
const MAX_JUMPS_WITHOUT_AWAIT: u32 = 256;

const TIME_EPSILON: f64 = 1e-9;

/// Identifies one playback run; input tagged with an older run is discarded.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct RunId(pub u64);

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PlayerStatus {
    Stopped,
    Running {
        run: RunId,
        scene: SceneId,
        step: u32,
    },
}

/// Result of delivering time or input to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventOutcome {
    Applied,
    Ignored(IgnoreReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    NotRunning,
    /// Input was tagged with a run that has since been stopped or restarted.
    StaleRun,
    /// Nothing is waiting for this kind of event.
    NothingPending,
    InvalidOption,
}

#[derive(Clone, Debug)]
struct DialogueWait {
    block: BlockId,
    speaker: String,
    text: String,
    chars: usize,
    speed_ms: f64,
    elapsed_ms: f64,
    shown: usize,
    resolved: bool,
}

impl DialogueWait {
    fn new(block: BlockId, params: &DialogueParams) -> Self {
        let chars = params.text.chars().count();
        let mut wait = Self {
            block,
            speaker: params.name.clone(),
            text: params.text.clone(),
            chars,
            speed_ms: params.speed,
            elapsed_ms: 0.0,
            shown: 0,
            resolved: false,
        };
        if wait.speed_ms <= 0.0 || !wait.speed_ms.is_finite() {
            wait.shown = chars;
        }
        wait
    }

    fn typed(&self) -> bool {
        self.shown >= self.chars
    }

    fn visible_text(&self) -> String {
        self.text.chars().take(self.shown).collect()
    }

    /// Advance the typing effect; returns the new visible text when it changed.
    fn type_for(&mut self, dt_ms: f64) -> Option<String> {
        if self.typed() {
            return None;
        }
        self.elapsed_ms += dt_ms;
        let due = ((self.elapsed_ms + 1e-6) / self.speed_ms).floor();
        let due = if due >= self.chars as f64 {
            self.chars
        } else {
            due.max(0.0) as usize
        };
        if due > self.shown {
            self.shown = due;
            return Some(self.visible_text());
        }
        None
    }

    fn secs_until_typed(&self) -> f64 {
        ((self.speed_ms * self.chars as f64 - self.elapsed_ms) / 1000.0).max(0.0)
    }
}

#[derive(Clone, Debug)]
struct ChoiceWait {
    block: BlockId,
    options: Vec<ChoiceOption>,
    selected: Option<usize>,
}

impl ChoiceWait {
    fn labels(&self) -> Vec<String> {
        self.options.iter().map(|o| o.text.clone()).collect()
    }

    fn target(&self) -> Option<SceneId> {
        self.options.get(self.selected?)?.target_scene()
    }
}

#[derive(Clone, Debug)]
enum Blocker {
    Dialogue(DialogueWait),
    Choice(ChoiceWait),
    Wait { remaining: f64 },
}

impl Blocker {
    fn is_resolved(&self) -> bool {
        match self {
            Self::Dialogue(d) => d.resolved,
            Self::Choice(c) => c.selected.is_some(),
            Self::Wait { remaining } => *remaining <= TIME_EPSILON,
        }
    }
}

#[derive(Clone, Debug)]
enum Pending {
    /// Step without blockers: wait for its longest animation.
    Timer { remaining: f64 },
    Blockers(Vec<Blocker>),
}

impl Pending {
    fn is_complete(&self) -> bool {
        match self {
            Self::Timer { remaining } => *remaining <= TIME_EPSILON,
            Self::Blockers(blockers) => blockers.iter().all(Blocker::is_resolved),
        }
    }

    /// Target of the first selected choice that branches.
    fn choice_target(&self) -> Option<SceneId> {
        let Self::Blockers(blockers) = self else {
            return None;
        };
        blockers.iter().find_map(|b| match b {
            Blocker::Choice(c) => c.target(),
            _ => None,
        })
    }

    fn current_choice_mut(&mut self) -> Option<&mut ChoiceWait> {
        let Self::Blockers(blockers) = self else {
            return None;
        };
        blockers.iter_mut().find_map(|b| match b {
            Blocker::Choice(c) if c.selected.is_none() => Some(c),
            _ => None,
        })
    }

    fn current_choice(&self) -> Option<&ChoiceWait> {
        let Self::Blockers(blockers) = self else {
            return None;
        };
        blockers.iter().find_map(|b| match b {
            Blocker::Choice(c) if c.selected.is_none() => Some(c),
            _ => None,
        })
    }
}

#[derive(Clone, Debug)]
struct Run {
    id: RunId,
    scenes: BTreeMap<SceneId, Scene>,
    scene: SceneId,
    step: u32,
    pending: Option<Pending>,
}

enum TickOutcome {
    Switch(SceneId),
    Await(Pending),
}

/// Runtime state machine walking a scene's steps against a presentation sink.
///
/// The host drives it: [`ScenePlayer::advance`] moves the virtual clock, and
/// [`ScenePlayer::advance_dialogue`] / [`ScenePlayer::select_choice`] deliver user input.
/// The player keeps its own copy of the scenes; editing the project never touches a run.
#[derive(Debug)]
pub struct ScenePlayer<S: PresentationSink> {
    scenes: BTreeMap<SceneId, Scene>,
    start_scene: SceneId,
    config: PlayerConfig,
    sink: S,
    last_run: u64,
    run: Option<Run>,
}

impl<S: PresentationSink> ScenePlayer<S> {
    pub fn new(doc: &ProjectDocument, config: PlayerConfig, sink: S) -> Self {
        Self {
            scenes: doc.scenes.clone(),
            start_scene: doc.active_scene_id.clone(),
            config,
            sink,
            last_run: 0,
            run: None,
        }
    }

    /// Replace the player's copy of the project. A running playback keeps its snapshot.
    pub fn load(&mut self, doc: &ProjectDocument) {
        self.scenes = doc.scenes.clone();
        self.start_scene = doc.active_scene_id.clone();
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn start_scene(&self) -> &SceneId {
        &self.start_scene
    }

    pub fn status(&self) -> PlayerStatus {
        match &self.run {
            None => PlayerStatus::Stopped,
            Some(run) => PlayerStatus::Running {
                run: run.id,
                scene: run.scene.clone(),
                step: run.step,
            },
        }
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Id of the current run, if playing.
    pub fn run_id(&self) -> Option<RunId> {
        self.run.as_ref().map(|r| r.id)
    }

    /// Start a new run from the start scene at step 0; a running playback is stopped first.
    #[tracing::instrument(skip(self), fields(scene = %self.start_scene))]
    pub fn play(&mut self) -> RunId {
        if self.run.is_some() {
            self.stop();
        }
        self.last_run += 1;
        let id = RunId(self.last_run);
        tracing::info!(run = id.0, "playback started");
        self.sink.reset();
        self.run = Some(Run {
            id,
            scenes: self.scenes.clone(),
            scene: self.start_scene.clone(),
            step: 0,
            pending: None,
        });
        self.drive();
        id
    }

    /// Stop playback; pending timers, typing and choices of the run become no-ops.
    pub fn stop(&mut self) {
        if let Some(run) = self.run.take() {
            tracing::info!(run = run.id.0, scene = %run.scene, step = run.step, "playback stopped");
            clear_stage(&mut self.sink);
        }
    }

    /// Redirect a running playback to `scene` at step 0, or pick the start scene when stopped.
    ///
    /// A running player treats an unknown scene as a dead end and stops. A stopped player
    /// rejects it.
    pub fn goto_scene(&mut self, scene: &SceneId) -> WeaveResult<()> {
        match self.run.as_mut() {
            Some(run) => {
                tracing::info!(from = %run.scene, to = %scene, "scene redirected");
                run.scene = scene.clone();
                run.step = 0;
                run.pending = None;
                clear_stage(&mut self.sink);
                self.drive();
                Ok(())
            }
            None if self.scenes.contains_key(scene) => {
                self.start_scene = scene.clone();
                Ok(())
            }
            None => Err(WeaveError::validation(format!("unknown scene '{scene}'"))),
        }
    }

    /// Move the virtual clock forward by `dt_secs`.
    ///
    /// Time is consumed by the current step's awaits only; it does not carry into the next step.
    pub fn advance(&mut self, dt_secs: f64) -> EventOutcome {
        let dt = if dt_secs.is_finite() {
            dt_secs.max(0.0)
        } else {
            0.0
        };
        let auto_advance = self.config.auto_advance_dialogue;
        let Some(run) = self.run.as_mut() else {
            return EventOutcome::Ignored(IgnoreReason::NotRunning);
        };
        let Some(pending) = run.pending.as_mut() else {
            return EventOutcome::Ignored(IgnoreReason::NothingPending);
        };

        match pending {
            Pending::Timer { remaining } => *remaining -= dt,
            Pending::Blockers(blockers) => {
                for blocker in blockers.iter_mut() {
                    match blocker {
                        Blocker::Wait { remaining } => *remaining -= dt,
                        Blocker::Dialogue(d) => {
                            if let Some(text) = d.type_for(dt * 1000.0) {
                                self.sink.update_dialogue(&text);
                            }
                            if d.typed() && auto_advance {
                                d.resolved = true;
                            }
                        }
                        Blocker::Choice(_) => {}
                    }
                }
            }
        }
        self.drive();
        EventOutcome::Applied
    }

    /// A click on the dialogue box: reveal the full text while typing, otherwise resolve.
    pub fn advance_dialogue(&mut self, run_id: RunId) -> EventOutcome {
        if let Err(reason) = self.check_run(run_id) {
            return EventOutcome::Ignored(reason);
        }
        let Some(Pending::Blockers(blockers)) = self.run.as_mut().and_then(|r| r.pending.as_mut())
        else {
            return EventOutcome::Ignored(IgnoreReason::NothingPending);
        };

        let mut any = false;
        for blocker in blockers.iter_mut() {
            let Blocker::Dialogue(d) = blocker else {
                continue;
            };
            if d.resolved {
                continue;
            }
            any = true;
            if d.typed() {
                tracing::debug!(block = %d.block, "dialogue advanced");
                d.resolved = true;
            } else {
                d.shown = d.chars;
                self.sink.update_dialogue(&d.text);
            }
        }
        if !any {
            return EventOutcome::Ignored(IgnoreReason::NothingPending);
        }
        self.drive();
        EventOutcome::Applied
    }

    /// Pick option `index` of the choice menu currently shown.
    pub fn select_choice(&mut self, run_id: RunId, index: usize) -> EventOutcome {
        if let Err(reason) = self.check_run(run_id) {
            return EventOutcome::Ignored(reason);
        }
        let Some(pending) = self.run.as_mut().and_then(|r| r.pending.as_mut()) else {
            return EventOutcome::Ignored(IgnoreReason::NothingPending);
        };
        let Some(choice) = pending.current_choice_mut() else {
            return EventOutcome::Ignored(IgnoreReason::NothingPending);
        };
        if index >= choice.options.len() {
            tracing::debug!(block = %choice.block, index, "choice index out of range");
            return EventOutcome::Ignored(IgnoreReason::InvalidOption);
        }
        choice.selected = Some(index);
        tracing::debug!(block = %choice.block, index, "choice selected");
        self.sink.hide_choices();

        if let Some(next) = pending.current_choice() {
            self.sink.show_choices(&next.labels());
        }
        self.drive();
        EventOutcome::Applied
    }

    /// Labels of the choice menu awaiting a selection.
    pub fn pending_choice(&self) -> Option<Vec<String>> {
        self.pending()?.current_choice().map(ChoiceWait::labels)
    }

    /// Whether a dialogue is waiting for a click.
    pub fn pending_dialogue(&self) -> bool {
        match self.pending() {
            Some(Pending::Blockers(blockers)) => blockers
                .iter()
                .any(|b| matches!(b, Blocker::Dialogue(d) if !d.resolved)),
            _ => false,
        }
    }

    /// Seconds of virtual time until the next clock-driven event, if any await is clock-driven.
    pub fn time_to_next_event(&self) -> Option<f64> {
        let auto_advance = self.config.auto_advance_dialogue;
        match self.pending()? {
            Pending::Timer { remaining } => Some(remaining.max(0.0)),
            Pending::Blockers(blockers) => blockers
                .iter()
                .filter_map(|b| match b {
                    Blocker::Wait { remaining } if *remaining > TIME_EPSILON => {
                        Some(*remaining)
                    }
                    Blocker::Dialogue(d) if !d.typed() => Some(d.secs_until_typed()),
                    Blocker::Dialogue(d) if auto_advance && !d.resolved => Some(0.0),
                    _ => None,
                })
                .min_by(f64::total_cmp),
        }
    }

    fn pending(&self) -> Option<&Pending> {
        self.run.as_ref()?.pending.as_ref()
    }

    fn check_run(&self, run_id: RunId) -> Result<(), IgnoreReason> {
        match &self.run {
            None => {
                tracing::debug!(run = run_id.0, "input while stopped ignored");
                Err(IgnoreReason::NotRunning)
            }
            Some(run) if run.id != run_id => {
                tracing::debug!(run = run_id.0, current = run.id.0, "stale input ignored");
                Err(IgnoreReason::StaleRun)
            }
            Some(_) => Ok(()),
        }
    }

    fn finish(&mut self) {
        if let Some(run) = self.run.take() {
            tracing::info!(run = run.id.0, scene = %run.scene, "playback finished");
            clear_stage(&mut self.sink);
        }
    }

    /// Resolve completed awaits and tick until the run awaits something or ends.
    fn drive(&mut self) {
        let mut jumps = 0u32;
        loop {
            let Some(run) = self.run.as_mut() else {
                return;
            };

            if let Some(pending) = &run.pending {
                if !pending.is_complete() {
                    return;
                }
                match pending.choice_target() {
                    Some(target) => {
                        tracing::info!(from = %run.scene, to = %target, "choice branches");
                        run.scene = target;
                        run.step = 0;
                        jumps += 1;
                        clear_stage(&mut self.sink);
                    }
                    None => run.step += 1,
                }
                run.pending = None;
            }

            if jumps > MAX_JUMPS_WITHOUT_AWAIT {
                tracing::warn!(scene = %run.scene, "scene switches without any await, stopping");
                self.finish();
                return;
            }

            let Some(scene) = run.scenes.get(&run.scene) else {
                tracing::warn!(scene = %run.scene, "target scene does not exist, playback ends");
                self.finish();
                return;
            };
            if run.step >= scene.end_step() {
                self.finish();
                return;
            }

            match tick(scene, run.step, &mut self.sink, &self.config) {
                TickOutcome::Switch(target) => {
                    run.scene = target;
                    run.step = 0;
                    jumps += 1;
                    clear_stage(&mut self.sink);
                }
                TickOutcome::Await(pending) => {
                    // Awaits that are already complete do not suspend, so they must not
                    // reset the cycle guard.
                    if !pending.is_complete() {
                        jumps = 0;
                    }
                    run.pending = Some(pending);
                }
            }
        }
    }
}

/// Stop any media, then drop the rest of the stage.
fn clear_stage<S: PresentationSink>(sink: &mut S) {
    for kind in MediaKind::ALL {
        sink.stop_media(kind);
    }
    sink.reset();
}

/// Apply one step of `scene` to the sink and report what the step waits for.
#[tracing::instrument(level = "debug", skip(scene, sink, config), fields(scene_id = %scene.id))]
fn tick<S: PresentationSink>(
    scene: &Scene,
    step: u32,
    sink: &mut S,
    config: &PlayerConfig,
) -> TickOutcome {
    sink.clear_filters();

    let mut step_max_secs = 0.0f64;
    for block in scene.active_at(step) {
        if !block.kind().is_animated() {
            continue;
        }
        match apply_step_visual(block, step, sink) {
            Ok(secs) => step_max_secs = step_max_secs.max(secs),
            Err(err) => tracing::warn!(block = %block.id, error = %err, "skipping block this step"),
        }
    }

    let firing: Vec<&Block> = scene.firing_at(step).collect();
    for block in &firing {
        match &block.params {
            BlockParams::Audio(media) => sink.play_media(MediaKind::Audio, media),
            BlockParams::Video(media) => sink.play_media(MediaKind::Video, media),
            BlockParams::Hide => sink.hide_dialogue(),
            _ => {}
        }
    }

    let transition = firing.iter().find_map(|b| match &b.params {
        BlockParams::Transition(p) => p.target_scene(),
        _ => None,
    });
    if let Some(target) = transition {
        tracing::info!(from = %scene.id, to = %target, step, "transition");
        return TickOutcome::Switch(target);
    }

    let mut blockers = Vec::new();
    for block in &firing {
        match &block.params {
            BlockParams::Dialogue(p) => {
                blockers.push(Blocker::Dialogue(DialogueWait::new(block.id, p)));
            }
            BlockParams::Choice(p) => blockers.push(Blocker::Choice(ChoiceWait {
                block: block.id,
                options: p.options.clone(),
                selected: if p.options.is_empty() {
                    tracing::warn!(block = %block.id, "choice without options resolves at once");
                    Some(0)
                } else {
                    None
                },
            })),
            BlockParams::Wait(p) => blockers.push(Blocker::Wait {
                remaining: if p.duration.is_finite() {
                    p.duration.max(0.0)
                } else {
                    0.0
                },
            }),
            _ => {}
        }
    }

    if blockers.is_empty() {
        return TickOutcome::Await(Pending::Timer {
            remaining: step_max_secs.max(config.min_step_secs),
        });
    }

    let has_dialogue = blockers.iter().any(|b| matches!(b, Blocker::Dialogue(_)));
    for blocker in &blockers {
        if let Blocker::Dialogue(d) = blocker {
            sink.show_dialogue(&d.speaker, &d.visible_text());
        }
    }
    let mut pending = Pending::Blockers(blockers);
    if let Some(choice) = pending.current_choice() {
        if !has_dialogue {
            sink.hide_dialogue();
        }
        sink.show_choices(&choice.labels());
    }
    if config.auto_advance_dialogue {
        if let Pending::Blockers(blockers) = &mut pending {
            for blocker in blockers.iter_mut() {
                if let Blocker::Dialogue(d) = blocker {
                    d.resolved = d.typed();
                }
            }
        }
    }
    TickOutcome::Await(pending)
}

/// Apply the renderable for `block` at `step`; returns the step animation's length in seconds.
fn apply_step_visual<S: PresentationSink>(
    block: &Block,
    step: u32,
    sink: &mut S,
) -> WeaveResult<f64> {
    let offset = block
        .relative_step(step)
        .ok_or_else(|| WeaveError::playback(format!("block {} is not active", block.id)))?;
    let Some(target) = VisualTarget::for_block(block) else {
        return Err(WeaveError::playback(format!(
            "block {} names no stage element",
            block.id
        )));
    };

    let base = base_state_entering_step(block, offset);
    let hold = StepAnim::hold();
    let anim = block.step_anim(offset).unwrap_or(&hold);
    let renderable = build_step_renderable(block, anim, &base)?;

    if offset == 0 {
        if let Some(visual) = block.params.visual() {
            sink.attach_source(&target, &visual.url);
        }
    }
    present(sink, &target, &renderable);
    Ok(anim.duration)
}

#[cfg(test)]
#[path = "../../tests/unit/player/runtime.rs"]
mod tests;
