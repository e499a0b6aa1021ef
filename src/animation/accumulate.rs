use crate::{
    animation::state::{VisualState, resolve_base_state},
    project::model::Block,
};

/// State a block holds when it enters relative step `step_offset`.
///
/// Starts at the block's base state and folds in, for every earlier step that has keyframes,
/// the defined fields of the last keyframe in authored order. Authored order matters: a list
/// `[t=80, t=20]` leaves the `t=20` values behind.
pub fn base_state_entering_step(block: &Block, step_offset: u32) -> VisualState {
    let mut state = resolve_base_state(block);
    let Some(steps) = block.params.steps() else {
        return state;
    };
    for anim in steps.range(..step_offset).map(|(_, anim)| anim) {
        if let Some(last) = anim.keyframes.last() {
            state.apply_keyframe(last);
        }
    }
    state
}

/// State a block holds once step `step_offset` has played to completion.
pub fn state_leaving_step(block: &Block, step_offset: u32) -> VisualState {
    let mut state = base_state_entering_step(block, step_offset);
    if let Some(last) = block.step_anim(step_offset).and_then(|a| a.keyframes.last()) {
        state.apply_keyframe(last);
    }
    state
}

#[cfg(test)]
#[path = "../../tests/unit/animation/accumulate.rs"]
mod tests;
