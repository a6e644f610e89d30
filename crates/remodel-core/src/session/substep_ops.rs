//! Checklist editing for the Session.
//!
//! Checklist items are addressed by `(step index, substep index)`. Edits
//! keep completion flags attached to the item they belong to, and never
//! touch step visuals.

use log::debug;

use super::{Session, SessionState};
use crate::{
    error::{RemodelError, Result},
    models::SubstepKey,
    params::{EditSubstep, MoveDirection},
};

impl Session {
    /// Replaces the text of one checklist item and closes the editor.
    pub async fn edit_substep(&self, params: &EditSubstep) -> Result<()> {
        let mut state = self.lock().await;
        let substeps = substeps_mut(&mut state, params.key)?;
        check_index(substeps.len(), params.key)?;
        substeps[params.key.substep_index] = params.text.clone();
        state.editing = None;
        Ok(())
    }

    /// Removes one checklist item and returns its text.
    ///
    /// Flags of later items in the same step move down with them.
    pub async fn delete_substep(&self, key: SubstepKey) -> Result<String> {
        let mut state = self.lock().await;
        let substeps = substeps_mut(&mut state, key)?;
        check_index(substeps.len(), key)?;
        let removed = substeps.remove(key.substep_index);
        let remaining = substeps.len();

        for index in key.substep_index..remaining {
            let completed = state.artifacts.is_completed(key.with_substep(index + 1));
            state.artifacts.set_completed(key.with_substep(index), completed);
        }
        state.artifacts.set_completed(key.with_substep(remaining), false);

        if state.editing == Some(key) {
            state.editing = None;
        }
        debug!("Deleted substep {key}");
        Ok(removed)
    }

    /// Swaps an item with its neighbour, carrying both completion flags.
    ///
    /// Returns `false` without changing anything at the list boundaries.
    pub async fn move_substep(&self, key: SubstepKey, direction: MoveDirection) -> Result<bool> {
        let mut state = self.lock().await;
        let substeps = substeps_mut(&mut state, key)?;
        check_index(substeps.len(), key)?;

        let Some(target) = direction.target(key.substep_index, substeps.len()) else {
            return Ok(false);
        };
        substeps.swap(key.substep_index, target);
        state.artifacts.swap_completed(key, key.with_substep(target));
        debug!("Moved substep {key} {direction}");
        Ok(true)
    }

    /// Appends a placeholder item to a step and opens it for editing.
    pub async fn add_substep(&self, step_index: usize) -> Result<SubstepKey> {
        let mut state = self.lock().await;
        let placeholder = self.config.substep_placeholder.clone();
        let key = SubstepKey::new(step_index, 0);
        let substeps = substeps_mut(&mut state, key)?;
        substeps.push(placeholder);

        let key = key.with_substep(substeps.len() - 1);
        state.artifacts.set_completed(key, false);
        state.editing = Some(key);
        Ok(key)
    }

    /// Flips the completion flag of one item and returns the new value.
    pub async fn toggle_substep(&self, key: SubstepKey) -> Result<bool> {
        let mut state = self.lock().await;
        let substeps = substeps_mut(&mut state, key)?;
        check_index(substeps.len(), key)?;
        Ok(state.artifacts.toggle_completed(key))
    }

    /// Opens an existing item in the editor.
    pub async fn start_editing(&self, key: SubstepKey) -> Result<()> {
        let mut state = self.lock().await;
        let substeps = substeps_mut(&mut state, key)?;
        check_index(substeps.len(), key)?;
        state.editing = Some(key);
        Ok(())
    }

    pub async fn stop_editing(&self) {
        self.lock().await.editing = None;
    }
}

fn substeps_mut(state: &mut SessionState, key: SubstepKey) -> Result<&mut Vec<String>> {
    state
        .require_plan_mut()?
        .steps
        .get_mut(key.step_index)
        .map(|step| &mut step.substeps)
        .ok_or_else(|| RemodelError::not_found(format!("step index {}", key.step_index)))
}

fn check_index(len: usize, key: SubstepKey) -> Result<()> {
    if key.substep_index < len {
        Ok(())
    } else {
        Err(RemodelError::not_found(format!("substep {key}")))
    }
}
