use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of a checklist item: index of the step in the plan and index of
/// the substep within that step, both 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubstepKey {
    pub step_index: usize,
    pub substep_index: usize,
}

impl SubstepKey {
    pub fn new(step_index: usize, substep_index: usize) -> Self {
        Self {
            step_index,
            substep_index,
        }
    }

    /// Same step, different substep.
    pub fn with_substep(self, substep_index: usize) -> Self {
        Self {
            step_index: self.step_index,
            substep_index,
        }
    }
}

impl fmt::Display for SubstepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.step_index, self.substep_index)
    }
}
