//! Step model definition and related functionality.

use serde::{Deserialize, Serialize};

use super::Difficulty;

/// One ordered stage of the renovation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Stable 1-based identity of the step
    pub step_number: u32,

    /// Brief title of the step
    pub title: String,

    /// What to do, in a sentence or two
    pub instruction: String,

    /// Checklist items, ordered by the user
    #[serde(default)]
    pub substeps: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_warning: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,

    /// Opaque instruction text for image synthesis
    pub visualization_prompt: String,

    #[serde(default)]
    pub difficulty: Difficulty,

    #[serde(default)]
    pub estimated_time: String,
}
