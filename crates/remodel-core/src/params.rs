//! Parameter structures for session operations
//!
//! Interface layers (the CLI today) wrap these with their own derives and
//! convert via `From`, so the core stays free of clap:
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐
//! │   CLI Args      │    │  Core Params    │
//! │  (clap derives) │───▶│ (minimal deps)  │
//! └─────────────────┘    └─────────────────┘
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::models::{ImageOptions, SubstepKey};

/// Parameters for manually regenerating one step visual.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegenerateStep {
    pub step_number: u32,
    pub options: ImageOptions,
}

impl RegenerateStep {
    pub fn new(step_number: u32) -> Self {
        Self {
            step_number,
            options: ImageOptions::default(),
        }
    }

    pub fn with_lighting(mut self, lighting: impl Into<String>) -> Self {
        self.options.lighting = Some(lighting.into());
        self
    }

    pub fn with_camera_angle(mut self, camera_angle: impl Into<String>) -> Self {
        self.options.camera_angle = Some(camera_angle.into());
        self
    }
}

/// Parameters for replacing the text of a checklist item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSubstep {
    pub key: SubstepKey,
    pub text: String,
}

/// Which neighbour a checklist item is swapped with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

impl MoveDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveDirection::Up => "up",
            MoveDirection::Down => "down",
        }
    }

    /// Index of the neighbour, or `None` when it would fall off the list.
    pub fn target(&self, index: usize, len: usize) -> Option<usize> {
        match self {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => Some(index + 1).filter(|&target| target < len),
        }
    }
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoveDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(MoveDirection::Up),
            "down" => Ok(MoveDirection::Down),
            _ => Err(format!("Invalid direction: {s}. Valid options: up, down")),
        }
    }
}
