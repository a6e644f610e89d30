//! Plan model definition and related functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{Material, Step};
use crate::error::{RemodelError, Result};

/// A complete renovation plan as produced by the planning call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// Title of the project
    pub title: String,

    /// Short overview of the renovation
    #[serde(default)]
    pub description: String,

    /// Summary of the target style, reused as context for product and
    /// variant renders
    #[serde(default)]
    pub style_summary: String,

    /// Free-form cost estimate (e.g. "$2,000 - $3,500")
    #[serde(default)]
    pub estimated_cost: String,

    /// Free-form total duration estimate (e.g. "2 weekends")
    #[serde(default)]
    pub estimated_time: String,

    /// Ordered steps, numbered from 1
    pub steps: Vec<Step>,

    /// Shopping list
    #[serde(default)]
    pub materials: Vec<Material>,

    /// Timestamp when the plan entered the session (UTC)
    #[serde(default = "Timestamp::now")]
    pub created_at: Timestamp,
}

impl Plan {
    /// Checks the numbering invariant and puts steps in ascending order.
    ///
    /// Steps must be numbered exactly `1..=N` once sorted. Anything else
    /// cannot be sequenced and is reported as a planning failure.
    pub fn validated(mut self) -> Result<Self> {
        if self.steps.is_empty() {
            return Err(RemodelError::planning("plan contains no steps"));
        }

        self.steps.sort_by_key(|step| step.step_number);
        for (index, step) in self.steps.iter().enumerate() {
            let expected = index as u32 + 1;
            if step.step_number != expected {
                return Err(RemodelError::planning(format!(
                    "step numbers must be contiguous from 1, expected {expected} but found {}",
                    step.step_number
                )));
            }
        }

        Ok(self)
    }

    /// Number of the first step.
    pub fn first_step_number(&self) -> Option<u32> {
        self.steps.first().map(|step| step.step_number)
    }

    /// Number of the final step, whose visual feeds every derived artifact.
    pub fn final_step_number(&self) -> Option<u32> {
        self.steps.last().map(|step| step.step_number)
    }

    /// Looks up a step by its stable number.
    pub fn step(&self, step_number: u32) -> Option<&Step> {
        self.steps
            .iter()
            .find(|step| step.step_number == step_number)
    }

    /// Instructions of every step before `step_number`, numbered and in
    /// order. `None` for the first step.
    pub fn prior_context(&self, step_number: u32) -> Option<String> {
        let context: Vec<String> = self
            .steps
            .iter()
            .take_while(|step| step.step_number < step_number)
            .map(|step| format!("Step {}: {}", step.step_number, step.instruction.trim()))
            .collect();
        if context.is_empty() {
            None
        } else {
            Some(context.join(" "))
        }
    }
}
