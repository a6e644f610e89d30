//! Decision logic of the visual consistency pipeline.
//!
//! Everything here is pure: given the plan, the artifact store and the
//! in-flight marker, [`next_action`] names the one thing the session should
//! start next, or nothing. The session calls it after every mutation, which
//! replaces implicit change detection with an explicit driver loop.
//!
//! ```text
//!            ┌──────────── manual regenerate succeeds ───────────┐
//!            ▼                                                   │
//!  Idle ─▶ StepPending(n) ─▶ StepInFlight(n) ─▶ failure ─▶ StepFailed(n)
//!            ▲                    │
//!            └── n+1 missing ◀────┤ success
//!                                 ▼
//!                             Complete ─▶ derived work ─▶ Idle
//! ```

use std::fmt;

use crate::{artifacts::ArtifactStore, config::DerivedFeatures, models::Plan};

/// The next generation the session should dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    GenerateStep(u32),
    GenerateVariants,
    GenerateNarration,
    GenerateVideo,
}

/// Observable state of the step chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    /// No plan, or everything visualized and no derived work pending
    Idle,
    StepPending(u32),
    StepInFlight(u32),
    /// Paused until a manual regenerate of this step succeeds
    StepFailed(u32),
    /// Every step has a visual and derived work is pending or running
    Complete,
}

impl fmt::Display for SequenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceState::Idle => write!(f, "idle"),
            SequenceState::StepPending(n) => write!(f, "step {n} pending"),
            SequenceState::StepInFlight(n) => write!(f, "step {n} generating"),
            SequenceState::StepFailed(n) => write!(f, "step {n} failed"),
            SequenceState::Complete => write!(f, "complete"),
        }
    }
}

/// Picks the next action, if any.
///
/// - nothing while a step is in flight,
/// - otherwise the lowest-numbered step without a visual, unless its last
///   attempt failed (the chain then waits for a manual retry),
/// - once the chain is complete, each enabled derived feature whose slot is
///   still empty, in the order variants, narration, video.
pub fn next_action(
    plan: Option<&Plan>,
    artifacts: &ArtifactStore,
    in_flight: Option<u32>,
    features: &DerivedFeatures,
) -> Option<Action> {
    let plan = plan?;
    if in_flight.is_some() {
        return None;
    }

    if let Some(pending) = artifacts.first_missing_step(plan) {
        return match artifacts.step_error(pending) {
            Some(_) => None,
            None => Some(Action::GenerateStep(pending)),
        };
    }

    next_derived_action(artifacts, features)
}

fn next_derived_action(artifacts: &ArtifactStore, features: &DerivedFeatures) -> Option<Action> {
    if features.variants && artifacts.variants().is_empty() {
        return Some(Action::GenerateVariants);
    }
    if features.narration && artifacts.summary_audio().is_empty() {
        return Some(Action::GenerateNarration);
    }
    if features.video && artifacts.tour_video().is_empty() {
        return Some(Action::GenerateVideo);
    }
    None
}

/// Describes where the chain stands.
pub fn sequence_state(
    plan: Option<&Plan>,
    artifacts: &ArtifactStore,
    in_flight: Option<u32>,
    features: &DerivedFeatures,
) -> SequenceState {
    let Some(plan) = plan else {
        return SequenceState::Idle;
    };
    if let Some(n) = in_flight {
        return SequenceState::StepInFlight(n);
    }

    match artifacts.first_missing_step(plan) {
        Some(n) if artifacts.step_error(n).is_some() => SequenceState::StepFailed(n),
        Some(n) => SequenceState::StepPending(n),
        None => {
            let derived_running = artifacts.variants().is_loading()
                || artifacts.summary_audio().is_loading()
                || artifacts.tour_video().is_loading();
            if derived_running || next_derived_action(artifacts, features).is_some() {
                SequenceState::Complete
            } else {
                SequenceState::Idle
            }
        }
    }
}
