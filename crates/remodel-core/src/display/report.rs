//! Point-in-time report of a session for terminal output.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::{
    artifacts::Slot,
    display::collections::Materials,
    models::{Plan, SubstepKey},
    orchestrator::SequenceState,
    session::SessionState,
};

/// Where one step's visual stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisualStatus {
    Ready,
    Generating,
    Failed(String),
    Pending,
}

impl VisualStatus {
    pub fn with_icon(&self) -> String {
        match self {
            VisualStatus::Ready => "✓ visual ready".to_string(),
            VisualStatus::Generating => "⟳ generating".to_string(),
            VisualStatus::Failed(message) => format!("✗ failed: {message}"),
            VisualStatus::Pending => "○ pending".to_string(),
        }
    }
}

/// Owned copy of everything worth printing about a session.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub plan: Option<Plan>,
    pub sequence: SequenceState,
    pub visuals: Vec<(u32, VisualStatus)>,
    pub completed: Vec<SubstepKey>,
    /// Checked items and total items across all steps
    pub checklist: (usize, usize),
    pub variants: String,
    pub narration: String,
    pub video: String,
    pub cached_materials: usize,
}

impl SessionReport {
    pub fn capture(state: &SessionState, sequence: SequenceState) -> Self {
        let artifacts = state.artifacts();
        let plan = state.plan().cloned();

        let visuals = plan
            .iter()
            .flat_map(|plan| &plan.steps)
            .map(|step| {
                let n = step.step_number;
                let status = if artifacts.step_visual(n).is_some() {
                    VisualStatus::Ready
                } else if state.in_flight() == Some(n) {
                    VisualStatus::Generating
                } else if let Some(message) = artifacts.step_error(n) {
                    VisualStatus::Failed(message.to_string())
                } else {
                    VisualStatus::Pending
                };
                (n, status)
            })
            .collect();

        let completed = plan
            .iter()
            .flat_map(|plan| plan.steps.iter().enumerate())
            .flat_map(|(step_index, step)| {
                (0..step.substeps.len()).map(move |i| SubstepKey::new(step_index, i))
            })
            .filter(|key| artifacts.is_completed(*key))
            .collect();

        let checklist = plan.as_ref().map_or((0, 0), |plan| {
            plan.steps
                .iter()
                .enumerate()
                .fold((0, 0), |(done, total), (step_index, step)| {
                    (
                        done + artifacts.completed_in_step(step_index),
                        total + step.substeps.len(),
                    )
                })
        });

        let variants = describe(artifacts.variants(), |set| {
            if set.is_empty() {
                "none rendered".to_string()
            } else {
                set.keys().cloned().collect::<Vec<_>>().join(", ")
            }
        });
        let narration = describe(artifacts.summary_audio(), |clip| {
            format!("ready ({:.1}s)", clip.duration().as_secs_f64())
        });
        let video = describe(artifacts.tour_video(), |clip| {
            format!("ready ({} KiB)", clip.bytes.len() / 1024)
        });

        Self {
            plan,
            sequence,
            visuals,
            completed,
            checklist,
            variants,
            narration,
            video,
            cached_materials: artifacts.cached_material_count(),
        }
    }
}

fn describe<T>(slot: &Slot<T>, ready: impl FnOnce(&T) -> String) -> String {
    match slot {
        Slot::Empty => "not requested".to_string(),
        Slot::Loading => "generating".to_string(),
        Slot::Ready(value) => ready(value),
        Slot::Failed(message) => format!("failed: {message}"),
    }
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(plan) = &self.plan else {
            return writeln!(f, "No plan in this session.");
        };

        writeln!(f, "# {}", plan.title)?;
        writeln!(f)?;
        writeln!(f, "- Status: {}", self.sequence)?;
        if !plan.style_summary.is_empty() {
            writeln!(f, "- Style: {}", plan.style_summary)?;
        }
        writeln!(f, "- Created: {}", LocalDateTime::new(&plan.created_at))?;
        let (done, total) = self.checklist;
        writeln!(f, "- Checklist: {done} of {total} done")?;

        writeln!(f, "\n## Steps")?;
        writeln!(f)?;
        for (step_index, step) in plan.steps.iter().enumerate() {
            step.fmt_body(f)?;
            if let Some((_, status)) = self.visuals.iter().find(|(n, _)| *n == step.step_number) {
                writeln!(f, "*{}*", status.with_icon())?;
                writeln!(f)?;
            }
            for (i, substep) in step.substeps.iter().enumerate() {
                let done = self.completed.contains(&SubstepKey::new(step_index, i));
                writeln!(f, "- [{}] {substep}", if done { "x" } else { " " })?;
            }
            if !step.substeps.is_empty() {
                writeln!(f)?;
            }
        }

        writeln!(f, "## Materials")?;
        writeln!(f)?;
        write!(f, "{}", Materials(&plan.materials))?;

        writeln!(f, "## Media")?;
        writeln!(f)?;
        writeln!(f, "- Variants: {}", self.variants)?;
        writeln!(f, "- Narration: {}", self.narration)?;
        writeln!(f, "- Video tour: {}", self.video)?;
        writeln!(f, "- Product thumbnails cached: {}", self.cached_materials)
    }
}
