//! Keyed storage for everything generated during a session.
//!
//! The store enforces the visual chain invariants on every write:
//!
//! - step visuals never have gaps,
//! - rewriting step `n` drops every visual after `n`,
//! - any visual change clears the artifacts derived from the final visual
//!   (variants, narration audio, video tour).
//!
//! Only the session writes to the store; readers get shared references.

use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::models::{AudioClip, Image, Plan, SubstepKey, VideoClip};

/// Lifecycle of one single-flight generation key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Slot<T> {
    #[default]
    Empty,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Slot<T> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Slot::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Slot::Ready(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Slot::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Slot::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// All generated media of a session plus the per-key loading/error flags.
#[derive(Debug, Default)]
pub struct ArtifactStore {
    step_visuals: BTreeMap<u32, Image>,
    step_errors: BTreeMap<u32, String>,
    completed_substeps: BTreeMap<SubstepKey, bool>,
    material_images: HashMap<String, Slot<Image>>,
    variants: Slot<BTreeMap<String, Image>>,
    summary_audio: Slot<AudioClip>,
    tour_video: Slot<VideoClip>,
    derived_lineage: u64,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Step visuals
    // ------------------------------------------------------------------

    pub fn step_visual(&self, step_number: u32) -> Option<&Image> {
        self.step_visuals.get(&step_number)
    }

    pub fn step_visuals(&self) -> &BTreeMap<u32, Image> {
        &self.step_visuals
    }

    pub fn step_error(&self, step_number: u32) -> Option<&str> {
        self.step_errors.get(&step_number).map(String::as_str)
    }

    /// Stores the visual for `step_number` and applies downstream
    /// invalidation. Returns the step numbers whose visuals were dropped.
    pub fn store_step_visual(&mut self, step_number: u32, image: Image) -> Vec<u32> {
        let stale = self.step_visuals.split_off(&(step_number + 1));
        self.step_visuals.insert(step_number, image);
        self.step_errors.retain(|&n, _| n < step_number);
        self.clear_derived();

        let dropped: Vec<u32> = stale.into_keys().collect();
        if !dropped.is_empty() {
            debug!("Step {step_number} rewritten, dropped stale visuals {dropped:?}");
        }
        dropped
    }

    pub fn record_step_failure(&mut self, step_number: u32, message: impl Into<String>) {
        self.step_errors.insert(step_number, message.into());
    }

    pub fn clear_step_error(&mut self, step_number: u32) {
        self.step_errors.remove(&step_number);
    }

    /// First step, in plan order, without a stored visual.
    pub fn first_missing_step(&self, plan: &Plan) -> Option<u32> {
        plan.steps
            .iter()
            .map(|step| step.step_number)
            .find(|n| !self.step_visuals.contains_key(n))
    }

    /// True once every step of the plan has a visual.
    pub fn is_chain_complete(&self, plan: &Plan) -> bool {
        !plan.steps.is_empty() && self.first_missing_step(plan).is_none()
    }

    /// Stored visuals in step order, for playback.
    pub fn ordered_visuals(&self) -> Vec<Image> {
        self.step_visuals.values().cloned().collect()
    }

    /// Visual of the plan's final step, once the chain reached it.
    pub fn final_visual(&self, plan: &Plan) -> Option<&Image> {
        plan.final_step_number()
            .and_then(|n| self.step_visuals.get(&n))
    }

    // ------------------------------------------------------------------
    // Derived artifacts
    // ------------------------------------------------------------------

    /// Clears variants, narration and video. Requests still running for the
    /// old lineage are dropped when they resolve.
    pub fn clear_derived(&mut self) {
        self.variants = Slot::Empty;
        self.summary_audio = Slot::Empty;
        self.tour_video = Slot::Empty;
        self.derived_lineage += 1;
    }

    /// Counter bumped by every derived invalidation.
    pub fn derived_lineage(&self) -> u64 {
        self.derived_lineage
    }

    pub fn variants(&self) -> &Slot<BTreeMap<String, Image>> {
        &self.variants
    }

    pub(crate) fn variants_mut(&mut self) -> &mut Slot<BTreeMap<String, Image>> {
        &mut self.variants
    }

    pub fn summary_audio(&self) -> &Slot<AudioClip> {
        &self.summary_audio
    }

    pub(crate) fn summary_audio_mut(&mut self) -> &mut Slot<AudioClip> {
        &mut self.summary_audio
    }

    pub fn tour_video(&self) -> &Slot<VideoClip> {
        &self.tour_video
    }

    pub(crate) fn tour_video_mut(&mut self) -> &mut Slot<VideoClip> {
        &mut self.tour_video
    }

    // ------------------------------------------------------------------
    // Material cache
    // ------------------------------------------------------------------

    pub fn material_image(&self, name: &str) -> &Slot<Image> {
        static EMPTY: Slot<Image> = Slot::Empty;
        self.material_images.get(name).unwrap_or(&EMPTY)
    }

    pub(crate) fn material_slot_mut(&mut self, name: &str) -> &mut Slot<Image> {
        self.material_images.entry(name.to_string()).or_default()
    }

    pub fn cached_material_count(&self) -> usize {
        self.material_images
            .values()
            .filter(|slot| slot.is_ready())
            .count()
    }

    // ------------------------------------------------------------------
    // Checklist state
    // ------------------------------------------------------------------

    pub fn is_completed(&self, key: SubstepKey) -> bool {
        self.completed_substeps.get(&key).copied().unwrap_or(false)
    }

    pub fn set_completed(&mut self, key: SubstepKey, completed: bool) {
        if completed {
            self.completed_substeps.insert(key, true);
        } else {
            self.completed_substeps.remove(&key);
        }
    }

    /// Flips the flag and returns the new value.
    pub fn toggle_completed(&mut self, key: SubstepKey) -> bool {
        let completed = !self.is_completed(key);
        self.set_completed(key, completed);
        completed
    }

    pub fn swap_completed(&mut self, a: SubstepKey, b: SubstepKey) {
        let flag_a = self.is_completed(a);
        let flag_b = self.is_completed(b);
        self.set_completed(a, flag_b);
        self.set_completed(b, flag_a);
    }

    /// Number of checked items in the given step.
    pub fn completed_in_step(&self, step_index: usize) -> usize {
        self.completed_substeps
            .range(SubstepKey::new(step_index, 0)..SubstepKey::new(step_index + 1, 0))
            .filter(|(_, done)| **done)
            .count()
    }
}
