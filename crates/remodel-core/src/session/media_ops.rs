//! Derived media and material thumbnails for the Session.
//!
//! Every operation here follows the same single-flight shape: check and
//! mark the slot under the lock, call the gateway with the lock released,
//! then publish the result only if nothing invalidated it meanwhile.

use std::collections::BTreeMap;

use log::{debug, info, warn};

use super::{join_error, Session, SessionState};
use crate::{
    artifacts::Slot,
    error::{GenerationKind, RemodelError, Result},
    media::{narration_script, render_batch, render_tour, AudioOutput, PollPolicy, Slideshow},
    models::{AudioClip, Image, VideoClip},
};

/// Identifies the inputs a derived result was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Lineage {
    epoch: u64,
    derived: u64,
}

impl Lineage {
    fn of(state: &SessionState) -> Self {
        Self {
            epoch: state.epoch,
            derived: state.artifacts.derived_lineage(),
        }
    }
}

impl Session {
    /// Renders the configured lighting/angle variants of the final visual.
    ///
    /// All variants run in parallel and are published together once every
    /// call has resolved. Failed members are left out of the set; a batch in
    /// which everything failed publishes an empty set. A set that is already
    /// cached is returned as is.
    ///
    /// # Errors
    ///
    /// Returns `RemodelError::InFlight` while a batch is running,
    /// `RemodelError::InvalidInput` before the final step has a visual, and
    /// `RemodelError::Discarded` if the final visual changed meanwhile.
    pub async fn generate_variants(&self) -> Result<BTreeMap<String, Image>> {
        let (lineage, base, style) = {
            let mut state = self.lock().await;
            let plan = state.require_plan()?;
            let base = state
                .artifacts
                .final_visual(plan)
                .cloned()
                .ok_or_else(|| final_visual_missing("variants"))?;
            let style = plan.style_summary.clone();

            match state.artifacts.variants() {
                Slot::Loading => return Err(RemodelError::in_flight("variant batch")),
                Slot::Ready(cached) => return Ok(cached.clone()),
                Slot::Empty | Slot::Failed(_) => {}
            }
            *state.artifacts.variants_mut() = Slot::Loading;
            (Lineage::of(&state), base, style)
        };

        info!("Rendering {} variants", self.config.variants.len());
        let gateway = self.gateway.clone();
        let configs = self.config.variants.clone();
        let rendered = tokio::spawn(async move {
            render_batch(gateway.as_ref(), &base, &configs, &style).await
        })
        .await;

        let mut state = self.lock().await;
        if Lineage::of(&state) != lineage {
            debug!("Discarding variants of a superseded final visual");
            return Err(RemodelError::discarded("variant batch"));
        }
        match rendered {
            Ok(rendered) => {
                info!("{} of {} variants ready", rendered.len(), self.config.variants.len());
                *state.artifacts.variants_mut() = Slot::Ready(rendered.clone());
                Ok(rendered)
            }
            Err(e) => {
                let e = join_error(e);
                *state.artifacts.variants_mut() = Slot::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Synthesizes the spoken walkthrough of the plan.
    ///
    /// A clip that is already cached is returned without a new request.
    ///
    /// # Errors
    ///
    /// Returns `RemodelError::InFlight` while narration is being
    /// synthesized, or the generation failure, which is also recorded so the
    /// user can retry.
    pub async fn generate_narration(&self) -> Result<AudioClip> {
        let (lineage, script) = {
            let mut state = self.lock().await;
            let script = narration_script(state.require_plan()?);
            match state.artifacts.summary_audio() {
                Slot::Loading => return Err(RemodelError::in_flight("narration audio")),
                Slot::Ready(cached) => return Ok(cached.clone()),
                Slot::Empty | Slot::Failed(_) => {}
            }
            *state.artifacts.summary_audio_mut() = Slot::Loading;
            (Lineage::of(&state), script)
        };

        debug!("Narration script: {script}");
        let gateway = self.gateway.clone();
        let result = tokio::spawn(async move { gateway.synthesize_narration_audio(&script).await })
            .await
            .map_err(join_error)
            .and_then(|result| result.map_err(|e| e.into_generation(GenerationKind::NarrationAudio)));

        let mut state = self.lock().await;
        if Lineage::of(&state) != lineage {
            debug!("Discarding narration for a superseded plan state");
            return Err(RemodelError::discarded("narration audio"));
        }
        match result {
            Ok(clip) => {
                info!("Narration ready ({:.1}s)", clip.duration().as_secs_f64());
                *state.artifacts.summary_audio_mut() = Slot::Ready(clip.clone());
                Ok(clip)
            }
            Err(e) => {
                warn!("Narration failed: {e}");
                *state.artifacts.summary_audio_mut() = Slot::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Renders the cinematic tour seeded with the final visual, polling the
    /// long-running operation at the configured interval.
    ///
    /// At most one tour exists per final visual: a cached tour is returned
    /// without a new request.
    ///
    /// # Errors
    ///
    /// Returns `RemodelError::InFlight` while a tour is rendering,
    /// `RemodelError::InvalidInput` before the final step has a visual, or
    /// the generation failure.
    pub async fn generate_video(&self) -> Result<VideoClip> {
        let (lineage, seed, prompt) = {
            let mut state = self.lock().await;
            let plan = state.require_plan()?;
            let seed = state
                .artifacts
                .final_visual(plan)
                .cloned()
                .ok_or_else(|| final_visual_missing("video tour"))?;
            let prompt = crate::media::tour_prompt(plan);

            match state.artifacts.tour_video() {
                Slot::Loading => return Err(RemodelError::in_flight("video tour")),
                Slot::Ready(cached) => return Ok(cached.clone()),
                Slot::Empty | Slot::Failed(_) => {}
            }
            *state.artifacts.tour_video_mut() = Slot::Loading;
            (Lineage::of(&state), seed, prompt)
        };

        let policy = PollPolicy {
            interval: self.config.video_poll_interval,
            timeout: self.config.video_timeout,
        };
        let gateway = self.gateway.clone();
        let result = tokio::spawn(async move {
            render_tour(gateway.as_ref(), &prompt, &seed, policy).await
        })
        .await
        .map_err(join_error)
        .and_then(|result| result.map_err(|e| e.into_generation(GenerationKind::Video)));

        let mut state = self.lock().await;
        if Lineage::of(&state) != lineage {
            debug!("Discarding video tour of a superseded final visual");
            return Err(RemodelError::discarded("video tour"));
        }
        match result {
            Ok(clip) => {
                info!("Video tour ready ({} bytes)", clip.bytes.len());
                *state.artifacts.tour_video_mut() = Slot::Ready(clip.clone());
                Ok(clip)
            }
            Err(e) => {
                warn!("Video tour failed: {e}");
                *state.artifacts.tour_video_mut() = Slot::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Product thumbnail for a shopping-list item, rendered in the plan's
    /// style on first use and cached for the rest of the session.
    ///
    /// Cached names cost no gateway call. The cache survives visual changes
    /// and is only cleared with the plan.
    ///
    /// # Errors
    ///
    /// Returns `RemodelError::InFlight` while the same name is loading, or
    /// the generation failure. A failed name can be requested again.
    pub async fn material_image(&self, name: &str) -> Result<Image> {
        let (epoch, style) = {
            let mut state = self.lock().await;
            let style = state.require_plan()?.style_summary.clone();
            let slot = state.artifacts.material_slot_mut(name);
            if let Slot::Ready(image) = slot {
                return Ok(image.clone());
            }
            if slot.is_loading() {
                return Err(RemodelError::in_flight(format!("thumbnail for '{name}'")));
            }
            *slot = Slot::Loading;
            (state.epoch, style)
        };

        debug!("Rendering thumbnail for '{name}'");
        let gateway = self.gateway.clone();
        let owned_name = name.to_string();
        let result = tokio::spawn(async move {
            gateway.synthesize_product_image(&owned_name, &style).await
        })
        .await
        .map_err(join_error)
        .and_then(|result| result.map_err(|e| e.into_generation(GenerationKind::ProductImage)));

        let mut state = self.lock().await;
        if state.epoch != epoch {
            return Err(RemodelError::discarded(format!("thumbnail for '{name}'")));
        }
        let slot = state.artifacts.material_slot_mut(name);
        match result {
            Ok(image) => {
                *slot = Slot::Ready(image.clone());
                Ok(image)
            }
            Err(e) => {
                warn!("Thumbnail for '{name}' failed: {e}");
                *slot = Slot::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Opens the audio-synchronized slideshow over the current step visuals.
    ///
    /// # Errors
    ///
    /// Returns `RemodelError::InvalidInput` until narration audio is ready
    /// and at least one step has a visual.
    pub async fn open_slideshow(&self, output: Box<dyn AudioOutput>) -> Result<Slideshow> {
        let state = self.lock().await;
        let clip = state.artifacts.summary_audio().value().cloned().ok_or_else(|| {
            RemodelError::invalid_input("narration").with_reason("narration audio is not ready")
        })?;
        Slideshow::new(state.artifacts.ordered_visuals(), clip, output)
    }

    /// Synthesizes narration if needed and opens the slideshow on success.
    pub async fn narrate(&self, output: Box<dyn AudioOutput>) -> Result<Slideshow> {
        self.generate_narration().await?;
        self.open_slideshow(output).await
    }
}

fn final_visual_missing(what: &str) -> RemodelError {
    RemodelError::invalid_input("final_visual")
        .with_reason(format!("{what} need the final step visual"))
}
