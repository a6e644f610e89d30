//! Step chain driver for the Session.

use std::collections::HashSet;

use log::{debug, info, warn};

use super::{join_error, Session};
use crate::{
    error::{GenerationKind, RemodelError, Result},
    models::{Image, ImageOptions, StepImageRequest},
    orchestrator::{Action, SequenceState},
    params::RegenerateStep,
};

/// A step render ready to go out: the request plus what is needed to apply
/// its result.
struct StepDispatch {
    epoch: u64,
    request: StepImageRequest,
}

impl Session {
    /// Drives the session until there is nothing left to start.
    ///
    /// Generates missing step visuals in order, each one referencing the
    /// previous visual, and once the chain is complete runs the enabled
    /// derived features. Stops early when a step fails; the chain then waits
    /// for [`regenerate_step`](Session::regenerate_step).
    ///
    /// Generation failures are recorded in the artifact store rather than
    /// returned. The returned state says where the chain stopped.
    pub async fn advance(&self) -> SequenceState {
        let mut derived_started = HashSet::new();

        while let Some(action) = self.next_action().await {
            match action {
                Action::GenerateStep(step_number) => {
                    match self.run_step(step_number, ImageOptions::default()).await {
                        // A failure is recorded on the step and pauses the chain
                        Ok(_) | Err(RemodelError::Generation { .. }) => {}
                        Err(e) => {
                            debug!("Stopping at step {step_number}: {e}");
                            break;
                        }
                    }
                }
                derived => {
                    if !derived_started.insert(derived) {
                        debug!("{derived:?} already ran in this pass");
                        break;
                    }
                    self.run_derived(derived).await;
                }
            }
        }

        self.sequence_state().await
    }

    /// Regenerates one step visual on request, optionally with lighting or
    /// camera overrides.
    ///
    /// On success every later visual and every derived artifact is dropped.
    /// This is a single write; call [`advance`](Session::advance) to carry
    /// the chain forward from here.
    ///
    /// # Errors
    ///
    /// Returns `RemodelError::InFlight` while any step is generating,
    /// `RemodelError::InvalidInput` if the previous step has no visual yet,
    /// or the generation failure itself.
    pub async fn regenerate_step(&self, params: &RegenerateStep) -> Result<Image> {
        if params.options.is_default() {
            info!("Regenerating step {}", params.step_number);
        } else {
            info!(
                "Regenerating step {} (lighting: {:?}, camera angle: {:?})",
                params.step_number, params.options.lighting, params.options.camera_angle
            );
        }
        self.run_step(params.step_number, params.options.clone()).await
    }

    async fn run_step(&self, step_number: u32, options: ImageOptions) -> Result<Image> {
        let dispatch = self.prepare_step(step_number, options).await?;
        let epoch = dispatch.epoch;

        // The call runs in its own task so an abandoned caller cannot leave
        // the in-flight marker set.
        let session = self.clone();
        let task = tokio::spawn(async move {
            let result = session
                .gateway
                .synthesize_step_image(&dispatch.request)
                .await
                .map_err(|e| e.into_generation(GenerationKind::StepImage));
            session.apply_step(step_number, epoch, result).await
        });

        match task.await {
            Ok(result) => result,
            Err(e) => {
                let failure = RemodelError::generation(
                    GenerationKind::StepImage,
                    join_error(e).to_string(),
                );
                self.apply_step(step_number, epoch, Err(failure)).await
            }
        }
    }

    /// Checks the guards and marks the step in flight, all under one lock.
    async fn prepare_step(&self, step_number: u32, options: ImageOptions) -> Result<StepDispatch> {
        let mut state = self.lock().await;
        let plan = state.require_plan()?;

        if let Some(running) = state.in_flight {
            return Err(RemodelError::in_flight(format!("step {running} image")));
        }

        let step = plan
            .step(step_number)
            .ok_or_else(|| RemodelError::not_found(format!("step {step_number}")))?;
        let is_first = plan.first_step_number() == Some(step_number);

        let reference = if is_first {
            state.current_image.clone()
        } else {
            let previous = state.artifacts.step_visual(step_number - 1).cloned();
            if previous.is_none() {
                return Err(RemodelError::invalid_input("step_number").with_reason(format!(
                    "step {} has no visual yet, so step {step_number} has nothing to build on",
                    step_number - 1
                )));
            }
            previous
        };

        let prior_context = if self.config.cumulative_context {
            plan.prior_context(step_number)
        } else {
            None
        };

        let request = StepImageRequest {
            prompt: step.visualization_prompt.clone(),
            reference,
            options,
            prior_context,
        };

        let epoch = state.epoch;
        state.artifacts.clear_step_error(step_number);
        state.in_flight = Some(step_number);
        debug!("Step {step_number} dispatched");

        Ok(StepDispatch {
            epoch,
            request,
        })
    }

    async fn apply_step(&self, step_number: u32, epoch: u64, result: Result<Image>) -> Result<Image> {
        let mut state = self.lock().await;
        if state.epoch != epoch {
            info!("Discarding step {step_number} visual from a previous plan");
            return Err(RemodelError::discarded(format!("step {step_number} image")));
        }
        state.in_flight = None;

        match result {
            Ok(image) => {
                let dropped = state.artifacts.store_step_visual(step_number, image.clone());
                info!("Step {step_number} visual stored");
                if !dropped.is_empty() {
                    info!("Steps {dropped:?} will be regenerated from the new visual");
                }
                Ok(image)
            }
            Err(e) => {
                warn!("Step {step_number} failed, waiting for a manual retry: {e}");
                state.artifacts.record_step_failure(step_number, e.to_string());
                Err(e)
            }
        }
    }

    async fn run_derived(&self, action: Action) {
        let outcome = match action {
            Action::GenerateVariants => self.generate_variants().await.map(|_| ()),
            Action::GenerateNarration => self.generate_narration().await.map(|_| ()),
            Action::GenerateVideo => self.generate_video().await.map(|_| ()),
            Action::GenerateStep(_) => Ok(()),
        };
        if let Err(e) = outcome {
            warn!("{action:?} did not complete: {e}");
        }
    }
}

