//! Plan lifecycle for the Session.

use jiff::Timestamp;
use log::{info, warn};

use super::{join_error, Session, SessionState};
use crate::{
    error::{RemodelError, Result},
    models::{Image, Plan, PlanRequest},
};

impl Session {
    /// Synthesizes a plan from the two photos and makes it the session plan.
    ///
    /// A successful plan replaces whatever was there wholesale: every
    /// generated artifact, flag and cache is cleared and the photo of the
    /// current room becomes the reference for the first step. Call
    /// [`advance`](Session::advance) afterwards to start the chain.
    ///
    /// # Errors
    ///
    /// Returns `RemodelError::InFlight` while another plan is being
    /// synthesized, `RemodelError::Planning` if the backend fails or returns
    /// an unusable plan, and `RemodelError::Discarded` if the session was
    /// reset before the plan arrived.
    pub async fn create_plan(&self, request: PlanRequest) -> Result<Plan> {
        let epoch = {
            let mut state = self.lock().await;
            if state.planning {
                return Err(RemodelError::in_flight("plan synthesis"));
            }
            state.planning = true;
            state.epoch
        };

        let gateway = self.gateway.clone();
        let current = request.current.clone();
        let result = tokio::spawn(async move { gateway.synthesize_plan(&request).await })
            .await
            .map_err(join_error)
            .and_then(|result| result.map_err(RemodelError::into_planning))
            .and_then(Plan::validated);

        let mut state = self.lock().await;
        if state.epoch != epoch {
            info!("Discarding plan that arrived after a reset");
            return Err(RemodelError::discarded("plan"));
        }
        state.planning = false;

        match result {
            Ok(mut plan) => {
                plan.created_at = Timestamp::now();
                install_plan(&mut state, plan.clone(), current);
                info!("Plan '{}' ready with {} steps", plan.title, plan.steps.len());
                Ok(plan)
            }
            Err(e) => {
                warn!("Planning failed: {e}");
                Err(e)
            }
        }
    }

    /// Installs an already synthesized plan, e.g. one exported earlier.
    ///
    /// Same effect on the session as a successful
    /// [`create_plan`](Session::create_plan).
    pub async fn load_plan(&self, plan: Plan, current: Image) -> Result<()> {
        let plan = plan.validated()?;
        let mut state = self.lock().await;
        info!("Loading plan '{}' with {} steps", plan.title, plan.steps.len());
        install_plan(&mut state, plan, current);
        Ok(())
    }

    /// Drops the plan and everything derived from it.
    ///
    /// Requests already dispatched keep running; their results are dropped
    /// when they arrive.
    pub async fn reset(&self) {
        let mut state = self.lock().await;
        let epoch = state.epoch + 1;
        *state = SessionState {
            epoch,
            ..SessionState::default()
        };
        info!("Session reset");
    }
}

fn install_plan(state: &mut SessionState, plan: Plan, current: Image) {
    let epoch = state.epoch + 1;
    *state = SessionState {
        plan: Some(plan),
        current_image: Some(current),
        epoch,
        ..SessionState::default()
    };
}
