//! The planning session: one plan, its artifacts and the driver that keeps
//! the step visuals consistent.
//!
//! A [`Session`] is a cheap, cloneable handle. All mutable state sits behind
//! one async mutex that is never held across a gateway call, so readers can
//! always take a consistent snapshot while generations are running.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │    Session      │    │  orchestrator   │    │    Gateway      │
//! │ (plan_ops,      │───▶│  next_action()  │    │ (async, may     │
//! │  sequence_ops,  │    └─────────────────┘    │  fail)          │
//! │  media_ops,     │──────── lock released ───▶│                 │
//! │  substep_ops)   │◀─────── apply result ─────│                 │
//! └─────────────────┘                           └─────────────────┘
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: creates a [`Session`] from a gateway and configuration
//! - [`plan_ops`]: plan synthesis, loading and reset
//! - [`sequence_ops`]: the step chain driver and manual regeneration
//! - [`media_ops`]: variants, narration, video tour, material thumbnails
//! - [`substep_ops`]: checklist editing
//!
//! Every generation captures the session epoch before it is dispatched.
//! [`Session::reset`] and a new plan bump the epoch, and results that come
//! back under an older epoch are dropped without touching the store.
//!
//! # Example
//!
//! ```rust,no_run
//! use remodel_core::{GeminiGateway, GeminiConfig, Image, PlanRequest, SessionBuilder};
//!
//! # async fn example() -> remodel_core::Result<()> {
//! let session = SessionBuilder::new()
//!     .with_gateway(GeminiGateway::new(GeminiConfig::default())?)
//!     .build()?;
//!
//! let request = PlanRequest::new(
//!     Image::from_bytes("image/jpeg", &std::fs::read("inspiration.jpg").unwrap()),
//!     Image::from_bytes("image/jpeg", &std::fs::read("room.jpg").unwrap()),
//! );
//! session.create_plan(request).await?;
//! let state = session.advance().await;
//! println!("{state}");
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::{
    artifacts::ArtifactStore,
    config::SessionConfig,
    display::SessionReport,
    error::{RemodelError, Result},
    gateway::GenerationGateway,
    models::{Image, Plan, SubstepKey},
    orchestrator::{self, Action, SequenceState},
};

pub mod builder;
pub mod media_ops;
pub mod plan_ops;
pub mod sequence_ops;
pub mod substep_ops;


pub use builder::SessionBuilder;

/// Everything a session knows. Read it through [`Session::read`].
#[derive(Debug, Default)]
pub struct SessionState {
    pub(crate) plan: Option<Plan>,
    /// Photo of the room as it is today; reference for the first step
    pub(crate) current_image: Option<Image>,
    pub(crate) artifacts: ArtifactStore,
    /// Step whose visual is being generated. At most one at a time.
    pub(crate) in_flight: Option<u32>,
    pub(crate) planning: bool,
    /// Checklist item opened for editing
    pub(crate) editing: Option<SubstepKey>,
    pub(crate) epoch: u64,
}

impl SessionState {
    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    pub fn current_image(&self) -> Option<&Image> {
        self.current_image.as_ref()
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    pub fn in_flight(&self) -> Option<u32> {
        self.in_flight
    }

    pub fn is_planning(&self) -> bool {
        self.planning
    }

    pub fn editing(&self) -> Option<SubstepKey> {
        self.editing
    }

    pub(crate) fn require_plan(&self) -> Result<&Plan> {
        self.plan.as_ref().ok_or(RemodelError::NoPlan)
    }

    pub(crate) fn require_plan_mut(&mut self) -> Result<&mut Plan> {
        self.plan.as_mut().ok_or(RemodelError::NoPlan)
    }
}

/// Handle to a planning session. Clones share the same state.
#[derive(Clone)]
pub struct Session {
    pub(crate) state: Arc<Mutex<SessionState>>,
    pub(crate) gateway: Arc<dyn GenerationGateway>,
    pub(crate) config: Arc<SessionConfig>,
}

impl Session {
    pub(crate) fn new(gateway: Arc<dyn GenerationGateway>, config: SessionConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::default())),
            gateway,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Runs `f` against a consistent view of the session.
    pub async fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        let state = self.state.lock().await;
        f(&state)
    }

    /// A copy of the current plan, including checklist edits.
    pub async fn plan(&self) -> Option<Plan> {
        self.read(|state| state.plan.clone()).await
    }

    pub async fn sequence_state(&self) -> SequenceState {
        self.read(|state| {
            orchestrator::sequence_state(
                state.plan.as_ref(),
                &state.artifacts,
                state.in_flight,
                &self.config.derived,
            )
        })
        .await
    }

    /// Snapshot of the whole session for display.
    pub async fn report(&self) -> SessionReport {
        self.read(|state| {
            let sequence = orchestrator::sequence_state(
                state.plan.as_ref(),
                &state.artifacts,
                state.in_flight,
                &self.config.derived,
            );
            SessionReport::capture(state, sequence)
        })
        .await
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().await
    }

    pub(crate) async fn next_action(&self) -> Option<Action> {
        self.read(|state| {
            orchestrator::next_action(
                state.plan.as_ref(),
                &state.artifacts,
                state.in_flight,
                &self.config.derived,
            )
        })
        .await
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Maps a failed join of a spawned generation task.
pub(crate) fn join_error(e: tokio::task::JoinError) -> RemodelError {
    RemodelError::Configuration {
        message: format!("Task join error: {e}"),
    }
}
