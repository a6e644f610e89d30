//! Core library for the remodel renovation planner.
//!
//! Given a photo of a room and an inspiration photo, a [`Session`] obtains a
//! step-by-step renovation plan and then renders one visual per step, each
//! one an edit of the previous step's visual so that the sequence stays
//! visually consistent. Once the chain is complete it can derive lighting
//! variants, a narrated slideshow and a video tour from the final visual.
//!
//! # Architecture
//!
//! - **Models** ([`models`]): plan, steps, materials and media values
//! - **Artifacts** ([`artifacts`]): keyed storage enforcing the chain
//!   invariants on every write
//! - **Orchestrator** ([`orchestrator`]): pure decision of what to generate
//!   next
//! - **Session** ([`session`]): the mutable state and every user operation
//! - **Gateway** ([`gateway`]): the async contract to generative backends
//!   plus a Gemini implementation
//! - **Display** ([`display`]): Markdown formatting for the CLI
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use remodel_core::{GeminiConfig, GeminiGateway, Image, PlanRequest, SessionBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = SessionBuilder::new()
//!     .with_gateway(GeminiGateway::new(GeminiConfig::default())?)
//!     .build()?;
//!
//! let inspiration = Image::from_bytes("image/jpeg", &std::fs::read("inspiration.jpg")?);
//! let current = Image::from_bytes("image/jpeg", &std::fs::read("room.jpg")?);
//! let plan = session.create_plan(PlanRequest::new(inspiration, current)).await?;
//! println!("{plan}");
//!
//! session.advance().await;
//! println!("{}", session.report().await);
//! # Ok(())
//! # }
//! ```

pub mod artifacts;
pub mod config;
pub mod display;
pub mod error;
pub mod gateway;
pub mod media;
pub mod models;
pub mod orchestrator;
pub mod params;
pub mod session;

// Re-export commonly used types
pub use artifacts::{ArtifactStore, Slot};
pub use config::{DerivedFeatures, SessionConfig, VariantConfig};
pub use display::{LocalDateTime, Materials, OperationStatus, SessionReport};
pub use error::{GenerationKind, RemodelError, Result};
pub use gateway::{
    CredentialSource, EnvCredentials, GeminiConfig, GeminiGateway, GenerationGateway,
    StaticCredentials, VideoOperation, VideoStatus,
};
pub use media::{AudioOutput, SilentOutput, Slideshow};
pub use models::{
    AudioClip, Difficulty, Image, ImageOptions, Material, Plan, PlanRequest, Step,
    StepImageRequest, SubstepKey, VideoClip,
};
pub use orchestrator::{next_action, Action, SequenceState};
pub use params::{EditSubstep, MoveDirection, RegenerateStep};
pub use session::{Session, SessionBuilder, SessionState};
