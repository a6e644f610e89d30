//! Contract between the orchestrator and the generative backends.
//!
//! Every call is asynchronous, single-shot and may fail. The orchestrator
//! never retries on its own; see [`crate::session`] for how failures are
//! absorbed.
//!
//! - [`GenerationGateway`]: the trait the session drives
//! - [`credentials`]: per-call credential resolution
//! - [`gemini`]: implementation against the Google Generative Language API

use async_trait::async_trait;

use crate::{
    error::Result,
    models::{AudioClip, Image, Plan, PlanRequest, StepImageRequest, VideoClip},
};

pub mod credentials;
pub mod gemini;

pub use credentials::{CredentialSource, EnvCredentials, StaticCredentials};
pub use gemini::{GeminiConfig, GeminiGateway};

/// Handle of a long-running video synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoOperation {
    pub name: String,
}

impl VideoOperation {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Result of one poll of a [`VideoOperation`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoStatus {
    pub done: bool,
    pub result_uri: Option<String>,
    /// Backend-reported failure of a finished operation
    pub error: Option<String>,
}

impl VideoStatus {
    pub fn pending() -> Self {
        Self::default()
    }

    pub fn finished(uri: impl Into<String>) -> Self {
        Self {
            done: true,
            result_uri: Some(uri.into()),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            done: true,
            result_uri: None,
            error: Some(message.into()),
        }
    }
}

/// Uniform entry point to all generative services.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// Produces the plan from the two photos. Fails with
    /// [`RemodelError::Planning`](crate::RemodelError::Planning).
    async fn synthesize_plan(&self, request: &PlanRequest) -> Result<Plan>;

    /// Renders one step, editing the reference image when given.
    async fn synthesize_step_image(&self, request: &StepImageRequest) -> Result<Image>;

    async fn synthesize_variant_image(
        &self,
        base: &Image,
        angle: &str,
        lighting: &str,
        style_context: &str,
    ) -> Result<Image>;

    async fn synthesize_product_image(&self, name: &str, style_context: &str) -> Result<Image>;

    async fn synthesize_narration_audio(&self, script: &str) -> Result<AudioClip>;

    /// Starts a video synthesis; poll the returned handle until done.
    async fn synthesize_video(&self, prompt: &str, seed: &Image) -> Result<VideoOperation>;

    async fn poll_video(&self, operation: &VideoOperation) -> Result<VideoStatus>;

    async fn fetch_video(&self, uri: &str) -> Result<VideoClip>;

    /// Platform pre-flight run before video requests. Callers only log a
    /// failure.
    async fn ensure_credentials(&self) -> Result<()> {
        Ok(())
    }
}
