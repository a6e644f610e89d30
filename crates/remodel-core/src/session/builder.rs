//! Builder for creating and configuring Session instances.

use std::sync::Arc;

use super::Session;
use crate::{
    config::SessionConfig,
    error::{RemodelError, Result},
    gateway::GenerationGateway,
};

/// Builder for creating and configuring Session instances.
#[derive(Default)]
pub struct SessionBuilder {
    gateway: Option<Arc<dyn GenerationGateway>>,
    config: SessionConfig,
}

impl SessionBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the backend every generation goes through.
    pub fn with_gateway<G: GenerationGateway + 'static>(mut self, gateway: G) -> Self {
        self.gateway = Some(Arc::new(gateway));
        self
    }

    /// Same as [`with_gateway`](Self::with_gateway) for a gateway the caller
    /// keeps a handle to.
    pub fn with_shared_gateway(mut self, gateway: Arc<dyn GenerationGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the configured session.
    ///
    /// # Errors
    ///
    /// Returns `RemodelError::Configuration` if no gateway was set
    pub fn build(self) -> Result<Session> {
        let gateway = self.gateway.ok_or_else(|| RemodelError::Configuration {
            message: "a generation gateway is required".to_string(),
        })?;
        Ok(Session::new(gateway, self.config))
    }
}
