//! Credential resolution.
//!
//! Sources are consulted at the start of every gateway call, never cached at
//! construction, so a key selected mid-session is picked up by the next
//! request.

use crate::error::{RemodelError, Result};

pub trait CredentialSource: Send + Sync {
    fn api_key(&self) -> Result<String>;
}

/// Reads the key from the first set environment variable.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    vars: Vec<String>,
}

impl EnvCredentials {
    pub fn new<I, S>(vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(["GEMINI_API_KEY", "API_KEY"])
    }
}

impl CredentialSource for EnvCredentials {
    fn api_key(&self) -> Result<String> {
        self.vars
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
            .ok_or_else(|| RemodelError::Configuration {
                message: format!("no API key found, set one of {}", self.vars.join(", ")),
            })
    }
}

/// A fixed key, for tests and embedding.
#[derive(Debug, Clone)]
pub struct StaticCredentials(pub String);

impl CredentialSource for StaticCredentials {
    fn api_key(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_env_key_names_variables() {
        let source = EnvCredentials::new(["REMODEL_TEST_DEFINITELY_UNSET_KEY"]);
        let err = source.api_key().unwrap_err();
        assert!(err.to_string().contains("REMODEL_TEST_DEFINITELY_UNSET_KEY"));
    }

    #[test]
    fn test_static_key() {
        assert_eq!(StaticCredentials("k".to_string()).api_key().unwrap(), "k");
    }
}
