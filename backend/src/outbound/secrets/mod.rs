//! Secret provider adapters.
//!
//! Secrets are read from process environment variables through
//! [`mockable::Env`], so rotated values are visible on the next lookup and
//! tests can substitute a [`mockable::MockEnv`].

use async_trait::async_trait;
use mockable::{DefaultEnv, Env};
use tracing::warn;
use zeroize::Zeroizing;

use crate::domain::ports::{SecretProvider, SecretProviderError};

/// Secret provider resolving each secret name as an environment variable.
///
/// A missing or empty variable resolves to `None`. Other values, including
/// whitespace, are returned untouched.
#[derive(Debug, Default)]
pub struct EnvSecretProvider<E = DefaultEnv> {
    env: E,
}

impl EnvSecretProvider<DefaultEnv> {
    /// Provider reading the real process environment.
    pub fn from_process() -> Self {
        Self::new(DefaultEnv::new())
    }
}

impl<E: Env> EnvSecretProvider<E> {
    /// Provider reading variables through `env`.
    pub fn new(env: E) -> Self {
        Self { env }
    }
}

#[async_trait]
impl<E> SecretProvider for EnvSecretProvider<E>
where
    E: Env + Send + Sync,
{
    async fn value(&self, name: &str) -> Result<Option<Zeroizing<String>>, SecretProviderError> {
        let Some(raw) = self.env.string(name) else {
            return Ok(None);
        };
        if raw.is_empty() {
            warn!(secret = name, "secret variable is empty; treating as absent");
            return Ok(None);
        }
        Ok(Some(Zeroizing::new(raw)))
    }
}
