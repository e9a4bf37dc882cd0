//! Driven port for externally provisioned secrets.
//!
//! Secrets are looked up on every registration so rotated values take effect
//! without a restart.

use async_trait::async_trait;
use zeroize::Zeroizing;

use super::define_port_error;

define_port_error! {
    /// Errors raised by secret provider adapters.
    pub enum SecretProviderError {
        /// The backing secret source could not be read.
        Unavailable { name: String, message: String } =>
            "secret {name} unavailable: {message}",
    }
}

/// Port for resolving named secret values.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Resolve `name`, returning `None` when the secret is not provisioned.
    async fn value(&self, name: &str) -> Result<Option<Zeroizing<String>>, SecretProviderError>;
}
