//! Driven port for the identity provider that owns login credentials.
//!
//! The provider is the system of record for email/password identities. It
//! assigns the stable [`UserId`] that keys every other record.

use async_trait::async_trait;

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity provider adapters.
    pub enum IdentityProviderError {
        /// The email address already belongs to an identity.
        EmailAlreadyExists => "email address is already registered",
        /// The provider refused the request for another reason.
        Rejected { message: String } => "identity provider rejected the request: {message}",
        /// The provider did not answer within the client timeout.
        Timeout { message: String } => "identity provider timed out: {message}",
        /// The request could not be delivered or the response was unreadable.
        Transport { message: String } => "identity provider transport failed: {message}",
        /// The provider has no identity with the given id.
        NotFound { user_id: String } => "identity {user_id} not found",
    }
}

/// Port for creating (and, for compensation only, removing) identities.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an identity and return its provider-assigned id.
    ///
    /// Fails with [`IdentityProviderError::EmailAlreadyExists`] when `email`
    /// is already registered.
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<UserId, IdentityProviderError>;

    /// Remove an identity created moments earlier by the same flow.
    async fn delete_user(&self, user_id: &UserId) -> Result<(), IdentityProviderError>;
}
