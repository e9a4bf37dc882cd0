//! Driving port for the registration use-case.
//!
//! Inbound adapters call this port with the raw payload; validation, role
//! resolution and persistence all happen behind it.

use async_trait::async_trait;

use crate::domain::{Error, RegistrationRequest, RegistrationResult};

/// Domain use-case port for creating user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRegistration: Send + Sync {
    /// Validate the request, create the identity and persist the profile.
    async fn register(&self, request: RegistrationRequest) -> Result<RegistrationResult, Error>;
}
