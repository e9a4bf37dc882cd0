//! Driven port for the key-value profile store.
//!
//! Profiles live under `users/<userId>`. The store, not the caller, assigns
//! the creation timestamp.

use async_trait::async_trait;

use crate::domain::{NewUserProfile, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by profile store adapters.
    pub enum ProfileStoreError {
        /// The store could not be reached.
        Connection { message: String } => "profile store connection failed: {message}",
        /// The store refused or failed the write.
        Write { message: String } => "profile store write failed: {message}",
    }
}

/// Port for persisting user profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Write `profile` at [`UserId::profile_key`], stamping the server time.
    async fn set(&self, user_id: &UserId, profile: &NewUserProfile)
    -> Result<(), ProfileStoreError>;
}
