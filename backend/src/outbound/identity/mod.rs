//! Identity provider adapters.
//!
//! `InMemoryIdentityProvider` backs development runs and integration tests;
//! `IdentityToolkitProvider` talks to the Identity Toolkit admin REST API.

mod dto;
mod identity_toolkit;
mod in_memory;

pub use identity_toolkit::{
    IDENTITY_TOOLKIT_DEFAULT_URL, IdentityToolkitConfig, IdentityToolkitProvider,
};
pub use in_memory::InMemoryIdentityProvider;
