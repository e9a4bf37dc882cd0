//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern, providing concrete
//! implementations of the registration service's driven ports:
//!
//! - **identity**: in-memory and Identity Toolkit REST identity providers
//! - **profile**: in-memory and Realtime Database REST profile stores
//! - **secrets**: environment-backed invite-code secrets
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

mod http_support;
pub mod identity;
pub mod profile;
pub mod secrets;
