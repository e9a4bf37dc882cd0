//! Profile store adapters.

mod in_memory;
mod realtime_database;

pub use in_memory::InMemoryProfileStore;
pub use realtime_database::{RealtimeDatabaseConfig, RealtimeDatabaseProfileStore};
