//! Process-local profile store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{ProfileStore, ProfileStoreError};
use crate::domain::{NewUserProfile, UserId, UserProfile};

/// Profile store keyed by [`UserId`], stamping `createdAt` from a [`Clock`].
pub struct InMemoryProfileStore {
    clock: Arc<dyn Clock>,
    profiles: Mutex<HashMap<UserId, UserProfile>>,
}

impl InMemoryProfileStore {
    /// Create an empty store using `clock` as the server time source.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            profiles: Mutex::new(HashMap::new()),
        }
    }

    /// Stored profile for `user_id`, if any.
    pub fn profile(&self, user_id: &UserId) -> Option<UserProfile> {
        self.profiles().get(user_id).cloned()
    }

    /// Number of stored profiles.
    pub fn len(&self) -> usize {
        self.profiles().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.profiles().is_empty()
    }

    fn profiles(&self) -> MutexGuard<'_, HashMap<UserId, UserProfile>> {
        self.profiles.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn set(
        &self,
        user_id: &UserId,
        profile: &NewUserProfile,
    ) -> Result<(), ProfileStoreError> {
        let stored = profile.clone().created_at(self.clock.utc());
        self.profiles().insert(user_id.clone(), stored);
        Ok(())
    }
}
