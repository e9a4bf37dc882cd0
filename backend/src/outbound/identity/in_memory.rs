//! Process-local identity provider.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::UserId;
use crate::domain::ports::{IdentityProvider, IdentityProviderError};

/// Stored identity record. The password is never kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredIdentity {
    /// Provider-assigned identifier.
    pub uid: UserId,
    /// Email as supplied at creation.
    pub email: String,
    /// Display name recorded with the identity.
    pub display_name: String,
}

/// Identity provider holding identities in a mutex-guarded map.
///
/// Emails are matched case-insensitively, mirroring hosted identity
/// providers.
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    identities: Mutex<HashMap<String, StoredIdentity>>,
}

impl InMemoryIdentityProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an identity by email.
    pub fn find_by_email(&self, email: &str) -> Option<StoredIdentity> {
        self.identities().get(&normalise(email)).cloned()
    }

    /// Number of identities currently held.
    pub fn len(&self) -> usize {
        self.identities().len()
    }

    /// Whether no identities are held.
    pub fn is_empty(&self) -> bool {
        self.identities().is_empty()
    }

    fn identities(&self) -> MutexGuard<'_, HashMap<String, StoredIdentity>> {
        self.identities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn normalise(email: &str) -> String {
    email.trim().to_lowercase()
}

fn generate_uid() -> Result<UserId, IdentityProviderError> {
    UserId::new(Uuid::new_v4().simple().to_string())
        .map_err(|err| IdentityProviderError::rejected(err.to_string()))
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn create_user(
        &self,
        email: &str,
        _password: &str,
        display_name: &str,
    ) -> Result<UserId, IdentityProviderError> {
        let key = normalise(email);
        let mut identities = self.identities();
        if identities.contains_key(&key) {
            return Err(IdentityProviderError::email_already_exists());
        }
        let uid = generate_uid()?;
        identities.insert(
            key,
            StoredIdentity {
                uid: uid.clone(),
                email: email.to_owned(),
                display_name: display_name.to_owned(),
            },
        );
        Ok(uid)
    }

    async fn delete_user(&self, user_id: &UserId) -> Result<(), IdentityProviderError> {
        let mut identities = self.identities();
        let before = identities.len();
        identities.retain(|_, identity| identity.uid != *user_id);
        if identities.len() == before {
            return Err(IdentityProviderError::not_found(user_id.as_ref()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn provider() -> InMemoryIdentityProvider {
        InMemoryIdentityProvider::new()
    }

    #[rstest]
    #[tokio::test]
    async fn creates_identity_with_generated_uid(provider: InMemoryIdentityProvider) {
        let uid = provider
            .create_user("a@x.com", "Abcdef1!", "A B")
            .await
            .expect("create succeeds");

        let stored = provider.find_by_email("a@x.com").expect("identity stored");
        assert_eq!(stored.uid, uid);
        assert_eq!(stored.display_name, "A B");
        assert_eq!(provider.len(), 1);
    }

    #[rstest]
    #[case("a@x.com")]
    #[case("A@X.COM")]
    #[case(" a@x.com ")]
    #[tokio::test]
    async fn rejects_duplicate_emails_case_insensitively(
        provider: InMemoryIdentityProvider,
        #[case] duplicate: &str,
    ) {
        provider
            .create_user("a@x.com", "Abcdef1!", "A B")
            .await
            .expect("first create succeeds");

        let err = provider
            .create_user(duplicate, "Abcdef1!", "A B")
            .await
            .expect_err("duplicate fails");
        assert_eq!(err, IdentityProviderError::EmailAlreadyExists);
        assert_eq!(provider.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn uids_are_distinct(provider: InMemoryIdentityProvider) {
        let first = provider
            .create_user("a@x.com", "Abcdef1!", "A")
            .await
            .expect("create succeeds");
        let second = provider
            .create_user("b@x.com", "Abcdef1!", "B")
            .await
            .expect("create succeeds");
        assert_ne!(first, second);
    }

    #[rstest]
    #[tokio::test]
    async fn delete_removes_identity(provider: InMemoryIdentityProvider) {
        let uid = provider
            .create_user("a@x.com", "Abcdef1!", "A B")
            .await
            .expect("create succeeds");

        provider.delete_user(&uid).await.expect("delete succeeds");
        assert!(provider.is_empty());

        let err = provider.delete_user(&uid).await.expect_err("second delete fails");
        assert!(matches!(err, IdentityProviderError::NotFound { .. }));
    }
}
