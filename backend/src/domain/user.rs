//! User identity and profile data model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Role;

/// Characters that would split or escape a profile store key.
const RESERVED_ID_CHARS: &[char] = &['/', '.', '#', '$', '[', ']'];

/// Validation errors returned by [`UserId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Identifier was empty.
    #[error("user id must not be empty")]
    EmptyId,
    /// Identifier contained whitespace or a key-reserved character.
    #[error("user id must not contain whitespace or any of / . # $ [ ]")]
    InvalidId,
}

/// Stable user identifier assigned by the identity provider.
///
/// The value is opaque. It is only checked to be usable as a single profile
/// store key segment.
///
/// # Examples
/// ```
/// use registration::domain::UserId;
///
/// let id = UserId::new("Xk3vQ9hL2bP0aZ").expect("valid id");
/// assert_eq!(id.profile_key(), "users/Xk3vQ9hL2bP0aZ");
/// assert!(UserId::new("a/b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || RESERVED_ID_CHARS.contains(&c))
        {
            return Err(UserValidationError::InvalidId);
        }
        Ok(Self(id))
    }

    /// Profile store key for this user: `users/<id>`.
    #[must_use]
    pub fn profile_key(&self) -> String {
        format!("users/{}", self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Profile attributes written by the registration flow.
///
/// The profile store adds `createdAt` when it persists the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserProfile {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Chosen handle.
    pub username: String,
    /// Email address used for the identity record.
    pub email: String,
    /// Role resolved from the invite code.
    pub role: Role,
}

impl NewUserProfile {
    /// Attach the server-assigned creation time.
    #[must_use]
    pub fn created_at(self, created_at: DateTime<Utc>) -> UserProfile {
        UserProfile {
            first_name: self.first_name,
            last_name: self.last_name,
            username: self.username,
            email: self.email,
            role: self.role,
            created_at,
        }
    }
}

/// Persisted user profile, keyed by [`UserId`] in the profile store.
///
/// ## Invariants
/// - Created once by the registration flow; never mutated or deleted by it.
/// - `created_at` is assigned by the store, not the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Chosen handle.
    pub username: String,
    /// Email address used for the identity record.
    pub email: String,
    /// Role resolved from the invite code.
    pub role: Role,
    /// Server-assigned creation time.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationResult {
    /// Identifier assigned by the identity provider.
    pub uid: UserId,
    /// Role written to the profile.
    pub role: Role,
}
