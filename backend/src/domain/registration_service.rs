//! Registration orchestration service.
//!
//! The service owns the whole registration sequence:
//! `Validating -> RoleResolved -> IdentityCreated -> ProfilePersisted`.
//! The identity and profile writes are strictly sequential and not atomic; a
//! profile failure after the identity exists leaves an orphan identity unless
//! [`OrphanIdentityPolicy::Compensate`] is selected.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info, warn};
use zeroize::Zeroizing;

use crate::domain::ports::{
    IdentityProvider, IdentityProviderError, ProfileStore, ProfileStoreError, SecretProvider,
    UserRegistration,
};
use crate::domain::{
    Error, InviteSecrets, NewRegistration, RegistrationRequest, RegistrationResult,
    RegistrationValidationError, UserId,
};

/// Default secret name holding the admin invite code.
pub const ADMIN_CODE_SECRET: &str = "ADMIN_CODE";
/// Default secret name holding the clinician invite code.
pub const CLINICIAN_CODE_SECRET: &str = "CLINICIAN_CODE";

const MISSING_FIELDS_MESSAGE: &str = "Missing required fields.";
const WEAK_PASSWORD_MESSAGE: &str = "Password does not meet policy";
const EMAIL_IN_USE_MESSAGE: &str = "Email already in use.";
const CREATE_FAILED_MESSAGE: &str = "Failed to create user.";

/// What to do with an identity whose profile write failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrphanIdentityPolicy {
    /// Leave the identity in place and log it.
    #[default]
    Retain,
    /// Delete the identity before reporting the failure.
    Compensate,
}

/// Error returned when parsing an unknown orphan policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown orphan policy '{0}'; expected retain|compensate")]
pub struct UnknownOrphanPolicyError(pub String);

impl FromStr for OrphanIdentityPolicy {
    type Err = UnknownOrphanPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "retain" => Ok(Self::Retain),
            "compensate" => Ok(Self::Compensate),
            _ => Err(UnknownOrphanPolicyError(s.to_owned())),
        }
    }
}

impl fmt::Display for OrphanIdentityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Retain => "retain",
            Self::Compensate => "compensate",
        })
    }
}

/// Secret names consulted for invite codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteCodeNames {
    /// Secret holding the admin invite code.
    pub admin: String,
    /// Secret holding the clinician invite code.
    pub clinician: String,
}

impl Default for InviteCodeNames {
    fn default() -> Self {
        Self {
            admin: ADMIN_CODE_SECRET.to_owned(),
            clinician: CLINICIAN_CODE_SECRET.to_owned(),
        }
    }
}

/// Registration service implementing the [`UserRegistration`] driving port.
///
/// Collaborators are injected once at process start; secrets are resolved
/// afresh on every call.
pub struct UserRegistrationService<I: ?Sized, P: ?Sized, S: ?Sized> {
    identity: Arc<I>,
    profiles: Arc<P>,
    secrets: Arc<S>,
    invite_codes: InviteCodeNames,
    orphan_policy: OrphanIdentityPolicy,
}

impl<I: ?Sized, P: ?Sized, S: ?Sized> Clone for UserRegistrationService<I, P, S> {
    fn clone(&self) -> Self {
        Self {
            identity: Arc::clone(&self.identity),
            profiles: Arc::clone(&self.profiles),
            secrets: Arc::clone(&self.secrets),
            invite_codes: self.invite_codes.clone(),
            orphan_policy: self.orphan_policy,
        }
    }
}

impl<I: ?Sized, P: ?Sized, S: ?Sized> UserRegistrationService<I, P, S> {
    /// Create a service with default secret names and [`OrphanIdentityPolicy::Retain`].
    pub fn new(identity: Arc<I>, profiles: Arc<P>, secrets: Arc<S>) -> Self {
        Self {
            identity,
            profiles,
            secrets,
            invite_codes: InviteCodeNames::default(),
            orphan_policy: OrphanIdentityPolicy::default(),
        }
    }

    /// Override the secret names consulted for invite codes.
    #[must_use]
    pub fn with_invite_code_names(mut self, invite_codes: InviteCodeNames) -> Self {
        self.invite_codes = invite_codes;
        self
    }

    /// Select how orphan identities are handled.
    #[must_use]
    pub fn with_orphan_policy(mut self, orphan_policy: OrphanIdentityPolicy) -> Self {
        self.orphan_policy = orphan_policy;
        self
    }
}

impl<I, P, S> UserRegistrationService<I, P, S>
where
    I: IdentityProvider + ?Sized,
    P: ProfileStore + ?Sized,
    S: SecretProvider + ?Sized,
{
    fn map_validation_error(error: RegistrationValidationError) -> Error {
        match error {
            RegistrationValidationError::MissingField(field) => {
                Error::invalid_argument(MISSING_FIELDS_MESSAGE).with_details(json!({
                    "field": field.as_str(),
                    "code": "missing_field",
                }))
            }
            RegistrationValidationError::WeakPassword(violation) => {
                Error::invalid_argument(WEAK_PASSWORD_MESSAGE).with_details(json!({
                    "field": "password",
                    "code": violation.code(),
                }))
            }
        }
    }

    fn map_identity_error(error: IdentityProviderError) -> Error {
        match error {
            IdentityProviderError::EmailAlreadyExists => Error::already_exists(EMAIL_IN_USE_MESSAGE),
            other => {
                error!(error = %other, "identity creation failed");
                Error::internal(CREATE_FAILED_MESSAGE)
            }
        }
    }

    async fn secret(&self, name: &str) -> Option<Zeroizing<String>> {
        match self.secrets.value(name).await {
            Ok(Some(value)) if !value.is_empty() => Some(value),
            Ok(_) => {
                warn!(secret = name, "invite secret not provisioned; codes cannot match it");
                None
            }
            Err(err) => {
                warn!(secret = name, error = %err, "invite secret lookup failed; treating as absent");
                None
            }
        }
    }

    async fn invite_secrets(&self) -> InviteSecrets {
        let admin = self.secret(&self.invite_codes.admin).await;
        let clinician = self.secret(&self.invite_codes.clinician).await;
        InviteSecrets::new(admin, clinician)
    }

    async fn handle_orphan(&self, user_id: &UserId, cause: &ProfileStoreError) {
        match self.orphan_policy {
            OrphanIdentityPolicy::Retain => {
                error!(
                    uid = %user_id,
                    error = %cause,
                    "profile write failed; identity left without a profile"
                );
            }
            OrphanIdentityPolicy::Compensate => {
                error!(
                    uid = %user_id,
                    error = %cause,
                    "profile write failed; deleting identity"
                );
                if let Err(delete_error) = self.identity.delete_user(user_id).await {
                    error!(
                        uid = %user_id,
                        error = %delete_error,
                        "compensating identity delete failed; identity left without a profile"
                    );
                }
            }
        }
    }
}

#[async_trait]
impl<I, P, S> UserRegistration for UserRegistrationService<I, P, S>
where
    I: IdentityProvider + ?Sized,
    P: ProfileStore + ?Sized,
    S: SecretProvider + ?Sized,
{
    async fn register(&self, request: RegistrationRequest) -> Result<RegistrationResult, Error> {
        let registration =
            NewRegistration::try_from_request(request).map_err(Self::map_validation_error)?;

        let role = self.invite_secrets().await.resolve(registration.invite_code());
        debug!(email = registration.email(), %role, "role resolved");

        let user_id = self
            .identity
            .create_user(
                registration.email(),
                registration.password(),
                &registration.display_name(),
            )
            .await
            .map_err(Self::map_identity_error)?;

        if let Err(err) = self
            .profiles
            .set(&user_id, &registration.profile(role))
            .await
        {
            self.handle_orphan(&user_id, &err).await;
            return Err(Error::internal(CREATE_FAILED_MESSAGE));
        }

        info!(uid = %user_id, %role, "user registered");
        Ok(RegistrationResult { uid: user_id, role })
    }
}

#[cfg(test)]
#[path = "registration_service_tests.rs"]
mod tests;
