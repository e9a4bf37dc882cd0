//! Registration input and its validation.
//!
//! Inbound adapters hand the raw, possibly incomplete payload to
//! [`NewRegistration::try_from_request`], which enforces the required fields
//! and the password policy before any side effect happens.

use std::fmt;

use zeroize::Zeroizing;

use crate::domain::{NewUserProfile, PasswordPolicyViolation, Role, check_password};

/// Raw registration payload as received from a caller.
///
/// Every field is optional so missing values surface as domain validation
/// errors rather than transport decode failures.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RegistrationRequest {
    /// Email address for the identity record.
    pub email: Option<String>,
    /// Plain-text password; held only for the lifetime of the request.
    pub password: Option<Zeroizing<String>>,
    /// Chosen handle.
    pub username: Option<String>,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Optional invite code used to resolve the role.
    pub invite_code: Option<Zeroizing<String>>,
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("username", &self.username)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("invite_code", &self.invite_code.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Required registration fields, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    /// `email`
    Email,
    /// `password`
    Password,
    /// `username`
    Username,
    /// `firstName`
    FirstName,
    /// `lastName`
    LastName,
}

impl RequiredField {
    /// Wire name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Password => "password",
            Self::Username => "username",
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
        }
    }
}

/// Validation failures raised before any collaborator is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationValidationError {
    /// A required field was absent or empty.
    #[error("missing required field: {}", .0.as_str())]
    MissingField(RequiredField),
    /// The password failed the policy.
    #[error("password does not meet policy: {0}")]
    WeakPassword(PasswordPolicyViolation),
}

/// Registration input that has passed validation.
///
/// ## Invariants
/// - `email`, `password`, `username`, `first_name` and `last_name` are
///   non-empty.
/// - `password` satisfies the password policy.
#[derive(Clone, PartialEq, Eq)]
pub struct NewRegistration {
    email: String,
    password: Zeroizing<String>,
    username: String,
    first_name: String,
    last_name: String,
    invite_code: Option<Zeroizing<String>>,
}

fn require(value: Option<String>, field: RequiredField) -> Result<String, RegistrationValidationError> {
    value
        .filter(|value| !value.is_empty())
        .ok_or(RegistrationValidationError::MissingField(field))
}

impl NewRegistration {
    /// Validate a raw request.
    ///
    /// Every required field is checked before the password policy, so a
    /// request with both problems reports the missing field.
    ///
    /// # Examples
    /// ```
    /// use registration::domain::{NewRegistration, RegistrationRequest};
    /// use zeroize::Zeroizing;
    ///
    /// let request = RegistrationRequest {
    ///     email: Some("a@x.com".into()),
    ///     password: Some(Zeroizing::new("Abcdef1!".into())),
    ///     username: Some("a1".into()),
    ///     first_name: Some("A".into()),
    ///     last_name: Some("B".into()),
    ///     invite_code: None,
    /// };
    /// let registration = NewRegistration::try_from_request(request).expect("valid");
    /// assert_eq!(registration.display_name(), "A B");
    /// ```
    pub fn try_from_request(
        request: RegistrationRequest,
    ) -> Result<Self, RegistrationValidationError> {
        let RegistrationRequest {
            email,
            password,
            username,
            first_name,
            last_name,
            invite_code,
        } = request;

        let email = require(email, RequiredField::Email)?;
        let password = password
            .filter(|password| !password.is_empty())
            .ok_or(RegistrationValidationError::MissingField(
                RequiredField::Password,
            ))?;
        let username = require(username, RequiredField::Username)?;
        let first_name = require(first_name, RequiredField::FirstName)?;
        let last_name = require(last_name, RequiredField::LastName)?;

        check_password(&password).map_err(RegistrationValidationError::WeakPassword)?;

        Ok(Self {
            email,
            password,
            username,
            first_name,
            last_name,
            invite_code,
        })
    }

    /// Email address for the identity record.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password that satisfied the policy.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Chosen handle.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Given name.
    pub fn first_name(&self) -> &str {
        self.first_name.as_str()
    }

    /// Family name.
    pub fn last_name(&self) -> &str {
        self.last_name.as_str()
    }

    /// Invite code supplied by the caller, if any.
    pub fn invite_code(&self) -> Option<&str> {
        self.invite_code.as_deref().map(String::as_str)
    }

    /// Display name for the identity record: `"<first> <last>"`, trimmed.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }

    /// Profile attributes to persist once the identity exists.
    #[must_use]
    pub fn profile(&self, role: Role) -> NewUserProfile {
        NewUserProfile {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            role,
        }
    }
}

impl fmt::Debug for NewRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewRegistration")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn valid_request() -> RegistrationRequest {
        RegistrationRequest {
            email: Some("a@x.com".into()),
            password: Some(Zeroizing::new("Abcdef1!".into())),
            username: Some("a1".into()),
            first_name: Some("A".into()),
            last_name: Some("B".into()),
            invite_code: Some(Zeroizing::new("code".into())),
        }
    }

    fn without(mut request: RegistrationRequest, field: RequiredField) -> RegistrationRequest {
        match field {
            RequiredField::Email => request.email = None,
            RequiredField::Password => request.password = None,
            RequiredField::Username => request.username = None,
            RequiredField::FirstName => request.first_name = None,
            RequiredField::LastName => request.last_name = None,
        }
        request
    }

    fn blank(mut request: RegistrationRequest, field: RequiredField) -> RegistrationRequest {
        match field {
            RequiredField::Email => request.email = Some(String::new()),
            RequiredField::Password => request.password = Some(Zeroizing::new(String::new())),
            RequiredField::Username => request.username = Some(String::new()),
            RequiredField::FirstName => request.first_name = Some(String::new()),
            RequiredField::LastName => request.last_name = Some(String::new()),
        }
        request
    }

    #[rstest]
    #[case(RequiredField::Email)]
    #[case(RequiredField::Password)]
    #[case(RequiredField::Username)]
    #[case(RequiredField::FirstName)]
    #[case(RequiredField::LastName)]
    fn absent_fields_are_rejected(valid_request: RegistrationRequest, #[case] field: RequiredField) {
        let err = NewRegistration::try_from_request(without(valid_request, field))
            .expect_err("missing field must fail");
        assert_eq!(err, RegistrationValidationError::MissingField(field));
    }

    #[rstest]
    #[case(RequiredField::Email)]
    #[case(RequiredField::Password)]
    #[case(RequiredField::Username)]
    #[case(RequiredField::FirstName)]
    #[case(RequiredField::LastName)]
    fn empty_fields_are_rejected(valid_request: RegistrationRequest, #[case] field: RequiredField) {
        let err = NewRegistration::try_from_request(blank(valid_request, field))
            .expect_err("empty field must fail");
        assert_eq!(err, RegistrationValidationError::MissingField(field));
    }

    #[rstest]
    fn missing_field_is_reported_before_weak_password(valid_request: RegistrationRequest) {
        let mut request = without(valid_request, RequiredField::LastName);
        request.password = Some(Zeroizing::new("weak".into()));
        let err = NewRegistration::try_from_request(request).expect_err("must fail");
        assert_eq!(
            err,
            RegistrationValidationError::MissingField(RequiredField::LastName)
        );
    }

    #[rstest]
    fn weak_password_is_rejected(mut valid_request: RegistrationRequest) {
        valid_request.password = Some(Zeroizing::new("abcdefg1!".into()));
        let err = NewRegistration::try_from_request(valid_request).expect_err("must fail");
        assert_eq!(
            err,
            RegistrationValidationError::WeakPassword(PasswordPolicyViolation::MissingUppercase)
        );
    }

    #[rstest]
    fn whitespace_only_names_are_accepted_and_display_name_is_trimmed(
        mut valid_request: RegistrationRequest,
    ) {
        valid_request.first_name = Some("  ".into());
        valid_request.last_name = Some("Lovelace".into());
        let registration =
            NewRegistration::try_from_request(valid_request).expect("present fields pass");
        assert_eq!(registration.display_name(), "Lovelace");
    }

    #[rstest]
    fn profile_copies_request_fields(valid_request: RegistrationRequest) {
        let registration = NewRegistration::try_from_request(valid_request).expect("valid");
        let profile = registration.profile(Role::Admin);
        assert_eq!(
            profile,
            NewUserProfile {
                first_name: "A".into(),
                last_name: "B".into(),
                username: "a1".into(),
                email: "a@x.com".into(),
                role: Role::Admin,
            }
        );
        assert_eq!(registration.invite_code(), Some("code"));
    }

    #[rstest]
    fn debug_output_redacts_secrets(valid_request: RegistrationRequest) {
        let rendered = format!("{valid_request:?}");
        assert!(!rendered.contains("Abcdef1!"));
        assert!(!rendered.contains("code\""));
        let registration = NewRegistration::try_from_request(valid_request).expect("valid");
        assert!(!format!("{registration:?}").contains("Abcdef1!"));
    }
}
