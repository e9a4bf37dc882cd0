//! Roles and invite-code role resolution.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Role assigned to a newly registered user.
///
/// Serialised as `"Admin"` / `"Clinician"` in API responses and stored
/// profiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Elevated role granted by the admin invite code.
    Admin,
    /// Default role.
    #[default]
    Clinician,
}

impl Role {
    /// Wire spelling of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Clinician => "Clinician",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRoleError(pub String);

impl FromStr for Role {
    type Err = UnknownRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Self::Admin),
            "Clinician" => Ok(Self::Clinician),
            other => Err(UnknownRoleError(other.to_owned())),
        }
    }
}

/// Invite secrets resolved for a single registration.
///
/// Values are wiped from memory on drop. An absent secret never matches.
#[derive(Default)]
pub struct InviteSecrets {
    admin: Option<Zeroizing<String>>,
    clinician: Option<Zeroizing<String>>,
}

impl InviteSecrets {
    /// Build the secret pair from optional values.
    pub fn new(admin: Option<Zeroizing<String>>, clinician: Option<Zeroizing<String>>) -> Self {
        Self { admin, clinician }
    }

    /// Admin invite code, if provisioned.
    pub fn admin(&self) -> Option<&str> {
        self.admin.as_deref().map(String::as_str)
    }

    /// Clinician invite code, if provisioned.
    pub fn clinician(&self) -> Option<&str> {
        self.clinician.as_deref().map(String::as_str)
    }

    /// Resolve the role for `invite_code` against these secrets.
    pub fn resolve(&self, invite_code: Option<&str>) -> Role {
        resolve_role(invite_code, self.admin(), self.clinician())
    }
}

impl fmt::Debug for InviteSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InviteSecrets")
            .field("admin", &self.admin.as_ref().map(|_| "<redacted>"))
            .field("clinician", &self.clinician.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Resolve a role from an optional invite code.
///
/// - a non-empty code equal to `admin_secret` yields [`Role::Admin`];
/// - a non-empty code equal to `clinician_secret` yields [`Role::Clinician`];
/// - anything else, including an absent or empty code, yields the default
///   [`Role::Clinician`].
///
/// Comparison is exact string equality. It is not constant-time.
///
/// # Examples
/// ```
/// use registration::domain::{Role, resolve_role};
///
/// assert_eq!(resolve_role(Some("opensesame"), Some("opensesame"), None), Role::Admin);
/// assert_eq!(resolve_role(Some("nope"), Some("opensesame"), None), Role::Clinician);
/// assert_eq!(resolve_role(None, Some("opensesame"), None), Role::Clinician);
/// ```
#[must_use]
pub fn resolve_role(
    invite_code: Option<&str>,
    admin_secret: Option<&str>,
    clinician_secret: Option<&str>,
) -> Role {
    let Some(code) = invite_code.filter(|code| !code.is_empty()) else {
        return Role::default();
    };
    if admin_secret == Some(code) {
        Role::Admin
    } else if clinician_secret == Some(code) {
        Role::Clinician
    } else {
        Role::default()
    }
}
