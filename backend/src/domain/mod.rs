//! Domain primitives, the registration service, and its ports.
//!
//! Purpose: Define strongly typed registration input, roles and profiles,
//! plus the orchestration that turns a validated request into an identity
//! and a stored profile. Serialisation contracts are documented on each
//! type.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - RegistrationRequest / NewRegistration: raw and validated input.
//! - Role and `resolve_role`: invite-code role resolution.
//! - UserRegistrationService: implementation of the registration port.

pub mod error;
pub mod password_policy;
pub mod ports;
pub mod registration;
pub mod registration_service;
pub mod role;
pub mod trace_id;
pub mod user;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::password_policy::{
    PASSWORD_MAX_LEN, PASSWORD_MIN_LEN, PASSWORD_SYMBOLS, PasswordPolicyViolation,
    check_password, is_valid_password,
};
pub use self::registration::{
    NewRegistration, RegistrationRequest, RegistrationValidationError, RequiredField,
};
pub use self::registration_service::{
    ADMIN_CODE_SECRET, CLINICIAN_CODE_SECRET, InviteCodeNames, OrphanIdentityPolicy,
    UnknownOrphanPolicyError, UserRegistrationService,
};
pub use self::role::{InviteSecrets, Role, UnknownRoleError, resolve_role};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    NewUserProfile, RegistrationResult, UserId, UserProfile, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use registration::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::already_exists("taken"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
