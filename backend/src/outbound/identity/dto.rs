//! DTOs for the Identity Toolkit admin REST API.
//!
//! Requests serialise straight from borrowed domain values; responses decode
//! into these shapes before the adapter maps them to domain ids and errors.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateAccountRequestDto<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
    pub(super) display_name: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateAccountResponseDto {
    pub(super) local_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DeleteAccountRequestDto<'a> {
    pub(super) local_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorEnvelopeDto {
    pub(super) error: ErrorBodyDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBodyDto {
    #[serde(default)]
    pub(super) message: String,
}

impl ErrorBodyDto {
    /// Leading error token, e.g. `WEAK_PASSWORD` from
    /// `"WEAK_PASSWORD : Password should be at least 6 characters"`.
    pub(super) fn reason(&self) -> &str {
        self.message
            .split([' ', ':'])
            .find(|token| !token.is_empty())
            .unwrap_or_default()
    }
}
