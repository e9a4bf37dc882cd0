//! Reqwest-backed Identity Toolkit adapter.
//!
//! This adapter owns transport details only: request serialisation, bearer
//! authentication, timeout and HTTP error mapping, and decoding the assigned
//! `localId` into a domain [`UserId`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, error};
use zeroize::Zeroizing;

use super::dto::{
    CreateAccountRequestDto, CreateAccountResponseDto, DeleteAccountRequestDto, ErrorEnvelopeDto,
};
use crate::domain::UserId;
use crate::domain::ports::{IdentityProvider, IdentityProviderError};
use crate::outbound::http_support::{body_preview, endpoint};

/// Public Identity Toolkit endpoint.
pub const IDENTITY_TOOLKIT_DEFAULT_URL: &str = "https://identitytoolkit.googleapis.com";

const EMAIL_EXISTS_REASONS: &[&str] = &["EMAIL_EXISTS", "DUPLICATE_EMAIL"];
const USER_NOT_FOUND_REASON: &str = "USER_NOT_FOUND";

/// Connection settings for [`IdentityToolkitProvider`].
pub struct IdentityToolkitConfig {
    /// API root, e.g. [`IDENTITY_TOOLKIT_DEFAULT_URL`] or an emulator URL.
    pub base_url: String,
    /// Project owning the identities.
    pub project_id: String,
    /// OAuth2 access token sent as a bearer credential.
    pub access_token: Zeroizing<String>,
}

/// Identity provider that creates accounts through the admin REST API.
pub struct IdentityToolkitProvider {
    client: Client,
    accounts_url: String,
    delete_url: String,
    access_token: Zeroizing<String>,
}

impl IdentityToolkitProvider {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use registration::outbound::identity::{
    ///     IDENTITY_TOOLKIT_DEFAULT_URL, IdentityToolkitConfig, IdentityToolkitProvider,
    /// };
    /// use zeroize::Zeroizing;
    ///
    /// let config = IdentityToolkitConfig {
    ///     base_url: IDENTITY_TOOLKIT_DEFAULT_URL.to_owned(),
    ///     project_id: "demo-project".to_owned(),
    ///     access_token: Zeroizing::new("ya29.token".to_owned()),
    /// };
    /// assert!(IdentityToolkitProvider::new(config, Duration::from_secs(30)).is_ok());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: IdentityToolkitConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        let accounts_path = format!("v1/projects/{}/accounts", config.project_id);
        Ok(Self {
            client,
            accounts_url: endpoint(&config.base_url, &accounts_path),
            delete_url: endpoint(&config.base_url, &format!("{accounts_path}:delete")),
            access_token: config.access_token,
        })
    }

    async fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<(StatusCode, Vec<u8>), IdentityProviderError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(self.access_token.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        Ok((status, body.to_vec()))
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkitProvider {
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<UserId, IdentityProviderError> {
        let request = CreateAccountRequestDto {
            email,
            password,
            display_name,
        };
        let (status, body) = self.post_json(&self.accounts_url, &request).await?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_local_id(body.as_ref())
    }

    async fn delete_user(&self, user_id: &UserId) -> Result<(), IdentityProviderError> {
        let request = DeleteAccountRequestDto {
            local_id: user_id.as_ref(),
        };
        let (status, body) = self.post_json(&self.delete_url, &request).await?;
        if !status.is_success() {
            return Err(match map_status_error(status, body.as_ref()) {
                IdentityProviderError::Rejected { message }
                    if message.contains(USER_NOT_FOUND_REASON) =>
                {
                    IdentityProviderError::not_found(user_id.as_ref())
                }
                other => other,
            });
        }
        debug!(uid = %user_id, "identity deleted");
        Ok(())
    }
}

fn parse_local_id(body: &[u8]) -> Result<UserId, IdentityProviderError> {
    let decoded: CreateAccountResponseDto = serde_json::from_slice(body).map_err(|error| {
        IdentityProviderError::transport(format!("invalid account payload: {error}"))
    })?;
    UserId::new(&decoded.local_id).map_err(|error| {
        error!(
            local_id = %decoded.local_id,
            error = %error,
            "identity created with unusable localId; account is orphaned"
        );
        IdentityProviderError::transport(format!(
            "unusable localId '{}' in account payload: {error}",
            decoded.local_id
        ))
    })
}

fn map_transport_error(error: reqwest::Error) -> IdentityProviderError {
    if error.is_timeout() {
        IdentityProviderError::timeout(error.to_string())
    } else {
        IdentityProviderError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> IdentityProviderError {
    if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelopeDto>(body) {
        let reason = envelope.error.reason();
        if EMAIL_EXISTS_REASONS.contains(&reason) {
            return IdentityProviderError::email_already_exists();
        }
        if !reason.is_empty() && status.is_client_error() {
            return IdentityProviderError::rejected(format!(
                "status {}: {}",
                status.as_u16(),
                envelope.error.message
            ));
        }
    }

    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            IdentityProviderError::timeout(message)
        }
        _ if status.is_client_error() => IdentityProviderError::rejected(message),
        _ => IdentityProviderError::transport(message),
    }
}
