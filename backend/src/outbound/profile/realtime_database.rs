//! Reqwest-backed Realtime Database profile store.
//!
//! Profiles are written with a REST `PUT` to `<database>/users/<uid>.json`.
//! `createdAt` is sent as the server-value placeholder so the database, not
//! this process, assigns the timestamp.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::{Value, json};
use zeroize::Zeroizing;

use crate::domain::ports::{ProfileStore, ProfileStoreError};
use crate::domain::{NewUserProfile, UserId};
use crate::outbound::http_support::{body_preview, endpoint};

/// Connection settings for [`RealtimeDatabaseProfileStore`].
pub struct RealtimeDatabaseConfig {
    /// Database root, e.g. `https://<instance>.firebaseio.com`.
    pub database_url: String,
    /// OAuth2 access token sent as a bearer credential.
    pub access_token: Zeroizing<String>,
}

/// Profile store writing to a Realtime Database over REST.
pub struct RealtimeDatabaseProfileStore {
    client: Client,
    database_url: String,
    access_token: Zeroizing<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileWriteDto<'a> {
    #[serde(flatten)]
    profile: &'a NewUserProfile,
    created_at: Value,
}

impl<'a> ProfileWriteDto<'a> {
    fn new(profile: &'a NewUserProfile) -> Self {
        Self {
            profile,
            created_at: json!({ ".sv": "timestamp" }),
        }
    }
}

impl RealtimeDatabaseProfileStore {
    /// Build a store using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: RealtimeDatabaseConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            database_url: config.database_url,
            access_token: config.access_token,
        })
    }

    fn profile_url(&self, user_id: &UserId) -> String {
        endpoint(&self.database_url, &format!("{}.json", user_id.profile_key()))
    }
}

#[async_trait]
impl ProfileStore for RealtimeDatabaseProfileStore {
    async fn set(
        &self,
        user_id: &UserId,
        profile: &NewUserProfile,
    ) -> Result<(), ProfileStoreError> {
        let response = self
            .client
            .put(self.profile_url(user_id))
            .bearer_auth(self.access_token.as_str())
            .json(&ProfileWriteDto::new(profile))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        Err(map_status_error(status, body.as_ref()))
    }
}

fn map_transport_error(error: reqwest::Error) -> ProfileStoreError {
    if error.is_timeout() {
        ProfileStoreError::connection(format!("timed out: {error}"))
    } else {
        ProfileStoreError::connection(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ProfileStoreError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            ProfileStoreError::connection(message)
        }
        _ => ProfileStoreError::write(message),
    }
}
