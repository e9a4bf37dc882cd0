//! Builders turning validated settings into adapters and HTTP state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::info;
use zeroize::Zeroizing;

use registration::domain::UserRegistrationService;
use registration::domain::ports::{IdentityProvider, ProfileStore, SecretProvider};
use registration::inbound::http::state::HttpState;
use registration::outbound::identity::{
    IdentityToolkitConfig, IdentityToolkitProvider, InMemoryIdentityProvider,
};
use registration::outbound::profile::{
    InMemoryProfileStore, RealtimeDatabaseConfig, RealtimeDatabaseProfileStore,
};
use registration::outbound::secrets::EnvSecretProvider;
use registration::settings::{IdentityBackend, ProfileBackend, RegistrationConfig};

use super::ServerConfig;

/// Errors raised while wiring adapters at startup.
#[derive(Debug, thiserror::Error)]
pub enum StateBuildError {
    /// The access token file could not be read.
    #[error("failed to read access token at {path}: {source}")]
    AccessToken {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The access token file is empty.
    #[error("access token at {path} is empty")]
    EmptyAccessToken { path: PathBuf },
    /// A remote adapter was selected without an access token file.
    #[error("remote backends require an access token file")]
    MissingAccessToken,
    /// The HTTP client for a remote adapter could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Read a bearer token from `path`, trimming surrounding whitespace.
pub(crate) fn read_access_token(path: &Path) -> Result<Zeroizing<String>, StateBuildError> {
    let raw = Zeroizing::new(std::fs::read_to_string(path).map_err(|source| {
        StateBuildError::AccessToken {
            path: path.to_path_buf(),
            source,
        }
    })?);
    let token = raw.trim();
    if token.is_empty() {
        return Err(StateBuildError::EmptyAccessToken {
            path: path.to_path_buf(),
        });
    }
    Ok(Zeroizing::new(token.to_owned()))
}

fn access_token(config: &RegistrationConfig) -> Result<Zeroizing<String>, StateBuildError> {
    let path = config
        .access_token_file
        .as_deref()
        .ok_or(StateBuildError::MissingAccessToken)?;
    read_access_token(path)
}

fn build_identity_provider(
    config: &RegistrationConfig,
) -> Result<Arc<dyn IdentityProvider>, StateBuildError> {
    match &config.identity {
        IdentityBackend::Memory => Ok(Arc::new(InMemoryIdentityProvider::new())),
        IdentityBackend::IdentityToolkit {
            base_url,
            project_id,
        } => {
            let provider = IdentityToolkitProvider::new(
                IdentityToolkitConfig {
                    base_url: base_url.clone(),
                    project_id: project_id.clone(),
                    access_token: access_token(config)?,
                },
                config.request_timeout,
            )?;
            Ok(Arc::new(provider))
        }
    }
}

fn build_profile_store(
    config: &RegistrationConfig,
) -> Result<Arc<dyn ProfileStore>, StateBuildError> {
    match &config.profile {
        ProfileBackend::Memory => Ok(Arc::new(InMemoryProfileStore::new(Arc::new(DefaultClock)))),
        ProfileBackend::RealtimeDatabase { database_url } => {
            let store = RealtimeDatabaseProfileStore::new(
                RealtimeDatabaseConfig {
                    database_url: database_url.clone(),
                    access_token: access_token(config)?,
                },
                config.request_timeout,
            )?;
            Ok(Arc::new(store))
        }
    }
}

/// Build the HTTP state holding the registration use-case.
pub fn build_http_state(config: &ServerConfig) -> Result<web::Data<HttpState>, StateBuildError> {
    let registration = &config.registration;
    let identity = build_identity_provider(registration)?;
    let profiles = build_profile_store(registration)?;
    let secrets: Arc<dyn SecretProvider> = Arc::new(EnvSecretProvider::from_process());

    info!(
        identity = ?registration.identity,
        profile = ?registration.profile,
        orphan_policy = %registration.orphan_policy,
        "registration adapters wired"
    );

    let service = UserRegistrationService::new(identity, profiles, secrets)
        .with_invite_code_names(registration.invite_codes.clone())
        .with_orphan_policy(registration.orphan_policy);
    Ok(web::Data::new(HttpState::new(Arc::new(service))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use registration::settings::RegistrationSettings;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn token_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write token");
        file
    }

    #[test]
    fn access_token_is_trimmed() {
        let file = token_file("  ya29.token\n");
        let token = read_access_token(file.path()).expect("token reads");
        assert_eq!(token.as_str(), "ya29.token");
    }

    #[test]
    fn blank_access_token_is_rejected() {
        let file = token_file(" \n");
        let err = read_access_token(file.path()).expect_err("blank token");
        assert!(matches!(err, StateBuildError::EmptyAccessToken { .. }));
    }

    #[test]
    fn missing_access_token_file_is_reported() {
        let err = read_access_token(Path::new("/nonexistent/registration/token"))
            .expect_err("missing file");
        assert!(matches!(err, StateBuildError::AccessToken { .. }));
    }

    #[test]
    fn memory_backends_build_without_token() {
        let config = RegistrationSettings::default()
            .validate()
            .expect("defaults validate");
        assert!(build_http_state(&ServerConfig::new(config)).is_ok());
    }

    #[test]
    fn remote_backends_read_the_token_file() {
        let file = token_file("ya29.token");
        let settings = RegistrationSettings {
            identity_backend: Some("identity-toolkit".into()),
            profile_backend: Some("realtime-database".into()),
            project_id: Some("demo-project".into()),
            database_url: Some("https://demo.firebaseio.com".into()),
            access_token_file: Some(file.path().to_path_buf()),
            ..RegistrationSettings::default()
        };
        let config = settings.validate().expect("remote settings validate");
        assert!(build_http_state(&ServerConfig::new(config)).is_ok());
    }
}
