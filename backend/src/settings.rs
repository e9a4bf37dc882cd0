//! Registration service configuration loaded via OrthoConfig.
//!
//! Raw values come from `REGISTRATION_*` environment variables, CLI flags or a
//! config file. [`RegistrationSettings::validate`] turns them into a
//! [`RegistrationConfig`] describing which adapters to wire.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;

use crate::domain::{
    ADMIN_CODE_SECRET, CLINICIAN_CODE_SECRET, InviteCodeNames, OrphanIdentityPolicy,
};
use crate::outbound::identity::IDENTITY_TOOLKIT_DEFAULT_URL;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Raw configuration values for the registration service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REGISTRATION")]
#[serde(default)]
pub struct RegistrationSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// Identity adapter: `memory` or `identity-toolkit`.
    pub identity_backend: Option<String>,
    /// Profile adapter: `memory` or `realtime-database`.
    pub profile_backend: Option<String>,
    /// Project owning identities; required by `identity-toolkit`.
    pub project_id: Option<String>,
    /// Identity Toolkit API root, e.g. an emulator URL.
    pub identity_toolkit_url: Option<String>,
    /// Realtime Database root; required by `realtime-database`.
    pub database_url: Option<String>,
    /// File holding the OAuth2 access token for remote adapters.
    pub access_token_file: Option<PathBuf>,
    /// Environment variable holding the admin invite code.
    pub admin_code_env: Option<String>,
    /// Environment variable holding the clinician invite code.
    pub clinician_code_env: Option<String>,
    /// Timeout applied to every outbound HTTP call.
    #[ortho_config(default = 30)]
    pub request_timeout_secs: u64,
    /// Orphan identity handling: `retain` or `compensate`.
    pub orphan_policy: Option<String>,
}

impl Default for RegistrationSettings {
    fn default() -> Self {
        Self {
            bind_addr: None,
            identity_backend: None,
            profile_backend: None,
            project_id: None,
            identity_toolkit_url: None,
            database_url: None,
            access_token_file: None,
            admin_code_env: None,
            clinician_code_env: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            orphan_policy: None,
        }
    }
}

/// Errors raised while validating [`RegistrationSettings`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// A setting required by the selected adapters is absent.
    #[error("missing required setting {name} (needed by {needed_by})")]
    Missing {
        name: &'static str,
        needed_by: &'static str,
    },
    /// A setting is present but unusable.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Identity adapter selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityBackend {
    /// Process-local provider for development and tests.
    Memory,
    /// Identity Toolkit admin REST API.
    IdentityToolkit {
        /// API root.
        base_url: String,
        /// Project owning the identities.
        project_id: String,
    },
}

/// Profile adapter selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileBackend {
    /// Process-local store for development and tests.
    Memory,
    /// Realtime Database REST API.
    RealtimeDatabase {
        /// Database root.
        database_url: String,
    },
}

/// Validated configuration consumed by the server wiring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationConfig {
    /// Socket address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Identity adapter selection.
    pub identity: IdentityBackend,
    /// Profile adapter selection.
    pub profile: ProfileBackend,
    /// Access token file; present whenever a remote adapter is selected.
    pub access_token_file: Option<PathBuf>,
    /// Secret names consulted for invite codes.
    pub invite_codes: InviteCodeNames,
    /// Timeout applied to every outbound HTTP call.
    pub request_timeout: Duration,
    /// Orphan identity handling.
    pub orphan_policy: OrphanIdentityPolicy,
}

impl RegistrationConfig {
    /// Whether any selected adapter talks to a remote service.
    pub fn uses_remote_backend(&self) -> bool {
        !matches!(
            (&self.identity, &self.profile),
            (IdentityBackend::Memory, ProfileBackend::Memory)
        )
    }
}

impl RegistrationSettings {
    /// Validate the raw settings and resolve defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when a value cannot be parsed or a remote
    /// adapter is selected without the settings it needs.
    ///
    /// # Examples
    /// ```
    /// use registration::settings::{IdentityBackend, RegistrationSettings};
    ///
    /// let config = RegistrationSettings::default().validate().expect("defaults are valid");
    /// assert_eq!(config.identity, IdentityBackend::Memory);
    /// assert_eq!(config.bind_addr.port(), 8080);
    /// ```
    pub fn validate(&self) -> Result<RegistrationConfig, SettingsError> {
        let bind_addr_raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        let bind_addr = bind_addr_raw
            .parse::<SocketAddr>()
            .map_err(|_| SettingsError::Invalid {
                name: "bind_addr",
                value: bind_addr_raw.to_owned(),
                expected: "host:port socket address",
            })?;

        let identity = self.identity_backend()?;
        let profile = self.profile_backend()?;

        let request_timeout_secs = self.request_timeout_secs;
        if request_timeout_secs == 0 {
            return Err(SettingsError::Invalid {
                name: "request_timeout_secs",
                value: request_timeout_secs.to_string(),
                expected: "a positive number of seconds",
            });
        }

        let orphan_policy = match self.orphan_policy.as_deref() {
            None => OrphanIdentityPolicy::default(),
            Some(raw) => raw
                .parse::<OrphanIdentityPolicy>()
                .map_err(|_| SettingsError::Invalid {
                    name: "orphan_policy",
                    value: raw.to_owned(),
                    expected: "retain|compensate",
                })?,
        };

        let config = RegistrationConfig {
            bind_addr,
            identity,
            profile,
            access_token_file: self.access_token_file.clone(),
            invite_codes: InviteCodeNames {
                admin: env_name(self.admin_code_env.as_deref(), ADMIN_CODE_SECRET),
                clinician: env_name(self.clinician_code_env.as_deref(), CLINICIAN_CODE_SECRET),
            },
            request_timeout: Duration::from_secs(request_timeout_secs),
            orphan_policy,
        };
        if config.uses_remote_backend() && config.access_token_file.is_none() {
            return Err(SettingsError::Missing {
                name: "access_token_file",
                needed_by: "remote identity or profile backends",
            });
        }
        Ok(config)
    }

    fn identity_backend(&self) -> Result<IdentityBackend, SettingsError> {
        match normalised(self.identity_backend.as_deref()).as_deref() {
            None | Some("memory") => Ok(IdentityBackend::Memory),
            Some("identity-toolkit") => {
                let project_id = non_blank(self.project_id.as_deref()).ok_or(
                    SettingsError::Missing {
                        name: "project_id",
                        needed_by: "identity-toolkit",
                    },
                )?;
                let base_url = self
                    .identity_toolkit_url
                    .as_deref()
                    .unwrap_or(IDENTITY_TOOLKIT_DEFAULT_URL);
                Ok(IdentityBackend::IdentityToolkit {
                    base_url: http_url("identity_toolkit_url", base_url)?,
                    project_id: project_id.to_owned(),
                })
            }
            Some(_) => Err(SettingsError::Invalid {
                name: "identity_backend",
                value: self.identity_backend.clone().unwrap_or_default(),
                expected: "memory|identity-toolkit",
            }),
        }
    }

    fn profile_backend(&self) -> Result<ProfileBackend, SettingsError> {
        match normalised(self.profile_backend.as_deref()).as_deref() {
            None | Some("memory") => Ok(ProfileBackend::Memory),
            Some("realtime-database") => {
                let database_url = non_blank(self.database_url.as_deref()).ok_or(
                    SettingsError::Missing {
                        name: "database_url",
                        needed_by: "realtime-database",
                    },
                )?;
                Ok(ProfileBackend::RealtimeDatabase {
                    database_url: http_url("database_url", database_url)?,
                })
            }
            Some(_) => Err(SettingsError::Invalid {
                name: "profile_backend",
                value: self.profile_backend.clone().unwrap_or_default(),
                expected: "memory|realtime-database",
            }),
        }
    }
}

fn normalised(value: Option<&str>) -> Option<String> {
    non_blank(value).map(|value| value.trim().to_ascii_lowercase())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

fn env_name(value: Option<&str>, default: &str) -> String {
    non_blank(value).unwrap_or(default).trim().to_owned()
}

fn http_url(name: &'static str, raw: &str) -> Result<String, SettingsError> {
    let invalid = || SettingsError::Invalid {
        name,
        value: raw.to_owned(),
        expected: "an absolute http(s) URL",
    };
    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    Ok(raw.trim().trim_end_matches('/').to_owned())
}

#[cfg(test)]
mod tests {
    //! Unit tests for registration settings parsing and validation.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 11] = [
        "REGISTRATION_BIND_ADDR",
        "REGISTRATION_IDENTITY_BACKEND",
        "REGISTRATION_PROFILE_BACKEND",
        "REGISTRATION_PROJECT_ID",
        "REGISTRATION_IDENTITY_TOOLKIT_URL",
        "REGISTRATION_DATABASE_URL",
        "REGISTRATION_ACCESS_TOKEN_FILE",
        "REGISTRATION_ADMIN_CODE_ENV",
        "REGISTRATION_CLINICIAN_CODE_ENV",
        "REGISTRATION_REQUEST_TIMEOUT_SECS",
        "REGISTRATION_ORPHAN_POLICY",
    ];

    fn load_with(overrides: &[(&str, &str)]) -> RegistrationSettings {
        let vars = VARS.map(|name| {
            let value = overrides
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        });
        let _guard = lock_env(vars);
        RegistrationSettings::load_from_iter([OsString::from("registration")])
            .expect("config should load")
    }

    fn remote_settings() -> RegistrationSettings {
        RegistrationSettings {
            identity_backend: Some("identity-toolkit".into()),
            profile_backend: Some("realtime-database".into()),
            project_id: Some("demo-project".into()),
            database_url: Some("https://demo.firebaseio.com/".into()),
            access_token_file: Some(PathBuf::from("/var/run/secrets/token")),
            ..RegistrationSettings::default()
        }
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let config = load_with(&[]).validate().expect("defaults validate");

        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().expect("socket addr"));
        assert_eq!(config.identity, IdentityBackend::Memory);
        assert_eq!(config.profile, ProfileBackend::Memory);
        assert_eq!(config.invite_codes, InviteCodeNames::default());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.orphan_policy, OrphanIdentityPolicy::Retain);
        assert!(!config.uses_remote_backend());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load_with(&[
            ("REGISTRATION_BIND_ADDR", "127.0.0.1:9090"),
            ("REGISTRATION_IDENTITY_BACKEND", "identity-toolkit"),
            ("REGISTRATION_PROJECT_ID", "demo-project"),
            ("REGISTRATION_IDENTITY_TOOLKIT_URL", "http://127.0.0.1:9099"),
            ("REGISTRATION_ACCESS_TOKEN_FILE", "/tmp/token"),
            ("REGISTRATION_ADMIN_CODE_ENV", "STAFF_ADMIN_CODE"),
            ("REGISTRATION_REQUEST_TIMEOUT_SECS", "5"),
            ("REGISTRATION_ORPHAN_POLICY", "compensate"),
        ]);
        let config = settings.validate().expect("overrides validate");

        assert_eq!(config.bind_addr.port(), 9090);
        assert_eq!(
            config.identity,
            IdentityBackend::IdentityToolkit {
                base_url: "http://127.0.0.1:9099".into(),
                project_id: "demo-project".into(),
            }
        );
        assert_eq!(config.profile, ProfileBackend::Memory);
        assert_eq!(config.access_token_file, Some(PathBuf::from("/tmp/token")));
        assert_eq!(config.invite_codes.admin, "STAFF_ADMIN_CODE");
        assert_eq!(config.invite_codes.clinician, CLINICIAN_CODE_SECRET);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.orphan_policy, OrphanIdentityPolicy::Compensate);
    }

    #[test]
    fn remote_backends_resolve_urls() {
        let config = remote_settings().validate().expect("remote settings validate");
        assert_eq!(
            config.identity,
            IdentityBackend::IdentityToolkit {
                base_url: IDENTITY_TOOLKIT_DEFAULT_URL.into(),
                project_id: "demo-project".into(),
            }
        );
        assert_eq!(
            config.profile,
            ProfileBackend::RealtimeDatabase {
                database_url: "https://demo.firebaseio.com".into(),
            }
        );
        assert!(config.uses_remote_backend());
    }

    #[rstest]
    #[case::project_id(
        RegistrationSettings { project_id: None, ..remote_settings() },
        "project_id"
    )]
    #[case::database_url(
        RegistrationSettings { database_url: Some("  ".into()), ..remote_settings() },
        "database_url"
    )]
    #[case::access_token(
        RegistrationSettings { access_token_file: None, ..remote_settings() },
        "access_token_file"
    )]
    fn remote_backends_require_their_settings(
        #[case] settings: RegistrationSettings,
        #[case] missing: &str,
    ) {
        match settings.validate() {
            Err(SettingsError::Missing { name, .. }) => assert_eq!(name, missing),
            other => panic!("expected missing {missing}, got {other:?}"),
        }
    }

    #[rstest]
    #[case::bind_addr(RegistrationSettings { bind_addr: Some("localhost".into()), ..RegistrationSettings::default() }, "bind_addr")]
    #[case::identity_backend(RegistrationSettings { identity_backend: Some("ldap".into()), ..RegistrationSettings::default() }, "identity_backend")]
    #[case::profile_backend(RegistrationSettings { profile_backend: Some("postgres".into()), ..RegistrationSettings::default() }, "profile_backend")]
    #[case::timeout(RegistrationSettings { request_timeout_secs: 0, ..RegistrationSettings::default() }, "request_timeout_secs")]
    #[case::orphan_policy(RegistrationSettings { orphan_policy: Some("rollback".into()), ..RegistrationSettings::default() }, "orphan_policy")]
    #[case::database_scheme(RegistrationSettings { database_url: Some("ftp://db".into()), ..remote_settings() }, "database_url")]
    fn invalid_values_are_rejected(#[case] settings: RegistrationSettings, #[case] field: &str) {
        match settings.validate() {
            Err(SettingsError::Invalid { name, .. }) => assert_eq!(name, field),
            other => panic!("expected invalid {field}, got {other:?}"),
        }
    }

    #[test]
    fn backend_names_are_case_insensitive() {
        let settings = RegistrationSettings {
            identity_backend: Some(" Memory ".into()),
            profile_backend: Some("MEMORY".into()),
            ..RegistrationSettings::default()
        };
        let config = settings.validate().expect("memory backends validate");
        assert_eq!(config.identity, IdentityBackend::Memory);
    }
}
