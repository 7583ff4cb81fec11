//! CLI error types with miette diagnostics.
//!
//! Maps library errors into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use skytap_config::ConfigError;
use skytap_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────

    #[error("Missing required setting '{field}'")]
    #[diagnostic(
        code(skytap::missing_setting),
        help(
            "Pass --{flag}, set {env_var}, or add '{field}' under [{section}] in {ini_path}"
        )
    )]
    MissingSetting {
        field: &'static str,
        section: &'static str,
        flag: String,
        env_var: String,
        ini_path: String,
    },

    #[error("Unknown network_type '{value}'")]
    #[diagnostic(
        code(skytap::network_type),
        help("Expected one of: {expected}")
    )]
    UnknownNetworkType { value: String, expected: String },

    #[error(transparent)]
    #[diagnostic(code(skytap::config))]
    Config(Box<ConfigError>),

    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to the Skytap API")]
    #[diagnostic(
        code(skytap::connection_failed),
        help("Check base_url and network access to the Skytap API.")
    )]
    ConnectionFailed {
        #[source]
        source: skytap_api::Error,
    },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(skytap::tls_error),
        help("Check --ca-cert, or use --insecure (-k) to skip verification.")
    )]
    TlsError { message: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(code(skytap::timeout), help("Check Skytap API responsiveness."))]
    Timeout { seconds: u64 },

    // ── API ──────────────────────────────────────────────────────────

    #[error("Authentication failed for '{resource}' (HTTP {status})")]
    #[diagnostic(
        code(skytap::auth_failed),
        help("Verify username and api_token. Response: {body}")
    )]
    AuthFailed {
        status: u16,
        resource: String,
        body: String,
    },

    #[error("Configuration '{id}' not found at '{resource}'")]
    #[diagnostic(
        code(skytap::not_found),
        help("Check configuration_id. Response: {body}")
    )]
    ConfigurationNotFound {
        id: String,
        resource: String,
        body: String,
    },

    #[error(transparent)]
    #[diagnostic(code(skytap::api_error))]
    Api(skytap_api::Error),

    // ── Inventory ────────────────────────────────────────────────────

    #[error("No tunnel with id '{id}' in this configuration")]
    #[diagnostic(
        code(skytap::tunnel_not_found),
        help("For nat_icnr, network_connection_id must name one of the environment's tunnels.")
    )]
    TunnelNotFound { id: String },

    #[error("Failed to render inventory: {0}")]
    #[diagnostic(code(skytap::json))]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingSetting { .. } | Self::UnknownNetworkType { .. } | Self::Config(_) => {
                exit_code::USAGE
            }
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::ConfigurationNotFound { .. } | Self::TunnelNotFound { .. } => exit_code::NOT_FOUND,
            Self::Api(_) | Self::Json(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }

    /// Attach the requested configuration id to a fetch failure.
    pub fn from_fetch(err: skytap_api::Error, configuration_id: &str) -> Self {
        if !err.is_not_found() {
            return err.into();
        }
        match err {
            skytap_api::Error::HttpRequestFailed { resource, body, .. } => {
                Self::ConfigurationNotFound {
                    id: configuration_id.to_owned(),
                    resource,
                    body: body.to_string(),
                }
            }
            other => other.into(),
        }
    }
}

// ── Library errors → CliError ────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingRequiredSetting {
                field,
                section,
                ini_path,
            } => Self::MissingSetting {
                field,
                section,
                flag: field.replace('_', "-"),
                env_var: format!("SKYTAP_{}", field.to_uppercase()),
                ini_path: ini_path.display().to_string(),
            },
            ConfigError::UnknownNetworkType { value, expected } => {
                Self::UnknownNetworkType { value, expected }
            }
            other => Self::Config(Box::new(other)),
        }
    }
}

impl From<skytap_api::Error> for CliError {
    fn from(err: skytap_api::Error) -> Self {
        match err {
            skytap_api::Error::HttpRequestFailed {
                status: status @ (401 | 403),
                resource,
                body,
            } => Self::AuthFailed {
                status,
                resource,
                body: body.to_string(),
            },
            skytap_api::Error::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            skytap_api::Error::Tls(message) => Self::TlsError { message },
            err @ skytap_api::Error::Transport(_) => Self::ConnectionFailed { source: err },
            other => Self::Api(other),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::TunnelNotFound { id } => Self::TunnelNotFound { id },
            CoreError::Serialization(e) => Self::Json(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use skytap_api::ErrorBody;

    use super::*;

    #[test]
    fn missing_setting_names_every_tier() {
        let err = CliError::from(ConfigError::MissingRequiredSetting {
            field: "api_token",
            section: "skytap_vars",
            ini_path: PathBuf::from("/opt/skytap/skytap.ini"),
        });

        assert_eq!(err.exit_code(), exit_code::USAGE);
        match err {
            CliError::MissingSetting {
                flag,
                env_var,
                ini_path,
                ..
            } => {
                assert_eq!(flag, "api-token");
                assert_eq!(env_var, "SKYTAP_API_TOKEN");
                assert_eq!(ini_path, "/opt/skytap/skytap.ini");
            }
            other => panic!("expected MissingSetting, got: {other:?}"),
        }
    }

    #[test]
    fn http_failures_map_to_exit_codes() {
        let failed = |status| skytap_api::Error::HttpRequestFailed {
            status,
            resource: "configurations/42.json".into(),
            body: ErrorBody::Text("nope".into()),
        };

        assert_eq!(CliError::from(failed(401)).exit_code(), exit_code::AUTH);
        assert_eq!(CliError::from(failed(403)).exit_code(), exit_code::AUTH);
        assert_eq!(CliError::from(failed(500)).exit_code(), exit_code::GENERAL);
        assert_eq!(
            CliError::from_fetch(failed(404), "42").exit_code(),
            exit_code::NOT_FOUND
        );
        assert_eq!(
            CliError::from(skytap_api::Error::Timeout { timeout_secs: 90 }).exit_code(),
            exit_code::TIMEOUT
        );
    }

    #[test]
    fn http_failures_name_the_resource() {
        let failed = |status| skytap_api::Error::HttpRequestFailed {
            status,
            resource: "configurations/42.json".into(),
            body: ErrorBody::Text("nope".into()),
        };

        let auth = CliError::from(failed(401));
        assert_eq!(
            auth.to_string(),
            "Authentication failed for 'configurations/42.json' (HTTP 401)"
        );
        let missing = CliError::from_fetch(failed(404), "42");
        assert_eq!(
            missing.to_string(),
            "Configuration '42' not found at 'configurations/42.json'"
        );
        assert!(matches!(
            CliError::from_fetch(failed(500), "42"),
            CliError::Api(skytap_api::Error::HttpRequestFailed { status: 500, .. })
        ));
    }

    #[test]
    fn unknown_tunnel_is_not_found() {
        let err = CliError::from(CoreError::TunnelNotFound { id: "t-9".into() });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(err.to_string(), "No tunnel with id 't-9' in this configuration");
    }
}
