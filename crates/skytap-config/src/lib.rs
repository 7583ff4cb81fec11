//! Settings resolution for skytap-inventory.
//!
//! Every setting is looked up in three tiers, highest precedence first:
//! an explicit CLI argument, a `SKYTAP_<FIELD>` environment variable, then
//! `skytap.ini`. The tiers are layered with figment on top of built-in
//! defaults and validated into the typed `skytap_core` settings in one
//! pass, so a missing required field fails before any request is made.

pub mod ini;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::value::{Dict, Map, Value};
use figment::{Figment, Metadata, Profile, Provider, providers::Serialized};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use skytap_core::{AnsibleOverrides, ConnectionSettings, EnvironmentSettings, NetworkType};

use crate::ini::Ini;

/// Skytap API root used when `base_url` is not configured.
pub const DEFAULT_BASE_URL: &str = "https://cloud.skytap.com/v2/";

/// File name looked up next to the executable.
pub const DEFAULT_INI_NAME: &str = "skytap.ini";

/// Environment variable that points at the INI file.
pub const INI_ENV_VAR: &str = "SKYTAP_INI";

const ENV_PREFIX: &str = "SKYTAP_";

// INI sections.
const SKYTAP_VARS: &str = "skytap_vars";
const SKYTAP_ENV_VARS: &str = "skytap_env_vars";
const ANSIBLE_SSH_VARS: &str = "ansible_ssh_vars";

/// (section, field) for every setting that can come from any tier.
const FIELDS: [(&str, &str); 9] = [
    (SKYTAP_VARS, "username"),
    (SKYTAP_VARS, "api_token"),
    (SKYTAP_VARS, "base_url"),
    (SKYTAP_ENV_VARS, "network_type"),
    (SKYTAP_ENV_VARS, "configuration_id"),
    (SKYTAP_ENV_VARS, "network_connection_id"),
    (SKYTAP_ENV_VARS, "use_api_credentials"),
    (SKYTAP_ENV_VARS, "skytap_vm_username"),
    (SKYTAP_ENV_VARS, "api_credential_delimiter"),
];

/// `[ansible_ssh_vars]` key -> inventory variable.
const ANSIBLE_KEYS: [(&str, &str); 5] = [
    ("user", "ansible_ssh_user"),
    ("port", "ansible_ssh_port"),
    ("pass", "ansible_ssh_pass"),
    ("host", "ansible_ssh_host"),
    ("private_key_file", "ansible_ssh_private_key_file"),
];

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting '{field}'")]
    MissingRequiredSetting {
        field: &'static str,
        section: &'static str,
        ini_path: PathBuf,
    },

    #[error("unknown network_type '{value}' (expected one of: {expected})")]
    UnknownNetworkType { value: String, expected: String },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to parse {}: {source}", path.display())]
    Ini {
        path: PathBuf,
        #[source]
        source: ini::ParseError,
    },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Inputs and outputs ──────────────────────────────────────────────

/// Values given on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub configuration_id: Option<String>,
    pub username: Option<String>,
    pub api_token: Option<String>,
    /// INI file to read instead of `$SKYTAP_INI` / the default location.
    pub config_file: Option<PathBuf>,
}

/// Fully resolved, validated settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub connection: ConnectionSettings,
    pub environment: EnvironmentSettings,
    pub ansible: AnsibleOverrides,
    /// INI file that was consulted (it may not exist).
    pub ini_path: PathBuf,
}

/// Raw string view of every tier. Also the figment extraction target.
#[derive(Debug, Default, Deserialize, Serialize)]
struct RawSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    network_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    configuration_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    network_connection_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    use_api_credentials: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skytap_vm_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_credential_delimiter: Option<String>,
}

impl RawSettings {
    fn defaults() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.into()),
            network_type: Some(NetworkType::default().to_string()),
            use_api_credentials: Some("false".into()),
            api_credential_delimiter: Some("/".into()),
            ..Self::default()
        }
    }

    fn from_cli(cli: &CliOverrides) -> Self {
        let given = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
        Self {
            configuration_id: given(&cli.configuration_id),
            username: given(&cli.username),
            api_token: given(&cli.api_token),
            ..Self::default()
        }
    }
}

// ── INI tier as a figment provider ──────────────────────────────────

/// Skytap settings read from `[skytap_vars]` and `[skytap_env_vars]`.
struct IniLayer {
    name: String,
    dict: Dict,
}

impl IniLayer {
    fn new(ini: &Ini, path: &Path) -> Self {
        let mut dict = Dict::new();
        for (section, field) in FIELDS {
            if let Some(value) = ini.get(section, field) {
                dict.insert(field.to_owned(), Value::from(value.to_owned()));
            }
        }
        Self {
            name: format!("INI file {}", path.display()),
            dict,
        }
    }
}

impl Provider for IniLayer {
    fn metadata(&self) -> Metadata {
        Metadata::named(self.name.clone())
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        let mut map = Map::new();
        map.insert(Profile::Default, self.dict.clone());
        Ok(map)
    }
}

// ── Resolver ────────────────────────────────────────────────────────

/// Resolves settings against a captured environment.
///
/// Capturing the environment up front keeps resolution a pure function of
/// its inputs; [`Resolver::from_process`] is what the binary uses.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    env: BTreeMap<String, String>,
    program_dir: Option<PathBuf>,
}

impl Resolver {
    /// Capture the process environment and the executable's directory.
    ///
    /// Variables whose name or value is not UTF-8 are skipped.
    pub fn from_process() -> Self {
        let program_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        let vars = std::env::vars_os().filter_map(|(key, value)| {
            let key = key.into_string().ok()?;
            match value.into_string() {
                Ok(value) => Some((key, value)),
                Err(_) => {
                    if key.starts_with(ENV_PREFIX) {
                        warn!(var = %key, "ignoring non-UTF-8 value");
                    }
                    None
                }
            }
        });
        Self::with_env(vars).program_dir(program_dir)
    }

    /// Resolver over an explicit set of environment variables.
    pub fn with_env<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            env: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            program_dir: None,
        }
    }

    /// Directory searched for `skytap.ini` when nothing else names a file.
    pub fn program_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.program_dir = dir;
        self
    }

    fn env(&self, name: &str) -> Option<&str> {
        self.env.get(name).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// INI location: explicit override, else `$SKYTAP_INI` (with `$VAR`
    /// and `~` expanded), else `skytap.ini` next to the executable.
    pub fn ini_path(&self, override_path: Option<&Path>) -> PathBuf {
        if let Some(path) = override_path {
            return path.to_path_buf();
        }
        if let Some(path) = self.env(INI_ENV_VAR) {
            return expand_home(&self.expand_vars(path));
        }
        self.program_dir
            .as_deref()
            .map_or_else(|| PathBuf::from(DEFAULT_INI_NAME), |dir| dir.join(DEFAULT_INI_NAME))
    }

    /// Substitute `$NAME` and `${NAME}` from the captured environment.
    /// Unknown variables are left as written.
    fn expand_vars(&self, path: &str) -> String {
        let mut out = String::with_capacity(path.len());
        let mut rest = path;
        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            let (name, consumed) = match after.strip_prefix('{') {
                Some(braced) => braced.find('}').map_or(("", 0), |end| (&braced[..end], end + 2)),
                None => {
                    let end = after
                        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                        .unwrap_or(after.len());
                    (&after[..end], end)
                }
            };
            match self.env.get(name).filter(|_| !name.is_empty()) {
                Some(value) => out.push_str(value),
                None => out.push_str(&rest[pos..=pos + consumed]),
            }
            rest = &after[consumed..];
        }
        out.push_str(rest);
        out
    }

    /// Merge all tiers and validate the result.
    pub fn resolve(&self, cli: &CliOverrides) -> Result<Settings, ConfigError> {
        let ini_path = self.ini_path(cli.config_file.as_deref());
        let ini = load_ini(&ini_path)?;

        let env_layer: BTreeMap<&str, &str> = FIELDS
            .iter()
            .filter_map(|(_, field)| {
                let var = format!("{ENV_PREFIX}{}", field.to_uppercase());
                self.env(&var).map(|v| (*field, v))
            })
            .collect();

        let raw: RawSettings = Figment::new()
            .merge(Serialized::defaults(RawSettings::defaults()))
            .merge(IniLayer::new(&ini, &ini_path))
            .merge(Serialized::defaults(env_layer))
            .merge(Serialized::defaults(RawSettings::from_cli(cli)))
            .extract()?;

        let settings = validate(raw, &ini, ini_path)?;
        debug!(
            configuration_id = %settings.environment.configuration_id,
            network_type = %settings.environment.network_type,
            base_url = %settings.connection.base_url,
            ini = %settings.ini_path.display(),
            "resolved settings"
        );
        Ok(settings)
    }
}

/// Resolve settings against the real process environment.
pub fn resolve(cli: &CliOverrides) -> Result<Settings, ConfigError> {
    Resolver::from_process().resolve(cli)
}

// ── Helpers ─────────────────────────────────────────────────────────

/// A missing INI file is an empty one.
fn load_ini(path: &Path) -> Result<Ini, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ini::parse(&text).map_err(|source| ConfigError::Ini {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("no INI file at {}", path.display());
            Ok(Ini::default())
        }
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(path),
        |dirs| dirs.home_dir().join(rest),
    )
}

/// `use_api_credentials` is on only for a case-insensitive `"true"`.
pub fn parse_flag(value: &str) -> bool {
    value.to_uppercase() == "TRUE"
}

fn validate(raw: RawSettings, ini: &Ini, ini_path: PathBuf) -> Result<Settings, ConfigError> {
    let required = |value: Option<String>, section: &'static str, field: &'static str| {
        value.ok_or_else(|| ConfigError::MissingRequiredSetting {
            field,
            section,
            ini_path: ini_path.clone(),
        })
    };

    let username = required(raw.username, SKYTAP_VARS, "username")?;
    let api_token = required(raw.api_token, SKYTAP_VARS, "api_token")?;
    let configuration_id = required(raw.configuration_id, SKYTAP_ENV_VARS, "configuration_id")?;

    let base_url = raw.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.into());
    let mut base_url = base_url.parse::<url::Url>().map_err(|e| ConfigError::Validation {
        field: "base_url".into(),
        reason: format!("'{base_url}' is not a valid URL: {e}"),
    })?;
    // Resources are joined relative to the root, so it must end in '/'.
    if !base_url.path().ends_with('/') {
        let path = format!("{}/", base_url.path());
        base_url.set_path(&path);
    }

    let network_type = match raw.network_type.as_deref() {
        None => NetworkType::default(),
        Some(value) => value
            .parse::<NetworkType>()
            .map_err(|_| ConfigError::UnknownNetworkType {
                value: value.to_owned(),
                expected: NetworkType::names().join(", "),
            })?,
    };

    let environment = EnvironmentSettings {
        network_type,
        configuration_id,
        network_connection_id: raw.network_connection_id,
        use_api_credentials: raw.use_api_credentials.as_deref().is_some_and(parse_flag),
        skytap_vm_username: raw.skytap_vm_username,
        api_credential_delimiter: raw
            .api_credential_delimiter
            .unwrap_or_else(|| "/".into()),
    };

    let mut ansible = AnsibleOverrides::new();
    for (key, var) in ANSIBLE_KEYS {
        if let Some(value) = ini.get(ANSIBLE_SSH_VARS, key) {
            ansible.insert(var, value);
        }
    }

    Ok(Settings {
        connection: ConnectionSettings {
            base_url,
            username,
            api_token: SecretString::from(api_token),
        },
        environment,
        ansible,
        ini_path,
    })
}
