// ── Runtime settings ──
//
// These types describe *what* to fetch and *how* to shape it. They are
// produced once by `skytap-config` and passed explicitly to the client
// and the builders; nothing here touches the environment or disk.

use indexmap::IndexMap;
use secrecy::SecretString;
use serde::Serialize;
use strum::{AsRefStr, Display, EnumString, VariantNames};
use url::Url;

/// Where the Skytap API lives and who is calling it.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    /// API root, e.g. `https://cloud.skytap.com/v2/`.
    pub base_url: Url,
    pub username: String,
    pub api_token: SecretString,
}

/// Which address of each interface ends up as `ansible_ssh_host`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, AsRefStr, EnumString, VariantNames,
)]
#[strum(serialize_all = "snake_case")]
pub enum NetworkType {
    /// The interface's own `ip` on the environment network.
    #[default]
    Private,
    /// A VPN NAT address.
    NatVpn,
    /// An ICNR (inter-configuration network) NAT address.
    NatIcnr,
}

impl NetworkType {
    /// Accepted spellings, in declaration order.
    pub fn names() -> &'static [&'static str] {
        Self::VARIANTS
    }
}

/// Environment selection and per-host credential settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSettings {
    pub network_type: NetworkType,
    pub configuration_id: String,
    /// VPN id (`nat_vpn`) or tunnel id (`nat_icnr`) to filter addresses by.
    pub network_connection_id: Option<String>,
    /// Attach `ansible_ssh_user`/`ansible_ssh_pass` parsed from VM credentials.
    pub use_api_credentials: bool,
    /// Which credential entry to pick when a VM has several.
    pub skytap_vm_username: Option<String>,
    pub api_credential_delimiter: String,
}

impl EnvironmentSettings {
    /// Settings for `configuration_id` with every optional field at its default.
    pub fn new(configuration_id: impl Into<String>) -> Self {
        Self {
            network_type: NetworkType::default(),
            configuration_id: configuration_id.into(),
            network_connection_id: None,
            use_api_credentials: false,
            skytap_vm_username: None,
            api_credential_delimiter: "/".into(),
        }
    }
}

/// SSH connection variables copied verbatim into the group's `vars`.
///
/// Keys keep insertion order so the rendered document is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnsibleOverrides(IndexMap<String, String>);

impl AnsibleOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
