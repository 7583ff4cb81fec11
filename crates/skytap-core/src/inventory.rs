// ── Ansible dynamic-inventory document ──
//
// Shape expected by Ansible's script inventory plugin:
//
// {
//   "skytap_environment": { "hosts": [...], "vars": { ... } },
//   "_meta": { "hostvars": { "<host>": { "ansible_ssh_host": ... } } }
// }

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::AnsibleOverrides;
use crate::credentials::SshCredentials;
use crate::error::CoreError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Inventory {
    #[serde(rename = "skytap_environment")]
    pub group: HostGroup,
    #[serde(rename = "_meta")]
    pub meta: Meta,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HostGroup {
    /// In insertion order; a hostname added twice appears twice.
    pub hosts: Vec<String>,
    pub vars: AnsibleOverrides,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Meta {
    pub hostvars: IndexMap<String, HostVars>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostVars {
    pub ansible_ssh_host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ansible_ssh_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ansible_ssh_pass: Option<String>,
}

impl Inventory {
    /// Empty inventory whose group carries `vars`.
    pub fn template(vars: AnsibleOverrides) -> Self {
        Self {
            group: HostGroup {
                hosts: Vec::new(),
                vars,
            },
            meta: Meta::default(),
        }
    }

    /// Record `hostname` reachable at `address`.
    ///
    /// The hostname is always appended to the group. Its hostvars entry is
    /// replaced wholesale, so the last address for a hostname wins.
    pub fn add_host(
        &mut self,
        hostname: &str,
        address: &str,
        credentials: Option<&SshCredentials>,
    ) {
        self.group.hosts.push(hostname.to_owned());
        self.meta.hostvars.insert(
            hostname.to_owned(),
            HostVars {
                ansible_ssh_host: address.to_owned(),
                ansible_ssh_user: credentials.map(|c| c.user.clone()),
                ansible_ssh_pass: credentials.map(|c| c.pass.clone()),
            },
        );
    }

    pub fn hostvars(&self, hostname: &str) -> Option<&HostVars> {
        self.meta.hostvars.get(hostname)
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, CoreError> {
        let out = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(out)
    }
}
