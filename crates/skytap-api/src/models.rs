// Skytap API response types
//
// Models for the `configurations/{id}.json` resource. Only the fields the
// inventory needs are modelled; everything else in the payload is ignored.
// List fields tolerate both a missing key and an explicit `null`.

use serde::{Deserialize, Deserializer, Serialize};

/// A Skytap environment ("configuration") with its VMs and ICNR tunnels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub vms: Vec<Vm>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub tunnels: Vec<Tunnel>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vm {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub credentials: Vec<Credential>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub interfaces: Vec<Interface>,
}

/// A VM credential. `text` is free-form, conventionally `user / password`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credential {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Interface {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    /// Private address on the environment's own network.
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub nat_addresses: Option<NatAddresses>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NatAddresses {
    /// Addresses exposed to other environments over ICNR tunnels.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub network_nat_addresses: Vec<NetworkNatAddress>,
    /// Addresses exposed over VPN connections.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub vpn_nat_addresses: Vec<VpnNatAddress>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkNatAddress {
    #[serde(default)]
    pub network_id: Option<String>,
    pub network_url: String,
    pub ip_address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VpnNatAddress {
    pub vpn_id: String,
    pub ip_address: String,
}

/// An inter-configuration network (ICNR) tunnel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tunnel {
    pub id: String,
    #[serde(default)]
    pub source_network: TunnelNetwork,
    #[serde(default)]
    pub target_network: Option<TunnelNetwork>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TunnelNetwork {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: String,
}

fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    #[test]
    fn parses_configuration_payload() {
        let payload = json!({
            "id": "42",
            "name": "web tier",
            "runstate": "running",
            "vms": [{
                "id": "100",
                "name": "web-1",
                "credentials": [{ "id": "7", "text": "root / changeme" }],
                "interfaces": [{
                    "id": "nic-1",
                    "hostname": "web-1",
                    "ip": "10.0.0.5",
                    "nat_addresses": {
                        "network_nat_addresses": [{
                            "network_id": "55",
                            "network_url": "https://cloud.skytap.com/v2/configurations/9/networks/55",
                            "ip_address": "10.1.0.5"
                        }],
                        "vpn_nat_addresses": [{ "vpn_id": "vpn-3", "ip_address": "172.16.0.5" }]
                    }
                }]
            }],
            "tunnels": [{
                "id": "tunnel-1-2",
                "source_network": { "id": "55", "url": "https://cloud.skytap.com/v2/configurations/9/networks/55" },
                "target_network": { "id": "66", "url": "https://cloud.skytap.com/v2/configurations/42/networks/66" }
            }]
        });

        let config: Configuration = serde_json::from_value(payload).unwrap();

        assert_eq!(config.id.as_deref(), Some("42"));
        assert_eq!(config.vms.len(), 1);
        let vm = &config.vms[0];
        assert_eq!(vm.credentials[0].text, "root / changeme");
        let nat = vm.interfaces[0].nat_addresses.as_ref().unwrap();
        assert_eq!(nat.network_nat_addresses[0].ip_address, "10.1.0.5");
        assert_eq!(nat.vpn_nat_addresses[0].vpn_id, "vpn-3");
        assert_eq!(config.tunnels[0].source_network.url, nat.network_nat_addresses[0].network_url);
    }

    #[test]
    fn null_and_missing_lists_become_empty() {
        let payload = json!({
            "vms": [{ "credentials": null, "interfaces": [{ "hostname": "db", "ip": null }] }]
        });

        let config: Configuration = serde_json::from_value(payload).unwrap();

        assert!(config.tunnels.is_empty());
        assert!(config.vms[0].credentials.is_empty());
        assert!(config.vms[0].interfaces[0].ip.is_none());
        assert!(config.vms[0].interfaces[0].nat_addresses.is_none());
    }
}
