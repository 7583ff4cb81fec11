// ── Inventory builders ──
//
// One projection per `NetworkType`: walk VMs -> interfaces -> addresses
// and record a host for every address that qualifies. Builders are pure
// over (payload, settings, inventory) and hand the inventory back.

use skytap_api::{Configuration, Interface};
use tracing::debug;

use crate::config::{AnsibleOverrides, EnvironmentSettings, NetworkType};
use crate::credentials::extract_credentials;
use crate::error::CoreError;
use crate::inventory::Inventory;

impl NetworkType {
    /// Run the builder for this network type.
    pub fn build(
        self,
        payload: &Configuration,
        settings: &EnvironmentSettings,
        inventory: Inventory,
    ) -> Result<Inventory, CoreError> {
        match self {
            Self::Private => Ok(build_private_ip_group(payload, settings, inventory)),
            Self::NatVpn => Ok(build_vpn_ip_group(payload, settings, inventory)),
            Self::NatIcnr => build_icnr_ip_group(payload, settings, inventory),
        }
    }
}

/// Build the full document for `payload` from a fresh template.
pub fn build_inventory(
    payload: &Configuration,
    settings: &EnvironmentSettings,
    vars: &AnsibleOverrides,
) -> Result<Inventory, CoreError> {
    let inventory = Inventory::template(vars.clone());
    let inventory = settings.network_type.build(payload, settings, inventory)?;
    debug!(
        network_type = %settings.network_type,
        hosts = inventory.group.hosts.len(),
        "built inventory"
    );
    Ok(inventory)
}

/// One host per interface that has a private `ip`.
pub fn build_private_ip_group(
    payload: &Configuration,
    settings: &EnvironmentSettings,
    mut inventory: Inventory,
) -> Inventory {
    for vm in &payload.vms {
        let creds = extract_credentials(vm, settings);
        for interface in &vm.interfaces {
            let Some(ip) = interface.ip.as_deref() else {
                continue;
            };
            if let Some(hostname) = hostname(interface) {
                inventory.add_host(hostname, ip, creds.as_ref());
            }
        }
    }
    inventory
}

/// One host per ICNR NAT address.
///
/// With `network_connection_id` set, only addresses on the source network
/// of that tunnel qualify, and an unknown tunnel id is an error.
pub fn build_icnr_ip_group(
    payload: &Configuration,
    settings: &EnvironmentSettings,
    mut inventory: Inventory,
) -> Result<Inventory, CoreError> {
    let source_network = match settings.network_connection_id.as_deref() {
        Some(id) => {
            let tunnel = payload
                .tunnels
                .iter()
                .find(|t| t.id == id)
                .ok_or_else(|| CoreError::TunnelNotFound { id: id.to_owned() })?;
            Some(tunnel.source_network.url.as_str())
        }
        None => None,
    };

    for vm in &payload.vms {
        let creds = extract_credentials(vm, settings);
        for interface in &vm.interfaces {
            let Some(nat) = interface.nat_addresses.as_ref() else {
                continue;
            };
            let Some(hostname) = hostname(interface) else {
                continue;
            };
            for address in &nat.network_nat_addresses {
                if source_network.is_some_and(|url| address.network_url != url) {
                    continue;
                }
                inventory.add_host(hostname, &address.ip_address, creds.as_ref());
            }
        }
    }
    Ok(inventory)
}

/// At most one host per interface: its first matching VPN NAT address.
///
/// With `network_connection_id` set, the address must belong to that VPN;
/// otherwise the interface's first VPN address is taken.
pub fn build_vpn_ip_group(
    payload: &Configuration,
    settings: &EnvironmentSettings,
    mut inventory: Inventory,
) -> Inventory {
    let vpn_id = settings.network_connection_id.as_deref();

    for vm in &payload.vms {
        let creds = extract_credentials(vm, settings);
        for interface in &vm.interfaces {
            let Some(nat) = interface.nat_addresses.as_ref() else {
                continue;
            };
            let Some(address) = nat
                .vpn_nat_addresses
                .iter()
                .find(|a| vpn_id.is_none_or(|id| a.vpn_id == id))
            else {
                continue;
            };
            if let Some(hostname) = hostname(interface) {
                inventory.add_host(hostname, &address.ip_address, creds.as_ref());
            }
        }
    }
    inventory
}

fn hostname(interface: &Interface) -> Option<&str> {
    let name = interface.hostname.as_deref();
    if name.is_none() {
        debug!(interface = ?interface.id, "skipping interface without hostname");
    }
    name
}
