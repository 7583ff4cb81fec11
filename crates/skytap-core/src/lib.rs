//! Domain layer between `skytap-api` and the `skytap-inventory` binary.
//!
//! - **Settings** ([`config`]) - immutable, typed connection and
//!   environment settings. Built once by `skytap-config`, never read from
//!   disk here.
//! - **[`Inventory`]** - the Ansible dynamic-inventory document: one host
//!   group plus `_meta.hostvars`.
//! - **Builders** ([`builders`]) - one per [`NetworkType`], projecting a
//!   fetched [`Configuration`](skytap_api::Configuration) into the
//!   inventory, with optional per-VM SSH credentials ([`credentials`]).

pub mod builders;
pub mod config;
pub mod credentials;
pub mod error;
pub mod inventory;

// ── Primary re-exports ──────────────────────────────────────────────
pub use builders::{build_icnr_ip_group, build_inventory, build_private_ip_group, build_vpn_ip_group};
pub use config::{AnsibleOverrides, ConnectionSettings, EnvironmentSettings, NetworkType};
pub use credentials::{SshCredentials, extract_credentials};
pub use error::CoreError;
pub use inventory::{HostGroup, HostVars, Inventory, Meta};
