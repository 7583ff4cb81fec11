// skytap-api: Async Rust client for the Skytap REST API

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::SkytapClient;
pub use error::{Error, ErrorBody};
pub use models::{
    Configuration, Credential, Interface, NatAddresses, NetworkNatAddress, Tunnel, TunnelNetwork,
    Vm, VpnNatAddress,
};
pub use transport::{TlsMode, TransportConfig};
