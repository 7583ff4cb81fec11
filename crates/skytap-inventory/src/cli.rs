//! Clap derive structures for the `skytap-inventory` CLI.
//!
//! Follows Ansible's script-inventory protocol: `--list` (the default)
//! prints the whole document, `--host <NAME>` prints one host's variables.

use std::path::PathBuf;

use clap::Parser;

/// Ansible dynamic inventory for a Skytap environment
#[derive(Debug, Parser)]
#[command(
    name = "skytap-inventory",
    version,
    about = "Ansible dynamic inventory for a Skytap environment",
    long_about = "Fetches one Skytap environment and prints it as an Ansible dynamic\n\
        inventory document.\n\n\
        Settings come from the command line, then SKYTAP_<FIELD> environment\n\
        variables, then skytap.ini ($SKYTAP_INI or next to the executable)."
)]
pub struct Cli {
    /// Print the full inventory (default)
    #[arg(long, conflicts_with = "host")]
    pub list: bool,

    /// Print the variables of a single host
    #[arg(long, value_name = "NAME")]
    pub host: Option<String>,

    /// Skytap environment (configuration) id
    #[arg(long)]
    pub configuration_id: Option<String>,

    /// Skytap user name
    #[arg(long)]
    pub username: Option<String>,

    /// Skytap API token
    #[arg(long)]
    pub api_token: Option<String>,

    /// INI file to read instead of $SKYTAP_INI / skytap.ini
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Trust an additional CA certificate (PEM)
    #[arg(long, env = "SKYTAP_CA_CERT", value_name = "PATH", conflicts_with = "insecure")]
    pub ca_cert: Option<PathBuf>,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "SKYTAP_INSECURE")]
    pub insecure: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn overrides(&self) -> skytap_config::CliOverrides {
        skytap_config::CliOverrides {
            configuration_id: self.configuration_id.clone(),
            username: self.username.clone(),
            api_token: self.api_token.clone(),
            config_file: self.config.clone(),
        }
    }

    pub fn tls(&self) -> skytap_api::TlsMode {
        match (&self.ca_cert, self.insecure) {
            (_, true) => skytap_api::TlsMode::DangerAcceptInvalid,
            (Some(path), false) => skytap_api::TlsMode::CustomCa(path.clone()),
            (None, false) => skytap_api::TlsMode::System,
        }
    }
}
