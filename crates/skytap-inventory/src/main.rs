mod cli;
mod error;

use std::io::Write;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use skytap_api::{SkytapClient, TransportConfig};
use skytap_config::Settings;
use skytap_core::build_inventory;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(err) = run(&cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Logs go to stderr; stdout carries only the inventory document.
fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    let Settings {
        connection,
        environment,
        ansible,
        ini_path,
    } = skytap_config::resolve(&cli.overrides())?;
    tracing::debug!(ini = %ini_path.display(), "settings resolved");

    let transport = TransportConfig {
        tls: cli.tls(),
        ..TransportConfig::default()
    };
    let client = SkytapClient::new(
        connection.base_url,
        connection.username,
        connection.api_token,
        &transport,
    )?;

    let configuration_id = environment.configuration_id.as_str();
    let payload = client
        .get_configuration(configuration_id)
        .await
        .map_err(|e| CliError::from_fetch(e, configuration_id))?;

    let inventory = build_inventory(&payload, &environment, &ansible)?;
    tracing::info!(
        configuration_id,
        hosts = inventory.meta.hostvars.len(),
        "inventory ready"
    );

    let rendered = match cli.host.as_deref() {
        Some(host) => {
            // Unknown hosts get an empty variable set.
            let vars = inventory
                .hostvars(host)
                .map(serde_json::to_value)
                .transpose()?
                .unwrap_or_else(|| serde_json::json!({}));
            if cli.pretty {
                serde_json::to_string_pretty(&vars)?
            } else {
                serde_json::to_string(&vars)?
            }
        }
        None => inventory.to_json(cli.pretty)?,
    };

    let mut out = std::io::stdout().lock();
    writeln!(out, "{rendered}")?;
    out.flush()?;
    Ok(())
}
