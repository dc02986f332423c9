pub mod config;

use clap::{Parser, Subcommand};

/// cadenced — the cadence DAG management API.
#[derive(Debug, Parser)]
#[command(name = "cadenced", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the API server (default when no subcommand is given).
    Serve,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path specified by `CADENCE_CONFIG`
/// (or `config.toml` by default), then apply the `API_PORT` and
/// `DAG_DIR` environment overrides the container images set.  Returns
/// the parsed [`Config`](cadence_domain::config::Config) and the path
/// that was used.
pub fn load_config() -> anyhow::Result<(cadence_domain::config::Config, String)> {
    let config_path =
        std::env::var("CADENCE_CONFIG").unwrap_or_else(|_| "config.toml".into());

    let mut config: cadence_domain::config::Config =
        if std::path::Path::new(&config_path).exists() {
            let raw = std::fs::read_to_string(&config_path)
                .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
            toml::from_str(&raw)
                .map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))?
        } else {
            cadence_domain::config::Config::default()
        };

    // Tracing is not initialized yet on this path, hence eprintln.
    if let Ok(port) = std::env::var("API_PORT") {
        match port.parse::<u16>() {
            Ok(p) => config.server.port = p,
            Err(_) => eprintln!("WARNING: ignoring non-numeric API_PORT value {port:?}"),
        }
    }
    if let Ok(dir) = std::env::var("DAG_DIR") {
        if !dir.is_empty() {
            config.store.dag_dir = dir.into();
        }
    }

    Ok((config, config_path))
}
