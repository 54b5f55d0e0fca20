//! CLI command definitions and dispatch.

pub mod inspect;
pub mod script;
pub mod stack;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use stackport_common::config::DeploymentConfig;
use stackport_common::constants::{BIN_NAME, CONFIG_ENV_VAR};
use stackport_common::types::ApplicationRecord;

use crate::loader;

/// Stackport: turn app-store Compose apps into deployable artifacts.
#[derive(Parser, Debug)]
#[command(name = BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the normalized application record as JSON.
    Inspect(inspect::InspectArgs),
    /// Generate a container-host provisioning script.
    Script(script::ScriptArgs),
    /// Generate a cleaned Compose file for a stack manager.
    Stack(stack::StackArgs),
}

/// Where the application's metadata comes from.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Compose file, or an app folder containing one.
    pub path: PathBuf,

    /// `config.json` sidecar metadata file.
    #[arg(long)]
    pub sidecar: Option<PathBuf>,

    /// Umbrel `umbrel-app.yml` manifest.
    #[arg(long)]
    pub umbrel: Option<PathBuf>,

    /// Icon URL used when the metadata names none.
    #[arg(long)]
    pub icon: Option<String>,

    /// Fallback application id (defaults to the folder name).
    #[arg(long)]
    pub id: Option<String>,
}

/// Deployment settings layered over the configuration file.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// JSON file with global deployment defaults.
    #[arg(long, env = CONFIG_ENV_VAR)]
    pub config: Option<PathBuf>,

    /// Root password of the new container.
    #[arg(long, env = "STACKPORT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Numeric container id.
    #[arg(long, env = "STACKPORT_CTID")]
    pub ctid: Option<u32>,

    /// CPU cores.
    #[arg(long, env = "STACKPORT_CORES")]
    pub cores: Option<u32>,

    /// Memory in megabytes.
    #[arg(long, env = "STACKPORT_RAM")]
    pub ram: Option<u32>,

    /// Root disk size in gigabytes.
    #[arg(long, env = "STACKPORT_DISK")]
    pub disk: Option<u32>,

    /// Storage pool for the root disk.
    #[arg(long, env = "STACKPORT_STORAGE")]
    pub storage: Option<String>,

    /// Network bridge.
    #[arg(long, env = "STACKPORT_BRIDGE")]
    pub bridge: Option<String>,

    /// Static address in CIDR form; disables DHCP.
    #[arg(long, env = "STACKPORT_STATIC_IP")]
    pub static_ip: Option<String>,

    /// Gateway for the static address.
    #[arg(long, env = "STACKPORT_GATEWAY")]
    pub gateway: Option<String>,

    /// Host-side port of the main service.
    #[arg(long, env = "STACKPORT_HOST_PORT")]
    pub host_port: Option<String>,

    /// Container-side port of the main service.
    #[arg(long, env = "STACKPORT_CONTAINER_PORT")]
    pub container_port: Option<String>,

    /// Environment override, repeatable.
    #[arg(short = 'e', long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,
}

impl ConfigArgs {
    /// Builds the configuration for `record`: file defaults, then the
    /// record's own values, then command-line overrides.
    pub fn resolve(&self, record: &ApplicationRecord) -> anyhow::Result<DeploymentConfig> {
        let base = loader::load_config(self.config.as_deref())?;
        let mut config = DeploymentConfig::for_application(record, &base);
        self.apply(&mut config);
        Ok(config)
    }

    fn apply(&self, config: &mut DeploymentConfig) {
        if let Some(password) = &self.password {
            config.password.clone_from(password);
        }
        if let Some(ctid) = self.ctid {
            config.container_id = ctid;
        }
        if let Some(cores) = self.cores {
            config.cpu_cores = cores;
        }
        if let Some(ram) = self.ram {
            config.ram_mb = ram;
        }
        if let Some(disk) = self.disk {
            config.disk_gb = disk;
        }
        if let Some(storage) = &self.storage {
            config.storage_pool.clone_from(storage);
        }
        if let Some(bridge) = &self.bridge {
            config.network_bridge.clone_from(bridge);
        }
        if let Some(static_ip) = &self.static_ip {
            config.use_dhcp = false;
            config.static_ip.clone_from(static_ip);
        }
        if let Some(gateway) = &self.gateway {
            config.gateway.clone_from(gateway);
        }
        if let Some(host_port) = &self.host_port {
            config.host_port.clone_from(host_port);
        }
        if let Some(container_port) = &self.container_port {
            config.container_port.clone_from(container_port);
        }
        config.env_vars.extend(self.env.iter().cloned());
    }
}

fn parse_env_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_owned(), value.to_owned()))
        }
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Inspect(args) => inspect::execute(&args),
        Command::Script(args) => script::execute(&args),
        Command::Stack(args) => stack::execute(&args),
    }
}
