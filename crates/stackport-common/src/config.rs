//! Deployment configuration model consumed by the generators.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StackportError;
use crate::types::ApplicationRecord;

/// Output artifact requested for a deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentTarget {
    /// Host-side script that provisions an isolated container and runs the app.
    #[default]
    #[serde(alias = "PROXMOX_LXC")]
    ContainerHostProvisioning,
    /// Cleaned Compose document for a stack-management UI.
    #[serde(alias = "DOCKGE", alias = "PORTAINER", alias = "RAW_COMPOSE")]
    StackFile,
}

impl fmt::Display for DeploymentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContainerHostProvisioning => write!(f, "container-host-provisioning"),
            Self::StackFile => write!(f, "stack-file"),
        }
    }
}

impl FromStr for DeploymentTarget {
    type Err = StackportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "container-host-provisioning" | "provisioning" | "lxc" | "proxmox-lxc" => {
                Ok(Self::ContainerHostProvisioning)
            }
            "stack-file" | "stack" | "compose" | "raw-compose" | "dockge" | "portainer" => {
                Ok(Self::StackFile)
            }
            other => Err(StackportError::Config {
                message: format!("unknown deployment target: {other}"),
            }),
        }
    }
}

/// Snapshot of everything the operator chose for one generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentConfig {
    /// Application identifier; names the guest directory and hostname.
    pub app_id: String,
    /// Display name used in status messages.
    pub app_name: String,
    /// Which artifact to produce.
    pub target: DeploymentTarget,

    /// Root password of the provisioned container.
    pub password: String,
    /// Numeric identifier of the container on the host.
    #[serde(alias = "ctId", alias = "containerNumericId")]
    pub container_id: u32,
    /// CPU cores allocated to the container.
    pub cpu_cores: u32,
    /// Memory in megabytes.
    #[serde(alias = "ramSize", alias = "ramMegabytes")]
    pub ram_mb: u32,
    /// Root disk size in gigabytes.
    #[serde(alias = "diskSize", alias = "diskGigabytes")]
    pub disk_gb: u32,
    /// Host storage pool for the root disk.
    pub storage_pool: String,
    /// Host bridge the container's interface joins.
    #[serde(alias = "bridge")]
    pub network_bridge: String,
    /// Whether the interface uses DHCP.
    pub use_dhcp: bool,
    /// Static address in CIDR form, used when DHCP is off. Passed through verbatim.
    pub static_ip: String,
    /// Optional gateway for the static address.
    pub gateway: String,

    /// Host side of the main service's port binding.
    pub host_port: String,
    /// Container side of the main service's port binding.
    pub container_port: String,
    /// Preferred data path for the app.
    pub volume_path: String,
    /// Environment overrides merged into every service.
    pub env_vars: BTreeMap<String, String>,
    /// Compose document being transformed.
    pub compose_content: String,
    /// Name of an external install recipe that replaces the generic path.
    #[serde(alias = "matchedExternalRecipe")]
    pub matched_recipe: Option<String>,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_name: String::new(),
            target: DeploymentTarget::default(),
            password: "password".to_owned(),
            container_id: 105,
            cpu_cores: 2,
            ram_mb: 2048,
            disk_gb: 8,
            storage_pool: "local-lvm".to_owned(),
            network_bridge: "vmbr0".to_owned(),
            use_dhcp: true,
            static_ip: "192.168.1.100/24".to_owned(),
            gateway: String::new(),
            host_port: "8080".to_owned(),
            container_port: "80".to_owned(),
            volume_path: crate::constants::LOCAL_DATA_DIR.to_owned(),
            env_vars: BTreeMap::new(),
            compose_content: String::new(),
            matched_recipe: None,
        }
    }
}

impl DeploymentConfig {
    /// Seeds a configuration for `record` on top of the operator's `base` defaults.
    ///
    /// Identity, compose text, and environment defaults come from the record.
    /// The record's `port_map` is split into host and container ports; a single
    /// value is used for both sides, and an absent map keeps the base ports.
    #[must_use]
    pub fn for_application(record: &ApplicationRecord, base: &Self) -> Self {
        let (host_port, container_port) = record
            .port_map
            .as_deref()
            .and_then(split_port_map)
            .unwrap_or_else(|| (base.host_port.clone(), base.container_port.clone()));

        Self {
            app_id: record.id.as_str().to_owned(),
            app_name: record.name.clone(),
            host_port,
            container_port,
            volume_path: record
                .volume_map
                .clone()
                .unwrap_or_else(|| base.volume_path.clone()),
            env_vars: record.env_vars.clone(),
            compose_content: record.compose_text.clone(),
            ..base.clone()
        }
    }
}

/// Splits `"host:container"` into its two sides; `"p"` maps to `("p", "p")`.
pub fn split_port_map(port_map: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = port_map.trim().split(':').collect();
    match parts.as_slice() {
        [host, container] if !host.is_empty() && !container.is_empty() => {
            Some(((*host).to_owned(), (*container).to_owned()))
        }
        [single] if !single.is_empty() => Some(((*single).to_owned(), (*single).to_owned())),
        _ => None,
    }
}
