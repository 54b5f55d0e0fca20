//! Install recipes: the generic container path or an external community script.

use stackport_common::config::DeploymentConfig;
use stackport_common::constants::{COMMUNITY_SCRIPTS_BASE_URL, DEFAULT_OS_TEMPLATE};
use stackport_common::types::ApplicationRecord;

/// How the guest installs the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallRecipe {
    /// Install a container runtime and start the sanitized Compose stack.
    Generic,
    /// Download and run a named install script from the community repository.
    Community {
        /// Script name, e.g. `adguard-home` for `adguard-home-install.sh`.
        name: String,
    },
}

impl InstallRecipe {
    /// Picks the recipe a configuration asks for.
    pub fn select(config: &DeploymentConfig) -> Self {
        match config
            .matched_recipe
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
        {
            Some(name) => Self::Community {
                name: name.to_owned(),
            },
            None => Self::Generic,
        }
    }

    /// OS template the provisioned container is created from.
    pub const fn os_template(&self) -> &'static str {
        match self {
            Self::Generic | Self::Community { .. } => DEFAULT_OS_TEMPLATE,
        }
    }

    /// Human-readable label for log lines.
    pub fn label(&self) -> String {
        match self {
            Self::Generic => "generic compose".to_owned(),
            Self::Community { name } => format!("community script {name}"),
        }
    }
}

/// URL of the shared functions file that community install scripts source.
pub fn community_functions_url() -> String {
    format!("{COMMUNITY_SCRIPTS_BASE_URL}/misc/install.func")
}

/// URL of the install script for recipe `name`.
pub fn community_install_url(name: &str) -> String {
    format!("{COMMUNITY_SCRIPTS_BASE_URL}/install/{name}-install.sh")
}

/// Folds a name for comparison: lowercase ASCII alphanumerics only.
///
/// `"AdGuard Home"` and `"adguard-home"` both become `"adguardhome"`.
pub fn normalize_recipe_name(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Finds the registry entry matching the record's id or display name.
pub fn match_recipe<'a>(record: &ApplicationRecord, registry: &'a [String]) -> Option<&'a str> {
    let wanted = [
        normalize_recipe_name(record.id.as_str()),
        normalize_recipe_name(&record.name),
    ];
    registry
        .iter()
        .find(|entry| {
            let entry = normalize_recipe_name(entry);
            !entry.is_empty() && wanted.contains(&entry)
        })
        .map(String::as_str)
}
