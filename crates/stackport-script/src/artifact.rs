//! Generated artifacts and their delivery forms.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use stackport_common::config::{DeploymentConfig, DeploymentTarget};
use stackport_common::constants::COMPOSE_FILE_NAME;
use stackport_common::types::ApplicationRecord;

use crate::synth::{resolve_app_id, synthesize};

/// Text produced for one deployment target, with its suggested file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Suggested file name: `<id>-install.sh` or `docker-compose.yml`.
    pub file_name: String,
    /// Full artifact text.
    pub content: String,
}

/// Produces the artifact for the configuration's deployment target.
pub fn generate(record: &ApplicationRecord, config: &DeploymentConfig) -> Artifact {
    match config.target {
        DeploymentTarget::ContainerHostProvisioning => Artifact {
            file_name: format!("{}-install.sh", resolve_app_id(record, config)),
            content: synthesize(record, config),
        },
        DeploymentTarget::StackFile => Artifact {
            file_name: COMPOSE_FILE_NAME.to_owned(),
            content: crate::stack::emit(record, config),
        },
    }
}

/// Wraps a script into a single pasteable command line.
///
/// The script is base64-encoded so no quoting inside it can break the
/// surrounding command.
pub fn encode_one_liner(script: &str) -> String {
    format!(
        "bash -c \"$(echo '{}' | base64 -d)\"",
        STANDARD.encode(script.as_bytes())
    )
}
