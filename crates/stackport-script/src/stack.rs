//! Stack-file emission for container-stack managers.

use stackport_common::config::DeploymentConfig;
use stackport_common::types::ApplicationRecord;

use crate::synth::prepare_compose;

/// Returns the sanitized document text for import into a stack manager.
///
/// Secret variables are written with the values the configuration holds;
/// nothing is generated, since no provisioning step runs afterwards.
pub fn emit(record: &ApplicationRecord, config: &DeploymentConfig) -> String {
    tracing::info!(app = %record.id, "emitting stack file");
    prepare_compose(record, config, false).compose.text
}
