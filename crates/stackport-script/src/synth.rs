//! Provisioning-script synthesis.

use stackport_common::config::DeploymentConfig;
use stackport_common::constants::CREDENTIALS_FILE_NAME;
use stackport_common::types::{AppId, ApplicationRecord};
use stackport_compose::{ComposeOverrides, SanitizedCompose, SecretPlan, sanitize};
use tracing::{debug, info};

use crate::envelope::HostEnvelope;
use crate::guest::{self, app_dir};
use crate::recipe::InstallRecipe;
use crate::shell::single_quote;

/// A sanitized document together with the secrets it still needs.
#[derive(Debug, Clone)]
pub struct PreparedCompose {
    /// Sanitized document and its required host paths.
    pub compose: SanitizedCompose,
    /// Secrets whose placeholders survived into the document.
    pub secrets: SecretPlan,
}

/// Id used for the container hostname, guest directory and artifact name.
pub fn resolve_app_id(record: &ApplicationRecord, config: &DeploymentConfig) -> AppId {
    if config.app_id.trim().is_empty() {
        record.id.clone()
    } else {
        AppId::new(&config.app_id)
    }
}

/// Display name for messages; the configuration wins over the record.
pub fn resolve_app_name<'a>(record: &'a ApplicationRecord, config: &'a DeploymentConfig) -> &'a str {
    let configured = config.app_name.trim();
    if configured.is_empty() {
        &record.name
    } else {
        configured
    }
}

/// Sanitizes the configured document for deployment.
///
/// With `generate_secrets`, empty or `auto` secret variables are replaced by
/// placeholder tokens before sanitizing; otherwise values go in as given.
pub fn prepare_compose(
    record: &ApplicationRecord,
    config: &DeploymentConfig,
    generate_secrets: bool,
) -> PreparedCompose {
    let source = if config.compose_content.trim().is_empty() {
        &record.compose_text
    } else {
        &config.compose_content
    };

    let plan = if generate_secrets {
        SecretPlan::plan(&config.env_vars)
    } else {
        SecretPlan::default()
    };

    let mut overrides = ComposeOverrides::new()
        .env(plan.apply(&config.env_vars))
        .ports(&config.host_port, &config.container_port);
    if !record.main_service_name.is_empty() {
        overrides = overrides.main_service(&record.main_service_name);
    }

    let compose = sanitize(source, &overrides);
    let secrets = plan.present_in(&compose.text);
    debug!(
        volumes = compose.volumes.len(),
        secrets = secrets.slots().len(),
        "prepared compose document"
    );
    PreparedCompose { compose, secrets }
}

/// Produces the host provisioning script for `record` under `config`.
pub fn synthesize(record: &ApplicationRecord, config: &DeploymentConfig) -> String {
    let app_id = resolve_app_id(record, config);
    let app_name = resolve_app_name(record, config);
    let recipe = InstallRecipe::select(config);
    info!(app = %app_id, recipe = %recipe.label(), "synthesizing provisioning script");

    let (guest_script, completion) = match &recipe {
        InstallRecipe::Generic => {
            let prepared = prepare_compose(record, config, true);
            let guest_script = guest::generic(&app_id, &prepared.compose, &prepared.secrets);
            let completion = generic_completion(&app_id, app_name, config, &prepared.secrets);
            (guest_script, completion)
        }
        InstallRecipe::Community { name } => {
            (guest::community(name), community_completion(app_name, name))
        }
    };

    HostEnvelope {
        app_id: &app_id,
        app_name,
        config,
        os_template: recipe.os_template(),
        guest_script: &guest_script,
        completion,
    }
    .render()
}

fn generic_completion(
    app_id: &AppId,
    app_name: &str,
    config: &DeploymentConfig,
    secrets: &SecretPlan,
) -> Vec<String> {
    let dir = app_dir(app_id);
    let mut lines = vec![
        format!(
            "msg_ok {}",
            single_quote(&format!("Installation of {app_name} complete!"))
        ),
        format!(
            "echo \" URL: http://${{IP}}:\"{}",
            single_quote(&config.host_port)
        ),
        format!(
            "echo \" App directory: \"{}\" (inside container $CTID)\"",
            single_quote(&dir)
        ),
    ];
    if !secrets.is_empty() {
        let credentials = format!("{dir}/{CREDENTIALS_FILE_NAME}");
        lines.push(format!(
            "echo \" Credentials: \"{}\" (inside container $CTID)\"",
            single_quote(&credentials)
        ));
    }
    lines
}

fn community_completion(app_name: &str, recipe: &str) -> Vec<String> {
    vec![
        format!(
            "msg_ok {}",
            single_quote(&format!(
                "Native installation of {app_name} (via community script {recipe}) complete!"
            ))
        ),
        "echo \" Address: ${IP}\"".to_owned(),
    ]
}
