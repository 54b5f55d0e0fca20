//! Scripts that run inside the provisioned container.
//!
//! Guest scripts are rendered in host-heredoc form: the host writes them
//! through an unquoted heredoc, so every `$`, `` ` `` and `\` meant for the
//! guest is already escaped here. Remote text enters only through
//! [`escape_heredoc`] and [`heredoc_word`].

use stackport_common::constants::{
    APP_BASE_DIR, COMPOSE_FILE_NAME, CREDENTIALS_FILE_NAME, GENERATED_SECRET_LENGTH,
};
use stackport_common::types::AppId;
use stackport_compose::{SanitizedCompose, SecretPlan};

use crate::recipe::{community_functions_url, community_install_url};
use crate::shell::{ScriptBuilder, escape_heredoc, heredoc_delimiter, heredoc_word};

const PREAMBLE: &str = r#"#!/bin/bash
set -eo pipefail
export DEBIAN_FRONTEND=noninteractive

YW='\\e[1;33m'
GN='\\e[0;32m'
RD='\\e[0;31m'
CL='\\e[0m'
msg_info() { echo -e "\${YW}[INFO] \${1}\${CL}"; }
msg_ok() { echo -e "\${GN}[OK] \${1}\${CL}"; }
msg_err() { echo -e "\${RD}[ERROR] \${1}\${CL}"; }
"#;

const DOCKER_SETUP: &str = r#"msg_info "Installing prerequisites..."
apt-get update -qq
apt-get install -y -qq curl ca-certificates gnupg >/dev/null

if ! command -v docker &>/dev/null; then
    msg_info "Installing Docker..."
    curl -fsSL https://get.docker.com | sh
fi
systemctl enable --now docker >/dev/null 2>&1 || true
msg_ok "Docker is ready"
"#;

/// Directory inside the guest that holds the application's files.
pub fn app_dir(app_id: &AppId) -> String {
    format!("{APP_BASE_DIR}/{app_id}")
}

/// Absolute guest path for a host-side volume path.
///
/// Relative paths (`./data/x`) resolve against the application directory;
/// absolute paths are used as-is.
pub fn volume_dir(app_dir: &str, path: &str) -> String {
    path.strip_prefix("./").map_or_else(
        || path.to_owned(),
        |relative| format!("{app_dir}/{relative}"),
    )
}

/// Guest script for the generic path: container runtime plus Compose stack.
pub fn generic(app_id: &AppId, compose: &SanitizedCompose, secrets: &SecretPlan) -> String {
    let dir = app_dir(app_id);
    let mut script = ScriptBuilder::new();
    script.block(PREAMBLE);
    script.blank();
    script.block(DOCKER_SETUP);
    script.blank();

    script.line(format!("mkdir -p {}", heredoc_word(&dir)));
    script.line(format!("cd {}", heredoc_word(&dir)));
    for volume in &compose.volumes {
        script.line(format!("mkdir -p {}", heredoc_word(&volume_dir(&dir, volume))));
    }
    script.blank();

    let delimiter = heredoc_delimiter("STACKPORT_COMPOSE", &compose.text);
    script.line(format!(
        "cat > {} <<'{delimiter}'",
        heredoc_word(COMPOSE_FILE_NAME)
    ));
    script.block(escape_heredoc(&compose.text));
    script.line(&delimiter);
    script.blank();

    if !secrets.is_empty() {
        write_secret_generation(&mut script, &dir, secrets);
        script.blank();
    }

    script.line("msg_info \"Starting stack...\"");
    script.line("docker compose up -d");
    script.line("msg_ok \"Stack started\"");
    script.finish()
}

fn write_secret_generation(script: &mut ScriptBuilder, dir: &str, secrets: &SecretPlan) {
    script.line("gen_secret() {");
    script.line("    local secret=\"\"");
    script.line(format!(
        "    while [ \"\\${{#secret}}\" -lt {GENERATED_SECRET_LENGTH} ]; do"
    ));
    script.line(
        "        secret=\"\\${secret}\\$(head -c 64 /dev/urandom | tr -dc 'A-Za-z0-9')\"",
    );
    script.line("    done");
    script.line(format!(
        "    printf '%s' \"\\${{secret:0:{GENERATED_SECRET_LENGTH}}}\""
    ));
    script.line("}");
    script.line("msg_info \"Generating credentials...\"");
    script.line(format!(
        "CREDENTIALS_FILE={}",
        heredoc_word(&format!("{dir}/{CREDENTIALS_FILE_NAME}"))
    ));
    script.line(": > \"\\$CREDENTIALS_FILE\"");
    script.line("chmod 600 \"\\$CREDENTIALS_FILE\"");
    for slot in secrets.slots() {
        script.line("SECRET_VALUE=\"\\$(gen_secret)\"");
        script.line(format!(
            "sed -i \"s|{}|\\${{SECRET_VALUE}}|g\" {}",
            slot.placeholder,
            heredoc_word(COMPOSE_FILE_NAME)
        ));
        script.line(format!(
            "printf '%s=%s\\\\n' {} \"\\${{SECRET_VALUE}}\" >> \"\\$CREDENTIALS_FILE\"",
            heredoc_word(&slot.name)
        ));
    }
    script.line("msg_ok \"Credentials saved\"");
}

/// Guest script for the community path: fetch and run the named install script.
pub fn community(recipe: &str) -> String {
    let mut script = ScriptBuilder::new();
    script.block(PREAMBLE);
    script.blank();
    script.line("msg_info \"Preparing community script environment...\"");
    script.line("apt-get update -qq");
    script.line("apt-get install -y -qq curl wget >/dev/null");
    script.line(format!(
        "wget -qL {} -O /tmp/install.func",
        heredoc_word(&community_functions_url())
    ));
    script.line(format!(
        "msg_info {}",
        heredoc_word(&format!("Downloading {recipe}-install.sh..."))
    ));
    script.line(format!(
        "wget -qL {} -O /tmp/install.sh",
        heredoc_word(&community_install_url(recipe))
    ));
    script.line("export FUNCTIONS_FILE_PATH=\"\\$(cat /tmp/install.func)\"");
    script.line("bash /tmp/install.sh");
    script.line("rm -f /tmp/install.func /tmp/install.sh");
    script.line("msg_ok \"Community install script finished\"");
    script.finish()
}
