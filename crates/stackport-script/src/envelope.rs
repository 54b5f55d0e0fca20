//! Host-side provisioning envelope.
//!
//! The envelope runs on the virtualization host: it validates the container
//! id, resolves the OS template, creates and starts the container, waits for
//! the network, pushes the guest script in and runs it, then reports how to
//! reach the result.

use stackport_common::config::DeploymentConfig;
use stackport_common::constants::{APP_NAME, NETWORK_PROBE_ATTEMPTS, NETWORK_PROBE_HOST};
use stackport_common::types::AppId;

use crate::shell::{ScriptBuilder, heredoc_delimiter, single_quote};

const HOST_HELPERS: &str = r#"YW='\e[1;33m'
GN='\e[0;32m'
RD='\e[0;31m'
CL='\e[0m'
msg_info() { echo -e "${YW}[INFO] ${1}${CL}"; }
msg_ok() { echo -e "${GN}[OK] ${1}${CL}"; }
msg_warn() { echo -e "${YW}[WARN] ${1}${CL}"; }
msg_err() { echo -e "${RD}[ERROR] ${1}${CL}"; }
"#;

const CTID_CHECK: &str = r#"if pct status "$CTID" &>/dev/null; then
    msg_err "Container ID $CTID is already in use."
    exit 1
fi
"#;

const TEMPLATE_LOOKUP: &str = r#"msg_info "Looking for template $TEMPLATE_SEARCH..."
TEMPLATE=$(pveam list local 2>/dev/null | awk -v t="$TEMPLATE_SEARCH" 'index($1, t) {print $1; exit}') || true
if [ -z "$TEMPLATE" ]; then
    TEMPLATE_NAME=$(pveam available -section system 2>/dev/null | awk -v t="$TEMPLATE_SEARCH" 'index($2, t) {print $2; exit}') || true
    if [ -z "$TEMPLATE_NAME" ]; then
        msg_err "Template $TEMPLATE_SEARCH not found."
        exit 1
    fi
    msg_info "Downloading template $TEMPLATE_NAME..."
    pveam download local "$TEMPLATE_NAME"
    TEMPLATE="local:vztmpl/$TEMPLATE_NAME"
fi
msg_ok "Using template $TEMPLATE"
"#;

const CREATE_AND_START: &str = r#"msg_info "Creating container $CTID..."
pct create "$CTID" "$TEMPLATE" \
    --hostname "$CT_HOSTNAME" \
    --cores "$CPU_CORES" \
    --memory "$RAM_SIZE" \
    --swap 512 \
    --rootfs "$STORAGE:$DISK_SIZE" \
    --password "$PASSWORD" \
    --net0 "$NET_CONFIG" \
    --unprivileged 1 \
    --features nesting=1,keyctl=1 \
    --onboot 1
msg_ok "Container $CTID created"

msg_info "Starting container $CTID..."
pct start "$CTID"
"#;

const GUEST_RUN: &str = r#"pct push "$CTID" "$GUEST_SCRIPT" /root/stackport-install.sh --perms 0700
msg_info "Running installer inside container $CTID..."
pct exec "$CTID" -- bash /root/stackport-install.sh

IP=$(pct exec "$CTID" -- hostname -I | awk '{print $1}') || true
"#;

/// Network descriptor for the container's first interface.
///
/// A static configuration with an empty address is rendered as `ip=`
/// unchanged; the host rejects it when the container is created.
pub fn net_config(config: &DeploymentConfig) -> String {
    let mut net = format!("name=eth0,bridge={}", config.network_bridge);
    if config.use_dhcp {
        net.push_str(",ip=dhcp");
        return net;
    }
    if config.static_ip.trim().is_empty() {
        tracing::warn!("static networking selected without an address");
    }
    net.push_str(",ip=");
    net.push_str(config.static_ip.trim());
    let gateway = config.gateway.trim();
    if !gateway.is_empty() {
        net.push_str(",gw=");
        net.push_str(gateway);
    }
    net
}

/// Everything the host envelope needs to render.
#[derive(Debug, Clone)]
pub struct HostEnvelope<'a> {
    /// Container hostname and artifact id.
    pub app_id: &'a AppId,
    /// Display name used in progress and completion messages.
    pub app_name: &'a str,
    /// Resource, network and credential settings.
    pub config: &'a DeploymentConfig,
    /// Template name searched for on the host.
    pub os_template: &'a str,
    /// Guest script in host-heredoc form.
    pub guest_script: &'a str,
    /// Host-side lines printed after the guest finishes.
    pub completion: Vec<String>,
}

impl HostEnvelope<'_> {
    /// Renders the complete host script.
    pub fn render(&self) -> String {
        let mut script = ScriptBuilder::new();
        script.line("#!/usr/bin/env bash");
        script.line(format!("# {} provisioning script, generated by {APP_NAME}", self.app_id));
        script.line("set -eo pipefail");
        script.blank();

        self.write_variables(&mut script);
        script.blank();
        script.block(HOST_HELPERS);
        script.blank();

        script.line("msg_info \"Starting installation of ${APP_NAME}...\"");
        script.block(CTID_CHECK);
        script.blank();
        script.block(TEMPLATE_LOOKUP);
        script.blank();
        script.block(CREATE_AND_START);
        script.blank();
        write_network_wait(&mut script);
        script.blank();

        let delimiter = heredoc_delimiter("STACKPORT_GUEST", self.guest_script);
        script.line("GUEST_SCRIPT=$(mktemp)");
        script.line("trap 'rm -f \"$GUEST_SCRIPT\"' EXIT");
        script.line(format!("cat > \"$GUEST_SCRIPT\" <<{delimiter}"));
        script.block(self.guest_script);
        script.line(&delimiter);
        script.blank();
        script.block(GUEST_RUN);
        script.blank();

        for line in &self.completion {
            script.line(line);
        }
        script.finish()
    }

    fn write_variables(&self, script: &mut ScriptBuilder) {
        let config = self.config;
        let vars = [
            ("APP_ID", self.app_id.to_string()),
            ("APP_NAME", self.app_name.to_owned()),
            ("CTID", config.container_id.to_string()),
            ("CT_HOSTNAME", self.app_id.to_string()),
            ("PASSWORD", config.password.clone()),
            ("CPU_CORES", config.cpu_cores.to_string()),
            ("RAM_SIZE", config.ram_mb.to_string()),
            ("DISK_SIZE", config.disk_gb.to_string()),
            ("STORAGE", config.storage_pool.clone()),
            ("NET_CONFIG", net_config(config)),
            ("TEMPLATE_SEARCH", self.os_template.to_owned()),
        ];
        for (name, value) in vars {
            script.line(format!("{name}={}", single_quote(&value)));
        }
    }
}

fn write_network_wait(script: &mut ScriptBuilder) {
    script.line("msg_info \"Waiting for network...\"");
    script.line("NET_READY=0");
    script.line(format!("for _ in $(seq 1 {NETWORK_PROBE_ATTEMPTS}); do"));
    script.line(format!(
        "    if pct exec \"$CTID\" -- ping -c1 -W1 {NETWORK_PROBE_HOST} &>/dev/null; then"
    ));
    script.line("        NET_READY=1");
    script.line("        break");
    script.line("    fi");
    script.line("    sleep 1");
    script.line("done");
    script.line("if [ \"$NET_READY\" -eq 1 ]; then");
    script.line("    msg_ok \"Network is up\"");
    script.line("else");
    script.line(format!(
        "    msg_warn \"No network after {NETWORK_PROBE_ATTEMPTS} attempts, continuing\""
    ));
    script.line("fi");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope<'a>(id: &'a AppId, config: &'a DeploymentConfig, guest: &'a str) -> HostEnvelope<'a> {
        HostEnvelope {
            app_id: id,
            app_name: "Demo's App",
            config,
            os_template: "debian-12-standard",
            guest_script: guest,
            completion: vec!["msg_ok 'done'".to_owned()],
        }
    }

    #[test]
    fn net_config_uses_dhcp_by_default() {
        assert_eq!(
            net_config(&DeploymentConfig::default()),
            "name=eth0,bridge=vmbr0,ip=dhcp"
        );
    }

    #[test]
    fn net_config_renders_static_address_and_gateway() {
        let config = DeploymentConfig {
            use_dhcp: false,
            static_ip: "10.0.0.5/24".to_owned(),
            gateway: "10.0.0.1".to_owned(),
            ..DeploymentConfig::default()
        };
        assert_eq!(
            net_config(&config),
            "name=eth0,bridge=vmbr0,ip=10.0.0.5/24,gw=10.0.0.1"
        );
    }

    #[test]
    fn net_config_keeps_empty_static_address() {
        let config = DeploymentConfig {
            use_dhcp: false,
            static_ip: String::new(),
            ..DeploymentConfig::default()
        };
        assert_eq!(net_config(&config), "name=eth0,bridge=vmbr0,ip=");
    }

    #[test]
    fn ctid_check_precedes_container_creation() {
        let id = AppId::new("demo");
        let config = DeploymentConfig::default();
        let script = envelope(&id, &config, "echo hi\n").render();
        let check = script.find("pct status \"$CTID\"").unwrap_or(usize::MAX);
        let create = script.find("pct create").unwrap_or(0);
        assert!(check < create);
        assert!(script.starts_with("#!/usr/bin/env bash\n"));
        assert!(script.contains("CTID='105'"));
    }

    #[test]
    fn variables_are_single_quoted() {
        let id = AppId::new("demo");
        let config = DeploymentConfig {
            password: "p$ss'word".to_owned(),
            ..DeploymentConfig::default()
        };
        let script = envelope(&id, &config, "").render();
        assert!(script.contains(r"PASSWORD='p$ss'\''word'"));
        assert!(script.contains(r"APP_NAME='Demo'\''s App'"));
    }

    #[test]
    fn guest_delimiter_avoids_guest_lines() {
        let id = AppId::new("demo");
        let config = DeploymentConfig::default();
        let script = envelope(&id, &config, "STACKPORT_GUEST\n").render();
        assert!(script.contains("<<STACKPORT_GUEST_1\n"));
        assert!(script.contains("\nSTACKPORT_GUEST_1\n"));
    }

    fn section<'s>(script: &'s str, start: &str, end: &str) -> &'s str {
        let from = script.find(start).unwrap_or(0);
        let to = script[from..].find(end).map_or(script.len(), |at| from + at + end.len());
        &script[from..to]
    }

    #[test]
    fn missing_template_exits_before_container_creation() {
        let id = AppId::new("demo");
        let config = DeploymentConfig::default();
        let script = envelope(&id, &config, "").render();

        let lookup = section(&script, "if [ -z \"$TEMPLATE_NAME\" ]; then", "fi");
        assert!(lookup.contains("msg_err \"Template $TEMPLATE_SEARCH not found.\""));
        assert!(lookup.contains("exit 1"));

        let exit_at = script.find(lookup).unwrap_or(usize::MAX);
        let create_at = script.find("pct create").unwrap_or(0);
        let download_at = script.find("pveam download").unwrap_or(0);
        assert!(exit_at < download_at);
        assert!(exit_at < create_at);
    }

    #[test]
    fn network_wait_is_bounded_and_never_exits() {
        let id = AppId::new("demo");
        let config = DeploymentConfig::default();
        let script = envelope(&id, &config, "").render();

        let wait = section(&script, "NET_READY=0", "\nfi\n");
        assert!(wait.contains(&format!("for _ in $(seq 1 {NETWORK_PROBE_ATTEMPTS}); do")));
        assert!(wait.contains(&format!("ping -c1 -W1 {NETWORK_PROBE_HOST}")));
        assert!(wait.contains("msg_warn"));
        assert!(!wait.contains("exit"));
        assert_eq!(wait.matches("for ").count(), 1);

        let wait_at = script.find("NET_READY=0").unwrap_or(usize::MAX);
        let push_at = script.find("pct push").unwrap_or(0);
        assert!(wait_at < push_at);
    }
}
