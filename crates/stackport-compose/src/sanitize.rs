//! Compose sanitization: strip vendor metadata and apply deployment overrides.
//!
//! The output must stand alone outside the app store, so:
//! - the vendor block is removed at top level and from every service,
//! - environment overrides are merged into every service (override wins),
//! - vendor per-app data directories are remapped to `./data`,
//! - the main service is rebound to the configured `host:container` port.
//!
//! Unparseable input passes through unchanged with no required volumes.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::{Mapping, Value};
use stackport_common::constants::{LOCAL_DATA_DIR, VENDOR_BLOCK_KEY, VENDOR_DATA_ROOT};
use stackport_common::error::{Result, StackportError};

use crate::document::{ComposeDocument, parse_environment};
use crate::metadata::vendor::VendorBlock;

/// Vendor data root followed by exactly one path segment, at the start of a
/// path or right after a `:` separator of the short volume syntax.
static DATA_ROOT_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(^|:){}/[^/:\s]+",
        regex::escape(VENDOR_DATA_ROOT)
    ))
    .ok()
});

/// User overrides applied while sanitizing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeOverrides {
    env: BTreeMap<String, String>,
    host_port: String,
    container_port: String,
    main_service: Option<String>,
}

impl ComposeOverrides {
    /// Creates an empty set of overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the environment overrides.
    #[must_use]
    pub fn env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Adds one environment override.
    #[must_use]
    pub fn env_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.env.insert(key.into(), value.into());
        self
    }

    /// Sets the main service's port binding.
    #[must_use]
    pub fn ports(mut self, host: impl Into<String>, container: impl Into<String>) -> Self {
        self.host_port = host.into();
        self.container_port = container.into();
        self
    }

    /// Names the main service explicitly.
    #[must_use]
    pub fn main_service(mut self, name: impl Into<String>) -> Self {
        self.main_service = Some(name.into());
        self
    }

    fn port_binding(&self) -> Option<String> {
        let host = self.host_port.trim();
        let container = self.container_port.trim();
        (!host.is_empty() && !container.is_empty()).then(|| format!("{host}:{container}"))
    }
}

/// Result of sanitizing a Compose document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedCompose {
    /// Cleaned document text, or the original text on pass-through.
    pub text: String,
    /// Host-side paths to create before start, deduplicated in first-seen order.
    pub volumes: Vec<String>,
}

impl SanitizedCompose {
    fn pass_through(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            volumes: Vec::new(),
        }
    }
}

/// Sanitizes `compose_text` with `overrides`.
///
/// The main service is the one named in `overrides` when it exists, then the
/// vendor block's declared main service, then the first service. Never fails:
/// if the text is not a Compose document it is returned unchanged.
pub fn sanitize(compose_text: &str, overrides: &ComposeOverrides) -> SanitizedCompose {
    match try_sanitize(compose_text, overrides) {
        Ok(sanitized) => sanitized,
        Err(e) => {
            tracing::warn!(error = %e, "passing compose document through unchanged");
            SanitizedCompose::pass_through(compose_text)
        }
    }
}

fn try_sanitize(compose_text: &str, overrides: &ComposeOverrides) -> Result<SanitizedCompose> {
    let mut doc = ComposeDocument::parse(compose_text)?;

    let declared = VendorBlock::from_value(doc.vendor_block()).main;
    let requested = overrides
        .main_service
        .as_deref()
        .filter(|name| doc.service(name).is_some());
    let main_service = doc.resolve_main_service(requested.or(declared.as_deref()));
    tracing::debug!(main_service = ?main_service, "sanitizing compose document");

    let _ = doc.root_mut().remove(VENDOR_BLOCK_KEY);

    let port_binding = overrides.port_binding();
    let mut volumes: Vec<String> = Vec::new();
    let services = doc
        .services_mut()
        .ok_or_else(|| StackportError::InvalidDocument {
            message: "no services section found".into(),
        })?;

    for (name, service) in services.iter_mut() {
        let Some(service) = service.as_mapping_mut() else {
            continue;
        };
        let _ = service.remove(VENDOR_BLOCK_KEY);

        merge_environment(service, &overrides.env);
        rewrite_volumes(service, &mut volumes);

        let is_main = main_service.is_some() && name.as_str() == main_service.as_deref();
        match (&port_binding, is_main) {
            (Some(binding), true) => {
                let _ = service.insert(
                    Value::String("ports".into()),
                    Value::Sequence(vec![Value::String(binding.clone())]),
                );
            }
            _ => stringify_ports(service),
        }
    }

    Ok(SanitizedCompose {
        text: doc.to_yaml()?,
        volumes,
    })
}

fn merge_environment(service: &mut Mapping, overrides: &BTreeMap<String, String>) {
    if overrides.is_empty() {
        return;
    }
    let mut env = service
        .get("environment")
        .map(parse_environment)
        .unwrap_or_default();
    for (key, value) in overrides {
        let _ = env.insert(Value::String(key.clone()), Value::String(value.clone()));
    }
    let _ = service.insert(Value::String("environment".into()), Value::Mapping(env));
}

fn rewrite_volumes(service: &mut Mapping, volumes: &mut Vec<String>) {
    let Some(Value::Sequence(entries)) = service.get_mut("volumes") else {
        return;
    };

    for entry in entries {
        let host_path = match entry {
            Value::String(spec) => {
                *spec = remap_data_root(spec);
                spec.split(':').next().map(str::to_owned)
            }
            Value::Mapping(long_form) => match long_form.get_mut("source") {
                Some(Value::String(source)) => {
                    *source = remap_data_root(source);
                    Some(source.clone())
                }
                _ => None,
            },
            _ => None,
        };

        if let Some(path) = host_path.filter(|p| is_host_path(p)) {
            if !volumes.contains(&path) {
                volumes.push(path);
            }
        }
    }
}

/// Replaces a vendor per-app data directory with `./data`.
///
/// `/DATA/AppData/plex/config:/config` becomes `./data/config:/config`.
pub fn remap_data_root(path: &str) -> String {
    match DATA_ROOT_PATTERN.as_ref() {
        Some(pattern) => {
            let remapped = pattern.replace_all(path, format!("${{1}}{LOCAL_DATA_DIR}"));
            if remapped != path {
                tracing::debug!(from = path, to = %remapped, "remapped vendor data path");
            }
            remapped.into_owned()
        }
        None => path.to_owned(),
    }
}

fn is_host_path(path: &str) -> bool {
    path.starts_with('/') || path.starts_with("./")
}

fn stringify_ports(service: &mut Mapping) {
    if let Some(Value::Sequence(ports)) = service.get_mut("ports") {
        for port in ports.iter_mut() {
            if let Value::Number(n) = port {
                *port = Value::String(n.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reparse(text: &str) -> Value {
        serde_yaml::from_str(text).expect("sanitized output is yaml")
    }

    fn service<'a>(doc: &'a Value, name: &str) -> &'a Value {
        &doc["services"][name]
    }

    const TWO_SERVICES: &str = r"
services:
  web:
    image: nginx
    ports:
      - 8080:80
    environment:
      - MODE=prod
      - URL=http://x/?a=b
    volumes:
      - /DATA/AppData/web/html:/usr/share/nginx/html
      - type: bind
        source: /DATA/AppData/web/conf
        target: /etc/nginx/conf.d
    x-casaos:
      envs: []
  worker:
    image: worker
    ports:
      - 9000
      - 9001:9001
    volumes:
      - /DATA/AppData/web/html:/srv
      - named-volume:/cache
x-casaos:
  main: web
  title:
    en_us: Web
";

    #[test]
    fn strips_vendor_blocks_everywhere() {
        let out = sanitize(TWO_SERVICES, &ComposeOverrides::new());
        assert!(!out.text.contains("x-casaos"));
        let doc = reparse(&out.text);
        assert!(doc.get("x-casaos").is_none());
        assert!(service(&doc, "web").get("x-casaos").is_none());
    }

    #[test]
    fn rewrites_data_root_in_both_volume_forms() {
        let out = sanitize(TWO_SERVICES, &ComposeOverrides::new());
        let doc = reparse(&out.text);
        let web_volumes = &service(&doc, "web")["volumes"];
        assert_eq!(web_volumes[0].as_str(), Some("./data/html:/usr/share/nginx/html"));
        assert_eq!(web_volumes[1]["source"].as_str(), Some("./data/conf"));
    }

    #[test]
    fn required_volumes_are_deduplicated_in_order() {
        let out = sanitize(TWO_SERVICES, &ComposeOverrides::new());
        assert_eq!(out.volumes, vec!["./data/html", "./data/conf"]);
    }

    #[test]
    fn named_volumes_are_not_required_paths() {
        let out = sanitize(TWO_SERVICES, &ComposeOverrides::new());
        assert!(!out.volumes.iter().any(|v| v.contains("named-volume")));
    }

    #[test]
    fn only_main_service_ports_are_replaced() {
        let overrides = ComposeOverrides::new().ports("8001", "80");
        let doc = reparse(&sanitize(TWO_SERVICES, &overrides).text);

        let web_ports = service(&doc, "web")["ports"].as_sequence().expect("ports");
        assert_eq!(web_ports.len(), 1);
        assert_eq!(web_ports[0].as_str(), Some("8001:80"));

        let worker_ports = service(&doc, "worker")["ports"].as_sequence().expect("ports");
        assert_eq!(worker_ports[0], Value::String("9000".into()));
        assert_eq!(worker_ports[1].as_str(), Some("9001:9001"));
    }

    #[test]
    fn main_service_ports_kept_without_binding() {
        let doc = reparse(&sanitize(TWO_SERVICES, &ComposeOverrides::new()).text);
        assert_eq!(service(&doc, "web")["ports"][0].as_str(), Some("8080:80"));
    }

    #[test]
    fn explicit_main_service_wins_over_vendor_block() {
        let overrides = ComposeOverrides::new()
            .ports("7000", "9000")
            .main_service("worker");
        let doc = reparse(&sanitize(TWO_SERVICES, &overrides).text);
        assert_eq!(service(&doc, "worker")["ports"][0].as_str(), Some("7000:9000"));
        assert_eq!(service(&doc, "web")["ports"][0].as_str(), Some("8080:80"));
    }

    #[test]
    fn env_overrides_win_and_reach_every_service() {
        let overrides = ComposeOverrides::new()
            .env_var("MODE", "dev")
            .env_var("TZ", "UTC");
        let doc = reparse(&sanitize(TWO_SERVICES, &overrides).text);

        let web_env = &service(&doc, "web")["environment"];
        assert_eq!(web_env["MODE"].as_str(), Some("dev"));
        assert_eq!(web_env["URL"].as_str(), Some("http://x/?a=b"));
        assert_eq!(web_env["TZ"].as_str(), Some("UTC"));

        let worker_env = &service(&doc, "worker")["environment"];
        assert_eq!(worker_env["TZ"].as_str(), Some("UTC"));
    }

    #[test]
    fn no_env_overrides_leaves_environment_form_alone() {
        let doc = reparse(&sanitize(TWO_SERVICES, &ComposeOverrides::new()).text);
        assert!(service(&doc, "web")["environment"].is_sequence());
        assert!(service(&doc, "worker").get("environment").is_none());
    }

    #[test]
    fn sanitizing_twice_matches_sanitizing_once() {
        let overrides = ComposeOverrides::new()
            .env_var("MODE", "dev")
            .ports("8001", "80")
            .main_service("web");
        let once = sanitize(TWO_SERVICES, &overrides);
        let twice = sanitize(&once.text, &overrides);
        assert_eq!(reparse(&once.text), reparse(&twice.text));
        assert_eq!(once.text, twice.text);
    }

    #[test]
    fn malformed_yaml_passes_through() {
        let input = "services: [this is : not {valid";
        let out = sanitize(input, &ComposeOverrides::new().env_var("A", "1"));
        assert_eq!(out.text, input);
        assert!(out.volumes.is_empty());
    }

    #[test]
    fn non_compose_text_passes_through() {
        let input = "just a sentence, not a stack";
        let out = sanitize(input, &ComposeOverrides::new());
        assert_eq!(out.text, input);
        assert!(out.volumes.is_empty());
    }

    #[test]
    fn long_values_are_not_wrapped() {
        let secret = "A".repeat(300);
        let input = format!(
            "services:\n  app:\n    image: app\n    environment:\n      CONN: postgres://user:pass@db:5432/app?sslmode=disable {secret}\n"
        );
        let out = sanitize(&input, &ComposeOverrides::new());
        let line = out
            .text
            .lines()
            .find(|l| l.contains("CONN"))
            .expect("CONN line");
        assert!(line.contains(&secret));
    }

    #[test]
    fn remap_only_touches_vendor_root_plus_one_segment() {
        assert_eq!(remap_data_root("/DATA/AppData/plex/config:/config"), "./data/config:/config");
        assert_eq!(remap_data_root("/DATA/AppData/homeassistant:/config"), "./data:/config");
        assert_eq!(remap_data_root("/DATA/AppData/$AppID/db"), "./data/db");
        assert_eq!(remap_data_root("/DATA/Media/movies:/movies"), "/DATA/Media/movies:/movies");
        assert_eq!(remap_data_root("/srv/DATA/AppData/x:/y"), "/srv/DATA/AppData/x:/y");
    }

    #[test]
    fn absolute_host_paths_are_required() {
        let out = sanitize(
            "services:\n  app:\n    volumes:\n      - /etc/localtime:/etc/localtime:ro\n",
            &ComposeOverrides::new(),
        );
        assert_eq!(out.volumes, vec!["/etc/localtime"]);
    }
}
