//! Thin wrapper over a parsed Compose document.
//!
//! Keeps the document as an ordered [`serde_yaml::Mapping`] so that
//! serialization preserves the key order of the source file.

use std::collections::BTreeMap;

use serde_yaml::{Mapping, Value};
use stackport_common::constants::VENDOR_BLOCK_KEY;
use stackport_common::error::{Result, StackportError};

/// Key of the services section.
pub const SERVICES_KEY: &str = "services";

/// A Compose document known to have a top-level `services` mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeDocument {
    root: Mapping,
}

impl ComposeDocument {
    /// Parses `text` and checks that it carries a services section.
    ///
    /// YAML merge keys (`<<: *anchor`) are expanded so that the serialized
    /// output never depends on anchors.
    ///
    /// # Errors
    ///
    /// Returns an error if `text` is not YAML, its top level is not a mapping,
    /// or it has no `services` mapping.
    pub fn parse(text: &str) -> Result<Self> {
        let mut value: Value = serde_yaml::from_str(text)?;
        if let Err(e) = value.apply_merge() {
            tracing::debug!(error = %e, "leaving unresolvable merge keys in place");
        }

        let Value::Mapping(root) = value else {
            return Err(StackportError::InvalidDocument {
                message: "top level is not a mapping".into(),
            });
        };
        if !matches!(root.get(SERVICES_KEY), Some(Value::Mapping(_))) {
            return Err(StackportError::InvalidDocument {
                message: "no services section found".into(),
            });
        }
        Ok(Self { root })
    }

    /// Returns the top-level vendor metadata block, if any.
    pub fn vendor_block(&self) -> Option<&Value> {
        self.root.get(VENDOR_BLOCK_KEY)
    }

    /// Returns the services mapping.
    pub fn services(&self) -> Option<&Mapping> {
        self.root.get(SERVICES_KEY).and_then(Value::as_mapping)
    }

    /// Returns the services mapping for in-place edits.
    pub fn services_mut(&mut self) -> Option<&mut Mapping> {
        self.root
            .get_mut(SERVICES_KEY)
            .and_then(Value::as_mapping_mut)
    }

    /// Returns the whole document for in-place edits.
    pub const fn root_mut(&mut self) -> &mut Mapping {
        &mut self.root
    }

    /// Service names in source order.
    pub fn service_names(&self) -> Vec<String> {
        self.services()
            .map(|services| {
                services
                    .keys()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Looks up one service definition by name.
    pub fn service(&self, name: &str) -> Option<&Mapping> {
        self.services()?.get(name).and_then(Value::as_mapping)
    }

    /// Resolves the primary service.
    ///
    /// A `declared` name wins when it exists in the document; otherwise the
    /// first service in source order is used.
    pub fn resolve_main_service(&self, declared: Option<&str>) -> Option<String> {
        if let Some(name) = declared.map(str::trim).filter(|n| !n.is_empty()) {
            if self.service(name).is_some() {
                return Some(name.to_owned());
            }
            tracing::debug!(declared = name, "declared main service not in document");
        }
        self.service_names().into_iter().next()
    }

    /// Environment of service `name`, normalized to a string map.
    pub fn service_environment(&self, name: &str) -> BTreeMap<String, String> {
        self.service(name)
            .and_then(|svc| svc.get("environment"))
            .map(parse_environment)
            .map(|env| {
                env.into_iter()
                    .filter_map(|(k, v)| Some((k.as_str()?.to_owned(), scalar_to_string(&v)?)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Serializes the document back to YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.root)?)
    }
}

/// Normalizes an `environment` declaration into an ordered mapping.
///
/// Accepts either a sequence of `"KEY=VALUE"` strings or a key/value mapping.
/// In the sequence form, entries without `=` or with an empty key are skipped,
/// the value keeps any further `=` characters, and a repeated key keeps its
/// first position with the last value. Mapping values are kept as-is.
pub fn parse_environment(value: &Value) -> Mapping {
    let mut env = Mapping::new();
    match value {
        Value::Sequence(entries) => {
            for entry in entries.iter().filter_map(Value::as_str) {
                let Some((key, val)) = entry.split_once('=') else {
                    continue;
                };
                let key = key.trim();
                if key.is_empty() {
                    continue;
                }
                let _ = env.insert(Value::String(key.to_owned()), Value::String(val.to_owned()));
            }
        }
        Value::Mapping(map) => {
            for (key, val) in map {
                if key.as_str().is_some_and(|k| !k.trim().is_empty()) {
                    let _ = env.insert(key.clone(), val.clone());
                }
            }
        }
        _ => {}
    }
    env
}

/// Renders a scalar as a string; `null` becomes empty, collections yield `None`.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}
