//! Domain primitive types used across the stackport workspace.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Filesystem- and hostname-safe application identifier.
///
/// Always non-empty, lowercase, and free of path separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    /// Fallback used when the raw identifier has no usable characters.
    pub const FALLBACK: &'static str = "app";

    /// Creates an identifier from any raw string, slugifying it.
    ///
    /// The result is a valid hostname: ASCII letters are lowercased, digits
    /// are kept, `.` stays a separator, and every other run of characters
    /// (including `_`) becomes a single `-`. Adjacent separators collapse
    /// into the first one, and none lead or trail.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let mut slug = String::with_capacity(raw.len());
        for c in raw.trim().chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
                continue;
            }
            if slug.is_empty() || slug.ends_with(['-', '.']) {
                continue;
            }
            slug.push(if c == '.' { '.' } else { '-' });
        }
        let slug = slug.trim_end_matches(['-', '.']);
        if slug.is_empty() {
            Self(Self::FALLBACK.to_owned())
        } else {
            Self(slug.to_owned())
        }
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical description of one installable application.
///
/// Built once by the metadata normalizer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    /// Slug used as directory name and hostname.
    pub id: AppId,
    /// Display name.
    pub name: String,
    /// Long description.
    pub description: String,
    /// One-line summary.
    pub tagline: String,
    /// Store category.
    pub category: String,
    /// Application version, if advertised.
    pub version: String,
    /// Packager or store author.
    pub author: String,
    /// Upstream developer.
    pub developer: String,
    /// Project website.
    pub website: String,
    /// Source repository link.
    pub repo_link: String,
    /// Support or issue tracker link.
    pub support_link: String,
    /// Demo video link.
    pub video_link: String,
    /// Documentation link.
    pub docs_link: String,
    /// Icon URL.
    pub icon: String,
    /// Screenshot URLs in display order.
    pub screenshots: Vec<String>,
    /// Default `host:container` port pair.
    pub port_map: Option<String>,
    /// Default bind path for app data.
    pub volume_map: Option<String>,
    /// Environment defaults of the main service.
    pub env_vars: BTreeMap<String, String>,
    /// Primary service within the Compose document.
    pub main_service_name: String,
    /// Raw Compose document, verbatim.
    pub compose_text: String,
}

impl ApplicationRecord {
    /// Creates a record with only identity and payload filled in.
    #[must_use]
    pub fn new(id: AppId, name: impl Into<String>, compose_text: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            tagline: String::new(),
            category: String::new(),
            version: String::new(),
            author: String::new(),
            developer: String::new(),
            website: String::new(),
            repo_link: String::new(),
            support_link: String::new(),
            video_link: String::new(),
            docs_link: String::new(),
            icon: String::new(),
            screenshots: Vec::new(),
            port_map: None,
            volume_map: None,
            env_vars: BTreeMap::new(),
            main_service_name: String::new(),
            compose_text: compose_text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_id_lowercases_and_keeps_safe_characters() {
        assert_eq!(AppId::new("Uptime-Kuma-2.0").as_str(), "uptime-kuma-2.0");
    }

    #[test]
    fn app_id_is_a_valid_hostname() {
        assert_eq!(AppId::new("uptime_kuma").as_str(), "uptime-kuma");
        assert_eq!(AppId::new("Uptime-Kuma_2.0").as_str(), "uptime-kuma-2.0");
        assert_eq!(AppId::new("app..v2").as_str(), "app.v2");
        assert_eq!(AppId::new("a_.-b").as_str(), "a-b");
        assert_eq!(AppId::new("_lead_trail_.").as_str(), "lead-trail");
        let id = AppId::new("My__Weird..App__");
        assert!(
            id.as_str()
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
        );
        assert!(!id.as_str().contains(".."));
        assert!(!id.as_str().contains("--"));
    }

    #[test]
    fn app_id_collapses_separators_and_spaces() {
        assert_eq!(AppId::new("AdGuard Home / beta").as_str(), "adguard-home-beta");
    }

    #[test]
    fn app_id_strips_path_traversal() {
        let id = AppId::new("../../etc/passwd");
        assert!(!id.as_str().contains('/'));
        assert!(!id.as_str().starts_with('.'));
        assert_eq!(id.as_str(), "etc-passwd");
    }

    #[test]
    fn app_id_falls_back_when_empty() {
        assert_eq!(AppId::new("  ??  ").as_str(), AppId::FALLBACK);
    }

    #[test]
    fn record_serializes_camel_case() {
        let record = ApplicationRecord::new(AppId::new("plex"), "Plex", "services: {}");
        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["id"], "plex");
        assert!(json.get("mainServiceName").is_some());
        assert!(json.get("composeText").is_some());
    }
}
