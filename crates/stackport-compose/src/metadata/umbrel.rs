//! Schema of the standalone `umbrel-app.yml` app manifest.

use serde::Deserialize;

use super::lenient;

/// Service name Umbrel reserves for its reverse proxy sidecar.
pub const PROXY_SERVICE: &str = "app_proxy";

/// Fields read from an Umbrel manifest. All optional; unknown keys ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UmbrelManifest {
    /// App identifier.
    #[serde(deserialize_with = "lenient::string")]
    pub id: Option<String>,
    /// Display name.
    #[serde(deserialize_with = "lenient::string")]
    pub name: Option<String>,
    /// One-line summary.
    #[serde(deserialize_with = "lenient::string")]
    pub tagline: Option<String>,
    /// Long description.
    #[serde(deserialize_with = "lenient::string")]
    pub description: Option<String>,
    /// Store category.
    #[serde(deserialize_with = "lenient::string")]
    pub category: Option<String>,
    /// Application version.
    #[serde(deserialize_with = "lenient::string")]
    pub version: Option<String>,
    /// Web UI port.
    #[serde(deserialize_with = "lenient::string")]
    pub port: Option<String>,
    /// Upstream developer.
    #[serde(deserialize_with = "lenient::string")]
    pub developer: Option<String>,
    /// Person who submitted the app to the store.
    #[serde(deserialize_with = "lenient::string")]
    pub submitter: Option<String>,
    /// Project website.
    #[serde(deserialize_with = "lenient::string")]
    pub website: Option<String>,
    /// Source repository.
    #[serde(deserialize_with = "lenient::string")]
    pub repo: Option<String>,
    /// Support link.
    #[serde(deserialize_with = "lenient::string")]
    pub support: Option<String>,
    /// Gallery image names or URLs.
    #[serde(deserialize_with = "lenient::string_list")]
    pub gallery: Vec<String>,
    /// Icon URL.
    #[serde(deserialize_with = "lenient::string")]
    pub icon: Option<String>,
}

impl UmbrelManifest {
    /// Parses manifest YAML; returns `None` when it is not a usable manifest.
    pub fn parse(text: &str) -> Option<Self> {
        match serde_yaml::from_str::<Self>(text) {
            Ok(manifest) if manifest.id.is_some() => Some(manifest),
            Ok(_) => {
                tracing::warn!("umbrel manifest has no id");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed umbrel manifest");
                None
            }
        }
    }

    /// Gallery entries as absolute URLs, resolving bare names against `base_url`.
    pub fn gallery_urls(&self, base_url: Option<&str>) -> Vec<String> {
        self.gallery
            .iter()
            .map(|entry| match base_url {
                Some(base) if !is_absolute_url(entry) => {
                    format!("{}/{}", base.trim_end_matches('/'), entry.trim_start_matches('/'))
                }
                _ => entry.clone(),
            })
            .collect()
    }
}

fn is_absolute_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}
