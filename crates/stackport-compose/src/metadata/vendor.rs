//! Schema of the `x-casaos` vendor block embedded in Compose documents.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_yaml::Value;

use super::lenient;

/// Text that may be given as a plain string or as a locale map.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    /// Single untranslated string.
    Plain(String),
    /// Locale code to text, e.g. `en_us: "Plex"`.
    Localized(BTreeMap<String, String>),
}

impl LocalizedText {
    /// Picks English when available, otherwise the first locale.
    pub fn resolve(&self) -> Option<&str> {
        match self {
            Self::Plain(s) => Some(s.as_str()),
            Self::Localized(map) => ["en_us", "en_US", "en-us", "en"]
                .iter()
                .find_map(|locale| map.get(*locale))
                .or_else(|| map.values().next())
                .map(String::as_str),
        }
    }
}

/// Fields read from the vendor block. All optional; unknown keys ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VendorBlock {
    /// Primary service name.
    #[serde(deserialize_with = "lenient::string")]
    pub main: Option<String>,
    /// Display title.
    #[serde(deserialize_with = "lenient::localized")]
    pub title: Option<LocalizedText>,
    /// Long description.
    #[serde(deserialize_with = "lenient::localized")]
    pub description: Option<LocalizedText>,
    /// One-line summary.
    #[serde(deserialize_with = "lenient::localized")]
    pub tagline: Option<LocalizedText>,
    /// Icon URL.
    #[serde(deserialize_with = "lenient::string")]
    pub icon: Option<String>,
    /// Store category.
    #[serde(deserialize_with = "lenient::string")]
    pub category: Option<String>,
    /// Default host port, or `host:container`.
    #[serde(deserialize_with = "lenient::string")]
    pub port_map: Option<String>,
    /// Packager.
    #[serde(deserialize_with = "lenient::string")]
    pub author: Option<String>,
    /// Upstream developer.
    #[serde(deserialize_with = "lenient::string")]
    pub developer: Option<String>,
    /// Screenshot URLs.
    #[serde(deserialize_with = "lenient::string_list")]
    pub screenshot_link: Vec<String>,
    /// Canonical project link.
    #[serde(deserialize_with = "lenient::string", alias = "project_link")]
    pub project_url: Option<String>,
}

impl VendorBlock {
    /// Reads the block from a raw YAML value; a malformed block reads as empty.
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(value) = value else {
            return Self::default();
        };
        serde_yaml::from_value(value.clone()).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring malformed vendor block");
            Self::default()
        })
    }

    /// Resolved display title.
    pub fn title(&self) -> Option<&str> {
        self.title.as_ref().and_then(LocalizedText::resolve)
    }

    /// Resolved description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_ref().and_then(LocalizedText::resolve)
    }

    /// Resolved tagline.
    pub fn tagline(&self) -> Option<&str> {
        self.tagline.as_ref().and_then(LocalizedText::resolve)
    }
}
