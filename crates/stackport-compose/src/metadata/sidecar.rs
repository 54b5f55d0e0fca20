//! Schema of the `config.json` sidecar shipped next to some Compose files.

use serde::Deserialize;

use super::lenient;

/// Fields read from the sidecar. All optional; unknown keys ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SidecarMetadata {
    /// App identifier.
    #[serde(deserialize_with = "lenient::string")]
    pub id: Option<String>,
    /// Display name.
    #[serde(deserialize_with = "lenient::string")]
    pub name: Option<String>,
    /// Alternate display name key.
    #[serde(deserialize_with = "lenient::string")]
    pub title: Option<String>,
    /// Long description.
    #[serde(deserialize_with = "lenient::string")]
    pub description: Option<String>,
    /// One-line summary.
    #[serde(deserialize_with = "lenient::string")]
    pub tagline: Option<String>,
    /// Icon URL.
    #[serde(deserialize_with = "lenient::string")]
    pub icon: Option<String>,
    /// Store category.
    #[serde(deserialize_with = "lenient::string")]
    pub category: Option<String>,
    /// Default port, or `host:container`.
    #[serde(deserialize_with = "lenient::string")]
    pub port: Option<String>,
    /// Packager.
    #[serde(deserialize_with = "lenient::string")]
    pub author: Option<String>,
    /// Upstream developer.
    #[serde(deserialize_with = "lenient::string")]
    pub developer: Option<String>,
    /// Application version.
    #[serde(deserialize_with = "lenient::string")]
    pub version: Option<String>,
    /// Screenshot URLs.
    #[serde(deserialize_with = "lenient::string_list")]
    pub screenshots: Vec<String>,
    /// Demo video link.
    #[serde(deserialize_with = "lenient::string", alias = "youtube", alias = "video")]
    pub video_link: Option<String>,
    /// Documentation link.
    #[serde(
        deserialize_with = "lenient::string",
        alias = "docs",
        alias = "documentation"
    )]
    pub docs_link: Option<String>,
}

impl SidecarMetadata {
    /// Parses sidecar JSON; unparseable or absent text reads as empty.
    pub fn parse(text: Option<&str>) -> Self {
        let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
            return Self::default();
        };
        serde_json::from_str(text).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring malformed sidecar metadata");
            Self::default()
        })
    }

    /// Display name from `name`, falling back to `title`.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.title.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reads_known_fields() {
        let meta = SidecarMetadata::parse(Some(
            r#"{"id":"vaultwarden","name":"Vaultwarden","port":8080,"youtube":"https://yt/x","screenshots":["a.png"]}"#,
        ));
        assert_eq!(meta.id.as_deref(), Some("vaultwarden"));
        assert_eq!(meta.port.as_deref(), Some("8080"));
        assert_eq!(meta.video_link.as_deref(), Some("https://yt/x"));
        assert_eq!(meta.screenshots, vec!["a.png"]);
    }

    #[test]
    fn display_name_falls_back_to_title() {
        let meta = SidecarMetadata::parse(Some(r#"{"title":"Gitea"}"#));
        assert_eq!(meta.display_name(), Some("Gitea"));
    }

    #[test]
    fn malformed_json_reads_as_empty() {
        let meta = SidecarMetadata::parse(Some("{not json"));
        assert!(meta.id.is_none());
        assert!(meta.screenshots.is_empty());
    }

    #[test]
    fn absent_sidecar_reads_as_empty() {
        assert!(SidecarMetadata::parse(None).display_name().is_none());
    }
}
