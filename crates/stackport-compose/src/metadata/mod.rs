//! Normalization of app-store metadata into an [`ApplicationRecord`].
//!
//! Three conventions are understood: the vendor block embedded in the
//! Compose document, a `config.json` sidecar, and a standalone Umbrel
//! manifest. Each field takes the first non-empty value along a fixed
//! precedence chain, ending in a computed fallback.

mod lenient;
pub mod sidecar;
pub mod umbrel;
pub mod vendor;

use stackport_common::constants::PLACEHOLDER_ICON_BASE_URL;
use stackport_common::types::{AppId, ApplicationRecord};

use crate::document::ComposeDocument;

use self::sidecar::SidecarMetadata;
use self::umbrel::{PROXY_SERVICE, UmbrelManifest};
use self::vendor::VendorBlock;

/// Normalizes a Compose document plus optional sidecar into a record.
///
/// `folder_id` is the identifier of the folder or document the files came
/// from; it is the fallback for both `id` and `name`. Returns `None` when
/// the Compose text is not YAML or has no services.
///
/// Field precedence: vendor block, then sidecar, then fallback. The icon
/// additionally considers `icon_url` (an icon file found next to the
/// document) before falling back to a placeholder avatar seeded by `id`.
pub fn normalize(
    folder_id: &str,
    compose_text: &str,
    sidecar_json: Option<&str>,
    icon_url: Option<&str>,
) -> Option<ApplicationRecord> {
    let doc = parse_compose(folder_id, compose_text)?;
    let vendor = VendorBlock::from_value(doc.vendor_block());
    let sidecar = SidecarMetadata::parse(sidecar_json);

    let main_service = doc.resolve_main_service(vendor.main.as_deref())?;
    let id = AppId::new(first_non_empty([sidecar.id.as_deref()]).unwrap_or(folder_id));
    tracing::debug!(%id, main_service = %main_service, "normalizing compose metadata");

    let mut record = ApplicationRecord::new(
        id,
        first_non_empty([vendor.title(), sidecar.display_name()]).unwrap_or(folder_id),
        compose_text,
    );
    record.description = owned([vendor.description(), sidecar.description.as_deref()]);
    record.tagline = owned([vendor.tagline(), sidecar.tagline.as_deref()]);
    record.category = first_non_empty([vendor.category.as_deref(), sidecar.category.as_deref()])
        .unwrap_or("Unknown")
        .to_owned();
    record.version = owned([sidecar.version.as_deref()]);
    record.author = owned([vendor.author.as_deref(), sidecar.author.as_deref()]);
    record.developer = owned([vendor.developer.as_deref(), sidecar.developer.as_deref()]);
    record.website = owned([vendor.project_url.as_deref()]);
    record.video_link = owned([sidecar.video_link.as_deref()]);
    record.docs_link = owned([sidecar.docs_link.as_deref()]);
    record.icon = first_non_empty([vendor.icon.as_deref(), sidecar.icon.as_deref(), icon_url])
        .map_or_else(|| placeholder_icon(&record.id), str::to_owned);
    record.screenshots = if vendor.screenshot_link.is_empty() {
        sidecar.screenshots
    } else {
        vendor.screenshot_link
    };
    record.port_map = first_non_empty([vendor.port_map.as_deref(), sidecar.port.as_deref()])
        .map(str::to_owned);
    record.env_vars = doc.service_environment(&main_service);
    record.main_service_name = main_service;

    Some(record)
}

/// Normalizes an Umbrel `umbrel-app.yml` manifest plus its Compose document.
///
/// Gallery entries are resolved against `base_url`. The main service is the
/// first service that is not Umbrel's proxy sidecar. Returns `None` when the
/// manifest has no `id` or the Compose text is unusable.
pub fn normalize_umbrel(
    manifest_text: &str,
    compose_text: &str,
    icon_url: Option<&str>,
    base_url: Option<&str>,
) -> Option<ApplicationRecord> {
    let manifest = UmbrelManifest::parse(manifest_text)?;
    let raw_id = manifest.id.as_deref()?;
    let doc = parse_compose(raw_id, compose_text)?;

    let names = doc.service_names();
    let main_service = names
        .iter()
        .find(|name| name.as_str() != PROXY_SERVICE)
        .or_else(|| names.first())?
        .clone();

    let mut record = ApplicationRecord::new(
        AppId::new(raw_id),
        manifest.name.as_deref().unwrap_or(raw_id),
        compose_text,
    );
    record.description = owned([manifest.description.as_deref()]);
    record.tagline = owned([manifest.tagline.as_deref()]);
    record.category = manifest.category.clone().unwrap_or_else(|| "Unknown".to_owned());
    record.version = owned([manifest.version.as_deref()]);
    record.author = owned([manifest.submitter.as_deref()]);
    record.developer = owned([manifest.developer.as_deref()]);
    record.website = owned([manifest.website.as_deref()]);
    record.repo_link = owned([manifest.repo.as_deref()]);
    record.support_link = owned([manifest.support.as_deref()]);
    record.icon = first_non_empty([manifest.icon.as_deref(), icon_url])
        .map_or_else(|| placeholder_icon(&record.id), str::to_owned);
    record.screenshots = manifest.gallery_urls(base_url);
    record.port_map = manifest.port.clone();
    record.env_vars = doc.service_environment(&main_service);
    record.main_service_name = main_service;

    Some(record)
}

/// Already-fetched files of one app folder in a repository tree.
#[derive(Debug, Clone, Default)]
pub struct AppFolder {
    /// Folder name, used as the fallback identifier.
    pub id: String,
    /// Compose document text.
    pub compose: Option<String>,
    /// `umbrel-app.yml` text.
    pub umbrel_manifest: Option<String>,
    /// `config.json` text.
    pub sidecar: Option<String>,
    /// URL of an icon file in the folder.
    pub icon_url: Option<String>,
    /// URL of the folder itself, for resolving relative gallery entries.
    pub base_url: Option<String>,
}

/// Role of a file inside an app folder, recognized by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderFile {
    /// `docker-compose.yml` / `.yaml`.
    Compose,
    /// `umbrel-app.yml` / `.yaml`.
    UmbrelManifest,
    /// `config.json`.
    Sidecar,
    /// `icon.svg`, `icon.png`, `icon.jpg`, or `logo.png`.
    Icon,
}

impl FolderFile {
    /// Classifies a file by its (case-insensitive) name.
    pub fn classify(file_name: &str) -> Option<Self> {
        match file_name.to_ascii_lowercase().as_str() {
            "docker-compose.yml" | "docker-compose.yaml" => Some(Self::Compose),
            "umbrel-app.yml" | "umbrel-app.yaml" => Some(Self::UmbrelManifest),
            "config.json" => Some(Self::Sidecar),
            "icon.svg" | "icon.png" | "icon.jpg" | "logo.png" => Some(Self::Icon),
            _ => None,
        }
    }
}

impl AppFolder {
    /// Creates an empty folder with the given identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Loads the folder into a record.
    ///
    /// An Umbrel manifest takes priority; if it is absent or unusable, the
    /// Compose document is read with its vendor block and optional sidecar.
    /// Folders without a Compose document yield `None`.
    pub fn load(&self) -> Option<ApplicationRecord> {
        let compose = self.compose.as_deref()?;
        if let Some(manifest) = self.umbrel_manifest.as_deref() {
            if let Some(record) = normalize_umbrel(
                manifest,
                compose,
                self.icon_url.as_deref(),
                self.base_url.as_deref(),
            ) {
                return Some(record);
            }
            tracing::debug!(folder = %self.id, "falling back to compose metadata");
        }
        normalize(
            &self.id,
            compose,
            self.sidecar.as_deref(),
            self.icon_url.as_deref(),
        )
    }
}

/// Deterministic placeholder avatar URL for `id`.
pub fn placeholder_icon(id: &AppId) -> String {
    format!("{PLACEHOLDER_ICON_BASE_URL}{id}")
}

fn parse_compose(label: &str, compose_text: &str) -> Option<ComposeDocument> {
    match ComposeDocument::parse(compose_text) {
        Ok(doc) if doc.service_names().is_empty() => {
            tracing::warn!(app = label, "compose document declares no services");
            None
        }
        Ok(doc) => Some(doc),
        Err(e) => {
            tracing::warn!(app = label, error = %e, "not a valid application");
            None
        }
    }
}

fn first_non_empty<'a, const N: usize>(candidates: [Option<&'a str>; N]) -> Option<&'a str> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
}

fn owned<const N: usize>(candidates: [Option<&str>; N]) -> String {
    first_non_empty(candidates).unwrap_or_default().to_owned()
}
