//! File boundary: reads app sources, configuration and recipe lists.

use std::fs;
use std::path::Path;

use anyhow::{Context, bail};
use stackport_common::config::DeploymentConfig;
use stackport_common::types::ApplicationRecord;
use stackport_compose::{AppFolder, FolderFile};

use crate::commands::SourceArgs;

/// Loads global deployment defaults, or the stock defaults without a file.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<DeploymentConfig> {
    let Some(path) = path else {
        return Ok(DeploymentConfig::default());
    };
    let text = read(path)?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("invalid configuration in {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Reads a recipe registry: one name per line, `#` starts a comment.
pub fn load_registry(path: &Path) -> anyhow::Result<Vec<String>> {
    let text = read(path)?;
    Ok(text
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}

/// Loads and normalizes the application described by `source`.
pub fn load_record(source: &SourceArgs) -> anyhow::Result<ApplicationRecord> {
    let path = &source.path;
    let mut folder = if path.is_dir() {
        scan_folder(path)?
    } else {
        let mut folder = AppFolder::new(folder_name(path.parent()));
        folder.compose = Some(read(path)?);
        folder
    };

    if let Some(id) = &source.id {
        folder.id.clone_from(id);
    }
    if let Some(sidecar) = &source.sidecar {
        folder.sidecar = Some(read(sidecar)?);
    }
    if let Some(manifest) = &source.umbrel {
        folder.umbrel_manifest = Some(read(manifest)?);
    }
    if let Some(icon) = &source.icon {
        folder.icon_url = Some(icon.clone());
    }

    if folder.compose.is_none() {
        bail!("no compose file found in {}", path.display());
    }
    folder
        .load()
        .with_context(|| format!("{} holds no usable compose application", path.display()))
}

fn scan_folder(dir: &Path) -> anyhow::Result<AppFolder> {
    let mut folder = AppFolder::new(folder_name(Some(dir)));
    folder.base_url = Some(dir.display().to_string());

    let entries = fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        let Some(kind) = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(FolderFile::classify)
        else {
            continue;
        };
        tracing::debug!(file = %path.display(), ?kind, "found app folder file");
        match kind {
            FolderFile::Compose => folder.compose = Some(read(&path)?),
            FolderFile::UmbrelManifest => folder.umbrel_manifest = Some(read(&path)?),
            FolderFile::Sidecar => folder.sidecar = Some(read(&path)?),
            FolderFile::Icon => folder.icon_url = Some(path.display().to_string()),
        }
    }
    Ok(folder)
}

fn folder_name(dir: Option<&Path>) -> String {
    dir.and_then(|dir| dir.canonicalize().ok())
        .and_then(|dir| dir.file_name().map(|name| name.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "app".to_owned())
}

fn read(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    const COMPOSE: &str = "services:\n  web:\n    image: nginx\nx-casaos:\n  main: web\n  title:\n    en_us: Web Server\n";

    fn source(path: PathBuf) -> SourceArgs {
        SourceArgs {
            path,
            sidecar: None,
            umbrel: None,
            icon: None,
            id: None,
        }
    }

    #[test]
    fn load_config_without_file_uses_defaults() {
        let config = load_config(None).expect("defaults");
        assert_eq!(config, DeploymentConfig::default());
    }

    #[test]
    fn load_config_reads_partial_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"ctId": 300, "bridge": "vmbr1"}"#).expect("write");
        let config = load_config(Some(&path)).expect("loads");
        assert_eq!(config.container_id, 300);
        assert_eq!(config.network_bridge, "vmbr1");
        assert_eq!(config.storage_pool, "local-lvm");
    }

    #[test]
    fn load_config_rejects_invalid_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").expect("write");
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn load_registry_skips_comments_and_blanks() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("recipes.txt");
        fs::write(&path, "# community scripts\nadguard-home\n\n  plex  # media\n").expect("write");
        let registry = load_registry(&path).expect("loads");
        assert_eq!(registry, vec!["adguard-home", "plex"]);
    }

    #[test]
    fn load_record_scans_app_folder() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = dir.path().join("webserver");
        fs::create_dir(&app).expect("mkdir");
        fs::write(app.join("docker-compose.yml"), COMPOSE).expect("write");
        fs::write(app.join("config.json"), r#"{"version": "1.2"}"#).expect("write");
        fs::write(app.join("icon.png"), b"png").expect("write");

        let record = load_record(&source(app)).expect("loads");
        assert_eq!(record.id.as_str(), "webserver");
        assert_eq!(record.name, "Web Server");
        assert_eq!(record.version, "1.2");
        assert!(record.icon.ends_with("icon.png"));
    }

    #[test]
    fn load_record_reads_single_file_with_id_override() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("docker-compose.yml");
        fs::write(&path, COMPOSE).expect("write");

        let mut args = source(path);
        args.id = Some("My Web".to_owned());
        let record = load_record(&args).expect("loads");
        assert_eq!(record.id.as_str(), "my-web");
        assert_eq!(record.main_service_name, "web");
    }

    #[test]
    fn load_record_reports_missing_compose() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_record(&source(dir.path().to_path_buf())).expect_err("no compose");
        assert!(err.to_string().contains("no compose file"));
    }

    #[test]
    fn load_record_reports_unusable_compose() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("docker-compose.yml");
        fs::write(&path, "version: '3'\n").expect("write");
        assert!(load_record(&source(path)).is_err());
    }
}
