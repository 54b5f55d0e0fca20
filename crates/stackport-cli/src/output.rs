//! Artifact output: stdout or a file.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Context;

/// Writes `text` to `path`, or to stdout when no path is given.
pub fn emit(text: &str, path: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = path else {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            stdout.write_all(b"\n")?;
        }
        return Ok(());
    };
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = text.len(), "wrote artifact");
    Ok(())
}

/// Like [`emit`], but marks a written file as executable.
pub fn write_script(text: &str, path: Option<&Path>) -> anyhow::Result<()> {
    emit(text, path)?;
    if let Some(path) = path {
        make_executable(path)?;
    }
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions)
        .with_context(|| format!("failed to mark {} executable", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> anyhow::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_writes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("docker-compose.yml");
        emit("services: {}\n", Some(&path)).expect("writes");
        assert_eq!(fs::read_to_string(&path).expect("read"), "services: {}\n");
    }

    #[cfg(unix)]
    #[test]
    fn write_script_marks_file_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("demo-install.sh");
        write_script("#!/usr/bin/env bash\n", Some(&path)).expect("writes");
        let mode = fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}
