use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
#[cfg(unix)]
use std::{io::Write, os::unix::fs::OpenOptionsExt};

use crate::config::root_path;
use crate::types::Session;

fn secure_write(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    #[cfg(unix)]
    {
        std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?
            .write_all(content.as_bytes())?;
    }

    #[cfg(not(unix))]
    {
        std::fs::write(path, content)?;
    }

    Ok(())
}

pub fn session_path() -> Result<PathBuf> {
    Ok(root_path()?.join("session.json"))
}

fn parse_session(raw: &str) -> Result<Option<Session>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let session = serde_json::from_str(raw).context("Saved session is not valid JSON")?;
    Ok(Some(session))
}

pub fn load_session() -> Result<Option<Session>> {
    let path = session_path()?;
    if !path.exists() {
        return Ok(None);
    }

    let raw = std::fs::read_to_string(&path).context("Failed to read session file")?;
    parse_session(&raw)
}

pub fn save_session(session: &Session) -> Result<()> {
    let path = session_path()?;
    let raw = serde_json::to_string_pretty(session).context("Failed to encode session")?;
    secure_write(path.as_path(), &raw)
}

pub fn clear_session() -> Result<()> {
    let path = session_path()?;
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}
