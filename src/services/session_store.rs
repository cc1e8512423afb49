use crate::{models, services};
use anyhow::Context;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Keeps the auth session in a json file between runs
#[derive(Clone, Debug)]
pub struct FileSessionStore {
    pub path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl services::SessionStore for FileSessionStore {
    async fn load(&self) -> anyhow::Result<Option<models::user_app::Session>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).context("failed to read session file"),
        };

        let session = serde_json::from_str(&raw).context("failed to parse session file")?;
        Ok(Some(session))
    }

    async fn save(&self, session: &models::user_app::Session) -> anyhow::Result<()> {
        let raw = serde_json::to_string(session)?;
        tokio::fs::write(&self.path, raw)
            .await
            .context("failed to write session file")
    }

    async fn clear(&self) -> anyhow::Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("failed to remove session file"),
        }
    }
}
