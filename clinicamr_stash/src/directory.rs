use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use clinicamr_core::{AmrFeatureDocument, ParagraphCache};
use tracing::{debug, info};

const EXTENSION: &str = "json";

/// Paragraph cache with one JSON file per key.
pub struct DirectoryParagraphCache {
    path: PathBuf,
}

impl DirectoryParagraphCache {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.path.join(format!("{key}.{EXTENSION}"))
    }

    async fn entries(&self) -> anyhow::Result<Vec<(String, PathBuf)>> {
        let mut dir = match tokio::fs::read_dir(&self.path).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    entries.push((stem.to_string(), path.clone()));
                }
            }
        }
        entries.sort();
        Ok(entries)
    }
}

#[async_trait]
impl ParagraphCache for DirectoryParagraphCache {
    async fn load(&self, key: &str) -> anyhow::Result<Option<AmrFeatureDocument>> {
        match tokio::fs::read_to_string(self.key_path(key)).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn dump(&self, key: &str, doc: &AmrFeatureDocument) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.path).await?;
        tokio::fs::write(self.key_path(key), serde_json::to_string(doc)?).await?;
        debug!("Stored paragraph: {}", key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> anyhow::Result<bool> {
        Ok(tokio::fs::try_exists(self.key_path(key)).await?)
    }

    async fn keys(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.entries().await?.into_iter().map(|(key, _)| key).collect())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        let entries = self.entries().await?;
        for (_, path) in &entries {
            tokio::fs::remove_file(path).await?;
        }
        info!("Deleted {} cached paragraphs from {}", entries.len(), self.path.display());
        Ok(())
    }
}
