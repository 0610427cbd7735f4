use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::document::AmrFeatureDocument;

/// Persistent store of annotated paragraphs by paragraph key.
#[async_trait]
pub trait ParagraphCache: Send + Sync {
    async fn load(&self, key: &str) -> anyhow::Result<Option<AmrFeatureDocument>>;

    async fn dump(&self, key: &str, doc: &AmrFeatureDocument) -> anyhow::Result<()>;

    async fn exists(&self, key: &str) -> anyhow::Result<bool> {
        Ok(self.load(key).await?.is_some())
    }

    async fn keys(&self) -> anyhow::Result<Vec<String>>;

    /// Remove every cached paragraph.
    async fn clear(&self) -> anyhow::Result<()>;
}

/// Process local cache, mostly useful for tests and one shot parses.
#[derive(Default)]
pub struct MemoryParagraphCache {
    docs: RwLock<BTreeMap<String, AmrFeatureDocument>>,
}

impl MemoryParagraphCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ParagraphCache for MemoryParagraphCache {
    async fn load(&self, key: &str) -> anyhow::Result<Option<AmrFeatureDocument>> {
        Ok(self.docs.read().await.get(key).cloned())
    }

    async fn dump(&self, key: &str, doc: &AmrFeatureDocument) -> anyhow::Result<()> {
        self.docs.write().await.insert(key.to_string(), doc.clone());
        Ok(())
    }

    async fn exists(&self, key: &str) -> anyhow::Result<bool> {
        Ok(self.docs.read().await.contains_key(key))
    }

    async fn keys(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.docs.read().await.keys().cloned().collect())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        self.docs.write().await.clear();
        Ok(())
    }
}
