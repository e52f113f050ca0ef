use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::{fs, io::AsyncWriteExt, sync::Mutex};
use tracing::info;

/// Where validated attachments end up. Keys are flat file names.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Writes `body` under `key`. Fails rather than overwriting an existing object.
    async fn put_object(&self, key: &str, body: Bytes) -> anyhow::Result<()>;
}

/// Attachment directory on local disk, served statically under `/uploads`.
#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub async fn new(root: impl AsRef<Path>) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !fs::try_exists(&root).await.unwrap_or(false) {
            fs::create_dir_all(&root)
                .await
                .with_context(|| format!("create upload dir {}", root.display()))?;
            info!(dir = %root.display(), "created uploads directory");
        }
        Ok(Self { root })
    }
}

#[async_trait]
impl StorageClient for LocalStorage {
    async fn put_object(&self, key: &str, body: Bytes) -> anyhow::Result<()> {
        let path = self.root.join(key);
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .with_context(|| format!("open {}", path.display()))?;
        file.write_all(&body)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        file.flush().await.context("flush attachment")?;
        Ok(())
    }
}

/// In-process object map, used by [`crate::state::AppState::fake`].
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, Bytes>>,
}

impl MemoryStorage {
    pub async fn get(&self, key: &str) -> Option<Bytes> {
        self.objects.lock().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.lock().await.len()
    }
}

#[async_trait]
impl StorageClient for MemoryStorage {
    async fn put_object(&self, key: &str, body: Bytes) -> anyhow::Result<()> {
        let mut objects = self.objects.lock().await;
        anyhow::ensure!(!objects.contains_key(key), "object {} already exists", key);
        objects.insert(key.to_string(), body);
        Ok(())
    }
}
