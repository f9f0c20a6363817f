// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key-value backends for the durable store.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

/// A namespaced byte store.
///
/// Implementations must treat a missing key as `Ok(None)`, never as an
/// error.
#[async_trait]
pub trait KeyValueBackend: Send + Sync + std::fmt::Debug {
    /// Reads the value stored under `key`.
    async fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Vec<u8>) -> io::Result<()>;

    /// Human-readable description of where data lives.
    fn describe(&self) -> String;
}

/// Process-local fallback backend.
///
/// Values live in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueBackend for MemoryBackend {
    async fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> io::Result<()> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    fn describe(&self) -> String {
        "process-local memory".to_string()
    }
}

/// Shared cross-process backend: one file per key in a namespace directory.
///
/// Writes go to a uniquely named temporary sibling first and are renamed
/// into place, so a concurrent reader in the host process never sees a
/// half-written value and concurrent writers never share a temp file. The
/// last rename wins.
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Binds `<root>/<namespace>`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the directory cannot be created or is not
    /// writable.
    pub async fn open(root: &Path, namespace: &str) -> io::Result<Self> {
        if namespace.is_empty() || namespace.contains(['/', '\\']) || namespace == ".." {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid storage namespace: {namespace:?}"),
            ));
        }

        let dir = root.join(namespace);
        tokio::fs::create_dir_all(&dir).await?;

        // Probe writability now rather than failing on the first save.
        let probe = dir.join(".probe");
        tokio::fs::write(&probe, b"").await?;
        tokio::fs::remove_file(&probe).await?;

        Ok(Self { dir })
    }

    /// Returns the namespace directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl KeyValueBackend for FileBackend {
    async fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> io::Result<()> {
        let path = self.path_for(key);
        let tmp = self
            .dir
            .join(format!(".{key}.{}.tmp", Uuid::new_v4().simple()));

        let written = match tokio::fs::write(&tmp, value).await {
            Ok(()) => tokio::fs::rename(&tmp, &path).await,
            Err(e) => Err(e),
        };
        if written.is_err() {
            // Best effort; the temp file may not exist
            let _ = tokio::fs::remove_file(&tmp).await;
        }
        written
    }

    fn describe(&self) -> String {
        format!("shared namespace at {}", self.dir.display())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::task::JoinSet;

    use super::*;

    #[tokio::test]
    async fn memory_missing_key_is_none() {
        let backend = MemoryBackend::new();
        assert!(backend.get("absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn memory_set_replaces() {
        let backend = MemoryBackend::new();
        backend.set("k", b"v1".to_vec()).await.unwrap();
        backend.set("k", b"v2".to_vec()).await.unwrap();
        assert_eq!(backend.get("k").await.unwrap(), Some(b"v2".to_vec()));
    }

    #[tokio::test]
    async fn file_backend_persists_across_instances() {
        let root = tempfile::tempdir().unwrap();

        let first = FileBackend::open(root.path(), "group.test").await.unwrap();
        first.set("com.example.key", b"[1,2]".to_vec()).await.unwrap();

        let second = FileBackend::open(root.path(), "group.test").await.unwrap();
        assert_eq!(
            second.get("com.example.key").await.unwrap(),
            Some(b"[1,2]".to_vec())
        );
        assert!(second.describe().contains("group.test"));
    }

    #[tokio::test]
    async fn file_backend_missing_key_is_none() {
        let root = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(root.path(), "ns").await.unwrap();
        assert!(backend.get("absent").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn file_backend_concurrent_writers_all_succeed() {
        let root = tempfile::tempdir().unwrap();
        let backend = Arc::new(FileBackend::open(root.path(), "ns").await.unwrap());

        let mut writers = JoinSet::new();
        for i in 0..32 {
            let backend = Arc::clone(&backend);
            writers.spawn(async move { backend.set("key", format!("[{i}]").into_bytes()).await });
        }
        while let Some(result) = writers.join_next().await {
            result.unwrap().unwrap();
        }

        let stored = backend.get("key").await.unwrap().unwrap();
        let value: Vec<u32> = serde_json::from_slice(&stored).unwrap();
        assert_eq!(value.len(), 1);

        // Only the value file is left behind
        let entries = std::fs::read_dir(backend.dir()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn file_backend_rejects_path_like_namespaces() {
        let root = tempfile::tempdir().unwrap();
        assert!(FileBackend::open(root.path(), "../escape").await.is_err());
        assert!(FileBackend::open(root.path(), "").await.is_err());
    }
}
