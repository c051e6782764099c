//! Object store kept in the `objects` column family.

use crate::errors::{DraftError, Result};
use crate::traits::BlobStore;
use crate::types::BlobKind;
use async_trait::async_trait;
use idrepo_storage::{Storage, CF_OBJECTS};
use std::sync::Arc;

/// Blobs keyed by `(object_hash, "{folder}/{object_ref}")`
pub struct StorageBlobStore<S: Storage> {
    storage: Arc<S>,
}

impl<S: Storage> StorageBlobStore<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    fn key(object_hash: &str, kind: BlobKind, object_ref: &str) -> (String, String) {
        (
            object_hash.to_string(),
            format!("{}/{}", kind.folder(), object_ref),
        )
    }
}

fn unavailable(e: impl std::fmt::Display) -> DraftError {
    DraftError::BlobStorageUnavailable(e.to_string())
}

#[async_trait]
impl<S: Storage + 'static> BlobStore for StorageBlobStore<S> {
    async fn get(&self, object_hash: &str, kind: BlobKind, object_ref: &str) -> Result<Vec<u8>> {
        let key = Self::key(object_hash, kind, object_ref);
        self.storage
            .get::<_, Vec<u8>>(CF_OBJECTS, &key)
            .await
            .map_err(unavailable)?
            .ok_or_else(|| unavailable(format!("object not found: {}", key.1)))
    }

    async fn put(
        &self,
        object_hash: &str,
        kind: BlobKind,
        object_ref: &str,
        data: &[u8],
    ) -> Result<()> {
        let key = Self::key(object_hash, kind, object_ref);
        self.storage
            .put(CF_OBJECTS, &key, &data)
            .await
            .map_err(unavailable)
    }

    async fn delete(&self, object_hash: &str, kind: BlobKind, object_ref: &str) -> Result<()> {
        let key = Self::key(object_hash, kind, object_ref);
        self.storage
            .delete(CF_OBJECTS, &key)
            .await
            .map_err(unavailable)
    }
}
