//! Canonical identity store backed by the shared column-family storage.

use crate::config::DraftConfig;
use crate::errors::{DraftError, Result};
use crate::traits::CanonicalIdentityStore;
use crate::types::*;
use async_trait::async_trait;
use idrepo_crypto::{current_timestamp, SecurityManager};
use idrepo_storage::{
    Batch, BatchExt, Storage, CF_UINS, CF_UIN_BIOMETRICS, CF_UIN_DOCUMENTS, CF_UIN_HISTORY,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Published identities in `uins`, with file metadata keyed by
/// `(uin_ref_id, natural key)` and one history row per publish.
pub struct StoredCanonicalStore<S: Storage> {
    storage: Arc<S>,
    security: Arc<dyn SecurityManager>,
    config: DraftConfig,
}

impl<S: Storage> StoredCanonicalStore<S> {
    pub fn new(storage: Arc<S>, security: Arc<dyn SecurityManager>, config: DraftConfig) -> Self {
        Self {
            storage,
            security,
            config,
        }
    }

    fn serialized_identity(request: &IdentityRequest) -> Result<(Vec<u8>, Option<Vec<u8>>)> {
        let identity = request.identity.as_ref().ok_or_else(|| {
            DraftError::ValidationFailed(vec![FieldError::new("identity", "missing identity")])
        })?;
        let document = serde_json::to_vec(identity)?;
        let profile = request
            .anonymous_profile
            .as_ref()
            .filter(|p| !p.is_null())
            .map(serde_json::to_vec)
            .transpose()?;
        Ok((document, profile))
    }

    fn stage_history(
        &self,
        batch: &mut dyn Batch,
        record: &CanonicalRecord,
        now: u64,
    ) -> Result<()> {
        let entry = PublishHistoryEntry {
            registration_id: record.registration_id.clone(),
            uin_ref_id: record.uin_ref_id.clone(),
            identifier_hash: record.identifier_hash.clone(),
            published_at: now,
        };
        batch.put(CF_UIN_HISTORY, &entry.registration_id, &entry)?;
        Ok(())
    }

    fn identifier_hash(&self, identifier: &str) -> Result<(u32, String)> {
        let shard = self.security.shard_of(identifier);
        Ok((shard, self.security.identifier_hash(identifier, shard)?))
    }
}

#[async_trait]
impl<S: Storage + 'static> CanonicalIdentityStore for StoredCanonicalStore<S> {
    async fn exists_by_identifier_hash(&self, identifier_hash: &str) -> Result<bool> {
        Ok(self.storage.exists(CF_UINS, &identifier_hash).await?)
    }

    async fn find_by_identifier_hash(
        &self,
        identifier_hash: &str,
    ) -> Result<Option<CanonicalRecord>> {
        let mut record: CanonicalRecord = match self.storage.get(CF_UINS, &identifier_hash).await? {
            Some(record) => record,
            None => return Ok(None),
        };

        record.biometrics = self
            .storage
            .get_by_prefix::<_, CanonicalBiometric>(CF_UIN_BIOMETRICS, &record.uin_ref_id)
            .await?
            .into_iter()
            .map(|(_, row)| row)
            .collect();
        record.documents = self
            .storage
            .get_by_prefix::<_, CanonicalDocument>(CF_UIN_DOCUMENTS, &record.uin_ref_id)
            .await?
            .into_iter()
            .map(|(_, row)| row)
            .collect();

        Ok(Some(record))
    }

    async fn publish_history_exists(&self, registration_id: &str) -> Result<bool> {
        Ok(self.storage.exists(CF_UIN_HISTORY, &registration_id).await?)
    }

    async fn create(
        &self,
        batch: &mut dyn Batch,
        request: &IdentityRequest,
        identifier: &str,
    ) -> Result<CanonicalRecord> {
        let (shard, identifier_hash) = self.identifier_hash(identifier)?;
        if self.storage.exists(CF_UINS, &identifier_hash).await? {
            return Err(DraftError::Conflict(format!(
                "identity already published for hash {}",
                identifier_hash
            )));
        }

        let (document, anonymous_profile) = Self::serialized_identity(request)?;
        let now = current_timestamp();
        let record = CanonicalRecord {
            uin_ref_id: Uuid::new_v4().to_string(),
            encrypted_identifier: self.security.encrypt(
                identifier.as_bytes(),
                shard,
                &self.config.identifier_ref_id,
            )?,
            identifier_hash,
            document_hash: self.security.hash(&document),
            document,
            anonymous_profile,
            registration_id: request.registration_id.clone(),
            status_code: STATUS_ACTIVATED.to_string(),
            audit: AuditInfo::created(&self.config.audit_user, now),
            biometrics: Vec::new(),
            documents: Vec::new(),
        };

        batch.put(CF_UINS, &record.identifier_hash, &record)?;
        self.stage_history(batch, &record, now)?;

        info!("Canonical identity staged: {}", record.uin_ref_id);
        Ok(record)
    }

    async fn update(
        &self,
        batch: &mut dyn Batch,
        request: &IdentityRequest,
        identifier: &str,
    ) -> Result<CanonicalRecord> {
        let (_, identifier_hash) = self.identifier_hash(identifier)?;
        let mut record: CanonicalRecord = self
            .storage
            .get(CF_UINS, &identifier_hash)
            .await?
            .ok_or_else(|| DraftError::NotFound(format!("identity {}", identifier_hash)))?;

        let (document, anonymous_profile) = Self::serialized_identity(request)?;
        let now = current_timestamp();

        record.document_hash = self.security.hash(&document);
        record.document = document;
        if anonymous_profile.is_some() {
            record.anonymous_profile = anonymous_profile;
        }
        record.registration_id = request.registration_id.clone();
        record.audit.touch(&self.config.audit_user, now);

        batch.put(CF_UINS, &record.identifier_hash, &record)?;
        self.stage_history(batch, &record, now)?;

        info!("Canonical identity update staged: {}", record.uin_ref_id);
        Ok(record)
    }
}

