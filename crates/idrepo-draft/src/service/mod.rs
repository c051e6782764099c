//! Draft service implementation.

mod create;
mod extraction;
mod publish;
mod query;
mod update;

use crate::config::DraftConfig;
use crate::document::{DocumentMerger, DocumentPath};
use crate::reconcile::Stamp;
use crate::store::DraftStore;
use crate::{errors::*, traits::*, types::*};
use async_trait::async_trait;
use idrepo_crypto::{current_timestamp, SecurityManager};
use idrepo_storage::Storage;
use std::collections::BTreeMap;
use std::sync::Arc;

/// External capabilities the draft service depends on
#[derive(Clone)]
pub struct Collaborators {
    pub canonical: Arc<dyn CanonicalIdentityStore>,
    pub identifiers: Arc<dyn IdentifierGenerator>,
    pub validator: Arc<dyn IdentityValidator>,
    pub security: Arc<dyn SecurityManager>,
    pub blobs: Arc<dyn BlobStore>,
    pub extractor: Arc<dyn BiometricExtractor>,
}

/// Draft service implementation
pub struct DraftService<S: Storage> {
    pub(super) storage: Arc<S>,
    pub(super) drafts: DraftStore<S>,
    pub(super) canonical: Arc<dyn CanonicalIdentityStore>,
    pub(super) identifiers: Arc<dyn IdentifierGenerator>,
    pub(super) validator: Arc<dyn IdentityValidator>,
    pub(super) security: Arc<dyn SecurityManager>,
    pub(super) blobs: Arc<dyn BlobStore>,
    pub(super) extractor: Arc<dyn BiometricExtractor>,
    pub(super) merger: DocumentMerger,
    pub(super) config: DraftConfig,
}

impl<S: Storage + 'static> DraftService<S> {
    /// Create a new draft service
    pub fn new(storage: Arc<S>, collaborators: Collaborators, config: DraftConfig) -> Result<Self> {
        let identifier_path = DocumentPath::parse(&config.identifier_path).ok_or_else(|| {
            DraftError::InvalidConfiguration(format!(
                "invalid identifier path: {:?}",
                config.identifier_path
            ))
        })?;

        Ok(Self {
            drafts: DraftStore::new(Arc::clone(&storage)),
            storage,
            canonical: collaborators.canonical,
            identifiers: collaborators.identifiers,
            validator: collaborators.validator,
            security: collaborators.security,
            blobs: collaborators.blobs,
            extractor: collaborators.extractor,
            merger: DocumentMerger::new(identifier_path),
            config,
        })
    }

    pub(super) async fn load_draft(&self, registration_id: &str) -> Result<DraftRecord> {
        self.drafts
            .find(registration_id)
            .await?
            .ok_or_else(|| DraftError::NotFound(format!("draft {}", registration_id)))
    }

    pub(super) fn stamp<'a>(&'a self, registration_id: &'a str) -> Stamp<'a> {
        Stamp {
            registration_id,
            user: &self.config.audit_user,
            now: current_timestamp(),
        }
    }

    /// Persist a single draft in its own batch
    pub(super) async fn commit_draft(&self, draft: &DraftRecord) -> Result<()> {
        let mut batch = self.storage.begin_transaction().await?;
        if let Err(e) = self.drafts.save(batch.as_mut(), draft) {
            batch.rollback();
            return Err(e);
        }
        batch.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl<S: Storage + 'static> DraftOperations for DraftService<S> {
    async fn create_draft(
        &self,
        registration_id: &str,
        identifier: Option<&str>,
    ) -> Result<DraftResponse> {
        self.create_draft_internal(registration_id, identifier).await
    }

    async fn update_draft(
        &self,
        registration_id: &str,
        request: IdentityRequest,
    ) -> Result<DraftResponse> {
        self.update_draft_internal(registration_id, request).await
    }

    async fn publish_draft(&self, registration_id: &str) -> Result<DraftResponse> {
        self.publish_draft_internal(registration_id).await
    }

    async fn discard_draft(&self, registration_id: &str) -> Result<DraftResponse> {
        self.discard_draft_internal(registration_id).await
    }

    async fn has_draft(&self, registration_id: &str) -> Result<bool> {
        self.drafts.exists(registration_id).await
    }

    async fn get_draft(&self, registration_id: &str) -> Result<DraftResponse> {
        self.get_draft_internal(registration_id).await
    }

    async fn extract_biometrics(
        &self,
        registration_id: &str,
        formats: &BTreeMap<String, String>,
    ) -> Result<DraftResponse> {
        self.extract_biometrics_internal(registration_id, formats)
            .await
    }
}
