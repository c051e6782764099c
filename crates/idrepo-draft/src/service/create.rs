//! Draft creation.

use crate::reconcile::{reconcile, Stamp};
use crate::{errors::*, mapping, types::*};
use idrepo_storage::Storage;
use tracing::{debug, error, info};

use super::DraftService;

impl<S: Storage + 'static> DraftService<S> {
    /// Open a draft, cloning the published identity when an identifier is given
    pub(crate) async fn create_draft_internal(
        &self,
        registration_id: &str,
        identifier: Option<&str>,
    ) -> Result<DraftResponse> {
        if self.canonical.publish_history_exists(registration_id).await?
            || self.drafts.exists(registration_id).await?
        {
            error!("Draft or publish history already exists: {}", registration_id);
            return Err(DraftError::Conflict(format!(
                "registration id {}",
                registration_id
            )));
        }

        let stamp = self.stamp(registration_id);
        let draft = match identifier {
            Some(identifier) => self.draft_from_canonical(identifier, &stamp).await?,
            None => self.draft_from_new_identifier(&stamp).await?,
        };

        self.commit_draft(&draft).await?;

        info!("Draft created: {}", registration_id);
        Ok(DraftResponse::status(STATUS_DRAFTED))
    }

    async fn draft_from_canonical(&self, identifier: &str, stamp: &Stamp<'_>) -> Result<DraftRecord> {
        let shard = self.security.shard_of(identifier);
        let identifier_hash = self.security.identifier_hash(identifier, shard)?;

        if !self.canonical.exists_by_identifier_hash(&identifier_hash).await? {
            return Err(DraftError::NotFound(format!("identity {}", identifier_hash)));
        }
        let record = self
            .canonical
            .find_by_identifier_hash(&identifier_hash)
            .await?
            .ok_or_else(|| DraftError::NotFound(format!("identity {}", identifier_hash)))?;

        let encrypted = self.security.encrypt(
            identifier.as_bytes(),
            shard,
            &self.config.identifier_ref_id,
        )?;
        let mut draft = mapping::draft_from_canonical(
            &record,
            stamp.registration_id,
            encrypted,
            AuditInfo::created(stamp.user, stamp.now),
        );

        let summary = reconcile(&record.biometrics, &mut draft.biometrics, stamp);
        debug!(
            "Reconciled biometrics for draft {}: {:?}",
            stamp.registration_id, summary
        );
        let summary = reconcile(&record.documents, &mut draft.documents, stamp);
        debug!(
            "Reconciled documents for draft {}: {:?}",
            stamp.registration_id, summary
        );

        Ok(draft)
    }

    async fn draft_from_new_identifier(&self, stamp: &Stamp<'_>) -> Result<DraftRecord> {
        let identifier = self.identifiers.generate().await?;
        let shard = self.security.shard_of(&identifier);

        let document = serde_json::to_vec(&self.merger.identity_document(&identifier))?;
        Ok(DraftRecord {
            registration_id: stamp.registration_id.to_string(),
            encrypted_identifier: self.security.encrypt(
                identifier.as_bytes(),
                shard,
                &self.config.identifier_ref_id,
            )?,
            identifier_hash: self.security.identifier_hash(&identifier, shard)?,
            document_hash: Some(self.security.hash(&document)),
            document: Some(document),
            anonymous_profile: None,
            status_code: STATUS_DRAFT.to_string(),
            biometrics: Vec::new(),
            documents: Vec::new(),
            audit: AuditInfo::created(stamp.user, stamp.now),
        })
    }
}
