//! Draft retrieval and discard.

use crate::{errors::*, types::*};
use base64::{engine::general_purpose::STANDARD, Engine};
use idrepo_storage::Storage;
use serde_json::Value;
use tracing::{debug, info};

use super::DraftService;

impl<S: Storage + 'static> DraftService<S> {
    /// Delete the draft if present; discarding an unknown draft succeeds
    pub(crate) async fn discard_draft_internal(&self, registration_id: &str) -> Result<DraftResponse> {
        if !self.drafts.exists(registration_id).await? {
            debug!("No draft to discard: {}", registration_id);
            return Ok(DraftResponse::status(STATUS_DISCARDED));
        }

        let mut batch = self.storage.begin_transaction().await?;
        if let Err(e) = self.drafts.delete(batch.as_mut(), registration_id) {
            batch.rollback();
            return Err(e);
        }
        batch.commit().await?;

        info!("Draft discarded: {}", registration_id);
        Ok(DraftResponse::status(STATUS_DISCARDED))
    }

    /// Assemble the draft's document, files and anonymous profile
    pub(crate) async fn get_draft_internal(&self, registration_id: &str) -> Result<DraftResponse> {
        let draft = self.load_draft(registration_id).await?;
        let object_hash = draft.object_hash();

        let identity = draft
            .document
            .as_deref()
            .map(serde_json::from_slice::<Value>)
            .transpose()?;
        let anonymous_profile = draft
            .anonymous_profile
            .as_deref()
            .map(serde_json::from_slice::<Value>)
            .transpose()?;

        let mut documents = Vec::with_capacity(draft.biometrics.len() + draft.documents.len());
        for entry in &draft.biometrics {
            let data = self
                .blobs
                .get(object_hash, BlobKind::Biometric, &entry.file_ref)
                .await?;
            documents.push(DocumentPayload::new(&entry.file_type, STANDARD.encode(data)));
        }
        for entry in &draft.documents {
            let data = self
                .blobs
                .get(object_hash, BlobKind::Demographic, &entry.doc_ref)
                .await?;
            documents.push(DocumentPayload::new(&entry.category_code, STANDARD.encode(data)));
        }

        Ok(DraftResponse {
            status: draft.status_code.clone(),
            identity,
            documents,
            anonymous_profile,
        })
    }
}
