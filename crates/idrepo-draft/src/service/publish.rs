//! Draft publication.

use crate::{errors::*, mapping, types::*};
use idrepo_crypto::{constant_time_compare, current_timestamp, EncryptedIdentifier};
use idrepo_storage::{Batch, BatchExt, Storage, CF_UIN_BIOMETRICS, CF_UIN_DOCUMENTS};
use serde_json::Value;
use tracing::{error, info};
use zeroize::Zeroizing;

use super::DraftService;

impl<S: Storage + 'static> DraftService<S> {
    /// Validate, verify and promote the draft in one atomic batch
    pub(crate) async fn publish_draft_internal(&self, registration_id: &str) -> Result<DraftResponse> {
        let draft = self.load_draft(registration_id).await?;
        let request = Self::publish_request(&draft)?;

        let errors = self.validator.validate(&request, ValidationMode::Create);
        if !errors.is_empty() {
            error!(
                "Draft {} failed validation with {} errors",
                registration_id,
                errors.len()
            );
            return Err(DraftError::ValidationFailed(errors));
        }

        let identifier = self.verify_identifier(&draft)?;
        let exists = self
            .canonical
            .exists_by_identifier_hash(&draft.identifier_hash)
            .await?;

        let mut batch = self.storage.begin_transaction().await?;
        let staged = self
            .stage_publish(batch.as_mut(), &draft, &request, &identifier, exists)
            .await;
        let record = match staged {
            Ok(record) => record,
            Err(e) => {
                batch.rollback();
                return Err(e);
            }
        };
        batch.commit().await?;

        info!(
            "Draft {} published to identity {}",
            registration_id, record.uin_ref_id
        );
        Ok(DraftResponse::status(&record.status_code))
    }

    fn publish_request(draft: &DraftRecord) -> Result<IdentityRequest> {
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

        Ok(IdentityRequest {
            registration_id: draft.registration_id.clone(),
            identity,
            documents: Vec::new(),
            anonymous_profile,
        })
    }

    /// Decrypt the identifier and check it against the stored hash
    fn verify_identifier(&self, draft: &DraftRecord) -> Result<Zeroizing<String>> {
        let mismatch = || DraftError::IntegrityMismatch {
            registration_id: draft.registration_id.clone(),
        };

        let plaintext = self
            .decrypt_identifier(&draft.encrypted_identifier)
            .ok_or_else(mismatch)?;
        let shard = self.security.shard_of(&plaintext);
        let recomputed = self.security.identifier_hash(&plaintext, shard)?;

        if !constant_time_compare(recomputed.as_bytes(), draft.identifier_hash.as_bytes()) {
            error!(
                "Identifier hash mismatch for draft {}",
                draft.registration_id
            );
            return Err(mismatch());
        }
        Ok(plaintext)
    }

    fn decrypt_identifier(&self, encrypted: &EncryptedIdentifier) -> Option<Zeroizing<String>> {
        let bytes = self
            .security
            .decrypt(encrypted, &self.config.identifier_ref_id)
            .map_err(|e| error!("Identifier decryption failed: {}", e))
            .ok()?;
        String::from_utf8(bytes).ok().map(Zeroizing::new)
    }

    async fn stage_publish(
        &self,
        batch: &mut dyn Batch,
        draft: &DraftRecord,
        request: &IdentityRequest,
        identifier: &str,
        exists: bool,
    ) -> Result<CanonicalRecord> {
        let record = if exists {
            self.canonical.update(batch, request, identifier).await?
        } else {
            self.canonical.create(batch, request, identifier).await?
        };

        let user = &self.config.audit_user;
        let now = current_timestamp();

        for entry in &draft.biometrics {
            let row = mapping::biometric_to_canonical(entry, &record.uin_ref_id, user, now);
            batch.put(
                CF_UIN_BIOMETRICS,
                &(row.uin_ref_id.as_str(), row.file_type.as_str()),
                &row,
            )?;
        }
        for entry in &draft.documents {
            let row = mapping::document_to_canonical(entry, &record.uin_ref_id, user, now);
            batch.put(
                CF_UIN_DOCUMENTS,
                &(row.uin_ref_id.as_str(), row.category_code.as_str()),
                &row,
            )?;
        }

        self.drafts.delete(batch, &draft.registration_id)?;
        Ok(record)
    }
}
