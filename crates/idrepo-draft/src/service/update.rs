//! Draft updates.

use crate::reconcile::{reconcile, Stamp};
use crate::staging::FileStager;
use crate::{errors::*, types::*};
use idrepo_storage::Storage;
use serde_json::Value;
use tracing::{debug, info};

use super::DraftService;

impl<S: Storage + 'static> DraftService<S> {
    /// Merge an identity request into the draft and persist it
    pub(crate) async fn update_draft_internal(
        &self,
        registration_id: &str,
        request: IdentityRequest,
    ) -> Result<DraftResponse> {
        let mut draft = self.load_draft(registration_id).await?;
        let stamp = self.stamp(registration_id);

        self.apply_identity(&mut draft, request.identity.as_ref(), &stamp)?;

        if let Some(profile) = request.anonymous_profile.as_ref().filter(|p| !p.is_null()) {
            draft.anonymous_profile = Some(serde_json::to_vec(profile)?);
            draft.audit.touch(stamp.user, stamp.now);
        }

        if !request.documents.is_empty() {
            self.apply_documents(&mut draft, &request.documents, &stamp)
                .await?;
        }

        self.commit_draft(&draft).await?;

        info!("Draft updated: {}", registration_id);
        Ok(DraftResponse::status(STATUS_DRAFTED))
    }

    fn apply_identity(
        &self,
        draft: &mut DraftRecord,
        identity: Option<&Value>,
        stamp: &Stamp<'_>,
    ) -> Result<()> {
        let identity = match identity {
            Some(identity) if !identity.is_null() => identity,
            _ => return Ok(()),
        };

        let updated = match &draft.document {
            None => {
                if !identity.is_object() {
                    return Err(DraftError::UnknownSerializationError(
                        "identity document must be a JSON object".to_string(),
                    ));
                }
                Some(serde_json::to_vec(identity)?)
            }
            Some(stored) => self.merger.merge(stored, identity)?,
        };

        match updated {
            Some(document) => {
                draft.document_hash = Some(self.security.hash(&document));
                draft.document = Some(document);
                draft.audit.touch(stamp.user, stamp.now);
            }
            None => debug!("Identity unchanged for draft {}", draft.registration_id),
        }
        Ok(())
    }

    async fn apply_documents(
        &self,
        draft: &mut DraftRecord,
        payloads: &[DocumentPayload],
        stamp: &Stamp<'_>,
    ) -> Result<()> {
        let document: Value = match &draft.document {
            Some(bytes) => serde_json::from_slice(bytes)?,
            None => Value::Null,
        };
        let identity = self
            .merger
            .identity_object(&document)
            .cloned()
            .unwrap_or(Value::Null);

        let stager = FileStager {
            blobs: self.blobs.as_ref(),
            security: self.security.as_ref(),
            config: &self.config,
        };
        let staged = stager
            .stage(
                draft.object_hash(),
                &identity,
                payloads,
                &AuditInfo::created(stamp.user, stamp.now),
            )
            .await?;

        let summary = reconcile(&staged.biometrics, &mut draft.biometrics, stamp);
        debug!(
            "Reconciled biometrics for draft {}: {:?}",
            stamp.registration_id, summary
        );
        let summary = reconcile(&staged.documents, &mut draft.documents, stamp);
        debug!(
            "Reconciled documents for draft {}: {:?}",
            stamp.registration_id, summary
        );
        draft.audit.touch(stamp.user, stamp.now);
        Ok(())
    }
}
