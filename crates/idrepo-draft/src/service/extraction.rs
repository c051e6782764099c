//! Derived biometric format extraction.

use crate::extraction::derived_file_name;
use crate::{errors::*, types::*};
use idrepo_storage::Storage;
use std::collections::BTreeMap;
use tracing::{info, warn};

use super::DraftService;

impl<S: Storage + 'static> DraftService<S> {
    /// Drop stale derived files, then derive every requested format again
    pub(crate) async fn extract_biometrics_internal(
        &self,
        registration_id: &str,
        formats: &BTreeMap<String, String>,
    ) -> Result<DraftResponse> {
        if formats.is_empty() {
            return Ok(DraftResponse::status(STATUS_DRAFTED));
        }

        let draft = self.load_draft(registration_id).await?;
        let object_hash = draft.object_hash();
        let suffix = &self.config.extraction_format_suffix;

        for (format_key, format_value) in formats {
            for entry in &draft.biometrics {
                let derived = derived_file_name(&entry.file_ref, format_key, format_value, suffix);
                self.blobs
                    .delete(object_hash, BlobKind::Biometric, &derived)
                    .await?;
            }
        }

        for entry in &draft.biometrics {
            let raw = self
                .blobs
                .get(object_hash, BlobKind::Biometric, &entry.file_ref)
                .await?;
            match self
                .extractor
                .derive(object_hash, &entry.file_ref, formats, &raw)
                .await
            {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::BlobStorageUnavailable => return Err(e),
                Err(e) => warn!(
                    "Extraction failed for {} in draft {}: {}",
                    entry.file_type, registration_id, e
                ),
            }
        }

        info!(
            "Extracted {} formats for {} biometrics in draft {}",
            formats.len(),
            draft.biometrics.len(),
            registration_id
        );
        Ok(DraftResponse::status(STATUS_DRAFTED))
    }
}
