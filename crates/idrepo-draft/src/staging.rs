//! Staging of files submitted with an update request.
//!
//! Each payload is matched to the identity field named by its category. A
//! field whose `format` is the biometric format is stored as a biometric
//! file, anything else as a supporting document. Blobs are content addressed
//! and written before the draft is committed, so retrying an update rewrites
//! identical objects.

use crate::config::DraftConfig;
use crate::errors::{DraftError, Result};
use crate::traits::BlobStore;
use crate::types::*;
use base64::{engine::general_purpose::STANDARD, Engine};
use idrepo_crypto::SecurityManager;
use serde_json::Value;
use tracing::debug;

/// Canonical-shaped metadata for files written by a request
#[derive(Debug, Default)]
pub struct StagedFiles {
    pub biometrics: Vec<CanonicalBiometric>,
    pub documents: Vec<CanonicalDocument>,
}

pub struct FileStager<'a> {
    pub blobs: &'a dyn BlobStore,
    pub security: &'a dyn SecurityManager,
    pub config: &'a DraftConfig,
}

impl FileStager<'_> {
    /// Write every payload to the blob store and describe it.
    ///
    /// `identity` is the object holding the per-category fields. All payloads
    /// are checked before anything is written; categories without a field
    /// are reported together.
    pub async fn stage(
        &self,
        object_hash: &str,
        identity: &Value,
        payloads: &[DocumentPayload],
        audit: &AuditInfo,
    ) -> Result<StagedFiles> {
        let mut errors = Vec::new();
        let mut decoded = Vec::with_capacity(payloads.len());

        for payload in payloads {
            let field = match identity.get(&payload.category) {
                Some(field) if field.is_object() => field,
                _ => {
                    errors.push(FieldError::new(
                        &payload.category,
                        "no identity field describes this document",
                    ));
                    continue;
                }
            };
            let bytes = STANDARD.decode(payload.value.as_bytes()).map_err(|e| {
                DraftError::UnknownSerializationError(format!(
                    "invalid base64 content for {}: {}",
                    payload.category, e
                ))
            })?;
            decoded.push((payload, field, bytes));
        }

        if !errors.is_empty() {
            return Err(DraftError::ValidationFailed(errors));
        }

        let mut staged = StagedFiles::default();
        for (payload, field, bytes) in decoded {
            let digest = self.security.hash(&bytes);
            let format = text_field(field, "format");
            let name = field
                .get("value")
                .and_then(Value::as_str)
                .unwrap_or(payload.category.as_str())
                .to_string();

            if format.eq_ignore_ascii_case(&self.config.biometric_format) {
                let file_ref = format!("{}.{}", digest, format);
                self.blobs
                    .put(object_hash, BlobKind::Biometric, &file_ref, &bytes)
                    .await?;
                debug!("Staged biometric {} as {}", payload.category, file_ref);

                staged.biometrics.push(CanonicalBiometric {
                    uin_ref_id: String::new(),
                    file_ref,
                    file_type: payload.category.clone(),
                    file_name: name,
                    file_hash: digest,
                    lang_code: String::new(),
                    audit: audit.clone(),
                });
            } else {
                self.blobs
                    .put(object_hash, BlobKind::Demographic, &digest, &bytes)
                    .await?;
                debug!("Staged document {} as {}", payload.category, digest);

                staged.documents.push(CanonicalDocument {
                    uin_ref_id: String::new(),
                    doc_ref: digest.clone(),
                    category_code: payload.category.clone(),
                    type_code: text_field(field, "type"),
                    doc_name: name,
                    format_code: format,
                    doc_hash: digest,
                    lang_code: String::new(),
                    audit: audit.clone(),
                });
            }
        }

        Ok(staged)
    }
}

fn text_field(field: &Value, key: &str) -> String {
    field
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
