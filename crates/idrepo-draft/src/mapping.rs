//! Field-by-field copies between draft and canonical rows.

use crate::types::*;
use idrepo_crypto::EncryptedIdentifier;

/// Start a draft from a published record.
///
/// File metadata is left empty; it is brought over by reconciliation.
pub fn draft_from_canonical(
    record: &CanonicalRecord,
    registration_id: &str,
    encrypted_identifier: EncryptedIdentifier,
    audit: AuditInfo,
) -> DraftRecord {
    DraftRecord {
        registration_id: registration_id.to_string(),
        encrypted_identifier,
        identifier_hash: record.identifier_hash.clone(),
        document: (!record.document.is_empty()).then(|| record.document.clone()),
        document_hash: (!record.document_hash.is_empty()).then(|| record.document_hash.clone()),
        anonymous_profile: record.anonymous_profile.clone(),
        status_code: STATUS_DRAFT.to_string(),
        biometrics: Vec::new(),
        documents: Vec::new(),
        audit,
    }
}

pub fn biometric_to_draft(source: &CanonicalBiometric, registration_id: &str) -> BiometricDraftEntry {
    BiometricDraftEntry {
        registration_id: registration_id.to_string(),
        file_ref: source.file_ref.clone(),
        file_type: source.file_type.clone(),
        file_name: source.file_name.clone(),
        file_hash: source.file_hash.clone(),
        audit: source.audit.clone(),
    }
}

pub fn document_to_draft(source: &CanonicalDocument, registration_id: &str) -> DocumentDraftEntry {
    DocumentDraftEntry {
        registration_id: registration_id.to_string(),
        doc_ref: source.doc_ref.clone(),
        category_code: source.category_code.clone(),
        type_code: source.type_code.clone(),
        doc_name: source.doc_name.clone(),
        format_code: source.format_code.clone(),
        doc_hash: source.doc_hash.clone(),
        audit: source.audit.clone(),
    }
}

/// Promote draft biometric metadata under a published record
pub fn biometric_to_canonical(
    draft: &BiometricDraftEntry,
    uin_ref_id: &str,
    user: &str,
    now: u64,
) -> CanonicalBiometric {
    let mut audit = draft.audit.clone();
    audit.touch(user, now);
    CanonicalBiometric {
        uin_ref_id: uin_ref_id.to_string(),
        file_ref: draft.file_ref.clone(),
        file_type: draft.file_type.clone(),
        file_name: draft.file_name.clone(),
        file_hash: draft.file_hash.clone(),
        lang_code: String::new(),
        audit,
    }
}

/// Promote draft document metadata under a published record
pub fn document_to_canonical(
    draft: &DocumentDraftEntry,
    uin_ref_id: &str,
    user: &str,
    now: u64,
) -> CanonicalDocument {
    let mut audit = draft.audit.clone();
    audit.touch(user, now);
    CanonicalDocument {
        uin_ref_id: uin_ref_id.to_string(),
        doc_ref: draft.doc_ref.clone(),
        category_code: draft.category_code.clone(),
        type_code: draft.type_code.clone(),
        doc_name: draft.doc_name.clone(),
        format_code: draft.format_code.clone(),
        doc_hash: draft.doc_hash.clone(),
        lang_code: String::new(),
        audit,
    }
}
