//! Draft service type definitions.

use idrepo_crypto::{EncryptedIdentifier, SHARD_SEPARATOR};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Status reported after create, update, publish and extraction
pub const STATUS_DRAFTED: &str = "DRAFTED";

/// Status reported after discard
pub const STATUS_DISCARDED: &str = "DISCARDED";

/// Status code carried by every draft record
pub const STATUS_DRAFT: &str = "DRAFT";

/// Status code given to newly published canonical records
pub const STATUS_ACTIVATED: &str = "ACTIVATED";

/// Creation and modification stamps shared by every persisted row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditInfo {
    pub created_by: String,
    pub created_at: u64,
    pub updated_by: Option<String>,
    pub updated_at: Option<u64>,
}

impl AuditInfo {
    pub fn created(user: &str, now: u64) -> Self {
        Self {
            created_by: user.to_string(),
            created_at: now,
            updated_by: None,
            updated_at: None,
        }
    }

    /// Record a modification, leaving the creation stamp untouched
    pub fn touch(&mut self, user: &str, now: u64) {
        self.updated_by = Some(user.to_string());
        self.updated_at = Some(now);
    }
}

/// A pending identity mutation keyed by registration id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftRecord {
    pub registration_id: String,
    pub encrypted_identifier: EncryptedIdentifier,
    /// `"{shard}_{digest}"` of the plaintext identifier
    pub identifier_hash: String,
    /// Serialized JSON identity document, absent until first populated
    pub document: Option<Vec<u8>>,
    pub document_hash: Option<String>,
    pub anonymous_profile: Option<Vec<u8>>,
    pub status_code: String,
    pub biometrics: Vec<BiometricDraftEntry>,
    pub documents: Vec<DocumentDraftEntry>,
    pub audit: AuditInfo,
}

impl DraftRecord {
    /// Blob-store address for this draft's objects.
    ///
    /// The shard prefix is dropped; blobs are addressed by digest only.
    pub fn object_hash(&self) -> &str {
        object_hash(&self.identifier_hash)
    }
}

/// Strip the `"{shard}_"` prefix from a stored identifier hash
pub fn object_hash(identifier_hash: &str) -> &str {
    identifier_hash
        .split_once(SHARD_SEPARATOR)
        .map_or(identifier_hash, |(_, digest)| digest)
}

/// Biometric file metadata attached to a draft, unique by file type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiometricDraftEntry {
    pub registration_id: String,
    /// Object-store reference of the raw biometric file
    pub file_ref: String,
    pub file_type: String,
    pub file_name: String,
    pub file_hash: String,
    pub audit: AuditInfo,
}

/// Supporting document metadata attached to a draft, unique by category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDraftEntry {
    pub registration_id: String,
    /// Object-store reference of the document body
    pub doc_ref: String,
    pub category_code: String,
    pub type_code: String,
    pub doc_name: String,
    pub format_code: String,
    pub doc_hash: String,
    pub audit: AuditInfo,
}

/// Published identity, keyed by identifier hash
///
/// Biometric and document metadata live in their own column families and
/// are attached on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub uin_ref_id: String,
    pub identifier_hash: String,
    pub encrypted_identifier: EncryptedIdentifier,
    pub document: Vec<u8>,
    pub document_hash: String,
    pub anonymous_profile: Option<Vec<u8>>,
    /// Registration id of the last publish that touched this record
    pub registration_id: String,
    pub status_code: String,
    pub audit: AuditInfo,
    #[serde(skip)]
    pub biometrics: Vec<CanonicalBiometric>,
    #[serde(skip)]
    pub documents: Vec<CanonicalDocument>,
}

/// Published biometric metadata.
///
/// `uin_ref_id` is empty for entries staged from an update request that
/// have not been published yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalBiometric {
    pub uin_ref_id: String,
    pub file_ref: String,
    pub file_type: String,
    pub file_name: String,
    pub file_hash: String,
    pub lang_code: String,
    pub audit: AuditInfo,
}

/// Published document metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalDocument {
    pub uin_ref_id: String,
    pub doc_ref: String,
    pub category_code: String,
    pub type_code: String,
    pub doc_name: String,
    pub format_code: String,
    pub doc_hash: String,
    pub lang_code: String,
    pub audit: AuditInfo,
}

/// Marker that a registration id has been published
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishHistoryEntry {
    pub registration_id: String,
    pub uin_ref_id: String,
    pub identifier_hash: String,
    pub published_at: u64,
}

/// A base64 file keyed by biometric file type or document category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPayload {
    pub category: String,
    pub value: String,
}

impl DocumentPayload {
    pub fn new(category: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            value: value.into(),
        }
    }
}

/// Identity request carried by update and built by publish
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRequest {
    pub registration_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Value>,
    #[serde(default)]
    pub documents: Vec<DocumentPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymous_profile: Option<Value>,
}

/// Response returned by every draft operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<DocumentPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymous_profile: Option<Value>,
}

impl DraftResponse {
    /// Status-only response
    pub fn status(status: &str) -> Self {
        Self {
            status: status.to_string(),
            identity: None,
            documents: Vec::new(),
            anonymous_profile: None,
        }
    }
}

/// Validation mode passed to the identity validator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Create,
    Update,
}

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Object-store area a blob belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlobKind {
    Biometric,
    Demographic,
}

impl BlobKind {
    pub fn folder(self) -> &'static str {
        match self {
            BlobKind::Biometric => "Biometrics",
            BlobKind::Demographic => "Demographics",
        }
    }
}
