//! Draft service trait definitions.

use crate::{errors::Result, types::*};
use async_trait::async_trait;
use idrepo_storage::Batch;
use std::collections::BTreeMap;

/// Access to published identities
///
/// `create` and `update` stage their writes into the caller's batch so that
/// publishing commits canonical rows and removes the draft in one unit.
#[async_trait]
pub trait CanonicalIdentityStore: Send + Sync {
    /// Whether a canonical record exists for the identifier hash
    async fn exists_by_identifier_hash(&self, identifier_hash: &str) -> Result<bool>;

    /// Load a canonical record together with its biometric and document metadata
    async fn find_by_identifier_hash(&self, identifier_hash: &str)
        -> Result<Option<CanonicalRecord>>;

    /// Whether the registration id has already been published
    async fn publish_history_exists(&self, registration_id: &str) -> Result<bool>;

    /// Stage a new canonical record for `identifier`
    async fn create(
        &self,
        batch: &mut dyn Batch,
        request: &IdentityRequest,
        identifier: &str,
    ) -> Result<CanonicalRecord>;

    /// Stage an update of the canonical record for `identifier`
    async fn update(
        &self,
        batch: &mut dyn Batch,
        request: &IdentityRequest,
        identifier: &str,
    ) -> Result<CanonicalRecord>;
}

/// Source of fresh identity numbers
#[async_trait]
pub trait IdentifierGenerator: Send + Sync {
    async fn generate(&self) -> Result<String>;
}

/// Schema validation of identity requests
pub trait IdentityValidator: Send + Sync {
    /// Return every field error found; empty means valid
    fn validate(&self, request: &IdentityRequest, mode: ValidationMode) -> Vec<FieldError>;
}

/// Object store for biometric and document files
///
/// Objects are addressed by the digest part of the identifier hash and a
/// per-file reference. Writes are not transactional.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get(&self, object_hash: &str, kind: BlobKind, object_ref: &str) -> Result<Vec<u8>>;

    async fn put(
        &self,
        object_hash: &str,
        kind: BlobKind,
        object_ref: &str,
        data: &[u8],
    ) -> Result<()>;

    /// Delete an object. Deleting a missing object succeeds.
    async fn delete(&self, object_hash: &str, kind: BlobKind, object_ref: &str) -> Result<()>;
}

/// Derives template formats from a raw biometric file
#[async_trait]
pub trait BiometricExtractor: Send + Sync {
    async fn derive(
        &self,
        object_hash: &str,
        file_ref: &str,
        formats: &BTreeMap<String, String>,
        raw: &[u8],
    ) -> Result<()>;
}

/// Draft lifecycle operations
#[async_trait]
pub trait DraftOperations: Send + Sync {
    /// Open a draft for a registration id.
    ///
    /// With an identifier the draft clones the published identity; without
    /// one a fresh identifier is generated.
    async fn create_draft(
        &self,
        registration_id: &str,
        identifier: Option<&str>,
    ) -> Result<DraftResponse>;

    /// Merge an identity request into an existing draft
    async fn update_draft(
        &self,
        registration_id: &str,
        request: IdentityRequest,
    ) -> Result<DraftResponse>;

    /// Promote a draft to the canonical store and remove it
    async fn publish_draft(&self, registration_id: &str) -> Result<DraftResponse>;

    /// Remove a draft without publishing
    async fn discard_draft(&self, registration_id: &str) -> Result<DraftResponse>;

    async fn has_draft(&self, registration_id: &str) -> Result<bool>;

    /// Return the draft's document, files and anonymous profile
    async fn get_draft(&self, registration_id: &str) -> Result<DraftResponse>;

    /// Regenerate derived biometric formats for every biometric in the draft
    async fn extract_biometrics(
        &self,
        registration_id: &str,
        formats: &BTreeMap<String, String>,
    ) -> Result<DraftResponse>;
}
