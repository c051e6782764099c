//! Test helpers and mocks for draft service tests.

use crate::*;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use idrepo_crypto::{IdentifierVault, SecurityManager};
use idrepo_storage::{Batch, RocksDbStorage, Storage, StorageError, CF_UIN_DRAFTS};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const TEST_MASTER_KEY: [u8; 32] = [7u8; 32];

/// Helper to create test storage
pub fn create_test_storage() -> (Arc<RocksDbStorage>, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let db = RocksDbStorage::open(temp_dir.path()).unwrap();
    (Arc::new(db), temp_dir)
}

pub fn test_vault() -> Arc<IdentifierVault> {
    Arc::new(IdentifierVault::new(TEST_MASTER_KEY, 1000).unwrap())
}

/// Generator handing out consecutive identifiers
pub struct SequenceGenerator {
    next: AtomicU64,
}

impl SequenceGenerator {
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

#[async_trait]
impl IdentifierGenerator for SequenceGenerator {
    async fn generate(&self) -> Result<String> {
        Ok(self.next.fetch_add(1, Ordering::SeqCst).to_string())
    }
}

/// Generator that always fails
pub struct FailingGenerator(pub UpstreamFailure);

#[async_trait]
impl IdentifierGenerator for FailingGenerator {
    async fn generate(&self) -> Result<String> {
        Err(self.0.clone().into())
    }
}

/// Blob store recording every call before delegating to storage
pub struct RecordingBlobStore {
    pub inner: StorageBlobStore<RocksDbStorage>,
    calls: Mutex<Vec<String>>,
}

impl RecordingBlobStore {
    pub fn new(storage: Arc<RocksDbStorage>) -> Self {
        Self {
            inner: StorageBlobStore::new(storage),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, op: &str, kind: BlobKind, object_ref: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}:{}/{}", op, kind.folder(), object_ref));
    }
}

#[async_trait]
impl BlobStore for RecordingBlobStore {
    async fn get(&self, object_hash: &str, kind: BlobKind, object_ref: &str) -> Result<Vec<u8>> {
        self.record("get", kind, object_ref);
        self.inner.get(object_hash, kind, object_ref).await
    }

    async fn put(
        &self,
        object_hash: &str,
        kind: BlobKind,
        object_ref: &str,
        data: &[u8],
    ) -> Result<()> {
        self.record("put", kind, object_ref);
        self.inner.put(object_hash, kind, object_ref, data).await
    }

    async fn delete(&self, object_hash: &str, kind: BlobKind, object_ref: &str) -> Result<()> {
        self.record("delete", kind, object_ref);
        self.inner.delete(object_hash, kind, object_ref).await
    }
}

/// Extractor recording `(file_ref, format keys)` per call
/// How [`RecordingExtractor`] answers after recording a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractorFailure {
    #[default]
    None,
    Upstream,
    BlobStorage,
}

pub struct RecordingExtractor {
    fail: ExtractorFailure,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl RecordingExtractor {
    pub fn new(fail: ExtractorFailure) -> Self {
        Self {
            fail,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BiometricExtractor for RecordingExtractor {
    async fn derive(
        &self,
        _object_hash: &str,
        file_ref: &str,
        formats: &BTreeMap<String, String>,
        _raw: &[u8],
    ) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((file_ref.to_string(), formats.keys().cloned().collect()));
        match self.fail {
            ExtractorFailure::None => Ok(()),
            ExtractorFailure::Upstream => {
                Err(UpstreamFailure::Service("extractor unavailable".to_string()).into())
            }
            ExtractorFailure::BlobStorage => Err(DraftError::BlobStorageUnavailable(
                "derived file write failed".to_string(),
            )),
        }
    }
}

/// Canonical store that stages its writes and then fails
pub struct FailingCanonicalStore {
    inner: StoredCanonicalStore<RocksDbStorage>,
}

fn canonical_write_failed() -> DraftError {
    DraftError::StorageUnavailable(StorageError::TransactionError(
        "canonical write failed".to_string(),
    ))
}

#[async_trait]
impl CanonicalIdentityStore for FailingCanonicalStore {
    async fn exists_by_identifier_hash(&self, identifier_hash: &str) -> Result<bool> {
        self.inner.exists_by_identifier_hash(identifier_hash).await
    }

    async fn find_by_identifier_hash(
        &self,
        identifier_hash: &str,
    ) -> Result<Option<CanonicalRecord>> {
        self.inner.find_by_identifier_hash(identifier_hash).await
    }

    async fn publish_history_exists(&self, registration_id: &str) -> Result<bool> {
        self.inner.publish_history_exists(registration_id).await
    }

    async fn create(
        &self,
        batch: &mut dyn Batch,
        request: &IdentityRequest,
        identifier: &str,
    ) -> Result<CanonicalRecord> {
        self.inner.create(batch, request, identifier).await?;
        Err(canonical_write_failed())
    }

    async fn update(
        &self,
        batch: &mut dyn Batch,
        request: &IdentityRequest,
        identifier: &str,
    ) -> Result<CanonicalRecord> {
        self.inner.update(batch, request, identifier).await?;
        Err(canonical_write_failed())
    }
}

/// Knobs for [`TestContext::with_options`]
pub struct TestOptions {
    pub failing_canonical: bool,
    pub failing_extractor: ExtractorFailure,
    pub generator: Option<Arc<dyn IdentifierGenerator>>,
    pub required_fields: Vec<&'static str>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            failing_canonical: false,
            failing_extractor: ExtractorFailure::None,
            generator: None,
            required_fields: vec!["identity.UIN"],
        }
    }
}

/// A draft service over temporary storage with inspectable collaborators
pub struct TestContext {
    pub service: DraftService<RocksDbStorage>,
    pub storage: Arc<RocksDbStorage>,
    pub canonical: Arc<StoredCanonicalStore<RocksDbStorage>>,
    pub blobs: Arc<RecordingBlobStore>,
    pub extractor: Arc<RecordingExtractor>,
    pub vault: Arc<IdentifierVault>,
    _temp_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_options(TestOptions::default())
    }

    pub fn with_options(options: TestOptions) -> Self {
        let (storage, temp_dir) = create_test_storage();
        let vault = test_vault();
        let config = DraftConfig::default();

        let security: Arc<dyn SecurityManager> = vault.clone();
        let canonical = Arc::new(StoredCanonicalStore::new(
            Arc::clone(&storage),
            Arc::clone(&security),
            config.clone(),
        ));
        let service_canonical: Arc<dyn CanonicalIdentityStore> = if options.failing_canonical {
            Arc::new(FailingCanonicalStore {
                inner: StoredCanonicalStore::new(
                    Arc::clone(&storage),
                    Arc::clone(&security),
                    config.clone(),
                ),
            })
        } else {
            canonical.clone()
        };

        let blobs = Arc::new(RecordingBlobStore::new(Arc::clone(&storage)));
        let extractor = Arc::new(RecordingExtractor::new(options.failing_extractor));
        let identifiers = options
            .generator
            .unwrap_or_else(|| Arc::new(SequenceGenerator::starting_at(900001)));

        let collaborators = Collaborators {
            canonical: service_canonical,
            identifiers,
            validator: Arc::new(RequiredFieldsValidator::from_paths(
                options.required_fields.iter().copied(),
            )),
            security,
            blobs: blobs.clone(),
            extractor: extractor.clone(),
        };

        let service = DraftService::new(Arc::clone(&storage), collaborators, config).unwrap();

        Self {
            service,
            storage,
            canonical,
            blobs,
            extractor,
            vault,
            _temp_dir: temp_dir,
        }
    }

    /// Read a draft straight from storage
    pub async fn stored_draft(&self, registration_id: &str) -> DraftRecord {
        self.storage
            .get(CF_UIN_DRAFTS, &registration_id)
            .await
            .unwrap()
            .expect("draft should be stored")
    }

    /// Overwrite a draft straight in storage
    pub async fn overwrite_draft(&self, draft: &DraftRecord) {
        self.storage
            .put(CF_UIN_DRAFTS, &draft.registration_id, draft)
            .await
            .unwrap();
    }

    pub fn identifier_hash(&self, identifier: &str) -> String {
        let shard = self.vault.shard_of(identifier);
        self.vault.identifier_hash(identifier, shard).unwrap()
    }
}

pub fn document_of(draft: &DraftRecord) -> Value {
    serde_json::from_slice(draft.document.as_ref().expect("document should be set")).unwrap()
}

pub fn identity_request(registration_id: &str, identity: Value) -> IdentityRequest {
    IdentityRequest {
        registration_id: registration_id.to_string(),
        identity: Some(identity),
        ..Default::default()
    }
}

pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Identity fields describing one biometric and one supporting document
pub fn identity_with_files() -> Value {
    json!({
        "identity": {
            "name": "Alice",
            "individualBiometrics": {
                "format": "cbeff",
                "version": 1.0,
                "value": "individualBiometrics_bio"
            },
            "proofOfAddress": {
                "format": "pdf",
                "type": "DOC001",
                "value": "proofOfAddress"
            }
        }
    })
}

/// Update request carrying `biometric` and `address` file contents
pub fn file_request(registration_id: &str, biometric: &[u8], address: &[u8]) -> IdentityRequest {
    IdentityRequest {
        registration_id: registration_id.to_string(),
        identity: Some(identity_with_files()),
        documents: vec![
            DocumentPayload::new("individualBiometrics", encode(biometric)),
            DocumentPayload::new("proofOfAddress", encode(address)),
        ],
        anonymous_profile: None,
    }
}

/// Create a generated draft and populate it with files
pub async fn create_draft_with_files(ctx: &TestContext, registration_id: &str) {
    ctx.service.create_draft(registration_id, None).await.unwrap();
    ctx.service
        .update_draft(registration_id, file_request(registration_id, b"bio-v1", b"poa-v1"))
        .await
        .unwrap();
}
