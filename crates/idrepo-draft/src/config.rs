use crate::blob::StorageBlobStore;
use crate::canonical::StoredCanonicalStore;
use crate::extraction::NoopExtractor;
use crate::generator::HttpIdentifierGenerator;
use crate::service::{Collaborators, DraftService};
use crate::validator::RequiredFieldsValidator;
use anyhow::Result;
use idrepo_crypto::{IdentifierVault, SecurityManager, DEFAULT_SHARD_MODULO};
use idrepo_storage::RocksDbStorage;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use zeroize::Zeroizing;

/// Draft service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftConfig {
    /// Dotted path of the identifier inside the identity document
    pub identifier_path: String,

    /// Reference id bound to identifier encryption
    pub identifier_ref_id: String,

    /// Suffix removed from extraction format keys to obtain the modality
    pub extraction_format_suffix: String,

    /// User recorded in audit fields
    pub audit_user: String,

    /// Identity field `format` value that marks a biometric category
    pub biometric_format: String,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            identifier_path: "identity.UIN".to_string(),
            identifier_ref_id: "uin".to_string(),
            extraction_format_suffix: "ExtractionFormat".to_string(),
            audit_user: "idrepo-draft".to_string(),
            biometric_format: "cbeff".to_string(),
        }
    }
}

impl DraftConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = DraftConfig {
            identifier_path: lookup("IDREPO_IDENTIFIER_PATH").unwrap_or(defaults.identifier_path),
            identifier_ref_id: lookup("IDREPO_IDENTIFIER_REF_ID")
                .unwrap_or(defaults.identifier_ref_id),
            extraction_format_suffix: lookup("IDREPO_EXTRACTION_FORMAT_SUFFIX")
                .unwrap_or(defaults.extraction_format_suffix),
            audit_user: lookup("IDREPO_AUDIT_USER").unwrap_or(defaults.audit_user),
            biometric_format: lookup("IDREPO_BIOMETRIC_FORMAT")
                .unwrap_or(defaults.biometric_format),
        };

        if config.identifier_path.trim().is_empty() {
            anyhow::bail!("IDREPO_IDENTIFIER_PATH must not be empty");
        }
        if config.identifier_ref_id.is_empty() {
            anyhow::bail!("IDREPO_IDENTIFIER_REF_ID must not be empty");
        }

        Ok(config)
    }
}

/// Deployment settings for the reference collaborators
#[derive(Clone)]
pub struct DeploymentConfig {
    /// Path to the RocksDB database
    pub database_path: PathBuf,

    /// Identifier generation endpoint
    pub generator_url: String,

    /// Shard count for identifier hashing
    pub shard_modulo: u32,

    /// Master key for identifier hashing and encryption (hex-encoded 32 bytes)
    master_key_hex: Zeroizing<String>,

    /// Identity paths required when publishing
    pub required_fields: Vec<String>,
}

impl fmt::Debug for DeploymentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeploymentConfig")
            .field("database_path", &self.database_path)
            .field("generator_url", &self.generator_url)
            .field("shard_modulo", &self.shard_modulo)
            .field("master_key_hex", &"[REDACTED]")
            .field("required_fields", &self.required_fields)
            .finish()
    }
}

impl DeploymentConfig {
    /// Load deployment settings from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup("IDREPO_DATABASE_PATH")
            .unwrap_or_else(|| "./data/idrepo.db".to_string())
            .into();

        let generator_url = lookup("IDREPO_GENERATOR_URL")
            .unwrap_or_else(|| "http://localhost:8090/v1/uingenerator/uin".to_string());

        let shard_modulo = match lookup("IDREPO_SHARD_MODULO") {
            Some(value) => value.parse()?,
            None => DEFAULT_SHARD_MODULO,
        };

        let master_key_hex = lookup("IDREPO_MASTER_KEY")
            .map(Zeroizing::new)
            .ok_or_else(|| anyhow::anyhow!("IDREPO_MASTER_KEY environment variable required"))?;

        let required_fields = lookup("IDREPO_REQUIRED_FIELDS")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|path| !path.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(DeploymentConfig {
            database_path,
            generator_url,
            shard_modulo,
            master_key_hex,
            required_fields,
        })
    }

    /// Build the identifier vault from the configured master key
    pub fn load_vault(&self) -> Result<IdentifierVault> {
        Ok(IdentifierVault::from_hex(&self.master_key_hex, self.shard_modulo)?)
    }

    /// Open storage and wire the reference collaborators into a service
    pub fn build_service(&self, config: DraftConfig) -> Result<DraftService<RocksDbStorage>> {
        let storage = Arc::new(RocksDbStorage::open(&self.database_path)?);
        let security: Arc<dyn SecurityManager> = Arc::new(self.load_vault()?);

        let collaborators = Collaborators {
            canonical: Arc::new(StoredCanonicalStore::new(
                Arc::clone(&storage),
                Arc::clone(&security),
                config.clone(),
            )),
            identifiers: Arc::new(HttpIdentifierGenerator::new(
                reqwest::Client::new(),
                self.generator_url.clone(),
            )),
            validator: Arc::new(RequiredFieldsValidator::from_paths(
                self.required_fields.iter().map(String::as_str),
            )),
            security,
            blobs: Arc::new(StorageBlobStore::new(Arc::clone(&storage))),
            extractor: Arc::new(NoopExtractor),
        };

        info!(
            "Draft service configured with database {}",
            self.database_path.display()
        );
        Ok(DraftService::new(storage, collaborators, config)?)
    }
}
