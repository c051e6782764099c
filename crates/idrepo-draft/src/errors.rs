//! Draft service error types.

use crate::types::FieldError;
use thiserror::Error;

/// Failure reported by the identifier generation service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamFailure {
    /// The service answered, but not with a usable identifier
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The service could not be reached or reported a failure
    #[error("service error: {0}")]
    Service(String),
}

/// Stable category of a [`DraftError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    ValidationFailed,
    IntegrityMismatch,
    StorageUnavailable,
    BlobStorageUnavailable,
    UpstreamServiceFailure,
    UnknownSerializationError,
    Crypto,
    InvalidConfiguration,
}

/// Draft service errors
#[derive(Debug, Error)]
pub enum DraftError {
    /// No draft or canonical record where one is required
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A draft or publish history already exists for the registration id
    #[error("Record already exists: {0}")]
    Conflict(String),

    /// Aggregated field errors from the identity validator
    #[error("Validation failed: {}", format_field_errors(.0))]
    ValidationFailed(Vec<FieldError>),

    /// The decrypted identifier does not hash to the stored identifier hash
    #[error("Identifier hash mismatch for registration id {registration_id}")]
    IntegrityMismatch { registration_id: String },

    /// Relational storage failure
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] idrepo_storage::StorageError),

    /// Object store failure
    #[error("Blob storage unavailable: {0}")]
    BlobStorageUnavailable(String),

    /// Identifier generation failure
    #[error("Upstream service failure: {0}")]
    UpstreamServiceFailure(UpstreamFailure),

    /// Malformed structured document or (de)serialization failure
    #[error("Unknown serialization error: {0}")]
    UnknownSerializationError(String),

    /// Cryptographic error while building a draft
    #[error("Cryptographic error: {0}")]
    Crypto(#[from] idrepo_crypto::CryptoError),

    /// Service configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl DraftError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            DraftError::NotFound(_) => ErrorKind::NotFound,
            DraftError::Conflict(_) => ErrorKind::Conflict,
            DraftError::ValidationFailed(_) => ErrorKind::ValidationFailed,
            DraftError::IntegrityMismatch { .. } => ErrorKind::IntegrityMismatch,
            DraftError::StorageUnavailable(_) => ErrorKind::StorageUnavailable,
            DraftError::BlobStorageUnavailable(_) => ErrorKind::BlobStorageUnavailable,
            DraftError::UpstreamServiceFailure(_) => ErrorKind::UpstreamServiceFailure,
            DraftError::UnknownSerializationError(_) => ErrorKind::UnknownSerializationError,
            DraftError::Crypto(_) => ErrorKind::Crypto,
            DraftError::InvalidConfiguration(_) => ErrorKind::InvalidConfiguration,
        }
    }
}

impl From<serde_json::Error> for DraftError {
    fn from(e: serde_json::Error) -> Self {
        DraftError::UnknownSerializationError(e.to_string())
    }
}

impl From<UpstreamFailure> for DraftError {
    fn from(e: UpstreamFailure) -> Self {
        DraftError::UpstreamServiceFailure(e)
    }
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for draft operations
pub type Result<T> = std::result::Result<T, DraftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_every_field() {
        let err = DraftError::ValidationFailed(vec![
            FieldError::new("identity.name", "required field missing"),
            FieldError::new("identity.dob", "required field missing"),
        ]);

        let message = err.to_string();
        assert!(message.contains("identity.name"));
        assert!(message.contains("identity.dob"));
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    }

    #[test]
    fn test_json_errors_map_to_serialization_kind() {
        let json_err = serde_json::from_slice::<serde_json::Value>(b"{not json").unwrap_err();
        let err: DraftError = json_err.into();
        assert_eq!(err.kind(), ErrorKind::UnknownSerializationError);
    }

    #[test]
    fn test_upstream_failure_keeps_subkind() {
        let err: DraftError = UpstreamFailure::MalformedResponse("no uin".to_string()).into();
        assert!(matches!(
            err,
            DraftError::UpstreamServiceFailure(UpstreamFailure::MalformedResponse(_))
        ));
    }
}
