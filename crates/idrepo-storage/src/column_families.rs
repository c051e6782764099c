//! RocksDB column family definitions.

/// Draft records: registration_id → DraftRecord
pub const CF_UIN_DRAFTS: &str = "uin_drafts";

/// Canonical identity records: identifier_hash → CanonicalRecord
pub const CF_UINS: &str = "uins";

/// Canonical biometric metadata: (uin_ref_id, biometric_file_type) → CanonicalBiometric
pub const CF_UIN_BIOMETRICS: &str = "uin_biometrics";

/// Canonical document metadata: (uin_ref_id, doccat_code) → CanonicalDocument
pub const CF_UIN_DOCUMENTS: &str = "uin_documents";

/// Publish history: registration_id → PublishHistoryEntry
pub const CF_UIN_HISTORY: &str = "uin_history";

/// Object store blobs: (identifier_hash, object_ref) → bytes
pub const CF_OBJECTS: &str = "objects";

/// Get all column family names
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        CF_UIN_DRAFTS,
        CF_UINS,
        CF_UIN_BIOMETRICS,
        CF_UIN_DOCUMENTS,
        CF_UIN_HISTORY,
        CF_OBJECTS,
    ]
}
