//! # idrepo-draft
//!
//! Draft lifecycle for identity records.
//!
//! A draft is a pending mutation of an identity, keyed by registration id.
//! It can be created from scratch or cloned from the published identity,
//! updated with partial documents and files, and finally published back to
//! the canonical store or discarded.
//!
//! - Every operation commits its relational writes in a single batch
//! - The identifier inside a document cannot be changed by an update
//! - Publishing verifies the decrypted identifier against its stored hash

#![warn(clippy::all)]

pub mod blob;
pub mod canonical;
pub mod config;
pub mod document;
pub mod errors;
pub mod extraction;
pub mod generator;
pub mod mapping;
pub mod reconcile;
pub mod service;
pub mod staging;
pub mod store;
pub mod traits;
pub mod types;
pub mod validator;

#[cfg(test)]
mod tests;

pub use blob::StorageBlobStore;
pub use canonical::StoredCanonicalStore;
pub use config::{DeploymentConfig, DraftConfig};
pub use document::{DocumentMerger, DocumentPath};
pub use errors::{DraftError, ErrorKind, Result, UpstreamFailure};
pub use extraction::{derived_file_name, NoopExtractor};
pub use generator::HttpIdentifierGenerator;
pub use service::{Collaborators, DraftService};
pub use store::DraftStore;
pub use traits::{
    BiometricExtractor, BlobStore, CanonicalIdentityStore, DraftOperations, IdentifierGenerator,
    IdentityValidator,
};
pub use types::*;
pub use validator::RequiredFieldsValidator;
