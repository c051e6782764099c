//! # idrepo-crypto
//!
//! Cryptographic building blocks for the identity repository draft service.
//!
//! The draft service never calls primitives directly; it receives a
//! [`SecurityManager`] capability and uses it to hash documents, derive
//! salted identifier hashes, and encrypt identifiers at rest.
//!
//! ## Security Properties
//!
//! - Master key material is zeroized on drop
//! - Identifier hashes are compared in constant time
//! - No unsafe code
//! - Strict domain separation for all key derivations

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constants;
pub mod derivation;
pub mod encryption;
pub mod errors;
pub mod hashing;
pub mod security;
pub mod utils;

pub use constants::*;
pub use derivation::*;
pub use encryption::*;
pub use errors::{CryptoError, Result};
pub use hashing::*;
pub use security::{shard_of, EncryptedIdentifier, IdentifierVault, SecurityManager};
pub use utils::*;
