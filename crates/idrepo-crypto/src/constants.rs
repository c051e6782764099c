//! Cryptographic constants and domain separation strings.

/// Size of XChaCha20-Poly1305 keys in bytes
pub const KEY_SIZE: usize = 32;

/// Size of XChaCha20-Poly1305 nonces in bytes (192 bits)
pub const NONCE_SIZE: usize = 24;

/// Size of XChaCha20-Poly1305 authentication tags in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

/// Default number of identifier shards ("mod value" range)
pub const DEFAULT_SHARD_MODULO: u32 = 1000;

/// Separator between the shard and the digest of a sharded identifier hash
pub const SHARD_SEPARATOR: char = '_';

/// Domain separation for the per-shard identifier hash salt
/// Format: "idrepo:uin-hash-salt:v1" || shard (big-endian u32)
pub const DOMAIN_IDENTIFIER_HASH_SALT: &str = "idrepo:uin-hash-salt:v1";

/// Domain separation for the per-shard identifier encryption key
/// Format: "idrepo:uin-encrypt:v1" || shard (big-endian u32)
pub const DOMAIN_IDENTIFIER_ENCRYPTION: &str = "idrepo:uin-encrypt:v1";
