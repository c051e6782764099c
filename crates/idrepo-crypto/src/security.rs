//! The security capability injected into the draft service.
//!
//! Identifiers are stored encrypted, looked up through a salted hash, and
//! partitioned into shards. The shard selects both the hash salt and the
//! encryption key, and is embedded in the stored hash as `"{shard}_{digest}"`.

use crate::{constants::*, derivation::derive_shard_key, encryption, errors::*, hashing};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

/// An identifier encrypted under a shard key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedIdentifier {
    /// Shard whose salt/key encrypted this value
    pub salt_ref: u32,
    /// Base64 of `nonce || ciphertext`
    pub ciphertext: String,
}

impl fmt::Display for EncryptedIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.salt_ref, SHARD_SEPARATOR, self.ciphertext)
    }
}

/// Hashing and identifier encryption capability
///
/// Passed explicitly to every component that needs it; there is no global
/// instance.
pub trait SecurityManager: Send + Sync {
    /// Hash arbitrary bytes (document hashes, blob content hashes)
    fn hash(&self, data: &[u8]) -> String;

    /// Shard ("mod value") of an identifier
    fn shard_of(&self, identifier: &str) -> u32;

    /// Salted identifier hash in `"{shard}_{digest}"` form
    fn identifier_hash(&self, identifier: &str, shard: u32) -> Result<String>;

    /// Encrypt an identifier under the key of `shard`, bound to `ref_id`
    fn encrypt(&self, plaintext: &[u8], shard: u32, ref_id: &str) -> Result<EncryptedIdentifier>;

    /// Decrypt a value produced by [`SecurityManager::encrypt`]
    fn decrypt(&self, value: &EncryptedIdentifier, ref_id: &str) -> Result<Vec<u8>>;
}

/// Compute the shard of an identifier for a given modulo
///
/// Numeric identifiers shard by their decimal value; anything else folds its
/// bytes. Both folds stay within `u64` for any input length.
pub fn shard_of(identifier: &str, modulo: u32) -> u32 {
    let modulo = u64::from(modulo.max(1));
    let numeric = !identifier.is_empty() && identifier.bytes().all(|b| b.is_ascii_digit());

    let shard = if numeric {
        identifier
            .bytes()
            .fold(0u64, |acc, b| (acc * 10 + u64::from(b - b'0')) % modulo)
    } else {
        identifier
            .bytes()
            .fold(0u64, |acc, b| (acc * 256 + u64::from(b)) % modulo)
    };

    shard as u32
}

/// Default [`SecurityManager`] deriving per-shard salts and keys from one
/// master key
pub struct IdentifierVault {
    master_key: Zeroizing<[u8; KEY_SIZE]>,
    shard_modulo: u32,
}

impl IdentifierVault {
    /// Create a vault from raw master key bytes
    pub fn new(master_key: [u8; KEY_SIZE], shard_modulo: u32) -> Result<Self> {
        if shard_modulo == 0 {
            return Err(CryptoError::InvalidInput(
                "shard modulo must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            master_key: Zeroizing::new(master_key),
            shard_modulo,
        })
    }

    /// Create a vault from a hex-encoded 32-byte master key
    pub fn from_hex(hex_key: &str, shard_modulo: u32) -> Result<Self> {
        let bytes = Zeroizing::new(
            hex::decode(hex_key.trim()).map_err(|e| CryptoError::InvalidInput(e.to_string()))?,
        );
        if bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeySize {
                expected: KEY_SIZE,
                actual: bytes.len(),
            });
        }

        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(&bytes);
        Self::new(key, shard_modulo)
    }

    /// Configured shard modulo
    pub fn shard_modulo(&self) -> u32 {
        self.shard_modulo
    }
}

impl fmt::Debug for IdentifierVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentifierVault")
            .field("master_key", &"<redacted>")
            .field("shard_modulo", &self.shard_modulo)
            .finish()
    }
}

impl SecurityManager for IdentifierVault {
    fn hash(&self, data: &[u8]) -> String {
        hashing::sha256_hex(data)
    }

    fn shard_of(&self, identifier: &str) -> u32 {
        shard_of(identifier, self.shard_modulo)
    }

    fn identifier_hash(&self, identifier: &str, shard: u32) -> Result<String> {
        let salt = Zeroizing::new(derive_shard_key(
            &self.master_key,
            DOMAIN_IDENTIFIER_HASH_SALT,
            shard,
        )?);
        let digest = hashing::salted_sha256_hex(identifier.as_bytes(), &salt[..]);
        Ok(format!("{}{}{}", shard, SHARD_SEPARATOR, digest))
    }

    fn encrypt(&self, plaintext: &[u8], shard: u32, ref_id: &str) -> Result<EncryptedIdentifier> {
        let key = Zeroizing::new(derive_shard_key(
            &self.master_key,
            DOMAIN_IDENTIFIER_ENCRYPTION,
            shard,
        )?);
        let sealed = encryption::seal(&key, plaintext, ref_id.as_bytes())?;

        Ok(EncryptedIdentifier {
            salt_ref: shard,
            ciphertext: STANDARD.encode(sealed),
        })
    }

    fn decrypt(&self, value: &EncryptedIdentifier, ref_id: &str) -> Result<Vec<u8>> {
        let sealed = STANDARD
            .decode(&value.ciphertext)
            .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?;
        let key = Zeroizing::new(derive_shard_key(
            &self.master_key,
            DOMAIN_IDENTIFIER_ENCRYPTION,
            value.salt_ref,
        )?);

        encryption::open(&key, &sealed, ref_id.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault() -> IdentifierVault {
        IdentifierVault::new([42u8; 32], DEFAULT_SHARD_MODULO).unwrap()
    }

    #[test]
    fn test_shard_of_numeric_identifier() {
        assert_eq!(shard_of("900001", 1000), 1);
        assert_eq!(shard_of("123456789012345678901234567890", 1000), 890);
    }

    #[test]
    fn test_shard_of_non_numeric_is_in_range() {
        let shard = shard_of("ABC-123", 97);
        assert!(shard < 97);
        assert_eq!(shard, shard_of("ABC-123", 97));
    }

    #[test]
    fn test_identifier_hash_embeds_shard() {
        let vault = vault();
        let shard = vault.shard_of("900001");
        let hash = vault.identifier_hash("900001", shard).unwrap();

        let (prefix, digest) = hash.split_once(SHARD_SEPARATOR).unwrap();
        assert_eq!(prefix, "1");
        assert_eq!(digest.len(), 64);
        assert_eq!(hash, vault.identifier_hash("900001", shard).unwrap());
    }

    #[test]
    fn test_identifier_hash_differs_per_master_key() {
        let other = IdentifierVault::new([7u8; 32], DEFAULT_SHARD_MODULO).unwrap();
        assert_ne!(
            vault().identifier_hash("900001", 1).unwrap(),
            other.identifier_hash("900001", 1).unwrap()
        );
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let vault = vault();
        let encrypted = vault.encrypt(b"900001", 1, "uin").unwrap();

        assert_eq!(encrypted.salt_ref, 1);
        assert_eq!(vault.decrypt(&encrypted, "uin").unwrap(), b"900001");
        assert!(encrypted.to_string().starts_with("1_"));
    }

    #[test]
    fn test_decrypt_under_wrong_shard_fails() {
        let vault = vault();
        let mut encrypted = vault.encrypt(b"900001", 1, "uin").unwrap();
        encrypted.salt_ref = 2;

        assert!(vault.decrypt(&encrypted, "uin").is_err());
    }

    #[test]
    fn test_from_hex_validates_length() {
        assert!(matches!(
            IdentifierVault::from_hex("abcd", 1000),
            Err(CryptoError::InvalidKeySize { expected: 32, actual: 2 })
        ));
        assert!(IdentifierVault::from_hex(&"ab".repeat(32), 1000).is_ok());
        assert!(IdentifierVault::from_hex(&"ab".repeat(32), 0).is_err());
    }

    #[test]
    fn test_debug_redacts_master_key() {
        let rendered = format!("{:?}", vault());
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("42"));
    }
}
