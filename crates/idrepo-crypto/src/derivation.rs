//! Key derivation using HKDF-SHA256.

use crate::errors::*;
use hkdf::Hkdf;
use sha2::Sha256;

/// Derive a key using HKDF-SHA256
///
/// # Arguments
///
/// * `ikm` - Input key material
/// * `info` - Domain separation string and context
/// * `output_len` - Length of output key material
pub fn hkdf_derive(ikm: &[u8], info: &[u8], output_len: usize) -> Result<Vec<u8>> {
    let hkdf = Hkdf::<Sha256>::new(None, ikm);
    let mut output = vec![0u8; output_len];

    hkdf.expand(info, &mut output)
        .map_err(|_| CryptoError::HkdfError)?;

    Ok(output)
}

/// Derive a 32-byte key using HKDF-SHA256
pub fn hkdf_derive_32(ikm: &[u8], info: &[u8]) -> Result<[u8; 32]> {
    let output = hkdf_derive(ikm, info, 32)?;
    let mut key = [0u8; 32];
    key.copy_from_slice(&output);
    Ok(key)
}

/// Derive a per-shard value from a master key under a domain string
///
/// Info: `domain || shard (big-endian u32)`
pub fn derive_shard_key(master_key: &[u8; 32], domain: &str, shard: u32) -> Result<[u8; 32]> {
    let mut info = Vec::with_capacity(domain.len() + 4);
    info.extend_from_slice(domain.as_bytes());
    info.extend_from_slice(&shard.to_be_bytes());
    hkdf_derive_32(master_key, &info)
}
