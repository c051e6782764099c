//! Encryption operations using XChaCha20-Poly1305.

use crate::{constants::*, errors::*};
use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    XChaCha20Poly1305, XNonce,
};
use rand::RngCore;

/// Encrypt data using XChaCha20-Poly1305 AEAD
///
/// # Arguments
///
/// * `key` - 32-byte encryption key
/// * `plaintext` - Data to encrypt
/// * `nonce` - 24-byte nonce (MUST be unique per key)
/// * `aad` - Associated authenticated data (not encrypted, but authenticated)
///
/// # Returns
///
/// Ciphertext with 16-byte authentication tag appended
pub fn encrypt(
    key: &[u8; KEY_SIZE],
    plaintext: &[u8],
    nonce: &[u8; NONCE_SIZE],
    aad: &[u8],
) -> Result<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new(key.into());
    let xnonce = XNonce::from_slice(nonce);

    let payload = Payload {
        msg: plaintext,
        aad,
    };

    cipher
        .encrypt(xnonce, payload)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))
}

/// Decrypt data using XChaCha20-Poly1305 AEAD
pub fn decrypt(
    key: &[u8; KEY_SIZE],
    ciphertext: &[u8],
    nonce: &[u8; NONCE_SIZE],
    aad: &[u8],
) -> Result<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new(key.into());
    let xnonce = XNonce::from_slice(nonce);

    let payload = Payload {
        msg: ciphertext,
        aad,
    };

    cipher
        .decrypt(xnonce, payload)
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
}

/// Generate a random nonce for XChaCha20-Poly1305
pub fn generate_nonce() -> Result<[u8; NONCE_SIZE]> {
    let mut nonce = [0u8; NONCE_SIZE];
    rand::thread_rng()
        .try_fill_bytes(&mut nonce)
        .map_err(|e| CryptoError::RandomGenerationFailed(e.to_string()))?;
    Ok(nonce)
}

/// Encrypt with a fresh random nonce and return `nonce || ciphertext`
pub fn seal(key: &[u8; KEY_SIZE], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    let nonce = generate_nonce()?;
    let ciphertext = encrypt(key, plaintext, &nonce, aad)?;

    let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    sealed.extend_from_slice(&nonce);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Split `nonce || ciphertext` produced by [`seal`] and decrypt it
pub fn open(key: &[u8; KEY_SIZE], sealed: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::InvalidInput(format!(
            "sealed payload too short: {} bytes",
            sealed.len()
        )));
    }

    let (nonce, ciphertext) = sealed.split_at(NONCE_SIZE);
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    nonce_bytes.copy_from_slice(nonce);

    decrypt(key, ciphertext, &nonce_bytes, aad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt() {
        let key = [42u8; 32];
        let nonce = [1u8; NONCE_SIZE];
        let plaintext = b"900001";
        let aad = b"uin";

        let ciphertext = encrypt(&key, plaintext, &nonce, aad).unwrap();
        assert_eq!(ciphertext.len(), plaintext.len() + TAG_SIZE);

        let decrypted = decrypt(&key, &ciphertext, &nonce, aad).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_decrypt_with_wrong_aad_fails() {
        let key = [42u8; 32];
        let nonce = [1u8; NONCE_SIZE];

        let ciphertext = encrypt(&key, b"900001", &nonce, b"uin").unwrap();
        assert!(decrypt(&key, &ciphertext, &nonce, b"vid").is_err());
    }

    #[test]
    fn test_seal_uses_fresh_nonce() {
        let key = [9u8; 32];
        let a = seal(&key, b"900001", b"uin").unwrap();
        let b = seal(&key, b"900001", b"uin").unwrap();

        assert_ne!(a, b);
        assert_eq!(open(&key, &a, b"uin").unwrap(), b"900001");
        assert_eq!(open(&key, &b, b"uin").unwrap(), b"900001");
    }

    #[test]
    fn test_open_rejects_truncated_payload() {
        let key = [9u8; 32];
        assert!(matches!(
            open(&key, &[0u8; 10], b"uin"),
            Err(CryptoError::InvalidInput(_))
        ));
    }
}
