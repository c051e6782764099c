//! Hashing utilities using SHA-256.

use sha2::{Digest, Sha256};

/// Hash data using SHA-256
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash data using SHA-256 and return the digest as upper-case hex
///
/// Document hashes and identifier digests are stored in this form.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode_upper(sha256(data))
}

/// Hash `data` with a salt appended
pub fn salted_sha256_hex(data: &[u8], salt: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.update(salt);
    hex::encode_upper(hasher.finalize())
}

/// Securely compare two byte slices in constant time
///
/// Used when checking a recomputed identifier hash against the stored one.
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD"
        );
    }

    #[test]
    fn test_salted_hash_depends_on_salt() {
        let a = salted_sha256_hex(b"900001", b"salt-a");
        let b = salted_sha256_hex(b"900001", b"salt-b");
        assert_ne!(a, b);
        assert_eq!(a, salted_sha256_hex(b"900001", b"salt-a"));
    }

    #[test]
    fn test_constant_time_compare() {
        let a = b"secret";
        let b = b"secret";
        let c = b"public";

        assert!(constant_time_compare(a, b));
        assert!(!constant_time_compare(a, c));
        assert!(!constant_time_compare(a, &b[..3]));
    }
}
