use rand::RngCore;
use sha2::{Digest, Sha256};

const SESSION_KEY_CONTEXT: &str = "vitrine 2024-06 session token v1";

/// Generates a random 16-byte salt, hex-encoded.
pub fn generate_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Computes the stored password digest: SHA-256 of `password` followed by `salt`,
/// lowercase hex-encoded.
///
/// This matches the format of the `usuarios.senha_hash` column.
///
/// # Example
///
/// ```
/// use vitrine_utils::hash::digest_password;
///
/// let digest = digest_password("segredo", "00ff");
/// assert_eq!(digest.len(), 64);
/// ```
pub fn digest_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verifies `password` against a stored digest and salt.
///
/// The comparison is case-insensitive on the hex digest and runs in constant time
/// with respect to the digest contents.
pub fn verify_password(password: &str, salt: &str, expected: &str) -> bool {
    let actual = digest_password(password, salt);
    constant_time_eq(
        actual.as_bytes(),
        expected.to_ascii_lowercase().as_bytes(),
    )
}

/// Computes a hex-encoded BLAKE3 MAC of `message` under a key derived from `secret`.
pub fn keyed_digest(secret: &str, message: &str) -> String {
    let key = blake3::derive_key(SESSION_KEY_CONTEXT, secret.as_bytes());
    blake3::keyed_hash(&key, message.as_bytes())
        .to_hex()
        .to_string()
}

/// Compares two byte strings without short-circuiting on the first mismatch.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_salt() {
        let a = generate_salt();
        let b = generate_salt();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_digest_password_known_value() {
        // sha256("abc")
        assert_eq!(
            digest_password("a", "bc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_verify_password() {
        let salt = generate_salt();
        let digest = digest_password("segredo123", &salt);
        assert!(verify_password("segredo123", &salt, &digest));
        assert!(verify_password(
            "segredo123",
            &salt,
            &digest.to_ascii_uppercase()
        ));
        assert!(!verify_password("segredo124", &salt, &digest));
        assert!(!verify_password("segredo123", "outro-salt", &digest));
    }

    #[test]
    fn test_keyed_digest() {
        let a = keyed_digest("secret", "user.123");
        assert_eq!(a, keyed_digest("secret", "user.123"));
        assert_ne!(a, keyed_digest("other", "user.123"));
        assert_ne!(a, keyed_digest("secret", "user.124"));
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
    }
}
