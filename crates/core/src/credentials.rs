//! Encryption at rest for per-workspace integration credentials.
//!
//! Every call derives a fresh AES-256 key from the server secret with
//! PBKDF2-HMAC-SHA512 and a random salt, then seals the JSON-serialized
//! credential blob with AES-256-GCM under a random IV. The stored form is
//!
//! ```text
//! base64( salt[64] || iv[12] || tag[16] || ciphertext[..] )
//! ```
//!
//! Decryption slices the decoded buffer at the same fixed offsets.

use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce, Tag};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::Sha512;

/// Length of the random per-call PBKDF2 salt.
pub const SALT_LEN: usize = 64;

/// Length of the AES-GCM initialization vector.
pub const IV_LEN: usize = 12;

/// Length of the AES-GCM authentication tag.
pub const TAG_LEN: usize = 16;

/// Derived key length (AES-256).
pub const KEY_LEN: usize = 32;

/// Fixed PBKDF2 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Minimum accepted length of the server secret.
pub const MIN_SECRET_LEN: usize = 32;

const HEADER_LEN: usize = SALT_LEN + IV_LEN + TAG_LEN;

/// Errors from the credential cipher.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Encryption secret must be at least {MIN_SECRET_LEN} characters")]
    WeakSecret,

    #[error("Credential payload is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("Credential payload is truncated ({0} bytes)")]
    Truncated(usize),

    /// Wrong secret or tampered ciphertext. AES-GCM does not distinguish.
    #[error("Credential payload failed authentication")]
    Authentication,

    #[error("Credential JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Symmetric cipher for credential blobs, bound to one server secret.
#[derive(Clone)]
pub struct CredentialCipher {
    secret: Vec<u8>,
}

impl std::fmt::Debug for CredentialCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCipher")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl CredentialCipher {
    pub fn new(secret: &str) -> Result<Self, CredentialError> {
        if secret.chars().count() < MIN_SECRET_LEN {
            return Err(CredentialError::WeakSecret);
        }
        Ok(Self {
            secret: secret.as_bytes().to_vec(),
        })
    }

    /// Serialize `value` to JSON and encrypt it.
    pub fn encrypt<T: Serialize>(&self, value: &T) -> Result<String, CredentialError> {
        let mut rng = rand::rng();
        let mut salt = [0u8; SALT_LEN];
        let mut iv = [0u8; IV_LEN];
        rng.fill_bytes(&mut salt);
        rng.fill_bytes(&mut iv);

        let cipher = self.cipher_for(&salt);
        let mut buffer = serde_json::to_vec(value)?;
        let tag = cipher
            .encrypt_in_place_detached(Nonce::from_slice(&iv), b"", &mut buffer)
            .map_err(|_| CredentialError::Authentication)?;

        let mut out = Vec::with_capacity(HEADER_LEN + buffer.len());
        out.extend_from_slice(&salt);
        out.extend_from_slice(&iv);
        out.extend_from_slice(&tag);
        out.extend_from_slice(&buffer);
        Ok(STANDARD.encode(out))
    }

    /// Decrypt a value produced by [`encrypt`](Self::encrypt) and deserialize it.
    pub fn decrypt<T: DeserializeOwned>(&self, encoded: &str) -> Result<T, CredentialError> {
        let raw = STANDARD.decode(encoded.trim())?;
        if raw.len() < HEADER_LEN {
            return Err(CredentialError::Truncated(raw.len()));
        }

        let (salt, rest) = raw.split_at(SALT_LEN);
        let (iv, rest) = rest.split_at(IV_LEN);
        let (tag, ciphertext) = rest.split_at(TAG_LEN);

        let cipher = self.cipher_for(salt);
        let mut buffer = ciphertext.to_vec();
        cipher
            .decrypt_in_place_detached(
                Nonce::from_slice(iv),
                b"",
                &mut buffer,
                Tag::from_slice(tag),
            )
            .map_err(|_| CredentialError::Authentication)?;

        Ok(serde_json::from_slice(&buffer)?)
    }

    fn cipher_for(&self, salt: &[u8]) -> Aes256Gcm {
        let mut key = [0u8; KEY_LEN];
        pbkdf2::pbkdf2_hmac::<Sha512>(&self.secret, salt, PBKDF2_ITERATIONS, &mut key);
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    const SECRET: &str = "unit-test-secret-with-at-least-32-chars";

    fn cipher() -> CredentialCipher {
        CredentialCipher::new(SECRET).expect("secret is long enough")
    }

    #[test]
    fn round_trip_preserves_structure() {
        let creds = json!({
            "api_key": "sk-live-1234567890",
            "org": null,
            "scopes": ["search", "rank"],
            "nested": {"region": "eu", "retries": 3}
        });
        let sealed = cipher().encrypt(&creds).unwrap();
        let opened: serde_json::Value = cipher().decrypt(&sealed).unwrap();
        assert_eq!(opened, creds);
    }

    #[test]
    fn same_input_encrypts_differently_each_call() {
        let creds = json!({"api_key": "abc"});
        let a = cipher().encrypt(&creds).unwrap();
        let b = cipher().encrypt(&creds).unwrap();
        assert_ne!(a, b, "salt and IV are random per call");
    }

    #[test]
    fn layout_has_fixed_header() {
        let sealed = cipher().encrypt(&json!("x")).unwrap();
        let raw = STANDARD.decode(sealed).unwrap();
        // `"x"` serializes to three bytes.
        assert_eq!(raw.len(), HEADER_LEN + 3);
    }

    #[test]
    fn tampered_ciphertext_fails_authentication() {
        let sealed = cipher().encrypt(&json!({"api_key": "abc"})).unwrap();
        let mut raw = STANDARD.decode(sealed).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let result: Result<serde_json::Value, _> = cipher().decrypt(&STANDARD.encode(raw));
        assert_matches!(result, Err(CredentialError::Authentication));
    }

    #[test]
    fn wrong_secret_fails_authentication() {
        let sealed = cipher().encrypt(&json!({"api_key": "abc"})).unwrap();
        let other = CredentialCipher::new("another-secret-that-is-32-chars-long").unwrap();
        let result: Result<serde_json::Value, _> = other.decrypt(&sealed);
        assert_matches!(result, Err(CredentialError::Authentication));
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let short = STANDARD.encode([0u8; 40]);
        let result: Result<serde_json::Value, _> = cipher().decrypt(&short);
        assert_matches!(result, Err(CredentialError::Truncated(40)));
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let result: Result<serde_json::Value, _> = cipher().decrypt("not base64 !!");
        assert_matches!(result, Err(CredentialError::Encoding(_)));
    }

    #[test]
    fn short_secret_is_rejected() {
        assert_matches!(CredentialCipher::new("short"), Err(CredentialError::WeakSecret));
    }

    #[test]
    fn debug_output_hides_secret() {
        let rendered = format!("{:?}", cipher());
        assert!(!rendered.contains(SECRET));
        assert!(rendered.contains("REDACTED"));
    }
}
