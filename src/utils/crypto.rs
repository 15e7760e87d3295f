// Cryptographic utilities for session credentials and code hashing

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use rand::RngCore;
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};

/// Nonce size for AES-256-GCM encryption (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Encryption key size for AES-256 (256 bits)
pub const ENCRYPTION_KEY_SIZE: usize = 32;

/// Encrypt any serializable value with AES-256-GCM
///
/// The result is a base64url string containing nonce + ciphertext. The AEAD
/// tag gives the credential integrity: a tampered value fails decryption.
///
/// # Errors
///
/// Returns an error if:
/// - Serialization fails
/// - Key length is invalid
/// - AES encryption fails
pub fn encrypt_data<T: Serialize>(data: &T, key: &[u8]) -> Result<String> {
    if key.len() != ENCRYPTION_KEY_SIZE {
        return Err(anyhow!(
            "Invalid key length: expected {} bytes, got {}",
            ENCRYPTION_KEY_SIZE,
            key.len()
        ));
    }

    let json_data = serde_json::to_string(data).context("Failed to serialize data")?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let ciphertext = cipher
        .encrypt(nonce, json_data.as_bytes())
        .map_err(|e| anyhow!("AES encryption failed: {e}"))?;

    let mut combined = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    combined.extend_from_slice(&nonce_bytes);
    combined.extend_from_slice(&ciphertext);

    Ok(general_purpose::URL_SAFE_NO_PAD.encode(&combined))
}

/// Decrypt a value produced by [`encrypt_data`]
///
/// # Errors
///
/// Returns an error if:
/// - Key length is invalid
/// - Base64 decoding fails
/// - Data length is invalid
/// - AES decryption fails (including any tampering)
/// - Deserialization fails
pub fn decrypt_data<T: DeserializeOwned>(encrypted_data: &str, key: &[u8]) -> Result<T> {
    if key.len() != ENCRYPTION_KEY_SIZE {
        return Err(anyhow!(
            "Invalid key length: expected {} bytes, got {}",
            ENCRYPTION_KEY_SIZE,
            key.len()
        ));
    }

    let combined = general_purpose::URL_SAFE_NO_PAD
        .decode(encrypted_data)
        .context("Failed to decode base64 data")?;

    if combined.len() < NONCE_SIZE {
        return Err(anyhow!("Invalid data length"));
    }

    let (nonce_bytes, ciphertext) = combined.split_at(NONCE_SIZE);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|e| anyhow!("AES decryption failed: {e}"))?;

    let data: T = serde_json::from_slice(&plaintext)
        .context("Failed to deserialize data from decrypted JSON")?;

    Ok(data)
}

/// Derive a 32-byte encryption key from configured key material
///
/// The configured session secret can be any length; a SHA-256 digest maps
/// it onto exactly 32 bytes for AES-256.
#[must_use]
pub fn derive_encryption_key(input_key: &[u8]) -> [u8; ENCRYPTION_KEY_SIZE] {
    let digest = Sha256::digest(input_key);
    let mut encryption_key = [0u8; ENCRYPTION_KEY_SIZE];
    encryption_key.copy_from_slice(&digest);
    encryption_key
}

/// SHA-256 of the given text, hex encoded. Used for one-time verification
/// codes: only the hash is ever persisted.
#[must_use]
pub fn sha256_hex(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
    struct Payload {
        account_id: String,
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = derive_encryption_key(b"test-session-secret");
        let payload = Payload {
            account_id: "a1".to_string(),
        };

        let encrypted = encrypt_data(&payload, &key).unwrap();
        let decrypted: Payload = decrypt_data(&encrypted, &key).unwrap();
        assert_eq!(decrypted, payload);
    }

    #[test]
    fn test_tampered_data_fails() {
        let key = derive_encryption_key(b"test-session-secret");
        let payload = Payload {
            account_id: "a1".to_string(),
        };

        let mut encrypted = encrypt_data(&payload, &key).unwrap();
        // Flip a character in the ciphertext portion
        let flipped = if encrypted.ends_with('A') { 'B' } else { 'A' };
        encrypted.pop();
        encrypted.push(flipped);

        let result: Result<Payload> = decrypt_data(&encrypted, &key);
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_key_fails() {
        let key = derive_encryption_key(b"test-session-secret");
        let other_key = derive_encryption_key(b"another-secret");
        let payload = Payload {
            account_id: "a1".to_string(),
        };

        let encrypted = encrypt_data(&payload, &key).unwrap();
        let result: Result<Payload> = decrypt_data(&encrypted, &other_key);
        assert!(result.is_err());
    }

    #[test]
    fn test_derive_key_always_32_bytes() {
        assert_eq!(derive_encryption_key(b"").len(), 32);
        assert_eq!(derive_encryption_key(b"short").len(), 32);
        assert_eq!(derive_encryption_key(&[7u8; 100]).len(), 32);
    }

    #[test]
    fn test_sha256_hex_known_value() {
        // SHA-256 of the ASCII digits "123456"
        assert_eq!(
            sha256_hex("123456"),
            "8d969eef6ecad3c29a3a629280e686cf0c3f5d5a86aff3ca12020c923adc6c92"
        );
    }
}
