use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CryptoError {
    #[error("Encryption failed: {0}")]
    Encrypt(String),

    #[error("Decryption failed: {0}")]
    Decrypt(String),
}

/// Encrypt/decrypt contract for at-rest record payloads.
///
/// The engine never looks inside the opaque string; it only decides
/// whether to call this based on the `is_encrypted` flag stored next to
/// each document.
pub trait CryptoProvider: Send + Sync {
    fn encrypt(&self, payload: &serde_json::Value) -> Result<String, CryptoError>;
    fn decrypt(&self, payload: &str) -> Result<serde_json::Value, CryptoError>;
}

/// Base64 passthrough: opaque on the wire, no actual secrecy. Used by
/// tests and local development.
pub struct PassthroughCrypto;

impl CryptoProvider for PassthroughCrypto {
    fn encrypt(&self, payload: &serde_json::Value) -> Result<String, CryptoError> {
        let raw = serde_json::to_vec(payload).map_err(|e| CryptoError::Encrypt(e.to_string()))?;
        Ok(BASE64_STANDARD.encode(raw))
    }

    fn decrypt(&self, payload: &str) -> Result<serde_json::Value, CryptoError> {
        let raw = BASE64_STANDARD
            .decode(payload)
            .map_err(|e| CryptoError::Decrypt(e.to_string()))?;
        serde_json::from_slice(&raw).map_err(|e| CryptoError::Decrypt(e.to_string()))
    }
}
