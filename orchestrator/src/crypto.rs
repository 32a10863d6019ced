//! Sealing of connection secrets at rest.
//!
//! Submitted source/target configs may carry a `password` field. Before a
//! migration row is written, the password is replaced by an AES-256-GCM
//! sealed blob; read endpoints strip the blob so no secret material ever
//! leaves the service.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use rand_core::{OsRng, RngCore};

/// Config key holding the plaintext secret on submission.
const PASSWORD_FIELD: &str = "password";
/// Config key holding the sealed blob at rest.
const SEALED_FIELD: &str = "passwordSealed";

#[derive(Debug)]
pub enum CryptoError {
    Seal(String),
    Open(String),
    Decode(String),
}

impl std::fmt::Display for CryptoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CryptoError::Seal(e) => write!(f, "Seal error: {e}"),
            CryptoError::Open(e) => write!(f, "Open error: {e}"),
            CryptoError::Decode(e) => write!(f, "Base64 decode error: {e}"),
        }
    }
}

impl std::error::Error for CryptoError {}

/// Seal a secret string. Returns base64(12-byte nonce ‖ ciphertext+tag).
pub fn seal(secret: &str, key: &[u8; 32]) -> Result<String, CryptoError> {
    let mut nonce_bytes = [0u8; 12];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let cipher = Aes256Gcm::new(key.into());
    let ciphertext = cipher
        .encrypt(nonce, secret.as_bytes())
        .map_err(|e| CryptoError::Seal(e.to_string()))?;

    let mut combined = nonce_bytes.to_vec();
    combined.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(&combined))
}

/// Reverse of [`seal`].
pub fn open(encoded: &str, key: &[u8; 32]) -> Result<String, CryptoError> {
    let data = STANDARD
        .decode(encoded)
        .map_err(|e| CryptoError::Decode(e.to_string()))?;

    if data.len() < 12 {
        return Err(CryptoError::Open("sealed blob too short".to_string()));
    }

    let (nonce_bytes, ciphertext) = data.split_at(12);
    let cipher = Aes256Gcm::new(key.into());
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|e| CryptoError::Open(e.to_string()))?;

    String::from_utf8(plaintext).map_err(|e| CryptoError::Open(e.to_string()))
}

/// Replace a config's plaintext `password` with a sealed blob.
/// Configs without a password pass through unchanged.
pub fn seal_config(
    mut config: serde_json::Value,
    key: &[u8; 32],
) -> Result<serde_json::Value, CryptoError> {
    if let Some(obj) = config.as_object_mut()
        && let Some(pw) = obj.remove(PASSWORD_FIELD)
        && let Some(pw) = pw.as_str()
    {
        let sealed = seal(pw, key)?;
        obj.insert(SEALED_FIELD.to_string(), serde_json::Value::String(sealed));
    }
    Ok(config)
}

/// Strip sealed material from a stored config before it is returned to a
/// client.
pub fn redact_config(mut config: serde_json::Value) -> serde_json::Value {
    if let Some(obj) = config.as_object_mut() {
        obj.remove(SEALED_FIELD);
        obj.remove(PASSWORD_FIELD);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> [u8; 32] {
        [7u8; 32]
    }

    #[test]
    fn test_seal_open_round_trip() {
        let key = test_key();
        let sealed = seal("hunter2", &key).unwrap();
        assert_eq!(open(&sealed, &key).unwrap(), "hunter2");
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = seal("hunter2", &[1u8; 32]).unwrap();
        assert!(open(&sealed, &[2u8; 32]).is_err());
    }

    #[test]
    fn test_corrupted_blob_fails() {
        let key = test_key();
        assert!(open("!!not base64!!", &key).is_err());
        assert!(open("AAAA", &key).is_err());
    }

    #[test]
    fn test_seal_is_nondeterministic() {
        let key = test_key();
        let a = seal("same secret", &key).unwrap();
        let b = seal("same secret", &key).unwrap();
        assert_ne!(a, b, "random nonce must vary the blob");
    }

    #[test]
    fn test_seal_config_replaces_password() {
        let key = test_key();
        let config = serde_json::json!({
            "type": "postgresql",
            "host": "db.internal",
            "password": "s3cr3t"
        });

        let sealed = seal_config(config, &key).unwrap();
        assert!(sealed.get("password").is_none());

        let blob = sealed.get("passwordSealed").unwrap().as_str().unwrap();
        assert_eq!(open(blob, &key).unwrap(), "s3cr3t");
        assert_eq!(sealed["host"], "db.internal");
    }

    #[test]
    fn test_seal_config_without_password_is_identity() {
        let key = test_key();
        let config = serde_json::json!({"type": "mysql", "host": "h"});
        let sealed = seal_config(config.clone(), &key).unwrap();
        assert_eq!(sealed, config);
    }

    #[test]
    fn test_redact_strips_all_secret_fields() {
        let config = serde_json::json!({
            "type": "postgresql",
            "password": "oops",
            "passwordSealed": "blob"
        });
        let redacted = redact_config(config);
        assert!(redacted.get("password").is_none());
        assert!(redacted.get("passwordSealed").is_none());
        assert_eq!(redacted["type"], "postgresql");
    }
}
