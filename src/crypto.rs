//! Encryption gateway for memory content at rest
//!
//! AES-256-GCM with a per-user key. Stored form is `enc:` +
//! base64(nonce || ciphertext+tag), so encrypted and legacy plaintext entries
//! coexist in the same store: anything without the prefix, or that fails to
//! decrypt, is returned unchanged on read. Key unavailability at write time
//! is fatal: the engine never silently stores plaintext.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use anyhow::{anyhow, Context, Result};
use base64::Engine as _;
use rand::Rng;
use std::fs;
use std::path::Path;

/// Prefix distinguishing encrypted content from legacy plaintext.
const ENC_PREFIX: &str = "enc:";

/// Key file name under the engine's storage path.
const KEY_FILE: &str = "memory.key";

/// Environment override: base64-encoded 32-byte key.
const KEY_ENV: &str = "HIPPO_MEMORY_KEY";

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Encrypt/decrypt gateway holding the per-user content key.
pub struct CryptoGateway {
    key: Vec<u8>,
}

impl CryptoGateway {
    /// Load the key from `HIPPO_MEMORY_KEY`, or from the key file under
    /// `storage_path`, generating and persisting a fresh 256-bit key on first
    /// use. Any failure here is surfaced, there is no plaintext fallback.
    pub fn open(storage_path: &Path) -> Result<Self> {
        if let Ok(encoded) = std::env::var(KEY_ENV) {
            let key = base64::engine::general_purpose::STANDARD
                .decode(encoded.trim())
                .with_context(|| format!("{KEY_ENV} is not valid base64"))?;
            if key.len() != KEY_LEN {
                return Err(anyhow!(
                    "{KEY_ENV} must decode to {KEY_LEN} bytes, got {}",
                    key.len()
                ));
            }
            return Ok(Self { key });
        }

        let key_path = storage_path.join(KEY_FILE);
        if key_path.exists() {
            let encoded = fs::read_to_string(&key_path)
                .with_context(|| format!("reading key file {}", key_path.display()))?;
            let key = base64::engine::general_purpose::STANDARD
                .decode(encoded.trim())
                .context("key file is not valid base64")?;
            if key.len() != KEY_LEN {
                return Err(anyhow!("key file holds {} bytes, expected {KEY_LEN}", key.len()));
            }
            return Ok(Self { key });
        }

        // First run: generate and persist a new key
        fs::create_dir_all(storage_path)
            .with_context(|| format!("creating storage dir {}", storage_path.display()))?;
        let mut key = vec![0u8; KEY_LEN];
        rand::thread_rng().fill(&mut key[..]);
        let encoded = base64::engine::general_purpose::STANDARD.encode(&key);
        fs::write(&key_path, encoded)
            .with_context(|| format!("writing key file {}", key_path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(&key_path, fs::Permissions::from_mode(0o600));
        }

        tracing::info!(path = %key_path.display(), "created new content encryption key");
        Ok(Self { key })
    }

    /// Gateway with an explicit key (tests).
    pub fn with_key(key: Vec<u8>) -> Result<Self> {
        if key.len() != KEY_LEN {
            return Err(anyhow!("key must be {KEY_LEN} bytes"));
        }
        Ok(Self { key })
    }

    /// Encrypt plaintext into the stored form. Failures are fatal.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|_| anyhow!("AES key must be {KEY_LEN} bytes"))?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| anyhow!("AES-256-GCM encryption failed: {e}"))?;

        // Pack: nonce (12) || ciphertext+tag
        let mut packed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        packed.extend_from_slice(&nonce_bytes);
        packed.extend_from_slice(&ciphertext);

        let encoded = base64::engine::general_purpose::STANDARD.encode(&packed);
        Ok(format!("{ENC_PREFIX}{encoded}"))
    }

    /// Decrypt stored content back to plaintext.
    ///
    /// Fallback law: content without the `enc:` prefix, or that fails base64
    /// or AEAD verification, is assumed to predate encryption and is returned
    /// unchanged. Never raises to the caller.
    pub fn decrypt(&self, stored: &str) -> String {
        let Some(encoded) = stored.strip_prefix(ENC_PREFIX) else {
            return stored.to_string();
        };

        let Ok(packed) = base64::engine::general_purpose::STANDARD.decode(encoded) else {
            tracing::debug!("stored content has enc: prefix but invalid base64, passing through");
            return stored.to_string();
        };

        if packed.len() < NONCE_LEN + TAG_LEN {
            return stored.to_string();
        }

        let (nonce_bytes, ciphertext) = packed.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let Ok(cipher) = Aes256Gcm::new_from_slice(&self.key) else {
            return stored.to_string();
        };

        match cipher.decrypt(nonce, ciphertext) {
            Ok(plaintext) => String::from_utf8(plaintext).unwrap_or_else(|_| stored.to_string()),
            Err(_) => {
                tracing::debug!("decryption failed (wrong key or legacy data), passing through");
                stored.to_string()
            }
        }
    }

    /// Whether stored content carries the encrypted form.
    pub fn is_encrypted(stored: &str) -> bool {
        stored.starts_with(ENC_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> CryptoGateway {
        CryptoGateway::with_key(vec![7u8; 32]).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let gw = gateway();
        let plain = "Quyết định: dùng PostgreSQL cho database chính.";
        let stored = gw.encrypt(plain).unwrap();
        assert!(CryptoGateway::is_encrypted(&stored));
        assert_ne!(stored, plain);
        assert_eq!(gw.decrypt(&stored), plain);
    }

    #[test]
    fn test_nonce_is_random() {
        let gw = gateway();
        let a = gw.encrypt("same text").unwrap();
        let b = gw.encrypt("same text").unwrap();
        assert_ne!(a, b);
        assert_eq!(gw.decrypt(&a), gw.decrypt(&b));
    }

    #[test]
    fn test_legacy_plaintext_passes_through() {
        let gw = gateway();
        assert_eq!(gw.decrypt("plain legacy note"), "plain legacy note");
    }

    #[test]
    fn test_garbage_ciphertext_passes_through() {
        let gw = gateway();
        assert_eq!(gw.decrypt("enc:not-base64!!!"), "enc:not-base64!!!");
        // Valid base64 but too short to hold nonce+tag
        assert_eq!(gw.decrypt("enc:YWJj"), "enc:YWJj");
    }

    #[test]
    fn test_wrong_key_passes_through() {
        let gw = gateway();
        let stored = gw.encrypt("secret").unwrap();
        let other = CryptoGateway::with_key(vec![9u8; 32]).unwrap();
        // AEAD verification fails under the wrong key; raw form comes back
        assert_eq!(other.decrypt(&stored), stored);
    }

    #[test]
    fn test_key_file_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let first = CryptoGateway::open(dir.path()).unwrap();
        let stored = first.encrypt("persisted under file key").unwrap();

        let reopened = CryptoGateway::open(dir.path()).unwrap();
        assert_eq!(reopened.decrypt(&stored), "persisted under file key");
    }
}
