// Credential envelope encryption for API keys at rest.
// Uses AES-256-GCM under a single master key with a fresh random nonce per seal.
//
// Envelope text format (stable, persisted): "v1:<base64 nonce>:<base64 ciphertext+tag>"
//
// Decoding is strict on every path: anything that is not a well-formed v1
// envelope is rejected. Plaintext written by older revisions is only reachable
// through StoredCredential::classify, which callers must opt into.

use std::fmt;

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use modelgate_core::{ConfigError, Result};
use rand::{rngs::OsRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Environment variable holding the base64 master key
pub const MASTER_KEY_ENV: &str = "ENCRYPTION_KEY";

/// Version tag of the only envelope format
pub const ENVELOPE_VERSION: &str = "v1";

const NONCE_SIZE: usize = 12;
const KEY_SIZE: usize = 32;
const TAG_SIZE: usize = 16;

/// The 256-bit key protecting every stored credential.
///
/// Never printed and zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey([u8; KEY_SIZE]);

impl MasterKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Decode a base64 key; must be exactly 32 bytes
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(ConfigError::KeyUnavailable(format!(
                "{} is empty",
                MASTER_KEY_ENV
            )));
        }

        let mut decoded = BASE64.decode(encoded).map_err(|_| {
            ConfigError::KeyUnavailable(format!("{} is not valid base64", MASTER_KEY_ENV))
        })?;

        if decoded.len() != KEY_SIZE {
            let len = decoded.len();
            decoded.zeroize();
            return Err(ConfigError::KeyUnavailable(format!(
                "{} must decode to {} bytes, got {}",
                MASTER_KEY_ENV, KEY_SIZE, len
            )));
        }

        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(&decoded);
        decoded.zeroize();
        Ok(Self(key))
    }

    /// Read the key from the ENCRYPTION_KEY environment variable
    pub fn from_env() -> Result<Self> {
        let encoded = std::env::var(MASTER_KEY_ENV).map_err(|_| {
            ConfigError::KeyUnavailable(format!(
                "{} environment variable not set",
                MASTER_KEY_ENV
            ))
        })?;
        Self::from_base64(&encoded)
    }

    /// Generate a new random key
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut key);
        Self(key)
    }

    /// Base64 form, for provisioning a new deployment
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.0)
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey([REDACTED])")
    }
}

/// A parsed, syntactically valid v1 envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    nonce: [u8; NONCE_SIZE],
    /// Ciphertext with the authentication tag appended
    ciphertext: Vec<u8>,
}

impl Envelope {
    /// Parse envelope text without decrypting it
    pub fn parse(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.split(':').collect();
        if parts.len() != 3 {
            return Err(ConfigError::MalformedEnvelope(
                "expected version:nonce:ciphertext",
            ));
        }
        if parts[0] != ENVELOPE_VERSION {
            return Err(ConfigError::MalformedEnvelope("unknown envelope version"));
        }

        let nonce_bytes = BASE64
            .decode(parts[1])
            .map_err(|_| ConfigError::MalformedEnvelope("nonce is not valid base64"))?;
        let nonce: [u8; NONCE_SIZE] = nonce_bytes
            .try_into()
            .map_err(|_| ConfigError::MalformedEnvelope("nonce has the wrong length"))?;

        let ciphertext = BASE64
            .decode(parts[2])
            .map_err(|_| ConfigError::MalformedEnvelope("ciphertext is not valid base64"))?;
        if ciphertext.len() < TAG_SIZE {
            return Err(ConfigError::MalformedEnvelope(
                "ciphertext is shorter than the authentication tag",
            ));
        }

        Ok(Self { nonce, ciphertext })
    }

    pub fn nonce(&self) -> &[u8] {
        &self.nonce
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            ENVELOPE_VERSION,
            BASE64.encode(self.nonce),
            BASE64.encode(&self.ciphertext)
        )
    }
}

/// What a non-empty credential column holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredCredential {
    /// Well-formed v1 envelope
    Envelope(Envelope),
    /// Anything else: plaintext written before credentials were sealed
    RawLegacyCredential(String),
}

impl StoredCredential {
    /// Classify a stored value. Returns None for the empty credential.
    ///
    /// This is the only place legacy plaintext is recognised; the strict
    /// `EncryptionService::open` path never falls back to it.
    pub fn classify(stored: &str) -> Option<Self> {
        if stored.is_empty() {
            return None;
        }
        Some(match Envelope::parse(stored) {
            Ok(envelope) => StoredCredential::Envelope(envelope),
            Err(_) => StoredCredential::RawLegacyCredential(stored.to_string()),
        })
    }
}

/// Seals and opens credentials under the master key.
/// Thread-safe and cheap to clone.
#[derive(Clone)]
pub struct EncryptionService {
    cipher: Aes256Gcm,
}

impl EncryptionService {
    pub fn new(key: &MasterKey) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key.0)),
        }
    }

    /// Create from the ENCRYPTION_KEY environment variable
    pub fn from_env() -> Result<Self> {
        let key = MasterKey::from_env()?;
        Ok(Self::new(&key))
    }

    /// Encrypt plaintext under a fresh random nonce
    pub fn seal(&self, plaintext: &str) -> Result<Envelope> {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| ConfigError::storage("credential encryption failed"))?;

        Ok(Envelope { nonce, ciphertext })
    }

    /// Decrypt envelope text (strict)
    pub fn open(&self, text: &str) -> Result<String> {
        let envelope = Envelope::parse(text)?;
        self.open_envelope(&envelope)
    }

    pub fn open_envelope(&self, envelope: &Envelope) -> Result<String> {
        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(&envelope.nonce),
                envelope.ciphertext.as_ref(),
            )
            .map_err(|_| ConfigError::DecryptionFailed)?;

        String::from_utf8(plaintext).map_err(|_| ConfigError::DecryptionFailed)
    }

    /// Value to store in the credential column: the envelope text, or the
    /// empty string for an empty credential.
    pub fn seal_credential(&self, plaintext: &str) -> Result<String> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }
        Ok(self.seal(plaintext)?.to_string())
    }

    /// Inverse of `seal_credential`
    pub fn open_credential(&self, stored: &str) -> Result<String> {
        if stored.is_empty() {
            return Ok(String::new());
        }
        self.open(stored)
    }
}
