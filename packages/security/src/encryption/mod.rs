// ABOUTME: Reversible password encryption using AES-256-GCM AEAD
// ABOUTME: Stored records are base64(nonce || ciphertext || tag) under a process-wide key
//
// KEY HANDLING:
//
// - Any key length is accepted and normalized to 32 bytes (AES-256)
// - Shorter keys are right-padded with zero bytes, longer keys are truncated
// - Zero padding is a weak scheme, but existing records were written with it,
//   so changing it would make every stored password unreadable
// - The record format carries no key identifier or version. Rotating the key
//   means decrypting with the old instance and re-encrypting with the new one

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use ring::{
    aead::{self, Aad, LessSafeKey, Nonce, UnboundKey},
    error::Unspecified,
    rand::{SecureRandom, SystemRandom},
};
use subtle::ConstantTimeEq;

/// AES-256 key size
pub const KEY_SIZE: usize = 32;

/// Nonce size for AES-GCM
pub const NONCE_SIZE: usize = aead::NONCE_LEN;

/// Exclusive lower bound (bytes) of the "already encrypted" length range
pub const ENCRYPTED_MIN_LEN: usize = 50;

/// Exclusive upper bound (bytes) of the "already encrypted" length range
pub const ENCRYPTED_MAX_LEN: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Failed to generate random nonce")]
    RandomGeneration,

    #[error("Encrypted password is not valid base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    #[error("Encrypted password too short: {len} bytes, need at least 12")]
    MalformedRecord { len: usize },

    #[error("Encrypted password failed authentication")]
    Authentication,

    #[error("Decrypted password is not valid UTF-8")]
    InvalidUtf8,

    #[error("Failed to encrypt password: {0}")]
    Encryption(String),
}

impl From<Unspecified> for CryptoError {
    fn from(_: Unspecified) -> Self {
        CryptoError::Encryption("Cryptographic operation failed".to_string())
    }
}

/// Password encryption service
pub struct PasswordCrypto {
    rng: SystemRandom,
    key: [u8; KEY_SIZE],
}

impl PasswordCrypto {
    /// Create a crypto instance from raw key bytes of any length
    pub fn new(key: &[u8]) -> Self {
        let mut normalized = [0u8; KEY_SIZE];
        let len = key.len().min(KEY_SIZE);
        normalized[..len].copy_from_slice(&key[..len]);

        Self {
            rng: SystemRandom::new(),
            key: normalized,
        }
    }

    fn cipher(&self) -> Result<LessSafeKey, CryptoError> {
        let unbound_key = UnboundKey::new(&aead::AES_256_GCM, &self.key)?;
        Ok(LessSafeKey::new(unbound_key))
    }

    /// Encrypt a password.
    /// Returns base64-encoded: nonce || ciphertext || tag
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| CryptoError::RandomGeneration)?;

        self.seal(nonce_bytes, plaintext.as_bytes())
    }

    fn seal(&self, nonce_bytes: [u8; NONCE_SIZE], plaintext: &[u8]) -> Result<String, CryptoError> {
        let nonce = Nonce::assume_unique_for_key(nonce_bytes);
        let sealing_key = self.cipher()?;

        let mut in_out = plaintext.to_vec();
        sealing_key
            .seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| CryptoError::Encryption("Seal operation failed".to_string()))?;

        let mut record = Vec::with_capacity(NONCE_SIZE + in_out.len());
        record.extend_from_slice(&nonce_bytes);
        record.extend_from_slice(&in_out);

        Ok(BASE64.encode(&record))
    }

    /// Decrypt a stored password.
    /// Expects base64-encoded: nonce || ciphertext || tag
    pub fn decrypt(&self, encoded: &str) -> Result<String, CryptoError> {
        let record = BASE64.decode(encoded)?;

        if record.len() < NONCE_SIZE {
            return Err(CryptoError::MalformedRecord { len: record.len() });
        }

        let (nonce_bytes, ciphertext_and_tag) = record.split_at(NONCE_SIZE);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| CryptoError::MalformedRecord { len: record.len() })?;

        let opening_key = self.cipher()?;

        let mut in_out = ciphertext_and_tag.to_vec();
        let plaintext = opening_key
            .open_in_place(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| CryptoError::Authentication)?;

        String::from_utf8(plaintext.to_vec()).map_err(|_| CryptoError::InvalidUtf8)
    }

    /// Check a candidate password against a stored record.
    /// Any decryption failure counts as a mismatch; the cause is never reported.
    pub fn verify_password(&self, candidate: &str, stored: &str) -> bool {
        match self.decrypt(stored) {
            Ok(plaintext) => candidate.as_bytes().ct_eq(plaintext.as_bytes()).into(),
            Err(_) => false,
        }
    }

    /// Length heuristic used by the password migration to recognise stored values
    /// that were already encrypted. It does not inspect the content, so plaintext
    /// passwords of 51-199 bytes are misclassified, as are records for passwords of
    /// 8 bytes or fewer (an 8 byte password encrypts to 48 characters).
    pub fn looks_encrypted(value: &str) -> bool {
        value.len() > ENCRYPTED_MIN_LEN && value.len() < ENCRYPTED_MAX_LEN
    }
}

impl std::fmt::Debug for PasswordCrypto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordCrypto")
            .field("key", &"<redacted>")
            .finish()
    }
}
