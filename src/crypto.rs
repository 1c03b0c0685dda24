//! # Sealing Primitive
//!
//! AES-256-GCM sealing of whole file contents.
//!
//! ## Sealed Data Format
//!
//! ```text
//! [SRCSEAL1][12-byte nonce][variable-length ciphertext + 16-byte GCM tag]
//! ```
//!
//! The magic header lets the reader tell sealed sources from plain ones, so
//! a loader can open an unsealed file as-is.

use crate::error::{Result, SealError};
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use sha2::{Digest, Sha256};

pub const KEY_SIZE: usize = 32; // 256 bits
pub const NONCE_SIZE: usize = 12; // 96 bits for GCM

const MAGIC_HEADER: &[u8] = b"SRCSEAL1";

#[derive(Clone)]
pub struct CryptoKey {
    key: [u8; KEY_SIZE],
}

impl CryptoKey {
    /// Generate a new random key
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut key);
        Self { key }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let key: [u8; KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| SealError::InvalidKeyFormat)?;
        Ok(Self { key })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    /// Short, stable identifier of the key, safe to print.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.key);
        hex::encode(&digest[..8])
    }

    /// Seal `plaintext` under a fresh random nonce.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let cipher = self.cipher()?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| SealError::Crypto(e.to_string()))?;

        let mut sealed = Vec::with_capacity(MAGIC_HEADER.len() + NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(MAGIC_HEADER);
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);

        Ok(sealed)
    }

    /// Open data produced by [`CryptoKey::encrypt`].
    pub fn decrypt(&self, sealed: &[u8]) -> Result<Vec<u8>> {
        if sealed.len() < MAGIC_HEADER.len() + NONCE_SIZE {
            return Err(SealError::Crypto("Sealed data too short".into()));
        }
        if !Self::is_sealed(sealed) {
            return Err(SealError::Crypto("Missing sealed data header".into()));
        }

        let (nonce_bytes, ciphertext) = sealed[MAGIC_HEADER.len()..].split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        self.cipher()?
            .decrypt(nonce, ciphertext)
            .map_err(|e| SealError::Crypto(e.to_string()))
    }

    /// Check if data starts with the sealed header
    pub fn is_sealed(data: &[u8]) -> bool {
        data.starts_with(MAGIC_HEADER)
    }

    fn cipher(&self) -> Result<Aes256Gcm> {
        Aes256Gcm::new_from_slice(&self.key).map_err(|e| SealError::Crypto(e.to_string()))
    }
}
