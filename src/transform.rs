//! # Byte Transforms
//!
//! The file-level primitive the archive pipeline drives. A transform reads
//! a source path and writes the transformed bytes to a destination path.
//!
//! Every implementation must:
//! - never modify the source,
//! - leave nothing at the destination when it fails,
//! - be safe to call repeatedly on the same source with distinct
//!   destinations.

use crate::crypto::CryptoKey;
use crate::error::{Result, SealError};
use std::fs;
use std::path::Path;

pub trait ByteTransform {
    fn encrypt(&self, src: &Path, dst: &Path) -> Result<()>;

    fn decrypt(&self, src: &Path, dst: &Path) -> Result<()>;
}

/// AES-256-GCM sealing of whole files.
pub struct AesTransform {
    key: CryptoKey,
}

impl AesTransform {
    pub fn new(key: CryptoKey) -> Self {
        Self { key }
    }
}

impl ByteTransform for AesTransform {
    fn encrypt(&self, src: &Path, dst: &Path) -> Result<()> {
        let plaintext = fs::read(src)?;
        let sealed = self.key.encrypt(&plaintext)?;
        write_or_discard(dst, &sealed)
    }

    /// Unsealed input is passed through unchanged.
    fn decrypt(&self, src: &Path, dst: &Path) -> Result<()> {
        let data = fs::read(src)?;
        if !CryptoKey::is_sealed(&data) {
            return write_or_discard(dst, &data);
        }
        let plaintext = self.key.decrypt(&data)?;
        write_or_discard(dst, &plaintext)
    }
}

/// Reversible XOR with a single byte mask. Stand-in for the real cipher in
/// tests; it hides nothing.
pub struct XorTransform {
    mask: u8,
}

impl XorTransform {
    pub fn new(mask: u8) -> Self {
        Self { mask }
    }

    fn apply(&self, src: &Path, dst: &Path) -> Result<()> {
        let mut data = fs::read(src)?;
        data.iter_mut().for_each(|byte| *byte ^= self.mask);
        write_or_discard(dst, &data)
    }
}

impl Default for XorTransform {
    fn default() -> Self {
        Self::new(0x5a)
    }
}

impl ByteTransform for XorTransform {
    fn encrypt(&self, src: &Path, dst: &Path) -> Result<()> {
        self.apply(src, dst)
    }

    fn decrypt(&self, src: &Path, dst: &Path) -> Result<()> {
        self.apply(src, dst)
    }
}

fn write_or_discard(dst: &Path, data: &[u8]) -> Result<()> {
    if let Err(err) = fs::write(dst, data) {
        let _ = fs::remove_file(dst);
        return Err(SealError::Io(err));
    }
    Ok(())
}
