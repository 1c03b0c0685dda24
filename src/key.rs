//! # Key Files
//!
//! A key file holds the 256-bit sealing key either as 32 raw bytes or as 64
//! hex characters. Generated keys are written raw with `0600` permissions on
//! Unix.

use crate::crypto::{CryptoKey, KEY_SIZE};
use crate::error::{Result, SealError};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub struct KeyFile;

impl KeyFile {
    /// Load a key from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<CryptoKey> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => SealError::KeyNotFound(path.to_path_buf()),
            _ => SealError::Io(err),
        })?;

        if bytes.len() == KEY_SIZE {
            return CryptoKey::from_bytes(&bytes);
        }

        let text = std::str::from_utf8(&bytes).map_err(|_| SealError::InvalidKeyFormat)?;
        let decoded = hex::decode(text.trim()).map_err(|_| SealError::InvalidKeyFormat)?;
        CryptoKey::from_bytes(&decoded)
    }

    /// Write `key` to `path`, replacing any previous content.
    pub fn save(path: impl AsRef<Path>, key: &CryptoKey) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = File::create(path)?;
        file.write_all(key.as_bytes())?;

        // Set restrictive permissions (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Generate a fresh key and save it to `path`.
    pub fn generate(path: impl AsRef<Path>) -> Result<CryptoKey> {
        let key = CryptoKey::generate();
        Self::save(path, &key)?;
        Ok(key)
    }

    /// Default key location for an archive: a sibling `<archive>.key`, so
    /// the key never ships inside the archive tree.
    ///
    /// Built from the final path component, so a trailing separator in the
    /// configured archive path still yields a sibling.
    pub fn default_path_for(archive_dir: &Path) -> PathBuf {
        match (archive_dir.parent(), archive_dir.file_name()) {
            (Some(parent), Some(dir_name)) => {
                let mut name = OsString::from(dir_name);
                name.push(".key");
                parent.join(name)
            }
            _ => archive_dir.with_extension("key"),
        }
    }
}
