use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::store::{Slot, StoreError, TokenStore};
use crate::token::AccessToken;

/// Extension of the file holding a slot's token.
const SLOT_FILE_EXTENSION: &str = "txt";

/// Stores every slot as a plain-text file `<dir>/<slot>.txt` holding the raw token.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, slot: &Slot) -> PathBuf {
        self.dir
            .join(format!("{}.{SLOT_FILE_EXTENSION}", slot.as_str()))
    }
}

impl TokenStore for FileStore {
    fn read(&self, slot: &Slot) -> Result<AccessToken, StoreError> {
        let path = self.path_for(slot);
        match fs::read_to_string(&path) {
            Ok(content) => {
                debug!(%slot, path = %path.display(), "slot read");
                Ok(AccessToken::from(content))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(%slot, path = %path.display(), "slot does not exist yet");
                Ok(AccessToken::empty())
            }
            Err(e) => Err(StoreError::Read(slot.to_string(), e.to_string())),
        }
    }

    /// Writes into a temporary file next to the slot file and renames it into place,
    /// so readers see either the old or the new token, never a partial one.
    /// The temporary file is created with `0600` permissions on unix.
    fn write(&self, slot: &Slot, value: &AccessToken) -> Result<(), StoreError> {
        let write_err = |e: String| StoreError::Write(slot.to_string(), e);

        fs::create_dir_all(&self.dir).map_err(|e| write_err(e.to_string()))?;

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| write_err(e.to_string()))?;
        tmp.write_all(value.as_str().as_bytes())
            .map_err(|e| write_err(e.to_string()))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| write_err(e.to_string()))?;

        let path = self.path_for(slot);
        tmp.persist(&path).map_err(|e| write_err(e.to_string()))?;

        debug!(%slot, path = %path.display(), empty = value.is_empty(), "slot written");
        Ok(())
    }
}
