//! File-backed key-value storage
//!
//! Each slot is one file named after its key inside the data directory.
//! Writes are atomic (write to temp file, sync, then rename) so a reader
//! never sees a half-written blob.
//!
//! Storage location: `~/.local/share/linkshelf/storage/` (configurable via `Config`)

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::{StoreError, StoreResult};
use super::KeyValueStorage;

/// Suffix of in-flight writes; never a valid slot file
const TEMP_SUFFIX: &str = ".tmp";

/// Key-value storage rooted at a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    quota_bytes: Option<u64>,
}

impl FileStorage {
    /// Create storage rooted at `dir` with no size limit
    ///
    /// The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            quota_bytes: None,
        }
    }

    /// Limit the combined size of all slots
    pub fn with_quota(mut self, quota_bytes: Option<u64>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    /// Directory holding the slot files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Bytes used by every slot except `key`
    fn used_bytes_excluding(&self, key: &str) -> io::Result<u64> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        let mut total = 0;
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name == key || name.ends_with(TEMP_SUFFIX) {
                continue;
            }
            let metadata = entry.metadata()?;
            if metadata.is_file() {
                total += metadata.len();
            }
        }
        Ok(total)
    }

    fn check_quota(&self, key: &str, incoming: usize) -> StoreResult<()> {
        let Some(limit) = self.quota_bytes else {
            return Ok(());
        };

        let used = self
            .used_bytes_excluding(key)
            .map_err(|e| StoreError::from_io(e, key))?;
        let needed = used + incoming as u64;
        if needed > limit {
            return Err(StoreError::QuotaExceeded {
                key: key.to_string(),
                reason: format!("{} bytes needed, limit is {} bytes", needed, limit),
            });
        }
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        validate_key(key)?;
        let path = self.slot_path(key);

        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::from_io(e, key)),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> StoreResult<()> {
        validate_key(key)?;
        self.check_quota(key, value.len())?;

        let path = self.slot_path(key);
        atomic_write(&path, value.as_bytes()).map_err(|e| StoreError::from_io(e, key))?;
        debug!("Wrote {} bytes to slot '{}'", value.len(), key);
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> StoreResult<()> {
        validate_key(key)?;
        match fs::remove_file(self.slot_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::from_io(e, key)),
        }
    }
}

/// Slot keys become file names, so they must stay inside the directory
fn validate_key(key: &str) -> StoreResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && !key.ends_with(TEMP_SUFFIX)
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));

    if valid {
        Ok(())
    } else {
        Err(StoreError::Unavailable {
            key: key.to_string(),
            reason: "invalid slot name".to_string(),
        })
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// On failure the temp file is removed and the target is left untouched.
fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    // Append rather than replace the extension: "links.corrupt" and
    // "links" must not share a temp file.
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(TEMP_SUFFIX);
    let temp_path = PathBuf::from(temp_name);

    let result = write_synced(&temp_path, data).and_then(|()| fs::rename(&temp_path, path));
    if result.is_err() {
        if let Err(e) = fs::remove_file(&temp_path) {
            if e.kind() != io::ErrorKind::NotFound {
                debug!("Could not remove temp file {:?}: {}", temp_path, e);
            }
        }
    }
    result
}

fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}
