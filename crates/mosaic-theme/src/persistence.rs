#![forbid(unsafe_code)]

//! Key/value persistence for theme preferences.
//!
//! ```text
//! ThemeStore ──get/set(storage_key)──▶ StorageBackend
//!                                        ├─ MemoryStorage  (tests, ephemeral)
//!                                        ├─ FileStorage    (JSON object on disk)
//!                                        └─ NoStorage      (persistence unavailable)
//! ```
//!
//! # Design Invariants
//!
//! 1. **Graceful degradation**: backends never panic; every operation returns
//!    a [`StorageResult`] and the caller decides how loudly to fail.
//! 2. **Atomic writes**: `FileStorage` writes a temp file and renames it over
//!    the target.
//! 3. **Missing is not an error**: an absent key or file is `Ok(None)`.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `StorageError::Io` | File I/O failure | Returned; store logs a warning |
//! | `StorageError::Serialization` | Unreadable JSON file | Returned; store logs a warning |
//! | `StorageError::Unavailable` | Backend switched off | Returned; store logs a warning |

use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

// ---------------------------------------------------------------------------
// Error Types
// ---------------------------------------------------------------------------

/// Errors that can occur during storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error during file operations.
    Io(std::io::Error),
    /// Stored data could not be encoded or decoded.
    Serialization(String),
    /// The backend cannot be used right now.
    Unavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            StorageError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            StorageError::Unavailable(msg) => write!(f, "storage unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Serialization(_) | StorageError::Unavailable(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// ---------------------------------------------------------------------------
// Storage Backend Trait
// ---------------------------------------------------------------------------

/// A string key/value store.
pub trait StorageBackend {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Read one key. `Ok(None)` when absent.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write one key, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete one key. Deleting an absent key succeeds.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Check if the backend is usable.
    fn is_available(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// Memory Storage
// ---------------------------------------------------------------------------

/// In-memory backend for tests and ephemeral sessions.
///
/// Read and write failures can be injected to exercise recovery paths.
#[derive(Default)]
pub struct MemoryStorage {
    data: RwLock<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    unavailable: AtomicBool,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create memory storage pre-populated with one entry.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::default();
        if let Ok(mut data) = storage.data.write() {
            data.insert(key.to_owned(), value.to_owned());
        }
        storage
    }

    /// Make every `get` fail with an I/O error.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Relaxed);
    }

    /// Make every `set`/`remove` fail with an I/O error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// Report the backend as unavailable.
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::Relaxed);
    }

    /// Direct read that bypasses injected failures.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        self.data.read().ok()?.get(key).cloned()
    }

    fn injected(flag: &AtomicBool, op: &str) -> StorageResult<()> {
        if flag.load(Ordering::Relaxed) {
            return Err(StorageError::Io(std::io::Error::other(format!(
                "injected {op} failure"
            ))));
        }
        Ok(())
    }
}

impl StorageBackend for MemoryStorage {
    fn name(&self) -> &str {
        "MemoryStorage"
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Self::injected(&self.fail_reads, "read")?;
        let guard = self
            .data
            .read()
            .map_err(|_| StorageError::Unavailable("lock poisoned".into()))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        Self::injected(&self.fail_writes, "write")?;
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Unavailable("lock poisoned".into()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        Self::injected(&self.fail_writes, "write")?;
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Unavailable("lock poisoned".into()))?;
        guard.remove(key);
        Ok(())
    }

    fn is_available(&self) -> bool {
        !self.unavailable.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.data.read().map(|g| g.len()).unwrap_or(0);
        f.debug_struct("MemoryStorage")
            .field("entries", &count)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// File Storage
// ---------------------------------------------------------------------------

/// One JSON object (`{"key": "value", ...}`) on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Create a file storage at the given path.
    ///
    /// The file does not need to exist; it is created on first write.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// `$XDG_STATE_HOME/mosaic/{app_name}/preferences.json`, falling back to
    /// `~/.local/state`, then the current directory.
    #[must_use]
    pub fn default_for_app(app_name: &str) -> Self {
        let base = state_dir_or_fallback();
        Self {
            path: base.join("mosaic").join(app_name).join("preferences.json"),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone();
        tmp.set_extension("json.tmp");
        tmp
    }

    fn load(&self) -> StorageResult<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let reader = BufReader::new(File::open(&self.path)?);
        serde_json::from_reader(reader).map_err(|e| {
            StorageError::Serialization(format!("failed to parse {}: {e}", self.path.display()))
        })
    }

    fn save(&self, entries: &HashMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.temp_path();
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, entries)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        mosaic_core::debug!(
            path = %self.path.display(),
            entries = entries.len(),
            "saved preferences"
        );
        Ok(())
    }
}

fn state_dir_or_fallback() -> PathBuf {
    if let Ok(state_home) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(state_home);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("state");
    }
    PathBuf::from(".")
}

impl StorageBackend for FileStorage {
    fn name(&self) -> &str {
        "FileStorage"
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(err) => {
                mosaic_core::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "replacing unreadable preferences file"
                );
                HashMap::new()
            }
        };
        entries.insert(key.to_owned(), value.to_owned());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// No Storage
// ---------------------------------------------------------------------------

/// A backend that is never available (headless hosts, sandboxed pages).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStorage;

impl StorageBackend for NoStorage {
    fn name(&self) -> &str {
        "NoStorage"
    }

    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable("no storage configured".into()))
    }

    fn remove(&self, _key: &str) -> StorageResult<()> {
        Ok(())
    }

    fn is_available(&self) -> bool {
        false
    }
}
