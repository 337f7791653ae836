//! Decoy Vault - Key-Value Persistence
//!
//! Opaque string values under string keys. Every write replaces the whole
//! value atomically; there are no partial updates.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::envelope::VaultEnvelope;
use crate::error::{VaultError, VaultResult};

/// Key-value persistence
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> VaultResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> VaultResult<()>;
    fn delete(&self, key: &str) -> VaultResult<()>;
}

/// Reject keys that could escape the store or collide with temp files
pub fn validate_key(key: &str) -> VaultResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));

    if valid {
        Ok(())
    } else {
        Err(VaultError::InvalidStorageKey(key.to_string()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// IN-MEMORY STORE
// ═══════════════════════════════════════════════════════════════════════════

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> VaultResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> VaultResult<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> VaultResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// FILE STORE
// ═══════════════════════════════════════════════════════════════════════════

/// One file per key under a root directory
pub struct FileStore {
    /// Root directory
    root: PathBuf,
}

impl FileStore {
    /// Create new FileStore with root directory
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> VaultResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> VaultResult<Option<String>> {
        let path = self.path_for(key)?;

        if !path.exists() {
            return Ok(None);
        }

        let mut file = File::open(&path)?;
        let mut data = String::new();
        file.read_to_string(&mut data)?;

        Ok(Some(data))
    }

    fn set(&self, key: &str, value: &str) -> VaultResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root)?;

        // Write to temp file first, then rename over the target
        let temp_path = path.with_extension("tmp");

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;

        file.write_all(value.as_bytes())?;
        file.sync_all()?;

        fs::rename(&temp_path, &path)?;

        Ok(())
    }

    fn delete(&self, key: &str) -> VaultResult<()> {
        let path = self.path_for(key)?;

        if path.exists() {
            // Overwrite with zeros before unlinking
            let size = fs::metadata(&path)?.len() as usize;
            if size > 0 {
                let mut file = OpenOptions::new().write(true).open(&path)?;
                let zeros = vec![0u8; size.min(1024 * 1024)];
                let mut remaining = size;
                while remaining > 0 {
                    let to_write = remaining.min(zeros.len());
                    file.write_all(&zeros[..to_write])?;
                    remaining -= to_write;
                }
                file.sync_all()?;
            }

            fs::remove_file(&path)?;
        }

        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// ENVELOPE SLOT
// ═══════════════════════════════════════════════════════════════════════════

/// Single-slot envelope storage under a fixed key
pub struct EnvelopeSlot {
    store: Box<dyn KeyValueStore>,
    key: String,
}

impl EnvelopeSlot {
    pub fn new(store: Box<dyn KeyValueStore>, key: &str) -> VaultResult<Self> {
        validate_key(key)?;
        Ok(Self {
            store,
            key: key.to_string(),
        })
    }

    /// Storage key of the slot
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Stored envelope, if any
    pub fn load(&self) -> VaultResult<Option<VaultEnvelope>> {
        match self.store.get(&self.key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Replace whatever is stored
    pub fn save(&self, envelope: &VaultEnvelope) -> VaultResult<()> {
        let raw = serde_json::to_string(envelope)?;
        self.store.set(&self.key, &raw)
    }

    pub fn clear(&self) -> VaultResult<()> {
        self.store.delete(&self.key)
    }

    pub fn is_occupied(&self) -> VaultResult<bool> {
        Ok(self.store.get(&self.key)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn envelope(tag: u8) -> VaultEnvelope {
        VaultEnvelope {
            decoy_image: format!("data:,decoy{}", tag),
            iv: vec![tag; 12],
            ciphertext: vec![tag; 20],
            created_at: i64::from(tag),
        }
    }

    #[test]
    fn test_file_store() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(&dir.path().join("nested"));

        assert_eq!(store.get("slot").unwrap(), None);

        store.set("slot", "first").unwrap();
        assert_eq!(store.get("slot").unwrap().as_deref(), Some("first"));

        store.set("slot", "second").unwrap();
        assert_eq!(store.get("slot").unwrap().as_deref(), Some("second"));
        assert!(!store.root().join("slot.tmp").exists());

        store.delete("slot").unwrap();
        assert_eq!(store.get("slot").unwrap(), None);
        assert!(!store.root().join("slot.json").exists());

        // Deleting an absent key is fine
        store.delete("slot").unwrap();
    }

    #[test]
    fn test_rejects_bad_keys() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        for key in ["", "../escape", ".hidden", "a/b", "sp ace"] {
            assert!(matches!(
                store.set(key, "x"),
                Err(VaultError::InvalidStorageKey(_))
            ));
        }
        assert!(validate_key("secret_locked_image_v1").is_ok());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.delete("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_slot_overwrite_and_clear() {
        let dir = tempdir().unwrap();
        let slot = EnvelopeSlot::new(Box::new(FileStore::new(dir.path())), "vault").unwrap();

        assert_eq!(slot.load().unwrap(), None);
        assert!(!slot.is_occupied().unwrap());

        slot.save(&envelope(1)).unwrap();
        slot.save(&envelope(2)).unwrap();
        assert_eq!(slot.load().unwrap(), Some(envelope(2)));

        slot.clear().unwrap();
        assert_eq!(slot.load().unwrap(), None);
    }

    #[test]
    fn test_slot_corrupt_record() {
        let store = MemoryStore::new();
        store.set("vault", "{not json").unwrap();
        let slot = EnvelopeSlot::new(Box::new(store), "vault").unwrap();

        assert!(matches!(slot.load(), Err(VaultError::SerializationError(_))));
    }
}
