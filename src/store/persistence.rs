//! Sled-backed persona store

use crate::error::StorageError;
use crate::persona::FolderPersona;
use crate::store::{PersonaRecord, PersonaStore};
use parking_lot::Mutex;
use std::path::Path;
use tracing::{debug, warn};

const TREE_NAME: &str = "personas";

/// Persona store persisted in a sled database
///
/// Keys are persona paths as UTF-8 bytes, so iteration order is path order.
pub struct SledPersonaStore {
    db: sled::Db,
    tree: sled::Tree,
    write_lock: Mutex<()>,
}

impl SledPersonaStore {
    /// Open (creating if needed) the store at `path`
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(path)?;
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// In-memory store, discarded on drop
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    pub fn from_db(db: sled::Db) -> Result<Self, StorageError> {
        let tree = db.open_tree(TREE_NAME)?;
        Ok(Self {
            db,
            tree,
            write_lock: Mutex::new(()),
        })
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

impl PersonaStore for SledPersonaStore {
    fn load_record(&self, path: &str) -> Result<Option<PersonaRecord>, StorageError> {
        match self.tree.get(path.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn save(&self, persona: &FolderPersona) -> Result<(), StorageError> {
        if persona.meta.path.is_empty() {
            return Err(StorageError::InvalidKey("empty persona path".to_string()));
        }
        let record = PersonaRecord::new(persona.clone());
        let bytes = serde_json::to_vec(&record)?;

        let _guard = self.write_lock.lock();
        self.tree.insert(record.path.as_bytes(), bytes)?;
        debug!(path = %record.path, node_type = %record.node_type, "Saved persona");
        Ok(())
    }

    fn scan_all(&self) -> Result<Vec<PersonaRecord>, StorageError> {
        let mut records = Vec::with_capacity(self.tree.len());
        for entry in self.tree.iter() {
            let (key, value) = entry?;
            match serde_json::from_slice::<PersonaRecord>(&value) {
                Ok(record) => records.push(record),
                Err(e) => warn!(
                    key = %String::from_utf8_lossy(&key),
                    error = %e,
                    "Skipping unreadable persona record"
                ),
            }
        }
        Ok(records)
    }

    fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}
