//! Persona Store
//!
//! Path-keyed persistence for folder personas. Each entry holds the latest
//! document together with the identity fields the builder and CLI need without
//! reparsing: node type, depth, structural hash and the time of the last write.

pub mod persistence;

pub use persistence::SledPersonaStore;

use crate::error::StorageError;
use crate::persona::{FolderPersona, NodeType};
use crate::types::PERSONA_FILE_NAME;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// PersonaRecord: a stored persona plus its identity columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaRecord {
    pub path: String,
    pub node_type: NodeType,
    pub depth: usize,
    pub structural_hash: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub document: FolderPersona,
}

impl PersonaRecord {
    pub fn new(document: FolderPersona) -> Self {
        Self {
            path: document.meta.path.clone(),
            node_type: document.meta.node_type,
            depth: document.meta.depth,
            structural_hash: document.meta.structural_hash.clone(),
            updated_at: Utc::now(),
            document,
        }
    }
}

/// Aggregate counts over the whole store
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreStats {
    pub total: usize,
    pub breakdown: BTreeMap<String, usize>,
}

impl StoreStats {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a PersonaRecord>) -> Self {
        let mut stats = StoreStats::default();
        for record in records {
            stats.total += 1;
            *stats
                .breakdown
                .entry(record.node_type.as_str().to_string())
                .or_insert(0) += 1;
        }
        stats
    }

    pub fn count(&self, node_type: NodeType) -> usize {
        self.breakdown.get(node_type.as_str()).copied().unwrap_or(0)
    }
}

/// Persona store interface
///
/// Implementations serialize their own writes; readers never block writers.
pub trait PersonaStore: Send + Sync {
    fn load_record(&self, path: &str) -> Result<Option<PersonaRecord>, StorageError>;

    /// Insert or replace the persona stored under its `meta.path`
    fn save(&self, persona: &FolderPersona) -> Result<(), StorageError>;

    /// Every record ordered by path
    fn scan_all(&self) -> Result<Vec<PersonaRecord>, StorageError>;

    fn flush(&self) -> Result<(), StorageError> {
        Ok(())
    }

    fn load(&self, path: &str) -> Result<Option<FolderPersona>, StorageError> {
        Ok(self.load_record(path)?.map(|record| record.document))
    }

    fn stats(&self) -> Result<StoreStats, StorageError> {
        Ok(StoreStats::from_records(&self.scan_all()?))
    }

    /// Write each persona to `<folder>/folder_persona.json`
    ///
    /// With `base`, only folders at or below `base` are exported. Cycle
    /// placeholders are never exported, since their path resolves to a folder
    /// that has its own persona. Folders that cannot be written are skipped.
    /// Returns the number of files written.
    fn export(&self, base: Option<&Path>) -> Result<usize, StorageError> {
        let mut written = 0;
        for record in self.scan_all()? {
            if record.document.is_placeholder() {
                continue;
            }
            let folder = PathBuf::from(&record.path);
            if let Some(base) = base {
                if !folder.starts_with(base) {
                    continue;
                }
            }
            match record.document.write(&folder.join(PERSONA_FILE_NAME)) {
                Ok(()) => written += 1,
                Err(e) => warn!(path = %record.path, error = %e, "Skipping persona export"),
            }
        }
        Ok(written)
    }
}
