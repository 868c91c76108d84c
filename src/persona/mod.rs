//! Folder Persona Documents
//!
//! The persisted unit of record: one document per folder path, exposed as JSON to
//! downstream tooling. Field names and nesting are part of the external contract.

use crate::types::SYMLINK_LOOP_HASH;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const SCHEMA_VERSION: &str = "1.1";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_CONFIDENCE: f64 = 0.82;

/// How a folder's meaning is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeType {
    /// Content-driven: the folder's own files dominate its meaning
    Leaf,
    /// Structure-driven: subfolders (or emptiness) dominate its meaning
    Branch,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Leaf => "LEAF",
            NodeType::Branch => "BRANCH",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub path: String,
    pub node_type: NodeType,
    pub depth: usize,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub structural_hash: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    pub path_context: String,
    pub root_rule: String,
    /// Set by the refinement pass; absent means "not yet refined"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_constraint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub short_label: String,
    pub description: String,
    #[serde(default)]
    pub derived_from: Vec<String>,
    #[serde(default)]
    pub negative_constraints: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorData {
    #[serde(default)]
    pub hypothetical_user_queries: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Audit {
    #[serde(default)]
    pub sample_count: usize,
    #[serde(default)]
    pub outliers_found: usize,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// FolderPersona: the semantic description attached to one folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderPersona {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    pub meta: Meta,
    pub constraints: Constraints,
    pub persona: Persona,
    #[serde(default)]
    pub vector_data: VectorData,
    #[serde(default)]
    pub audit: Audit,
}

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

impl FolderPersona {
    pub fn path(&self) -> &str {
        &self.meta.path
    }

    pub fn node_type(&self) -> NodeType {
        self.meta.node_type
    }

    pub fn structural_hash(&self) -> Option<&str> {
        self.meta.structural_hash.as_deref()
    }

    /// True for the stand-in emitted when a directory resolves to an already visited path
    pub fn is_placeholder(&self) -> bool {
        self.meta.structural_hash.as_deref() == Some(SYMLINK_LOOP_HASH)
    }

    /// Text embedded for vector search: label, description and example queries
    pub fn embedding_text(&self) -> String {
        let mut text = format!("{}\n{}", self.persona.short_label, self.persona.description);
        for query in &self.vector_data.hypothetical_user_queries {
            text.push('\n');
            text.push_str(query);
        }
        text
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the document as pretty JSON to `path`
    pub fn write(&self, path: &Path) -> std::io::Result<()> {
        let json = self
            .to_json_pretty()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }
}
