//! Pass 2: top-down constraint refinement
//!
//! Pre-order walk over personas already in the store. A child is regenerated
//! only when the constraint derived from its parent differs from the one it
//! was last refined under, so a second pass over an unchanged tree makes no
//! generation calls.

use super::synthesis::{Evidence, Identity};
use super::{PersonaBuilder, RefinementReport};
use crate::error::ApiError;
use crate::persona::{FolderPersona, NodeType};
use crate::prompt::ChildSummary;
use crate::tree::path::display_name;
use crate::tree::{list_directory, FileEntry};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Constraint a parent imposes on each of its children
pub fn parent_constraint_for(parent: &FolderPersona) -> String {
    let mut constraint = format!(
        "Parent category \"{}\": {}",
        parent.persona.short_label, parent.persona.description
    );
    if !parent.persona.negative_constraints.is_empty() {
        constraint.push_str(&format!(
            " Must not be: {}",
            parent.persona.negative_constraints.join("; ")
        ));
    }
    constraint
}

impl PersonaBuilder {
    /// Run Pass 2 from the root
    ///
    /// Never creates personas: folders without a stored persona are skipped
    /// together with their subtree, and cycle placeholders are left untouched,
    /// which also ends the walk at every symlink loop.
    pub async fn refine(&self) -> Result<RefinementReport, ApiError> {
        let mut report = RefinementReport::default();
        let mut visited: HashSet<String> = HashSet::new();
        let walker = self.settings.walker();
        let mut stack: Vec<(PathBuf, Option<FolderPersona>)> =
            vec![(self.settings.root.clone(), None)];

        while let Some((path, parent)) = stack.pop() {
            // Keyed by store path: a followed alias and its target are separate personas
            let key = path.to_string_lossy().to_string();
            if !visited.insert(key.clone()) {
                continue;
            }

            let mut persona = match self.store.load(&key) {
                Ok(Some(persona)) => persona,
                Ok(None) => {
                    debug!(path = %key, "No stored persona; skipping subtree");
                    continue;
                }
                Err(e) => {
                    warn!(path = %key, error = %e, "Failed to read stored persona");
                    continue;
                }
            };
            if persona.is_placeholder() {
                continue;
            }
            report.visited += 1;

            if let Some(parent) = &parent {
                let constraint = parent_constraint_for(parent);
                if persona.constraints.parent_constraint.as_deref() != Some(constraint.as_str()) {
                    persona = self.refine_persona(&path, persona, constraint).await;
                    report.refined += 1;
                }
            }

            let listing = match list_directory(&path, &walker) {
                Ok(listing) => listing,
                Err(e) => {
                    warn!(path = %key, error = %e, "Failed to list directory; skipping subtree");
                    continue;
                }
            };
            // Reversed so children pop in name order
            for child in listing.subdirectories.into_iter().rev() {
                stack.push((child, Some(persona.clone())));
            }
        }

        self.flush_store();
        info!(
            visited = report.visited,
            refined = report.refined,
            "Refinement pass finished"
        );
        Ok(report)
    }

    /// Re-synthesize `persona` under `constraint`, keeping its identity
    async fn refine_persona(
        &self,
        path: &Path,
        persona: FolderPersona,
        constraint: String,
    ) -> FolderPersona {
        let mut audit_errors = Vec::new();
        let listing = match list_directory(path, &self.settings.walker()) {
            Ok(listing) => listing,
            Err(e) => {
                audit_errors.push(format!("Failed to list directory: {}", e));
                Default::default()
            }
        };
        audit_errors.extend(listing.errors.iter().cloned());

        let textual: Vec<FileEntry> = listing
            .files
            .iter()
            .filter(|f| self.sampler.is_textual(&f.path))
            .cloned()
            .collect();

        let evidence = match persona.node_type() {
            NodeType::Leaf => Evidence::Leaf { files: &textual },
            NodeType::Branch => {
                let mut children = Vec::new();
                for child in &listing.subdirectories {
                    let child_key = child.to_string_lossy();
                    if let Ok(Some(child_persona)) = self.store.load(&child_key) {
                        children.push(ChildSummary {
                            name: display_name(child),
                            label: child_persona.persona.short_label,
                            description: child_persona.persona.description,
                        });
                    }
                }
                Evidence::Branch {
                    children,
                    loose_files: listing.files.iter().map(|f| f.name.clone()).collect(),
                    textual_count: textual.len(),
                }
            }
        };

        let identity = Identity {
            path,
            depth: persona.meta.depth,
            node_type: persona.node_type(),
            structural_hash: persona.meta.structural_hash.clone(),
        };
        debug!(path = %persona.path(), "Refining persona under parent constraint");
        self.synthesize(identity, evidence, Some(constraint), audit_errors)
            .await
    }
}
