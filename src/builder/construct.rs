//! Pass 1: bottom-up construction

use super::synthesis::{Evidence, Identity};
use super::{BuildMode, Counters, PersonaBuilder};
use crate::error::ApiError;
use crate::persona::{FolderPersona, NodeType};
use crate::prompt::ChildSummary;
use crate::tree::path::{canonicalize_path, display_name};
use crate::tree::{classify, compute_structural_hash, list_directory, DirectoryListing, FileEntry};
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use std::path::PathBuf;
use tracing::{debug, warn};

/// A completed child folder
struct ChildResult {
    name: String,
    persona: FolderPersona,
}

impl PersonaBuilder {
    /// Run Pass 1 over the whole tree and return the root persona
    pub async fn build_for_root(&self) -> Result<FolderPersona, ApiError> {
        self.visited.clear();
        self.counters.reset();
        let root = self.settings.root.clone();
        // The root must stay listable; anything deeper only degrades its own subtree
        list_directory(&root, &self.settings.walker())
            .map_err(|_| ApiError::InvalidRoot(root.clone()))?;

        let persona = self.process_directory(root, 0, Vec::new()).await;
        self.flush_store();
        Ok(persona)
    }

    fn process_directory(
        &self,
        path: PathBuf,
        depth: usize,
        ancestors: Vec<PathBuf>,
    ) -> BoxFuture<'_, FolderPersona> {
        async move {
            let key = path.to_string_lossy().to_string();
            Counters::bump(&self.counters.folders);

            if self.settings.mode == BuildMode::Resume {
                if let Some(existing) = self.load_existing(&key) {
                    Counters::bump(&self.counters.cache_hits);
                    debug!(path = %key, "Resuming from stored persona");
                    return existing;
                }
            }

            let real = canonicalize_path(&path).unwrap_or_else(|_| path.clone());
            let first_visit = self.visited.insert(real.clone());
            if ancestors.contains(&real)
                || (!first_visit && !self.settings.processing.follow_symlinks)
            {
                return self.placeholder(&path, depth);
            }

            let mut audit_errors = Vec::new();
            let listing = match list_directory(&path, &self.settings.walker()) {
                Ok(listing) => listing,
                Err(e) => {
                    warn!(path = %key, error = %e, "Failed to list directory");
                    audit_errors.push(format!("Failed to list directory: {}", e));
                    DirectoryListing::default()
                }
            };
            audit_errors.extend(listing.errors.iter().cloned());

            let mut chain = ancestors;
            chain.push(real);
            let children = self
                .process_children(&listing.subdirectories, depth + 1, chain)
                .await;

            let textual: Vec<FileEntry> = listing
                .files
                .iter()
                .filter(|f| self.sampler.is_textual(&f.path))
                .cloned()
                .collect();
            let subfolder_count = listing.subdirectories.len();
            let is_empty = textual.is_empty() && subfolder_count == 0;
            let node_type = classify(
                textual.len(),
                subfolder_count,
                is_empty,
                self.settings.processing.min_text_files,
            );

            let child_hashes: Vec<(String, String)> = children
                .iter()
                .map(|c| {
                    let hash = c.persona.structural_hash().unwrap_or_default();
                    (c.name.clone(), hash.to_string())
                })
                .collect();
            let structural_hash = compute_structural_hash(&path, &listing.files, &child_hashes);

            if let Some(existing) = self.load_existing(&key) {
                if existing.structural_hash() == Some(structural_hash.as_str()) {
                    Counters::bump(&self.counters.cache_hits);
                    debug!(path = %key, "Structural hash unchanged; reusing persona");
                    return existing;
                }
            }

            let identity = Identity {
                path: &path,
                depth,
                node_type,
                structural_hash: Some(structural_hash),
            };
            let evidence = match node_type {
                NodeType::Leaf => Evidence::Leaf { files: &textual },
                NodeType::Branch => Evidence::Branch {
                    children: children
                        .iter()
                        .map(|c| ChildSummary {
                            name: c.name.clone(),
                            label: c.persona.persona.short_label.clone(),
                            description: c.persona.persona.description.clone(),
                        })
                        .collect(),
                    loose_files: listing.files.iter().map(|f| f.name.clone()).collect(),
                    textual_count: textual.len(),
                },
            };
            self.synthesize(identity, evidence, None, audit_errors).await
        }
        .boxed()
    }

    /// Process subdirectories, concurrently when enabled, preserving their order
    async fn process_children(
        &self,
        subdirectories: &[PathBuf],
        depth: usize,
        chain: Vec<PathBuf>,
    ) -> Vec<ChildResult> {
        let tasks = subdirectories.iter().cloned().map(|child| {
            let chain = chain.clone();
            async move {
                let name = display_name(&child);
                let persona = self.process_directory(child, depth, chain).await;
                ChildResult { name, persona }
            }
        });

        let processing = &self.settings.processing;
        if processing.allow_parallel {
            futures::stream::iter(tasks)
                .buffered(processing.max_parallel)
                .collect()
                .await
        } else {
            let mut results = Vec::with_capacity(subdirectories.len());
            for task in tasks {
                results.push(task.await);
            }
            results
        }
    }

    fn load_existing(&self, key: &str) -> Option<FolderPersona> {
        match self.store.load(key) {
            Ok(persona) => persona,
            Err(e) => {
                warn!(path = %key, error = %e, "Failed to read stored persona");
                None
            }
        }
    }
}
