//! Persona Builder
//!
//! Two passes over a directory tree:
//!
//! 1. **Construction** (bottom-up). Every folder is classified as LEAF or
//!    BRANCH, fingerprinted with a structural hash, and given a persona, either
//!    reused from the store when the hash matches or synthesized by the
//!    generation provider from file samples (LEAF) or child personas (BRANCH).
//!    Sibling folders may be processed concurrently.
//! 2. **Refinement** (top-down, sequential). Each child is re-synthesized with
//!    its parent's label, description and exclusions injected as a constraint,
//!    unless it was already refined under the same constraint.
//!
//! Nothing a single folder does can abort a run. Extraction errors, provider
//! failures and malformed responses are recorded in the persona's audit trail.

mod construct;
mod refine;
mod synthesis;

pub use refine::parent_constraint_for;

use crate::concurrency::VisitedPaths;
use crate::config::{MapMakerConfig, ProcessingConfig, RootRules, SchemaConfig};
use crate::error::ApiError;
use crate::persona::FolderPersona;
use crate::provider::{GenerationProvider, ResilientProvider};
use crate::sampler::{FsTextSampler, TextSampler};
use crate::store::PersonaStore;
use crate::tree::path::canonicalize_path;
use crate::tree::WalkerConfig;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// How Pass 1 treats folders that already have a stored persona
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildMode {
    /// Always descend and rely on the structural hash to skip unchanged folders
    #[default]
    Full,
    /// Return any stored persona immediately without descending; changes
    /// below an already processed folder go unnoticed
    Resume,
}

/// Everything the builder needs besides its collaborators
#[derive(Debug, Clone)]
pub struct BuilderSettings {
    pub root: PathBuf,
    pub mode: BuildMode,
    pub processing: ProcessingConfig,
    pub root_rules: RootRules,
    pub schema: SchemaConfig,
    pub provider_timeout: Duration,
    pub provider_retries: u32,
}

impl BuilderSettings {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::from_config(root, &MapMakerConfig::default())
    }

    pub fn from_config(root: impl Into<PathBuf>, config: &MapMakerConfig) -> Self {
        Self {
            root: root.into(),
            mode: BuildMode::Full,
            processing: config.processing.clone(),
            root_rules: config.root_constraints.clone(),
            schema: config.schema.clone(),
            provider_timeout: Duration::from_secs(config.provider.timeout_secs),
            provider_retries: config.provider.retries,
        }
    }

    pub fn with_mode(mut self, mode: BuildMode) -> Self {
        self.mode = mode;
        self
    }

    fn walker(&self) -> WalkerConfig {
        WalkerConfig {
            follow_symlinks: self.processing.follow_symlinks,
        }
    }
}

/// Pass 2 summary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefinementReport {
    /// Personas examined
    pub visited: usize,
    /// Personas re-synthesized under a new parent constraint
    pub refined: usize,
}

/// Summary of a complete run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildReport {
    pub root: PathBuf,
    /// Folders reached in Pass 1, placeholders included
    pub folders: usize,
    /// Generation calls made across both passes
    pub generated: usize,
    pub cache_hits: usize,
    pub placeholders: usize,
    /// Generation calls that ended in the deterministic fallback (both passes)
    pub fallbacks: usize,
    pub refinement: Option<RefinementReport>,
    pub duration_ms: u64,
}

#[derive(Debug, Default)]
struct Counters {
    folders: AtomicUsize,
    generated: AtomicUsize,
    cache_hits: AtomicUsize,
    placeholders: AtomicUsize,
    fallbacks: AtomicUsize,
}

impl Counters {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::Relaxed)
    }

    fn reset(&self) {
        for counter in [
            &self.folders,
            &self.generated,
            &self.cache_hits,
            &self.placeholders,
            &self.fallbacks,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Builds and refines personas for one root
pub struct PersonaBuilder {
    settings: BuilderSettings,
    provider: ResilientProvider,
    sampler: Arc<dyn TextSampler>,
    store: Arc<dyn PersonaStore>,
    visited: VisitedPaths,
    counters: Counters,
}

impl PersonaBuilder {
    /// Create a builder; fails when the root is not a readable directory
    pub fn new(
        mut settings: BuilderSettings,
        provider: Arc<dyn GenerationProvider>,
        store: Arc<dyn PersonaStore>,
    ) -> Result<Self, ApiError> {
        settings.processing.validate().map_err(ApiError::ConfigError)?;
        settings.root = validate_root(&settings.root)?;
        let sampler = Arc::new(FsTextSampler::new(settings.processing.sample_bytes));
        let provider = ResilientProvider::new(
            provider,
            settings.provider_timeout,
            settings.provider_retries,
        );
        Ok(Self {
            settings,
            provider,
            sampler,
            store,
            visited: VisitedPaths::new(),
            counters: Counters::default(),
        })
    }

    /// Replace the filesystem text sampler
    pub fn with_sampler(mut self, sampler: Arc<dyn TextSampler>) -> Self {
        self.sampler = sampler;
        self
    }

    /// Canonical root of the tree
    pub fn root(&self) -> &Path {
        &self.settings.root
    }

    pub fn settings(&self) -> &BuilderSettings {
        &self.settings
    }

    /// Pass 1, then Pass 2 unless `refine` is false
    pub async fn run(&self, refine: bool) -> Result<BuildReport, ApiError> {
        let start = Instant::now();
        self.build_for_root().await?;
        let refinement = if refine {
            Some(self.refine().await?)
        } else {
            None
        };

        let report = BuildReport {
            root: self.settings.root.clone(),
            folders: Counters::get(&self.counters.folders),
            generated: Counters::get(&self.counters.generated),
            cache_hits: Counters::get(&self.counters.cache_hits),
            placeholders: Counters::get(&self.counters.placeholders),
            fallbacks: Counters::get(&self.counters.fallbacks),
            refinement,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            root = %report.root.display(),
            folders = report.folders,
            generated = report.generated,
            cache_hits = report.cache_hits,
            fallbacks = report.fallbacks,
            duration_ms = report.duration_ms,
            "Build finished"
        );
        Ok(report)
    }

    fn persist(&self, persona: &FolderPersona) {
        if let Err(e) = self.store.save(persona) {
            error!(path = %persona.path(), error = %e, "Failed to persist persona");
        }
    }

    fn flush_store(&self) {
        if let Err(e) = self.store.flush() {
            error!(error = %e, "Failed to flush persona store");
        }
    }
}

fn validate_root(root: &Path) -> Result<PathBuf, ApiError> {
    let canonical =
        canonicalize_path(root).map_err(|_| ApiError::InvalidRoot(root.to_path_buf()))?;
    if !canonical.is_dir() || std::fs::read_dir(&canonical).is_err() {
        return Err(ApiError::InvalidRoot(root.to_path_buf()));
    }
    Ok(canonical)
}
