//! Shared fixtures: scripted providers, tree builders and XDG isolation

use async_trait::async_trait;
use mapmaker::builder::{BuilderSettings, PersonaBuilder};
use mapmaker::error::ProviderError;
use mapmaker::provider::{GenerationProvider, GenerationRequest, GenerationResponse};
use mapmaker::store::SledPersonaStore;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Answers every prompt with a numbered JSON persona and records the prompts
#[derive(Default)]
pub struct ScriptedProvider {
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl GenerationProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, ProviderError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(request.user_prompt.clone());
        let suffix = if request.user_prompt.contains("PARENT CONSTRAINT") {
            " (refined)"
        } else {
            ""
        };
        Ok(GenerationResponse {
            content: serde_json::json!({
                "short_label": format!("Label {n}"),
                "description": format!("Description {n}{suffix}"),
                "negative_constraints": ["holiday photos"],
                "hypothetical_user_queries": ["where are the invoices"],
                "outliers_found": 0,
            })
            .to_string(),
            model: "scripted".to_string(),
        })
    }
}

/// Always fails, as an unreachable endpoint would
#[derive(Default)]
pub struct UnreachableProvider {
    calls: AtomicUsize,
}

impl UnreachableProvider {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationProvider for UnreachableProvider {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn generate(
        &self,
        _request: &GenerationRequest,
    ) -> Result<GenerationResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ProviderError::Transport("connection refused".to_string()))
    }
}

/// Create `dir` with `count` small text files
pub fn write_notes(dir: &Path, count: usize) {
    std::fs::create_dir_all(dir).unwrap();
    for i in 0..count {
        std::fs::write(
            dir.join(format!("note{i:02}.txt")),
            format!("meeting notes number {i}"),
        )
        .unwrap();
    }
}

/// Builder over `root` with a fresh temporary store
pub fn builder_for(
    root: &Path,
    provider: Arc<dyn GenerationProvider>,
    configure: impl FnOnce(&mut BuilderSettings),
) -> (PersonaBuilder, Arc<SledPersonaStore>) {
    let store = Arc::new(SledPersonaStore::temporary().unwrap());
    let builder = builder_with_store(root, provider, store.clone(), configure);
    (builder, store)
}

pub fn builder_with_store(
    root: &Path,
    provider: Arc<dyn GenerationProvider>,
    store: Arc<SledPersonaStore>,
    configure: impl FnOnce(&mut BuilderSettings),
) -> PersonaBuilder {
    let mut settings = BuilderSettings::new(root);
    configure(&mut settings);
    PersonaBuilder::new(settings, provider, store).unwrap()
}

/// Store key for a folder under the builder's root
pub fn key(builder: &PersonaBuilder, relative: &str) -> String {
    let mut path = builder.root().to_path_buf();
    for segment in relative.split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    path.to_string_lossy().to_string()
}

static ENV_LOCK: Mutex<()> = parking_lot::const_mutex(());

/// Run `f` with XDG data and config homes pointed into `temp_dir`
pub fn with_xdg_env<F: FnOnce()>(temp_dir: &TempDir, f: F) {
    let _guard = ENV_LOCK.lock();
    let data_home = temp_dir.path().join("xdg-data");
    let config_home = temp_dir.path().join("xdg-config");
    std::fs::create_dir_all(&data_home).unwrap();
    std::fs::create_dir_all(&config_home).unwrap();

    let previous_data = std::env::var_os("XDG_DATA_HOME");
    let previous_config = std::env::var_os("XDG_CONFIG_HOME");
    std::env::set_var("XDG_DATA_HOME", &data_home);
    std::env::set_var("XDG_CONFIG_HOME", &config_home);

    f();

    match previous_data {
        Some(value) => std::env::set_var("XDG_DATA_HOME", value),
        None => std::env::remove_var("XDG_DATA_HOME"),
    }
    match previous_config {
        Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
        None => std::env::remove_var("XDG_CONFIG_HOME"),
    }
}
