//! CLI Tooling
//!
//! Command-line interface for building, refining and inspecting folder personas.
//! Every command is scoped to one root directory and its persona store.

use crate::builder::{BuildMode, BuilderSettings, PersonaBuilder};
use crate::config::{ConfigLoader, MapMakerConfig, WORKSPACE_CONFIG_FILE};
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::persona::NodeType;
use crate::provider::{create_provider_client, ProviderType};
use crate::store::{PersonaStore, SledPersonaStore};
use crate::tooling::format::{
    format_build_report_text, format_persona_list_text, format_persona_text,
    format_refinement_report_text, format_stats_text, ListView,
};
use crate::tree::path::canonicalize_path;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Mapmaker CLI - semantic personas for every folder in a tree
#[derive(Parser)]
#[command(name = "mapmaker")]
#[command(about = "Build hierarchical, cached semantic personas for a directory tree")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Root directory of the tree
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Persona store directory (overrides storage.store_path)
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Apply logging flags on top of the configured logging section
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut config = base.clone();
        if self.verbose {
            config.level = "debug".to_string();
        }
        if let Some(ref level) = self.log_level {
            config.level = level.clone();
        }
        if let Some(ref format) = self.log_format {
            config.format = format.clone();
        }
        if let Some(ref output) = self.log_output {
            config.output = output.clone();
        }
        if let Some(ref file) = self.log_file {
            config.file = Some(file.clone());
        }
        config
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build personas bottom-up, then refine them top-down
    Build {
        /// Skip the top-down refinement pass
        #[arg(long)]
        no_refine: bool,

        /// Reuse any stored persona without descending into its folder
        #[arg(long)]
        resume: bool,

        /// Provider type (stub, ollama, openai, fireworks)
        #[arg(long)]
        provider: Option<String>,

        /// Model identifier for the provider
        #[arg(long)]
        model: Option<String>,

        /// Process sibling folders concurrently
        #[arg(long)]
        parallel: bool,

        /// Upper bound on concurrently processed siblings
        #[arg(long)]
        max_parallel: Option<usize>,

        /// Descend into symlinked directories
        #[arg(long)]
        follow_symlinks: bool,

        /// Write folder_persona.json into every folder after the run
        #[arg(long)]
        export: bool,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Re-run only the top-down refinement pass over stored personas
    Refine {
        /// Provider type (stub, ollama, openai, fireworks)
        #[arg(long)]
        provider: Option<String>,

        /// Model identifier for the provider
        #[arg(long)]
        model: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show persona counts by node type
    Stats {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List stored personas
    List {
        /// Only list LEAF or BRANCH personas
        #[arg(long)]
        node_type: Option<String>,

        /// Show hypothetical user queries and embedding info
        #[arg(short, long)]
        queries: bool,

        /// Show parent and negative constraints
        #[arg(short, long)]
        constraints: bool,

        /// Show what each persona was derived from
        #[arg(short, long)]
        derived: bool,

        /// Show node type, depth, confidence and language
        #[arg(short, long)]
        meta: bool,

        /// Show all available information
        #[arg(short, long)]
        full: bool,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show the persona of one folder
    Show {
        /// Folder path, relative to the root or absolute
        path: PathBuf,

        /// Output format (json or text)
        #[arg(long, default_value = "json")]
        format: String,
    },
    /// Write folder_persona.json files from the store
    Export {
        /// Only export folders at or below this path (default: the root)
        path: Option<PathBuf>,
    },
    /// Write a default configuration file
    InitConfig {
        /// Destination (default: <root>/.mapmaker.toml)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,

        /// Print the default configuration instead of writing it
        #[arg(long)]
        print: bool,
    },
}

/// Provider overrides shared by build and refine
struct ProviderOverrides<'a> {
    provider: Option<&'a str>,
    model: Option<&'a str>,
}

/// CLI context for one root and its persona store
pub struct CliContext {
    root: PathBuf,
    config: MapMakerConfig,
    store: Arc<SledPersonaStore>,
    store_path: PathBuf,
}

impl CliContext {
    /// Create a new CLI context
    pub fn new(
        root: PathBuf,
        config_path: Option<PathBuf>,
        store_override: Option<PathBuf>,
    ) -> Result<Self, ApiError> {
        let root = canonicalize_path(&root).map_err(|_| ApiError::InvalidRoot(root.clone()))?;
        let config = ConfigLoader::resolve(config_path.as_deref(), &root)?;

        let store_path = match store_override {
            Some(path) => path,
            None => config.storage.resolve_store_path(&root)?,
        };
        std::fs::create_dir_all(&store_path)?;
        let store = Arc::new(SledPersonaStore::open(&store_path)?);

        Ok(Self {
            root,
            config,
            store,
            store_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &MapMakerConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<SledPersonaStore> {
        Arc::clone(&self.store)
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let result = self.execute_inner(command);
        info!(
            command = command_name(command),
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Build {
                no_refine,
                resume,
                provider,
                model,
                parallel,
                max_parallel,
                follow_symlinks,
                export,
                format,
            } => {
                let mut config = self.config.clone();
                if *parallel {
                    config.processing.allow_parallel = true;
                }
                if let Some(max) = max_parallel {
                    config.processing.max_parallel = *max;
                }
                if *follow_symlinks {
                    config.processing.follow_symlinks = true;
                }
                let overrides = ProviderOverrides {
                    provider: provider.as_deref(),
                    model: model.as_deref(),
                };
                let mode = if *resume {
                    BuildMode::Resume
                } else {
                    BuildMode::Full
                };
                let builder = self.builder(config, &overrides, mode)?;
                let report = runtime()?.block_on(builder.run(!no_refine))?;

                let mut out = render(format, &report, format_build_report_text)?;
                if *export {
                    let written = self.store.export(Some(builder.root()))?;
                    if format != "json" {
                        out.push_str(&format!("\nExported {} persona files.\n", written));
                    }
                }
                Ok(out)
            }
            Commands::Refine {
                provider,
                model,
                format,
            } => {
                let overrides = ProviderOverrides {
                    provider: provider.as_deref(),
                    model: model.as_deref(),
                };
                let builder = self.builder(self.config.clone(), &overrides, BuildMode::Full)?;
                let report = runtime()?.block_on(builder.refine())?;
                render(format, &report, format_refinement_report_text)
            }
            Commands::Stats { format } => {
                let stats = self.store.stats()?;
                let store_path = self.store_path.display().to_string();
                render(format, &stats, |s| format_stats_text(s, &store_path))
            }
            Commands::List {
                node_type,
                queries,
                constraints,
                derived,
                meta,
                full,
                format,
            } => {
                let filter = node_type.as_deref().map(parse_node_type).transpose()?;
                let records: Vec<_> = self
                    .store
                    .scan_all()?
                    .into_iter()
                    .filter(|r| filter.map_or(true, |t| r.node_type == t))
                    .collect();
                if format == "json" {
                    let documents: Vec<_> = records.iter().map(|r| &r.document).collect();
                    return to_json(&documents);
                }
                let view = if *full {
                    ListView::full()
                } else {
                    ListView {
                        queries: *queries,
                        constraints: *constraints,
                        derived: *derived,
                        meta: *meta,
                    }
                };
                Ok(format_persona_list_text(&records, &view))
            }
            Commands::Show { path, format } => {
                let key = self.resolve_folder(path);
                let persona = self
                    .store
                    .load(&key)?
                    .ok_or_else(|| ApiError::PersonaNotFound(key.clone()))?;
                if format == "text" {
                    Ok(format_persona_text(&persona))
                } else {
                    to_json(&persona)
                }
            }
            Commands::Export { path } => {
                let base = match path {
                    Some(path) => PathBuf::from(self.resolve_folder(path)),
                    None => self.root.clone(),
                };
                let written = self.store.export(Some(&base))?;
                Ok(format!("Exported {} persona files.", written))
            }
            Commands::InitConfig { path, force, print } => {
                if *print {
                    return ConfigLoader::default_toml();
                }
                let target = path
                    .clone()
                    .unwrap_or_else(|| self.root.join(WORKSPACE_CONFIG_FILE));
                ConfigLoader::write_default(&target, *force)?;
                Ok(format!("Wrote default configuration to {}", target.display()))
            }
        }
    }

    fn builder(
        &self,
        mut config: MapMakerConfig,
        overrides: &ProviderOverrides<'_>,
        mode: BuildMode,
    ) -> Result<PersonaBuilder, ApiError> {
        if let Some(provider) = overrides.provider {
            let provider_type = ProviderType::from_str(provider)?;
            if provider_type != config.provider.provider_type {
                config.provider.provider_type = provider_type;
                config.provider.endpoint = None;
                config.provider.model = None;
            }
        }
        if let Some(model) = overrides.model {
            config.provider.model = Some(model.to_string());
        }
        config.validate().map_err(ApiError::ConfigError)?;

        let provider = create_provider_client(&config.provider)?;
        let settings = BuilderSettings::from_config(&self.root, &config).with_mode(mode);
        PersonaBuilder::new(settings, provider, self.store.clone())
    }

    /// Store key for a folder given relative to the root or absolute
    fn resolve_folder(&self, path: &Path) -> String {
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        canonicalize_path(&joined)
            .unwrap_or(joined)
            .to_string_lossy()
            .to_string()
    }
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Build { .. } => "build",
        Commands::Refine { .. } => "refine",
        Commands::Stats { .. } => "stats",
        Commands::List { .. } => "list",
        Commands::Show { .. } => "show",
        Commands::Export { .. } => "export",
        Commands::InitConfig { .. } => "init-config",
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, ApiError> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

fn parse_node_type(value: &str) -> Result<NodeType, ApiError> {
    match value.to_ascii_uppercase().as_str() {
        "LEAF" => Ok(NodeType::Leaf),
        "BRANCH" => Ok(NodeType::Branch),
        _ => Err(ApiError::ConfigError(format!(
            "Invalid node type: {}. Must be LEAF or BRANCH",
            value
        ))),
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::ConfigError(format!("Failed to render JSON: {}", e)))
}

fn render<T: serde::Serialize>(
    format: &str,
    value: &T,
    text: impl FnOnce(&T) -> String,
) -> Result<String, ApiError> {
    match format {
        "json" => to_json(value),
        "text" => Ok(text(value)),
        other => Err(ApiError::ConfigError(format!(
            "Invalid output format: {} (must be 'text' or 'json')",
            other
        ))),
    }
}
