use std::fs;

use mapmaker::config::WORKSPACE_CONFIG_FILE;
use mapmaker::error::ApiError;
use mapmaker::tooling::cli::{CliContext, Commands};
use mapmaker::types::PERSONA_FILE_NAME;
use tempfile::TempDir;

use crate::integration::support::{with_xdg_env, write_notes};

fn build_command(format: &str) -> Commands {
    Commands::Build {
        no_refine: false,
        resume: false,
        provider: None,
        model: None,
        parallel: false,
        max_parallel: None,
        follow_symlinks: false,
        export: false,
        format: format.to_string(),
    }
}

fn list_command(node_type: Option<String>) -> Commands {
    Commands::List {
        node_type,
        queries: false,
        constraints: false,
        derived: false,
        meta: false,
        full: false,
        format: "json".to_string(),
    }
}

fn sample_root(temp_dir: &TempDir) -> std::path::PathBuf {
    let root = temp_dir.path().join("nas");
    write_notes(&root.join("Business").join("Invoices"), 5);
    write_notes(&root.join("Private"), 2);
    root
}

#[test]
fn build_json_contract_has_required_fields() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        let root = sample_root(&temp_dir);
        let cli = CliContext::new(root, None, None).unwrap();

        let output = cli.execute(&build_command("json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["folders"], 4);
        assert_eq!(parsed["generated"].as_u64(), Some(4 + 3));
        assert_eq!(parsed["fallbacks"], 0);
        assert_eq!(parsed["refinement"]["refined"], 3);

        // The second run is served entirely from the store
        let output = cli.execute(&build_command("json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["generated"], 0);
        assert_eq!(parsed["cache_hits"], 4);
    });
}

#[test]
fn store_defaults_to_the_xdg_data_directory() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        let root = sample_root(&temp_dir);
        let cli = CliContext::new(root.clone(), None, None).unwrap();
        cli.execute(&build_command("text")).unwrap();

        let output = cli
            .execute(&Commands::Stats {
                format: "json".to_string(),
            })
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["total"], 4);
        assert_eq!(parsed["breakdown"]["LEAF"], 1);
        assert_eq!(parsed["breakdown"]["BRANCH"], 3);

        let data_dir = temp_dir.path().join("xdg-data").join("mapmaker");
        assert!(data_dir.exists());
        // Nothing is written inside the tree itself
        assert!(!root.join(PERSONA_FILE_NAME).exists());
    });
}

#[test]
fn list_show_and_export_read_from_the_store() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        let root = sample_root(&temp_dir);
        let store = temp_dir.path().join("store");
        let cli = CliContext::new(root.clone(), None, Some(store)).unwrap();
        cli.execute(&build_command("text")).unwrap();

        let output = cli
            .execute(&list_command(Some("leaf".to_string())))
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        let leaves = parsed.as_array().unwrap();
        assert_eq!(leaves.len(), 1);
        assert!(leaves[0]["meta"]["path"]
            .as_str()
            .unwrap()
            .ends_with("Invoices"));

        let output = cli
            .execute(&Commands::Show {
                path: "Business/Invoices".into(),
                format: "json".to_string(),
            })
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["persona"]["short_label"], "Invoices");
        assert!(parsed["constraints"]["root_rule"]
            .as_str()
            .unwrap()
            .starts_with("Strictly commercial"));

        let text = cli
            .execute(&Commands::Show {
                path: "Business/Invoices".into(),
                format: "text".to_string(),
            })
            .unwrap();
        assert!(text.contains("LEAF"));

        let detailed = cli
            .execute(&Commands::List {
                node_type: None,
                queries: false,
                constraints: false,
                derived: false,
                meta: false,
                full: true,
                format: "text".to_string(),
            })
            .unwrap();
        assert!(detailed.contains("Parent constraint: Parent category"));
        assert!(detailed.contains("Total folders: 4"));

        let output = cli
            .execute(&Commands::Export {
                path: Some("Business".into()),
            })
            .unwrap();
        assert_eq!(output, "Exported 2 persona files.");
        assert!(root.join("Business").join(PERSONA_FILE_NAME).exists());
        assert!(!root.join("Private").join(PERSONA_FILE_NAME).exists());
    });
}

#[test]
fn show_unknown_folder_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        let root = sample_root(&temp_dir);
        let cli = CliContext::new(root, None, None).unwrap();
        let err = cli
            .execute(&Commands::Show {
                path: "Business".into(),
                format: "json".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, ApiError::PersonaNotFound(_)));
    });
}

#[test]
fn init_config_writes_a_loadable_file() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        let root = sample_root(&temp_dir);
        let cli = CliContext::new(root.clone(), None, None).unwrap();

        let printed = cli
            .execute(&Commands::InitConfig {
                path: None,
                force: false,
                print: true,
            })
            .unwrap();
        assert!(printed.contains("[processing]"));
        assert!(!root.join(WORKSPACE_CONFIG_FILE).exists());

        cli.execute(&Commands::InitConfig {
            path: None,
            force: false,
            print: false,
        })
        .unwrap();
        assert!(root.join(WORKSPACE_CONFIG_FILE).exists());

        // Refuses to overwrite without --force
        assert!(cli
            .execute(&Commands::InitConfig {
                path: None,
                force: false,
                print: false,
            })
            .is_err());

        let reloaded = CliContext::new(root, None, Some(temp_dir.path().join("other-store")));
        assert!(reloaded.is_ok());
    });
}

#[test]
fn workspace_config_overrides_processing_settings() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        let root = sample_root(&temp_dir);
        fs::write(
            root.join(WORKSPACE_CONFIG_FILE),
            "[processing]\nmin_text_files = 2\n",
        )
        .unwrap();

        let cli = CliContext::new(root, None, None).unwrap();
        assert_eq!(cli.config().processing.min_text_files, 2);
        cli.execute(&build_command("text")).unwrap();

        let output = cli
            .execute(&list_command(Some("LEAF".to_string())))
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        // Private now has enough text files to be content-driven
        assert_eq!(parsed.as_array().unwrap().len(), 2);
    });
}

#[test]
fn invalid_root_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        let result = CliContext::new(temp_dir.path().join("missing"), None, None);
        assert!(matches!(result, Err(ApiError::InvalidRoot(_))));
    });
}
