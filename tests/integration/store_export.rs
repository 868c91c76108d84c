use crate::integration::support::{builder_for, key, write_notes, ScriptedProvider};
use mapmaker::persona::FolderPersona;
use mapmaker::store::{PersonaStore, SledPersonaStore};
use mapmaker::types::PERSONA_FILE_NAME;
use std::sync::Arc;
use tempfile::TempDir;

fn read_export(dir: &std::path::Path) -> FolderPersona {
    let json = std::fs::read_to_string(dir.join(PERSONA_FILE_NAME)).unwrap();
    serde_json::from_str(&json).unwrap()
}

#[tokio::test]
async fn export_writes_one_document_per_folder() {
    let temp = TempDir::new().unwrap();
    write_notes(&temp.path().join("Projects").join("Alpha"), 5);
    write_notes(&temp.path().join("Projects").join("Beta"), 5);

    let provider = Arc::new(ScriptedProvider::default());
    let (builder, store) = builder_for(temp.path(), provider, |_| {});
    builder.run(true).await.unwrap();

    let written = store.export(Some(builder.root())).unwrap();
    assert_eq!(written, 4);

    let alpha_dir = temp.path().join("Projects").join("Alpha");
    let exported = read_export(&alpha_dir);
    let stored = store.load(&key(&builder, "Projects/Alpha")).unwrap().unwrap();
    assert_eq!(exported.meta.path, stored.meta.path);
    assert_eq!(exported.meta.structural_hash, stored.meta.structural_hash);
    assert_eq!(exported.persona, stored.persona);
    assert!(exported.constraints.parent_constraint.is_some());
}

#[tokio::test]
async fn export_respects_the_base_path() {
    let temp = TempDir::new().unwrap();
    write_notes(&temp.path().join("Projects").join("Alpha"), 5);
    write_notes(&temp.path().join("Notes"), 5);

    let provider = Arc::new(ScriptedProvider::default());
    let (builder, store) = builder_for(temp.path(), provider, |_| {});
    builder.build_for_root().await.unwrap();

    let base = builder.root().join("Projects");
    assert_eq!(store.export(Some(&base)).unwrap(), 2);
    assert!(temp.path().join("Projects").join(PERSONA_FILE_NAME).exists());
    assert!(!temp.path().join("Notes").join(PERSONA_FILE_NAME).exists());
    assert!(!temp.path().join(PERSONA_FILE_NAME).exists());
}

#[tokio::test]
async fn exported_json_uses_the_documented_field_names() {
    let temp = TempDir::new().unwrap();
    write_notes(&temp.path().join("Alpha"), 5);

    let provider = Arc::new(ScriptedProvider::default());
    let (builder, store) = builder_for(temp.path(), provider, |_| {});
    builder.build_for_root().await.unwrap();
    store.export(None).unwrap();

    let raw = std::fs::read_to_string(temp.path().join("Alpha").join(PERSONA_FILE_NAME)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["meta"]["node_type"], "LEAF");
    assert_eq!(value["meta"]["depth"], 1);
    assert!(value["meta"]["structural_hash"].is_string());
    assert!(value["constraints"]["root_rule"].is_string());
    assert_eq!(value["persona"]["short_label"], "Label 0");
    assert!(value["vector_data"]["hypothetical_user_queries"].is_array());
    assert!(value["audit"]["sample_count"].is_number());
}

#[test]
fn store_entries_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let tree = TempDir::new().unwrap();
    write_notes(&tree.path().join("Alpha"), 5);

    let expected = {
        let store = Arc::new(SledPersonaStore::open(dir.path()).unwrap());
        let builder = crate::integration::support::builder_with_store(
            tree.path(),
            Arc::new(ScriptedProvider::default()),
            store.clone(),
            |_| {},
        );
        runtime.block_on(builder.build_for_root()).unwrap();
        store.scan_all().unwrap()
    };

    let reopened = SledPersonaStore::open(dir.path()).unwrap();
    let records = reopened.scan_all().unwrap();
    assert_eq!(records, expected);
}
