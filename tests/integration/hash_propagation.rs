use crate::integration::support::{builder_for, key, write_notes, ScriptedProvider};
use mapmaker::config::{ConfigLoader, WORKSPACE_CONFIG_FILE};
use mapmaker::store::PersonaStore;
use std::fs::File;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn nested_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    write_notes(&temp.path().join("Archive").join("2023").join("Taxes"), 5);
    write_notes(&temp.path().join("Archive").join("2024"), 5);
    write_notes(&temp.path().join("Photos"), 5);
    temp
}

fn hash_of(store: &dyn PersonaStore, key: &str) -> String {
    store
        .load(key)
        .unwrap()
        .unwrap()
        .meta
        .structural_hash
        .unwrap()
}

#[tokio::test]
async fn touching_a_file_regenerates_only_its_ancestors() {
    let temp = nested_tree();
    let provider = Arc::new(ScriptedProvider::default());
    let (builder, store) = builder_for(temp.path(), provider.clone(), |_| {});
    builder.build_for_root().await.unwrap();
    let calls = provider.calls();

    let photos_before = hash_of(store.as_ref(), &key(&builder, "Photos"));
    let sibling_before = hash_of(store.as_ref(), &key(&builder, "Archive/2024"));
    let root_before = hash_of(store.as_ref(), &key(&builder, ""));

    let touched = temp.path().join("Archive").join("2023").join("Taxes").join("note00.txt");
    let file = File::options().write(true).open(&touched).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(3600))
        .unwrap();
    drop(file);

    let report = builder.run(false).await.unwrap();
    // Taxes, 2023, Archive and the root
    assert_eq!(provider.calls(), calls + 4);
    assert_eq!(report.generated, 4);
    assert_eq!(report.cache_hits, 2);

    assert_eq!(hash_of(store.as_ref(), &key(&builder, "Photos")), photos_before);
    assert_eq!(hash_of(store.as_ref(), &key(&builder, "Archive/2024")), sibling_before);
    assert_ne!(hash_of(store.as_ref(), &key(&builder, "")), root_before);
}

#[tokio::test]
async fn adding_and_removing_files_changes_the_hash() {
    let temp = nested_tree();
    let provider = Arc::new(ScriptedProvider::default());
    let (builder, store) = builder_for(temp.path(), provider.clone(), |_| {});
    builder.build_for_root().await.unwrap();
    let photos_key = key(&builder, "Photos");
    let original = hash_of(store.as_ref(), &photos_key);

    let extra = temp.path().join("Photos").join("extra.txt");
    std::fs::write(&extra, "new file").unwrap();
    builder.build_for_root().await.unwrap();
    let with_extra = hash_of(store.as_ref(), &photos_key);
    assert_ne!(with_extra, original);

    std::fs::remove_file(&extra).unwrap();
    builder.build_for_root().await.unwrap();
    assert_eq!(hash_of(store.as_ref(), &photos_key), original);
}

#[tokio::test]
async fn renaming_a_child_folder_changes_the_parent_hash() {
    let temp = nested_tree();
    let provider = Arc::new(ScriptedProvider::default());
    let (builder, store) = builder_for(temp.path(), provider.clone(), |_| {});
    builder.build_for_root().await.unwrap();
    let archive_before = hash_of(store.as_ref(), &key(&builder, "Archive"));
    let calls = provider.calls();

    std::fs::rename(
        temp.path().join("Archive").join("2024"),
        temp.path().join("Archive").join("2024-done"),
    )
    .unwrap();
    builder.build_for_root().await.unwrap();

    assert_ne!(hash_of(store.as_ref(), &key(&builder, "Archive")), archive_before);
    // The renamed folder keeps its hash; the entry under the old path is left in place
    assert_eq!(
        hash_of(store.as_ref(), &key(&builder, "Archive/2024-done")),
        hash_of(store.as_ref(), &key(&builder, "Archive/2024"))
    );
    // New path, Archive and the root
    assert_eq!(provider.calls(), calls + 3);
}

#[tokio::test]
async fn exported_persona_files_do_not_invalidate_the_cache() {
    let temp = nested_tree();
    let provider = Arc::new(ScriptedProvider::default());
    let (builder, store) = builder_for(temp.path(), provider.clone(), |_| {});
    builder.build_for_root().await.unwrap();
    store.export(Some(builder.root())).unwrap();
    let calls = provider.calls();

    builder.build_for_root().await.unwrap();
    assert_eq!(provider.calls(), calls);
}

#[tokio::test]
async fn root_config_file_does_not_invalidate_the_cache() {
    let temp = nested_tree();
    let provider = Arc::new(ScriptedProvider::default());
    let (builder, _store) = builder_for(temp.path(), provider.clone(), |_| {});
    builder.build_for_root().await.unwrap();
    let calls = provider.calls();

    ConfigLoader::write_default(&builder.root().join(WORKSPACE_CONFIG_FILE), false).unwrap();
    builder.build_for_root().await.unwrap();
    assert_eq!(provider.calls(), calls);
}
