#![cfg(unix)]

use crate::integration::support::{builder_for, key, write_notes, ScriptedProvider};
use mapmaker::persona::{FolderPersona, NodeType};
use mapmaker::store::PersonaStore;
use mapmaker::types::{PERSONA_FILE_NAME, SYMLINK_LOOP_HASH};
use std::os::unix::fs::symlink;
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn loop_back_to_an_ancestor_terminates_with_a_placeholder() {
    let temp = TempDir::new().unwrap();
    let deep = temp.path().join("a").join("b");
    write_notes(&deep, 2);
    symlink(temp.path().join("a"), deep.join("back-to-a")).unwrap();

    let provider = Arc::new(ScriptedProvider::default());
    let (builder, store) = builder_for(temp.path(), provider.clone(), |s| {
        s.processing.follow_symlinks = true;
    });
    let report = builder.run(true).await.unwrap();
    assert_eq!(report.placeholders, 1);
    assert_eq!(report.folders, 4);
    // The placeholder costs no generation call
    assert_eq!(provider.calls(), 3 + report.refinement.map_or(0, |r| r.refined));

    let placeholder = store.load(&key(&builder, "a/b/back-to-a")).unwrap().unwrap();
    assert!(placeholder.is_placeholder());
    assert_eq!(placeholder.node_type(), NodeType::Branch);
    assert_eq!(placeholder.persona.short_label, "back-to-a");
    assert_eq!(placeholder.structural_hash(), Some(SYMLINK_LOOP_HASH));
    assert_eq!(placeholder.meta.depth, 3);
    assert!(placeholder.meta.confidence < 0.5);
    assert!(placeholder.constraints.parent_constraint.is_none());

    let b = store.load(&key(&builder, "a/b")).unwrap().unwrap();
    assert_eq!(b.persona.derived_from, vec!["back-to-a", "LooseFiles"]);
}

#[tokio::test]
async fn loop_placeholders_are_stable_across_runs() {
    let temp = TempDir::new().unwrap();
    let inner = temp.path().join("inner");
    write_notes(&inner, 2);
    symlink(temp.path(), inner.join("root-again")).unwrap();

    let provider = Arc::new(ScriptedProvider::default());
    let (builder, _store) = builder_for(temp.path(), provider.clone(), |s| {
        s.processing.follow_symlinks = true;
    });
    let first = builder.build_for_root().await.unwrap();
    let calls = provider.calls();

    let second = builder.build_for_root().await.unwrap();
    assert_eq!(provider.calls(), calls);
    assert_eq!(first.structural_hash(), second.structural_hash());
}

#[tokio::test]
async fn aliases_of_a_sibling_are_expanded_when_following() {
    let temp = TempDir::new().unwrap();
    write_notes(&temp.path().join("real"), 5);
    symlink(temp.path().join("real"), temp.path().join("alias")).unwrap();

    let provider = Arc::new(ScriptedProvider::default());
    let (builder, store) = builder_for(temp.path(), provider.clone(), |s| {
        s.processing.follow_symlinks = true;
    });
    let report = builder.run(false).await.unwrap();
    assert_eq!(report.placeholders, 0);
    assert_eq!(provider.calls(), 3);

    let alias = store.load(&key(&builder, "alias")).unwrap().unwrap();
    let real = store.load(&key(&builder, "real")).unwrap().unwrap();
    assert_eq!(alias.node_type(), NodeType::Leaf);
    assert_eq!(alias.structural_hash(), real.structural_hash());
}

#[tokio::test]
async fn alias_and_target_are_both_refined_when_following() {
    let temp = TempDir::new().unwrap();
    write_notes(&temp.path().join("real"), 5);
    symlink(temp.path().join("real"), temp.path().join("alias")).unwrap();

    let (builder, store) = builder_for(temp.path(), Arc::new(ScriptedProvider::default()), |s| {
        s.processing.follow_symlinks = true;
    });
    let report = builder.run(true).await.unwrap();
    let refinement = report.refinement.unwrap();
    assert_eq!(refinement.visited, 3);
    assert_eq!(refinement.refined, 2);

    for name in ["alias", "real"] {
        let persona = store.load(&key(&builder, name)).unwrap().unwrap();
        assert!(persona.constraints.parent_constraint.is_some(), "{name} not refined");
        assert!(persona.persona.description.ends_with("(refined)"));
    }
}

#[tokio::test]
async fn refinement_stops_at_loop_placeholders() {
    let temp = TempDir::new().unwrap();
    let inner = temp.path().join("inner");
    write_notes(&inner, 2);
    symlink(temp.path(), inner.join("loop")).unwrap();

    let (builder, store) = builder_for(temp.path(), Arc::new(ScriptedProvider::default()), |s| {
        s.processing.follow_symlinks = true;
    });
    let report = builder.run(true).await.unwrap();
    let refinement = report.refinement.unwrap();
    assert_eq!(refinement.visited, 2);
    assert_eq!(refinement.refined, 1);

    let placeholder = store.load(&key(&builder, "inner/loop")).unwrap().unwrap();
    assert!(placeholder.constraints.parent_constraint.is_none());
}

#[tokio::test]
async fn export_skips_loop_placeholders() {
    let temp = TempDir::new().unwrap();
    let inner = temp.path().join("inner");
    write_notes(&inner, 2);
    symlink(temp.path(), inner.join("loop")).unwrap();

    let (builder, store) = builder_for(temp.path(), Arc::new(ScriptedProvider::default()), |s| {
        s.processing.follow_symlinks = true;
    });
    let root = builder.build_for_root().await.unwrap();
    assert_eq!(store.scan_all().unwrap().len(), 3);

    assert_eq!(store.export(None).unwrap(), 2);
    let written = std::fs::read_to_string(builder.root().join(PERSONA_FILE_NAME)).unwrap();
    let exported: FolderPersona = serde_json::from_str(&written).unwrap();
    assert_eq!(exported.meta.path, root.meta.path);
    assert!(!exported.is_placeholder());
}

#[tokio::test]
async fn symlinked_directories_are_ignored_by_default() {
    let temp = TempDir::new().unwrap();
    write_notes(&temp.path().join("real"), 5);
    symlink(temp.path().join("real"), temp.path().join("alias")).unwrap();
    symlink(temp.path(), temp.path().join("real").join("loop")).unwrap();

    let provider = Arc::new(ScriptedProvider::default());
    let (builder, store) = builder_for(temp.path(), provider.clone(), |_| {});
    let report = builder.run(false).await.unwrap();

    assert_eq!(report.placeholders, 0);
    assert_eq!(store.scan_all().unwrap().len(), 2);
    assert!(store.load(&key(&builder, "alias")).unwrap().is_none());
}
