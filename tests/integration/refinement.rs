use crate::integration::support::{builder_for, key, write_notes, ScriptedProvider};
use mapmaker::builder::parent_constraint_for;
use mapmaker::config::GENERIC_RULE;
use mapmaker::store::PersonaStore;
use std::sync::Arc;
use tempfile::TempDir;

fn company_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    write_notes(&temp.path().join("Business").join("Clients").join("Acme"), 5);
    write_notes(&temp.path().join("Private").join("Health"), 5);
    write_notes(&temp.path().join("Misc"), 5);
    temp
}

#[tokio::test]
async fn root_rules_follow_the_first_path_segment() {
    let temp = company_tree();
    let provider = Arc::new(ScriptedProvider::default());
    let (builder, store) = builder_for(temp.path(), provider.clone(), |_| {});
    builder.build_for_root().await.unwrap();

    let acme = store.load(&key(&builder, "Business/Clients/Acme")).unwrap().unwrap();
    assert!(acme.constraints.root_rule.starts_with("Strictly commercial"));
    assert_eq!(acme.constraints.path_context, "Business > Clients > Acme");

    let health = store.load(&key(&builder, "Private/Health")).unwrap().unwrap();
    assert!(health.constraints.root_rule.starts_with("Strictly personal"));

    let misc = store.load(&key(&builder, "Misc")).unwrap().unwrap();
    assert_eq!(misc.constraints.root_rule, GENERIC_RULE);

    let acme_prompt = provider
        .prompts()
        .into_iter()
        .find(|p| p.contains("Business > Clients > Acme"))
        .unwrap();
    assert!(acme_prompt.contains("GLOBAL CONSTRAINT: Strictly commercial"));
    assert!(!acme_prompt.contains("PARENT CONSTRAINT"));
}

#[tokio::test]
async fn children_are_refined_under_their_parents_persona() {
    let temp = company_tree();
    let provider = Arc::new(ScriptedProvider::default());
    let (builder, store) = builder_for(temp.path(), provider.clone(), |_| {});
    let report = builder.run(true).await.unwrap();

    // Everything except the root
    let refinement = report.refinement.unwrap();
    assert_eq!(refinement.visited, 7);
    assert_eq!(refinement.refined, 6);

    let root = store.load(&key(&builder, "")).unwrap().unwrap();
    assert!(root.constraints.parent_constraint.is_none());

    let business = store.load(&key(&builder, "Business")).unwrap().unwrap();
    assert_eq!(
        business.constraints.parent_constraint.as_deref(),
        Some(parent_constraint_for(&root).as_str())
    );

    let clients = store.load(&key(&builder, "Business/Clients")).unwrap().unwrap();
    let acme = store.load(&key(&builder, "Business/Clients/Acme")).unwrap().unwrap();
    assert_eq!(
        acme.constraints.parent_constraint.as_deref(),
        Some(parent_constraint_for(&clients).as_str())
    );
    assert!(acme.persona.description.ends_with("(refined)"));
    assert!(acme
        .constraints
        .parent_constraint
        .unwrap()
        .contains("Must not be: holiday photos"));

    let refined_prompt = provider
        .prompts()
        .into_iter()
        .rev()
        .find(|p| p.contains("Business > Clients > Acme"))
        .unwrap();
    assert!(refined_prompt.contains("PARENT CONSTRAINT: Parent category"));
}

#[tokio::test]
async fn regenerated_folders_are_refined_again() {
    let temp = company_tree();
    let provider = Arc::new(ScriptedProvider::default());
    let (builder, store) = builder_for(temp.path(), provider.clone(), |_| {});
    builder.run(true).await.unwrap();

    std::fs::write(
        temp.path().join("Misc").join("late.txt"),
        "something added later",
    )
    .unwrap();
    let report = builder.run(true).await.unwrap();

    // Pass 1 regenerates Misc and the root
    let refinement = report.refinement.unwrap();
    assert_eq!(report.generated - refinement.refined, 2);
    // A new root persona changes every constraint below it
    assert_eq!(refinement.refined, 6);

    let misc = store.load(&key(&builder, "Misc")).unwrap().unwrap();
    assert!(misc.constraints.parent_constraint.is_some());
    assert!(misc.persona.description.ends_with("(refined)"));
}

#[tokio::test]
async fn refine_without_build_touches_nothing() {
    let temp = company_tree();
    let provider = Arc::new(ScriptedProvider::default());
    let (builder, store) = builder_for(temp.path(), provider.clone(), |_| {});

    let report = builder.refine().await.unwrap();
    assert_eq!(report.visited, 0);
    assert_eq!(report.refined, 0);
    assert_eq!(provider.calls(), 0);
    assert!(store.scan_all().unwrap().is_empty());
}
