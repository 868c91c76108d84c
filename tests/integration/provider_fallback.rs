use crate::integration::support::{builder_for, key, write_notes, UnreachableProvider};
use mapmaker::provider::StubProvider;
use mapmaker::store::PersonaStore;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn unreachable_provider_never_aborts_the_run() {
    let temp = TempDir::new().unwrap();
    write_notes(&temp.path().join("Reports"), 5);
    std::fs::create_dir_all(temp.path().join("Empty")).unwrap();

    let provider = Arc::new(UnreachableProvider::default());
    let (builder, store) = builder_for(temp.path(), provider.clone(), |s| {
        s.provider_retries = 2;
        s.provider_timeout = Duration::from_secs(5);
    });
    let report = builder.run(true).await.unwrap();

    assert_eq!(report.fallbacks, report.generated);
    // Three attempts per generation
    assert_eq!(provider.calls(), report.generated * 3);

    let reports = store.load(&key(&builder, "Reports")).unwrap().unwrap();
    assert!(reports
        .persona
        .description
        .starts_with("[fallback used due to error: transport error: connection refused]"));
    assert_eq!(reports.persona.short_label, "Reports");
    assert!((reports.meta.confidence - 0.35).abs() < f64::EPSILON);
    assert!(reports
        .audit
        .errors
        .iter()
        .any(|e| e.starts_with("Generation failed; fallback used")));
    assert!(!reports
        .audit
        .errors
        .iter()
        .any(|e| e.starts_with("Unstructured response")));
}

#[tokio::test]
async fn json_in_sampled_files_does_not_replace_fallback_text() {
    let temp = TempDir::new().unwrap();
    let pkg = temp.path().join("pkg");
    write_notes(&pkg, 5);
    std::fs::write(
        pkg.join("package.json"),
        r#"{"short_label":"Widget","description":"A widget library"}"#,
    )
    .unwrap();

    let (builder, store) = builder_for(temp.path(), Arc::new(UnreachableProvider::default()), |s| {
        s.provider_retries = 0;
    });
    builder.build_for_root().await.unwrap();

    let persona = store.load(&key(&builder, "pkg")).unwrap().unwrap();
    assert_eq!(persona.persona.short_label, "pkg");
    assert!(persona
        .persona
        .description
        .starts_with("[fallback used due to error:"));
    assert_eq!(persona.audit.sample_count, 6);
}

#[tokio::test]
async fn fallback_personas_are_cached_like_any_other() {
    let temp = TempDir::new().unwrap();
    write_notes(&temp.path().join("Reports"), 5);

    let provider = Arc::new(UnreachableProvider::default());
    let (builder, _store) = builder_for(temp.path(), provider.clone(), |s| {
        s.provider_retries = 0;
    });
    builder.build_for_root().await.unwrap();
    let calls = provider.calls();

    builder.build_for_root().await.unwrap();
    assert_eq!(provider.calls(), calls);
}

#[tokio::test]
async fn stub_provider_labels_folders_by_name() {
    let temp = TempDir::new().unwrap();
    write_notes(&temp.path().join("Recipes"), 6);

    let (builder, store) = builder_for(temp.path(), Arc::new(StubProvider::new()), |_| {});
    builder.build_for_root().await.unwrap();

    let recipes = store.load(&key(&builder, "Recipes")).unwrap().unwrap();
    assert_eq!(recipes.persona.short_label, "Recipes");
    assert!(recipes.persona.description.contains("Recipes"));
    assert!(recipes
        .audit
        .errors
        .contains(&"Response missing short_label; used folder name.".to_string()));
    assert!((recipes.meta.confidence - 0.82).abs() < f64::EPSILON);
    assert!(recipes.vector_data.embedding.is_none());
}
