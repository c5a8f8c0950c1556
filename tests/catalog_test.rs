//! カタログ読み込み＋判定の結合テスト

use guitar_id::catalog::{self, Catalog};
use guitar_id::report;
use guitar_id_common::{lookup, ConfidenceTier, QuizFlow};
use std::path::Path;
use tempfile::tempdir;

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).expect("書き込み失敗");
}

fn sample_catalog_dir(dir: &Path) {
    write(
        dir,
        catalog::PATTERNS_FILE,
        r#"[
            {"id": 1, "prefix": "A", "yearStart": 1975, "yearEnd": 1980,
             "manufactureCountry": "Japan",
             "model": {"id": 10, "name": "YW-500", "series": "Classic", "countryOfOrigin": "Japan",
                       "productionStart": 1990, "productionEnd": 1999},
             "confidenceNotes": "Dealer catalog"},
            {"id": 2, "prefix": "E", "yearStart": 2010, "yearEnd": 2025,
             "manufactureCountry": "China"}
        ]"#,
    );
    write(
        dir,
        catalog::APPROVED_GUITARS_FILE,
        r#"[
            {"id": 1, "serialNumber": "A12345", "estimatedYear": 1977, "modelName": "YW-500"},
            {"id": 2, "serialNumber": "A99999", "estimatedYear": 1979}
        ]"#,
    );
    write(
        dir,
        catalog::MODELS_FILE,
        r#"[{"id": 10, "name": "YW-500"}, {"id": 11, "name": "DY-28"}]"#,
    );
    write(
        dir,
        catalog::FEATURES_FILE,
        r#"[
            {"id": 1, "category": "label_color", "name": "Orange"},
            {"id": 2, "category": "label_color", "name": "Green"},
            {"id": 3, "category": "tuner_type", "name": "Open-gear"}
        ]"#,
    );
    write(
        dir,
        catalog::MODEL_FEATURES_FILE,
        r#"[
            {"modelId": 10, "featureId": 1, "isRequired": true},
            {"modelId": 10, "featureId": 3},
            {"modelId": 11, "featureId": 2, "isRequired": true}
        ]"#,
    );
}

#[test]
fn test_load_full_catalog() {
    let dir = tempdir().expect("Failed to create temp dir");
    sample_catalog_dir(dir.path());

    let catalog = Catalog::load(dir.path()).expect("カタログ読み込み失敗");
    assert_eq!(catalog.patterns.len(), 2);
    assert_eq!(catalog.approved_guitars.len(), 2);
    assert_eq!(catalog.associations.len(), 3);
    assert_eq!(catalog.model(11).map(|m| m.name.as_str()), Some("DY-28"));
    // quiz_categories.json がないので組み込み順
    assert_eq!(catalog.quiz_categories, guitar_id_common::default_categories());
}

#[test]
fn test_missing_files_load_as_empty() {
    let dir = tempdir().expect("Failed to create temp dir");
    let catalog = Catalog::load(dir.path()).expect("空フォルダでも読み込める");

    assert!(catalog.patterns.is_empty());
    assert!(catalog.features.is_empty());

    let result = lookup("A12345", None, &catalog.patterns, &catalog.approved_guitars).unwrap();
    assert_eq!(result.parse.confidence_tier, ConfidenceTier::Low);
}

#[test]
fn test_custom_quiz_categories() {
    let dir = tempdir().expect("Failed to create temp dir");
    sample_catalog_dir(dir.path());
    write(
        dir.path(),
        catalog::QUIZ_CATEGORIES_FILE,
        r#"[{"key": "tuner_type", "label": "Tuners"}, {"key": "label_color", "label": "Label"}]"#,
    );

    let catalog = Catalog::load(dir.path()).unwrap();
    let flow = QuizFlow::new(&catalog.quiz_categories, &catalog.features, &catalog.associations);
    let labels: Vec<&str> = flow.categories().iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["Tuners", "Label"]);
}

#[test]
fn test_lookup_against_loaded_catalog() {
    let dir = tempdir().expect("Failed to create temp dir");
    sample_catalog_dir(dir.path());
    let catalog = Catalog::load(dir.path()).unwrap();

    let result = lookup("a12345", None, &catalog.patterns, &catalog.approved_guitars).unwrap();
    assert!(result.exact_match);
    assert_eq!(result.parse.confidence_percent, 95);
    assert_eq!(result.parse.year_range_display, "1975-1980");
    assert_eq!(result.similar_guitars.len(), 2);
    assert_eq!(result.matched_models[0].name, "YW-500");
    assert!(result.parse.notes.contains("Dealer catalog"));
}

#[test]
fn test_ambiguous_neck_block_with_production_window() {
    let dir = tempdir().expect("Failed to create temp dir");
    sample_catalog_dir(dir.path());
    let catalog = Catalog::load(dir.path()).unwrap();

    let result = lookup("A55555", Some("7"), &catalog.patterns, &catalog.approved_guitars).unwrap();
    assert_eq!(result.parse.estimated_year, None);
    assert_eq!(report::production_hint(&result), Some(1996));
}
