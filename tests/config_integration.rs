mod common;

use common::{Book, BookModel};
use scout_elastic::config::{Config, IndexerKind};
use scout_elastic::engine::ElasticEngine;
use scout_elastic::transport::{MemoryTransport, Operation};
use scout_elastic::ScoutError;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_save_and_load() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.engine.indexer = IndexerKind::Bulk;
    config.engine.document_refresh = Some("wait_for".to_string());
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.engine.indexer, IndexerKind::Bulk);
    assert_eq!(loaded.engine.document_refresh.as_deref(), Some("wait_for"));
    assert_eq!(loaded.meta.schema_version, "1.0.0");
}

#[test]
fn test_missing_file() {
    let temp = TempDir::new().unwrap();
    let err = Config::load(&temp.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ScoutError::ConfigNotFound { .. }));
}

#[test]
fn test_load_with_profile() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    Config::default().save(&path).unwrap();

    let config = Config::load_with_profile(&path, "bulk_load").unwrap();
    assert_eq!(config.engine.indexer, IndexerKind::Bulk);
    assert_eq!(config.engine.document_refresh.as_deref(), Some("false"));

    let err = Config::load_with_profile(&path, "nope").unwrap_err();
    assert!(matches!(err, ScoutError::Config(_)));
}

#[test]
fn test_invalid_values_are_reported_together() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[_meta]
schema_version = "2.0.0"

[engine]
indexer = "single"
update_mapping = true
soft_delete = false
document_refresh = "sometimes"
"#,
    )
    .unwrap();

    match Config::load(&path) {
        Err(ScoutError::ConfigValidation { errors }) => {
            let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
            assert_eq!(paths, vec!["_meta.schema_version", "engine.document_refresh"]);
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_unknown_indexer_is_a_parse_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[_meta]
schema_version = "1.0.0"

[engine]
indexer = "parallel"
update_mapping = true
soft_delete = false
"#,
    )
    .unwrap();

    assert!(matches!(Config::load(&path), Err(ScoutError::Toml(_))));
}

#[test]
fn test_engine_from_bulk_config() {
    let transport = Arc::new(MemoryTransport::new());
    let mut config = Config::default();
    config.apply_profile("bulk_load").unwrap();

    let engine = ElasticEngine::from_config(&config, transport.clone());
    engine
        .update(&BookModel::default(), &[Book::new(1, "Dune"), Book::new(2, "Solaris")])
        .unwrap();

    let bulk = transport.requests_for(Operation::Bulk);
    assert_eq!(bulk.len(), 1);
    assert_eq!(bulk[0]["refresh"], json!("false"));
    assert!(transport.requests_for(Operation::Index).is_empty());
}

#[test]
fn test_engine_from_default_config() {
    let transport = Arc::new(MemoryTransport::new());
    let mut config = Config::default();
    config.engine.soft_delete = true;

    let engine = ElasticEngine::from_config(&config, transport.clone());
    let model = BookModel {
        soft_delete: true,
        ..BookModel::default()
    };
    engine.update(&model, &[Book::new(1, "Dune")]).unwrap();

    let index = transport.requests_for(Operation::Index);
    assert_eq!(index.len(), 1);
    assert_eq!(index[0]["body"]["__soft_deleted"], json!(0));

    // soft delete adds the marker property even without a declared mapping
    let mappings = transport.requests_for(Operation::PutMapping);
    assert_eq!(
        mappings[0]["body"],
        json!({"properties": {"__soft_deleted": {"type": "integer"}}})
    );
}
