mod common;

use common::{Book, BookModel};
use scout_elastic::indexer::{BulkIndexer, Indexer, IndexerOptions, SingleIndexer};
use scout_elastic::model::SearchableRecord;
use scout_elastic::transport::{MemoryTransport, Operation};
use scout_elastic::ScoutError;
use serde_json::json;

fn options(refresh: Option<&str>, soft_delete: bool) -> IndexerOptions {
    IndexerOptions {
        document_refresh: refresh.map(str::to_string),
        soft_delete,
    }
}

fn records(books: &[Book]) -> Vec<&dyn SearchableRecord> {
    books.iter().map(|b| b as &dyn SearchableRecord).collect()
}

#[test]
fn test_single_update() {
    let transport = MemoryTransport::new();
    let books = [Book::new(1, "Dune"), Book::new(2, "Solaris")];

    SingleIndexer::default()
        .update(&transport, &BookModel::default(), &records(&books))
        .unwrap();

    assert_eq!(
        transport.requests_for(Operation::Index),
        vec![
            json!({"index": "books", "type": "book", "id": 1, "body": {"id": 1, "title": "Dune"}}),
            json!({"index": "books", "type": "book", "id": 2, "body": {"id": 2, "title": "Solaris"}}),
        ]
    );
}

#[test]
fn test_single_update_with_soft_delete_alias_and_refresh() {
    let transport = MemoryTransport::new();
    let model = BookModel {
        soft_delete: true,
        migratable: true,
        ..BookModel::default()
    };
    let books = [Book::new(1, "Dune"), Book::new(2, "Solaris").trashed()];

    SingleIndexer::new(options(Some("wait_for"), true))
        .update(&transport, &model, &records(&books))
        .unwrap();

    let sent = transport.requests_for(Operation::Index);
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0]["index"], json!("books_write"));
    assert_eq!(sent[0]["refresh"], json!("wait_for"));
    assert_eq!(sent[0]["body"]["__soft_deleted"], json!(0));
    assert_eq!(sent[1]["body"]["__soft_deleted"], json!(1));
}

#[test]
fn test_soft_delete_marker_needs_both_switches() {
    let transport = MemoryTransport::new();
    let model = BookModel {
        soft_delete: true,
        ..BookModel::default()
    };
    let books = [Book::new(1, "Dune")];

    SingleIndexer::new(options(None, false))
        .update(&transport, &model, &records(&books))
        .unwrap();

    let sent = transport.requests_for(Operation::Index);
    assert!(sent[0]["body"].get("__soft_deleted").is_none());
    assert!(sent[0].get("refresh").is_none());
}

#[test]
fn test_single_update_skips_empty_documents() {
    let transport = MemoryTransport::new();
    let books = [Book::new(1, ""), Book::new(2, "Solaris")];

    SingleIndexer::default()
        .update(&transport, &BookModel::default(), &records(&books))
        .unwrap();

    let sent = transport.requests_for(Operation::Index);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["id"], json!(2));
}

#[test]
fn test_single_delete() {
    let transport = MemoryTransport::new();
    let books = [Book::new(7, "Dune")];

    SingleIndexer::new(options(Some("true"), false))
        .delete(&transport, &BookModel::default(), &records(&books))
        .unwrap();

    assert_eq!(
        transport.requests_for(Operation::Delete),
        vec![json!({
            "index": "books",
            "type": "book",
            "id": 7,
            "refresh": "true",
            "client": {"ignore": 404},
        })]
    );
}

#[test]
fn test_bulk_update() {
    let transport = MemoryTransport::new();
    let model = BookModel {
        soft_delete: true,
        migratable: true,
        ..BookModel::default()
    };
    let books = [Book::new(1, "Dune"), Book::new(3, "Solaris").trashed()];

    BulkIndexer::new(options(Some("true"), true))
        .update(&transport, &model, &records(&books))
        .unwrap();

    assert_eq!(
        transport.requests_for(Operation::Bulk),
        vec![json!({
            "index": "books_write",
            "refresh": "true",
            "body": [
                {"index": {"_id": 1}},
                {"id": 1, "title": "Dune", "__soft_deleted": 0},
                {"index": {"_id": 3}},
                {"id": 3, "title": "Solaris", "__soft_deleted": 1},
            ],
        })]
    );
}

#[test]
fn test_bulk_update_with_nothing_to_index() {
    let transport = MemoryTransport::new();
    let books = [Book::new(1, "")];

    let indexer = BulkIndexer::default();
    indexer
        .update(&transport, &BookModel::default(), &records(&books))
        .unwrap();
    indexer
        .update(&transport, &BookModel::default(), &[])
        .unwrap();

    assert!(transport.is_empty());
}

#[test]
fn test_bulk_delete() {
    let transport = MemoryTransport::new();
    let books = [Book::new(1, "Dune"), Book::new(2, "Solaris")];

    BulkIndexer::default()
        .delete(&transport, &BookModel::default(), &records(&books))
        .unwrap();

    assert_eq!(
        transport.requests_for(Operation::Bulk),
        vec![json!({
            "index": "books",
            "body": [{"delete": {"_id": 1}}, {"delete": {"_id": 2}}],
            "client": {"ignore": 404},
        })]
    );
}

#[test]
fn test_bulk_item_errors_are_chained() {
    let transport = MemoryTransport::new();
    transport.respond(
        Operation::Bulk,
        json!({
            "errors": true,
            "items": [
                {"index": {"_id": 1, "error": {"type": "mapper_parsing_exception", "reason": "failed to parse"}}},
                {"index": {"_id": 2, "status": 201}},
                {"index": {"_id": 3, "error": {"type": "version_conflict_engine_exception", "reason": "conflict"}}},
            ],
        }),
    );
    let books = [Book::new(1, "Dune"), Book::new(2, "Solaris"), Book::new(3, "Ubik")];

    let err = BulkIndexer::default()
        .update(&transport, &BookModel::default(), &records(&books))
        .unwrap_err();

    let ScoutError::Bulk { source: Some(last) } = &err else {
        panic!("expected chained bulk error, got {:?}", err);
    };
    let chain: Vec<String> = last.chain().map(ToString::to_string).collect();
    assert_eq!(
        chain,
        vec![
            "version_conflict_engine_exception - conflict".to_string(),
            "mapper_parsing_exception - failed to parse".to_string(),
        ]
    );
}

#[test]
fn test_bulk_success_response() {
    let transport = MemoryTransport::new();
    transport.respond(
        Operation::Bulk,
        json!({"errors": false, "items": [{"index": {"_id": 1, "status": 201}}]}),
    );
    let books = [Book::new(1, "Dune")];

    BulkIndexer::default()
        .update(&transport, &BookModel::default(), &records(&books))
        .unwrap();
}

#[test]
fn test_missing_index_configurator() {
    let transport = MemoryTransport::new();
    let model = BookModel {
        without_index: true,
        ..BookModel::default()
    };
    let books = [Book::new(1, "Dune")];

    let single = SingleIndexer::default().update(&transport, &model, &records(&books));
    let bulk = BulkIndexer::default().update(&transport, &model, &records(&books));

    assert!(matches!(single, Err(ScoutError::MissingIndexConfigurator { .. })));
    assert!(matches!(bulk, Err(ScoutError::MissingIndexConfigurator { .. })));
    assert!(transport.is_empty());
}
