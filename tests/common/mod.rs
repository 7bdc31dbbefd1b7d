#![allow(dead_code)]

use scout_elastic::model::{
    IndexConfigurator, RecordProvider, RecordQuery, SearchableModel, SearchableRecord,
};
use scout_elastic::rules::SearchRule;
use scout_elastic::Result;
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};

pub struct BooksIndex {
    pub migratable: bool,
}

impl IndexConfigurator for BooksIndex {
    fn name(&self) -> String {
        "books".to_string()
    }

    fn is_migratable(&self) -> bool {
        self.migratable
    }
}

/// Test record type stored in the `books` index.
#[derive(Default)]
pub struct BookModel {
    pub soft_delete: bool,
    pub migratable: bool,
    pub rules: Vec<SearchRule>,
    pub mapping: Option<Value>,
    pub without_index: bool,
}

impl BookModel {
    pub fn shared(self) -> Arc<dyn SearchableModel> {
        Arc::new(self)
    }
}

impl SearchableModel for BookModel {
    fn searchable_as(&self) -> String {
        "book".to_string()
    }

    fn index_configurator(&self) -> Option<Arc<dyn IndexConfigurator>> {
        if self.without_index {
            return None;
        }
        Some(Arc::new(BooksIndex {
            migratable: self.migratable,
        }))
    }

    fn uses_soft_delete(&self) -> bool {
        self.soft_delete
    }

    fn search_rules(&self) -> Vec<SearchRule> {
        self.rules.clone()
    }

    fn mapping(&self) -> Value {
        self.mapping.clone().unwrap_or_else(|| json!({}))
    }
}

pub fn book_model() -> Arc<dyn SearchableModel> {
    BookModel::default().shared()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: u64,
    pub title: String,
    pub trashed: bool,
}

impl Book {
    pub fn new(id: u64, title: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            trashed: false,
        }
    }

    pub fn trashed(mut self) -> Self {
        self.trashed = true;
        self
    }
}

impl SearchableRecord for Book {
    fn scout_key(&self) -> Value {
        json!(self.id)
    }

    fn to_searchable_array(&self) -> Map<String, Value> {
        let mut map = Map::new();
        if !self.title.is_empty() {
            map.insert("id".to_string(), json!(self.id));
            map.insert("title".to_string(), json!(self.title));
        }
        map
    }

    fn is_trashed(&self) -> bool {
        self.trashed
    }
}

/// In-memory record store that remembers every lookup.
pub struct BookShelf {
    pub books: Vec<Book>,
    pub queries: Mutex<Vec<RecordQuery>>,
}

impl BookShelf {
    pub fn new(books: Vec<Book>) -> Self {
        Self {
            books,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn last_query(&self) -> Option<RecordQuery> {
        self.queries.lock().unwrap().last().cloned()
    }
}

impl RecordProvider for BookShelf {
    type Record = Book;

    fn fetch(&self, query: &RecordQuery) -> Result<Vec<Book>> {
        self.queries.lock().unwrap().push(query.clone());

        Ok(self
            .books
            .iter()
            .filter(|book| query.with_trashed || !book.trashed)
            .filter(|book| query.ids.contains(&json!(book.id)))
            .cloned()
            .collect())
    }
}

/// Search response with one hit per `(id, score)` pair.
pub fn hits_response(hits: &[(u64, f64)]) -> Value {
    let hits: Vec<Value> = hits
        .iter()
        .map(|(id, score)| {
            json!({
                "_id": id.to_string(),
                "_score": score,
                "_source": {"id": id, "title": format!("book {}", id)},
            })
        })
        .collect();

    json!({"hits": {"total": {"value": hits.len()}, "hits": hits}})
}
