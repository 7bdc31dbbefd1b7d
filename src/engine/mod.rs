//! Search engine facade
//!
//! [`ElasticEngine`] compiles builders with the [`QueryCompiler`], sends the
//! payloads through a [`Transport`], maps hits back to records and delegates
//! writes to the configured [`Indexer`].
//!
//! Searches try each compiled payload in rule order and stop at the first one
//! with hits. `count`, `explain` and `profile` follow the same loop.

mod cache;
mod compiler;
mod results;

pub use cache::MappingCache;
pub use compiler::{CompileOptions, QueryCompiler};
pub use results::{total_count, Page, SearchResults};

use crate::builder::FilterBuilder;
use crate::config::{Config, IndexerKind};
use crate::error::{Result, ScoutError};
use crate::indexer::{BulkIndexer, Indexer, IndexerOptions, SingleIndexer};
use crate::model::{
    key_string, Highlight, RecordProvider, RecordQuery, ScoredRecord, SearchableModel,
    SearchableRecord, SOFT_DELETED_FIELD,
};
use crate::payload::{PayloadDocument, TypePayload};
use crate::transport::Transport;
use ahash::AHashMap;
use serde_json::{json, Value};
use std::sync::Arc;

/// Entry point tying builders, transport and indexer together.
pub struct ElasticEngine {
    transport: Arc<dyn Transport>,
    indexer: Box<dyn Indexer>,
    update_mapping: bool,
    soft_delete: bool,
    mappings: Arc<MappingCache>,
}

impl ElasticEngine {
    pub fn new(
        transport: Arc<dyn Transport>,
        indexer: Box<dyn Indexer>,
        update_mapping: bool,
        soft_delete: bool,
    ) -> Self {
        Self {
            transport,
            indexer,
            update_mapping,
            soft_delete,
            mappings: Arc::new(MappingCache::new()),
        }
    }

    /// Engine configured from the `[engine]` section.
    pub fn from_config(config: &Config, transport: Arc<dyn Transport>) -> Self {
        let options = IndexerOptions {
            document_refresh: config.engine.document_refresh.clone(),
            soft_delete: config.engine.soft_delete,
        };

        let indexer: Box<dyn Indexer> = match config.engine.indexer {
            IndexerKind::Single => Box::new(SingleIndexer::new(options)),
            IndexerKind::Bulk => Box::new(BulkIndexer::new(options)),
        };

        tracing::debug!("Using {:?} indexer", config.engine.indexer);
        Self::new(
            transport,
            indexer,
            config.engine.update_mapping,
            config.engine.soft_delete,
        )
    }

    /// Share a mapping cache between engines (or reset it in tests).
    pub fn with_mapping_cache(mut self, cache: Arc<MappingCache>) -> Self {
        self.mappings = cache;
        self
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn mapping_cache(&self) -> &Arc<MappingCache> {
        &self.mappings
    }

    /// Builder for `model`: filter mode for `"*"`, search mode otherwise.
    /// Soft-deleted records are excluded when both the engine and the type
    /// use soft delete.
    pub fn builder(&self, model: Arc<dyn SearchableModel>, query: &str) -> FilterBuilder {
        let soft_delete = self.soft_delete && model.uses_soft_delete();
        FilterBuilder::for_query(model, query, soft_delete)
    }

    // ---- searching ----

    pub fn search(&self, builder: &FilterBuilder) -> Result<SearchResults> {
        self.perform_search(builder, CompileOptions::default())
    }

    pub fn explain(&self, builder: &FilterBuilder) -> Result<SearchResults> {
        self.perform_search(builder, CompileOptions::explain())
    }

    pub fn profile(&self, builder: &FilterBuilder) -> Result<SearchResults> {
        self.perform_search(builder, CompileOptions::profile())
    }

    /// Search for page `page` (1-based) of `per_page` hits.
    pub fn paginate(
        &self,
        builder: &FilterBuilder,
        per_page: usize,
        page: usize,
    ) -> Result<SearchResults> {
        let offset = page
            .saturating_sub(1)
            .checked_mul(per_page)
            .ok_or_else(|| {
                ScoutError::InvalidArgument(format!(
                    "Page {} of {} hits is out of range",
                    page, per_page
                ))
            })?;
        let builder = builder.clone().from(offset).take(per_page);
        self.perform_search(&builder, CompileOptions::default())
    }

    /// Number of matching documents, from the first payload that matches any.
    pub fn count(&self, builder: &FilterBuilder) -> Result<u64> {
        let mut count = 0;
        for payload in QueryCompiler::compile(builder, &CompileOptions::without_highlight())? {
            let response = self.transport.count(&payload)?;
            count = response.get("count").and_then(Value::as_u64).unwrap_or(0);
            if count > 0 {
                break;
            }
        }
        Ok(count)
    }

    /// Send `query` as the body of a search on the type's index.
    pub fn search_raw(&self, model: &dyn SearchableModel, query: Value) -> Result<Value> {
        let mut payload = TypePayload::new(model)?;
        payload.set_if_not_empty("body", query);
        self.transport.search(&payload.into_value())
    }

    fn perform_search(&self, builder: &FilterBuilder, options: CompileOptions) -> Result<SearchResults> {
        if let Some(callback) = builder.callback() {
            let response = callback(self.transport.as_ref(), builder.query(), &options)?;
            return Ok(SearchResults::new(None, response));
        }

        let mut results = SearchResults::default();
        for payload in QueryCompiler::compile(builder, &options)? {
            let response = self.transport.search(&payload)?;
            results = SearchResults::new(Some(payload), response);
            if results.total_count() > 0 {
                break;
            }
        }
        Ok(results)
    }

    // ---- mapping results ----

    /// Records for the hits, in hit order. Hits without a stored record are
    /// dropped.
    pub fn map<P>(
        &self,
        builder: &FilterBuilder,
        results: &SearchResults,
        provider: &P,
    ) -> Result<Vec<ScoredRecord<P::Record>>>
    where
        P: RecordProvider,
    {
        if results.total_count() == 0 {
            return Ok(Vec::new());
        }

        let model = builder.model();
        let key_name = model.scout_key_name();

        let columns = results.selected_columns().map(|mut columns| {
            columns.push(key_name.clone());
            columns
        });

        let query = RecordQuery {
            ids: self.map_ids(results, &key_name),
            key_name,
            columns,
            with_trashed: model.uses_soft_delete(),
            relations: builder.relations().to_vec(),
        };

        let records: AHashMap<String, P::Record> = provider
            .fetch(&query)?
            .into_iter()
            .filter_map(|record| key_string(&record.scout_key()).map(|key| (key, record)))
            .collect();

        let mut mapped = Vec::with_capacity(records.len());
        for hit in results.hits() {
            let Some(record) = hit
                .get("_id")
                .and_then(key_string)
                .and_then(|id| records.get(&id).cloned())
            else {
                continue;
            };

            let mut scored = ScoredRecord::new(record);
            if builder.wants_scores() {
                scored.score = hit.get("_score").and_then(Value::as_f64);
            }
            scored.highlight = hit.get("highlight").and_then(Highlight::from_value);
            scored.sort = hit.get("sort").cloned();
            mapped.push(scored);
        }

        Ok(mapped)
    }

    /// `_source.<key>` of every hit that carries one.
    pub fn map_ids(&self, results: &SearchResults, key_name: &str) -> Vec<Value> {
        results
            .hits()
            .iter()
            .filter_map(|hit| hit.get("_source").and_then(|source| source.get(key_name)))
            .cloned()
            .collect()
    }

    pub fn total_count(&self, results: &SearchResults) -> u64 {
        results.total_count()
    }

    // ---- writes ----

    /// Index `records`, pushing the type's mapping first if this engine has
    /// not done so yet.
    pub fn update<R>(&self, model: &dyn SearchableModel, records: &[R]) -> Result<()>
    where
        R: SearchableRecord,
    {
        if self.update_mapping && !records.is_empty() {
            self.update_mapping_once(model)?;
        }

        let records: Vec<&dyn SearchableRecord> =
            records.iter().map(|r| r as &dyn SearchableRecord).collect();
        self.indexer.update(self.transport.as_ref(), model, &records)
    }

    pub fn delete<R>(&self, model: &dyn SearchableModel, records: &[R]) -> Result<()>
    where
        R: SearchableRecord,
    {
        let records: Vec<&dyn SearchableRecord> =
            records.iter().map(|r| r as &dyn SearchableRecord).collect();
        self.indexer.delete(self.transport.as_ref(), model, &records)
    }

    fn update_mapping_once(&self, model: &dyn SearchableModel) -> Result<()> {
        let type_name = model.searchable_as();
        if self.mappings.contains(&type_name) {
            return Ok(());
        }

        let mut mapping = TypePayload::new(model)?;
        mapping.set("body", model.mapping());
        if self.soft_delete && model.uses_soft_delete() {
            mapping.set(
                &format!("body.properties.{}", SOFT_DELETED_FIELD),
                json!({"type": "integer"}),
            );
        }

        if mapping.get("body").map_or(true, crate::payload::is_empty_value) {
            tracing::debug!("No mapping declared for {}, skipping update", type_name);
        } else {
            if mapping.configurator().is_migratable() {
                mapping.use_alias("write");
            }
            self.transport.put_mapping(&mapping.into_value())?;
            tracing::info!("Updated mapping for {}", type_name);
        }

        self.mappings.mark(&type_name);
        Ok(())
    }
}

impl std::fmt::Debug for ElasticEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticEngine")
            .field("update_mapping", &self.update_mapping)
            .field("soft_delete", &self.soft_delete)
            .field("mappings", &self.mappings)
            .finish()
    }
}
