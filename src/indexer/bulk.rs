use super::{bulk_failure, searchable_document, Indexer, IndexerOptions};
use crate::error::Result;
use crate::model::{require_configurator, SearchableModel, SearchableRecord};
use crate::payload::{IndexPayload, PayloadDocument, RawPayload};
use crate::transport::Transport;
use serde_json::Value;

/// One bulk request per batch; `body` alternates action and document lines.
#[derive(Debug, Clone, Default)]
pub struct BulkIndexer {
    options: IndexerOptions,
}

impl BulkIndexer {
    pub fn new(options: IndexerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &IndexerOptions {
        &self.options
    }

    fn send(&self, transport: &dyn Transport, payload: IndexPayload) -> Result<()> {
        if !payload.has("body") {
            tracing::debug!("Nothing to send in bulk request");
            return Ok(());
        }

        let response = transport.bulk(&payload.into_value())?;
        match bulk_failure(&response) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Indexer for BulkIndexer {
    fn update(
        &self,
        transport: &dyn Transport,
        model: &dyn SearchableModel,
        records: &[&dyn SearchableRecord],
    ) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut payload = IndexPayload::new(require_configurator(model)?);
        if payload.configurator().is_migratable() {
            payload.use_alias("write");
        }
        payload.set_if_not_empty("refresh", self.options.document_refresh.clone());

        for record in records {
            let document = searchable_document(model, *record, &self.options);
            if document.is_empty() {
                tracing::debug!("Skipping record with nothing to index: {}", record.scout_key());
                continue;
            }

            let mut action = RawPayload::new();
            action.set("index._id", record.scout_key());

            payload
                .add("body", action.into_value())
                .add("body", Value::Object(document));
        }

        tracing::debug!("Bulk indexing {} record(s)", records.len());
        self.send(transport, payload)
    }

    fn delete(
        &self,
        transport: &dyn Transport,
        model: &dyn SearchableModel,
        records: &[&dyn SearchableRecord],
    ) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut payload = IndexPayload::new(require_configurator(model)?);
        for record in records {
            let mut action = RawPayload::new();
            action.set("delete._id", record.scout_key());
            payload.add("body", action.into_value());
        }

        payload
            .set_if_not_empty("refresh", self.options.document_refresh.clone())
            .set("client.ignore", 404);

        self.send(transport, payload)
    }
}
