use super::{searchable_document, Indexer, IndexerOptions};
use crate::error::Result;
use crate::model::{SearchableModel, SearchableRecord};
use crate::payload::{DocumentPayload, PayloadDocument};
use crate::transport::Transport;
use serde_json::Value;

/// One `index`/`delete` request per record.
#[derive(Debug, Clone, Default)]
pub struct SingleIndexer {
    options: IndexerOptions,
}

impl SingleIndexer {
    pub fn new(options: IndexerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &IndexerOptions {
        &self.options
    }
}

impl Indexer for SingleIndexer {
    fn update(
        &self,
        transport: &dyn Transport,
        model: &dyn SearchableModel,
        records: &[&dyn SearchableRecord],
    ) -> Result<()> {
        for record in records {
            let document = searchable_document(model, *record, &self.options);
            if document.is_empty() {
                tracing::debug!("Skipping record with nothing to index: {}", record.scout_key());
                continue;
            }

            let mut payload = DocumentPayload::new(model, *record)?;
            payload.set("body", Value::Object(document));

            if payload.configurator().is_migratable() {
                payload.use_alias("write");
            }
            payload.set_if_not_empty("refresh", self.options.document_refresh.clone());

            transport.index(&payload.into_value())?;
        }

        Ok(())
    }

    fn delete(
        &self,
        transport: &dyn Transport,
        model: &dyn SearchableModel,
        records: &[&dyn SearchableRecord],
    ) -> Result<()> {
        for record in records {
            let mut payload = DocumentPayload::new(model, *record)?;
            payload
                .set_if_not_empty("refresh", self.options.document_refresh.clone())
                .set("client.ignore", 404);

            transport.delete(&payload.into_value())?;
        }

        Ok(())
    }
}
