//! scout-elastic - fluent Elasticsearch query builder
//!
//! Chained filter/search calls on a [`FilterBuilder`](builder::FilterBuilder)
//! are compiled into Elasticsearch query DSL payloads, dispatched through a
//! [`Transport`](transport::Transport) and mapped back onto application
//! records. Indexing goes through single or bulk [`Indexer`](indexer::Indexer)s.

pub mod builder;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod indexer;
pub mod model;
pub mod payload;
pub mod rules;
pub mod transport;

pub use error::{Result, ScoutError};
