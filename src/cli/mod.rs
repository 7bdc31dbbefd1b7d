//! CLI command definitions and parsing
use crate::builder::FilterBuilder;
use crate::error::{Result, ScoutError};
use crate::model::{IndexConfigurator, SearchableModel};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "scout-elastic",
    version,
    author = "neur0map",
    about = "Fluent Elasticsearch query builder and payload compiler",
    long_about = "scout-elastic compiles chained filter/search calls into Elasticsearch query DSL \
                  payloads. The CLI manages the engine configuration and prints compiled payloads \
                  for ad-hoc queries."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/scout-elastic/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the payloads an ad-hoc query compiles to
    Compile {
        /// Index name
        #[arg(short, long)]
        index: String,

        /// Record type name (defaults to the index name)
        #[arg(short = 't', long = "type")]
        type_name: Option<String>,

        /// Free-text query; omit or pass "*" for a pure filter
        #[arg(short, long, default_value = "*")]
        query: String,

        /// Condition such as "status=active", "price>=10" or "tag!=draft"
        #[arg(short, long = "where", value_name = "CONDITION")]
        wheres: Vec<String>,

        /// Sort as "field" or "field:desc"
        #[arg(short, long = "order", value_name = "FIELD[:DIR]")]
        orders: Vec<String>,

        /// Fields to return
        #[arg(short, long)]
        select: Vec<String>,

        #[arg(long)]
        from: Option<usize>,

        #[arg(long)]
        size: Option<usize>,

        /// Print every payload instead of request bodies
        #[arg(long)]
        full: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Show only a specific section
        #[arg(short, long)]
        section: Option<String>,

        /// Apply a profile before showing
        #[arg(short, long)]
        profile: Option<String>,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in dot notation (e.g., "engine.indexer")
        key: String,

        /// Value to set (JSON literals are parsed, anything else is a string)
        value: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key in dot notation
        key: String,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Print the configuration file path
    Path,
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Record type described entirely by command-line arguments.
#[derive(Debug, Clone)]
pub struct AdhocModel {
    index: String,
    type_name: String,
}

impl AdhocModel {
    pub fn new(index: impl Into<String>, type_name: Option<String>) -> Self {
        let index = index.into();
        let type_name = type_name.unwrap_or_else(|| index.clone());
        Self { index, type_name }
    }
}

struct AdhocIndex(String);

impl IndexConfigurator for AdhocIndex {
    fn name(&self) -> String {
        self.0.clone()
    }
}

impl SearchableModel for AdhocModel {
    fn searchable_as(&self) -> String {
        self.type_name.clone()
    }

    fn index_configurator(&self) -> Option<Arc<dyn IndexConfigurator>> {
        Some(Arc::new(AdhocIndex(self.index.clone())))
    }
}

/// Split `field<op>value`. Two-character operators are tried first.
pub fn parse_condition(condition: &str) -> Result<(String, String, Value)> {
    const OPERATORS: [&str; 7] = ["!=", "<>", ">=", "<=", "=", ">", "<"];

    let (position, operator) = OPERATORS
        .iter()
        .filter_map(|op| condition.find(op).map(|pos| (pos, *op)))
        .min_by_key(|(pos, op)| (*pos, std::cmp::Reverse(op.len())))
        .ok_or_else(|| {
            ScoutError::InvalidArgument(format!("No operator in condition: {}", condition))
        })?;

    let field = condition[..position].trim();
    if field.is_empty() {
        return Err(ScoutError::InvalidArgument(format!(
            "Missing field in condition: {}",
            condition
        )));
    }

    let raw = condition[position + operator.len()..].trim();
    Ok((field.to_string(), operator.to_string(), parse_value(raw)))
}

/// JSON literal when it parses as one, plain string otherwise.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Builder for the `compile` command.
pub fn adhoc_builder(
    model: AdhocModel,
    query: &str,
    wheres: &[String],
    orders: &[String],
    select: &[String],
    from: Option<usize>,
    size: Option<usize>,
) -> Result<FilterBuilder> {
    let mut builder = FilterBuilder::for_query(Arc::new(model), query, false);

    for condition in wheres {
        let (field, operator, value) = parse_condition(condition)?;
        builder = builder.where_op(field, &operator, value)?;
    }

    for order in orders {
        let (field, direction) = order.split_once(':').unwrap_or((order.as_str(), "asc"));
        builder = builder.order_by(field, direction);
    }

    let builder = builder.select(select.iter().cloned());
    let builder = match from {
        Some(offset) => builder.from(offset),
        None => builder,
    };
    Ok(match size {
        Some(limit) => builder.take(limit),
        None => builder,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_condition() {
        assert_eq!(
            parse_condition("price>=10").unwrap(),
            ("price".to_string(), ">=".to_string(), json!(10))
        );
        assert_eq!(
            parse_condition("status = active").unwrap(),
            ("status".to_string(), "=".to_string(), json!("active"))
        );
        assert_eq!(
            parse_condition("tag<>draft").unwrap(),
            ("tag".to_string(), "<>".to_string(), json!("draft"))
        );
        assert!(parse_condition("no operator").is_err());
        assert!(parse_condition("=value").is_err());
    }

    #[test]
    fn test_adhoc_builder_compiles() {
        let builder = adhoc_builder(
            AdhocModel::new("books", None),
            "*",
            &["author=tolkien".to_string(), "pages>300".to_string()],
            &["published:desc".to_string()],
            &["title".to_string()],
            None,
            Some(5),
        )
        .unwrap();

        let query = builder.to_query().unwrap();
        assert_eq!(query["size"], json!(5));
        assert_eq!(query["_source"], json!(["title"]));
        assert_eq!(query["sort"], json!([{"published": "desc"}]));
        assert_eq!(
            query["query"]["bool"]["filter"]["bool"]["must"],
            json!([{"term": {"author": "tolkien"}}, {"range": {"pages": {"gt": 300}}}])
        );
    }
}
