use scout_elastic::cli::{adhoc_builder, parse_value, AdhocModel, Cli, Commands, ConfigAction};
use scout_elastic::config::{Config, ConfigValidator};
use scout_elastic::error::{Result, ScoutError};
use scout_elastic::payload::{PayloadDocument, RawPayload};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Compile {
            index,
            type_name,
            query,
            wheres,
            orders,
            select,
            from,
            size,
            full,
        } => {
            let model = AdhocModel::new(index, type_name);
            let builder = adhoc_builder(model, &query, &wheres, &orders, &select, from, size)?;
            cmd_compile(&builder, full)?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose {
        "scout_elastic=debug"
    } else {
        "scout_elastic=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_compile(builder: &scout_elastic::builder::FilterBuilder, full: bool) -> Result<()> {
    let output = if full {
        serde_json::Value::Array(builder.build_payload()?)
    } else {
        builder.to_query()?
    };

    println!("{}", to_pretty_json(&output, "Failed to serialize payload")?);
    Ok(())
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show { section, profile } => {
            let config = load_config(config_path, profile)?;
            let value = config_value(&config)?;

            let shown = match section {
                Some(section) => RawPayload::from_value(value)
                    .get(&section)
                    .cloned()
                    .ok_or_else(|| ScoutError::Config(format!("Unknown section: {}", section)))?,
                None => value,
            };

            println!("{}", to_pretty_json(&shown, "Failed to serialize config")?);
        }
        ConfigAction::Set { key, value } => {
            let path = resolve_path(config_path)?;
            let config = if path.exists() {
                Config::load(&path)?
            } else {
                Config::default()
            };

            let mut document = RawPayload::from_value(config_value(&config)?);
            document.set(&key, parse_value(&value));

            let mut updated: Config =
                serde_json::from_value(document.into_value()).map_err(|e| {
                    ScoutError::InvalidConfigValue {
                        path: key.clone(),
                        message: e.to_string(),
                    }
                })?;
            if !RawPayload::from_value(config_value(&updated)?).has(&key) {
                return Err(ScoutError::InvalidConfigValue {
                    path: key,
                    message: "Unknown configuration key".to_string(),
                });
            }
            ConfigValidator::validate(&updated)?;
            updated.touch();
            updated.save(&path)?;

            println!("✓ {} = {}", key, value);
        }
        ConfigAction::Get { key } => {
            let config = load_config(config_path, None)?;
            let document = RawPayload::from_value(config_value(&config)?);
            let value = document.get(&key).ok_or_else(|| ScoutError::InvalidConfigValue {
                path: key.clone(),
                message: "Unknown configuration key".to_string(),
            })?;

            match value {
                serde_json::Value::String(s) => println!("{}", s),
                other => println!("{}", other),
            }
        }
        ConfigAction::Validate { file } => {
            let path = match file {
                Some(file) => file,
                None => resolve_path(config_path)?,
            };
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
            println!("  Indexer: {}", config.engine.indexer);
        }
        ConfigAction::Init { force } => {
            let path = resolve_path(config_path)?;

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            Config::default().save(&path)?;
            println!("✓ Configuration initialized at: {}", path.display());
        }
        ConfigAction::Path => {
            println!("{}", resolve_path(config_path)?.display());
        }
    }

    Ok(())
}

fn resolve_path(config_path: Option<PathBuf>) -> Result<PathBuf> {
    match config_path {
        Some(path) => Ok(path),
        None => Config::default_path(),
    }
}

fn load_config(config_path: Option<PathBuf>, profile: Option<String>) -> Result<Config> {
    let path = resolve_path(config_path)?;

    if !path.exists() {
        tracing::warn!(
            "Config file not found, using defaults. Run 'scout-elastic config init' to create one."
        );
        let mut config = Config::default();
        if let Some(profile) = profile {
            config.apply_profile(&profile)?;
        }
        return Ok(config);
    }

    load_existing(&path, profile)
}

fn load_existing(path: &Path, profile: Option<String>) -> Result<Config> {
    match profile {
        Some(profile) => Config::load_with_profile(path, &profile),
        None => Config::load(path),
    }
}

fn config_value(config: &Config) -> Result<serde_json::Value> {
    serde_json::to_value(config).map_err(|e| ScoutError::Json {
        source: e,
        context: "Failed to serialize config".to_string(),
    })
}

fn to_pretty_json(value: &serde_json::Value, context: &str) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| ScoutError::Json {
        source: e,
        context: context.to_string(),
    })
}
