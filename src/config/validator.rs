use crate::config::Config;
use crate::error::{Result, ScoutError, ValidationError};

const SUPPORTED_SCHEMA: &str = "1.0.0";
const REFRESH_VALUES: [&str; 3] = ["true", "false", "wait_for"];

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration, reporting every violation at once
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_engine(config, &mut errors);
        Self::validate_profiles(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ScoutError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != SUPPORTED_SCHEMA {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_engine(config: &Config, errors: &mut Vec<ValidationError>) {
        if let Some(refresh) = &config.engine.document_refresh {
            Self::validate_refresh("engine.document_refresh", refresh, errors);
        }
    }

    fn validate_profiles(config: &Config, errors: &mut Vec<ValidationError>) {
        for (name, overrides) in &config.profiles {
            if let Some(refresh) = &overrides.document_refresh {
                let path = format!("profiles.{}.document_refresh", name);
                Self::validate_refresh(&path, refresh, errors);
            }
        }
    }

    fn validate_refresh(path: &str, value: &str, errors: &mut Vec<ValidationError>) {
        if !REFRESH_VALUES.contains(&value) {
            errors.push(ValidationError::new(
                path,
                format!(
                    "Refresh must be one of {:?}, got '{}'",
                    REFRESH_VALUES, value
                ),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = Config::default();
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_invalid_refresh() {
        let mut config = Config::default();
        config.engine.document_refresh = Some("sometimes".to_string());
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_all_errors_are_collected() {
        let mut config = Config::default();
        config.meta.schema_version = "0.9.0".to_string();
        config.engine.document_refresh = Some("never".to_string());

        match ConfigValidator::validate(&config) {
            Err(ScoutError::ConfigValidation { errors }) => {
                let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
                assert_eq!(paths, vec!["_meta.schema_version", "engine.document_refresh"]);
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }
}
