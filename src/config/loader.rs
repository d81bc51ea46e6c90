//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ServiceConfig, ConfigError> {
    let config: ServiceConfig = toml::from_str(content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LocalePrefixMode;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            [listener]
            bind_address = "127.0.0.1:8080"

            [upstream]
            address = "127.0.0.1:3000"

            [routing]
            locales = ["en", "de", "fr"]
            default_locale = "en"
            locale_prefix = "always"

            [routing.prefixes]
            fr = "/francais"

            [[routing.domains]]
            domain = "example.de"
            default_locale = "de"
            locales = ["de"]

            [routing.pathnames]
            "/about" = { de = "/ueber-uns", fr = "/a-propos" }
            "/blog/[...slug]" = "/blog/[...slug]"
            "#,
        )
        .unwrap();

        assert_eq!(config.routing.locale_prefix, LocalePrefixMode::Always);
        assert_eq!(config.routing.domains.len(), 1);
        assert_eq!(config.routing.pathnames.len(), 2);
        assert_eq!(config.routing.prefixes["fr"], "/francais");
    }

    #[test]
    fn test_validation_errors_are_reported() {
        let err = parse_config(
            r#"
            [routing]
            locales = ["en"]
            default_locale = "de"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().starts_with("Validation failed: "));
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[routing\nlocales = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_example_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("locale-router.example.toml");
        let config = load_config(&path).unwrap();
        assert_eq!(config.routing.domains.len(), 3);
        assert_eq!(config.routing.prefixes["en-GB"], "/uk");
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/locale-router.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
