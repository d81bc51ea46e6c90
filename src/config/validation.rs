//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (domains and pathnames reference known locales)
//! - Validate value ranges and addresses
//! - Compile pathname patterns to surface malformed ones
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::uri::Authority;
use thiserror::Error;

use crate::config::schema::{RoutingConfig, ServiceConfig};
use crate::locale::LocaleSet;
use crate::routing::pathnames::PathnameTable;
use crate::routing::pattern::PatternError;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("at least one locale must be configured")]
    NoLocales,

    #[error("locale `{0}` is listed more than once")]
    DuplicateLocale(String),

    #[error("locale `{0}` is not a valid path segment")]
    InvalidLocale(String),

    #[error("default locale `{0}` is not one of the configured locales")]
    UnknownDefaultLocale(String),

    #[error("custom prefix configured for unknown locale `{0}`")]
    PrefixForUnknownLocale(String),

    #[error("prefix `{prefix}` for `{locale}` must be a single path segment starting with `/`")]
    InvalidPrefix { locale: String, prefix: String },

    #[error("prefix `{prefix}` is used by both `{first}` and `{second}`")]
    DuplicatePrefix {
        prefix: String,
        first: String,
        second: String,
    },

    #[error("domain name must not be empty")]
    EmptyDomain,

    #[error("domain `{0}` is configured more than once")]
    DuplicateDomain(String),

    #[error("domain `{domain}` references unknown locale `{locale}`")]
    DomainLocaleUnknown { domain: String, locale: String },

    #[error("default locale `{locale}` of domain `{domain}` is not among its locales")]
    DomainDefaultNotServed { domain: String, locale: String },

    #[error("invalid pathname pattern: {0}")]
    Pattern(#[from] PatternError),

    #[error("pathname `{internal}` references unknown locale `{locale}`")]
    PathnameLocaleUnknown { internal: String, locale: String },

    #[error("pathname `{external}` does not declare the same parameters (names and kinds) as `{internal}`")]
    PathnameParamsMismatch { internal: String, external: String },

    #[error("cookie name `{0}` is not a valid cookie token")]
    InvalidCookieName(String),

    #[error("default scheme must be `http` or `https`, got `{0}`")]
    InvalidScheme(String),

    #[error("bind address `{0}` is not a valid socket address")]
    InvalidBindAddress(String),

    #[error("upstream address `{0}` is not a valid authority")]
    InvalidUpstream(String),

    #[error("max_connections must be greater than zero")]
    ZeroConnections,

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
}

/// Validate a full service configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroConnections);
    }
    if Authority::from_str(&config.upstream.address).is_err() {
        errors.push(ValidationError::InvalidUpstream(config.upstream.address.clone()));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if let Err(routing_errors) = validate_routing(&config.routing) {
        errors.extend(routing_errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate the locale routing section on its own.
pub fn validate_routing(routing: &RoutingConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if routing.locales.is_empty() {
        errors.push(ValidationError::NoLocales);
    }
    let mut seen = HashSet::new();
    for locale in &routing.locales {
        if !is_valid_locale(locale) {
            errors.push(ValidationError::InvalidLocale(locale.clone()));
        }
        if !seen.insert(locale.to_ascii_lowercase()) {
            errors.push(ValidationError::DuplicateLocale(locale.clone()));
        }
    }
    let locales = LocaleSet::new(routing.locales.iter().cloned());

    if !locales.contains(&routing.default_locale) {
        errors.push(ValidationError::UnknownDefaultLocale(
            routing.default_locale.clone(),
        ));
    }

    validate_prefixes(routing, &locales, &mut errors);
    validate_domains(routing, &locales, &mut errors);

    if let Err(pathname_errors) = PathnameTable::compile(&routing.pathnames, &locales) {
        errors.extend(pathname_errors);
    }

    if !is_valid_cookie_name(&routing.cookie.name) {
        errors.push(ValidationError::InvalidCookieName(routing.cookie.name.clone()));
    }
    if routing.default_scheme != "http" && routing.default_scheme != "https" {
        errors.push(ValidationError::InvalidScheme(routing.default_scheme.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_prefixes(routing: &RoutingConfig, locales: &LocaleSet, errors: &mut Vec<ValidationError>) {
    // Effective prefix segment of every locale, custom or not.
    let mut owners: Vec<(String, &str)> = Vec::new();

    for (locale, prefix) in &routing.prefixes {
        if !locales.contains(locale) {
            errors.push(ValidationError::PrefixForUnknownLocale(locale.clone()));
        }
        let valid = prefix
            .strip_prefix('/')
            .is_some_and(|segment| is_valid_locale(segment));
        if !valid {
            errors.push(ValidationError::InvalidPrefix {
                locale: locale.clone(),
                prefix: prefix.clone(),
            });
        }
    }

    for locale in locales.iter() {
        let segment = routing
            .prefixes
            .iter()
            .find(|(l, _)| l.eq_ignore_ascii_case(locale))
            .map(|(_, p)| p.trim_start_matches('/').to_ascii_lowercase())
            .unwrap_or_else(|| locale.to_ascii_lowercase());
        if let Some((_, first)) = owners.iter().find(|(s, _)| *s == segment) {
            errors.push(ValidationError::DuplicatePrefix {
                prefix: format!("/{segment}"),
                first: first.to_string(),
                second: locale.to_string(),
            });
        } else {
            owners.push((segment, locale));
        }
    }
}

fn validate_domains(routing: &RoutingConfig, locales: &LocaleSet, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();

    for domain in &routing.domains {
        let name = domain.domain.trim().to_ascii_lowercase();
        if name.is_empty() {
            errors.push(ValidationError::EmptyDomain);
            continue;
        }
        if !seen.insert(name.clone()) {
            errors.push(ValidationError::DuplicateDomain(name.clone()));
        }

        if !locales.contains(&domain.default_locale) {
            errors.push(ValidationError::DomainLocaleUnknown {
                domain: name.clone(),
                locale: domain.default_locale.clone(),
            });
        }

        if let Some(restricted) = &domain.locales {
            for locale in restricted {
                if !locales.contains(locale) {
                    errors.push(ValidationError::DomainLocaleUnknown {
                        domain: name.clone(),
                        locale: locale.clone(),
                    });
                }
            }
            let serves_default = restricted
                .iter()
                .any(|l| l.eq_ignore_ascii_case(&domain.default_locale));
            if !serves_default {
                errors.push(ValidationError::DomainDefaultNotServed {
                    domain: name.clone(),
                    locale: domain.default_locale.clone(),
                });
            }
        }
    }
}

fn is_valid_locale(locale: &str) -> bool {
    !locale.is_empty()
        && locale
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// RFC 6265 token characters.
fn is_valid_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_graphic() && !"()<>@,;:\\\"/[]?={}".contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{DomainConfig, PathnameConfig};
    use std::collections::BTreeMap;

    fn routing(locales: &[&str], default_locale: &str) -> RoutingConfig {
        RoutingConfig {
            locales: locales.iter().map(|l| l.to_string()).collect(),
            default_locale: default_locale.to_string(),
            ..RoutingConfig::default()
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ServiceConfig::default()), Ok(()));
    }

    #[test]
    fn test_unknown_default_locale() {
        let errors = validate_routing(&routing(&["en", "de"], "fr")).unwrap_err();
        assert_eq!(errors, vec![ValidationError::UnknownDefaultLocale("fr".into())]);
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = routing(&["en", "EN", "d e"], "en");
        config.default_scheme = "ftp".into();
        config.cookie.name = "bad name".into();
        let errors = validate_routing(&config).unwrap_err();

        assert!(errors.contains(&ValidationError::DuplicateLocale("EN".into())));
        assert!(errors.contains(&ValidationError::InvalidLocale("d e".into())));
        assert!(errors.contains(&ValidationError::InvalidScheme("ftp".into())));
        assert!(errors.contains(&ValidationError::InvalidCookieName("bad name".into())));
    }

    #[test]
    fn test_domain_with_locale_outside_global_set() {
        let mut config = routing(&["en", "fr"], "en");
        config.domains = vec![DomainConfig {
            domain: "us.example.com".into(),
            default_locale: "en".into(),
            locales: Some(vec!["en".into(), "es".into()]),
        }];
        let errors = validate_routing(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::DomainLocaleUnknown {
                domain: "us.example.com".into(),
                locale: "es".into(),
            }]
        );
    }

    #[test]
    fn test_domain_default_must_be_served() {
        let mut config = routing(&["en", "fr"], "en");
        config.domains = vec![DomainConfig {
            domain: "ca.example.com".into(),
            default_locale: "fr".into(),
            locales: Some(vec!["en".into()]),
        }];
        let errors = validate_routing(&config).unwrap_err();
        assert!(matches!(
            errors.as_slice(),
            [ValidationError::DomainDefaultNotServed { .. }]
        ));
    }

    #[test]
    fn test_duplicate_domains() {
        let mut config = routing(&["en"], "en");
        let domain = DomainConfig {
            domain: "example.com".into(),
            default_locale: "en".into(),
            locales: None,
        };
        config.domains = vec![domain.clone(), DomainConfig { domain: "EXAMPLE.com".into(), ..domain }];
        let errors = validate_routing(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::DuplicateDomain("example.com".into())]);
    }

    #[test]
    fn test_custom_prefixes() {
        let mut config = routing(&["en-US", "en-GB"], "en-US");
        config.prefixes = BTreeMap::from([
            ("en-US".to_string(), "/us".to_string()),
            ("en-GB".to_string(), "/us".to_string()),
            ("fr".to_string(), "uk/x".to_string()),
        ]);
        let errors = validate_routing(&config).unwrap_err();

        assert!(errors.contains(&ValidationError::PrefixForUnknownLocale("fr".into())));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::InvalidPrefix { .. })));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::DuplicatePrefix { .. })));
    }

    #[test]
    fn test_prefix_may_not_shadow_another_locale() {
        let mut config = routing(&["en", "de"], "en");
        config.prefixes = BTreeMap::from([("en".to_string(), "/de".to_string())]);
        let errors = validate_routing(&config).unwrap_err();
        assert!(matches!(errors.as_slice(), [ValidationError::DuplicatePrefix { .. }]));
    }

    #[test]
    fn test_malformed_pathname_is_reported() {
        let mut config = routing(&["en", "de"], "en");
        config.pathnames = BTreeMap::from([(
            "/news/[slug".to_string(),
            PathnameConfig::Shared("/news/[slug".to_string()),
        )]);
        let errors = validate_routing(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::Pattern(_))));
    }

    #[test]
    fn test_service_sections() {
        let mut config = ServiceConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.listener.max_connections = 0;
        config.upstream.address = "bad upstream".into();
        config.timeouts.request_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }
}
