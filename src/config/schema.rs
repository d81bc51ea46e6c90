//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the locale router service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Upstream application receiving rewritten requests.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Locale resolution and URL rewriting rules.
    pub routing: RoutingConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,

    /// Maximum requests handled concurrently (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
            max_connections: 10_000,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// The application the gateway forwards to.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream authority (e.g., "127.0.0.1:3000").
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, for development.
    #[default]
    Pretty,
    /// One JSON object per event, for log aggregation.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Whether and when the locale appears as the first path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LocalePrefixMode {
    /// Only non-default locales carry a prefix.
    #[default]
    AsNeeded,
    /// Every external URL carries a prefix.
    Always,
    /// No external URL carries a prefix.
    Never,
}

impl LocalePrefixMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocalePrefixMode::AsNeeded => "as-needed",
            LocalePrefixMode::Always => "always",
            LocalePrefixMode::Never => "never",
        }
    }
}

/// Locale routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Supported locales, in matching order.
    pub locales: Vec<String>,

    /// Locale used when nothing else applies.
    pub default_locale: String,

    /// Prefix strategy for external URLs.
    pub locale_prefix: LocalePrefixMode,

    /// Custom external prefix per locale (e.g., `en-US = "/us"`).
    pub prefixes: BTreeMap<String, String>,

    /// Use the locale cookie and `Accept-Language` when the URL is silent.
    pub locale_detection: bool,

    /// Attach `Link: rel="alternate"` entries to responses.
    pub alternate_links: bool,

    /// Scheme for absolute URLs when `X-Forwarded-Proto` is absent.
    pub default_scheme: String,

    /// Locale cookie attributes.
    pub cookie: CookieConfig,

    /// Domain-based routing. Empty disables it.
    pub domains: Vec<DomainConfig>,

    /// Internal pathname → localized external pathnames.
    pub pathnames: BTreeMap<String, PathnameConfig>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            locales: vec!["en".to_string()],
            default_locale: "en".to_string(),
            locale_prefix: LocalePrefixMode::AsNeeded,
            prefixes: BTreeMap::new(),
            locale_detection: true,
            alternate_links: true,
            default_scheme: "https".to_string(),
            cookie: CookieConfig::default(),
            domains: Vec::new(),
            pathnames: BTreeMap::new(),
        }
    }
}

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    #[default]
    Lax,
    Strict,
    None,
}

/// Locale cookie settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CookieConfig {
    /// Cookie name.
    pub name: String,

    /// Cookie path attribute.
    pub path: String,

    /// Lifetime in seconds.
    pub max_age_secs: u64,

    pub same_site: SameSite,

    pub secure: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "LOCALE".to_string(),
            path: "/".to_string(),
            max_age_secs: 365 * 24 * 60 * 60,
            same_site: SameSite::Lax,
            secure: false,
        }
    }
}

/// A domain served by the router.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DomainConfig {
    /// Host name without port (e.g., "us.example.com").
    pub domain: String,

    /// Locale for unprefixed requests on this domain.
    pub default_locale: String,

    /// Locales served on this domain. Absent means all locales.
    #[serde(default)]
    pub locales: Option<Vec<String>>,
}

/// External pathname(s) for one internal pathname.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PathnameConfig {
    /// The same external pathname for every locale.
    Shared(String),
    /// One external pathname per locale. Missing locales use the internal one.
    PerLocale(BTreeMap<String, String>),
}
