//! Compiled locale router.
//!
//! # Responsibilities
//! - Hold the validated, compiled routing configuration
//! - Run Matcher → Resolver → Decision for one request
//! - Render internal and external paths for any locale
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Pure: the same request always yields the same outcome
//! - Internal paths always carry the locale identifier, external paths
//!   follow the prefix mode and custom prefixes

use serde::Serialize;

use crate::config::loader::ConfigError;
use crate::config::schema::{CookieConfig, LocalePrefixMode, RoutingConfig};
use crate::config::validation::validate_routing;
use crate::locale::{resolve, Domain, LocaleSet, LocaleSource, Resolution, ResolveContext};
use crate::routing::decision::{decide, Action, LocaleCookie};
use crate::routing::links::{alternate_links, AlternateLink};
use crate::routing::matcher::match_request;
use crate::routing::pathnames::{PathnameMatch, PathnameTable};
use crate::routing::request::RequestView;

/// Everything the surrounding layer needs to answer one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub action: Action,
    pub locale: String,
    pub source: LocaleSource,
    /// Matched domain name, if domain routing applied.
    pub domain: Option<String>,
    /// Whether the path carried an explicit locale prefix.
    pub prefixed: bool,
    pub cookie: Option<LocaleCookie>,
    pub alternate_links: Vec<AlternateLink>,
}

impl Outcome {
    /// True when neither a rewrite nor a redirect is needed.
    pub fn is_pass_through(&self) -> bool {
        self.action == Action::PassThrough
    }
}

/// A locale-relative path resolved against the pathname table.
#[derive(Debug, Clone)]
pub(crate) struct Located<'a> {
    pub route: Option<PathnameMatch<'a>>,
    /// Locale-relative path in internal form.
    pub internal: String,
}

/// The compiled routing configuration.
#[derive(Debug, Clone)]
pub struct LocaleRouter {
    locales: LocaleSet,
    default_locale: String,
    prefix_mode: LocalePrefixMode,
    /// External prefix segment per locale, in locale order.
    prefixes: Vec<(String, String)>,
    locale_detection: bool,
    alternate_links: bool,
    default_scheme: String,
    cookie: CookieConfig,
    domains: Vec<Domain>,
    pathnames: PathnameTable,
}

impl LocaleRouter {
    /// Validate and compile a routing configuration.
    pub fn new(config: &RoutingConfig) -> Result<Self, ConfigError> {
        validate_routing(config).map_err(ConfigError::Validation)?;

        let locales = LocaleSet::new(config.locales.iter().cloned());
        let canonical = |locale: &str| -> String {
            locales
                .find(locale)
                .map(str::to_string)
                .unwrap_or_else(|| locale.to_string())
        };

        let prefixes = locales
            .iter()
            .map(|locale| {
                let segment = config
                    .prefixes
                    .iter()
                    .find(|(l, _)| l.eq_ignore_ascii_case(locale))
                    .map(|(_, prefix)| prefix.trim_start_matches('/').to_string())
                    .unwrap_or_else(|| locale.to_string());
                (locale.to_string(), segment)
            })
            .collect();

        let domains = config
            .domains
            .iter()
            .map(|domain| Domain {
                name: domain.domain.trim().to_ascii_lowercase(),
                default_locale: canonical(&domain.default_locale),
                locales: domain
                    .locales
                    .as_ref()
                    .map(|set| LocaleSet::new(set.iter().map(|l| canonical(l)))),
            })
            .collect();

        let pathnames =
            PathnameTable::compile(&config.pathnames, &locales).map_err(ConfigError::Validation)?;

        Ok(Self {
            default_locale: canonical(&config.default_locale),
            prefix_mode: config.locale_prefix,
            prefixes,
            locale_detection: config.locale_detection,
            alternate_links: config.alternate_links,
            default_scheme: config.default_scheme.clone(),
            cookie: config.cookie.clone(),
            domains,
            pathnames,
            locales,
        })
    }

    /// Resolve one request.
    pub fn route(&self, request: &RequestView) -> Outcome {
        let matched = match_request(self, request);

        let resolution = resolve(&ResolveContext {
            locales: &self.locales,
            default_locale: &self.default_locale,
            locale_detection: self.locale_detection,
            domain: matched.domain,
            prefix: matched.prefix.as_ref().map(|p| p.locale.as_str()),
            cookie: request.cookie_locale.as_deref(),
            preferences: &request.preferences,
        });

        // A mismatched prefix is routed for the domain that serves it. When
        // no domain does, the prefix is dropped and the cascade result stands.
        let resolution = match &matched.prefix {
            Some(prefix)
                if matched.domain_mismatch && self.domain_for_locale(&prefix.locale).is_some() =>
            {
                Resolution {
                    locale: prefix.locale.clone(),
                    source: LocaleSource::Prefix,
                }
            }
            _ => resolution,
        };
        let located = self.locate(&resolution.locale, &matched.remaining_path);

        let action = decide(self, &matched, &resolution, &located, request);
        let links = alternate_links(self, matched.default_locale(self), &located, request);
        let cookie = self.cookie_for(&resolution, &action, request);

        Outcome {
            locale: resolution.locale,
            source: resolution.source,
            domain: matched.domain.map(|d| d.name.clone()),
            prefixed: matched.prefix.is_some(),
            action,
            cookie,
            alternate_links: links,
        }
    }

    pub fn locales(&self) -> &LocaleSet {
        &self.locales
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub fn prefix_mode(&self) -> LocalePrefixMode {
        self.prefix_mode
    }

    pub fn locale_detection(&self) -> bool {
        self.locale_detection
    }

    pub fn alternate_links(&self) -> bool {
        self.alternate_links && self.prefix_mode != LocalePrefixMode::Never
    }

    pub fn default_scheme(&self) -> &str {
        &self.default_scheme
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie.name
    }

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    pub fn pathnames(&self) -> &PathnameTable {
        &self.pathnames
    }

    pub(crate) fn domain(&self, hostname: &str) -> Option<&Domain> {
        self.domains
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(hostname))
    }

    /// Domain to send `locale` to: one defaulting to it, else the first serving it.
    pub(crate) fn domain_for_locale(&self, locale: &str) -> Option<&Domain> {
        self.domains
            .iter()
            .find(|d| d.default_locale == locale)
            .or_else(|| self.domains.iter().find(|d| d.serves(locale)))
    }

    pub(crate) fn locale_for_prefix(&self, segment: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|(_, prefix)| prefix.eq_ignore_ascii_case(segment))
            .map(|(locale, _)| locale.as_str())
    }

    fn prefix_segment<'a>(&'a self, locale: &'a str) -> &'a str {
        self.prefixes
            .iter()
            .find(|(l, _)| l == locale)
            .map(|(_, prefix)| prefix.as_str())
            .unwrap_or(locale)
    }

    fn shows_prefix(&self, locale: &str, default_locale: &str) -> bool {
        match self.prefix_mode {
            LocalePrefixMode::Always => true,
            LocalePrefixMode::Never => false,
            LocalePrefixMode::AsNeeded => locale != default_locale,
        }
    }

    pub(crate) fn locate<'a>(&'a self, locale: &str, remaining: &str) -> Located<'a> {
        let found = self
            .pathnames
            .match_external(locale, remaining)
            .or_else(|| self.pathnames.match_internal(remaining));

        match found {
            Some(route) => Located {
                internal: route
                    .entry
                    .internal_path(&route.params)
                    .unwrap_or_else(|| remaining.to_string()),
                route: Some(route),
            },
            None => Located {
                route: None,
                internal: remaining.to_string(),
            },
        }
    }

    /// Locale-relative external path for `locale`, without prefix.
    pub(crate) fn localized_path(&self, locale: &str, located: &Located<'_>) -> String {
        located
            .route
            .as_ref()
            .and_then(|route| route.entry.external_path(locale, &route.params))
            .unwrap_or_else(|| located.internal.clone())
    }

    /// Full external path for `locale` given the applicable default locale.
    pub(crate) fn external_path(&self, locale: &str, default_locale: &str, located: &Located<'_>) -> String {
        let rest = self.localized_path(locale, located);
        if self.shows_prefix(locale, default_locale) {
            join_prefix(self.prefix_segment(locale), &rest)
        } else {
            rest
        }
    }

    /// Internal path: always prefixed with the locale identifier.
    pub(crate) fn internal_path(&self, locale: &str, located: &Located<'_>) -> String {
        join_prefix(locale, &located.internal)
    }

    fn cookie_for(&self, resolution: &Resolution, action: &Action, request: &RequestView) -> Option<LocaleCookie> {
        if !self.locale_detection {
            return None;
        }
        let unchanged = request.cookie_locale.as_deref() == Some(resolution.locale.as_str());
        if unchanged && !action.is_redirect() {
            return None;
        }
        Some(LocaleCookie::new(&self.cookie, &resolution.locale))
    }
}

fn join_prefix(segment: &str, rest: &str) -> String {
    if rest == "/" || rest.is_empty() {
        format!("/{segment}")
    } else {
        format!("/{segment}{rest}")
    }
}
