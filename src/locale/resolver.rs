//! Locale resolution cascade.
//!
//! Steps are tried in order, first hit wins:
//! 1. explicit path prefix
//! 2. domain default (domain matched, no prefix)
//! 3. locale cookie (detection enabled)
//! 4. `Accept-Language` (detection enabled)
//! 5. domain default, else global default

use std::fmt;

use serde::Serialize;

use crate::locale::negotiation::{negotiate, LanguagePreference};
use crate::locale::set::{Domain, LocaleSet};

/// Where the resolved locale came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocaleSource {
    Prefix,
    Cookie,
    Header,
    DomainDefault,
    GlobalDefault,
}

impl LocaleSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocaleSource::Prefix => "prefix",
            LocaleSource::Cookie => "cookie",
            LocaleSource::Header => "header",
            LocaleSource::DomainDefault => "domain-default",
            LocaleSource::GlobalDefault => "global-default",
        }
    }
}

impl fmt::Display for LocaleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resolved locale and its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub locale: String,
    pub source: LocaleSource,
}

impl Resolution {
    fn new(locale: &str, source: LocaleSource) -> Self {
        Self {
            locale: locale.to_string(),
            source,
        }
    }
}

/// Everything the cascade looks at for one request.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub locales: &'a LocaleSet,
    pub default_locale: &'a str,
    pub locale_detection: bool,
    pub domain: Option<&'a Domain>,
    /// Locale named by the path prefix, if any.
    pub prefix: Option<&'a str>,
    pub cookie: Option<&'a str>,
    pub preferences: &'a [LanguagePreference],
}

impl<'a> ResolveContext<'a> {
    /// Locales acceptable for this request: the matched domain's set, or
    /// the global set.
    fn allowed(&self) -> &'a LocaleSet {
        match self.domain {
            Some(domain) => domain.locale_set(self.locales),
            None => self.locales,
        }
    }
}

type Step = fn(&ResolveContext<'_>) -> Option<Resolution>;

const CASCADE: [Step; 4] = [from_prefix, from_domain, from_cookie, from_header];

/// Run the cascade. Always yields a locale.
pub fn resolve(ctx: &ResolveContext<'_>) -> Resolution {
    CASCADE
        .iter()
        .find_map(|step| step(ctx))
        .unwrap_or_else(|| fallback(ctx))
}

fn from_prefix(ctx: &ResolveContext<'_>) -> Option<Resolution> {
    let locale = ctx.allowed().find(ctx.prefix?)?;
    Some(Resolution::new(locale, LocaleSource::Prefix))
}

fn from_domain(ctx: &ResolveContext<'_>) -> Option<Resolution> {
    if ctx.prefix.is_some() {
        return None;
    }
    let domain = ctx.domain?;
    Some(Resolution::new(&domain.default_locale, LocaleSource::DomainDefault))
}

fn from_cookie(ctx: &ResolveContext<'_>) -> Option<Resolution> {
    if !ctx.locale_detection {
        return None;
    }
    let locale = ctx.allowed().find(ctx.cookie?)?;
    Some(Resolution::new(locale, LocaleSource::Cookie))
}

fn from_header(ctx: &ResolveContext<'_>) -> Option<Resolution> {
    if !ctx.locale_detection {
        return None;
    }
    let locale = negotiate(ctx.preferences, ctx.allowed())?;
    Some(Resolution::new(locale, LocaleSource::Header))
}

fn fallback(ctx: &ResolveContext<'_>) -> Resolution {
    match ctx.domain {
        Some(domain) => Resolution::new(&domain.default_locale, LocaleSource::DomainDefault),
        None => Resolution::new(ctx.default_locale, LocaleSource::GlobalDefault),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::negotiation::parse_accept_language;

    fn context<'a>(locales: &'a LocaleSet, preferences: &'a [LanguagePreference]) -> ResolveContext<'a> {
        ResolveContext {
            locales,
            default_locale: "en",
            locale_detection: true,
            domain: None,
            prefix: None,
            cookie: None,
            preferences,
        }
    }

    #[test]
    fn test_prefix_beats_cookie_and_header() {
        let locales = LocaleSet::new(["en", "de", "fr"]);
        let prefs = parse_accept_language("fr");
        let ctx = ResolveContext {
            prefix: Some("de"),
            cookie: Some("fr"),
            ..context(&locales, &prefs)
        };
        assert_eq!(resolve(&ctx), Resolution::new("de", LocaleSource::Prefix));
    }

    #[test]
    fn test_cookie_beats_header() {
        let locales = LocaleSet::new(["en", "de", "fr"]);
        let prefs = parse_accept_language("fr");
        let ctx = ResolveContext {
            cookie: Some("DE"),
            ..context(&locales, &prefs)
        };
        assert_eq!(resolve(&ctx), Resolution::new("de", LocaleSource::Cookie));
    }

    #[test]
    fn test_invalid_cookie_is_ignored() {
        let locales = LocaleSet::new(["en", "de"]);
        let prefs = parse_accept_language("de");
        let ctx = ResolveContext {
            cookie: Some("xx"),
            ..context(&locales, &prefs)
        };
        assert_eq!(resolve(&ctx), Resolution::new("de", LocaleSource::Header));
    }

    #[test]
    fn test_detection_disabled_skips_cookie_and_header() {
        let locales = LocaleSet::new(["en", "de"]);
        let prefs = parse_accept_language("de");
        let ctx = ResolveContext {
            locale_detection: false,
            cookie: Some("de"),
            ..context(&locales, &prefs)
        };
        assert_eq!(resolve(&ctx), Resolution::new("en", LocaleSource::GlobalDefault));
    }

    #[test]
    fn test_domain_default_wins_without_prefix() {
        let locales = LocaleSet::new(["en", "fr"]);
        let domain = Domain {
            name: "ca.example.com".into(),
            default_locale: "fr".into(),
            locales: None,
        };
        let prefs = parse_accept_language("en");
        let ctx = ResolveContext {
            domain: Some(&domain),
            cookie: Some("en"),
            ..context(&locales, &prefs)
        };
        assert_eq!(resolve(&ctx), Resolution::new("fr", LocaleSource::DomainDefault));
    }

    #[test]
    fn test_prefix_outside_domain_falls_back() {
        let locales = LocaleSet::new(["en", "fr"]);
        let domain = Domain {
            name: "us.example.com".into(),
            default_locale: "en".into(),
            locales: Some(LocaleSet::new(["en"])),
        };
        let prefs = parse_accept_language("fr");
        let ctx = ResolveContext {
            domain: Some(&domain),
            prefix: Some("fr"),
            ..context(&locales, &prefs)
        };
        // The header is restricted to the domain's locales as well.
        assert_eq!(resolve(&ctx), Resolution::new("en", LocaleSource::DomainDefault));
    }
}
