//! Host and path matching.
//!
//! # Responsibilities
//! - Match the request host against configured domains (case-insensitive, port ignored)
//! - Extract a leading locale prefix segment (case-insensitive)
//! - Flag prefixes the matched domain does not serve
//!
//! # Design Decisions
//! - Unknown host is not an error, prefix-based behavior applies
//! - Only the first segment is inspected, so `/enterprise` never matches `en`
//! - The raw segment is kept so a differently-cased prefix can be canonicalized
//! - Leading slashes of the remaining path collapse to one, so `/en//host`
//!   can never render as the scheme-relative `//host`

use crate::locale::Domain;
use crate::routing::request::RequestView;
use crate::routing::router::LocaleRouter;

/// A locale prefix found in the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixMatch {
    /// Canonical locale identifier.
    pub locale: String,
    /// The segment as written in the request.
    pub segment: String,
}

/// Result of matching one request.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub domain: Option<&'a Domain>,
    pub prefix: Option<PrefixMatch>,
    /// Path with the prefix removed; the full path when there is none.
    pub remaining_path: String,
    /// The path names a locale the matched domain does not serve.
    pub domain_mismatch: bool,
}

impl<'a> RouteMatch<'a> {
    /// Default locale that applies to this request.
    pub fn default_locale(&self, router: &'a LocaleRouter) -> &'a str {
        match self.domain {
            Some(domain) => &domain.default_locale,
            None => router.default_locale(),
        }
    }
}

pub fn match_request<'a>(router: &'a LocaleRouter, request: &RequestView) -> RouteMatch<'a> {
    let domain = request.hostname().and_then(|host| router.domain(host));

    let (prefix, remaining_path) = match split_first_segment(&request.path) {
        Some((segment, rest)) => match router.locale_for_prefix(segment) {
            Some(locale) => (
                Some(PrefixMatch {
                    locale: locale.to_string(),
                    segment: segment.to_string(),
                }),
                collapse_leading_slashes(rest),
            ),
            None => (None, collapse_leading_slashes(&request.path)),
        },
        None => (None, collapse_leading_slashes(&request.path)),
    };

    let domain_mismatch = match (domain, &prefix) {
        (Some(domain), Some(prefix)) => !domain.serves(&prefix.locale),
        _ => false,
    };

    if domain_mismatch {
        tracing::debug!(
            host = ?request.host,
            prefix = ?prefix.as_ref().map(|p| &p.locale),
            "Prefix not served on this domain"
        );
    }

    RouteMatch {
        domain,
        prefix,
        remaining_path,
        domain_mismatch,
    }
}

/// Split `/de/about` into `("de", "/about")` and `/de` into `("de", "/")`.
fn split_first_segment(path: &str) -> Option<(&str, &str)> {
    let trimmed = path.strip_prefix('/')?;
    let (segment, rest) = match trimmed.find('/') {
        Some(idx) => (&trimmed[..idx], &trimmed[idx..]),
        None => (trimmed, ""),
    };
    if segment.is_empty() {
        return None;
    }
    Some((segment, if rest.is_empty() { "/" } else { rest }))
}

/// `//evil.com/x` → `/evil.com/x`.
pub(crate) fn collapse_leading_slashes(path: &str) -> String {
    format!("/{}", path.trim_start_matches(['/', '\\']))
}
