//! Alternate-language links.
//!
//! One entry per locale (per domain and locale with domain routing) plus an
//! `x-default` entry, rendered the same way redirects are so that every link
//! is a URL the router itself considers canonical.

use serde::Serialize;

use crate::config::schema::LocalePrefixMode;
use crate::routing::decision::absolute_url;
use crate::routing::request::RequestView;
use crate::routing::router::{Located, LocaleRouter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlternateLink {
    pub hreflang: String,
    pub href: String,
}

impl AlternateLink {
    pub fn new(hreflang: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            hreflang: hreflang.into(),
            href: href.into(),
        }
    }
}

/// Render links as a single `Link` header value.
pub fn link_header(links: &[AlternateLink]) -> Option<String> {
    if links.is_empty() {
        return None;
    }
    let entries: Vec<String> = links
        .iter()
        .map(|link| format!("<{}>; rel=\"alternate\"; hreflang=\"{}\"", link.href, link.hreflang))
        .collect();
    Some(entries.join(", "))
}

pub(crate) fn alternate_links(
    router: &LocaleRouter,
    default_locale: &str,
    located: &Located<'_>,
    request: &RequestView,
) -> Vec<AlternateLink> {
    if !router.alternate_links() || router.prefix_mode() == LocalePrefixMode::Never {
        return Vec::new();
    }
    // Links must be absolute; without a host there is nothing to anchor them to.
    let Some(host) = request.host.as_deref() else {
        return Vec::new();
    };
    let scheme = request.scheme.as_deref().unwrap_or(router.default_scheme());

    let mut links = Vec::new();
    if router.domains().is_empty() {
        for locale in router.locales().iter() {
            let path = router.external_path(locale, router.default_locale(), located);
            links.push(AlternateLink::new(locale, absolute_url(scheme, host, &path, None)));
        }
    } else {
        for domain in router.domains() {
            for locale in domain.locale_set(router.locales()).iter() {
                let path = router.external_path(locale, &domain.default_locale, located);
                links.push(AlternateLink::new(
                    locale,
                    absolute_url(scheme, &domain.name, &path, None),
                ));
            }
        }
    }

    let unprefixed = router.localized_path(default_locale, located);
    links.push(AlternateLink::new(
        "x-default",
        absolute_url(scheme, host, &unprefixed, None),
    ));
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_header() {
        let links = vec![
            AlternateLink::new("en", "https://example.com/"),
            AlternateLink::new("de", "https://example.com/de"),
        ];
        assert_eq!(
            link_header(&links).unwrap(),
            "<https://example.com/>; rel=\"alternate\"; hreflang=\"en\", \
             <https://example.com/de>; rel=\"alternate\"; hreflang=\"de\""
        );
        assert!(link_header(&[]).is_none());
    }
}
