//! Read-only view of the request fields locale routing looks at.
//!
//! Decoupled from `http` types so the routing core can be driven from the
//! gateway, the CLI and tests alike.

use url::Url;

use crate::locale::negotiation::{parse_accept_language, LanguagePreference};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestView {
    /// Request path, always starting with `/`.
    pub path: String,
    /// Raw query string without the leading `?`.
    pub query: Option<String>,
    /// Lowercased host, port included. Forwarded host wins over `Host`.
    pub host: Option<String>,
    /// `http` or `https` as seen by the client.
    pub scheme: Option<String>,
    /// Value of the locale cookie.
    pub cookie_locale: Option<String>,
    /// Language preferences in declaration order.
    pub preferences: Vec<LanguagePreference>,
}

impl RequestView {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        Self {
            path,
            query: None,
            host: None,
            scheme: None,
            cookie_locale: None,
            preferences: Vec::new(),
        }
    }

    /// Build a view from an absolute URL (`https://example.com/de?x=1`).
    pub fn from_url(url: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(url)?;
        let mut view = Self::new(url.path()).with_scheme(url.scheme());
        if let Some(host) = url.host_str() {
            let host = match url.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_string(),
            };
            view = view.with_host(host);
        }
        if let Some(query) = url.query() {
            view = view.with_query(query);
        }
        Ok(view)
    }

    pub fn with_host(mut self, host: impl AsRef<str>) -> Self {
        let host = host.as_ref().trim();
        self.host = (!host.is_empty()).then(|| host.to_ascii_lowercase());
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query = (!query.is_empty()).then_some(query);
        self
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into().to_ascii_lowercase());
        self
    }

    pub fn with_cookie(mut self, locale: impl Into<String>) -> Self {
        self.cookie_locale = Some(locale.into());
        self
    }

    pub fn with_accept_language(mut self, header: &str) -> Self {
        self.preferences = parse_accept_language(header);
        self
    }

    /// Host without port, for domain lookup.
    pub fn hostname(&self) -> Option<&str> {
        let host = self.host.as_deref()?;
        Some(strip_port(host))
    }

    /// `?query` or the empty string.
    pub fn query_suffix(&self) -> String {
        match &self.query {
            Some(query) => format!("?{query}"),
            None => String::new(),
        }
    }
}

fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port))
            if !port.is_empty()
                && port.chars().all(|c| c.is_ascii_digit())
                && (!name.contains(':') || name.ends_with(']')) =>
        {
            name
        }
        _ => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostname_strips_port() {
        assert_eq!(RequestView::new("/").with_host("Example.com:8080").hostname(), Some("example.com"));
        assert_eq!(RequestView::new("/").with_host("example.com").hostname(), Some("example.com"));
        assert_eq!(RequestView::new("/").with_host("[::1]:3000").hostname(), Some("[::1]"));
        assert_eq!(RequestView::new("/").with_host("[::1]").hostname(), Some("[::1]"));
    }

    #[test]
    fn test_from_url() {
        let view = RequestView::from_url("https://Shop.example.com:8443/de/about?ref=x").unwrap();
        assert_eq!(view.path, "/de/about");
        assert_eq!(view.query.as_deref(), Some("ref=x"));
        assert_eq!(view.host.as_deref(), Some("shop.example.com:8443"));
        assert_eq!(view.scheme.as_deref(), Some("https"));
        assert_eq!(view.query_suffix(), "?ref=x");
    }

    #[test]
    fn test_path_is_rooted() {
        assert_eq!(RequestView::new("").path, "/");
        assert_eq!(RequestView::new("about").path, "/about");
    }
}
