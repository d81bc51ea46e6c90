//! Rewrite/redirect decision.
//!
//! # Rules (in order)
//! 1. Domain mismatch → redirect to the domain serving the prefixed locale
//! 2. `never` → rewrite to the internal path, never redirect
//! 3. The canonical external path differs from the request → redirect
//! 4. Internal path differs from the request → rewrite, else pass through
//!
//! Rule 3 covers the prefix cases of `always` and `as-needed` (missing
//! prefix, redundant default prefix, prefix casing) as well as localized
//! pathnames written in another form.
//!
//! Same-host redirect locations always start with exactly one `/`; a
//! location such as `//host/x` would send the client to another host.

use cookie::Cookie;
use serde::Serialize;
use url::Url;

use crate::config::schema::{CookieConfig, LocalePrefixMode, SameSite};
use crate::locale::Resolution;
use crate::routing::matcher::{collapse_leading_slashes, RouteMatch};
use crate::routing::request::RequestView;
use crate::routing::router::{Located, LocaleRouter};

/// What the gateway should do with a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Action {
    /// Serve the request as is.
    PassThrough,
    /// Serve `path` (path and query) without changing the visible URL.
    Rewrite { path: String },
    /// Send the client to `location`, relative or absolute.
    Redirect { location: String },
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Action::PassThrough => "pass-through",
            Action::Rewrite { .. } => "rewrite",
            Action::Redirect { .. } => "redirect",
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Action::Redirect { .. })
    }
}

/// Cookie write instruction for the resolved locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocaleCookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub max_age_secs: u64,
    pub same_site: SameSite,
    pub secure: bool,
}

impl LocaleCookie {
    pub fn new(config: &CookieConfig, locale: &str) -> Self {
        Self {
            name: config.name.clone(),
            value: locale.to_string(),
            path: config.path.clone(),
            max_age_secs: config.max_age_secs,
            same_site: config.same_site,
            // Browsers drop `SameSite=None` cookies that are not secure.
            secure: config.secure || config.same_site == SameSite::None,
        }
    }

    pub fn to_cookie(&self) -> Cookie<'static> {
        let max_age = i64::try_from(self.max_age_secs).unwrap_or(i64::MAX);
        Cookie::build((self.name.clone(), self.value.clone()))
            .path(self.path.clone())
            .max_age(cookie::time::Duration::seconds(max_age))
            .same_site(match self.same_site {
                SameSite::Lax => cookie::SameSite::Lax,
                SameSite::Strict => cookie::SameSite::Strict,
                SameSite::None => cookie::SameSite::None,
            })
            .secure(self.secure)
            .build()
    }

    /// `Set-Cookie` header value.
    pub fn header_value(&self) -> String {
        self.to_cookie().to_string()
    }
}

pub(crate) fn decide(
    router: &LocaleRouter,
    matched: &RouteMatch<'_>,
    resolution: &Resolution,
    located: &Located<'_>,
    request: &RequestView,
) -> Action {
    let query = request.query_suffix();

    if matched.domain_mismatch {
        return cross_domain_redirect(router, matched, resolution, located, request);
    }

    let locale = resolution.locale.as_str();
    let internal = router.internal_path(locale, located);

    if router.prefix_mode() == LocalePrefixMode::Never {
        return Action::Rewrite {
            path: internal + &query,
        };
    }

    let external = router.external_path(locale, matched.default_locale(router), located);
    if external != request.path {
        return Action::Redirect {
            location: collapse_leading_slashes(&external) + &query,
        };
    }

    if internal == request.path {
        Action::PassThrough
    } else {
        Action::Rewrite {
            path: internal + &query,
        }
    }
}

fn cross_domain_redirect(
    router: &LocaleRouter,
    matched: &RouteMatch<'_>,
    resolution: &Resolution,
    located: &Located<'_>,
    request: &RequestView,
) -> Action {
    let target = matched
        .prefix
        .as_ref()
        .and_then(|prefix| router.domain_for_locale(&prefix.locale).map(|d| (prefix, d)));

    match target {
        Some((prefix, domain)) => {
            let path = router.external_path(&prefix.locale, &domain.default_locale, located);
            let scheme = request.scheme.as_deref().unwrap_or(router.default_scheme());
            Action::Redirect {
                location: absolute_url(scheme, &domain.name, &path, request.query.as_deref()),
            }
        }
        // Nobody serves it: drop the prefix and stay on this host.
        None => {
            let path = router.external_path(&resolution.locale, matched.default_locale(router), located);
            Action::Redirect {
                location: collapse_leading_slashes(&path) + &request.query_suffix(),
            }
        }
    }
}

/// `scheme://host/path?query`, percent-encoding the path where needed.
pub(crate) fn absolute_url(scheme: &str, host: &str, path: &str, query: Option<&str>) -> String {
    match Url::parse(&format!("{scheme}://{host}")) {
        Ok(mut url) => {
            url.set_path(path);
            url.set_query(query);
            url.to_string()
        }
        Err(_) => {
            let query = query.map(|q| format!("?{q}")).unwrap_or_default();
            format!("{scheme}://{host}{path}{query}")
        }
    }
}
