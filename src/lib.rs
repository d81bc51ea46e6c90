//! Locale-aware routing gateway library.
//!
//! Resolves the locale of every request (path prefix, domain, cookie,
//! `Accept-Language`) and decides whether to pass it through, rewrite it to
//! an internal locale-prefixed path, or redirect the client to the canonical
//! localized URL.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod locale;
pub mod observability;
pub mod routing;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{Action, LocaleRouter, Outcome, RequestView};
