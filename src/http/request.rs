//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4)
//! - Extract locale-relevant information (host, path, cookie, Accept-Language)
//! - Prepare the request for forwarding upstream
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Forwarded host and protocol headers win over the connection's view,
//!   since the gateway usually sits behind a TLS terminator
//! - Malformed header values are ignored rather than rejected

use axum::http::header::{ACCEPT_LANGUAGE, COOKIE, HOST};
use cookie::Cookie;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName, Request};
use tower_http::request_id::{MakeRequestId, RequestId};

use crate::routing::RequestView;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
/// Resolved locale, passed to the upstream application.
pub const X_LOCALE: HeaderName = HeaderName::from_static("x-locale");
const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdGenerator;

impl MakeRequestId for RequestIdGenerator {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        uuid::Uuid::new_v4()
            .to_string()
            .parse()
            .ok()
            .map(RequestId::new)
    }
}

/// Request ID as a string, or `unknown` when absent.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Build the routing view of an incoming request.
pub fn request_view(parts: &Parts, cookie_name: &str) -> RequestView {
    let headers = &parts.headers;
    let mut view = RequestView::new(parts.uri.path());

    if let Some(query) = parts.uri.query() {
        view = view.with_query(query);
    }

    let host = first_value(headers, &X_FORWARDED_HOST)
        .or_else(|| header_str(headers, &HOST).map(str::to_string))
        .or_else(|| parts.uri.authority().map(|a| a.to_string()));
    if let Some(host) = host {
        view = view.with_host(host);
    }

    let scheme = first_value(headers, &X_FORWARDED_PROTO)
        .or_else(|| parts.uri.scheme_str().map(str::to_string));
    if let Some(scheme) = scheme {
        view = view.with_scheme(scheme);
    }

    if let Some(locale) = cookie_value(headers, cookie_name) {
        view = view.with_cookie(locale);
    }

    let accept_language: Vec<&str> = headers
        .get_all(ACCEPT_LANGUAGE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    if !accept_language.is_empty() {
        view = view.with_accept_language(&accept_language.join(","));
    }

    view
}

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// First entry of a comma-separated header, trimmed.
fn first_value(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    let value = header_str(headers, name)?.split(',').next()?.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Look up a cookie across all `Cookie` headers.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value_trimmed().to_string())
        .filter(|value| !value.is_empty())
}
