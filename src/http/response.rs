//! Response handling and transformation.
//!
//! # Responsibilities
//! - Turn redirect decisions into `307 Temporary Redirect` responses
//! - Attach locale cookie and alternate-language `Link` headers
//! - Map upstream errors to appropriate HTTP status codes
//!
//! # Design Decisions
//! - 307 keeps the method and body, and is never cached as permanent
//! - Header values that fail to encode are skipped and logged

use axum::body::Body;
use axum::http::header::{LINK, LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::routing::{link_header, Outcome};

/// `307 Temporary Redirect` to `location`.
pub fn redirect_response(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => {
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::TEMPORARY_REDIRECT;
            response.headers_mut().insert(LOCATION, value);
            response
        }
        Err(e) => {
            tracing::error!(location = %location, error = %e, "Invalid redirect location");
            (StatusCode::INTERNAL_SERVER_ERROR, "Invalid redirect location").into_response()
        }
    }
}

/// Append `Set-Cookie` and `Link` headers for a routing outcome.
pub fn apply_locale_headers(headers: &mut HeaderMap, outcome: &Outcome) {
    if let Some(cookie) = &outcome.cookie {
        append(headers, SET_COOKIE, &cookie.header_value());
    }
    if let Some(links) = link_header(&outcome.alternate_links) {
        append(headers, LINK, &links);
    }
}

fn append(headers: &mut HeaderMap, name: axum::http::HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.append(name, value);
        }
        Err(e) => tracing::warn!(header = %name, error = %e, "Skipping unencodable header"),
    }
}
