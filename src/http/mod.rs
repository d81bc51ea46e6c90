//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, extract host/path/cookie/Accept-Language)
//!     → routing::LocaleRouter (Rewrite | Redirect | PassThrough)
//!     → upstream application, or a 307 straight back to the client
//!     → response.rs (Set-Cookie, Link headers)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdGenerator, X_LOCALE, X_REQUEST_ID};
pub use server::HttpServer;
