//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, path, cookie, Accept-Language)
//!     → matcher.rs (domain lookup, locale prefix extraction)
//!     → locale::resolve (prefix → domain → cookie → header → default)
//!     → pathnames.rs (localized ↔ internal path)
//!     → decision.rs (Rewrite | Redirect | PassThrough)
//!     → links.rs (alternate-language links)
//!
//! Router Compilation (at startup and on reload):
//!     RoutingConfig
//!     → validate
//!     → compile prefixes, domains and path patterns
//!     → Freeze as immutable LocaleRouter
//! ```
//!
//! # Design Decisions
//! - Router compiled once, immutable at runtime
//! - No regex in hot path (segment matching only)
//! - Deterministic: same request always yields the same outcome

pub mod decision;
pub mod links;
pub mod matcher;
pub mod pathnames;
pub mod pattern;
pub mod request;
pub mod router;

pub use decision::{Action, LocaleCookie};
pub use links::{link_header, AlternateLink};
pub use pattern::{ParamKind, Params, PathPattern, PatternError};
pub use request::RequestView;
pub use router::{LocaleRouter, Outcome};
