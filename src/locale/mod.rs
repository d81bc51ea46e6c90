//! Locale subsystem.
//!
//! # Data Flow
//! ```text
//! Accept-Language header
//!     → negotiation.rs (parse weights, match against LocaleSet)
//! Prefix / cookie / header / domain
//!     → resolver.rs (priority cascade)
//!     → Resolution { locale, source }
//! ```
//!
//! # Design Decisions
//! - The cascade is an ordered list of plain functions
//! - Resolution is total: it always ends at a default locale
//! - Domain restrictions narrow every step, not just the prefix

pub mod negotiation;
pub mod resolver;
pub mod set;

pub use negotiation::{negotiate, parse_accept_language, LanguagePreference};
pub use resolver::{resolve, LocaleSource, Resolution, ResolveContext};
pub use set::{Domain, LocaleSet};
