//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → RoutingConfig compiled into a LocaleRouter
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → new config sent to the server
//!     → atomic swap of the compiled router
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Only the routing section is hot-reloadable; listener and upstream
//!   changes need a restart

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    CookieConfig, DomainConfig, ListenerConfig, LocalePrefixMode, PathnameConfig, RoutingConfig,
    ServiceConfig,
};
pub use validation::ValidationError;
