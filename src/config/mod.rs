//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → sections handed to the oracle, monitor, transport and pipeline
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::BackoffStrategy;
pub use schema::ClientConfig;
pub use schema::ConnectivityConfig;
pub use schema::ObservabilityConfig;
pub use schema::RetryConfig;
pub use schema::TransportConfig;
