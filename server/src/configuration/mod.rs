//! Keyshare server configuration.
//!
//! # Data Flow
//! ```text
//! ResourceStore ("config.json")
//!     → Settings (comments stripped, leniently decoded, defaulted; defaults on any failure)
//!     → Configuration (immutable record + lazy signing key cells)
//!     → ConfigurationProvider (atomic swap on load, shared via Arc)
//! ```
//!
//! # Invariants
//! - Configuration document errors never surface: the server starts on defaults.
//! - Key material errors always surface: no fallback key is ever substituted.

mod lenient;
pub mod provider;
pub mod record;
pub mod settings;

pub use provider::{CONFIGURATION_RESOURCE, ConfigDecodeFailure, ConfigurationProvider};
pub use record::{Configuration, JWT_ALGORITHM};
pub use settings::Settings;
