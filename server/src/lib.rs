// Life of a request:
// 1. A handler asks the `ConfigurationProvider` for the current record
// 2. Plain values come straight from its `Settings`
// 3. Signing keys are fetched and parsed on first use, then cached on the record
// 4. Tokens are signed or verified with those keys (`auth::jwt`)
//
// A reload builds a new record and swaps it in; handlers still holding the
// old record finish with it.
//
// System components:
//  - Resource store (config.json and DER key files)
//  - Configuration provider
//  - Admin HTTP surface
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::disallowed_methods))]

pub mod admin;
pub mod auth;
pub mod config;
pub mod configuration;
pub mod keys;
pub mod resource;

#[cfg(test)]
mod testing;

pub use configuration::{Configuration, ConfigurationProvider, Settings};
pub use keys::{KeyManagementError, KeyMaterialError, PrivateKey, PublicKey};
pub use resource::{DirectoryStore, MemoryStore, ResourceError, ResourceStore};
