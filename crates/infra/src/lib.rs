//! Infrastructure layer: account persistence and secret sources.

pub mod account_store;
pub mod secrets;

pub use account_store::{InMemoryAccountStore, PostgresAccountStore};
pub use secrets::{CachedSecretProvider, EnvSecretProvider, StaticSecretProvider};
