//! `bridge-auth`: token issuance/verification, the per-request
//! authentication chain, and the login/registration flows.
//!
//! This crate is decoupled from any transport and from storage: the account
//! store and the secret provider are traits implemented elsewhere.

pub mod claims;
pub mod config;
pub mod context;
pub mod metadata;
pub mod password;
pub mod policy;
pub mod processor;
pub mod profile;
pub mod secrets;
pub mod service;
pub mod store;
pub mod token;

#[cfg(test)]
mod test_support;

pub use claims::{Claims, validate_claims};
pub use config::{AuthConfig, ConfigError};
pub use context::AuthContext;
pub use metadata::RequestMetadata;
pub use password::{HashError, compare_secret, hash_secret};
pub use policy::{PolicyTable, ServicePolicy};
pub use processor::{AUTHORIZATION_HEADER, AuthProcessor};
pub use profile::{ProfileService, ProfileUpdate};
pub use secrets::{SecretError, SecretProvider};
pub use service::{AuthService, Registration, Session};
pub use store::{AccountStore, StoreError, UniqueField, classify_store_error};
pub use token::{KeyError, SymmetricKey, TokenCodec, TokenError, bearer};
