//! `bridge-core`: domain foundation for the auth core.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod account;
pub mod error;
pub mod id;

pub use account::{Account, AccountMeta, AccountStatus, Address, Credentials, Kyc, NewAccount};
pub use error::{AuthError, AuthResult, ErrorKind};
pub use id::AccountId;
