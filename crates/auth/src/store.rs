//! Account store boundary.
//!
//! The store is an external collaborator. Everything it returns is classified
//! into the domain taxonomy at the call site; raw store errors never reach a
//! caller of the core.

use async_trait::async_trait;
use thiserror::Error;

use bridge_core::{Account, AccountId, AuthError, Credentials, NewAccount};

/// Column guarded by a uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UniqueField {
    Email,
    PhoneNumber,
    /// A constraint the core does not know about, by name.
    Other(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The query matched no (non-deleted) row.
    #[error("no rows in result set")]
    NoRows,

    #[error("unique constraint violated on {0:?}")]
    UniqueViolation(UniqueField),

    /// The store could not be reached or timed out.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store error: {0}")]
    Backend(String),
}

/// Account persistence as consumed by the auth core.
///
/// All lookups see non-deleted accounts only. Every method is a suspension
/// point; dropping the returned future cancels the operation.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Credential-only lookup by email.
    async fn authenticate(&self, email: &str) -> Result<Credentials, StoreError>;

    /// Persist a new account and return it with its assigned id.
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError>;

    async fn find_by_id(&self, id: AccountId) -> Result<Account, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Account, StoreError>;

    async fn find_by_phone_number(&self, phone_number: &str) -> Result<Account, StoreError>;

    /// Fail with `UniqueViolation` if the email or phone number is taken.
    ///
    /// Implementations check the email first, so a request conflicting on
    /// both reports `UniqueField::Email`.
    async fn exists(&self, email: &str, phone_number: &str) -> Result<(), StoreError>;

    /// Persist changes to an existing account and refresh its `updated_at`.
    async fn update(&self, account: &mut Account) -> Result<(), StoreError>;
}

/// Map a store failure into the domain taxonomy.
pub fn classify_store_error(err: &StoreError) -> AuthError {
    match err {
        StoreError::UniqueViolation(UniqueField::Email) => AuthError::EmailExists,
        StoreError::UniqueViolation(UniqueField::PhoneNumber) => AuthError::PhoneNumberExists,
        StoreError::UniqueViolation(UniqueField::Other(_)) => AuthError::AlreadyExists,
        StoreError::NoRows => AuthError::NotFound,
        StoreError::Unavailable(_) | StoreError::Backend(_) => AuthError::Internal,
    }
}
