//! Account model as seen by the auth core.
//!
//! The account store owns these records; the core only reads and writes them
//! through the store interface.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::AccountId;

/// Account lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Registered but not yet activated. Still allowed to authenticate.
    #[default]
    PendingActive,
    Active,
    /// Deactivated. Cannot log in and existing tokens are rejected.
    Inactive,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::PendingActive => "PENDING_ACTIVE",
            AccountStatus::Active => "ACTIVE",
            AccountStatus::Inactive => "INACTIVE",
        }
    }

    /// Numeric form used by the wire protocol and the database column.
    pub fn as_i32(&self) -> i32 {
        match self {
            AccountStatus::PendingActive => 0,
            AccountStatus::Active => 1,
            AccountStatus::Inactive => 2,
        }
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(AccountStatus::PendingActive),
            1 => Some(AccountStatus::Active),
            2 => Some(AccountStatus::Inactive),
            _ => None,
        }
    }

    pub fn is_inactive(&self) -> bool {
        matches!(self, AccountStatus::Inactive)
    }
}

impl core::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Postal address captured during KYC.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub line1: String,
    pub line2: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
}

/// Know-your-customer details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Kyc {
    pub document_type: String,
    pub document_number: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<Address>,
    pub verified_at: Option<DateTime<Utc>>,
}

/// Free-form account metadata, stored as a JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountMeta {
    pub kyc: Option<Kyc>,
}

/// A persisted account.
///
/// The password hash is intentionally not part of this type: it only ever
/// travels in [`Credentials`] and [`NewAccount`], so an `Account` can be
/// embedded in token claims and returned to clients as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub status: AccountStatus,
    #[serde(default)]
    pub meta: AccountMeta,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The credential-only row used by login.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub id: AccountId,
    pub email: String,
    pub password_hash: String,
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// An account that has not been persisted yet.
#[derive(Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub password_hash: String,
    pub status: AccountStatus,
    pub meta: AccountMeta,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewAccount {
    /// Build the persisted form once the store has assigned an id.
    pub fn into_account(self, id: AccountId) -> Account {
        Account {
            id,
            name: self.name,
            email: self.email,
            phone_number: self.phone_number,
            status: self.status,
            meta: self.meta,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl core::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NewAccount")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phone_number", &self.phone_number)
            .field("password_hash", &"<redacted>")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}
