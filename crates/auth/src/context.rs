use chrono::{DateTime, Utc};

use bridge_core::{Account, AccountId};

/// Identity established for one RPC.
///
/// Inserted into the request by the auth layer and dropped with it. The
/// account is the one freshly loaded from the store, not the token snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    account: Account,
    token_expires_at: DateTime<Utc>,
}

impl AuthContext {
    pub fn new(account: Account, token_expires_at: DateTime<Utc>) -> Self {
        Self {
            account,
            token_expires_at,
        }
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn account_id(&self) -> AccountId {
        self.account.id
    }

    pub fn token_expires_at(&self) -> DateTime<Utc> {
        self.token_expires_at
    }
}
