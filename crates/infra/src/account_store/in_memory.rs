use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use bridge_auth::{AccountStore, StoreError, UniqueField};
use bridge_core::{Account, AccountId, Credentials, NewAccount};

#[derive(Debug, Clone)]
struct AccountRow {
    account: Account,
    password_hash: String,
}

/// In-memory account store.
///
/// Intended for tests/dev. Enforces the same email/phone uniqueness as the
/// database schema.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    rows: RwLock<HashMap<AccountId, AccountRow>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    fn conflict(
        rows: &HashMap<AccountId, AccountRow>,
        skip: Option<AccountId>,
        email: &str,
        phone_number: &str,
    ) -> Option<UniqueField> {
        let others = || rows.values().filter(move |r| Some(r.account.id) != skip);
        if others().any(|r| r.account.email == email) {
            return Some(UniqueField::Email);
        }
        if others().any(|r| r.account.phone_number == phone_number) {
            return Some(UniqueField::PhoneNumber);
        }
        None
    }

    fn find_where(&self, pred: impl Fn(&Account) -> bool) -> Result<Account, StoreError> {
        self.rows
            .read()
            .values()
            .find(|r| pred(&r.account))
            .map(|r| r.account.clone())
            .ok_or(StoreError::NoRows)
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn authenticate(&self, email: &str) -> Result<Credentials, StoreError> {
        self.rows
            .read()
            .values()
            .find(|r| r.account.email == email)
            .map(|r| Credentials {
                id: r.account.id,
                email: r.account.email.clone(),
                password_hash: r.password_hash.clone(),
            })
            .ok_or(StoreError::NoRows)
    }

    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut rows = self.rows.write();
        if let Some(field) = Self::conflict(&rows, None, &account.email, &account.phone_number) {
            return Err(StoreError::UniqueViolation(field));
        }

        let password_hash = account.password_hash.clone();
        let account = account.into_account(AccountId::new());
        rows.insert(
            account.id,
            AccountRow {
                account: account.clone(),
                password_hash,
            },
        );
        Ok(account)
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Account, StoreError> {
        self.rows
            .read()
            .get(&id)
            .map(|r| r.account.clone())
            .ok_or(StoreError::NoRows)
    }

    async fn find_by_email(&self, email: &str) -> Result<Account, StoreError> {
        self.find_where(|a| a.email == email)
    }

    async fn find_by_phone_number(&self, phone_number: &str) -> Result<Account, StoreError> {
        self.find_where(|a| a.phone_number == phone_number)
    }

    async fn exists(&self, email: &str, phone_number: &str) -> Result<(), StoreError> {
        match Self::conflict(&self.rows.read(), None, email, phone_number) {
            Some(field) => Err(StoreError::UniqueViolation(field)),
            None => Ok(()),
        }
    }

    async fn update(&self, account: &mut Account) -> Result<(), StoreError> {
        let mut rows = self.rows.write();
        if let Some(field) =
            Self::conflict(&rows, Some(account.id), &account.email, &account.phone_number)
        {
            return Err(StoreError::UniqueViolation(field));
        }

        let row = rows.get_mut(&account.id).ok_or(StoreError::NoRows)?;
        account.updated_at = Utc::now();
        row.account = account.clone();
        Ok(())
    }
}
