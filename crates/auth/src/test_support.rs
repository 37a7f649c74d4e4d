//! Shared fixtures for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use bridge_core::{Account, AccountId, AccountMeta, AccountStatus, Credentials, NewAccount};

use crate::secrets::{SecretError, SecretProvider};
use crate::store::{AccountStore, StoreError, UniqueField};
use crate::token::{SymmetricKey, TokenCodec};

pub const TEST_KEY: &str = "iOSKLt5u3ArSUFxy5B9mS8mgKkqCV+nA";

static PHONE_SEQ: AtomicU64 = AtomicU64::new(0);

pub fn codec() -> TokenCodec {
    TokenCodec::new(SymmetricKey::try_from(TEST_KEY).unwrap(), "bridge")
}

/// An active account with a unique phone number.
pub fn account(email: &str) -> Account {
    let now = Utc::now();
    let seq = PHONE_SEQ.fetch_add(1, Ordering::Relaxed);
    Account {
        id: AccountId::new(),
        name: "Test Account".to_string(),
        email: email.to_string(),
        phone_number: format!("+23480{seq:08}"),
        status: AccountStatus::Active,
        meta: AccountMeta::default(),
        created_at: now,
        updated_at: now,
    }
}

#[derive(Default)]
struct MockState {
    accounts: HashMap<AccountId, (Account, String)>,
    calls: HashMap<&'static str, usize>,
    fail_all: Option<StoreError>,
    fail_create: Option<StoreError>,
}

/// Call-counting in-memory store with injectable failures.
#[derive(Default)]
pub struct MockStore {
    state: Mutex<MockState>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, account: Account, password_hash: &str) -> Account {
        self.state
            .lock()
            .accounts
            .insert(account.id, (account.clone(), password_hash.to_string()));
        account
    }

    pub fn replace(&self, account: Account) {
        let mut state = self.state.lock();
        if let Some(entry) = state.accounts.get_mut(&account.id) {
            entry.0 = account;
        }
    }

    pub fn find(&self, id: AccountId) -> Option<Account> {
        self.state.lock().accounts.get(&id).map(|(a, _)| a.clone())
    }

    pub fn password_hash(&self, id: AccountId) -> Option<String> {
        self.state.lock().accounts.get(&id).map(|(_, h)| h.clone())
    }

    pub fn fail_with(&self, err: StoreError) {
        self.state.lock().fail_all = Some(err);
    }

    pub fn fail_create_with(&self, err: StoreError) {
        self.state.lock().fail_create = Some(err);
    }

    pub fn calls(&self, method: &str) -> usize {
        self.state.lock().calls.get(method).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.state.lock().calls.values().sum()
    }

    fn record(&self, method: &'static str) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        *state.calls.entry(method).or_default() += 1;
        match &state.fail_all {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn find_where(&self, pred: impl Fn(&Account) -> bool) -> Result<Account, StoreError> {
        self.state
            .lock()
            .accounts
            .values()
            .find(|(a, _)| pred(a))
            .map(|(a, _)| a.clone())
            .ok_or(StoreError::NoRows)
    }
}

#[async_trait]
impl AccountStore for MockStore {
    async fn authenticate(&self, email: &str) -> Result<Credentials, StoreError> {
        self.record("authenticate")?;
        self.state
            .lock()
            .accounts
            .values()
            .find(|(a, _)| a.email == email)
            .map(|(a, hash)| Credentials {
                id: a.id,
                email: a.email.clone(),
                password_hash: hash.clone(),
            })
            .ok_or(StoreError::NoRows)
    }

    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        self.record("create")?;
        if let Some(err) = self.state.lock().fail_create.clone() {
            return Err(err);
        }
        let hash = account.password_hash.clone();
        let created = account.into_account(AccountId::new());
        Ok(self.insert(created, &hash))
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Account, StoreError> {
        self.record("find_by_id")?;
        self.find_where(|a| a.id == id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Account, StoreError> {
        self.record("find_by_email")?;
        self.find_where(|a| a.email == email)
    }

    async fn find_by_phone_number(&self, phone_number: &str) -> Result<Account, StoreError> {
        self.record("find_by_phone_number")?;
        self.find_where(|a| a.phone_number == phone_number)
    }

    async fn exists(&self, email: &str, phone_number: &str) -> Result<(), StoreError> {
        self.record("exists")?;
        let state = self.state.lock();
        if state.accounts.values().any(|(a, _)| a.email == email) {
            return Err(StoreError::UniqueViolation(UniqueField::Email));
        }
        if state.accounts.values().any(|(a, _)| a.phone_number == phone_number) {
            return Err(StoreError::UniqueViolation(UniqueField::PhoneNumber));
        }
        Ok(())
    }

    async fn update(&self, account: &mut Account) -> Result<(), StoreError> {
        self.record("update")?;
        let mut state = self.state.lock();
        if state
            .accounts
            .values()
            .any(|(a, _)| a.id != account.id && a.phone_number == account.phone_number)
        {
            return Err(StoreError::UniqueViolation(UniqueField::PhoneNumber));
        }
        let Some(entry) = state.accounts.get_mut(&account.id) else {
            return Err(StoreError::NoRows);
        };
        account.updated_at = Utc::now();
        entry.0 = account.clone();
        Ok(())
    }
}

/// Fixed-map secret provider.
pub struct MapSecrets(HashMap<String, String>);

impl MapSecrets {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

#[async_trait]
impl SecretProvider for MapSecrets {
    async fn get(&self, key: &str) -> Result<String, SecretError> {
        self.0
            .get(key)
            .cloned()
            .ok_or_else(|| SecretError::NotFound(key.to_string()))
    }
}
