//! Operations on the authenticated caller's own account.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use bridge_core::{Account, AccountMeta, AuthResult};

use crate::context::AuthContext;
use crate::store::{AccountStore, classify_store_error};

/// Changes a caller may make to their own profile. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub meta: Option<AccountMeta>,
}

#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn AccountStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    pub fn get_profile(&self, ctx: &AuthContext) -> Account {
        ctx.account().clone()
    }

    #[instrument(skip(self, ctx, update), fields(action = "update profile", account_id = %ctx.account_id()))]
    pub async fn update_profile(&self, ctx: &AuthContext, update: ProfileUpdate) -> AuthResult<Account> {
        let mut account = ctx.account().clone();
        if let Some(name) = update.name {
            account.name = name;
        }
        if let Some(phone_number) = update.phone_number {
            account.phone_number = phone_number;
        }
        if let Some(meta) = update.meta {
            account.meta = meta;
        }

        self.store.update(&mut account).await.map_err(|e| {
            warn!(error = %e, "failed to update account");
            classify_store_error(&e)
        })?;

        info!("account updated successfully");
        Ok(account)
    }
}
