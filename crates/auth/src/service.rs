//! Login and registration.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{error, info, instrument, warn};

use bridge_core::{Account, AccountMeta, AccountStatus, AuthError, AuthResult, NewAccount};

use crate::password::{compare_dummy_blocking, compare_secret_blocking, hash_secret_blocking};
use crate::store::{AccountStore, StoreError, classify_store_error};
use crate::token::TokenCodec;

/// An account together with a freshly issued access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub account: Account,
    pub token: String,
}

/// Registration input. Field-level validation happens upstream.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
    pub confirm_password: String,
}

impl core::fmt::Debug for Registration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phone_number", &self.phone_number)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct AuthService {
    codec: Arc<TokenCodec>,
    store: Arc<dyn AccountStore>,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(codec: Arc<TokenCodec>, store: Arc<dyn AccountStore>, token_ttl: Duration) -> Self {
        Self {
            codec,
            store,
            token_ttl,
        }
    }

    /// Exchange email + password for a session.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    #[instrument(skip(self, password), fields(action = "login"))]
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<Session> {
        let credentials = match self.store.authenticate(email).await {
            Ok(credentials) => credentials,
            Err(StoreError::NoRows) => {
                warn!("no account for email");
                // Same hashing cost as a wrong password.
                if let Err(e) = compare_dummy_blocking(password.to_string()).await {
                    error!(error = %e, "failed to run dummy password comparison");
                }
                return Err(AuthError::Unauthenticated);
            }
            Err(other) => {
                error!(error = %other, "failed to authenticate account");
                return Err(AuthError::Internal);
            }
        };

        let matches = compare_secret_blocking(credentials.password_hash, password.to_string())
            .await
            .map_err(|e| {
                error!(error = %e, "failed to compare password hash");
                AuthError::Internal
            })?;
        if !matches {
            warn!(account_id = %credentials.id, "password hash mismatch");
            return Err(AuthError::Unauthenticated);
        }

        let account = self
            .store
            .find_by_id(credentials.id)
            .await
            .map_err(|e| match e {
                StoreError::NoRows => {
                    warn!(account_id = %credentials.id, "account vanished during login");
                    AuthError::Unauthenticated
                }
                other => {
                    error!(account_id = %credentials.id, error = %other, "failed to find account");
                    AuthError::Internal
                }
            })?;

        if account.status.is_inactive() {
            warn!(account_id = %account.id, "login attempt on inactive account");
            return Err(AuthError::InactiveAccount);
        }

        let token = self.issue(&account)?;
        info!(account_id = %account.id, "account authenticated successfully");
        Ok(Session { account, token })
    }

    /// Create a pending account and issue its first session.
    #[instrument(skip(self, registration), fields(action = "register", email = %registration.email))]
    pub async fn register(&self, registration: Registration) -> AuthResult<Session> {
        if registration.password != registration.confirm_password {
            warn!("password confirmation mismatch");
            return Err(AuthError::PasswordConfirmationMismatch);
        }

        self.store
            .exists(&registration.email, &registration.phone_number)
            .await
            .map_err(|e| {
                warn!(error = %e, "account already exists");
                classify_store_error(&e)
            })?;

        let password_hash = hash_secret_blocking(registration.password)
            .await
            .map_err(|e| {
                error!(error = %e, "failed to hash password");
                AuthError::Internal
            })?;

        let now = Utc::now();
        let new_account = NewAccount {
            name: registration.name,
            email: registration.email,
            phone_number: registration.phone_number,
            password_hash,
            status: AccountStatus::PendingActive,
            meta: AccountMeta::default(),
            created_at: now,
            updated_at: now,
        };

        let account = self.store.create(new_account).await.map_err(|e| {
            warn!(error = %e, "failed to create account");
            classify_store_error(&e)
        })?;

        let token = self.issue(&account)?;
        info!(account_id = %account.id, "account registered successfully");
        Ok(Session { account, token })
    }

    fn issue(&self, account: &Account) -> AuthResult<String> {
        self.codec.generate(account, self.token_ttl).map_err(|e| {
            error!(account_id = %account.id, error = %e, "failed to generate access token");
            AuthError::Internal
        })
    }
}
