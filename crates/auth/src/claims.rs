use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use bridge_core::{Account, AccountId};

use crate::token::TokenError;

/// Claims sealed inside an access token.
///
/// The embedded `account` is a snapshot taken at issuance time. It is for
/// display only: status checks always re-resolve the account by `sub`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Audience (the issuing application).
    pub aud: String,

    /// Issuer (same as audience; tokens are only consumed by their issuer).
    pub iss: String,

    /// Issued-at timestamp.
    pub iat: DateTime<Utc>,

    /// Not-before timestamp.
    pub nbf: DateTime<Utc>,

    /// Expiration timestamp.
    pub exp: DateTime<Utc>,

    /// Subject: the account the token was issued to.
    pub sub: AccountId,

    pub account: Account,
}

impl Claims {
    /// Fails when `now + ttl` falls outside the representable time range.
    pub fn new(
        app_name: &str,
        account: &Account,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, TokenError> {
        let exp = now
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::Encode(format!("token lifetime {ttl} is out of range")))?;

        Ok(Self {
            aud: app_name.to_string(),
            iss: app_name.to_string(),
            iat: now,
            nbf: now,
            exp,
            sub: account.id,
            account: account.clone(),
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.exp
    }
}

/// Check the validity window of decrypted claims.
///
/// Only expiry is enforced. A token is expired from the instant `exp` is
/// reached.
pub fn validate_claims(claims: &Claims, now: DateTime<Utc>) -> Result<(), TokenError> {
    if claims.is_expired(now) {
        return Err(TokenError::ExpiredToken);
    }
    Ok(())
}
