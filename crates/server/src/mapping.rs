//! Conversions between domain types and wire messages.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use bridge_core::{Account, AccountMeta, AccountStatus, Address, AuthError, AuthResult, Kyc};

use crate::pb;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn user_from_account(account: &Account) -> pb::User {
    pb::User {
        id: account.id.to_string(),
        name: account.name.clone(),
        email: account.email.clone(),
        phone_number: account.phone_number.clone(),
        status: status_to_pb(account.status) as i32,
        meta: Some(meta_to_pb(&account.meta)),
        created_at: timestamp(account.created_at),
        updated_at: timestamp(account.updated_at),
    }
}

pub fn status_to_pb(status: AccountStatus) -> pb::AccountStatus {
    match status {
        AccountStatus::PendingActive => pb::AccountStatus::PendingActive,
        AccountStatus::Active => pb::AccountStatus::Active,
        AccountStatus::Inactive => pb::AccountStatus::Inactive,
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn meta_to_pb(meta: &AccountMeta) -> pb::UserMeta {
    pb::UserMeta {
        kyc: meta.kyc.as_ref().map(|kyc| pb::Kyc {
            document_type: kyc.document_type.clone(),
            document_number: kyc.document_number.clone(),
            date_of_birth: kyc
                .date_of_birth
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            address: kyc.address.as_ref().map(|a| pb::Address {
                line1: a.line1.clone(),
                line2: a.line2.clone(),
                city: a.city.clone(),
                state: a.state.clone(),
                country: a.country.clone(),
                postal_code: a.postal_code.clone(),
            }),
            verified_at: kyc.verified_at.map(timestamp).unwrap_or_default(),
        }),
    }
}

/// Parse client-supplied metadata. Malformed dates are an invalid argument.
pub fn meta_from_pb(meta: pb::UserMeta) -> AuthResult<AccountMeta> {
    let kyc = match meta.kyc {
        Some(kyc) => Some(kyc_from_pb(kyc)?),
        None => None,
    };
    Ok(AccountMeta { kyc })
}

fn kyc_from_pb(kyc: pb::Kyc) -> AuthResult<Kyc> {
    let date_of_birth = if kyc.date_of_birth.is_empty() {
        None
    } else {
        let parsed = NaiveDate::parse_from_str(&kyc.date_of_birth, DATE_FORMAT)
            .map_err(|_| AuthError::invalid_argument("date_of_birth must be formatted as YYYY-MM-DD"))?;
        Some(parsed)
    };

    let verified_at = if kyc.verified_at.is_empty() {
        None
    } else {
        let parsed = DateTime::parse_from_rfc3339(&kyc.verified_at)
            .map_err(|_| AuthError::invalid_argument("verified_at must be an RFC 3339 timestamp"))?;
        Some(parsed.with_timezone(&Utc))
    };

    Ok(Kyc {
        document_type: kyc.document_type,
        document_number: kyc.document_number,
        date_of_birth,
        address: kyc.address.map(|a| Address {
            line1: a.line1,
            line2: a.line2,
            city: a.city,
            state: a.state,
            country: a.country,
            postal_code: a.postal_code,
        }),
        verified_at,
    })
}
